//! Ascii — plain-text progress table.
//!
//! Output looks like:
//!
//! ```text
//! +-----------+------------------+------------------+--------------+
//! | Iteration |        Objective |         ||Grad|| |  Runtime (s) |
//! +-----------+------------------+------------------+--------------+
//! |         0 |     2.500000e0   | ...
//! ```
//!
//! A row is written for every `every`-th iteration; its runtime column sums
//! the runtimes of the batch. `cleanup` closes the table and prints a short
//! summary with the exit message, if any.
use crate::optimization::{
    descent::{sinks::DisplaySink, traits::Datum},
    errors::OptResult,
};
use argmin_math::ArgminL2Norm;
use std::io::{self, Write};

const RULE: &str = "+-----------+------------------+------------------+--------------+";

/// Display sink that writes a fixed-width progress table to any [`Write`].
#[derive(Debug)]
pub struct Ascii<W: Write> {
    out: W,
    every: usize,
}

impl Ascii<io::Stdout> {
    /// Report every iteration on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), 1)
    }
}

impl<W: Write> Ascii<W> {
    /// Write to `out`, one row per `every` iterations (`0` is treated as `1`).
    pub fn new(out: W, every: usize) -> Self {
        Self { out, every: every.max(1) }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for Ascii<W> {
    fn start(&mut self) -> OptResult<()> {
        writeln!(self.out, "{RULE}")?;
        writeln!(
            self.out,
            "| {:>9} | {:>16} | {:>16} | {:>12} |",
            "Iteration", "Objective", "||Grad||", "Runtime (s)"
        )?;
        writeln!(self.out, "{RULE}")?;
        Ok(())
    }

    fn invoke(&mut self, datum: &Datum) -> OptResult<()> {
        if datum.iteration % self.every != 0 {
            return Ok(());
        }
        let grad_norm: f64 = datum.grad.l2_norm();
        writeln!(
            self.out,
            "| {:>9} | {:>16.6e} | {:>16.6e} | {:>12.4e} |",
            datum.iteration, datum.obj, grad_norm, datum.runtime
        )?;
        Ok(())
    }

    fn cleanup(
        &mut self, last: Option<&Datum>, runtimes: &[f64], exit_message: Option<&str>,
    ) -> OptResult<()> {
        writeln!(self.out, "{RULE}")?;
        if let Some(msg) = exit_message {
            writeln!(self.out, "{msg}")?;
        }
        if let Some(d) = last {
            writeln!(
                self.out,
                "Final objective: {:.6e} after {} iterations",
                d.obj,
                d.iteration + 1
            )?;
        }
        let total: f64 = runtimes.iter().sum();
        let mean = if runtimes.is_empty() { 0.0 } else { total / runtimes.len() as f64 };
        writeln!(self.out, "Runtime: {total:.4e} s total, {mean:.4e} s per iteration")?;
        self.out.flush()?;
        Ok(())
    }

    fn every(&self) -> usize {
        self.every
    }
}
