//! SlogDisplay — structured progress records through `slog`.
//!
//! Each reported iteration becomes one `info` record with the keys
//! `iter`, `obj`, `grad_norm` and `runtime`. Start and cleanup emit one record
//! each. [`SlogDisplay::term_noblock`] builds the same non-blocking terminal
//! drain argmin's slog observer uses.
use crate::optimization::{
    descent::{sinks::DisplaySink, traits::Datum},
    errors::OptResult,
};
use argmin_math::ArgminL2Norm;
use slog::{Drain, Logger, info, o};

/// Display sink that reports progress as structured `slog` records.
#[derive(Debug, Clone)]
pub struct SlogDisplay {
    logger: Logger,
    every: usize,
}

impl SlogDisplay {
    /// Log through `logger`, one record per `every` iterations (`0` is
    /// treated as `1`).
    pub fn new(logger: Logger, every: usize) -> Self {
        Self { logger, every: every.max(1) }
    }

    /// Terminal logger behind an asynchronous drain.
    pub fn term_noblock() -> Self {
        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Self::new(Logger::root(drain, o!()), 1)
    }
}

impl DisplaySink for SlogDisplay {
    fn start(&mut self) -> OptResult<()> {
        info!(self.logger, "starting");
        Ok(())
    }

    fn invoke(&mut self, datum: &Datum) -> OptResult<()> {
        if datum.iteration % self.every == 0 {
            let grad_norm: f64 = datum.grad.l2_norm();
            info!(self.logger, "iteration";
                "iter" => datum.iteration,
                "obj" => datum.obj,
                "grad_norm" => grad_norm,
                "runtime" => datum.runtime
            );
        }
        Ok(())
    }

    fn cleanup(
        &mut self, last: Option<&Datum>, runtimes: &[f64], exit_message: Option<&str>,
    ) -> OptResult<()> {
        let total: f64 = runtimes.iter().sum();
        info!(self.logger, "finished";
            "iterations" => runtimes.len(),
            "obj" => last.map_or(f64::NAN, |d| d.obj),
            "total_runtime" => total,
            "exit" => exit_message.unwrap_or("none")
        );
        Ok(())
    }

    fn every(&self) -> usize {
        self.every
    }
}
