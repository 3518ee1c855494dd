//! Integration tests for the descent driver.
//!
//! Purpose
//! -------
//! - Validate full runs of `Optimizer`: construction and priming, repeated
//!   `run` calls, interruption, and failure propagation.
//! - Pin the two regression fixtures for momentum descent and RMSProp.
//!
//! Coverage
//! --------
//! - `optimization::descent`:
//!   - `Optimizer::new` / `run` / `reset` and the accessors.
//!   - `Interrupt`, the tolerance stop, the `List` storage sink, and the
//!     ordering of sink notifications.
//! - `optimization::rules`:
//!   - Every built-in rule selected by config, name, or custom constructor.
//! - `optimization::structure`:
//!   - Named-array parameters flowing through a run.
//!
//! Exclusions
//! ----------
//! - Update-law arithmetic beyond the fixtures; covered by unit tests in
//!   each rule module.
//! - Terminal output of `Ascii` / `SlogDisplay`.
use approx::assert_relative_eq;
use descent::{
    optimization::{
        descent::Grad,
        rules::{RuleAdapter, UpdateRule},
    },
    prelude::*,
};
use ndarray::{ArrayD, IxDyn, array};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

/// f(x) = 0.5‖x‖² with gradient x, for single-array parameters.
fn half_square(p: &Params) -> OptResult<(f64, Params)> {
    let x = p.as_array().ok_or(OptError::UnknownError)?;
    Ok((0.5 * x.iter().map(|v| v * v).sum::<f64>(), p.clone()))
}

fn opts(max_iter: usize) -> RunOptions {
    RunOptions::with_max_iter(max_iter).unwrap()
}

fn flat(p: &Params) -> Vec<f64> {
    p.as_array().unwrap().iter().copied().collect()
}

/// Display sink that counts notifications through shared cells.
#[derive(Clone, Default)]
struct Counting {
    starts: Rc<Cell<usize>>,
    invokes: Rc<Cell<usize>>,
    cleanups: Rc<RefCell<Vec<(Option<usize>, usize, Option<String>)>>>,
}

impl DisplaySink for Counting {
    fn start(&mut self) -> OptResult<()> {
        self.starts.set(self.starts.get() + 1);
        Ok(())
    }

    fn invoke(&mut self, _datum: &Datum) -> OptResult<()> {
        self.invokes.set(self.invokes.get() + 1);
        Ok(())
    }

    fn cleanup(
        &mut self, last: Option<&Datum>, runtimes: &[f64], exit_message: Option<&str>,
    ) -> OptResult<()> {
        self.cleanups.borrow_mut().push((
            last.map(|d| d.iteration),
            runtimes.len(),
            exit_message.map(str::to_string),
        ));
        Ok(())
    }
}

#[test]
// Purpose
// -------
// Momentum descent with zero momentum is plain gradient descent.
//
// Given
// -----
// - f(x) = 0.5‖x‖², sgd(lr = 0.1, mom = 0), x0 = [1, −2], one iteration.
//
// Expect
// ------
// - The recorded gradient is [1, −2] and x1 = [0.9, −1.8].
fn sgd_single_step_matches_fixture() {
    // Arrange
    let store = List::new();
    let cfg = RuleConfig::Sgd(SgdConfig::new(0.1, 0.0).unwrap());
    let mut opt = Optimizer::new(half_square, Params::from(array![1.0, -2.0]), cfg)
        .unwrap()
        .with_storage(store.clone());

    // Act
    opt.run(&opts(1)).unwrap();

    // Assert
    let record = store.last().unwrap();
    assert_eq!(record.iteration, 0);
    assert_eq!(record.obj, 2.5);
    assert_eq!(record.grad, array![1.0, -2.0]);
    let x1 = flat(opt.theta());
    assert_relative_eq!(x1[0], 0.9, epsilon = 1e-15);
    assert_relative_eq!(x1[1], -1.8, epsilon = 1e-15);
    assert_eq!(record.params, *opt.theta());
}

#[test]
// Purpose
// -------
// RMSProp on a constant gradient is bit-reproducible and moves steadily
// downhill.
//
// Given
// -----
// - rmsprop(lr = 1e-3, damping = 1e-12, decay = 0.9), constant gradient [1],
//   x0 = [0], two iterations, run twice from scratch.
//
// Expect
// ------
// - Both runs produce identical iterates.
// - x1 = −lr/(damping + √0.1), x2 = x1 − lr/(damping + √0.19), x2 < x1 < 0.
fn rmsprop_two_steps_are_reproducible() {
    // Arrange
    let constant = |p: &Params| -> OptResult<(f64, Params)> {
        let x = p.as_array().ok_or(OptError::UnknownError)?;
        Ok((x.sum(), p.mapv(|_| 1.0)))
    };
    let cfg = RuleConfig::RmsProp(RmsPropConfig::new(1e-3, 1e-12, 0.9).unwrap());
    let trace = || {
        let store = List::new();
        let mut opt = Optimizer::new(constant, Params::from(vec![0.0]), cfg)
            .unwrap()
            .with_storage(store.clone());
        opt.run(&opts(2)).unwrap();
        store.records().iter().map(|d| flat(&d.params)[0]).collect::<Vec<f64>>()
    };

    // Act
    let first = trace();
    let second = trace();

    // Assert
    assert_eq!(first, second);
    let x1 = -1e-3 / (1e-12 + 0.1_f64.sqrt());
    let x2 = x1 - 1e-3 / (1e-12 + 0.19_f64.sqrt());
    assert_relative_eq!(first[0], x1, max_relative = 1e-12);
    assert_relative_eq!(first[1], x2, max_relative = 1e-12);
    assert!(first[1] < first[0] && first[0] < 0.0);
}

#[test]
// Purpose
// -------
// run(N) followed by run(M) continues the same optimization.
//
// Given
// -----
// - Adam on 0.5‖x‖²; one optimizer running 4 then 3 iterations, and a
//   second optimizer running 7 at once.
//
// Expect
// ------
// - 7 runtime entries, indices 0..7 in storage, and the same final iterate
//   as the uninterrupted run.
fn resumed_runs_continue_the_iteration_index() {
    // Arrange
    let store = List::new();
    let mut split = Optimizer::new(half_square, Params::from(array![1.0, -2.0]), "adam")
        .unwrap()
        .with_storage(store.clone());
    let mut whole = Optimizer::new(half_square, Params::from(array![1.0, -2.0]), "adam").unwrap();

    // Act
    split.run(&opts(4)).unwrap();
    split.run(&opts(3)).unwrap();
    whole.run(&opts(7)).unwrap();

    // Assert
    assert_eq!(split.runtimes().len(), 7);
    assert_eq!(split.len(), 7);
    let indices: Vec<usize> = store.records().iter().map(|d| d.iteration).collect();
    assert_eq!(indices, (0..7).collect::<Vec<_>>());
    assert_eq!(split.theta(), whole.theta());
    assert_eq!(split.status(), Status::Stopped(StopReason::Exhausted));
}

#[test]
// Purpose
// -------
// An interrupt raised during an iteration stops the loop after that
// iteration, keeps its result, and lets a later run resume.
//
// Given
// -----
// - sgd on 0.5‖x‖², a callback that raises the interrupt on iteration 2,
//   a counting display, and `max_iter = 10`.
//
// Expect
// ------
// - 3 completed iterations, status `Interrupted`, no exit message.
// - Current parameters equal the last stored record.
// - Cleanup ran once with the last record and the full history.
// - A second run(2) continues with indices 3 and 4 from that iterate.
fn interrupt_stops_between_iterations_and_resumes() {
    // Arrange
    let store = List::new();
    let display = Counting::default();
    let cfg = RuleConfig::Sgd(SgdConfig::new(0.1, 0.5).unwrap());
    let mut opt = Optimizer::new(half_square, Params::from(vec![1.0, 1.0]), cfg)
        .unwrap()
        .with_storage(store.clone())
        .with_display(display.clone());
    let handle = opt.interrupt();
    opt.add_callback(move |d| {
        if d.iteration == 2 {
            handle.raise();
        }
        Ok(())
    });

    // Act
    opt.run(&opts(10)).unwrap();
    let stopped_at = opt.theta().clone();
    let stored_last = store.last().unwrap();

    // Assert
    assert_eq!(opt.len(), 3);
    assert!(opt.len() < 10);
    assert_eq!(opt.status(), Status::Stopped(StopReason::Interrupted));
    assert_eq!(opt.exit_message(), None);
    assert_eq!(stored_last.params, stopped_at);
    assert_eq!(display.starts.get(), 1);
    assert_eq!(display.invokes.get(), 3);
    assert_eq!(*display.cleanups.borrow(), vec![(Some(2), 3, None)]);

    // Act
    opt.run(&opts(2)).unwrap();

    // Assert
    let records = store.records();
    assert_eq!(records.len(), 5);
    assert_eq!(records[3].iteration, 3);
    assert_eq!(records[4].iteration, 4);
    let (_, g) = half_square(&stopped_at).unwrap();
    assert_eq!(records[3].grad, g.as_array().unwrap().iter().copied().collect::<Grad>());
    assert_eq!(opt.status(), Status::Stopped(StopReason::Exhausted));
}

#[test]
// Purpose
// -------
// Objective failures propagate out of `run` without a record or a runtime
// entry for the failing iteration.
//
// Given
// -----
// - An objective that fails on its third evaluation, `max_iter = 10`.
//
// Expect
// ------
// - `run` returns the objective's error.
// - 2 runtime entries, 2 stored records, status `Failed`, and no cleanup.
fn objective_error_aborts_the_run() {
    // Arrange
    let calls = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&calls);
    let flaky = move |p: &Params| -> OptResult<(f64, Params)> {
        counter.set(counter.get() + 1);
        if counter.get() == 3 {
            return Err(OptError::NonFiniteCost { value: f64::NAN });
        }
        half_square(p)
    };
    let store = List::new();
    let display = Counting::default();
    let mut opt = Optimizer::new(flaky, Params::from(vec![1.0]), "sgd")
        .unwrap()
        .with_storage(store.clone())
        .with_display(display.clone());

    // Act
    let err = opt.run(&opts(10)).unwrap_err();

    // Assert
    assert!(matches!(err, OptError::NonFiniteCost { .. }));
    assert_eq!(calls.get(), 3);
    assert_eq!(opt.runtimes().len(), 2);
    assert_eq!(store.len(), 2);
    assert_eq!(store.last().unwrap().params, *opt.theta());
    assert_eq!(opt.status(), Status::Stopped(StopReason::Failed));
    assert!(display.cleanups.borrow().is_empty());
}

#[test]
// Purpose
// -------
// A failing callback aborts the remaining fan-out and the run.
//
// Given
// -----
// - A callback failing on iteration 1, storage after it.
//
// Expect
// ------
// - `run` returns the sink error.
// - Iteration 1 was timed (2 runtime entries) but never reached storage.
fn callback_error_aborts_fan_out() {
    // Arrange
    let store = List::new();
    let mut opt = Optimizer::new(half_square, Params::from(vec![1.0]), RuleKind::Nag)
        .unwrap()
        .with_storage(store.clone())
        .with_callback(|d| {
            if d.iteration == 1 {
                return Err(OptError::sink("callback refused record"));
            }
            Ok(())
        });

    // Act
    let err = opt.run(&opts(5)).unwrap_err();

    // Assert
    assert_eq!(err, OptError::sink("callback refused record"));
    assert_eq!(opt.runtimes().len(), 2);
    assert_eq!(store.len(), 1);
}

#[test]
// Purpose
// -------
// A failing display aborts the remaining fan-out: storage never sees the
// record and the display is not cleaned up.
//
// Given
// -----
// - A display failing on iteration 1, a `List` storage, `max_iter = 5`.
//
// Expect
// ------
// - `run` returns the display's error and status is `Failed`.
// - Storage holds only iteration 0; iteration 1 was timed.
// - `cleanup` never ran.
fn display_error_aborts_fan_out_without_cleanup() {
    struct Refusing {
        cleanups: Rc<Cell<usize>>,
    }

    impl DisplaySink for Refusing {
        fn invoke(&mut self, datum: &Datum) -> OptResult<()> {
            if datum.iteration == 1 {
                return Err(OptError::sink("display refused record"));
            }
            Ok(())
        }

        fn cleanup(&mut self, _: Option<&Datum>, _: &[f64], _: Option<&str>) -> OptResult<()> {
            self.cleanups.set(self.cleanups.get() + 1);
            Ok(())
        }
    }

    // Arrange
    let store = List::new();
    let cleanups = Rc::new(Cell::new(0usize));
    let mut opt = Optimizer::new(half_square, Params::from(vec![1.0]), "sgd")
        .unwrap()
        .with_display(Refusing { cleanups: Rc::clone(&cleanups) })
        .with_storage(store.clone());

    // Act
    let err = opt.run(&opts(5)).unwrap_err();

    // Assert
    assert_eq!(err, OptError::sink("display refused record"));
    assert_eq!(opt.status(), Status::Stopped(StopReason::Failed));
    assert_eq!(opt.runtimes().len(), 2);
    assert_eq!(store.len(), 1);
    assert_eq!(store.last().map(|d| d.iteration), Some(0));
    assert_eq!(cleanups.get(), 0);
}

#[test]
// Purpose
// -------
// A failing storage sink ends the run after the callbacks and the display
// have seen the record.
//
// Given
// -----
// - A counting display and a storage sink failing on iteration 2.
//
// Expect
// ------
// - `run` returns the storage error; 3 display invocations, no cleanup.
fn storage_error_aborts_the_run() {
    struct Refusing;

    impl StorageSink for Refusing {
        fn invoke(&mut self, datum: &Datum) -> OptResult<()> {
            if datum.iteration == 2 {
                return Err(OptError::sink("storage full"));
            }
            Ok(())
        }
    }

    // Arrange
    let display = Counting::default();
    let mut opt = Optimizer::new(half_square, Params::from(vec![1.0]), "adam")
        .unwrap()
        .with_display(display.clone())
        .with_storage(Refusing);

    // Act
    let err = opt.run(&opts(10)).unwrap_err();

    // Assert
    assert_eq!(err, OptError::sink("storage full"));
    assert_eq!(opt.status(), Status::Stopped(StopReason::Failed));
    assert_eq!(display.invokes.get(), 3);
    assert!(display.cleanups.borrow().is_empty());
}

#[test]
// Purpose
// -------
// An interrupt raised during the last budgeted iteration stops that run and
// does not cancel the next one.
//
// Given
// -----
// - A callback raising the interrupt on iteration 2 of run(3), then run(5).
//
// Expect
// ------
// - run(3) ends `Interrupted` with 3 iterations and the flag lowered.
// - run(5) performs all 5 iterations and ends `Exhausted`.
fn interrupt_on_last_iteration_does_not_leak_into_next_run() {
    // Arrange
    let store = List::new();
    let mut opt = Optimizer::new(half_square, Params::from(vec![1.0, -1.0]), "rmsprop")
        .unwrap()
        .with_storage(store.clone());
    let handle = opt.interrupt();
    let raiser = handle.clone();
    opt.add_callback(move |d| {
        if d.iteration == 2 {
            raiser.raise();
        }
        Ok(())
    });

    // Act
    opt.run(&opts(3)).unwrap();

    // Assert
    assert_eq!(opt.len(), 3);
    assert_eq!(opt.status(), Status::Stopped(StopReason::Interrupted));
    assert!(!handle.is_raised());

    // Act
    opt.run(&opts(5)).unwrap();

    // Assert
    assert_eq!(opt.len(), 8);
    assert_eq!(store.len(), 8);
    assert_eq!(opt.status(), Status::Stopped(StopReason::Exhausted));
}

#[test]
// Purpose
// -------
// `usize::MAX` is a valid "run until interrupted" budget, also on a
// resumed run.
//
// Given
// -----
// - run(1), then run(usize::MAX) with a callback raising on iteration 4.
//
// Expect
// ------
// - The second run stops `Interrupted` after iteration 4 (5 iterations in
//   total) without overflowing the iteration index.
fn unbounded_budget_on_resumed_run_stops_on_interrupt() {
    // Arrange
    let store = List::new();
    let mut opt = Optimizer::new(half_square, Params::from(vec![1.0]), "sgd")
        .unwrap()
        .with_storage(store.clone());
    opt.run(&opts(1)).unwrap();
    let handle = opt.interrupt();
    opt.add_callback(move |d| {
        if d.iteration == 4 {
            handle.raise();
        }
        Ok(())
    });

    // Act
    opt.run(&opts(usize::MAX)).unwrap();

    // Assert
    assert_eq!(opt.len(), 5);
    assert_eq!(store.last().map(|d| d.iteration), Some(4));
    assert_eq!(opt.status(), Status::Stopped(StopReason::Interrupted));
}

#[test]
// Purpose
// -------
// Named-array parameters keep their structure through a run.
//
// Given
// -----
// - Params {"b": [3], "w": [[1, 2]]}, f = 0.5 Σ‖entry‖², sgd(lr = 0.5).
//
// Expect
// ------
// - After one step every entry is halved and keeps its shape.
fn named_parameters_round_trip_through_the_driver() {
    // Arrange
    let mut init = BTreeMap::new();
    init.insert("w".to_string(), ArrayD::from_shape_vec(IxDyn(&[1, 2]), vec![1.0, 2.0]).unwrap());
    init.insert("b".to_string(), ArrayD::from_shape_vec(IxDyn(&[1]), vec![3.0]).unwrap());
    let f_df = |p: &Params| -> OptResult<(f64, Params)> {
        match p {
            Params::Map(m) => {
                let value: f64 = m.values().flat_map(|a| a.iter()).map(|v| 0.5 * v * v).sum();
                Ok((value, p.clone()))
            }
            _ => Err(OptError::UnknownError),
        }
    };
    let cfg = RuleConfig::Sgd(SgdConfig::new(0.5, 0.0).unwrap());
    let mut opt = Optimizer::new(f_df, Params::Map(init), cfg).unwrap();

    // Act
    opt.run(&opts(1)).unwrap();

    // Assert
    let w = opt.theta().get("w").unwrap();
    let b = opt.theta().get("b").unwrap();
    assert_eq!(w.shape(), &[1, 2]);
    assert_eq!(w.iter().copied().collect::<Vec<_>>(), vec![0.5, 1.0]);
    assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![1.5]);
    assert_eq!(opt.theta_flat(), &array![1.5, 0.5, 1.0]);
}

#[test]
fn value_only_objective_runs_on_finite_differences() {
    struct Bowl;
    impl Objective for Bowl {
        fn value(&self, params: &Params) -> OptResult<f64> {
            let x = params.as_array().ok_or(OptError::UnknownError)?;
            Ok(x.iter().map(|v| (v - 3.0).powi(2)).sum())
        }
    }

    let cfg = RuleConfig::Sgd(SgdConfig::new(0.1, 0.0).unwrap());
    let theta = minimize(Bowl, Params::from(vec![0.0, 6.0]), cfg, &opts(200)).unwrap();

    for v in flat(&theta) {
        assert_relative_eq!(v, 3.0, epsilon = 1e-4);
    }
}

#[test]
// Purpose
// -------
// Every built-in rule makes progress on a well-conditioned quadratic and is
// deterministic.
//
// Given
// -----
// - f(x) = 0.5‖x‖² from [1, −2] (f = 2.5), lr = 0.1 for each rule, 300
//   iterations, two runs per rule.
//
// Expect
// ------
// - Final objective below 0.1 and identical iterates across the two runs.
fn every_builtin_rule_descends() {
    let configs = [
        RuleConfig::Sgd(SgdConfig::new(0.1, 0.9).unwrap()),
        RuleConfig::Nag(NagConfig::new(0.1).unwrap()),
        RuleConfig::RmsProp(RmsPropConfig::new(0.01, 1e-12, 0.9).unwrap()),
        RuleConfig::Sag(SagConfig::new(10, 0.1).unwrap()),
        RuleConfig::Smorms(SmormsConfig::new(10, 0.1, 1e-8).unwrap()),
        RuleConfig::Adam(AdamConfig::new(0.1, (0.9, 0.999), 1e-8).unwrap()),
    ];
    for cfg in configs {
        let run = || {
            let mut opt =
                Optimizer::new(half_square, Params::from(array![1.0, -2.0]), cfg).unwrap();
            opt.run(&opts(300)).unwrap();
            opt.theta().clone()
        };
        let a = run();
        let b = run();

        let (value, _) = half_square(&a).unwrap();
        assert!(value < 0.1, "{:?} ended at objective {value}", cfg.kind());
        assert_eq!(a, b);
    }
}

#[test]
// Purpose
// -------
// The opt-in tolerance stop ends the run with an exit message.
//
// Given
// -----
// - sgd(lr = 1) on 0.5‖x‖², which lands on the minimum after one step.
// - `stop_on_tol = true`, `max_iter = 100`.
//
// Expect
// ------
// - Stop on iteration 1 with a gradient-norm message and status `Tolerance`.
// - Without `stop_on_tol`, the same setup uses the whole budget.
fn tolerance_stop_is_opt_in() {
    // Arrange
    let cfg = RuleConfig::Sgd(SgdConfig::new(1.0, 0.0).unwrap());
    let display = Counting::default();
    let mut with_tol = Optimizer::new(half_square, Params::from(array![1.0, -2.0]), cfg)
        .unwrap()
        .with_display(display.clone());
    let mut without = Optimizer::new(half_square, Params::from(array![1.0, -2.0]), cfg).unwrap();
    let tols = Tolerances::new(1e-18, 1e-18, 1e-8).unwrap();
    let tol_opts = RunOptions::new(100, tols, true).unwrap();

    // Act
    with_tol.run(&tol_opts).unwrap();
    without.run(&opts(100)).unwrap();

    // Assert
    assert_eq!(with_tol.len(), 2);
    assert_eq!(with_tol.status(), Status::Stopped(StopReason::Tolerance));
    let msg = with_tol.exit_message().unwrap();
    assert!(msg.starts_with("Stopped on iteration 1. Scaled gradient norm"));
    let cleanups = display.cleanups.borrow();
    assert_eq!(cleanups[0].2.as_deref(), Some(msg));
    assert_eq!(without.len(), 100);
    assert_eq!(without.exit_message(), None);

    // Act
    with_tol.reset();

    // Assert
    assert!(with_tol.is_empty());
    assert_eq!(with_tol.exit_message(), None);
    assert_eq!(with_tol.status(), Status::Ready);
}

#[test]
fn unknown_algorithm_is_a_construction_error() {
    let err = Optimizer::new(half_square, Params::from(vec![0.0]), "bfgs").unwrap_err();
    match err {
        OptError::UnknownAlgorithm { name, .. } => assert_eq!(name, "bfgs"),
        other => panic!("Expected UnknownAlgorithm, got {other:?}"),
    }
    assert!(Optimizer::new(half_square, Params::from(vec![0.0]), "RMSProp").is_ok());
}

#[test]
// Purpose
// -------
// A user rule plugs in through a constructor without touching the driver.
//
// Given
// -----
// - Sign descent: x ← x − 0.25·sign(g), primed by a custom constructor.
//
// Expect
// ------
// - From [1, −1], two steps reach [0.5, −0.5]; the rule's name shows up in the
//   driver summary.
fn custom_rule_plugs_in() {
    struct SignDescent {
        x: Option<Theta>,
    }

    impl UpdateRule for SignDescent {
        fn name(&self) -> &'static str {
            "sign-descent"
        }

        fn initialize(&mut self, x0: Theta) -> OptResult<Theta> {
            self.x = Some(x0.clone());
            Ok(x0)
        }

        fn step(&mut self, grad: &Grad) -> OptResult<Theta> {
            let x = self.x.as_mut().ok_or(OptError::RuleNotPrimed)?;
            x.zip_mut_with(grad, |xi, &g| *xi -= 0.25 * g.signum());
            Ok(x.clone())
        }
    }

    // Arrange
    let algorithm = Algorithm::custom(|x0| RuleAdapter::primed(SignDescent { x: None }, x0));
    let mut opt = Optimizer::new(half_square, Params::from(array![1.0, -1.0]), algorithm).unwrap();

    // Act
    opt.run(&opts(2)).unwrap();

    // Assert
    assert_eq!(flat(opt.theta()), vec![0.5, -0.5]);
    assert!(opt.to_string().starts_with("sign-descent\n2 iterations\n"));
}
