//! Child process management for one trial.
//!
//! The runner launches a single program and captures its output; the
//! coordinator pairs a server and a client with a startup gate between them.

mod coordinator;
mod runner;

pub use coordinator::{FixedDelay, RunCoordinator, StartupGate, TrialLauncher, TrialOutcome};
pub use runner::{normalize_exit_status, run_program, Invocation, RawRunResult};
