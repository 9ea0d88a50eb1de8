//! Run coordinator.
//!
//! Starts the server, waits on a startup gate, starts the client, then
//! joins both. There is no readiness handshake by default: the gate is a
//! fixed warm-up delay, and a server slower than the delay shows up as a
//! client failure, not a coordinator error.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::RunnerError;
use crate::process::runner::{run_program, Invocation, RawRunResult};
use crate::types::{CipherSuiteId, Entity};

/// Decides when the client may be started after the server was spawned.
pub trait StartupGate: Send + Sync {
    fn wait_ready(&self) -> impl Future<Output = ()> + Send;
}

/// Startup gate that simply sleeps for the warm-up interval.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl StartupGate for FixedDelay {
    async fn wait_ready(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Both sides of one trial.
#[derive(Debug)]
pub struct TrialOutcome {
    pub server: Result<RawRunResult, RunnerError>,
    pub client: Result<RawRunResult, RunnerError>,
}

/// Something that can execute one paired trial.
pub trait TrialLauncher {
    fn launch(
        &self,
        cipher_suite: &CipherSuiteId,
        client_bytes: u64,
        server_bytes: u64,
    ) -> impl Future<Output = TrialOutcome> + Send;
}

/// Launches the server/client pair for each trial.
#[derive(Debug, Clone)]
pub struct RunCoordinator<G = FixedDelay> {
    server_path: PathBuf,
    client_path: PathBuf,
    gate: G,
    deadline: Option<Duration>,
}

impl RunCoordinator<FixedDelay> {
    /// Create a coordinator with a fixed warm-up delay.
    pub fn new(
        server_path: impl Into<PathBuf>,
        client_path: impl Into<PathBuf>,
        warmup: Duration,
    ) -> Self {
        Self::with_gate(server_path, client_path, FixedDelay(warmup))
    }
}

impl<G: StartupGate> RunCoordinator<G> {
    /// Create a coordinator with a custom startup gate.
    pub fn with_gate(
        server_path: impl Into<PathBuf>,
        client_path: impl Into<PathBuf>,
        gate: G,
    ) -> Self {
        Self {
            server_path: server_path.into(),
            client_path: client_path.into(),
            gate,
            deadline: None,
        }
    }

    /// Kill either process if it is still running after `deadline`.
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

impl<G: StartupGate> TrialLauncher for RunCoordinator<G> {
    async fn launch(
        &self,
        cipher_suite: &CipherSuiteId,
        client_bytes: u64,
        server_bytes: u64,
    ) -> TrialOutcome {
        let server = Invocation {
            entity: Entity::Server,
            program: self.server_path.clone(),
            cipher_suite: cipher_suite.clone(),
            payload_bytes: server_bytes,
        };
        let client = Invocation {
            entity: Entity::Client,
            program: self.client_path.clone(),
            cipher_suite: cipher_suite.clone(),
            payload_bytes: client_bytes,
        };
        let deadline = self.deadline;

        let server_task = tokio::spawn(async move { run_program(&server, deadline).await });

        self.gate.wait_ready().await;

        let client_task = tokio::spawn(async move { run_program(&client, deadline).await });

        let (server, client) = tokio::join!(server_task, client_task);

        TrialOutcome {
            server: flatten_join(server),
            client: flatten_join(client),
        }
    }
}

fn flatten_join(
    joined: Result<Result<RawRunResult, RunnerError>, tokio::task::JoinError>,
) -> Result<RawRunResult, RunnerError> {
    joined.map_err(|e| RunnerError::Join {
        reason: e.to_string(),
    })?
}
