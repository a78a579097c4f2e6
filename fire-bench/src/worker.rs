use crate::collector::SampleCollector;
use crate::executor;
use crate::pacer::Pacer;
use crate::transport::Transport;
use std::sync::Arc;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    Running,
    Stopped,
}

/// One simulated client: pace, send, record, until the deadline passes.
pub(crate) struct Worker<T> {
    id: usize,
    transport: Arc<T>,
    pacer: Pacer,
    deadline: Instant,
    collector: SampleCollector,
    state: WorkerState,
    attempts: u64,
}

impl<T: Transport> Worker<T> {
    pub fn new(
        id: usize,
        transport: Arc<T>,
        pacer: Pacer,
        deadline: Instant,
        collector: SampleCollector,
    ) -> Self {
        Self {
            id,
            transport,
            pacer,
            deadline,
            collector,
            state: WorkerState::Running,
            attempts: 0,
        }
    }

    /// Run until STOPPED and return the number of attempts recorded.
    ///
    /// The deadline is checked once per pace-and-send cycle, before the pacing delay. A cycle
    /// that has started always sends, and its request is awaited and counted even when it
    /// completes past the deadline.
    pub async fn run(mut self) -> u64 {
        while self.check_deadline() == WorkerState::Running {
            self.pacer.wait().await;

            let sample = executor::execute(self.transport.as_ref()).await;
            self.collector.record(sample);
            self.attempts += 1;
        }

        trace!("Worker {} stopped after {} attempts", self.id, self.attempts);
        self.attempts
    }

    fn check_deadline(&mut self) -> WorkerState {
        if Instant::now() >= self.deadline {
            self.state = WorkerState::Stopped;
        }
        self.state
    }
}
