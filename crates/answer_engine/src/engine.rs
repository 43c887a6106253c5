use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use answer_core::OperationId;
use answer_logging::{answer_info, answer_warn};

use crate::poller::{EventSink, Poller};
use crate::{ClientSettings, EngineEvent, HttpTransport, Transport, TransportError};

enum EngineCommand {
    StartOperation { query: String, page_id: String },
    ArmPoller { operation_id: OperationId, interval: Duration },
    DisarmPoller { operation_id: OperationId },
    Shutdown,
}

/// Handle to the background IO thread.
///
/// Commands are handled one at a time on that thread, so an old poll loop is
/// always cancelled before a new one is armed.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: &ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(settings)?;
        Ok(Self::with_transport(Arc::new(transport), sink))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, sink: Arc<dyn EventSink>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut poller = Poller::new(transport.clone(), sink.clone());
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartOperation { query, page_id } => {
                        let transport = transport.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            start_operation(transport.as_ref(), &query, &page_id, sink.as_ref())
                                .await;
                        });
                    }
                    EngineCommand::ArmPoller {
                        operation_id,
                        interval,
                    } => poller.arm(runtime.handle(), operation_id, interval),
                    EngineCommand::DisarmPoller { operation_id } => {
                        poller.disarm_if(&operation_id);
                    }
                    EngineCommand::Shutdown => break,
                }
            }
            poller.disarm();
            runtime.shutdown_timeout(Duration::from_millis(250));
            answer_info!("engine thread stopped");
        });

        Self {
            cmd_tx,
            worker: Some(worker),
        }
    }

    pub fn start_operation(&self, query: impl Into<String>, page_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::StartOperation {
            query: query.into(),
            page_id: page_id.into(),
        });
    }

    pub fn arm_poller(&self, operation_id: OperationId, interval: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::ArmPoller {
            operation_id,
            interval,
        });
    }

    pub fn disarm_poller(&self, operation_id: OperationId) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::DisarmPoller { operation_id });
    }

    /// Stops the poller and joins the engine thread. Safe to call twice.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if worker.join().is_err() {
            answer_warn!("engine thread panicked during shutdown");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn start_operation(transport: &dyn Transport, query: &str, page_id: &str, sink: &dyn EventSink) {
    match transport.start_operation(query, page_id).await {
        Ok(operation_id) => {
            answer_info!("server started operation {}", operation_id);
            sink.emit(EngineEvent::OperationStarted { operation_id });
        }
        Err(error) => {
            answer_warn!("start request failed: {}", error);
            sink.emit(EngineEvent::OperationStartFailed { error });
        }
    }
}
