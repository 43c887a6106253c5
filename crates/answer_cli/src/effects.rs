use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

use answer_core::{Effect, FailureReason, Msg};
use answer_engine::{ChannelEventSink, ClientSettings, EngineEvent, EngineHandle, TransportError};
use answer_logging::{answer_info, answer_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    /// Starts the engine. Its events reach `msg_tx` as core messages.
    pub fn new<T>(settings: &ClientSettings, msg_tx: mpsc::Sender<T>) -> Result<Self, TransportError>
    where
        T: From<Msg> + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::new(settings, Arc::new(ChannelEventSink::new(event_tx)))?;
        spawn_event_forwarder(event_rx, msg_tx);
        Ok(Self { engine })
    }

    /// Hands effects to the engine. Returns false once shutdown was requested.
    pub fn run(&mut self, effects: Vec<Effect>) -> bool {
        let mut keep_running = true;
        for effect in effects {
            match effect {
                Effect::StartOperation { query, page_id } => {
                    answer_info!(
                        "StartOperation page_id={} query_len={}",
                        page_id,
                        query.len()
                    );
                    self.engine.start_operation(query, page_id);
                }
                Effect::StartPolling {
                    operation_id,
                    interval,
                } => self.engine.arm_poller(operation_id, interval),
                Effect::StopPolling { operation_id } => self.engine.disarm_poller(operation_id),
                Effect::Shutdown => {
                    self.engine.shutdown();
                    keep_running = false;
                }
            }
        }
        keep_running
    }
}

fn spawn_event_forwarder<T>(event_rx: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<T>)
where
    T: From<Msg> + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            if msg_tx.send(T::from(map_event(event))).is_err() {
                break;
            }
        }
    });
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::OperationStarted { operation_id } => Msg::OperationStarted {
            operation_id,
            at: Instant::now(),
        },
        EngineEvent::OperationStartFailed { error } => Msg::OperationStartFailed {
            message: error.to_string(),
        },
        EngineEvent::Polled {
            operation_id,
            seq,
            result,
        } => {
            if let Err(err) = &result {
                answer_warn!("poll {} for {} failed: {}", seq, operation_id, err);
            }
            Msg::PollCompleted {
                operation_id,
                seq,
                at: Instant::now(),
                result: result.map_err(map_failure),
            }
        }
    }
}

fn map_failure(err: TransportError) -> FailureReason {
    match err {
        TransportError::Malformed(message) => FailureReason::Malformed(message),
        other => FailureReason::Transport(other.to_string()),
    }
}
