use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::time::Duration;

use answer_core::OperationId;
use answer_logging::{answer_debug, answer_info, answer_trace};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, Transport};

/// Receives engine events as they happen.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The operation the poller is armed for, read by every tick.
#[derive(Debug, Default)]
pub struct PollContext {
    current: Mutex<Option<OperationId>>,
}

impl PollContext {
    pub fn current(&self) -> Option<OperationId> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_current(&self, operation_id: &OperationId) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            == Some(operation_id)
    }

    fn set(&self, operation_id: Option<OperationId>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = operation_id;
    }
}

struct ArmedPoll {
    operation_id: OperationId,
    cancel: CancellationToken,
}

/// Owns the single poll loop of the session.
pub struct Poller {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn EventSink>,
    context: Arc<PollContext>,
    armed: Option<ArmedPoll>,
}

impl Poller {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            transport,
            sink,
            context: Arc::new(PollContext::default()),
            armed: None,
        }
    }

    pub fn context(&self) -> Arc<PollContext> {
        self.context.clone()
    }

    pub fn armed(&self) -> Option<&OperationId> {
        self.armed.as_ref().map(|armed| &armed.operation_id)
    }

    /// Tears down any armed loop, then starts polling `operation_id` every `interval`.
    pub fn arm(
        &mut self,
        runtime: &tokio::runtime::Handle,
        operation_id: OperationId,
        interval: Duration,
    ) {
        self.disarm();
        self.context.set(Some(operation_id.clone()));
        let cancel = CancellationToken::new();
        answer_info!("arming poller for {} every {:?}", operation_id, interval);
        runtime.spawn(poll_loop(
            self.transport.clone(),
            self.sink.clone(),
            self.context.clone(),
            operation_id.clone(),
            interval,
            cancel.clone(),
        ));
        self.armed = Some(ArmedPoll {
            operation_id,
            cancel,
        });
    }

    /// Cancels the armed loop, if any. Calling it again is a no-op.
    pub fn disarm(&mut self) -> Option<OperationId> {
        let armed = self.armed.take()?;
        armed.cancel.cancel();
        self.context.set(None);
        answer_debug!("poller for {} disarmed", armed.operation_id);
        Some(armed.operation_id)
    }

    /// Disarms only if the loop is armed for `operation_id`.
    pub fn disarm_if(&mut self, operation_id: &OperationId) -> bool {
        if self.armed() == Some(operation_id) {
            self.disarm();
            true
        } else {
            false
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn poll_loop(
    transport: Arc<dyn Transport>,
    sink: Arc<dyn EventSink>,
    context: Arc<PollContext>,
    operation_id: OperationId,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    // Each round trip completes before the next tick, so polls never overlap.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if !context.is_current(&operation_id) {
            answer_trace!("skipping tick for {}: no longer armed", operation_id);
            continue;
        }

        seq += 1;
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = transport.poll_operation(&operation_id) => result,
        };
        let failed = result.is_err();
        sink.emit(EngineEvent::Polled {
            operation_id: operation_id.clone(),
            seq,
            result,
        });
        if failed {
            break;
        }
    }

    answer_debug!("poll loop for {} ended after {} polls", operation_id, seq);
}
