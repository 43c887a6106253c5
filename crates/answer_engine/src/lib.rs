//! Answer tracker engine: HTTP transport, poll loop and effect execution.
mod engine;
mod poller;
mod transport;
mod types;
mod wire;

pub use engine::EngineHandle;
pub use poller::{ChannelEventSink, EventSink, PollContext, Poller};
pub use transport::{HttpTransport, Transport};
pub use types::{ClientSettings, EngineEvent, Endpoint, TransportError};
