//! Answer tracker core: pure polling state machine and view-model helpers.
mod controller;
mod effect;
mod merge;
mod msg;
mod settings;
mod staleness;
mod state;
mod transcript;
mod types;
mod typewriter;
mod update;
mod view_model;

pub use controller::{Admission, RequestLifecycleController, TrackingRecord};
pub use effect::Effect;
pub use merge::{merge_poll_result, MergeOutcome, Watermark};
pub use msg::Msg;
pub use settings::{
    TrackerSettings, DEFAULT_POLL_INTERVAL, DEFAULT_STALE_TIMEOUT, DEFAULT_TYPE_SPEED,
};
pub use staleness::{Signature, Staleness, StalenessDetector};
pub use state::AppState;
pub use transcript::{Transcript, TranscriptEntry, TranscriptItem, INITIAL_STATUS};
pub use types::{EventKind, FailureReason, OperationId, Payload, PollResult, UpdateEvent, FINISHED};
pub use typewriter::Typewriter;
pub use update::update;
pub use view_model::{AnswerRowView, AppViewModel, TranscriptRowView};
