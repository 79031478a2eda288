//! Pacewatch: windowed accelerated-use detection for monitored profiles.
//!
//! Interaction events (tap bursts, screen changes) stream in per profile;
//! the engine persists every event, evaluates it against the profile's rule
//! set and, when a window threshold is crossed, records a suggested pause
//! and returns the decision to the caller. Transport, parent linking and
//! retention are the embedding service's concern.

pub mod db;
pub mod detection;
pub mod error;
pub mod ingest;
mod utils;

pub use db::{
    Database, Decision, EventType, InteractionEvent, PauseEvent, PauseReason, PauseType, Profile,
    RuleSet,
};
pub use detection::{
    ClientReportedBurst, Crossing, DetectionStrategy, ServerCountedWindow, SuggestionEmitter,
    WindowEvaluator,
};
pub use error::EngineError;
pub use ingest::{EventEnvelope, IngestionGateway};

/// Initialize logging (reads RUST_LOG env var). Safe to call more than
/// once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
