pub mod connection;
pub mod helpers;
pub(crate) mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use models::{
    Decision, EventType, InteractionEvent, PauseEvent, PauseReason, PauseType, Profile, RuleSet,
};
