pub mod event;
pub mod pause;
pub mod profile;
pub mod rule_set;

pub use event::{EventType, InteractionEvent};
pub use pause::{Decision, PauseEvent, PauseReason, PauseType};
pub use profile::Profile;
pub use rule_set::RuleSet;
