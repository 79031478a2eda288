pub mod events;
pub mod pause_events;
pub mod profiles;
pub mod rule_sets;
