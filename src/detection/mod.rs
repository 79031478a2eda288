pub mod emitter;
pub mod evaluator;
pub mod strategy;

pub use emitter::SuggestionEmitter;
pub use evaluator::WindowEvaluator;
pub use strategy::{ClientReportedBurst, Crossing, DetectionStrategy, ServerCountedWindow};
