//! Decision support: rule thresholds and the recommendation engine.

pub mod recommendation;
pub mod thresholds;

pub use recommendation::{baseline_efficiency, evaluate, evaluate_with};
pub use thresholds::RuleThresholds;
