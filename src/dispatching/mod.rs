//! Dispatching rules and rule engine for operation ordering.
//!
//! The scheduler places operations one at a time, and capacity consumed by
//! an earlier operation is unavailable to later ones, so the order decides
//! who gets the contested hours. Ordering is expressed as a chain of
//! dispatching rules evaluated lexicographically.
//!
//! # Usage
//!
//! ```
//! use mes_schedule::dispatching::{rules, RuleEngine, SchedulingContext, TieBreaker};
//!
//! // The production default: priority, then due date, then routing sequence.
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Priority)
//!     .with_rule(rules::Edd)
//!     .with_rule(rules::Sequence)
//!     .with_final_tie_breaker(TieBreaker::ById);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{RuleEngine, TieBreaker};

use crate::models::Operation;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A dispatching rule that scores an operation.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "PRIORITY", "EDD").
    fn name(&self) -> &'static str;

    /// Scores an operation in the given context.
    fn evaluate(&self, operation: &Operation, context: &SchedulingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
