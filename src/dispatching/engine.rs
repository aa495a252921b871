//! Rule engine for multi-criteria dispatching.
//!
//! Rules are applied in sequence: the next rule is consulted only when the
//! previous ones tie.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Operation;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Deterministic by operation id (lexicographic).
    ById,
}

/// A composable rule engine for operation ordering.
///
/// # Example
/// ```
/// use mes_schedule::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Edd)
///     .with_rule(rules::Spt);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Priority (urgent first), then due date, then routing sequence, then id.
    pub fn production_default() -> Self {
        Self::new()
            .with_rule(rules::Priority)
            .with_rule(rules::Edd)
            .with_rule(rules::Sequence)
            .with_final_tie_breaker(TieBreaker::ById)
    }

    /// Appends a rule to the chain.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    pub fn tie_breaker(&self) -> &TieBreaker {
        &self.tie_breaker
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts operations, highest priority first.
    ///
    /// Returns indices into the original slice.
    pub fn sort_indices(&self, operations: &[Operation], context: &SchedulingContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..operations.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&operations[a], &operations[b], context));
        indices
    }

    /// Scores of each rule for one operation.
    pub fn evaluate(&self, operation: &Operation, context: &SchedulingContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(operation, context))
            .collect()
    }

    fn compare(&self, a: &Operation, b: &Operation, context: &SchedulingContext) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        match self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::production_default()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobPriority;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn ctx() -> SchedulingContext {
        SchedulingContext::at_date(d(19))
    }

    fn make_op(id: &str, priority: JobPriority, due: Option<u32>, sequence: i32) -> Operation {
        let mut op = Operation::new(id, "C1", 4.0)
            .with_priority(priority)
            .with_sequence(sequence);
        op.job_due_date = due.map(d);
        op
    }

    fn ordered_ids(engine: &RuleEngine, ops: &[Operation]) -> Vec<String> {
        engine
            .sort_indices(ops, &ctx())
            .into_iter()
            .map(|i| ops[i].id.clone())
            .collect()
    }

    #[test]
    fn test_priority_dominates_due_date() {
        let ops = vec![
            make_op("normal-early", JobPriority::Normal, Some(20), 0),
            make_op("urgent-late", JobPriority::Urgent, Some(30), 0),
            make_op("low", JobPriority::Low, Some(19), 0),
            make_op("high", JobPriority::High, None, 0),
        ];
        let ids = ordered_ids(&RuleEngine::production_default(), &ops);
        assert_eq!(ids, vec!["urgent-late", "high", "normal-early", "low"]);
    }

    #[test]
    fn test_due_date_breaks_priority_tie() {
        let ops = vec![
            make_op("no-due", JobPriority::Normal, None, 0),
            make_op("late", JobPriority::Normal, Some(28), 0),
            make_op("early", JobPriority::Normal, Some(21), 0),
        ];
        let ids = ordered_ids(&RuleEngine::production_default(), &ops);
        assert_eq!(ids, vec!["early", "late", "no-due"]);
    }

    #[test]
    fn test_sequence_then_id() {
        let ops = vec![
            make_op("b", JobPriority::Normal, Some(21), 2),
            make_op("c", JobPriority::Normal, Some(21), 1),
            make_op("a", JobPriority::Normal, Some(21), 2),
        ];
        let ids = ordered_ids(&RuleEngine::production_default(), &ops);
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_input_order_tie_breaker_is_stable() {
        let ops = vec![
            make_op("z", JobPriority::Normal, None, 0),
            make_op("a", JobPriority::Normal, None, 0),
        ];
        let engine = RuleEngine::new().with_rule(rules::Priority);
        assert_eq!(ordered_ids(&engine, &ops), vec!["z", "a"]);

        let engine = engine.with_final_tie_breaker(TieBreaker::ById);
        assert_eq!(ordered_ids(&engine, &ops), vec!["a", "z"]);
    }

    #[test]
    fn test_custom_chain() {
        let mut short = make_op("short", JobPriority::Low, None, 0);
        short.estimated_hours = 1.0;
        let long = make_op("long", JobPriority::Urgent, None, 0);
        let ops = vec![long, short];
        let engine = RuleEngine::new().with_rule(rules::Spt);
        assert_eq!(ordered_ids(&engine, &ops), vec!["short", "long"]);
    }

    #[test]
    fn test_empty_operations() {
        let engine = RuleEngine::production_default();
        assert!(engine.sort_indices(&[], &ctx()).is_empty());
    }

    #[test]
    fn test_evaluate_scores() {
        let op = make_op("o", JobPriority::High, Some(21), 3);
        let scores = RuleEngine::production_default().evaluate(&op, &ctx());
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], -2.0);
        assert_eq!(scores[2], 3.0);
    }

    #[test]
    fn test_debug_lists_rules() {
        let text = format!("{:?}", RuleEngine::production_default());
        assert!(text.contains("PRIORITY"));
        assert!(text.contains("EDD"));
        assert!(text.contains("ById"));
    }
}
