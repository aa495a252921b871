//! Input validation for scheduling runs.
//!
//! Checks structural integrity of operations and cells before scheduling.
//! Detects:
//! - Duplicate IDs
//! - Operations routed to cells that don't exist
//! - Negative or non-finite estimated hours
//!
//! None of these abort a run: the engine skips the affected operations and
//! flags them unscheduled. `validate_input` lets callers surface every
//! problem up front.

use std::collections::HashSet;

use crate::models::{Cell, Operation, UnscheduledReason};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending entity id.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An operation references a cell that doesn't exist.
    UnknownCell,
    /// Estimated hours are negative, NaN or infinite.
    InvalidEstimate,
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// Validates the operations and cells of a scheduling run.
///
/// Checks:
/// 1. No duplicate cell IDs
/// 2. No duplicate operation IDs
/// 3. Every eligible operation's cell exists
/// 4. Every eligible operation has a finite, non-negative estimate
///
/// Completed and cancelled operations are exempt from checks 3–4.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(operations: &[Operation], cells: &[Cell]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut cell_ids = HashSet::new();
    for cell in cells {
        if !cell_ids.insert(cell.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &cell.id,
                format!("Duplicate cell ID: {}", cell.id),
            ));
        }
    }

    let mut operation_ids = HashSet::new();
    for op in operations {
        if !operation_ids.insert(op.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &op.id,
                format!("Duplicate operation ID: {}", op.id),
            ));
        }
        if !op.is_eligible() {
            continue;
        }
        if let Some(reason) = operation_issue(op, &cell_ids) {
            let kind = match reason {
                UnscheduledReason::UnknownCell { .. } => ValidationErrorKind::UnknownCell,
                _ => ValidationErrorKind::InvalidEstimate,
            };
            errors.push(ValidationError::new(
                kind,
                &op.id,
                format!("Operation '{}': {}", op.id, reason.message()),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Per-operation check shared with the engine.
pub(crate) fn operation_issue(
    operation: &Operation,
    cell_ids: &HashSet<&str>,
) -> Option<UnscheduledReason> {
    if !cell_ids.contains(operation.cell_id.as_str()) {
        return Some(UnscheduledReason::UnknownCell {
            cell_id: operation.cell_id.clone(),
        });
    }
    if !operation.estimated_hours.is_finite() || operation.estimated_hours < 0.0 {
        return Some(UnscheduledReason::InvalidEstimate {
            estimated_hours: operation.estimated_hours,
        });
    }
    None
}
