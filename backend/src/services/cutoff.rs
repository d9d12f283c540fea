//! Oversight cutoff guard.
//!
//! Compares the action's own effective date with the assignment's end and
//! cutoff dates. Wall-clock time is never consulted, so backfilled historical
//! actions are judged exactly like fresh ones.
//!
//! A cutoff, when present, replaces the end date as the last attributable
//! day: later than the end date it grants a grace period, earlier it is a
//! hard stop.

use chrono::NaiveDate;

use crate::error::ComplianceError;
use crate::models::assignment::Assignment;
use crate::types::AssignmentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffOutcome {
    /// The action date is within the assignment's window.
    Within,
    /// No assignment link; accepted but must be reconciled later.
    Unlinked,
}

/// Last day an action may be attributed to an assignment, if bounded.
pub fn last_attributable_date(
    end_date: Option<NaiveDate>,
    cutoff_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    cutoff_date.or(end_date)
}

/// Rejects `action_date` when it falls after the last attributable day.
pub fn check_cutoff(
    assignment_id: AssignmentId,
    end_date: Option<NaiveDate>,
    cutoff_date: Option<NaiveDate>,
    action_date: NaiveDate,
) -> Result<(), ComplianceError> {
    let limit = last_attributable_date(end_date, cutoff_date);
    if limit.is_some_and(|last| action_date > last) {
        return Err(ComplianceError::CutoffViolation {
            assignment_id,
            action_date,
            end_date,
            cutoff_date,
        });
    }
    Ok(())
}

/// Whether closing with `end_date`/`cutoff_date` keeps every existing
/// action, the latest dated `latest_action`, inside the window.
pub fn close_keeps_actions_attributable(
    end_date: NaiveDate,
    cutoff_date: Option<NaiveDate>,
    latest_action: Option<NaiveDate>,
) -> bool {
    match (last_attributable_date(Some(end_date), cutoff_date), latest_action) {
        (Some(last), Some(latest)) => latest <= last,
        _ => true,
    }
}

/// True when the action is dated before the assignment existed.
pub fn predates_assignment(assignment: &Assignment, action_date: NaiveDate) -> bool {
    action_date < assignment.start_date
}

pub fn validate_oversight_action(
    assignment: Option<&Assignment>,
    action_date: NaiveDate,
) -> Result<CutoffOutcome, ComplianceError> {
    match assignment {
        None => Ok(CutoffOutcome::Unlinked),
        Some(assignment) => {
            check_cutoff(
                assignment.id,
                assignment.end_date,
                assignment.cutoff_date,
                action_date,
            )?;
            Ok(CutoffOutcome::Within)
        }
    }
}
