//! Capacity enforcement for qualifier assignments.
//!
//! Counting happens inside the writing transaction after the qualifier row
//! has been locked with `SELECT ... FOR UPDATE`. Two writers for the same
//! qualifier therefore see each other's committed rows, never a stale count.

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::error::{ComplianceError, ConflictingBusiness};
use crate::models::assignment::AssignmentSlot;
use crate::models::justification::ComplianceJustification;
use crate::models::qualifier::Qualifier;
use crate::repositories::{AssignmentRepository, QualifierRepository};
use crate::services::overlap::DateRange;
use crate::types::{AssignmentId, LicensedBusinessId, QualifierId};

/// Proof that the qualifier row is locked in the current transaction.
///
/// Only [`lock_qualifier`] builds one, so the validator cannot be reached
/// through an unlocked read.
#[derive(Debug)]
pub struct QualifierLock {
    qualifier: Qualifier,
}

impl QualifierLock {
    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }
}

/// Requested assignment window for a (qualifier, business) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentProposal {
    pub qualifier_id: QualifierId,
    pub business_id: LicensedBusinessId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// The assignment being updated, which must not count against itself.
    pub exclude: Option<AssignmentId>,
}

impl AssignmentProposal {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Result of a successful admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Capacity was exceeded and a justification allowed the write.
    Overridden { current_count: i64, max_allowed: i32 },
}

/// Locks the qualifier row for the rest of the transaction.
pub async fn lock_qualifier(
    conn: &mut PgConnection,
    qualifier_id: QualifierId,
) -> Result<QualifierLock, ComplianceError> {
    let qualifier = QualifierRepository::new()
        .lock_for_update(conn, qualifier_id)
        .await?
        .ok_or_else(|| ComplianceError::NotFound("Qualifier not found".into()))?;
    Ok(QualifierLock { qualifier })
}

/// Pure decision over the qualifier's existing assignments.
///
/// The duplicate-open check runs first and is independent of capacity.
pub fn evaluate_capacity(
    max_allowed: i32,
    existing: &[AssignmentSlot],
    proposal: &AssignmentProposal,
) -> Result<(), ComplianceError> {
    let candidates = existing
        .iter()
        .filter(|slot| Some(slot.id) != proposal.exclude);

    if let Some(open) = candidates
        .clone()
        .find(|slot| slot.business_id == proposal.business_id && slot.end_date.is_none())
    {
        return Err(ComplianceError::DuplicateActiveRelationship {
            qualifier_id: proposal.qualifier_id,
            business_id: proposal.business_id,
            existing_assignment_id: Some(open.id),
        });
    }

    let range = proposal.range();
    let conflicting: Vec<ConflictingBusiness> = candidates
        .filter(|slot| slot.range().overlaps(&range))
        .map(|slot| ConflictingBusiness {
            assignment_id: slot.id,
            business_id: slot.business_id,
            business_code: slot.business_code.clone(),
            start_date: slot.start_date,
            end_date: slot.end_date,
        })
        .collect();

    let current_count = conflicting.len() as i64;
    if current_count >= i64::from(max_allowed) {
        return Err(ComplianceError::CapacityExceeded {
            current_count,
            max_allowed,
            conflicting,
        });
    }
    Ok(())
}

/// Highest number of slots active on any single day inside `window`.
///
/// Ranges are inclusive, so the peak is always reached on the first day of
/// some slot (clipped to the window start).
pub fn peak_concurrency(slots: &[AssignmentSlot], window: &DateRange) -> i64 {
    slots
        .iter()
        .filter(|slot| slot.range().overlaps(window))
        .map(|slot| slot.start_date.max(window.start))
        .map(|day| {
            let point = DateRange::new(day, Some(day));
            slots
                .iter()
                .filter(|slot| slot.range().overlaps(&point))
                .count() as i64
        })
        .max()
        .unwrap_or(0)
}

/// Checks the proposal against the locked qualifier's current rows.
pub async fn validate_assignment(
    conn: &mut PgConnection,
    lock: &QualifierLock,
    proposal: &AssignmentProposal,
) -> Result<(), ComplianceError> {
    let existing = AssignmentRepository::new()
        .slots_for_qualifier(&mut *conn, lock.qualifier.id, proposal.exclude)
        .await?;
    evaluate_capacity(lock.qualifier.max_licenses_allowed, &existing, proposal)
}

/// Like [`validate_assignment`], but lets a capacity-limit justification
/// through. A duplicate open relationship is never overridable.
pub async fn admit_assignment(
    conn: &mut PgConnection,
    lock: &QualifierLock,
    proposal: &AssignmentProposal,
    justification: Option<&ComplianceJustification>,
) -> Result<Admission, ComplianceError> {
    match (validate_assignment(conn, lock, proposal).await, justification) {
        (Ok(()), None) => Ok(Admission::Admitted),
        (Ok(()), Some(_)) => Err(ComplianceError::validation(
            "override_justification_id: not_required",
        )),
        (
            Err(ComplianceError::CapacityExceeded {
                current_count,
                max_allowed,
                ..
            }),
            Some(_),
        ) => Ok(Admission::Overridden {
            current_count,
            max_allowed,
        }),
        (Err(err), _) => Err(err),
    }
}
