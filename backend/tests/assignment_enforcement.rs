use compliance_backend::{
    error::ComplianceError,
    models::assignment::{CloseAssignmentPayload, RelationshipKind, UpdateAssignmentPayload},
    models::justification::OverrideRule,
};
use tokio::task::JoinSet;

mod support;

use support::{
    assign_payload, date, fresh_pool, integration_guard, registry, relationships, seed_assignment,
    seed_business, seed_justification, seed_qualifier,
};

#[tokio::test]
async fn third_open_assignment_exceeds_default_capacity() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 2).await;
    let a = seed_business(&pool, "Alder Construction").await;
    let b = seed_business(&pool, "Birch Builders").await;
    let c = seed_business(&pool, "Cedar Homes").await;
    seed_assignment(&pool, qualifier.id, a.id, date(2024, 1, 1), None).await;
    seed_assignment(&pool, qualifier.id, b.id, date(2024, 6, 1), None).await;

    let err = relationships(&pool)
        .assign_qualifier(assign_payload(qualifier.id, c.id, date(2024, 7, 1), None))
        .await
        .expect_err("third assignment must be rejected");

    match err {
        ComplianceError::CapacityExceeded {
            current_count,
            max_allowed,
            conflicting,
        } => {
            assert_eq!(current_count, 2);
            assert_eq!(max_allowed, 2);
            let mut ids: Vec<_> = conflicting.iter().map(|c| c.business_id).collect();
            ids.sort();
            let mut expected = vec![a.id, b.id];
            expected.sort();
            assert_eq!(ids, expected);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let stored = relationships(&pool)
        .list_for_business(c.id, false)
        .await
        .expect("list business assignments");
    assert!(stored.is_empty());
}

#[tokio::test]
async fn reassigning_open_pair_is_duplicate_regardless_of_capacity() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 10).await;
    let a = seed_business(&pool, "Alder Construction").await;
    let existing = seed_assignment(&pool, qualifier.id, a.id, date(2024, 1, 1), None).await;

    let err = relationships(&pool)
        .assign_qualifier(assign_payload(qualifier.id, a.id, date(2024, 9, 1), None))
        .await
        .expect_err("duplicate must be rejected");
    match err {
        ComplianceError::DuplicateActiveRelationship {
            existing_assignment_id,
            ..
        } => assert_eq!(existing_assignment_id, Some(existing.id)),
        other => panic!("unexpected error: {:?}", other),
    }

    // Closing the prior row frees the pair.
    relationships(&pool)
        .close_assignment(
            existing.id,
            CloseAssignmentPayload {
                end_date: date(2024, 8, 31),
                cutoff_date: None,
            },
        )
        .await
        .expect("close assignment");
    let renewed = seed_assignment(&pool, qualifier.id, a.id, date(2024, 9, 1), None).await;
    assert!(renewed.is_open());
}

#[tokio::test]
async fn concurrent_assignments_never_exceed_capacity() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let max_allowed = 3;
    let qualifier = seed_qualifier(&pool, max_allowed).await;
    let mut businesses = Vec::new();
    for i in 0..10 {
        businesses.push(seed_business(&pool, &format!("Contractor {}", i)).await);
    }

    let mut tasks = JoinSet::new();
    for business in &businesses {
        let store = relationships(&pool);
        let payload = assign_payload(qualifier.id, business.id, date(2024, 3, 1), None);
        tasks.spawn(async move { store.assign_qualifier(payload).await });
    }

    let mut admitted = 0;
    let mut rejected = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("task panicked") {
            Ok(_) => admitted += 1,
            Err(ComplianceError::CapacityExceeded { max_allowed: max, .. }) => {
                assert_eq!(max, max_allowed);
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(admitted, max_allowed as usize);
    assert_eq!(rejected, businesses.len() - max_allowed as usize);

    let open = relationships(&pool)
        .list_for_qualifier(qualifier.id, true)
        .await
        .expect("list open");
    assert_eq!(open.len(), max_allowed as usize);
}

#[tokio::test]
async fn non_overlapping_windows_share_a_single_slot() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 1).await;
    let a = seed_business(&pool, "Alder Construction").await;
    let b = seed_business(&pool, "Birch Builders").await;
    seed_assignment(&pool, qualifier.id, a.id, date(2024, 1, 1), Some(date(2024, 6, 30))).await;

    // Touching on the end date counts as overlap.
    let touching = relationships(&pool)
        .assign_qualifier(assign_payload(qualifier.id, b.id, date(2024, 6, 30), None))
        .await;
    assert!(matches!(
        touching,
        Err(ComplianceError::CapacityExceeded { current_count: 1, .. })
    ));

    let after = seed_assignment(&pool, qualifier.id, b.id, date(2024, 7, 1), None).await;
    assert_eq!(after.start_date, date(2024, 7, 1));
}

#[tokio::test]
async fn assignment_requires_active_parties_and_ordered_dates() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 2).await;
    let business = seed_business(&pool, "Alder Construction").await;

    let mut backwards = assign_payload(qualifier.id, business.id, date(2024, 6, 1), None);
    backwards.end_date = Some(date(2024, 5, 1));
    assert!(matches!(
        relationships(&pool).assign_qualifier(backwards).await,
        Err(ComplianceError::Validation(_))
    ));

    let missing = seed_business(&pool, "Birch Builders").await;
    registry(&pool)
        .deactivate_business(missing.id)
        .await
        .expect("deactivate business");
    assert!(matches!(
        relationships(&pool)
            .assign_qualifier(assign_payload(qualifier.id, missing.id, date(2024, 6, 1), None))
            .await,
        Err(ComplianceError::InvalidTransition(_))
    ));

    let unknown = assign_payload(
        compliance_backend::types::QualifierId::new(),
        business.id,
        date(2024, 6, 1),
        None,
    );
    assert!(matches!(
        relationships(&pool).assign_qualifier(unknown).await,
        Err(ComplianceError::NotFound(_))
    ));
}

#[tokio::test]
async fn close_assignment_enforces_transitions() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 2).await;
    let business = seed_business(&pool, "Alder Construction").await;
    let assignment =
        seed_assignment(&pool, qualifier.id, business.id, date(2024, 3, 1), None).await;
    assert!(assignment.assignment_code.starts_with("ASN-"));

    let store = relationships(&pool);
    let early = store
        .close_assignment(
            assignment.id,
            CloseAssignmentPayload {
                end_date: date(2024, 2, 28),
                cutoff_date: None,
            },
        )
        .await;
    assert!(matches!(early, Err(ComplianceError::InvalidTransition(_))));

    let closed = store
        .close_assignment(
            assignment.id,
            CloseAssignmentPayload {
                end_date: date(2025, 1, 1),
                cutoff_date: Some(date(2025, 1, 15)),
            },
        )
        .await
        .expect("close assignment");
    assert_eq!(closed.end_date, Some(date(2025, 1, 1)));
    assert_eq!(closed.cutoff_date, Some(date(2025, 1, 15)));

    let again = store
        .close_assignment(
            assignment.id,
            CloseAssignmentPayload {
                end_date: date(2025, 2, 1),
                cutoff_date: None,
            },
        )
        .await;
    assert!(matches!(again, Err(ComplianceError::InvalidTransition(_))));

    let frozen = store
        .update_assignment(
            assignment.id,
            UpdateAssignmentPayload {
                notes: Some("late edit".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(frozen, Err(ComplianceError::InvalidTransition(_))));

    let reloaded = store.get_assignment(assignment.id).await.expect("reload");
    assert_eq!(reloaded.end_date, Some(date(2025, 1, 1)));
    assert_eq!(reloaded.cutoff_date, Some(date(2025, 1, 15)));
}

#[tokio::test]
async fn update_revalidates_capacity_without_counting_itself() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 1).await;
    let a = seed_business(&pool, "Alder Construction").await;
    let b = seed_business(&pool, "Birch Builders").await;
    seed_assignment(&pool, qualifier.id, a.id, date(2024, 1, 1), Some(date(2024, 3, 31))).await;
    let second = seed_assignment(&pool, qualifier.id, b.id, date(2024, 4, 1), None).await;

    let store = relationships(&pool);
    let moved = store
        .update_assignment(
            second.id,
            UpdateAssignmentPayload {
                start_date: Some(date(2024, 4, 15)),
                relationship_kind: Some(RelationshipKind::Secondary),
                notes: Some("moved after permit delay".into()),
            },
        )
        .await
        .expect("shrinking the window stays within capacity");
    assert_eq!(moved.start_date, date(2024, 4, 15));
    assert_eq!(moved.relationship_kind, RelationshipKind::Secondary);

    let widened = store
        .update_assignment(
            second.id,
            UpdateAssignmentPayload {
                start_date: Some(date(2024, 3, 1)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        widened,
        Err(ComplianceError::CapacityExceeded { current_count: 1, .. })
    ));
}

#[tokio::test]
async fn capacity_override_admits_and_is_recorded() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 1).await;
    let a = seed_business(&pool, "Alder Construction").await;
    let b = seed_business(&pool, "Birch Builders").await;
    seed_assignment(&pool, qualifier.id, a.id, date(2024, 1, 1), None).await;

    let justification = seed_justification(&pool, OverrideRule::CapacityLimit).await;
    let mut payload = assign_payload(qualifier.id, b.id, date(2024, 2, 1), None);
    payload.override_justification_id = Some(justification.id);
    let overridden = relationships(&pool)
        .assign_qualifier(payload)
        .await
        .expect("override admits assignment");
    assert_eq!(overridden.override_justification_id, Some(justification.id));

    // The overridden row can still be edited as long as it does not grow.
    let edited = relationships(&pool)
        .update_assignment(
            overridden.id,
            UpdateAssignmentPayload {
                notes: Some("renewal filed".into()),
                ..Default::default()
            },
        )
        .await
        .expect("edit overridden assignment");
    assert_eq!(edited.notes.as_deref(), Some("renewal filed"));

    let capacity = relationships(&pool)
        .get_qualifier_capacity(qualifier.id)
        .await
        .expect("capacity");
    assert_eq!(capacity.current_count, 2);
    assert_eq!(capacity.available_slots, 0);
    assert!(capacity.at_capacity);
}

#[tokio::test]
async fn capacity_report_counts_current_and_future_assignments() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = seed_qualifier(&pool, 3).await;
    let past = seed_business(&pool, "Alder Construction").await;
    let current = seed_business(&pool, "Birch Builders").await;
    let future = seed_business(&pool, "Cedar Homes").await;
    seed_assignment(&pool, qualifier.id, past.id, date(2020, 1, 1), Some(date(2020, 12, 31))).await;
    seed_assignment(&pool, qualifier.id, current.id, date(2021, 1, 1), None).await;
    seed_assignment(&pool, qualifier.id, future.id, date(2099, 1, 1), None).await;

    let capacity = relationships(&pool)
        .get_qualifier_capacity(qualifier.id)
        .await
        .expect("capacity");
    assert_eq!(capacity.current_count, 2);
    assert_eq!(capacity.max_allowed, 3);
    assert_eq!(capacity.available_slots, 1);
    assert!(!capacity.at_capacity);
    let mut codes: Vec<_> = capacity
        .active_businesses
        .iter()
        .map(|b| b.business_id)
        .collect();
    codes.sort();
    let mut expected = vec![current.id, future.id];
    expected.sort();
    assert_eq!(codes, expected);
}
