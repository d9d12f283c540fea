use chrono::NaiveDate;
use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder};

use crate::models::oversight_action::{OversightAction, OversightActionFilters};
use crate::repositories::common::push_clause;
use crate::types::{AssignmentId, OversightActionId};

const SELECT_COLUMNS: &str = "id, action_code, project_id, business_id, qualifier_id, assignment_id, \
     action_type, action_date, duration_minutes, location, attendees, photos, notes, \
     needs_reconciliation, override_justification_id, created_by, created_at";

pub async fn insert_oversight_action(
    conn: &mut PgConnection,
    action: &OversightAction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO oversight_actions \
         (id, action_code, project_id, business_id, qualifier_id, assignment_id, action_type, \
         action_date, duration_minutes, location, attendees, photos, notes, needs_reconciliation, \
         override_justification_id, created_by, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(action.id)
    .bind(&action.action_code)
    .bind(action.project_id)
    .bind(action.business_id)
    .bind(action.qualifier_id)
    .bind(action.assignment_id)
    .bind(action.action_type)
    .bind(action.action_date)
    .bind(action.duration_minutes)
    .bind(&action.location)
    .bind(&action.attendees)
    .bind(&action.photos)
    .bind(&action.notes)
    .bind(action.needs_reconciliation)
    .bind(action.override_justification_id)
    .bind(action.created_by)
    .bind(action.created_at)
    .execute(conn)
    .await
    .map(|_| ())
}

pub async fn fetch_oversight_action<'e, E>(
    db: E,
    id: OversightActionId,
) -> Result<Option<OversightAction>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("SELECT {} FROM oversight_actions WHERE id = $1", SELECT_COLUMNS);
    sqlx::query_as::<_, OversightAction>(&query)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn count_for_assignment<'e, E>(
    db: E,
    assignment_id: AssignmentId,
) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM oversight_actions WHERE assignment_id = $1")
        .bind(assignment_id)
        .fetch_one(db)
        .await
}

/// Latest action date attributed to the assignment under the normal cutoff
/// rule. Actions admitted through an override are already past the limit.
pub async fn latest_attributed_action_date<'e, E>(
    db: E,
    assignment_id: AssignmentId,
) -> Result<Option<NaiveDate>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, Option<NaiveDate>>(
        "SELECT MAX(action_date) FROM oversight_actions \
         WHERE assignment_id = $1 AND override_justification_id IS NULL",
    )
    .bind(assignment_id)
    .fetch_one(db)
    .await
}

pub async fn list_oversight_actions<'e, E>(
    db: E,
    filters: &OversightActionFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<OversightAction>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM oversight_actions", SELECT_COLUMNS));
    let mut has_clause = false;
    apply_filters(&mut builder, &mut has_clause, filters);
    builder
        .push(" ORDER BY action_date DESC, action_code DESC")
        .push(" LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    builder
        .build_query_as::<OversightAction>()
        .fetch_all(db)
        .await
}

pub async fn count_oversight_actions<'e, E>(
    db: E,
    filters: &OversightActionFilters,
) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM oversight_actions");
    let mut has_clause = false;
    apply_filters(&mut builder, &mut has_clause, filters);
    builder.build_query_scalar::<i64>().fetch_one(db).await
}

fn apply_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    has_clause: &mut bool,
    filters: &OversightActionFilters,
) {
    if let Some(qualifier_id) = filters.qualifier_id {
        push_clause(builder, has_clause);
        builder.push("qualifier_id = ").push_bind(qualifier_id);
    }
    if let Some(business_id) = filters.business_id {
        push_clause(builder, has_clause);
        builder.push("business_id = ").push_bind(business_id);
    }
    if let Some(assignment_id) = filters.assignment_id {
        push_clause(builder, has_clause);
        builder.push("assignment_id = ").push_bind(assignment_id);
    }
    if let Some(project_id) = filters.project_id {
        push_clause(builder, has_clause);
        builder.push("project_id = ").push_bind(project_id);
    }
    if let Some(from) = filters.from {
        push_clause(builder, has_clause);
        builder.push("action_date >= ").push_bind(from);
    }
    if let Some(to) = filters.to {
        push_clause(builder, has_clause);
        builder.push("action_date <= ").push_bind(to);
    }
    if filters.unreconciled_only {
        push_clause(builder, has_clause);
        builder.push("needs_reconciliation = TRUE");
    }
}
