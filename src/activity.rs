use diesel::prelude::*;
use diesel::PgConnection;
use tracing::warn;
use uuid::Uuid;

use crate::models::NewActivityLog;
use crate::schema::activity_logs;

/// Appends an audit-trail entry. Best effort: a failed insert is logged and
/// swallowed so it can never mask the primary operation's outcome.
pub fn record(
    conn: &mut PgConnection,
    actor: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: Option<Uuid>,
    details: Option<String>,
) {
    let entry = NewActivityLog {
        id: Uuid::new_v4(),
        user_id: actor,
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id,
        details,
    };

    if let Err(err) = diesel::insert_into(activity_logs::table)
        .values(&entry)
        .execute(conn)
    {
        warn!(error = %err, action, entity_type, "failed to append activity log entry");
    }
}
