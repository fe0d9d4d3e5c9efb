//! Assignment record store.
//!
//! Handlers depend on the [`AssignmentStore`] trait, never on a concrete
//! database client; [`PgStore`] is the production adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Assignment, NewAssignment};
use crate::Result;

/// Filter for listing assignments. Results are always newest-first by
/// submission time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentFilter {
    pub hidden: Option<bool>,
    pub scheduled: Option<bool>,
    pub limit: Option<i64>,
}

/// Persistence operations over assignment records.
///
/// A single record update is atomic; nothing stronger is promised across
/// records, so a `list_all` followed by a flag update can race with a
/// concurrent writer (last write wins).
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Persist a new assignment under a freshly assigned id.
    async fn insert(&self, new: NewAssignment) -> Result<Assignment>;

    /// Persist a batch of new assignments in input order.
    async fn insert_batch(&self, batch: Vec<NewAssignment>) -> Result<Vec<Assignment>>;

    /// Look up a single assignment by id.
    async fn find(&self, id: Uuid) -> Result<Option<Assignment>>;

    /// List assignments matching the filter, newest-first.
    async fn list(&self, filter: AssignmentFilter) -> Result<Vec<Assignment>>;

    /// Every assignment, unfiltered and unwindowed. Reconciliation treats
    /// all of them as match targets.
    async fn list_all(&self) -> Result<Vec<Assignment>>;

    /// Set the scheduled flag, touching no other field. Returns the
    /// updated record, or `None` for an unknown id.
    async fn set_scheduled(&self, id: Uuid, scheduled: bool) -> Result<Option<Assignment>>;

    /// Set the hidden flag, touching no other field. Returns the updated
    /// record, or `None` for an unknown id.
    async fn set_hidden(&self, id: Uuid, hidden: bool) -> Result<Option<Assignment>>;
}

/// Row shape shared by every assignment query.
type AssignmentRow = (Uuid, String, String, DateTime<Utc>, bool, bool);

fn from_row((id, agent, address, submitted_on, scheduled, hidden): AssignmentRow) -> Assignment {
    Assignment {
        id,
        agent,
        address,
        submitted_on,
        scheduled,
        hidden,
    }
}

const COLUMNS: &str = r#"id, agent, address, "submittedOn", scheduled, hidden"#;

/// Postgres-backed store over the `assignments` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for PgStore {
    async fn insert(&self, new: NewAssignment) -> Result<Assignment> {
        let id = Uuid::new_v4();
        let row: AssignmentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO assignments (id, agent, address, "submittedOn", scheduled, hidden)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&new.agent)
        .bind(&new.address)
        .bind(new.submitted_on)
        .bind(new.scheduled)
        .bind(new.hidden)
        .fetch_one(&self.pool)
        .await?;

        debug!(%id, "inserted assignment");
        Ok(from_row(row))
    }

    async fn insert_batch(&self, batch: Vec<NewAssignment>) -> Result<Vec<Assignment>> {
        let mut created = Vec::with_capacity(batch.len());
        for new in batch {
            created.push(self.insert(new).await?);
        }
        Ok(created)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Assignment>> {
        let row: Option<AssignmentRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM assignments WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(from_row))
    }

    async fn list(&self, filter: AssignmentFilter) -> Result<Vec<Assignment>> {
        // Flag filters and the limit are interpolated as bool/int literals.
        let mut conditions = Vec::new();
        if let Some(hidden) = filter.hidden {
            conditions.push(format!("hidden = {}", hidden));
        }
        if let Some(scheduled) = filter.scheduled {
            conditions.push(format!("scheduled = {}", scheduled));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit_clause = filter
            .limit
            .map(|limit| format!("LIMIT {}", limit))
            .unwrap_or_default();

        let rows: Vec<AssignmentRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS}
            FROM assignments
            {where_clause}
            ORDER BY "submittedOn" DESC
            {limit_clause}
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn list_all(&self) -> Result<Vec<Assignment>> {
        let rows: Vec<AssignmentRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM assignments"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn set_scheduled(&self, id: Uuid, scheduled: bool) -> Result<Option<Assignment>> {
        let row: Option<AssignmentRow> = sqlx::query_as(&format!(
            "UPDATE assignments SET scheduled = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(scheduled)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(from_row))
    }

    async fn set_hidden(&self, id: Uuid, hidden: bool) -> Result<Option<Assignment>> {
        let row: Option<AssignmentRow> = sqlx::query_as(&format!(
            "UPDATE assignments SET hidden = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(hidden)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(from_row))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store for handler-level tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        records: Mutex<Vec<Assignment>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn seeded(batch: Vec<NewAssignment>) -> Self {
            let store = Self::new();
            store.insert_batch(batch).await.unwrap();
            store
        }
    }

    #[async_trait]
    impl AssignmentStore for MemoryStore {
        async fn insert(&self, new: NewAssignment) -> Result<Assignment> {
            let assignment = Assignment {
                id: Uuid::new_v4(),
                agent: new.agent,
                address: new.address,
                submitted_on: new.submitted_on,
                scheduled: new.scheduled,
                hidden: new.hidden,
            };
            self.records.lock().unwrap().push(assignment.clone());
            Ok(assignment)
        }

        async fn insert_batch(&self, batch: Vec<NewAssignment>) -> Result<Vec<Assignment>> {
            let mut created = Vec::with_capacity(batch.len());
            for new in batch {
                created.push(self.insert(new).await?);
            }
            Ok(created)
        }

        async fn find(&self, id: Uuid) -> Result<Option<Assignment>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned())
        }

        async fn list(&self, filter: AssignmentFilter) -> Result<Vec<Assignment>> {
            let mut matching: Vec<Assignment> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|a| filter.hidden.map_or(true, |hidden| a.hidden == hidden))
                .filter(|a| filter.scheduled.map_or(true, |s| a.scheduled == s))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.submitted_on.cmp(&a.submitted_on));
            if let Some(limit) = filter.limit {
                matching.truncate(limit as usize);
            }
            Ok(matching)
        }

        async fn list_all(&self) -> Result<Vec<Assignment>> {
            Ok(self.records.lock().unwrap().clone())
        }

        async fn set_scheduled(&self, id: Uuid, scheduled: bool) -> Result<Option<Assignment>> {
            let mut records = self.records.lock().unwrap();
            Ok(records.iter_mut().find(|a| a.id == id).map(|a| {
                a.scheduled = scheduled;
                a.clone()
            }))
        }

        async fn set_hidden(&self, id: Uuid, hidden: bool) -> Result<Option<Assignment>> {
            let mut records = self.records.lock().unwrap();
            Ok(records.iter_mut().find(|a| a.id == id).map(|a| {
                a.hidden = hidden;
                a.clone()
            }))
        }
    }
}
