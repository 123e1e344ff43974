//! `SQLite` implementation of [`StateRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use dsbridge_app::ports::StateRepository;
use dsbridge_domain::entity::EntityState;
use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::id::EntityId;
use dsbridge_domain::time::{Timestamp, parse_rfc3339};

use crate::error::StorageError;

/// A persisted entity state row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredState {
    pub entity_id: EntityId,
    pub state: EntityState,
    pub last_changed: Timestamp,
}

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(StoredState);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let entity_id: String = row.try_get("entity_id")?;
        let state: String = row.try_get("state")?;
        let last_changed: String = row.try_get("last_changed")?;

        let state =
            EntityState::from_str(&state).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_changed =
            parse_rfc3339(&last_changed).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(StoredState {
            entity_id: EntityId::new(entity_id),
            state,
            last_changed,
        }))
    }
}

const SELECT_BY_ID: &str =
    "SELECT entity_id, state, last_changed FROM entity_states WHERE entity_id = ?";

const UPSERT: &str = r"
    INSERT INTO entity_states (entity_id, state, last_changed)
    VALUES (?, ?, ?)
    ON CONFLICT (entity_id) DO UPDATE
    SET state = excluded.state, last_changed = excluded.last_changed
";

/// `SQLite`-backed state store.
pub struct SqliteStateRepository {
    pool: SqlitePool,
}

impl SqliteStateRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the full stored row of an entity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the query fails or the row is corrupt.
    pub async fn get(&self, id: &EntityId) -> Result<Option<StoredState>, StorageError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|wrapper| wrapper.0))
    }
}

impl StateRepository for SqliteStateRepository {
    async fn load(&self, id: &EntityId) -> Result<Option<EntityState>, DsBridgeError> {
        let stored = self.get(id).await?;
        Ok(stored.map(|row| row.state))
    }

    async fn save(
        &self,
        id: &EntityId,
        state: EntityState,
        changed_at: Timestamp,
    ) -> Result<(), DsBridgeError> {
        sqlx::query(UPSERT)
            .bind(id.as_str())
            .bind(state.to_string())
            .bind(changed_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
