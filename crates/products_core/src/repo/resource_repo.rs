//! Generic soft-delete repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide paginated reads and conditional mutations over one resource table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Read paths exclude `available = 0` only, so a row holding any other
//!   non-active value is decoded and rejected as `InvalidData`.
//! - `update_active` and `retire` run as a single immediate transaction whose
//!   `UPDATE` re-checks `available = 1`, so a concurrent retire cannot be
//!   overwritten.
//! - Active pages are ordered by `id ASC`; count and slice share one snapshot.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::resource::{FieldError, Resource, ResourceId, ResourcePatch, Visibility};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

const BOOKKEEPING_COLUMNS: &[&str] = &["id", "available", "created_at", "updated_at"];
const TOUCH_UPDATED_AT_SQL: &str = "updated_at = (strftime('%s', 'now') * 1000)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for resource persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(FieldError),
    Db(DbError),
    NotFound(ResourceId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FieldError> for RepoError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Active rows of one page plus the total active count.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSlice<T> {
    pub total: u64,
    pub items: Vec<T>,
}

/// Persistence port for one soft-deletable resource type.
pub trait ResourceRepository<T: Resource> {
    /// Inserts a new active row and returns it as stored.
    fn insert(&self, fields: &T::Fields) -> RepoResult<T>;
    /// Counts all active rows and reads one `id ASC` slice of them.
    fn page_active(&self, limit: u32, offset: u64) -> RepoResult<ActiveSlice<T>>;
    /// Gets one active row by id.
    fn find_active(&self, id: ResourceId) -> RepoResult<Option<T>>;
    /// Merges the patch into an active row. `NotFound` when no active row matches.
    fn update_active(&self, id: ResourceId, patch: &T::Patch) -> RepoResult<T>;
    /// Flips an active row to retired. `NotFound` when no active row matches.
    fn retire(&self, id: ResourceId) -> RepoResult<T>;
}

/// Table mapping for a resource stored by [`SqliteResourceRepository`].
pub trait SqlResource: Resource {
    const TABLE: &'static str;
    /// Payload columns, excluding `id`, `available` and timestamps.
    const PAYLOAD_COLUMNS: &'static [&'static str];

    /// Decodes one row selected with `id`, payload columns, `available`,
    /// `created_at` and `updated_at`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Column/value pairs written on insert.
    fn insert_values(fields: &Self::Fields) -> Vec<(&'static str, Value)>;

    /// Column/value pairs for the fields present in a patch.
    fn patch_values(patch: &Self::Patch) -> Vec<(&'static str, Value)>;
}

/// SQLite-backed soft-delete repository for any [`SqlResource`].
pub struct SqliteResourceRepository<'conn, T> {
    conn: &'conn Connection,
    _resource: PhantomData<fn() -> T>,
}

impl<'conn, T: SqlResource> SqliteResourceRepository<'conn, T> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version < expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        if !table_exists(conn, T::TABLE)? {
            return Err(RepoError::MissingRequiredTable(T::TABLE));
        }
        for column in BOOKKEEPING_COLUMNS.iter().chain(T::PAYLOAD_COLUMNS) {
            if !table_has_column(conn, T::TABLE, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: T::TABLE,
                    column: *column,
                });
            }
        }

        Ok(Self {
            conn,
            _resource: PhantomData,
        })
    }

    fn begin_write(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl<T: SqlResource> ResourceRepository<T> for SqliteResourceRepository<'_, T> {
    fn insert(&self, fields: &T::Fields) -> RepoResult<T> {
        T::validate_fields(fields)?;

        let values = T::insert_values(fields);
        let sql = if values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES;", T::TABLE)
        } else {
            let columns = values
                .iter()
                .map(|(column, _)| *column)
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = (1..=values.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("INSERT INTO {} ({columns}) VALUES ({placeholders});", T::TABLE)
        };

        let tx = self.begin_write()?;
        tx.execute(&sql, params_from_iter(values.into_iter().map(|(_, value)| value)))?;
        let id = tx.last_insert_rowid();
        let stored = select_one::<T>(&tx, id, false)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted row {id} missing from {}", T::TABLE))
        })?;
        tx.commit()?;

        Ok(stored)
    }

    fn page_active(&self, limit: u32, offset: u64) -> RepoResult<ActiveSlice<T>> {
        let tx = self.conn.unchecked_transaction()?;

        let count: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE available <> 0;", T::TABLE),
            [],
            |row| row.get(0),
        )?;
        let total = u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))?;

        let items = {
            let mut stmt = tx.prepare(&format!(
                "{} WHERE available <> 0 ORDER BY id ASC LIMIT ?1 OFFSET ?2;",
                select_sql::<T>()
            ))?;
            let offset = i64::try_from(offset).unwrap_or(i64::MAX);
            let mut rows = stmt.query(params![i64::from(limit), offset])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(T::from_row(row)?);
            }
            items
        };
        tx.commit()?;

        Ok(ActiveSlice { total, items })
    }

    fn find_active(&self, id: ResourceId) -> RepoResult<Option<T>> {
        select_one::<T>(self.conn, id, true)
    }

    fn update_active(&self, id: ResourceId, patch: &T::Patch) -> RepoResult<T> {
        T::validate_patch(patch)?;
        if patch.is_empty() {
            return self.find_active(id)?.ok_or(RepoError::NotFound(id));
        }

        let mut sql = format!("UPDATE {} SET {TOUCH_UPDATED_AT_SQL}", T::TABLE);
        let mut bind_values: Vec<Value> = Vec::new();
        for (column, value) in T::patch_values(patch) {
            sql.push_str(&format!(", {column} = ?"));
            bind_values.push(value);
        }
        sql.push_str(" WHERE id = ? AND available = 1;");
        bind_values.push(Value::Integer(id));

        let tx = self.begin_write()?;
        if tx.execute(&sql, params_from_iter(bind_values))? == 0 {
            return Err(RepoError::NotFound(id));
        }
        let updated = select_one::<T>(&tx, id, false)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        Ok(updated)
    }

    fn retire(&self, id: ResourceId) -> RepoResult<T> {
        let tx = self.begin_write()?;
        let changed = tx.execute(
            &format!(
                "UPDATE {} SET available = 0, {TOUCH_UPDATED_AT_SQL} WHERE id = ?1 AND available = 1;",
                T::TABLE
            ),
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        let retired = select_one::<T>(&tx, id, false)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        Ok(retired)
    }
}

/// Decodes the `available` column into a visibility tag.
pub fn visibility_from_row(row: &Row<'_>, table: &str) -> RepoResult<Visibility> {
    match row.get::<_, i64>("available")? {
        1 => Ok(Visibility::Active),
        0 => Ok(Visibility::Retired),
        other => Err(RepoError::InvalidData(format!(
            "invalid available value `{other}` in {table}.available"
        ))),
    }
}

fn select_sql<T: SqlResource>() -> String {
    format!(
        "SELECT id, {}, available, created_at, updated_at FROM {}",
        T::PAYLOAD_COLUMNS.join(", "),
        T::TABLE
    )
}

fn select_one<T: SqlResource>(
    conn: &Connection,
    id: ResourceId,
    active_only: bool,
) -> RepoResult<Option<T>> {
    let filter = if active_only { " AND available <> 0" } else { "" };
    let mut stmt = conn.prepare(&format!("{} WHERE id = ?1{filter};", select_sql::<T>()))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(T::from_row(row)?));
    }
    Ok(None)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
