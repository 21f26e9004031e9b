//! Record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `records` storage.
//! - Own attribute-row replacement logic with atomic semantics.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `IdentityRecord::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Attribute rows are written with contiguous `position` values starting
//!   at zero and are read back in that order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::attribute::AttributeRow;
use crate::model::record::{
    parse_record_kind, IdentityRecord, RecordKind, RecordValidationError,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    kind,
    enabled,
    created_at,
    expires_at
FROM records";

const RECORDS_DEFAULT_LIMIT: u32 = 20;
const RECORDS_LIMIT_MAX: u32 = 100;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    NotFound(String),
    DuplicateRecord(String),
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
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateRecord(id) => write!(f, "record already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column: {table}.{column}")
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

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
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

/// Query options for listing records.
#[derive(Debug, Clone, Default)]
pub struct RecordListQuery {
    pub kind: Option<RecordKind>,
    pub include_disabled: bool,
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for record CRUD and attribute-row replacement.
pub trait RecordRepository {
    /// Persists a new record together with its attribute rows.
    fn create_record(&mut self, record: &IdentityRecord) -> RepoResult<()>;
    /// Updates the mutable envelope fields (`enabled`, `expires_at`).
    fn update_record(&self, record: &IdentityRecord) -> RepoResult<()>;
    /// Gets one record by id, attribute rows included.
    fn get_record(&self, id: &str) -> RepoResult<Option<IdentityRecord>>;
    /// Lists records using kind filter + pagination.
    fn list_records(&self, query: &RecordListQuery) -> RepoResult<Vec<IdentityRecord>>;
    /// Replaces all attribute rows of a record in one transaction.
    fn replace_attribute_rows(&mut self, id: &str, rows: &[AttributeRow]) -> RepoResult<()>;
    /// Hard-deletes a record; its attribute rows go with it.
    fn delete_record(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_record_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn create_record(&mut self, record: &IdentityRecord) -> RepoResult<()> {
        record.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if record_exists(&tx, record.id())? {
            return Err(RepoError::DuplicateRecord(record.id().to_string()));
        }

        tx.execute(
            "INSERT INTO records (id, kind, enabled, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.id(),
                record.kind().as_str(),
                bool_to_int(record.enabled),
                record.created_at,
                record.expires_at,
            ],
        )?;
        insert_attribute_rows(&tx, record.id(), record.attribute_rows())?;

        tx.commit()?;
        Ok(())
    }

    fn update_record(&self, record: &IdentityRecord) -> RepoResult<()> {
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE records
             SET
                enabled = ?2,
                expires_at = ?3
             WHERE id = ?1;",
            params![
                record.id(),
                bool_to_int(record.enabled),
                record.expires_at,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(record.id().to_string()));
        }

        Ok(())
    }

    fn get_record(&self, id: &str) -> RepoResult<Option<IdentityRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let envelope = parse_record_envelope(row)?;
            return Ok(Some(hydrate_record(self.conn, envelope)?));
        }

        Ok(None)
    }

    fn list_records(&self, query: &RecordListQuery) -> RepoResult<Vec<IdentityRecord>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_disabled {
            sql.push_str(" AND enabled = 1");
        }

        if let Some(kind) = query.kind {
            sql.push_str(" AND kind = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, id ASC");
        let limit = normalize_record_limit(query.limit);
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let envelope = parse_record_envelope(row)?;
            records.push(hydrate_record(self.conn, envelope)?);
        }

        Ok(records)
    }

    fn replace_attribute_rows(&mut self, id: &str, rows: &[AttributeRow]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !record_exists(&tx, id)? {
            return Err(RepoError::NotFound(id.to_string()));
        }

        tx.execute("DELETE FROM record_attributes WHERE record_id = ?1;", [id])?;
        insert_attribute_rows(&tx, id, rows)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_record(&self, id: &str) -> RepoResult<()> {
        // Attribute rows fall with the record via ON DELETE CASCADE.
        let changed = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

/// Normalizes list limit according to the records contract.
pub fn normalize_record_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => RECORDS_DEFAULT_LIMIT,
        Some(value) if value > RECORDS_LIMIT_MAX => RECORDS_LIMIT_MAX,
        Some(value) => value,
        None => RECORDS_DEFAULT_LIMIT,
    }
}

struct RecordEnvelope {
    id: String,
    kind: RecordKind,
    enabled: bool,
    created_at: i64,
    expires_at: Option<i64>,
}

fn parse_record_envelope(row: &Row<'_>) -> RepoResult<RecordEnvelope> {
    let id: String = row.get("id")?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_record_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid record kind `{kind_text}` in records.kind"))
    })?;

    let enabled = match row.get::<_, i64>("enabled")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid enabled value `{other}` in records.enabled"
            )));
        }
    };

    Ok(RecordEnvelope {
        id,
        kind,
        enabled,
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
    })
}

fn hydrate_record(conn: &Connection, envelope: RecordEnvelope) -> RepoResult<IdentityRecord> {
    let rows = load_attribute_rows(conn, &envelope.id)?;
    let record = IdentityRecord::from_parts(
        envelope.kind,
        envelope.id,
        envelope.enabled,
        envelope.created_at,
        envelope.expires_at,
        rows,
    )?;
    Ok(record)
}

fn load_attribute_rows(conn: &Connection, record_id: &str) -> RepoResult<Vec<AttributeRow>> {
    let mut stmt = conn.prepare(
        "SELECT name, value
         FROM record_attributes
         WHERE record_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([record_id])?;
    let mut attribute_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        if name.trim().is_empty() {
            return Err(RepoError::InvalidData(format!(
                "blank attribute name for record `{record_id}` in record_attributes.name"
            )));
        }
        attribute_rows.push(AttributeRow {
            name,
            value: row.get("value")?,
        });
    }
    Ok(attribute_rows)
}

fn insert_attribute_rows(
    conn: &Connection,
    record_id: &str,
    rows: &[AttributeRow],
) -> RepoResult<()> {
    for (position, row) in rows.iter().enumerate() {
        conn.execute(
            "INSERT INTO record_attributes (record_id, name, value, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![record_id, row.name.as_str(), row.value.as_str(), position as i64],
        )?;
    }
    Ok(())
}

fn record_exists(conn: &Connection, id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM records
            WHERE id = ?1
        );",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_record_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["records", "record_attributes"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["id", "kind", "enabled", "created_at", "expires_at"] {
        if !table_has_column(conn, "records", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "records",
                column,
            });
        }
    }

    for column in ["record_id", "name", "value", "position"] {
        if !table_has_column(conn, "record_attributes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "record_attributes",
                column,
            });
        }
    }

    Ok(())
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

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
