//! Configuration store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the row-store primitives used by snapshot load and copy.
//! - Map each category onto its table through `TableSchema`.
//!
//! # Invariants
//! - Distinct queries return values in ascending column order; this order is
//!   the universe discovery order seen by callers.
//! - `upsert_record` never creates a second row for the same natural key.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::category::{ActionSlot, Category, HostName, JumpPoints, Keybindings, Settings};
use crate::model::record::ConfigRecord;
use crate::model::value::{KeyList, SettingValue};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for configuration store reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Persisted row cannot be decoded into the category's model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted config data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
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

/// Row-store operations over one category's table.
pub trait ConfigStore<C: Category> {
    /// Distinct hostnames, ascending.
    fn distinct_hosts(&self) -> RepoResult<Vec<HostName>>;
    /// Distinct slots, ascending by slot columns.
    fn distinct_slots(&self) -> RepoResult<Vec<C::Slot>>;
    /// Every row of the table in insertion order.
    fn list_records(&self) -> RepoResult<Vec<ConfigRecord<C>>>;
    /// Point lookup by natural key.
    fn find_record(&self, hostname: &str, slot: &C::Slot) -> RepoResult<Option<ConfigRecord<C>>>;
    /// Insert-or-update keyed by `hostname` plus slot columns.
    fn upsert_record(&self, record: &ConfigRecord<C>) -> RepoResult<()>;
}

/// Table layout and row codec for a category stored in SQLite.
///
/// Column names are compile-time constants and are interpolated into SQL;
/// row values are always bound as parameters.
pub trait TableSchema: Category {
    const TABLE: &'static str;
    /// Columns forming the slot, in ordering priority.
    const SLOT_COLUMNS: &'static [&'static str];
    /// Value column followed by any extra columns.
    const PAYLOAD_COLUMNS: &'static [&'static str];

    fn slot_params(slot: &Self::Slot) -> Vec<Value>;
    fn payload_params(value: &Self::Value, extra: &Self::Extra) -> RepoResult<Vec<Value>>;
    fn read_slot(row: &Row<'_>) -> RepoResult<Self::Slot>;
    fn read_payload(row: &Row<'_>) -> RepoResult<(Self::Value, Self::Extra)>;
}

impl TableSchema for Settings {
    const TABLE: &'static str = "settings";
    const SLOT_COLUMNS: &'static [&'static str] = &["value"];
    const PAYLOAD_COLUMNS: &'static [&'static str] = &["data"];

    fn slot_params(slot: &String) -> Vec<Value> {
        vec![Value::Text(slot.clone())]
    }

    fn payload_params(value: &SettingValue, _extra: &()) -> RepoResult<Vec<Value>> {
        let data = match value {
            SettingValue::Integer(number) => Value::Integer(*number),
            SettingValue::Real(number) => Value::Real(*number),
            SettingValue::Text(text) => Value::Text(text.clone()),
        };
        Ok(vec![data])
    }

    fn read_slot(row: &Row<'_>) -> RepoResult<String> {
        Ok(row.get("value")?)
    }

    fn read_payload(row: &Row<'_>) -> RepoResult<(SettingValue, ())> {
        let value = match row.get_ref("data")? {
            ValueRef::Integer(number) => SettingValue::Integer(number),
            ValueRef::Real(number) => SettingValue::Real(number),
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    RepoError::InvalidData("non UTF-8 text in settings.data".to_string())
                })?;
                SettingValue::Text(text.to_string())
            }
            ValueRef::Null => {
                return Err(RepoError::InvalidData(
                    "null value in settings.data".to_string(),
                ));
            }
            ValueRef::Blob(_) => {
                return Err(RepoError::InvalidData(
                    "blob value in settings.data".to_string(),
                ));
            }
        };
        Ok((value, ()))
    }
}

impl TableSchema for Keybindings {
    const TABLE: &'static str = "keybindings";
    const SLOT_COLUMNS: &'static [&'static str] = &["context", "action"];
    const PAYLOAD_COLUMNS: &'static [&'static str] = &["keylist", "description"];

    fn slot_params(slot: &ActionSlot) -> Vec<Value> {
        vec![
            Value::Text(slot.context.clone()),
            Value::Text(slot.action.clone()),
        ]
    }

    fn payload_params(value: &KeyList, extra: &Option<String>) -> RepoResult<Vec<Value>> {
        Ok(vec![encode_keylist(value)?, description_param(extra)])
    }

    fn read_slot(row: &Row<'_>) -> RepoResult<ActionSlot> {
        Ok(ActionSlot::new(
            row.get::<_, String>("context")?,
            row.get::<_, String>("action")?,
        ))
    }

    fn read_payload(row: &Row<'_>) -> RepoResult<(KeyList, Option<String>)> {
        Ok((
            decode_keylist(row, Self::TABLE)?,
            row.get("description")?,
        ))
    }
}

impl TableSchema for JumpPoints {
    const TABLE: &'static str = "jumppoints";
    const SLOT_COLUMNS: &'static [&'static str] = &["destination"];
    const PAYLOAD_COLUMNS: &'static [&'static str] = &["keylist", "description"];

    fn slot_params(slot: &String) -> Vec<Value> {
        vec![Value::Text(slot.clone())]
    }

    fn payload_params(value: &KeyList, extra: &Option<String>) -> RepoResult<Vec<Value>> {
        Ok(vec![encode_keylist(value)?, description_param(extra)])
    }

    fn read_slot(row: &Row<'_>) -> RepoResult<String> {
        Ok(row.get("destination")?)
    }

    fn read_payload(row: &Row<'_>) -> RepoResult<(KeyList, Option<String>)> {
        Ok((
            decode_keylist(row, Self::TABLE)?,
            row.get("description")?,
        ))
    }
}

/// SQLite-backed configuration store serving every category table.
#[derive(Debug, Clone, Copy)]
pub struct SqliteConfigStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConfigStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - Returns `InvalidData` when the connection schema version differs
    ///   from the version this binary migrates to.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        if version != latest_version() {
            return Err(RepoError::InvalidData(format!(
                "config store schema version {version} does not match expected {}; open it with `open_db`",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }
}

impl<C: TableSchema> ConfigStore<C> for SqliteConfigStore<'_> {
    fn distinct_hosts(&self) -> RepoResult<Vec<HostName>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT hostname FROM {} ORDER BY hostname ASC;",
            C::TABLE
        ))?;
        let mut rows = stmt.query([])?;
        let mut hosts = Vec::new();
        while let Some(row) = rows.next()? {
            hosts.push(row.get("hostname")?);
        }
        Ok(hosts)
    }

    fn distinct_slots(&self) -> RepoResult<Vec<C::Slot>> {
        let columns = C::SLOT_COLUMNS.join(", ");
        let order = C::SLOT_COLUMNS
            .iter()
            .map(|column| format!("{column} ASC"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT {columns} FROM {} ORDER BY {order};",
            C::TABLE
        ))?;
        let mut rows = stmt.query([])?;
        let mut slots = Vec::new();
        while let Some(row) = rows.next()? {
            slots.push(C::read_slot(row)?);
        }
        Ok(slots)
    }

    fn list_records(&self) -> RepoResult<Vec<ConfigRecord<C>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id ASC;", select_sql::<C>()))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row::<C>(row)?);
        }
        Ok(records)
    }

    fn find_record(&self, hostname: &str, slot: &C::Slot) -> RepoResult<Option<ConfigRecord<C>>> {
        let filters = C::SLOT_COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!(" AND {column} = ?{}", index + 2))
            .collect::<String>();
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE hostname = ?1{filters} LIMIT 1;",
            select_sql::<C>()
        ))?;

        let mut bind_values = vec![Value::Text(hostname.to_string())];
        bind_values.extend(C::slot_params(slot));

        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row::<C>(row)?));
        }
        Ok(None)
    }

    fn upsert_record(&self, record: &ConfigRecord<C>) -> RepoResult<()> {
        let key_columns = std::iter::once("hostname")
            .chain(C::SLOT_COLUMNS.iter().copied())
            .collect::<Vec<_>>();
        let all_columns = key_columns
            .iter()
            .chain(C::PAYLOAD_COLUMNS.iter())
            .copied()
            .collect::<Vec<_>>();
        let placeholders = (1..=all_columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let updates = C::PAYLOAD_COLUMNS
            .iter()
            .map(|column| format!("{column} = excluded.{column}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "INSERT INTO {table} ({columns}) VALUES ({placeholders})
             ON CONFLICT ({keys}) DO UPDATE SET {updates};",
            table = C::TABLE,
            columns = all_columns.join(", "),
            keys = key_columns.join(", "),
        );

        let mut bind_values = vec![Value::Text(record.hostname.clone())];
        bind_values.extend(C::slot_params(&record.slot));
        bind_values.extend(C::payload_params(&record.value, &record.extra)?);

        self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(())
    }
}

fn select_sql<C: TableSchema>() -> String {
    format!(
        "SELECT hostname, {}, {} FROM {}",
        C::SLOT_COLUMNS.join(", "),
        C::PAYLOAD_COLUMNS.join(", "),
        C::TABLE
    )
}

fn parse_record_row<C: TableSchema>(row: &Row<'_>) -> RepoResult<ConfigRecord<C>> {
    let hostname: String = row.get("hostname")?;
    let slot = C::read_slot(row)?;
    let (value, extra) = C::read_payload(row)?;
    Ok(ConfigRecord {
        hostname,
        slot,
        value,
        extra,
    })
}

fn encode_keylist(keys: &KeyList) -> RepoResult<Value> {
    let json = serde_json::to_string(keys)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode keylist: {err}")))?;
    Ok(Value::Text(json))
}

fn decode_keylist(row: &Row<'_>, table: &str) -> RepoResult<KeyList> {
    let json: String = row.get("keylist")?;
    serde_json::from_str(&json).map_err(|err| {
        RepoError::InvalidData(format!("invalid keylist `{json}` in {table}.keylist: {err}"))
    })
}

fn description_param(description: &Option<String>) -> Value {
    match description {
        Some(text) => Value::Text(text.clone()),
        None => Value::Null,
    }
}
