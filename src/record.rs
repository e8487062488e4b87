//! The Active-Record core.
//!
//! A [`Record`] is one remote row: an ordered column → value map whose
//! entries are typed according to the discovered table schema, plus a flag
//! distinguishing a not-yet-persisted row from one known to exist
//! remotely. CRUD intents translate into requests through the connection
//! and XML responses translate back into booleans or further records.
//!
//! Remote and transport failures during a CRUD round trip are reported
//! through the log facade and come back as a false (or empty) result, so
//! batch callers can keep going; precondition violations raise before any
//! request is made.

use indexmap::IndexMap;
use log::warn;

use crate::connection::Connection;
use crate::criteria;
use crate::error::{Result, ZohoLinkError};
use crate::models::{AttributeValue, ColumnType, FindResult};
use crate::response;
use crate::transport::Method;

/// One row of the active table.
#[derive(Debug)]
pub struct Record {
    conn: Connection,
    attributes: IndexMap<String, AttributeValue>,
    new_record: bool,
}

impl Record {
    /// A new, empty, unsaved record.
    pub fn new(conn: &Connection) -> Record {
        Record {
            conn: conn.clone(),
            attributes: IndexMap::new(),
            new_record: true,
        }
    }

    /// Build a persisted record from one EXPORT row.
    ///
    /// Columns the table schema does not declare are dropped with a
    /// warning; the remote view can drift ahead of the catalog cached on
    /// this connection.
    fn from_row(conn: &Connection, row: Vec<(String, String)>) -> Result<Record> {
        let mut record = Record {
            conn: conn.clone(),
            attributes: IndexMap::new(),
            new_record: false,
        };
        for (column, value) in row {
            match record.set(&column, value.as_str()) {
                Ok(()) => {}
                Err(ZohoLinkError::UnknownColumn { .. }) => {
                    warn!("[EXPORT] dropping column '{}' absent from the table schema", column);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(record)
    }

    /// True until the record is known to exist remotely.
    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    /// The record's current attributes, in assignment order.
    pub fn attributes(&self) -> &IndexMap<String, AttributeValue> {
        &self.attributes
    }

    /// Assign `value` to `column`, coerced to the column's declared type.
    ///
    /// Fails with [`ZohoLinkError::UnknownColumn`], storing nothing, if
    /// the active table's schema does not declare the column.
    pub fn set(&mut self, column: &str, value: impl Into<AttributeValue>) -> Result<()> {
        let database = self.conn.active_database()?;
        let table = self.conn.active_table()?;
        let columns = self.conn.table_columns(&database, &table)?;

        let Some(column_type) = columns.get(column).copied() else {
            return Err(ZohoLinkError::UnknownColumn {
                table,
                column: column.to_string(),
            });
        };

        self.attributes
            .insert(column.to_string(), value.into().coerce(column_type));
        Ok(())
    }

    /// The stored value of `column`, or `None` with a warning when the
    /// attribute was never assigned.
    pub fn get(&self, column: &str) -> Option<&AttributeValue> {
        match self.try_get(column) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("[RECORD] {}", err);
                None
            }
        }
    }

    /// The stored value of `column`, or
    /// [`ZohoLinkError::UndefinedAttribute`].
    pub fn try_get(&self, column: &str) -> Result<&AttributeValue> {
        self.attributes
            .get(column)
            .ok_or_else(|| ZohoLinkError::UndefinedAttribute(column.to_string()))
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Persist the record: ADDROW when new, otherwise an UPDATE by `id`.
    ///
    /// A successful insert marks the record as persisted, so a repeated
    /// `save` routes to [`update`](Record::update) instead of inserting a
    /// duplicate row.
    pub fn save(&mut self) -> Result<bool> {
        if self.attributes.is_empty() {
            return Err(ZohoLinkError::Validation(
                "cannot save a record with no attributes".to_string(),
            ));
        }
        if !self.new_record {
            return self.update();
        }

        let url = self.conn.table_url("ADDROW")?;
        let mut params = self.conn.request_template();
        for (column, value) in &self.attributes {
            params.push((column.clone(), value.to_string()));
        }

        let saved = soften("ADDROW", post_write(&self.conn, "ADDROW", &url, &params))?;
        if saved {
            self.new_record = false;
        }
        Ok(saved)
    }

    /// Update the remote row addressed by this record's `id` attribute.
    ///
    /// `id` selects the row through the criteria clause and is excluded
    /// from the submitted field set.
    pub fn update(&mut self) -> Result<bool> {
        let id = match self.attributes.get("id") {
            Some(value) => value.to_string(),
            None => {
                return Err(ZohoLinkError::Validation(
                    "update requires an 'id' attribute".to_string(),
                ))
            }
        };

        let url = self.conn.table_url("UPDATE")?;
        let mut params = self.conn.request_template();
        for (column, value) in &self.attributes {
            if column == "id" {
                continue;
            }
            params.push((column.clone(), value.to_string()));
        }
        params.push(("ZOHO_CRITERIA".to_string(), criteria::update_by_id(&id)));

        soften("UPDATE", post_write(&self.conn, "UPDATE", &url, &params))
    }

    /// Insert one row from caller-supplied column/value pairs, without an
    /// instance. Values go onto the wire as given, no type coercion.
    pub fn create(conn: &Connection, data: &[(&str, &str)]) -> Result<bool> {
        let url = conn.table_url("ADDROW")?;
        let mut params = conn.request_template();
        for (column, value) in data {
            params.push((column.to_string(), value.to_string()));
        }

        soften("ADDROW", post_write(conn, "ADDROW", &url, &params))
    }

    /// Delete the remote row this record represents.
    ///
    /// Only valid for a persisted record. On success the `id` attribute is
    /// cleared and the record reverts to new: it no longer represents the
    /// deleted row, but is eligible for re-creation.
    pub fn destroy(&mut self) -> Result<bool> {
        if self.new_record {
            return Err(ZohoLinkError::InvalidState(
                "cannot destroy a record that is not in the database".to_string(),
            ));
        }
        let id = match self.attributes.get("id") {
            Some(value) => value.to_string(),
            None => {
                return Err(ZohoLinkError::Validation(
                    "destroy requires an 'id' attribute".to_string(),
                ))
            }
        };

        let url = self.conn.table_url("DELETE")?;
        let mut params = self.conn.request_template();
        params.push(("ZOHO_CRITERIA".to_string(), criteria::delete_by_id(&id)));

        let deleted = soften("DELETE", post_write(&self.conn, "DELETE", &url, &params))?;
        if deleted {
            self.attributes.shift_remove("id");
            self.new_record = true;
        }
        Ok(deleted)
    }

    // ── Finders ─────────────────────────────────────────────────────────

    /// Find rows matching all of `conditions` (a conjunction).
    ///
    /// Returns the asymmetric [`FindResult`] shape: empty, one bare
    /// record, or an ordered sequence. Remote failures soften to an empty
    /// result after a warning.
    pub fn find(conn: &Connection, conditions: &[(&str, &str)]) -> Result<FindResult> {
        let url = conn.table_url("EXPORT")?;
        let mut params = conn.request_template();
        params.push(("ZOHO_CRITERIA".to_string(), criteria::conjunction(conditions)));

        let sent = conn.send_request_with(&url, Method::Post, &params, |_, body| {
            response::interpret_export(body)
        });
        let rows = match sent.and_then(|interpreted| interpreted) {
            Ok(rows) => rows,
            Err(err) if is_soft(&err) => {
                warn!("[EXPORT] {}", err);
                return Ok(FindResult::Empty);
            }
            Err(err) => return Err(err),
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(Record::from_row(conn, row)?);
        }
        Ok(FindResult::from_records(records))
    }

    /// Dynamic finder dispatch table over this record's connection.
    pub fn finders(&self) -> Result<Finders> {
        Finders::new(&self.conn)
    }
}

/// Dynamic finders for the active table.
///
/// A dispatch table built from the schema's known column names: looking a
/// record up by a single column is a checked operation, not name parsing.
/// Obtained from [`Connection::finders`] or [`Record::finders`].
#[derive(Debug)]
pub struct Finders {
    conn: Connection,
    table: String,
    columns: IndexMap<String, ColumnType>,
}

impl Finders {
    pub(crate) fn new(conn: &Connection) -> Result<Finders> {
        let database = conn.active_database()?;
        let table = conn.active_table()?;
        let columns = conn.table_columns(&database, &table)?;
        Ok(Finders {
            conn: conn.clone(),
            table,
            columns,
        })
    }

    /// Column names this table can be looked up by.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// `find_by("Campaign", v)` ≡ `find(&[("Campaign", v)])`, with the
    /// column name checked against the schema first.
    pub fn find_by(&self, column: &str, value: &str) -> Result<FindResult> {
        if !self.columns.contains_key(column) {
            return Err(ZohoLinkError::UnknownColumn {
                table: self.table.clone(),
                column: column.to_string(),
            });
        }
        Record::find(&self.conn, &[(column, value)])
    }
}

/// Send a write-style request and interpret its response.
fn post_write(conn: &Connection, action: &str, url: &str, params: &[(String, String)]) -> Result<()> {
    conn.send_request_with(url, Method::Post, params, |_, body| {
        response::interpret_write(action, body)
    })?
}

/// Failures the soft CRUD contract converts to a false result.
fn is_soft(err: &ZohoLinkError) -> bool {
    matches!(
        err,
        ZohoLinkError::RemoteOperation { .. }
            | ZohoLinkError::Transport(_)
            | ZohoLinkError::Xml(_)
    )
}

/// Apply the soft-failure contract to a write outcome.
fn soften(action: &str, result: Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if is_soft(&err) => {
            warn!("[{}] {}", action, err);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
