//! Database schema discovery and storage.
//!
//! One DATABASEMETADATA request per database yields a catalog of views;
//! only entries whose `TABLE_TYPE` is `TABLE` enter the schema. Each table
//! keeps its columns in declaration order together with the declared
//! `TYPE_NAME`, which the connection later classifies into the semantic
//! type buckets.

use indexmap::IndexMap;
use log::debug;
use roxmltree::Document;

use crate::connection::Connection;
use crate::error::{Result, ZohoLinkError};
use crate::transport::Method;

/// Column layout of one remote table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: IndexMap<String, String>,
}

impl TableSchema {
    /// Table name as reported by the catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered column name → declared `TYPE_NAME` mapping.
    pub fn columns(&self) -> &IndexMap<String, String> {
        &self.columns
    }

    /// Declared `TYPE_NAME` of one column.
    pub fn column_type_name(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }
}

/// The discovered catalog of one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSchema {
    database: String,
    tables: IndexMap<String, TableSchema>,
}

impl DatabaseSchema {
    /// Fetch and parse the catalog of `database`.
    pub(crate) fn discover(conn: &Connection, database: &str) -> Result<DatabaseSchema> {
        let url = conn.database_url(database, "DATABASEMETADATA");
        let mut params = conn.request_template();
        params.push(("ZOHO_METADATA".to_string(), "ZOHO_CATALOG_INFO".to_string()));

        let response = conn.send_request(&url, Method::Post, &params)?;
        let schema = DatabaseSchema::from_catalog_xml(database, &response.body)?;
        debug!(
            "[SCHEMA] discovered {} table(s) in database '{}'",
            schema.tables.len(),
            database
        );
        Ok(schema)
    }

    /// Build a schema from a catalog response body.
    pub(crate) fn from_catalog_xml(database: &str, body: &str) -> Result<DatabaseSchema> {
        let doc = Document::parse(body)?;

        if let Some(error) = doc.descendants().find(|node| node.has_tag_name("error")) {
            let message = error
                .descendants()
                .find(|node| node.has_tag_name("message"))
                .and_then(|node| node.text())
                .unwrap_or("remote error without message")
                .trim()
                .to_string();
            return Err(ZohoLinkError::Discovery {
                database: database.to_string(),
                message,
            });
        }

        let mut tables = IndexMap::new();
        for view in doc.descendants().filter(|node| node.has_tag_name("ZVIEW")) {
            if view.attribute("TABLE_TYPE") != Some("TABLE") {
                continue;
            }
            let Some(name) = view.attribute("TABLE_NAME") else {
                continue;
            };

            let mut columns = IndexMap::new();
            for column in view.descendants().filter(|node| node.has_tag_name("ZCOLUMN")) {
                if let (Some(column_name), Some(type_name)) =
                    (column.attribute("COLUMN_NAME"), column.attribute("TYPE_NAME"))
                {
                    columns.insert(column_name.to_string(), type_name.to_string());
                }
            }

            tables.insert(
                name.to_string(),
                TableSchema {
                    name: name.to_string(),
                    columns,
                },
            );
        }

        Ok(DatabaseSchema {
            database: database.to_string(),
            tables,
        })
    }

    /// Name of the database this catalog belongs to.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Ordered table name → schema mapping.
    pub fn tables(&self) -> &IndexMap<String, TableSchema> {
        &self.tables
    }

    /// Schema of one table, if the catalog lists it.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }
}
