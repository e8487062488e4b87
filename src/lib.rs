//! Active-Record style client for the Zoho Reports HTTP API.
//!
//! Authenticate once, discover a remote database's tables and column
//! types, and work with rows as [`Record`] objects whose attributes are
//! typed according to the discovered schema.
//!
//! # Examples
//!
//! ```rust,no_run
//! use zoho_link::{Connection, FindResult, Record};
//!
//! # fn main() -> zoho_link::Result<()> {
//! let conn = Connection::builder()
//!     .login_name("vothane")
//!     .password("secret")
//!     .api_key("0123456789ABCabcXYZxyz")
//!     .build()?;
//! conn.select_database("Sales")?;
//! conn.select_table("Campaigns");
//!
//! // Insert a row; attribute values are coerced per the table schema.
//! let mut row = Record::new(&conn);
//! row.set("Campaign", "New advertising campaign")?;
//! row.set("AdGroup", "Techies")?;
//! row.save()?;
//!
//! // Look a row up by primary key and update it.
//! if let FindResult::One(mut found) = Record::find(&conn, &[("id", "4537")])? {
//!     found.set("Campaign", "Updated advertising campaign")?;
//!     found.save()?; // routes to UPDATE, the row already exists
//! }
//!
//! // Dynamic finders are a checked lookup over the schema's columns.
//! let campaigns = conn.finders()?.find_by("Campaign", "some campaign")?;
//! println!("matched {} row(s)", campaigns.len());
//! # Ok(())
//! # }
//! ```

mod criteria;
mod response;

pub mod connection;
pub mod credentials;
pub mod error;
pub mod models;
pub mod record;
pub mod schema;
pub mod transport;

pub use connection::{Connection, ConnectionBuilder, RawResponse};
pub use credentials::Credentials;
pub use error::{Result, ZohoLinkError};
pub use models::{AttributeValue, ColumnType, FindResult};
pub use record::{Finders, Record};
pub use schema::{DatabaseSchema, TableSchema};
pub use transport::{HttpTransport, Method, Transport};
