//! Error types for the zoho-link client.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ZohoLinkError>;

/// Main error type for zoho-link.
#[derive(Error, Debug)]
pub enum ZohoLinkError {
    /// No session ticket could be extracted from the login response.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The metadata request for a database carried a remote error.
    #[error("Schema discovery failed for database '{database}': {message}")]
    Discovery { database: String, message: String },

    /// The selected table is not present in the database catalog.
    #[error("Table '{table}' not found in database '{database}'")]
    UnknownTable { database: String, table: String },

    /// Attribute assignment to a column the table schema does not declare.
    #[error("Column '{column}' is not a column of table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Read of an attribute that was never assigned.
    #[error("Attribute '{0}' is not set")]
    UndefinedAttribute(String),

    /// A CRUD precondition was violated before any request was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation is not valid for the record's persistence state.
    #[error("Invalid record state: {0}")]
    InvalidState(String),

    /// The remote service answered a CRUD request with an error element,
    /// or with a shape the client does not recognize.
    #[error("Remote {action} failed: {message}")]
    RemoteOperation { action: String, message: String },

    /// The HTTP round trip itself failed, or the status was 400 or above.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Required configuration is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A response body could not be parsed as XML.
    #[error("Malformed XML response: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl From<reqwest::Error> for ZohoLinkError {
    fn from(err: reqwest::Error) -> Self {
        ZohoLinkError::Transport(err.to_string())
    }
}
