//! Session management for the Zoho Reports API.
//!
//! A [`Connection`] is the single handle every other component works
//! through. It owns:
//!
//! - the account credentials and endpoint base URLs,
//! - the session ticket obtained by logging in when the handle is built,
//! - the active database/table selection,
//! - the per-database schema catalogs, discovered on first selection,
//! - the per-table classified column maps, computed on first use,
//! - the [`Transport`] all requests go through.
//!
//! The handle is cheap to clone (shared internals) and safe to share:
//! caches sit behind locks so the lazy-population paths run their network
//! call exactly once, and populated state is read-mostly afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, RwLock};

use indexmap::IndexMap;
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::credentials::Credentials;
use crate::error::{Result, ZohoLinkError};
use crate::models::ColumnType;
use crate::record::Finders;
use crate::schema::DatabaseSchema;
use crate::transport::{HttpTransport, Method, Transport};

/// Default accounts endpoint, used for login.
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.zoho.com";

/// Default API endpoint for metadata and CRUD requests.
pub const DEFAULT_API_BASE_URL: &str = "https://reportsapi.zoho.com/api/";

/// Everything except unreserved characters is percent-encoded, matching
/// the encoding the service expects for form values.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Session tickets appear in the login response as `TICKET=<alphanumeric>`.
static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("TICKET=([a-zA-Z0-9]+)").expect("ticket pattern is valid"));

/// A raw HTTP response split into its two halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Status line and headers, up to the first blank line.
    pub headers: String,
    /// Everything after the first blank line.
    pub body: String,
}

#[derive(Debug, Default)]
struct Selection {
    database: Option<String>,
    table: Option<String>,
}

struct ConnectionInner {
    credentials: Credentials,
    api_base_url: String,
    transport: Arc<dyn Transport>,
    session_ticket: String,
    selection: RwLock<Selection>,
    schemas: Mutex<HashMap<String, DatabaseSchema>>,
    table_columns: Mutex<HashMap<(String, String), IndexMap<String, ColumnType>>>,
}

/// Authenticated handle to one Zoho Reports account.
///
/// Built once via [`Connection::builder`]; cloning shares the session and
/// all caches. The session ticket is obtained when the handle is built and
/// never refreshed; build a new connection to re-authenticate or to pick
/// up remote schema changes.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    /// Start configuring a new connection.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// The cached session ticket. Never triggers re-authentication.
    pub fn session(&self) -> &str {
        &self.inner.session_ticket
    }

    /// Login name the connection was built with.
    pub fn login_name(&self) -> &str {
        &self.inner.credentials.login_name
    }

    /// Make `name` the active database, discovering its schema first if
    /// this connection has not seen it yet.
    ///
    /// Discovery failure leaves the previous selection and any already
    /// cached catalogs untouched.
    pub fn select_database(&self, name: &str) -> Result<()> {
        {
            let mut schemas = self.lock_schemas();
            if !schemas.contains_key(name) {
                debug!("[SCHEMA] no cached catalog for '{}', discovering", name);
                let schema = DatabaseSchema::discover(self, name)?;
                schemas.insert(name.to_string(), schema);
            }
        }
        self.write_selection().database = Some(name.to_string());
        Ok(())
    }

    /// Make `name` the active table.
    ///
    /// The name is not checked against the catalog: EXPORT also works
    /// against views the catalog does not list. A table name the schema
    /// cannot resolve surfaces later, on the first typed assignment.
    pub fn select_table(&self, name: &str) {
        debug!("[SCHEMA] active table is now '{}'", name);
        self.write_selection().table = Some(name.to_string());
    }

    /// Currently selected database name.
    pub fn active_database(&self) -> Result<String> {
        self.read_selection()
            .database
            .clone()
            .ok_or_else(|| ZohoLinkError::Configuration("no database selected".to_string()))
    }

    /// Currently selected table name.
    pub fn active_table(&self) -> Result<String> {
        self.read_selection()
            .table
            .clone()
            .ok_or_else(|| ZohoLinkError::Configuration("no table selected".to_string()))
    }

    /// The discovered catalog of a database, if this connection has one.
    pub fn database_schema(&self, database: &str) -> Option<DatabaseSchema> {
        self.lock_schemas().get(database).cloned()
    }

    /// Ordered column → semantic type mapping of `(database, table)`.
    ///
    /// Classified from the declared type names on first access and cached
    /// per table afterwards. The database must have been selected (and
    /// thus discovered) on this connection before.
    pub fn table_columns(
        &self,
        database: &str,
        table: &str,
    ) -> Result<IndexMap<String, ColumnType>> {
        let key = (database.to_string(), table.to_string());
        {
            let cache = self.lock_table_columns();
            if let Some(columns) = cache.get(&key) {
                return Ok(columns.clone());
            }
        }

        let classified = {
            let schemas = self.lock_schemas();
            let schema = schemas.get(database).ok_or_else(|| ZohoLinkError::Discovery {
                database: database.to_string(),
                message: "no catalog cached; select the database first".to_string(),
            })?;
            let table_schema =
                schema
                    .table(table)
                    .ok_or_else(|| ZohoLinkError::UnknownTable {
                        database: database.to_string(),
                        table: table.to_string(),
                    })?;

            let mut classified = IndexMap::with_capacity(table_schema.columns().len());
            for (column, type_name) in table_schema.columns() {
                classified.insert(column.clone(), ColumnType::classify(type_name));
            }
            classified
        };

        let mut cache = self.lock_table_columns();
        let entry = cache.entry(key).or_insert(classified);
        Ok(entry.clone())
    }

    /// Dynamic finder dispatch table for the active table.
    pub fn finders(&self) -> Result<Finders> {
        Finders::new(self)
    }

    /// Send one request through the transport.
    ///
    /// Form values are percent-encoded, the raw response is split into
    /// headers and body at the first blank line. Every metadata and CRUD
    /// request funnels through here.
    pub fn send_request(
        &self,
        url: &str,
        method: Method,
        params: &[(String, String)],
    ) -> Result<RawResponse> {
        let body = encode_form(params);
        let form_body = if params.is_empty() { None } else { Some(body.as_str()) };
        let raw = self.inner.transport.send(url, method, form_body)?;
        Ok(split_raw_response(&raw))
    }

    /// Like [`send_request`](Connection::send_request), but hands the
    /// split response to `interpret` and returns its result.
    pub fn send_request_with<T>(
        &self,
        url: &str,
        method: Method,
        params: &[(String, String)],
        interpret: impl FnOnce(&str, &str) -> T,
    ) -> Result<T> {
        let response = self.send_request(url, method, params)?;
        Ok(interpret(&response.headers, &response.body))
    }

    /// Shared form fields every metadata and CRUD request carries.
    pub(crate) fn request_template(&self) -> Vec<(String, String)> {
        vec![
            ("ZOHO_API_KEY".to_string(), self.inner.credentials.api_key.clone()),
            ("ticket".to_string(), self.inner.session_ticket.clone()),
            ("ZOHO_API_VERSION".to_string(), "1.0".to_string()),
            ("ZOHO_ERROR_FORMAT".to_string(), "XML".to_string()),
            ("ZOHO_OUTPUT_FORMAT".to_string(), "XML".to_string()),
        ]
    }

    /// Metadata URL of a database.
    pub(crate) fn database_url(&self, database: &str, action: &str) -> String {
        format!(
            "{}{}/{}/?ZOHO_ACTION={}",
            self.inner.api_base_url, self.inner.credentials.login_name, database, action
        )
    }

    /// CRUD URL of the active (database, table) pair.
    pub(crate) fn table_url(&self, action: &str) -> Result<String> {
        let database = self.active_database()?;
        let table = self.active_table()?;
        Ok(format!(
            "{}{}/{}/{}?ZOHO_ACTION={}",
            self.inner.api_base_url, self.inner.credentials.login_name, database, table, action
        ))
    }

    fn lock_schemas(&self) -> MutexGuard<'_, HashMap<String, DatabaseSchema>> {
        self.inner.schemas.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_table_columns(
        &self,
    ) -> MutexGuard<'_, HashMap<(String, String), IndexMap<String, ColumnType>>> {
        self.inner
            .table_columns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_selection(&self) -> std::sync::RwLockReadGuard<'_, Selection> {
        self.inner
            .selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_selection(&self) -> std::sync::RwLockWriteGuard<'_, Selection> {
        self.inner
            .selection
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selection = self.read_selection();
        f.debug_struct("Connection")
            .field("login_name", &self.inner.credentials.login_name)
            .field("database", &selection.database)
            .field("table", &selection.table)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Connection`] handles.
///
/// Login name, password, and API key are required; endpoint URLs and the
/// transport have production defaults.
pub struct ConnectionBuilder {
    login_name: Option<String>,
    password: Option<String>,
    api_key: Option<String>,
    api_base_url: String,
    accounts_base_url: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ConnectionBuilder {
    fn new() -> Self {
        Self {
            login_name: None,
            password: None,
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_string(),
            transport: None,
        }
    }

    /// Set the account login name.
    pub fn login_name(mut self, name: impl Into<String>) -> Self {
        self.login_name = Some(name.into());
        self
    }

    /// Set the account password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the account API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the API base URL (metadata and CRUD requests).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the accounts base URL (login request).
    pub fn accounts_base_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_base_url = url.into();
        self
    }

    /// Substitute the transport, e.g. with a scripted one in tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Authenticate and return the connection handle.
    ///
    /// Sends the login request immediately; the returned handle holds a
    /// valid session ticket or this fails with an authentication error.
    pub fn build(self) -> Result<Connection> {
        let login_name = self
            .login_name
            .ok_or_else(|| ZohoLinkError::Configuration("login_name is required".to_string()))?;
        let password = self
            .password
            .ok_or_else(|| ZohoLinkError::Configuration("password is required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| ZohoLinkError::Configuration("api_key is required".to_string()))?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        let mut api_base_url = self.api_base_url;
        if !api_base_url.ends_with('/') {
            api_base_url.push('/');
        }

        let credentials = Credentials::new(login_name, password, api_key);
        let session_ticket = login(transport.as_ref(), &self.accounts_base_url, &credentials)?;

        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                credentials,
                api_base_url,
                transport,
                session_ticket,
                selection: RwLock::new(Selection::default()),
                schemas: Mutex::new(HashMap::new()),
                table_columns: Mutex::new(HashMap::new()),
            }),
        })
    }
}

/// Authenticate against the accounts endpoint and extract the ticket.
fn login(
    transport: &dyn Transport,
    accounts_base_url: &str,
    credentials: &Credentials,
) -> Result<String> {
    let url = format!(
        "{}/login?servicename=ZohoReports&FROM_AGENT=true&LOGIN_ID={}&PASSWORD={}",
        accounts_base_url.trim_end_matches('/'),
        encode_form_value(&credentials.login_name),
        encode_form_value(&credentials.password),
    );
    debug!("[LOGIN] authenticating '{}'", credentials.login_name);

    let raw = transport.send(&url, Method::Get, None)?;
    let ticket = TICKET_PATTERN
        .captures(&raw)
        .and_then(|captures| captures.get(1))
        .map(|matched| matched.as_str().to_string())
        .ok_or_else(|| {
            ZohoLinkError::Authentication("no session ticket in login response".to_string())
        })?;

    debug!("[LOGIN] session established for '{}'", credentials.login_name);
    Ok(ticket)
}

/// Percent-encode one form value.
fn encode_form_value(value: &str) -> String {
    utf8_percent_encode(value, FORM_VALUE).to_string()
}

/// Build the URL-encoded form body. Values are encoded, keys are the
/// service's own field names and pass through as-is.
fn encode_form(params: &[(String, String)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode_form_value(value)))
        .collect();
    pairs.join("&")
}

/// Split a raw HTTP message into headers and body at the first blank line.
fn split_raw_response(raw: &str) -> RawResponse {
    let (headers, body) = match raw.split_once("\r\n\r\n") {
        Some(parts) => parts,
        None => raw.split_once("\n\n").unwrap_or((raw, "")),
    };
    RawResponse {
        headers: headers.to_string(),
        body: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_form_value_matches_rawurlencode() {
        assert_eq!(encode_form_value("a b&c"), "a%20b%26c");
        assert_eq!(encode_form_value("keep-safe_chars.~"), "keep-safe_chars.~");
        assert_eq!(encode_form_value("100%"), "100%25");
    }

    #[test]
    fn test_encode_form_joins_pairs() {
        let params = vec![
            ("ZOHO_ACTION".to_string(), "ADDROW".to_string()),
            ("Campaign".to_string(), "Spring launch".to_string()),
        ];
        assert_eq!(
            encode_form(&params),
            "ZOHO_ACTION=ADDROW&Campaign=Spring%20launch"
        );
    }

    #[test]
    fn test_split_raw_response_crlf() {
        let raw = "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\n\r\n<response/>";
        let response = split_raw_response(raw);
        assert_eq!(response.headers, "HTTP/1.1 200 OK\r\nContent-Type: text/xml");
        assert_eq!(response.body, "<response/>");
    }

    #[test]
    fn test_split_raw_response_without_body() {
        let response = split_raw_response("HTTP/1.1 200 OK");
        assert_eq!(response.headers, "HTTP/1.1 200 OK");
        assert_eq!(response.body, "");
    }

    #[test]
    fn test_ticket_pattern_extraction() {
        let raw = "GETUSERNAME=vothane\nTICKET=ABC123xyz\nRESULT=TRUE";
        let captures = TICKET_PATTERN.captures(raw).unwrap();
        assert_eq!(&captures[1], "ABC123xyz");
    }
}
