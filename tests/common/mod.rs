#![allow(dead_code)]
//! Shared test support: a scripted transport and canned wire fixtures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use percent_encoding::percent_decode_str;
use zoho_link::{Connection, Method, Result, Transport, ZohoLinkError};

/// Session ticket every fixture login hands out.
pub const TICKET: &str = "ABC123";

/// One request as the transport saw it.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: String,
    pub method: Method,
    pub form_body: Option<String>,
}

impl SentRequest {
    /// Percent-decoded `(key, value)` pairs of the form body.
    pub fn decoded_pairs(&self) -> Vec<(String, String)> {
        let Some(body) = &self.form_body else {
            return Vec::new();
        };
        body.split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect()
    }

    /// Decoded value of one form field, if present.
    pub fn field(&self, key: &str) -> Option<String> {
        self.decoded_pairs()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .expect("form data is valid utf-8")
        .into_owned()
}

/// Transport that replays scripted responses and records every request.
///
/// Responses are consumed in FIFO order; a request with nothing scripted
/// fails like a dead network would.
pub struct MockTransport {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<SentRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<MockTransport> {
        Arc::new(MockTransport {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Script a raw response message (headers, blank line, body).
    pub fn push_raw(&self, raw: &str) {
        self.responses.lock().unwrap().push_back(raw.to_string());
    }

    /// Script a 200 response with the given body.
    pub fn push_body(&self, body: &str) {
        self.push_raw(&format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\n\r\n{body}"
        ));
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> SentRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .expect("at least one request was sent")
            .clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, url: &str, method: Method, form_body: Option<&str>) -> Result<String> {
        self.requests.lock().unwrap().push(SentRequest {
            url: url.to_string(),
            method,
            form_body: form_body.map(str::to_string),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ZohoLinkError::Transport("no scripted response".to_string()))
    }
}

// ── Wire fixtures ───────────────────────────────────────────────────────

/// Accounts-endpoint login body carrying the fixture ticket.
pub fn login_body() -> String {
    format!("#\n#Wed Aug 06 10:15:00 PST 2008\nGETUSERNAME=vothane\nTICKET={TICKET}\nRESULT=TRUE\n")
}

/// Catalog for database `Sales` with one table and one (excluded) view.
pub fn catalog_body() -> String {
    r#"<response uri="/api/vothane/Sales/">
  <result>
    <ZCATALOG DBNAME="Sales">
      <ZVIEW TABLE_TYPE="TABLE" TABLE_NAME="Campaigns">
        <ZCOLUMNS>
          <ZCOLUMN COLUMN_NAME="id" TYPE_NAME="Auto Number"/>
          <ZCOLUMN COLUMN_NAME="Campaign" TYPE_NAME="Plain Text"/>
          <ZCOLUMN COLUMN_NAME="AdGroup" TYPE_NAME="Multi Line Text"/>
          <ZCOLUMN COLUMN_NAME="Clicks" TYPE_NAME="Number"/>
          <ZCOLUMN COLUMN_NAME="Impressions" TYPE_NAME="Auto Number"/>
          <ZCOLUMN COLUMN_NAME="Notes" TYPE_NAME="Mystery Blob"/>
        </ZCOLUMNS>
      </ZVIEW>
      <ZVIEW TABLE_TYPE="VIEW" TABLE_NAME="CampaignSummary">
        <ZCOLUMNS>
          <ZCOLUMN COLUMN_NAME="Total" TYPE_NAME="Number"/>
        </ZCOLUMNS>
      </ZVIEW>
    </ZCATALOG>
  </result>
</response>"#
        .to_string()
}

/// A write-style success response.
pub fn result_body() -> String {
    r#"<response uri="/api"><result>success</result></response>"#.to_string()
}

/// A response carrying a remote error element.
pub fn error_body(message: &str) -> String {
    format!(
        r#"<response uri="/api"><error><code>7103</code><message>{message}</message></error></response>"#
    )
}

/// An EXPORT response with the given rows.
pub fn export_body(rows: &[&[(&str, &str)]]) -> String {
    let mut xml = String::from(r#"<response uri="/api"><result><rows>"#);
    for row in rows {
        xml.push_str("<row>");
        for (name, value) in row.iter() {
            xml.push_str(&format!(r#"<column name="{name}">{value}</column>"#));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</rows></result></response>");
    xml
}

// ── Connection helpers ──────────────────────────────────────────────────

/// Build a connection over the mock, consuming one scripted login.
pub fn connect(transport: &Arc<MockTransport>) -> Connection {
    transport.push_body(&login_body());
    Connection::builder()
        .login_name("vothane")
        .password("secret")
        .api_key("APIKEY123")
        .accounts_base_url("http://accounts.test")
        .api_base_url("http://api.test/api/")
        .transport(transport.clone())
        .build()
        .expect("login should succeed")
}

/// Connection with the `Sales` catalog discovered and `Campaigns` active.
/// Exactly two requests (login, metadata) have been consumed.
pub fn connect_with_catalog() -> (Arc<MockTransport>, Connection) {
    let transport = MockTransport::new();
    let conn = connect(&transport);
    transport.push_body(&catalog_body());
    conn.select_database("Sales").expect("discovery should succeed");
    conn.select_table("Campaigns");
    (transport, conn)
}
