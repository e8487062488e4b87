//! XML response interpretation.
//!
//! Every CRUD and metadata response follows the same convention: the body
//! is an XML document whose root carries either an `error` element (with a
//! nested `message`) or a `result` element. For EXPORT the `result` holds
//! the matched rows as `rows/row/column` entries, each `column` carrying a
//! `name` attribute and the cell text as its value.

use roxmltree::Document;

use crate::error::{Result, ZohoLinkError};

/// Pull the remote error message out of a parsed document, if any.
///
/// A bare `error` element without a `message` child still counts as an
/// error; a placeholder message is reported in that case.
fn error_message(doc: &Document) -> Option<String> {
    let error = doc.descendants().find(|node| node.has_tag_name("error"))?;
    let message = error
        .descendants()
        .find(|node| node.has_tag_name("message"))
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or("remote error without message")
        .to_string();
    Some(message)
}

fn has_result(doc: &Document) -> bool {
    doc.descendants().any(|node| node.has_tag_name("result"))
}

/// Interpret a write-style response (ADDROW, UPDATE, DELETE).
///
/// `Ok(())` when the body carries a `result` element; a
/// [`ZohoLinkError::RemoteOperation`] when it carries an `error` element
/// or neither.
pub(crate) fn interpret_write(action: &str, body: &str) -> Result<()> {
    let doc = Document::parse(body)?;

    if let Some(message) = error_message(&doc) {
        return Err(ZohoLinkError::RemoteOperation {
            action: action.to_string(),
            message,
        });
    }
    if has_result(&doc) {
        return Ok(());
    }
    Err(ZohoLinkError::RemoteOperation {
        action: action.to_string(),
        message: "unrecognized response".to_string(),
    })
}

/// Interpret an EXPORT response into its rows.
///
/// Each row is the ordered list of its `(column name, cell text)` pairs. A
/// `result` element with no rows yields an empty vector.
pub(crate) fn interpret_export(body: &str) -> Result<Vec<Vec<(String, String)>>> {
    let doc = Document::parse(body)?;

    if let Some(message) = error_message(&doc) {
        return Err(ZohoLinkError::RemoteOperation {
            action: "EXPORT".to_string(),
            message,
        });
    }
    if !has_result(&doc) {
        return Err(ZohoLinkError::RemoteOperation {
            action: "EXPORT".to_string(),
            message: "unrecognized response".to_string(),
        });
    }

    let mut rows = Vec::new();
    for row in doc.descendants().filter(|node| node.has_tag_name("row")) {
        let mut columns = Vec::new();
        for column in row.children().filter(|node| node.has_tag_name("column")) {
            let Some(name) = column.attribute("name") else {
                continue;
            };
            let value = column.text().unwrap_or("").to_string();
            columns.push((name.to_string(), value));
        }
        rows.push(columns);
    }
    Ok(rows)
}
