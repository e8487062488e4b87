//! HTTP transport abstraction.
//!
//! The client speaks to the service through the [`Transport`] trait: one
//! blocking round trip in, one raw HTTP message (headers, blank line,
//! body) out. [`HttpTransport`] is the reqwest-backed implementation;
//! tests substitute a scripted one.

use std::fmt;
use std::time::Duration;

use log::debug;

use crate::error::{Result, ZohoLinkError};

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A single blocking HTTP round trip.
///
/// Implementations return the whole response message (status line and
/// headers, a blank line, then the body) and signal transport failures
/// (connection errors, HTTP status 400 and above) as errors, distinct
/// from a successful response whose body carries a remote error element.
pub trait Transport: Send + Sync {
    /// Execute one request and return the raw response message.
    fn send(&self, url: &str, method: Method, form_body: Option<&str>) -> Result<String>;
}

/// Default [`Transport`] over a blocking reqwest client.
///
/// No redirects are followed and the connect timeout is ten seconds;
/// everything else is reqwest's default.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build the transport with its underlying HTTP client.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| ZohoLinkError::Configuration(err.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: &str, method: Method, form_body: Option<&str>) -> Result<String> {
        debug!("[HTTP] {} {}", method, url);

        let request = match method {
            Method::Get => self.client.get(url),
            Method::Post => {
                let builder = self
                    .client
                    .post(url)
                    .header("Content-Type", "application/x-www-form-urlencoded");
                match form_body {
                    Some(body) => builder.body(body.to_string()),
                    None => builder,
                }
            }
        };

        let response = request.send()?;
        let status = response.status();
        debug!("[HTTP] response status={}", status);

        if status.as_u16() >= 400 {
            return Err(ZohoLinkError::Transport(format!(
                "HTTP status {} from {}",
                status, url
            )));
        }

        // Reassemble the standard message framing the caller splits on.
        let mut raw = format!("HTTP/1.1 {}\r\n", status);
        for (name, value) in response.headers() {
            raw.push_str(name.as_str());
            raw.push_str(": ");
            raw.push_str(value.to_str().unwrap_or(""));
            raw.push_str("\r\n");
        }
        raw.push_str("\r\n");
        raw.push_str(&response.text()?);
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
    }
}
