//! Account credentials for the Zoho Reports API.

use serde::{Deserialize, Serialize};

/// Credentials for a Zoho Reports account.
///
/// Set once when the connection is built and immutable afterwards. The
/// `api_key` is the account-level key issued by Zoho Reports; `login_name`
/// doubles as the first path segment of every API URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name of the Zoho Reports account.
    pub login_name: String,

    /// Account password, presented only to the accounts endpoint at login.
    pub password: String,

    /// API key issued by Zoho Reports, sent with every request.
    pub api_key: String,
}

impl Credentials {
    /// Create a new credential set.
    pub fn new(
        login_name: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            login_name: login_name.into(),
            password: password.into(),
            api_key: api_key.into(),
        }
    }
}
