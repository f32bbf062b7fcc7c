// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use url::Url;

use crate::error::CalDavError;

/// `CalDAV` authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Basic authentication (username/password).
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Bearer token authentication (OAuth).
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// `CalDAV` server configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CalDavConfig {
    /// Server URL, calendar discovery starts here
    /// (e.g. `https://cloud.example.com/remote.php/dav`).
    pub server_url: String,
    /// Calendar used by [`list_configured_events`](crate::CalDavClient::list_configured_events).
    #[serde(default)]
    pub calendar_path: Option<String>,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How many times discovery may follow a principal resource.
    #[serde(default = "default_principal_hops")]
    pub max_principal_hops: u8,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("tinycal-caldav/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_principal_hops() -> u8 {
    1
}

impl CalDavConfig {
    /// Checks that the server URL is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::InvalidArgument`] if the URL is empty, malformed
    /// or uses another scheme.
    pub fn validate(&self) -> Result<(), CalDavError> {
        if self.server_url.trim().is_empty() {
            return Err(CalDavError::InvalidArgument(
                "server URL must not be empty".to_string(),
            ));
        }

        let url = Url::parse(&self.server_url).map_err(|e| {
            CalDavError::InvalidArgument(format!("invalid server URL {}: {e}", self.server_url))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CalDavError::InvalidArgument(format!(
                "unsupported URL scheme: {scheme}"
            ))),
        }
    }
}

impl Default for CalDavConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            calendar_path: None,
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            max_principal_hops: default_principal_hops(),
        }
    }
}
