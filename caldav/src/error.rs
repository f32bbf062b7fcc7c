// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// `CalDAV` client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CalDavError {
    /// A required input was empty or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An allocation failed while growing a buffer or a result list.
    #[error("Out of memory while {0}")]
    OutOfMemory(&'static str),

    /// The transport could not complete the exchange.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with an unexpected status code.
    #[error("Unexpected HTTP status {status} from {url}")]
    Http {
        /// Status code returned by the server.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The response body is not a usable `WebDAV` document.
    #[error("Invalid server response: {0}")]
    Protocol(String),

    /// Authentication error.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// No calendar matched the requested name.
    #[error("Calendar not found: {0}")]
    NotFound(String),

    /// XML writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// The operation is not supported yet.
    #[error("Not supported yet: {0}")]
    Unimplemented(&'static str),
}

impl From<reqwest::Error> for CalDavError {
    fn from(e: reqwest::Error) -> Self {
        Self::Connection(e.to_string())
    }
}

impl From<quick_xml::Error> for CalDavError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<std::io::Error> for CalDavError {
    fn from(e: std::io::Error) -> Self {
        Self::Xml(format!("IO error: {e}"))
    }
}
