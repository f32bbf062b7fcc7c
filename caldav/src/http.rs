// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport: request descriptors and the reqwest-backed client.

use std::future::Future;

use reqwest::{Client, Method, RequestBuilder};

use crate::buffer::ResponseBuffer;
use crate::config::{AuthMethod, CalDavConfig};
use crate::error::CalDavError;

/// One HTTP exchange to perform, built fresh for every call.
#[derive(Debug, Clone)]
pub struct DavRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Extra headers, in order.
    pub headers: Vec<(&'static str, String)>,
    /// Request body.
    pub body: Option<String>,
}

impl DavRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub const fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if reqwest rejects the method token.
    pub fn propfind(url: String) -> Result<Self, CalDavError> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| CalDavError::InvalidArgument(format!("Invalid method: {e}")))?;
        Ok(Self::new(method, url))
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Sets an XML body and its content type.
    #[must_use]
    pub fn xml_body(mut self, body: String) -> Self {
        self.headers
            .push(("Content-Type", "application/xml; charset=utf-8".to_string()));
        self.body = Some(body);
        self
    }

    /// Returns the value of the first header named `name`, ignoring case.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Performs HTTP exchanges on behalf of the client.
///
/// Authentication, TLS and timeouts are the transport's business; the client
/// only sees the status code and the body.
pub trait Transport: Send + Sync {
    /// Performs `request`, feeding the response body chunk by chunk into
    /// `sink`, and returns the status code.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Connection`] if the exchange cannot complete,
    /// or the error raised by `sink`.
    fn perform(
        &self,
        request: &DavRequest,
        sink: &mut ResponseBuffer,
    ) -> impl Future<Output = Result<u16, CalDavError>> + Send;
}

/// HTTP client for `CalDAV` operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    auth: AuthMethod,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::InvalidArgument`] if the HTTP client cannot be
    /// built from the configuration.
    pub fn new(config: &CalDavConfig) -> Result<Self, CalDavError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CalDavError::InvalidArgument(format!("invalid HTTP client setup: {e}")))?;
        Ok(Self {
            client,
            auth: config.auth.clone(),
        })
    }

    /// Builds a request with authentication headers.
    fn build_request(&self, request: &DavRequest) -> RequestBuilder {
        let mut req = self.client.request(request.method.clone(), &request.url);

        match &self.auth {
            AuthMethod::Basic { username, password } => {
                req = req.basic_auth(username, Some(password));
            }
            AuthMethod::Bearer { token } => {
                req = req.bearer_auth(token);
            }
            AuthMethod::None => {}
        }

        for (name, value) in &request.headers {
            req = req.header(*name, value);
        }

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        req
    }
}

impl Transport for HttpClient {
    async fn perform(
        &self,
        request: &DavRequest,
        sink: &mut ResponseBuffer,
    ) -> Result<u16, CalDavError> {
        let mut resp = self.build_request(request).send().await?;
        let status = resp.status().as_u16();

        while let Some(chunk) = resp.chunk().await? {
            sink.accept(&chunk)?;
        }

        Ok(status)
    }
}
