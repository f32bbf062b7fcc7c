// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV` client for calendar operations.

use std::sync::Arc;

use jiff::Timestamp;
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::buffer::ResponseBuffer;
use crate::config::CalDavConfig;
use crate::error::CalDavError;
use crate::http::{DavRequest, HttpClient, Transport};
use crate::request::{CalendarQueryRequest, PropFindRequest, TimeRange};
use crate::response::{CalendarDiscovery, parse_events};
use crate::types::{Calendar, CalendarList, Event, Href, server_root};

/// `CalDAV` client for discovering calendars and listing their events.
///
/// # Example
///
/// ```ignore
/// use tinycal_caldav::{AuthMethod, CalDavClient, CalDavConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CalDavConfig {
///     server_url: "https://cloud.example.com/remote.php/dav".to_string(),
///     auth: AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = CalDavClient::new(config)?;
/// let calendars = client.list_calendars().await?;
/// if let Some(work) = calendars.find_by_name("Work") {
///     let start = "2025-01-01T00:00:00Z".parse()?;
///     let end = "2025-02-01T00:00:00Z".parse()?;
///     let events = client.list_calendar_events(work, start, end).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CalDavClient<T = HttpClient> {
    http: Arc<T>,
    config: CalDavConfig,
}

impl<T> Clone for CalDavClient<T> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            config: self.config.clone(),
        }
    }
}

impl CalDavClient<HttpClient> {
    /// Creates a new `CalDAV` client over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or HTTP client
    /// initialization fails.
    pub fn new(config: CalDavConfig) -> Result<Self, CalDavError> {
        let http = HttpClient::new(&config)?;
        Self::with_transport(config, http)
    }
}

impl<T: Transport> CalDavClient<T> {
    /// Creates a new `CalDAV` client over the given transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(config: CalDavConfig, transport: T) -> Result<Self, CalDavError> {
        config.validate()?;
        debug!(server = %config.server_url, "CalDAV client initialized");
        Ok(Self {
            http: Arc::new(transport),
            config,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &CalDavConfig {
        &self.config
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.http
    }

    /// Checks that the server is reachable and accepts the credentials.
    ///
    /// Sends a body-less PROPFIND with `Depth: 0` to the server URL and
    /// returns the status code on success.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Auth`] on 401, [`CalDavError::Http`] on any
    /// other status but 200, 204 and 207, and [`CalDavError::Connection`] if
    /// the server cannot be reached.
    pub async fn test_connection(&self) -> Result<u16, CalDavError> {
        let url = self.config.server_url.clone();
        let request = DavRequest::propfind(url.clone())?.header("Depth", "0");

        let (status, _) = self.exchange(&request).await?;
        match status {
            200 | 204 | 207 => {
                info!(status, "CalDAV connection successful");
                Ok(status)
            }
            401 => {
                warn!(%url, "authentication failed");
                Err(CalDavError::Auth(format!("server rejected credentials for {url}")))
            }
            status => {
                warn!(status, %url, "unexpected status code");
                Err(CalDavError::Http { status, url })
            }
        }
    }

    /// Lists the calendars reachable from the configured server URL.
    ///
    /// # Errors
    ///
    /// See [`discover_calendars`](Self::discover_calendars).
    pub async fn list_calendars(&self) -> Result<CalendarList, CalDavError> {
        self.discover_calendars(&self.config.server_url).await
    }

    /// Discovers the calendar collections below `base_url`.
    ///
    /// When the response lists no calendar but does list a principal, the
    /// principal is queried instead, at most `max_principal_hops` times. The
    /// principal is always looked up on the origin of `base_url`.
    /// Finding no calendar is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Http`] unless the server answers 200 or 207,
    /// [`CalDavError::Protocol`] if it answers with an HTML page, and
    /// [`CalDavError::Connection`] if it cannot be reached.
    pub async fn discover_calendars(&self, base_url: &str) -> Result<CalendarList, CalDavError> {
        if base_url.trim().is_empty() {
            return Err(CalDavError::InvalidArgument(
                "base URL must not be empty".to_string(),
            ));
        }

        let mut url = base_url.to_string();
        let mut hops_left = self.config.max_principal_hops;
        loop {
            let CalendarDiscovery {
                calendars,
                principal,
            } = self.propfind_calendars(&url).await?;

            match principal {
                Some(principal) if calendars.is_empty() => {
                    if hops_left == 0 {
                        warn!(%principal, "no calendars found, principal hop budget exhausted");
                        return Ok(CalendarList::default());
                    }
                    hops_left -= 1;
                    if principal.is_absolute()
                        && server_root(&principal).ok() != server_root(&url).ok()
                    {
                        warn!(
                            %principal,
                            %url,
                            "principal on another origin, keeping its path only"
                        );
                    }
                    url = principal.resolve_on_origin(&url)?;
                    info!(%url, "no calendars found, following principal");
                }
                _ => {
                    info!(count = calendars.len(), %url, "calendars discovered");
                    return Ok(CalendarList::new(calendars));
                }
            }
        }
    }

    async fn propfind_calendars(&self, url: &str) -> Result<CalendarDiscovery, CalDavError> {
        let body = PropFindRequest::calendars().build()?;
        let request = DavRequest::propfind(url.to_string())?
            .header("Depth", "1")
            .xml_body(body);

        let (status, xml) = self.exchange(&request).await?;
        if !matches!(status, 200 | 207) {
            warn!(status, %url, "calendar PROPFIND failed");
            return Err(CalDavError::Http {
                status,
                url: url.to_string(),
            });
        }

        CalendarDiscovery::from_xml(&xml)
    }

    /// Finds a calendar by name or display name.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::NotFound`] if no calendar matches, or any
    /// error of [`list_calendars`](Self::list_calendars).
    pub async fn find_calendar(&self, name: &str) -> Result<Calendar, CalDavError> {
        let calendars = self.list_calendars().await?;
        calendars.get_by_name(name).cloned()
    }

    /// Lists the events of a calendar that overlap `[start, end)`.
    ///
    /// `calendar_path` is either an absolute URL, a server-absolute path
    /// joined to the server's scheme and authority, or a path relative to the
    /// server URL. The server does the filtering; the events are returned as
    /// they come.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::InvalidArgument`] if the path is empty or the
    /// range is inverted, [`CalDavError::Http`] unless the server answers
    /// 207, and [`CalDavError::Connection`] if it cannot be reached.
    pub async fn list_events(
        &self,
        calendar_path: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Event>, CalDavError> {
        if calendar_path.trim().is_empty() {
            return Err(CalDavError::InvalidArgument(
                "calendar path must not be empty".to_string(),
            ));
        }

        let time_range = TimeRange::new(start, end)?;
        let url = Href::from(calendar_path).resolve(&self.config.server_url)?;
        debug!(%url, %start, %end, "querying events");

        let body = CalendarQueryRequest::new(time_range).build()?;
        let request = DavRequest::new(Method::POST, url.clone())
            .header("X-HTTP-Method-Override", "REPORT")
            .header("Depth", "1")
            .xml_body(body);

        let (status, text) = self.exchange(&request).await?;
        if status != 207 {
            warn!(status, %url, "calendar query failed");
            return Err(CalDavError::Http { status, url });
        }

        let events = parse_events(&text)?;
        info!(count = events.len(), %url, "events listed");
        Ok(events)
    }

    /// Lists the events of a discovered calendar that overlap `[start, end)`.
    ///
    /// # Errors
    ///
    /// See [`list_events`](Self::list_events).
    pub async fn list_calendar_events(
        &self,
        calendar: &Calendar,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Event>, CalDavError> {
        self.list_events(calendar.path.as_str(), start, end).await
    }

    /// Lists the events of the configured calendar that overlap `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::InvalidArgument`] if no calendar path is
    /// configured, otherwise see [`list_events`](Self::list_events).
    pub async fn list_configured_events(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Event>, CalDavError> {
        let path = self.config.calendar_path.as_deref().ok_or_else(|| {
            CalDavError::InvalidArgument("no calendar path configured".to_string())
        })?;
        self.list_events(path, start, end).await
    }

    /// Gets a single event by path.
    ///
    /// # Errors
    ///
    /// Always fails: [`CalDavError::InvalidArgument`] for an empty path,
    /// [`CalDavError::Unimplemented`] otherwise.
    #[allow(clippy::unused_async)]
    pub async fn get_event(&self, event_path: &str) -> Result<Event, CalDavError> {
        if event_path.trim().is_empty() {
            return Err(CalDavError::InvalidArgument(
                "event path must not be empty".to_string(),
            ));
        }

        warn!(event_path, "single event retrieval is not supported yet");
        Err(CalDavError::Unimplemented("retrieving a single event by path"))
    }

    /// Performs one exchange and returns the status code and body text.
    async fn exchange(&self, request: &DavRequest) -> Result<(u16, String), CalDavError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut buffer = ResponseBuffer::new();
        let status = self.http.perform(request, &mut buffer).await?;
        debug!(status, bytes = buffer.len(), "response received");

        Ok((status, buffer.into_text()))
    }
}
