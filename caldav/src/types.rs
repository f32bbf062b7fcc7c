// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use url::{Position, Url};

use crate::error::CalDavError;

/// Calendar resource href (path).
///
/// A `Href` represents the path to a calendar resource on a `CalDAV` server,
/// such as `/calendars/user/event1.ics`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(String);

impl Href {
    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last non-empty path segment, e.g. `work` for
    /// `/calendars/alice/work/`.
    ///
    /// Returns `None` if the href contains no `/`.
    #[must_use]
    pub fn last_segment(&self) -> Option<&str> {
        if !self.0.contains('/') {
            return None;
        }
        self.0.split('/').rfind(|segment| !segment.is_empty())
    }

    /// Resolves the href into an absolute URL.
    ///
    /// Absolute URLs are returned unchanged, absolute paths are joined to the
    /// scheme and authority of `base_url`, relative paths are appended to
    /// `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::InvalidArgument`] if `base_url` is not an
    /// absolute URL.
    pub fn resolve(&self, base_url: &str) -> Result<String, CalDavError> {
        if self.is_absolute() {
            return Ok(self.0.clone());
        }

        if self.0.starts_with('/') {
            return Ok(format!("{}{}", server_root(base_url)?, self.0));
        }

        Ok(format!("{}/{}", base_url.trim_end_matches('/'), self.0))
    }

    /// Like [`resolve`](Self::resolve), but never leaves the origin of
    /// `base_url`: an absolute URL keeps only its path and query.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::InvalidArgument`] if `base_url` is not an
    /// absolute URL or the href is a malformed absolute URL.
    pub fn resolve_on_origin(&self, base_url: &str) -> Result<String, CalDavError> {
        if !self.is_absolute() {
            return self.resolve(base_url);
        }

        let parsed = Url::parse(&self.0)
            .map_err(|e| CalDavError::InvalidArgument(format!("invalid URL {}: {e}", self.0)))?;
        Ok(format!(
            "{}{}",
            server_root(base_url)?,
            &parsed[Position::BeforePath..Position::AfterQuery]
        ))
    }

    /// Whether the href is an absolute http(s) URL.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

/// Returns the scheme and authority of `url`, e.g. `https://dav.example.com:8443`.
///
/// # Errors
///
/// Returns [`CalDavError::InvalidArgument`] if `url` cannot be parsed.
pub fn server_root(url: &str) -> Result<String, CalDavError> {
    let parsed = Url::parse(url)
        .map_err(|e| CalDavError::InvalidArgument(format!("invalid URL {url}: {e}")))?;
    if !parsed.has_host() {
        return Err(CalDavError::InvalidArgument(format!(
            "URL has no host: {url}"
        )));
    }
    Ok(parsed[..Position::BeforePath].to_string())
}

impl Deref for Href {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Href {
    fn from(href: String) -> Self {
        Self(href)
    }
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self(href.to_string())
    }
}

/// Entity tag for change detection.
///
/// An `ETag` represents an entity tag returned by the `CalDAV` server,
/// used for optimistic concurrency control and change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ETag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A calendar collection found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// Short identifier, the last non-empty segment of `path` (empty when the
    /// path has no `/`).
    pub name: String,
    /// The href of the calendar collection.
    pub path: Href,
    /// The display name of the calendar.
    pub display_name: Option<String>,
    /// The description of the calendar.
    pub description: Option<String>,
    /// The collection tag (`CTag`) for change detection.
    pub ctag: Option<ETag>,
}

impl Calendar {
    /// Creates a new `Calendar`, deriving its name from `path`.
    #[must_use]
    pub fn new(path: Href) -> Self {
        let name = path.last_segment().unwrap_or_default().to_string();
        Self {
            name,
            path,
            display_name: None,
            description: None,
            ctag: None,
        }
    }

    /// Whether `name` equals the calendar's name or display name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.display_name.as_deref() == Some(name)
    }
}

/// Calendars in the order the server listed them.
///
/// Duplicated hrefs are kept as the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarList(Vec<Calendar>);

impl CalendarList {
    /// Creates a new `CalendarList`.
    #[must_use]
    pub const fn new(calendars: Vec<Calendar>) -> Self {
        Self(calendars)
    }

    /// Returns the first calendar whose name or display name is `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Calendar> {
        self.0.iter().find(|calendar| calendar.matches(name))
    }

    /// Like [`find_by_name`](Self::find_by_name), but a miss is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::NotFound`] if no calendar matches.
    pub fn get_by_name(&self, name: &str) -> Result<&Calendar, CalDavError> {
        self.find_by_name(name)
            .ok_or_else(|| CalDavError::NotFound(name.to_string()))
    }
}

impl Deref for CalendarList {
    type Target = [Calendar];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Calendar>> for CalendarList {
    fn from(calendars: Vec<Calendar>) -> Self {
        Self(calendars)
    }
}

impl IntoIterator for CalendarList {
    type Item = Calendar;
    type IntoIter = std::vec::IntoIter<Calendar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CalendarList {
    type Item = &'a Calendar;
    type IntoIter = std::slice::Iter<'a, Calendar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An event read from a `VEVENT` block.
///
/// Date-times are kept as the raw iCalendar values (e.g. `20240101T090000Z`
/// or `20240101` for all-day events).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Unique identifier, empty if the block has no `UID`.
    pub uid: String,
    /// Title of the event.
    pub summary: Option<String>,
    /// Description of the event.
    pub description: Option<String>,
    /// Location of the event.
    pub location: Option<String>,
    /// Raw `DTSTART` value.
    pub start_time: Option<String>,
    /// Raw `DTEND` value.
    pub end_time: Option<String>,
}
