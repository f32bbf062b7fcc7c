// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for `CalDAV` operations.

use std::io::Cursor;

use jiff::Timestamp;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::CalDavError;
use crate::xml::ns;

/// Date-time format of `CalDAV` time ranges.
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// PROPFIND request builder.
#[derive(Debug)]
pub struct PropFindRequest {
    props: Vec<Prop>,
}

/// Properties to request in PROPFIND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// Resource type.
    ResourceType,
    /// Display name.
    DisplayName,
    /// Calendar description.
    CalendarDescription,
    /// Collection tag.
    GetCTag,
}

impl Prop {
    const fn name(self) -> &'static str {
        match self {
            Self::ResourceType => "resourcetype",
            Self::DisplayName => "displayname",
            Self::CalendarDescription => "calendar-description",
            Self::GetCTag => "getctag",
        }
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::ResourceType | Self::DisplayName => "D",
            Self::CalendarDescription => "C",
            Self::GetCTag => "CS",
        }
    }
}

impl PropFindRequest {
    /// Creates a new PROPFIND request.
    #[must_use]
    pub fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// The request used for calendar discovery.
    #[must_use]
    pub fn calendars() -> Self {
        let mut request = Self::new();
        request
            .add_property(Prop::ResourceType)
            .add_property(Prop::DisplayName)
            .add_property(Prop::CalendarDescription)
            .add_property(Prop::GetCTag);
        request
    }

    /// Adds a property to the request.
    pub fn add_property(&mut self, prop: Prop) -> &mut Self {
        self.props.push(prop);
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        // <D:propfind xmlns:D="DAV:" xmlns:C="..." xmlns:CS="...">
        let mut propfind = BytesStart::new("D:propfind");
        propfind.push_attribute(("xmlns:D", ns::DAV));
        if self.props.iter().any(|p| p.prefix() == "C") {
            propfind.push_attribute(("xmlns:C", ns::CALDAV));
        }
        if self.props.iter().any(|p| p.prefix() == "CS") {
            propfind.push_attribute(("xmlns:CS", ns::CALENDARSERVER));
        }
        writer.write_event(Event::Start(propfind))?;

        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        for prop in &self.props {
            let elem = format!("{}:{}", prop.prefix(), prop.name());
            writer.write_event(Event::Empty(BytesStart::new(elem)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

        into_string(writer)
    }
}

impl Default for PropFindRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Time range filter for calendar queries, start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range.
    pub start: Timestamp,
    /// End of the range.
    pub end: Timestamp,
}

impl TimeRange {
    /// Creates a new time range.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::InvalidArgument`] if `end` is before `start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CalDavError> {
        if end < start {
            return Err(CalDavError::InvalidArgument(format!(
                "time range ends before it starts: {start} > {end}"
            )));
        }
        Ok(Self { start, end })
    }
}

/// Formats a timestamp as a `CalDAV` UTC date-time (`YYYYMMDDTHHMMSSZ`).
#[must_use]
pub fn format_utc(timestamp: Timestamp) -> String {
    timestamp.strftime(UTC_FORMAT).to_string()
}

/// Calendar query request builder, selecting the `VEVENT`s of a time range.
#[derive(Debug)]
pub struct CalendarQueryRequest {
    time_range: TimeRange,
}

impl CalendarQueryRequest {
    /// Creates a new calendar query request.
    #[must_use]
    pub const fn new(time_range: TimeRange) -> Self {
        Self { time_range }
    }

    /// Builds the XML body for the calendar query request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        // <C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
        let mut calendar_query = BytesStart::new("C:calendar-query");
        calendar_query.push_attribute(("xmlns:D", ns::DAV));
        calendar_query.push_attribute(("xmlns:C", ns::CALDAV));
        writer.write_event(Event::Start(calendar_query))?;

        // <D:prop>
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        writer.write_event(Event::Empty(BytesStart::new("D:getetag")))?;
        writer.write_event(Event::Empty(BytesStart::new("C:calendar-data")))?;
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

        // <C:filter>
        writer.write_event(Event::Start(BytesStart::new("C:filter")))?;

        let mut vcalendar = BytesStart::new("C:comp-filter");
        vcalendar.push_attribute(("name", "VCALENDAR"));
        writer.write_event(Event::Start(vcalendar))?;

        let mut vevent = BytesStart::new("C:comp-filter");
        vevent.push_attribute(("name", "VEVENT"));
        writer.write_event(Event::Start(vevent))?;

        let start = format_utc(self.time_range.start);
        let end = format_utc(self.time_range.end);
        let mut time_range = BytesStart::new("C:time-range");
        time_range.push_attribute(("start", start.as_str()));
        time_range.push_attribute(("end", end.as_str()));
        writer.write_event(Event::Empty(time_range))?;

        writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;
        writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;

        // </C:filter>
        writer.write_event(Event::End(BytesEnd::new("C:filter")))?;

        // </C:calendar-query>
        writer.write_event(Event::End(BytesEnd::new("C:calendar-query")))?;

        into_string(writer)
    }
}

fn into_string(writer: Writer<Cursor<Vec<u8>>>) -> Result<String, CalDavError> {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| CalDavError::Xml(format!("UTF-8 error: {e}")))
}
