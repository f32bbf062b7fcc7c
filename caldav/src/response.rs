// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsers for WebDAV/CalDAV operations.

use tracing::{debug, warn};

use crate::buffer::try_push;
use crate::error::CalDavError;
use crate::ical::{extract_ical_field, vevent_blocks};
use crate::types::{Calendar, ETag, Event, Href};
use crate::xml::{contains_element, elements, extract_xml_tag_value, first_element};

/// Markers of an HTML page served in place of a multistatus document, typically
/// a login redirect or a misrouted URL.
const HTML_MARKERS: [&str; 4] = ["<!DOCTYPE html>", "<!doctype html>", "<html>", "<html "];

/// Calendars found in a PROPFIND multistatus response.
#[derive(Debug, Clone, Default)]
pub struct CalendarDiscovery {
    /// Calendar collections, in document order.
    pub calendars: Vec<Calendar>,
    /// Href of the first principal resource, if any.
    pub principal: Option<Href>,
}

impl CalendarDiscovery {
    /// Parses a PROPFIND multistatus response.
    ///
    /// Every `response` whose `resourcetype` holds a `calendar` element becomes
    /// a [`Calendar`]; the href of the first one holding a `principal` element
    /// is kept as a fallback for discovery. Other resources are skipped, as
    /// are responses without an href.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Protocol`] if the body is an HTML page, or
    /// [`CalDavError::OutOfMemory`] if the result list cannot grow.
    pub fn from_xml(xml: &str) -> Result<Self, CalDavError> {
        if is_html(xml) {
            warn!("PROPFIND returned an HTML page instead of XML");
            return Err(CalDavError::Protocol(
                "expected a multistatus document, got an HTML page".to_string(),
            ));
        }

        let mut calendars = Vec::new();
        let mut principal = None;

        for block in elements(xml, "response") {
            let Some(href) = extract_xml_tag_value(block, "href")
                .map(str::trim)
                .filter(|href| !href.is_empty())
            else {
                debug!("skipping response without href");
                continue;
            };

            let Some(resource_type) = first_element(block, "resourcetype") else {
                continue;
            };

            if contains_element(resource_type, "calendar") {
                let calendar = parse_calendar(block, href);
                debug!(href, name = %calendar.name, "found calendar");
                try_push(&mut calendars, calendar, "collecting calendars")?;
            } else if principal.is_none() && contains_element(resource_type, "principal") {
                debug!(href, "found principal");
                principal = Some(Href::from(href));
            }
        }

        Ok(Self {
            calendars,
            principal,
        })
    }
}

fn parse_calendar(block: &str, href: &str) -> Calendar {
    let mut calendar = Calendar::new(Href::from(href));
    calendar.display_name = non_empty(extract_xml_tag_value(block, "displayname"));
    calendar.description = non_empty(extract_xml_tag_value(block, "calendar-description"));
    calendar.ctag = non_empty(extract_xml_tag_value(block, "getctag")).map(ETag::new);
    calendar
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn is_html(body: &str) -> bool {
    HTML_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Parses the events of a `calendar-query` REPORT response.
///
/// Each `BEGIN:VEVENT` ... `END:VEVENT` block yields one [`Event`]; fields
/// missing from a block stay unset. An unterminated block ends parsing
/// without error.
///
/// # Errors
///
/// Returns [`CalDavError::OutOfMemory`] if the result list cannot grow.
pub fn parse_events(text: &str) -> Result<Vec<Event>, CalDavError> {
    let mut events = Vec::new();

    for block in vevent_blocks(text) {
        let field = |name: &str| extract_ical_field(block, name).map(str::to_string);
        let event = Event {
            uid: field("UID:").unwrap_or_default(),
            summary: field("SUMMARY:"),
            description: field("DESCRIPTION:"),
            location: field("LOCATION:"),
            start_time: field("DTSTART"),
            end_time: field("DTEND"),
        };
        debug!(uid = %event.uid, summary = ?event.summary, "found event");
        try_push(&mut events, event, "collecting events")?;
    }

    Ok(events)
}
