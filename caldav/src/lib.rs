// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lightweight `CalDAV` client (RFC 4791): discovers calendar collections and
//! lists the events of a time range.
//!
//! Responses are read with small text scanners instead of an XML parser, which
//! keeps the client tolerant of the namespace prefixes and odd markup found in
//! the wild.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod buffer;
mod client;
mod config;
mod error;
mod http;
mod ical;
mod request;
mod response;
mod types;
mod xml;

pub use crate::buffer::{BASELINE_CAPACITY, ResponseBuffer};
pub use crate::client::CalDavClient;
pub use crate::config::{AuthMethod, CalDavConfig};
pub use crate::error::CalDavError;
pub use crate::http::{DavRequest, HttpClient, Transport};
pub use crate::ical::{VEventBlocks, extract_ical_field, vevent_blocks};
pub use crate::request::{CalendarQueryRequest, Prop, PropFindRequest, TimeRange, format_utc};
pub use crate::response::{CalendarDiscovery, parse_events};
pub use crate::types::{Calendar, CalendarList, ETag, Event, Href, server_root};
pub use crate::xml::{
    Elements, contains_element, elements, extract_xml_tag_value, first_element, ns,
};
