// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML utilities for WebDAV/CalDAV processing.
//!
//! Responses are scanned as text rather than parsed: servers disagree on
//! namespace prefixes and some emit XML that a strict parser rejects. The
//! scanners know nothing about nesting of same-named elements, CDATA sections
//! or comments.

/// XML namespaces used in `CalDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CalDAV` namespace.
    pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

    /// Apple calendar server namespace (`getctag`).
    pub const CALENDARSERVER: &str = "http://calendarserver.org/ns/";
}

/// Extracts the text between the first `tag` element and its closing tag.
///
/// The opening tag is searched as `<tag>` first and then as `:tag>`, which
/// accepts any single namespace prefix (`<D:tag>`, `<C1:tag>`). The value runs
/// from the `>` of the opening tag up to `</tag>`, or failing that up to a
/// prefixed close such as `</D:tag>` (the malformed `<D:/tag>` is accepted
/// too).
///
/// Returns `None` if either tag is missing. Self-closing elements and
/// elements carrying attributes are not recognised.
#[must_use]
pub fn extract_xml_tag_value<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    if tag.is_empty() {
        return None;
    }

    let open = find_framed(text, 0, "<", tag, ">")
        .or_else(|| find_framed(text, 0, ":", tag, ">"))?;
    let start = open + text.get(open..)?.find('>')? + 1;
    let end = find_framed(text, start, "</", tag, ">")
        .or_else(|| find_prefixed_close(text, start, tag))?;

    text.get(start..end)
}

/// Finds `{lead}{tag}{trail}` at or after `from`; returns the offset of `lead`.
fn find_framed(text: &str, from: usize, lead: &str, tag: &str, trail: &str) -> Option<usize> {
    let hay = text.get(from..)?;
    hay.match_indices(tag).find_map(|(at, _)| {
        let start = at.checked_sub(lead.len())?;
        let framed = hay.get(start..at)? == lead && hay.get(at + tag.len()..)?.starts_with(trail);
        framed.then_some(from + start)
    })
}

/// Finds `</X:tag>` (or `<X:/tag>`) at or after `from`; returns the offset of `<`.
fn find_prefixed_close(text: &str, from: usize, tag: &str) -> Option<usize> {
    let mut cursor = from;
    while let Some(colon) = find_framed(text, cursor, ":", tag, ">") {
        if let Some(lt) = text.get(from..colon).and_then(|s| s.rfind('<')) {
            let lt = from + lt;
            if text
                .get(lt..colon)
                .and_then(|s| s.strip_prefix("</"))
                .is_some_and(is_prefix)
            {
                return Some(lt);
            }
        }
        cursor = colon + 1;
    }

    let colon = find_framed(text, from, ":/", tag, ">")?;
    let lt = text.get(from..colon)?.rfind('<')?;
    Some(from + lt)
}

fn is_prefix(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// A tag found by [`next_tag`].
#[derive(Debug, Clone, Copy)]
struct Tag<'a> {
    /// Offset of `<`.
    start: usize,
    /// Offset just past `>`.
    end: usize,
    /// Qualified name, prefix included.
    name: &'a str,
    closing: bool,
    self_closing: bool,
}

impl Tag<'_> {
    fn local_name(&self) -> &str {
        self.name.rsplit_once(':').map_or(self.name, |(_, local)| local)
    }

    fn opens(&self, local: &str) -> bool {
        !self.closing && self.local_name() == local
    }

    fn closes(&self, local: &str) -> bool {
        self.closing && self.local_name() == local
    }
}

fn next_tag(text: &str, from: usize) -> Option<Tag<'_>> {
    let start = from + text.get(from..)?.find('<')?;
    let rest = text.get(start + 1..)?;
    let (closing, name_at) = match rest.strip_prefix('/') {
        Some(_) => (true, start + 2),
        None => (false, start + 1),
    };

    let tail = text.get(name_at..)?;
    let name_len = tail
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(tail.len());
    let name = tail.get(..name_len)?;
    let gt = name_at + tail.find('>')?;
    let self_closing = text.get(..gt).is_some_and(|s| s.ends_with('/'));

    Some(Tag {
        start,
        end: gt + 1,
        name,
        closing,
        self_closing,
    })
}

/// Iterator over the contents of the elements with a given local name.
///
/// Created by [`elements`].
#[derive(Debug, Clone)]
pub struct Elements<'a> {
    text: &'a str,
    local: &'a str,
    cursor: usize,
}

/// Iterates the inner text of every `local` element, whatever its prefix, in
/// document order. Iteration stops at an element that is never closed.
#[must_use]
pub fn elements<'a>(text: &'a str, local: &'a str) -> Elements<'a> {
    Elements {
        text,
        local,
        cursor: 0,
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let open = loop {
            let tag = next_tag(self.text, self.cursor)?;
            self.cursor = tag.end;
            if tag.opens(self.local) && !tag.self_closing {
                break tag;
            }
        };

        loop {
            let Some(tag) = next_tag(self.text, self.cursor) else {
                self.cursor = self.text.len();
                return None;
            };
            self.cursor = tag.end;
            if tag.closes(self.local) {
                return self.text.get(open.end..tag.start);
            }
        }
    }
}

/// Returns the inner text of the first `local` element, whatever its prefix.
#[must_use]
pub fn first_element<'a>(text: &'a str, local: &'a str) -> Option<&'a str> {
    elements(text, local).next()
}

/// Whether `text` contains a `local` element, open or self-closing, whatever
/// its prefix.
#[must_use]
pub fn contains_element(text: &str, local: &str) -> bool {
    let mut cursor = 0;
    while let Some(tag) = next_tag(text, cursor) {
        if tag.opens(local) {
            return true;
        }
        cursor = tag.end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_value_with_namespace_prefix() {
        assert_eq!(
            extract_xml_tag_value("<D:displayname>Work</D:displayname>", "displayname"),
            Some("Work")
        );
        assert_eq!(
            extract_xml_tag_value(
                "<C1:calendar-description>Team</C1:calendar-description>",
                "calendar-description"
            ),
            Some("Team")
        );
    }

    #[test]
    fn tag_value_without_namespace() {
        assert_eq!(
            extract_xml_tag_value("<displayname>X</displayname>", "displayname"),
            Some("X")
        );
    }

    #[test]
    fn tag_value_prefers_unprefixed_open_tag() {
        let xml = "<D:href>/a/</D:href><href>/b/</href>";
        assert_eq!(extract_xml_tag_value(xml, "href"), Some("/b/"));
    }

    #[test]
    fn tag_value_accepts_malformed_prefixed_close() {
        assert_eq!(
            extract_xml_tag_value("<D:displayname>Work<D:/displayname>", "displayname"),
            Some("Work")
        );
    }

    #[test]
    fn tag_value_empty_element() {
        assert_eq!(
            extract_xml_tag_value("<D:displayname></D:displayname>", "displayname"),
            Some("")
        );
    }

    #[test]
    fn tag_value_missing_open_or_close() {
        assert_eq!(extract_xml_tag_value("<D:href>/cal/</D:href>", "displayname"), None);
        assert_eq!(extract_xml_tag_value("<D:displayname>Work", "displayname"), None);
        assert_eq!(extract_xml_tag_value("<D:displayname/>", "displayname"), None);
        assert_eq!(extract_xml_tag_value("<displayname>x</displayname>", ""), None);
    }

    #[test]
    fn tag_value_does_not_match_longer_names() {
        let xml = "<C:calendar-description>Desc</C:calendar-description>";
        assert_eq!(extract_xml_tag_value(xml, "description"), None);
    }

    #[test]
    fn elements_iterates_prefixed_blocks_in_order() {
        let xml = "<D:multistatus><D:response>one</D:response>\
                   <response>two</response><d:response xmlns:d=\"DAV:\">three</d:response>\
                   <D:responsedescription>x</D:responsedescription></D:multistatus>";
        let blocks: Vec<_> = elements(xml, "response").collect();
        assert_eq!(blocks, vec!["one", "two", "three"]);
    }

    #[test]
    fn elements_stops_at_unclosed_block() {
        let xml = "<D:response>one</D:response><D:response>two";
        let blocks: Vec<_> = elements(xml, "response").collect();
        assert_eq!(blocks, vec!["one"]);
    }

    #[test]
    fn contains_element_checks_local_name() {
        let resource_type = "<D:collection/><C:calendar />";
        assert!(contains_element(resource_type, "calendar"));
        assert!(contains_element(resource_type, "collection"));
        assert!(!contains_element(resource_type, "principal"));
        assert!(!contains_element("<C:calendar-home-set/>", "calendar"));
        assert!(!contains_element("</C:calendar>", "calendar"));
    }

    #[test]
    fn first_element_returns_inner_text() {
        let xml = "<D:resourcetype><D:principal/></D:resourcetype>";
        assert_eq!(first_element(xml, "resourcetype"), Some("<D:principal/>"));
        assert_eq!(first_element(xml, "getetag"), None);
    }
}
