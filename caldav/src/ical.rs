// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Line-based iCalendar scanning.
//!
//! Only what event listing needs: locating `VEVENT` blocks and reading the
//! value of a property. Folded lines are not unfolded, parameters are skipped,
//! escapes are left as they are.

const BEGIN_VEVENT: &str = "BEGIN:VEVENT";
const END_VEVENT: &str = "END:VEVENT";

/// Extracts the value of the first property matching `field`.
///
/// `field` is either a full prefix ending in `:` (`"SUMMARY:"`) or a bare
/// property name (`"DTSTART"`). For a bare name, any parameters up to the
/// first `:` on the same line are skipped, so `DTSTART;TZID=UTC:20240101T090000Z`
/// yields `20240101T090000Z`. The value ends at the next `\n` or `\r`.
#[must_use]
pub fn extract_ical_field<'a>(text: &'a str, field: &str) -> Option<&'a str> {
    if field.is_empty() {
        return None;
    }

    let start = text.find(field)? + field.len();
    let rest = text.get(start..)?;
    let line = rest
        .find(['\n', '\r'])
        .and_then(|end| rest.get(..end))
        .unwrap_or(rest);

    if field.ends_with(':') {
        Some(line)
    } else {
        Some(line.split_once(':').map_or(line, |(_, value)| value))
    }
}

/// Iterator over `BEGIN:VEVENT` ... `END:VEVENT` blocks.
///
/// Created by [`vevent_blocks`].
#[derive(Debug, Clone)]
pub struct VEventBlocks<'a> {
    text: &'a str,
    cursor: usize,
}

/// Iterates the non-overlapping `VEVENT` blocks of `text` in order, markers
/// included. A block without `END:VEVENT` ends the iteration.
#[must_use]
pub const fn vevent_blocks(text: &str) -> VEventBlocks<'_> {
    VEventBlocks { text, cursor: 0 }
}

impl<'a> Iterator for VEventBlocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.text.get(self.cursor..)?;
        let begin = rest.find(BEGIN_VEVENT)?;
        let Some(end) = rest
            .get(begin..)
            .and_then(|block| block.find(END_VEVENT))
            .map(|offset| begin + offset + END_VEVENT.len())
        else {
            self.cursor = self.text.len();
            return None;
        };

        let block = rest.get(begin..end);
        self.cursor += end;
        block
    }
}
