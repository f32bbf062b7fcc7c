// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response accumulation and fallible allocation helpers.

use tracing::debug;

use crate::error::CalDavError;

/// Capacity reserved when the first chunk of a response arrives.
pub const BASELINE_CAPACITY: usize = 4096;

/// Accumulates the chunks of one HTTP response body into a contiguous buffer.
///
/// Nothing is allocated until the first non-empty chunk arrives. From then on
/// the capacity is always the baseline times a power of two: whenever a chunk
/// does not fit, the capacity is doubled until it does.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl ResponseBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
        }
    }

    /// Appends a chunk of the response body.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::OutOfMemory`] if the buffer cannot grow.
    pub fn accept(&mut self, chunk: &[u8]) -> Result<(), CalDavError> {
        if chunk.is_empty() {
            return Ok(());
        }

        let needed = self
            .data
            .len()
            .checked_add(chunk.len())
            .ok_or(CalDavError::OutOfMemory("sizing the response buffer"))?;

        if needed > self.capacity {
            let mut capacity = if self.capacity == 0 {
                BASELINE_CAPACITY
            } else {
                self.capacity
            };
            while capacity < needed {
                capacity = capacity
                    .checked_mul(2)
                    .ok_or(CalDavError::OutOfMemory("sizing the response buffer"))?;
            }

            self.data
                .try_reserve_exact(capacity - self.data.len())
                .map_err(|_| CalDavError::OutOfMemory("growing the response buffer"))?;

            if self.capacity != 0 {
                debug!(capacity, "response buffer expanded");
            }
            self.capacity = capacity;
        }

        self.data.extend_from_slice(chunk);
        Ok(())
    }

    /// Number of bytes accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no bytes have been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Capacity granted by the growth policy (zero before the first chunk).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the accumulated bytes.
    #[must_use]
    pub fn finalize(self) -> Vec<u8> {
        self.data
    }

    /// Returns the accumulated bytes as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected, the scanners
    /// downstream only look for ASCII markers.
    #[must_use]
    pub fn into_text(self) -> String {
        match String::from_utf8(self.data) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

/// Pushes `item`, reporting allocation failure instead of aborting.
pub(crate) fn try_push<T>(
    items: &mut Vec<T>,
    item: T,
    context: &'static str,
) -> Result<(), CalDavError> {
    items
        .try_reserve(1)
        .map_err(|_| CalDavError::OutOfMemory(context))?;
    items.push(item);
    Ok(())
}
