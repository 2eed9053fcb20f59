// Copyright 2025 CalenDO developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions: The above copyright
// notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Timezone-aware normalization of wire timestamps, plus the visible hour
//! window derived from a day's events.

use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use thiserror::Error;

use tracing::info;

use crate::config::DISPLAY_TZ;
use crate::data::Event;

#[derive(Error, Debug)]
#[error("unparseable timestamp {raw:?}")]
pub struct TimestampError {
    raw: String,
    #[source]
    source: chrono::ParseError,
}

/// Parse an RFC 3339 wire timestamp into the display timezone.
///
/// The backend serializes instants with either a `Z` suffix or an explicit
/// offset; both resolve to the same UTC instant before conversion.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Tz>, TimestampError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&DISPLAY_TZ))
        .map_err(|source| TimestampError {
            raw: raw.into(),
            source,
        })
}

/// Calendar date of an instant in the display timezone. Day membership for
/// incoming events is decided with this, applied to their start instant.
pub fn local_date(instant: DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Generic `(hour, minute)` components in the display timezone.
pub fn time_components(instant: DateTime<Tz>) -> (u32, u32) {
    (instant.hour(), instant.minute())
}

/// `(hour, minute)` components for rendering an end time.
///
/// An end instant that lands exactly on local midnight of a date after the
/// reference date means "until the end of the reference day" and reads as
/// hour 24, never as hour 0 of the next day (which would produce an empty or
/// inverted box).
pub fn display_time_components(instant: DateTime<Tz>, reference: NaiveDate) -> (u32, u32) {
    if instant.hour() == 0 && instant.minute() == 0 && instant.date_naive() > reference {
        return (24, 0);
    }

    (instant.hour(), instant.minute())
}

/// The `[start_hour, end_hour)` slice of the day actually drawn on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimeWindow {
    pub fn visible_hours(&self) -> u32 {
        self.end_hour - self.start_hour
    }
}

/// Window shown when a day has no events at all.
pub const DEFAULT_WINDOW: TimeWindow = TimeWindow {
    start_hour: 8,
    end_hour: 18,
};

/// Derive the hour window for one day from its events: one hour of padding
/// above the earliest start and below the latest end, clamped to the 0-24
/// calendar day.
pub fn compute_time_window(events: &[Event], reference: NaiveDate) -> TimeWindow {
    if events.is_empty() {
        return DEFAULT_WINDOW;
    }

    let mut min_start = u32::max_value();
    let mut max_end = 0u32;

    for event in events {
        let (start_hour, _) = time_components(event.start);
        let (end_hour, _) = display_time_components(event.end, reference);

        min_start = min_start.min(start_hour);
        max_end = max_end.max(end_hour);
    }

    let start_hour = min_start.saturating_sub(1);
    let mut end_hour = (max_end + 1).min(24);

    // A day holding only inverted-duration events can put the latest "end"
    // before the earliest start; keep the window non-empty around the start.
    if end_hour <= start_hour {
        end_hour = (start_hour + 1).min(24);
    }

    info!(
        "Calculated time range: {}:00 - {}:00",
        start_hour, end_hour
    );

    TimeWindow {
        start_hour,
        end_hour,
    }
}
