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

//! Pixel placement of positioned events on the day grid.

use chrono::NaiveDate;
use tracing::warn;

use crate::config::{
    BOTTOM_MARGIN, HEADER_HEIGHT, HOUR_HEIGHT, MARGIN, MAX_EVENT_MINUTES, MIN_EVENT_HEIGHT,
    TIME_COL_WIDTH,
};
use crate::layout::PositionedEvent;
use crate::timeutil::{display_time_components, time_components, TimeWindow};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl EventRect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Map a positioned event to its pixel rectangle on the canvas, or `None`
/// when nothing should be drawn for it.
///
/// Events outside the visible window, with empty or inverted visible ranges,
/// or whose arithmetic produces a degenerate rectangle are simply not
/// drawable. A box reaching below the canvas's usable area is truncated to
/// fit instead.
pub fn event_rect(
    positioned: &PositionedEvent<'_>,
    window: TimeWindow,
    canvas_width: f64,
    canvas_height: f64,
    reference: NaiveDate,
) -> Option<EventRect> {
    let event = positioned.event;

    let (start_hour, start_minute) = time_components(event.start);
    let (end_hour, end_minute) = display_time_components(event.end, reference);

    let start_minutes = i64::from(start_hour) * 60 + i64::from(start_minute);
    let end_minutes = i64::from(end_hour) * 60 + i64::from(end_minute);
    let range_start = i64::from(window.start_hour) * 60;
    let range_end = i64::from(window.end_hour) * 60;

    // Clamp to the visible window.
    let visible_start = start_minutes.max(range_start);
    let mut visible_end = end_minutes.min(range_end);

    if visible_start >= visible_end {
        return None;
    }

    if visible_end - visible_start > MAX_EVENT_MINUTES {
        warn!(
            uid = event.uid.as_str(),
            "Event duration capped to {} minutes for drawing", MAX_EVENT_MINUTES
        );
        visible_end = visible_start + MAX_EVENT_MINUTES;
    }

    let top = HEADER_HEIGHT + (visible_start - range_start) as f64 / 60.0 * HOUR_HEIGHT;
    let mut height = (visible_end - visible_start) as f64 / 60.0 * HOUR_HEIGHT;
    height = height.max(MIN_EVENT_HEIGHT);

    let available_width = canvas_width - TIME_COL_WIDTH - 2.0 * MARGIN;
    let slot_width = available_width / positioned.total_columns as f64;
    let left = TIME_COL_WIDTH + MARGIN + positioned.column as f64 * slot_width;

    for value in &[left, top, height, slot_width] {
        if !value.is_finite() {
            return None;
        }
    }
    if left < 0.0 || top < 0.0 || height <= 0.0 || slot_width <= 0.0 {
        return None;
    }

    // Never draw into the strip reserved at the bottom of the canvas.
    let max_bottom = canvas_height - BOTTOM_MARGIN;
    if top >= max_bottom {
        return None;
    }
    if top + height > max_bottom {
        height = max_bottom - top;
    }
    if height <= 0.0 {
        return None;
    }

    Some(EventRect {
        x: left,
        y: top,
        width: slot_width,
        height,
    })
}
