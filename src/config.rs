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

use crate::render::{rgb, RGBInt};

use chrono_tz::Tz;

/// All rendered times are expressed in this timezone. Conversions go through
/// the tz database so historical DST transitions resolve correctly.
pub const DISPLAY_TZ: Tz = chrono_tz::Europe::Paris;

// CalenDO theme palette.
pub const RGB_PRIMARY: RGBInt = rgb(0x6B46C1);
pub const RGB_PRIMARY_DARK: RGBInt = rgb(0x553C9A);
pub const RGB_PRIMARY_LIGHT: RGBInt = rgb(0x805AD5);
pub const RGB_SECONDARY: RGBInt = rgb(0x9F7AEA);
pub const RGB_TERTIARY: RGBInt = rgb(0xE9D8FD);
pub const RGB_BACKGROUND: RGBInt = rgb(0xFAF5FF);
pub const RGB_FOREGROUND: RGBInt = rgb(0x1A202C);
pub const RGB_SURFACE: RGBInt = rgb(0xFFFFFF);
pub const RGB_ERROR: RGBInt = rgb(0xE53E3E);
pub const RGB_SUCCESS: RGBInt = rgb(0x38A169);
pub const RGB_WARNING: RGBInt = rgb(0xD69E2E);

pub const RGB_GRAY_100: RGBInt = rgb(0xF7FAFC);
pub const RGB_GRAY_200: RGBInt = rgb(0xEDF2F7);
pub const RGB_GRAY_300: RGBInt = rgb(0xE2E8F0);
pub const RGB_GRAY_400: RGBInt = rgb(0xCBD5E0);
pub const RGB_GRAY_500: RGBInt = rgb(0xA0ADB8);
pub const RGB_GRAY_600: RGBInt = rgb(0x718096);
pub const RGB_GRAY_700: RGBInt = rgb(0x4A5568);
pub const RGB_GRAY_800: RGBInt = rgb(0x2D3748);
pub const RGB_GRAY_900: RGBInt = rgb(0x1A202C);

/// Fill used for events whose planning is unknown or carries a bad color.
pub const RGB_DEFAULT_EVENT: RGBInt = rgb(0x8B5CF6);
pub const DEFAULT_EVENT_COLOR: &str = "#8B5CF6";
pub const DEFAULT_PLANNING_NAME: &str = "Default";

// Day-view geometry, in pixels.
pub const HOUR_HEIGHT: f64 = 60.0;
pub const TIME_COL_WIDTH: f64 = 80.0;
pub const MARGIN: f64 = 20.0;
pub const HEADER_HEIGHT: f64 = 60.0;

/// Extra canvas below the grid, reserved for the footer caption.
pub const FOOTER_MARGIN: f64 = 40.0;
/// Events may not extend into the last strip of the canvas.
pub const BOTTOM_MARGIN: f64 = 20.0;
/// Offset of the footer caption from the bottom edge.
pub const FOOTER_OFFSET: f64 = 30.0;

/// Boxes shorter than this are stretched so their title stays legible.
pub const MIN_EVENT_HEIGHT: f64 = 30.0;
/// Rendered duration is capped at one day even if the data claims more.
pub const MAX_EVENT_MINUTES: i64 = 24 * 60;

pub const EVENT_OUTLINE_WIDTH: f64 = 2.0;
pub const EVENT_BAR_WIDTH: f64 = 4.0;
pub const EVENT_PADDING: f64 = 8.0;
pub const TITLE_LINE_HEIGHT: f64 = 16.0;
pub const DETAIL_LINE_HEIGHT: f64 = 12.0;

pub const DEFAULT_CANVAS_WIDTH: i32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: i32 = 1000;
/// Requested sizes are advisory minimums; anything narrower than this cannot
/// hold the time column and margins.
pub const MIN_CANVAS_WIDTH: i32 = 320;

pub const FONT_HEADER: &str = "Sans Bold 20";
pub const FONT_TIME_LABEL: &str = "Sans 12";
pub const FONT_EVENT_TITLE: &str = "Sans Bold 14";
pub const FONT_EVENT_DETAIL: &str = "Sans 10";
pub const FONT_FOOTER: &str = "Sans 10";

/// Rough glyph width used only to truncate a single word that is wider than
/// its column on its own. Intentionally approximate.
pub const AVG_CHAR_WIDTH: f64 = 10.0;

pub const FOOTER_CAPTION: &str = "Generated by CalenDO Image Generator";

pub fn backend_url() -> String {
    std::env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:8080".into())
}
