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

//! Day-view rasterization: a cairo canvas with pango text, drawn header to
//! footer and encoded as PNG.

use anyhow::Result;
use thiserror::Error;

use chrono::NaiveDate;
use pango::FontDescription;

use tracing::{error, info, warn};

use crate::config::*;
use crate::data::Event;
use crate::geometry::{event_rect, EventRect};
use crate::layout::{layout_events, PositionedEvent};
use crate::timeutil::{compute_time_window, TimeWindow};

pub type RGBInt = (u8, u8, u8);

pub const fn rgb(col: u32) -> RGBInt {
    let r = (col >> 16) as u8;
    let g = (col >> 8) as u8;
    let b = col as u8;

    (r, g, b)
}

const PANGO_SCALE: f64 = 1024.0;

#[derive(Clone, Copy, Debug)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl From<RGBInt> for Color {
    fn from(rgb: RGBInt) -> Self {
        Color {
            r: (rgb.0 as f64 * (1.0 / 255.0)),
            g: (rgb.1 as f64 * (1.0 / 255.0)),
            b: (rgb.2 as f64 * (1.0 / 255.0)),
        }
    }
}

/// Parse a `#RRGGBB` planning color. Anything else (wrong length, bad hex,
/// empty) is treated as absent rather than an error.
pub fn parse_hex_color(raw: &str) -> Option<RGBInt> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Pastel variant of a planning color used as the box fill.
pub fn lighten(color: RGBInt) -> RGBInt {
    (
        color.0.saturating_add(100),
        color.1.saturating_add(100),
        color.2.saturating_add(100),
    )
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cairo error: {0}")]
    CairoError(cairo::Status),
    #[error("Failed to create pango layout")]
    TextLayout,
}

impl From<cairo::Status> for RenderError {
    fn from(s: cairo::Status) -> Self {
        RenderError::CairoError(s)
    }
}

fn convert_err<E>(err: E) -> anyhow::Error
where
    RenderError: From<E>,
{
    RenderError::from(err).into()
}

/// A pixel buffer owned by exactly one render call.
pub struct Canvas {
    surface: cairo::ImageSurface,
    cr: cairo::Context,
    width: i32,
    height: i32,
}

impl Canvas {
    pub fn new(width: i32, height: i32, background: RGBInt) -> Result<Canvas> {
        let surface = cairo::ImageSurface::create(cairo::Format::Rgb24, width, height)
            .map_err(convert_err)?;
        let cr = cairo::Context::new(&surface);

        let canvas = Canvas {
            surface,
            cr,
            width,
            height,
        };
        canvas.fill_rect(0.0, 0.0, width as f64, height as f64, background);

        Ok(canvas)
    }

    pub fn width(&self) -> f64 {
        self.width as f64
    }

    pub fn height(&self) -> f64 {
        self.height as f64
    }

    pub fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, color: RGBInt) {
        let color: Color = color.into();
        self.cr.set_source_rgb(color.r, color.g, color.b);
        self.cr.new_path();
        self.cr.rectangle(x, y, w, h);
        self.cr.fill();
    }

    pub fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64, color: RGBInt, line_width: f64) {
        let color: Color = color.into();
        self.cr.set_source_rgb(color.r, color.g, color.b);
        self.cr.set_line_width(line_width);
        self.cr.new_path();
        self.cr.rectangle(x, y, w, h);
        self.cr.stroke();
    }

    pub fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: RGBInt, line_width: f64) {
        let color: Color = color.into();
        self.cr.set_source_rgb(color.r, color.g, color.b);
        self.cr.set_line_width(line_width);
        self.cr.new_path();
        self.cr.move_to(x1, y1);
        self.cr.line_to(x2, y2);
        self.cr.stroke();
    }

    fn prepare_layout(&self, font: &FontDescription, text: &str) -> Result<pango::Layout> {
        let layout = pangocairo::create_layout(&self.cr).ok_or(RenderError::TextLayout)?;
        layout.set_font_description(Some(font));
        layout.set_text(text);
        Ok(layout)
    }

    /// Logical extent of `text` in pixels, without drawing it.
    pub fn text_size(&self, text: &str, font: &FontDescription) -> Result<(f64, f64)> {
        let layout = self.prepare_layout(font, text)?;
        let (w, h) = layout.get_size();
        Ok((w as f64 / PANGO_SCALE, h as f64 / PANGO_SCALE))
    }

    /// Draw a single line of text with its top-left corner at `(x, y)`.
    pub fn text(&self, x: f64, y: f64, text: &str, font: &FontDescription, color: RGBInt) -> Result<()> {
        let color: Color = color.into();
        let layout = self.prepare_layout(font, text)?;

        self.cr.save();
        self.cr.set_source_rgb(color.r, color.g, color.b);
        self.cr.move_to(x, y);
        pangocairo::show_layout(&self.cr, &layout);
        self.cr.restore();

        Ok(())
    }

    /// Finish drawing and encode the buffer as PNG.
    pub fn into_png(self) -> Result<Vec<u8>> {
        let Canvas {
            mut surface, cr, ..
        } = self;
        std::mem::drop(cr);
        surface.flush();

        let mut bytes: Vec<u8> = Vec::new();
        surface.write_to_png(&mut bytes)?;
        Ok(bytes)
    }
}

/// Greedy word wrap against a pixel budget, measured with real text extents.
///
/// A single word wider than the budget on its own is cut to an approximate
/// character count and marked with an ellipsis; the estimate ignores the
/// actual glyph widths, so it can over- or under-shoot for narrow or wide
/// scripts. That imprecision is accepted.
pub fn wrap_text(
    canvas: &Canvas,
    text: &str,
    font: &FontDescription,
    max_width: f64,
) -> Result<Vec<String>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let (full_width, _) = canvas.text_size(text, font)?;
    if full_width <= max_width {
        return Ok(vec![text.to_string()]);
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        let (candidate_width, _) = canvas.text_size(&candidate, font)?;
        if candidate_width <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::replace(&mut current, String::new()));
        }

        let (word_width, _) = canvas.text_size(word, font)?;
        if word_width <= max_width {
            current = word.to_string();
        } else {
            lines.push(truncate_word(word, max_width));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    Ok(lines)
}

/// Character-count truncation for a word that cannot fit on a line at all.
pub fn truncate_word(word: &str, max_width: f64) -> String {
    let keep = ((max_width / AVG_CHAR_WIDTH) as usize).max(1);
    let truncated: String = word.chars().take(keep).collect();
    format!("{}...", truncated)
}

/// Grid labels use a 12-hour clock; hour 0 (and 24) reads "12 AM".
pub fn format_hour_label(hour: u32) -> String {
    let display_hour = hour % 24;
    if display_hour == 0 {
        "12 AM".into()
    } else if display_hour < 12 {
        format!("{} AM", display_hour)
    } else if display_hour == 12 {
        "12 PM".into()
    } else {
        format!("{} PM", display_hour - 12)
    }
}

/// How one positioned event fared during drawing. Failures never abort the
/// surrounding render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Drawn,
    NotDrawable,
    Failed,
}

#[derive(Debug, Default)]
pub struct RenderReport {
    pub outcomes: Vec<(String, EventOutcome)>,
}

impl RenderReport {
    fn record(&mut self, uid: &str, outcome: EventOutcome) {
        self.outcomes.push((uid.to_string(), outcome));
    }

    pub fn count(&self, outcome: EventOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

pub struct RenderedImage {
    pub png: Vec<u8>,
    pub width: i32,
    pub height: i32,
    pub report: RenderReport,
}

struct Fonts {
    header: FontDescription,
    time_label: FontDescription,
    title: FontDescription,
    detail: FontDescription,
    footer: FontDescription,
}

impl Fonts {
    fn new() -> Fonts {
        Fonts {
            header: FontDescription::from_string(FONT_HEADER),
            time_label: FontDescription::from_string(FONT_TIME_LABEL),
            title: FontDescription::from_string(FONT_EVENT_TITLE),
            detail: FontDescription::from_string(FONT_EVENT_DETAIL),
            footer: FontDescription::from_string(FONT_FOOTER),
        }
    }
}

/// Render one day's events into a PNG day view.
///
/// The requested dimensions are advisory minimums: the height grows until the
/// computed hour window fits. Per-event draw failures degrade to a logged
/// skip, never to a failed render.
pub fn render_day_view(
    events: &[Event],
    date: NaiveDate,
    opts: &RenderOptions,
) -> Result<RenderedImage> {
    info!(
        "Generating day view for {} with {} events",
        date,
        events.len()
    );

    let window = compute_time_window(events, date);

    let width = opts.width.max(MIN_CANVAS_WIDTH);
    let required_height =
        (HEADER_HEIGHT + f64::from(window.visible_hours()) * HOUR_HEIGHT + FOOTER_MARGIN).ceil()
            as i32;
    let height = opts.height.max(required_height);
    info!("Image dimensions: {}x{}", width, height);

    let canvas = Canvas::new(width, height, RGB_BACKGROUND)?;
    let fonts = Fonts::new();

    draw_header(&canvas, &fonts, date)?;
    draw_time_grid(&canvas, &fonts, window)?;

    let positioned = layout_events(events);
    let mut report = RenderReport::default();

    for pos in &positioned {
        let rect = match event_rect(pos, window, canvas.width(), canvas.height(), date) {
            Some(rect) => rect,
            None => {
                report.record(&pos.event.uid, EventOutcome::NotDrawable);
                continue;
            }
        };

        match draw_event(&canvas, &fonts, pos, &rect) {
            Ok(()) => report.record(&pos.event.uid, EventOutcome::Drawn),
            Err(err) => {
                error!("Error drawing event {}: {:#}", pos.event.uid, err);
                report.record(&pos.event.uid, EventOutcome::Failed);
            }
        }
    }

    draw_footer(&canvas, &fonts)?;

    if report.count(EventOutcome::Failed) > 0 {
        warn!(
            "{} of {} events failed to draw",
            report.count(EventOutcome::Failed),
            positioned.len()
        );
    }

    Ok(RenderedImage {
        png: canvas.into_png()?,
        width,
        height,
        report,
    })
}

fn draw_header(canvas: &Canvas, fonts: &Fonts, date: NaiveDate) -> Result<()> {
    canvas.fill_rect(0.0, 0.0, canvas.width(), HEADER_HEIGHT, RGB_PRIMARY);

    let title = date.format("%A, %B %d, %Y").to_string();
    let (text_width, text_height) = canvas.text_size(&title, &fonts.header)?;
    canvas.text(
        (canvas.width() - text_width) / 2.0,
        (HEADER_HEIGHT - text_height) / 2.0,
        &title,
        &fonts.header,
        RGB_SURFACE,
    )
}

fn draw_time_grid(canvas: &Canvas, fonts: &Fonts, window: TimeWindow) -> Result<()> {
    let visible_hours = window.visible_hours();
    let grid_height = f64::from(visible_hours) * HOUR_HEIGHT;
    let grid_bottom = HEADER_HEIGHT + grid_height;

    canvas.fill_rect(0.0, HEADER_HEIGHT, canvas.width(), grid_height, RGB_BACKGROUND);
    canvas.fill_rect(0.0, HEADER_HEIGHT, TIME_COL_WIDTH, grid_height, RGB_GRAY_100);

    for i in 0..=visible_hours {
        let y = HEADER_HEIGHT + f64::from(i) * HOUR_HEIGHT;
        canvas.line(0.0, y, canvas.width(), y, RGB_GRAY_300, 1.0);

        if i < visible_hours {
            let label = format_hour_label(window.start_hour + i);
            let (label_width, _) = canvas.text_size(&label, &fonts.time_label)?;
            canvas.text(
                (TIME_COL_WIDTH - label_width) / 2.0,
                y + 5.0,
                &label,
                &fonts.time_label,
                RGB_GRAY_600,
            )?;
        }
    }

    canvas.line(
        TIME_COL_WIDTH,
        HEADER_HEIGHT,
        TIME_COL_WIDTH,
        grid_bottom,
        RGB_GRAY_300,
        1.0,
    );

    Ok(())
}

fn draw_event(
    canvas: &Canvas,
    fonts: &Fonts,
    pos: &PositionedEvent<'_>,
    rect: &EventRect,
) -> Result<()> {
    let event = pos.event;
    let accent = parse_hex_color(&event.planning_color).unwrap_or(RGB_DEFAULT_EVENT);

    canvas.fill_rect(rect.x, rect.y, rect.width, rect.height, lighten(accent));
    canvas.stroke_rect(
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        accent,
        EVENT_OUTLINE_WIDTH,
    );
    canvas.fill_rect(rect.x, rect.y, EVENT_BAR_WIDTH, rect.height, accent);

    let text_x = rect.x + EVENT_PADDING;
    let text_width = rect.width - 2.0 * EVENT_PADDING;
    let text_bottom = rect.bottom() - 5.0;
    let mut cursor = rect.y + 5.0;

    if !event.summary.is_empty() {
        for line in wrap_text(canvas, &event.summary, &fonts.title, text_width)? {
            if cursor + TITLE_LINE_HEIGHT > text_bottom {
                break;
            }
            canvas.text(text_x, cursor, &line, &fonts.title, RGB_FOREGROUND)?;
            cursor += TITLE_LINE_HEIGHT;
        }
    }

    // Time range in the display timezone.
    let time_text = format!(
        "{} - {}",
        event.start.format("%H:%M"),
        event.end.format("%H:%M")
    );
    cursor += 4.0;
    if cursor + DETAIL_LINE_HEIGHT <= text_bottom {
        canvas.text(text_x, cursor, &time_text, &fonts.detail, RGB_GRAY_600)?;
        cursor += 15.0;
    }

    if !event.location.is_empty() && cursor + DETAIL_LINE_HEIGHT <= text_bottom {
        let location = format!("@ {}", event.location);
        for line in wrap_text(canvas, &location, &fonts.detail, text_width)? {
            if cursor + DETAIL_LINE_HEIGHT > text_bottom {
                break;
            }
            canvas.text(text_x, cursor, &line, &fonts.detail, RGB_GRAY_600)?;
            cursor += DETAIL_LINE_HEIGHT;
        }
    }

    // The planning name only fits on reasonably tall boxes.
    if rect.height > 70.0 && cursor + DETAIL_LINE_HEIGHT <= text_bottom {
        let name = format!("• {}", event.planning_name);
        for line in wrap_text(canvas, &name, &fonts.detail, text_width)? {
            if cursor + DETAIL_LINE_HEIGHT > text_bottom {
                break;
            }
            canvas.text(text_x, cursor, &line, &fonts.detail, RGB_GRAY_500)?;
            cursor += DETAIL_LINE_HEIGHT;
        }
    }

    Ok(())
}

fn draw_footer(canvas: &Canvas, fonts: &Fonts) -> Result<()> {
    canvas.text(
        MARGIN,
        canvas.height() - FOOTER_OFFSET,
        FOOTER_CAPTION,
        &fonts.footer,
        RGB_GRAY_500,
    )
}
