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

mod config;
mod data;
mod geometry;
mod layout;
mod render;
mod server;
mod timeutil;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;

use tracing::info;

use config::DISPLAY_TZ;
use data::BackendClient;
use render::{render_day_view, RenderOptions};
use server::AppState;

#[derive(Parser)]
#[clap(version = "1.0", author = "CalenDO developers")]
struct Opts {
    /// Address to listen on in serve mode.
    #[clap(short, long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// Render a single date (YYYY-MM-DD) to a file instead of serving.
    #[clap(short, long)]
    date: Option<String>,

    /// Output path for one-shot rendering.
    #[clap(short, long, default_value = "day-view.png")]
    output: String,

    /// Canvas width in pixels (advisory minimum).
    #[clap(long, default_value = "800")]
    width: i32,

    /// Canvas height in pixels (advisory minimum).
    #[clap(long, default_value = "1000")]
    height: i32,

    /// Render built-in sample data instead of fetching from the backend.
    #[clap(short, long)]
    sample_data: bool,
}

async fn render_once(opts: &Opts, backend: &BackendClient) -> Result<()> {
    let date = match &opts.date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .context("Invalid date format. Use YYYY-MM-DD")?,
        None => Utc::now().with_timezone(&DISPLAY_TZ).date_naive(),
    };

    let events = if opts.sample_data {
        data::sample_events(date)
    } else {
        backend.events_for_day(date).await?
    };

    let render_opts = RenderOptions {
        width: opts.width,
        height: opts.height,
    };
    let image = render_day_view(&events, date, &render_opts)?;

    info!("Writing image...");
    std::fs::write(&opts.output, &image.png)
        .with_context(|| format!("Writing image to {:?}", opts.output))?;
    info!(
        "Wrote {}x{} day view for {} to {}",
        image.width, image.height, date, opts.output
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    tracing_subscriber::fmt::init();
    info!("Starting CalenDO day-view generator");

    let backend = Arc::new(BackendClient::new(config::backend_url()));

    if opts.sample_data || opts.date.is_some() {
        return render_once(&opts, &backend).await;
    }

    server::serve(&opts.listen, AppState { backend }).await?;

    Ok(())
}
