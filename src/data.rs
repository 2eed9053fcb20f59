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

//! Event and planning records: wire DTOs from the CalenDO backend, the
//! resolved in-memory model, and the fetch-and-filter step that turns one
//! into the other.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use itertools::Itertools;
use serde::Deserialize;

use tracing::{info, warn};

use crate::config::{DEFAULT_EVENT_COLOR, DEFAULT_PLANNING_NAME, DISPLAY_TZ};
use crate::timeutil::{local_date, parse_timestamp};

/// One event as served by `GET /api/events`.
#[derive(Clone, Debug, Deserialize)]
pub struct EventRecord {
    pub uid: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_time: String,
    pub end_time: String,
    pub planning_id: String,
}

/// One planning as served by `GET /api/plannings`.
#[derive(Clone, Debug, Deserialize)]
pub struct PlanningRecord {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
}

/// A resolved event: timestamps normalized to the display timezone, planning
/// color and name denormalized onto the event (with defaults when the
/// planning is unknown).
#[derive(Clone, Debug)]
pub struct Event {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub planning_id: String,
    pub planning_color: String,
    pub planning_name: String,
}

/// Resolve wire records into events for one calendar date.
///
/// Day membership is decided by the start instant's local date. An event
/// whose start or end timestamp fails to parse is dropped with a warning;
/// the rest of the request proceeds. Dropping is the single policy here: a
/// bad timestamp never aborts the whole render.
pub fn resolve_day_events(
    records: Vec<EventRecord>,
    plannings: &HashMap<String, PlanningRecord>,
    date: NaiveDate,
) -> Vec<Event> {
    let mut events = Vec::with_capacity(records.len());

    for record in records {
        let start = match parse_timestamp(&record.start_time) {
            Ok(start) => start,
            Err(err) => {
                warn!("Dropping event {}: {}", record.uid, err);
                continue;
            }
        };
        let end = match parse_timestamp(&record.end_time) {
            Ok(end) => end,
            Err(err) => {
                warn!("Dropping event {}: {}", record.uid, err);
                continue;
            }
        };

        if local_date(start) != date {
            continue;
        }

        let planning = plannings.get(&record.planning_id);
        events.push(Event {
            uid: record.uid,
            summary: record.summary,
            description: record.description,
            location: record.location,
            start,
            end,
            planning_id: record.planning_id,
            planning_color: planning
                .map(|p| p.color.clone())
                .unwrap_or_else(|| DEFAULT_EVENT_COLOR.into()),
            planning_name: planning
                .map(|p| p.name.clone())
                .unwrap_or_else(|| DEFAULT_PLANNING_NAME.into()),
        });
    }

    events
}

/// Client for the CalenDO backend REST API.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: String) -> BackendClient {
        BackendClient {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Fetch events and plannings and resolve the ones falling on `date`.
    ///
    /// The backend is queried once per request; there is no retry here. A
    /// transport or HTTP failure surfaces to the request boundary.
    #[tracing::instrument(skip(self))]
    pub async fn events_for_day(&self, date: NaiveDate) -> Result<Vec<Event>> {
        info!("Fetching data from backend...");

        let records: Vec<EventRecord> = self
            .get_json("/api/events")
            .await
            .context("Fetching events from backend")?;
        let plannings: Vec<PlanningRecord> = self
            .get_json("/api/plannings")
            .await
            .context("Fetching plannings from backend")?;

        let lookup: HashMap<String, PlanningRecord> = plannings
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let events = resolve_day_events(records, &lookup, date);
        info!(
            "{} events on {} across {} plannings",
            events.len(),
            date,
            events
                .iter()
                .map(|e| e.planning_id.as_str())
                .unique()
                .count()
        );

        Ok(events)
    }
}

fn sample_instant(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Tz> {
    let naive = date
        .and_hms_opt(hour, minute, 0)
        .expect("valid sample time of day");
    DISPLAY_TZ
        .from_local_datetime(&naive)
        .earliest()
        .expect("sample time exists in the display timezone")
}

/// Built-in data set for offline smoke rendering: overlap within and across
/// plannings, a located event, a midnight-crossing end, and a zero-duration
/// marker.
pub fn sample_events(date: NaiveDate) -> Vec<Event> {
    let next_day = date.succ_opt().unwrap_or(date);

    let mk = |uid: &str,
              summary: &str,
              location: &str,
              start: DateTime<Tz>,
              end: DateTime<Tz>,
              planning_id: &str,
              planning_color: &str,
              planning_name: &str| Event {
        uid: uid.into(),
        summary: summary.into(),
        description: String::new(),
        location: location.into(),
        start,
        end,
        planning_id: planning_id.into(),
        planning_color: planning_color.into(),
        planning_name: planning_name.into(),
    };

    vec![
        mk(
            "sample-standup",
            "Morning standup",
            "",
            sample_instant(date, 9, 0),
            sample_instant(date, 9, 30),
            "planning-eng",
            "#6B46C1",
            "Engineering",
        ),
        mk(
            "sample-review",
            "Design review with the whole frontend guild",
            "Room 204",
            sample_instant(date, 9, 15),
            sample_instant(date, 10, 15),
            "planning-eng",
            "#6B46C1",
            "Engineering",
        ),
        mk(
            "sample-workshop",
            "Accessibility workshop",
            "Auditorium",
            sample_instant(date, 9, 45),
            sample_instant(date, 12, 0),
            "planning-design",
            "#38A169",
            "Design",
        ),
        mk(
            "sample-marker",
            "Build cutoff",
            "",
            sample_instant(date, 12, 0),
            sample_instant(date, 12, 0),
            "planning-ops",
            "#D69E2E",
            "Operations",
        ),
        mk(
            "sample-maintenance",
            "Maintenance window",
            "",
            sample_instant(date, 23, 0),
            sample_instant(next_day, 0, 0),
            "planning-ops",
            "not-a-color",
            "Operations",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uid: &str, planning: &str, start: &str, end: &str) -> EventRecord {
        EventRecord {
            uid: uid.into(),
            summary: "Event".into(),
            description: String::new(),
            location: String::new(),
            start_time: start.into(),
            end_time: end.into(),
            planning_id: planning.into(),
        }
    }

    fn plannings() -> HashMap<String, PlanningRecord> {
        let mut map = HashMap::new();
        map.insert(
            "p1".to_string(),
            PlanningRecord {
                id: "p1".into(),
                name: "Engineering".into(),
                color: "#6B46C1".into(),
                description: String::new(),
            },
        );
        map
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn wire_records_deserialize_from_backend_json() {
        let raw = r#"{
            "uid": "evt-1",
            "summary": "Sprint planning",
            "description": "",
            "location": "Room 3",
            "start_time": "2024-06-10T07:00:00Z",
            "end_time": "2024-06-10T08:00:00Z",
            "planning_id": "p1",
            "created": "2024-01-01T00:00:00Z",
            "last_modified": "2024-01-01T00:00:00Z"
        }"#;
        let record: EventRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.uid, "evt-1");
        assert_eq!(record.location, "Room 3");

        // Optional text fields may be missing entirely.
        let sparse: EventRecord = serde_json::from_str(
            r#"{"uid": "evt-2", "start_time": "x", "end_time": "y", "planning_id": "p1"}"#,
        )
        .unwrap();
        assert_eq!(sparse.summary, "");

        let planning: PlanningRecord = serde_json::from_str(
            r##"{"id": "p1", "name": "Engineering", "color": "#6B46C1", "is_default": false}"##,
        )
        .unwrap();
        assert_eq!(planning.color, "#6B46C1");
    }

    #[test]
    fn resolves_known_planning_color_and_name() {
        let records = vec![record(
            "a",
            "p1",
            "2024-06-10T07:00:00Z",
            "2024-06-10T08:00:00Z",
        )];
        let events = resolve_day_events(records, &plannings(), date(2024, 6, 10));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].planning_color, "#6B46C1");
        assert_eq!(events[0].planning_name, "Engineering");
    }

    #[test]
    fn unknown_planning_falls_back_to_defaults() {
        let records = vec![record(
            "a",
            "mystery",
            "2024-06-10T07:00:00Z",
            "2024-06-10T08:00:00Z",
        )];
        let events = resolve_day_events(records, &plannings(), date(2024, 6, 10));

        assert_eq!(events[0].planning_color, DEFAULT_EVENT_COLOR);
        assert_eq!(events[0].planning_name, DEFAULT_PLANNING_NAME);
    }

    #[test]
    fn malformed_timestamps_drop_only_the_offending_event() {
        let records = vec![
            record("bad-start", "p1", "yesterday-ish", "2024-06-10T08:00:00Z"),
            record("bad-end", "p1", "2024-06-10T07:00:00Z", ""),
            record("good", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
        ];
        let events = resolve_day_events(records, &plannings(), date(2024, 6, 10));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "good");
    }

    #[test]
    fn day_membership_uses_the_local_date_of_the_start() {
        let records = vec![
            // 23:30 UTC on the 9th is 01:30 on the 10th in Paris.
            record("night", "p1", "2024-06-09T23:30:00Z", "2024-06-10T00:30:00Z"),
            // 22:30 UTC on the 10th is 00:30 on the 11th in Paris.
            record("late", "p1", "2024-06-10T22:30:00Z", "2024-06-10T23:00:00Z"),
            record("today", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
        ];
        let events = resolve_day_events(records, &plannings(), date(2024, 6, 10));

        let uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["night", "today"]);
    }

    #[test]
    fn sample_set_covers_the_interesting_shapes() {
        let day = date(2024, 6, 10);
        let events = sample_events(day);

        assert!(events.len() >= 4);
        // The maintenance window ends exactly at local midnight of the next day.
        let maintenance = events
            .iter()
            .find(|e| e.uid == "sample-maintenance")
            .unwrap();
        assert_eq!(
            crate::timeutil::display_time_components(maintenance.end, day),
            (24, 0)
        );
        // And one marker has zero duration.
        assert!(events.iter().any(|e| e.start == e.end));
    }
}
