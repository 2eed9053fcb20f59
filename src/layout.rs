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

//! Column assignment for time-overlapping events.
//!
//! Events are packed into horizontal columns so that no two events whose time
//! intervals overlap share one. Each planning anchors a band of columns: the
//! band's base column is the planning's rank by earliest event start, and
//! concurrent events of one planning fill sub-columns upward from that base.
//! A final pass widens every overlap cluster to a common column count so all
//! its members divide the row width identically.
//!
//! Ties on identical start instants are broken by original list index, both
//! for planning ranking and for the sweep order.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::data::Event;

/// An event with its horizontal slot resolved: `column` is the 0-based slot,
/// `total_columns` the divisor for the available width. `total_columns` is
/// always at least `column + 1`.
#[derive(Clone, Debug)]
pub struct PositionedEvent<'a> {
    pub event: &'a Event,
    pub column: u32,
    pub total_columns: u32,
}

/// Overlap uses open intervals: touching endpoints (and zero-duration events)
/// do not collide.
fn overlaps(a: &Event, b: &Event) -> bool {
    a.start < b.end && b.start < a.end
}

/// Rank plannings by the earliest start instant among their events; ties keep
/// first-encounter order. The rank is the planning's base column.
fn base_columns(events: &[Event]) -> HashMap<&str, u32> {
    let mut earliest: HashMap<&str, DateTime<Tz>> = HashMap::new();
    let mut encounter_order: Vec<&str> = Vec::new();

    for event in events {
        let id = event.planning_id.as_str();
        match earliest.entry(id) {
            Entry::Occupied(mut entry) => {
                if event.start < *entry.get() {
                    entry.insert(event.start);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(event.start);
                encounter_order.push(id);
            }
        }
    }

    let mut ranked = encounter_order;
    // Stable sort, so equal starts keep encounter order.
    ranked.sort_by_key(|id| earliest[id]);

    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, id)| (id, rank as u32))
        .collect()
}

struct ActiveEvent {
    end: DateTime<Tz>,
    column: u32,
}

/// Assign a column and a column count to every event of one day.
///
/// Deterministic for a fixed input ordering; any two events with truly
/// overlapping intervals come out with distinct columns. The sub-column
/// search starts at the planning's base and skips every column still held by
/// an active event, its own planning's or not; without the cross-planning
/// check, a planning whose band overflows into its neighbour's base column
/// could collide with it.
pub fn layout_events(events: &[Event]) -> Vec<PositionedEvent<'_>> {
    if events.is_empty() {
        return Vec::new();
    }

    let base_column = base_columns(events);

    let mut order: Vec<usize> = (0..events.len()).collect();
    // Stable sort: simultaneous starts sweep in original list order.
    order.sort_by_key(|&i| events[i].start);

    let mut active: Vec<ActiveEvent> = Vec::new();
    let mut positioned: Vec<PositionedEvent> = Vec::with_capacity(events.len());

    for &i in &order {
        let event = &events[i];
        let base = base_column[event.planning_id.as_str()];

        // Everything ending at or before this start no longer blocks a column.
        active.retain(|a| a.end > event.start);

        let mut column = base;
        while active.iter().any(|a| a.column == column) {
            column += 1;
        }

        active.push(ActiveEvent {
            end: event.end,
            column,
        });
        positioned.push(PositionedEvent {
            event,
            column,
            total_columns: 0,
        });
    }

    // Every member of a mutually-overlapping cluster must divide the width by
    // the same count; an event in several clusters takes the largest.
    for i in 0..positioned.len() {
        let current = positioned[i].event;
        let cluster: Vec<usize> = (0..positioned.len())
            .filter(|&j| overlaps(positioned[j].event, current))
            .collect();

        if let Some(max_column) = cluster.iter().map(|&j| positioned[j].column).max() {
            let needed = max_column + 1;
            for &j in &cluster {
                if positioned[j].total_columns < needed {
                    positioned[j].total_columns = needed;
                }
            }
        }
    }

    // A zero-duration event overlaps nothing, itself included; it still needs
    // a usable width divisor.
    for pos in &mut positioned {
        if pos.total_columns < pos.column + 1 {
            pos.total_columns = pos.column + 1;
        }
    }

    positioned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Event;
    use crate::timeutil::parse_timestamp;

    fn event(uid: &str, planning: &str, start: &str, end: &str) -> Event {
        Event {
            uid: uid.into(),
            summary: uid.to_uppercase(),
            description: String::new(),
            location: String::new(),
            start: parse_timestamp(start).unwrap(),
            end: parse_timestamp(end).unwrap(),
            planning_id: planning.into(),
            planning_color: "#6B46C1".into(),
            planning_name: planning.to_uppercase(),
        }
    }

    fn find<'a, 'b>(
        positioned: &'b [PositionedEvent<'a>],
        uid: &str,
    ) -> &'b PositionedEvent<'a> {
        positioned
            .iter()
            .find(|p| p.event.uid == uid)
            .expect("event missing from layout")
    }

    fn assert_overlapping_columns_differ(positioned: &[PositionedEvent<'_>]) {
        for p in positioned {
            for q in positioned {
                if p.event.uid != q.event.uid && overlaps(p.event, q.event) {
                    assert_ne!(
                        p.column, q.column,
                        "{} and {} overlap but share column {}",
                        p.event.uid, q.event.uid, p.column
                    );
                }
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        assert!(layout_events(&[]).is_empty());
    }

    #[test]
    fn lone_event_gets_the_whole_row() {
        let events = vec![event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z")];
        let positioned = layout_events(&events);
        assert_eq!(positioned.len(), 1);
        assert_eq!(positioned[0].column, 0);
        assert_eq!(positioned[0].total_columns, 1);
    }

    #[test]
    fn overlapping_events_from_two_plannings_split_the_row() {
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
            event("b", "p2", "2024-06-10T07:30:00Z", "2024-06-10T08:30:00Z"),
        ];
        let positioned = layout_events(&events);

        let a = find(&positioned, "a");
        let b = find(&positioned, "b");
        assert_ne!(a.column, b.column);
        assert_eq!(a.total_columns, 2);
        assert_eq!(b.total_columns, 2);
    }

    #[test]
    fn concurrent_events_in_one_planning_use_sub_columns() {
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
            event("b", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
        ];
        let positioned = layout_events(&events);

        let a = find(&positioned, "a");
        let b = find(&positioned, "b");
        assert_eq!(a.total_columns, 2);
        assert_eq!(b.total_columns, 2);
        // Tie on start instant: original list order decides.
        assert_eq!(a.column, 0);
        assert_eq!(b.column, 1);
    }

    #[test]
    fn disjoint_events_reuse_the_column() {
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
            event("b", "p1", "2024-06-10T08:00:00Z", "2024-06-10T09:00:00Z"),
        ];
        let positioned = layout_events(&events);

        // Touching endpoints do not overlap.
        assert_eq!(find(&positioned, "a").column, 0);
        assert_eq!(find(&positioned, "b").column, 0);
        assert_eq!(find(&positioned, "a").total_columns, 1);
        assert_eq!(find(&positioned, "b").total_columns, 1);
    }

    #[test]
    fn overflowing_band_shifts_the_neighbour_planning() {
        // p1's two concurrent events spill into column 1, which is also p2's
        // base; p2's event must move past them rather than collide.
        let events = vec![
            event("a1", "p1", "2024-06-10T07:00:00Z", "2024-06-10T09:00:00Z"),
            event("a2", "p1", "2024-06-10T07:30:00Z", "2024-06-10T09:00:00Z"),
            event("b1", "p2", "2024-06-10T08:00:00Z", "2024-06-10T09:00:00Z"),
        ];
        let positioned = layout_events(&events);

        assert_eq!(find(&positioned, "a1").column, 0);
        assert_eq!(find(&positioned, "a2").column, 1);
        assert_eq!(find(&positioned, "b1").column, 2);
        assert_overlapping_columns_differ(&positioned);
        for p in &positioned {
            assert_eq!(p.total_columns, 3);
        }
    }

    #[test]
    fn expired_sub_column_is_reused() {
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T10:00:00Z"),
            event("b", "p1", "2024-06-10T07:30:00Z", "2024-06-10T08:30:00Z"),
            event("c", "p1", "2024-06-10T08:45:00Z", "2024-06-10T09:30:00Z"),
        ];
        let positioned = layout_events(&events);

        assert_eq!(find(&positioned, "a").column, 0);
        assert_eq!(find(&positioned, "b").column, 1);
        // b ended before c starts; its column is free again.
        assert_eq!(find(&positioned, "c").column, 1);
    }

    #[test]
    fn cluster_total_is_max_column_plus_one() {
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T12:00:00Z"),
            event("b", "p2", "2024-06-10T07:30:00Z", "2024-06-10T08:00:00Z"),
            event("c", "p3", "2024-06-10T07:45:00Z", "2024-06-10T08:30:00Z"),
        ];
        let positioned = layout_events(&events);

        assert_overlapping_columns_differ(&positioned);
        let max_column = positioned.iter().map(|p| p.column).max().unwrap();
        for p in &positioned {
            assert_eq!(p.total_columns, max_column + 1);
        }
    }

    #[test]
    fn chained_overlap_takes_the_largest_cluster() {
        // a overlaps b, b overlaps c, but a and c are disjoint; everything in
        // b's cluster inherits its width requirement.
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
            event("b", "p2", "2024-06-10T07:30:00Z", "2024-06-10T09:00:00Z"),
            event("c", "p3", "2024-06-10T08:30:00Z", "2024-06-10T09:30:00Z"),
        ];
        let positioned = layout_events(&events);

        assert_overlapping_columns_differ(&positioned);
        assert_eq!(find(&positioned, "c").column, 2);
        for p in &positioned {
            assert_eq!(p.total_columns, 3, "uid {}", p.event.uid);
        }
    }

    #[test]
    fn zero_duration_event_is_positioned_without_error() {
        let events = vec![event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T07:00:00Z")];
        let positioned = layout_events(&events);
        assert_eq!(positioned.len(), 1);
        assert_eq!(positioned[0].column, 0);
        assert_eq!(positioned[0].total_columns, 1);
    }

    #[test]
    fn total_columns_never_below_own_column() {
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T09:00:00Z"),
            event("b", "p1", "2024-06-10T07:00:00Z", "2024-06-10T09:00:00Z"),
            event("c", "p2", "2024-06-10T10:00:00Z", "2024-06-10T10:00:00Z"),
            event("d", "p2", "2024-06-10T11:00:00Z", "2024-06-10T12:00:00Z"),
        ];
        for p in layout_events(&events) {
            assert!(p.total_columns >= p.column + 1, "uid {}", p.event.uid);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let events = vec![
            event("a", "p1", "2024-06-10T07:00:00Z", "2024-06-10T09:00:00Z"),
            event("b", "p2", "2024-06-10T07:00:00Z", "2024-06-10T08:00:00Z"),
            event("c", "p1", "2024-06-10T08:30:00Z", "2024-06-10T10:00:00Z"),
        ];
        let first: Vec<(String, u32, u32)> = layout_events(&events)
            .into_iter()
            .map(|p| (p.event.uid.clone(), p.column, p.total_columns))
            .collect();
        let second: Vec<(String, u32, u32)> = layout_events(&events)
            .into_iter()
            .map(|p| (p.event.uid.clone(), p.column, p.total_columns))
            .collect();
        assert_eq!(first, second);
    }
}
