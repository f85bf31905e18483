use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calc::{round2, school_revenue, teacher_commission};
use crate::controller::ControllerSettings;
use crate::duration::{calculate_event_time, minutes_to_time, pretty_duration, EventTime, MINUTES_PER_DAY};
use crate::error::{ClassboardError, Result};
use crate::model::{
    Booking, Commission, Event, EventStatus, Lesson, SchoolPackage, Snapshot, Teacher,
};

/// One event in a teacher's day, with enough of its booking and lesson attached to
/// render and price it without going back to the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct EventNode {
    pub event: Event,
    pub booking_id: String,
    pub lesson_id: String,
    pub leader_name: String,
    pub student_count: u32,
    pub commission: Option<Commission>,
    pub package: Option<SchoolPackage>,
}

impl EventNode {
    pub fn from_parts(booking: &Booking, lesson: &Lesson, event: &Event) -> Self {
        Self {
            event: event.clone(),
            booking_id: booking.id.clone(),
            lesson_id: lesson.id.clone(),
            leader_name: booking.leader_label().to_string(),
            student_count: booking.students.len() as u32,
            commission: lesson.commission.clone(),
            package: booking.package.clone(),
        }
    }

    fn earnings(&self) -> f64 {
        self.commission
            .as_ref()
            .map(|c| teacher_commission(c.commission_type, c.cph, self.event.counted_minutes()))
            .unwrap_or(0.0)
    }

    fn revenue(&self) -> f64 {
        self.package
            .as_ref()
            .map(|p| {
                school_revenue(
                    p.price_per_student,
                    self.student_count,
                    self.event.counted_minutes(),
                    p.duration_minutes,
                )
            })
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragCompatibility {
    Compatible,
    Incompatible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Earlier,
    Later,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "earlier" | "up" => Some(Self::Earlier),
            "later" | "down" => Some(Self::Later),
            _ => None,
        }
    }
}

/// New start time for an event, produced by queue adjustments.
#[derive(Debug, Clone, PartialEq)]
pub struct Retimed {
    pub event_id: String,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedEvent {
    pub slot: String,
    pub time: EventTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeacherQueue {
    pub teacher_username: String,
    pub date: NaiveDate,
    nodes: Vec<EventNode>,
}

/// First lesson on the booking taught by `username`, in array order.
pub fn find_lesson_for_teacher<'a>(booking: &'a Booking, username: &str) -> Option<&'a Lesson> {
    booking
        .lessons
        .iter()
        .find(|l| l.teacher_username == username)
}

/// Projects the snapshot onto one queue per teacher for `date`.
pub fn build_queues(snapshot: &Snapshot, date: NaiveDate) -> BTreeMap<String, TeacherQueue> {
    let mut queues: BTreeMap<String, TeacherQueue> = snapshot
        .teachers
        .iter()
        .map(|t| (t.username.clone(), TeacherQueue::new(&t.username, date)))
        .collect();

    for booking in &snapshot.bookings {
        for lesson in &booking.lessons {
            let queue = queues
                .entry(lesson.teacher_username.clone())
                .or_insert_with(|| TeacherQueue::new(&lesson.teacher_username, date));
            for event in lesson.events.iter().filter(|e| e.date.date() == date) {
                queue.push(EventNode::from_parts(booking, lesson, event));
            }
        }
    }
    debug!(
        date = %date,
        teachers = queues.len(),
        busy = queues.values().filter(|q| !q.is_empty()).count(),
        "built teacher queues"
    );
    queues
}

fn slot_datetime(date: NaiveDate, minutes: u32, who: &str) -> Result<NaiveDateTime> {
    if minutes >= MINUTES_PER_DAY {
        return Err(ClassboardError::QueueFull(who.to_string()));
    }
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .map(|t| date.and_time(t))
        .ok_or_else(|| ClassboardError::QueueFull(who.to_string()))
}

impl TeacherQueue {
    pub fn new(teacher_username: &str, date: NaiveDate) -> Self {
        Self {
            teacher_username: teacher_username.to_string(),
            date,
            nodes: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[EventNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts after every node starting at or before the new one.
    pub fn push(&mut self, node: EventNode) {
        let at = self
            .nodes
            .partition_point(|n| n.event.date <= node.event.date);
        self.nodes.insert(at, node);
    }

    /// Minutes past midnight where the next event can start, or `None` once the
    /// day is full.
    pub fn next_slot(&self, start_time: u32, gap: u32) -> Option<u32> {
        let slot = match self.nodes.last() {
            None => start_time,
            Some(last) => last.event.end_minutes().saturating_add(gap),
        };
        (slot < MINUTES_PER_DAY).then_some(slot)
    }

    pub fn has_overlap(&self, start: u32, duration: i64) -> bool {
        let end = start.saturating_add(u32::try_from(duration.max(0)).unwrap_or(u32::MAX));
        self.nodes
            .iter()
            .any(|n| start < n.event.end_minutes() && n.event.start_minutes() < end)
    }

    /// True when `[start, end)` overlaps any node outside `skip`.
    fn collides(&self, start: u32, end: u32, skip: &[usize]) -> bool {
        self.nodes.iter().enumerate().any(|(i, n)| {
            !skip.contains(&i) && start < n.event.end_minutes() && n.event.start_minutes() < end
        })
    }

    pub fn plan_booking(&self, booking: &Booking, settings: &ControllerSettings) -> Result<PlannedEvent> {
        if !booking.covers(self.date) {
            return Err(ClassboardError::BookingOutOfRange(booking.id.clone()));
        }
        let start = settings.start_minutes()?;
        let slot = self
            .next_slot(start, settings.gap_minutes)
            .ok_or_else(|| ClassboardError::QueueFull(self.teacher_username.clone()))?;
        let slot = minutes_to_time(slot);
        let time = calculate_event_time(booking.capacity_students(), &slot, self.date, settings)?;
        Ok(PlannedEvent { slot, time })
    }

    /// `None` when nothing is being dragged.
    pub fn drag_compatibility(
        &self,
        teacher: Option<&Teacher>,
        booking: Option<&Booking>,
        settings: &ControllerSettings,
    ) -> Option<DragCompatibility> {
        let booking = booking?;
        let equipped = match (teacher, booking.category()) {
            (Some(t), Some(c)) => t.can_teach(c),
            _ => false,
        };
        if !equipped || !booking.covers(self.date) {
            return Some(DragCompatibility::Incompatible);
        }
        let Ok(start) = settings.start_minutes() else {
            return Some(DragCompatibility::Incompatible);
        };
        let Some(slot) = self.next_slot(start, settings.gap_minutes) else {
            return Some(DragCompatibility::Incompatible);
        };
        let duration = settings.duration_for_capacity(booking.capacity_students());
        let fits = slot as i64 + duration <= MINUTES_PER_DAY as i64;
        if fits && !self.has_overlap(slot, duration) {
            Some(DragCompatibility::Compatible)
        } else {
            Some(DragCompatibility::Incompatible)
        }
    }

    fn index_of(&self, event_id: &str) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.event.id == event_id)
            .ok_or_else(|| ClassboardError::EventNotFound(event_id.to_string()))
    }

    /// Swaps an event with its neighbour; the pair keeps the earlier start. Fails
    /// with `no_room` when the re-timed pair would run into any other event.
    pub fn move_event(&mut self, event_id: &str, direction: Direction, gap: u32) -> Result<Vec<Retimed>> {
        let idx = self.index_of(event_id)?;
        let other = match direction {
            Direction::Earlier => idx.checked_sub(1),
            Direction::Later => Some(idx + 1).filter(|i| *i < self.nodes.len()),
        }
        .ok_or_else(|| ClassboardError::NoNeighbour(event_id.to_string()))?;
        let (first, second) = (idx.min(other), idx.max(other));
        for i in [first, second] {
            if self.nodes[i].event.is_locked() {
                return Err(ClassboardError::EventLocked(self.nodes[i].event.id.clone()));
            }
        }

        let lead_start = self.nodes[first].event.start_minutes();
        let lead_end = lead_start.saturating_add(self.nodes[second].event.duration_minutes());
        let trail_start = lead_end.saturating_add(gap);
        let trail_end = trail_start.saturating_add(self.nodes[first].event.duration_minutes());
        if self.collides(lead_start, lead_end, &[first, second])
            || self.collides(trail_start, trail_end, &[first, second])
        {
            return Err(ClassboardError::NoRoom(event_id.to_string()));
        }
        let lead_at = slot_datetime(self.date, lead_start, &self.teacher_username)?;
        let trail_at = slot_datetime(self.date, trail_start, &self.teacher_username)?;

        self.nodes.swap(first, second);
        self.nodes[first].event.date = lead_at;
        self.nodes[second].event.date = trail_at;

        Ok([first, second]
            .iter()
            .map(|&i| Retimed {
                event_id: self.nodes[i].event.id.clone(),
                date: self.nodes[i].event.date,
            })
            .collect())
    }

    pub fn remove_event(&mut self, event_id: &str) -> Result<EventNode> {
        let idx = self.index_of(event_id)?;
        if self.nodes[idx].event.is_locked() {
            return Err(ClassboardError::EventLocked(event_id.to_string()));
        }
        Ok(self.nodes.remove(idx))
    }

    /// Re-times every movable event back to back from `start_time`. Completed
    /// events never move: a movable event that would reach into one (gap included)
    /// is placed after it instead, and the queue is re-sorted by start.
    pub fn compact(&mut self, start_time: u32, gap: u32) -> Result<Vec<Retimed>> {
        let anchors: Vec<(u32, u32)> = self
            .nodes
            .iter()
            .filter(|n| n.event.is_locked())
            .map(|n| (n.event.start_minutes(), n.event.end_minutes()))
            .collect();
        let mut cursor = start_time;
        let mut changed = Vec::new();
        for i in 0..self.nodes.len() {
            if self.nodes[i].event.is_locked() {
                cursor = cursor.max(self.nodes[i].event.end_minutes().saturating_add(gap));
                continue;
            }
            let duration = self.nodes[i].event.duration_minutes();
            let mut slot = cursor;
            while let Some(&(_, end)) = anchors.iter().find(|&&(s, e)| {
                slot < e.saturating_add(gap) && s < slot.saturating_add(duration).saturating_add(gap)
            }) {
                slot = end.saturating_add(gap);
            }
            let at = slot_datetime(self.date, slot, &self.teacher_username)?;
            if self.nodes[i].event.date != at {
                self.nodes[i].event.date = at;
                changed.push(Retimed {
                    event_id: self.nodes[i].event.id.clone(),
                    date: at,
                });
            }
            cursor = slot.saturating_add(duration).saturating_add(gap);
        }
        self.nodes.sort_by_key(|n| n.event.date);
        Ok(changed)
    }

    pub fn summary(&self, settings: &ControllerSettings) -> QueueSummary {
        let events: Vec<QueueEventSummary> = self
            .nodes
            .iter()
            .map(|n| QueueEventSummary {
                event_id: n.event.id.clone(),
                booking_id: n.booking_id.clone(),
                lesson_id: n.lesson_id.clone(),
                start: minutes_to_time(n.event.start_minutes()),
                end: minutes_to_time(n.event.end_minutes() % MINUTES_PER_DAY),
                duration: n.event.duration,
                pretty_duration: pretty_duration(n.event.duration),
                location: n.event.location.clone(),
                status: n.event.status,
                leader_name: n.leader_name.clone(),
                student_count: n.student_count,
            })
            .collect();
        let total_minutes = self
            .nodes
            .iter()
            .filter(|n| n.event.status != EventStatus::Uncompleted)
            .map(|n| n.event.duration.max(0))
            .sum();
        let next_slot = settings
            .start_minutes()
            .ok()
            .and_then(|s| self.next_slot(s, settings.gap_minutes))
            .map(minutes_to_time);

        QueueSummary {
            teacher_username: self.teacher_username.clone(),
            date: self.date.format("%Y-%m-%d").to_string(),
            event_count: events.len(),
            events,
            total_minutes,
            pretty_total: pretty_duration(total_minutes),
            next_slot,
            earnings: round2(self.nodes.iter().map(EventNode::earnings).sum()),
            school_revenue: round2(self.nodes.iter().map(EventNode::revenue).sum()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEventSummary {
    pub event_id: String,
    pub booking_id: String,
    pub lesson_id: String,
    pub start: String,
    pub end: String,
    pub duration: i64,
    pub pretty_duration: String,
    pub location: String,
    pub status: EventStatus,
    pub leader_name: String,
    pub student_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub teacher_username: String,
    pub date: String,
    pub events: Vec<QueueEventSummary>,
    pub event_count: usize,
    pub total_minutes: i64,
    pub pretty_total: String,
    pub next_slot: Option<String>,
    pub earnings: f64,
    pub school_revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use crate::model::EquipmentCategory::*;
    use crate::model::EventStatus::*;

    fn settings() -> ControllerSettings {
        ControllerSettings {
            duration_cap_one: 60,
            duration_cap_two: 120,
            duration_cap_three: 180,
            gap_minutes: 15,
            start_time: "09:00".to_string(),
            ..ControllerSettings::default()
        }
    }

    fn two_event_snapshot() -> Snapshot {
        let l = lesson(
            "l1",
            "tom",
            30.0,
            vec![
                event("e2", at("2024-06-10", "11:15"), 120, Planned),
                event("e1", at("2024-06-10", "09:00"), 120, Completed),
                event("e9", at("2024-06-11", "09:00"), 120, Planned),
            ],
        );
        Snapshot {
            bookings: vec![booking("b1", "2024-06-10", "2024-06-12", vec![l])],
            teachers: vec![teacher("tom", &[Kite]), teacher("ann", &[Wing])],
        }
    }

    #[test]
    fn first_lesson_wins_for_duplicate_teacher() {
        let b = booking(
            "b1",
            "2024-06-10",
            "2024-06-12",
            vec![
                lesson("first", "tom", 30.0, vec![]),
                lesson("other", "ann", 25.0, vec![]),
                lesson("second", "tom", 40.0, vec![]),
            ],
        );
        assert_eq!(find_lesson_for_teacher(&b, "tom").map(|l| l.id.as_str()), Some("first"));
        assert_eq!(find_lesson_for_teacher(&b, "ann").map(|l| l.id.as_str()), Some("other"));
        assert!(find_lesson_for_teacher(&b, "zoe").is_none());
    }

    #[test]
    fn queues_hold_only_the_selected_day_in_order() {
        let queues = build_queues(&two_event_snapshot(), day("2024-06-10"));
        assert_eq!(queues.len(), 2);
        let tom = &queues["tom"];
        let ids: Vec<&str> = tom.nodes().iter().map(|n| n.event.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
        assert!(queues["ann"].is_empty());
    }

    #[test]
    fn teacher_only_on_lessons_still_gets_a_queue() {
        let mut snap = two_event_snapshot();
        snap.teachers.clear();
        let queues = build_queues(&snap, day("2024-06-10"));
        assert!(queues.contains_key("tom"));
    }

    #[test]
    fn next_slot_follows_last_event_plus_gap() {
        let queues = build_queues(&two_event_snapshot(), day("2024-06-10"));
        assert_eq!(queues["tom"].next_slot(540, 15), Some(13 * 60 + 30));
        assert_eq!(queues["ann"].next_slot(540, 15), Some(540));
    }

    #[test]
    fn next_slot_is_none_past_midnight() {
        let mut q = TeacherQueue::new("tom", day("2024-06-10"));
        let b = booking("b1", "2024-06-10", "2024-06-10", vec![]);
        let l = lesson("l1", "tom", 30.0, vec![]);
        q.push(EventNode::from_parts(&b, &l, &event("late", at("2024-06-10", "22:30"), 90, Planned)));
        assert_eq!(q.next_slot(540, 0), None);
    }

    #[test]
    fn plan_booking_uses_capacity_tier() {
        let snap = two_event_snapshot();
        let queues = build_queues(&snap, day("2024-06-10"));
        let planned = queues["tom"].plan_booking(&snap.bookings[0], &settings()).expect("plan");
        assert_eq!(planned.slot, "13:30");
        assert_eq!(planned.time.event_date, "2024-06-10T13:30:00");
        assert_eq!(planned.time.duration, 120);
    }

    #[test]
    fn plan_booking_outside_range_fails() {
        let snap = two_event_snapshot();
        let queues = build_queues(&snap, day("2024-06-20"));
        let err = queues["tom"].plan_booking(&snap.bookings[0], &settings()).unwrap_err();
        assert_eq!(err.code(), "booking_out_of_range");
    }

    #[test]
    fn drag_compatibility_checks_equipment_and_range() {
        let snap = two_event_snapshot();
        let s = settings();
        let queues = build_queues(&snap, day("2024-06-10"));
        let b = &snap.bookings[0];
        assert_eq!(queues["tom"].drag_compatibility(snap.teacher("tom"), None, &s), None);
        assert_eq!(
            queues["tom"].drag_compatibility(snap.teacher("tom"), Some(b), &s),
            Some(DragCompatibility::Compatible)
        );
        assert_eq!(
            queues["ann"].drag_compatibility(snap.teacher("ann"), Some(b), &s),
            Some(DragCompatibility::Incompatible)
        );
        let later = build_queues(&snap, day("2024-06-13"));
        assert_eq!(
            later["tom"].drag_compatibility(snap.teacher("tom"), Some(b), &s),
            Some(DragCompatibility::Incompatible)
        );
    }

    #[test]
    fn drag_compatibility_rejects_when_event_would_overrun_the_day() {
        let snap = two_event_snapshot();
        let s = ControllerSettings {
            start_time: "23:00".to_string(),
            ..settings()
        };
        let queues = build_queues(&snap, day("2024-06-10"));
        assert_eq!(
            queues["ann"].drag_compatibility(snap.teacher("ann"), Some(&snap.bookings[0]), &s),
            Some(DragCompatibility::Incompatible)
        );
    }

    #[test]
    fn overlap_detection_is_half_open() {
        let queues = build_queues(&two_event_snapshot(), day("2024-06-10"));
        let tom = &queues["tom"];
        assert!(tom.has_overlap(600, 30));
        assert!(!tom.has_overlap(660, 15));
        assert!(!tom.has_overlap(13 * 60 + 15, 60));
    }

    #[test]
    fn move_refuses_completed_events() {
        let mut q = build_queues(&two_event_snapshot(), day("2024-06-10"))
            .remove("tom")
            .expect("tom");
        let err = q.move_event("e2", Direction::Earlier, 15).unwrap_err();
        assert_eq!(err, ClassboardError::EventLocked("e1".into()));
        let err = q.move_event("e2", Direction::Later, 15).unwrap_err();
        assert_eq!(err.code(), "no_neighbour");
    }

    #[test]
    fn move_swaps_and_retimes_pair() {
        let b = booking("b1", "2024-06-10", "2024-06-12", vec![]);
        let l = lesson("l1", "tom", 30.0, vec![]);
        let mut q = TeacherQueue::new("tom", day("2024-06-10"));
        q.push(EventNode::from_parts(&b, &l, &event("a", at("2024-06-10", "09:00"), 60, Planned)));
        q.push(EventNode::from_parts(&b, &l, &event("b", at("2024-06-10", "10:00"), 120, Tbc)));
        let changed = q.move_event("b", Direction::Earlier, 15).expect("move");
        assert_eq!(changed[0], Retimed { event_id: "b".into(), date: at("2024-06-10", "09:00") });
        assert_eq!(changed[1], Retimed { event_id: "a".into(), date: at("2024-06-10", "11:15") });
        assert_eq!(q.nodes()[0].event.id, "b");
    }

    #[test]
    fn compact_closes_gaps_around_completed_anchor() {
        let b = booking("b1", "2024-06-10", "2024-06-12", vec![]);
        let l = lesson("l1", "tom", 30.0, vec![]);
        let mut q = TeacherQueue::new("tom", day("2024-06-10"));
        q.push(EventNode::from_parts(&b, &l, &event("a", at("2024-06-10", "10:00"), 60, Planned)));
        q.push(EventNode::from_parts(&b, &l, &event("lock", at("2024-06-10", "12:00"), 60, Completed)));
        q.push(EventNode::from_parts(&b, &l, &event("c", at("2024-06-10", "16:00"), 60, Planned)));
        let changed = q.compact(540, 0).expect("compact");
        assert_eq!(
            changed,
            vec![
                Retimed { event_id: "a".into(), date: at("2024-06-10", "09:00") },
                Retimed { event_id: "c".into(), date: at("2024-06-10", "13:00") },
            ]
        );
    }

    fn queue_of(events: Vec<Event>) -> TeacherQueue {
        let b = booking("b1", "2024-06-10", "2024-06-12", vec![]);
        let l = lesson("l1", "tom", 30.0, vec![]);
        let mut q = TeacherQueue::new("tom", day("2024-06-10"));
        for e in &events {
            q.push(EventNode::from_parts(&b, &l, e));
        }
        q
    }

    fn overlapping_pairs(q: &TeacherQueue) -> Vec<(String, String)> {
        let nodes = q.nodes();
        let mut pairs = Vec::new();
        for (i, x) in nodes.iter().enumerate() {
            for y in &nodes[i + 1..] {
                if x.event.start_minutes() < y.event.end_minutes()
                    && y.event.start_minutes() < x.event.end_minutes()
                {
                    pairs.push((x.event.id.clone(), y.event.id.clone()));
                }
            }
        }
        pairs
    }

    fn starts(q: &TeacherQueue) -> Vec<(String, u32)> {
        q.nodes()
            .iter()
            .map(|n| (n.event.id.clone(), n.event.start_minutes()))
            .collect()
    }

    #[test]
    fn compact_never_pulls_an_event_into_a_completed_one() {
        let mut q = queue_of(vec![
            event("a", at("2024-06-10", "08:00"), 180, Planned),
            event("lock", at("2024-06-10", "11:00"), 60, Completed),
        ]);
        assert!(overlapping_pairs(&q).is_empty());
        let changed = q.compact(540, 0).expect("compact");
        assert!(overlapping_pairs(&q).is_empty());
        assert_eq!(changed, vec![Retimed { event_id: "a".into(), date: at("2024-06-10", "12:00") }]);
        assert_eq!(starts(&q), vec![("lock".into(), 660), ("a".into(), 720)]);
    }

    #[test]
    fn compact_keeps_the_gap_on_both_sides_of_an_anchor() {
        let mut q = queue_of(vec![
            event("x", at("2024-06-10", "09:30"), 60, Planned),
            event("lock", at("2024-06-10", "10:30"), 60, Completed),
            event("y", at("2024-06-10", "14:00"), 90, Planned),
            event("z", at("2024-06-10", "16:00"), 45, Tbc),
        ]);
        q.compact(540, 30).expect("compact");
        assert!(overlapping_pairs(&q).is_empty());
        assert_eq!(
            starts(&q),
            vec![("x".into(), 540), ("lock".into(), 630), ("y".into(), 720), ("z".into(), 840)]
        );
    }

    #[test]
    fn move_refuses_to_run_into_a_completed_event() {
        let mut q = queue_of(vec![
            event("a", at("2024-06-10", "09:00"), 60, Planned),
            event("b", at("2024-06-10", "10:00"), 60, Planned),
            event("c", at("2024-06-10", "11:00"), 60, Completed),
        ]);
        let before = q.clone();
        let err = q.move_event("a", Direction::Later, 15).unwrap_err();
        assert_eq!(err, ClassboardError::NoRoom("a".into()));
        assert_eq!(err.code(), "no_room");
        assert_eq!(q, before);
    }

    #[test]
    fn move_with_gap_leaves_no_overlaps_when_there_is_room() {
        let mut q = queue_of(vec![
            event("a", at("2024-06-10", "09:00"), 60, Planned),
            event("b", at("2024-06-10", "10:00"), 60, Planned),
            event("c", at("2024-06-10", "12:00"), 60, Completed),
        ]);
        q.move_event("a", Direction::Later, 15).expect("move");
        assert!(overlapping_pairs(&q).is_empty());
        assert_eq!(
            starts(&q),
            vec![("b".into(), 540), ("a".into(), 615), ("c".into(), 720)]
        );
    }

    #[test]
    fn remove_refuses_completed() {
        let mut q = build_queues(&two_event_snapshot(), day("2024-06-10"))
            .remove("tom")
            .expect("tom");
        assert_eq!(q.remove_event("e1").unwrap_err().code(), "event_locked");
        assert_eq!(q.remove_event("e2").expect("remove").event.id, "e2");
        assert_eq!(q.remove_event("nope").unwrap_err().code(), "not_found");
    }

    #[test]
    fn summary_prices_the_day() {
        let queues = build_queues(&two_event_snapshot(), day("2024-06-10"));
        let s = queues["tom"].summary(&settings());
        assert_eq!(s.event_count, 2);
        assert_eq!(s.total_minutes, 240);
        assert_eq!(s.pretty_total, "4h");
        assert_eq!(s.next_slot.as_deref(), Some("13:30"));
        assert_eq!(s.earnings, 120.0);
        assert_eq!(s.school_revenue, 400.0);
        assert_eq!(s.events[0].start, "09:00");
        assert_eq!(s.events[0].end, "11:00");
    }
}
