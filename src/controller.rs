use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::calc::booking_completion;
use crate::db::SettingsStore;
use crate::duration::time_to_minutes;
use crate::error::{ClassboardError, Result};
use crate::model::{Booking, Event, EventStatus, Snapshot};
use crate::queue::{build_queues, find_lesson_for_teacher, Direction, DragCompatibility, TeacherQueue};

pub const CONTROLLER_SETTINGS_KEY: &str = "controller.settings";
pub const SORT_ORDER_KEY: &str = "classboard.sortOrder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerSettings {
    pub duration_cap_one: i64,
    pub duration_cap_two: i64,
    pub duration_cap_three: i64,
    pub gap_minutes: u32,
    pub default_location: String,
    pub start_time: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            duration_cap_one: 120,
            duration_cap_two: 180,
            duration_cap_three: 240,
            gap_minutes: 0,
            default_location: "Beach".to_string(),
            start_time: "09:00".to_string(),
        }
    }
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64> {
    let n = v
        .as_i64()
        .ok_or_else(|| ClassboardError::BadParams(format!("{} must be integer", key)))?;
    if !(min..=max).contains(&n) {
        return Err(ClassboardError::BadParams(format!(
            "{} must be in {}..={}",
            key, min, max
        )));
    }
    Ok(n)
}

impl ControllerSettings {
    /// Capacity 1 gets the first tier, 2..=3 the second, anything larger the third.
    pub fn duration_for_capacity(&self, capacity_students: u32) -> i64 {
        match capacity_students {
            0 | 1 => self.duration_cap_one,
            2..=3 => self.duration_cap_two,
            _ => self.duration_cap_three,
        }
    }

    pub fn start_minutes(&self) -> Result<u32> {
        time_to_minutes(&self.start_time)
    }

    /// Applies a partial update. Nothing changes unless every field validates.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<()> {
        let mut next = self.clone();
        for (k, v) in patch {
            match k.as_str() {
                "durationCapOne" => next.duration_cap_one = parse_i64_range(v, k, 1, 720)?,
                "durationCapTwo" => next.duration_cap_two = parse_i64_range(v, k, 1, 720)?,
                "durationCapThree" => next.duration_cap_three = parse_i64_range(v, k, 1, 720)?,
                "gapMinutes" => next.gap_minutes = parse_i64_range(v, k, 0, 240)? as u32,
                "defaultLocation" => {
                    let s = v
                        .as_str()
                        .map(str::trim)
                        .ok_or_else(|| ClassboardError::BadParams(format!("{} must be string", k)))?;
                    if s.is_empty() || s.len() > 64 {
                        return Err(ClassboardError::BadParams(format!(
                            "{} length must be in 1..=64",
                            k
                        )));
                    }
                    next.default_location = s.to_string();
                }
                "startTime" => {
                    let s = v
                        .as_str()
                        .ok_or_else(|| ClassboardError::BadParams(format!("{} must be string", k)))?;
                    time_to_minutes(s)?;
                    next.start_time = s.trim().to_string();
                }
                _ => {
                    return Err(ClassboardError::BadParams(format!(
                        "unknown controller field: {}",
                        k
                    )))
                }
            }
        }
        *self = next;
        Ok(())
    }

    /// Defaults overlaid with `fields`, validated like any other patch.
    pub fn from_patch(fields: &Map<String, Value>) -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_patch(fields)?;
        Ok(settings)
    }

    /// Stored values go through the same checks as a patch from the UI.
    pub fn load(store: &dyn SettingsStore) -> anyhow::Result<Self> {
        match store.get_json(CONTROLLER_SETTINGS_KEY)? {
            Some(Value::Object(fields)) => Ok(Self::from_patch(&fields)?),
            Some(other) => anyhow::bail!("controller settings must be an object, got {}", other),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, store: &dyn SettingsStore) -> anyhow::Result<()> {
        store.set_json(CONTROLLER_SETTINGS_KEY, &serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Leader,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn load(store: &dyn SettingsStore) -> anyhow::Result<Self> {
        Ok(match store.get_json(SORT_ORDER_KEY)? {
            Some(v) => serde_json::from_value(v)?,
            None => Self::default(),
        })
    }

    pub fn save(&self, store: &dyn SettingsStore) -> anyhow::Result<()> {
        store.set_json(SORT_ORDER_KEY, &serde_json::to_value(self)?)
    }

    /// Booking ids in display order. Ties keep snapshot order.
    pub fn sort_bookings(&self, bookings: &[Booking]) -> Vec<String> {
        let mut refs: Vec<&Booking> = bookings.iter().collect();
        refs.sort_by(|a, b| {
            let ord = match self.field {
                SortField::Date => a.date_start.cmp(&b.date_start),
                SortField::Leader => a
                    .leader_name
                    .to_lowercase()
                    .cmp(&b.leader_name.to_lowercase()),
                SortField::Progress => booking_completion(a)
                    .percentage
                    .partial_cmp(&booking_completion(b).percentage)
                    .unwrap_or(Ordering::Equal),
            };
            match self.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        refs.into_iter().map(|b| b.id.clone()).collect()
    }
}

/// State of one classboard page: the roster it was loaded with, the selected day,
/// and the queues derived from both.
#[derive(Debug, Clone)]
pub struct ClassboardSession {
    pub selected_date: NaiveDate,
    pub adjustment_mode: bool,
    pub settings: ControllerSettings,
    snapshot: Snapshot,
    queues: BTreeMap<String, TeacherQueue>,
}

impl ClassboardSession {
    pub fn load(snapshot: Snapshot, date: NaiveDate, settings: ControllerSettings) -> Result<Self> {
        snapshot.validate()?;
        let queues = build_queues(&snapshot, date);
        info!(
            date = %date,
            bookings = snapshot.bookings.len(),
            teachers = snapshot.teachers.len(),
            events = queues.values().map(|q| q.nodes().len()).sum::<usize>(),
            "classboard loaded"
        );
        Ok(Self {
            selected_date: date,
            adjustment_mode: false,
            settings,
            snapshot,
            queues,
        })
    }

    fn rebuild(&mut self) {
        self.queues = build_queues(&self.snapshot, self.selected_date);
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn queues(&self) -> &BTreeMap<String, TeacherQueue> {
        &self.queues
    }

    pub fn queue(&self, teacher: &str) -> Result<&TeacherQueue> {
        self.queues
            .get(teacher)
            .ok_or_else(|| ClassboardError::BadParams(format!("unknown teacher: {}", teacher)))
    }

    fn booking(&self, booking_id: &str) -> Result<&Booking> {
        self.snapshot
            .booking(booking_id)
            .ok_or_else(|| ClassboardError::BookingNotFound(booking_id.to_string()))
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.rebuild();
    }

    pub fn set_adjustment_mode(&mut self, enabled: bool) {
        self.adjustment_mode = enabled;
    }

    pub fn set_settings(&mut self, settings: ControllerSettings) {
        self.settings = settings;
        self.rebuild();
    }

    pub fn drag_compatibility(
        &self,
        teacher: &str,
        booking_id: Option<&str>,
    ) -> Result<Option<DragCompatibility>> {
        let queue = self.queue(teacher)?;
        let booking = match booking_id {
            Some(id) => Some(self.booking(id)?),
            None => None,
        };
        Ok(queue.drag_compatibility(self.snapshot.teacher(teacher), booking, &self.settings))
    }

    /// Places a new planned event for the booking at the teacher's next slot.
    pub fn assign_booking(&mut self, teacher: &str, booking_id: &str) -> Result<Event> {
        let booking = self.booking(booking_id)?;
        let lesson_id = find_lesson_for_teacher(booking, teacher)
            .map(|l| l.id.clone())
            .ok_or_else(|| ClassboardError::NoLesson {
                teacher: teacher.to_string(),
                booking: booking_id.to_string(),
            })?;
        let queue = self.queue(teacher)?;
        if queue.drag_compatibility(self.snapshot.teacher(teacher), Some(booking), &self.settings)
            != Some(DragCompatibility::Compatible)
        {
            return Err(ClassboardError::Incompatible {
                teacher: teacher.to_string(),
                booking: booking_id.to_string(),
            });
        }
        let planned = queue.plan_booking(booking, &self.settings)?;
        let date = chrono::NaiveDateTime::parse_from_str(&planned.time.event_date, "%Y-%m-%dT%H:%M:%S")
            .map_err(|_| ClassboardError::InvalidTime(planned.time.event_date.clone()))?;
        let event = Event {
            id: Uuid::new_v4().to_string(),
            date,
            duration: planned.time.duration,
            location: self.settings.default_location.clone(),
            status: EventStatus::Planned,
            equipment_ids: Vec::new(),
        };

        let lesson = self
            .snapshot
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .and_then(|b| b.lessons.iter_mut().find(|l| l.id == lesson_id))
            .ok_or_else(|| ClassboardError::BookingNotFound(booking_id.to_string()))?;
        lesson.events.push(event.clone());
        info!(teacher, booking = booking_id, slot = %planned.slot, "event assigned");
        self.rebuild();
        Ok(event)
    }

    fn require_adjustment_mode(&self) -> Result<()> {
        if self.adjustment_mode {
            Ok(())
        } else {
            Err(ClassboardError::AdjustmentModeOff)
        }
    }

    fn adjust<F>(&mut self, teacher: &str, op: F) -> Result<()>
    where
        F: FnOnce(&mut TeacherQueue, &ControllerSettings) -> Result<Vec<crate::queue::Retimed>>,
    {
        self.require_adjustment_mode()?;
        let mut queue = self.queue(teacher)?.clone();
        let changed = op(&mut queue, &self.settings)?;
        for r in &changed {
            if let Some(e) = self.snapshot.event_mut(&r.event_id) {
                e.date = r.date;
            }
        }
        debug!(teacher, changed = changed.len(), "queue adjusted");
        self.rebuild();
        Ok(())
    }

    pub fn move_event(&mut self, teacher: &str, event_id: &str, direction: Direction) -> Result<()> {
        self.adjust(teacher, |q, s| q.move_event(event_id, direction, s.gap_minutes))
    }

    pub fn compact_queue(&mut self, teacher: &str) -> Result<()> {
        self.adjust(teacher, |q, s| q.compact(s.start_minutes()?, s.gap_minutes))
    }

    pub fn remove_event(&mut self, teacher: &str, event_id: &str) -> Result<()> {
        self.require_adjustment_mode()?;
        let mut queue = self.queue(teacher)?.clone();
        let removed = queue.remove_event(event_id)?;
        for b in self.snapshot.bookings.iter_mut().filter(|b| b.id == removed.booking_id) {
            for l in b.lessons.iter_mut() {
                l.events.retain(|e| e.id != event_id);
            }
        }
        info!(teacher, event = event_id, "event removed");
        self.rebuild();
        Ok(())
    }

    pub fn update_event_status(&mut self, event_id: &str, status: EventStatus) -> Result<()> {
        let event = self
            .snapshot
            .event_mut(event_id)
            .ok_or_else(|| ClassboardError::EventNotFound(event_id.to_string()))?;
        if event.is_locked() {
            return Err(ClassboardError::EventLocked(event_id.to_string()));
        }
        event.status = status;
        self.rebuild();
        Ok(())
    }
}
