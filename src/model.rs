use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ClassboardError, Result};

/// No single event may run longer than a day.
pub const MAX_EVENT_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    Kite,
    Wing,
    Windsurf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Planned,
    Tbc,
    Completed,
    Uncompleted,
}

impl EventStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "tbc" => Some(Self::Tbc),
            "completed" => Some(Self::Completed),
            "uncompleted" => Some(Self::Uncompleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    #[default]
    Active,
    Rest,
    Completed,
    Uncompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Uncompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionType {
    Fixed,
    Percentage,
}

impl CommissionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(Self::Fixed),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: String,
    pub commission_type: CommissionType,
    pub cph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolPackage {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i64,
    pub price_per_student: f64,
    pub capacity_students: u32,
    #[serde(default)]
    pub capacity_equipment: u32,
    pub category_equipment: EquipmentCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub date: NaiveDateTime,
    /// Minutes.
    pub duration: i64,
    #[serde(default)]
    pub location: String,
    pub status: EventStatus,
    #[serde(default)]
    pub equipment_ids: Vec<String>,
}

impl Event {
    /// Start as minutes past midnight.
    pub fn start_minutes(&self) -> u32 {
        self.date.hour() * 60 + self.date.minute()
    }

    /// Length in minutes; negative durations count as zero.
    pub fn duration_minutes(&self) -> u32 {
        u32::try_from(self.duration.max(0)).unwrap_or(u32::MAX)
    }

    pub fn end_minutes(&self) -> u32 {
        self.start_minutes().saturating_add(self.duration_minutes())
    }

    pub fn is_locked(&self) -> bool {
        self.status == EventStatus::Completed
    }

    /// Minutes that count towards the package; uncompleted events do not.
    pub fn counted_minutes(&self) -> i64 {
        if self.status == EventStatus::Uncompleted {
            0
        } else {
            self.duration.max(0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub teacher_username: String,
    #[serde(default)]
    pub commission: Option<Commission>,
    #[serde(default)]
    pub status: LessonStatus,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub code: String,
    #[serde(default)]
    pub commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    #[serde(default)]
    pub leader_name: String,
    #[serde(default)]
    pub package: Option<SchoolPackage>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub referral: Option<Referral>,
}

impl Booking {
    /// Rejects inverted date ranges and events longer than a day.
    pub fn validate(&self) -> Result<()> {
        if self.date_end < self.date_start {
            return Err(ClassboardError::InvalidBooking(self.id.clone()));
        }
        if self.events().any(|e| e.duration > MAX_EVENT_MINUTES) {
            return Err(ClassboardError::InvalidBooking(self.id.clone()));
        }
        Ok(())
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_start <= date && date <= self.date_end
    }

    /// Package capacity, or the roster size when the package is missing.
    pub fn capacity_students(&self) -> u32 {
        self.package
            .as_ref()
            .map(|p| p.capacity_students)
            .unwrap_or(self.students.len() as u32)
    }

    pub fn category(&self) -> Option<EquipmentCategory> {
        self.package.as_ref().map(|p| p.category_equipment)
    }

    pub fn required_minutes(&self) -> i64 {
        self.package
            .as_ref()
            .map(|p| p.duration_minutes.max(0))
            .unwrap_or(0)
    }

    pub fn leader_label(&self) -> &str {
        if self.leader_name.trim().is_empty() {
            "-"
        } else {
            &self.leader_name
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.lessons.iter().flat_map(|l| l.events.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub equipment_categories: Vec<EquipmentCategory>,
    #[serde(default)]
    pub commissions: Vec<Commission>,
}

impl Teacher {
    pub fn can_teach(&self, category: EquipmentCategory) -> bool {
        self.equipment_categories.contains(&category)
    }
}

/// The roster handed over by the UI. Read-only for every computation except the
/// session's own scheduling mutations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
}

impl Snapshot {
    pub fn validate(&self) -> Result<()> {
        self.bookings.iter().try_for_each(Booking::validate)
    }

    pub fn booking(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn teacher(&self, username: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.username == username)
    }

    pub fn event_mut(&mut self, event_id: &str) -> Option<&mut Event> {
        self.bookings
            .iter_mut()
            .flat_map(|b| b.lessons.iter_mut())
            .flat_map(|l| l.events.iter_mut())
            .find(|e| e.id == event_id)
    }
}
