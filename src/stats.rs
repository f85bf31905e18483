//! Summary totals for the dashboard tables.
//!
//! Every entity kind has its own stat record. A list of records folds into one
//! [`Totals`] by field-wise summation, so order never matters and the empty list
//! yields the zero record. [`StatRows`] keeps the kinds closed: adding one means
//! touching every match below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calc::{lesson_financials, round2};
use crate::error::{ClassboardError, Result};
use crate::model::{Booking, EventStatus, Snapshot};

pub trait StatRecord: Default + Copy + PartialEq {
    fn merge(self, other: Self) -> Self;
}

macro_rules! stat_record {
    ($name:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $(pub $field: $ty,)+
        }

        impl StatRecord for $name {
            fn merge(self, other: Self) -> Self {
                Self { $($field: self.$field + other.$field,)+ }
            }
        }
    };
}

stat_record!(BookingStat { events: u64, minutes: i64, revenue: f64, commission: f64 });
stat_record!(StudentStat { bookings: u64, events: u64, minutes: i64 });
stat_record!(TeacherStat { lessons: u64, events: u64, minutes: i64, commission: f64, revenue: f64 });
stat_record!(EquipmentStat { events: u64, minutes: i64 });
stat_record!(PackageStat { bookings: u64, minutes: i64, revenue: f64 });
stat_record!(ReferralStat { bookings: u64, revenue: f64, commission: f64 });

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals<T> {
    pub count: usize,
    pub totals: T,
}

pub fn reduce<T: StatRecord>(items: &[T]) -> Totals<T> {
    Totals {
        count: items.len(),
        totals: items.iter().copied().fold(T::default(), T::merge),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Booking,
    Student,
    Teacher,
    Equipment,
    Package,
    Referral,
}

impl StatKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "booking" | "bookings" => Ok(Self::Booking),
            "student" | "students" => Ok(Self::Student),
            "teacher" | "teachers" => Ok(Self::Teacher),
            "equipment" => Ok(Self::Equipment),
            "package" | "packages" => Ok(Self::Package),
            "referral" | "referrals" => Ok(Self::Referral),
            other => Err(ClassboardError::UnknownStatKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow<T> {
    #[serde(default)]
    pub key: String,
    #[serde(flatten)]
    pub stat: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatRows {
    Booking(Vec<StatRow<BookingStat>>),
    Student(Vec<StatRow<StudentStat>>),
    Teacher(Vec<StatRow<TeacherStat>>),
    Equipment(Vec<StatRow<EquipmentStat>>),
    Package(Vec<StatRow<PackageStat>>),
    Referral(Vec<StatRow<ReferralStat>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatTotals {
    Booking(Totals<BookingStat>),
    Student(Totals<StudentStat>),
    Teacher(Totals<TeacherStat>),
    Equipment(Totals<EquipmentStat>),
    Package(Totals<PackageStat>),
    Referral(Totals<ReferralStat>),
}

fn stats_of<T: StatRecord>(rows: &[StatRow<T>]) -> Vec<T> {
    rows.iter().map(|r| r.stat).collect()
}

fn parse_rows<T>(raw: serde_json::Value) -> Result<Vec<StatRow<T>>>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(raw).map_err(|e| ClassboardError::BadParams(format!("rows: {}", e)))
}

impl StatRows {
    pub fn kind(&self) -> StatKind {
        match self {
            Self::Booking(_) => StatKind::Booking,
            Self::Student(_) => StatKind::Student,
            Self::Teacher(_) => StatKind::Teacher,
            Self::Equipment(_) => StatKind::Equipment,
            Self::Package(_) => StatKind::Package,
            Self::Referral(_) => StatKind::Referral,
        }
    }

    pub fn totals(&self) -> StatTotals {
        match self {
            Self::Booking(r) => StatTotals::Booking(reduce(&stats_of(r))),
            Self::Student(r) => StatTotals::Student(reduce(&stats_of(r))),
            Self::Teacher(r) => StatTotals::Teacher(reduce(&stats_of(r))),
            Self::Equipment(r) => StatTotals::Equipment(reduce(&stats_of(r))),
            Self::Package(r) => StatTotals::Package(reduce(&stats_of(r))),
            Self::Referral(r) => StatTotals::Referral(reduce(&stats_of(r))),
        }
    }

    /// Reads caller-supplied rows of the given kind.
    pub fn from_json(kind: StatKind, raw: serde_json::Value) -> Result<Self> {
        Ok(match kind {
            StatKind::Booking => Self::Booking(parse_rows(raw)?),
            StatKind::Student => Self::Student(parse_rows(raw)?),
            StatKind::Teacher => Self::Teacher(parse_rows(raw)?),
            StatKind::Equipment => Self::Equipment(parse_rows(raw)?),
            StatKind::Package => Self::Package(parse_rows(raw)?),
            StatKind::Referral => Self::Referral(parse_rows(raw)?),
        })
    }
}

fn into_rows<T>(map: BTreeMap<String, T>) -> Vec<StatRow<T>> {
    map.into_iter().map(|(key, stat)| StatRow { key, stat }).collect()
}

fn merge_into<T: StatRecord>(map: &mut BTreeMap<String, T>, key: &str, stat: T) {
    let slot = map.entry(key.to_string()).or_default();
    *slot = slot.merge(stat);
}

/// One row per entity of `kind`, derived from the loaded roster.
pub fn stats_for(kind: StatKind, snapshot: &Snapshot) -> StatRows {
    match kind {
        StatKind::Booking => StatRows::Booking(booking_rows(snapshot)),
        StatKind::Student => StatRows::Student(student_rows(snapshot)),
        StatKind::Teacher => StatRows::Teacher(teacher_rows(snapshot)),
        StatKind::Equipment => StatRows::Equipment(equipment_rows(snapshot)),
        StatKind::Package => StatRows::Package(package_rows(snapshot)),
        StatKind::Referral => StatRows::Referral(referral_rows(snapshot)),
    }
}

fn booking_rows(snapshot: &Snapshot) -> Vec<StatRow<BookingStat>> {
    snapshot
        .bookings
        .iter()
        .map(|b| {
            let stat = b
                .lessons
                .iter()
                .map(|l| {
                    let f = lesson_financials(b, l);
                    BookingStat {
                        events: l.events.len() as u64,
                        minutes: f.minutes,
                        revenue: f.school_revenue,
                        commission: f.teacher_commission,
                    }
                })
                .fold(BookingStat::default(), BookingStat::merge);
            StatRow {
                key: b.id.clone(),
                stat: BookingStat {
                    revenue: round2(stat.revenue),
                    commission: round2(stat.commission),
                    ..stat
                },
            }
        })
        .collect()
}

fn student_rows(snapshot: &Snapshot) -> Vec<StatRow<StudentStat>> {
    let mut map = BTreeMap::new();
    for b in &snapshot.bookings {
        let stat = StudentStat {
            bookings: 1,
            events: b.events().count() as u64,
            minutes: b.events().map(|e| e.counted_minutes()).sum(),
        };
        for s in &b.students {
            merge_into(&mut map, &s.id, stat);
        }
    }
    into_rows(map)
}

fn teacher_rows(snapshot: &Snapshot) -> Vec<StatRow<TeacherStat>> {
    let mut map: BTreeMap<String, TeacherStat> = snapshot
        .teachers
        .iter()
        .map(|t| (t.username.clone(), TeacherStat::default()))
        .collect();
    for b in &snapshot.bookings {
        for l in &b.lessons {
            let f = lesson_financials(b, l);
            merge_into(
                &mut map,
                &l.teacher_username,
                TeacherStat {
                    lessons: 1,
                    events: l.events.len() as u64,
                    minutes: f.minutes,
                    commission: f.teacher_commission,
                    revenue: f.school_revenue,
                },
            );
        }
    }
    into_rows(map)
}

fn equipment_rows(snapshot: &Snapshot) -> Vec<StatRow<EquipmentStat>> {
    let mut map = BTreeMap::new();
    for e in snapshot.bookings.iter().flat_map(|b| b.events()) {
        if e.status == EventStatus::Uncompleted {
            continue;
        }
        for id in &e.equipment_ids {
            merge_into(
                &mut map,
                id,
                EquipmentStat {
                    events: 1,
                    minutes: e.duration.max(0),
                },
            );
        }
    }
    into_rows(map)
}

fn booking_revenue(booking: &Booking) -> f64 {
    booking
        .lessons
        .iter()
        .map(|l| lesson_financials(booking, l).school_revenue)
        .sum()
}

fn package_rows(snapshot: &Snapshot) -> Vec<StatRow<PackageStat>> {
    let mut map = BTreeMap::new();
    for b in &snapshot.bookings {
        let Some(p) = b.package.as_ref() else {
            continue;
        };
        merge_into(
            &mut map,
            &p.id,
            PackageStat {
                bookings: 1,
                minutes: b.events().map(|e| e.counted_minutes()).sum(),
                revenue: booking_revenue(b),
            },
        );
    }
    into_rows(map)
}

fn referral_rows(snapshot: &Snapshot) -> Vec<StatRow<ReferralStat>> {
    let mut map = BTreeMap::new();
    for b in &snapshot.bookings {
        let Some(r) = b.referral.as_ref() else {
            continue;
        };
        merge_into(
            &mut map,
            &r.code,
            ReferralStat {
                bookings: 1,
                revenue: booking_revenue(b),
                commission: r.commission,
            },
        );
    }
    into_rows(map)
}
