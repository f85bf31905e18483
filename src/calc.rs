use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Booking, BookingStatus, CommissionType, EventStatus, Lesson};

const COLOR_COMPLETED: &str = "#22c55e";
const COLOR_PLANNED: &str = "#3b82f6";
const COLOR_TBC: &str = "#f59e0b";
const COLOR_REMAINING: &str = "#e5e7eb";

/// Half-up rounding to cents: `floor(100*x + 0.5) / 100`.
pub fn round2(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

pub fn teacher_commission(commission_type: CommissionType, cph: f64, duration_minutes: i64) -> f64 {
    let hours = duration_minutes as f64 / 60.0;
    match commission_type {
        CommissionType::Fixed => round2(cph * hours),
        // Same arithmetic as fixed until the revenue base for percentage rates is settled.
        CommissionType::Percentage => round2(cph * hours),
    }
}

pub fn school_revenue(
    price_per_student: f64,
    student_count: u32,
    duration_minutes: i64,
    package_duration_minutes: i64,
) -> f64 {
    let package_hours = package_duration_minutes as f64 / 60.0;
    if package_hours <= 0.0 {
        return 0.0;
    }
    let hours_used = duration_minutes as f64 / 60.0;
    let price_per_hour = price_per_student * student_count as f64 / package_hours;
    round2(price_per_hour * hours_used)
}

/// Revenue left to the school after paying the teacher. Negative when the teacher
/// earned more than the booking brought in.
pub fn school_leftover(total_revenue: f64, teacher_commission: f64) -> f64 {
    round2(total_revenue - teacher_commission)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonFinancials {
    pub minutes: i64,
    pub teacher_commission: f64,
    pub school_revenue: f64,
    pub leftover: f64,
}

pub fn lesson_financials(booking: &Booking, lesson: &Lesson) -> LessonFinancials {
    let minutes: i64 = lesson.events.iter().map(|e| e.counted_minutes()).sum();
    let teacher_commission = lesson
        .commission
        .as_ref()
        .map(|c| teacher_commission(c.commission_type, c.cph, minutes))
        .unwrap_or(0.0);
    let school_revenue = booking
        .package
        .as_ref()
        .map(|p| {
            school_revenue(
                p.price_per_student,
                booking.students.len() as u32,
                minutes,
                p.duration_minutes,
            )
        })
        .unwrap_or(0.0);
    LessonFinancials {
        minutes,
        teacher_commission,
        school_revenue,
        leftover: school_leftover(school_revenue, teacher_commission),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBar {
    pub background: String,
    pub completed_end: f64,
    pub planned_end: f64,
    pub tbc_end: f64,
}

pub fn booking_progress_bar(lessons: &[Lesson], total_minutes: i64) -> ProgressBar {
    let mut completed = 0i64;
    let mut planned = 0i64;
    let mut tbc = 0i64;
    for e in lessons.iter().flat_map(|l| l.events.iter()) {
        let d = e.duration.max(0);
        match e.status {
            EventStatus::Completed => completed += d,
            EventStatus::Planned => planned += d,
            EventStatus::Tbc => tbc += d,
            EventStatus::Uncompleted => {}
        }
    }

    let used = completed + planned + tbc;
    let denom = used.max(total_minutes);
    let (completed_end, planned_end, tbc_end) = if denom > 0 {
        let pct = |v: i64| 100.0 * v as f64 / denom as f64;
        let c = pct(completed);
        let p = c + pct(planned);
        (c, p, p + pct(tbc))
    } else {
        (0.0, 0.0, 0.0)
    };

    ProgressBar {
        background: format!(
            "linear-gradient(to right, {COLOR_COMPLETED} 0% {c}%, {COLOR_PLANNED} {c}% {p}%, {COLOR_TBC} {p}% {t}%, {COLOR_REMAINING} {t}% 100%)",
            c = round2(completed_end),
            p = round2(planned_end),
            t = round2(tbc_end),
        ),
        completed_end,
        planned_end,
        tbc_end,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub completed_minutes: i64,
    pub scheduled_minutes: i64,
    pub required_minutes: i64,
    /// Uncapped; above 100 means the booking is over-scheduled.
    pub percentage: f64,
    pub can_be_completed: bool,
}

pub fn booking_completion(booking: &Booking) -> Completion {
    let required_minutes = booking.required_minutes();
    let mut completed_minutes = 0i64;
    let mut scheduled_minutes = 0i64;
    for e in booking.events() {
        scheduled_minutes += e.counted_minutes();
        if e.status == EventStatus::Completed {
            completed_minutes += e.duration.max(0);
        }
    }
    let percentage = if required_minutes > 0 {
        100.0 * scheduled_minutes as f64 / required_minutes as f64
    } else {
        0.0
    };
    Completion {
        completed_minutes,
        scheduled_minutes,
        required_minutes,
        percentage,
        can_be_completed: required_minutes > 0 && completed_minutes >= required_minutes,
    }
}

pub fn booking_status(booking: &Booking, today: NaiveDate) -> BookingStatus {
    if booking_completion(booking).can_be_completed {
        BookingStatus::Completed
    } else if booking.date_end < today {
        BookingStatus::Uncompleted
    } else {
        BookingStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use crate::model::{EventStatus::*, LessonStatus};

    #[test]
    fn round2_is_half_up() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(-20.0), -20.0);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(12.0), 12.0);
    }

    #[test]
    fn commission_scales_with_hours() {
        assert_eq!(teacher_commission(CommissionType::Fixed, 30.0, 90), 45.0);
        assert_eq!(teacher_commission(CommissionType::Fixed, 25.0, 0), 0.0);
        assert_eq!(
            teacher_commission(CommissionType::Percentage, 30.0, 90),
            teacher_commission(CommissionType::Fixed, 30.0, 90)
        );
    }

    #[test]
    fn revenue_is_prorated_by_hours_used() {
        assert_eq!(school_revenue(50.0, 2, 30, 60), 50.0);
        assert_eq!(school_revenue(300.0, 2, 360, 360), 600.0);
        assert_eq!(school_revenue(300.0, 2, 120, 0), 0.0);
    }

    #[test]
    fn leftover_may_go_negative() {
        assert_eq!(school_leftover(50.0, 70.0), -20.0);
        assert_eq!(school_leftover(100.0, 37.5), 62.5);
    }

    #[test]
    fn lesson_financials_skip_uncompleted_and_missing_commission() {
        let mut l = lesson(
            "l1",
            "tom",
            30.0,
            vec![
                event("e1", at("2024-06-10", "09:00"), 120, Completed),
                event("e2", at("2024-06-11", "09:00"), 60, Uncompleted),
            ],
        );
        let b = booking("b1", "2024-06-10", "2024-06-12", vec![l.clone()]);
        let f = lesson_financials(&b, &l);
        assert_eq!(f.minutes, 120);
        assert_eq!(f.teacher_commission, 60.0);
        assert_eq!(f.school_revenue, 200.0);
        assert_eq!(f.leftover, 140.0);

        l.commission = None;
        l.status = LessonStatus::Rest;
        assert_eq!(lesson_financials(&b, &l).teacher_commission, 0.0);
    }

    #[test]
    fn empty_progress_bar_is_all_zero() {
        let bar = booking_progress_bar(&[], 60);
        assert_eq!(bar.completed_end, 0.0);
        assert_eq!(bar.planned_end, 0.0);
        assert_eq!(bar.tbc_end, 0.0);
        let bar = booking_progress_bar(&[], 0);
        assert_eq!(bar.tbc_end, 0.0);
    }

    #[test]
    fn progress_bar_breakpoints_are_cumulative() {
        let l = lesson(
            "l1",
            "tom",
            30.0,
            vec![
                event("e1", at("2024-06-10", "09:00"), 120, Completed),
                event("e2", at("2024-06-11", "09:00"), 60, Planned),
                event("e3", at("2024-06-12", "09:00"), 60, Tbc),
                event("e4", at("2024-06-12", "12:00"), 60, Uncompleted),
            ],
        );
        let bar = booking_progress_bar(&[l], 480);
        assert_eq!(bar.completed_end, 25.0);
        assert_eq!(bar.planned_end, 37.5);
        assert_eq!(bar.tbc_end, 50.0);
        assert!(bar.background.starts_with("linear-gradient(to right,"));
    }

    #[test]
    fn progress_bar_never_exceeds_full_width() {
        let l = lesson(
            "l1",
            "tom",
            30.0,
            vec![
                event("e1", at("2024-06-10", "09:00"), 120, Completed),
                event("e2", at("2024-06-11", "09:00"), 120, Planned),
            ],
        );
        let bar = booking_progress_bar(&[l], 120);
        assert_eq!(bar.completed_end, 50.0);
        assert_eq!(bar.tbc_end, 100.0);
    }

    #[test]
    fn completion_percentage_is_uncapped() {
        let l = lesson(
            "l1",
            "tom",
            30.0,
            vec![
                event("e1", at("2024-06-10", "09:00"), 240, Completed),
                event("e2", at("2024-06-11", "09:00"), 240, Planned),
            ],
        );
        let b = booking("b1", "2024-06-10", "2024-06-12", vec![l]);
        let c = booking_completion(&b);
        assert_eq!(c.required_minutes, 360);
        assert_eq!(c.scheduled_minutes, 480);
        assert!((c.percentage - 133.333).abs() < 0.01);
        assert!(!c.can_be_completed);
    }

    #[test]
    fn status_follows_completion_then_dates() {
        let done = lesson(
            "l1",
            "tom",
            30.0,
            vec![event("e1", at("2024-06-10", "09:00"), 360, Completed)],
        );
        let b = booking("b1", "2024-06-10", "2024-06-12", vec![done]);
        assert_eq!(booking_status(&b, day("2024-07-01")), BookingStatus::Completed);

        let open = booking("b2", "2024-06-10", "2024-06-12", vec![]);
        assert_eq!(booking_status(&open, day("2024-06-11")), BookingStatus::Active);
        assert_eq!(booking_status(&open, day("2024-06-13")), BookingStatus::Uncompleted);
    }

    #[test]
    fn booking_without_package_has_zero_completion() {
        let mut b = booking("b1", "2024-06-10", "2024-06-12", vec![]);
        b.package = None;
        let c = booking_completion(&b);
        assert_eq!(c.percentage, 0.0);
        assert!(!c.can_be_completed);
    }
}
