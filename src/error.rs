use thiserror::Error;

/// Failures raised by the scheduling core. Each maps to a stable wire code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassboardError {
    #[error("invalid time: {0}")]
    InvalidTime(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("booking {0} ends before it starts")]
    InvalidBooking(String),
    #[error("booking not found: {0}")]
    BookingNotFound(String),
    #[error("event not found: {0}")]
    EventNotFound(String),
    #[error("teacher {teacher} has no lesson on booking {booking}")]
    NoLesson { teacher: String, booking: String },
    #[error("booking {booking} is not compatible with teacher {teacher}")]
    Incompatible { teacher: String, booking: String },
    #[error("no free slot left for {0}")]
    QueueFull(String),
    #[error("booking {0} does not cover the selected date")]
    BookingOutOfRange(String),
    #[error("event {0} is completed and cannot change")]
    EventLocked(String),
    #[error("event {0} has no neighbour in that direction")]
    NoNeighbour(String),
    #[error("moving event {0} would collide with another event")]
    NoRoom(String),
    #[error("adjustment mode is off")]
    AdjustmentModeOff,
    #[error("unknown stat kind: {0}")]
    UnknownStatKind(String),
    #[error("{0}")]
    BadParams(String),
}

impl ClassboardError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTime(_) => "invalid_time",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidBooking(_) => "invalid_booking",
            Self::BookingNotFound(_) | Self::EventNotFound(_) => "not_found",
            Self::NoLesson { .. } => "no_lesson",
            Self::Incompatible { .. } => "incompatible",
            Self::QueueFull(_) => "queue_full",
            Self::BookingOutOfRange(_) => "booking_out_of_range",
            Self::EventLocked(_) => "event_locked",
            Self::NoNeighbour(_) => "no_neighbour",
            Self::NoRoom(_) => "no_room",
            Self::AdjustmentModeOff => "adjustment_mode_off",
            Self::UnknownStatKind(_) | Self::BadParams(_) => "bad_params",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassboardError>;
