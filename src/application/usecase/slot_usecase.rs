// src/application/usecase/slot_usecase.rs
// Derives bookable slots from a court's daily operating window

use crate::application::dto::parser::{parse_duration, parse_time};
use crate::application::dto::CourtRecord;
use crate::domain::models::{ClockTime, Court, TimeSlot};

/// Lazy, finite sequence of slots `o, o+d, o+2d, ...` while `start + d <= c`.
///
/// A clone continues from the same position; ask the generator again to restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slots {
    next: u32,
    close: u32,
    step: u32,
}

impl Slots {
    fn new(open: ClockTime, close: ClockTime, step: u32) -> Self {
        if step == 0 || open >= close {
            return Self::empty();
        }

        Self {
            next: open.minutes(),
            close: close.minutes(),
            step,
        }
    }

    fn empty() -> Self {
        Self {
            next: 0,
            close: 0,
            step: 0,
        }
    }
}

impl Iterator for Slots {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step == 0 {
            return None;
        }

        let end = self.next.checked_add(self.step)?;
        if end > self.close {
            return None;
        }

        let start = ClockTime::from_minutes(self.next)?;
        let end_time = ClockTime::from_minutes(end)?;
        self.next = end;

        Some(TimeSlot::new(start, end_time))
    }
}

pub struct SlotGenerator;

impl SlotGenerator {
    /// Slots of a validated court. The calendar date only picks which day the
    /// template applies to, so it takes no part here.
    pub fn for_court(court: &Court) -> Slots {
        Slots::new(court.open(), court.close(), court.slot_minutes())
    }

    /// Slots straight from a catalog record. Bad data yields no slots.
    pub fn from_record(record: &CourtRecord) -> Slots {
        Self::from_raw(
            record.start_time.as_deref(),
            record.end_time.as_deref(),
            record.duration.as_deref(),
        )
    }

    pub fn from_raw(open: Option<&str>, close: Option<&str>, duration: Option<&str>) -> Slots {
        let parsed = (
            parse_time(open, "start_time"),
            parse_time(close, "end_time"),
            parse_duration(duration),
        );

        match parsed {
            (Ok(open), Ok(close), Ok(step)) => Slots::new(open, close, step),
            (open, close, step) => {
                log::warn!(
                    "No slots for invalid court hours (open: {:?}, close: {:?}, duration: {:?})",
                    open.err(),
                    close.err(),
                    step.err()
                );
                Slots::empty()
            }
        }
    }
}
