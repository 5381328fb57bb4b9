//! Half-open time ranges with set operations and DST-aware splitting.
//!
//! A [`TimeSlot`] covers `from <= t < to`. Day slots are built from civil
//! calendar dates in a named zone, so a day in `Europe/*` zones spans 23, 24
//! or 25 hours depending on the DST transitions it contains.

use std::fmt;

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Timezone-aware instant used for slot boundaries.
pub type Instant = DateTime<Tz>;

/// An immutable time range `[from, to)`.
///
/// No ordering is enforced between `from` and `to`; `from == to` is the
/// empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    from: Instant,
    to: Instant,
}

impl TimeSlot {
    /// Create a slot from its two boundaries.
    pub fn new(from: Instant, to: Instant) -> Self {
        Self { from, to }
    }

    /// The canonical empty slot, anchored at the minimum representable instant.
    pub fn empty() -> Self {
        let min = DateTime::<Utc>::MIN_UTC.with_timezone(&Tz::UTC);
        Self { from: min, to: min }
    }

    /// Slot covering one civil day in `tz`.
    ///
    /// `to` is the start of the following civil day, or the start of
    /// `to_day_exclusive` when given.
    pub fn at_date(day: NaiveDate, tz: Tz, to_day_exclusive: Option<NaiveDate>) -> Result<Self> {
        let end_day = match to_day_exclusive {
            Some(end) => end,
            None => day
                .succ_opt()
                .ok_or_else(|| Error::invalid_argument(format!("no day follows {day}")))?,
        };
        Ok(Self {
            from: start_of_day(day, tz),
            to: start_of_day(end_day, tz),
        })
    }

    /// Slot covering the civil day `year-month-day` in `tz`.
    pub fn at_ymd(year: i32, month: u32, day: u32, tz: Tz) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::invalid_argument(format!("invalid date {year:04}-{month:02}-{day:02}"))
        })?;
        Self::at_date(date, tz, None)
    }

    /// Inclusive start.
    pub fn from(&self) -> Instant {
        self.from
    }

    /// Exclusive end.
    pub fn to(&self) -> Instant {
        self.to
    }

    /// True if both boundaries lie inside `other` (touching boundaries count).
    pub fn within(&self, other: &TimeSlot) -> bool {
        self.from >= other.from && self.to <= other.to
    }

    /// True if the slots share a point or touch at a boundary.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.from <= other.to && self.to >= other.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Intersection with `other`, or the empty slot at `self.from` when the
    /// two do not overlap.
    pub fn common_part_with(&self, other: &TimeSlot) -> TimeSlot {
        if !self.overlaps(other) {
            return TimeSlot::new(self.from, self.from);
        }
        TimeSlot::new(self.from.max(other.from), self.to.min(other.to))
    }

    /// Parts covered by exactly one of the two slots.
    ///
    /// Equal slots leave nothing. Disjoint slots are returned as
    /// `[self, other]` in argument order. Otherwise the result holds the
    /// leading edge (if the starts differ) followed by the trailing edge (if
    /// the ends differ).
    pub fn leftover_after_removing_common_with(&self, other: &TimeSlot) -> Vec<TimeSlot> {
        if self == other {
            return Vec::new();
        }
        if !other.overlaps(self) {
            return vec![*self, *other];
        }

        let mut leftover = Vec::with_capacity(2);
        if self.from < other.from {
            leftover.push(TimeSlot::new(self.from, other.from));
        } else if other.from < self.from {
            leftover.push(TimeSlot::new(other.from, self.from));
        }
        if self.to > other.to {
            leftover.push(TimeSlot::new(other.to, self.to));
        } else if other.to > self.to {
            leftover.push(TimeSlot::new(self.to, other.to));
        }
        leftover
    }

    /// Elapsed time `to - from`; negative for reversed slots.
    pub fn duration(&self) -> TimeDelta {
        self.to - self.from
    }

    /// Split into consecutive slots of exactly `step` elapsed time.
    ///
    /// An empty slot yields no slots for any `step`. Fails if `step` is not
    /// positive or does not evenly divide the elapsed duration.
    pub fn split(&self, step: TimeDelta) -> Result<Vec<TimeSlot>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        if step <= TimeDelta::zero() {
            return Err(Error::invalid_argument(format!(
                "split step must be positive, got {step}"
            )));
        }
        let total = self.duration();
        let (step_ns, total_ns) = (total_nanos(step), total_nanos(total));
        if total_ns % step_ns != 0 {
            return Err(Error::invalid_argument(format!(
                "Slot duration {total} not divisible by split duration {step}"
            )));
        }

        // Reversed slots cover nothing.
        let count = if total_ns < 0 {
            0
        } else {
            usize::try_from(total_ns / step_ns)
                .map_err(|_| Error::invalid_argument(format!("too many {step} slots in {self}")))?
        };
        let mut slots = Vec::with_capacity(count);
        let mut current = self.from;
        for _ in 0..count {
            let next = current
                .checked_add_signed(step)
                .ok_or_else(|| Error::invalid_argument("split step overflows the instant range"))?;
            slots.push(TimeSlot::new(current, next));
            current = next;
        }
        Ok(slots)
    }

    /// [`TimeSlot::split`] with the step given in whole seconds.
    pub fn split_seconds(&self, seconds: i64) -> Result<Vec<TimeSlot>> {
        let step = TimeDelta::try_seconds(seconds)
            .ok_or_else(|| Error::invalid_argument(format!("split step out of range: {seconds}s")))?;
        self.split(step)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from.to_rfc3339(), self.to.to_rfc3339())
    }
}

/// Exact length of `delta` in nanoseconds.
fn total_nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * 1_000_000_000 + i128::from(delta.subsec_nanos())
}

/// First instant of the civil day `day` in `tz`.
///
/// Ambiguous midnights resolve to the earlier instant; a midnight skipped by
/// a DST gap resolves to the first instant after the gap.
pub fn start_of_day(day: NaiveDate, tz: Tz) -> Instant {
    let midnight = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Offset in force before the gap maps local midnight onto the
            // instant where the gap ends.
            let before = tz
                .offset_from_utc_datetime(&(midnight - TimeDelta::days(1)))
                .fix();
            let utc = midnight - TimeDelta::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Resolve an IANA zone name such as `"CET"` or `"Europe/Helsinki"`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| Error::UnknownTimezone(name.to_string()))
}
