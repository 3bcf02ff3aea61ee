//! Managed point-in-time values
//!
//! A [`ManagedDate`] wraps an optional exact timestamp together with its
//! day-floored value (local midnight). Setting the value reports which of
//! the two actually changed, so owners can forward change events without
//! firing on no-op writes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Truncates a timestamp to its calendar day.
pub fn floor_to_day(value: NaiveDateTime) -> NaiveDate {
    value.date()
}

/// Midnight of the given day, as a timestamp.
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// A change reported by [`ManagedDate::set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateEvent {
    /// The exact value transitioned.
    Changed {
        prev: Option<NaiveDateTime>,
        new: Option<NaiveDateTime>,
    },
    /// The day-floored value transitioned.
    FlooredChanged {
        prev: Option<NaiveDate>,
        new: Option<NaiveDate>,
    },
}

/// An optional timestamp that tracks its own day-floored derivation.
///
/// The floored value is recomputed on every write; it is `None` iff the
/// exact value is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedDate {
    value: Option<NaiveDateTime>,
    floored: Option<NaiveDate>,
}

impl ManagedDate {
    /// Creates a managed date with an initial (possibly unset) value.
    pub fn new(value: Option<NaiveDateTime>) -> Self {
        Self {
            value,
            floored: value.map(floor_to_day),
        }
    }

    /// The exact value.
    pub fn value(&self) -> Option<NaiveDateTime> {
        self.value
    }

    /// The value truncated to its calendar day.
    pub fn floored(&self) -> Option<NaiveDate> {
        self.floored
    }

    /// Sets the value, recomputing the floored derivation.
    ///
    /// Returns one event per real transition: repeated identical writes
    /// return nothing, and a sub-day adjustment reports only the exact
    /// change.
    pub fn set(&mut self, value: Option<NaiveDateTime>) -> Vec<DateEvent> {
        let prev = self.value;
        let prev_floored = self.floored;

        self.value = value;
        self.floored = value.map(floor_to_day);

        let mut events = Vec::new();
        if prev != self.value {
            events.push(DateEvent::Changed {
                prev,
                new: self.value,
            });
        }
        if prev_floored != self.floored {
            events.push(DateEvent::FlooredChanged {
                prev: prev_floored,
                new: self.floored,
            });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn floored_follows_value() {
        let date = ManagedDate::new(Some(dt(2020, 5, 1, 8, 34)));
        assert_eq!(date.floored(), NaiveDate::from_ymd_opt(2020, 5, 1));

        let unset = ManagedDate::new(None);
        assert_eq!(unset.value(), None);
        assert_eq!(unset.floored(), None);
    }

    #[test]
    fn identical_set_emits_nothing() {
        let mut date = ManagedDate::new(Some(dt(2020, 5, 1, 8, 34)));
        assert!(date.set(Some(dt(2020, 5, 1, 8, 34))).is_empty());
    }

    #[test]
    fn sub_day_change_emits_only_exact_event() {
        let mut date = ManagedDate::new(Some(dt(2020, 5, 1, 8, 0)));
        let events = date.set(Some(dt(2020, 5, 1, 17, 30)));

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DateEvent::Changed { .. }));
    }

    #[test]
    fn day_change_emits_both_events() {
        let mut date = ManagedDate::new(Some(dt(2020, 5, 1, 8, 0)));
        let events = date.set(Some(dt(2020, 5, 2, 8, 0)));

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            DateEvent::Changed {
                prev: Some(dt(2020, 5, 1, 8, 0)),
                new: Some(dt(2020, 5, 2, 8, 0)),
            }
        );
        assert_eq!(
            events[1],
            DateEvent::FlooredChanged {
                prev: NaiveDate::from_ymd_opt(2020, 5, 1),
                new: NaiveDate::from_ymd_opt(2020, 5, 2),
            }
        );
    }

    #[test]
    fn unset_is_a_transition() {
        let mut date = ManagedDate::new(Some(dt(2020, 5, 1, 8, 0)));
        let events = date.set(None);

        assert_eq!(events.len(), 2);
        assert_eq!(date.value(), None);
        assert_eq!(date.floored(), None);

        // Unset to unset is a no-op
        assert!(date.set(None).is_empty());
    }
}
