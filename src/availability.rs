use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{Appointment, DayHours};

/// Candidate starts are generated on a fixed half-hour grid anchored at the
/// day's opening hour, so slot boundaries do not drift with the query time.
const SLOT_INTERVAL_MIN: i64 = 30;

/// Computes the bookable start times for one barber on one calendar day.
///
/// A start is offered when the day is open, the whole service fits before
/// closing, and the candidate interval `[start, start + duration)` overlaps
/// neither the lunch window nor any of the barber's existing appointments
/// (each occupying `[start, start + recorded duration)` — the duration copied
/// into the appointment, not the catalog's current value). Intervals are
/// half-open, so a service ending exactly when another begins is a valid
/// back-to-back booking. Starts at or before `now` are dropped.
///
/// `now` is an argument rather than a clock read so identical inputs always
/// produce the identical sequence. Misconfigured hours (closing before
/// opening, a weekday missing from `schedule`) yield an empty or shortened
/// sequence, never an error. Other barbers' appointments are ignored.
pub fn available_slots(
    date: NaiveDate,
    barber_id: i64,
    service_duration_min: u32,
    schedule: &[DayHours],
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Slots {
    let weekday = date.weekday().num_days_from_sunday();
    let day = schedule
        .iter()
        .find(|d| u32::from(d.day_of_week) == weekday && d.is_open);

    let Some(day) = day else {
        return Slots::empty(date, now);
    };

    let duration_min = i64::from(service_duration_min);
    let busy = appointments
        .iter()
        .filter(|a| a.barber.id == barber_id && a.date.date() == date)
        .map(|a| (a.date, a.date + Duration::minutes(i64::from(a.service.duration))))
        .collect();

    Slots {
        date,
        cursor_min: i64::from(day.opening) * 60,
        last_start_min: i64::from(day.closing) * 60 - duration_min,
        duration_min,
        lunch_start_min: i64::from(day.lunch_start) * 60,
        lunch_end_min: i64::from(day.lunch_end) * 60,
        busy,
        now,
    }
}

/// Lazy walk over a day's slot grid. Cloning restarts the sequence from the
/// beginning; the original is unaffected.
#[derive(Debug, Clone)]
pub struct Slots {
    date: NaiveDate,
    /// Next candidate, in minutes from midnight.
    cursor_min: i64,
    /// Last candidate still fitting before closing, inclusive.
    last_start_min: i64,
    duration_min: i64,
    lunch_start_min: i64,
    lunch_end_min: i64,
    /// Occupied intervals for the queried barber on `date`, half-open.
    busy: Vec<(NaiveDateTime, NaiveDateTime)>,
    now: NaiveDateTime,
}

impl Slots {
    fn empty(date: NaiveDate, now: NaiveDateTime) -> Slots {
        Slots {
            date,
            cursor_min: 0,
            last_start_min: -1,
            duration_min: 0,
            lunch_start_min: 0,
            lunch_end_min: 0,
            busy: Vec::new(),
            now,
        }
    }
}

impl Iterator for Slots {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<NaiveDateTime> {
        while self.cursor_min <= self.last_start_min {
            let start_min = self.cursor_min;
            self.cursor_min += SLOT_INTERVAL_MIN;

            // Lunch comparison stays in minutes from midnight: total even
            // when the configured hours cannot form a valid time of day.
            let end_min = start_min + self.duration_min;
            if start_min < self.lunch_end_min && self.lunch_start_min < end_min {
                continue;
            }

            let Some(start) = time_of_day(self.date, start_min) else {
                continue;
            };
            let end = start + Duration::minutes(self.duration_min);

            if self
                .busy
                .iter()
                .any(|&(busy_start, busy_end)| start < busy_end && busy_start < end)
            {
                continue;
            }

            if start <= self.now {
                continue;
            }

            return Some(start);
        }
        None
    }
}

fn time_of_day(date: NaiveDate, minutes: i64) -> Option<NaiveDateTime> {
    if !(0..24 * 60).contains(&minutes) {
        return None;
    }
    let time = NaiveTime::from_hms_opt(minutes as u32 / 60, minutes as u32 % 60, 0)?;
    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Barber, Service, ServiceIcon};

    fn day(day_of_week: u8, opening: u32, closing: u32, lunch: (u32, u32)) -> DayHours {
        DayHours {
            day_of_week,
            is_open: true,
            opening,
            closing,
            lunch_start: lunch.0,
            lunch_end: lunch.1,
        }
    }

    fn week(open_day: DayHours) -> Vec<DayHours> {
        (0..7u8)
            .map(|d| {
                if d == open_day.day_of_week {
                    open_day.clone()
                } else {
                    DayHours {
                        day_of_week: d,
                        is_open: false,
                        opening: 9,
                        closing: 18,
                        lunch_start: 12,
                        lunch_end: 13,
                    }
                }
            })
            .collect()
    }

    fn service(duration: u32) -> Service {
        Service {
            id: 99,
            name: "Corte de Cabelo".into(),
            price: 50.0,
            duration,
            icon: ServiceIcon::Cut,
        }
    }

    fn barber(id: i64) -> Barber {
        Barber {
            id,
            name: "Ricardo".into(),
            image_url: "https://example.com/ricardo.jpg".into(),
        }
    }

    fn appointment(barber_id: i64, date: NaiveDate, hour: u32, min: u32, duration: u32) -> Appointment {
        Appointment {
            id: 1,
            service: service(duration),
            barber: barber(barber_id),
            date: date.and_hms_opt(hour, min, 0).unwrap(),
            customer_name: "Carlos Silva".into(),
            customer_phone: "11987654321".into(),
        }
    }

    fn at(date: NaiveDate, hour: u32, min: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, min, 0).unwrap()
    }

    // 2026-08-03 is a Monday (weekday 1).
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    #[test]
    fn closed_day_yields_nothing() {
        let mut schedule = week(day(1, 9, 19, (12, 13)));
        schedule[1].is_open = false;
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &[], at(monday(), 0, 0)).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn missing_weekday_entry_yields_nothing() {
        let schedule: Vec<DayHours> = week(day(1, 9, 19, (12, 13)))
            .into_iter()
            .filter(|d| d.day_of_week != 1)
            .collect();
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &[], at(monday(), 0, 0)).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn full_open_day_walks_the_half_hour_grid() {
        let schedule = week(day(1, 9, 12, (0, 0)));
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &[], at(monday(), 0, 0)).collect();
        let expected: Vec<_> = [(9, 0), (9, 30), (10, 0), (10, 30), (11, 0), (11, 30)]
            .iter()
            .map(|&(h, m)| at(monday(), h, m))
            .collect();
        assert_eq!(slots, expected);
    }

    #[test]
    fn booked_day_scenario_excludes_conflicts_and_lunch() {
        // Open 09-19, lunch 12-13, barber 1 already booked 10:00-10:45.
        let schedule = week(day(1, 9, 19, (12, 13)));
        let booked = vec![appointment(1, monday(), 10, 0, 45)];
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &booked, at(monday(), 8, 0)).collect();

        for excluded in [(10, 0), (10, 30), (12, 0), (12, 30)] {
            assert!(!slots.contains(&at(monday(), excluded.0, excluded.1)), "{excluded:?}");
        }
        for included in [(9, 0), (9, 30), (11, 0), (11, 30), (13, 0), (13, 30), (18, 30)] {
            assert!(slots.contains(&at(monday(), included.0, included.1)), "{included:?}");
        }
        assert_eq!(*slots.last().unwrap(), at(monday(), 18, 30));
        // Ascending, no duplicates.
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn back_to_back_bookings_are_legal() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let booked = vec![appointment(1, monday(), 10, 0, 30)];
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &booked, at(monday(), 8, 0)).collect();

        assert!(!slots.contains(&at(monday(), 10, 0)));
        // Ending exactly at 10:00 and starting exactly at 10:30 both touch
        // the booked interval without overlapping it.
        assert!(slots.contains(&at(monday(), 9, 30)));
        assert!(slots.contains(&at(monday(), 10, 30)));
    }

    #[test]
    fn slot_ending_exactly_at_lunch_start_is_offered() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let slots: Vec<_> =
            available_slots(monday(), 1, 60, &schedule, &[], at(monday(), 0, 0)).collect();

        assert!(slots.contains(&at(monday(), 11, 0))); // ends 12:00
        assert!(!slots.contains(&at(monday(), 11, 30))); // ends 12:30
        assert!(slots.contains(&at(monday(), 13, 0))); // starts at lunch end
    }

    #[test]
    fn long_service_stops_before_closing() {
        // 75 minutes in a 10-16 window: grid runs 10:00..14:30; 14:30+75min
        // = 15:45 still fits, 15:00 would run past closing.
        let schedule = week(day(1, 10, 16, (12, 12)));
        let slots: Vec<_> =
            available_slots(monday(), 1, 75, &schedule, &[], at(monday(), 0, 0)).collect();

        assert_eq!(slots.first(), Some(&at(monday(), 10, 0)));
        assert_eq!(slots.last(), Some(&at(monday(), 14, 30)));
        assert!(slots.iter().all(|s| *s < at(monday(), 15, 0)));
    }

    #[test]
    fn service_longer_than_the_open_window_yields_nothing() {
        let schedule = week(day(1, 10, 12, (0, 0)));
        let slots: Vec<_> =
            available_slots(monday(), 1, 180, &schedule, &[], at(monday(), 0, 0)).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn closing_before_opening_degrades_to_empty() {
        let schedule = week(day(1, 18, 9, (12, 13)));
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &[], at(monday(), 0, 0)).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn other_barbers_never_block_a_slot() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let booked = vec![appointment(2, monday(), 10, 0, 45)];
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &booked, at(monday(), 8, 0)).collect();
        assert!(slots.contains(&at(monday(), 10, 0)));
        assert!(slots.contains(&at(monday(), 10, 30)));
    }

    #[test]
    fn same_barber_other_day_never_blocks_a_slot() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let tuesday = monday().succ_opt().unwrap();
        let booked = vec![appointment(1, tuesday, 10, 0, 45)];
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &booked, at(monday(), 8, 0)).collect();
        assert!(slots.contains(&at(monday(), 10, 0)));
    }

    #[test]
    fn elapsed_slots_are_dropped_on_the_query_day() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &[], at(monday(), 10, 0)).collect();

        // Strictly after now: a slot at exactly 10:00 is already gone.
        assert_eq!(slots.first(), Some(&at(monday(), 10, 30)));
    }

    #[test]
    fn future_day_is_unaffected_by_now() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let sunday = monday().pred_opt().unwrap();
        let slots: Vec<_> =
            available_slots(monday(), 1, 30, &schedule, &[], at(sunday, 23, 0)).collect();
        assert_eq!(slots.first(), Some(&at(monday(), 9, 0)));
    }

    #[test]
    fn identical_inputs_produce_the_identical_sequence() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let booked = vec![appointment(1, monday(), 10, 0, 45)];
        let now = at(monday(), 8, 0);

        let first: Vec<_> = available_slots(monday(), 1, 30, &schedule, &booked, now).collect();
        let second: Vec<_> = available_slots(monday(), 1, 30, &schedule, &booked, now).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn cloning_the_walk_restarts_it() {
        let schedule = week(day(1, 9, 19, (12, 13)));
        let mut walk = available_slots(monday(), 1, 30, &schedule, &[], at(monday(), 0, 0));
        let restart = walk.clone();

        walk.next();
        walk.next();
        assert_eq!(restart.collect::<Vec<_>>().first(), Some(&at(monday(), 9, 0)));
    }

    #[test]
    fn every_slot_fits_inside_the_open_window() {
        let schedule = week(day(6, 10, 16, (12, 13)));
        // 2026-08-08 is a Saturday.
        let saturday = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        let duration = 45;
        let slots: Vec<_> =
            available_slots(saturday, 1, duration, &schedule, &[], at(saturday, 0, 0)).collect();

        assert!(!slots.is_empty());
        for slot in slots {
            assert!(slot >= at(saturday, 10, 0));
            assert!(slot + Duration::minutes(i64::from(duration)) <= at(saturday, 16, 0));
        }
    }
}
