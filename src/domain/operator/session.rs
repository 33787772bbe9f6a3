//! Minutes elapsed in the trading session (FROMOPEN).
//!
//! The session runs 09:30-11:30 and 13:00-15:00, 240 minutes in total.
//! Lunch and the time after the close count as the minutes already traded.

use chrono::{NaiveTime, Timelike};

const MORNING_MINUTES: u32 = 120;
const SESSION_MINUTES: u32 = 240;

fn minute_of_day(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}

pub fn minutes_from_open(time: NaiveTime) -> u32 {
    let open_am = minute_of_day(9, 30) * 60;
    let close_am = minute_of_day(11, 30) * 60;
    let open_pm = minute_of_day(13, 0) * 60;
    let close_pm = minute_of_day(15, 0) * 60;
    let now = time.num_seconds_from_midnight();

    if now < open_am {
        0
    } else if now <= close_am {
        (now - open_am) / 60
    } else if now <= open_pm {
        MORNING_MINUTES
    } else if now <= close_pm {
        MORNING_MINUTES + (now - open_pm) / 60
    } else {
        SESSION_MINUTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn before_open_is_zero() {
        assert_eq!(minutes_from_open(at(8, 0, 0)), 0);
        assert_eq!(minutes_from_open(at(9, 29, 59)), 0);
    }

    #[test]
    fn morning_counts_whole_minutes() {
        assert_eq!(minutes_from_open(at(9, 30, 0)), 0);
        assert_eq!(minutes_from_open(at(9, 45, 59)), 15);
        assert_eq!(minutes_from_open(at(11, 30, 0)), 120);
    }

    #[test]
    fn lunch_holds_morning_total() {
        assert_eq!(minutes_from_open(at(12, 0, 0)), 120);
        assert_eq!(minutes_from_open(at(13, 0, 0)), 120);
    }

    #[test]
    fn afternoon_continues_from_morning() {
        assert_eq!(minutes_from_open(at(13, 1, 0)), 121);
        assert_eq!(minutes_from_open(at(14, 30, 0)), 210);
        assert_eq!(minutes_from_open(at(15, 0, 0)), 240);
    }

    #[test]
    fn after_close_is_full_session() {
        assert_eq!(minutes_from_open(at(15, 0, 1)), 240);
        assert_eq!(minutes_from_open(at(23, 59, 59)), 240);
    }
}
