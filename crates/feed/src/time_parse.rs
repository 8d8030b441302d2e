// ABOUTME: RFC 822 date conversion for RSS pubDate and lastBuildDate values.
// ABOUTME: Parses the fixed textual format into UTC instants and formats them back with a GMT zone.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::text_parse::{parse_digits, split_fields, split_prefix, tokens};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Named zones accepted in the zone position (offset in seconds from UTC).
const NAMED_ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UT", 0),
    ("UTC", 0),
    ("Z", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
];

/// Parses an RFC 822 timestamp such as `Tue, 03 Jun 2003 09:39:21 GMT`.
///
/// The weekday prefix is optional and only checked to be a valid name; the
/// instant is derived from the remaining five fields. Two-digit years are
/// mapped to 1970-2069. Returns None on any malformed or out-of-range field.
pub fn parse_rfc822(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (weekday, rest) = split_prefix(s, ',');
    if let Some(name) = weekday {
        if !WEEKDAYS.contains(&name) {
            return None;
        }
    }

    let fields = tokens(rest);
    let &[day, month, year, time, zone] = fields.as_slice() else {
        return None;
    };

    let day: u32 = parse_digits(day, 1, 2)?;
    if !(1..=31).contains(&day) {
        return None;
    }
    let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
    let year = parse_year(year)?;
    let (hour, minute, second) = parse_time_of_day(time)?;
    let offset = zone_offset(zone)?;

    // from_ymd_opt rejects days past the end of the month.
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let local = FixedOffset::east_opt(offset)?
        .from_local_datetime(&naive)
        .single()?;
    let utc = local.with_timezone(&Utc);
    // The zone shift must not push the instant out of four-digit years.
    if !(0..=9999).contains(&utc.year()) {
        return None;
    }
    Some(utc)
}

/// Formats an instant as `Www, DD Mon YYYY HH:MM:SS GMT`.
pub fn format_rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn parse_year(s: &str) -> Option<i32> {
    match s.len() {
        2 => {
            let yy: i32 = parse_digits(s, 2, 2)?;
            Some(if yy >= 70 { 1900 + yy } else { 2000 + yy })
        }
        4 => parse_digits(s, 4, 4),
        _ => None,
    }
}

fn parse_time_of_day(s: &str) -> Option<(u32, u32, u32)> {
    let parts = split_fields(s, ':');
    let (hour, minute, second) = match parts.as_slice() {
        &[h, m] => (h, m, None),
        &[h, m, sec] => (h, m, Some(sec)),
        _ => return None,
    };

    let hour: u32 = parse_digits(hour, 1, 2)?;
    let minute: u32 = parse_digits(minute, 1, 2)?;
    let second: u32 = match second {
        Some(sec) => parse_digits(sec, 1, 2)?,
        None => 0,
    };

    if hour >= 24 || minute >= 60 || second >= 60 {
        return None;
    }
    Some((hour, minute, second))
}

/// Resolves a zone token to an offset in seconds east of UTC.
fn zone_offset(zone: &str) -> Option<i32> {
    if let Some((_, offset)) = NAMED_ZONES.iter().find(|(name, _)| *name == zone) {
        return Some(*offset);
    }

    // Numeric form: +HHMM / -HHMM
    let (sign, digits) = match zone.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let value: i32 = parse_digits(digits, 4, 4)?;
    let (hours, minutes) = (value / 100, value % 100);
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}
