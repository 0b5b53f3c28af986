use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

// ── Invoice date parsing ──────────────────────────────────────────────────────

/// Date-time layouts tried in order after RFC 3339.
///
/// Slash dates are month-first, matching the retail exports this dashboard
/// is fed with (`12/1/2010 8:26`).
const DATETIME_FMTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d.%m.%y %H:%M:%S",
    "%d.%m.%y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Date-only layouts; the result is placed at midnight.
///
/// Two-digit `%y` forms come before their `%Y` siblings: `%Y` also accepts a
/// two-digit year and would read `12/1/10` as year 10.
const DATE_FMTS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d.%m.%y",
    "%d.%m.%Y",
];

/// Parse an invoice timestamp using locale-agnostic heuristics.
///
/// Accepts RFC 3339 (offsets are normalised to UTC and dropped), ISO
/// date-times with `T` or a space, month-first slash dates with two- or
/// four-digit years, year-first slash dates and bare dates.
///
/// Returns `None` for empty strings or unrecognised formats.
pub fn parse_invoice_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = match s.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => s.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    for fmt in DATETIME_FMTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }

    DATE_FMTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a user-supplied range bound (`--from` / `--to`).
///
/// A bare date becomes midnight for a start bound and the last instant of
/// that day for an end bound, so `--to 2011-01-31` keeps the whole day.
pub fn parse_range_bound(s: &str, is_end: bool) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if let Some(date) = DATE_FMTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
    {
        return Some(if is_end {
            end_of_day(date)
        } else {
            date.and_time(NaiveTime::MIN)
        });
    }
    parse_invoice_date(trimmed)
}

/// Last representable instant of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.succ_opt()
        .map(|next| next.and_time(NaiveTime::MIN) - Duration::nanoseconds(1))
        .unwrap_or(NaiveDateTime::MAX)
}

// ── Calendar months ───────────────────────────────────────────────────────────

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    next_month_start(date)
        .pred_opt()
        .unwrap_or(date)
}

/// First day of the month following the one containing `date`.
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── parse_invoice_date ───────────────────────────────────────────────────

    #[test]
    fn test_parse_month_first_short_form() {
        let dt = parse_invoice_date("12/1/2010 8:26").unwrap();
        assert_eq!(dt.date(), ymd(2010, 12, 1));
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 26);
    }

    #[test]
    fn test_parse_month_first_padded_with_seconds() {
        let dt = parse_invoice_date("01/04/2011 10:00:00").unwrap();
        assert_eq!(dt.date(), ymd(2011, 1, 4));
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_iso_space_and_t() {
        let a = parse_invoice_date("2011-03-15 14:05:09").unwrap();
        let b = parse_invoice_date("2011-03-15T14:05:09").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.second(), 9);
    }

    #[test]
    fn test_parse_iso_without_seconds() {
        let dt = parse_invoice_date("2011-03-15 14:05").unwrap();
        assert_eq!(dt.minute(), 5);
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn test_parse_rfc3339_offset_normalised_to_utc() {
        let dt = parse_invoice_date("2011-03-15T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
        let z = parse_invoice_date("2011-03-15T12:00:00Z").unwrap();
        assert_eq!(z.hour(), 12);
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let dt = parse_invoice_date("2011-03-15").unwrap();
        assert_eq!(dt, ymd(2011, 3, 15).and_time(NaiveTime::MIN));
    }

    #[test]
    fn test_parse_two_digit_year_month_first() {
        let dt = parse_invoice_date("12/1/10 8:26").unwrap();
        assert_eq!(dt.date(), ymd(2010, 12, 1));
        assert_eq!(dt.hour(), 8);

        let date_only = parse_invoice_date("12/01/10").unwrap();
        assert_eq!(date_only.date(), ymd(2010, 12, 1));
    }

    #[test]
    fn test_parse_two_digit_year_day_first() {
        assert_eq!(
            parse_invoice_date("01.12.10 08:26").unwrap().date(),
            ymd(2010, 12, 1)
        );
        assert_eq!(parse_invoice_date("01.12.10").unwrap().date(), ymd(2010, 12, 1));
    }

    #[test]
    fn test_parse_four_digit_year_still_preferred() {
        assert_eq!(parse_invoice_date("12/1/2010").unwrap().date(), ymd(2010, 12, 1));
        assert_eq!(
            parse_invoice_date("01.12.2010 08:26").unwrap().date(),
            ymd(2010, 12, 1)
        );
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_invoice_date("").is_none());
        assert!(parse_invoice_date("   ").is_none());
        assert!(parse_invoice_date("not-a-date").is_none());
        assert!(parse_invoice_date("13/45/2010 8:26").is_none());
    }

    // ── parse_range_bound ────────────────────────────────────────────────────

    #[test]
    fn test_range_bound_date_only() {
        let start = parse_range_bound("2011-01-31", false).unwrap();
        let end = parse_range_bound("2011-01-31", true).unwrap();
        assert_eq!(start, ymd(2011, 1, 31).and_time(NaiveTime::MIN));
        assert_eq!(end.date(), ymd(2011, 1, 31));
        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
    }

    #[test]
    fn test_range_bound_datetime_is_exact() {
        let end = parse_range_bound("2011-01-31 12:30:00", true).unwrap();
        assert_eq!(end.hour(), 12);
        assert_eq!(end.minute(), 30);
    }

    // ── months ───────────────────────────────────────────────────────────────

    #[test]
    fn test_month_end_handles_leap_year_and_december() {
        assert_eq!(month_end(ymd(2012, 2, 10)), ymd(2012, 2, 29));
        assert_eq!(month_end(ymd(2011, 2, 10)), ymd(2011, 2, 28));
        assert_eq!(month_end(ymd(2010, 12, 1)), ymd(2010, 12, 31));
    }

    #[test]
    fn test_month_start_and_next() {
        assert_eq!(month_start(ymd(2010, 12, 17)), ymd(2010, 12, 1));
        assert_eq!(next_month_start(ymd(2010, 12, 17)), ymd(2011, 1, 1));
    }

    #[test]
    fn test_end_of_day_at_max_date_does_not_overflow() {
        assert_eq!(end_of_day(NaiveDate::MAX), NaiveDateTime::MAX);
    }

    #[test]
    fn test_end_of_day() {
        let eod = end_of_day(ymd(2011, 1, 1));
        assert_eq!(eod.date(), ymd(2011, 1, 1));
        assert!(eod < ymd(2011, 1, 2).and_time(NaiveTime::MIN));
    }
}
