//! Year-month period tokens.
//!
//! A period token is four ASCII digits, `YYMM`, where `YY` is read as
//! `2000 + YY`. Tokens order linearly by `year * 12 + month`, and a range
//! is the inclusive, forward-only run of months between two tokens.
//!
//! Missing or malformed tokens never raise: they simply produce no months.

use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

const YEAR_OFFSET: i32 = 2000;

/// A validated year-month token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    // Field order matters: the derived ordering compares year first.
    year: u8,
    month: u8,
}

impl Period {
    /// Builds a period from a full year (2000..=2099) and a month (1..=12).
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(YEAR_OFFSET..YEAR_OFFSET + 100).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self {
            year: (year - YEAR_OFFSET) as u8,
            month: month as u8,
        })
    }

    /// Parses a `YYMM` token. Returns `None` for anything that is not four
    /// ASCII digits with a month between 01 and 12.
    pub fn parse(token: &str) -> Option<Self> {
        let bytes = token.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let digit = |i: usize| bytes[i] - b'0';
        let year = digit(0) * 10 + digit(1);
        let month = digit(2) * 10 + digit(3);
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// Full calendar year.
    pub fn year(&self) -> i32 {
        YEAR_OFFSET + self.year as i32
    }

    /// Calendar month, 1..=12.
    pub fn month(&self) -> u32 {
        self.month as u32
    }

    /// Linear order key, `year * 12 + month`.
    pub fn order_key(&self) -> i32 {
        self.year() * 12 + self.month() as i32
    }

    /// The following month, or `None` after December 2099.
    pub fn succ(&self) -> Option<Self> {
        if self.month < 12 {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        } else if self.year < 99 {
            Some(Self {
                year: self.year + 1,
                month: 1,
            })
        } else {
            None
        }
    }

    /// The calendar month this period denotes.
    pub fn calendar_month(&self) -> CalendarMonth {
        CalendarMonth {
            year: self.year(),
            month: self.month(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s).ok_or_else(|| ComputeError::InvalidPeriodToken(s.to_string()))
    }
}

/// Calendar key used to bucket aggregated figures. Displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<Period> for CalendarMonth {
    fn from(period: Period) -> Self {
        period.calendar_month()
    }
}

/// Order key of a token, or `None` when the token is malformed.
pub fn to_order_key(token: &str) -> Option<i32> {
    Period::parse(token).map(|p| p.order_key())
}

/// Number of months in the inclusive range `start..=end`; 0 when either end
/// is missing or malformed, or when `end` precedes `start`.
pub fn months_between(start: Option<&str>, end: Option<&str>) -> u32 {
    match (start.and_then(to_order_key), end.and_then(to_order_key)) {
        (Some(start), Some(end)) => (end - start + 1).max(0) as u32,
        _ => 0,
    }
}

/// All months of the inclusive range `start..=end`, in order.
pub fn range(start: Option<&str>, end: Option<&str>) -> Vec<Period> {
    PeriodRange::new(start, end).collect()
}

/// Iterator over the months of an inclusive period range.
///
/// Clone it to walk the same range again.
#[derive(Debug, Clone)]
pub struct PeriodRange {
    next: Option<Period>,
    end: Option<Period>,
}

impl PeriodRange {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        let start = start.and_then(Period::parse);
        let end = end.and_then(Period::parse);
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Self {
                next: Some(start),
                end: Some(end),
            },
            _ => Self {
                next: None,
                end: None,
            },
        }
    }

    pub fn between(start: Period, end: Period) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end: Some(end),
        }
    }
}

impl Iterator for PeriodRange {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        let current = self.next?;
        let end = self.end?;
        self.next = if current < end { current.succ() } else { None };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.next, self.end) {
            (Some(next), Some(end)) => {
                let remaining = (end.order_key() - next.order_key() + 1).max(0) as usize;
                (remaining, Some(remaining))
            }
            _ => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for PeriodRange {}
