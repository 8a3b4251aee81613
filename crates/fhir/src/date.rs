//! FHIR `date` primitive.
//!
//! A FHIR date carries its own precision: a year, a year and month, or a full
//! calendar date. There is never a time or timezone component, so values are
//! kept exactly as the server sent them.

use crate::FhirError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// A FHIR `date` value with its precision preserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FhirDate {
    /// `YYYY`
    Year(i32),
    /// `YYYY-MM`
    YearMonth(i32, u32),
    /// `YYYY-MM-DD`
    Date(NaiveDate),
}

impl FhirDate {
    /// Returns the calendar date when the value has day precision.
    pub fn as_naive_date(&self) -> Option<NaiveDate> {
        match self {
            FhirDate::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<NaiveDate> for FhirDate {
    fn from(date: NaiveDate) -> Self {
        FhirDate::Date(date)
    }
}

fn parse_year(text: &str) -> Option<i32> {
    if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_month(text: &str) -> Option<u32> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().filter(|month| (1..=12).contains(month))
}

impl FromStr for FhirDate {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FhirError::InvalidDate(s.to_string());

        let mut parts = s.splitn(3, '-');
        let year = parts.next().and_then(parse_year).ok_or_else(invalid)?;

        let Some(month) = parts.next() else {
            return Ok(FhirDate::Year(year));
        };
        let month = parse_month(month).ok_or_else(invalid)?;

        let Some(day) = parts.next() else {
            return Ok(FhirDate::YearMonth(year, month));
        };
        if day.len() != 2 || !day.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let day: u32 = day.parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(FhirDate::Date)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for FhirDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FhirDate::Year(year) => write!(f, "{year:04}"),
            FhirDate::YearMonth(year, month) => write!(f, "{year:04}-{month:02}"),
            FhirDate::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl serde::Serialize for FhirDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for FhirDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
