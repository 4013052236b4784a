/// Screen-name history: dedup, date ranges and the links shown for each name
use crate::model::Dates;
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Placeholder shown in result tables when a date is not known
pub const UNKNOWN_DATE: &str = "unknown";

/// When a screen name was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Single(NaiveDate),
    Span(NaiveDate, NaiveDate),
}

impl DateRange {
    /// One date gives `Single`, two or more give `Span(first, last)`
    pub fn from_dates(dates: Option<&[NaiveDate]>) -> Option<DateRange> {
        match dates? {
            [] => None,
            [date] => Some(DateRange::Single(*date)),
            [first, .., last] => Some(DateRange::Span(*first, *last)),
        }
    }

    pub fn first(&self) -> NaiveDate {
        match self {
            DateRange::Single(date) => *date,
            DateRange::Span(first, _) => *first,
        }
    }

    pub fn last(&self) -> NaiveDate {
        match self {
            DateRange::Single(date) => *date,
            DateRange::Span(_, last) => *last,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Single(date) => write!(f, "{}", date),
            DateRange::Span(first, last) => write!(f, "{} to {}", first, last),
        }
    }
}

/// A screen name the account used before its current one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastScreenName {
    pub screen_name: String,
    pub range: Option<DateRange>,
}

impl PastScreenName {
    /// Link text, e.g. `@jack`
    pub fn label(&self) -> String {
        format!("@{}", self.screen_name)
    }

    /// Tooltip text, absent when the service had no dates
    pub fn title(&self) -> Option<String> {
        self.range.map(|range| range.to_string())
    }

    /// Wayback Machine search over the name's archived statuses
    pub fn archive_link(&self, archive_base: &Url) -> String {
        format!(
            "{}web/*/https://twitter.com/{}/status/*",
            archive_base, self.screen_name
        )
    }
}

/// Historical names other than `current`, compared case-insensitively.
///
/// Each remaining name appears once, in the order the service returned them.
pub fn past_screen_names(
    screen_names: &IndexMap<String, Dates>,
    current: &str,
) -> Vec<PastScreenName> {
    let current = current.to_lowercase();
    let mut seen = HashSet::new();

    screen_names
        .iter()
        .filter(|(screen_name, _)| {
            let folded = screen_name.to_lowercase();
            folded != current && seen.insert(folded)
        })
        .map(|(screen_name, dates)| PastScreenName {
            screen_name: screen_name.clone(),
            range: DateRange::from_dates(dates.as_deref()),
        })
        .collect()
}

/// One row of the front-end results table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub screen_name: String,
    pub first: String,
    pub last: String,
}

pub fn history_rows(screen_names: &IndexMap<String, Dates>) -> Vec<HistoryRow> {
    screen_names
        .iter()
        .map(|(screen_name, dates)| {
            let range = DateRange::from_dates(dates.as_deref());
            let (first, last) = match range {
                Some(range) => (range.first().to_string(), range.last().to_string()),
                None => (UNKNOWN_DATE.to_string(), UNKNOWN_DATE.to_string()),
            };

            HistoryRow {
                screen_name: screen_name.clone(),
                first,
                last,
            }
        })
        .collect()
}
