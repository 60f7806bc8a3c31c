use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::{Error, Result};

static RE_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Q([1-4]) (\d{4})$").unwrap());
static RE_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-Q([1-4])$").unwrap());

/// A reporting quarter as shown on the form, e.g. `Q3 2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterLabel {
    pub year: i32,
    pub quarter: u8,
}

impl QuarterLabel {
    /// Parse a quarter label.
    ///
    /// Supported formats:
    /// - `Q1 2024` (form label)
    /// - `2024-Q1` (sortable key)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(caps) = RE_LABEL.captures(s) {
            return Self::from_parts(&caps[2], &caps[1], s);
        }
        if let Some(caps) = RE_KEY.captures(s) {
            return Self::from_parts(&caps[1], &caps[2], s);
        }
        Err(Error::QuarterParse(format!("unrecognized quarter: {s}")))
    }

    fn from_parts(year: &str, quarter: &str, input: &str) -> Result<Self> {
        let year = year
            .parse()
            .map_err(|_| Error::QuarterParse(format!("invalid year: {input}")))?;
        let quarter = quarter
            .parse()
            .map_err(|_| Error::QuarterParse(format!("invalid quarter: {input}")))?;
        Ok(Self { year, quarter })
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

/// The enumerated set of quarter labels a report may be filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingQuarters {
    labels: Vec<QuarterLabel>,
}

impl ReportingQuarters {
    pub fn new(mut labels: Vec<QuarterLabel>) -> Self {
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    /// All four quarters of each year in `years`.
    pub fn for_years(years: impl IntoIterator<Item = i32>) -> Self {
        let labels = years
            .into_iter()
            .flat_map(|year| (1..=4).map(move |quarter| QuarterLabel { year, quarter }))
            .collect();
        Self::new(labels)
    }

    /// The previous and the current year, relative to `today`.
    pub fn around(today: NaiveDate) -> Self {
        Self::for_years([today.year() - 1, today.year()])
    }

    /// Parse a comma-separated list as stored in `app_config`.
    pub fn parse_list(s: &str) -> Result<Self> {
        let labels = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(QuarterLabel::parse)
            .collect::<Result<Vec<_>>>()?;
        if labels.is_empty() {
            return Err(Error::QuarterParse("no quarters listed".into()));
        }
        Ok(Self::new(labels))
    }

    /// Whether `label` is one of the configured form labels. Only the
    /// display form (`Q1 2024`) is accepted on a report.
    pub fn contains(&self, label: &str) -> bool {
        RE_LABEL.is_match(label)
            && QuarterLabel::parse(label)
                .map(|q| self.labels.binary_search(&q).is_ok())
                .unwrap_or(false)
    }

    pub fn labels(&self) -> &[QuarterLabel] {
        &self.labels
    }

    /// Add `label`, keeping the set sorted.
    pub fn insert(&mut self, label: QuarterLabel) {
        if let Err(pos) = self.labels.binary_search(&label) {
            self.labels.insert(pos, label);
        }
    }
}

impl Default for ReportingQuarters {
    fn default() -> Self {
        Self::around(chrono::Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label() {
        assert_eq!(
            QuarterLabel::parse("Q2 2024").unwrap(),
            QuarterLabel { year: 2024, quarter: 2 }
        );
        assert_eq!(
            QuarterLabel::parse("2024-Q4").unwrap(),
            QuarterLabel { year: 2024, quarter: 4 }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(QuarterLabel::parse("Q5 2024").is_err());
        assert!(QuarterLabel::parse("Q1").is_err());
        assert!(QuarterLabel::parse("").is_err());
    }

    #[test]
    fn test_display() {
        let q = QuarterLabel { year: 2025, quarter: 3 };
        assert_eq!(q.to_string(), "Q3 2025");
    }

    #[test]
    fn test_reporting_quarters_contains() {
        let set = ReportingQuarters::for_years([2024]);
        assert_eq!(set.labels().len(), 4);
        assert!(set.contains("Q1 2024"));
        assert!(set.contains("Q4 2024"));
        assert!(!set.contains("Q1 2025"));
        assert!(!set.contains("2024-Q1"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_around_covers_previous_year() {
        let set = ReportingQuarters::around(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert!(set.contains("Q4 2024"));
        assert!(set.contains("Q1 2025"));
        assert_eq!(set.labels().len(), 8);
    }

    #[test]
    fn test_parse_list() {
        let set = ReportingQuarters::parse_list("Q2 2024, Q1 2024,Q1 2024").unwrap();
        let shown: Vec<String> = set.labels().iter().map(|q| q.to_string()).collect();
        assert_eq!(shown, ["Q1 2024", "Q2 2024"]);
        assert!(ReportingQuarters::parse_list(" , ").is_err());
        assert!(ReportingQuarters::parse_list("Q1 2024, spring").is_err());
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut set = ReportingQuarters::for_years([2025]);
        set.insert(QuarterLabel { year: 2024, quarter: 1 });
        set.insert(QuarterLabel { year: 2024, quarter: 1 });
        assert_eq!(set.labels().len(), 5);
        assert_eq!(set.labels()[0].to_string(), "Q1 2024");
        assert!(set.contains("Q1 2024"));
    }
}
