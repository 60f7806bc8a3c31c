//! Section completion: which parts of a report have enough data to count
//! as done, and how far along the report is overall.
//!
//! Everything here is recomputed from the report on each call.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::schema::{filled, present, ReportData};

/// The sections of a report, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    GeneralInfo,
    Membership,
    Youth,
    BibleStudies,
    LayActivities,
    DivineServices,
    Ministerial,
    Visitation,
    PrayerWalks,
    WomensMinistry,
    Offerings,
    Facilities,
    Challenges,
    Acknowledgments,
    Summary,
}

impl Section {
    pub const ALL: [Section; 15] = [
        Section::GeneralInfo,
        Section::Membership,
        Section::Youth,
        Section::BibleStudies,
        Section::LayActivities,
        Section::DivineServices,
        Section::Ministerial,
        Section::Visitation,
        Section::PrayerWalks,
        Section::WomensMinistry,
        Section::Offerings,
        Section::Facilities,
        Section::Challenges,
        Section::Acknowledgments,
        Section::Summary,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Section::GeneralInfo => "general-info",
            Section::Membership => "membership",
            Section::Youth => "youth",
            Section::BibleStudies => "bible-studies",
            Section::LayActivities => "lay-activities",
            Section::DivineServices => "divine-services",
            Section::Ministerial => "ministerial",
            Section::Visitation => "visitation",
            Section::PrayerWalks => "prayer-walks",
            Section::WomensMinistry => "womens-ministry",
            Section::Offerings => "offerings",
            Section::Facilities => "facilities",
            Section::Challenges => "challenges",
            Section::Acknowledgments => "acknowledgments",
            Section::Summary => "summary",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::GeneralInfo => "General Information",
            Section::Membership => "General Membership",
            Section::Youth => "Youth & Children's Program",
            Section::BibleStudies => "Bible Studies",
            Section::LayActivities => "Lay Activities",
            Section::DivineServices => "Special Divine Services",
            Section::Ministerial => "Ministerial Support",
            Section::Visitation => "Visitation Programs",
            Section::PrayerWalks => "Prayer Walks",
            Section::WomensMinistry => "Women's Ministries",
            Section::Offerings => "Offerings & Finance",
            Section::Facilities => "Facilities & Logistics",
            Section::Challenges => "Challenges & Recommendations",
            Section::Acknowledgments => "Acknowledgments",
            Section::Summary => "Summary & Next Steps",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| format!("unknown section: {s}"))
    }
}

/// Whether `section` of `report` is complete. A missing report is never
/// complete.
pub fn is_section_complete(report: Option<&ReportData>, section: Section) -> bool {
    let Some(r) = report else {
        return false;
    };
    match section {
        Section::GeneralInfo => {
            let gi = &r.general_info;
            filled(&gi.branch_name) && filled(&gi.reporting_quarter) && filled(&gi.leader_name)
        }
        Section::Membership => r.membership.active_members.is_some_and(|n| n > 0),
        Section::Youth => !r.youth_activities.is_empty(),
        Section::BibleStudies => !r.bible_studies.is_empty(),
        Section::LayActivities => !r.lay_activities.is_empty(),
        Section::DivineServices => !r.divine_services.is_empty(),
        Section::Ministerial => filled(&r.leaders.elder) && filled(&r.leaders.report_submitted_by),
        Section::Visitation => !r.visitation.is_empty(),
        Section::PrayerWalks => !r.prayer_walks.is_empty(),
        Section::WomensMinistry => !r.womens_ministry.is_empty(),
        Section::Offerings => r.offerings.total_collected().is_some_and(|t| t >= 0.0),
        Section::Facilities => !r.facilities.is_empty(),
        Section::Challenges => {
            present(&r.challenges.challenges) || present(&r.challenges.recommendations)
        }
        Section::Acknowledgments => present(&r.acknowledgments.acknowledgments),
        Section::Summary => {
            let s = &r.summary;
            present(&s.spiritual_health)
                || present(&s.next_quarter_goals)
                || present(&s.planned_activities)
        }
    }
}

/// Fraction of sections complete, in `[0, 1]`.
pub fn completion_ratio(report: Option<&ReportData>) -> f64 {
    CompletionSummary::evaluate(report).ratio()
}

/// Per-section completion for one report.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionSummary {
    pub sections: Vec<SectionStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionStatus {
    pub section: Section,
    pub title: &'static str,
    pub complete: bool,
}

impl CompletionSummary {
    pub fn evaluate(report: Option<&ReportData>) -> Self {
        let sections = Section::ALL
            .into_iter()
            .map(|section| SectionStatus {
                section,
                title: section.title(),
                complete: is_section_complete(report, section),
            })
            .collect();
        Self { sections }
    }

    pub fn completed(&self) -> usize {
        self.sections.iter().filter(|s| s.complete).count()
    }

    pub fn total(&self) -> usize {
        self.sections.len()
    }

    pub fn ratio(&self) -> f64 {
        if self.sections.is_empty() {
            return 0.0;
        }
        self.completed() as f64 / self.total() as f64
    }

    /// Whole-number percentage for display.
    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }

    pub fn is_complete(&self, section: Section) -> bool {
        self.sections
            .iter()
            .any(|s| s.section == section && s.complete)
    }
}

impl fmt::Display for CompletionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} sections completed",
            self.completed(),
            self.total()
        )
    }
}
