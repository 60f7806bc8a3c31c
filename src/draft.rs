//! The in-memory working copy of a report.
//!
//! All section editors go through [`DraftState::update_section`], which
//! replaces exactly one top-level section. It never validates, never does
//! I/O, and never fails.

use std::fmt;
use std::str::FromStr;

use crate::schema::{
    Acknowledgments, ActivityEntry, Challenges, DivineService, GeneralInfo, Leaders, Membership,
    Offerings, Report, ReportData, ReportPatch, Summary, YouthActivity,
};

/// Top-level section keys of a report document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    GeneralInfo,
    Membership,
    YouthActivities,
    BibleStudies,
    LayActivities,
    DivineServices,
    Leaders,
    Visitation,
    PrayerWalks,
    WomensMinistry,
    Offerings,
    Facilities,
    Challenges,
    Acknowledgments,
    Summary,
}

impl SectionKey {
    pub const ALL: [SectionKey; 15] = [
        SectionKey::GeneralInfo,
        SectionKey::Membership,
        SectionKey::YouthActivities,
        SectionKey::BibleStudies,
        SectionKey::LayActivities,
        SectionKey::DivineServices,
        SectionKey::Leaders,
        SectionKey::Visitation,
        SectionKey::PrayerWalks,
        SectionKey::WomensMinistry,
        SectionKey::Offerings,
        SectionKey::Facilities,
        SectionKey::Challenges,
        SectionKey::Acknowledgments,
        SectionKey::Summary,
    ];

    /// Document field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::GeneralInfo => "generalInfo",
            SectionKey::Membership => "membership",
            SectionKey::YouthActivities => "youthActivities",
            SectionKey::BibleStudies => "bibleStudies",
            SectionKey::LayActivities => "layActivities",
            SectionKey::DivineServices => "divineServices",
            SectionKey::Leaders => "leaders",
            SectionKey::Visitation => "visitation",
            SectionKey::PrayerWalks => "prayerWalks",
            SectionKey::WomensMinistry => "womensMinistry",
            SectionKey::Offerings => "offerings",
            SectionKey::Facilities => "facilities",
            SectionKey::Challenges => "challenges",
            SectionKey::Acknowledgments => "acknowledgments",
            SectionKey::Summary => "summary",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown section key: {s}"))
    }
}

/// A whole-section replacement value, typed per section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    GeneralInfo(GeneralInfo),
    Membership(Membership),
    YouthActivities(Vec<YouthActivity>),
    BibleStudies(Vec<ActivityEntry>),
    LayActivities(Vec<ActivityEntry>),
    DivineServices(Vec<DivineService>),
    Leaders(Leaders),
    Visitation(Vec<ActivityEntry>),
    PrayerWalks(Vec<ActivityEntry>),
    WomensMinistry(Vec<ActivityEntry>),
    Offerings(Offerings),
    Facilities(Vec<ActivityEntry>),
    Challenges(Challenges),
    Acknowledgments(Acknowledgments),
    Summary(Summary),
}

impl SectionUpdate {
    pub fn key(&self) -> SectionKey {
        match self {
            SectionUpdate::GeneralInfo(_) => SectionKey::GeneralInfo,
            SectionUpdate::Membership(_) => SectionKey::Membership,
            SectionUpdate::YouthActivities(_) => SectionKey::YouthActivities,
            SectionUpdate::BibleStudies(_) => SectionKey::BibleStudies,
            SectionUpdate::LayActivities(_) => SectionKey::LayActivities,
            SectionUpdate::DivineServices(_) => SectionKey::DivineServices,
            SectionUpdate::Leaders(_) => SectionKey::Leaders,
            SectionUpdate::Visitation(_) => SectionKey::Visitation,
            SectionUpdate::PrayerWalks(_) => SectionKey::PrayerWalks,
            SectionUpdate::WomensMinistry(_) => SectionKey::WomensMinistry,
            SectionUpdate::Offerings(_) => SectionKey::Offerings,
            SectionUpdate::Facilities(_) => SectionKey::Facilities,
            SectionUpdate::Challenges(_) => SectionKey::Challenges,
            SectionUpdate::Acknowledgments(_) => SectionKey::Acknowledgments,
            SectionUpdate::Summary(_) => SectionKey::Summary,
        }
    }

    /// Parse a section value from JSON, e.g. a file edited by hand.
    pub fn from_json(key: SectionKey, value: serde_json::Value) -> serde_json::Result<Self> {
        use serde_json::from_value;
        Ok(match key {
            SectionKey::GeneralInfo => SectionUpdate::GeneralInfo(from_value(value)?),
            SectionKey::Membership => SectionUpdate::Membership(from_value(value)?),
            SectionKey::YouthActivities => SectionUpdate::YouthActivities(from_value(value)?),
            SectionKey::BibleStudies => SectionUpdate::BibleStudies(from_value(value)?),
            SectionKey::LayActivities => SectionUpdate::LayActivities(from_value(value)?),
            SectionKey::DivineServices => SectionUpdate::DivineServices(from_value(value)?),
            SectionKey::Leaders => SectionUpdate::Leaders(from_value(value)?),
            SectionKey::Visitation => SectionUpdate::Visitation(from_value(value)?),
            SectionKey::PrayerWalks => SectionUpdate::PrayerWalks(from_value(value)?),
            SectionKey::WomensMinistry => SectionUpdate::WomensMinistry(from_value(value)?),
            SectionKey::Offerings => SectionUpdate::Offerings(from_value(value)?),
            SectionKey::Facilities => SectionUpdate::Facilities(from_value(value)?),
            SectionKey::Challenges => SectionUpdate::Challenges(from_value(value)?),
            SectionKey::Acknowledgments => SectionUpdate::Acknowledgments(from_value(value)?),
            SectionKey::Summary => SectionUpdate::Summary(from_value(value)?),
        })
    }

    fn apply_to(self, data: &mut ReportData) {
        match self {
            SectionUpdate::GeneralInfo(v) => data.general_info = v,
            SectionUpdate::Membership(v) => data.membership = v,
            SectionUpdate::YouthActivities(v) => data.youth_activities = v,
            SectionUpdate::BibleStudies(v) => data.bible_studies = v,
            SectionUpdate::LayActivities(v) => data.lay_activities = v,
            SectionUpdate::DivineServices(v) => data.divine_services = v,
            SectionUpdate::Leaders(v) => data.leaders = v,
            SectionUpdate::Visitation(v) => data.visitation = v,
            SectionUpdate::PrayerWalks(v) => data.prayer_walks = v,
            SectionUpdate::WomensMinistry(v) => data.womens_ministry = v,
            SectionUpdate::Offerings(v) => data.offerings = v,
            SectionUpdate::Facilities(v) => data.facilities = v,
            SectionUpdate::Challenges(v) => data.challenges = v,
            SectionUpdate::Acknowledgments(v) => data.acknowledgments = v,
            SectionUpdate::Summary(v) => data.summary = v,
        }
    }
}

impl From<SectionUpdate> for ReportPatch {
    fn from(update: SectionUpdate) -> Self {
        let mut patch = ReportPatch::default();
        match update {
            SectionUpdate::GeneralInfo(v) => patch.general_info = Some(v),
            SectionUpdate::Membership(v) => patch.membership = Some(v),
            SectionUpdate::YouthActivities(v) => patch.youth_activities = Some(v),
            SectionUpdate::BibleStudies(v) => patch.bible_studies = Some(v),
            SectionUpdate::LayActivities(v) => patch.lay_activities = Some(v),
            SectionUpdate::DivineServices(v) => patch.divine_services = Some(v),
            SectionUpdate::Leaders(v) => patch.leaders = Some(v),
            SectionUpdate::Visitation(v) => patch.visitation = Some(v),
            SectionUpdate::PrayerWalks(v) => patch.prayer_walks = Some(v),
            SectionUpdate::WomensMinistry(v) => patch.womens_ministry = Some(v),
            SectionUpdate::Offerings(v) => patch.offerings = Some(v),
            SectionUpdate::Facilities(v) => patch.facilities = Some(v),
            SectionUpdate::Challenges(v) => patch.challenges = Some(v),
            SectionUpdate::Acknowledgments(v) => patch.acknowledgments = Some(v),
            SectionUpdate::Summary(v) => patch.summary = Some(v),
        }
        patch
    }
}

/// The draft and a counter of how many edits it has seen.
#[derive(Debug, Clone, Default)]
pub struct DraftState {
    data: ReportData,
    revision: u64,
}

impl DraftState {
    /// A blank report for the new-report flow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a fetched report for the edit flow.
    pub fn from_report(report: &Report) -> Self {
        Self {
            data: report.data.clone(),
            revision: 0,
        }
    }

    pub fn data(&self) -> &ReportData {
        &self.data
    }

    /// Bumped on every [`update_section`](Self::update_section).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace one top-level section and return the new snapshot.
    pub fn update_section(&mut self, update: SectionUpdate) -> &ReportData {
        log::trace!("draft: replacing {}", update.key());
        update.apply_to(&mut self.data);
        self.revision += 1;
        &self.data
    }

    /// Overwrite the whole draft, e.g. after a successful submit.
    pub(crate) fn replace(&mut self, data: ReportData) {
        self.data = data;
    }
}
