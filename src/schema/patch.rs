use serde::{Deserialize, Serialize};

use super::{
    Acknowledgments, ActivityEntry, Challenges, DivineService, GeneralInfo, Leaders, Membership,
    Offerings, ReportData, ReportStatus, Summary, YouthActivity,
};

/// A partial report: only the sections that are `Some` are written.
/// Sections are replaced whole, never merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_info: Option<GeneralInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership: Option<Membership>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youth_activities: Option<Vec<YouthActivity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bible_studies: Option<Vec<ActivityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lay_activities: Option<Vec<ActivityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divine_services: Option<Vec<DivineService>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaders: Option<Leaders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitation: Option<Vec<ActivityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prayer_walks: Option<Vec<ActivityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub womens_ministry: Option<Vec<ActivityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offerings: Option<Offerings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Vec<ActivityEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenges: Option<Challenges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgments: Option<Acknowledgments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
}

impl ReportPatch {
    /// A patch that rewrites every section and the status.
    pub fn full(data: &ReportData) -> Self {
        let data = data.clone();
        Self {
            general_info: Some(data.general_info),
            membership: Some(data.membership),
            youth_activities: Some(data.youth_activities),
            bible_studies: Some(data.bible_studies),
            lay_activities: Some(data.lay_activities),
            divine_services: Some(data.divine_services),
            leaders: Some(data.leaders),
            visitation: Some(data.visitation),
            prayer_walks: Some(data.prayer_walks),
            womens_ministry: Some(data.womens_ministry),
            offerings: Some(data.offerings),
            facilities: Some(data.facilities),
            challenges: Some(data.challenges),
            acknowledgments: Some(data.acknowledgments),
            summary: Some(data.summary),
            status: Some(data.status),
        }
    }

    pub fn status(status: ReportStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Write the provided sections into `data`, leaving the rest untouched.
    pub fn apply_to(self, data: &mut ReportData) {
        let ReportPatch {
            general_info,
            membership,
            youth_activities,
            bible_studies,
            lay_activities,
            divine_services,
            leaders,
            visitation,
            prayer_walks,
            womens_ministry,
            offerings,
            facilities,
            challenges,
            acknowledgments,
            summary,
            status,
        } = self;

        if let Some(value) = general_info {
            data.general_info = value;
        }
        if let Some(value) = membership {
            data.membership = value;
        }
        if let Some(value) = youth_activities {
            data.youth_activities = value;
        }
        if let Some(value) = bible_studies {
            data.bible_studies = value;
        }
        if let Some(value) = lay_activities {
            data.lay_activities = value;
        }
        if let Some(value) = divine_services {
            data.divine_services = value;
        }
        if let Some(value) = leaders {
            data.leaders = value;
        }
        if let Some(value) = visitation {
            data.visitation = value;
        }
        if let Some(value) = prayer_walks {
            data.prayer_walks = value;
        }
        if let Some(value) = womens_ministry {
            data.womens_ministry = value;
        }
        if let Some(value) = offerings {
            data.offerings = value;
        }
        if let Some(value) = facilities {
            data.facilities = value;
        }
        if let Some(value) = challenges {
            data.challenges = value;
        }
        if let Some(value) = acknowledgments {
            data.acknowledgments = value;
        }
        if let Some(value) = summary {
            data.summary = value;
        }
        if let Some(value) = status {
            data.status = value;
        }
    }
}
