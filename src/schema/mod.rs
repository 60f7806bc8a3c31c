//! Report document shape.
//!
//! `ReportData` is what a client edits and sends (the insert shape);
//! `Report` adds the store-assigned identity and timestamps. Every struct
//! deserializes from partial JSON (`#[serde(default)]`) so documents written
//! by older clients, or half-filled forms, always load.

pub mod entries;
pub mod patch;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use entries::Entry;
pub use patch::ReportPatch;

/// Whether an optional free-text field holds something other than whitespace.
pub fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(filled)
}

/// Whether a required text field holds something other than whitespace.
pub fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Draft,
    Submitted,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Submitted => "submitted",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReportStatus::Draft),
            "submitted" => Ok(ReportStatus::Submitted),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralInfo {
    pub branch_name: String,
    pub reporting_area: Option<String>,
    /// One of the configured quarter labels, e.g. `Q1 2024`.
    pub reporting_quarter: String,
    /// `YYYY-MM-DD`.
    pub date_submitted: Option<String>,
    pub leader_name: String,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Membership {
    pub active_members: Option<i64>,
    pub new_members: Option<i64>,
    pub baptism_candidates: Option<i64>,
    pub new_interests: Option<i64>,
    pub inactive_members: Option<String>,
    pub relocations: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YouthActivity {
    pub id: String,
    pub date: String,
    pub participants: Option<i64>,
    pub activities: String,
    pub training_needs: Option<String>,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DivineService {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub attendance: Option<i64>,
    pub description: String,
    pub photos: Vec<String>,
}

/// Entry shape shared by the simpler activity logs (bible studies, lay
/// activities, visitation, prayer walks, women's ministries, facilities).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityEntry {
    pub id: String,
    pub date: String,
    pub participants: Option<i64>,
    pub description: String,
    pub photos: Vec<String>,
}

/// Offerings and finance.
///
/// `retained` is derived from the other three amounts and is recomputed
/// whenever one of them changes; it cannot be set directly. Documents
/// loaded from storage have it recomputed as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "OfferingsRecord")]
pub struct Offerings {
    total_collected: Option<f64>,
    transferred: bool,
    amount_transferred: Option<f64>,
    retained: Option<f64>,
    pub special_projects: Option<String>,
    pub next_quarter_needs: Option<String>,
}

impl Offerings {
    pub fn new(total_collected: Option<f64>, transferred: bool, amount_transferred: Option<f64>) -> Self {
        let mut offerings = Self {
            total_collected,
            transferred,
            amount_transferred,
            ..Self::default()
        };
        offerings.recompute();
        offerings
    }

    pub fn total_collected(&self) -> Option<f64> {
        self.total_collected
    }

    pub fn transferred(&self) -> bool {
        self.transferred
    }

    pub fn amount_transferred(&self) -> Option<f64> {
        self.amount_transferred
    }

    /// Amount kept by the branch. Not clamped: transferring more than was
    /// collected yields a negative value, which validation rejects.
    pub fn retained(&self) -> Option<f64> {
        self.retained
    }

    pub fn set_total_collected(&mut self, value: Option<f64>) {
        self.total_collected = value;
        self.recompute();
    }

    pub fn set_transferred(&mut self, value: bool) {
        self.transferred = value;
        self.recompute();
    }

    pub fn set_amount_transferred(&mut self, value: Option<f64>) {
        self.amount_transferred = value;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.retained = self.total_collected.map(|total| {
            if self.transferred {
                total - self.amount_transferred.unwrap_or(0.0)
            } else {
                total
            }
        });
    }
}

/// Stored form of [`Offerings`]; any stored `retained` value is ignored.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct OfferingsRecord {
    total_collected: Option<f64>,
    transferred: bool,
    amount_transferred: Option<f64>,
    special_projects: Option<String>,
    next_quarter_needs: Option<String>,
}

impl From<OfferingsRecord> for Offerings {
    fn from(r: OfferingsRecord) -> Self {
        let mut offerings = Offerings::new(r.total_collected, r.transferred, r.amount_transferred);
        offerings.special_projects = r.special_projects;
        offerings.next_quarter_needs = r.next_quarter_needs;
        offerings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Leader {
    pub id: String,
    pub name: String,
    pub position: String,
    pub contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Leaders {
    pub elder: String,
    pub elder_contact: String,
    pub report_submitted_by: String,
    pub reporter_contact: String,
    pub other_leaders: Vec<Leader>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Challenges {
    pub challenges: Option<String>,
    pub recommendations: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Acknowledgments {
    pub acknowledgments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub spiritual_health: Option<String>,
    pub next_quarter_goals: Option<String>,
    pub planned_activities: Option<String>,
    pub comment: Option<String>,
}

/// Everything a client supplies for a report: all sections plus status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportData {
    pub general_info: GeneralInfo,
    pub membership: Membership,
    pub youth_activities: Vec<YouthActivity>,
    pub bible_studies: Vec<ActivityEntry>,
    pub lay_activities: Vec<ActivityEntry>,
    pub divine_services: Vec<DivineService>,
    pub leaders: Leaders,
    pub visitation: Vec<ActivityEntry>,
    pub prayer_walks: Vec<ActivityEntry>,
    pub womens_ministry: Vec<ActivityEntry>,
    pub offerings: Offerings,
    pub facilities: Vec<ActivityEntry>,
    pub challenges: Challenges,
    pub acknowledgments: Acknowledgments,
    pub summary: Summary,
    pub status: ReportStatus,
}

/// A stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(flatten)]
    pub data: ReportData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn is_submitted(&self) -> bool {
        self.data.status == ReportStatus::Submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retained_with_transfer() {
        let offerings = Offerings::new(Some(100.0), true, Some(40.0));
        assert_eq!(offerings.retained(), Some(60.0));
    }

    #[test]
    fn test_retained_ignores_amount_when_not_transferred() {
        let offerings = Offerings::new(Some(100.0), false, Some(40.0));
        assert_eq!(offerings.retained(), Some(100.0));
    }

    #[test]
    fn test_retained_tracks_every_input() {
        let mut offerings = Offerings::default();
        assert_eq!(offerings.retained(), None);

        offerings.set_total_collected(Some(250.0));
        assert_eq!(offerings.retained(), Some(250.0));

        offerings.set_amount_transferred(Some(50.0));
        assert_eq!(offerings.retained(), Some(250.0));

        offerings.set_transferred(true);
        assert_eq!(offerings.retained(), Some(200.0));

        offerings.set_amount_transferred(Some(300.0));
        assert_eq!(offerings.retained(), Some(-50.0));
    }

    #[test]
    fn test_stored_retained_is_recomputed() {
        let json = r#"{"totalCollected": 80, "transferred": true, "amountTransferred": 30, "retained": 999}"#;
        let offerings: Offerings = serde_json::from_str(json).unwrap();
        assert_eq!(offerings.retained(), Some(50.0));

        let out = serde_json::to_value(&offerings).unwrap();
        assert_eq!(out["retained"], serde_json::json!(50.0));
    }

    #[test]
    fn test_partial_document_loads() {
        let json = r#"{"generalInfo": {"branchName": "Riverside"}, "status": "draft"}"#;
        let data: ReportData = serde_json::from_str(json).unwrap();
        assert_eq!(data.general_info.branch_name, "Riverside");
        assert!(data.youth_activities.is_empty());
        assert_eq!(data.membership.active_members, None);
    }

    #[test]
    fn test_status_is_closed_set() {
        assert!(serde_json::from_str::<ReportStatus>(r#""submitted""#).is_ok());
        assert!(serde_json::from_str::<ReportStatus>(r#""archived""#).is_err());
        assert_eq!("draft".parse::<ReportStatus>(), Ok(ReportStatus::Draft));
        assert!("Draft".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn test_divine_service_type_field_name() {
        let service = DivineService {
            service_type: "Communion".into(),
            ..DivineService::default()
        };
        let value = serde_json::to_value(&service).unwrap();
        assert_eq!(value["type"], "Communion");
    }

    #[test]
    fn test_present_and_filled() {
        assert!(present(&Some("notes".into())));
        assert!(!present(&Some("   ".into())));
        assert!(!present(&None));
        assert!(filled("x"));
        assert!(!filled(""));
    }
}
