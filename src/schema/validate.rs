//! Field-level validation rules.
//!
//! Validation is authoritative for persistence: the store refuses any
//! document with violations. Drafts are checked structurally; required text
//! fields are checked once a document's status is `submitted`.

use std::fmt;

use super::entries::{Entry, PhotoEntry};
use super::{filled, ActivityEntry, DivineService, ReportData, ReportStatus, YouthActivity};
use crate::date_util::is_iso_date;
use crate::quarter::ReportingQuarters;

pub const DEFAULT_MAX_PHOTOS_PER_ENTRY: usize = 4;

/// The named rule a field broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// Required text is empty.
    Required,
    /// A count or amount is below zero.
    Negative,
    /// An amount is NaN or infinite.
    NotFinite,
    /// Quarter label is not in the configured set.
    UnknownQuarter,
    /// Date is not `YYYY-MM-DD`.
    InvalidDate,
    /// More was transferred than collected, so `retained` would be negative.
    TransferExceedsCollected,
    MissingEntryId,
    DuplicateEntryId,
    TooManyPhotos { max: usize },
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Required => f.write_str("is required"),
            ValidationRule::Negative => f.write_str("must not be negative"),
            ValidationRule::NotFinite => f.write_str("must be a finite number"),
            ValidationRule::UnknownQuarter => f.write_str("is not a configured reporting quarter"),
            ValidationRule::InvalidDate => f.write_str("must be a date in YYYY-MM-DD form"),
            ValidationRule::TransferExceedsCollected => {
                f.write_str("exceeds the total collected")
            }
            ValidationRule::MissingEntryId => f.write_str("has no id"),
            ValidationRule::DuplicateEntryId => f.write_str("reuses an id already in the list"),
            ValidationRule::TooManyPhotos { max } => write!(f, "has more than {max} photos"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// camelCase path, e.g. `youthActivities[1].participants`.
    pub field: String,
    pub rule: ValidationRule,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.rule)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str, rule: &ValidationRule) -> bool {
        self.errors.iter().any(|e| e.field == field && &e.rule == rule)
    }

    fn push(&mut self, field: impl Into<String>, rule: ValidationRule) {
        self.errors.push(FieldError {
            field: field.into(),
            rule,
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Settings the rules depend on.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub quarters: ReportingQuarters,
    pub max_photos_per_entry: usize,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            quarters: ReportingQuarters::default(),
            max_photos_per_entry: DEFAULT_MAX_PHOTOS_PER_ENTRY,
        }
    }
}

/// Validate a whole document. Strictness follows `data.status`.
pub fn validate_report(data: &ReportData, ctx: &ValidationContext) -> Result<(), ValidationErrors> {
    let strict = data.status == ReportStatus::Submitted;
    let mut errs = ValidationErrors::default();

    // General info
    let gi = &data.general_info;
    if strict {
        require(&mut errs, "generalInfo.branchName", &gi.branch_name);
        require(&mut errs, "generalInfo.reportingQuarter", &gi.reporting_quarter);
        require(&mut errs, "generalInfo.leaderName", &gi.leader_name);
    }
    if filled(&gi.reporting_quarter) && !ctx.quarters.contains(&gi.reporting_quarter) {
        errs.push("generalInfo.reportingQuarter", ValidationRule::UnknownQuarter);
    }
    if let Some(date) = gi.date_submitted.as_deref().filter(|d| filled(d)) {
        if !is_iso_date(date) {
            errs.push("generalInfo.dateSubmitted", ValidationRule::InvalidDate);
        }
    }

    // Membership
    let m = &data.membership;
    non_negative(&mut errs, "membership.activeMembers", m.active_members);
    non_negative(&mut errs, "membership.newMembers", m.new_members);
    non_negative(&mut errs, "membership.baptismCandidates", m.baptism_candidates);
    non_negative(&mut errs, "membership.newInterests", m.new_interests);

    // Activity logs
    check_list(&mut errs, "youthActivities", &data.youth_activities, ctx, |errs, path, e: &YouthActivity| {
        entry_date(errs, path, &e.date);
        non_negative(errs, &format!("{path}.participants"), e.participants);
    });
    check_list(&mut errs, "divineServices", &data.divine_services, ctx, |errs, path, e: &DivineService| {
        entry_date(errs, path, &e.date);
        non_negative(errs, &format!("{path}.attendance"), e.attendance);
    });
    for (name, list) in [
        ("bibleStudies", &data.bible_studies),
        ("layActivities", &data.lay_activities),
        ("visitation", &data.visitation),
        ("prayerWalks", &data.prayer_walks),
        ("womensMinistry", &data.womens_ministry),
        ("facilities", &data.facilities),
    ] {
        check_list(&mut errs, name, list, ctx, |errs, path, e: &ActivityEntry| {
            entry_date(errs, path, &e.date);
            non_negative(errs, &format!("{path}.participants"), e.participants);
        });
    }

    // Offerings
    let o = &data.offerings;
    non_negative_amount(&mut errs, "offerings.totalCollected", o.total_collected());
    non_negative_amount(&mut errs, "offerings.amountTransferred", o.amount_transferred());
    if o.transferred() {
        if let (Some(total), Some(sent)) = (o.total_collected(), o.amount_transferred()) {
            if sent > total {
                errs.push("offerings.amountTransferred", ValidationRule::TransferExceedsCollected);
            }
        }
    }

    // Leaders
    let l = &data.leaders;
    if strict {
        require(&mut errs, "leaders.elder", &l.elder);
        require(&mut errs, "leaders.elderContact", &l.elder_contact);
        require(&mut errs, "leaders.reportSubmittedBy", &l.report_submitted_by);
        require(&mut errs, "leaders.reporterContact", &l.reporter_contact);
    }
    check_ids(&mut errs, "leaders.otherLeaders", &l.other_leaders);
    if strict {
        for (i, leader) in l.other_leaders.iter().enumerate() {
            let path = format!("leaders.otherLeaders[{i}]");
            require(&mut errs, &format!("{path}.name"), &leader.name);
            require(&mut errs, &format!("{path}.position"), &leader.position);
            require(&mut errs, &format!("{path}.contact"), &leader.contact);
        }
    }

    if errs.is_empty() {
        Ok(())
    } else {
        Err(errs)
    }
}

fn require(errs: &mut ValidationErrors, field: &str, value: &str) {
    if !filled(value) {
        errs.push(field, ValidationRule::Required);
    }
}

fn non_negative(errs: &mut ValidationErrors, field: &str, value: Option<i64>) {
    if value.is_some_and(|v| v < 0) {
        errs.push(field, ValidationRule::Negative);
    }
}

fn non_negative_amount(errs: &mut ValidationErrors, field: &str, value: Option<f64>) {
    match value {
        Some(v) if !v.is_finite() => errs.push(field, ValidationRule::NotFinite),
        Some(v) if v < 0.0 => errs.push(field, ValidationRule::Negative),
        _ => {}
    }
}

fn entry_date(errs: &mut ValidationErrors, path: &str, date: &str) {
    if filled(date) && !is_iso_date(date) {
        errs.push(format!("{path}.date"), ValidationRule::InvalidDate);
    }
}

fn check_ids<T: Entry>(errs: &mut ValidationErrors, name: &str, list: &[T]) {
    let mut seen = std::collections::HashSet::new();
    for (i, entry) in list.iter().enumerate() {
        if !filled(entry.id()) {
            errs.push(format!("{name}[{i}].id"), ValidationRule::MissingEntryId);
        } else if !seen.insert(entry.id()) {
            errs.push(format!("{name}[{i}].id"), ValidationRule::DuplicateEntryId);
        }
    }
}

fn check_list<T: PhotoEntry>(
    errs: &mut ValidationErrors,
    name: &str,
    list: &[T],
    ctx: &ValidationContext,
    check_entry: impl Fn(&mut ValidationErrors, &str, &T),
) {
    check_ids(errs, name, list);
    for (i, entry) in list.iter().enumerate() {
        let path = format!("{name}[{i}]");
        if entry.photos().len() > ctx.max_photos_per_entry {
            errs.push(
                format!("{path}.photos"),
                ValidationRule::TooManyPhotos {
                    max: ctx.max_photos_per_entry,
                },
            );
        }
        check_entry(errs, &path, entry);
    }
}
