//! Section-editor helpers.
//!
//! These build the complete replacement value for a list-shaped section
//! (add, edit, or remove one entry, or swap an entry's photos) and return it
//! as a [`SectionUpdate`] for the draft. The draft itself knows nothing
//! about lists.

use std::fmt;
use std::str::FromStr;

use crate::draft::{SectionKey, SectionUpdate};
use crate::schema::entries::{self, PhotoEntry};
use crate::schema::{ActivityEntry, DivineService, Leader, Leaders, ReportData, YouthActivity};

/// The report sections that are ordered lists of dated, photographed entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityList {
    Youth,
    DivineServices,
    BibleStudies,
    LayActivities,
    Visitation,
    PrayerWalks,
    WomensMinistry,
    Facilities,
}

impl ActivityList {
    pub const ALL: [ActivityList; 8] = [
        ActivityList::Youth,
        ActivityList::DivineServices,
        ActivityList::BibleStudies,
        ActivityList::LayActivities,
        ActivityList::Visitation,
        ActivityList::PrayerWalks,
        ActivityList::WomensMinistry,
        ActivityList::Facilities,
    ];

    pub fn key(&self) -> SectionKey {
        match self {
            ActivityList::Youth => SectionKey::YouthActivities,
            ActivityList::DivineServices => SectionKey::DivineServices,
            ActivityList::BibleStudies => SectionKey::BibleStudies,
            ActivityList::LayActivities => SectionKey::LayActivities,
            ActivityList::Visitation => SectionKey::Visitation,
            ActivityList::PrayerWalks => SectionKey::PrayerWalks,
            ActivityList::WomensMinistry => SectionKey::WomensMinistry,
            ActivityList::Facilities => SectionKey::Facilities,
        }
    }

    fn view<'a>(&self, data: &'a ReportData) -> ListView<'a> {
        match self {
            ActivityList::Youth => ListView::Youth(&data.youth_activities),
            ActivityList::DivineServices => ListView::Services(&data.divine_services),
            ActivityList::BibleStudies => ListView::Plain(&data.bible_studies, SectionUpdate::BibleStudies),
            ActivityList::LayActivities => ListView::Plain(&data.lay_activities, SectionUpdate::LayActivities),
            ActivityList::Visitation => ListView::Plain(&data.visitation, SectionUpdate::Visitation),
            ActivityList::PrayerWalks => ListView::Plain(&data.prayer_walks, SectionUpdate::PrayerWalks),
            ActivityList::WomensMinistry => {
                ListView::Plain(&data.womens_ministry, SectionUpdate::WomensMinistry)
            }
            ActivityList::Facilities => ListView::Plain(&data.facilities, SectionUpdate::Facilities),
        }
    }
}

impl fmt::Display for ActivityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().as_str())
    }
}

impl FromStr for ActivityList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityList::ALL
            .into_iter()
            .find(|list| list.key().as_str() == s)
            .ok_or_else(|| format!("not a list section: {s}"))
    }
}

enum ListView<'a> {
    Youth(&'a [YouthActivity]),
    Services(&'a [DivineService]),
    Plain(&'a [ActivityEntry], fn(Vec<ActivityEntry>) -> SectionUpdate),
}

/// Field edits for one entry. `None` leaves a field as is.
///
/// `count` is participants (attendance for divine services) and `text` is
/// the entry's description (activities for youth entries).
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    pub date: Option<String>,
    pub count: Option<i64>,
    pub text: Option<String>,
    pub kind: Option<String>,
}

/// Append a blank entry. Returns the replacement list and the new id.
pub fn add_entry(data: &ReportData, list: ActivityList) -> (SectionUpdate, String) {
    match list.view(data) {
        ListView::Youth(v) => {
            let (next, id) = entries::add_entry(v);
            (SectionUpdate::YouthActivities(next), id)
        }
        ListView::Services(v) => {
            let (next, id) = entries::add_entry(v);
            (SectionUpdate::DivineServices(next), id)
        }
        ListView::Plain(v, wrap) => {
            let (next, id) = entries::add_entry(v);
            (wrap(next), id)
        }
    }
}

/// Apply `edit` to one entry. `None` when no entry has `id`.
pub fn edit_entry(
    data: &ReportData,
    list: ActivityList,
    id: &str,
    edit: EntryEdit,
) -> Option<SectionUpdate> {
    match list.view(data) {
        ListView::Youth(v) => entries::update_entry(v, id, |e| {
            if let Some(date) = edit.date {
                e.date = date;
            }
            if edit.count.is_some() {
                e.participants = edit.count;
            }
            if let Some(text) = edit.text {
                e.activities = text;
            }
            if edit.kind.is_some() {
                e.training_needs = edit.kind;
            }
        })
        .map(SectionUpdate::YouthActivities),
        ListView::Services(v) => entries::update_entry(v, id, |e| {
            if let Some(date) = edit.date {
                e.date = date;
            }
            if edit.count.is_some() {
                e.attendance = edit.count;
            }
            if let Some(text) = edit.text {
                e.description = text;
            }
            if let Some(kind) = edit.kind {
                e.service_type = kind;
            }
        })
        .map(SectionUpdate::DivineServices),
        ListView::Plain(v, wrap) => entries::update_entry(v, id, |e| {
            if let Some(date) = edit.date {
                e.date = date;
            }
            if edit.count.is_some() {
                e.participants = edit.count;
            }
            if let Some(text) = edit.text {
                e.description = text;
            }
        })
        .map(wrap),
    }
}

/// Remove one entry, keeping the order of the rest.
pub fn remove_entry(data: &ReportData, list: ActivityList, id: &str) -> SectionUpdate {
    match list.view(data) {
        ListView::Youth(v) => SectionUpdate::YouthActivities(entries::remove_entry(v, id)),
        ListView::Services(v) => SectionUpdate::DivineServices(entries::remove_entry(v, id)),
        ListView::Plain(v, wrap) => wrap(entries::remove_entry(v, id)),
    }
}

/// Photos currently attached to one entry.
pub fn entry_photos(data: &ReportData, list: ActivityList, id: &str) -> Option<Vec<String>> {
    match list.view(data) {
        ListView::Youth(v) => entries::find_entry(v, id).map(|e| e.photos().to_vec()),
        ListView::Services(v) => entries::find_entry(v, id).map(|e| e.photos().to_vec()),
        ListView::Plain(v, _) => entries::find_entry(v, id).map(|e| e.photos().to_vec()),
    }
}

/// Replace one entry's photo list. `None` when no entry has `id`.
pub fn set_entry_photos(
    data: &ReportData,
    list: ActivityList,
    id: &str,
    photos: Vec<String>,
) -> Option<SectionUpdate> {
    match list.view(data) {
        ListView::Youth(v) => {
            entries::update_entry(v, id, |e| e.set_photos(photos)).map(SectionUpdate::YouthActivities)
        }
        ListView::Services(v) => {
            entries::update_entry(v, id, |e| e.set_photos(photos)).map(SectionUpdate::DivineServices)
        }
        ListView::Plain(v, wrap) => entries::update_entry(v, id, |e| e.set_photos(photos)).map(wrap),
    }
}

/// Append a blank record to `leaders.otherLeaders`.
pub fn add_leader(leaders: &Leaders) -> (SectionUpdate, String) {
    let (other_leaders, id) = entries::add_entry(&leaders.other_leaders);
    let next = Leaders {
        other_leaders,
        ..leaders.clone()
    };
    (SectionUpdate::Leaders(next), id)
}

pub fn update_leader(
    leaders: &Leaders,
    id: &str,
    edit: impl FnOnce(&mut Leader),
) -> Option<SectionUpdate> {
    let other_leaders = entries::update_entry(&leaders.other_leaders, id, edit)?;
    Some(SectionUpdate::Leaders(Leaders {
        other_leaders,
        ..leaders.clone()
    }))
}

pub fn remove_leader(leaders: &Leaders, id: &str) -> SectionUpdate {
    SectionUpdate::Leaders(Leaders {
        other_leaders: entries::remove_entry(&leaders.other_leaders, id),
        ..leaders.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftState;

    #[test]
    fn test_add_edit_remove_plain_list() {
        let mut draft = DraftState::new();
        let (update, id) = add_entry(draft.data(), ActivityList::PrayerWalks);
        assert_eq!(update.key(), SectionKey::PrayerWalks);
        draft.update_section(update);

        let update = edit_entry(
            draft.data(),
            ActivityList::PrayerWalks,
            &id,
            EntryEdit {
                date: Some("2024-04-06".into()),
                count: Some(9),
                text: Some("Market street".into()),
                kind: None,
            },
        )
        .unwrap();
        draft.update_section(update);
        let walk = &draft.data().prayer_walks[0];
        assert_eq!(walk.date, "2024-04-06");
        assert_eq!(walk.participants, Some(9));
        assert_eq!(walk.description, "Market street");

        draft.update_section(remove_entry(draft.data(), ActivityList::PrayerWalks, &id));
        assert!(draft.data().prayer_walks.is_empty());
    }

    #[test]
    fn test_edit_divine_service_kind() {
        let mut draft = DraftState::new();
        let (update, id) = add_entry(draft.data(), ActivityList::DivineServices);
        draft.update_section(update);
        let update = edit_entry(
            draft.data(),
            ActivityList::DivineServices,
            &id,
            EntryEdit {
                kind: Some("Baptism".into()),
                count: Some(140),
                ..EntryEdit::default()
            },
        )
        .unwrap();
        draft.update_section(update);
        let service = &draft.data().divine_services[0];
        assert_eq!(service.service_type, "Baptism");
        assert_eq!(service.attendance, Some(140));
    }

    #[test]
    fn test_edit_unknown_entry() {
        let data = ReportData::default();
        assert!(edit_entry(&data, ActivityList::Youth, "nope", EntryEdit::default()).is_none());
        assert!(set_entry_photos(&data, ActivityList::Youth, "nope", vec![]).is_none());
        assert!(entry_photos(&data, ActivityList::Youth, "nope").is_none());
    }

    #[test]
    fn test_photos_replace_only_target_entry() {
        let mut draft = DraftState::new();
        let (update, a) = add_entry(draft.data(), ActivityList::Youth);
        draft.update_section(update);
        let (update, b) = add_entry(draft.data(), ActivityList::Youth);
        draft.update_section(update);

        let update =
            set_entry_photos(draft.data(), ActivityList::Youth, &b, vec!["file:///x.jpg".into()]).unwrap();
        draft.update_section(update);

        assert_eq!(entry_photos(draft.data(), ActivityList::Youth, &a), Some(vec![]));
        assert_eq!(
            entry_photos(draft.data(), ActivityList::Youth, &b),
            Some(vec!["file:///x.jpg".to_string()])
        );
        assert_eq!(draft.data().youth_activities[0].id, a);
    }

    #[test]
    fn test_leader_records() {
        let mut leaders = Leaders {
            elder: "S. Amoah".into(),
            ..Leaders::default()
        };
        let (update, id) = add_leader(&leaders);
        if let SectionUpdate::Leaders(next) = update {
            leaders = next;
        }
        assert_eq!(leaders.other_leaders.len(), 1);
        assert_eq!(leaders.elder, "S. Amoah");

        let update = update_leader(&leaders, &id, |l| l.name = "D. Frimpong".into()).unwrap();
        if let SectionUpdate::Leaders(next) = update {
            leaders = next;
        }
        assert_eq!(leaders.other_leaders[0].name, "D. Frimpong");

        if let SectionUpdate::Leaders(next) = remove_leader(&leaders, &id) {
            leaders = next;
        }
        assert!(leaders.other_leaders.is_empty());
        assert!(update_leader(&leaders, &id, |_| {}).is_none());
    }

    #[test]
    fn test_list_names() {
        assert_eq!("youthActivities".parse::<ActivityList>(), Ok(ActivityList::Youth));
        assert_eq!(ActivityList::Facilities.to_string(), "facilities");
        assert!("leaders".parse::<ActivityList>().is_err());
    }
}
