//! Identity and list operations for entries in the report's ordered lists.
//!
//! Editors never mutate a list in place: each operation returns a new list
//! that is then handed to the draft as a whole-section replacement.

use uuid::Uuid;

use super::{ActivityEntry, DivineService, Leader, YouthActivity};

/// An element of one of the report's ordered lists.
pub trait Entry: Clone {
    fn id(&self) -> &str;

    /// A blank entry carrying `id`.
    fn with_id(id: String) -> Self;
}

/// An entry that carries photo URLs.
pub trait PhotoEntry: Entry {
    fn photos(&self) -> &[String];
    fn set_photos(&mut self, photos: Vec<String>);
}

macro_rules! impl_entry {
    ($ty:ty, photos) => {
        impl_entry!($ty);

        impl PhotoEntry for $ty {
            fn photos(&self) -> &[String] {
                &self.photos
            }

            fn set_photos(&mut self, photos: Vec<String>) {
                self.photos = photos;
            }
        }
    };
    ($ty:ty) => {
        impl Entry for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn with_id(id: String) -> Self {
                Self {
                    id,
                    ..Self::default()
                }
            }
        }
    };
}

impl_entry!(YouthActivity, photos);
impl_entry!(DivineService, photos);
impl_entry!(ActivityEntry, photos);
impl_entry!(Leader);

/// Generate an entry id that is not already used in `list`.
pub fn new_entry_id<T: Entry>(list: &[T]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !list.iter().any(|e| e.id() == id) {
            return id;
        }
    }
}

/// Append a blank entry. Returns the new list and the new entry's id.
pub fn add_entry<T: Entry>(list: &[T]) -> (Vec<T>, String) {
    let id = new_entry_id(list);
    let mut next = list.to_vec();
    next.push(T::with_id(id.clone()));
    (next, id)
}

/// Apply `edit` to the entry with `id`, keeping list order. Returns `None`
/// when no entry has that id.
pub fn update_entry<T: Entry>(list: &[T], id: &str, edit: impl FnOnce(&mut T)) -> Option<Vec<T>> {
    let pos = list.iter().position(|e| e.id() == id)?;
    let mut next = list.to_vec();
    edit(&mut next[pos]);
    Some(next)
}

/// Drop the entry with `id`, keeping the order of the rest.
pub fn remove_entry<T: Entry>(list: &[T], id: &str) -> Vec<T> {
    list.iter().filter(|e| e.id() != id).cloned().collect()
}

pub fn find_entry<'a, T: Entry>(list: &'a [T], id: &str) -> Option<&'a T> {
    list.iter().find(|e| e.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn youth(id: &str, activities: &str) -> YouthActivity {
        YouthActivity {
            id: id.into(),
            activities: activities.into(),
            ..YouthActivity::default()
        }
    }

    #[test]
    fn test_add_then_remove_restores_list() {
        let before = vec![youth("a", "choir"), youth("b", "camp")];
        let (added, id) = add_entry(&before);
        assert_eq!(added.len(), 3);
        assert_eq!(added[2].id, id);
        assert_eq!(added[2].activities, "");
        assert!(added[2].photos.is_empty());

        let after = remove_entry(&added, &id);
        assert_eq!(after, before);
    }

    #[test]
    fn test_new_ids_are_unique() {
        let (one, a) = add_entry::<Leader>(&[]);
        let (_, b) = add_entry(&one);
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_preserves_order() {
        let list = vec![youth("a", "choir"), youth("b", "camp"), youth("c", "hike")];
        let next = update_entry(&list, "b", |e| e.participants = Some(12)).unwrap();
        let ids: Vec<&str> = next.iter().map(|e| e.id()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(next[1].participants, Some(12));
        assert_eq!(next[0], list[0]);
        assert_eq!(next[2], list[2]);
        // Input untouched
        assert_eq!(list[1].participants, None);
    }

    #[test]
    fn test_update_unknown_id() {
        let list = vec![youth("a", "choir")];
        assert!(update_entry(&list, "zzz", |e| e.activities.clear()).is_none());
    }

    #[test]
    fn test_remove_preserves_order() {
        let list = vec![youth("a", "1"), youth("b", "2"), youth("c", "3")];
        let next = remove_entry(&list, "b");
        let ids: Vec<&str> = next.iter().map(|e| e.id()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(remove_entry(&list, "missing"), list);
    }

    #[test]
    fn test_photo_entry_accessors() {
        let mut service = DivineService::with_id("s1".into());
        service.set_photos(vec!["file:///p/1.jpg".into()]);
        assert_eq!(service.photos(), ["file:///p/1.jpg".to_string()]);
        assert_eq!(find_entry(&[service.clone()], "s1"), Some(&service));
    }
}
