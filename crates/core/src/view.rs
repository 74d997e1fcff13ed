//! Local view ordering and search.
//!
//! The local view is a pure function of the latest collection snapshot: it is
//! rebuilt from scratch and re-sorted on every change, never patched in place.

use crate::note::Note;
use std::cmp::Ordering;

/// Ordering of the local view: pinned notes first, then newest first.
pub fn view_order(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Sort notes in place into view order. The sort is stable.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(view_order);
}

/// Build a sorted view from an unordered snapshot.
pub fn build_view(snapshot: &[Note]) -> Vec<Note> {
    let mut notes = snapshot.to_vec();
    sort_notes(&mut notes);
    notes
}

/// Case-insensitive substring match over note text.
pub fn matches_query(note: &Note, query: &str) -> bool {
    query.is_empty() || note.text.to_lowercase().contains(&query.to_lowercase())
}

/// Filter a view by a search query, preserving order.
pub fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| matches_query(note, query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteId;
    use time::{Duration, OffsetDateTime};

    fn note(id: &str, text: &str, pinned: bool, age_secs: i64) -> Note {
        Note {
            id: NoteId::parse(id).unwrap(),
            text: text.to_string(),
            image: None,
            voice: None,
            pinned,
            created_at: OffsetDateTime::UNIX_EPOCH + Duration::days(365)
                - Duration::seconds(age_secs),
        }
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_pinned_first_then_newest() {
        let snapshot = vec![
            note("old", "a", false, 300),
            note("pinned-old", "b", true, 500),
            note("new", "c", false, 10),
            note("pinned-new", "d", true, 20),
        ];

        let view = build_view(&snapshot);
        assert_eq!(ids(&view), vec!["pinned-new", "pinned-old", "new", "old"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut notes = vec![
            note("first", "", false, 60),
            note("second", "", false, 60),
            note("third", "", false, 60),
        ];
        sort_notes(&mut notes);
        assert_eq!(ids(&notes), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        let view = build_view(&[
            note("a", "Buy MILK", false, 30),
            note("b", "call mom", false, 20),
            note("c", "milkshake recipe", true, 90),
        ]);

        assert_eq!(ids(&filter_notes(&view, "milk")), vec!["c", "a"]);
        assert_eq!(ids(&filter_notes(&view, "")), vec!["c", "b", "a"]);
        assert!(filter_notes(&view, "zebra").is_empty());
    }

    #[test]
    fn test_media_only_notes_never_match_text_queries() {
        let mut media_only = note("m", "", false, 5);
        media_only.image = Some(crate::note::MediaRef::Inline {
            data_url: "data:image/png;base64,AA==".to_string(),
        });
        assert!(matches_query(&media_only, ""));
        assert!(!matches_query(&media_only, "png"));
    }
}
