//! # Reconciliation Data Model
//!
//! Value types shared by the enumerator, reconciler and applier:
//! - [`TargetAlbumName`]: the album name a collection path maps to
//! - [`CollectionHandle`]: catalog id plus hierarchy path
//! - [`AlbumState`]: remote album membership observed this run
//! - [`SyncDelta`]: identifiers still missing from an album

use bridge_traits::photos::AlbumDetails;
use std::collections::HashSet;
use std::fmt;

/// Separator placed between hierarchy segments in album names
pub const HIERARCHY_SEPARATOR: &str = " > ";

/// Album name derived from a collection's hierarchy path.
///
/// Segments are joined with [`HIERARCHY_SEPARATOR`]. Inside a segment `\`
/// becomes `\\` and `>` becomes `\>`, so a segment can never produce an
/// unescaped separator and distinct paths always yield distinct names.
/// Names without either character are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetAlbumName(String);

impl TargetAlbumName {
    pub fn from_path<S: AsRef<str>>(segments: &[S]) -> Self {
        let joined = segments
            .iter()
            .map(|segment| escape_segment(segment.as_ref()))
            .collect::<Vec<_>>()
            .join(HIERARCHY_SEPARATOR);
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match used by the collection filter.
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.0.to_lowercase().contains(&filter.to_lowercase())
    }
}

impl fmt::Display for TargetAlbumName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TargetAlbumName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn escape_segment(segment: &str) -> String {
    if !segment.contains(['\\', '>']) {
        return segment.to_string();
    }

    let mut escaped = String::with_capacity(segment.len() + 2);
    for ch in segment.chars() {
        if ch == '\\' || ch == '>' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// A catalog collection selected for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    id: i64,
    path: Vec<String>,
}

impl CollectionHandle {
    /// Returns `None` for an empty path.
    pub fn new(id: i64, path: Vec<String>) -> Option<Self> {
        if path.is_empty() {
            None
        } else {
            Some(Self { id, path })
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn target_name(&self) -> TargetAlbumName {
        TargetAlbumName::from_path(&self.path)
    }
}

/// Remote album membership, read fresh before every diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumState {
    pub id: String,
    pub name: String,
    pub members: HashSet<String>,
}

impl From<AlbumDetails> for AlbumState {
    fn from(details: AlbumDetails) -> Self {
        Self {
            id: details.id,
            name: details.name,
            members: details.member_ids,
        }
    }
}

/// Identifiers to add to one album, in resolution order.
///
/// Never holds duplicates and never holds an identifier that was already a
/// member when the delta was computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncDelta {
    ids: Vec<String>,
}

impl SyncDelta {
    pub fn compute(resolved: &[String], state: &AlbumState) -> Self {
        let mut seen = HashSet::new();
        let ids = resolved
            .iter()
            .filter(|id| !state.members.contains(*id))
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Drop repeated identifiers, keeping the first occurrence of each.
pub fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plain_names_join_with_separator() {
        let name = TargetAlbumName::from_path(&path(&["2023", "Family", "Christmas"]));
        assert_eq!(name.as_str(), "2023 > Family > Christmas");
        assert_eq!(
            TargetAlbumName::from_path(&path(&["Trips"])).to_string(),
            "Trips"
        );
    }

    #[test]
    fn test_separator_inside_segment_does_not_collide() {
        let nested = TargetAlbumName::from_path(&path(&["A", "B"]));
        let flat = TargetAlbumName::from_path(&path(&["A > B"]));

        assert_ne!(nested, flat);
        assert_eq!(flat.as_str(), "A \\> B");
    }

    #[test]
    fn test_backslashes_do_not_collide() {
        let a = TargetAlbumName::from_path(&path(&["A\\", "B"]));
        let b = TargetAlbumName::from_path(&path(&["A\\ > B"]));
        let c = TargetAlbumName::from_path(&path(&["A\\\\", "B"]));

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let name = TargetAlbumName::from_path(&path(&["2023", "Family", "Christmas"]));
        assert!(name.matches_filter("family"));
        assert!(name.matches_filter("MAS"));
        assert!(!name.matches_filter("birthday"));
    }

    #[test]
    fn test_handle_requires_path() {
        assert!(CollectionHandle::new(1, Vec::new()).is_none());
        let handle = CollectionHandle::new(7, path(&["Trips", "Rome"])).unwrap();
        assert_eq!(handle.id(), 7);
        assert_eq!(handle.target_name().as_str(), "Trips > Rome");
    }

    #[test]
    fn test_delta_excludes_members_and_duplicates() {
        let state = AlbumState {
            id: "al-1".into(),
            name: "Trips".into(),
            members: HashSet::from(["b".to_string()]),
        };
        let resolved = path(&["a", "b", "c", "a"]);

        let delta = SyncDelta::compute(&resolved, &state);
        assert_eq!(delta.ids(), &["a".to_string(), "c".to_string()]);
        assert_eq!(delta.len(), 2);
    }

    #[test]
    fn test_delta_empty_when_up_to_date() {
        let state = AlbumState {
            id: "al-1".into(),
            name: "Trips".into(),
            members: HashSet::from(["a".to_string(), "b".to_string()]),
        };
        assert!(SyncDelta::compute(&path(&["b", "a"]), &state).is_empty());
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        assert_eq!(
            dedup_preserving_order(path(&["x", "y", "x", "z", "y"])),
            path(&["x", "y", "z"])
        );
    }
}
