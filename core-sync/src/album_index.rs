//! Run-scoped map of remote albums by name.

use crate::model::TargetAlbumName;
use bridge_traits::photos::RemoteAlbum;
use std::collections::HashMap;
use tracing::warn;

/// Snapshot of remote albums taken at the start of a run, extended with
/// every album the run creates. Owned by a single run.
#[derive(Debug, Default)]
pub struct AlbumIndex {
    by_name: HashMap<String, RemoteAlbum>,
}

impl AlbumIndex {
    /// Index albums by name. When the service already holds several albums
    /// with one name, the first listed wins.
    pub fn from_albums(albums: Vec<RemoteAlbum>) -> Self {
        let mut by_name: HashMap<String, RemoteAlbum> = HashMap::with_capacity(albums.len());
        for album in albums {
            if let Some(kept) = by_name.get(&album.name) {
                warn!(
                    album = %album.name,
                    kept = %kept.id,
                    ignored = %album.id,
                    "Duplicate remote album name"
                );
                continue;
            }
            by_name.insert(album.name.clone(), album);
        }
        Self { by_name }
    }

    pub fn get(&self, name: &TargetAlbumName) -> Option<&RemoteAlbum> {
        self.by_name.get(name.as_str())
    }

    pub fn contains(&self, name: &TargetAlbumName) -> bool {
        self.by_name.contains_key(name.as_str())
    }

    pub fn insert(&mut self, album: RemoteAlbum) {
        self.by_name.insert(album.name.clone(), album);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(id: &str, name: &str) -> RemoteAlbum {
        RemoteAlbum {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_lookup_by_target_name() {
        let index = AlbumIndex::from_albums(vec![album("al-1", "2023 > Family > Christmas")]);
        let name = TargetAlbumName::from_path(&["2023", "Family", "Christmas"]);

        assert_eq!(index.get(&name).map(|a| a.id.as_str()), Some("al-1"));
        assert!(!index.contains(&TargetAlbumName::from_path(&["2023"])));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let index = AlbumIndex::from_albums(vec![album("al-1", "Trips"), album("al-2", "Trips")]);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(&TargetAlbumName::from_path(&["Trips"])).unwrap().id,
            "al-1"
        );
    }

    #[test]
    fn test_insert_registers_new_album() {
        let mut index = AlbumIndex::default();
        assert!(index.is_empty());
        index.insert(album("al-9", "Birthday"));
        assert!(index.contains(&TargetAlbumName::from_path(&["Birthday"])));
    }
}
