//! Entity cache — resolved playlist names and track metadata by id.
//!
//! Entries live for the whole session; there is no eviction and no TTL.
//! Ids are assigned by the backend library and are stable and collision-free,
//! so an insert for an id already present simply overwrites it.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct EntityCache {
    playlist_names: HashMap<u64, String>,
    tracks: HashMap<u64, HashMap<String, String>>,
}

impl EntityCache {
    pub fn playlist_name(&self, id: u64) -> Option<&str> {
        self.playlist_names.get(&id).map(String::as_str)
    }

    pub fn put_playlist_name(&mut self, id: u64, name: String) {
        self.playlist_names.insert(id, name);
    }

    /// Track display name, when the track has been resolved.
    pub fn track_name(&self, id: u64) -> Option<&str> {
        self.tracks
            .get(&id)
            .and_then(|info| info.get("Name"))
            .map(String::as_str)
    }

    pub fn put_track(&mut self, id: u64, info: HashMap<String, String>) {
        self.tracks.insert(id, info);
    }
}
