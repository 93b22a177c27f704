//! Playlist navigator — the navigation stack over the library tree.
//!
//! The stack holds one `Level` per materialised depth; the top is the level
//! the user is looking at.  Exactly one "open" may be in flight at a time
//! (`pending_open`); further Enter presses are ignored until the backend
//! resolves it or the user backs out.  Ids are plain values — id 0 is legal
//! and never means "nothing pending".

use tracing::{debug, warn};

use deck_proto::protocol::{LibraryCommand, Playlist, Track};

use crate::cache::EntityCache;
use crate::screen::Screen;

/// One visible playlist row.  `label` starts as the raw id when the entity is
/// not yet cached and is rewritten in place once it resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    pub label: String,
}

/// One materialised depth of the playlist tree.
#[derive(Debug)]
pub struct Level {
    pub selected: usize,
    pub source: Playlist,
    pub child_ids: Vec<u64>,
    pub items: Vec<Row>,
    /// True when the children are sub-playlists rather than tracks.
    pub is_container: bool,
}

#[derive(Debug, Default)]
pub struct Navigator {
    stack: Vec<Level>,
    pending_open: Option<u64>,
}

impl Navigator {
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> Option<&Level> {
        self.stack.last()
    }

    pub fn pending_open(&self) -> Option<u64> {
        self.pending_open
    }

    /// Request the root playlist to seed the stack.  Goes through the same
    /// pending-open path as a user commit, so the resolution builds the
    /// bottom level.
    pub fn bootstrap(&mut self, root_id: u64) -> LibraryCommand {
        self.pending_open = Some(root_id);
        LibraryCommand::GetPlaylist(root_id)
    }

    /// Move the selection by `delta`, clamped to the level bounds.  Never
    /// wraps.  No-op on an empty level or an empty stack.
    pub fn scroll(&mut self, delta: i32, screen: &mut impl Screen) {
        let Some(level) = self.stack.last_mut() else {
            return;
        };
        if level.items.is_empty() {
            return;
        }
        let max = level.items.len() as i32 - 1;
        level.selected = (level.selected as i32 + delta).clamp(0, max) as usize;
        screen.mark_selected(level.selected);
    }

    /// Set the selection directly.  Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize, screen: &mut impl Screen) {
        let Some(level) = self.stack.last_mut() else {
            return;
        };
        if index >= level.items.len() {
            return;
        }
        level.selected = index;
        screen.mark_selected(index);
    }

    /// Commit to opening the selected item.  Emits one resolve-command and
    /// records the id as pending.  Ignored while another open is already in
    /// flight, and a silent no-op on an empty level.
    pub fn commit_open(&mut self) -> Option<LibraryCommand> {
        if let Some(id) = self.pending_open {
            debug!(pending = id, "ignoring Enter: open already in flight");
            return None;
        }
        let level = self.stack.last()?;
        let row = level.items.get(level.selected)?;
        let id = row.id;
        self.pending_open = Some(id);
        Some(if level.is_container {
            LibraryCommand::GetPlaylist(id)
        } else {
            LibraryCommand::GetTrack(id)
        })
    }

    /// Pop one level.  At the root (no parent) this is a no-op, so the stack
    /// never empties.  Backing out also cancels any open still in flight;
    /// its late resolution will land in the background-fill path.
    pub fn go_back(&mut self, screen: &mut impl Screen) {
        let Some(level) = self.stack.last() else {
            return;
        };
        if level.source.parent.is_none() {
            return;
        }
        if let Some(id) = self.pending_open.take() {
            debug!(cancelled = id, "Back cancelled in-flight open");
        }
        self.stack.pop();
        if let Some(top) = self.stack.last() {
            screen.render_level(&top.items);
            screen.mark_selected(top.selected);
        }
    }

    /// A playlist record arrived.  If it matches the pending open this is the
    /// navigation confirmation: materialise a new level and scatter one
    /// speculative resolve per uncached child.  Otherwise it is background
    /// metadata: cache the name and relabel visible rows; the stack is
    /// untouched.
    pub fn on_playlist_resolved(
        &mut self,
        playlist: Playlist,
        cache: &mut EntityCache,
        screen: &mut impl Screen,
    ) -> Vec<LibraryCommand> {
        if self.pending_open == Some(playlist.id) {
            self.pending_open = None;
            let (level, fetches) = build_level(playlist, cache);
            screen.render_level(&level.items);
            screen.mark_selected(0);
            self.stack.push(level);
            fetches
        } else {
            cache.put_playlist_name(playlist.id, playlist.name.clone());
            self.relabel(playlist.id, &playlist.name, screen);
            Vec::new()
        }
    }

    /// A track record arrived.  Matching the pending open is the terminal
    /// case: hand the full record back for an Open command.  Otherwise cache
    /// and relabel.
    pub fn on_track_resolved(
        &mut self,
        track: Track,
        cache: &mut EntityCache,
        screen: &mut impl Screen,
    ) -> Option<Track> {
        if self.pending_open == Some(track.id) {
            self.pending_open = None;
            Some(track)
        } else {
            let name = track.name();
            cache.put_track(track.id, track.info);
            self.relabel(track.id, &name, screen);
            None
        }
    }

    fn relabel(&mut self, id: u64, label: &str, screen: &mut impl Screen) {
        let Some(level) = self.stack.last_mut() else {
            return;
        };
        let mut touched = false;
        for row in level.items.iter_mut().filter(|row| row.id == id) {
            row.label = label.to_string();
            touched = true;
        }
        if touched {
            screen.update_label(id, label);
        }
    }
}

/// Materialise a level from a resolved playlist: cached children render their
/// label immediately, the rest show the raw id and get a resolve-command.
fn build_level(playlist: Playlist, cache: &EntityCache) -> (Level, Vec<LibraryCommand>) {
    let is_container = !playlist.sub_playlists.is_empty();
    let child_ids = if is_container {
        playlist.sub_playlists.clone()
    } else {
        playlist.track_keys.clone()
    };
    if is_container && !playlist.track_keys.is_empty() {
        warn!(
            id = playlist.id,
            "playlist has both sub-playlists and tracks; showing sub-playlists"
        );
    }

    let mut items = Vec::with_capacity(child_ids.len());
    let mut fetches = Vec::new();
    for &id in &child_ids {
        let cached = if is_container {
            cache.playlist_name(id)
        } else {
            cache.track_name(id)
        };
        let label = match cached {
            Some(name) => name.to_string(),
            None => {
                fetches.push(if is_container {
                    LibraryCommand::GetPlaylist(id)
                } else {
                    LibraryCommand::GetTrack(id)
                });
                id.to_string()
            }
        };
        items.push(Row { id, label });
    }

    (
        Level {
            selected: 0,
            source: playlist,
            child_ids,
            items,
            is_container,
        },
        fetches,
    )
}
