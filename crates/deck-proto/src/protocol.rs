use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A playlist node in the library tree.  `sub_playlists` non-empty means the
/// node is a folder of further playlists; otherwise `track_keys` lists its
/// tracks.  `parent` is `None` only for the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: u64,
    pub name: String,
    pub parent: Option<u64>,
    pub track_keys: Vec<u64>,
    pub sub_playlists: Vec<u64>,
}

/// A track record.  `info` carries the library tags verbatim ("Name",
/// "Artist", "Tonality", …) — the client treats them as opaque strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub info: HashMap<String, String>,
    pub bpm: f64,
}

impl Track {
    /// Display name, falling back to the id when the tag is absent.
    pub fn name(&self) -> String {
        self.info
            .get("Name")
            .cloned()
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn tonality(&self) -> &str {
        self.info.get("Tonality").map(String::as_str).unwrap_or("")
    }
}

/// Resolve-commands asking the backend library for full metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LibraryCommand {
    GetPlaylist(u64),
    GetTrack(u64),
}

/// Library resolutions pushed back by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LibraryResponse {
    Playlist(Playlist),
    Track(Track),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerCommand {
    Open(Track),
}

/// Playback status pushes from the player engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Loaded track, its duration, and the engine sample rate.
    TrackInfo(Track, Duration, u32),
    /// Elapsed playback position.
    Pos(Duration),
    /// Current speed multiplier (1.0 = nominal).
    Speed(f64),
}

/// Messages sent from backend to client.  `Enter`/`Back`/`Scroll` let the
/// backend replay UI navigation remotely; they are handled exactly like
/// local input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UiCommand {
    Enter,
    Back,
    Scroll(i32),
    ForwardLibrary(LibraryResponse),
    ForwardStatus(PlayerStatus),
}

/// Messages sent from client to backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UiBackCommand {
    ForwardLibraryCommand(LibraryCommand),
    ForwardPlayerCommand(PlayerCommand),
    /// Announce the controller device whose raw events will follow.
    SetupMIDI(String),
    /// One raw controller event, forwarded verbatim as a byte triple.
    MIDI(String, [u8; 3]),
}

/// Wrapper for socket communication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Inbound(UiCommand),
    Outbound(UiBackCommand),
}

impl Message {
    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        let len = json.len() as u32;
        let mut result = Vec::with_capacity(4 + json.len());
        result.extend_from_slice(&len.to_be_bytes());
        result.extend_from_slice(&json);
        Ok(result)
    }

    pub fn decode(data: &[u8]) -> anyhow::Result<(Self, usize)> {
        if data.len() < 4 {
            anyhow::bail!("Insufficient data for length header");
        }
        let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if data.len() < 4 + len {
            anyhow::bail!("Insufficient data for message");
        }
        let msg: Self = serde_json::from_slice(&data[4..4 + len])?;
        Ok((msg, 4 + len))
    }
}
