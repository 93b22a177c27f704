//! Session — the message router and the one context object owning all
//! client-side state (navigator, cache, transport, screen).
//!
//! Every mutation goes through `handle` or `handle_ui_event`; both are called
//! only from the single consumer loop in `app`, so remote replay and local
//! input are serialized into one order with no further locking.

use std::time::Duration;

use tracing::debug;

use deck_proto::protocol::{
    LibraryResponse, PlayerCommand, PlayerStatus, Track, UiBackCommand, UiCommand,
};

use crate::cache::EntityCache;
use crate::input::{self, UiEvent};
use crate::navigator::Navigator;
use crate::screen::Screen;
use crate::transport::Transport;

pub struct Session<S: Screen> {
    navigator: Navigator,
    cache: EntityCache,
    transport: Transport,
    screen: S,
    device_name: String,
}

impl<S: Screen> Session<S> {
    pub fn new(device_name: String, screen: S) -> Self {
        Self {
            navigator: Navigator::default(),
            cache: EntityCache::default(),
            transport: Transport::default(),
            screen,
            device_name,
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Commands to send right after connecting: announce the controller,
    /// then resolve the root playlist to seed the stack.
    pub fn bootstrap(&mut self, root_playlist: u64) -> Vec<UiBackCommand> {
        vec![
            UiBackCommand::SetupMIDI(self.device_name.clone()),
            UiBackCommand::ForwardLibraryCommand(self.navigator.bootstrap(root_playlist)),
        ]
    }

    /// Route one decoded backend message.  Wire `Enter`/`Back`/`Scroll` are
    /// treated exactly like local input.
    pub fn handle(&mut self, cmd: UiCommand) -> Vec<UiBackCommand> {
        match cmd {
            UiCommand::Enter => self.enter(),
            UiCommand::Back => {
                self.navigator.go_back(&mut self.screen);
                Vec::new()
            }
            UiCommand::Scroll(delta) => {
                self.navigator.scroll(delta, &mut self.screen);
                Vec::new()
            }
            UiCommand::ForwardLibrary(LibraryResponse::Playlist(playlist)) => self
                .navigator
                .on_playlist_resolved(playlist, &mut self.cache, &mut self.screen)
                .into_iter()
                .map(UiBackCommand::ForwardLibraryCommand)
                .collect(),
            UiCommand::ForwardLibrary(LibraryResponse::Track(track)) => {
                match self
                    .navigator
                    .on_track_resolved(track, &mut self.cache, &mut self.screen)
                {
                    Some(track) => {
                        vec![UiBackCommand::ForwardPlayerCommand(PlayerCommand::Open(
                            track,
                        ))]
                    }
                    None => Vec::new(),
                }
            }
            UiCommand::ForwardStatus(status) => {
                self.on_status(status);
                Vec::new()
            }
        }
    }

    /// Route one local logical event.  `Quit` is the app loop's business.
    pub fn handle_ui_event(&mut self, event: UiEvent) -> Vec<UiBackCommand> {
        match event {
            UiEvent::Enter => self.enter(),
            UiEvent::Back => {
                self.navigator.go_back(&mut self.screen);
                Vec::new()
            }
            UiEvent::Scroll(delta) => {
                self.navigator.scroll(delta, &mut self.screen);
                Vec::new()
            }
            UiEvent::Quit => Vec::new(),
        }
    }

    /// Forward one opaque controller event.
    pub fn forward_midi(&self, bytes: [u8; 3]) -> UiBackCommand {
        input::midi_command(&self.device_name, bytes)
    }

    fn enter(&mut self) -> Vec<UiBackCommand> {
        match self.navigator.commit_open() {
            Some(cmd) => {
                debug!(?cmd, "committed open");
                vec![UiBackCommand::ForwardLibraryCommand(cmd)]
            }
            None => Vec::new(),
        }
    }

    fn on_status(&mut self, status: PlayerStatus) {
        match status {
            PlayerStatus::TrackInfo(track, duration, _sample_rate) => {
                self.on_track_info(track, duration)
            }
            PlayerStatus::Pos(position) => {
                let elapsed_ms = position.as_millis() as u64;
                self.screen.update_clock(&self.transport.clock(elapsed_ms));
            }
            PlayerStatus::Speed(multiplier) => {
                self.transport.set_speed(multiplier);
                self.screen.update_tempo(&self.transport.tempo());
            }
        }
    }

    fn on_track_info(&mut self, track: Track, duration: Duration) {
        self.transport.on_track_info(&track, duration);
        self.screen
            .update_track_header(&track.name(), track.tonality());
        // Length or base bpm changed; the tempo readout depends on both.
        self.screen.update_tempo(&self.transport.tempo());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::Row;
    use crate::transport::{Clock, Tempo};
    use deck_proto::protocol::{LibraryCommand, Playlist};
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingScreen {
        clocks: Vec<Clock>,
        tempos: Vec<Tempo>,
        headers: Vec<(String, String)>,
        levels: usize,
    }

    impl Screen for RecordingScreen {
        fn render_level(&mut self, _items: &[Row]) {
            self.levels += 1;
        }
        fn mark_selected(&mut self, _index: usize) {}
        fn update_label(&mut self, _id: u64, _label: &str) {}
        fn update_clock(&mut self, clock: &Clock) {
            self.clocks.push(clock.clone());
        }
        fn update_tempo(&mut self, tempo: &Tempo) {
            self.tempos.push(tempo.clone());
        }
        fn update_track_header(&mut self, name: &str, tonality: &str) {
            self.headers.push((name.to_string(), tonality.to_string()));
        }
    }

    fn track(id: u64) -> Track {
        let mut info = HashMap::new();
        info.insert("Name".to_string(), "Strings of Life".to_string());
        info.insert("Tonality".to_string(), "11B".to_string());
        Track {
            id,
            info,
            bpm: 122.0,
        }
    }

    fn session() -> Session<RecordingScreen> {
        Session::new("DN-SC2000".to_string(), RecordingScreen::default())
    }

    #[test]
    fn test_bootstrap_announces_controller_then_resolves_root() {
        let mut session = session();
        let out = session.bootstrap(0);
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], UiBackCommand::SetupMIDI(name) if name == "DN-SC2000"));
        assert!(matches!(
            &out[1],
            UiBackCommand::ForwardLibraryCommand(LibraryCommand::GetPlaylist(0))
        ));
    }

    #[test]
    fn test_remote_enter_equals_local_enter() {
        let mut session = session();
        session.bootstrap(0);
        session.handle(UiCommand::ForwardLibrary(LibraryResponse::Playlist(
            Playlist {
                id: 0,
                name: "ROOT".to_string(),
                parent: None,
                track_keys: vec![5],
                sub_playlists: vec![],
            },
        )));
        // Wire Enter commits the open exactly like a local key press would.
        let out = session.handle(UiCommand::Enter);
        assert_eq!(
            out,
            vec![UiBackCommand::ForwardLibraryCommand(
                LibraryCommand::GetTrack(5)
            )]
        );
        // And the follow-up local Enter is swallowed while pending.
        assert!(session.handle_ui_event(UiEvent::Enter).is_empty());
    }

    #[test]
    fn test_track_open_round_trip_emits_single_open() {
        let mut session = session();
        session.bootstrap(0);
        session.handle(UiCommand::ForwardLibrary(LibraryResponse::Playlist(
            Playlist {
                id: 0,
                name: "ROOT".to_string(),
                parent: None,
                track_keys: vec![5],
                sub_playlists: vec![],
            },
        )));
        session.handle(UiCommand::Enter);
        let out = session.handle(UiCommand::ForwardLibrary(LibraryResponse::Track(track(5))));
        match &out[..] {
            [UiBackCommand::ForwardPlayerCommand(PlayerCommand::Open(t))] => assert_eq!(t.id, 5),
            other => panic!("expected one Open command, got {other:?}"),
        }
    }

    #[test]
    fn test_status_updates_reach_the_screen() {
        let mut session = session();
        session.handle(UiCommand::ForwardStatus(PlayerStatus::TrackInfo(
            track(5),
            Duration::from_millis(125_000),
            44100,
        )));
        assert_eq!(
            session.screen().headers,
            vec![("Strings of Life".to_string(), "11B".to_string())]
        );
        session.handle(UiCommand::ForwardStatus(PlayerStatus::Pos(
            Duration::from_millis(65_000),
        )));
        let clock = session.screen().clocks.last().unwrap();
        assert_eq!(clock.minutes, "01");
        assert_eq!(clock.seconds, "00");

        session.handle(UiCommand::ForwardStatus(PlayerStatus::Speed(0.8)));
        let tempo = session.screen().tempos.last().unwrap();
        assert_eq!(tempo.sign, '-');
        assert_eq!(tempo.magnitude_text(), "20.00");
        assert_eq!(tempo.bpm_text(), "97.6");
    }

    #[test]
    fn test_forward_midi_carries_device_name() {
        let session = session();
        match session.forward_midi([144, 1, 127]) {
            UiBackCommand::MIDI(device, bytes) => {
                assert_eq!(device, "DN-SC2000");
                assert_eq!(bytes, [144, 1, 127]);
            }
            _ => panic!("Wrong command type"),
        }
    }
}
