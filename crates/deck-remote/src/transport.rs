//! Transport display model — pure derivations over the playback status.
//!
//! The player pushes raw signals (track length, elapsed position, speed
//! multiplier); everything shown in the transport bar is derived here and
//! nowhere else.

use std::time::Duration;

use deck_proto::protocol::Track;

/// Remaining-time readout plus progress position.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    pub minutes: String,
    pub seconds: String,
    pub hundredths: String,
    /// Percent played, 0.0–100.0.
    pub percent: f64,
}

/// Speed/tempo readout.
#[derive(Debug, Clone, PartialEq)]
pub struct Tempo {
    /// '-' when running below nominal speed, '+' otherwise.
    pub sign: char,
    /// Absolute deviation from nominal, in percent.
    pub magnitude: f64,
    /// Effective bpm at the current speed.
    pub bpm: f64,
}

impl Tempo {
    pub fn magnitude_text(&self) -> String {
        format!("{:.2}", self.magnitude)
    }

    pub fn bpm_text(&self) -> String {
        format!("{:.1}", self.bpm)
    }
}

#[derive(Debug, Clone)]
pub struct Transport {
    track_length_ms: u64,
    speed: f64,
    base_bpm: f64,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            track_length_ms: 0,
            speed: 1.0,
            base_bpm: 0.0,
        }
    }
}

impl Transport {
    /// A track was loaded: capture its length and nominal bpm.
    pub fn on_track_info(&mut self, track: &Track, duration: Duration) {
        self.track_length_ms = duration.as_millis() as u64;
        self.base_bpm = track.bpm;
    }

    pub fn set_speed(&mut self, multiplier: f64) {
        self.speed = multiplier;
    }

    /// Remaining time at `elapsed_ms`, clamped at zero when the position
    /// overshoots the track length (the engine can report a few frames past
    /// the end while stopping).
    pub fn clock(&self, elapsed_ms: u64) -> Clock {
        let remaining = self.track_length_ms.saturating_sub(elapsed_ms);
        let minutes = remaining / 60_000;
        let seconds = (remaining % 60_000) / 1000;
        let hundredths = (remaining % 1000) / 10;
        let percent = if self.track_length_ms == 0 {
            0.0
        } else {
            (self.track_length_ms - remaining) as f64 / self.track_length_ms as f64 * 100.0
        };
        Clock {
            minutes: format!("{minutes:02}"),
            seconds: format!("{seconds:02}"),
            hundredths: format!("{hundredths:02}"),
            percent,
        }
    }

    pub fn tempo(&self) -> Tempo {
        let deviation = self.speed * 100.0 - 100.0;
        Tempo {
            sign: if deviation < 0.0 { '-' } else { '+' },
            magnitude: deviation.abs(),
            bpm: self.base_bpm * self.speed,
        }
    }
}
