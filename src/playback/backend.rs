//! Audio/MIDI backend contract and the two in-crate backends.
//!
//! A backend is prepared once per sequencer; the handle it returns is shared
//! between the playing task and whoever calls `stop()`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::info;

use crate::error::ChordError;

/// Something that can make sound (or pretend to).
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Acquire the output. Failure here is reported as `BackendUnavailable`.
    async fn prepare(&self) -> Result<Arc<dyn PlayerHandle>, ChordError>;
}

/// A prepared output.
#[async_trait]
pub trait PlayerHandle: Send + Sync {
    /// Start `pitches`. `sustain` is how long a synth should let them ring.
    async fn play(&self, pitches: &[u8], sustain: Duration) -> Result<(), ChordError>;

    async fn release(&self, pitches: &[u8]) -> Result<(), ChordError>;

    /// Silence every pitch, 0 through 127.
    async fn all_notes_off(&self) -> Result<(), ChordError> {
        let every_pitch: Vec<u8> = (0..=127).collect();
        self.release(&every_pitch).await
    }
}

/// One call a [`RecordingBackend`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Play { pitches: Vec<u8>, sustain: Duration },
    Release { pitches: Vec<u8> },
    AllNotesOff,
}

/// A call plus the (tokio) time it arrived, measured from backend creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub at: Duration,
    pub call: BackendCall,
}

/// Backend that records every call instead of producing sound.
///
/// Timestamps come from `tokio::time::Instant`, so under a paused test clock
/// they are exact.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    origin: Instant,
    available: bool,
    fail_on_play: Option<usize>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            origin: Instant::now(),
            available: true,
            fail_on_play: None,
        }
    }

    /// A backend whose `prepare` always fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// A backend whose `n`th `play` call (0-based) fails.
    pub fn failing_on_play(n: usize) -> Self {
        Self {
            fail_on_play: Some(n),
            ..Self::new()
        }
    }

    fn record(&self, call: BackendCall) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.push(RecordedCall {
            at: self.origin.elapsed(),
            call,
        });
        calls
            .iter()
            .filter(|c| matches!(c.call, BackendCall::Play { .. }))
            .count()
    }

    /// Snapshot of everything recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl PlayerBackend for RecordingBackend {
    async fn prepare(&self) -> Result<Arc<dyn PlayerHandle>, ChordError> {
        if !self.available {
            return Err(ChordError::BackendUnavailable(
                "recording backend configured as unavailable".to_string(),
            ));
        }
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl PlayerHandle for RecordingBackend {
    async fn play(&self, pitches: &[u8], sustain: Duration) -> Result<(), ChordError> {
        let plays = self.record(BackendCall::Play {
            pitches: pitches.to_vec(),
            sustain,
        });
        if self.fail_on_play == Some(plays - 1) {
            return Err(ChordError::Playback(format!(
                "recording backend rejected play call {}",
                plays - 1
            )));
        }
        Ok(())
    }

    async fn release(&self, pitches: &[u8]) -> Result<(), ChordError> {
        self.record(BackendCall::Release {
            pitches: pitches.to_vec(),
        });
        Ok(())
    }

    async fn all_notes_off(&self) -> Result<(), ChordError> {
        self.record(BackendCall::AllNotesOff);
        Ok(())
    }
}

/// Backend that only writes tracing events. Used by the CLI's `--play`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBackend;

#[async_trait]
impl PlayerBackend for LoggingBackend {
    async fn prepare(&self) -> Result<Arc<dyn PlayerHandle>, ChordError> {
        Ok(Arc::new(LoggingBackend))
    }
}

#[async_trait]
impl PlayerHandle for LoggingBackend {
    async fn play(&self, pitches: &[u8], sustain: Duration) -> Result<(), ChordError> {
        info!(?pitches, sustain_ms = sustain.as_millis() as u64, "note on");
        Ok(())
    }

    async fn release(&self, pitches: &[u8]) -> Result<(), ChordError> {
        info!(?pitches, "note off");
        Ok(())
    }

    async fn all_notes_off(&self) -> Result<(), ChordError> {
        info!("all notes off");
        Ok(())
    }
}
