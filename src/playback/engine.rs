//! Real-time sequencer.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::chord::ResolvedChord;
use crate::error::ChordError;
use crate::pitch::{map_pitches, ChordPitches};

use super::backend::{PlayerBackend, PlayerHandle};
use super::types::{PlaybackOutcome, PlaybackState};

/// How long notes ring past their chord unless configured otherwise.
pub const DEFAULT_RELEASE_TAIL: Duration = Duration::from_millis(100);

const NOTHING_PLAYING: usize = usize::MAX;
const NO_SESSION: u64 = 0;

#[derive(Debug)]
struct ControlState {
    /// Id of the running play session, `NO_SESSION` when idle.
    session: AtomicU64,
    last_session: AtomicU64,
    cancelled: AtomicBool,
    now_playing: AtomicUsize,
}

/// Shared playback flags. Every read is a fresh atomic load.
///
/// Each `play` call runs under its own session id. `stop()` clears the id, so
/// a stopped task can never pass its next cancellation check or reset the
/// state of a session started after it.
#[derive(Debug, Clone)]
pub struct PlaybackControl {
    inner: Arc<ControlState>,
}

impl Default for PlaybackControl {
    fn default() -> Self {
        Self {
            inner: Arc::new(ControlState {
                session: AtomicU64::new(NO_SESSION),
                last_session: AtomicU64::new(NO_SESSION),
                cancelled: AtomicBool::new(false),
                now_playing: AtomicUsize::new(NOTHING_PLAYING),
            }),
        }
    }
}

impl PlaybackControl {
    pub fn state(&self) -> PlaybackState {
        if self.inner.session.load(Ordering::Acquire) == NO_SESSION {
            PlaybackState::Idle
        } else {
            PlaybackState::Playing
        }
    }

    /// Index of the chord currently sounding, if any.
    pub fn now_playing(&self) -> Option<usize> {
        match self.inner.now_playing.load(Ordering::Acquire) {
            NOTHING_PLAYING => None,
            index => Some(index),
        }
    }

    /// Whether the most recent session was ended by `stop()`.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    fn begin(&self) -> Option<u64> {
        let id = self.inner.last_session.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner
            .session
            .compare_exchange(NO_SESSION, id, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.inner.cancelled.store(false, Ordering::Release);
        Some(id)
    }

    fn is_current(&self, session: u64) -> bool {
        self.inner.session.load(Ordering::Acquire) == session
    }

    fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.session.store(NO_SESSION, Ordering::Release);
        self.inner.now_playing.store(NOTHING_PLAYING, Ordering::Release);
    }

    fn set_now_playing(&self, session: u64, index: usize) {
        if self.is_current(session) {
            self.inner.now_playing.store(index, Ordering::Release);
        }
    }

    /// End `session` if it is still the running one.
    fn finish(&self, session: u64) {
        if self
            .inner
            .session
            .compare_exchange(session, NO_SESSION, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.inner.now_playing.store(NOTHING_PLAYING, Ordering::Release);
        }
    }
}

/// Plays resolved chords through a prepared backend, one at a time.
///
/// Cloning is cheap and every clone drives the same output, so one task can
/// `play` while another calls `stop`.
#[derive(Clone)]
pub struct Sequencer {
    handle: Arc<dyn PlayerHandle>,
    control: PlaybackControl,
    release_tail: Duration,
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("control", &self.control)
            .field("release_tail", &self.release_tail)
            .finish_non_exhaustive()
    }
}

impl Sequencer {
    /// Prepare `backend` and build a sequencer on it.
    pub async fn connect(backend: &dyn PlayerBackend, release_tail: Duration) -> Result<Self, ChordError> {
        let handle = backend.prepare().await.map_err(|e| {
            warn!(error = %e, "backend failed to prepare");
            match e {
                ChordError::BackendUnavailable(_) => e,
                other => ChordError::BackendUnavailable(other.to_string()),
            }
        })?;
        Ok(Self {
            handle,
            control: PlaybackControl::default(),
            release_tail,
        })
    }

    pub fn control(&self) -> &PlaybackControl {
        &self.control
    }

    pub fn state(&self) -> PlaybackState {
        self.control.state()
    }

    /// Play `chords` starting at index `from` (negative starts at 0).
    ///
    /// The session is checked before each chord and again when a chord ends;
    /// once stopped, nothing more is sent to the backend. A backend failure
    /// or an invalid chord aborts playback with all notes off.
    pub async fn play(&self, chords: &[ResolvedChord], from: isize) -> Result<PlaybackOutcome, ChordError> {
        let session = self
            .control
            .begin()
            .ok_or_else(|| ChordError::Playback("sequencer is already playing".to_string()))?;
        let start = from.max(0) as usize;
        debug!(session, start, total = chords.len(), "playback started");

        let result = self.run(session, chords, start).await;
        if result.is_err() && self.control.is_current(session) {
            if let Err(e) = self.handle.all_notes_off().await {
                warn!(error = %e, "all notes off failed after playback error");
            }
        }
        self.control.finish(session);
        result
    }

    async fn run(&self, session: u64, chords: &[ResolvedChord], start: usize) -> Result<PlaybackOutcome, ChordError> {
        for (index, chord) in chords.iter().enumerate().skip(start) {
            if !self.control.is_current(session) {
                debug!(session, at = index, "playback cancelled");
                return Ok(PlaybackOutcome::Stopped { at: index });
            }
            self.control.set_now_playing(session, index);

            let (pitches, length) = prepare_chord(chord).map_err(|e| {
                warn!(chord = index + 1, error = %e, "chord rejected by sequencer");
                e.at_chord(index + 1)
            })?;
            let pitches = pitches.all();
            debug!(chord = index + 1, pitches = ?pitches, secs = length.as_secs_f64(), "chord on");

            self.handle
                .play(&pitches, length + self.release_tail)
                .await
                .map_err(into_playback)?;
            tokio::time::sleep(length).await;
            // stop() has already silenced everything
            if !self.control.is_current(session) {
                debug!(session, at = index + 1, "playback cancelled");
                return Ok(PlaybackOutcome::Stopped { at: index + 1 });
            }
            self.handle.release(&pitches).await.map_err(into_playback)?;
        }
        Ok(PlaybackOutcome::Completed)
    }

    /// Cancel playback and silence everything immediately.
    pub async fn stop(&self) -> Result<(), ChordError> {
        info!("stop requested");
        self.control.cancel();
        self.handle.all_notes_off().await.map_err(into_playback)
    }

    /// Sound a single chord for its length, outside any play session.
    pub async fn preview(&self, chord: &ResolvedChord) -> Result<(), ChordError> {
        let (pitches, length) = prepare_chord(chord)?;
        let pitches = pitches.all();
        debug!(pitches = ?pitches, "preview");
        self.handle
            .play(&pitches, length + self.release_tail)
            .await
            .map_err(into_playback)?;
        tokio::time::sleep(length).await;
        self.handle.release(&pitches).await.map_err(into_playback)
    }
}

fn prepare_chord(chord: &ResolvedChord) -> Result<(ChordPitches, Duration), ChordError> {
    chord.validate()?;
    let pitches = map_pitches(chord)?;
    let length = Duration::try_from_secs_f64(chord.duration_secs())
        .map_err(|e| ChordError::OutOfRange(format!("chord length: {}", e)))?;
    Ok((pitches, length))
}

fn into_playback(e: ChordError) -> ChordError {
    match e {
        ChordError::Playback(_) => e,
        other => ChordError::Playback(other.to_string()),
    }
}
