pub mod analysis;
pub mod chord;
pub mod config;
pub mod document;
pub mod error;
pub mod keys;
pub mod math;
pub mod pitch;
pub mod playback;
pub mod propagate;
pub mod scale;
pub mod session;
pub mod shapes;
pub mod wheel;

pub use chord::{Accidentals, BpmOverride, Chord, ChordSequence, KeyOverride, ResolvedChord, Shape};
pub use config::SessionConfig;
pub use error::*;
pub use math::fit_range;
pub use pitch::{map_pitches, pitch_name, ChordPitches};
pub use propagate::{resolve_sequence, SessionDefaults};
pub use session::Session;

/// Resolve a song file and lay it out for export in one step.
/// This is the main entry point for offline use.
pub fn render_song(json: &str, config: &SessionConfig) -> Result<playback::PlaybackData, ChordError> {
    let mut session = Session::new(config);
    session.load_json(json)?;
    playback::export(&session.resolved())
}

/// Resolve a song file and encode it as a Standard MIDI File.
pub fn song_to_midi(json: &str, config: &SessionConfig) -> Result<Vec<u8>, ChordError> {
    let data = render_song(json, config)?;
    playback::write_midi(&data, config.velocity)
}
