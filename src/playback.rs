//! Audio playback for the "play music" command
//!
//! A thin wrapper around a rodio sink. Playback problems (no output device,
//! missing track file) degrade to a log line and never fail a submission.

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default track played for the "play music" command.
pub const TRACK_PATH: &str = "assets/song.mp3";

/// Handle to the audio output device and the current sink
pub struct MusicPlayer {
    // Must stay alive for the handle to keep working
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl MusicPlayer {
    /// Open the default audio output device
    pub fn new() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("No audio output device available")?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
        })
    }

    /// Start playing the track at `path`, replacing any current playback
    pub fn play(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.stop();

        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open track {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode track {}", path.display()))?;

        let sink = Sink::try_new(&self.handle).context("Failed to create playback sink")?;
        sink.append(source);
        self.sink = Some(sink);

        Ok(())
    }

    /// Stop playback and drop the sink
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    /// Check if a track is currently playing
    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}
