use std::io::Write;
use thiserror::Error;
use tracing::info;

/// Handle to a loaded instruction audio clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HapticKind {
    /// Countdown beat
    Light,
    /// New round
    Medium,
    /// Round over / workout complete
    Heavy,
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),
    #[error("unknown audio handle {0:?}")]
    UnknownHandle(AudioHandle),
    /// The output was switched off in config or on the command line
    #[error("{0} disabled")]
    Disabled(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedbackError {
    pub fn is_disabled(&self) -> bool {
        matches!(self, FeedbackError::Disabled(_))
    }
}

/// Audio and haptic side effects. Every call is best effort; callers log
/// failures and carry on.
pub trait Feedback {
    fn play_audio(&mut self, uri: &str) -> Result<AudioHandle, FeedbackError>;
    fn stop_audio(&mut self, handle: AudioHandle) -> Result<(), FeedbackError>;
    fn trigger_haptic(&mut self, kind: HapticKind) -> Result<(), FeedbackError>;
}

/// Feedback that does nothing
#[derive(Debug, Default)]
pub struct SilentFeedback {
    next_handle: u64,
}

impl Feedback for SilentFeedback {
    fn play_audio(&mut self, _uri: &str) -> Result<AudioHandle, FeedbackError> {
        self.next_handle += 1;
        Ok(AudioHandle(self.next_handle))
    }

    fn stop_audio(&mut self, _handle: AudioHandle) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn trigger_haptic(&mut self, _kind: HapticKind) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Terminal stand-in: audio cues are logged, heavy haptics ring the bell
pub struct TerminalFeedback<W: Write> {
    out: W,
    sound: bool,
    haptics: bool,
    next_handle: u64,
    playing: Option<AudioHandle>,
}

impl TerminalFeedback<std::io::Stdout> {
    pub fn stdout(sound: bool, haptics: bool) -> Self {
        Self::new(std::io::stdout(), sound, haptics)
    }
}

impl<W: Write> TerminalFeedback<W> {
    pub fn new(out: W, sound: bool, haptics: bool) -> Self {
        Self {
            out,
            sound,
            haptics,
            next_handle: 0,
            playing: None,
        }
    }
}

impl<W: Write> Feedback for TerminalFeedback<W> {
    fn play_audio(&mut self, uri: &str) -> Result<AudioHandle, FeedbackError> {
        if !self.sound {
            return Err(FeedbackError::Disabled("sound"));
        }
        self.next_handle += 1;
        let handle = AudioHandle(self.next_handle);
        info!(uri, handle = handle.0, "audio cue");
        self.playing = Some(handle);
        Ok(handle)
    }

    fn stop_audio(&mut self, handle: AudioHandle) -> Result<(), FeedbackError> {
        match self.playing {
            Some(h) if h == handle => {
                self.playing = None;
                Ok(())
            }
            _ => Err(FeedbackError::UnknownHandle(handle)),
        }
    }

    fn trigger_haptic(&mut self, kind: HapticKind) -> Result<(), FeedbackError> {
        if !self.haptics {
            return Err(FeedbackError::Disabled("haptics"));
        }
        if kind == HapticKind::Heavy {
            self.out.write_all(b"\x07")?;
            self.out.flush()?;
        }
        Ok(())
    }
}
