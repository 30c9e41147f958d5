use crate::calories::{calories_or_fallback, CalorieEstimator};
use crate::custom::CustomWorkout;
use crate::feedback::{AudioHandle, Feedback, HapticKind};
use crate::library::WorkoutSource;
use crate::progress::{CompletionRecord, ProgressSink};
use crate::prompt::{Prompt, Timeline};
use crate::resolver::{current_prompt, next_prompt};
use crate::runtime::Ticker;
use crate::session::{Phase, PlaybackSession, SessionError, SessionEvent};
use crate::util::minutes_ceil;
use crate::workout::Workout;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Shown when no prompt is active
pub const IDLE_TEXT: &str = "Ready";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("no workout loaded")]
    NotLoaded,
    #[error("playback has exited")]
    Exited,
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Everything the controller talks to outside itself
pub struct Collaborators {
    pub ticker: Box<dyn Ticker>,
    pub feedback: Box<dyn Feedback>,
    pub progress: Box<dyn ProgressSink>,
    pub calories: Box<dyn CalorieEstimator>,
}

struct Loaded {
    workout: Workout,
    session: PlaybackSession,
}

/// Snapshot of what the playback screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackView {
    NotFound {
        workout_id: String,
    },
    Playing {
        title: String,
        phase: Phase,
        round: usize,
        total_rounds: usize,
        countdown: u32,
        remaining_secs: u32,
        current: String,
        next: Option<String>,
        paused: bool,
    },
    Finished {
        title: String,
        record: CompletionRecord,
    },
}

/// Drives one playback: owns the session, the ticker and the side-effect
/// collaborators for the lifetime of one screen.
///
/// Dropping the controller exits it, which cancels the ticker and releases
/// any playing instruction audio.
pub struct PlaybackController {
    workout_id: String,
    loaded: Option<Loaded>,
    ticker: Box<dyn Ticker>,
    feedback: Box<dyn Feedback>,
    progress: Box<dyn ProgressSink>,
    calories: Box<dyn CalorieEstimator>,
    current: Option<Prompt>,
    next: Option<Prompt>,
    last_cue: Option<(String, u32)>,
    audio: Option<AudioHandle>,
    completion: Option<CompletionRecord>,
    exited: bool,
}

impl PlaybackController {
    /// Look up `workout_id` and prepare playback. An unknown id yields a
    /// controller in the not-found state that never ticks.
    pub fn load(
        workout_id: &str,
        source: &mut dyn WorkoutSource,
        custom: Option<&[CustomWorkout]>,
        collaborators: Collaborators,
    ) -> Self {
        let workout = source.resolve(workout_id, custom);
        Self::new(workout_id, workout, collaborators)
    }

    pub fn new(workout_id: &str, workout: Option<Workout>, collaborators: Collaborators) -> Self {
        let loaded = workout.and_then(|workout| match PlaybackSession::new(&workout) {
            Ok(session) => Some(Loaded { workout, session }),
            Err(e) => {
                warn!(workout_id, error = %e, "workout cannot be played");
                None
            }
        });
        if loaded.is_none() {
            info!(workout_id, "workout not found");
        }

        let Collaborators {
            ticker,
            feedback,
            progress,
            calories,
        } = collaborators;
        let mut controller = Self {
            workout_id: workout_id.to_string(),
            loaded,
            ticker,
            feedback,
            progress,
            calories,
            current: None,
            next: None,
            last_cue: None,
            audio: None,
            completion: None,
            exited: false,
        };
        controller.refresh_prompts();
        controller
    }

    pub fn is_not_found(&self) -> bool {
        self.loaded.is_none()
    }

    pub fn workout(&self) -> Option<&Workout> {
        self.loaded.as_ref().map(|l| &l.workout)
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.loaded.as_ref().map(|l| &l.session)
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.current.as_ref()
    }

    pub fn next_prompt(&self) -> Option<&Prompt> {
        self.next.as_ref()
    }

    pub fn completion(&self) -> Option<&CompletionRecord> {
        self.completion.as_ref()
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded, ControlError> {
        if self.exited {
            return Err(ControlError::Exited);
        }
        self.loaded.as_mut().ok_or(ControlError::NotLoaded)
    }

    /// Begin the 3-2-1 countdown and start the clock
    pub fn start(&mut self) -> Result<(), ControlError> {
        let loaded = self.loaded_mut()?;
        let event = loaded.session.start()?;
        info!(workout = %loaded.workout.id, rounds = loaded.workout.total_rounds(), "playback started");
        self.ticker.start();
        self.handle_events(vec![event]);
        self.refresh_prompts();
        Ok(())
    }

    /// Process every tick the ticker has accumulated; returns how many ran
    pub fn pump(&mut self) -> u32 {
        if self.exited || self.loaded.is_none() {
            return 0;
        }
        let due = self.ticker.due_ticks();
        for _ in 0..due {
            self.tick();
        }
        due
    }

    /// Advance playback by one second
    pub fn tick(&mut self) {
        let Ok(loaded) = self.loaded_mut() else {
            return;
        };
        let events = loaded.session.tick();
        self.handle_events(events);
        self.refresh_prompts();
    }

    /// Ticks already due are played before the clock stops
    pub fn pause(&mut self) -> Result<(), ControlError> {
        if self.loaded_mut()?.session.is_paused() {
            return Ok(());
        }
        self.pump();
        self.loaded_mut()?.session.pause()?;
        self.ticker.stop();
        debug!("paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), ControlError> {
        self.loaded_mut()?.session.resume()?;
        self.ticker.start();
        debug!("resumed");
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), ControlError> {
        let paused = self.loaded_mut()?.session.is_paused();
        if paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    pub fn skip(&mut self) -> Result<(), ControlError> {
        let events = self.loaded_mut()?.session.skip()?;
        debug!(?events, "skipped");
        self.handle_events(events);
        self.refresh_prompts();
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), ControlError> {
        let event = self.loaded_mut()?.session.restart()?;
        self.handle_events(vec![event]);
        self.refresh_prompts();
        Ok(())
    }

    /// Leave the screen: cancel the clock and release audio. Safe to call repeatedly.
    pub fn exit(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;
        self.ticker.cancel();
        self.release_audio();
        info!(workout_id = %self.workout_id, "playback exited");
    }

    /// Apply a key press. Returns true once the user asked to leave, after
    /// playback has exited.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let result = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.exit();
                return true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.exit();
                return true;
            }
            KeyCode::Char(' ') => self.toggle_pause(),
            KeyCode::Char('s') => self.skip(),
            KeyCode::Char('r') => self.restart(),
            _ => return false,
        };
        if let Err(e) = result {
            debug!(key = ?key.code, error = %e, "control ignored");
        }
        false
    }

    fn handle_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::Countdown(_) => self.haptic(HapticKind::Light),
                SessionEvent::RoundStarted { index } => {
                    info!(round = index + 1, "round started");
                    self.last_cue = None;
                    self.haptic(HapticKind::Medium);
                }
                SessionEvent::RoundFinished { index, skipped } => {
                    info!(round = index + 1, skipped, "round finished");
                    self.haptic(HapticKind::Heavy);
                }
                SessionEvent::RestStarted { secs } => {
                    debug!(secs, "resting");
                    self.release_audio();
                }
                SessionEvent::SegmentRestarted => self.last_cue = None,
                SessionEvent::WorkoutComplete => self.finish(),
            }
        }
    }

    fn refresh_prompts(&mut self) {
        let Some(loaded) = self.loaded.as_ref() else {
            self.current = None;
            self.next = None;
            return;
        };
        let session = &loaded.session;
        let rounds = &loaded.workout.rounds;

        let (current, next) = match session.phase() {
            Phase::Round => {
                let timeline = &rounds[session.current_round_index()].timeline;
                let elapsed = session.elapsed_in_round();
                (
                    current_prompt(timeline, elapsed).cloned(),
                    next_prompt(timeline, elapsed).cloned(),
                )
            }
            Phase::Countdown => (None, first_prompt(&rounds[0].timeline)),
            Phase::Rest => (
                None,
                rounds
                    .get(session.current_round_index() + 1)
                    .and_then(|r| first_prompt(&r.timeline)),
            ),
            Phase::Complete => (None, None),
        };
        self.current = current;
        self.next = next;

        if let Some(prompt) = self.current.clone() {
            self.cue(&prompt);
        }
    }

    /// Fire the audio for `prompt` unless it is the cue already playing
    fn cue(&mut self, prompt: &Prompt) {
        let key = (prompt.text.clone(), prompt.time_offset_secs);
        if self.last_cue.as_ref() == Some(&key) {
            return;
        }
        debug!(text = %prompt.text, at = prompt.time_offset_secs, "prompt");
        self.last_cue = Some(key);
        self.release_audio();
        if let Some(uri) = &prompt.audio_ref {
            match self.feedback.play_audio(uri) {
                Ok(handle) => self.audio = Some(handle),
                Err(e) if e.is_disabled() => debug!(uri = %uri, "audio cue skipped"),
                Err(e) => warn!(uri = %uri, error = %e, "audio cue failed"),
            }
        }
    }

    fn release_audio(&mut self) {
        if let Some(handle) = self.audio.take() {
            if let Err(e) = self.feedback.stop_audio(handle) {
                warn!(error = %e, "failed to stop audio");
            }
        }
    }

    fn haptic(&mut self, kind: HapticKind) {
        if let Err(e) = self.feedback.trigger_haptic(kind) {
            debug!(%kind, error = %e, "haptic skipped");
        }
    }

    fn finish(&mut self) {
        if self.completion.is_some() {
            return;
        }
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        self.ticker.stop();

        let workout = &loaded.workout;
        let session = &loaded.session;
        let total_minutes = minutes_ceil(session.total_elapsed_secs());
        let calories_burned = calories_or_fallback(
            self.calories.as_ref(),
            total_minutes,
            workout.category,
            workout.level,
            workout.estimated_calories,
        );
        let record = CompletionRecord {
            workout_id: workout.id.clone(),
            total_minutes,
            calories_burned,
            rounds_completed: session.rounds_completed(),
            completed_at: Local::now(),
        };
        info!(
            workout = %record.workout_id,
            minutes = total_minutes,
            calories = calories_burned,
            rounds = record.rounds_completed,
            "workout complete"
        );
        if let Err(e) = self.progress.record_completion(&record) {
            warn!(error = %e, "failed to record completion");
        }
        self.release_audio();
        self.completion = Some(record);
    }

    pub fn view(&self) -> PlaybackView {
        let Some(loaded) = self.loaded.as_ref() else {
            return PlaybackView::NotFound {
                workout_id: self.workout_id.clone(),
            };
        };
        if let Some(record) = &self.completion {
            return PlaybackView::Finished {
                title: loaded.workout.title.clone(),
                record: record.clone(),
            };
        }
        let session = &loaded.session;
        PlaybackView::Playing {
            title: loaded.workout.title.clone(),
            phase: session.phase(),
            round: session.current_round_index() + 1,
            total_rounds: session.total_rounds(),
            countdown: session.countdown_remaining(),
            remaining_secs: session.remaining_in_round(),
            current: self
                .current
                .as_ref()
                .map_or_else(|| IDLE_TEXT.to_string(), |p| p.text.clone()),
            next: self.next.as_ref().map(|p| p.text.clone()),
            paused: session.is_paused(),
        }
    }
}

fn first_prompt(timeline: &Timeline) -> Option<Prompt> {
    timeline.prompts().first().cloned()
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.exit();
    }
}
