use crate::workout::Workout;
use thiserror::Error;
use tracing::debug;

/// Length of the 3-2-1 countdown before the first round
pub const COUNTDOWN_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Countdown,
    Round,
    Rest,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Control {
    Pause,
    Resume,
    Skip,
    Restart,
}

/// What a tick or a control changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Countdown(u32),
    RoundStarted { index: usize },
    RoundFinished { index: usize, skipped: bool },
    RestStarted { secs: u32 },
    SegmentRestarted,
    WorkoutComplete,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("workout has no rounds")]
    NoRounds,
    #[error("round {0} has zero length")]
    EmptyRound(u32),
    #[error("session already started")]
    AlreadyStarted,
    #[error("{control} is not available during {phase}")]
    ControlUnavailable { control: Control, phase: Phase },
}

/// Round/rest state machine for one playback.
///
/// Holds the only elapsed/remaining counters. While a round is running
/// `elapsed_in_round + remaining_in_round` equals the round length; during
/// rest `remaining_in_round` counts the rest down and `elapsed_in_round`
/// keeps the finished round's value.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    round_durations: Vec<u32>,
    rest_secs: u32,
    phase: Phase,
    countdown: u32,
    round_index: usize,
    elapsed: u32,
    remaining: u32,
    started: bool,
    playing: bool,
    rounds_completed: u32,
    round_secs_elapsed: u32,
    rest_secs_elapsed: u32,
}

impl PlaybackSession {
    pub fn new(workout: &Workout) -> Result<Self, SessionError> {
        let round_durations: Vec<u32> = workout.rounds.iter().map(|r| r.duration_secs).collect();
        Self::with_durations(round_durations, workout.rest_between_rounds_secs)
    }

    pub fn with_durations(round_durations: Vec<u32>, rest_secs: u32) -> Result<Self, SessionError> {
        if round_durations.is_empty() {
            return Err(SessionError::NoRounds);
        }
        if let Some(pos) = round_durations.iter().position(|d| *d == 0) {
            return Err(SessionError::EmptyRound(pos as u32 + 1));
        }
        let first = round_durations[0];
        Ok(Self {
            round_durations,
            rest_secs,
            phase: Phase::Countdown,
            countdown: COUNTDOWN_SECS,
            round_index: 0,
            elapsed: 0,
            remaining: first,
            started: false,
            playing: false,
            rounds_completed: 0,
            round_secs_elapsed: 0,
            rest_secs_elapsed: 0,
        })
    }

    /// Begin the countdown
    pub fn start(&mut self) -> Result<SessionEvent, SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }
        self.started = true;
        self.playing = true;
        self.countdown = COUNTDOWN_SECS;
        Ok(SessionEvent::Countdown(self.countdown))
    }

    /// Advance one second. Does nothing while paused, before start, or after completion.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.playing {
            return events;
        }

        match self.phase {
            Phase::Countdown => {
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown == 0 {
                    self.enter_round(0, &mut events);
                } else {
                    events.push(SessionEvent::Countdown(self.countdown));
                }
            }
            Phase::Round => {
                self.elapsed += 1;
                self.remaining = self.remaining.saturating_sub(1);
                self.round_secs_elapsed += 1;
                if self.remaining == 0 {
                    self.finish_round(false, &mut events);
                }
            }
            Phase::Rest => {
                self.remaining = self.remaining.saturating_sub(1);
                self.rest_secs_elapsed += 1;
                if self.remaining == 0 {
                    self.enter_round(self.round_index + 1, &mut events);
                }
            }
            Phase::Complete => {}
        }
        events
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.require_active(Control::Pause)?;
        self.playing = false;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.require_active(Control::Resume)?;
        self.playing = true;
        Ok(())
    }

    /// Jump to the end of the current segment as if its timer ran out.
    ///
    /// A skipped round does not count towards `rounds_completed`.
    pub fn skip(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        self.require_active(Control::Skip)?;
        let mut events = Vec::new();
        match self.phase {
            Phase::Round => self.finish_round(true, &mut events),
            Phase::Rest => self.enter_round(self.round_index + 1, &mut events),
            Phase::Countdown | Phase::Complete => {}
        }
        Ok(events)
    }

    /// Reset the counters of the current round or rest
    pub fn restart(&mut self) -> Result<SessionEvent, SessionError> {
        self.require_active(Control::Restart)?;
        match self.phase {
            Phase::Round => {
                self.elapsed = 0;
                self.remaining = self.round_durations[self.round_index];
            }
            Phase::Rest => self.remaining = self.rest_secs,
            Phase::Countdown | Phase::Complete => {}
        }
        debug!(phase = %self.phase, round = self.round_index + 1, "segment restarted");
        Ok(SessionEvent::SegmentRestarted)
    }

    fn require_active(&self, control: Control) -> Result<(), SessionError> {
        match self.phase {
            Phase::Round | Phase::Rest if self.started => Ok(()),
            phase => Err(SessionError::ControlUnavailable { control, phase }),
        }
    }

    fn enter_round(&mut self, index: usize, events: &mut Vec<SessionEvent>) {
        self.phase = Phase::Round;
        self.round_index = index;
        self.elapsed = 0;
        self.remaining = self.round_durations[index];
        debug!(round = index + 1, secs = self.remaining, "round started");
        events.push(SessionEvent::RoundStarted { index });
    }

    fn finish_round(&mut self, skipped: bool, events: &mut Vec<SessionEvent>) {
        if !skipped {
            self.rounds_completed += 1;
        }
        events.push(SessionEvent::RoundFinished {
            index: self.round_index,
            skipped,
        });

        if self.round_index + 1 < self.round_durations.len() {
            if self.rest_secs > 0 {
                self.phase = Phase::Rest;
                self.remaining = self.rest_secs;
                debug!(secs = self.rest_secs, "rest started");
                events.push(SessionEvent::RestStarted {
                    secs: self.rest_secs,
                });
            } else {
                self.enter_round(self.round_index + 1, events);
            }
        } else {
            self.phase = Phase::Complete;
            self.remaining = 0;
            self.playing = false;
            debug!(rounds = self.rounds_completed, "workout complete");
            events.push(SessionEvent::WorkoutComplete);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown
    }

    pub fn current_round_index(&self) -> usize {
        self.round_index
    }

    pub fn total_rounds(&self) -> usize {
        self.round_durations.len()
    }

    pub fn elapsed_in_round(&self) -> u32 {
        self.elapsed
    }

    pub fn remaining_in_round(&self) -> u32 {
        self.remaining
    }

    pub fn is_resting(&self) -> bool {
        self.phase == Phase::Rest
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.started && !self.playing && self.phase != Phase::Complete
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    /// Seconds actually spent in rounds and rests, skips excluded
    pub fn total_elapsed_secs(&self) -> u32 {
        self.round_secs_elapsed + self.rest_secs_elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn started(durations: Vec<u32>, rest: u32) -> PlaybackSession {
        let mut s = PlaybackSession::with_durations(durations, rest).unwrap();
        s.start().unwrap();
        for _ in 0..COUNTDOWN_SECS {
            s.tick();
        }
        assert_eq!(s.phase(), Phase::Round);
        s
    }

    fn ticks(s: &mut PlaybackSession, n: u32) -> Vec<SessionEvent> {
        (0..n).flat_map(|_| s.tick()).collect()
    }

    #[test]
    fn countdown_runs_three_two_one() {
        let mut s = PlaybackSession::with_durations(vec![180], 0).unwrap();
        assert_eq!(s.start(), Ok(SessionEvent::Countdown(3)));
        assert_eq!(s.tick(), vec![SessionEvent::Countdown(2)]);
        assert_eq!(s.tick(), vec![SessionEvent::Countdown(1)]);
        assert_eq!(s.tick(), vec![SessionEvent::RoundStarted { index: 0 }]);
        assert_eq!(s.remaining_in_round(), 180);
        assert_eq!(s.elapsed_in_round(), 0);
    }

    #[test]
    fn ticks_before_start_are_ignored() {
        let mut s = PlaybackSession::with_durations(vec![60], 0).unwrap();
        assert!(s.tick().is_empty());
        assert_eq!(s.countdown_remaining(), COUNTDOWN_SECS);
        assert_eq!(s.start(), Ok(SessionEvent::Countdown(3)));
        assert_eq!(s.start(), Err(SessionError::AlreadyStarted));
    }

    #[test]
    fn counters_sum_to_round_length() {
        let mut s = started(vec![180, 180], 60);
        for _ in 0..179 {
            s.tick();
            assert_eq!(s.elapsed_in_round() + s.remaining_in_round(), 180);
        }
    }

    #[test]
    fn single_round_completes_after_its_length() {
        let mut s = started(vec![180], 60);
        let events = ticks(&mut s, 180);
        assert_eq!(s.remaining_in_round(), 0);
        assert_eq!(s.phase(), Phase::Complete);
        assert!(s.is_complete());
        assert!(events.contains(&SessionEvent::WorkoutComplete));
        assert_eq!(s.rounds_completed(), 1);
        // terminal
        assert!(s.tick().is_empty());
    }

    #[test]
    fn round_then_rest_then_next_round() {
        let mut s = started(vec![180, 180, 180], 60);
        let events = ticks(&mut s, 180);
        assert_eq!(
            events,
            vec![
                SessionEvent::RoundFinished {
                    index: 0,
                    skipped: false
                },
                SessionEvent::RestStarted { secs: 60 },
            ]
        );
        assert!(s.is_resting());
        assert_eq!(s.remaining_in_round(), 60);

        let events = ticks(&mut s, 60);
        assert_eq!(events, vec![SessionEvent::RoundStarted { index: 1 }]);
        assert_eq!(s.current_round_index(), 1);
        assert_eq!(s.elapsed_in_round(), 0);
        assert_eq!(s.remaining_in_round(), 180);
    }

    #[test]
    fn zero_rest_goes_straight_to_next_round() {
        let mut s = started(vec![40, 40], 0);
        let events = ticks(&mut s, 40);
        assert_matches!(events.last(), Some(SessionEvent::RoundStarted { index: 1 }));
        assert_eq!(s.phase(), Phase::Round);
    }

    #[test]
    fn pause_is_idempotent_and_suppresses_ticks() {
        let mut s = started(vec![180], 0);
        ticks(&mut s, 10);
        s.pause().unwrap();
        s.pause().unwrap();
        assert!(s.is_paused());
        assert!(ticks(&mut s, 50).is_empty());
        assert_eq!(s.elapsed_in_round(), 10);
        assert_eq!(s.remaining_in_round(), 170);

        s.resume().unwrap();
        s.tick();
        assert_eq!(s.elapsed_in_round(), 11);
    }

    #[test]
    fn controls_rejected_during_countdown() {
        let mut s = PlaybackSession::with_durations(vec![180], 0).unwrap();
        s.start().unwrap();
        assert_matches!(
            s.pause(),
            Err(SessionError::ControlUnavailable {
                control: Control::Pause,
                phase: Phase::Countdown
            })
        );
        assert_matches!(s.skip(), Err(SessionError::ControlUnavailable { .. }));
        assert_matches!(s.restart(), Err(SessionError::ControlUnavailable { .. }));
        assert!(s.is_playing());
    }

    #[test]
    fn skip_mid_round_enters_rest() {
        let mut s = started(vec![180, 180, 180], 60);
        ticks(&mut s, 30);
        let events = s.skip().unwrap();
        assert_eq!(
            events,
            vec![
                SessionEvent::RoundFinished {
                    index: 0,
                    skipped: true
                },
                SessionEvent::RestStarted { secs: 60 },
            ]
        );
        assert!(s.is_resting());
        assert_eq!(s.rounds_completed(), 0);
    }

    #[test]
    fn skip_during_rest_starts_next_round() {
        let mut s = started(vec![60, 60], 30);
        ticks(&mut s, 60);
        ticks(&mut s, 5);
        assert_eq!(s.skip().unwrap(), vec![SessionEvent::RoundStarted { index: 1 }]);
        assert_eq!(s.remaining_in_round(), 60);
        assert_eq!(s.total_elapsed_secs(), 65);
    }

    #[test]
    fn skip_on_final_round_completes() {
        let mut s = started(vec![60, 60], 30);
        ticks(&mut s, 60 + 30);
        assert_eq!(s.current_round_index(), 1);
        let events = s.skip().unwrap();
        assert_matches!(events.last(), Some(SessionEvent::WorkoutComplete));
        assert!(s.is_complete());
        assert_eq!(s.rounds_completed(), 1);
        assert_matches!(s.skip(), Err(SessionError::ControlUnavailable { .. }));
    }

    #[test]
    fn restart_resets_current_round_only() {
        let mut s = started(vec![120, 120], 30);
        ticks(&mut s, 120 + 30 + 40);
        assert_eq!(s.current_round_index(), 1);
        assert_eq!(s.restart(), Ok(SessionEvent::SegmentRestarted));
        assert_eq!(s.current_round_index(), 1);
        assert_eq!(s.elapsed_in_round(), 0);
        assert_eq!(s.remaining_in_round(), 120);
    }

    #[test]
    fn restart_during_rest_resets_rest() {
        let mut s = started(vec![60, 60], 45);
        ticks(&mut s, 60 + 20);
        assert_eq!(s.remaining_in_round(), 25);
        s.restart().unwrap();
        assert_eq!(s.remaining_in_round(), 45);
        assert!(s.is_resting());
    }

    #[test]
    fn rejects_empty_workouts() {
        assert_matches!(
            PlaybackSession::with_durations(vec![], 0),
            Err(SessionError::NoRounds)
        );
        assert_matches!(
            PlaybackSession::with_durations(vec![60, 0], 0),
            Err(SessionError::EmptyRound(2))
        );
    }
}
