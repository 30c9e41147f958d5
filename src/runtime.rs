use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum CoachEvent {
    Key(KeyEvent),
    Resize,
    Frame,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait CoachEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<CoachEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(CoachEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(CoachEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CoachEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<CoachEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<CoachEvent>) -> Self {
        Self { rx }
    }
}

impl CoachEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that waits for the next event, yielding `Frame` when the frame interval passes
pub struct Runner<E: CoachEventSource> {
    event_source: E,
    frame_interval: Duration,
}

impl<E: CoachEventSource> Runner<E> {
    pub fn new(event_source: E, frame_interval: Duration) -> Self {
        Self {
            event_source,
            frame_interval,
        }
    }

    pub fn step(&self) -> CoachEvent {
        match self.event_source.recv_timeout(self.frame_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                CoachEvent::Frame
            }
        }
    }
}

/// Clock that drives a playback session in whole-second ticks.
///
/// The controller polls `due_ticks` and processes that many ticks. A stopped
/// ticker accrues nothing; a cancelled one never ticks again.
pub trait Ticker {
    fn start(&mut self);
    fn stop(&mut self);
    fn cancel(&mut self);
    /// Ticks elapsed since the previous call
    fn due_ticks(&mut self) -> u32;
}

/// Wall-clock ticker
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    interval: Duration,
    anchor: Option<Instant>,
    /// Part of an interval already played when the ticker was stopped
    carry: Duration,
    cancelled: bool,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            anchor: None,
            carry: Duration::ZERO,
            cancelled: false,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn due_ticks_at(&mut self, now: Instant) -> u32 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        if self.cancelled || self.interval.is_zero() {
            return 0;
        }
        let elapsed = now.saturating_duration_since(anchor);
        let due = (elapsed.as_nanos() / self.interval.as_nanos()) as u32;
        self.anchor = Some(anchor + self.interval * due);
        due
    }

    fn start_at(&mut self, now: Instant) {
        if !self.cancelled && self.anchor.is_none() {
            self.anchor = Some(now.checked_sub(self.carry).unwrap_or(now));
            self.carry = Duration::ZERO;
        }
    }

    fn stop_at(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            self.carry = now.saturating_duration_since(anchor);
        }
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self) {
        self.start_at(Instant::now());
    }

    fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    fn cancel(&mut self) {
        self.anchor = None;
        self.carry = Duration::ZERO;
        self.cancelled = true;
    }

    fn due_ticks(&mut self) -> u32 {
        self.due_ticks_at(Instant::now())
    }
}

#[derive(Debug, Default)]
struct ManualClock {
    pending: u32,
    running: bool,
    cancelled: bool,
    cancel_calls: u32,
}

/// Ticker advanced by hand, for tests and headless runs.
///
/// Clones share state, so a test keeps one handle while the controller owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `secs` ticks; ignored unless the ticker is running
    pub fn advance(&self, secs: u32) {
        let mut clock = self.clock.borrow_mut();
        if clock.running && !clock.cancelled {
            clock.pending += secs;
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock.borrow().running
    }

    pub fn cancel_calls(&self) -> u32 {
        self.clock.borrow().cancel_calls
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self) {
        let mut clock = self.clock.borrow_mut();
        if !clock.cancelled {
            clock.running = true;
        }
    }

    fn stop(&mut self) {
        let mut clock = self.clock.borrow_mut();
        clock.running = false;
        clock.pending = 0;
    }

    fn cancel(&mut self) {
        let mut clock = self.clock.borrow_mut();
        clock.running = false;
        clock.cancelled = true;
        clock.pending = 0;
        clock.cancel_calls += 1;
    }

    fn due_ticks(&mut self) -> u32 {
        std::mem::take(&mut self.clock.borrow_mut().pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_frame_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, Duration::from_millis(1));

        match runner.step() {
            CoachEvent::Frame => {}
            _ => panic!("expected Frame on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(CoachEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, Duration::from_millis(10));

        match runner.step() {
            CoachEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn interval_ticker_counts_whole_intervals() {
        let mut t = IntervalTicker::every_second();
        let t0 = Instant::now();
        t.start_at(t0);
        assert_eq!(t.due_ticks_at(t0 + Duration::from_millis(900)), 0);
        assert_eq!(t.due_ticks_at(t0 + Duration::from_millis(1100)), 1);
        // remainder carries over
        assert_eq!(t.due_ticks_at(t0 + Duration::from_millis(2050)), 1);
        assert_eq!(t.due_ticks_at(t0 + Duration::from_millis(5000)), 3);
    }

    #[test]
    fn interval_ticker_keeps_partial_second_across_pause() {
        let mut t = IntervalTicker::every_second();
        let t0 = Instant::now();
        t.start_at(t0);
        assert_eq!(t.due_ticks_at(t0 + Duration::from_millis(1600)), 1);

        t.stop_at(t0 + Duration::from_millis(1600));
        t.start_at(t0 + Duration::from_secs(10));
        assert_eq!(t.due_ticks_at(t0 + Duration::from_millis(10_300)), 0);
        assert_eq!(t.due_ticks_at(t0 + Duration::from_millis(10_400)), 1);
    }

    #[test]
    fn interval_ticker_stopped_or_cancelled_accrues_nothing() {
        let mut t = IntervalTicker::every_second();
        let t0 = Instant::now();
        assert_eq!(t.due_ticks_at(t0 + Duration::from_secs(3)), 0);

        t.start_at(t0);
        t.stop();
        assert_eq!(t.due_ticks_at(t0 + Duration::from_secs(3)), 0);

        t.cancel();
        t.start_at(t0);
        assert_eq!(t.due_ticks_at(t0 + Duration::from_secs(3)), 0);
    }

    #[test]
    fn manual_ticker_shares_state_between_clones() {
        let handle = ManualTicker::new();
        let mut owned = handle.clone();
        handle.advance(5);
        assert_eq!(owned.due_ticks(), 0);

        owned.start();
        handle.advance(5);
        assert_eq!(owned.due_ticks(), 5);
        assert_eq!(owned.due_ticks(), 0);

        owned.cancel();
        handle.advance(5);
        assert_eq!(owned.due_ticks(), 0);
        assert_eq!(handle.cancel_calls(), 1);
    }
}
