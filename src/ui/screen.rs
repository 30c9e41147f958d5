use ratatui::{buffer::Buffer, layout::Rect};

use crate::controller::PlaybackView;
use crate::ui::{render_finished, render_not_found, render_playing};

/// A UI Screen boundary: draws one kind of playback view
pub trait Screen {
    fn render(&self, view: &PlaybackView, area: Rect, buf: &mut Buffer);
}

/// Countdown, rounds and rest
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, view: &PlaybackView, area: Rect, buf: &mut Buffer) {
        if let PlaybackView::Playing {
            title,
            phase,
            round,
            total_rounds,
            countdown,
            remaining_secs,
            current,
            next,
            paused,
        } = view
        {
            render_playing(
                title,
                *phase,
                *round,
                *total_rounds,
                *countdown,
                *remaining_secs,
                current,
                next.as_deref(),
                *paused,
                area,
                buf,
            );
        }
    }
}

pub struct FinishedScreen;

impl Screen for FinishedScreen {
    fn render(&self, view: &PlaybackView, area: Rect, buf: &mut Buffer) {
        if let PlaybackView::Finished { title, record } = view {
            render_finished(title, record, area, buf);
        }
    }
}

pub struct NotFoundScreen;

impl Screen for NotFoundScreen {
    fn render(&self, view: &PlaybackView, area: Rect, buf: &mut Buffer) {
        if let PlaybackView::NotFound { workout_id } = view {
            render_not_found(workout_id, area, buf);
        }
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: &PlaybackView) -> Box<dyn Screen> {
    match view {
        PlaybackView::Playing { .. } => Box::new(PlayingScreen),
        PlaybackView::Finished { .. } => Box::new(FinishedScreen),
        PlaybackView::NotFound { .. } => Box::new(NotFoundScreen),
    }
}
