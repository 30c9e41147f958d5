pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    controller::PlaybackView,
    progress::CompletionRecord,
    session::Phase,
    ui::screen::current_screen,
    util::{format_clock, pluralize},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const PLAYING_LEGEND: &str = "(space) pause / (s)kip / (r)estart / (q)uit";
const DONE_LEGEND: &str = "(q)uit";

impl Widget for &PlaybackView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        current_screen(self).render(self, area, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn phase_color(phase: Phase, paused: bool) -> Color {
    if paused {
        return Color::Yellow;
    }
    match phase {
        Phase::Countdown => Color::Cyan,
        Phase::Round => Color::Green,
        Phase::Rest => Color::Blue,
        Phase::Complete => Color::Magenta,
    }
}

fn phase_label(phase: Phase, paused: bool) -> &'static str {
    if paused {
        return "PAUSED";
    }
    match phase {
        Phase::Countdown => "GET READY",
        Phase::Round => "FIGHT",
        Phase::Rest => "REST",
        Phase::Complete => "DONE",
    }
}

/// Lines the current call needs once wrapped into `width` columns
fn occupied_lines(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    if text.width() <= width {
        1
    } else {
        text.width().div_ceil(width) as u16
    }
}

fn vertical_chunks(area: Rect, constraints: &[Constraint]) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(constraints)
        .split(area)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn render_playing(
    title: &str,
    phase: Phase,
    round: usize,
    total_rounds: usize,
    countdown: u32,
    remaining_secs: u32,
    current: &str,
    next: Option<&str>,
    paused: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let accent = Style::default()
        .patch(bold())
        .fg(phase_color(phase, paused));
    let dim = Style::default().add_modifier(Modifier::DIM);

    let text_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
    let current_lines = occupied_lines(current, text_width);

    let chunks = vertical_chunks(
        area,
        &[
            Constraint::Length(1), // title + round
            Constraint::Length(1), // phase
            Constraint::Min(1),
            Constraint::Length(1), // clock
            Constraint::Length(1),
            Constraint::Length(current_lines),
            Constraint::Length(1), // next
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ],
    );

    Paragraph::new(Line::from(vec![
        Span::styled(title.to_string(), bold()),
        Span::raw("   "),
        Span::styled(format!("Round {round}/{total_rounds}"), dim),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(phase_label(phase, paused), accent))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let clock = if phase == Phase::Countdown {
        countdown.to_string()
    } else {
        format_clock(remaining_secs)
    };
    Paragraph::new(Span::styled(clock, accent))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let (call, call_style) = match phase {
        Phase::Rest => ("Breathe. Shake it out.", dim),
        _ => (current, bold()),
    };
    Paragraph::new(Span::styled(call.to_string(), call_style))
        .alignment(if current_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);

    if let Some(next) = next {
        Paragraph::new(Span::styled(
            format!("Next: {next}"),
            dim.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
    }

    Paragraph::new(Span::styled(
        PLAYING_LEGEND,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[8], buf);
}

pub(crate) fn render_finished(title: &str, record: &CompletionRecord, area: Rect, buf: &mut Buffer) {
    let chunks = vertical_chunks(
        area,
        &[
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ],
    );

    Paragraph::new(Span::styled(
        "Workout complete",
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(title.to_string(), bold()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!(
            "{}   {} kcal   {} completed",
            pluralize(record.total_minutes, "minute"),
            record.calories_burned,
            pluralize(record.rounds_completed, "round"),
        ),
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        DONE_LEGEND,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[6], buf);
}

pub(crate) fn render_not_found(workout_id: &str, area: Rect, buf: &mut Buffer) {
    let chunks = vertical_chunks(
        area,
        &[
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ],
    );

    Paragraph::new(Span::styled(
        format!("Workout \"{workout_id}\" not found"),
        bold().fg(Color::Red),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "run with --list to see available workouts",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        DONE_LEGEND,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn rendered(view: &PlaybackView, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn playing(phase: Phase, paused: bool) -> PlaybackView {
        PlaybackView::Playing {
            title: "Slip & Counter".into(),
            phase,
            round: 2,
            total_rounds: 3,
            countdown: 2,
            remaining_secs: 95,
            current: "Slip left, cross".into(),
            next: Some("Roll under".into()),
            paused,
        }
    }

    #[test]
    fn playing_shows_round_clock_and_calls() {
        let text = rendered(&playing(Phase::Round, false), Rect::new(0, 0, 80, 24));
        assert!(text.contains("Round 2/3"));
        assert!(text.contains("FIGHT"));
        assert!(text.contains("01:35"));
        assert!(text.contains("Slip left, cross"));
        assert!(text.contains("Next: Roll under"));
        assert!(text.contains(PLAYING_LEGEND));
    }

    #[test]
    fn paused_banner() {
        let text = rendered(&playing(Phase::Round, true), Rect::new(0, 0, 80, 24));
        assert!(text.contains("PAUSED"));
    }

    #[test]
    fn countdown_shows_seconds_left() {
        let text = rendered(&playing(Phase::Countdown, false), Rect::new(0, 0, 80, 24));
        assert!(text.contains("GET READY"));
        assert!(!text.contains("01:35"));
    }

    #[test]
    fn rest_hides_the_call() {
        let text = rendered(&playing(Phase::Rest, false), Rect::new(0, 0, 80, 24));
        assert!(text.contains("REST"));
        assert!(!text.contains("Slip left, cross"));
    }

    #[test]
    fn finished_summary() {
        let view = PlaybackView::Finished {
            title: "Classic Six".into(),
            record: CompletionRecord {
                workout_id: "classic-six".into(),
                total_minutes: 1,
                calories_burned: 12,
                rounds_completed: 3,
                completed_at: Local::now(),
            },
        };
        let text = rendered(&view, Rect::new(0, 0, 80, 24));
        assert!(text.contains("Workout complete"));
        assert!(text.contains("1 minute   12 kcal   3 rounds completed"));
    }

    #[test]
    fn not_found_names_the_id() {
        let view = PlaybackView::NotFound {
            workout_id: "nope".into(),
        };
        let text = rendered(&view, Rect::new(0, 0, 80, 24));
        assert!(text.contains("Workout \"nope\" not found"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let area = Rect::new(0, 0, 12, 4);
        let mut buffer = Buffer::empty(area);
        (&playing(Phase::Round, false)).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn wide_calls_wrap() {
        assert_eq!(occupied_lines("short", 70), 1);
        assert_eq!(occupied_lines(&"x".repeat(150), 70), 3);
        assert_eq!(occupied_lines("anything", 0), 8);
    }
}
