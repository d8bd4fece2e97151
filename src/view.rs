//! View models: everything the DOM layer prints, derived from a session.
//!
//! Kept free of `web_sys` so the formatting rules can be tested natively.

use crate::config::GameConfig;
use crate::level::ImageRef;
use crate::session::{Feedback, GameSession, Highlight, Millis};

/// `m:ss`, rounded down to whole seconds.
pub fn format_clock(ms: Millis) -> String {
    let total = if ms.is_finite() && ms > 0.0 {
        (ms / 1000.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn feedback_text(feedback: Feedback) -> Option<&'static str> {
    match feedback {
        Feedback::None => None,
        Feedback::Correct => Some("Correct"),
        Feedback::Incorrect => Some("Incorrect"),
    }
}

/// CSS color of the feedback line.
pub fn feedback_color(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Incorrect => "red",
        _ => "green",
    }
}

/// CSS class carrying the blink animation for a tile.
pub fn highlight_class(highlight: Highlight) -> Option<&'static str> {
    match highlight {
        Highlight::None => None,
        Highlight::CorrectBlink => Some("correct-blink"),
        Highlight::IncorrectBlink => Some("incorrect-blink"),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavbarView {
    pub attempts: u32,
    pub clock: String,
    pub screen_label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileView {
    pub position: usize,
    pub image: ImageRef,
    pub src: String,
    pub class: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelView {
    pub sentence: String,
    pub screen: String,
    pub progress_percentage: f64,
    pub tiles: Vec<TileView>,
    pub feedback: Option<(&'static str, &'static str)>,
    pub show_next: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryView {
    pub title: String,
    pub attempts: u32,
    pub time_taken: String,
}

/// What the root element shows.
#[derive(Clone, Debug, PartialEq)]
pub enum ScreenView {
    /// No levels: navbar only, the grid never renders.
    Loading(NavbarView),
    Level(NavbarView, LevelView),
    Summary(SummaryView),
}

impl ScreenView {
    pub fn from_session(session: &GameSession, config: &GameConfig) -> Self {
        if session.is_completed() {
            return Self::Summary(SummaryView {
                title: config.title.clone(),
                attempts: session.attempts(),
                time_taken: format_clock(session.completion_ms().unwrap_or_default()),
            });
        }
        let navbar = NavbarView {
            attempts: session.attempts(),
            clock: format_clock(session.elapsed_ms()),
            screen_label: format!(
                "Screen {} / {}",
                session.current_screen(),
                session.total_levels()
            ),
        };
        let Some(level) = session.current() else {
            return Self::Loading(navbar);
        };
        let ui = session.ui();
        let tiles = level
            .images
            .iter()
            .enumerate()
            .map(|(position, image)| TileView {
                position,
                image: image.clone(),
                src: config.asset_url(image.as_str()),
                class: highlight_class(ui.highlight_at(position)),
            })
            .collect();
        Self::Level(
            navbar,
            LevelView {
                sentence: level.sentence.clone(),
                screen: level.screen.to_string(),
                progress_percentage: session.progress_percentage(),
                tiles,
                feedback: feedback_text(ui.feedback).map(|t| (t, feedback_color(ui.feedback))),
                show_next: ui.show_next_button && session.has_next_level(),
            },
        )
    }
}
