//! Sentence Match core crate.
//!
//! A picture-sentence quiz for the browser: each level shows a sentence and a
//! grid of images, the player picks the matching picture, and after the last
//! level a summary screen offers another round.
//!
//! The game logic (`session`, `level`, `view`, `confetti`) is plain Rust and
//! tested natively; `controller` binds it to the DOM via `web-sys`.

use wasm_bindgen::prelude::*;

pub mod audio;
pub mod config;
pub mod confetti;
pub mod controller;
pub mod error;
pub mod level;
pub mod logging;
pub mod session;
pub mod view;

pub use config::GameConfig;
pub use error::GameError;
pub use level::{ImageRef, LevelDefinition, ScreenId, builtin_levels, parse_levels};
pub use session::{
    Delayed, Effect, Feedback, GameSession, Generation, Highlight, LevelUiState, Phase,
    ShuffledLevel, Transition,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start with the builtin levels and default settings.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    start_game_with(None, None)
}

/// Start with caller-supplied level and/or config JSON.
///
/// Invalid JSON or level data is reported as a thrown string; an empty level
/// array mounts the navbar only.
#[wasm_bindgen]
pub fn start_game_with(
    levels_json: Option<String>,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    let config = GameConfig::from_json(config_json.as_deref())?;
    let levels = match levels_json.as_deref() {
        Some(json) => parse_levels(json)?,
        None => builtin_levels()?,
    };
    controller::mount(levels, config)?;
    Ok(())
}

/// Attempts made so far in the running game (0 before `start_game`).
#[wasm_bindgen]
pub fn current_attempts() -> u32 {
    controller::with_session(GameSession::attempts).unwrap_or(0)
}

/// Progress through the levels, 0–100.
#[wasm_bindgen]
pub fn progress_percentage() -> f64 {
    controller::with_session(GameSession::progress_percentage).unwrap_or(0.0)
}
