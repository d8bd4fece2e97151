//! Error types for level loading and DOM mounting.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced while loading level data or mounting the game.
///
/// Runtime gameplay never fails: stale timers and empty data are silent
/// no-ops handled inside the session.
#[derive(Debug, Error)]
pub enum GameError {
    /// Level or config JSON could not be parsed.
    #[error("invalid {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A level lists no images to choose from.
    #[error("level {level} has no images")]
    NoImages { level: usize },

    /// The correct answer index points past the image list.
    #[error("level {level}: correct answer index {index} out of range for {len} images")]
    AnswerOutOfRange { level: usize, index: usize, len: usize },

    /// The correct answer names an image that is not in the level.
    #[error("level {level}: correct answer '{image}' is not one of the level images")]
    AnswerNotListed { level: usize, image: String },

    /// A browser API was unavailable or threw.
    #[error("dom: {0}")]
    Dom(String),
}

impl GameError {
    pub(crate) fn json(what: &'static str, source: serde_json::Error) -> Self {
        Self::Json { what, source }
    }
}

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        Self::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_level() {
        let err = GameError::AnswerOutOfRange {
            level: 2,
            index: 7,
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "level 2: correct answer index 7 out of range for 4 images"
        );
        let err = GameError::AnswerNotListed {
            level: 0,
            image: "cat.png".into(),
        };
        assert!(err.to_string().contains("'cat.png'"));
    }

    #[test]
    fn json_error_keeps_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = GameError::json("level", source);
        assert!(err.to_string().starts_with("invalid level JSON"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
