//! Level definitions: the immutable sentence + image sets the game is built from.
//!
//! Levels are authored as a JSON array. `correctAnswer` may be given either as
//! an index into `images` or as the image value itself; both are resolved to
//! an index into the authored (unshuffled) order here so the session can look
//! up the correct image identity once.

use std::fmt;

use serde::Deserialize;

use crate::error::{GameError, Result};

/// Builtin level set shipped with the crate.
pub const BUILTIN_LEVELS_JSON: &str = include_str!("../data/levels.json");

/// Identity of one image choice (a path or URL). Two choices are the same
/// answer exactly when their refs are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Screen identifier attached to a level (authored as number or name).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScreenId {
    Number(u64),
    Name(String),
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenId::Number(n) => write!(f, "{n}"),
            ScreenId::Name(s) => f.write_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerRef {
    Index(usize),
    Image(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLevel {
    sentence: String,
    images: Vec<ImageRef>,
    correct_answer: AnswerRef,
    #[serde(default)]
    screen: Option<ScreenId>,
    #[serde(default)]
    audio: Option<String>,
}

/// One validated level.
///
/// Only [`LevelDefinition::new`] and [`parse_levels`] build these, so
/// `correct_answer` always indexes into `images`.
///
/// ```compile_fail
/// use sentence_match::{LevelDefinition, ScreenId};
/// let _ = LevelDefinition {
///     sentence: "s".into(),
///     images: vec!["a".into()],
///     correct_answer: 3,
///     screen: ScreenId::Number(1),
///     audio: None,
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefinition {
    sentence: String,
    /// Images in authored order.
    images: Vec<ImageRef>,
    /// Index into `images` of the matching picture.
    correct_answer: usize,
    screen: ScreenId,
    /// Optional pre-recorded clip for the audio cue.
    audio: Option<String>,
}

impl LevelDefinition {
    /// Build a level in code, validating the answer index.
    pub fn new(
        sentence: impl Into<String>,
        images: Vec<ImageRef>,
        correct_answer: usize,
        screen: ScreenId,
    ) -> Result<Self> {
        let level = Self {
            sentence: sentence.into(),
            images,
            correct_answer,
            screen,
            audio: None,
        };
        level.check(0)?;
        Ok(level)
    }

    /// Attach a pre-recorded clip for the audio cue.
    pub fn with_audio(mut self, clip: impl Into<String>) -> Self {
        self.audio = Some(clip.into());
        self
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Images in authored order.
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    pub fn screen(&self) -> &ScreenId {
        &self.screen
    }

    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }

    /// The image identity that answers this level.
    pub fn correct_image(&self) -> &ImageRef {
        &self.images[self.correct_answer]
    }

    fn check(&self, level: usize) -> Result<()> {
        if self.images.is_empty() {
            return Err(GameError::NoImages { level });
        }
        if self.correct_answer >= self.images.len() {
            return Err(GameError::AnswerOutOfRange {
                level,
                index: self.correct_answer,
                len: self.images.len(),
            });
        }
        Ok(())
    }

    fn from_raw(level: usize, raw: RawLevel) -> Result<Self> {
        if raw.images.is_empty() {
            return Err(GameError::NoImages { level });
        }
        let correct_answer = match raw.correct_answer {
            AnswerRef::Index(index) => index,
            AnswerRef::Image(image) => raw
                .images
                .iter()
                .position(|i| i.as_str() == image)
                .ok_or(GameError::AnswerNotListed { level, image })?,
        };
        let def = Self {
            sentence: raw.sentence,
            images: raw.images,
            correct_answer,
            screen: raw.screen.unwrap_or(ScreenId::Number(level as u64 + 1)),
            audio: raw.audio,
        };
        def.check(level)?;
        Ok(def)
    }
}

/// Parse and validate a JSON array of levels.
///
/// An empty array is accepted; the game then stays on its loading view.
pub fn parse_levels(json: &str) -> Result<Vec<LevelDefinition>> {
    let raw: Vec<RawLevel> =
        serde_json::from_str(json).map_err(|e| GameError::json("level", e))?;
    raw.into_iter()
        .enumerate()
        .map(|(i, r)| LevelDefinition::from_raw(i, r))
        .collect()
}

pub fn builtin_levels() -> Result<Vec<LevelDefinition>> {
    parse_levels(BUILTIN_LEVELS_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_as_image_value_resolves_to_index() {
        let levels = parse_levels(
            r#"[{"sentence":"s","images":["a.png","b.png","c.png"],"correctAnswer":"c.png","screen":"intro"}]"#,
        )
        .unwrap();
        assert_eq!(levels[0].correct_answer(), 2);
        assert_eq!(levels[0].correct_image().as_str(), "c.png");
        assert_eq!(*levels[0].screen(), ScreenId::Name("intro".into()));
    }

    #[test]
    fn screen_defaults_to_one_based_position() {
        let levels = parse_levels(
            r#"[{"sentence":"a","images":["x"],"correctAnswer":0},
                {"sentence":"b","images":["y"],"correctAnswer":0}]"#,
        )
        .unwrap();
        assert_eq!(*levels[1].screen(), ScreenId::Number(2));
        assert_eq!(levels[1].screen().to_string(), "2");
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = parse_levels(r#"[{"sentence":"s","images":["a"],"correctAnswer":3}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::AnswerOutOfRange { level: 0, index: 3, len: 1 }
        ));
    }

    #[test]
    fn unknown_answer_image_is_rejected() {
        let err = parse_levels(
            r#"[{"sentence":"s","images":["a"],"correctAnswer":0},
                {"sentence":"t","images":["b"],"correctAnswer":"zzz"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, GameError::AnswerNotListed { level: 1, .. }));
    }

    #[test]
    fn level_without_images_is_rejected() {
        let err = parse_levels(r#"[{"sentence":"s","images":[],"correctAnswer":0}]"#).unwrap_err();
        assert!(matches!(err, GameError::NoImages { level: 0 }));
    }

    #[test]
    fn empty_array_is_not_an_error() {
        assert!(parse_levels("[]").unwrap().is_empty());
    }

    #[test]
    fn new_validates_index() {
        let ok = LevelDefinition::new("s", vec!["a".into(), "b".into()], 1, ScreenId::Number(1));
        assert!(ok.is_ok());
        let bad = LevelDefinition::new("s", vec!["a".into()], 1, ScreenId::Number(1));
        assert!(bad.is_err());
        let empty = LevelDefinition::new("s", Vec::new(), 0, ScreenId::Number(1));
        assert!(matches!(empty, Err(GameError::NoImages { level: 0 })));
    }

    #[test]
    fn every_constructed_level_has_an_answer() {
        let level = LevelDefinition::new("s", vec!["a".into(), "b".into()], 1, ScreenId::Number(1))
            .unwrap()
            .with_audio("s.mp3");
        assert_eq!(level.correct_image().as_str(), "b");
        assert_eq!(level.audio(), Some("s.mp3"));
        assert_eq!(level.images().len(), 2);
    }
}
