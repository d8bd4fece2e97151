//! Runtime configuration passed in from JS as an optional JSON object.

use serde::Deserialize;

use crate::error::{GameError, Result};

/// Tunables for timing, assets and presentation.
///
/// Every field has a default so callers only send what they change, e.g.
/// `{"feedbackDelayMs": 2500, "imageBaseUrl": "/assets"}`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GameConfig {
    /// Delay before an incorrect answer's feedback clears, and before the
    /// summary appears after the last correct answer.
    pub feedback_delay_ms: u32,
    /// Interval of the elapsed-time display tick.
    pub tick_interval_ms: u32,
    /// Prefix for relative image and audio clip paths.
    pub image_base_url: String,
    /// Id of the element the game mounts into (created if missing).
    pub root_element_id: String,
    pub speech_rate: f32,
    /// BCP 47 tag for speech synthesis; browser default when absent.
    pub speech_lang: Option<String>,
    pub confetti_particles: usize,
    pub title: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            feedback_delay_ms: 4_000,
            tick_interval_ms: 1_000,
            image_base_url: "images".to_string(),
            root_element_id: "sentence-match".to_string(),
            speech_rate: 0.9,
            speech_lang: None,
            confetti_particles: 160,
            title: "Sentence Verification Global".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a config object; `None` or a blank string yields the defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self> {
        match json.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => serde_json::from_str(text).map_err(|e| GameError::json("config", e)),
        }
    }

    /// Resolve an image or clip path against `image_base_url`.
    pub fn asset_url(&self, image: &str) -> String {
        let absolute = image.starts_with('/')
            || image.starts_with("data:")
            || image.contains("://");
        if absolute || self.image_base_url.is_empty() {
            image.to_string()
        } else {
            format!("{}/{}", self.image_base_url.trim_end_matches('/'), image)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_json_gives_defaults() {
        assert_eq!(GameConfig::from_json(None).unwrap(), GameConfig::default());
        assert_eq!(GameConfig::from_json(Some("  ")).unwrap(), GameConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg = GameConfig::from_json(Some(r#"{"feedbackDelayMs": 2500, "speechLang": "en-GB"}"#))
            .unwrap();
        assert_eq!(cfg.feedback_delay_ms, 2500);
        assert_eq!(cfg.speech_lang.as_deref(), Some("en-GB"));
        assert_eq!(cfg.tick_interval_ms, 1_000);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = GameConfig::from_json(Some(r#"{"feedbackDelay": 1}"#)).unwrap_err();
        assert!(matches!(err, GameError::Json { what: "config", .. }));
    }

    #[test]
    fn asset_url_joins_relative_paths_only() {
        let cfg = GameConfig {
            image_base_url: "assets/".into(),
            ..GameConfig::default()
        };
        assert_eq!(cfg.asset_url("dog.png"), "assets/dog.png");
        assert_eq!(cfg.asset_url("/abs/dog.png"), "/abs/dog.png");
        assert_eq!(cfg.asset_url("https://cdn/x.png"), "https://cdn/x.png");
    }
}
