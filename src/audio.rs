//! Audio cue for the sentence: a recorded clip when the level has one,
//! browser speech synthesis otherwise. Fire-and-forget.

use web_sys::{HtmlAudioElement, SpeechSynthesisUtterance, window};

use crate::config::GameConfig;
use crate::error::{GameError, Result};

/// How the sentence is voiced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cue<'a> {
    Clip(&'a str),
    Speech(&'a str),
}

impl<'a> Cue<'a> {
    pub fn for_level(sentence: &'a str, clip_url: Option<&'a str>) -> Self {
        match clip_url {
            Some(url) if !url.is_empty() => Cue::Clip(url),
            _ => Cue::Speech(sentence),
        }
    }
}

/// Start playback. Any failure is logged and otherwise ignored.
pub fn play(cue: &Cue<'_>, config: &GameConfig) {
    if let Err(err) = try_play(cue, config) {
        tracing::warn!(%err, ?cue, "audio cue failed");
    }
}

fn try_play(cue: &Cue<'_>, config: &GameConfig) -> Result<()> {
    match *cue {
        Cue::Clip(url) => {
            let audio = HtmlAudioElement::new_with_src(url)?;
            // Rejections surface asynchronously; the promise is dropped.
            let _ = audio.play()?;
        }
        Cue::Speech(text) => {
            let synth = window()
                .ok_or_else(|| GameError::Dom("no window".into()))?
                .speech_synthesis()?;
            synth.cancel();
            let utterance = SpeechSynthesisUtterance::new_with_text(text)?;
            utterance.set_rate(config.speech_rate);
            if let Some(lang) = &config.speech_lang {
                utterance.set_lang(lang);
            }
            synth.speak(&utterance);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_wins_over_speech() {
        assert_eq!(Cue::for_level("hi", Some("a.mp3")), Cue::Clip("a.mp3"));
        assert_eq!(Cue::for_level("hi", Some("")), Cue::Speech("hi"));
        assert_eq!(Cue::for_level("hi", None), Cue::Speech("hi"));
    }
}
