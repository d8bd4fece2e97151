//! Game session state machine.
//!
//! A [`GameSession`] is a plain value. Every player event or timer callback is
//! a method taking `&self` and returning a [`Transition`]: the next session
//! plus the [`Effect`]s the host has to carry out (schedule a delayed action,
//! start or stop the clock, fire confetti). The host swaps its stored session
//! for the new one; nothing here touches the DOM or reads the clock.
//!
//! Delayed actions capture a [`Generation`] (bumped when the level changes or
//! the game restarts) and, for feedback clears, the feedback epoch (bumped on
//! every choice). [`GameSession::apply`] drops any action whose tokens no
//! longer match, so a timer that fires after the player moved on is a no-op.

use std::rc::Rc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::level::{ImageRef, LevelDefinition, ScreenId};

/// Milliseconds, as reported by `performance.now()`.
pub type Millis = f64;

/// Text feedback shown under the sentence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Incorrect,
}

/// Per-tile highlight driving the blink animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Highlight {
    #[default]
    None,
    CorrectBlink,
    IncorrectBlink,
}

/// Coarse state of the session, derived from its fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No level data: nothing to play.
    Loading,
    /// Waiting for the right answer on the current level.
    Playing,
    /// The current level was answered correctly and another one follows.
    LevelSolved,
    /// The last level was answered correctly; the summary is pending.
    Advancing,
    /// Summary screen; only `play_again` leaves it.
    Completed,
}

/// A level with its images in play order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffledLevel {
    pub sentence: String,
    pub images: Vec<ImageRef>,
    /// Identity of the matching image, independent of where it landed.
    pub correct_image: ImageRef,
    pub screen: ScreenId,
    pub audio: Option<String>,
}

impl ShuffledLevel {
    /// Copy `def` with its images in a uniformly random order.
    pub fn shuffle<R: Rng + ?Sized>(def: &LevelDefinition, rng: &mut R) -> Self {
        let mut images = def.images().to_vec();
        images.shuffle(rng);
        Self {
            sentence: def.sentence().to_owned(),
            images,
            correct_image: def.correct_image().clone(),
            screen: def.screen().clone(),
            audio: def.audio().map(str::to_owned),
        }
    }

    pub fn is_correct(&self, image: &ImageRef) -> bool {
        *image == self.correct_image
    }
}

/// View state of the level on screen; reset whenever the level changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelUiState {
    pub selected_image: Option<ImageRef>,
    pub feedback: Feedback,
    /// One entry per displayed image, or empty when nothing is highlighted.
    pub highlights: Vec<Highlight>,
    pub show_next_button: bool,
    pub show_confetti: bool,
}

impl LevelUiState {
    pub fn highlight_at(&self, position: usize) -> Highlight {
        self.highlights.get(position).copied().unwrap_or_default()
    }
}

/// Token identifying the level/run a delayed action was scheduled in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Work deferred by the feedback delay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Delayed {
    /// Clear feedback and highlights after an incorrect answer.
    ClearFeedback { generation: Generation, epoch: u64 },
    /// Show the summary after the last level was solved. The completion time
    /// is measured at the correct choice, not when this fires.
    Complete {
        generation: Generation,
        completion_ms: Millis,
    },
}

/// Side effects requested by a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Run `Delayed` after the configured feedback delay.
    Schedule(Delayed),
    /// Play the confetti burst.
    Celebrate,
    /// Stop the elapsed-time tick.
    StopClock,
    /// (Re)start the elapsed-time tick.
    RestartClock,
}

/// Result of applying an event.
#[derive(Clone, Debug)]
pub struct Transition {
    pub session: GameSession,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(session: GameSession) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }
}

/// Full progress state of one playthrough.
#[derive(Clone, Debug)]
pub struct GameSession {
    definitions: Rc<[LevelDefinition]>,
    levels: Rc<[ShuffledLevel]>,
    current_level: usize,
    current_screen: usize,
    attempts: u32,
    start_ms: Millis,
    elapsed_ms: Millis,
    completion_ms: Option<Millis>,
    completed: bool,
    generation: Generation,
    feedback_epoch: u64,
    ui: LevelUiState,
}

impl GameSession {
    /// Shuffle every level's images and start the clock at `now`.
    ///
    /// With no definitions the session stays in [`Phase::Loading`] for good.
    pub fn start<R: Rng + ?Sized>(
        definitions: impl Into<Rc<[LevelDefinition]>>,
        rng: &mut R,
        now: Millis,
    ) -> Transition {
        let definitions = definitions.into();
        let levels: Rc<[ShuffledLevel]> = definitions
            .iter()
            .map(|def| ShuffledLevel::shuffle(def, rng))
            .collect();
        if levels.is_empty() {
            tracing::warn!("no level data; game will not start");
        } else {
            tracing::info!(levels = levels.len(), "session started");
        }
        let session = Self {
            definitions,
            levels,
            current_level: 0,
            current_screen: 1,
            attempts: 0,
            start_ms: now,
            elapsed_ms: 0.0,
            completion_ms: None,
            completed: false,
            generation: Generation::default(),
            feedback_epoch: 0,
            ui: LevelUiState::default(),
        };
        let effects = if session.levels.is_empty() {
            Vec::new()
        } else {
            vec![Effect::RestartClock]
        };
        Transition { session, effects }
    }

    /// Register a click on the image shown at `position`.
    ///
    /// Every call counts as an attempt. Wrong answers are not input-locked:
    /// clicking again before the feedback clears counts again. Returns `None`
    /// when there is nothing to answer (loading or completed).
    pub fn submit_choice(&self, image: &ImageRef, position: usize, now: Millis) -> Option<Transition> {
        if self.completed {
            return None;
        }
        let level = self.current()?;
        let mut next = self.clone();
        next.attempts += 1;
        next.feedback_epoch += 1;
        next.ui.selected_image = Some(image.clone());

        let mut effects = Vec::new();
        if level.is_correct(image) {
            tracing::info!(
                level_index = self.current_level,
                attempts = next.attempts,
                "level solved"
            );
            next.ui.feedback = Feedback::Correct;
            next.ui.highlights = level
                .images
                .iter()
                .map(|i| {
                    if level.is_correct(i) {
                        Highlight::CorrectBlink
                    } else {
                        Highlight::None
                    }
                })
                .collect();
            next.ui.show_next_button = true;
            next.ui.show_confetti = true;
            effects.push(Effect::Celebrate);
            if self.is_last_level() {
                effects.push(Effect::Schedule(Delayed::Complete {
                    generation: next.generation,
                    completion_ms: (now - self.start_ms).max(0.0),
                }));
            }
        } else {
            tracing::debug!(
                level_index = self.current_level,
                image = %image,
                position,
                "incorrect choice"
            );
            next.ui.feedback = Feedback::Incorrect;
            next.ui.highlights = (0..level.images.len())
                .map(|i| {
                    if i == position {
                        Highlight::IncorrectBlink
                    } else {
                        Highlight::None
                    }
                })
                .collect();
            effects.push(Effect::Schedule(Delayed::ClearFeedback {
                generation: next.generation,
                epoch: next.feedback_epoch,
            }));
        }
        Some(Transition {
            session: next,
            effects,
        })
    }

    /// Apply a delayed action, or `None` if it was scheduled for a level or
    /// run that is no longer current.
    pub fn apply(&self, delayed: Delayed) -> Option<Transition> {
        match delayed {
            Delayed::ClearFeedback { generation, epoch } => {
                if generation != self.generation || epoch != self.feedback_epoch || self.completed {
                    tracing::debug!(?delayed, "stale feedback clear dropped");
                    return None;
                }
                let mut next = self.clone();
                next.ui.feedback = Feedback::None;
                next.ui.highlights.clear();
                Some(Transition::quiet(next))
            }
            Delayed::Complete {
                generation,
                completion_ms,
            } => {
                if generation != self.generation || self.completed {
                    tracing::debug!(?delayed, "stale completion dropped");
                    return None;
                }
                tracing::info!(
                    attempts = self.attempts,
                    completion_ms,
                    "game completed"
                );
                let mut next = self.clone();
                next.completed = true;
                next.completion_ms = Some(completion_ms);
                next.elapsed_ms = completion_ms;
                Some(Transition {
                    session: next,
                    effects: vec![Effect::StopClock],
                })
            }
        }
    }

    /// Move to the next level. No-op on the last level or when completed.
    pub fn advance_level(&self) -> Option<Transition> {
        if self.completed || self.current_level + 1 >= self.levels.len() {
            return None;
        }
        let mut next = self.clone();
        next.current_level += 1;
        next.current_screen += 1;
        next.generation = next.generation.next();
        next.ui = LevelUiState::default();
        tracing::debug!(level_index = next.current_level, "advanced level");
        Some(Transition::quiet(next))
    }

    /// Start over with freshly shuffled levels.
    ///
    /// The generation keeps counting up from this run so that timers still
    /// pending from it are recognised as stale.
    pub fn play_again<R: Rng + ?Sized>(&self, rng: &mut R, now: Millis) -> Transition {
        let mut fresh = Self::start(Rc::clone(&self.definitions), rng, now);
        fresh.session = fresh.session.succeeding(self.generation);
        fresh
    }

    /// Continue generation numbering after `previous`, so delayed actions
    /// issued by an earlier session never match this one.
    pub fn succeeding(mut self, previous: Generation) -> Self {
        self.generation = previous.next();
        self
    }

    /// Refresh the elapsed-time display. Never affects gameplay.
    pub fn tick(&self, now: Millis) -> Option<Transition> {
        if self.completed || self.levels.is_empty() {
            return None;
        }
        let mut next = self.clone();
        next.elapsed_ms = (now - self.start_ms).max(0.0);
        Some(Transition::quiet(next))
    }

    pub fn phase(&self) -> Phase {
        if self.levels.is_empty() {
            Phase::Loading
        } else if self.completed {
            Phase::Completed
        } else if self.ui.show_next_button && self.is_last_level() {
            Phase::Advancing
        } else if self.ui.show_next_button {
            Phase::LevelSolved
        } else {
            Phase::Playing
        }
    }

    /// Level on screen, if any.
    pub fn current(&self) -> Option<&ShuffledLevel> {
        self.levels.get(self.current_level)
    }

    pub fn levels(&self) -> &[ShuffledLevel] {
        &self.levels
    }

    pub fn total_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn current_level_index(&self) -> usize {
        self.current_level
    }

    /// One-based counter shown in the navbar.
    pub fn current_screen(&self) -> usize {
        self.current_screen
    }

    pub fn is_last_level(&self) -> bool {
        self.current_level + 1 >= self.levels.len()
    }

    pub fn has_next_level(&self) -> bool {
        self.current_level + 1 < self.levels.len()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn start_ms(&self) -> Millis {
        self.start_ms
    }

    pub fn elapsed_ms(&self) -> Millis {
        self.elapsed_ms
    }

    pub fn completion_ms(&self) -> Option<Millis> {
        self.completion_ms
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn ui(&self) -> &LevelUiState {
        &self.ui
    }

    /// Share of levels reached, `current_screen / total × 100`.
    pub fn progress_percentage(&self) -> f64 {
        if self.levels.is_empty() {
            0.0
        } else {
            self.current_screen as f64 / self.levels.len() as f64 * 100.0
        }
    }
}
