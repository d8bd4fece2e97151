//! Browser host for the game: mounts the DOM, turns clicks and timers into
//! session transitions, carries out their effects and re-renders.
//!
//! State lives in a thread-local `GameController`. All input funnels through
//! [`dispatch`], which borrows the controller once per event; timer and frame
//! callbacks only ever run from the JS event loop, so there is no re-entrant
//! borrow.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, Event, HtmlCanvasElement, window};

use crate::audio::{self, Cue};
use crate::config::GameConfig;
use crate::confetti::Confetti;
use crate::error::{GameError, Result};
use crate::level::{ImageRef, LevelDefinition};
use crate::session::{Delayed, Effect, GameSession, Generation, Millis, Transition};
use crate::view::{LevelView, NavbarView, ScreenView, SummaryView};

const STYLE_ID: &str = "sm-style";

const DEFAULT_CSS: &str = r#"
.sm-stage { position: relative; max-width: 960px; margin: 0 auto; font-family: sans-serif; }
.navbar { display: flex; justify-content: space-between; padding: 0.6rem 1rem; background: #263238; color: #fff; border-radius: 0 0 8px 8px; }
.progress-bar { height: 10px; background: #e0e0e0; border-radius: 5px; margin: 1vh 0; overflow: hidden; }
.progress-fill { height: 100%; background: #43aa8b; transition: width 0.4s ease; }
.transparent-box { display: flex; align-items: center; gap: 0.8rem; padding: 1rem; background: rgba(255,255,255,0.75); border-radius: 8px; }
.sentence { font-size: 1.4rem; text-align: center; width: 100%; }
.audio-icon { font-size: 1.6rem; background: none; border: none; cursor: pointer; }
.feedback-message { text-align: center; font-size: 1.1rem; margin-bottom: 0.5vh; }
.image-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 1rem; margin-top: 1vh; }
.image-tile { padding: 6px; border: 2px solid transparent; border-radius: 8px; background: transparent; cursor: pointer; }
.image-tile img { width: 100%; display: block; border-radius: 6px; pointer-events: none; }
.correct-blink { animation: sm-blink-correct 0.5s ease-in-out 4; border-color: #2e7d32; }
.incorrect-blink { animation: sm-blink-incorrect 0.5s ease-in-out 4; border-color: #c62828; }
@keyframes sm-blink-correct { 50% { background: rgba(46,125,50,0.45); } }
@keyframes sm-blink-incorrect { 50% { background: rgba(198,40,40,0.45); } }
.next-row { text-align: center; margin-top: 1vh; }
.next-button, .play-again-button { font-size: 1.1rem; padding: 0.5rem 1.6rem; border-radius: 6px; border: none; background: #577590; color: #fff; cursor: pointer; }
.summary-screen { text-align: center; padding: 3rem 1rem; }
.summary-heading { font-family: fantasy; }
.sm-confetti { position: fixed; inset: 0; pointer-events: none; z-index: 50; }
"#;

thread_local! {
    static CONTROLLER: RefCell<Option<GameController>> = RefCell::new(None);
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Player and timer events.
#[derive(Clone, Debug)]
enum Input {
    Choice { image: ImageRef, position: usize },
    Next,
    PlayAgain,
    Audio,
    Tick,
    Timer(Delayed),
}

/// Repeating elapsed-time tick; the interval is cleared on drop.
struct Clock {
    handle: i32,
    _tick: Closure<dyn FnMut()>,
}

impl Clock {
    fn start(interval_ms: u32) -> Result<Self> {
        let tick = Closure::wrap(Box::new(|| dispatch(Input::Tick)) as Box<dyn FnMut()>);
        let handle = win()?.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            interval_ms.min(i32::MAX as u32) as i32,
        )?;
        Ok(Self {
            handle,
            _tick: tick,
        })
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        if let Some(w) = window() {
            w.clear_interval_with_handle(self.handle);
        }
    }
}

struct NavDom {
    attempts: Element,
    clock: Element,
    screen: Element,
}

struct LevelDom {
    progress: Element,
    feedback: Element,
    tiles: Vec<Element>,
    next: Element,
}

/// What is currently built inside the stage.
enum Mounted {
    Loading(NavDom),
    Level(Generation, NavDom, LevelDom),
    Summary,
}

pub struct GameController {
    config: GameConfig,
    session: GameSession,
    rng: StdRng,
    doc: Document,
    root: Element,
    stage: Element,
    canvas: HtmlCanvasElement,
    canvas_ctx: CanvasRenderingContext2d,
    mounted: Option<Mounted>,
    clock: Option<Clock>,
    confetti: Option<Confetti>,
    last_frame_ms: Option<f64>,
    animating: bool,
}

/// Mount the game into the page, replacing any running instance.
pub fn mount(definitions: Vec<LevelDefinition>, config: GameConfig) -> Result<()> {
    let doc = win()?
        .document()
        .ok_or_else(|| GameError::Dom("no document".into()))?;
    install_stylesheet(&doc)?;

    let root = match doc.get_element_by_id(&config.root_element_id) {
        Some(el) => el,
        None => {
            let el = doc.create_element("div")?;
            el.set_id(&config.root_element_id);
            doc.body()
                .ok_or_else(|| GameError::Dom("no body".into()))?
                .append_child(&el)?;
            el
        }
    };
    root.set_inner_html("");
    let stage = element(&doc, "div", "sm-stage")?;
    let canvas: HtmlCanvasElement = element(&doc, "canvas", "sm-confetti")?
        .dyn_into()
        .map_err(|_| GameError::Dom("canvas element is not a canvas".into()))?;
    root.append_child(&stage)?;
    root.append_child(&canvas)?;
    let canvas_ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| GameError::Dom("no 2d context".into()))?
        .dyn_into()
        .map_err(|_| GameError::Dom("unexpected 2d context type".into()))?;

    if root.get_attribute("data-sm-bound").is_none() {
        bind_clicks(&root)?;
        root.set_attribute("data-sm-bound", "1")?;
    }

    let previous = CONTROLLER.with(|cell| cell.borrow_mut().take());
    // A running rAF loop keeps polling whichever controller is current.
    let animating = previous.as_ref().is_some_and(|prev| prev.animating);
    if let Some(prev) = previous.as_ref().filter(|prev| prev.root != root) {
        prev.root.set_inner_html("");
    }
    let mut rng = StdRng::from_entropy();
    let Transition {
        mut session,
        effects,
    } = GameSession::start(definitions, &mut rng, now_ms());
    if let Some(prev) = &previous {
        session = session.succeeding(prev.session.generation());
    }
    drop(previous);

    let mut ctrl = GameController {
        config,
        session,
        rng,
        doc,
        root,
        stage,
        canvas,
        canvas_ctx,
        mounted: None,
        clock: None,
        confetti: None,
        last_frame_ms: None,
        animating,
    };
    for effect in effects {
        ctrl.run(effect)?;
    }
    ctrl.render()?;
    CONTROLLER.with(|cell| cell.replace(Some(ctrl)));
    Ok(())
}

/// Route one event to the mounted controller, if any.
fn dispatch(input: Input) {
    CONTROLLER.with(|cell| {
        if let Some(ctrl) = cell.borrow_mut().as_mut() {
            if let Err(err) = ctrl.handle(input) {
                tracing::error!(%err, "event handling failed");
            }
        }
    });
}

impl GameController {
    fn handle(&mut self, input: Input) -> Result<()> {
        let now = now_ms();
        let transition = match input {
            Input::Choice { image, position } => self.session.submit_choice(&image, position, now),
            Input::Next => self.session.advance_level(),
            Input::PlayAgain => Some(self.session.play_again(&mut self.rng, now)),
            Input::Tick => self.session.tick(now),
            Input::Timer(delayed) => self.session.apply(delayed),
            Input::Audio => {
                self.play_audio();
                None
            }
        };
        let Some(Transition { session, effects }) = transition else {
            return Ok(());
        };
        self.session = session;
        for effect in effects {
            self.run(effect)?;
        }
        self.render()
    }

    fn run(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::Schedule(delayed) => schedule(self.config.feedback_delay_ms, delayed),
            Effect::Celebrate => self.celebrate(),
            Effect::StopClock => {
                self.clock = None;
                Ok(())
            }
            Effect::RestartClock => {
                self.clock = None;
                self.clock = Some(Clock::start(self.config.tick_interval_ms)?);
                Ok(())
            }
        }
    }

    fn play_audio(&self) {
        let Some(level) = self.session.current() else {
            return;
        };
        let clip = level.audio.as_deref().map(|a| self.config.asset_url(a));
        audio::play(&Cue::for_level(&level.sentence, clip.as_deref()), &self.config);
    }

    // --- Rendering ----------------------------------------------------------

    fn render(&mut self) -> Result<()> {
        if self.session.is_completed() || !self.session.ui().show_confetti {
            self.confetti = None;
        }
        let view = ScreenView::from_session(&self.session, &self.config);
        let needs_build = match (&self.mounted, &view) {
            (Some(Mounted::Loading(_)), ScreenView::Loading(_)) => false,
            (Some(Mounted::Summary), ScreenView::Summary(_)) => false,
            (Some(Mounted::Level(generation, ..)), ScreenView::Level(..)) => {
                *generation != self.session.generation()
            }
            _ => true,
        };
        if needs_build {
            self.stage.set_inner_html("");
            self.mounted = Some(match &view {
                ScreenView::Loading(_) => Mounted::Loading(self.build_navbar()?),
                ScreenView::Level(_, level) => {
                    let nav = self.build_navbar()?;
                    let dom = self.build_level(level)?;
                    Mounted::Level(self.session.generation(), nav, dom)
                }
                ScreenView::Summary(summary) => {
                    self.build_summary(summary)?;
                    Mounted::Summary
                }
            });
        }
        match (&self.mounted, &view) {
            (Some(Mounted::Loading(nav)), ScreenView::Loading(nav_view)) => patch_navbar(nav, nav_view),
            (Some(Mounted::Level(_, nav, dom)), ScreenView::Level(nav_view, level)) => {
                patch_navbar(nav, nav_view);
                patch_level(dom, level)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn build_navbar(&self) -> Result<NavDom> {
        let nav = element(&self.doc, "nav", "navbar")?;
        let attempts = element(&self.doc, "span", "nav-attempts")?;
        let clock = element(&self.doc, "span", "nav-clock")?;
        let screen = element(&self.doc, "span", "nav-screen")?;
        nav.append_child(&attempts)?;
        nav.append_child(&clock)?;
        nav.append_child(&screen)?;
        self.stage.append_child(&nav)?;
        Ok(NavDom {
            attempts,
            clock,
            screen,
        })
    }

    fn build_level(&self, view: &LevelView) -> Result<LevelDom> {
        let doc = &self.doc;

        let bar = element(doc, "div", "progress-bar")?;
        let progress = element(doc, "div", "progress-fill")?;
        bar.append_child(&progress)?;
        self.stage.append_child(&bar)?;

        let sentence_box = element(doc, "div", "transparent-box")?;
        let speaker = element(doc, "button", "audio-icon")?;
        speaker.set_attribute("data-action", "audio")?;
        speaker.set_attribute("aria-label", "Listen to the sentence")?;
        speaker.set_text_content(Some("\u{1F50A}"));
        let sentence = element(doc, "div", "sentence")?;
        sentence.set_text_content(Some(&view.sentence));
        sentence_box.append_child(&speaker)?;
        sentence_box.append_child(&sentence)?;
        self.stage.append_child(&sentence_box)?;

        let feedback = element(doc, "div", "feedback-message")?;
        self.stage.append_child(&feedback)?;

        let grid = element(doc, "div", "image-grid")?;
        grid.set_attribute("data-screen", &view.screen)?;
        let mut tiles = Vec::with_capacity(view.tiles.len());
        for tile in &view.tiles {
            let button = element(doc, "button", "image-tile")?;
            button.set_attribute("data-action", "choice")?;
            button.set_attribute("data-position", &tile.position.to_string())?;
            button.set_attribute("data-image", tile.image.as_str())?;
            let img = doc.create_element("img")?;
            img.set_attribute("src", &tile.src)?;
            img.set_attribute("alt", &format!("Choice {}", tile.position + 1))?;
            button.append_child(&img)?;
            grid.append_child(&button)?;
            tiles.push(button);
        }
        self.stage.append_child(&grid)?;

        let row = element(doc, "div", "next-row")?;
        let next = element(doc, "button", "next-button")?;
        next.set_attribute("data-action", "next")?;
        next.set_text_content(Some("Next"));
        row.append_child(&next)?;
        self.stage.append_child(&row)?;

        Ok(LevelDom {
            progress,
            feedback,
            tiles,
            next,
        })
    }

    fn build_summary(&self, view: &SummaryView) -> Result<()> {
        let doc = &self.doc;
        let screen = element(doc, "div", "summary-screen")?;
        let heading = element(doc, "h1", "summary-heading")?;
        heading.set_text_content(Some(&view.title));
        screen.append_child(&heading)?;
        for line in ["CONGRATULATIONS...!!", "YOU HAVE COMPLETED THE GAME"] {
            let h = doc.create_element("h3")?;
            h.set_text_content(Some(line));
            screen.append_child(&h)?;
        }
        let details = element(doc, "div", "summary-details")?;
        let attempts = doc.create_element("p")?;
        attempts.set_text_content(Some(&format!("Total Attempts: {}", view.attempts)));
        let time = doc.create_element("p")?;
        time.set_text_content(Some(&format!("Time Taken: {} minutes", view.time_taken)));
        details.append_child(&attempts)?;
        details.append_child(&time)?;
        screen.append_child(&details)?;
        let again = element(doc, "button", "play-again-button")?;
        again.set_attribute("data-action", "play-again")?;
        again.set_text_content(Some("Play Again"));
        screen.append_child(&again)?;
        self.stage.append_child(&screen)?;
        Ok(())
    }

    // --- Confetti -----------------------------------------------------------

    fn celebrate(&mut self) -> Result<()> {
        let w = win()?;
        let width = w.inner_width()?.as_f64().unwrap_or(800.0);
        let height = w.inner_height()?.as_f64().unwrap_or(600.0);
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.confetti = Some(Confetti::burst(
            self.config.confetti_particles,
            width,
            height,
            &mut self.rng,
        ));
        if !self.animating {
            self.animating = true;
            self.last_frame_ms = None;
            start_confetti_loop();
        }
        Ok(())
    }

    /// Advance and paint one frame; false once the burst is over.
    fn confetti_frame(&mut self, ts: f64) -> bool {
        let dt = self.last_frame_ms.map_or(16.0, |last| ts - last);
        self.last_frame_ms = Some(ts);
        let running = match self.confetti.as_mut() {
            Some(burst) if !burst.is_finished() => {
                burst.step(dt);
                match burst.paint(&self.canvas_ctx) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(%err, "confetti paint failed");
                        false
                    }
                }
            }
            _ => false,
        };
        if !running {
            self.confetti = None;
            self.canvas_ctx.clear_rect(
                0.0,
                0.0,
                self.canvas.width() as f64,
                self.canvas.height() as f64,
            );
            self.animating = false;
        }
        running
    }
}

fn patch_navbar(dom: &NavDom, view: &NavbarView) {
    dom.attempts
        .set_text_content(Some(&format!("Attempts: {}", view.attempts)));
    dom.clock.set_text_content(Some(&format!("Time: {}", view.clock)));
    dom.screen.set_text_content(Some(&view.screen_label));
}

fn patch_level(dom: &LevelDom, view: &LevelView) -> Result<()> {
    dom.progress
        .set_attribute("style", &format!("width:{:.1}%", view.progress_percentage))?;
    match view.feedback {
        Some((text, color)) => {
            dom.feedback.set_text_content(Some(text));
            dom.feedback.set_attribute("style", &format!("color:{color}"))?;
            dom.feedback.toggle_attribute_with_force("hidden", false)?;
        }
        None => {
            dom.feedback.set_text_content(None);
            dom.feedback.toggle_attribute_with_force("hidden", true)?;
        }
    }
    for (el, tile) in dom.tiles.iter().zip(&view.tiles) {
        let class = match tile.class {
            Some(highlight) => format!("image-tile {highlight}"),
            None => "image-tile".to_string(),
        };
        if el.class_name() != class {
            el.set_class_name(&class);
        }
    }
    dom.next.toggle_attribute_with_force("hidden", !view.show_next)?;
    Ok(())
}

/// One delegated click listener on the root; targets carry `data-action`.
fn bind_clicks(root: &Element) -> Result<()> {
    let bound = root.clone();
    let closure = Closure::wrap(Box::new(move |evt: Event| {
        let current = CONTROLLER.with(|cell| {
            cell.borrow()
                .as_ref()
                .is_some_and(|ctrl| ctrl.root == bound)
        });
        if !current {
            return;
        }
        let Some(target) = evt.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(el)) = target.closest("[data-action]") else {
            return;
        };
        let input = match el.get_attribute("data-action").as_deref() {
            Some("choice") => {
                let image = el.get_attribute("data-image");
                let position = el
                    .get_attribute("data-position")
                    .and_then(|p| p.parse::<usize>().ok());
                match (image, position) {
                    (Some(image), Some(position)) => Input::Choice {
                        image: ImageRef::new(image),
                        position,
                    },
                    _ => return,
                }
            }
            Some("next") => Input::Next,
            Some("play-again") => Input::PlayAgain,
            Some("audio") => Input::Audio,
            _ => return,
        };
        dispatch(input);
    }) as Box<dyn FnMut(_)>);
    root.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// One-shot timer feeding `delayed` back through [`dispatch`].
fn schedule(delay_ms: u32, delayed: Delayed) -> Result<()> {
    let callback = Closure::once_into_js(move || dispatch(Input::Timer(delayed)));
    win()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms.min(i32::MAX as u32) as i32,
    )?;
    Ok(())
}

fn start_confetti_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let running = CONTROLLER.with(|cell| {
            cell.borrow_mut()
                .as_mut()
                .is_some_and(|ctrl| ctrl.confetti_frame(ts))
        });
        if !running {
            // Release the self-reference so the closure is freed.
            f.borrow_mut().take();
            return;
        }
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn install_stylesheet(doc: &Document) -> Result<()> {
    if doc.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = doc.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(DEFAULT_CSS));
    doc.head()
        .ok_or_else(|| GameError::Dom("no head".into()))?
        .append_child(&style)?;
    Ok(())
}

fn element(doc: &Document, tag: &str, class: &str) -> Result<Element> {
    let el = doc.create_element(tag)?;
    el.set_class_name(class);
    Ok(el)
}

fn win() -> Result<web_sys::Window> {
    window().ok_or_else(|| GameError::Dom("no window".into()))
}

fn now_ms() -> Millis {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Snapshot of the mounted session, for embedding pages and tests.
pub fn with_session<T>(f: impl FnOnce(&GameSession) -> T) -> Option<T> {
    CONTROLLER.with(|cell| cell.borrow().as_ref().map(|ctrl| f(&ctrl.session)))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn animating() -> bool {
        CONTROLLER.with(|cell| cell.borrow().as_ref().is_some_and(|ctrl| ctrl.animating))
    }

    #[wasm_bindgen_test]
    fn remount_keeps_track_of_a_running_confetti_loop() {
        let config = GameConfig {
            root_element_id: "sm-confetti-remount".into(),
            ..GameConfig::default()
        };
        let levels = crate::level::builtin_levels().unwrap();
        mount(levels.clone(), config.clone()).unwrap();

        let (image, position) = with_session(|s| {
            let level = s.current().unwrap();
            let pos = level.images.iter().position(|i| level.is_correct(i)).unwrap();
            (level.images[pos].clone(), pos)
        })
        .unwrap();
        dispatch(Input::Choice { image, position });
        assert!(animating());

        mount(levels, config).unwrap();
        assert!(animating());
    }
}
