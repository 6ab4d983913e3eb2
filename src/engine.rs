//! The narrative engine: owns the scene router, the motion stage and every
//! screen controller, and routes hand-offs between them.
//!
//! Controllers never call each other. When one finishes it posts a
//! [`Handoff`] into the engine's [`Outbox`]; the engine drains the outbox on
//! every `tick` and starts whatever comes next (a scene slide, or a two-panel
//! slide between the recipe, quiz and soup panels). A controller that has
//! handed off is torn down, which drops its pending deadlines, but is kept
//! around so its last state can still be drawn while it slides away. The
//! incoming controller is built as its slide starts and mounted when it ends.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::Outcome;
use crate::chat::{MESSAGE_SCRIPT, MessageSequencer};
use crate::config::StoryConfig;
use crate::motion::{Pose, SlideTransition, Stage, Surface, Target};
use crate::quiz::{QUIZ_PANEL, QuizController};
use crate::recipe::{DROP_ZONE, Ingredient, RECIPE_PANEL, RecipeGame};
use crate::scene::{Scene, SceneRouter, Trigger};
use crate::soup::{HeatLevel, SOUP_PANEL, SoupSimulation};

/// Completion signal from a controller to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handoff {
    ChatFinished,
    RecipeFinished,
    QuizFinished,
}

#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<Handoff>,
}

impl Outbox {
    pub fn post(&mut self, handoff: Handoff) {
        self.queue.push_back(handoff);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Handoff> + '_ {
        self.queue.drain(..)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Which controller currently receives input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Title and intro cards; only scene triggers apply.
    Opening,
    Chat,
    Recipe,
    Quiz,
    Soup,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Chat => "chat",
            Phase::Recipe => "recipe",
            Phase::Quiz => "quiz",
            Phase::Soup => "soup",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PanelSlide {
    slide: SlideTransition,
    to: Phase,
}

pub struct NarrativeEngine {
    config: StoryConfig,
    router: SceneRouter,
    stage: Stage,
    outbox: Outbox,
    phase: Phase,
    chat: Option<MessageSequencer>,
    recipe: Option<RecipeGame>,
    quiz: Option<QuizController>,
    soup: Option<SoupSimulation>,
    panel_slide: Option<PanelSlide>,
}

impl NarrativeEngine {
    pub fn new(config: StoryConfig) -> Self {
        let router = SceneRouter::new(config.slide_ms);
        let mut engine = Self {
            config,
            router,
            stage: Stage::new(),
            outbox: Outbox::default(),
            phase: Phase::Opening,
            chat: None,
            recipe: None,
            quiz: None,
            soup: None,
            panel_slide: None,
        };
        engine.prepare();
        engine
    }

    fn prepare(&mut self) {
        self.router.prepare(&mut self.stage);
        self.stage.set(RECIPE_PANEL, Pose::default());
        self.stage.set(QUIZ_PANEL, Pose::offscreen_right());
        self.stage.set(SOUP_PANEL, Pose::offscreen_right());
        for ingredient in Ingredient::ALL {
            self.stage.set(ingredient.target(), Pose::default());
        }
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scene(&self) -> Scene {
        self.router.current()
    }

    pub fn router(&self) -> &SceneRouter {
        &self.router
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn chat(&self) -> Option<&MessageSequencer> {
        self.chat.as_ref()
    }

    pub fn recipe(&self) -> Option<&RecipeGame> {
        self.recipe.as_ref()
    }

    pub fn quiz(&self) -> Option<&QuizController> {
        self.quiz.as_ref()
    }

    pub fn soup(&self) -> Option<&SoupSimulation> {
        self.soup.as_ref()
    }

    pub fn is_panel_sliding(&self) -> bool {
        self.panel_slide.is_some()
    }

    /// "let's eat!" or an intro card's "Next". The chat hand-off is internal
    /// and cannot be triggered from outside.
    pub fn advance_scene(&mut self, trigger: Trigger, now: f64, surface: &dyn Surface) -> Outcome {
        if trigger == Trigger::ChatFinished {
            debug!("chat hand-off is not a user trigger");
            return Outcome::Ignored;
        }
        let outcome = self.router.advance(trigger, &mut self.stage, surface, now);
        if outcome.is_applied() {
            self.build_incoming_scene(now);
        }
        outcome
    }

    pub fn chat_next(&mut self, now: f64) -> Outcome {
        match (self.phase, self.chat.as_mut()) {
            (Phase::Chat, Some(chat)) => chat.next(now),
            _ => Outcome::Ignored,
        }
    }

    pub fn recipe_next(&mut self) -> Outcome {
        match (self.phase, self.recipe.as_mut()) {
            (Phase::Recipe, Some(recipe)) => recipe.next(&mut self.outbox),
            _ => Outcome::Ignored,
        }
    }

    /// A drag payload landed on the drop zone. When the surface can measure
    /// both the zone and the element, the element is snapped into place.
    pub fn drop_ingredient(
        &mut self,
        ingredient: Ingredient,
        now: f64,
        surface: &dyn Surface,
    ) -> Outcome {
        let (Phase::Recipe, Some(recipe)) = (self.phase, self.recipe.as_mut()) else {
            return Outcome::Ignored;
        };
        match (surface.measure(DROP_ZONE), surface.measure(ingredient.target())) {
            (Some(zone), Some(element)) => recipe.drop_with_snap(
                ingredient,
                zone,
                element,
                &mut self.stage,
                now,
                &mut self.outbox,
            ),
            _ => recipe.on_drop(ingredient, &mut self.outbox),
        }
    }

    pub fn select_quiz_option(&mut self, index: usize, now: f64) -> Outcome {
        match (self.phase, self.quiz.as_mut()) {
            (Phase::Quiz, Some(quiz)) => quiz.select_option(index, now),
            _ => Outcome::Ignored,
        }
    }

    pub fn explanation_next(&mut self, now: f64) -> Outcome {
        match (self.phase, self.quiz.as_mut()) {
            (Phase::Quiz, Some(quiz)) => quiz.advance(&mut self.stage, now, &mut self.outbox),
            _ => Outcome::Ignored,
        }
    }

    pub fn soup_next(&mut self, now: f64) -> Outcome {
        self.with_soup(|soup| soup.advance(now))
    }

    pub fn set_stirring_speed(&mut self, speed: i32) -> Outcome {
        self.with_soup(|soup| soup.set_stirring_speed(speed))
    }

    pub fn set_heat(&mut self, heat: HeatLevel) -> Outcome {
        self.with_soup(|soup| soup.set_heat(heat))
    }

    pub fn set_simmer_speed(&mut self, speed: i32, now: f64) -> Outcome {
        self.with_soup(|soup| soup.set_simmer_speed(speed, now))
    }

    fn with_soup(&mut self, f: impl FnOnce(&mut SoupSimulation) -> Outcome) -> Outcome {
        match (self.phase, self.soup.as_mut()) {
            (Phase::Soup, Some(soup)) => f(soup),
            _ => Outcome::Ignored,
        }
    }

    /// Advance the clock to `now`: scene motion, controller deadlines,
    /// hand-offs, panel slides, then fold finished tweens.
    pub fn tick(&mut self, now: f64, surface: &dyn Surface) {
        if let Some(scene) = self.router.tick(&mut self.stage, now) {
            self.on_scene_committed(scene, now);
        }

        match self.phase {
            Phase::Opening => {}
            Phase::Chat => {
                if let Some(chat) = self.chat.as_mut() {
                    chat.tick(now, &mut self.outbox);
                }
            }
            Phase::Recipe => {
                if let Some(recipe) = self.recipe.as_mut() {
                    let measure = |target: Target| surface.measure(target);
                    recipe.tick(&mut self.stage, now, &measure);
                }
            }
            Phase::Quiz => {
                if let Some(quiz) = self.quiz.as_mut() {
                    quiz.tick(&mut self.stage, now, &mut self.outbox);
                }
            }
            Phase::Soup => {
                if let Some(soup) = self.soup.as_mut() {
                    soup.tick(now);
                }
            }
        }

        let handoffs: Vec<Handoff> = self.outbox.drain().collect();
        for handoff in handoffs {
            self.on_handoff(handoff, now, surface);
        }

        if let Some(panel) = self.panel_slide {
            if panel.slide.is_done(&self.stage, now) {
                self.panel_slide = None;
                self.stage.set_display(panel.slide.outgoing, false, now);
                self.mount(panel.to, now);
            }
        }

        self.stage.settle(now);
    }

    fn on_scene_committed(&mut self, scene: Scene, now: f64) {
        match scene {
            Scene::Chat => self.mount(Phase::Chat, now),
            Scene::CuttingBoard => {
                if let Some(chat) = self.chat.as_mut() {
                    chat.teardown();
                }
                self.mount(Phase::Recipe, now);
            }
            Scene::Kitchen | Scene::Intro1 | Scene::Intro2 => {}
        }
    }

    fn on_handoff(&mut self, handoff: Handoff, now: f64, surface: &dyn Surface) {
        info!(?handoff, phase = self.phase.name(), "hand-off");
        match handoff {
            Handoff::ChatFinished => {
                let outcome =
                    self.router
                        .advance(Trigger::ChatFinished, &mut self.stage, surface, now);
                if outcome.is_applied() {
                    self.build_incoming_scene(now);
                } else {
                    debug!("chat hand-off did not move the scene");
                }
            }
            Handoff::RecipeFinished => {
                if let Some(recipe) = self.recipe.as_mut() {
                    recipe.teardown();
                }
                self.slide_panels(RECIPE_PANEL, QUIZ_PANEL, Phase::Quiz, now, surface);
            }
            Handoff::QuizFinished => {
                if let Some(quiz) = self.quiz.as_mut() {
                    quiz.teardown();
                }
                self.slide_panels(QUIZ_PANEL, SOUP_PANEL, Phase::Soup, now, surface);
            }
        }
    }

    /// Two-panel slide between controllers. Without both panels on screen the
    /// next controller is mounted straight away.
    fn slide_panels(
        &mut self,
        outgoing: Target,
        incoming: Target,
        to: Phase,
        now: f64,
        surface: &dyn Surface,
    ) {
        if !surface.has_handle(outgoing) || !surface.has_handle(incoming) {
            debug!(
                outgoing = outgoing.id(),
                incoming = incoming.id(),
                "panel missing, switching without a slide"
            );
            self.stage.set(outgoing, Pose::default().hidden());
            self.stage.set(incoming, Pose::default());
            self.mount(to, now);
            return;
        }
        let slide = SlideTransition::start(
            &mut self.stage,
            outgoing,
            incoming,
            now,
            self.config.slide_ms,
        );
        self.build(to, now);
        self.panel_slide = Some(PanelSlide { slide, to });
    }

    /// The controller behind a scene that has just started sliding in, so it
    /// is drawn in its initial state while the slide runs.
    fn build_incoming_scene(&mut self, now: f64) {
        match self.router.incoming() {
            Some(Scene::Chat) => self.build(Phase::Chat, now),
            Some(Scene::CuttingBoard) => self.build(Phase::Recipe, now),
            _ => {}
        }
    }

    /// Make `phase` the active one, building its controller unless it was
    /// already built when its slide started.
    fn mount(&mut self, phase: Phase, now: f64) {
        if !self.is_built(phase) {
            self.build(phase, now);
        }
        info!(phase = phase.name(), "controller mounted");
        self.phase = phase;
    }

    fn is_built(&self, phase: Phase) -> bool {
        match phase {
            Phase::Opening => true,
            Phase::Chat => self.chat.is_some(),
            Phase::Recipe => self.recipe.is_some(),
            Phase::Quiz => self.quiz.is_some(),
            Phase::Soup => self.soup.is_some(),
        }
    }

    /// Fresh controller for `phase`. Input stays gated on `self.phase`, so a
    /// controller built ahead of its slide ignores actions until mounted.
    fn build(&mut self, phase: Phase, now: f64) {
        debug!(phase = phase.name(), "controller built");
        match phase {
            Phase::Opening => {}
            Phase::Chat => {
                let mut chat = MessageSequencer::new(
                    MESSAGE_SCRIPT,
                    self.config.message_delay_ms,
                    self.config.chat_handoff_delay_ms,
                );
                if self.config.seed_first_message {
                    chat.seed_first(now);
                }
                self.chat = Some(chat);
            }
            Phase::Recipe => self.recipe = Some(RecipeGame::new()),
            Phase::Quiz => {
                self.quiz = Some(QuizController::new(self.config.quiz_advance_delay_ms));
            }
            Phase::Soup => {
                self.soup = Some(SoupSimulation::new(
                    self.config.simmer_seconds,
                    self.config.feedback_timing,
                ));
            }
        }
    }

    /// Back to the title scene with every controller discarded.
    pub fn reset(&mut self) {
        if let Some(chat) = self.chat.as_mut() {
            chat.teardown();
        }
        if let Some(recipe) = self.recipe.as_mut() {
            recipe.teardown();
        }
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.teardown();
        }
        if let Some(soup) = self.soup.as_mut() {
            soup.teardown();
        }
        self.chat = None;
        self.recipe = None;
        self.quiz = None;
        self.soup = None;
        self.panel_slide = None;
        self.phase = Phase::Opening;
        self.outbox.clear();
        self.stage.clear();
        self.router.reset(&mut self.stage);
        self.prepare();
        info!("story reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeState;
    use crate::scene::tests::FakeSurface;

    fn engine_at_chat() -> (NarrativeEngine, FakeSurface, f64) {
        let mut e = NarrativeEngine::new(StoryConfig::default());
        let s = FakeSurface::full();
        let mut t = 0.0;
        for trigger in [Trigger::LetsEat, Trigger::Next, Trigger::Next] {
            assert!(e.advance_scene(trigger, t, &s).is_applied());
            t += 5_000.0;
            e.tick(t, &s);
        }
        assert_eq!(e.scene(), Scene::Chat);
        (e, s, t)
    }

    #[test]
    fn actions_outside_their_phase_are_ignored() {
        let mut e = NarrativeEngine::new(StoryConfig::default());
        let s = FakeSurface::full();
        assert_eq!(e.phase(), Phase::Opening);
        assert_eq!(e.chat_next(0.0), Outcome::Ignored);
        assert_eq!(e.recipe_next(), Outcome::Ignored);
        assert_eq!(e.drop_ingredient(Ingredient::Eggs, 0.0, &s), Outcome::Ignored);
        assert_eq!(e.select_quiz_option(1, 0.0), Outcome::Ignored);
        assert_eq!(e.explanation_next(0.0), Outcome::Ignored);
        assert_eq!(e.soup_next(0.0), Outcome::Ignored);
        assert_eq!(e.set_heat(HeatLevel::High), Outcome::Ignored);
        assert_eq!(e.advance_scene(Trigger::ChatFinished, 0.0, &s), Outcome::Ignored);
    }

    #[test]
    fn chat_mounts_on_commit_and_hands_off() {
        let (mut e, s, mut t) = engine_at_chat();
        assert_eq!(e.phase(), Phase::Chat);
        for _ in 0..MESSAGE_SCRIPT.len() {
            assert!(e.chat_next(t).is_applied());
            t += 300.0;
            e.tick(t, &s);
        }
        t += 1_500.0;
        e.tick(t, &s);
        assert_eq!(e.router().incoming(), Some(Scene::CuttingBoard));
        t += 800.0;
        e.tick(t, &s);
        assert_eq!(e.scene(), Scene::CuttingBoard);
        assert_eq!(e.phase(), Phase::Recipe);
        assert_eq!(e.recipe().map(RecipeGame::state), Some(RecipeState::Initial));
    }

    #[test]
    fn seeded_chat_starts_with_a_line() {
        let mut e = NarrativeEngine::new(StoryConfig::default().with_seed_first_message(true));
        let s = FakeSurface::full();
        let mut t = 0.0;
        for trigger in [Trigger::LetsEat, Trigger::Next, Trigger::Next] {
            e.advance_scene(trigger, t, &s);
            t += 5_000.0;
            e.tick(t, &s);
        }
        assert_eq!(e.chat().map(|c| c.transcript().len()), Some(1));
    }

    #[test]
    fn missing_panels_switch_without_slide() {
        let mut e = NarrativeEngine::new(StoryConfig::default());
        let mut s = FakeSurface::full();
        s.missing.insert("quiz-panel");
        e.mount(Phase::Recipe, 0.0);
        e.outbox.post(Handoff::RecipeFinished);
        e.tick(10.0, &s);
        assert_eq!(e.phase(), Phase::Quiz);
        assert!(!e.is_panel_sliding());
    }

    #[test]
    fn panel_slide_mounts_after_completion() {
        let mut e = NarrativeEngine::new(StoryConfig::default());
        let s = FakeSurface::full();
        e.mount(Phase::Quiz, 0.0);
        e.outbox.post(Handoff::QuizFinished);
        e.tick(100.0, &s);
        assert!(e.is_panel_sliding());
        assert_eq!(e.phase(), Phase::Quiz);
        e.tick(899.0, &s);
        assert_eq!(e.phase(), Phase::Quiz);
        e.tick(900.0, &s);
        assert_eq!(e.phase(), Phase::Soup);
        assert!(!e.stage().pose(QUIZ_PANEL, 900.0).display);
        assert!(e.stage().pose(SOUP_PANEL, 900.0).display);
    }

    #[test]
    fn cutting_board_controller_exists_while_sliding_in() {
        let (mut e, s, mut t) = engine_at_chat();
        for _ in 0..MESSAGE_SCRIPT.len() {
            e.chat_next(t);
            t += 300.0;
            e.tick(t, &s);
        }
        t += 1_500.0;
        e.tick(t, &s);
        t += 400.0;
        e.tick(t, &s);
        assert!(e.router().is_transitioning());
        assert_eq!(e.phase(), Phase::Chat);
        assert_eq!(e.recipe().map(RecipeGame::state), Some(RecipeState::Initial));
        assert_eq!(e.recipe_next(), Outcome::Ignored);
        t += 400.0;
        e.tick(t, &s);
        assert_eq!(e.phase(), Phase::Recipe);
        assert!(e.recipe_next().is_applied());
    }

    #[test]
    fn incoming_panel_controller_exists_mid_slide() {
        let mut e = NarrativeEngine::new(StoryConfig::default());
        let s = FakeSurface::full();
        e.mount(Phase::Recipe, 0.0);
        e.outbox.post(Handoff::RecipeFinished);
        e.tick(100.0, &s);
        e.tick(500.0, &s);
        assert!(e.is_panel_sliding());
        assert_eq!(e.phase(), Phase::Recipe);
        let quiz = e.quiz().expect("quiz built when the slide starts");
        assert!(quiz.is_open());
        assert_eq!(e.select_quiz_option(1, 500.0), Outcome::Ignored);
        e.tick(900.0, &s);
        assert_eq!(e.phase(), Phase::Quiz);
        assert!(e.select_quiz_option(1, 900.0).is_applied());

        e.outbox.post(Handoff::QuizFinished);
        e.tick(1_000.0, &s);
        e.tick(1_400.0, &s);
        assert_eq!(e.phase(), Phase::Quiz);
        assert_eq!(e.soup().map(SoupSimulation::step), Some(crate::soup::SoupStep::Intro));
        assert_eq!(e.soup_next(1_400.0), Outcome::Ignored);
    }

    #[test]
    fn reset_returns_to_title() {
        let (mut e, _s, t) = engine_at_chat();
        e.chat_next(t);
        e.reset();
        assert_eq!(e.scene(), Scene::Kitchen);
        assert_eq!(e.phase(), Phase::Opening);
        assert!(e.chat().is_none());
        assert!(e.stage().pose(Scene::Kitchen.target(), 0.0).display);
        assert!(!e.stage().pose(Scene::Chat.target(), 0.0).display);
    }
}
