//! Scene routing: kitchen → intro1 → intro2 → chat → cutting board.
//!
//! Exactly one scene is current. A move to the successor plays two motions at
//! once (outgoing panel exits left, incoming enters from the right); the
//! current-scene flag flips when the outgoing motion finishes, and the router
//! refuses new requests until both motions are done.

use tracing::{debug, info};

use crate::Outcome;
use crate::motion::{At, Easing, Pose, SlideTransition, Stage, Surface, Target, Timeline};

pub const TITLE: &str = "collaboration 101 (through food!)";
pub const BYLINE: &str = "by nadim kassymov";
pub const INTRO1_TEXT: &str = "Today we're going to learn about the importance of collaboration and how different minds create the most innovative ideas!";
pub const INTRO2_TEXT: &str = "Let's begin with a boy named Timothee. He is doing a group project for high school and is not liking it. He would rather work alone..";

// Kitchen props animated by the "let's eat!" zoom.
pub const KITCHEN_TITLE: Target = Target("kitchen-title");
pub const CLICK_PROMPTS: Target = Target("click-prompts");
pub const COUNTERTOP: Target = Target("countertop");
pub const KNIFE: Target = Target("knife");
pub const VEGETABLE: Target = Target("vegetable");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scene {
    Kitchen,
    Intro1,
    Intro2,
    Chat,
    CuttingBoard,
}

/// User or controller signal that asks the router to leave a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The "let's eat!" button on the title scene.
    LetsEat,
    /// A "Next" button on an intro card.
    Next,
    /// Hand-off from the message sequencer after the last chat line.
    ChatFinished,
}

impl Scene {
    pub const ALL: [Scene; 5] = [
        Scene::Kitchen,
        Scene::Intro1,
        Scene::Intro2,
        Scene::Chat,
        Scene::CuttingBoard,
    ];

    pub fn next(self) -> Option<Scene> {
        match self {
            Scene::Kitchen => Some(Scene::Intro1),
            Scene::Intro1 => Some(Scene::Intro2),
            Scene::Intro2 => Some(Scene::Chat),
            Scene::Chat => Some(Scene::CuttingBoard),
            Scene::CuttingBoard => None,
        }
    }

    /// The only trigger that may move the router off this scene.
    pub fn exit_trigger(self) -> Option<Trigger> {
        match self {
            Scene::Kitchen => Some(Trigger::LetsEat),
            Scene::Intro1 | Scene::Intro2 => Some(Trigger::Next),
            Scene::Chat => Some(Trigger::ChatFinished),
            Scene::CuttingBoard => None,
        }
    }

    pub fn target(self) -> Target {
        match self {
            Scene::Kitchen => Target("scene-kitchen"),
            Scene::Intro1 => Target("scene-intro1"),
            Scene::Intro2 => Target("scene-intro2"),
            Scene::Chat => Target("scene-chat"),
            Scene::CuttingBoard => Target("scene-cutting-board"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scene::Kitchen => "kitchen",
            Scene::Intro1 => "intro1",
            Scene::Intro2 => "intro2",
            Scene::Chat => "chat",
            Scene::CuttingBoard => "cutting-board",
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Motion {
    /// Kitchen props zoom away before the slide.
    Preamble(Timeline),
    Sliding(SlideTransition),
}

#[derive(Clone, Copy, Debug)]
struct SceneTransition {
    from: Scene,
    to: Scene,
    motion: Motion,
    committed: bool,
}

#[derive(Debug)]
pub struct SceneRouter {
    current: Scene,
    transition: Option<SceneTransition>,
    slide_ms: f64,
}

impl SceneRouter {
    pub fn new(slide_ms: f64) -> Self {
        Self {
            current: Scene::Kitchen,
            transition: None,
            slide_ms,
        }
    }

    /// Initial poses: kitchen on screen, every other scene parked off-screen
    /// right so nothing flashes in before its slide.
    pub fn prepare(&self, stage: &mut Stage) {
        for scene in Scene::ALL {
            if scene == self.current {
                stage.set(scene.target(), Pose::default());
            } else {
                stage.set(scene.target(), Pose::offscreen_right());
            }
        }
        for prop in [KITCHEN_TITLE, CLICK_PROMPTS, COUNTERTOP, KNIFE, VEGETABLE] {
            stage.set(prop, Pose::default());
        }
    }

    pub fn current(&self) -> Scene {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Scene being moved to, while a transition is in flight.
    pub fn incoming(&self) -> Option<Scene> {
        self.transition.map(|t| t.to)
    }

    pub fn advance(
        &mut self,
        trigger: Trigger,
        stage: &mut Stage,
        surface: &dyn Surface,
        now: f64,
    ) -> Outcome {
        if self.transition.is_some() {
            debug!(?trigger, scene = self.current.name(), "transition in flight, ignoring");
            return Outcome::Ignored;
        }
        if self.current.exit_trigger() != Some(trigger) {
            debug!(?trigger, scene = self.current.name(), "trigger does not leave this scene");
            return Outcome::Ignored;
        }
        let Some(to) = self.current.next() else {
            return Outcome::Ignored;
        };
        let from = self.current;
        let mut required = vec![from.target(), to.target()];
        if from == Scene::Kitchen {
            required.push(COUNTERTOP);
        }
        if let Some(missing) = required.iter().find(|t| !surface.has_handle(**t)) {
            debug!(target_id = missing.id(), "missing handle, skipping transition");
            return Outcome::Ignored;
        }

        let motion = if from == Scene::Kitchen {
            Motion::Preamble(kitchen_zoom(stage, surface, now))
        } else {
            Motion::Sliding(SlideTransition::start(
                stage,
                from.target(),
                to.target(),
                now,
                self.slide_ms,
            ))
        };
        info!(from = from.name(), to = to.name(), "scene transition started");
        self.transition = Some(SceneTransition {
            from,
            to,
            motion,
            committed: false,
        });
        Outcome::Applied
    }

    /// Drive the in-flight transition. Returns the new scene on the tick its
    /// flag is committed.
    pub fn tick(&mut self, stage: &mut Stage, now: f64) -> Option<Scene> {
        let mut transition = self.transition?;
        let mut committed_now = None;

        if let Motion::Preamble(timeline) = transition.motion {
            if !timeline.is_done(now) {
                return None;
            }
            // Slide starts exactly when the zoom ends, even if this frame is late.
            transition.motion = Motion::Sliding(SlideTransition::start(
                stage,
                transition.from.target(),
                transition.to.target(),
                timeline.end_ms(),
                self.slide_ms,
            ));
        }

        if let Motion::Sliding(slide) = transition.motion {
            if !transition.committed && slide.outgoing_done(stage, now) {
                transition.committed = true;
                self.current = transition.to;
                stage.set_display(transition.from.target(), false, now);
                info!(scene = self.current.name(), "scene committed");
                committed_now = Some(transition.to);
            }
            if transition.committed && slide.is_done(stage, now) {
                self.transition = None;
                return committed_now;
            }
        }

        self.transition = Some(transition);
        committed_now
    }

    pub fn reset(&mut self, stage: &mut Stage) {
        self.current = Scene::Kitchen;
        self.transition = None;
        self.prepare(stage);
    }
}

/// Title fades up, prompts fade, the countertop rushes at the camera and the
/// knife and vegetable fly off a beat behind it.
fn kitchen_zoom(stage: &mut Stage, surface: &dyn Surface, now: f64) -> Timeline {
    let mut tl = Timeline::begin(now);
    tl.to(
        stage,
        KITCHEN_TITLE,
        Pose::default().with_opacity(0.0).with_offset_px(0.0, -20.0),
        At::Start(0.0),
        500.0,
        Easing::Power2In,
    );
    if surface.has_handle(CLICK_PROMPTS) {
        tl.to(
            stage,
            CLICK_PROMPTS,
            Pose::default().with_opacity(0.0),
            At::Start(0.0),
            300.0,
            Easing::Power2In,
        );
    }
    tl.to(
        stage,
        COUNTERTOP,
        Pose::default()
            .with_scale(2.0)
            .with_y_pct(-30.0)
            .with_blur(8.0)
            .with_opacity(0.0),
        At::Start(200.0),
        1200.0,
        Easing::Power3In,
    );
    if surface.has_handle(KNIFE) {
        tl.to(
            stage,
            KNIFE,
            Pose::default()
                .with_scale(1.5)
                .with_y_pct(-50.0)
                .with_rotation(-15.0)
                .with_blur(5.0)
                .with_opacity(0.0),
            At::Start(300.0),
            1000.0,
            Easing::Power2In,
        );
    }
    if surface.has_handle(VEGETABLE) {
        tl.to(
            stage,
            VEGETABLE,
            Pose::default()
                .with_scale(1.8)
                .with_y_pct(-40.0)
                .with_blur(6.0)
                .with_opacity(0.0),
            At::Start(250.0),
            1100.0,
            Easing::Power2In,
        );
    }
    tl
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::motion::Rect;
    use std::collections::HashSet;

    /// Surface with every handle present unless explicitly removed.
    pub(crate) struct FakeSurface {
        pub missing: HashSet<&'static str>,
    }

    impl FakeSurface {
        pub fn full() -> Self {
            Self {
                missing: HashSet::new(),
            }
        }
    }

    impl Surface for FakeSurface {
        fn has_handle(&self, target: Target) -> bool {
            !self.missing.contains(target.id())
        }

        fn measure(&self, _target: Target) -> Option<Rect> {
            None
        }
    }

    fn router() -> (SceneRouter, Stage) {
        let router = SceneRouter::new(800.0);
        let mut stage = Stage::new();
        router.prepare(&mut stage);
        (router, stage)
    }

    #[test]
    fn successors_are_fixed() {
        assert_eq!(Scene::Kitchen.next(), Some(Scene::Intro1));
        assert_eq!(Scene::Intro1.next(), Some(Scene::Intro2));
        assert_eq!(Scene::Intro2.next(), Some(Scene::Chat));
        assert_eq!(Scene::Chat.next(), Some(Scene::CuttingBoard));
        assert_eq!(Scene::CuttingBoard.next(), None);
    }

    #[test]
    fn kitchen_zoom_then_slide() {
        let (mut r, mut stage) = router();
        let s = FakeSurface::full();
        assert_eq!(r.advance(Trigger::LetsEat, &mut stage, &s, 0.0), Outcome::Applied);
        // zoom runs 1.4s, slide 0.8s
        assert_eq!(r.tick(&mut stage, 1_000.0), None);
        assert_eq!(r.current(), Scene::Kitchen);
        assert_eq!(r.tick(&mut stage, 1_400.0), None);
        assert_eq!(r.tick(&mut stage, 2_199.0), None);
        assert_eq!(r.tick(&mut stage, 2_200.0), Some(Scene::Intro1));
        assert_eq!(r.current(), Scene::Intro1);
        assert!(!r.is_transitioning());
        assert!(!stage.pose(Scene::Kitchen.target(), 2_200.0).display);
        assert!(stage.pose(Scene::Intro1.target(), 2_200.0).display);
    }

    #[test]
    fn late_frame_still_commits() {
        let (mut r, mut stage) = router();
        let s = FakeSurface::full();
        r.advance(Trigger::LetsEat, &mut stage, &s, 0.0);
        assert_eq!(r.tick(&mut stage, 10_000.0), Some(Scene::Intro1));
    }

    #[test]
    fn wrong_trigger_is_ignored() {
        let (mut r, mut stage) = router();
        let s = FakeSurface::full();
        assert_eq!(r.advance(Trigger::Next, &mut stage, &s, 0.0), Outcome::Ignored);
        assert_eq!(r.advance(Trigger::ChatFinished, &mut stage, &s, 0.0), Outcome::Ignored);
        assert!(!r.is_transitioning());
    }

    #[test]
    fn requests_during_transition_do_not_desync() {
        let (mut r, mut stage) = router();
        let s = FakeSurface::full();
        r.advance(Trigger::LetsEat, &mut stage, &s, 0.0);
        r.tick(&mut stage, 2_200.0);
        assert_eq!(r.advance(Trigger::Next, &mut stage, &s, 3_000.0), Outcome::Applied);
        // mashing Next mid-slide
        assert_eq!(r.advance(Trigger::Next, &mut stage, &s, 3_100.0), Outcome::Ignored);
        assert_eq!(r.current(), Scene::Intro1);
        assert_eq!(r.tick(&mut stage, 3_800.0), Some(Scene::Intro2));
        assert_eq!(r.current(), Scene::Intro2);
        assert_eq!(r.incoming(), None);
    }

    #[test]
    fn missing_handle_is_silent_noop() {
        let (mut r, mut stage) = router();
        let mut s = FakeSurface::full();
        s.missing.insert("scene-intro1");
        assert_eq!(r.advance(Trigger::LetsEat, &mut stage, &s, 0.0), Outcome::Ignored);
        assert_eq!(r.current(), Scene::Kitchen);
        assert!(!r.is_transitioning());
    }

    #[test]
    fn decorative_props_are_optional() {
        let (mut r, mut stage) = router();
        let mut s = FakeSurface::full();
        s.missing.insert("knife");
        s.missing.insert("vegetable");
        assert!(r.advance(Trigger::LetsEat, &mut stage, &s, 0.0).is_applied());
    }

    #[test]
    fn no_exit_from_cutting_board() {
        let mut r = SceneRouter::new(800.0);
        r.current = Scene::CuttingBoard;
        let mut stage = Stage::new();
        let s = FakeSurface::full();
        for trig in [Trigger::LetsEat, Trigger::Next, Trigger::ChatFinished] {
            assert_eq!(r.advance(trig, &mut stage, &s, 0.0), Outcome::Ignored);
        }
    }
}
