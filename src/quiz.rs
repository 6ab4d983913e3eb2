//! Multiple-choice question followed by a linear run of explanation cards.

use tracing::{debug, info};

use crate::Outcome;
use crate::engine::{Handoff, Outbox};
use crate::motion::{At, Easing, Pose, Stage, Target, Timeline};

pub const QUIZ_OPTIONS: [&str; 3] = [
    "Eggs are an important ingredient!",
    "Social Identity theory",
    "Bread and eggs are good together",
];
pub const CORRECT_OPTION: usize = 1;

pub const QUIZ_PANEL: Target = Target("quiz-panel");
pub const QUIZ_CONTENT: Target = Target("quiz-content");
pub const COMBO_EGG: Target = Target("combo-egg");
pub const COMBO_MILK: Target = Target("combo-milk");
pub const COMBO_SCRAMBLED: Target = Target("combo-scrambled");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnswerMark {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplanationStep {
    Quiz,
    Theory,
    Impact,
    EggAlone,
    Combination,
    Exclusion,
    Final,
    Conclusion,
    Soup,
}

impl ExplanationStep {
    pub fn next(self) -> Option<ExplanationStep> {
        use ExplanationStep::*;
        match self {
            Theory => Some(Impact),
            Impact => Some(EggAlone),
            EggAlone => Some(Combination),
            Combination => Some(Exclusion),
            Exclusion => Some(Final),
            Final => Some(Conclusion),
            Conclusion => Some(Soup),
            // the question is left by answering it, soup is terminal
            Quiz | Soup => None,
        }
    }

    pub fn heading(self) -> Option<&'static str> {
        match self {
            ExplanationStep::Theory => Some("Social Identity Theory"),
            _ => None,
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            ExplanationStep::Theory => {
                "Social Identity Theory is a theory about how people, like us, are prone to categorizing others into 'in-groups' and 'out-groups,' ultimately leading to the exclusion and discrimination of groups that they do not relate to; in other words, undermining the importance of diversity."
            }
            ExplanationStep::Impact => {
                "It demonstrates the impact of incorporating different mindsets and viewpoints within collaboration to achieve creative and innovative solutions."
            }
            ExplanationStep::EggAlone => {
                "Like you just saw, the egg by itself was alright – not the tastiest thing I can make with them!"
            }
            ExplanationStep::Combination => {
                "However, when you put the egg and milk together, it makes for a nice scrambled egg! Your favorite! And adding more ingredients elevates it even more!"
            }
            ExplanationStep::Exclusion => {
                "If we excluded the other ingredients, we would have never known the yummy dishes we had the possibility of making!"
            }
            ExplanationStep::Final => {
                "Remember, a team diverse in this regard approaches goals through many different lenses, analyzing different routes to create well-rounded and thorough solutions. In critical times of change it increases adaptability, and in parallel, helps embrace creativity and innovation by reducing groupthink. Ultimately, a diverse team maximizes knowledge-sharing, providing an opportunity for teammates to grow and learn how to be better collaborators."
            }
            ExplanationStep::Conclusion => {
                "But you are right, it is not always easy to work in a group with many different ideas! Let me show you another example to better help explain this..."
            }
            ExplanationStep::Quiz | ExplanationStep::Soup => "",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExplanationStep::Quiz => "quiz",
            ExplanationStep::Theory => "theory",
            ExplanationStep::Impact => "impact",
            ExplanationStep::EggAlone => "egg-alone",
            ExplanationStep::Combination => "combination",
            ExplanationStep::Exclusion => "exclusion",
            ExplanationStep::Final => "final",
            ExplanationStep::Conclusion => "conclusion",
            ExplanationStep::Soup => "soup",
        }
    }
}

#[derive(Debug)]
pub struct QuizController {
    marks: [AnswerMark; 3],
    latest: AnswerMark,
    step: ExplanationStep,
    theory_at: Option<f64>,
    advance_delay_ms: f64,
    combination: Option<Timeline>,
    handed_off: bool,
}

impl QuizController {
    pub fn new(advance_delay_ms: f64) -> Self {
        Self {
            marks: [AnswerMark::Unanswered; 3],
            latest: AnswerMark::Unanswered,
            step: ExplanationStep::Quiz,
            theory_at: None,
            advance_delay_ms,
            combination: None,
            handed_off: false,
        }
    }

    pub fn step(&self) -> ExplanationStep {
        self.step
    }

    pub fn marks(&self) -> &[AnswerMark; 3] {
        &self.marks
    }

    pub fn mark(&self, index: usize) -> AnswerMark {
        self.marks.get(index).copied().unwrap_or_default()
    }

    /// An option stays clickable until it has been marked, and only while the
    /// question is still open.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.is_open() && self.mark(index) == AnswerMark::Unanswered
    }

    pub fn is_open(&self) -> bool {
        self.step == ExplanationStep::Quiz && !self.marks.contains(&AnswerMark::Correct)
    }

    pub fn feedback(&self) -> &'static str {
        match self.latest {
            AnswerMark::Unanswered => "Do you know what this demonstrates?",
            AnswerMark::Correct => "That's right!",
            AnswerMark::Incorrect => "So close, not that one!",
        }
    }

    pub fn combination(&self) -> Option<&Timeline> {
        self.combination.as_ref()
    }

    pub fn select_option(&mut self, index: usize, now: f64) -> Outcome {
        if index >= QUIZ_OPTIONS.len() || !self.is_enabled(index) {
            debug!(index, "quiz option ignored");
            return Outcome::Ignored;
        }
        if index == CORRECT_OPTION {
            self.marks[index] = AnswerMark::Correct;
            self.latest = AnswerMark::Correct;
            self.theory_at = Some(now + self.advance_delay_ms);
            info!(index, "quiz answered");
        } else {
            self.marks[index] = AnswerMark::Incorrect;
            self.latest = AnswerMark::Incorrect;
            debug!(index, "wrong quiz answer");
        }
        Outcome::Applied
    }

    /// "Next" on an explanation card.
    pub fn advance(&mut self, stage: &mut Stage, now: f64, outbox: &mut Outbox) -> Outcome {
        let Some(to) = self.step.next() else {
            debug!(step = self.step.name(), "explanation next ignored");
            return Outcome::Ignored;
        };
        self.enter(to, stage, now, outbox);
        Outcome::Applied
    }

    pub fn tick(&mut self, stage: &mut Stage, now: f64, outbox: &mut Outbox) {
        if let Some(at) = self.theory_at {
            if now >= at {
                self.theory_at = None;
                self.enter(ExplanationStep::Theory, stage, at, outbox);
            }
        }
        if self.combination.is_some_and(|tl| tl.is_done(now)) {
            self.combination = None;
        }
    }

    fn enter(&mut self, to: ExplanationStep, stage: &mut Stage, now: f64, outbox: &mut Outbox) {
        info!(from = self.step.name(), to = to.name(), "explanation step");
        self.step = to;
        match to {
            ExplanationStep::Soup => {
                if !self.handed_off {
                    self.handed_off = true;
                    outbox.post(Handoff::QuizFinished);
                }
            }
            _ => {
                stage.set(
                    QUIZ_CONTENT,
                    Pose::default().with_offset_px(0.0, 20.0).with_opacity(0.0),
                );
                stage.animate_to(QUIZ_CONTENT, Pose::default(), now, 600.0, Easing::BackOut);
            }
        }
        if to == ExplanationStep::Combination {
            self.combination = Some(play_combination(stage, now));
        }
    }

    pub fn teardown(&mut self) {
        self.theory_at = None;
        self.combination = None;
    }
}

/// Egg and milk slide together, fade, and a scrambled egg pops in their place.
fn play_combination(stage: &mut Stage, now: f64) -> Timeline {
    stage.set(COMBO_EGG, Pose::default());
    stage.set(COMBO_MILK, Pose::default());
    stage.set(COMBO_SCRAMBLED, Pose::default().with_scale(0.0).with_opacity(0.0));

    let mut tl = Timeline::begin(now);
    tl.to(
        stage,
        COMBO_EGG,
        Pose::default().with_offset_px(100.0, 0.0),
        At::Start(0.0),
        1500.0,
        Easing::Power2InOut,
    )
    .to(
        stage,
        COMBO_MILK,
        Pose::default().with_offset_px(-100.0, 0.0),
        At::Start(0.0),
        1500.0,
        Easing::Power2InOut,
    )
    .to(
        stage,
        COMBO_EGG,
        Pose::default().with_offset_px(100.0, 0.0).with_opacity(0.0),
        At::Previous(-200.0),
        300.0,
        Easing::Power2In,
    )
    .to(
        stage,
        COMBO_MILK,
        Pose::default().with_offset_px(-100.0, 0.0).with_opacity(0.0),
        At::Start(1300.0),
        300.0,
        Easing::Power2In,
    )
    .to(
        stage,
        COMBO_SCRAMBLED,
        Pose::default(),
        At::Previous(-100.0),
        500.0,
        Easing::BackOut,
    );
    tl
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> (QuizController, Stage, Outbox) {
        (QuizController::new(1000.0), Stage::new(), Outbox::default())
    }

    #[test]
    fn correct_answer_moves_to_theory_after_delay() {
        let (mut q, mut stage, mut out) = quiz();
        assert!(q.select_option(1, 0.0).is_applied());
        assert_eq!(q.feedback(), "That's right!");
        q.tick(&mut stage, 999.0, &mut out);
        assert_eq!(q.step(), ExplanationStep::Quiz);
        q.tick(&mut stage, 1000.0, &mut out);
        assert_eq!(q.step(), ExplanationStep::Theory);
    }

    #[test]
    fn wrong_answers_stay_disabled() {
        let (mut q, mut stage, mut out) = quiz();
        q.select_option(0, 0.0);
        assert_eq!(q.feedback(), "So close, not that one!");
        assert_eq!(q.select_option(0, 10.0), Outcome::Ignored);
        q.select_option(2, 20.0);
        q.select_option(1, 30.0);
        q.tick(&mut stage, 1030.0, &mut out);
        assert_eq!(q.step(), ExplanationStep::Theory);
        assert_eq!(
            q.marks(),
            &[AnswerMark::Incorrect, AnswerMark::Correct, AnswerMark::Incorrect]
        );
        assert!(!q.is_enabled(0));
        assert!(!q.is_enabled(2));
    }

    #[test]
    fn closed_after_correct_and_bounds_checked() {
        let (mut q, _, _) = quiz();
        assert_eq!(q.select_option(7, 0.0), Outcome::Ignored);
        q.select_option(1, 0.0);
        assert_eq!(q.select_option(0, 10.0), Outcome::Ignored);
        assert_eq!(q.mark(0), AnswerMark::Unanswered);
    }

    #[test]
    fn explanation_walks_to_soup_and_hands_off_once() {
        let (mut q, mut stage, mut out) = quiz();
        assert_eq!(q.advance(&mut stage, 0.0, &mut out), Outcome::Ignored);
        q.select_option(1, 0.0);
        q.tick(&mut stage, 1000.0, &mut out);
        let mut t = 1000.0;
        let mut seen = vec![q.step()];
        while q.advance(&mut stage, t, &mut out).is_applied() {
            t += 100.0;
            seen.push(q.step());
        }
        assert_eq!(
            seen.iter().map(|s| s.name()).collect::<Vec<_>>(),
            [
                "theory",
                "impact",
                "egg-alone",
                "combination",
                "exclusion",
                "final",
                "conclusion",
                "soup"
            ]
        );
        // a further next is a no-op
        assert_eq!(q.advance(&mut stage, t, &mut out), Outcome::Ignored);
        assert_eq!(out.drain().collect::<Vec<_>>(), vec![Handoff::QuizFinished]);
    }

    #[test]
    fn combination_timeline_shape() {
        let mut stage = Stage::new();
        let tl = play_combination(&mut stage, 0.0);
        assert_eq!(tl.end_ms(), 2000.0);
        assert_eq!(stage.pose(COMBO_SCRAMBLED, 1400.0).opacity, 0.0);
        assert_eq!(stage.pose(COMBO_EGG, 1600.0).opacity, 0.0);
        assert_eq!(stage.pose(COMBO_MILK, 1600.0).dx_px, -100.0);
        assert_eq!(stage.pose(COMBO_SCRAMBLED, 2000.0).scale, 1.0);
    }

    #[test]
    fn teardown_cancels_delayed_advance() {
        let (mut q, mut stage, mut out) = quiz();
        q.select_option(1, 0.0);
        q.teardown();
        q.tick(&mut stage, 5000.0, &mut out);
        assert_eq!(q.step(), ExplanationStep::Quiz);
    }
}
