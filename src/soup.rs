//! Soup simulation: three controls introduced one at a time, then together,
//! with a simmer countdown and an intensity meter.

use std::fmt;

use tracing::{debug, info};

use crate::Outcome;
use crate::config::FeedbackTiming;
use crate::motion::Target;

const IDEAL_STIRRING: f64 = 50.0;
const IDEAL_HEAT: f64 = 1.0;
const IDEAL_SIMMER_SECONDS: f64 = 60.0;

const STIRRING_WEIGHT: f64 = 0.4;
const HEAT_WEIGHT: f64 = 0.3;
const SIMMER_WEIGHT: f64 = 0.3;

pub const SPEED_MAX: u8 = 100;

pub const SOUP_PANEL: Target = Target("soup-panel");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoupStep {
    Intro,
    Stirring,
    Heat,
    Simmer,
    AllControls,
    Result,
}

impl SoupStep {
    pub fn next(self) -> Option<SoupStep> {
        match self {
            SoupStep::Intro => Some(SoupStep::Stirring),
            SoupStep::Stirring => Some(SoupStep::Heat),
            SoupStep::Heat => Some(SoupStep::Simmer),
            SoupStep::Simmer => Some(SoupStep::AllControls),
            // result is reached only by the countdown
            SoupStep::AllControls | SoupStep::Result => None,
        }
    }

    pub fn shows_stirring(self) -> bool {
        matches!(self, SoupStep::Stirring | SoupStep::AllControls)
    }

    pub fn shows_heat(self) -> bool {
        matches!(self, SoupStep::Heat | SoupStep::AllControls)
    }

    pub fn shows_simmer(self) -> bool {
        matches!(self, SoupStep::Simmer | SoupStep::AllControls)
    }

    pub fn shows_meter(self) -> bool {
        matches!(self, SoupStep::AllControls | SoupStep::Result)
    }

    fn counts_down(self) -> bool {
        matches!(self, SoupStep::Simmer | SoupStep::AllControls)
    }

    pub fn name(self) -> &'static str {
        match self {
            SoupStep::Intro => "intro",
            SoupStep::Stirring => "stirring",
            SoupStep::Heat => "heat",
            SoupStep::Simmer => "simmer",
            SoupStep::AllControls => "all-controls",
            SoupStep::Result => "result",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeatLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl HeatLevel {
    pub const ALL: [HeatLevel; 3] = [HeatLevel::Low, HeatLevel::Medium, HeatLevel::High];

    pub fn numeric(self) -> f64 {
        match self {
            HeatLevel::Low => 0.0,
            HeatLevel::Medium => 1.0,
            HeatLevel::High => 2.0,
        }
    }

    /// How high bubbles rise, relative to medium-ish boiling.
    pub fn bubble_lift(self) -> f64 {
        match self {
            HeatLevel::Low => 0.3,
            HeatLevel::Medium => 0.7,
            HeatLevel::High => 1.2,
        }
    }

    pub fn has_steam(self) -> bool {
        self != HeatLevel::Low
    }

    pub fn label(self) -> &'static str {
        match self {
            HeatLevel::Low => "Low",
            HeatLevel::Medium => "Medium",
            HeatLevel::High => "High",
        }
    }

    pub fn from_label(label: &str) -> Option<HeatLevel> {
        Self::ALL
            .into_iter()
            .find(|h| h.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Milliseconds between countdown ticks at `simmer_speed`; `None` means paused.
pub fn tick_interval_ms(simmer_speed: u8) -> Option<f64> {
    (simmer_speed > 0).then(|| 1000.0 / (f64::from(simmer_speed) / 25.0))
}

/// 100 is a perfect soup; every control's distance from its ideal costs points.
pub fn intensity(stirring_speed: u8, heat: HeatLevel, remaining_s: u32) -> f64 {
    let stirring = (f64::from(stirring_speed) - IDEAL_STIRRING).abs() / 50.0;
    let heat = (heat.numeric() - IDEAL_HEAT).abs() / 2.0;
    let simmer = (f64::from(remaining_s) - IDEAL_SIMMER_SECONDS).abs() / 120.0;
    let weighted = STIRRING_WEIGHT * stirring + HEAT_WEIGHT * heat + SIMMER_WEIGHT * simmer;
    (100.0 - weighted * 100.0).clamp(0.0, 100.0)
}

pub fn feedback_for(intensity: f64) -> &'static str {
    if intensity < 25.0 {
        "Too hot! The soup is burning!"
    } else if intensity > 75.0 {
        "Too cold! Turn up the heat a bit."
    } else {
        "Perfect! The soup is cooking nicely."
    }
}

/// `MM:SS`.
pub fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Seconds per spoon revolution: 5 s when idle, 1 s flat out.
pub fn spoon_period_s(stirring_speed: u8) -> f64 {
    5.0 - f64::from(stirring_speed) / 25.0
}

#[derive(Debug)]
pub struct SoupSimulation {
    step: SoupStep,
    stirring_speed: u8,
    heat: HeatLevel,
    remaining_s: u32,
    simmer_speed: u8,
    timer_running: bool,
    last_tick_at: Option<f64>,
    intensity: f64,
    feedback: &'static str,
    feedback_timing: FeedbackTiming,
}

impl SoupSimulation {
    pub fn new(simmer_seconds: u32, feedback_timing: FeedbackTiming) -> Self {
        Self {
            step: SoupStep::Intro,
            stirring_speed: 50,
            heat: HeatLevel::Medium,
            remaining_s: simmer_seconds,
            simmer_speed: 50,
            timer_running: false,
            last_tick_at: None,
            intensity: 50.0,
            feedback: "",
            feedback_timing,
        }
    }

    pub fn step(&self) -> SoupStep {
        self.step
    }

    pub fn stirring_speed(&self) -> u8 {
        self.stirring_speed
    }

    pub fn heat(&self) -> HeatLevel {
        self.heat
    }

    pub fn remaining_s(&self) -> u32 {
        self.remaining_s
    }

    pub fn simmer_speed(&self) -> u8 {
        self.simmer_speed
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn feedback(&self) -> &'static str {
        self.feedback
    }

    /// Jiggle amplitude for the floating vegetables, when they move at all.
    pub fn vegetable_jiggle_px(&self) -> Option<f64> {
        (self.step.shows_stirring() && self.stirring_speed > 10)
            .then(|| f64::from(self.stirring_speed) / 10.0)
    }

    pub fn spoon_spinning(&self) -> bool {
        self.step.shows_stirring()
    }

    pub fn speech(&self) -> &'static str {
        match self.step {
            SoupStep::Intro => "Time to test your skills! Let's begin with the spoon.",
            SoupStep::Stirring => {
                "The spoon is meant for stirring! We need all the ingredients to be well-mixed together. But be careful! Over-stirring or under-stirring will ruin your soup!"
            }
            SoupStep::Heat => {
                "Heat is important! This is where the real cooking happens. But remember, too much or too little heat will impact your soup!"
            }
            SoupStep::Simmer => {
                "Ah yes, the simmer! We need to ensure it cooks for the right amount of time. You can increase or decrease the simmer time, but remember, your decision will affect the soup's taste!"
            }
            SoupStep::AllControls => {
                "Try not to go over or under the threshold of the Intensity Meter!"
            }
            SoupStep::Result => self.feedback,
        }
    }

    pub fn advance(&mut self, now: f64) -> Outcome {
        let Some(to) = self.step.next() else {
            debug!(step = self.step.name(), "soup next ignored");
            return Outcome::Ignored;
        };
        info!(from = self.step.name(), to = to.name(), "soup step");
        self.step = to;
        if to == SoupStep::Simmer {
            self.timer_running = true;
            self.last_tick_at = Some(now);
        }
        self.refresh_meter();
        Outcome::Applied
    }

    pub fn set_stirring_speed(&mut self, speed: i32) -> Outcome {
        if !self.step.shows_stirring() {
            return Outcome::Ignored;
        }
        self.stirring_speed = clamp_speed(speed);
        self.refresh_meter();
        Outcome::Applied
    }

    pub fn set_heat(&mut self, heat: HeatLevel) -> Outcome {
        if !self.step.shows_heat() {
            return Outcome::Ignored;
        }
        self.heat = heat;
        self.refresh_meter();
        Outcome::Applied
    }

    /// Takes effect from the next tick; resuming from zero restarts the
    /// interval at `now`.
    pub fn set_simmer_speed(&mut self, speed: i32, now: f64) -> Outcome {
        if !self.step.shows_simmer() {
            return Outcome::Ignored;
        }
        let speed = clamp_speed(speed);
        if self.simmer_speed == 0 && speed > 0 && self.timer_running {
            self.last_tick_at = Some(now);
        }
        self.simmer_speed = speed;
        Outcome::Applied
    }

    /// Service every countdown tick due by `now`.
    pub fn tick(&mut self, now: f64) {
        if !self.timer_running || !self.step.counts_down() {
            return;
        }
        let Some(interval) = tick_interval_ms(self.simmer_speed) else {
            return;
        };
        let mut anchor = self.last_tick_at.unwrap_or(now);
        while now >= anchor + interval {
            anchor += interval;
            if self.remaining_s <= 1 {
                self.remaining_s = 0;
                self.timer_running = false;
                self.step = SoupStep::Result;
                info!("simmer finished");
                self.refresh_meter();
                break;
            }
            self.remaining_s -= 1;
            self.refresh_meter();
        }
        self.last_tick_at = Some(anchor);
    }

    fn refresh_meter(&mut self) {
        if !self.step.shows_meter() {
            return;
        }
        let previous = self.intensity;
        self.intensity = intensity(self.stirring_speed, self.heat, self.remaining_s);
        self.feedback = match self.feedback_timing {
            FeedbackTiming::Previous => feedback_for(previous),
            FeedbackTiming::Current => feedback_for(self.intensity),
        };
    }

    pub fn teardown(&mut self) {
        self.timer_running = false;
        self.last_tick_at = None;
    }
}

fn clamp_speed(speed: i32) -> u8 {
    // clamped into 0..=100 first, so the cast is lossless
    speed.clamp(0, i32::from(SPEED_MAX)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> SoupSimulation {
        SoupSimulation::new(120, FeedbackTiming::Previous)
    }

    fn sim_at(step: SoupStep, now: f64) -> SoupSimulation {
        let mut s = sim();
        while s.step() != step {
            assert!(s.advance(now).is_applied());
        }
        s
    }

    #[test]
    fn ideal_intensity_is_full() {
        assert_eq!(intensity(50, HeatLevel::Medium, 60), 100.0);
        assert_eq!(intensity(0, HeatLevel::High, 0), 100.0 - 100.0 * (0.4 + 0.15 + 0.15));
    }

    #[test]
    fn feedback_bands() {
        assert_eq!(feedback_for(10.0), "Too hot! The soup is burning!");
        assert_eq!(feedback_for(80.0), "Too cold! Turn up the heat a bit.");
        assert_eq!(feedback_for(25.0), "Perfect! The soup is cooking nicely.");
        assert_eq!(feedback_for(75.0), "Perfect! The soup is cooking nicely.");
    }

    #[test]
    fn interval_formula() {
        assert_eq!(tick_interval_ms(100), Some(250.0));
        assert_eq!(tick_interval_ms(50), Some(500.0));
        assert_eq!(tick_interval_ms(25), Some(1000.0));
        assert_eq!(tick_interval_ms(0), None);
    }

    #[test]
    fn formatting_and_spoon() {
        assert_eq!(format_remaining(120), "02:00");
        assert_eq!(format_remaining(61), "01:01");
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(spoon_period_s(0), 5.0);
        assert_eq!(spoon_period_s(100), 1.0);
    }

    #[test]
    fn steps_advance_in_order_and_stop() {
        let mut s = sim();
        let mut names = vec![s.step().name()];
        while s.advance(0.0).is_applied() {
            names.push(s.step().name());
        }
        assert_eq!(names, ["intro", "stirring", "heat", "simmer", "all-controls"]);
    }

    #[test]
    fn controls_only_when_visible() {
        let mut s = sim();
        assert_eq!(s.set_stirring_speed(80), Outcome::Ignored);
        s.advance(0.0);
        assert!(s.set_stirring_speed(180).is_applied());
        assert_eq!(s.stirring_speed(), 100);
        assert_eq!(s.set_heat(HeatLevel::High), Outcome::Ignored);
        s.advance(0.0);
        assert_eq!(s.set_stirring_speed(10), Outcome::Ignored);
        assert!(s.set_heat(HeatLevel::Low).is_applied());
        assert_eq!(s.set_simmer_speed(10, 0.0), Outcome::Ignored);
    }

    #[test]
    fn countdown_starts_at_simmer() {
        let mut s = sim_at(SoupStep::Heat, 0.0);
        s.tick(10_000.0);
        assert_eq!(s.remaining_s(), 120);
        s.advance(10_000.0);
        assert!(s.is_timer_running());
        s.tick(10_499.0);
        assert_eq!(s.remaining_s(), 120);
        s.tick(10_500.0);
        assert_eq!(s.remaining_s(), 119);
        // a late frame catches up on every overdue tick
        s.tick(12_000.0);
        assert_eq!(s.remaining_s(), 116);
    }

    #[test]
    fn faster_simmer_counts_down_faster() {
        let mut fast = sim_at(SoupStep::Simmer, 0.0);
        let mut slow = sim_at(SoupStep::Simmer, 0.0);
        fast.set_simmer_speed(100, 0.0);
        slow.set_simmer_speed(25, 0.0);
        fast.tick(5_000.0);
        slow.tick(5_000.0);
        assert_eq!(fast.remaining_s(), 100);
        assert_eq!(slow.remaining_s(), 115);
    }

    #[test]
    fn zero_speed_pauses_and_resume_reanchors() {
        let mut s = sim_at(SoupStep::Simmer, 0.0);
        s.set_simmer_speed(0, 0.0);
        s.tick(60_000.0);
        assert_eq!(s.remaining_s(), 120);
        s.set_simmer_speed(100, 60_000.0);
        s.tick(60_249.0);
        assert_eq!(s.remaining_s(), 120);
        s.tick(60_250.0);
        assert_eq!(s.remaining_s(), 119);
    }

    #[test]
    fn countdown_reaches_result() {
        let mut s = SoupSimulation::new(3, FeedbackTiming::Current);
        while s.step() != SoupStep::Simmer {
            s.advance(0.0);
        }
        s.set_simmer_speed(100, 0.0);
        s.tick(10_000.0);
        assert_eq!(s.step(), SoupStep::Result);
        assert_eq!(s.remaining_s(), 0);
        assert!(!s.is_timer_running());
        // stir 50, medium, remaining 0 → 100 - 30 * 60/120
        assert!((s.intensity() - 85.0).abs() < 1e-9);
        assert_eq!(s.speech(), "Too cold! Turn up the heat a bit.");
        assert_eq!(s.advance(10_000.0), Outcome::Ignored);
    }

    #[test]
    fn meter_only_from_all_controls() {
        let mut s = sim_at(SoupStep::Simmer, 0.0);
        s.tick(500.0);
        assert_eq!(s.intensity(), 50.0);
        assert_eq!(s.feedback(), "");
        s.advance(500.0);
        // 119 s left: 100 - 30 * 59/120
        assert_eq!(s.intensity(), intensity(50, HeatLevel::Medium, 119));
    }

    #[test]
    fn previous_timing_lags_one_update() {
        let mut s = sim_at(SoupStep::AllControls, 0.0);
        // first update reads the initial 50
        assert_eq!(s.feedback(), "Perfect! The soup is cooking nicely.");
        s.set_stirring_speed(50);
        assert!(s.intensity() > 75.0);
        assert_eq!(s.feedback(), "Too cold! Turn up the heat a bit.");

        let mut c = SoupSimulation::new(120, FeedbackTiming::Current);
        while c.step() != SoupStep::AllControls {
            c.advance(0.0);
        }
        assert_eq!(c.feedback(), feedback_for(c.intensity()));
    }

    #[test]
    fn teardown_stops_countdown() {
        let mut s = sim_at(SoupStep::Simmer, 0.0);
        s.teardown();
        s.tick(100_000.0);
        assert_eq!(s.remaining_s(), 120);
    }

    #[test]
    fn heat_labels() {
        assert_eq!(HeatLevel::from_label("high"), Some(HeatLevel::High));
        assert_eq!(HeatLevel::from_label("boiling"), None);
        assert_eq!(HeatLevel::Low.to_string(), "Low");
        assert!(!HeatLevel::Low.has_steam());
    }
}
