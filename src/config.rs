//! Story configuration: pacing constants and the two behaviors that are a
//! matter of taste rather than correctness.

#[cfg(feature = "serde_json")]
use crate::error::StoryResult;

/// Which intensity value the soup coach comments on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FeedbackTiming {
    /// Feedback reads the intensity from before the latest recompute, so the
    /// comment trails the meter by one update.
    #[default]
    Previous,
    /// Feedback reads the value just computed.
    Current,
}

/// Configuration for one story session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoryConfig {
    /// Duration of every two-panel slide.
    pub slide_ms: f64,
    /// Typing latency before a requested chat line appears.
    pub message_delay_ms: f64,
    /// Pause after the last chat line before the cutting board slides in.
    pub chat_handoff_delay_ms: f64,
    /// Pause between a correct quiz answer and the first explanation card.
    pub quiz_advance_delay_ms: f64,
    /// Starting value of the simmer countdown, in seconds.
    pub simmer_seconds: u32,
    /// Show the first chat line as soon as the chat scene is entered.
    pub seed_first_message: bool,
    pub feedback_timing: FeedbackTiming,
    /// `EnvFilter` directive for console logging.
    pub log_filter: String,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            slide_ms: 800.0,
            message_delay_ms: 300.0,
            chat_handoff_delay_ms: 1500.0,
            quiz_advance_delay_ms: 1000.0,
            simmer_seconds: 120,
            seed_first_message: false,
            feedback_timing: FeedbackTiming::Previous,
            log_filter: "info".to_string(),
        }
    }
}

impl StoryConfig {
    pub fn with_slide_ms(mut self, ms: f64) -> Self {
        self.slide_ms = ms.max(0.0);
        self
    }

    pub fn with_message_delay_ms(mut self, ms: f64) -> Self {
        self.message_delay_ms = ms.max(0.0);
        self
    }

    pub fn with_chat_handoff_delay_ms(mut self, ms: f64) -> Self {
        self.chat_handoff_delay_ms = ms.max(0.0);
        self
    }

    pub fn with_quiz_advance_delay_ms(mut self, ms: f64) -> Self {
        self.quiz_advance_delay_ms = ms.max(0.0);
        self
    }

    /// Set the simmer countdown start (clamped to 1-120 seconds).
    pub fn with_simmer_seconds(mut self, seconds: u32) -> Self {
        self.simmer_seconds = seconds.clamp(1, 120);
        self
    }

    pub fn with_seed_first_message(mut self, seed: bool) -> Self {
        self.seed_first_message = seed;
        self
    }

    pub fn with_feedback_timing(mut self, timing: FeedbackTiming) -> Self {
        self.feedback_timing = timing;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> StoryResult<Self> {
        let config: StoryConfig = serde_json::from_str(json)?;
        // Re-run through the builders so clamping applies to parsed values too.
        Ok(StoryConfig::default()
            .with_slide_ms(config.slide_ms)
            .with_message_delay_ms(config.message_delay_ms)
            .with_chat_handoff_delay_ms(config.chat_handoff_delay_ms)
            .with_quiz_advance_delay_ms(config.quiz_advance_delay_ms)
            .with_simmer_seconds(config.simmer_seconds)
            .with_seed_first_message(config.seed_first_message)
            .with_feedback_timing(config.feedback_timing)
            .with_log_filter(config.log_filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = StoryConfig::default();
        assert_eq!(cfg.slide_ms, 800.0);
        assert_eq!(cfg.message_delay_ms, 300.0);
        assert_eq!(cfg.chat_handoff_delay_ms, 1500.0);
        assert_eq!(cfg.quiz_advance_delay_ms, 1000.0);
        assert_eq!(cfg.simmer_seconds, 120);
        assert!(!cfg.seed_first_message);
        assert_eq!(cfg.feedback_timing, FeedbackTiming::Previous);
    }

    #[test]
    fn builder_methods() {
        let cfg = StoryConfig::default()
            .with_slide_ms(400.0)
            .with_seed_first_message(true)
            .with_feedback_timing(FeedbackTiming::Current)
            .with_log_filter("debug");
        assert_eq!(cfg.slide_ms, 400.0);
        assert!(cfg.seed_first_message);
        assert_eq!(cfg.feedback_timing, FeedbackTiming::Current);
        assert_eq!(cfg.log_filter, "debug");
    }

    #[test]
    fn simmer_seconds_clamped() {
        assert_eq!(StoryConfig::default().with_simmer_seconds(0).simmer_seconds, 1);
        assert_eq!(StoryConfig::default().with_simmer_seconds(999).simmer_seconds, 120);
    }

    #[test]
    fn negative_durations_clamped() {
        let cfg = StoryConfig::default().with_message_delay_ms(-5.0);
        assert_eq!(cfg.message_delay_ms, 0.0);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = StoryConfig::from_json(r#"{"slide_ms": 200, "feedback_timing": "current"}"#)
            .unwrap();
        assert_eq!(cfg.slide_ms, 200.0);
        assert_eq!(cfg.feedback_timing, FeedbackTiming::Current);
        assert_eq!(cfg.simmer_seconds, 120);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn malformed_json_is_an_error() {
        assert!(StoryConfig::from_json("{slide_ms").is_err());
    }
}
