//! Chat between Timothee and his mum, revealed one line per "Next".

use tracing::{debug, info};

use crate::Outcome;
use crate::engine::{Handoff, Outbox};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    Boy,
    Mom,
}

impl Sender {
    pub fn display_name(self) -> &'static str {
        match self {
            Sender::Boy => "Timothee",
            Sender::Mom => "Mum",
        }
    }

    /// Avatar image shown next to the bubble.
    pub fn avatar_url(self) -> &'static str {
        match self {
            Sender::Boy => "https://i.imgur.com/KsYETC4.png",
            Sender::Mom => "https://i.imgur.com/XSf9CHN.png",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub content: &'static str,
}

const fn line(sender: Sender, content: &'static str) -> Message {
    Message { sender, content }
}

pub const MESSAGE_SCRIPT: &[Message] = &[
    line(Sender::Boy, "I'm having trouble with my group project."),
    line(Sender::Mom, "What's wrong?"),
    line(
        Sender::Boy,
        "I'd rather work alone. All of these different people don't work like I do. If I did it myself, I would have finished long ago.",
    ),
    line(
        Sender::Mom,
        "Well, collaboration is such an important life skill! It will be used in every part of your life— with your friends, your job, and even your partner!",
    ),
    line(Sender::Boy, "Hmmm."),
    line(
        Sender::Mom,
        "You like my cooking, don't you? Well, let me use it to show you why collaboration is important.",
    ),
    line(Sender::Mom, "Let's see some ingredients I have to begin."),
];

/// Reveals `script` in order. A requested line lands after `delay_ms`; once the
/// last line is on screen, `handoff_delay_ms` later the sequencer posts
/// [`Handoff::ChatFinished`] exactly once.
#[derive(Debug)]
pub struct MessageSequencer {
    script: &'static [Message],
    transcript: Vec<Message>,
    index: usize,
    reveal_at: Option<f64>,
    handoff_at: Option<f64>,
    handed_off: bool,
    delay_ms: f64,
    handoff_delay_ms: f64,
}

impl MessageSequencer {
    pub fn new(script: &'static [Message], delay_ms: f64, handoff_delay_ms: f64) -> Self {
        Self {
            script,
            transcript: Vec::with_capacity(script.len()),
            index: 0,
            reveal_at: None,
            handoff_at: None,
            handed_off: false,
            delay_ms,
            handoff_delay_ms,
        }
    }

    /// Show the first line immediately (the chat opens mid-conversation).
    pub fn seed_first(&mut self, now: f64) {
        if self.index == 0 && self.reveal_at.is_none() {
            self.reveal(now);
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn script_len(&self) -> usize {
        self.script.len()
    }

    /// Whether the "Next" button should be offered.
    pub fn can_request_next(&self) -> bool {
        self.index < self.script.len() && self.reveal_at.is_none()
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal_at.is_some()
    }

    pub fn next(&mut self, now: f64) -> Outcome {
        if !self.can_request_next() {
            debug!(index = self.index, "chat next ignored");
            return Outcome::Ignored;
        }
        self.reveal_at = Some(now + self.delay_ms);
        Outcome::Applied
    }

    pub fn tick(&mut self, now: f64, outbox: &mut Outbox) {
        if let Some(at) = self.reveal_at {
            if now >= at {
                self.reveal_at = None;
                self.reveal(at);
            }
        }
        if let Some(at) = self.handoff_at {
            if now >= at && !self.handed_off {
                self.handoff_at = None;
                self.handed_off = true;
                info!("chat finished");
                outbox.post(Handoff::ChatFinished);
            }
        }
    }

    fn reveal(&mut self, at: f64) {
        let Some(message) = self.script.get(self.index).copied() else {
            return;
        };
        self.transcript.push(message);
        self.index += 1;
        debug!(index = self.index, sender = message.sender.display_name(), "chat line shown");
        if self.index == self.script.len() {
            self.handoff_at = Some(at + self.handoff_delay_ms);
        }
    }

    /// Drop pending reveals and the pending hand-off.
    pub fn teardown(&mut self) {
        self.reveal_at = None;
        self.handoff_at = None;
    }
}
