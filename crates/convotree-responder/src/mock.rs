//! Offline responder with canned replies.

use convotree::{CompletionRequest, Responder, ResponderError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub const MOCK_RESPONSES: [&str; 10] = [
    "That's an interesting point. Can you elaborate further?",
    "I understand. Let me think about that for a moment.",
    "Your perspective is intriguing. Have you considered alternative viewpoints?",
    "That's a complex topic. There are several factors to consider.",
    "I see where you're coming from. Let's explore this idea further.",
    "Your question touches on some fundamental concepts. Let's break it down.",
    "That's a great observation. How do you think this relates to [topic]?",
    "I'm curious to hear more about your thoughts on this matter.",
    "Interesting point. In my analysis, there are pros and cons to consider.",
    "Your input is valuable. Let's dive deeper into this subject.",
];

/// Answers every request with one of [`MOCK_RESPONSES`], chosen at random.
#[derive(Debug)]
pub struct MockResponder {
    rng: Mutex<StdRng>,
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResponder {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Same seed, same sequence of replies.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Responder for MockResponder {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ResponderError> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let i = rng.random_range(0..MOCK_RESPONSES.len());
        tracing::debug!(messages = request.messages.len(), reply = i, "mock reply");
        Ok(MOCK_RESPONSES[i].to_string())
    }
}
