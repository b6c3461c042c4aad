//! User-facing side effects the tracker modules ask for: prompts, confetti and vibration.
//!
//! The modules only describe what should happen. Whoever drives them decides how a
//! confirmation is answered and where an alert or a confetti burst ends up.

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Confetti {
    pub particle_count: u32,
    pub spread: u32,
    pub origin_y: f64,
}

pub trait Prompt {
    /// Blocking yes/no question; `false` aborts the pending operation.
    fn confirm(&mut self, message: &str) -> bool;

    fn alert(&mut self, message: &str);
}

pub trait Effects {
    fn celebrate(&mut self, burst: Confetti);

    fn vibrate(&mut self, pattern: &[u32]);
}

/// Records everything asked of it so a response can hand it to the page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Feedback {
    #[serde(skip)]
    confirmed: bool,
    pub alerts: Vec<String>,
    pub confetti: Vec<Confetti>,
    pub vibrations: Vec<Vec<u32>>,
}

impl Feedback {
    /// `confirmed` is the answer given to every confirmation prompt.
    pub fn new(confirmed: bool) -> Self {
        Self {
            confirmed,
            ..Self::default()
        }
    }
}

impl Prompt for Feedback {
    fn confirm(&mut self, _message: &str) -> bool {
        self.confirmed
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

impl Effects for Feedback {
    fn celebrate(&mut self, burst: Confetti) {
        self.confetti.push(burst);
    }

    fn vibrate(&mut self, pattern: &[u32]) {
        self.vibrations.push(pattern.to_vec());
    }
}

/// Used by delayed tasks, which have no response to attach effects to.
#[derive(Debug, Default)]
pub struct TracingEffects;

impl Effects for TracingEffects {
    fn celebrate(&mut self, burst: Confetti) {
        info!(particles = burst.particle_count, spread = burst.spread, "celebration");
    }

    fn vibrate(&mut self, pattern: &[u32]) {
        info!(?pattern, "vibration");
    }
}
