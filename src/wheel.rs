//! Prize wheel: picks one candidate at random and reports where the wheel must stop.

use crate::effects::{Confetti, Effects};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::info;

pub const SETTLE_DELAY: Duration = Duration::from_millis(3000);

/// Whole turns the wheel makes before stopping on the winner.
const BASE_ROTATION: f64 = 1800.0;

const LANDING_BURST: Confetti = Confetti {
    particle_count: 200,
    spread: 100,
    origin_y: 0.6,
};

const PALETTE: [&str; 12] = [
    "#FFD700", "#FF9F43", "#FF6B6B", "#FECA57", "#48DBFB", "#1DD1A1", "#5f27cd", "#54a0ff",
    "#00d2d3", "#ff9ff3", "#feca57", "#fab1a0",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl Candidate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelPhase {
    #[default]
    Idle,
    Spinning,
    Landed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceLayout {
    pub start: f64,
    pub end: f64,
    pub label_rotation: f64,
    pub color: &'static str,
}

pub fn slice_angle(count: usize) -> f64 {
    360.0 / count as f64
}

pub fn slice_layout(count: usize) -> Vec<SliceLayout> {
    if count == 0 {
        return Vec::new();
    }
    let angle = slice_angle(count);
    (0..count)
        .map(|index| {
            let start = index as f64 * angle;
            SliceLayout {
                start,
                end: start + angle,
                label_rotation: start + angle / 2.0,
                color: PALETTE[index % PALETTE.len()],
            }
        })
        .collect()
}

/// Rotation that brings the centre of slice `index` under the pointer at the top.
pub fn target_rotation(index: usize, count: usize) -> f64 {
    let angle = slice_angle(count);
    let center = index as f64 * angle + angle / 2.0;
    BASE_ROTATION + (360.0 - center)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinPlan {
    pub ticket: u64,
    pub index: usize,
    pub winner: String,
    pub rotation: f64,
}

#[derive(Debug, Default)]
pub struct Wheel {
    phase: WheelPhase,
    rotation: f64,
    winner: Option<String>,
    pending: Option<String>,
    ticket: u64,
    celebration: Option<Confetti>,
}

impl Wheel {
    pub fn phase(&self) -> WheelPhase {
        self.phase
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Burst fired by the last landing, kept until the next spin or reset.
    pub fn celebration(&self) -> Option<Confetti> {
        self.celebration
    }

    pub fn is_spinning(&self) -> bool {
        self.phase == WheelPhase::Spinning
    }

    /// Starts a spin. The caller settles it with the returned ticket after [`SETTLE_DELAY`].
    pub fn spin<R: Rng + ?Sized>(
        &mut self,
        candidates: &[Candidate],
        rng: &mut R,
    ) -> Option<SpinPlan> {
        if candidates.is_empty() || self.is_spinning() {
            return None;
        }

        let index = rng.gen_range(0..candidates.len());
        let winner = candidates[index].name.clone();
        self.ticket += 1;
        self.phase = WheelPhase::Spinning;
        self.winner = None;
        self.celebration = None;
        self.rotation = target_rotation(index, candidates.len());
        self.pending = Some(winner.clone());

        Some(SpinPlan {
            ticket: self.ticket,
            index,
            winner,
            rotation: self.rotation,
        })
    }

    pub fn settle(&mut self, ticket: u64, effects: &mut dyn Effects) -> Option<&str> {
        if !self.is_spinning() || ticket != self.ticket {
            return None;
        }
        self.phase = WheelPhase::Landed;
        self.winner = self.pending.take();
        if let Some(winner) = &self.winner {
            info!(winner = %winner, "wheel landed");
        }
        self.celebration = Some(LANDING_BURST);
        effects.celebrate(LANDING_BURST);
        self.winner.as_deref()
    }

    pub fn reset(&mut self) {
        self.phase = WheelPhase::Idle;
        self.rotation = 0.0;
        self.winner = None;
        self.pending = None;
        self.celebration = None;
    }
}
