use crate::auth::AuthStatus;
use crate::effects::{Confetti, Feedback};
use crate::runners::{completion_rate, Runner};
use crate::schedule::{
    badge_at, format_race_date, format_registration_date, Badge, Event, EventDraft,
};
use crate::wheel::{slice_layout, Candidate, SliceLayout, Wheel, WheelPhase};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub accepted: bool,
    pub status: AuthStatus,
    pub feedback: Feedback,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddRunnerRequest {
    pub name: String,
    pub goal: f64,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    pub distance: f64,
}

#[derive(Debug, Serialize)]
pub struct RunnerView {
    #[serde(flatten)]
    pub runner: Runner,
    pub rate: String,
}

impl From<&Runner> for RunnerView {
    fn from(runner: &Runner) -> Self {
        Self {
            rate: completion_rate(runner.current, runner.goal),
            runner: runner.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub month_key: String,
    pub ranked: Vec<RunnerView>,
    pub completed: Vec<RunnerView>,
}

#[derive(Debug, Serialize)]
pub struct RunnerResponse {
    pub runner: RunnerView,
    pub feedback: Feedback,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpinRequest {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Serialize)]
pub struct WheelResponse {
    pub phase: WheelPhase,
    pub rotation: f64,
    pub winner: Option<String>,
    pub candidates: Vec<Candidate>,
    pub slices: Vec<SliceLayout>,
    pub celebration: Option<Confetti>,
}

impl WheelResponse {
    pub fn new(wheel: &Wheel, candidates: Vec<Candidate>) -> Self {
        Self {
            phase: wheel.phase(),
            rotation: wheel.rotation(),
            winner: wheel.winner().map(str::to_string),
            slices: slice_layout(candidates.len()),
            candidates,
            celebration: wheel.celebration(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub badge: Badge,
    pub badge_label: String,
    pub badge_class: &'static str,
    pub race_date_label: String,
    pub registration_label: String,
}

impl EventView {
    pub fn at(event: &Event, now: NaiveDateTime) -> Self {
        let badge = badge_at(event, now);
        Self {
            badge_label: badge.label(),
            badge_class: badge.css_class(),
            race_date_label: format_race_date(&event.race_date),
            registration_label: format_registration_date(event.reg_end_date.as_deref()),
            badge,
            event: event.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventSavedResponse {
    pub id: i64,
    pub feedback: Feedback,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub draft: EventDraft,
}
