//! Monthly distance challenge: members, their progress, streaks and the leaderboard.

use crate::effects::{Confetti, Effects, Prompt};
use crate::errors::RunnerError;
use crate::storage::Storage;
use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{info, warn};

const COMPLETION_BURST: Confetti = Confetti {
    particle_count: 150,
    spread: 60,
    origin_y: 0.6,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runner {
    pub id: i64,
    pub name: String,
    pub goal: f64,
    pub current: f64,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheers: Option<u32>,
}

impl Runner {
    /// Stand-in returned by lookups that miss.
    pub fn placeholder() -> Self {
        Self {
            id: 0,
            name: String::new(),
            goal: 0.0,
            current: 0.0,
            avatar: String::new(),
            completed_at: None,
            last_run_date: None,
            streak: None,
            cheers: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.goal
    }

    pub fn ratio(&self) -> f64 {
        if self.goal > 0.0 {
            self.current / self.goal
        } else {
            0.0
        }
    }
}

pub fn month_key(today: NaiveDate) -> String {
    format!("running-challenge-{}-{}", today.year(), today.month())
}

/// Percentage shown next to a runner, capped at 100.
pub fn completion_rate(current: f64, goal: f64) -> String {
    if goal.is_nan() || goal <= 0.0 {
        return "0".to_string();
    }
    let percent = (current / goal * 100.0).min(100.0).round();
    format!("{percent:.0}")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn rank_order(a: &Runner, b: &Runner) -> Ordering {
    match (a.is_complete(), b.is_complete()) {
        (true, true) => match (a.completed_at, b.completed_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => b.ratio().partial_cmp(&a.ratio()).unwrap_or(Ordering::Equal),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerTracker {
    storage_key: String,
    runners: Vec<Runner>,
}

impl RunnerTracker {
    pub fn load(storage: &Storage, today: NaiveDate) -> Self {
        let storage_key = month_key(today);
        let runners = storage.get_list(&storage_key);
        Self {
            storage_key,
            runners,
        }
    }

    pub fn save(&self, storage: &mut Storage) -> Result<(), serde_json::Error> {
        storage.set_json(self.storage_key.clone(), &self.runners)
    }

    /// Switches to `today`'s month if the loaded list belongs to an earlier one.
    pub fn roll_over(&mut self, storage: &Storage, today: NaiveDate) -> bool {
        if month_key(today) == self.storage_key {
            return false;
        }
        *self = Self::load(storage, today);
        info!(key = %self.storage_key, "started a new monthly challenge");
        true
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    pub fn add_member(
        &mut self,
        name: &str,
        goal: f64,
        avatar: &str,
        now: DateTime<Local>,
        prompt: &mut dyn Prompt,
    ) -> Result<&Runner, RunnerError> {
        if let Err(err) = self.check_new_member(name, goal) {
            prompt.alert(&err.to_string());
            return Err(err);
        }

        let stamp = now.timestamp_millis();
        let id = self
            .runners
            .iter()
            .map(|runner| runner.id + 1)
            .max()
            .map_or(stamp, |next| next.max(stamp));

        self.runners.push(Runner {
            id,
            name: name.trim().to_string(),
            goal,
            current: 0.0,
            avatar: avatar.to_string(),
            ..Runner::placeholder()
        });
        info!(id, name = name.trim(), goal, "runner added");
        Ok(&self.runners[self.runners.len() - 1])
    }

    fn check_new_member(&self, name: &str, goal: f64) -> Result<(), RunnerError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || !goal.is_finite() || goal <= 0.0 {
            return Err(RunnerError::MissingNameOrGoal);
        }
        let key = normalize_name(trimmed);
        if self
            .runners
            .iter()
            .any(|runner| normalize_name(&runner.name) == key)
        {
            return Err(RunnerError::DuplicateName(trimmed.to_string()));
        }
        Ok(())
    }

    /// Adds `delta` to a runner's distance. Returns false when nothing was logged.
    pub fn log_distance<U>(&mut self, id: i64, delta: f64, now: DateTime<Local>, ui: &mut U) -> bool
    where
        U: Effects + Prompt + ?Sized,
    {
        if delta == 0.0 || !delta.is_finite() {
            return false;
        }
        let Some(target) = self.runners.iter_mut().find(|runner| runner.id == id) else {
            return false;
        };

        // Storage serializes non-finite numbers as null, which would lose the whole list.
        let next = round2(target.current + delta);
        if !next.is_finite() {
            warn!(id, delta, "distance overflows, nothing logged");
            return false;
        }
        let previous = target.current;
        target.current = next.max(0.0);

        if delta > 0.0 {
            let today = now.date_naive();
            target.streak = next_streak(target.last_run_date.as_deref(), target.streak, today);
            target.last_run_date = Some(today.format("%Y-%m-%d").to_string());
        }

        if target.current >= target.goal {
            if target.completed_at.is_none() {
                target.completed_at = Some(now.timestamp_millis());
                if previous < target.goal {
                    info!(id, name = %target.name, "monthly goal completed");
                    ui.celebrate(COMPLETION_BURST);
                    ui.alert(&format!("Congratulations {}, goal complete!", target.name));
                }
            }
        } else {
            target.completed_at = None;
        }
        true
    }

    pub fn delete_member(&mut self, id: i64, prompt: &mut dyn Prompt) -> bool {
        if !prompt.confirm("Delete this runner? This cannot be undone.") {
            return false;
        }
        let before = self.runners.len();
        self.runners.retain(|runner| runner.id != id);
        self.runners.len() != before
    }

    pub fn get_runner(&self, id: i64) -> Runner {
        self.find(id).cloned().unwrap_or_else(Runner::placeholder)
    }

    pub fn find(&self, id: i64) -> Option<&Runner> {
        self.runners.iter().find(|runner| runner.id == id)
    }

    pub fn cheer(&mut self, id: i64) -> bool {
        match self.runners.iter_mut().find(|runner| runner.id == id) {
            Some(target) => {
                target.cheers = Some(target.cheers.unwrap_or(0) + 1);
                true
            }
            None => false,
        }
    }

    pub fn ranked(&self) -> Vec<&Runner> {
        let mut ranked: Vec<&Runner> = self.runners.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b));
        ranked
    }

    pub fn completed(&self) -> Vec<&Runner> {
        self.runners.iter().filter(|runner| runner.is_complete()).collect()
    }
}

fn next_streak(last_run: Option<&str>, streak: Option<u32>, today: NaiveDate) -> Option<u32> {
    let Some(last_run) = last_run else {
        return Some(1);
    };
    match NaiveDate::parse_from_str(last_run, "%Y-%m-%d") {
        Ok(last) if last == today => streak.or(Some(1)),
        Ok(last) if (today - last).num_days().abs() == 1 => Some(streak.unwrap_or(0) + 1),
        _ => Some(1),
    }
}
