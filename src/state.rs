use crate::auth::AuthGate;
use crate::config::Config;
use crate::runners::RunnerTracker;
use crate::schedule::Schedule;
use crate::storage::Storage;
use crate::theme::Theme;
use crate::timers::PendingTask;
use crate::wheel::{Candidate, Wheel};
use chrono::NaiveDate;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Delayed actions still waiting to fire.
#[derive(Debug, Default)]
pub struct Timers {
    pub wheel_settle: PendingTask,
    pub login: PendingTask,
    pub error_flash: PendingTask,
}

/// Everything the crew app keeps, plus the storage document it is saved into.
#[derive(Debug)]
pub struct AppData {
    pub storage: Storage,
    pub auth: AuthGate,
    pub theme: Theme,
    pub runners: RunnerTracker,
    pub schedule: Schedule,
    pub wheel: Wheel,
    /// Candidates supplied with the last spin; `None` means this month's finishers.
    pub wheel_candidates: Option<Vec<Candidate>>,
    pub timers: Timers,
}

impl AppData {
    pub fn load(storage: Storage, access_code: &str, today: NaiveDate) -> Self {
        let mut auth = AuthGate::new(access_code);
        auth.check_auth(&storage);
        Self {
            auth,
            theme: Theme::load(&storage),
            runners: RunnerTracker::load(&storage, today),
            schedule: Schedule::load(&storage),
            wheel: Wheel::default(),
            wheel_candidates: None,
            timers: Timers::default(),
            storage,
        }
    }

    /// Moves the runner list to `today`'s month when the calendar has moved on.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        self.runners.roll_over(&self.storage, today)
    }

    /// Writes the in-memory lists back into the storage document.
    pub fn sync_storage(&mut self) -> Result<(), serde_json::Error> {
        self.runners.save(&mut self.storage)?;
        self.schedule.save(&mut self.storage)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(config: Config, data: AppData) -> Self {
        Self {
            config: Arc::new(config),
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub fn data_path(&self) -> &PathBuf {
        &self.config.data_path
    }
}
