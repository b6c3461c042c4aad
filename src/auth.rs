use crate::effects::Effects;
use crate::storage::Storage;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

pub const AUTH_KEY: &str = "running-crew-auth";
pub const DEFAULT_ACCESS_CODE: &str = "soso5";

pub const SUCCESS_DELAY: Duration = Duration::from_millis(2000);
pub const ERROR_FLASH: Duration = Duration::from_millis(1000);

const SUCCESS_PULSE: [u32; 1] = [50];
const ERROR_PULSE: [u32; 3] = [100, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAttempt {
    /// Caller finishes the login with [`AuthGate::complete_login`] after [`SUCCESS_DELAY`].
    Accepted,
    /// Caller clears the error with [`AuthGate::clear_error`] after [`ERROR_FLASH`].
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub logged_in: bool,
    pub login_error: bool,
    pub login_success: bool,
}

/// Shared passphrase in front of the whole app.
#[derive(Debug, Clone)]
pub struct AuthGate {
    access_code: String,
    input: String,
    logged_in: bool,
    login_error: bool,
    login_success: bool,
}

impl AuthGate {
    pub fn new(access_code: impl Into<String>) -> Self {
        Self {
            access_code: access_code.into(),
            input: String::new(),
            logged_in: false,
            login_error: false,
            login_success: false,
        }
    }

    pub fn status(&self) -> AuthStatus {
        AuthStatus {
            logged_in: self.logged_in,
            login_error: self.login_error,
            login_success: self.login_success,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn try_login(&mut self, input: &str, effects: &mut dyn Effects) -> LoginAttempt {
        self.input = input.to_string();
        if self.input == self.access_code {
            self.login_success = true;
            self.login_error = false;
            effects.vibrate(&SUCCESS_PULSE);
            LoginAttempt::Accepted
        } else {
            self.login_error = true;
            self.input.clear();
            effects.vibrate(&ERROR_PULSE);
            LoginAttempt::Rejected
        }
    }

    pub fn complete_login<F: FnOnce()>(&mut self, storage: &mut Storage, on_success: F) {
        storage.set_item(AUTH_KEY, Value::String(self.access_code.clone()));
        self.logged_in = true;
        info!("crew unlocked");
        on_success();
    }

    pub fn clear_error(&mut self) {
        self.login_error = false;
    }

    /// Restores the logged-in flag from a marker saved by an earlier session.
    pub fn check_auth(&mut self, storage: &Storage) -> bool {
        if storage.get_str(AUTH_KEY) == Some(self.access_code.as_str()) {
            self.logged_in = true;
        }
        self.logged_in
    }

    pub fn logout(&mut self, storage: &mut Storage) {
        storage.remove_item(AUTH_KEY);
        self.logged_in = false;
        self.login_success = false;
        self.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Feedback;

    #[test]
    fn wrong_code_flashes_error_and_clears_input() {
        let mut gate = AuthGate::new("soso5");
        let mut effects = Feedback::default();

        assert_eq!(gate.try_login("nope", &mut effects), LoginAttempt::Rejected);
        assert!(gate.status().login_error);
        assert_eq!(gate.input(), "");
        assert_eq!(effects.vibrations, vec![vec![100, 50, 100]]);

        gate.clear_error();
        assert!(!gate.status().login_error);
        assert!(!gate.status().logged_in);
    }

    #[test]
    fn right_code_unlocks_only_after_completion() {
        let mut gate = AuthGate::new("soso5");
        let mut storage = Storage::default();
        let mut effects = Feedback::default();

        assert_eq!(gate.try_login("soso5", &mut effects), LoginAttempt::Accepted);
        assert!(gate.status().login_success);
        assert!(!gate.status().logged_in);
        assert_eq!(storage.get_str(AUTH_KEY), None);
        assert_eq!(effects.vibrations, vec![vec![50]]);

        let mut called = false;
        gate.complete_login(&mut storage, || called = true);
        assert!(called);
        assert!(gate.status().logged_in);
        assert_eq!(storage.get_str(AUTH_KEY), Some("soso5"));
    }

    #[test]
    fn stored_marker_restores_session() {
        let mut storage = Storage::default();
        let mut gate = AuthGate::new("soso5");
        assert!(!gate.check_auth(&storage));

        storage.set_item(AUTH_KEY, Value::String("old-code".into()));
        assert!(!gate.check_auth(&storage));

        storage.set_item(AUTH_KEY, Value::String("soso5".into()));
        assert!(gate.check_auth(&storage));

        gate.logout(&mut storage);
        assert!(!gate.status().logged_in);
        assert!(!gate.check_auth(&storage));
    }
}
