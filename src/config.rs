use crate::auth::{DEFAULT_ACCESS_CODE, ERROR_FLASH, SUCCESS_DELAY};
use crate::wheel::SETTLE_DELAY;
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub access_code: String,
    pub settle_delay: Duration,
    pub login_delay: Duration,
    pub error_flash: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, std::io::Error> {
        Ok(Self {
            data_path: resolve_data_path()?,
            port: env_parse("PORT").unwrap_or(8080),
            access_code: env::var("APP_ACCESS_CODE")
                .ok()
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| DEFAULT_ACCESS_CODE.to_string()),
            settle_delay: env_millis("APP_SPIN_SETTLE_MS").unwrap_or(SETTLE_DELAY),
            login_delay: env_millis("APP_LOGIN_DELAY_MS").unwrap_or(SUCCESS_DELAY),
            error_flash: env_millis("APP_ERROR_FLASH_MS").unwrap_or(ERROR_FLASH),
        })
    }
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse::<T>().ok())
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_millis)
}
