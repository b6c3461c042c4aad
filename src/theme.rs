use crate::storage::Storage;
use serde::Serialize;
use serde_json::Value;

pub const THEME_KEY: &str = "running-crew-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn load(storage: &Storage) -> Self {
        match storage.get_str(THEME_KEY) {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggle(&mut self, storage: &mut Storage) {
        *self = match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        storage.set_item(THEME_KEY, Value::String(self.as_str().to_string()));
    }
}
