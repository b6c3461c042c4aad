//! Shared race calendar with registration badges.

use crate::effects::Prompt;
use crate::errors::ScheduleError;
use crate::storage::Storage;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

pub const SCHEDULE_KEY: &str = "running-crew-schedules-v1";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub race_date: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub reg_end_date: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
}

/// Edit buffer behind the event form. `id` is unset until the event is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub race_date: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub reg_end_date: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
}

impl EventDraft {
    /// Empty form. The date inputs start at `now` because an empty one cannot be picked on some phones.
    pub fn blank_at(now: NaiveDateTime) -> Self {
        Self {
            race_date: now.format(INPUT_FORMAT).to_string(),
            reg_end_date: Some(now.date().format("%Y-%m-%d").to_string()),
            ..Self::default()
        }
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            id: Some(event.id),
            title: event.title.clone(),
            race_date: event.race_date.clone(),
            reg_end_date: event.reg_end_date.clone(),
            location: event.location.clone(),
            url: event.url.clone(),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Editor {
    pub mode: EditorMode,
    pub draft: EventDraft,
}

/// Status badge shown on an event card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Badge {
    Finished,
    RegistrationClosed,
    RegistrationOpen { days_left: i64 },
    RaceCountdown { days_until: i64 },
}

impl Badge {
    pub fn label(&self) -> String {
        match self {
            Badge::Finished => "Finished".to_string(),
            Badge::RegistrationClosed => "Registration closed".to_string(),
            Badge::RegistrationOpen { days_left } => format!("Registration D-{days_left}"),
            Badge::RaceCountdown { days_until } => format!("Race D-{days_until}"),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Badge::Finished => "finished",
            Badge::RegistrationClosed => "reg-closed",
            Badge::RegistrationOpen { .. } => "urgent",
            Badge::RaceCountdown { .. } => "upcoming",
        }
    }
}

/// Accepts the form's `YYYY-MM-DDTHH:MM`, with optional seconds, or a bare date.
pub fn parse_race_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| parse_date(text).map(|date| date.and_time(NaiveTime::MIN)))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Last second on which registration is still accepted.
fn registration_deadline(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

fn ceil_days(span: Duration) -> i64 {
    let ms = span.num_milliseconds();
    ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
}

pub fn badge_at(event: &Event, now: NaiveDateTime) -> Badge {
    let Some(race) = parse_race_date(&event.race_date) else {
        return Badge::Finished;
    };
    if now > race {
        return Badge::Finished;
    }

    if let Some(reg_end) = event.reg_end_date.as_deref().and_then(parse_date) {
        if now >= registration_deadline(reg_end) {
            return Badge::RegistrationClosed;
        }
        // Whole calendar days until the closing date; the closing day itself is D-0.
        let days_left = (reg_end - now.date()).num_days();
        return Badge::RegistrationOpen { days_left };
    }

    Badge::RaceCountdown {
        days_until: ceil_days(race - now),
    }
}

/// `25.10.25 (Sat) 09:00`
pub fn format_race_date(text: &str) -> String {
    match parse_race_date(text) {
        Some(date) => format!(
            "{:02}.{}.{} ({}) {:02}:{:02}",
            date.year() % 100,
            date.month(),
            date.day(),
            date.format("%a"),
            date.hour(),
            date.minute()
        ),
        None => String::new(),
    }
}

pub fn format_registration_date(text: Option<&str>) -> String {
    match text.and_then(parse_date) {
        Some(date) => format!("Registration opens {}.{}", date.month(), date.day()),
        None => "Registration date TBD".to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    events: Vec<Event>,
    editor: Option<Editor>,
}

impl Schedule {
    pub fn load(storage: &Storage) -> Self {
        Self {
            events: storage.get_list(SCHEDULE_KEY),
            editor: None,
        }
    }

    pub fn save(&self, storage: &mut Storage) -> Result<(), serde_json::Error> {
        storage.set_json(SCHEDULE_KEY, &self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn find(&self, id: i64) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut EventDraft> {
        self.editor.as_mut().map(|editor| &mut editor.draft)
    }

    pub fn open_editor(&mut self, existing: Option<&Event>, now: NaiveDateTime) -> &mut EventDraft {
        let editor = match existing {
            Some(event) => Editor {
                mode: EditorMode::Edit,
                draft: EventDraft::from(event),
            },
            None => Editor {
                mode: EditorMode::Create,
                draft: EventDraft::blank_at(now),
            },
        };
        &mut self.editor.insert(editor).draft
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Stores the edit buffer and closes the editor. Returns the stored event's id.
    pub fn save_editor(
        &mut self,
        now: NaiveDateTime,
        prompt: &mut dyn Prompt,
    ) -> Result<i64, ScheduleError> {
        let Some(editor) = self.editor.as_ref() else {
            return Err(ScheduleError::EditorClosed);
        };
        if let Err(err) = validate(&editor.draft) {
            prompt.alert(&err.to_string());
            return Err(err);
        }

        let draft = editor.draft.clone();
        let id = match (editor.mode, draft.id) {
            (EditorMode::Edit, Some(id)) => {
                if let Some(slot) = self.events.iter_mut().find(|event| event.id == id) {
                    *slot = into_event(draft, id);
                }
                id
            }
            _ => {
                let id = self.fresh_id(now);
                self.events.push(into_event(draft, id));
                id
            }
        };
        info!(id, "event saved");
        self.editor = None;
        Ok(id)
    }

    /// Removes the event in the edit buffer after confirmation.
    pub fn delete_editor(&mut self, prompt: &mut dyn Prompt) -> bool {
        let Some(id) = self.editor.as_ref().and_then(|editor| editor.draft.id) else {
            return false;
        };
        if !prompt.confirm("Delete this event?") {
            return false;
        }
        self.events.retain(|event| event.id != id);
        self.editor = None;
        info!(id, "event deleted");
        true
    }

    fn fresh_id(&self, now: NaiveDateTime) -> i64 {
        let stamp = now.and_utc().timestamp_millis();
        self.events
            .iter()
            .map(|event| event.id + 1)
            .max()
            .map_or(stamp, |next| next.max(stamp))
    }

    /// Upcoming races soonest first, then finished races most recent first.
    pub fn sorted_at(&self, now: NaiveDateTime) -> Vec<&Event> {
        let mut upcoming = Vec::new();
        let mut finished = Vec::new();
        let mut undated = Vec::new();
        for event in &self.events {
            match parse_race_date(&event.race_date) {
                Some(race) if race > now => upcoming.push((race, event)),
                Some(race) => finished.push((race, event)),
                None => undated.push(event),
            }
        }
        upcoming.sort_by(|a, b| a.0.cmp(&b.0));
        finished.sort_by(|a, b| b.0.cmp(&a.0));

        upcoming
            .into_iter()
            .chain(finished)
            .map(|(_, event)| event)
            .chain(undated)
            .collect()
    }
}

fn validate(draft: &EventDraft) -> Result<(), ScheduleError> {
    if draft.title.trim().is_empty() || draft.race_date.trim().is_empty() {
        return Err(ScheduleError::MissingTitleOrDate);
    }
    if parse_race_date(&draft.race_date).is_none() {
        return Err(ScheduleError::InvalidRaceDate(draft.race_date.clone()));
    }
    Ok(())
}

fn into_event(draft: EventDraft, id: i64) -> Event {
    Event {
        id,
        title: draft.title,
        race_date: draft.race_date,
        reg_end_date: draft.reg_end_date,
        location: draft.location,
        url: draft.url,
    }
}
