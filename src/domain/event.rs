//! Collecting event: the date context under which an occurrence was collected

use serde::{Deserialize, Serialize};

/// Collecting event with date components derived from the event date.
///
/// `start_year`, `start_month` and `start_day` are taken from character
/// ranges `[0,4)`, `[5,7)` and `[8,10)` of the accumulated event date and are
/// only populated once the event date is long enough to contain them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectingEvent {
    event_date: String,
    pub verbatim_event_date: String,
    start_year: Option<String>,
    start_month: Option<String>,
    start_day: Option<String>,
}

impl CollectingEvent {
    /// Creates an empty collecting event
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw event date as written in the document
    pub fn event_date(&self) -> &str {
        &self.event_date
    }

    pub fn start_year(&self) -> Option<&str> {
        self.start_year.as_deref()
    }

    pub fn start_month(&self) -> Option<&str> {
        self.start_month.as_deref()
    }

    pub fn start_day(&self) -> Option<&str> {
        self.start_day.as_deref()
    }

    /// Appends event date text and re-derives the date components
    pub fn append_event_date(&mut self, text: &str) {
        self.event_date.push_str(text);
        if let Some(year) = self.event_date.get(0..4) {
            self.start_year = Some(year.to_string());
        }
        if let Some(month) = self.event_date.get(5..7) {
            self.start_month = Some(month.to_string());
        }
        if let Some(day) = self.event_date.get(8..10) {
            self.start_day = Some(day.to_string());
        }
    }

    /// Appends an explicit year unless the event date already supplied one
    pub fn append_year(&mut self, text: &str) {
        if self.event_date.get(0..4).is_none() {
            self.start_year.get_or_insert_with(String::new).push_str(text);
        }
    }

    /// Appends an explicit month unless the event date already supplied one
    pub fn append_month(&mut self, text: &str) {
        if self.event_date.get(5..7).is_none() {
            self.start_month.get_or_insert_with(String::new).push_str(text);
        }
    }

    /// Appends an explicit day unless the event date already supplied one
    pub fn append_day(&mut self, text: &str) {
        if self.event_date.get(8..10).is_none() {
            self.start_day.get_or_insert_with(String::new).push_str(text);
        }
    }

    /// Event date reduced to its date portion (first ten characters)
    pub fn date_portion(&self) -> String {
        truncate_chars(&self.event_date, 10)
    }
}

/// Returns at most `max` leading characters of `value`
pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}
