use serde::Deserialize;
use serde_json::{Map, Value};

use super::activity::Activity;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripInfo {
    pub dates: TripDates,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inclusive trip window as ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TripDates {
    pub start: String,
    pub end: String,
}

impl TripDates {
    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

impl TripInfo {
    pub fn title(&self) -> Option<&str> {
        ["title", "name"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
    }
}

/// Body of `activities.json`. A missing or null list is rejected by the loader.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivitiesDocument {
    #[serde(default)]
    pub activities: Option<Vec<Activity>>,
}
