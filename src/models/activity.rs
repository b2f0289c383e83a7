use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Activity {
    pub date: String,
    pub order: f64,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    /// Looks up one of the free-form display fields as text.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<String> {
        self.text_field("title").or_else(|| self.text_field("name"))
    }
}
