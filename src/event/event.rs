//! Event instance fired through the bus

use crate::event::cancel::CancelToken;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Key/value data carried by an event
pub type EventData = HashMap<String, Value>;

/// A named event with a data bag, an abort flag and an optional
/// cancellation token.
///
/// The abort flag is reset at the start of every fire; a listener sets it
/// via [`Event::abort`] to stop the remaining chain. Aborting is silent
/// success to the caller, unlike returning an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Event {
    name: String,
    data: EventData,
    aborted: bool,
    #[serde(skip)]
    cancel: Option<CancelToken>,
}

impl Event {
    /// New event with an empty data bag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// New event carrying the given data bag.
    pub fn with_data(name: impl Into<String>, data: EventData) -> Self {
        Self {
            name: name.into(),
            data,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Look up a data value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set a data value, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Chainable variant of [`Event::set`] for building events.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Replace the whole data bag.
    pub fn set_data(&mut self, data: EventData) {
        self.data = data;
    }

    /// Set or clear the abort flag.
    pub fn abort(&mut self, aborted: bool) {
        self.aborted = aborted;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Attach a cancellation token consulted between listener invocations.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_bag_roundtrip() {
        let mut event = Event::new("db.user.add").with("id", 1001);
        event.set("nick", "inhere");

        assert_eq!(event.name(), "db.user.add");
        assert_eq!(event.get("id"), Some(&json!(1001)));
        assert_eq!(event.get("nick"), Some(&json!("inhere")));
        assert_eq!(event.get("missing"), None);
        assert_eq!(event.data().len(), 2);
    }

    #[test]
    fn test_abort_flag() {
        let mut event = Event::new("e1");
        assert!(!event.is_aborted());
        event.abort(true);
        assert!(event.is_aborted());
        event.abort(false);
        assert!(!event.is_aborted());
    }

    #[test]
    fn test_serializes_without_cancel_token() {
        let event = Event::new("db.user.add")
            .with("id", 7)
            .with_cancel_token(CancelToken::new());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["name"], json!("db.user.add"));
        assert_eq!(json["data"]["id"], json!(7));
        assert_eq!(json["aborted"], json!(false));
        assert!(json.get("cancel").is_none());
    }

    #[test]
    fn test_set_data_replaces_bag() {
        let mut event = Event::new("e1").with("a", 1);
        let mut replacement = EventData::new();
        replacement.insert("b".to_string(), json!(2));
        event.set_data(replacement);

        assert_eq!(event.get("a"), None);
        assert_eq!(event.get("b"), Some(&json!(2)));
    }
}
