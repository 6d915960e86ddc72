use serde::{Deserialize, Serialize};

/// Watch event type, as tagged by the remote server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchEventType {
    Added,
    Modified,
    Deleted,
    Error,
}

/// One change event received from a live subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent<T> {
    /// Type of watch event (ADDED, MODIFIED, DELETED, ERROR)
    #[serde(rename = "type")]
    pub event_type: WatchEventType,
    /// The full item payload at the time of the event
    pub object: T,
}

impl<T> WatchEvent<T> {
    pub fn new(event_type: WatchEventType, object: T) -> Self {
        Self { event_type, object }
    }

    pub fn added(object: T) -> Self {
        Self::new(WatchEventType::Added, object)
    }

    pub fn modified(object: T) -> Self {
        Self::new(WatchEventType::Modified, object)
    }

    pub fn deleted(object: T) -> Self {
        Self::new(WatchEventType::Deleted, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&WatchEventType::Added).unwrap(),
            "\"ADDED\""
        );
        let parsed: WatchEventType = serde_json::from_str("\"DELETED\"").unwrap();
        assert_eq!(parsed, WatchEventType::Deleted);
    }

    #[test]
    fn test_watch_event_serde_roundtrip() {
        let event = WatchEvent::added(json!({"metadata": {"name": "nginx"}}));
        let serialized = serde_json::to_string(&event).unwrap();
        assert!(serialized.contains("\"type\":\"ADDED\""));

        let deserialized: WatchEvent<serde_json::Value> =
            serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.event_type, WatchEventType::Added);
        assert_eq!(deserialized.object["metadata"]["name"], "nginx");
    }
}
