use lodestar_core::{Result, WatchEvent};
use serde::Serialize;
use serde_json::json;

/// One named, payload-bearing unit of the outbound event stream: an SSE
/// event name plus a JSON-encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// SSE event (channel) name
    pub event: String,
    /// JSON payload
    pub data: String,
}

/// How frames are named and wrapped on the wire.
///
/// The typed variant wraps payloads in a discriminator object on the
/// `list-init`/`list-page`/`live-update` channels; the generic variant
/// spreads bare payloads across the `list`/`page`/`update` channels. One
/// engine serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEncoding {
    /// `event: list-init|list-page|live-update` with `{"listInit": [...]}`,
    /// `{"listPage": [...]}` and `{"event": {...}}` payloads
    Wrapped,
    /// `event: list|page|update` with bare array/object payloads
    Bare,
}

impl FrameEncoding {
    /// Encode one snapshot page. `first` selects the list-init channel,
    /// later pages go out as list-page frames.
    pub fn encode_page<T: Serialize>(&self, first: bool, items: &[T]) -> Result<Frame> {
        let items = serde_json::to_value(items)?;

        let frame = match self {
            FrameEncoding::Wrapped => {
                let (event, key) = if first {
                    ("list-init", "listInit")
                } else {
                    ("list-page", "listPage")
                };
                Frame {
                    event: event.to_string(),
                    data: json!({ key: items }).to_string(),
                }
            }
            FrameEncoding::Bare => Frame {
                event: if first { "list" } else { "page" }.to_string(),
                data: items.to_string(),
            },
        };

        Ok(frame)
    }

    /// Encode one live change event as a live-update frame
    pub fn encode_event<T: Serialize>(&self, event: &WatchEvent<T>) -> Result<Frame> {
        let event_json = serde_json::to_value(event)?;

        let frame = match self {
            FrameEncoding::Wrapped => Frame {
                event: "live-update".to_string(),
                data: json!({ "event": event_json }).to_string(),
            },
            FrameEncoding::Bare => Frame {
                event: "update".to_string(),
                data: event_json.to_string(),
            },
        };

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn items() -> Vec<Value> {
        vec![json!({"metadata": {"name": "a"}}), json!({"metadata": {"name": "b"}})]
    }

    #[test]
    fn test_wrapped_page_frames() {
        let encoding = FrameEncoding::Wrapped;

        let init = encoding.encode_page(true, &items()).unwrap();
        assert_eq!(init.event, "list-init");
        let payload: Value = serde_json::from_str(&init.data).unwrap();
        assert_eq!(payload["listInit"].as_array().unwrap().len(), 2);

        let page = encoding.encode_page(false, &items()).unwrap();
        assert_eq!(page.event, "list-page");
        let payload: Value = serde_json::from_str(&page.data).unwrap();
        assert!(payload.get("listPage").is_some());
        assert!(payload.get("listInit").is_none());
    }

    #[test]
    fn test_wrapped_event_frame() {
        let encoding = FrameEncoding::Wrapped;
        let event = WatchEvent::added(json!({"metadata": {"name": "c"}}));

        let frame = encoding.encode_event(&event).unwrap();
        assert_eq!(frame.event, "live-update");
        let payload: Value = serde_json::from_str(&frame.data).unwrap();
        assert_eq!(payload["event"]["type"], "ADDED");
        assert_eq!(payload["event"]["object"]["metadata"]["name"], "c");
    }

    #[test]
    fn test_bare_page_frames() {
        let encoding = FrameEncoding::Bare;

        let init = encoding.encode_page(true, &items()).unwrap();
        assert_eq!(init.event, "list");
        let payload: Value = serde_json::from_str(&init.data).unwrap();
        assert_eq!(payload.as_array().unwrap().len(), 2);

        let page = encoding.encode_page(false, &items()).unwrap();
        assert_eq!(page.event, "page");

        let empty = encoding.encode_page(true, &Vec::<Value>::new()).unwrap();
        assert_eq!(empty.data, "[]");
    }

    #[test]
    fn test_bare_event_frame() {
        let encoding = FrameEncoding::Bare;
        let event = WatchEvent::deleted(json!({"metadata": {"name": "c"}}));

        let frame = encoding.encode_event(&event).unwrap();
        assert_eq!(frame.event, "update");
        let payload: Value = serde_json::from_str(&frame.data).unwrap();
        assert_eq!(payload["type"], "DELETED");
    }
}
