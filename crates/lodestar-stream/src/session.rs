use crate::frame::{Frame, FrameEncoding};
use crate::snapshot::SnapshotPager;
use crate::watch::WatchFeed;
use lodestar_client::ResourceClient;
use lodestar_core::{LodestarError, Result, WatchItem, WatchTarget};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

/// Per-session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Page-size limit for snapshot pagination
    pub limit: u32,
    /// Frame naming/wrapping scheme for this session
    pub encoding: FrameEncoding,
}

/// One list-watch session: a paginated snapshot concatenated with a live
/// subscription, emitted as a single ordered sequence of [`Frame`]s.
///
/// Frames travel through a capacity-1 channel, so production never runs
/// more than one frame ahead of the consumer. When the consumer drops the
/// returned stream, the producer observes the closed channel, cancels any
/// in-flight remote call, and drops the watch connection. A terminal error
/// is delivered as the stream's final item; nothing survives the session.
pub struct WatchSession<T: WatchItem> {
    client: Arc<dyn ResourceClient<T>>,
    target: WatchTarget,
    config: SessionConfig,
}

impl<T: WatchItem> WatchSession<T> {
    pub fn new(
        client: Arc<dyn ResourceClient<T>>,
        target: WatchTarget,
        config: SessionConfig,
    ) -> Self {
        Self {
            client,
            target,
            config,
        }
    }

    /// Start the producer task and hand back the frame stream
    pub fn spawn(self) -> ReceiverStream<Result<Frame>> {
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(async move {
            info!("Session opened for {}", self.target);
            if let Err(err) = self.run(&tx).await {
                warn!("Session for {} failed: {}", self.target, err);
                let _ = tx.send(Err(err)).await;
            }
        });

        ReceiverStream::new(rx)
    }

    async fn run(&self, tx: &mpsc::Sender<Result<Frame>>) -> Result<()> {
        // Snapshot phase: page through the full listing
        let mut pager = SnapshotPager::new(self.client.as_ref(), &self.target, self.config.limit);
        let mut first = true;

        loop {
            let page = tokio::select! {
                _ = tx.closed() => {
                    debug!("Consumer disconnected during snapshot of {}", self.target);
                    return Ok(());
                }
                page = pager.next_page() => page?,
            };
            let Some(page) = page else { break };

            let frame = self.config.encoding.encode_page(first, &page.items)?;
            if tx.send(Ok(frame)).await.is_err() {
                return Ok(());
            }
            first = false;
        }

        // The first page is fetched unconditionally, so a version is
        // always present here
        let since = pager
            .resource_version()
            .cloned()
            .ok_or_else(|| LodestarError::internal("snapshot yielded no resource version"))?;

        // Live phase: forward change events until the remote or the
        // consumer ends the session
        let mut feed = tokio::select! {
            _ = tx.closed() => {
                debug!("Consumer disconnected before watch on {}", self.target);
                return Ok(());
            }
            feed = WatchFeed::open(self.client.as_ref(), &self.target, since) => feed?,
        };

        loop {
            let event = tokio::select! {
                _ = tx.closed() => {
                    debug!(
                        "Consumer disconnected during live phase of {} at {}",
                        self.target,
                        feed.resource_version()
                    );
                    return Ok(());
                }
                event = feed.next_event() => event,
            };
            let Some(event) = event else {
                info!("Watch on {} closed by remote", self.target);
                return Ok(());
            };

            let frame = self.config.encoding.encode_event(&event?)?;
            if tx.send(Ok(frame)).await.is_err() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use lodestar_client::MockResourceClient;
    use lodestar_core::{
        CollectionPage, ContinueToken, DynamicObject, ResourceVersion, WatchEvent,
    };
    use serde_json::{json, Value};

    fn target() -> WatchTarget {
        WatchTarget::new("kubeflow.org", "v1", "notebooks", "user-ns")
    }

    fn item(name: &str) -> DynamicObject {
        DynamicObject(json!({"metadata": {"name": name, "resourceVersion": "0"}}))
    }

    fn page(
        names: &[&str],
        rv: &str,
        continue_token: Option<&str>,
    ) -> CollectionPage<DynamicObject> {
        CollectionPage::new(
            names.iter().map(|n| item(n)).collect(),
            ResourceVersion::new(rv),
            continue_token.map(|t| ContinueToken(t.to_string())),
        )
    }

    fn session(
        client: Arc<MockResourceClient<DynamicObject>>,
        limit: u32,
    ) -> WatchSession<DynamicObject> {
        WatchSession::new(
            client,
            target(),
            SessionConfig {
                limit,
                encoding: FrameEncoding::Bare,
            },
        )
    }

    fn names_in(data: &str) -> Vec<String> {
        let items: Vec<Value> = serde_json::from_str(data).unwrap();
        items
            .iter()
            .map(|i| i["metadata"]["name"].as_str().unwrap().to_string())
            .collect()
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    /// Five items, chunk size two: pages of [2, 2, 1], then one ADDED event.
    /// Covers pagination completeness, frame ordering, and the resource
    /// version handoff in one scenario.
    #[tokio::test]
    async fn test_five_items_chunk_two_scenario() {
        let client = Arc::new(MockResourceClient::new(
            vec![
                page(&["a", "b"], "10", Some("t1")),
                page(&["c", "d"], "11", Some("t2")),
                page(&["e"], "12", None),
            ],
            vec![Ok(WatchEvent::added(item("f")))],
        ));
        let mut frames = session(Arc::clone(&client), 2).spawn();

        let mut received = Vec::new();
        for _ in 0..4 {
            received.push(frames.next().await.unwrap().unwrap());
        }

        // Channel order: one list, then pages, then the update
        let channels: Vec<&str> = received.iter().map(|f| f.event.as_str()).collect();
        assert_eq!(channels, vec!["list", "page", "page", "update"]);

        // Item-wise concatenation reconstructs the collection exactly
        let mut names = Vec::new();
        for frame in &received[..3] {
            names.extend(names_in(&frame.data));
        }
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);

        // The update frame carries the sixth item tagged ADDED
        let update: Value = serde_json::from_str(&received[3].data).unwrap();
        assert_eq!(update["type"], "ADDED");
        assert_eq!(update["object"]["metadata"]["name"], "f");

        // Watch anchored at the final page's resource version
        assert_eq!(client.watch_versions(), vec!["12".to_string()]);
        assert_eq!(client.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_no_update_frame_before_snapshot_completes() {
        // Events are available immediately, yet every snapshot frame must
        // still precede the first update frame
        let client = Arc::new(MockResourceClient::new(
            vec![
                page(&["a"], "1", Some("t1")),
                page(&["b"], "2", None),
            ],
            vec![
                Ok(WatchEvent::modified(item("a"))),
                Ok(WatchEvent::deleted(item("b"))),
            ],
        ));
        let mut frames = session(Arc::clone(&client), 1).spawn();

        let mut channels = Vec::new();
        for _ in 0..4 {
            channels.push(frames.next().await.unwrap().unwrap().event);
        }

        let first_update = channels.iter().position(|c| c == "update").unwrap();
        let last_page = channels.iter().rposition(|c| c != "update").unwrap();
        assert!(last_page < first_update);
    }

    #[tokio::test]
    async fn test_empty_collection_emits_one_snapshot_frame() {
        let client = Arc::new(MockResourceClient::new(vec![page(&[], "5", None)], vec![]));
        let mut frames = session(Arc::clone(&client), 100).spawn();

        let first = frames.next().await.unwrap().unwrap();
        assert_eq!(first.event, "list");
        assert_eq!(first.data, "[]");

        settle().await;

        // Exactly one list call, and the live subscription is open
        assert_eq!(client.list_calls(), 1);
        assert_eq!(client.watch_opens(), 1);
        assert_eq!(client.watch_versions(), vec!["5".to_string()]);
        assert!(client.watch_stream_open());
    }

    #[tokio::test]
    async fn test_resource_version_handoff_single_page() {
        let client = Arc::new(MockResourceClient::new(
            vec![page(&["a"], "42", None)],
            vec![],
        ));
        let mut frames = session(Arc::clone(&client), 10).spawn();

        frames.next().await.unwrap().unwrap();
        settle().await;

        assert_eq!(client.watch_versions(), vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_disconnect_during_snapshot_stops_remote_calls() {
        let client = Arc::new(MockResourceClient::new(
            vec![
                page(&["a"], "1", Some("t1")),
                page(&["b"], "2", Some("t2")),
                page(&["c"], "3", None),
            ],
            vec![],
        ));
        let mut frames = session(Arc::clone(&client), 1).spawn();

        // Consume the first frame, then walk away
        frames.next().await.unwrap().unwrap();
        drop(frames);
        settle().await;

        // The producer may have one page in flight, but never reaches the
        // third page or the watch
        assert!(client.list_calls() <= 2);
        assert_eq!(client.watch_opens(), 0);
        let calls_after_drop = client.list_calls();
        settle().await;
        assert_eq!(client.list_calls(), calls_after_drop);
    }

    #[tokio::test]
    async fn test_disconnect_during_live_phase_releases_connection() {
        let client = Arc::new(MockResourceClient::new(
            vec![page(&["a"], "1", None)],
            vec![Ok(WatchEvent::modified(item("a")))],
        ));
        let mut frames = session(Arc::clone(&client), 10).spawn();

        frames.next().await.unwrap().unwrap();
        frames.next().await.unwrap().unwrap();
        assert!(client.watch_stream_open());

        drop(frames);
        settle().await;

        assert!(!client.watch_stream_open());
        assert_eq!(client.watch_opens(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_terminates_stream() {
        // A page is promised but never scripted: the session must surface
        // one terminal error and end
        let client = Arc::new(MockResourceClient::new(
            vec![page(&["a"], "1", Some("t1"))],
            vec![],
        ));
        let mut frames = session(Arc::clone(&client), 1).spawn();

        frames.next().await.unwrap().unwrap();
        let err = frames.next().await.unwrap().unwrap_err();
        assert!(matches!(err, LodestarError::Transport { .. }));
        assert!(frames.next().await.is_none());
        assert_eq!(client.watch_opens(), 0);
    }

    #[tokio::test]
    async fn test_live_error_event_forwarded_as_update() {
        // A server ERROR-tagged event is passed through as a frame, not
        // treated as a session failure
        let error_event = WatchEvent::new(
            lodestar_core::WatchEventType::Error,
            DynamicObject(json!({"kind": "Status", "message": "too old resource version"})),
        );
        let client = Arc::new(MockResourceClient::new(
            vec![page(&[], "1", None)],
            vec![Ok(error_event)],
        ));
        let mut frames = session(Arc::clone(&client), 10).spawn();

        frames.next().await.unwrap().unwrap();
        let frame = frames.next().await.unwrap().unwrap();
        assert_eq!(frame.event, "update");
        let payload: Value = serde_json::from_str(&frame.data).unwrap();
        assert_eq!(payload["type"], "ERROR");
        assert_eq!(payload["object"]["kind"], "Status");
    }

    #[tokio::test]
    async fn test_wrapped_encoding_session() {
        let client = Arc::new(MockResourceClient::new(
            vec![
                page(&["a"], "1", Some("t1")),
                page(&["b"], "2", None),
            ],
            vec![Ok(WatchEvent::added(item("c")))],
        ));
        let session = WatchSession::new(
            Arc::clone(&client) as Arc<dyn ResourceClient<DynamicObject>>,
            target(),
            SessionConfig {
                limit: 1,
                encoding: FrameEncoding::Wrapped,
            },
        );
        let mut frames = session.spawn();

        let init = frames.next().await.unwrap().unwrap();
        assert_eq!(init.event, "list-init");
        let payload: Value = serde_json::from_str(&init.data).unwrap();
        assert!(payload.get("listInit").is_some());

        let next = frames.next().await.unwrap().unwrap();
        assert_eq!(next.event, "list-page");
        let payload: Value = serde_json::from_str(&next.data).unwrap();
        assert!(payload.get("listPage").is_some());

        let update = frames.next().await.unwrap().unwrap();
        assert_eq!(update.event, "live-update");
        let payload: Value = serde_json::from_str(&update.data).unwrap();
        assert_eq!(payload["event"]["type"], "ADDED");
    }
}
