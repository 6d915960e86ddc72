use crate::traits::{AccessReview, CascadePolicy, EventStream, ResourceClient, Verb};
use async_trait::async_trait;
use futures_util::{stream, Stream, StreamExt};
use lodestar_core::{
    CollectionPage, ContinueToken, LodestarError, ResourceVersion, Result, WatchEvent, WatchItem,
    WatchTarget,
};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tracing::debug;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scripted resource client for testing session behavior
///
/// Serves a fixed sequence of snapshot pages and then a fixed sequence of
/// watch events, while recording every call it receives so tests can assert
/// on cursor threading, call counts, and connection release.
pub struct MockResourceClient<T> {
    pages: Mutex<VecDeque<CollectionPage<T>>>,
    events: Mutex<Vec<Result<WatchEvent<T>>>>,
    list_calls: AtomicUsize,
    watch_opens: AtomicUsize,
    continue_tokens: Mutex<Vec<Option<String>>>,
    watch_versions: Mutex<Vec<String>>,
    watch_open: Arc<AtomicBool>,
}

impl<T> MockResourceClient<T> {
    pub fn new(pages: Vec<CollectionPage<T>>, events: Vec<Result<WatchEvent<T>>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            events: Mutex::new(events),
            list_calls: AtomicUsize::new(0),
            watch_opens: AtomicUsize::new(0),
            continue_tokens: Mutex::new(Vec::new()),
            watch_versions: Mutex::new(Vec::new()),
            watch_open: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of list calls received so far
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of watch subscriptions opened so far
    pub fn watch_opens(&self) -> usize {
        self.watch_opens.load(Ordering::SeqCst)
    }

    /// Whether a watch connection is currently held open
    pub fn watch_stream_open(&self) -> bool {
        self.watch_open.load(Ordering::SeqCst)
    }

    /// Continue tokens received on each list call, in call order
    pub fn continue_tokens(&self) -> Vec<Option<String>> {
        lock(&self.continue_tokens).clone()
    }

    /// Resource versions received on each watch open, in call order
    pub fn watch_versions(&self) -> Vec<String> {
        lock(&self.watch_versions).clone()
    }
}

/// Wraps a scripted event stream so the mock can observe when the session
/// releases the connection (i.e. drops the stream)
struct TrackedStream<T> {
    inner: EventStream<T>,
    open: Arc<AtomicBool>,
}

impl<T> Stream for TrackedStream<T> {
    type Item = Result<WatchEvent<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<T> Drop for TrackedStream<T> {
    fn drop(&mut self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl<T: WatchItem> ResourceClient<T> for MockResourceClient<T> {
    async fn list_page(
        &self,
        target: &WatchTarget,
        _limit: u32,
        continue_token: Option<&ContinueToken>,
    ) -> Result<CollectionPage<T>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.continue_tokens).push(continue_token.map(|t| t.as_str().to_string()));

        debug!("Mock: list {} (continue: {:?})", target, continue_token);

        lock(&self.pages)
            .pop_front()
            .ok_or_else(|| LodestarError::transport("unscripted list call", None))
    }

    async fn open_watch(
        &self,
        target: &WatchTarget,
        since: &ResourceVersion,
    ) -> Result<EventStream<T>> {
        self.watch_opens.fetch_add(1, Ordering::SeqCst);
        lock(&self.watch_versions).push(since.as_str().to_string());
        self.watch_open.store(true, Ordering::SeqCst);

        debug!("Mock: watch {} from {}", target, since);

        // Scripted events, then hold the connection open indefinitely
        let events = std::mem::take(&mut *lock(&self.events));
        let inner: EventStream<T> =
            Box::pin(stream::iter(events).chain(stream::pending()));

        Ok(Box::pin(TrackedStream {
            inner,
            open: Arc::clone(&self.watch_open),
        }))
    }

    async fn get_resource(&self, target: &WatchTarget, name: &str) -> Result<T> {
        Err(LodestarError::internal(format!(
            "Mock: get {}/{} not scripted",
            target, name
        )))
    }

    async fn create_resource(&self, target: &WatchTarget, _item: &T) -> Result<T> {
        Err(LodestarError::internal(format!(
            "Mock: create {} not scripted",
            target
        )))
    }

    async fn delete_resource(
        &self,
        _target: &WatchTarget,
        _name: &str,
        _cascade: CascadePolicy,
    ) -> Result<()> {
        Ok(())
    }
}

/// Access-review oracle with a fixed allow/deny answer, recording every
/// review it is asked for
pub struct MockAccessReview {
    allow: bool,
    reviews: Mutex<Vec<(Verb, WatchTarget)>>,
}

impl MockAccessReview {
    pub fn allow_all() -> Self {
        Self {
            allow: true,
            reviews: Mutex::new(Vec::new()),
        }
    }

    pub fn deny_all() -> Self {
        Self {
            allow: false,
            reviews: Mutex::new(Vec::new()),
        }
    }

    /// Reviews received so far, in call order
    pub fn reviews(&self) -> Vec<(Verb, WatchTarget)> {
        lock(&self.reviews).clone()
    }
}

#[async_trait]
impl AccessReview for MockAccessReview {
    async fn ensure_authorized(&self, verb: Verb, target: &WatchTarget) -> Result<()> {
        lock(&self.reviews).push((verb, target.clone()));

        if self.allow {
            Ok(())
        } else {
            Err(LodestarError::permission_denied(
                verb.as_str(),
                target.to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_core::{DynamicObject, WatchEventType};
    use serde_json::json;

    fn target() -> WatchTarget {
        WatchTarget::new("", "v1", "pods", "default")
    }

    fn item(name: &str) -> DynamicObject {
        DynamicObject(json!({"metadata": {"name": name}}))
    }

    #[tokio::test]
    async fn test_mock_serves_scripted_pages() {
        let client = MockResourceClient::new(
            vec![CollectionPage::new(
                vec![item("a")],
                ResourceVersion::new("1"),
                None,
            )],
            vec![],
        );

        let page = client.list_page(&target(), 10, None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(client.list_calls(), 1);
        assert_eq!(client.continue_tokens(), vec![None]);

        let err = client.list_page(&target(), 10, None).await.unwrap_err();
        assert!(matches!(err, LodestarError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_mock_watch_tracks_connection() {
        let client: MockResourceClient<DynamicObject> = MockResourceClient::new(
            vec![],
            vec![Ok(WatchEvent::added(item("new")))],
        );

        let mut stream = client
            .open_watch(&target(), &ResourceVersion::new("5"))
            .await
            .unwrap();
        assert!(client.watch_stream_open());
        assert_eq!(client.watch_versions(), vec!["5".to_string()]);

        let event = stream.next().await.unwrap().unwrap();
        assert_eq!(event.event_type, WatchEventType::Added);

        drop(stream);
        assert!(!client.watch_stream_open());
    }

    #[tokio::test]
    async fn test_mock_access_review_denies() {
        let authz = MockAccessReview::deny_all();
        let err = authz
            .ensure_authorized(Verb::List, &target())
            .await
            .unwrap_err();
        assert!(matches!(err, LodestarError::PermissionDenied { .. }));
        assert_eq!(authz.reviews().len(), 1);
    }
}
