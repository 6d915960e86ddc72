use futures_util::StreamExt;
use lodestar_client::{EventStream, ResourceClient};
use lodestar_core::{ResourceVersion, Result, WatchEvent, WatchItem, WatchTarget};
use tracing::info;

/// A live subscription to a remote collection, anchored at the resource
/// version the snapshot ended on.
///
/// Yields events in receipt order, indefinitely, until the remote closes
/// the connection or the feed is dropped. Dropping the feed drops the
/// client's event stream, which closes the underlying network connection.
pub struct WatchFeed<T: WatchItem> {
    events: EventStream<T>,
    resource_version: ResourceVersion,
}

impl<T: WatchItem> WatchFeed<T> {
    /// Open the subscription. `since` should be the resource version of the
    /// final snapshot page.
    pub async fn open(
        client: &dyn ResourceClient<T>,
        target: &WatchTarget,
        since: ResourceVersion,
    ) -> Result<Self> {
        let events = client.open_watch(target, &since).await?;
        info!("Watching {} from resourceVersion {}", target, since);

        Ok(Self {
            events,
            resource_version: since,
        })
    }

    /// Receive the next change event; `None` once the remote stream ends.
    ///
    /// Each event advances the tracked resource version to the version
    /// recorded on the event's object.
    pub async fn next_event(&mut self) -> Option<Result<WatchEvent<T>>> {
        let event = self.events.next().await?;

        if let Ok(event) = &event {
            if let Some(rv) = event.object.resource_version() {
                self.resource_version = ResourceVersion::new(rv);
            }
        }

        Some(event)
    }

    /// Last resource version observed on this feed, for diagnostics and
    /// reconnect decisions by a higher layer
    pub fn resource_version(&self) -> &ResourceVersion {
        &self.resource_version
    }
}
