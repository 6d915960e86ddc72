use lodestar_client::ResourceClient;
use lodestar_core::{CollectionPage, ContinueToken, ResourceVersion, Result, WatchItem, WatchTarget};
use tracing::debug;

/// Where the pager is within the listing
enum PageCursor {
    Start,
    Next(ContinueToken),
    Exhausted,
}

/// Drives the remote client through successive pages of a collection
/// snapshot, tracking the latest-seen resource version for the watch
/// handoff.
///
/// The first call to [`next_page`](Self::next_page) always issues a list
/// call, so an empty collection still yields exactly one (empty) page.
pub struct SnapshotPager<'a, T: WatchItem> {
    client: &'a dyn ResourceClient<T>,
    target: &'a WatchTarget,
    limit: u32,
    cursor: PageCursor,
    resource_version: Option<ResourceVersion>,
    pages_fetched: usize,
}

impl<'a, T: WatchItem> SnapshotPager<'a, T> {
    pub fn new(client: &'a dyn ResourceClient<T>, target: &'a WatchTarget, limit: u32) -> Self {
        Self {
            client,
            target,
            limit,
            cursor: PageCursor::Start,
            resource_version: None,
            pages_fetched: 0,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    ///
    /// Any transport or decode failure aborts the snapshot; the error is
    /// terminal for the whole session.
    pub async fn next_page(&mut self) -> Result<Option<CollectionPage<T>>> {
        let token = match &self.cursor {
            PageCursor::Exhausted => return Ok(None),
            PageCursor::Start => None,
            PageCursor::Next(token) => Some(token.clone()),
        };

        let page = self
            .client
            .list_page(self.target, self.limit, token.as_ref())
            .await?;

        self.pages_fetched += 1;
        self.resource_version = Some(page.resource_version.clone());
        self.cursor = match page.continue_token.clone() {
            Some(token) => PageCursor::Next(token),
            None => PageCursor::Exhausted,
        };

        debug!(
            "Snapshot page {} of {}: {} items, more: {}",
            self.pages_fetched,
            self.target,
            page.items.len(),
            page.has_more()
        );

        Ok(Some(page))
    }

    /// Resource version observed on the most recently fetched page
    pub fn resource_version(&self) -> Option<&ResourceVersion> {
        self.resource_version.as_ref()
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}
