use async_trait::async_trait;
use futures_util::Stream;
use lodestar_core::{
    CollectionPage, ContinueToken, ResourceVersion, Result, WatchEvent, WatchItem, WatchTarget,
};
use std::fmt;
use std::pin::Pin;

/// A live subscription to a remote collection. Dropping the stream closes
/// the underlying network connection.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<WatchEvent<T>>> + Send>>;

/// API verb checked against the authorization oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Delete,
    List,
    Get,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Delete => "delete",
            Verb::List => "list",
            Verb::Get => "get",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deletion cascade policy forwarded to the remote API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CascadePolicy {
    /// Block deletion until dependents are gone
    #[default]
    Foreground,
    /// Delete immediately, collect dependents in the background
    Background,
    /// Leave dependents in place
    Orphan,
}

impl CascadePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadePolicy::Foreground => "Foreground",
            CascadePolicy::Background => "Background",
            CascadePolicy::Orphan => "Orphan",
        }
    }
}

/// Authorization oracle consulted once per session, before any remote access
///
/// This trait abstracts over the access-review endpoint of the upstream
/// server. It enables testing via `MockAccessReview`.
#[async_trait]
pub trait AccessReview: Send + Sync {
    /// Succeed if the subject may perform `verb` on `target`, otherwise
    /// fail with `LodestarError::PermissionDenied`
    async fn ensure_authorized(&self, verb: Verb, target: &WatchTarget) -> Result<()>;
}

/// Resource-access client: paginated list and incremental watch calls
/// against a remote collection API, plus simple CRUD pass-throughs.
///
/// Implementations own the connection pool; sessions never share cursor or
/// version state through the client. `MockResourceClient` provides a
/// scripted in-memory implementation for tests.
#[async_trait]
pub trait ResourceClient<T: WatchItem>: Send + Sync {
    /// Fetch one page of the collection snapshot. No continue token means
    /// page 1; the returned page carries the cursor for the next call.
    async fn list_page(
        &self,
        target: &WatchTarget,
        limit: u32,
        continue_token: Option<&ContinueToken>,
    ) -> Result<CollectionPage<T>>;

    /// Open a long-lived change subscription anchored at `since`
    async fn open_watch(
        &self,
        target: &WatchTarget,
        since: &ResourceVersion,
    ) -> Result<EventStream<T>>;

    /// Fetch a single named member of the collection
    async fn get_resource(&self, target: &WatchTarget, name: &str) -> Result<T>;

    /// Create a member of the collection
    async fn create_resource(&self, target: &WatchTarget, item: &T) -> Result<T>;

    /// Delete a named member of the collection
    async fn delete_resource(
        &self,
        target: &WatchTarget,
        name: &str,
        cascade: CascadePolicy,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_strings() {
        assert_eq!(Verb::List.as_str(), "list");
        assert_eq!(Verb::Create.to_string(), "create");
    }

    #[test]
    fn test_cascade_default_is_foreground() {
        assert_eq!(CascadePolicy::default(), CascadePolicy::Foreground);
        assert_eq!(CascadePolicy::default().as_str(), "Foreground");
    }
}
