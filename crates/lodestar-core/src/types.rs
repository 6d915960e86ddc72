use serde::{Deserialize, Serialize};
use std::fmt;

/// GroupVersionKind uniquely identifies a remote resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
    /// API group (e.g., "", "apps", "kubeflow.org")
    pub group: String,
    /// API version (e.g., "v1", "v1beta1")
    pub version: String,
    /// Resource kind (e.g., "Pod", "Notebook")
    pub kind: String,
}

impl GroupVersionKind {
    /// Create a new GVK
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Get the apiVersion string (group/version or just version)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Get the API path segment for this group/version
    pub fn api_path(&self) -> String {
        if self.group.is_empty() {
            format!("api/{}", self.version)
        } else {
            format!("apis/{}/{}", self.group, self.version)
        }
    }

    /// Get the resource name (lowercase, plural)
    pub fn resource_name(&self) -> String {
        // Simple pluralization - should be enhanced for production
        let lower = self.kind.to_lowercase();
        if lower.ends_with('s') {
            format!("{}es", lower)
        } else if lower.ends_with('y') {
            format!("{}ies", &lower[..lower.len() - 1])
        } else {
            format!("{}s", lower)
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.kind)
    }
}

/// WatchTarget identifies the remote collection a session lists and watches:
/// group, version, resource (lowercase plural) and the namespace the
/// session is scoped to (empty for cluster scope).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchTarget {
    /// API group (e.g., "", "kubeflow.org")
    pub group: String,
    /// API version (e.g., "v1")
    pub version: String,
    /// Resource name, lowercase plural (e.g., "pods", "notebooks")
    pub resource: String,
    /// Namespace (empty for cluster-scoped collections)
    pub namespace: String,
}

impl WatchTarget {
    /// Create a WatchTarget from explicit path segments, as received by a
    /// dispatch layer routing on URLs
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
            namespace: namespace.into(),
        }
    }

    /// Create a namespaced WatchTarget from a GVK, deriving the resource
    /// name from the kind
    pub fn from_gvk(gvk: &GroupVersionKind, namespace: impl Into<String>) -> Self {
        Self {
            group: gvk.group.clone(),
            version: gvk.version.clone(),
            resource: gvk.resource_name(),
            namespace: namespace.into(),
        }
    }

    /// Create a cluster-scoped WatchTarget from a GVK
    pub fn cluster_scoped(gvk: &GroupVersionKind) -> Self {
        Self::from_gvk(gvk, String::new())
    }

    /// Check if this target is namespace-scoped
    pub fn is_namespaced(&self) -> bool {
        !self.namespace.is_empty()
    }

    /// Get the API path segment for this group/version
    pub fn api_path(&self) -> String {
        if self.group.is_empty() {
            format!("api/{}", self.version)
        } else {
            format!("apis/{}/{}", self.group, self.version)
        }
    }

    /// Get the API path for the collection (without name)
    pub fn collection_path(&self) -> String {
        if self.is_namespaced() {
            format!(
                "/{}/namespaces/{}/{}",
                self.api_path(),
                self.namespace,
                self.resource
            )
        } else {
            format!("/{}/{}", self.api_path(), self.resource)
        }
    }

    /// Get the API path for a single named member of the collection
    pub fn member_path(&self, name: &str) -> String {
        format!("{}/{}", self.collection_path(), name)
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.resource)?;
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.resource)?;
        }
        if self.is_namespaced() {
            write!(f, "/{}", self.namespace)?;
        }
        Ok(())
    }
}

/// Resource version - opaque server-issued cursor into a collection's
/// change history. Compared only for equality, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceVersion(pub String);

impl ResourceVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceVersion {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Continuation token - opaque per-page cursor for a paginated listing.
///
/// Remote servers report "no further pages" inconsistently (absent field vs
/// empty string); [`ContinueToken::from_wire`] folds both into `None` so the
/// rest of the engine sees a single normalized state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueToken(pub String);

impl ContinueToken {
    /// Normalize a wire-level continue field: absent and empty both mean
    /// the listing is exhausted.
    pub fn from_wire(raw: Option<String>) -> Option<Self> {
        match raw {
            Some(token) if !token.is_empty() => Some(Self(token)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a collection snapshot, as returned by a single list call.
///
/// Transient: each page is consumed into an emitted frame and discarded.
#[derive(Debug, Clone)]
pub struct CollectionPage<T> {
    /// Items on this page, in server order
    pub items: Vec<T>,
    /// Resource version active when the page was fetched
    pub resource_version: ResourceVersion,
    /// Cursor for the next page; `None` means the listing is exhausted
    pub continue_token: Option<ContinueToken>,
}

impl<T> CollectionPage<T> {
    pub fn new(
        items: Vec<T>,
        resource_version: ResourceVersion,
        continue_token: Option<ContinueToken>,
    ) -> Self {
        Self {
            items,
            resource_version,
            continue_token,
        }
    }

    /// Whether a further page exists
    pub fn has_more(&self) -> bool {
        self.continue_token.is_some()
    }
}
