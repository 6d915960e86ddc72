use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::Metadata;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Capability set required of items flowing through a list-watch session:
/// serializable in both directions, and able to report the resource version
/// they were observed at.
///
/// The engine is written once against this trait; [`TypedObject`] and
/// [`DynamicObject`] adapt the typed and untyped remote-API shapes to it.
pub trait WatchItem: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Resource version recorded on the item, if the server set one
    fn resource_version(&self) -> Option<&str>;
}

/// Adapter for typed API objects carrying standard `ObjectMeta`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedObject<T>(pub T);

impl<T> WatchItem for TypedObject<T>
where
    T: Metadata<Ty = ObjectMeta> + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn resource_version(&self) -> Option<&str> {
        self.0.metadata().resource_version.as_deref()
    }
}

/// Adapter for untyped API objects (raw JSON maps), e.g. custom resources
/// whose schema is not known at compile time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicObject(pub serde_json::Value);

impl WatchItem for DynamicObject {
    fn resource_version(&self) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|meta| meta.get("resourceVersion"))
            .and_then(|rv| rv.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Pod;
    use serde_json::json;

    #[test]
    fn test_typed_object_resource_version() {
        let mut pod = Pod::default();
        pod.metadata.resource_version = Some("42".to_string());

        let item = TypedObject(pod);
        assert_eq!(item.resource_version(), Some("42"));

        let item = TypedObject(Pod::default());
        assert_eq!(item.resource_version(), None);
    }

    #[test]
    fn test_dynamic_object_resource_version() {
        let item = DynamicObject(json!({
            "metadata": {"name": "nb", "resourceVersion": "17"}
        }));
        assert_eq!(item.resource_version(), Some("17"));

        let item = DynamicObject(json!({"metadata": {}}));
        assert_eq!(item.resource_version(), None);

        let item = DynamicObject(json!("not-an-object"));
        assert_eq!(item.resource_version(), None);
    }

    #[test]
    fn test_transparent_serialization() {
        let item = DynamicObject(json!({"kind": "Notebook"}));
        let serialized = serde_json::to_string(&item).unwrap();
        assert_eq!(serialized, "{\"kind\":\"Notebook\"}");
    }
}
