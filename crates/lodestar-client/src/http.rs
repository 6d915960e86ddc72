use crate::traits::{CascadePolicy, EventStream, ResourceClient};
use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use lodestar_core::{
    CollectionPage, ContinueToken, LodestarError, ResourceVersion, Result, WatchEvent, WatchItem,
    WatchTarget,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

/// HTTP client for the upstream collection API
///
/// One instance is shared by all sessions; only the reqwest connection pool
/// is shared state. Each session passes its own cursors explicitly.
pub struct HttpResourceClient {
    base_url: String,
    client: Client,
}

/// Wire shape of a collection list response
#[derive(Deserialize)]
struct ListEnvelope<T> {
    #[serde(default)]
    metadata: ListMeta,
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Default, Deserialize)]
struct ListMeta {
    #[serde(rename = "resourceVersion", default)]
    resource_version: String,
    #[serde(rename = "continue", default)]
    continue_token: Option<String>,
}

impl HttpResourceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl<T: WatchItem> ResourceClient<T> for HttpResourceClient {
    /// GET {collection}?limit={limit}&continue={token}
    async fn list_page(
        &self,
        target: &WatchTarget,
        limit: u32,
        continue_token: Option<&ContinueToken>,
    ) -> Result<CollectionPage<T>> {
        let url = format!("{}{}", self.base_url, target.collection_path());
        debug!("GET {} (limit {})", url, limit);

        let mut request = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string())]);
        if let Some(token) = continue_token {
            request = request.query(&[("continue", token.as_str())]);
        }

        let resp = request.send().await.map_err(|e| {
            LodestarError::transport(format!("HTTP request failed: {}", e), Some(Box::new(e)))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LodestarError::transport(
                format!("LIST {} failed with status {}: {}", target, status, body),
                None,
            ));
        }

        let envelope: ListEnvelope<T> = resp.json().await.map_err(|e| {
            LodestarError::serialization(
                format!("Failed to parse list response: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(CollectionPage::new(
            envelope.items,
            ResourceVersion::new(envelope.metadata.resource_version),
            ContinueToken::from_wire(envelope.metadata.continue_token),
        ))
    }

    /// GET {collection}?watch=true&resourceVersion={since}
    ///
    /// The response body is a long-lived stream of newline-delimited JSON
    /// watch events. Dropping the returned stream drops the response and
    /// closes the connection.
    async fn open_watch(
        &self,
        target: &WatchTarget,
        since: &ResourceVersion,
    ) -> Result<EventStream<T>> {
        let url = format!("{}{}", self.base_url, target.collection_path());
        debug!("WATCH {} from resourceVersion {}", url, since);

        let resp = self
            .client
            .get(&url)
            .query(&[("watch", "true"), ("resourceVersion", since.as_str())])
            .send()
            .await
            .map_err(|e| {
                LodestarError::transport(format!("HTTP request failed: {}", e), Some(Box::new(e)))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LodestarError::transport(
                format!("WATCH {} failed with status {}: {}", target, status, body),
                None,
            ));
        }

        let reader = StreamReader::new(
            resp.bytes_stream()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );
        let lines = FramedRead::new(reader, LinesCodec::new());

        let events = lines.filter_map(|line| async move {
            match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(serde_json::from_str::<WatchEvent<T>>(&line).map_err(|e| {
                    warn!("Undecodable watch event: {}", e);
                    LodestarError::serialization(
                        format!("Failed to decode watch event: {}", e),
                        Some(Box::new(e)),
                    )
                })),
                Err(e) => Some(Err(LodestarError::transport(
                    format!("Watch stream read failed: {}", e),
                    Some(Box::new(e)),
                ))),
            }
        });

        Ok(Box::pin(events))
    }

    /// GET {collection}/{name}
    async fn get_resource(&self, target: &WatchTarget, name: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, target.member_path(name));
        debug!("GET {}", url);

        let resp = self.client.get(&url).send().await.map_err(|e| {
            LodestarError::transport(format!("HTTP request failed: {}", e), Some(Box::new(e)))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LodestarError::transport(
                format!("GET {}/{} failed with status {}: {}", target, name, status, body),
                None,
            ));
        }

        resp.json::<T>().await.map_err(|e| {
            LodestarError::serialization(
                format!("Failed to parse resource: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// POST {collection}
    async fn create_resource(&self, target: &WatchTarget, item: &T) -> Result<T> {
        let url = format!("{}{}", self.base_url, target.collection_path());
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(item)
            .send()
            .await
            .map_err(|e| {
                LodestarError::transport(format!("HTTP request failed: {}", e), Some(Box::new(e)))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LodestarError::transport(
                format!("POST {} failed with status {}: {}", target, status, body),
                None,
            ));
        }

        resp.json::<T>().await.map_err(|e| {
            LodestarError::serialization(
                format!("Failed to parse created resource: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// DELETE {collection}/{name} with a propagation policy body
    async fn delete_resource(
        &self,
        target: &WatchTarget,
        name: &str,
        cascade: CascadePolicy,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, target.member_path(name));
        debug!("DELETE {} ({})", url, cascade.as_str());

        let options = json!({
            "apiVersion": "v1",
            "kind": "DeleteOptions",
            "propagationPolicy": cascade.as_str(),
        });

        let resp = self
            .client
            .delete(&url)
            .json(&options)
            .send()
            .await
            .map_err(|e| {
                LodestarError::transport(format!("HTTP request failed: {}", e), Some(Box::new(e)))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LodestarError::transport(
                format!("DELETE {}/{} failed with status {}: {}", target, name, status, body),
                None,
            ));
        }

        Ok(())
    }
}
