use crate::traits::{AccessReview, Verb};
use async_trait::async_trait;
use lodestar_core::{LodestarError, Result, WatchTarget};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Access-review oracle backed by the upstream server's
/// SelfSubjectAccessReview endpoint. The policy itself lives upstream;
/// this is a pass-through check performed once per session.
pub struct HttpAccessReview {
    base_url: String,
    client: Client,
}

/// Wire shape of an access review response
#[derive(Deserialize)]
struct ReviewResponse {
    #[serde(default)]
    status: ReviewStatus,
}

#[derive(Default, Deserialize)]
struct ReviewStatus {
    #[serde(default)]
    allowed: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Build the SelfSubjectAccessReview request body for a verb/target pair
fn review_body(verb: Verb, target: &WatchTarget) -> Value {
    json!({
        "apiVersion": "authorization.k8s.io/v1",
        "kind": "SelfSubjectAccessReview",
        "spec": {
            "resourceAttributes": {
                "group": target.group,
                "version": target.version,
                "resource": target.resource,
                "namespace": target.namespace,
                "verb": verb.as_str(),
            }
        }
    })
}

impl HttpAccessReview {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl AccessReview for HttpAccessReview {
    async fn ensure_authorized(&self, verb: Verb, target: &WatchTarget) -> Result<()> {
        let url = format!(
            "{}/apis/authorization.k8s.io/v1/selfsubjectaccessreviews",
            self.base_url
        );
        debug!("Access review: {} {}", verb, target);

        let resp = self
            .client
            .post(&url)
            .json(&review_body(verb, target))
            .send()
            .await
            .map_err(|e| {
                LodestarError::transport(format!("HTTP request failed: {}", e), Some(Box::new(e)))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LodestarError::transport(
                format!("Access review failed with status {}: {}", status, body),
                None,
            ));
        }

        let review: ReviewResponse = resp.json().await.map_err(|e| {
            LodestarError::serialization(
                format!("Failed to parse access review: {}", e),
                Some(Box::new(e)),
            )
        })?;

        if !review.status.allowed {
            let target = match review.status.reason {
                Some(reason) => format!("{} ({})", target, reason),
                None => target.to_string(),
            };
            return Err(LodestarError::permission_denied(verb.as_str(), target));
        }

        Ok(())
    }
}
