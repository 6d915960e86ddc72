use crate::error::{ApiError, Result};
use crate::response::{status_deleted, ApiResponse, ListResponse};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::{future, Stream, StreamExt};
use lodestar_client::{CascadePolicy, ResourceClient, Verb};
use lodestar_core::{
    DynamicObject, GroupVersionKind, Pod, ResourceVersion, WatchItem, WatchTarget,
};
use lodestar_stream::{Frame, FrameEncoding, SessionConfig, SnapshotPager, WatchSession};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

/// Query parameters for list requests
#[derive(Debug, Deserialize, Default)]
pub struct WatchParams {
    /// Set to "true" or "1" to enable watch mode
    pub watch: Option<String>,
}

impl WatchParams {
    /// Check if this is a watch request
    pub fn is_watch(&self) -> bool {
        self.watch
            .as_deref()
            .is_some_and(|v| v == "true" || v == "1")
    }
}

/// Query parameters for delete requests
#[derive(Debug, Deserialize, Default)]
pub struct DeleteParams {
    /// Cascade policy: "Foreground" (default), "Background" or "Orphan"
    pub cascade: Option<String>,
}

impl DeleteParams {
    fn cascade_policy(&self) -> Result<CascadePolicy> {
        match self.cascade.as_deref() {
            None => Ok(CascadePolicy::default()),
            Some(s) if s.eq_ignore_ascii_case("foreground") => Ok(CascadePolicy::Foreground),
            Some(s) if s.eq_ignore_ascii_case("background") => Ok(CascadePolicy::Background),
            Some(s) if s.eq_ignore_ascii_case("orphan") => Ok(CascadePolicy::Orphan),
            Some(other) => Err(ApiError::BadRequest(format!(
                "Unknown cascade policy: {}",
                other
            ))),
        }
    }
}

/// Render a session's frame stream as a `text/event-stream` response.
///
/// A terminal session error is logged and the stream simply ends; the
/// client is responsible for detecting termination and reconnecting.
fn sse_response(
    frames: impl Stream<Item = lodestar_core::Result<Frame>> + Send + 'static,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let events = frames.filter_map(|item| {
        let out = match item {
            Ok(frame) => Some(Ok(Event::default().event(frame.event).data(frame.data))),
            Err(err) => {
                error!("Watch session terminated: {}", err);
                None
            }
        };
        future::ready(out)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Drain a full snapshot for a one-shot (non-watch) list response
async fn drain_snapshot<T: WatchItem>(
    client: &dyn ResourceClient<T>,
    target: &WatchTarget,
    limit: u32,
) -> lodestar_core::Result<(Vec<T>, ResourceVersion)> {
    let mut pager = SnapshotPager::new(client, target, limit);
    let mut items = Vec::new();
    let mut resource_version = ResourceVersion::default();

    while let Some(page) = pager.next_page().await? {
        resource_version = page.resource_version.clone();
        items.extend(page.items);
    }

    Ok((items, resource_version))
}

/// GET /apis/{group}/{version}/namespaces/{namespace}/{resource}
///
/// Plain list, or with `?watch=true` a streamed list-watch session on the
/// generic (bare-payload) channels.
pub async fn list_custom_resources(
    State(state): State<Arc<AppState>>,
    Path((group, version, namespace, resource)): Path<(String, String, String, String)>,
    Query(params): Query<WatchParams>,
) -> Result<Response> {
    let target = WatchTarget::new(group, version, resource, namespace);
    state.authz.ensure_authorized(Verb::List, &target).await?;

    if params.is_watch() {
        info!("New sse connection for {}", target);
        let session = WatchSession::new(
            Arc::clone(&state.dynamic_client),
            target,
            SessionConfig {
                limit: state.chunk_limit,
                encoding: FrameEncoding::Bare,
            },
        );
        return Ok(sse_response(session.spawn()).into_response());
    }

    let api_version = if target.group.is_empty() {
        target.version.clone()
    } else {
        format!("{}/{}", target.group, target.version)
    };
    let (items, resource_version) =
        drain_snapshot(state.dynamic_client.as_ref(), &target, state.chunk_limit).await?;

    Ok(ApiResponse::ok(ListResponse::new(api_version, items, resource_version.0)).into_response())
}

/// GET /apis/{group}/{version}/namespaces/{namespace}/{resource}/{name}
pub async fn get_custom_resource(
    State(state): State<Arc<AppState>>,
    Path((group, version, namespace, resource, name)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
) -> Result<Response> {
    let target = WatchTarget::new(group, version, resource, namespace);
    state.authz.ensure_authorized(Verb::Get, &target).await?;

    let item = state.dynamic_client.get_resource(&target, &name).await?;

    Ok(ApiResponse::ok(item).into_response())
}

/// POST /apis/{group}/{version}/namespaces/{namespace}/{resource}
pub async fn create_custom_resource(
    State(state): State<Arc<AppState>>,
    Path((group, version, namespace, resource)): Path<(String, String, String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let target = WatchTarget::new(group, version, resource, namespace);
    state.authz.ensure_authorized(Verb::Create, &target).await?;

    info!("Creating resource in {}", target);
    let created = state
        .dynamic_client
        .create_resource(&target, &DynamicObject(body))
        .await?;

    Ok(ApiResponse::created(created).into_response())
}

/// DELETE /apis/{group}/{version}/namespaces/{namespace}/{resource}/{name}
pub async fn delete_custom_resource(
    State(state): State<Arc<AppState>>,
    Path((group, version, namespace, resource, name)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
    Query(params): Query<DeleteParams>,
) -> Result<Response> {
    let target = WatchTarget::new(group, version, resource, namespace);
    state.authz.ensure_authorized(Verb::Delete, &target).await?;

    info!("Deleting {} from {}", name, target);
    state
        .dynamic_client
        .delete_resource(&target, &name, params.cascade_policy()?)
        .await?;

    Ok(status_deleted(&name, &target.resource))
}

/// GET /api/v1/namespaces/{namespace}/pods
///
/// Typed variant: with `?watch=true`, frames go out on the
/// `list-init`/`list-page`/`live-update` channels with wrapped
/// `listInit`/`listPage`/`event` payloads.
pub async fn list_pods(
    State(state): State<Arc<AppState>>,
    Path(namespace): Path<String>,
    Query(params): Query<WatchParams>,
) -> Result<Response> {
    let gvk = GroupVersionKind::new("", "v1", "Pod");
    let target = WatchTarget::from_gvk(&gvk, namespace);
    state.authz.ensure_authorized(Verb::List, &target).await?;

    if params.is_watch() {
        info!("New sse connection for {}", target);
        let session = WatchSession::new(
            Arc::clone(&state.pod_client),
            target,
            SessionConfig {
                limit: state.chunk_limit,
                encoding: FrameEncoding::Wrapped,
            },
        );
        return Ok(sse_response(session.spawn()).into_response());
    }

    let (items, resource_version) =
        drain_snapshot(state.pod_client.as_ref(), &target, state.chunk_limit).await?;
    let items: Vec<Pod> = items.into_iter().map(|item| item.0).collect();

    Ok(ApiResponse::ok(ListResponse::new(
        "v1".to_string(),
        items,
        resource_version.0,
    ))
    .into_response())
}
