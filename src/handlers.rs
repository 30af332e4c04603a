use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::{ErrorKind, IpamError};
use crate::models::{AssignmentRequest, RangeQuery, SubnetRecord};
use crate::resource::{
    create_allocation, delete_allocation, parse_resource_id, read_allocation,
    read_available_subnets, update_allocation, AllocatedSubnet, AvailableSubnets,
};
use crate::state::AppState;

/// Builds the router exposing the data source and resource operations.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/available-subnets", get(available_subnets))
        .route("/api/allocated-subnets", post(create_allocated_subnet))
        .route(
            "/api/allocated-subnets/{id}",
            get(read_allocated_subnet)
                .put(update_allocated_subnet)
                .delete(delete_allocated_subnet),
        )
        .route("/api/subnets/{ip}", get(subnet_record))
        .with_state(state)
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Exhaustion => StatusCode::CONFLICT,
        ErrorKind::UnsupportedOperation => StatusCode::NOT_IMPLEMENTED,
        ErrorKind::Transport | ErrorKind::Status | ErrorKind::Protocol => StatusCode::BAD_GATEWAY,
        ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for IpamError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);
        if status.is_server_error() && kind != ErrorKind::UnsupportedOperation {
            error!("mira request failed: {}", self);
        } else {
            warn!("rejected request: {}", self);
        }
        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
                "kind": kind.as_str(),
            })),
        )
            .into_response()
    }
}

/// GET /api/available-subnets - Free subnets under a range.
pub async fn available_subnets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<AvailableSubnets>, IpamError> {
    let Query(query) = query.map_err(|e| IpamError::Validation(e.body_text()))?;
    read_available_subnets(&state.client, &query).await.map(Json)
}

/// POST /api/allocated-subnets - Claim the first free subnet.
pub async fn create_allocated_subnet(
    State(state): State<Arc<AppState>>,
    request: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AllocatedSubnet>), IpamError> {
    let Json(request) = request.map_err(|e| IpamError::Validation(e.body_text()))?;
    let allocated = create_allocation(&state.client, &request).await?;
    Ok((StatusCode::CREATED, Json(allocated)))
}

/// GET /api/allocated-subnets/{id} - Echo the tracked allocation.
pub async fn read_allocated_subnet(
    Path(id): Path<String>,
) -> Result<Json<AllocatedSubnet>, IpamError> {
    let (subnet, mask) = parse_resource_id(&id)?;
    let tracked = AllocatedSubnet::new(subnet, mask, None);
    read_allocation(&tracked).map(Json)
}

/// PUT /api/allocated-subnets/{id} - Always refused.
pub async fn update_allocated_subnet(Path(id): Path<String>) -> Result<StatusCode, IpamError> {
    update_allocation(&id).map(|()| StatusCode::NO_CONTENT)
}

/// DELETE /api/allocated-subnets/{id} - Always refused.
pub async fn delete_allocated_subnet(Path(id): Path<String>) -> Result<StatusCode, IpamError> {
    delete_allocation(&id).map(|()| StatusCode::NO_CONTENT)
}

/// GET /api/subnets/{ip} - Mira record of the subnet containing an address.
pub async fn subnet_record(
    State(state): State<Arc<AppState>>,
    Path(ip): Path<String>,
) -> Result<Json<SubnetRecord>, IpamError> {
    state.client.find_by_address(&ip).await.map(Json)
}
