// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Capability discovery.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Extension, Json,
};

use crate::dispatch::RouteTable;
use crate::error::{join_methods, ApiResult};
use crate::gate::CorsHeaders;
use crate::response::CapabilityResponse;
use crate::state::AppState;

/// OPTIONS /*
///
/// Lists the declared routes with their permission requirements. Runs outside
/// the gate chain, so it sets its own `Allow` and CORS headers.
pub async fn capabilities(
    State(state): State<AppState>,
    Extension(table): Extension<Arc<RouteTable>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let mut response_headers = HeaderMap::new();

    let cors = CorsHeaders::from_config(&state.config.cors)?;
    cors.apply(headers.get(header::ORIGIN), &mut response_headers);

    if let Ok(allow) = HeaderValue::try_from(join_methods(&table.methods())) {
        response_headers.insert(header::ALLOW, allow);
    }

    let body = CapabilityResponse {
        service: crate::SERVICE_NAME,
        version: crate::VERSION,
        routes: table.descriptors(),
    };

    Ok((response_headers, Json(body)))
}
