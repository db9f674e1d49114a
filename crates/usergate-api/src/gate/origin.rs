// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Cross-origin response annotation.

use axum::http::{header, HeaderMap, HeaderValue};

use super::{Gate, GateContext, GateOutcome, GateRequest};
use crate::config::CorsConfig;
use crate::error::ConfigurationError;

/// Precomputed CORS response headers.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    any_origin: bool,
    origins: Vec<HeaderValue>,
    methods: HeaderValue,
    headers: HeaderValue,
}

impl CorsHeaders {
    /// Builds the header values from configuration.
    pub fn from_config(config: &CorsConfig) -> Result<Self, ConfigurationError> {
        let value = |key: &str, raw: String| {
            HeaderValue::try_from(raw)
                .map_err(|e| ConfigurationError::invalid(key, e.to_string()))
        };

        let origins = config
            .allowed_origins
            .iter()
            .filter(|o| o.as_str() != "*")
            .map(|o| value("cors.allowed_origins", o.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            any_origin: config.allows_any_origin(),
            origins,
            methods: value("cors.allowed_methods", config.allowed_methods.join(", "))?,
            headers: value("cors.allowed_headers", config.allowed_headers.join(", "))?,
        })
    }

    /// Writes the CORS headers for a request from `origin` into `out`.
    ///
    /// With an origin allowlist the request's origin is echoed back only if
    /// listed, and nothing is written for other origins.
    pub fn apply(&self, origin: Option<&HeaderValue>, out: &mut HeaderMap) {
        let allow_origin = if self.any_origin {
            Some(HeaderValue::from_static("*"))
        } else {
            out.append(header::VARY, HeaderValue::from_static("Origin"));
            origin.filter(|o| self.origins.contains(o)).cloned()
        };

        if let Some(allow_origin) = allow_origin {
            out.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
            out.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.headers.clone());
            out.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.methods.clone());
        }
    }
}

/// Adds CORS headers to every response. Never rejects.
#[derive(Debug, Clone)]
pub struct OriginGate {
    cors: CorsHeaders,
}

impl OriginGate {
    /// Creates the gate from configuration.
    pub fn new(config: &CorsConfig) -> Result<Self, ConfigurationError> {
        Ok(Self {
            cors: CorsHeaders::from_config(config)?,
        })
    }
}

impl Gate for OriginGate {
    fn name(&self) -> &'static str {
        "origin"
    }

    fn evaluate(&self, request: &GateRequest<'_>, ctx: &mut GateContext) -> GateOutcome {
        self.cors
            .apply(request.headers.get(header::ORIGIN), &mut ctx.response_headers);
        GateOutcome::Pass
    }
}
