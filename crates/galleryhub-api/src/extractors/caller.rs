//! `Caller` extractor, reading the identity forwarded by the trusted gateway.
//!
//! The gateway authenticates the photographer and forwards who they are in
//! `x-owner-id`, `x-owner-handle` and `x-owner-tier`. This service never sees
//! credentials.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use galleryhub_core::error::AppError;
use galleryhub_core::types::OwnerId;
use galleryhub_entity::plan::PlanTier;
use galleryhub_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Owner identifier header.
pub const OWNER_ID_HEADER: &str = "x-owner-id";
/// Owner handle header, used as the first slug segment.
pub const OWNER_HANDLE_HEADER: &str = "x-owner-handle";
/// Current plan tier header.
pub const OWNER_TIER_HEADER: &str = "x-owner-tier";
/// Role header set by the gateway for operator traffic.
pub const GATEWAY_ROLE_HEADER: &str = "x-gateway-role";

/// Extracted caller context available in handlers.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl Caller {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::authorization(format!("Missing {name} header")))
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let owner_id = header(parts, OWNER_ID_HEADER)?
            .parse::<Uuid>()
            .map(OwnerId::from_uuid)
            .map_err(|_| AppError::authorization(format!("Invalid {OWNER_ID_HEADER} header")))?;

        let handle = header(parts, OWNER_HANDLE_HEADER)?;
        let tier: PlanTier = header(parts, OWNER_TIER_HEADER)?.parse()?;

        Ok(Caller(RequestContext::new(owner_id, handle, tier)))
    }
}

/// Operator traffic, e.g. the billing workflow or an on-call engineer.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller;

impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match header(parts, GATEWAY_ROLE_HEADER) {
            Ok(role) if role.eq_ignore_ascii_case("admin") => Ok(AdminCaller),
            _ => Err(AppError::authorization("Admin access required").into()),
        }
    }
}
