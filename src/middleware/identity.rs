// src/middleware/identity.rs

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::network::NetworkNode};

// A autenticação de verdade mora no sistema externo. Este guard é o ponto
// de costura: resolve o cabeçalho `x-node-id` no diretório de identidade
// e injeta o nó nas extensions da requisição.
pub async fn identity_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let node = resolve_node(&app_state, request.headers()).await?;

    request.extensions_mut().insert(node);
    Ok(next.run(request).await)
}

// Mesma resolução, mas a rota só abre para nós com `is_admin`.
pub async fn admin_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let node = resolve_node(&app_state, request.headers()).await?;

    if !node.is_admin {
        return Err(AppError::AdminOnly);
    }

    request.extensions_mut().insert(node);
    Ok(next.run(request).await)
}

async fn resolve_node(app_state: &AppState, headers: &HeaderMap) -> Result<NetworkNode, AppError> {
    let raw = headers
        .get("x-node-id")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::MissingIdentity)?;

    let node_id = Uuid::parse_str(raw).map_err(|_| AppError::MissingIdentity)?;

    app_state
        .network_repo
        .find_by_id(&app_state.db_pool, node_id)
        .await?
        .ok_or(AppError::MissingIdentity)
}

// Extrator para obter o nó resolvido diretamente nos handlers
pub struct CurrentNode(pub NetworkNode);

impl<S> FromRequestParts<S> for CurrentNode
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<NetworkNode>()
            .cloned()
            .map(CurrentNode)
            .ok_or(AppError::MissingIdentity)
    }
}
