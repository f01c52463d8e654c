// src/handlers/nodes.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::network::NetworkNode};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodePayload {
    #[validate(length(min = 3, max = 32, message = "entre 3 e 32 caracteres"))]
    #[schema(example = "FRETE2024")]
    pub referral_code: String,

    // Código do indicador. Um código que não resolve não é erro: o nó
    // simplesmente não tem indicador e nunca gera comissão.
    #[schema(example = "MATRIZ01")]
    pub referred_by: Option<String>,

    #[serde(default)]
    pub is_admin: bool,
}

// POST /api/nodes
#[utoipa::path(
    post,
    path = "/api/nodes",
    tag = "Network",
    request_body = CreateNodePayload,
    responses(
        (status = 201, description = "Nó registrado na rede", body = NetworkNode),
        (status = 409, description = "Código de indicação já em uso")
    )
)]
pub async fn create_node(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateNodePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let node = app_state
        .network_repo
        .create_node(
            &app_state.db_pool,
            &payload.referral_code,
            payload.referred_by.as_deref(),
            payload.is_admin,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(node)))
}
