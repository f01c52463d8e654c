// src/handlers/admin.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{validate_percent_rate, validate_positive_amount},
    models::commission::{
        CommissionWithdrawal, WalletTransaction, WithdrawalDecision, WithdrawalStatus,
    },
    models::network::{AssignedRates, NetworkNode},
};

// =============================================================================
//  FILA DE APROVAÇÃO DE SAQUES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessWithdrawalPayload {
    #[schema(example = "APPROVED")]
    pub decision: WithdrawalDecision,
}

// POST /api/admin/withdrawals/{id}/process
#[utoipa::path(
    post,
    path = "/api/admin/withdrawals/{withdrawal_id}/process",
    tag = "Admin",
    request_body = ProcessWithdrawalPayload,
    responses(
        (status = 200, description = "Saque processado (estado terminal)", body = CommissionWithdrawal),
        (status = 404, description = "Saque não encontrado"),
        (status = 409, description = "Saque já processado"),
        (status = 422, description = "Carteira não cobre o valor")
    ),
    params(
        ("withdrawal_id" = Uuid, Path, description = "ID do Saque"),
        ("x-node-id" = Uuid, Header, description = "ID do admin")
    ),
    security(("api_node" = []))
)]
pub async fn process_withdrawal(
    State(app_state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    Json(payload): Json<ProcessWithdrawalPayload>,
) -> Result<impl IntoResponse, AppError> {
    let withdrawal = app_state
        .withdrawal_service
        .process_withdrawal(&app_state.db_pool, withdrawal_id, payload.decision)
        .await?;

    Ok((StatusCode::OK, Json(withdrawal)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListWithdrawalsQuery {
    pub status: Option<WithdrawalStatus>,
}

// GET /api/admin/withdrawals
#[utoipa::path(
    get,
    path = "/api/admin/withdrawals",
    tag = "Admin",
    responses(
        (status = 200, description = "Saques, opcionalmente filtrados por status", body = [CommissionWithdrawal])
    ),
    params(
        ListWithdrawalsQuery,
        ("x-node-id" = Uuid, Header, description = "ID do admin")
    ),
    security(("api_node" = []))
)]
pub async fn list_withdrawals(
    State(app_state): State<AppState>,
    Query(query): Query<ListWithdrawalsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let withdrawals = app_state
        .commission_repo
        .list_withdrawals(&app_state.db_pool, query.status)
        .await?;

    Ok(Json(withdrawals))
}

// =============================================================================
//  CONFIGURAÇÃO DE TAXAS DOS NÓS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRateBoundsPayload {
    #[schema(example = "5.00")]
    pub min_commission_rate: Decimal,

    #[schema(example = "8.00")]
    pub max_commission_rate: Decimal,
}

// POST /api/admin/nodes/{id}/rate-bounds
#[utoipa::path(
    post,
    path = "/api/admin/nodes/{node_id}/rate-bounds",
    tag = "Admin",
    request_body = SetRateBoundsPayload,
    responses(
        (status = 200, description = "Limites de taxa impostos ao nó", body = NetworkNode),
        (status = 400, description = "Faixa inválida"),
        (status = 404, description = "Nó não encontrado")
    ),
    params(
        ("node_id" = Uuid, Path, description = "ID do Nó"),
        ("x-node-id" = Uuid, Header, description = "ID do admin")
    ),
    security(("api_node" = []))
)]
pub async fn set_rate_bounds(
    State(app_state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Json(payload): Json<SetRateBoundsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let node = app_state
        .commission_service
        .set_rate_bounds(
            &app_state.db_pool,
            node_id,
            payload.min_commission_rate,
            payload.max_commission_rate,
        )
        .await?;

    Ok((StatusCode::OK, Json(node)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetCommissionRatePayload {
    #[validate(custom(function = validate_percent_rate))]
    #[schema(example = "10.00")]
    pub commission_rate: Decimal,
}

// POST /api/admin/nodes/{id}/commission-rate
#[utoipa::path(
    post,
    path = "/api/admin/nodes/{node_id}/commission-rate",
    tag = "Admin",
    request_body = SetCommissionRatePayload,
    responses(
        (status = 200, description = "Taxa plana persistida, já limitada aos bounds do nó", body = NetworkNode),
        (status = 404, description = "Nó não encontrado")
    ),
    params(
        ("node_id" = Uuid, Path, description = "ID do Nó"),
        ("x-node-id" = Uuid, Header, description = "ID do admin")
    ),
    security(("api_node" = []))
)]
pub async fn set_commission_rate(
    State(app_state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Json(payload): Json<SetCommissionRatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let node = app_state
        .commission_service
        .set_commission_rate(&app_state.db_pool, node_id, payload.commission_rate)
        .await?;

    Ok((StatusCode::OK, Json(node)))
}

// POST /api/admin/nodes/{id}/assigned-rates
#[utoipa::path(
    post,
    path = "/api/admin/nodes/{node_id}/assigned-rates",
    tag = "Admin",
    request_body = AssignedRates,
    responses(
        (status = 200, description = "Mapeamento de taxas por transportadora substituído", body = NetworkNode),
        (status = 400, description = "Estrutura de assigned_rates inválida"),
        (status = 404, description = "Nó não encontrado")
    ),
    params(
        ("node_id" = Uuid, Path, description = "ID do Nó"),
        ("x-node-id" = Uuid, Header, description = "ID do admin")
    ),
    security(("api_node" = []))
)]
pub async fn set_assigned_rates(
    State(app_state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Json(payload): Json<AssignedRates>,
) -> Result<impl IntoResponse, AppError> {
    let node = app_state
        .commission_service
        .set_assigned_rates(&app_state.db_pool, node_id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(node)))
}

// =============================================================================
//  CRÉDITO DE CARTEIRA (liquidação de pagamentos)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditWalletPayload {
    pub user_id: Uuid,

    #[validate(custom(function = validate_positive_amount))]
    #[schema(example = "250.00")]
    pub amount: Decimal,

    // Pagamento externo que originou o crédito.
    pub reference_id: Option<Uuid>,
}

// POST /api/admin/wallet/credit
#[utoipa::path(
    post,
    path = "/api/admin/wallet/credit",
    tag = "Admin",
    request_body = CreditWalletPayload,
    responses(
        (status = 201, description = "Carteira creditada, CREDIT registrado na trilha", body = WalletTransaction),
        (status = 404, description = "Nó não encontrado")
    ),
    params(
        ("x-node-id" = Uuid, Header, description = "ID do admin")
    ),
    security(("api_node" = []))
)]
pub async fn credit_wallet(
    State(app_state): State<AppState>,
    Json(payload): Json<CreditWalletPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let transaction = app_state
        .withdrawal_service
        .credit_wallet(
            &app_state.db_pool,
            payload.user_id,
            payload.amount,
            payload.reference_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
