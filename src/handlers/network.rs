// src/handlers/network.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::validate_positive_amount,
    middleware::identity::CurrentNode,
    models::commission::{CommissionWithdrawal, FranchiseBalances, WalletTransaction},
    models::network::NetworkNode,
};

// =============================================================================
//  VISÃO DA REDE DO INDICADOR
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FranchiseOverview {
    pub franchise: NetworkNode,
    pub balances: FranchiseBalances,
}

// GET /api/network/franchises
#[utoipa::path(
    get,
    path = "/api/network/franchises",
    tag = "Network",
    responses(
        (status = 200, description = "Franquias indicadas pelo nó, com saldos", body = [FranchiseOverview])
    ),
    params(
        ("x-node-id" = Uuid, Header, description = "ID do nó solicitante")
    ),
    security(("api_node" = []))
)]
pub async fn list_franchises(
    State(app_state): State<AppState>,
    CurrentNode(node): CurrentNode,
) -> Result<impl IntoResponse, AppError> {
    let overview = app_state
        .balance_service
        .network_overview(&app_state.db_pool, &node)
        .await?;

    let response: Vec<FranchiseOverview> = overview
        .into_iter()
        .map(|(franchise, balances)| FranchiseOverview { franchise, balances })
        .collect();

    Ok(Json(response))
}

// GET /api/network/balances/{franchise_id}
#[utoipa::path(
    get,
    path = "/api/network/balances/{franchise_id}",
    tag = "Network",
    responses(
        (status = 200, description = "Saldos da franquia", body = FranchiseBalances),
        (status = 404, description = "Franquia inexistente ou fora da rede do solicitante")
    ),
    params(
        ("franchise_id" = Uuid, Path, description = "ID da Franquia"),
        ("x-node-id" = Uuid, Header, description = "ID do nó solicitante")
    ),
    security(("api_node" = []))
)]
pub async fn get_balances(
    State(app_state): State<AppState>,
    CurrentNode(node): CurrentNode,
    Path(franchise_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let balances = app_state
        .balance_service
        .balances_for_referrer(&app_state.db_pool, &node, franchise_id)
        .await?;

    Ok(Json(balances))
}

// =============================================================================
//  SAQUE DE COMISSÃO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithdrawalPayload {
    pub franchise_id: Uuid,

    #[validate(custom(function = validate_positive_amount))]
    #[schema(example = "10.00")]
    pub amount: Decimal,
}

// POST /api/network/withdrawals
#[utoipa::path(
    post,
    path = "/api/network/withdrawals",
    tag = "Network",
    request_body = RequestWithdrawalPayload,
    responses(
        (status = 201, description = "Saque criado em PENDING (valor reservado)", body = CommissionWithdrawal),
        (status = 404, description = "Franquia inexistente ou fora da rede"),
        (status = 422, description = "Valor acima do disponível")
    ),
    params(
        ("x-node-id" = Uuid, Header, description = "ID do nó solicitante")
    ),
    security(("api_node" = []))
)]
pub async fn request_withdrawal(
    State(app_state): State<AppState>,
    CurrentNode(node): CurrentNode,
    Json(payload): Json<RequestWithdrawalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let withdrawal = app_state
        .withdrawal_service
        .request_withdrawal(
            &app_state.db_pool,
            &node,
            payload.franchise_id,
            payload.amount,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(withdrawal)))
}

// =============================================================================
//  TRILHA DE AUDITORIA DA CARTEIRA
// =============================================================================

// GET /api/network/wallet/transactions
#[utoipa::path(
    get,
    path = "/api/network/wallet/transactions",
    tag = "Network",
    responses(
        (status = 200, description = "Movimentos da carteira, mais recentes primeiro", body = [WalletTransaction])
    ),
    params(
        ("x-node-id" = Uuid, Header, description = "ID do nó solicitante")
    ),
    security(("api_node" = []))
)]
pub async fn list_wallet_transactions(
    State(app_state): State<AppState>,
    CurrentNode(node): CurrentNode,
) -> Result<impl IntoResponse, AppError> {
    let transactions = app_state
        .commission_repo
        .list_wallet_transactions(&app_state.db_pool, node.id)
        .await?;

    Ok(Json(transactions))
}
