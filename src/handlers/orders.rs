// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::validate_positive_amount,
    models::order::{Order, ShipmentStatus},
};

// =============================================================================
//  FRONTEIRA COM A FONTE DE PEDIDOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookOrderPayload {
    pub owner_node_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "correios")]
    pub provider_id: String,

    #[validate(custom(function = validate_positive_amount))]
    #[schema(example = "2.500")]
    pub chargeable_weight: Decimal,

    #[validate(custom(function = validate_positive_amount))]
    #[schema(example = "100.00")]
    pub base_shipping_charge: Decimal,

    pub initial_status: Option<ShipmentStatus>,
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = BookOrderPayload,
    responses(
        (status = 201, description = "Pedido reservado com a comissão carimbada", body = Order),
        (status = 404, description = "Nó dono do pedido não encontrado")
    )
)]
pub async fn book_order(
    State(app_state): State<AppState>,
    Json(payload): Json<BookOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state
        .commission_service
        .book_order(
            &app_state.db_pool,
            payload.owner_node_id,
            &payload.provider_id,
            payload.chargeable_weight,
            payload.base_shipping_charge,
            payload.initial_status,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShipmentStatusPayload {
    #[schema(example = "DELIVERED")]
    pub shipment_status: ShipmentStatus,
}

// PATCH /api/orders/{id}/status
#[utoipa::path(
    patch,
    path = "/api/orders/{order_id}/status",
    tag = "Orders",
    request_body = UpdateShipmentStatusPayload,
    responses(
        (status = 200, description = "Status do envio avançado", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn update_shipment_status(
    State(app_state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateShipmentStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .commission_service
        .update_shipment_status(&app_state.db_pool, order_id, payload.shipment_status)
        .await?;

    Ok((StatusCode::OK, Json(order)))
}
