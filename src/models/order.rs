// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

/// Ciclo de vida do envio. Quem transiciona é a Fonte de Pedidos;
/// o ledger apenas lê este campo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "shipment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    Processing,
    Manifested,
    Dispatched,
    InTransit,
    Delivered,  // Estado terminal de sucesso: libera a comissão
    Cancelled,  // Exclui a comissão permanentemente
    Rto,        // Devolvido ao remetente
    NotPicked,
}

// --- Structs ---

/// Um envio reservado por um nó da rede. A comissão do indicador é carimbada
/// uma única vez na criação (`franchise_commission_amount`) e nunca é
/// recalculada a partir da taxa corrente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,

    pub owner_node_id: Uuid,

    #[schema(example = "correios")]
    pub provider_id: String,

    #[schema(example = "2.500")]
    pub chargeable_weight: Decimal,

    // O custo da própria transportadora (o que a rede paga upstream).
    #[schema(example = "100.00")]
    pub base_shipping_charge: Decimal,

    // O valor cobrado do cliente final: base + comissão.
    #[schema(example = "110.00")]
    pub shipping_charge: Decimal,

    #[schema(example = "10.00")]
    pub franchise_commission_amount: Decimal,

    pub shipment_status: ShipmentStatus,

    // Vira `true` exatamente uma vez, dentro da transação de aprovação de
    // saque. Depois disso o pedido sai de qualquer agregado sacável.
    pub is_franchise_withdrawn: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializa_no_formato_do_banco() {
        assert_eq!(
            serde_json::to_value(ShipmentStatus::InTransit).unwrap(),
            serde_json::json!("IN_TRANSIT")
        );
        assert_eq!(
            serde_json::to_value(ShipmentStatus::NotPicked).unwrap(),
            serde_json::json!("NOT_PICKED")
        );
    }
}
