// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::commission::OrderProfitSums,
    models::order::{Order, ShipmentStatus},
};

#[derive(Clone)]
pub struct OrderRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  INGESTÃO (Fronteira com a Fonte de Pedidos)
    // =========================================================================

    /// Insere um pedido já com a comissão carimbada pelo calculador.
    /// `is_franchise_withdrawn` nasce FALSE e só o ledger de saques o vira.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        owner_node_id: Uuid,
        provider_id: &str,
        chargeable_weight: Decimal,
        base_shipping_charge: Decimal,
        shipping_charge: Decimal,
        franchise_commission_amount: Decimal,
        shipment_status: ShipmentStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                owner_node_id, provider_id, chargeable_weight,
                base_shipping_charge, shipping_charge,
                franchise_commission_amount, shipment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(owner_node_id)
        .bind(provider_id)
        .bind(chargeable_weight)
        .bind(base_shipping_charge)
        .bind(shipping_charge)
        .bind(franchise_commission_amount)
        .bind(shipment_status)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    /// Avança o status do envio. Só a Fonte de Pedidos chama este caminho;
    /// o núcleo do ledger nunca escreve `shipment_status`.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        new_status: ShipmentStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET shipment_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(new_status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::OrderNotFound)
    }

    // =========================================================================
    //  AGREGAÇÃO (leitura pura, sem cache)
    // =========================================================================

    /// Somatórios de comissão da franquia em uma única passada.
    /// Sacável: DELIVERED e ainda não consumido. Em trânsito: nem DELIVERED
    /// nem CANCELLED (cancelado fica fora de tudo menos do total histórico).
    pub async fn profit_sums<'e, E>(
        &self,
        executor: E,
        franchise_id: Uuid,
    ) -> Result<OrderProfitSums, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sums = sqlx::query_as::<_, OrderProfitSums>(
            r#"
            SELECT
                COALESCE(SUM(franchise_commission_amount), 0) AS total_profit,
                COALESCE(SUM(franchise_commission_amount) FILTER (
                    WHERE shipment_status = 'DELIVERED' AND NOT is_franchise_withdrawn
                ), 0) AS withdrawable_profit,
                COALESCE(SUM(franchise_commission_amount) FILTER (
                    WHERE shipment_status NOT IN ('DELIVERED', 'CANCELLED')
                      AND NOT is_franchise_withdrawn
                ), 0) AS pending_profit
            FROM orders
            WHERE owner_node_id = $1
            "#,
        )
        .bind(franchise_id)
        .fetch_one(executor)
        .await?;

        Ok(sums)
    }

    // =========================================================================
    //  CONSUMO (só dentro da transação de aprovação)
    // =========================================================================

    /// Marca como consumidos todos os pedidos atualmente elegíveis da
    /// franquia. O flip é de mão única; pedidos já consumidos não são
    /// tocados de novo. Retorna quantas linhas foram viradas.
    pub async fn consume_withdrawable<'e, E>(
        &self,
        executor: E,
        franchise_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET is_franchise_withdrawn = TRUE, updated_at = NOW()
            WHERE owner_node_id = $1
              AND shipment_status = 'DELIVERED'
              AND NOT is_franchise_withdrawn
            "#,
        )
        .bind(franchise_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
