// src/db/network_repo.rs

use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::network::{AssignedRates, NetworkNode},
};

const NODE_COLUMNS: &str = "id, referral_code, referred_by, commission_rate, assigned_rates, \
     min_commission_rate, max_commission_rate, wallet_balance, is_admin, created_at";

/// Repositório do diretório de identidade: a tabela `users` guarda os nós da
/// rede, seus códigos de indicação e a carteira.
#[derive(Clone)]
pub struct NetworkRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl NetworkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  NÓS DA REDE (Diretório de Identidade)
    // =========================================================================

    pub async fn create_node<'e, E>(
        &self,
        executor: E,
        referral_code: &str,
        referred_by: Option<&str>,
        is_admin: bool,
    ) -> Result<NetworkNode, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO users (referral_code, referred_by, is_admin) \
             VALUES ($1, $2, $3) \
             RETURNING {NODE_COLUMNS}"
        );

        sqlx::query_as::<_, NetworkNode>(&sql)
            .bind(referral_code)
            .bind(referred_by)
            .bind(is_admin)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Converte violação de chave única em um erro mais amigável
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::ReferralCodeAlreadyExists;
                    }
                }
                AppError::DatabaseError(e)
            })
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<NetworkNode>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {NODE_COLUMNS} FROM users WHERE id = $1");

        let node = sqlx::query_as::<_, NetworkNode>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(node)
    }

    /// Resolução por valor do código de indicação: um miss significa
    /// simplesmente "sem indicador", nunca um erro.
    pub async fn find_by_referral_code<'e, E>(
        &self,
        executor: E,
        referral_code: &str,
    ) -> Result<Option<NetworkNode>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {NODE_COLUMNS} FROM users WHERE referral_code = $1");

        let node = sqlx::query_as::<_, NetworkNode>(&sql)
            .bind(referral_code)
            .fetch_optional(executor)
            .await?;

        Ok(node)
    }

    /// Enumera as franquias indicadas por um nó (um único salto na rede).
    pub async fn list_referred_by<'e, E>(
        &self,
        executor: E,
        referral_code: &str,
    ) -> Result<Vec<NetworkNode>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM users WHERE referred_by = $1 ORDER BY created_at ASC"
        );

        let nodes = sqlx::query_as::<_, NetworkNode>(&sql)
            .bind(referral_code)
            .fetch_all(executor)
            .await?;

        Ok(nodes)
    }

    // =========================================================================
    //  CONFIGURAÇÃO DE TAXAS
    // =========================================================================

    pub async fn set_rate_bounds<'e, E>(
        &self,
        executor: E,
        node_id: Uuid,
        min: Decimal,
        max: Decimal,
    ) -> Result<NetworkNode, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE users SET min_commission_rate = $2, max_commission_rate = $3 \
             WHERE id = $1 \
             RETURNING {NODE_COLUMNS}"
        );

        sqlx::query_as::<_, NetworkNode>(&sql)
            .bind(node_id)
            .bind(min)
            .bind(max)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NodeNotFound)
    }

    pub async fn set_commission_rate<'e, E>(
        &self,
        executor: E,
        node_id: Uuid,
        rate: Decimal,
    ) -> Result<NetworkNode, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE users SET commission_rate = $2 WHERE id = $1 RETURNING {NODE_COLUMNS}"
        );

        sqlx::query_as::<_, NetworkNode>(&sql)
            .bind(node_id)
            .bind(rate)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NodeNotFound)
    }

    pub async fn set_assigned_rates<'e, E>(
        &self,
        executor: E,
        node_id: Uuid,
        rates: &AssignedRates,
    ) -> Result<NetworkNode, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE users SET assigned_rates = $2 WHERE id = $1 RETURNING {NODE_COLUMNS}"
        );

        sqlx::query_as::<_, NetworkNode>(&sql)
            .bind(node_id)
            .bind(Json(rates))
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NodeNotFound)
    }

    // =========================================================================
    //  CARTEIRA
    // =========================================================================

    /// Lê o saldo corrente travando a linha (`FOR UPDATE`). Usado pela
    /// aprovação de saque para revalidar o saldo contra aprovações
    /// concorrentes antes de debitar.
    pub async fn wallet_balance_for_update<'e, E>(
        &self,
        executor: E,
        node_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT wallet_balance FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(node_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NodeNotFound)
    }

    /// Aplica um delta (positivo = crédito, negativo = débito) e retorna o
    /// novo saldo. O CHECK de não-negatividade no banco é a última linha de
    /// defesa; o fluxo de aprovação revalida antes com `FOR UPDATE`.
    pub async fn adjust_wallet<'e, E>(
        &self,
        executor: E,
        node_id: Uuid,
        delta: Decimal,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Decimal>(
            "UPDATE users SET wallet_balance = wallet_balance + $2 \
             WHERE id = $1 \
             RETURNING wallet_balance",
        )
        .bind(node_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NodeNotFound)
    }
}
