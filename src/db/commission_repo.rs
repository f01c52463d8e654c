// src/db/commission_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::commission::{
        CommissionWithdrawal, TransactionKind, WalletTransaction, WithdrawalStatus,
    },
};

#[derive(Clone)]
pub struct CommissionRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  SAQUES
    // =========================================================================

    /// Cria o saque em PENDING. A reserva do valor é implícita: PENDING
    /// entra em `total_reserved` até ser aprovado ou rejeitado.
    pub async fn create_withdrawal<'e, E>(
        &self,
        executor: E,
        requesting_user_id: Uuid,
        franchise_id: Uuid,
        amount: Decimal,
    ) -> Result<CommissionWithdrawal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawal = sqlx::query_as::<_, CommissionWithdrawal>(
            r#"
            INSERT INTO commission_withdrawals (requesting_user_id, franchise_id, amount)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(requesting_user_id)
        .bind(franchise_id)
        .bind(amount)
        .fetch_one(executor)
        .await?;

        Ok(withdrawal)
    }

    /// Busca travando a linha (`FOR UPDATE`): dois admins processando o
    /// mesmo saque ao mesmo tempo serializam aqui, e o segundo enxerga o
    /// status terminal gravado pelo primeiro.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        withdrawal_id: Uuid,
    ) -> Result<Option<CommissionWithdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawal = sqlx::query_as::<_, CommissionWithdrawal>(
            "SELECT * FROM commission_withdrawals WHERE id = $1 FOR UPDATE",
        )
        .bind(withdrawal_id)
        .fetch_optional(executor)
        .await?;

        Ok(withdrawal)
    }

    /// Soma reservada da franquia: saques PENDING e APPROVED. REJECTED fica
    /// de fora, o que devolve a reserva sem nenhum passo explícito.
    pub async fn total_reserved<'e, E>(
        &self,
        executor: E,
        franchise_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM commission_withdrawals
            WHERE franchise_id = $1 AND status IN ('PENDING', 'APPROVED')
            "#,
        )
        .bind(franchise_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        withdrawal_id: Uuid,
        status: WithdrawalStatus,
    ) -> Result<CommissionWithdrawal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CommissionWithdrawal>(
            r#"
            UPDATE commission_withdrawals
            SET status = $2, processed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(withdrawal_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::WithdrawalNotFound)
    }

    /// Fila de aprovação do admin; sem filtro, lista tudo.
    pub async fn list_withdrawals<'e, E>(
        &self,
        executor: E,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<CommissionWithdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawals = sqlx::query_as::<_, CommissionWithdrawal>(
            r#"
            SELECT * FROM commission_withdrawals
            WHERE ($1::withdrawal_status IS NULL OR status = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(withdrawals)
    }

    // =========================================================================
    //  TRILHA DE AUDITORIA (append-only)
    // =========================================================================

    pub async fn insert_wallet_transaction<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> Result<WalletTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, WalletTransaction>(
            r#"
            INSERT INTO wallet_transactions (user_id, kind, amount, reference_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(amount)
        .bind(reference_id)
        .fetch_one(executor)
        .await?;

        Ok(transaction)
    }

    pub async fn list_wallet_transactions<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transactions = sqlx::query_as::<_, WalletTransaction>(
            "SELECT * FROM wallet_transactions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(transactions)
    }
}
