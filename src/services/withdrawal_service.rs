// src/services/withdrawal_service.rs

use anyhow::anyhow;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::db_utils::lock_franchise,
    common::error::AppError,
    db::{CommissionRepository, NetworkRepository, OrderRepository},
    models::commission::{
        CommissionWithdrawal, TransactionKind, WalletTransaction, WithdrawalDecision,
        WithdrawalStatus,
    },
    models::network::NetworkNode,
    services::balance_service::{ensure_referred_by, BalanceService},
};

// =============================================================================
//  GUARDAS PURAS DA MÁQUINA DE ESTADOS
// =============================================================================

/// PENDING -> APPROVED ou PENDING -> REJECTED, nada mais. Reprocessar um
/// saque terminal é rejeitado aqui, antes de qualquer efeito colateral.
pub fn ensure_pending(status: WithdrawalStatus) -> Result<(), AppError> {
    if status.is_terminal() {
        return Err(AppError::AlreadyProcessed);
    }
    Ok(())
}

/// Valida o pedido contra o disponível calculado no momento da checagem.
pub fn ensure_available(amount: Decimal, available: Decimal) -> Result<(), AppError> {
    if amount > available {
        return Err(AppError::InsufficientBalance { available });
    }
    Ok(())
}

/// A carteira precisa cobrir o valor na hora da aprovação: o saldo pode
/// ter sido consumido por outra aprovação entre o pedido e o processamento.
pub fn ensure_wallet_covers(wallet_balance: Decimal, amount: Decimal) -> Result<(), AppError> {
    if wallet_balance < amount {
        return Err(AppError::InsufficientFunds);
    }
    Ok(())
}

// =============================================================================
//  SERVIÇO: o ledger de saques
// =============================================================================

/// O único caminho que muta a carteira do indicador e as flags de consumo
/// dos pedidos. Toda mutação acontece dentro de uma transação com lock
/// advisory por franquia.
#[derive(Clone)]
pub struct WithdrawalService {
    network_repo: NetworkRepository,
    order_repo: OrderRepository,
    commission_repo: CommissionRepository,
    balance_service: BalanceService,
}

impl WithdrawalService {
    pub fn new(
        network_repo: NetworkRepository,
        order_repo: OrderRepository,
        commission_repo: CommissionRepository,
        balance_service: BalanceService,
    ) -> Self {
        Self {
            network_repo,
            order_repo,
            commission_repo,
            balance_service,
        }
    }

    /// Pedido de saque do indicador contra uma franquia da sua rede.
    ///
    /// O lock advisory serializa pedidos concorrentes sobre a mesma
    /// franquia: de dois pedidos que individualmente cabem mas juntos
    /// estouram o disponível, exatamente um passa. Nenhuma carteira ou
    /// pedido é tocado aqui; o PENDING criado já reserva o valor.
    pub async fn request_withdrawal<'e, E>(
        &self,
        executor: E,
        referrer: &NetworkNode,
        franchise_id: Uuid,
        amount: Decimal,
    ) -> Result<CommissionWithdrawal, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        lock_franchise(&mut *tx, franchise_id).await?;

        let franchise = self
            .network_repo
            .find_by_id(&mut *tx, franchise_id)
            .await?
            .ok_or(AppError::NodeNotFound)?;

        ensure_referred_by(&franchise, referrer)?;

        let balances = self
            .balance_service
            .compute_balances(&mut *tx, franchise_id)
            .await?;

        ensure_available(amount, balances.available_balance)?;

        let withdrawal = self
            .commission_repo
            .create_withdrawal(&mut *tx, referrer.id, franchise_id, amount)
            .await?;

        tx.commit().await?;

        tracing::info!(
            withdrawal_id = %withdrawal.id,
            referrer = %referrer.id,
            franchise = %franchise_id,
            amount = %amount,
            "saque solicitado (PENDING)"
        );

        Ok(withdrawal)
    }

    /// Decisão do admin sobre um saque PENDING.
    ///
    /// REJECTED: só o status muda; a reserva volta sozinha porque REJECTED
    /// sai de `total_reserved`.
    ///
    /// APPROVED: os cinco passos rodam como uma unidade atômica —
    /// revalidar carteira, debitar, consumir os pedidos DELIVERED ainda
    /// não consumidos, registrar o DEBIT na trilha, virar o status.
    /// Qualquer falha desfaz tudo e o saque continua PENDING; reprocessar
    /// é seguro porque o estado terminal é checado primeiro.
    pub async fn process_withdrawal<'e, E>(
        &self,
        executor: E,
        withdrawal_id: Uuid,
        decision: WithdrawalDecision,
    ) -> Result<CommissionWithdrawal, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let withdrawal = self
            .commission_repo
            .find_for_update(&mut *tx, withdrawal_id)
            .await?
            .ok_or(AppError::WithdrawalNotFound)?;

        ensure_pending(withdrawal.status)?;

        if decision == WithdrawalDecision::Rejected {
            let withdrawal = self
                .commission_repo
                .set_status(&mut *tx, withdrawal_id, WithdrawalStatus::Rejected)
                .await?;

            tx.commit().await?;

            tracing::info!(withdrawal_id = %withdrawal_id, "saque rejeitado");
            return Ok(withdrawal);
        }

        // O fluxo sem franquia (franchise_id nulo) não passa por este ledger.
        let franchise_id = withdrawal.franchise_id.ok_or_else(|| {
            AppError::InternalServerError(anyhow!(
                "saque {} sem franquia associada no fluxo de franquia",
                withdrawal_id
            ))
        })?;

        lock_franchise(&mut *tx, franchise_id).await?;

        // 1. Revalida o saldo corrente da carteira contra aprovações
        //    concorrentes que possam ter consumido o saldo nesse meio tempo.
        let wallet_balance = self
            .network_repo
            .wallet_balance_for_update(&mut *tx, withdrawal.requesting_user_id)
            .await?;

        ensure_wallet_covers(wallet_balance, withdrawal.amount)?;

        // 2. Debita a carteira.
        self.network_repo
            .adjust_wallet(&mut *tx, withdrawal.requesting_user_id, -withdrawal.amount)
            .await?;

        // 3. Consome todos os pedidos atualmente elegíveis da franquia,
        //    para que nunca voltem a contar como sacáveis.
        let consumed = self
            .order_repo
            .consume_withdrawable(&mut *tx, franchise_id)
            .await?;

        // 4. Registra o movimento na trilha de auditoria.
        self.commission_repo
            .insert_wallet_transaction(
                &mut *tx,
                withdrawal.requesting_user_id,
                TransactionKind::Debit,
                withdrawal.amount,
                Some(withdrawal.id),
            )
            .await?;

        // 5. Vira o status: APPROVED é terminal.
        let withdrawal = self
            .commission_repo
            .set_status(&mut *tx, withdrawal_id, WithdrawalStatus::Approved)
            .await?;

        tx.commit().await?;

        tracing::info!(
            withdrawal_id = %withdrawal_id,
            amount = %withdrawal.amount,
            consumed_orders = consumed,
            "saque aprovado e debitado"
        );

        Ok(withdrawal)
    }

    /// Crédito de carteira vindo da liquidação de pagamentos do sistema
    /// externo. Incrementa o saldo e registra o CREDIT na mesma transação.
    pub async fn credit_wallet<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        amount: Decimal,
        reference_id: Option<Uuid>,
    ) -> Result<WalletTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let new_balance = self
            .network_repo
            .adjust_wallet(&mut *tx, user_id, amount)
            .await?;

        let transaction = self
            .commission_repo
            .insert_wallet_transaction(
                &mut *tx,
                user_id,
                TransactionKind::Credit,
                amount,
                reference_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            user = %user_id,
            amount = %amount,
            new_balance = %new_balance,
            "carteira creditada"
        );

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn so_pending_pode_ser_processado() {
        assert!(ensure_pending(WithdrawalStatus::Pending).is_ok());
        assert!(matches!(
            ensure_pending(WithdrawalStatus::Approved),
            Err(AppError::AlreadyProcessed)
        ));
        assert!(matches!(
            ensure_pending(WithdrawalStatus::Rejected),
            Err(AppError::AlreadyProcessed)
        ));
    }

    #[test]
    fn pedido_acima_do_disponivel_falha_com_o_valor_calculado() {
        // Cenário: comissão sacável de 10; pedir 15 falha, pedir 10 passa.
        let err = ensure_available(dec!(15), dec!(10)).unwrap_err();
        match err {
            AppError::InsufficientBalance { available } => assert_eq!(available, dec!(10)),
            other => panic!("erro inesperado: {other:?}"),
        }

        assert!(ensure_available(dec!(10), dec!(10)).is_ok());
    }

    #[test]
    fn carteira_nunca_pode_ficar_negativa() {
        assert!(matches!(
            ensure_wallet_covers(dec!(9.99), dec!(10)),
            Err(AppError::InsufficientFunds)
        ));
        assert!(ensure_wallet_covers(dec!(10), dec!(10)).is_ok());
        assert!(ensure_wallet_covers(dec!(20), dec!(10)).is_ok());
    }
}
