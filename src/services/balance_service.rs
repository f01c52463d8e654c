// src/services/balance_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CommissionRepository, NetworkRepository, OrderRepository},
    models::commission::FranchiseBalances,
    models::network::NetworkNode,
};

/// O agregador de saldos: a única fonte de verdade consultada tanto pela
/// validação do pedido de saque quanto pela revalidação na aprovação.
/// Sempre recalcula a partir de pedidos + saques duráveis; comissão não
/// tem saldo corrente cacheado (ao contrário da carteira).
#[derive(Clone)]
pub struct BalanceService {
    network_repo: NetworkRepository,
    order_repo: OrderRepository,
    commission_repo: CommissionRepository,
}

impl BalanceService {
    pub fn new(
        network_repo: NetworkRepository,
        order_repo: OrderRepository,
        commission_repo: CommissionRepository,
    ) -> Self {
        Self {
            network_repo,
            order_repo,
            commission_repo,
        }
    }

    /// Visão pontual dos saldos de uma franquia. Os dois somatórios rodam
    /// na mesma transação para nunca misturar uma aprovação pela metade.
    pub async fn compute_balances<'e, E>(
        &self,
        executor: E,
        franchise_id: Uuid,
    ) -> Result<FranchiseBalances, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sums = self.order_repo.profit_sums(&mut *tx, franchise_id).await?;
        let reserved = self.commission_repo.total_reserved(&mut *tx, franchise_id).await?;

        tx.commit().await?;

        Ok(FranchiseBalances::from_sums(sums, reserved))
    }

    /// Saldos de uma franquia vistos pelo seu indicador, com checagem de
    /// posse: a franquia precisa ter sido indicada pelo solicitante.
    pub async fn balances_for_referrer<'e, E>(
        &self,
        executor: E,
        referrer: &NetworkNode,
        franchise_id: Uuid,
    ) -> Result<FranchiseBalances, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let franchise = self
            .network_repo
            .find_by_id(&mut *tx, franchise_id)
            .await?
            .ok_or(AppError::NodeNotFound)?;

        ensure_referred_by(&franchise, referrer)?;

        let sums = self.order_repo.profit_sums(&mut *tx, franchise_id).await?;
        let reserved = self.commission_repo.total_reserved(&mut *tx, franchise_id).await?;

        tx.commit().await?;

        Ok(FranchiseBalances::from_sums(sums, reserved))
    }

    /// Visão da rede do indicador: cada franquia indicada (um salto só)
    /// com seus saldos calculados.
    pub async fn network_overview<'e, E>(
        &self,
        executor: E,
        referrer: &NetworkNode,
    ) -> Result<Vec<(NetworkNode, FranchiseBalances)>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let franchises = self
            .network_repo
            .list_referred_by(&mut *tx, &referrer.referral_code)
            .await?;

        let mut overview = Vec::with_capacity(franchises.len());
        for franchise in franchises {
            let sums = self.order_repo.profit_sums(&mut *tx, franchise.id).await?;
            let reserved = self
                .commission_repo
                .total_reserved(&mut *tx, franchise.id)
                .await?;
            let balances = FranchiseBalances::from_sums(sums, reserved);
            overview.push((franchise, balances));
        }

        tx.commit().await?;

        Ok(overview)
    }
}

/// Checagem de posse via o diretório de identidade: a franquia aponta de
/// volta para o código do indicador, por valor.
pub fn ensure_referred_by(
    franchise: &NetworkNode,
    referrer: &NetworkNode,
) -> Result<(), AppError> {
    if franchise.referred_by.as_deref() != Some(referrer.referral_code.as_str()) {
        return Err(AppError::FranchiseNotOwned);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::network::AssignedRates;
    use rust_decimal::Decimal;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn node(referral_code: &str, referred_by: Option<&str>) -> NetworkNode {
        NetworkNode {
            id: Uuid::new_v4(),
            referral_code: referral_code.to_string(),
            referred_by: referred_by.map(str::to_string),
            commission_rate: None,
            assigned_rates: Json(AssignedRates::empty()),
            min_commission_rate: None,
            max_commission_rate: None,
            wallet_balance: Decimal::ZERO,
            is_admin: false,
            created_at: None,
        }
    }

    #[test]
    fn franquia_indicada_pelo_solicitante_passa() {
        let referrer = node("MATRIZ01", None);
        let franchise = node("FRETE2024", Some("MATRIZ01"));
        assert!(ensure_referred_by(&franchise, &referrer).is_ok());
    }

    #[test]
    fn franquia_de_outra_rede_e_rejeitada() {
        let referrer = node("MATRIZ01", None);
        let franchise = node("FRETE2024", Some("OUTRA"));
        assert!(matches!(
            ensure_referred_by(&franchise, &referrer),
            Err(AppError::FranchiseNotOwned)
        ));
    }

    #[test]
    fn franquia_sem_indicador_e_rejeitada() {
        let referrer = node("MATRIZ01", None);
        let franchise = node("FRETE2024", None);
        assert!(ensure_referred_by(&franchise, &referrer).is_err());
    }
}
