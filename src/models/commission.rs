// src/models/commission.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "withdrawal_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved, // Terminal
    Rejected, // Terminal
}

impl WithdrawalStatus {
    /// As transições são de mão única: uma vez APPROVED ou REJECTED,
    /// o saque é imutável.
    pub fn is_terminal(self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }
}

/// Decisão do admin sobre um saque PENDING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
    Failed,
}

// --- Structs ---

/// Pedido de resgate de comissão acumulada de uma franquia.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionWithdrawal {
    pub id: Uuid,

    // O indicador dono da rede, que recebe o valor na carteira.
    pub requesting_user_id: Uuid,

    // A franquia cujos pedidos estão sendo resgatados. `None` indica o
    // fluxo de saque fora do escopo de franquia.
    pub franchise_id: Option<Uuid>,

    #[schema(example = "10.00")]
    pub amount: Decimal,

    pub status: WithdrawalStatus,

    pub created_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Registro imutável de variação de carteira. Append-only: nunca sofre
/// UPDATE nem DELETE; `reference_id` aponta para o saque ou pagamento
/// que originou o movimento.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: Uuid,

    pub user_id: Uuid,

    pub kind: TransactionKind,

    pub status: TransactionStatus,

    #[schema(example = "10.00")]
    pub amount: Decimal,

    pub reference_id: Option<Uuid>,

    pub created_at: Option<DateTime<Utc>>,
}

// --- Agregados de saldo ---

/// Somatórios derivados dos pedidos de uma franquia, sempre recalculados
/// a partir das linhas duráveis (não existe saldo de comissão cacheado).
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct OrderProfitSums {
    pub total_profit: Decimal,
    pub withdrawable_profit: Decimal,
    pub pending_profit: Decimal,
}

/// A visão pontual do que o indicador de uma franquia pode sacar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FranchiseBalances {
    #[schema(example = "10.00")]
    pub total_profit: Decimal,

    #[schema(example = "10.00")]
    pub withdrawable_profit: Decimal,

    #[schema(example = "0.00")]
    pub pending_profit: Decimal,

    #[schema(example = "0.00")]
    pub total_withdrawn: Decimal,

    #[schema(example = "10.00")]
    pub available_balance: Decimal,
}

impl FranchiseBalances {
    /// Combina os somatórios em uma visão consistente. Um saque PENDING já
    /// reserva fundos (entra em `total_withdrawn`), então o disponível
    /// nunca fica negativo mesmo com reservas acima do sacável.
    pub fn from_sums(sums: OrderProfitSums, total_withdrawn: Decimal) -> Self {
        let available = (sums.withdrawable_profit - total_withdrawn).max(Decimal::ZERO);

        Self {
            total_profit: sums.total_profit,
            withdrawable_profit: sums.withdrawable_profit,
            pending_profit: sums.pending_profit,
            total_withdrawn,
            available_balance: available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pending_nao_e_terminal_e_os_demais_sao() {
        assert!(!WithdrawalStatus::Pending.is_terminal());
        assert!(WithdrawalStatus::Approved.is_terminal());
        assert!(WithdrawalStatus::Rejected.is_terminal());
    }

    #[test]
    fn disponivel_e_sacavel_menos_reservado() {
        let sums = OrderProfitSums {
            total_profit: dec!(25),
            withdrawable_profit: dec!(10),
            pending_profit: dec!(15),
        };

        let b = FranchiseBalances::from_sums(sums, dec!(4));
        assert_eq!(b.available_balance, dec!(6));
        assert_eq!(b.total_withdrawn, dec!(4));
    }

    #[test]
    fn reserva_pendente_zera_o_disponivel_sem_ficar_negativo() {
        // Cenário: um pedido DELIVERED de comissão 10 e um saque PENDING de 10.
        let sums = OrderProfitSums {
            total_profit: dec!(10),
            withdrawable_profit: dec!(10),
            pending_profit: dec!(0),
        };

        let b = FranchiseBalances::from_sums(sums, dec!(10));
        assert_eq!(b.available_balance, dec!(0));

        // Reserva acima do sacável (saques antigos aprovados) não negativa.
        let b = FranchiseBalances::from_sums(sums, dec!(12));
        assert_eq!(b.available_balance, dec!(0));
    }

    #[test]
    fn rejeicao_devolve_o_disponivel() {
        // Depois de REJECTED o saque sai de total_withdrawn e o valor volta.
        let sums = OrderProfitSums {
            total_profit: dec!(10),
            withdrawable_profit: dec!(10),
            pending_profit: dec!(0),
        };

        let b = FranchiseBalances::from_sums(sums, dec!(0));
        assert_eq!(b.available_balance, dec!(10));
    }

    #[test]
    fn visao_e_pura_e_reentrante() {
        let sums = OrderProfitSums {
            total_profit: dec!(100),
            withdrawable_profit: dec!(40),
            pending_profit: dec!(60),
        };

        assert_eq!(
            FranchiseBalances::from_sums(sums, dec!(15)),
            FranchiseBalances::from_sums(sums, dec!(15)),
        );
    }
}
