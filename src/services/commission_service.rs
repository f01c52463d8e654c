// src/services/commission_service.rs

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NetworkRepository, OrderRepository},
    models::network::{AssignedRates, NetworkNode, ASSIGNED_RATES_SCHEMA_VERSION},
    models::order::{Order, ShipmentStatus},
};

// =============================================================================
//  NÚCLEO PURO: clamp, arredondamento e resolução de taxa
// =============================================================================

/// Limita a taxa solicitada aos limites impostos pelo admin.
/// `max(min, min(solicitada, max))`: com limites invertidos o mínimo vence.
pub fn clamp_rate(requested: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> Decimal {
    let min = min.unwrap_or(Decimal::ZERO);
    let max = max.unwrap_or(Decimal::ONE_HUNDRED);
    min.max(requested.min(max))
}

/// Arredonda para a precisão da moeda (2 casas, metade para longe do zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Comissão devida ao indicador sobre o custo base do frete.
pub fn commission_for(base_shipping_charge: Decimal, rate: Decimal) -> Decimal {
    round_money(base_shipping_charge * rate / Decimal::ONE_HUNDRED)
}

/// Precedência da taxa solicitada: faixa atribuída por transportadora,
/// depois a taxa plana do nó, depois o padrão global.
pub fn requested_rate(
    assigned: &AssignedRates,
    flat_rate: Option<Decimal>,
    provider_id: &str,
    chargeable_weight: Decimal,
    default_rate: Decimal,
) -> Decimal {
    assigned
        .rate_for(provider_id, chargeable_weight)
        .or(flat_rate)
        .unwrap_or(default_rate)
}

/// Taxa efetiva do indicador para um pedido: precedência + clamp.
/// Chamado antes de toda acumulação.
pub fn effective_rate(
    referrer: &NetworkNode,
    provider_id: &str,
    chargeable_weight: Decimal,
    default_rate: Decimal,
) -> Decimal {
    let requested = requested_rate(
        &referrer.assigned_rates,
        referrer.commission_rate,
        provider_id,
        chargeable_weight,
        default_rate,
    );

    clamp_rate(
        requested,
        referrer.min_commission_rate,
        referrer.max_commission_rate,
    )
}

fn rate_in_percent_range(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED
}

/// Limites só são aceitos com min <= max e ambos em [0, 100].
pub fn validate_bounds(min: Decimal, max: Decimal) -> Result<(), AppError> {
    if min > max || !rate_in_percent_range(min) || !rate_in_percent_range(max) {
        return Err(AppError::InvalidRateRange { min, max });
    }
    Ok(())
}

/// Valida a estrutura do mapeamento antes de persistir ou usar:
/// versão de esquema conhecida, taxas em [0, 100], tetos positivos.
pub fn validate_assigned_rates(rates: &AssignedRates) -> Result<(), AppError> {
    if rates.schema_version != ASSIGNED_RATES_SCHEMA_VERSION {
        return Err(AppError::InvalidAssignedRates {
            reason: format!("versão de esquema desconhecida: {}", rates.schema_version),
        });
    }

    for (provider, entries) in &rates.providers {
        for entry in entries {
            if !rate_in_percent_range(entry.rate) {
                return Err(AppError::InvalidAssignedRates {
                    reason: format!("taxa fora do intervalo [0, 100] para '{provider}'"),
                });
            }
            if let Some(slab) = entry.slab {
                if slab <= Decimal::ZERO {
                    return Err(AppError::InvalidAssignedRates {
                        reason: format!("teto de faixa não positivo para '{provider}'"),
                    });
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
//  SERVIÇO: acumulação na criação do pedido + configuração de taxas
// =============================================================================

#[derive(Clone)]
pub struct CommissionService {
    network_repo: NetworkRepository,
    order_repo: OrderRepository,
    default_rate: Decimal,
}

impl CommissionService {
    pub fn new(
        network_repo: NetworkRepository,
        order_repo: OrderRepository,
        default_rate: Decimal,
    ) -> Self {
        Self {
            network_repo,
            order_repo,
            default_rate,
        }
    }

    /// Ingestão de um pedido da Fonte de Pedidos: no momento em que os
    /// termos comerciais são conhecidos, a comissão do indicador é calculada
    /// e carimbada no pedido. Nó sem indicador (ou com código que não
    /// resolve) gera comissão zero e nenhum caminho de comissão é tocado.
    ///
    /// Invariante carimbada: shipping_charge - base == comissão.
    /// Mudanças de taxa posteriores nunca reescrevem pedidos já criados.
    pub async fn book_order<'e, E>(
        &self,
        executor: E,
        owner_node_id: Uuid,
        provider_id: &str,
        chargeable_weight: Decimal,
        base_shipping_charge: Decimal,
        initial_status: Option<ShipmentStatus>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let owner = self
            .network_repo
            .find_by_id(&mut *tx, owner_node_id)
            .await?
            .ok_or(AppError::NodeNotFound)?;

        let referrer = match owner.referred_by.as_deref() {
            Some(code) => self.network_repo.find_by_referral_code(&mut *tx, code).await?,
            None => None,
        };

        let commission = match &referrer {
            Some(referrer) => {
                let rate = effective_rate(
                    referrer,
                    provider_id,
                    chargeable_weight,
                    self.default_rate,
                );
                commission_for(base_shipping_charge, rate)
            }
            None => Decimal::ZERO,
        };

        // O markup cobrado do cliente final embute a comissão.
        let shipping_charge = base_shipping_charge + commission;

        let order = self
            .order_repo
            .create_order(
                &mut *tx,
                owner_node_id,
                provider_id,
                chargeable_weight,
                base_shipping_charge,
                shipping_charge,
                commission,
                initial_status.unwrap_or(ShipmentStatus::Pending),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            owner = %owner_node_id,
            commission = %commission,
            "pedido reservado com comissão carimbada"
        );

        Ok(order)
    }

    /// Fronteira com a Fonte de Pedidos: só ela transiciona o status.
    pub async fn update_shipment_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        new_status: ShipmentStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.order_repo.update_status(executor, order_id, new_status).await
    }

    /// Admin impõe os limites de taxa de um nó.
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
        validate_bounds(min, max)?;
        self.network_repo.set_rate_bounds(executor, node_id, min, max).await
    }

    /// Persiste a taxa plana solicitada, já limitada aos bounds do nó.
    /// Pedidos existentes não são retroativamente recalculados.
    pub async fn set_commission_rate<'e, E>(
        &self,
        executor: E,
        node_id: Uuid,
        requested: Decimal,
    ) -> Result<NetworkNode, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !rate_in_percent_range(requested) {
            return Err(AppError::InvalidRateRange {
                min: requested,
                max: requested,
            });
        }

        let mut tx = executor.begin().await?;

        let node = self
            .network_repo
            .find_by_id(&mut *tx, node_id)
            .await?
            .ok_or(AppError::NodeNotFound)?;

        let clamped = clamp_rate(requested, node.min_commission_rate, node.max_commission_rate);
        let node = self
            .network_repo
            .set_commission_rate(&mut *tx, node_id, clamped)
            .await?;

        tx.commit().await?;
        Ok(node)
    }

    /// Substitui o mapeamento de taxas por transportadora, após validar a
    /// estrutura. O clamp aos bounds acontece a cada acumulação.
    pub async fn set_assigned_rates<'e, E>(
        &self,
        executor: E,
        node_id: Uuid,
        rates: &AssignedRates,
    ) -> Result<NetworkNode, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validate_assigned_rates(rates)?;
        self.network_repo.set_assigned_rates(executor, node_id, rates).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::network::ProviderRate;
    use rust_decimal_macros::dec;

    #[test]
    fn taxa_acima_do_maximo_e_limitada_ao_maximo() {
        // Franquia com limites 5..8 e taxa pedida de 20% acumula a 8%.
        assert_eq!(clamp_rate(dec!(20), Some(dec!(5)), Some(dec!(8))), dec!(8));
    }

    #[test]
    fn taxa_abaixo_do_minimo_sobe_ao_minimo() {
        assert_eq!(clamp_rate(dec!(2), Some(dec!(5)), Some(dec!(8))), dec!(5));
        assert_eq!(clamp_rate(dec!(6), Some(dec!(5)), Some(dec!(8))), dec!(6));
    }

    #[test]
    fn sem_limites_configurados_vale_0_a_100() {
        assert_eq!(clamp_rate(dec!(150), None, None), dec!(100));
        assert_eq!(clamp_rate(dec!(-3), None, None), dec!(0));
        assert_eq!(clamp_rate(dec!(42), None, None), dec!(42));
    }

    #[test]
    fn comissao_e_base_vezes_taxa_sobre_cem() {
        assert_eq!(commission_for(dec!(100), dec!(10)), dec!(10.00));
        assert_eq!(commission_for(dec!(250.40), dec!(7.5)), dec!(18.78));
    }

    #[test]
    fn arredondamento_e_metade_para_longe_do_zero() {
        // 99.90 * 7.5% = 7.4925 -> 7.49; 99.9333... força o caso do meio
        assert_eq!(commission_for(dec!(99.90), dec!(7.5)), dec!(7.49));
        assert_eq!(round_money(dec!(7.495)), dec!(7.50));
        assert_eq!(round_money(dec!(7.485)), dec!(7.49));
    }

    #[test]
    fn identidade_do_frete_cobrado() {
        // shipping_charge - base == comissão, dentro da precisão da moeda.
        let base = dec!(123.45);
        let commission = commission_for(base, dec!(11.3));
        let shipping_charge = base + commission;
        assert_eq!(shipping_charge - base, commission);
    }

    #[test]
    fn precedencia_faixa_depois_plana_depois_padrao() {
        let mut assigned = AssignedRates::empty();
        assigned.providers.insert(
            "correios".into(),
            vec![ProviderRate { rate: dec!(12), slab: Some(dec!(5)) }],
        );

        // Com faixa compatível, ela vence a taxa plana.
        assert_eq!(
            requested_rate(&assigned, Some(dec!(9)), "correios", dec!(2), dec!(5)),
            dec!(12)
        );
        // Transportadora sem entrada cai na plana.
        assert_eq!(
            requested_rate(&assigned, Some(dec!(9)), "jadlog", dec!(2), dec!(5)),
            dec!(9)
        );
        // Sem plana, cai no padrão global.
        assert_eq!(
            requested_rate(&assigned, None, "jadlog", dec!(2), dec!(5)),
            dec!(5)
        );
    }

    #[test]
    fn limites_invalidos_sao_rejeitados() {
        assert!(matches!(
            validate_bounds(dec!(9), dec!(5)),
            Err(AppError::InvalidRateRange { .. })
        ));
        assert!(matches!(
            validate_bounds(dec!(-1), dec!(5)),
            Err(AppError::InvalidRateRange { .. })
        ));
        assert!(matches!(
            validate_bounds(dec!(5), dec!(101)),
            Err(AppError::InvalidRateRange { .. })
        ));
        assert!(validate_bounds(dec!(0), dec!(100)).is_ok());
    }

    #[test]
    fn assigned_rates_com_esquema_errado_nao_passa() {
        let mut rates = AssignedRates::empty();
        rates.schema_version = 99;
        assert!(matches!(
            validate_assigned_rates(&rates),
            Err(AppError::InvalidAssignedRates { .. })
        ));
    }

    #[test]
    fn assigned_rates_com_taxa_ou_teto_invalido_nao_passa() {
        let mut rates = AssignedRates::empty();
        rates.providers.insert(
            "correios".into(),
            vec![ProviderRate { rate: dec!(120), slab: None }],
        );
        assert!(validate_assigned_rates(&rates).is_err());

        let mut rates = AssignedRates::empty();
        rates.providers.insert(
            "correios".into(),
            vec![ProviderRate { rate: dec!(10), slab: Some(dec!(0)) }],
        );
        assert!(validate_assigned_rates(&rates).is_err());

        let mut rates = AssignedRates::empty();
        rates.providers.insert(
            "correios".into(),
            vec![ProviderRate { rate: dec!(10), slab: Some(dec!(5)) }],
        );
        assert!(validate_assigned_rates(&rates).is_ok());
    }
}
