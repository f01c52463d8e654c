// src/models/network.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Versão corrente do esquema de `assigned_rates` persistido em JSONB.
pub const ASSIGNED_RATES_SCHEMA_VERSION: i32 = 1;

/// Uma taxa atribuída para uma transportadora específica.
/// `slab` é o teto de peso tributável (kg) até o qual a taxa vale;
/// `None` significa taxa fixa para qualquer peso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRate {
    #[schema(example = "7.50")]
    pub rate: Decimal,

    #[schema(example = "5.000")]
    pub slab: Option<Decimal>,
}

/// Mapeamento tipado transportadora -> faixas de taxa, com versão de esquema
/// explícita para que o calculador possa validar a estrutura antes de usar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedRates {
    #[schema(example = 1)]
    pub schema_version: i32,

    pub providers: BTreeMap<String, Vec<ProviderRate>>,
}

impl AssignedRates {
    pub fn empty() -> Self {
        Self {
            schema_version: ASSIGNED_RATES_SCHEMA_VERSION,
            providers: BTreeMap::new(),
        }
    }

    /// Seleciona a taxa aplicável para a transportadora e o peso do pedido.
    ///
    /// Entre as faixas com `slab`, vale a de menor teto que ainda comporta o
    /// peso. Uma entrada sem `slab` é taxa fixa e cobre qualquer peso, mas
    /// perde para qualquer faixa com teto compatível. Sem entrada para a
    /// transportadora, retorna `None` (o chamador cai na taxa plana do nó).
    pub fn rate_for(&self, provider_id: &str, chargeable_weight: Decimal) -> Option<Decimal> {
        let entries = self.providers.get(provider_id)?;

        let mut melhor_faixa: Option<(Decimal, Decimal)> = None; // (teto, taxa)
        let mut taxa_fixa: Option<Decimal> = None;

        for entry in entries {
            match entry.slab {
                Some(teto) if chargeable_weight <= teto => match melhor_faixa {
                    Some((atual, _)) if atual <= teto => {}
                    _ => melhor_faixa = Some((teto, entry.rate)),
                },
                Some(_) => {}
                None => taxa_fixa = Some(entry.rate),
            }
        }

        melhor_faixa.map(|(_, taxa)| taxa).or(taxa_fixa)
    }
}

/// Um nó da rede: pode indicar outros nós (franquias) e acumula comissão
/// sobre os pedidos deles. `wallet_balance` é o único saldo corrente real.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkNode {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "FRETE2024")]
    pub referral_code: String,

    // Código de indicação de outro nó. Lookup por valor, nunca um grafo:
    // um código que não resolve significa apenas "sem indicador".
    #[schema(example = "MATRIZ01")]
    pub referred_by: Option<String>,

    #[schema(example = "10.00")]
    pub commission_rate: Option<Decimal>,

    #[schema(value_type = AssignedRates)]
    pub assigned_rates: Json<AssignedRates>,

    #[schema(example = "5.00")]
    pub min_commission_rate: Option<Decimal>,

    #[schema(example = "8.00")]
    pub max_commission_rate: Option<Decimal>,

    #[schema(example = "1500.50")]
    pub wallet_balance: Decimal,

    pub is_admin: bool,

    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rates(entries: Vec<(&str, Vec<ProviderRate>)>) -> AssignedRates {
        AssignedRates {
            schema_version: ASSIGNED_RATES_SCHEMA_VERSION,
            providers: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    #[test]
    fn seleciona_faixa_de_menor_teto_que_comporta_o_peso() {
        let r = rates(vec![(
            "correios",
            vec![
                ProviderRate { rate: dec!(12), slab: Some(dec!(1)) },
                ProviderRate { rate: dec!(9), slab: Some(dec!(5)) },
                ProviderRate { rate: dec!(6), slab: Some(dec!(30)) },
            ],
        )]);

        assert_eq!(r.rate_for("correios", dec!(0.5)), Some(dec!(12)));
        assert_eq!(r.rate_for("correios", dec!(3)), Some(dec!(9)));
        assert_eq!(r.rate_for("correios", dec!(5)), Some(dec!(9)));
        assert_eq!(r.rate_for("correios", dec!(20)), Some(dec!(6)));
    }

    #[test]
    fn peso_acima_de_todas_as_faixas_cai_na_taxa_fixa_da_transportadora() {
        let r = rates(vec![(
            "jadlog",
            vec![
                ProviderRate { rate: dec!(9), slab: Some(dec!(5)) },
                ProviderRate { rate: dec!(4), slab: None },
            ],
        )]);

        assert_eq!(r.rate_for("jadlog", dec!(50)), Some(dec!(4)));
    }

    #[test]
    fn sem_faixa_compativel_e_sem_taxa_fixa_retorna_none() {
        let r = rates(vec![(
            "jadlog",
            vec![ProviderRate { rate: dec!(9), slab: Some(dec!(5)) }],
        )]);

        assert_eq!(r.rate_for("jadlog", dec!(50)), None);
        assert_eq!(r.rate_for("desconhecida", dec!(1)), None);
    }

    #[test]
    fn serializa_em_camel_case_com_versao_de_esquema() {
        let r = AssignedRates::empty();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["schemaVersion"], 1);
        assert!(v["providers"].as_object().unwrap().is_empty());
    }
}
