// src/config.rs

use std::{env, time::Duration};

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::db::{CommissionRepository, NetworkRepository, OrderRepository};
use crate::services::{BalanceService, CommissionService, WithdrawalService};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub network_repo: NetworkRepository,
    pub commission_repo: CommissionRepository,
    pub commission_service: CommissionService,
    pub balance_service: BalanceService,
    pub withdrawal_service: WithdrawalService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Taxa padrão global, usada quando o nó não tem taxa própria.
        let default_rate = env::var("DEFAULT_COMMISSION_RATE")
            .ok()
            .map(|raw| raw.parse::<Decimal>())
            .transpose()?
            .unwrap_or(Decimal::TEN);

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let network_repo = NetworkRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let commission_repo = CommissionRepository::new(db_pool.clone());

        let commission_service = CommissionService::new(
            network_repo.clone(),
            order_repo.clone(),
            default_rate,
        );
        let balance_service = BalanceService::new(
            network_repo.clone(),
            order_repo.clone(),
            commission_repo.clone(),
        );
        let withdrawal_service = WithdrawalService::new(
            network_repo.clone(),
            order_repo,
            commission_repo.clone(),
            balance_service.clone(),
        );

        Ok(Self {
            db_pool,
            network_repo,
            commission_repo,
            commission_service,
            balance_service,
            withdrawal_service,
        })
    }
}
