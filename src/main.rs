//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::identity::{admin_guard, identity_guard};

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Fronteiras de ingestão: registro de nós e Fonte de Pedidos
    let node_routes = Router::new().route("/", post(handlers::nodes::create_node));

    let order_routes = Router::new()
        .route("/", post(handlers::orders::book_order))
        .route(
            "/{order_id}/status",
            patch(handlers::orders::update_shipment_status),
        );

    // Rotas do indicador (protegidas pelo guard de identidade)
    let network_routes = Router::new()
        .route("/franchises", get(handlers::network::list_franchises))
        .route(
            "/balances/{franchise_id}",
            get(handlers::network::get_balances),
        )
        .route("/withdrawals", post(handlers::network::request_withdrawal))
        .route(
            "/wallet/transactions",
            get(handlers::network::list_wallet_transactions),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            identity_guard,
        ));

    // Rotas administrativas (fila de aprovação, taxas, crédito de carteira)
    let admin_routes = Router::new()
        .route("/withdrawals", get(handlers::admin::list_withdrawals))
        .route(
            "/withdrawals/{withdrawal_id}/process",
            post(handlers::admin::process_withdrawal),
        )
        .route(
            "/nodes/{node_id}/rate-bounds",
            post(handlers::admin::set_rate_bounds),
        )
        .route(
            "/nodes/{node_id}/commission-rate",
            post(handlers::admin::set_commission_rate),
        )
        .route(
            "/nodes/{node_id}/assigned-rates",
            post(handlers::admin::set_assigned_rates),
        )
        .route("/wallet/credit", post(handlers::admin::credit_wallet))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            admin_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/nodes", node_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/network", network_routes)
        .nest("/api/admin", admin_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
