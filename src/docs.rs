// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Rede ---
        handlers::nodes::create_node,
        handlers::network::list_franchises,
        handlers::network::get_balances,
        handlers::network::request_withdrawal,
        handlers::network::list_wallet_transactions,

        // --- Pedidos (Fonte de Pedidos) ---
        handlers::orders::book_order,
        handlers::orders::update_shipment_status,

        // --- Admin ---
        handlers::admin::process_withdrawal,
        handlers::admin::list_withdrawals,
        handlers::admin::set_rate_bounds,
        handlers::admin::set_commission_rate,
        handlers::admin::set_assigned_rates,
        handlers::admin::credit_wallet,
    ),
    components(
        schemas(
            // --- Rede ---
            models::network::NetworkNode,
            models::network::AssignedRates,
            models::network::ProviderRate,

            // --- Pedidos ---
            models::order::Order,
            models::order::ShipmentStatus,

            // --- Comissão ---
            models::commission::CommissionWithdrawal,
            models::commission::WithdrawalStatus,
            models::commission::WithdrawalDecision,
            models::commission::WalletTransaction,
            models::commission::TransactionKind,
            models::commission::TransactionStatus,
            models::commission::FranchiseBalances,

            // --- Payloads ---
            handlers::nodes::CreateNodePayload,
            handlers::orders::BookOrderPayload,
            handlers::orders::UpdateShipmentStatusPayload,
            handlers::network::FranchiseOverview,
            handlers::network::RequestWithdrawalPayload,
            handlers::admin::ProcessWithdrawalPayload,
            handlers::admin::SetRateBoundsPayload,
            handlers::admin::SetCommissionRatePayload,
            handlers::admin::CreditWalletPayload,
        )
    ),
    tags(
        (name = "Network", description = "Rede de indicação, saldos e saques"),
        (name = "Orders", description = "Ingestão de pedidos e status de envio"),
        (name = "Admin", description = "Aprovação de saques e configuração de taxas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_node",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-node-id"))),
        );
    }
}
