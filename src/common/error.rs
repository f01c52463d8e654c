use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Nenhuma variante é fatal: todo erro fica restrito à requisição que o gerou.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Faixa de taxa inválida: min {min}, max {max}")]
    InvalidRateRange { min: Decimal, max: Decimal },

    #[error("Estrutura de assigned_rates inválida: {reason}")]
    InvalidAssignedRates { reason: String },

    #[error("Código de indicação já existe")]
    ReferralCodeAlreadyExists,

    #[error("Nó da rede não encontrado")]
    NodeNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Saque não encontrado")]
    WithdrawalNotFound,

    // A franquia existe mas não foi indicada pelo solicitante.
    #[error("Franquia não pertence à rede do solicitante")]
    FranchiseNotOwned,

    #[error("Saldo de comissão insuficiente (disponível: {available})")]
    InsufficientBalance { available: Decimal },

    #[error("Saldo de carteira insuficiente")]
    InsufficientFunds,

    #[error("Saque já processado")]
    AlreadyProcessed,

    #[error("Identidade ausente ou inválida")]
    MissingIdentity,

    #[error("Apenas administradores")]
    AdminOnly,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidRateRange { min, max } => {
                let body = Json(json!({
                    "error": "Faixa de taxa inválida: os limites devem estar entre 0 e 100 e min <= max.",
                    "min": min,
                    "max": max,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidAssignedRates { reason } => {
                let body = Json(json!({
                    "error": "Estrutura de assigned_rates inválida.",
                    "details": reason,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            // A mensagem carrega o valor disponível calculado no momento da checagem.
            AppError::InsufficientBalance { available } => {
                let body = Json(json!({
                    "error": "Saldo de comissão insuficiente para o valor solicitado.",
                    "available": available,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::ReferralCodeAlreadyExists => {
                (StatusCode::CONFLICT, "Este código de indicação já está em uso.")
            }
            AppError::NodeNotFound => (StatusCode::NOT_FOUND, "Nó da rede não encontrado."),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Pedido não encontrado."),
            AppError::WithdrawalNotFound => (StatusCode::NOT_FOUND, "Saque não encontrado."),
            AppError::FranchiseNotOwned => {
                (StatusCode::NOT_FOUND, "Franquia não encontrada na rede do solicitante.")
            }
            AppError::InsufficientFunds => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Saldo de carteira insuficiente para aprovar o saque.",
            ),
            AppError::AlreadyProcessed => {
                (StatusCode::CONFLICT, "Este saque já foi processado e é imutável.")
            }
            AppError::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                "Cabeçalho de identidade ausente ou inválido.",
            ),
            AppError::AdminOnly => (
                StatusCode::FORBIDDEN,
                "Operação restrita a administradores.",
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
