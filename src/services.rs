pub mod balance_service;
pub use balance_service::BalanceService;
pub mod commission_service;
pub use commission_service::CommissionService;
pub mod withdrawal_service;
pub use withdrawal_service::WithdrawalService;
