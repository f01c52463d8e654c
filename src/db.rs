pub mod network_repo;
pub use network_repo::NetworkRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod commission_repo;
pub use commission_repo::CommissionRepository;
