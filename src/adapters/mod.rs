// Adapters layer: concrete implementations of the domain ports (storage, mail, payment gateway).

pub mod gateway;
pub mod mail;
pub mod storage;

pub use gateway::HttpGateway;
pub use mail::OutboxTransport;
pub use storage::LocalStorage;
