// Domain layer: entities, records and ports. Implementations of the ports live in adapters/.

pub mod model;
pub mod ports;
pub mod product;
pub mod user;
