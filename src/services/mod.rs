pub mod auth;
pub mod email;
pub mod payment;

pub use auth::{AuthService, NewUser};
pub use email::{EmailService, SentEmail};
pub use payment::{PaymentService, Transaction};
