// src/infrastructure/gateway/mod.rs
// Payment gateway implementations

pub mod embedded;
pub mod hosted;
pub mod options;

pub use embedded::{CheckoutSdk, ConsoleCheckoutSdk, EmbeddedCheckoutGateway, SdkError, SdkPayment};
pub use hosted::{CheckoutCallbacks, HostedCheckoutGateway};
pub use options::{CheckoutOptions, CheckoutSettings};
