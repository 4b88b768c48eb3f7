pub mod coordinator;

pub use coordinator::CheckoutCoordinator;
