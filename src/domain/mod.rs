pub mod errors;
pub mod models;
pub mod money;
pub mod repository;
pub mod service;

// Re-export common types for convenience
pub use errors::{
    AppError, AppResult, BackendError, BackendResult, CheckoutError, CheckoutResult, GatewayError,
    GatewayResult, ReconciliationNotice, ValidationError, ValidationResult,
};
pub use models::{
    Booking, BookingPayload, BookingSelection, BookingStatus, BuyerContact, CheckoutSummary,
    ClockTime, Court, CourtRef, OrderIntent, PaymentOutcome, PaymentReceipt, TimeSlot,
};
pub use repository::BookingRepository;
pub use service::PaymentGateway;
