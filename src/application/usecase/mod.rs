pub mod booking_request_usecase;
pub mod commit_usecase;
pub mod payment_usecase;
pub mod reconciliation_usecase;
pub mod slot_usecase;

// Re-export public API
pub use booking_request_usecase::{BookingRequest, BookingRequestBuilder};
pub use commit_usecase::{
    Acknowledgement, BookingCommitter, BookingCreationFailure, CommittedBookings, SlotFailure,
};
pub use payment_usecase::{CheckoutAttempt, CheckoutReceipt, CheckoutState, PaymentOrchestrator};
pub use reconciliation_usecase::ReconciliationReporter;
pub use slot_usecase::{SlotGenerator, Slots};
