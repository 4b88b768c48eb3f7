// src/application/usecase/reconciliation_usecase.rs
// Surfaces paid orders whose bookings could not all be created

use crate::application::usecase::commit_usecase::BookingCreationFailure;
use crate::domain::errors::ReconciliationNotice;

pub struct ReconciliationReporter {
    support_contact: String,
}

impl ReconciliationReporter {
    pub fn new(support_contact: &str) -> Self {
        Self {
            support_contact: support_contact.to_string(),
        }
    }

    pub fn report(&self, failure: &BookingCreationFailure) -> ReconciliationNotice {
        let notice = ReconciliationNotice {
            order_id: failure.receipt.order_id.clone(),
            payment_id: failure.receipt.payment_id.clone(),
            booked: failure.created.clone(),
            failed_slots: failure.failed.iter().map(|f| f.slot).collect(),
            support_contact: self.support_contact.clone(),
        };

        let reasons = failure
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.slot, f.error))
            .collect::<Vec<_>>()
            .join("; ");

        log::error!(
            "RECONCILIATION REQUIRED order={} payment={} booked={} failed={} [{}]",
            notice.order_id,
            notice.payment_id,
            notice.booked.len(),
            notice.failed_slots.len(),
            reasons
        );

        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::usecase::commit_usecase::SlotFailure;
    use crate::domain::errors::BackendError;
    use crate::domain::models::{PaymentReceipt, TimeSlot};

    #[test]
    fn test_notice_names_both_identifiers() {
        let slot = TimeSlot::new("10:00".parse().unwrap(), "11:00".parse().unwrap());
        let failure = BookingCreationFailure {
            receipt: PaymentReceipt {
                order_id: "order_abc".to_string(),
                payment_id: "pay_123".to_string(),
            },
            created: Vec::new(),
            failed: vec![SlotFailure {
                slot,
                error: BackendError::Status {
                    status: 409,
                    message: "Slot already booked".to_string(),
                },
            }],
        };

        let notice = ReconciliationReporter::new("support@bookvenue.app").report(&failure);
        let message = notice.message();

        assert_eq!(notice.failed_slots, vec![slot]);
        assert!(message.contains("Payment was received"));
        assert!(message.contains("pay_123"));
        assert!(message.contains("order_abc"));
        assert!(message.contains("support@bookvenue.app"));
        assert!(message.contains("1 of 1"));
        assert!(!message.to_lowercase().contains("try again"));
    }
}
