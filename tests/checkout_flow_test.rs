mod common;

use chrono::NaiveDateTime;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

use common::{buyer, orchestrator, selection, service, FakeBackend, Script, ScriptedGateway, SUPPORT};
use court_booking::application::service::BookingService;
use court_booking::application::usecase::{
    Acknowledgement, BookingRequestBuilder, CheckoutAttempt, CheckoutState,
};
use court_booking::domain::errors::{AppError, CheckoutError, GatewayError, ValidationError};
use court_booking::domain::models::{
    Booking, BookingStatus, BuyerContact, PaymentOutcome, TimeSlot,
};

#[tokio::test]
async fn test_all_slots_booked_and_settled_once() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_OK1"));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend.clone());

    let receipt = service
        .checkout(&selection(&["09:00", "10:00", "11:00"]), &buyer())
        .await
        .unwrap();

    let order_id = gateway.order_ids()[0].clone();
    assert_eq!(receipt.order_id(), order_id);
    assert_eq!(receipt.payment_id(), "pay_OK1");
    assert_eq!(receipt.amount_minor, 150000);
    assert_eq!(receipt.committed.bookings.len(), 3);
    assert_eq!(receipt.committed.acknowledgement, Acknowledgement::Recorded);

    let calls = backend.calls();
    assert_eq!(calls.created.len(), 3);
    assert_eq!(calls.successes, vec![(order_id.clone(), "pay_OK1".to_string())]);
    assert!(calls.failures.is_empty());

    for (payload, receipt) in &calls.created {
        assert_eq!(payload.price, dec!(500));
        assert_eq!(receipt.order_id, order_id);
        assert_eq!(receipt.payment_id, "pay_OK1");
    }
}

#[tokio::test]
async fn test_gateway_sees_total_and_summary() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_OK1"));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend);

    service
        .checkout(&selection(&["18:00", "19:00"]), &buyer())
        .await
        .unwrap();

    let opened = gateway.opened();
    assert_eq!(opened.len(), 1);
    let (intent, summary) = &opened[0];
    assert_eq!(intent.amount_minor(), 100000);
    assert_eq!(intent.buyer().phone, "9876543210");
    assert_eq!(summary.slot_count, 2);
    assert_eq!(summary.venue_name, "Smash Arena");
}

#[tokio::test]
async fn test_cancelled_checkout_touches_no_backend() {
    let gateway = Arc::new(ScriptedGateway::new(Script::Outcome(PaymentOutcome::Cancelled)));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend.clone());

    let error = service
        .checkout(&selection(&["09:00"]), &buyer())
        .await
        .unwrap_err();

    match error {
        CheckoutError::Gateway(gateway_error) => {
            assert!(gateway_error.is_cancelled());
            assert_eq!(gateway_error.order_id(), Some(gateway.order_ids()[0].as_str()));
        }
        other => panic!("expected cancellation, got {:?}", other),
    }
    assert_eq!(backend.calls().total(), 0);
}

#[tokio::test]
async fn test_declined_payment_is_reported_as_failure() {
    let gateway = Arc::new(ScriptedGateway::new(Script::Outcome(PaymentOutcome::Failed {
        reason: "Card declined".to_string(),
    })));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend.clone());

    let error = service
        .checkout(&selection(&["09:00", "10:00"]), &buyer())
        .await
        .unwrap_err();

    let order_id = gateway.order_ids()[0].clone();
    assert_eq!(
        error,
        CheckoutError::Gateway(GatewayError::Declined {
            order_id: order_id.clone(),
            reason: "Card declined".to_string(),
        })
    );

    let calls = backend.calls();
    assert_eq!(calls.failures, vec![order_id]);
    assert!(calls.created.is_empty());
    assert!(calls.successes.is_empty());
}

#[tokio::test]
async fn test_lost_failure_report_still_declines() {
    let gateway = Arc::new(ScriptedGateway::new(Script::Outcome(PaymentOutcome::Failed {
        reason: "Card declined".to_string(),
    })));
    let backend = Arc::new(FakeBackend::new().failing_failure_report());
    let service = service(gateway.clone(), backend.clone());

    let error = service
        .checkout(&selection(&["09:00"]), &buyer())
        .await
        .unwrap_err();

    let order_id = gateway.order_ids()[0].clone();
    assert_eq!(
        error,
        CheckoutError::Gateway(GatewayError::Declined {
            order_id: order_id.clone(),
            reason: "Card declined".to_string(),
        })
    );
    assert_eq!(backend.calls().failures, vec![order_id]);
}

#[tokio::test]
async fn test_slot_bookings_are_created_concurrently() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_PAR"));
    // Sequential creates would each wait at the barrier forever
    let backend = Arc::new(FakeBackend::new().meeting_at_barrier(3));
    let service = service(gateway, backend.clone());

    let receipt = tokio::time::timeout(
        Duration::from_secs(2),
        service.checkout(&selection(&["09:00", "10:00", "11:00"]), &buyer()),
    )
    .await
    .expect("slot bookings were created one at a time")
    .unwrap();

    assert_eq!(receipt.committed.bookings.len(), 3);
    assert_eq!(backend.calls().created.len(), 3);
}

#[tokio::test]
async fn test_unavailable_gateway_counts_as_failed_payment() {
    let gateway = Arc::new(ScriptedGateway::new(Script::Unavailable));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend.clone());

    let error = service
        .checkout(&selection(&["09:00"]), &buyer())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        CheckoutError::Gateway(GatewayError::Declined { .. })
    ));
    assert_eq!(backend.calls().failures.len(), 1);
    assert!(backend.calls().created.is_empty());
}

#[tokio::test]
async fn test_gateway_timeout() {
    let gateway = Arc::new(ScriptedGateway::new(Script::Hang));
    let backend = Arc::new(FakeBackend::new());
    let orchestrator = orchestrator(gateway.clone(), backend.clone(), Duration::from_millis(50));
    let request = BookingRequestBuilder::build(&selection(&["09:00"])).unwrap();

    let mut attempt = CheckoutAttempt::new();
    let error = orchestrator
        .run(&mut attempt, &request, &buyer())
        .await
        .unwrap_err();

    let order_id = gateway.order_ids()[0].clone();
    assert_eq!(
        error,
        CheckoutError::Gateway(GatewayError::TimedOut {
            order_id: order_id.clone()
        })
    );
    assert!(matches!(attempt.state(), CheckoutState::Failed { .. }));
    assert_eq!(backend.calls().failures, vec![order_id]);
    assert!(backend.calls().created.is_empty());
}

#[tokio::test]
async fn test_partial_booking_failure_requires_reconciliation() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_PART"));
    let backend = Arc::new(FakeBackend::new().failing_at("10:00"));
    let service = service(gateway.clone(), backend.clone());

    let error = service
        .checkout(&selection(&["09:00", "10:00", "11:00"]), &buyer())
        .await
        .unwrap_err();

    let notice = match error {
        CheckoutError::BookingCreation(notice) => notice,
        other => panic!("expected booking creation failure, got {:?}", other),
    };

    let order_id = gateway.order_ids()[0].clone();
    assert_eq!(notice.order_id, order_id);
    assert_eq!(notice.payment_id, "pay_PART");
    assert_eq!(notice.support_contact, SUPPORT);
    assert_eq!(notice.booked.len(), 2);
    assert_eq!(
        notice.failed_slots,
        vec![TimeSlot::new("10:00".parse().unwrap(), "11:00".parse().unwrap())]
    );

    let message = notice.message();
    assert!(message.contains("1 of 3"));
    assert!(message.contains("pay_PART"));
    assert!(message.contains(&order_id));
    assert!(message.contains(SUPPORT));

    let calls = backend.calls();
    assert_eq!(calls.created.len(), 3);
    assert!(calls.successes.is_empty());
    assert!(calls.failures.is_empty());
}

#[tokio::test]
async fn test_single_slot_creation_failure() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_ONE"));
    let backend = Arc::new(FakeBackend::new().failing_at("21:00"));
    let orchestrator = orchestrator(gateway, backend.clone(), Duration::from_secs(5));
    let request = BookingRequestBuilder::build(&selection(&["21:00"])).unwrap();

    let mut attempt = CheckoutAttempt::new();
    let error = orchestrator
        .run(&mut attempt, &request, &buyer())
        .await
        .unwrap_err();

    assert!(matches!(error, CheckoutError::BookingCreation(_)));
    assert!(matches!(
        attempt.state(),
        CheckoutState::BookingCreationFailed { .. }
    ));
    assert!(backend.calls().successes.is_empty());
}

#[tokio::test]
async fn test_lost_success_report_keeps_bookings() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_ACK"));
    let backend = Arc::new(FakeBackend::new().failing_success_report());
    let service = service(gateway, backend.clone());

    let receipt = service
        .checkout(&selection(&["09:00", "10:00"]), &buyer())
        .await
        .unwrap();

    assert_eq!(receipt.committed.bookings.len(), 2);
    assert!(matches!(
        receipt.committed.acknowledgement,
        Acknowledgement::Failed(_)
    ));
    assert_eq!(backend.calls().successes.len(), 1);
}

#[tokio::test]
async fn test_each_attempt_gets_a_new_order_id() {
    let gateway = Arc::new(ScriptedGateway::new(Script::Outcome(PaymentOutcome::Failed {
        reason: "Insufficient funds".to_string(),
    })));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend.clone());
    let selection = selection(&["09:00"]);

    service.checkout(&selection, &buyer()).await.unwrap_err();
    service.checkout(&selection, &buyer()).await.unwrap_err();

    let ids = gateway.order_ids();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(backend.calls().failures, ids);
}

#[tokio::test]
async fn test_missing_phone_never_reaches_gateway() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend.clone());
    let buyer = BuyerContact::new("Asha", "asha@example.com", "  ");

    let error = service
        .checkout(&selection(&["09:00"]), &buyer)
        .await
        .unwrap_err();

    assert_eq!(error, CheckoutError::Validation(ValidationError::MissingPhone));
    assert!(gateway.opened().is_empty());
    assert_eq!(backend.calls().total(), 0);
}

#[tokio::test]
async fn test_empty_selection_is_rejected() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway.clone(), backend);

    let error = service.checkout(&selection(&[]), &buyer()).await.unwrap_err();

    assert_eq!(error, CheckoutError::Validation(ValidationError::EmptySelection));
    assert!(gateway.opened().is_empty());
}

#[tokio::test]
async fn test_attempt_history_on_success() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_H"));
    let backend = Arc::new(FakeBackend::new());
    let orchestrator = orchestrator(gateway, backend, Duration::from_secs(5));
    let request = BookingRequestBuilder::build(&selection(&["12:00"])).unwrap();

    let mut attempt = CheckoutAttempt::new();
    orchestrator
        .run(&mut attempt, &request, &buyer())
        .await
        .unwrap();

    let history = attempt.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0], CheckoutState::Idle);
    assert!(matches!(history[1], CheckoutState::AwaitingGateway { .. }));
    assert!(matches!(history[2], CheckoutState::Succeeded { .. }));
    assert!(matches!(history[3], CheckoutState::BookingCreated { .. }));
}

/// The morning before the stored bookings start
fn before_play() -> NaiveDateTime {
    common::date().and_hms_opt(7, 30, 0).unwrap()
}

fn stored_booking(id: &str, status: BookingStatus) -> Booking {
    Booking {
        id: id.to_string(),
        facility_id: "12".to_string(),
        service_id: "34".to_string(),
        court_id: "7".to_string(),
        venue_name: Some("Smash Arena".to_string()),
        court_name: Some("Court 1".to_string()),
        date: common::date(),
        slot: TimeSlot::new("09:00".parse().unwrap(), "10:00".parse().unwrap()),
        price: dec!(500),
        order_id: Some("order_abc".to_string()),
        payment_id: Some("pay_abc".to_string()),
        status,
    }
}

#[tokio::test]
async fn test_cancel_booking() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let backend = Arc::new(FakeBackend::new().with_booking(stored_booking("bk_9", BookingStatus::Confirmed)));
    let service = service(gateway, backend.clone());

    let cancelled = service.cancel_booking("bk_9", before_play()).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(backend.calls().cancelled, vec!["bk_9".to_string()]);

    let again = service.cancel_booking("bk_9", before_play()).await.unwrap_err();
    assert!(matches!(
        again,
        AppError::Validation(ValidationError::AlreadyCancelled(_))
    ));
    assert_eq!(backend.calls().cancelled.len(), 1);
}

#[tokio::test]
async fn test_cancel_unknown_booking() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let backend = Arc::new(FakeBackend::new());
    let service = service(gateway, backend.clone());

    let error = service.cancel_booking("missing", before_play()).await.unwrap_err();
    assert!(matches!(error, AppError::Backend(_)));
    assert!(backend.calls().cancelled.is_empty());
}

#[tokio::test]
async fn test_pending_booking_cannot_be_cancelled() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let backend = Arc::new(FakeBackend::new().with_booking(stored_booking("bk_p", BookingStatus::Pending)));
    let service = service(gateway, backend.clone());

    let error = service.cancel_booking("bk_p", before_play()).await.unwrap_err();
    assert!(matches!(
        error,
        AppError::Validation(ValidationError::NotCancellable { .. })
    ));
    assert!(backend.calls().cancelled.is_empty());
    assert_eq!(service.booking("bk_p").await.unwrap().status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_started_booking_cannot_be_cancelled() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let backend = Arc::new(FakeBackend::new().with_booking(stored_booking("bk_9", BookingStatus::Confirmed)));
    let service = service(gateway, backend.clone());
    let tip_off = common::date().and_hms_opt(9, 0, 0).unwrap();

    let error = service.cancel_booking("bk_9", tip_off).await.unwrap_err();
    assert!(matches!(
        error,
        AppError::Validation(ValidationError::AlreadyStarted(_))
    ));
    assert!(backend.calls().cancelled.is_empty());
}

#[tokio::test]
async fn test_history_splits_upcoming_and_past() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let mut yesterday = stored_booking("bk_old", BookingStatus::Confirmed);
    yesterday.date = common::date().pred_opt().unwrap();
    let backend = Arc::new(
        FakeBackend::new()
            .with_booking(yesterday)
            .with_booking(stored_booking("bk_new", BookingStatus::Pending)),
    );
    let service = service(gateway, backend);

    let history = service.history(before_play()).await.unwrap();
    assert_eq!(history.upcoming.len(), 1);
    assert_eq!(history.upcoming[0].id, "bk_new");
    assert_eq!(history.past.len(), 1);
    assert_eq!(history.past[0].id, "bk_old");

    let evening = common::date().and_hms_opt(20, 0, 0).unwrap();
    let history = service.history(evening).await.unwrap();
    assert!(history.upcoming.is_empty());
    assert_eq!(history.past.len(), 2);
    assert_eq!(history.past[0].id, "bk_new");
}

#[tokio::test]
async fn test_available_slots_and_history() {
    let gateway = Arc::new(ScriptedGateway::succeeding("pay_X"));
    let backend = Arc::new(FakeBackend::new().with_booking(stored_booking("bk_1", BookingStatus::Pending)));
    let service = service(gateway, backend);

    let slots = service.available_slots(&common::court());
    assert_eq!(slots.len(), 13);
    assert_eq!(slots[0].to_string(), "09:00 - 10:00");

    let bookings = service.bookings().await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(service.booking("bk_1").await.unwrap().status, BookingStatus::Pending);
}
