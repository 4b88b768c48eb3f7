// Shared fakes for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

use court_booking::application::service::BookingServiceImpl;
use court_booking::application::usecase::{PaymentOrchestrator, ReconciliationReporter};
use court_booking::domain::errors::{BackendError, BackendResult, GatewayError, GatewayResult};
use court_booking::domain::models::{
    Booking, BookingPayload, BookingSelection, BookingStatus, BuyerContact, CheckoutSummary,
    ClockTime, Court, CourtRef, OrderIntent, PaymentOutcome, PaymentReceipt,
};
use court_booking::domain::repository::BookingRepository;
use court_booking::domain::service::PaymentGateway;

pub const SUPPORT: &str = "support@test.example";

/// Everything the fake backend was asked to do, in call order per list.
#[derive(Debug, Default, Clone)]
pub struct BackendCalls {
    pub created: Vec<(BookingPayload, PaymentReceipt)>,
    pub successes: Vec<(String, String)>,
    pub failures: Vec<String>,
    pub cancelled: Vec<String>,
}

impl BackendCalls {
    pub fn total(&self) -> usize {
        self.created.len() + self.successes.len() + self.failures.len() + self.cancelled.len()
    }
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<BackendCalls>,
    /// Slot start times whose create call fails
    failing_slots: HashSet<ClockTime>,
    fail_success_report: bool,
    fail_failure_report: bool,
    /// Every create waits here until all expected creates have started
    barrier: Option<Arc<Barrier>>,
    stored: Mutex<HashMap<String, Booking>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(mut self, start: &str) -> Self {
        self.failing_slots.insert(start.parse().unwrap());
        self
    }

    pub fn failing_success_report(mut self) -> Self {
        self.fail_success_report = true;
        self
    }

    pub fn failing_failure_report(mut self) -> Self {
        self.fail_failure_report = true;
        self
    }

    /// Creates only complete once `creates` of them are in flight together.
    pub fn meeting_at_barrier(mut self, creates: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(creates)));
        self
    }

    pub fn with_booking(self, booking: Booking) -> Self {
        self.stored.lock().unwrap().insert(booking.id.clone(), booking);
        self
    }

    pub fn calls(&self) -> BackendCalls {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingRepository for FakeBackend {
    async fn create_booking(
        &self,
        payload: &BookingPayload,
        receipt: &PaymentReceipt,
    ) -> BackendResult<Booking> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.created.push((payload.clone(), receipt.clone()));
            calls.created.len()
        };

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        if self.failing_slots.contains(&payload.slot.start) {
            return Err(BackendError::Status {
                status: 409,
                message: "Slot already booked".to_string(),
            });
        }

        Ok(Booking::from_payload(
            &format!("bk_{}", index),
            payload,
            receipt,
            BookingStatus::Confirmed,
        ))
    }

    async fn report_payment_success(&self, order_id: &str, payment_id: &str) -> BackendResult<()> {
        self.calls
            .lock()
            .unwrap()
            .successes
            .push((order_id.to_string(), payment_id.to_string()));

        if self.fail_success_report {
            return Err(BackendError::Request("connection reset".to_string()));
        }
        Ok(())
    }

    async fn report_payment_failure(&self, order_id: &str) -> BackendResult<()> {
        self.calls.lock().unwrap().failures.push(order_id.to_string());

        if self.fail_failure_report {
            return Err(BackendError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        Ok(())
    }

    async fn list_bookings(&self) -> BackendResult<Vec<Booking>> {
        Ok(self.stored.lock().unwrap().values().cloned().collect())
    }

    async fn get_booking(&self, booking_id: &str) -> BackendResult<Booking> {
        self.stored
            .lock()
            .unwrap()
            .get(booking_id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: format!("Booking {} not found", booking_id),
            })
    }

    async fn cancel_booking(&self, booking_id: &str) -> BackendResult<()> {
        self.calls.lock().unwrap().cancelled.push(booking_id.to_string());
        if let Some(booking) = self.stored.lock().unwrap().get_mut(booking_id) {
            booking.status = BookingStatus::Cancelled;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Script {
    Outcome(PaymentOutcome),
    Unavailable,
    /// Never resolves; only a timeout ends the checkout
    Hang,
}

/// Gateway that answers every checkout the same way.
pub struct ScriptedGateway {
    script: Script,
    opened: Mutex<Vec<(OrderIntent, CheckoutSummary)>>,
}

impl ScriptedGateway {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(payment_id: &str) -> Self {
        Self::new(Script::Outcome(PaymentOutcome::Succeeded {
            payment_id: payment_id.to_string(),
        }))
    }

    pub fn opened(&self) -> Vec<(OrderIntent, CheckoutSummary)> {
        self.opened.lock().unwrap().clone()
    }

    pub fn order_ids(&self) -> Vec<String> {
        self.opened()
            .iter()
            .map(|(intent, _)| intent.order_id().to_string())
            .collect()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn open(
        &self,
        intent: &OrderIntent,
        summary: &CheckoutSummary,
    ) -> GatewayResult<PaymentOutcome> {
        self.opened
            .lock()
            .unwrap()
            .push((intent.clone(), summary.clone()));

        match &self.script {
            Script::Outcome(outcome) => Ok(outcome.clone()),
            Script::Unavailable => Err(GatewayError::Unavailable("sdk not loaded".to_string())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(PaymentOutcome::Cancelled)
            }
        }
    }
}

pub fn court() -> Court {
    Court::new(
        CourtRef {
            facility_id: "12".to_string(),
            service_id: "34".to_string(),
            court_id: "7".to_string(),
            venue_name: "Smash Arena".to_string(),
            court_name: "Court 1".to_string(),
        },
        "09:00".parse().unwrap(),
        "22:00".parse().unwrap(),
        60,
        dec!(500),
    )
    .unwrap()
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
}

pub fn selection(starts: &[&str]) -> BookingSelection {
    let mut selection = BookingSelection::new(court(), date());
    for start in starts {
        selection.select(start.parse().unwrap()).unwrap();
    }
    selection
}

pub fn buyer() -> BuyerContact {
    BuyerContact::new("Asha", "asha@example.com", "9876543210")
}

pub fn orchestrator(
    gateway: Arc<ScriptedGateway>,
    backend: Arc<FakeBackend>,
    payment_timeout: Duration,
) -> PaymentOrchestrator {
    PaymentOrchestrator::new(
        gateway,
        backend,
        ReconciliationReporter::new(SUPPORT),
        payment_timeout,
    )
}

pub fn service(gateway: Arc<ScriptedGateway>, backend: Arc<FakeBackend>) -> BookingServiceImpl {
    BookingServiceImpl::new(
        orchestrator(gateway, backend.clone(), Duration::from_secs(5)),
        backend,
    )
}
