// src/infrastructure/backend/mod.rs
// Backend booking API repository implementation

pub mod dto;

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, StatusCode};
use hyper_tls::HttpsConnector;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::errors::{BackendError, BackendResult};
use crate::domain::models::{Booking, BookingPayload, PaymentReceipt};
use crate::domain::repository::BookingRepository;
use dto::{
    BookingEnvelope, BookingsEnvelope, CreateBookingBody, CreateBookingResponse, ErrorBody,
    PaymentFailureBody, PaymentSuccessBody,
};

pub struct HttpBookingRepository {
    client: Client<HttpsConnector<HttpConnector>>,
    base_url: String,
    auth_token: Option<String>,
    payment_method: String,
}

impl HttpBookingRepository {
    pub fn new(base_url: &str, auth_token: Option<String>, payment_method: &str) -> Self {
        Self {
            client: Client::builder().build(HttpsConnector::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            payment_method: payment_method.to_string(),
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> BackendResult<Bytes> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(&url)
            .header(ACCEPT, "application/json");

        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(bytes) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(bytes)),
            None => builder.body(Body::empty()),
        }
        .map_err(|e| BackendError::Request(format!("Invalid request {} {}: {}", method, url, e)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| BackendError::Request(format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| BackendError::Request(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &bytes));
        }

        log::debug!("{} {} -> {}", method, url, status);
        Ok(bytes)
    }

    fn status_error(status: StatusCode, bytes: &[u8]) -> BackendError {
        let message = serde_json::from_slice::<ErrorBody>(bytes)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        BackendError::Status {
            status: status.as_u16(),
            message,
        }
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> BackendResult<Bytes> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| BackendError::Request(format!("Failed to encode request: {}", e)))?;
        self.send(Method::POST, path, Some(bytes)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let bytes = self.send(Method::GET, path, None).await?;
        decode(&bytes)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> BackendResult<T> {
    serde_json::from_slice(bytes).map_err(|e| BackendError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl BookingRepository for HttpBookingRepository {
    async fn create_booking(
        &self,
        payload: &BookingPayload,
        receipt: &PaymentReceipt,
    ) -> BackendResult<Booking> {
        let body = CreateBookingBody::new(payload, receipt, &self.payment_method);
        let bytes = self.post("/booking", &body).await?;
        decode::<CreateBookingResponse>(&bytes)?.into_booking(payload, receipt)
    }

    async fn report_payment_success(&self, order_id: &str, payment_id: &str) -> BackendResult<()> {
        self.post(
            "/booking/payment-success",
            &PaymentSuccessBody {
                order_id,
                payment_id,
            },
        )
        .await?;
        Ok(())
    }

    async fn report_payment_failure(&self, order_id: &str) -> BackendResult<()> {
        self.post("/booking/payment-failure", &PaymentFailureBody { order_id })
            .await?;
        Ok(())
    }

    async fn list_bookings(&self) -> BackendResult<Vec<Booking>> {
        let envelope: BookingsEnvelope = self.get("/my-bookings").await?;

        let Some(records) = envelope.bookings else {
            log::warn!("Backend returned no bookings list");
            return Ok(Vec::new());
        };

        // One unreadable record must not hide the rest of the history
        let bookings = records
            .into_iter()
            .filter_map(|record| match record.into_booking() {
                Ok(booking) => Some(booking),
                Err(e) => {
                    log::warn!("Skipping booking record: {}", e);
                    None
                }
            })
            .collect();

        Ok(bookings)
    }

    async fn get_booking(&self, booking_id: &str) -> BackendResult<Booking> {
        let envelope: BookingEnvelope = self.get(&format!("/booking/{}", booking_id)).await?;

        envelope
            .booking
            .ok_or_else(|| BackendError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("Booking {} not found", booking_id),
            })?
            .into_booking()
    }

    async fn cancel_booking(&self, booking_id: &str) -> BackendResult<()> {
        self.send(Method::POST, &format!("/cancel-booking/{}", booking_id), None)
            .await?;
        Ok(())
    }
}
