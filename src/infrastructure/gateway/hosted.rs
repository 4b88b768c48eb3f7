// src/infrastructure/gateway/hosted.rs
// Checkout hosted by the gateway; the outcome arrives later as a callback

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, Uri};
use hyper_tls::HttpsConnector;
use serde::Deserialize;
use std::sync::{Arc, MutexGuard, PoisonError};
use tokio::sync::{oneshot, Mutex};

use super::options::{CheckoutOptions, CheckoutSettings};
use crate::domain::errors::{GatewayError, GatewayResult};
use crate::domain::models::{CheckoutSummary, OrderIntent, PaymentOutcome};
use crate::domain::service::PaymentGateway;

/// Open checkouts, oldest first.
type PendingMap = Vec<(String, oneshot::Sender<PaymentOutcome>)>;

/// Handle through which the callback surface (redirect or webhook handler)
/// reports how a hosted checkout ended.
#[derive(Clone, Default)]
pub struct CheckoutCallbacks {
    pending: Arc<std::sync::Mutex<PendingMap>>,
}

impl CheckoutCallbacks {
    /// Delivers the outcome of an open checkout. Returns false for unknown
    /// or already settled orders.
    pub fn resolve(&self, order_id: &str, outcome: PaymentOutcome) -> bool {
        let sender = self.take(order_id);

        match sender {
            Some(sender) => sender.send(outcome).is_ok(),
            None => {
                log::warn!("Ignoring callback for unknown order {}", order_id);
                false
            }
        }
    }

    /// Order ids of open checkouts in the order they were opened.
    pub fn pending_orders(&self) -> Vec<String> {
        self.lock().iter().map(|(order_id, _)| order_id.clone()).collect()
    }

    fn register(&self, order_id: &str) -> Option<oneshot::Receiver<PaymentOutcome>> {
        let mut pending = self.lock();
        if pending.iter().any(|(pending_id, _)| pending_id == order_id) {
            return None;
        }

        let (sender, receiver) = oneshot::channel();
        pending.push((order_id.to_string(), sender));
        Some(receiver)
    }

    fn take(&self, order_id: &str) -> Option<oneshot::Sender<PaymentOutcome>> {
        let mut pending = self.lock();
        let position = pending.iter().position(|(pending_id, _)| pending_id == order_id)?;
        Some(pending.remove(position).1)
    }

    fn forget(&self, order_id: &str) {
        self.take(order_id);
    }

    /// Drops every pending sender; waiting checkouts see the channel close.
    fn close_all(&self) -> usize {
        let mut pending = self.lock();
        let count = pending.len();
        pending.clear();
        count
    }

    fn lock(&self) -> MutexGuard<'_, PendingMap> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the pending entry when `open` returns or is dropped by a timeout.
struct PendingGuard<'a> {
    callbacks: &'a CheckoutCallbacks,
    order_id: &'a str,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.callbacks.forget(self.order_id);
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    id: Option<String>,
}

struct HostedClient {
    http: Client<HttpsConnector<HttpConnector>>,
    endpoint: Uri,
}

impl HostedClient {
    async fn create_session(&self, options: &CheckoutOptions) -> GatewayResult<String> {
        let body = serde_json::to_vec(options)
            .map_err(|e| GatewayError::Unavailable(format!("Failed to encode checkout: {}", e)))?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| GatewayError::Unavailable(format!("Invalid checkout request: {}", e)))?;

        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| GatewayError::Unavailable(format!("Hosted checkout unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Unavailable(format!(
                "Hosted checkout returned {}",
                status
            )));
        }

        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| GatewayError::Unavailable(format!("Failed to read checkout session: {}", e)))?;

        let session: SessionResponse = serde_json::from_slice(&bytes).map_err(|e| {
            GatewayError::Unavailable(format!("Unreadable checkout session: {}", e))
        })?;

        Ok(session.id.unwrap_or_else(|| {
            log::warn!("Hosted checkout session has no id");
            "unknown".to_string()
        }))
    }
}

pub struct HostedCheckoutGateway {
    settings: CheckoutSettings,
    checkout_url: String,
    client: Mutex<Option<Arc<HostedClient>>>,
    callbacks: CheckoutCallbacks,
}

impl HostedCheckoutGateway {
    pub fn new(settings: CheckoutSettings, checkout_url: &str) -> Self {
        Self {
            settings,
            checkout_url: checkout_url.to_string(),
            client: Mutex::new(None),
            callbacks: CheckoutCallbacks::default(),
        }
    }

    pub fn callbacks(&self) -> CheckoutCallbacks {
        self.callbacks.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.client.lock().await.is_some()
    }

    /// Releases the client handle and ends every waiting checkout as failed.
    /// The next `open` initialises a fresh client.
    pub async fn teardown(&self) {
        let released = self.client.lock().await.take().is_some();
        let closed = self.callbacks.close_all();

        if released || closed > 0 {
            log::info!(
                "Hosted checkout torn down ({} pending checkout(s) closed)",
                closed
            );
        }
    }

    /// The shared client, created on first use.
    async fn client(&self) -> GatewayResult<Arc<HostedClient>> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let endpoint: Uri = self.checkout_url.parse().map_err(|e| {
            GatewayError::Unavailable(format!("Invalid checkout URL {}: {}", self.checkout_url, e))
        })?;

        let client = Arc::new(HostedClient {
            http: Client::builder().build(HttpsConnector::new()),
            endpoint,
        });
        log::info!("Initialised hosted checkout client for {}", self.checkout_url);

        *slot = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn open(
        &self,
        intent: &OrderIntent,
        summary: &CheckoutSummary,
    ) -> GatewayResult<PaymentOutcome> {
        let client = self.client().await?;
        let options = CheckoutOptions::new(&self.settings, intent, summary, self.name());

        let receiver = self.callbacks.register(intent.order_id()).ok_or_else(|| {
            GatewayError::Unavailable(format!(
                "Order {} already has an open checkout",
                intent.order_id()
            ))
        })?;
        let _guard = PendingGuard {
            callbacks: &self.callbacks,
            order_id: intent.order_id(),
        };

        let session = client.create_session(&options).await?;
        log::info!(
            "Hosted checkout session {} opened for order {}",
            session,
            intent.order_id()
        );
        drop(client);

        match receiver.await {
            Ok(outcome) => Ok(outcome),
            Err(_) => Ok(PaymentOutcome::Failed {
                reason: "checkout closed".to_string(),
            }),
        }
    }
}
