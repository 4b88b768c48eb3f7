// src/adapter/coordinator.rs
// Wires configuration to concrete infrastructure

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::application::service::BookingServiceImpl;
use crate::application::usecase::{PaymentOrchestrator, ReconciliationReporter};
use crate::config::{Config, Platform};
use crate::domain::errors::AppResult;
use crate::domain::repository::BookingRepository;
use crate::domain::service::PaymentGateway;
use crate::infrastructure::backend::HttpBookingRepository;
use crate::infrastructure::console::ConsoleInput;
use crate::infrastructure::gateway::embedded::parse_console_outcome;
use crate::infrastructure::gateway::{
    CheckoutCallbacks, ConsoleCheckoutSdk, EmbeddedCheckoutGateway, HostedCheckoutGateway,
};

pub struct CheckoutCoordinator {
    service: BookingServiceImpl,
    hosted: Option<Arc<HostedCheckoutGateway>>,
    input: Arc<ConsoleInput>,
    console: Option<JoinHandle<()>>,
}

impl CheckoutCoordinator {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let repository: Arc<dyn BookingRepository> = Arc::new(HttpBookingRepository::new(
            &config.backend.base_url,
            config.backend.auth_token.clone(),
            &config.gateway.payment_method,
        ));

        let input = Arc::new(ConsoleInput::stdin());
        let (gateway, hosted) = Self::select_gateway(config, input.clone());
        log::info!("Using {} checkout", gateway.name());

        Ok(Self::with_parts(config, gateway, repository, hosted).with_input(input))
    }

    /// Assemble from already built collaborators.
    pub fn with_parts(
        config: &Config,
        gateway: Arc<dyn PaymentGateway>,
        repository: Arc<dyn BookingRepository>,
        hosted: Option<Arc<HostedCheckoutGateway>>,
    ) -> Self {
        let orchestrator = PaymentOrchestrator::new(
            gateway,
            repository.clone(),
            ReconciliationReporter::new(&config.support.contact),
            config.gateway.payment_timeout(),
        );

        Self {
            service: BookingServiceImpl::new(orchestrator, repository),
            hosted,
            input: Arc::new(ConsoleInput::stdin()),
            console: None,
        }
    }

    /// The platform decides the gateway here so nothing downstream has to.
    fn select_gateway(
        config: &Config,
        input: Arc<ConsoleInput>,
    ) -> (Arc<dyn PaymentGateway>, Option<Arc<HostedCheckoutGateway>>) {
        let settings = config.gateway.checkout_settings();

        match config.gateway.platform {
            Platform::Hosted => {
                let hosted = Arc::new(HostedCheckoutGateway::new(
                    settings,
                    &config.gateway.checkout_url,
                ));
                let gateway: Arc<dyn PaymentGateway> = hosted.clone();
                (gateway, Some(hosted))
            }
            Platform::Embedded => {
                let gateway: Arc<dyn PaymentGateway> = Arc::new(EmbeddedCheckoutGateway::new(
                    ConsoleCheckoutSdk::new(input),
                    settings,
                ));
                (gateway, None)
            }
        }
    }

    pub fn service(&self) -> &BookingServiceImpl {
        &self.service
    }

    pub fn callbacks(&self) -> Option<CheckoutCallbacks> {
        self.hosted.as_ref().map(|hosted| hosted.callbacks())
    }

    /// Replaces the operator input, stdin by default.
    pub fn with_input(mut self, input: Arc<ConsoleInput>) -> Self {
        self.input = input;
        self
    }

    /// Lets an operator settle hosted checkouts from the terminal, one line
    /// per outcome, applied to the oldest pending order.
    pub fn attach_console_callbacks(&mut self) {
        let Some(callbacks) = self.callbacks() else {
            return;
        };
        let input = self.input.clone();

        self.console = Some(tokio::spawn(async move {
            while let Some(line) = input.next_line().await {
                let Some(outcome) = parse_console_outcome(&line) else {
                    println!("Enter payment id, 'cancel' or 'fail <reason>':");
                    continue;
                };

                match callbacks.pending_orders().first() {
                    Some(order_id) => {
                        callbacks.resolve(order_id, outcome);
                    }
                    None => println!("No checkout is waiting for a payment"),
                }
            }
        }));
    }

    pub async fn shutdown(&mut self) {
        if let Some(console) = self.console.take() {
            console.abort();
        }
        if let Some(hosted) = &self.hosted {
            hosted.teardown().await;
        }
    }
}
