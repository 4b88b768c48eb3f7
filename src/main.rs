// src/main.rs
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use court_booking::adapter::CheckoutCoordinator;
use court_booking::application::dto::parser::{parse_price, parse_selection};
use court_booking::application::dto::{CheckoutRequest, CourtRecord};
use court_booking::application::service::BookingService;
use court_booking::application::usecase::{Acknowledgement, SlotGenerator};
use court_booking::config::Config;
use court_booking::domain::errors::{AppError, AppResult, CheckoutError};
use court_booking::domain::models::Booking;
use court_booking::domain::money::{display_amount, format_minor_units};

#[derive(Parser, Debug)]
#[command(name = "court-booking", version, about = "Book and pay for sports court slots")]
struct Cli {
    /// JSON config file; environment variables are used when absent
    #[arg(long, env = "COURT_BOOKING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the slots a court offers
    Slots {
        /// Court record as published by the venue catalog
        court: PathBuf,
        /// Day to show, YYYY-MM-DD
        date: Option<NaiveDate>,
    },
    /// Pay for the selected slots and book them
    Checkout {
        /// Court, date, slot start times and buyer contact
        request: PathBuf,
    },
    /// List upcoming and past bookings of the signed-in user
    Bookings,
    /// Cancel an upcoming confirmed booking (no refund is issued)
    Cancel { booking_id: String },
}

fn load_config(path: Option<&Path>) -> AppResult<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn print_booking(booking: &Booking, currency: &str) {
    let price = display_amount(booking.price, currency).unwrap_or_else(|_| booking.price.to_string());
    println!(
        "{}  {} {}  {}  {}  [{}]",
        booking.id,
        booking.date,
        booking.slot,
        booking.court_name.as_deref().unwrap_or(&booking.court_id),
        price,
        booking.status
    );
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Listing slots needs no credentials, so fall back to defaults.
    let config = match (&cli.command, load_config(cli.config.as_deref())) {
        (_, Ok(config)) => config,
        (Command::Slots { .. }, Err(_)) => Config::default(),
        (_, Err(e)) => return Err(e),
    };

    config.init_logging()?;

    log::info!("Starting court-booking v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Slots { court, date } => {
            let record: CourtRecord = read_json(&court)?;
            let slots: Vec<_> = SlotGenerator::from_record(&record).collect();

            match date {
                Some(date) => println!("{} / {} on {}", record.venue_name, record.court_name, date),
                None => println!("{} / {}", record.venue_name, record.court_name),
            }

            if slots.is_empty() {
                println!("No slots available");
                return Ok(());
            }

            let price = parse_price(record.slot_price.as_deref())
                .and_then(|price| display_amount(price, &config.gateway.currency))
                .unwrap_or_else(|_| "price unavailable".to_string());
            for slot in slots {
                println!("  {}  {}", slot, price);
            }
        }
        Command::Checkout { request } => {
            let request: CheckoutRequest = read_json(&request)?;
            let selection = parse_selection(&request)?;

            println!(
                "{} slot(s) at {} on {}, total {}",
                selection.len(),
                request.court.venue_name,
                selection.date(),
                display_amount(selection.total()?, &config.gateway.currency)?
            );

            let mut coordinator = CheckoutCoordinator::from_config(&config)?;
            coordinator.attach_console_callbacks();
            if let Some(callbacks) = coordinator.callbacks() {
                log::debug!("Pending checkouts: {:?}", callbacks.pending_orders());
                println!("Complete payment in the hosted checkout, then enter the result here.");
            }

            let result = coordinator.service().checkout(&selection, &request.buyer).await;
            coordinator.shutdown().await;

            match result {
                Ok(receipt) => {
                    println!(
                        "Paid {} (order {}, payment {})",
                        format_minor_units(receipt.amount_minor, &config.gateway.currency),
                        receipt.order_id(),
                        receipt.payment_id()
                    );
                    for booking in &receipt.committed.bookings {
                        print_booking(booking, &config.gateway.currency);
                    }
                    if let Acknowledgement::Failed(reason) = &receipt.committed.acknowledgement {
                        log::warn!("Payment success was not recorded: {}", reason);
                    }
                }
                Err(CheckoutError::BookingCreation(notice)) => {
                    eprintln!("{}", notice.message());
                    return Err(AppError::Checkout(CheckoutError::BookingCreation(notice)));
                }
                Err(CheckoutError::Gateway(error)) if error.is_cancelled() => {
                    println!("Payment cancelled, nothing was booked.");
                }
                Err(error) => return Err(error.into()),
            }
        }
        Command::Bookings => {
            let coordinator = CheckoutCoordinator::from_config(&config)?;
            let history = coordinator
                .service()
                .history(Local::now().naive_local())
                .await?;

            if history.upcoming.is_empty() && history.past.is_empty() {
                println!("No bookings yet");
            }
            for (title, bookings) in [("Upcoming", &history.upcoming), ("Past", &history.past)] {
                if bookings.is_empty() {
                    continue;
                }
                println!("{}:", title);
                for booking in bookings {
                    print_booking(booking, &config.gateway.currency);
                }
            }
        }
        Command::Cancel { booking_id } => {
            let coordinator = CheckoutCoordinator::from_config(&config)?;
            let booking = coordinator.service().cancel_booking(&booking_id, Local::now().naive_local())
                .await?;
            print_booking(&booking, &config.gateway.currency);
        }
    }

    log::info!("Done");
    Ok(())
}
