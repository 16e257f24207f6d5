//! Storefront entry point: runs a scripted checkout against the configured
//! services.

use cart::ProductListing;
use checkout::{CheckoutError, NewAddress};
use common::Money;
use payment::PaymentDetails;
use storefront::{Config, LogFormat, Storefront, StorefrontError, telemetry};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const MAX_PAYMENT_ATTEMPTS: u32 = 3;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Waits for SIGINT.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install SIGINT handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received SIGINT, stopping");
}

async fn run_demo(storefront: &Storefront) -> Result<(), StorefrontError> {
    let cart = storefront.cart();
    let shawl = ProductListing::new("kashmiri-shawl", "Kashmiri Pashmina Shawl", Money::from_rupees(2499))
        .with_seller("Srinagar Weavers")
        .with_category("textiles");
    let diya = ProductListing::new("brass-diya", "Brass Diya Set", Money::from_rupees(349))
        .with_seller("Moradabad Metalcraft")
        .with_category("home");

    cart.add_item(&shawl, 1).await?;
    cart.add_item(&diya, 2).await?;
    cart.apply_coupon("BHARATSHAALA10").await?;
    let summary = cart.summary().await;
    tracing::info!(
        subtotal = %summary.subtotal,
        discount = %summary.discount,
        total = %summary.total,
        "cart ready"
    );

    let mut session = storefront.begin_checkout().await?;
    if session.selected_address().is_none() {
        session.add_address(NewAddress {
            name: "Asha Rao".into(),
            phone: "9876543210".into(),
            address_line1: "12 MG Road".into(),
            city: "Bengaluru".into(),
            state: Some("Karnataka".into()),
            pincode: "560001".into(),
            ..Default::default()
        })?;
        storefront.save_address_book(session.address_book()).await?;
    }
    session.advance()?;
    session.advance()?;

    let (mut gateway, _handle) = session.open_payment(storefront.payment_decider()).await?;
    for attempt in 1..=MAX_PAYMENT_ATTEMPTS {
        match session.pay(&mut gateway, PaymentDetails::upi("asha@okbank")).await {
            Ok(placed) => {
                tracing::info!(
                    order_id = %placed.order_id,
                    transaction_id = %placed.payment.transaction_id,
                    amount = %placed.payment.amount,
                    "order confirmed"
                );
                return Ok(());
            }
            Err(CheckoutError::PaymentFailed(failure)) if attempt < MAX_PAYMENT_ATTEMPTS => {
                tracing::warn!(attempt, reason = %failure.reason, "payment declined, retrying");
                gateway.retry().map_err(CheckoutError::from)?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), StorefrontError> {
    let config = Config::from_env();
    init_tracing(&config);
    let metrics = telemetry::install_recorder()?;

    let storefront = Storefront::init(config).await?.with_metrics(metrics);

    let result = tokio::select! {
        result = run_demo(&storefront) => result,
        () = shutdown_signal() => Ok(()),
    };
    if let Err(e) = &result {
        tracing::error!(error = %e, "demo checkout failed");
    }

    storefront.shutdown().await;
    result
}
