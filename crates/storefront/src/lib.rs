//! Storefront application.
//!
//! [`Storefront`] owns the cart engine and the order service for one shopper
//! and hands out checkout sessions. It is created with [`Storefront::init`]
//! and torn down with [`Storefront::shutdown`]; there is no global instance.
//! Metrics are recorded once a recorder from [`telemetry::install_recorder`]
//! is installed and handed over with [`Storefront::with_metrics`].

pub mod backend;
pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;

use cart::{CartEngine, JsonFileStore, KeyValueStore, LoadSource};
use checkout::{AddressBook, CheckoutSession, DEFAULT_ADDRESS_KEY, DeliveryPricing};
use common::{Notifier, TracingNotifier};
use metrics_exporter_prometheus::PrometheusHandle;
use payment::RandomDecider;

pub use backend::{CartBackend, OrderBackend};
pub use config::{Config, LogFormat};
pub use error::{Result, StorefrontError};

/// Cart engine as wired by the storefront.
pub type StorefrontCart = CartEngine<CartBackend, JsonFileStore>;

/// Checkout session as wired by the storefront.
pub type StorefrontCheckout = CheckoutSession<CartBackend, JsonFileStore, OrderBackend>;

/// One shopper's storefront: cart, saved addresses and checkout.
pub struct Storefront {
    config: Config,
    cart: Arc<StorefrontCart>,
    orders: OrderBackend,
    pricing: DeliveryPricing,
    notifier: Arc<dyn Notifier>,
    load_source: LoadSource,
    metrics: Option<PrometheusHandle>,
}

impl Storefront {
    /// Wires the collaborators from `config` and loads the cart.
    pub async fn init(config: Config) -> Result<Self> {
        Self::init_with_notifier(config, Arc::new(TracingNotifier)).await
    }

    #[tracing::instrument(skip_all, fields(storage_dir = %config.storage_dir.display()))]
    pub async fn init_with_notifier(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        tokio::fs::create_dir_all(&config.storage_dir)
            .await
            .map_err(|source| StorefrontError::StorageDir {
                path: config.storage_dir.display().to_string(),
                source,
            })?;

        let remote = CartBackend::from_url(config.cart_api_url.as_deref())?;
        let store = JsonFileStore::new(config.storage_dir.clone());
        let cart = CartEngine::new(remote, store)
            .with_storage_key(config.cart_storage_key.clone())
            .with_notifier(Arc::clone(&notifier));

        // A corrupt snapshot leaves an empty cart with its error set.
        let load_source = match cart.load().await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(error = %e, "cart load failed, starting empty");
                LoadSource::Empty
            }
        };

        let orders = OrderBackend::from_url(config.order_api_url.as_deref())?;
        tracing::info!(
            ?load_source,
            offline = config.is_offline(),
            "storefront initialized"
        );

        Ok(Self {
            config,
            cart: Arc::new(cart),
            orders,
            pricing: DeliveryPricing::default(),
            notifier,
            load_source,
            metrics: None,
        })
    }

    pub fn with_pricing(mut self, pricing: DeliveryPricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// Keeps the recorder handle so metrics can be rendered and are written
    /// out on shutdown.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Renders the recorded metrics in Prometheus text format.
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(PrometheusHandle::render)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cart(&self) -> &Arc<StorefrontCart> {
        &self.cart
    }

    pub fn orders(&self) -> &OrderBackend {
        &self.orders
    }

    /// Where the cart came from at startup.
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Decider for simulated payments at the configured success rate.
    pub fn payment_decider(&self) -> RandomDecider {
        RandomDecider::new(self.config.payment_success_rate)
    }

    /// Reads the saved addresses. An unreadable book is treated as empty.
    pub async fn address_book(&self) -> AddressBook {
        AddressBook::load(self.cart.store(), DEFAULT_ADDRESS_KEY)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read saved addresses");
                AddressBook::new()
            })
    }

    pub async fn save_address_book(&self, book: &AddressBook) -> Result<()> {
        book.save(self.cart.store(), DEFAULT_ADDRESS_KEY).await?;
        Ok(())
    }

    /// Starts a checkout over the current cart and the saved addresses.
    pub async fn begin_checkout(&self) -> Result<StorefrontCheckout> {
        let book = self.address_book().await;
        let session = CheckoutSession::start(
            Arc::clone(&self.cart),
            self.orders.clone(),
            book,
            self.pricing,
        )
        .await?
        .with_notifier(Arc::clone(&self.notifier));
        metrics::counter!("checkout_sessions_started_total").increment(1);
        Ok(session)
    }

    /// Tears the storefront down. The cart snapshot is already current, so
    /// this verifies it can still be read and writes out the metrics.
    #[tracing::instrument(skip_all)]
    pub async fn shutdown(self) {
        if let Some(rendered) = self.render_metrics() {
            let path = self.config.storage_dir.join(telemetry::METRICS_FILE);
            match tokio::fs::write(&path, rendered).await {
                Ok(()) => tracing::info!(path = %path.display(), "metrics written"),
                Err(e) => tracing::warn!(error = %e, "failed to write metrics"),
            }
        }

        let items = self.cart.state().await.total_items();
        match self.cart.store().get(self.cart.storage_key()).await {
            Ok(snapshot) => tracing::info!(
                cart_saved = snapshot.is_some(),
                items,
                "storefront shut down"
            ),
            Err(e) => tracing::warn!(error = %e, "cart snapshot unreadable at shutdown"),
        }
    }
}
