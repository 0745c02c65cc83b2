//! Promotion evaluation front end.
//!
//! Loads a promotion catalogue and a cart from JSON, runs them through the
//! promotion application service and reports the applicable promotions and
//! discounts. Configuration comes from the environment; logs go through
//! `tracing`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod report;

pub use catalog::{CartDocument, CartItemDocument, PromotionCatalog};
pub use config::{Config, LogFormat};
pub use error::AppError;
pub use report::{EvaluationReport, evaluate};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when both are set. Calling this
/// twice is harmless; the second subscriber is ignored.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Loads the configured inputs and evaluates the cart.
#[tracing::instrument(skip(config), fields(promotions = %config.promotions_path.display(), cart = %config.cart_path.display()))]
pub async fn run(config: &Config) -> Result<EvaluationReport, AppError> {
    let catalog = PromotionCatalog::load(&config.promotions_path)?;
    let cart = CartDocument::load(&config.cart_path)?.into_cart()?;

    tracing::info!(
        promotions = catalog.len(),
        lines = cart.items().len(),
        "inputs loaded"
    );

    evaluate(&catalog, &cart, config.expiring_soon_within()).await
}
