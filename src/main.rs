use bliss_storefront::core::catalog::IngestOutcome;
use bliss_storefront::{Result, StorefrontSession, config};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the storefront configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Run one ingestion pass the way a visitor's session would
    let session = StorefrontSession::connect(&app_config)
        .await
        .inspect_err(|e| error!("Failed to start storefront session: {}", e))?;

    if let Some(notice) = session.notice() {
        warn!("{}", notice);
    }

    if let Some(catalog) = session.catalog().await {
        info!("Catalog from {} loaded at {}", catalog.source(), catalog.loaded_at());
        match catalog.outcome() {
            IngestOutcome::Complete { products } => {
                info!("Catalog healthy: {} products", products);
            }
            IngestOutcome::Partial { products, skipped } => {
                warn!("Catalog loaded {} products, {} rows need fixing:", products, skipped);
                for row in catalog.skipped_rows() {
                    warn!("  row {}: {} ({})", row.index, row.reason, row.raw_line);
                }
            }
        }
        for product in catalog.products() {
            info!(
                "#{} {} - {}{}",
                product.id,
                product.name,
                session.format_price(product.price),
                if product.image().is_none() { " (placeholder image)" } else { "" }
            );
        }
    }

    info!("Checkout link: {}", session.checkout_target());
    session.teardown_session();
    Ok(())
}
