//! journal-billing server binary.
//!
//! Loads configuration, initializes logging, wires adapters into the billing
//! router, and serves it until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use journal_billing::adapters::http::{billing_app, BillingAppState};
use journal_billing::adapters::memory::InMemorySubscriberAccountRepository;
use journal_billing::adapters::nowpayments::{NowPaymentsCheckoutAdapter, NowPaymentsCheckoutConfig};
use journal_billing::adapters::paystack::{PaystackCheckoutAdapter, PaystackCheckoutConfig};
use journal_billing::adapters::postgres::PostgresSubscriberAccountRepository;
use journal_billing::config::{AppConfig, DatabaseConfig, LogFormat, PaymentConfig, ServerConfig};
use journal_billing::ports::SubscriberAccountRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let repository = account_repository(&config.database).await?;
    let state = app_state(repository, &config.payment);

    let app = billing_app(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        upgrade_plan = %config.payment.upgrade_plan,
        "journal-billing listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    match server.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn account_repository(
    database: &DatabaseConfig,
) -> Result<Arc<dyn SubscriberAccountRepository>, sqlx::Error> {
    let Some(url) = database.url() else {
        tracing::warn!("No database URL configured, accounts are held in memory");
        return Ok(Arc::new(InMemorySubscriberAccountRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .min_connections(database.min_connections)
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .idle_timeout(Some(database.idle_timeout()))
        .connect(url)
        .await?;
    tracing::info!(max_connections = database.max_connections, "Connected to PostgreSQL");

    Ok(Arc::new(PostgresSubscriberAccountRepository::new(pool)))
}

fn app_state(
    repository: Arc<dyn SubscriberAccountRepository>,
    payment: &PaymentConfig,
) -> BillingAppState {
    let paystack = &payment.paystack;
    let nowpayments = &payment.nowpayments;

    if paystack.secret_key().is_none() {
        tracing::warn!("Paystack secret key not set, Paystack requests will fail");
    }
    if nowpayments.ipn_secret().is_none() {
        tracing::warn!("NOWPayments IPN secret not set, crypto webhooks will fail");
    }

    let paystack_checkout = PaystackCheckoutAdapter::new(
        PaystackCheckoutConfig::new(paystack.secret_key(), paystack.amount_minor, &paystack.currency)
            .with_base_url(&paystack.api_base_url)
            .with_callback_url(paystack.callback_url.clone()),
    );
    let crypto_checkout = NowPaymentsCheckoutAdapter::new(
        NowPaymentsCheckoutConfig::new(
            nowpayments.api_key(),
            nowpayments.price_amount,
            &nowpayments.price_currency,
        )
        .with_base_url(&nowpayments.api_base_url)
        .with_ipn_callback_url(nowpayments.ipn_callback_url.clone())
        .with_redirect_urls(nowpayments.success_url.clone(), nowpayments.cancel_url.clone()),
    );

    BillingAppState {
        account_repository: repository,
        paystack_checkout: Arc::new(paystack_checkout),
        crypto_checkout: Arc::new(crypto_checkout),
        paystack_secret_key: paystack.secret_key(),
        nowpayments_ipn_secret: nowpayments.ipn_secret(),
        upgrade_plan: payment.upgrade_plan,
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
