//! Application state wiring all services together.
//!
//! Services in skillgate-core are written against trait seams; AppState
//! pins them to the concrete skillgate-infra implementations. Everything
//! here is wired once at startup and shared via cheap Arc clones.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use skillgate_core::catalog::CatalogService;
use skillgate_core::identity::dispatcher::WebhookDispatcher;
use skillgate_core::identity::provider::VerificationProvider;
use skillgate_core::identity::store::SessionStore;
use skillgate_core::identity::IdentityVerificationService;
use skillgate_core::ratelimit::RateLimiter;
use skillgate_core::trace::AnalyticsSink;
use skillgate_infra::analytics::TraceLogSink;
use skillgate_infra::config::Secrets;
use skillgate_infra::provider::StripeIdentityProvider;
use skillgate_infra::store::{MemorySessionStore, MemoryUsageStore};
use skillgate_types::config::GatewayConfig;

/// The rate limiter pinned to the in-process usage store.
pub type ConcreteRateLimiter = RateLimiter<MemoryUsageStore>;

/// Shared application state used by all handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityVerificationService>,
    pub dispatcher: Arc<WebhookDispatcher>,
    pub limiter: Arc<ConcreteRateLimiter>,
    pub catalog: Arc<CatalogService>,
    pub analytics: Arc<dyn AnalyticsSink>,
    /// Shared secret verifying inbound webhook signatures.
    pub webhook_secret: SecretString,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Wire the state for production: real KYC provider client, in-process
    /// keyed stores, log-based analytics sink.
    pub fn init(config: GatewayConfig, secrets: Secrets) -> anyhow::Result<Self> {
        let provider = StripeIdentityProvider::new(
            secrets.provider_api_key,
            Duration::from_secs(config.provider.timeout_secs),
        )?
        .with_base_url(config.provider.base_url.clone());
        Ok(Self::with_provider(
            config,
            Arc::new(provider),
            secrets.webhook_secret,
        ))
    }

    /// Wire the state around an arbitrary provider implementation.
    /// Integration tests inject a deterministic stub here.
    pub fn with_provider(
        config: GatewayConfig,
        provider: Arc<dyn VerificationProvider>,
        webhook_secret: SecretString,
    ) -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let identity = IdentityVerificationService::new(
            provider,
            sessions.clone(),
            config.provider.clone(),
        );

        Self {
            identity: Arc::new(identity),
            dispatcher: Arc::new(WebhookDispatcher::new(sessions)),
            limiter: Arc::new(RateLimiter::new(MemoryUsageStore::new())),
            catalog: Arc::new(CatalogService::new(config.catalog.clone())),
            analytics: Arc::new(TraceLogSink::new()),
            webhook_secret,
            config: Arc::new(config),
        }
    }
}
