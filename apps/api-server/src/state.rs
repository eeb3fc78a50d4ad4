//! Application state - shared across all handlers.

use std::sync::Arc;

use folio_core::ports::{
    ContactRepository, Notifier, PostRepository, RateLimitError, RateLimiter,
};
use folio_core::services::{ContactService, PostService};
use folio_infra::{
    InMemoryContactRepository, InMemoryPostRepository, MailRelayNotifier, NoopNotifier,
    RateLimitConfig, SlidingWindowRateLimiter,
};

use crate::config::{AppConfig, DEV_ORIGINS};
use crate::middleware::admin::AdminSecret;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<ContactService>,
    pub posts: Arc<PostService>,
    pub admin: AdminSecret,
    /// Contact form submissions per client address.
    pub contact_limiter: Arc<dyn RateLimiter>,
    /// Admin password checks per client address.
    pub auth_limiter: Arc<dyn RateLimiter>,
    pub environment: String,
    /// Read the client address from proxy headers instead of the socket peer.
    pub trust_proxy: bool,
    pub allowed_origins: Arc<[String]>,
}

/// Storage backends chosen at startup.
struct Stores {
    contacts: Arc<dyn ContactRepository>,
    posts: Arc<dyn PostRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            contacts: Arc::new(InMemoryContactRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn from_config(config: &AppConfig) -> Self {
        use folio_infra::database::{PostgresContactRepository, PostgresPostRepository, connect};

        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match connect(db_config).await {
            Ok(conn) => Self {
                contacts: Arc::new(PostgresContactRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn)),
            },
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn from_config(_config: &AppConfig) -> Self {
        tracing::info!("Running without postgres feature - using in-memory stores");
        Self::in_memory()
    }
}

fn notifier(config: &AppConfig) -> Arc<dyn Notifier> {
    let Some(mail) = config.mail.clone() else {
        tracing::warn!("MAIL_RELAY_URL or MAIL_FROM not set. Contact notifications disabled.");
        return Arc::new(NoopNotifier);
    };
    match MailRelayNotifier::new(mail) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            tracing::error!(error = %e, "Mail relay client unavailable. Contact notifications disabled.");
            Arc::new(NoopNotifier)
        }
    }
}

#[cfg(feature = "rate-limit")]
fn auth_limiter(config: RateLimitConfig) -> Result<Arc<dyn RateLimiter>, RateLimitError> {
    Ok(Arc::new(folio_infra::GcraRateLimiter::new(config)?))
}

#[cfg(not(feature = "rate-limit"))]
fn auth_limiter(config: RateLimitConfig) -> Result<Arc<dyn RateLimiter>, RateLimitError> {
    Ok(Arc::new(SlidingWindowRateLimiter::new(config)?))
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, RateLimitError> {
        let stores = Stores::from_config(config).await;

        if config.admin_password.is_none() {
            tracing::warn!("ADMIN_PASSWORD not set. Admin routes are disabled.");
        }

        if config.trust_proxy {
            tracing::info!("TRUST_PROXY set. Client addresses come from forwarding headers.");
        }

        let mut state = Self::assemble(
            stores,
            notifier(config),
            config.admin_password.as_deref(),
            &config.post_author,
            config.contact_rate_limit,
            config.auth_rate_limit,
            config.environment.clone(),
        )?;
        state.trust_proxy = config.trust_proxy;
        state.allowed_origins = config.allowed_origins.clone().into();

        tracing::info!(origins = ?state.allowed_origins, "Application state initialized");
        Ok(state)
    }

    /// In-memory state with default limits and no notifications.
    pub fn in_memory(admin_password: Option<&str>) -> Result<Self, RateLimitError> {
        Self::assemble(
            Stores::in_memory(),
            Arc::new(NoopNotifier),
            admin_password,
            folio_core::domain::DEFAULT_AUTHOR,
            RateLimitConfig::contact_form(),
            RateLimitConfig::admin_auth(),
            "test".to_string(),
        )
    }

    fn assemble(
        stores: Stores,
        notifier: Arc<dyn Notifier>,
        admin_password: Option<&str>,
        author: &str,
        contact_limit: RateLimitConfig,
        auth_limit: RateLimitConfig,
        environment: String,
    ) -> Result<Self, RateLimitError> {
        Ok(Self {
            contacts: Arc::new(ContactService::new(stores.contacts, notifier)),
            posts: Arc::new(PostService::with_author(stores.posts, author)),
            admin: AdminSecret::new(admin_password),
            contact_limiter: Arc::new(SlidingWindowRateLimiter::new(contact_limit)?),
            auth_limiter: auth_limiter(auth_limit)?,
            environment,
            trust_proxy: false,
            allowed_origins: DEV_ORIGINS.iter().map(|o| o.to_string()).collect(),
        })
    }
}
