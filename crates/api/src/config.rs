use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Non-secret fields have defaults suitable for local development.
/// Secrets must be provided; startup panics without them.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Access-token validation settings.
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
    pub automation: AutomationConfig,
    pub storage: StorageConfig,
}

/// Stripe Checkout settings.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Price charged for one storybook.
    pub price_id: String,
    /// Redirect after payment; Stripe substitutes `{CHECKOUT_SESSION_ID}`.
    pub success_url: String,
    pub cancel_url: String,
}

/// Story-generation automation settings.
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Webhook that receives paid orders.
    pub webhook_url: String,
    /// Shared secret sent to the automation and expected on its callbacks.
    /// Callbacks are refused while unset.
    pub secret: Option<String>,
}

/// Photo storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the buckets.
    pub root: String,
    /// URL prefix the buckets are served from.
    pub public_base_url: String,
}

fn required(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
    assert!(!value.is_empty(), "{name} must not be empty");
    value
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                                       |
    /// |---------------------------|---------------------------------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                                                     |
    /// | `PORT`                    | `3000`                                                        |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`                                       |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                                          |
    /// | `STRIPE_SECRET_KEY`       | **required**                                                  |
    /// | `STRIPE_WEBHOOK_SECRET`   | **required**                                                  |
    /// | `STRIPE_PRICE_ID`         | **required**                                                  |
    /// | `CHECKOUT_SUCCESS_URL`    | `http://localhost:5173/success?session_id={CHECKOUT_SESSION_ID}` |
    /// | `CHECKOUT_CANCEL_URL`     | `http://localhost:5173/create`                                |
    /// | `AUTOMATION_WEBHOOK_URL`  | **required**                                                  |
    /// | `AUTOMATION_SECRET`       | unset                                                         |
    /// | `STORAGE_ROOT`            | `storage`                                                     |
    /// | `STORAGE_PUBLIC_BASE_URL` | `http://localhost:3000/storage`                               |
    ///
    /// See [`JwtConfig::from_env`] for the token settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let stripe = StripeConfig {
            secret_key: required("STRIPE_SECRET_KEY"),
            webhook_secret: required("STRIPE_WEBHOOK_SECRET"),
            price_id: required("STRIPE_PRICE_ID"),
            success_url: std::env::var("CHECKOUT_SUCCESS_URL").unwrap_or_else(|_| {
                "http://localhost:5173/success?session_id={CHECKOUT_SESSION_ID}".into()
            }),
            cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:5173/create".into()),
        };

        let automation = AutomationConfig {
            webhook_url: required("AUTOMATION_WEBHOOK_URL"),
            secret: std::env::var("AUTOMATION_SECRET").ok().filter(|s| !s.is_empty()),
        };

        let storage = StorageConfig {
            root: std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage".into()),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/storage".into()),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            stripe,
            automation,
            storage,
        }
    }
}
