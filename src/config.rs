//! Configuration for the taskdeck client

use std::env;
use std::time::Duration;

use crate::error::Error;

const PLACEHOLDER_URL: &str = "your-supabase-url";
const PLACEHOLDER_KEY: &str = "your-supabase-anon-key";

/// Configuration options for the taskdeck client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout
    pub request_timeout: Option<Duration>,

    /// Whether successful sign-in/sign-up stores the session on the client
    pub persist_session: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            persist_session: true,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }
}

/// Backend connection configuration
///
/// A config built from missing or placeholder credentials is unconfigured:
/// sign-in and sign-up are blocked with [`Error::Config`] before any network
/// I/O. There is no hardcoded fallback project.
#[derive(Debug, Clone)]
pub struct Config {
    /// The base URL for the backend project
    pub url: String,
    /// The anonymous API key for the backend project
    pub anon_key: String,
    /// Client options
    pub options: ClientOptions,
    configured: bool,
}

impl Config {
    /// Create a config from explicit credentials
    pub fn new(url: &str, anon_key: &str) -> Self {
        let configured = has_credentials(url, anon_key);
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            options: ClientOptions::default(),
            configured,
        }
    }

    /// Read the config from the `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    /// environment variables
    ///
    /// Besides the placeholder check, the URL must look like a hosted
    /// project (`https://<ref>.supabase.co`) to count as configured.
    pub fn from_env() -> Self {
        let url = env::var("SUPABASE_URL").unwrap_or_default();
        let anon_key = env::var("SUPABASE_ANON_KEY").unwrap_or_default();

        let mut config = Self::new(&url, &anon_key);
        config.configured = config.configured && hosted_url(&config.url);

        if !config.configured {
            tracing::warn!(
                "backend credentials are missing or placeholders; sign-in and sign-up are disabled"
            );
        }

        config
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether real credentials are present
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Fail with a configuration error if credentials are missing
    pub fn ensure_configured(&self) -> Result<(), Error> {
        if self.configured {
            Ok(())
        } else {
            Err(Error::config(
                "backend credentials are missing or placeholders; \
                 set SUPABASE_URL and SUPABASE_ANON_KEY",
            ))
        }
    }
}

fn has_credentials(url: &str, anon_key: &str) -> bool {
    !url.is_empty() && !anon_key.is_empty() && url != PLACEHOLDER_URL && anon_key != PLACEHOLDER_KEY
}

fn hosted_url(url: &str) -> bool {
    url.starts_with("https://") && url.contains(".supabase.co")
}
