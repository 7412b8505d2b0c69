//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::{error::ClientError, usecase::OAuthConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "wac-client")]
#[command(
    about = "Terminal chat client kept in sync over REST and server-sent events",
    long_about = None
)]
pub struct ClientArgs {
    /// Base URL of the backend REST API
    #[arg(short = 'u', long, env = "WAC_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,

    /// Access token sent as a bearer token
    #[arg(short = 't', long, env = "WAC_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// OAuth2 issuer (realm) URL
    #[arg(long, env = "WAC_OAUTH_ISSUER", default_value = "http://localhost:9090/realms/wac")]
    pub oauth_issuer: String,

    #[arg(long, env = "WAC_OAUTH_CLIENT_ID", default_value = "wac-front")]
    pub oauth_client_id: String,

    /// Where the provider sends the user back after login or logout
    #[arg(long, env = "WAC_OAUTH_REDIRECT_URI", default_value = "http://localhost:4200")]
    pub oauth_redirect_uri: String,

    /// Conversations fetched on startup
    #[arg(long, env = "WAC_PAGE_SIZE", default_value_t = 20)]
    pub page_size: u32,

    /// Quiet period before a user search is sent
    #[arg(long, env = "WAC_SEARCH_DEBOUNCE_MS", default_value_t = 300)]
    pub search_debounce_ms: u64,

    #[arg(long, env = "WAC_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    #[arg(long, env = "WAC_MAX_RECONNECT_ATTEMPTS", default_value_t = 5)]
    pub max_reconnect_attempts: u32,

    #[arg(long, env = "WAC_RECONNECT_INTERVAL_SECS", default_value_t = 5)]
    pub reconnect_interval_secs: u64,
}

/// Validated client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: Url,
    pub access_token: Option<String>,
    pub oauth: OAuthConfig,
    pub page_size: u32,
    pub search_debounce: Duration,
    pub http_timeout: Duration,
    pub max_reconnect_attempts: u32,
    pub reconnect_interval: Duration,
}

fn parse_url(name: &str, value: &str) -> Result<Url, ClientError> {
    let url = Url::parse(value)
        .map_err(|e| ClientError::Config(format!("invalid {} '{}': {}", name, value, e)))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!(
            "{} '{}' cannot be used as a base URL",
            name, value
        )));
    }
    Ok(url)
}

impl TryFrom<ClientArgs> for ClientConfig {
    type Error = ClientError;

    fn try_from(args: ClientArgs) -> Result<Self, Self::Error> {
        if args.page_size == 0 {
            return Err(ClientError::Config(
                "page size must be greater than zero".to_string(),
            ));
        }
        if args.http_timeout_secs == 0 {
            return Err(ClientError::Config(
                "HTTP timeout must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url: parse_url("API URL", &args.api_url)?,
            access_token: args.access_token.filter(|token| !token.trim().is_empty()),
            oauth: OAuthConfig {
                issuer: parse_url("OAuth issuer", &args.oauth_issuer)?,
                client_id: args.oauth_client_id,
                redirect_uri: args.oauth_redirect_uri,
            },
            page_size: args.page_size,
            search_debounce: Duration::from_millis(args.search_debounce_ms),
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            max_reconnect_attempts: args.max_reconnect_attempts,
            reconnect_interval: Duration::from_secs(args.reconnect_interval_secs),
        })
    }
}
