//! UseCase: 認証とセッション管理
//!
//! ## 責務
//!
//! - 「誰がログインしているか」の唯一の情報源（`SessionContext`）を保持する
//! - アクセストークンから認証済みユーザーを解決する（`AuthService`）
//! - OAuth2 プロバイダーのログイン・ログアウト・プロフィール URL を組み立てる
//!
//! 購読者（会話同期など）は `watch` チャンネル経由で状態遷移を受け取ります。

use std::sync::Arc;

use tokio::sync::watch;
use url::Url;

use crate::{
    domain::{AuthApi, SessionState},
    error::ApiError,
};

/// Single source of truth for the current session
#[derive(Clone)]
pub struct SessionContext {
    sender: Arc<watch::Sender<SessionState>>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SessionState::Unresolved);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }

    /// Publish a new state. Subscribers are only woken when it differs from
    /// the current one.
    pub fn set(&self, state: SessionState) {
        self.sender.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// OAuth2 provider settings (Keycloak-style endpoints under the issuer URL)
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthConfig {
    pub issuer: Url,
    pub client_id: String,
    pub redirect_uri: String,
}

impl OAuthConfig {
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.issuer.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn login_url(&self) -> Url {
        let mut url = self.endpoint(&["protocol", "openid-connect", "auth"]);
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid")
            .append_pair("redirect_uri", &self.redirect_uri);
        url
    }

    pub fn logout_url(&self) -> Url {
        let mut url = self.endpoint(&["protocol", "openid-connect", "logout"]);
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("post_logout_redirect_uri", &self.redirect_uri);
        url
    }

    pub fn profile_url(&self) -> Url {
        self.endpoint(&["account"])
    }
}

/// 認証のユースケース
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: SessionContext,
    oauth: OAuthConfig,
}

impl AuthService {
    pub fn new(api: Arc<dyn AuthApi>, session: SessionContext, oauth: OAuthConfig) -> Self {
        Self {
            api,
            session,
            oauth,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Resolve the principal and publish the resulting session state.
    ///
    /// Without credentials the session becomes `Anonymous` without calling
    /// the backend. A rejected or failed lookup also ends as `Anonymous`.
    pub async fn init_authentication(&self) -> SessionState {
        let state = if !self.api.has_credentials() {
            tracing::info!("No access token configured, staying anonymous");
            SessionState::Anonymous
        } else {
            match self.api.authenticated_user().await {
                Ok(user) => {
                    tracing::info!("Authenticated as '{}'", user.email);
                    SessionState::Authenticated(user)
                }
                Err(ApiError::Unauthorized) => {
                    tracing::warn!("Access token rejected by the backend");
                    SessionState::Anonymous
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch the authenticated user: {}", e);
                    SessionState::Anonymous
                }
            }
        };

        self.session.set(state.clone());
        state
    }

    /// Store a new access token and resolve the principal again
    pub async fn login_with_token(&self, access_token: String) -> SessionState {
        self.api.set_credentials(access_token);
        self.init_authentication().await
    }

    pub fn login_url(&self) -> Url {
        self.oauth.login_url()
    }

    /// Forget the credentials, become anonymous, and return the provider's
    /// end-session URL
    pub fn logout(&self) -> Url {
        self.api.clear_credentials();
        self.session.set(SessionState::Anonymous);
        tracing::info!("Logged out");
        self.oauth.logout_url()
    }

    pub fn profile_url(&self) -> Url {
        self.oauth.profile_url()
    }
}
