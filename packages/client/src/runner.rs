//! Client wiring and lifecycle.

use std::sync::Arc;

use tokio::sync::mpsc;
use wac_shared::time::SystemClock;

use crate::{
    config::ClientConfig,
    error::ClientError,
    infrastructure::{http::HttpApiClient, navigator::WatchNavigator, sse::SseConnection},
    ui::{MessageFormatter, Repl},
    usecase::{
        AuthService, ConversationService, ConversationSynchronizer, SessionContext, ToastService,
        UserSearchService, forward_session_changes,
    },
};

/// Build every component, resolve the session and run the terminal session
/// until the user quits
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    tracing::info!("Using backend at {}", config.api_url);

    let api = HttpApiClient::new(
        config.api_url.clone(),
        config.http_timeout,
        config.access_token.clone(),
    )?;

    let session = SessionContext::new();
    let auth = Arc::new(AuthService::new(
        Arc::new(api.clone()),
        session.clone(),
        config.oauth.clone(),
    ));
    let toasts = ToastService::new();
    let (navigator, navigation) = WatchNavigator::new();

    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let service = ConversationService::new(
        Arc::new(api.clone()),
        Arc::new(api.clone()),
        Arc::new(navigator),
        inbox_tx.clone(),
    );
    let (synchronizer, view) =
        ConversationSynchronizer::new(service, toasts.clone(), config.page_size);
    let search = UserSearchService::spawn(Arc::new(api.clone()), config.search_debounce);
    let events = SseConnection::new(
        api,
        config.max_reconnect_attempts,
        config.reconnect_interval,
    );

    let synchronizer_task = tokio::spawn(synchronizer.run(inbox_rx));
    let session_task = tokio::spawn(forward_session_changes(
        session.subscribe(),
        inbox_tx.clone(),
    ));
    let events_task = {
        let session = session.subscribe();
        let inbox = inbox_tx.clone();
        tokio::spawn(async move { events.run_while_authenticated(session, inbox).await })
    };

    auth.init_authentication().await;

    let repl = Repl::new(
        auth,
        inbox_tx,
        view,
        navigation,
        search,
        toasts,
        MessageFormatter::new(Arc::new(SystemClock)),
        config.page_size,
    );
    let result = repl.run().await;

    events_task.abort();
    session_task.abort();
    synchronizer_task.abort();
    result
}
