//! Event stream connection with reconnection support.

use std::{fmt::Display, time::Duration};

use futures_util::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{
        PublicId, SessionState,
        reconnect::{reconnect_delay, should_attempt_reconnect, should_stop_immediately},
    },
    error::SseError,
    infrastructure::http::HttpApiClient,
    usecase::SyncInput,
};

use super::{decoder::SseDecoder, event::parse_push_event};

pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Subscription to the backend event stream feeding the synchronizer inbox
pub struct SseConnection {
    client: HttpApiClient,
    max_reconnect_attempts: u32,
    reconnect_interval: Duration,
}

impl SseConnection {
    pub fn new(
        client: HttpApiClient,
        max_reconnect_attempts: u32,
        reconnect_interval: Duration,
    ) -> Self {
        Self {
            client,
            max_reconnect_attempts,
            reconnect_interval,
        }
    }

    /// Subscribe once and forward events until the stream fails or ends.
    ///
    /// Returns `Ok(())` only when the inbox is closed. A `retry` value sent by
    /// the server is stored in `server_retry`.
    pub async fn run_session(
        &self,
        inbox: &mpsc::UnboundedSender<SyncInput>,
        server_retry: &mut Option<Duration>,
    ) -> Result<(), SseError> {
        let response = self.client.subscribe_events().await?;
        tracing::info!("Subscribed to the event stream");
        forward_events(response.bytes_stream(), inbox, server_retry).await
    }

    /// Keep the subscription alive, reconnecting after failures.
    ///
    /// The attempt counter is reset once a subscription succeeds. Gives up
    /// after `max_reconnect_attempts` consecutive failures or as soon as the
    /// backend rejects the credentials. Waits `reconnect_interval` between
    /// attempts unless the server asked for another delay with `retry`.
    pub async fn run(&self, inbox: &mpsc::UnboundedSender<SyncInput>) -> Result<(), SseError> {
        let mut reconnect_count = 0;
        let mut server_retry = None;

        loop {
            tracing::info!("Connecting to the event stream at {}", self.client.api_url());

            let error = match self.run_session(inbox, &mut server_retry).await {
                Ok(()) => {
                    tracing::info!("Synchronizer stopped, closing the event stream");
                    return Ok(());
                }
                Err(e) => e,
            };
            if matches!(error, SseError::Read(_) | SseError::Closed) {
                // The subscription itself succeeded before the stream broke
                reconnect_count = 0;
            }

            if should_stop_immediately(&error) {
                tracing::error!("{}. Not reconnecting.", error);
                return Err(error);
            }

            tracing::warn!("Event stream lost: {}", error);
            if !should_attempt_reconnect(&error, reconnect_count, self.max_reconnect_attempts) {
                tracing::error!(
                    "Failed to reconnect after {} attempts. Giving up.",
                    self.max_reconnect_attempts
                );
                return Err(error);
            }
            reconnect_count += 1;

            let delay = reconnect_delay(self.reconnect_interval, server_retry);
            tracing::info!(
                "Reconnecting in {} ms... (attempt {}/{})",
                delay.as_millis(),
                reconnect_count,
                self.max_reconnect_attempts
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Hold a subscription for as long as a user is authenticated.
    ///
    /// The stream is closed on logout and reopened for a new identity. Stops
    /// when the session channel or the inbox closes.
    pub async fn run_while_authenticated(
        &self,
        mut session: watch::Receiver<SessionState>,
        inbox: mpsc::UnboundedSender<SyncInput>,
    ) {
        loop {
            let user_id = session.borrow_and_update().user_id();
            let Some(user_id) = user_id else {
                if session.changed().await.is_err() {
                    return;
                }
                continue;
            };

            tokio::select! {
                result = self.run(&inbox) => match result {
                    Ok(()) => return,
                    Err(e) => {
                        tracing::warn!("Event stream stopped: {}", e);
                        // Wait for the session to change before trying again
                        if session.changed().await.is_err() {
                            return;
                        }
                    }
                },
                _ = identity_changed(&mut session, user_id) => {
                    tracing::info!("Session changed, closing the event stream");
                }
            }
        }
    }
}

/// Resolves once the session no longer belongs to `user_id` or the channel closes
async fn identity_changed(session: &mut watch::Receiver<SessionState>, user_id: PublicId) {
    while session.changed().await.is_ok() {
        if session.borrow().user_id() != Some(user_id) {
            return;
        }
    }
}

/// Decode the byte stream and post every push event to the inbox.
///
/// Frames that cannot be decoded are skipped. The latest `retry` field is
/// written to `server_retry`, even when the stream then fails.
pub async fn forward_events<S, B, E>(
    stream: S,
    inbox: &mpsc::UnboundedSender<SyncInput>,
    server_retry: &mut Option<Duration>,
) -> Result<(), SseError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| SseError::Read(e.to_string()))?;
        let frames = decoder.feed(chunk.as_ref());
        if let Some(retry) = decoder.retry() {
            *server_retry = Some(Duration::from_millis(retry));
        }
        for frame in frames {
            match parse_push_event(&frame) {
                Ok(event) => {
                    tracing::debug!("Received '{}' event", frame.event);
                    if inbox.send(SyncInput::Push(event)).is_err() {
                        return Ok(());
                    }
                }
                Err(e) => tracing::warn!("Skipping event stream frame: {}", e),
            }
        }
    }

    Err(SseError::Closed)
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;
    use crate::domain::PushEvent;

    const CONVERSATION_ID: &str = "0b8a6c1e-1f39-4c61-8b32-0d2c3c9a7e01";

    #[tokio::test]
    async fn test_forward_events_posts_push_events_and_skips_invalid_frames() {
        // テスト項目: 正しいフレームはプッシュイベントとして投函され、不正なフレームはスキップされる
        // given (前提条件):
        let chunks: Vec<Result<&[u8], String>> = vec![
            Ok(&b"event: typing\ndata: {}\n\n"[..]),
            Ok(&b"event: delete-conversation\ndata: "[..]),
            Ok(CONVERSATION_ID.as_bytes()),
            Ok(&b"\n\n"[..]),
        ];
        let (inbox, mut received) = mpsc::unbounded_channel();

        // when (操作):
        let result = forward_events(stream::iter(chunks), &inbox, &mut None).await;

        // then (期待する結果):
        assert_eq!(result, Err(SseError::Closed));
        assert_eq!(
            received.try_recv().unwrap(),
            SyncInput::Push(PushEvent::ConversationDeleted(
                CONVERSATION_ID.parse().unwrap()
            ))
        );
        assert!(received.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_forward_events_read_error() {
        // テスト項目: 読み取りエラーは SseError::Read として返される
        // given (前提条件):
        let chunks: Vec<Result<&[u8], String>> = vec![Err("connection reset".to_string())];
        let (inbox, _received) = mpsc::unbounded_channel();

        // when (操作):
        let result = forward_events(stream::iter(chunks), &inbox, &mut None).await;

        // then (期待する結果):
        assert_eq!(result, Err(SseError::Read("connection reset".to_string())));
    }

    #[tokio::test]
    async fn test_forward_events_stops_when_inbox_closed() {
        // テスト項目: 受信箱が閉じている場合は正常終了する
        // given (前提条件):
        let data = format!("event: delete-conversation\ndata: {}\n\n", CONVERSATION_ID);
        let chunks: Vec<Result<Vec<u8>, String>> = vec![Ok(data.into_bytes())];
        let (inbox, received) = mpsc::unbounded_channel();
        drop(received);

        // when (操作):
        let result = forward_events(stream::iter(chunks), &inbox, &mut None).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_forward_events_records_server_retry() {
        // テスト項目: サーバーが指定した retry の値が、ストリームが切れた後も再接続の待機時間として残る
        // given (前提条件):
        let chunks: Vec<Result<&[u8], String>> = vec![
            Ok(&b": keep-alive\nretry: 1500\n\n"[..]),
            Err("connection reset".to_string()),
        ];
        let (inbox, _received) = mpsc::unbounded_channel();
        let mut server_retry = None;

        // when (操作):
        let result = forward_events(stream::iter(chunks), &inbox, &mut server_retry).await;

        // then (期待する結果):
        assert_eq!(result, Err(SseError::Read("connection reset".to_string())));
        assert_eq!(server_retry, Some(Duration::from_millis(1500)));
        assert_eq!(
            reconnect_delay(RECONNECT_INTERVAL, server_retry),
            Duration::from_millis(1500)
        );
    }
}
