//! UseCase: ユーザー検索（デバウンス付き）
//!
//! ## 処理の流れ
//!
//! 1. `search()` で受け取ったクエリを mpsc チャンネル経由でパイプラインに渡す
//! 2. 直前に受け付けたクエリ（保留中のもの、なければ実行中のもの）と同じクエリは無視する
//! 3. 一定時間（quiet period）新しいクエリが来なければリクエストを送信する
//! 4. 新しいリクエストを送信すると実行中のリクエストは破棄される（最新のみ有効）
//! 5. 結果を `State<Vec<BaseUser>>` として `watch` チャンネルに公開する

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use futures_util::future::OptionFuture;
use tokio::{
    sync::{mpsc, watch},
    time::{Instant, sleep_until},
};

use crate::{
    domain::{BaseUser, SearchQuery, State, UserSearchApi},
    error::ApiError,
};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Latest search outcome, `None` until the first request is dispatched
pub type SearchResults = watch::Receiver<Option<State<Vec<BaseUser>>>>;

type SearchFuture = Pin<Box<dyn Future<Output = Result<Vec<BaseUser>, ApiError>> + Send>>;

/// Handle on the running search pipeline
#[derive(Clone)]
pub struct UserSearchService {
    queries: mpsc::UnboundedSender<SearchQuery>,
    results: SearchResults,
}

impl UserSearchService {
    /// Spawn the pipeline task. It stops when every handle is dropped.
    pub fn spawn(api: Arc<dyn UserSearchApi>, quiet_period: Duration) -> Self {
        let (queries, query_receiver) = mpsc::unbounded_channel();
        let (results_sender, results) = watch::channel(None);
        tokio::spawn(run_pipeline(api, quiet_period, query_receiver, results_sender));
        Self { queries, results }
    }

    pub fn search(&self, query: SearchQuery) {
        if self.queries.send(query).is_err() {
            tracing::debug!("Search pipeline stopped, dropping query");
        }
    }

    pub fn subscribe(&self) -> SearchResults {
        self.results.clone()
    }
}

async fn run_pipeline(
    api: Arc<dyn UserSearchApi>,
    quiet_period: Duration,
    mut queries: mpsc::UnboundedReceiver<SearchQuery>,
    results: watch::Sender<Option<State<Vec<BaseUser>>>>,
) {
    let mut pending: Option<(SearchQuery, Instant)> = None;
    let mut in_flight: Option<(SearchQuery, SearchFuture)> = None;

    loop {
        let deadline = OptionFuture::from(pending.as_ref().map(|(_, at)| sleep_until(*at)));
        let response = OptionFuture::from(in_flight.as_mut().map(|(_, request)| request));

        tokio::select! {
            query = queries.recv() => {
                let Some(query) = query else {
                    break;
                };
                // Compare with the last accepted query only
                let is_duplicate = match (&pending, &in_flight) {
                    (Some((pending, _)), _) => *pending == query,
                    (None, Some((running, _))) => *running == query,
                    (None, None) => false,
                };
                if is_duplicate {
                    tracing::debug!("Ignoring duplicate search query '{}'", query.query);
                    continue;
                }
                pending = Some((query, Instant::now() + quiet_period));
            }
            Some(()) = deadline => {
                let Some((query, _)) = pending.take() else {
                    continue;
                };
                if in_flight.is_some() {
                    tracing::debug!("Cancelling previous search request");
                }
                tracing::debug!("Searching users with '{}'", query.query);
                results.send_replace(Some(State::Loading));

                let api = api.clone();
                let request = query.clone();
                in_flight = Some((query, Box::pin(async move { api.search(request).await })));
            }
            Some(result) = response => {
                in_flight = None;
                if let Err(e) = &result {
                    tracing::warn!("User search failed: {}", e);
                }
                results.send_replace(Some(State::from(result)));
            }
        }
    }

    tracing::debug!("Search pipeline stopped");
}
