//! UseCase: 会話リストの同期
//!
//! ## 概要
//!
//! `ConversationSynchronizer` はローカルの会話リストを所有するアクターです。
//! 以下の入力を 1 つずつ順番に処理します（単一の論理スレッド）：
//!
//! - セッションの状態遷移（初回ロードのトリガー、ログアウト時のリセット）
//! - ユーザー操作（選択、作成または既存会話を開く、削除、送信）
//! - サーバープッシュ（新着メッセージ、会話削除、既読通知）
//! - REST 応答（`ConversationService` が受信箱に投函する）
//!
//! 入力を処理するたびに、表示用のスナップショット（`ConversationsView`）を
//! `watch` チャンネルに公開します。

use std::collections::HashSet;

use tokio::sync::{mpsc, watch};
use wac_shared::dto::request::Pagination;

use crate::domain::{
    ConnectedUser, Conversation, ConversationList, ConversationViewed, Message, MessageToSend,
    NewMessageOutcome, PublicId, PushEvent, SessionState, State,
};

use super::{conversation::ConversationService, toast::ToastService};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Everything the synchronizer reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SyncInput {
    SessionChanged(SessionState),

    // user actions
    Select(PublicId),
    CreateOrLoad(PublicId),
    Delete(PublicId),
    Send(MessageToSend),

    Push(PushEvent),

    // request outcomes, tagged with the session generation they were requested in
    AllLoaded {
        generation: u64,
        state: State<Vec<Conversation>>,
    },
    OneLoaded {
        generation: u64,
        state: State<Conversation>,
    },
    Created {
        generation: u64,
        peer: PublicId,
        state: State<Conversation>,
    },
    Deleted {
        generation: u64,
        conversation_id: PublicId,
        state: State<()>,
    },
    Sent {
        generation: u64,
        state: State<Message>,
    },
}

/// Read-only snapshot published after every input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationsView {
    /// Conversations in display order
    pub conversations: Vec<Conversation>,
    pub selected: Option<PublicId>,
    pub connected_user: Option<ConnectedUser>,
    /// The initial page is being fetched
    pub loading: bool,
}

impl ConversationsView {
    pub fn selected_conversation(&self) -> Option<&Conversation> {
        let selected = self.selected?;
        self.conversations
            .iter()
            .find(|conversation| conversation.public_id == selected)
    }
}

pub struct ConversationSynchronizer {
    list: ConversationList,
    service: ConversationService,
    toasts: ToastService,
    connected_user: Option<ConnectedUser>,
    /// Bumped on every identity change; outcomes requested under an older value are ignored
    generation: u64,
    /// Peers with a create request in flight
    pending_creates: HashSet<PublicId>,
    loading: bool,
    page_size: u32,
    view: watch::Sender<ConversationsView>,
}

impl ConversationSynchronizer {
    pub fn new(
        service: ConversationService,
        toasts: ToastService,
        page_size: u32,
    ) -> (Self, watch::Receiver<ConversationsView>) {
        let (view, view_receiver) = watch::channel(ConversationsView::default());
        let synchronizer = Self {
            list: ConversationList::new(),
            service,
            toasts,
            connected_user: None,
            generation: 0,
            pending_creates: HashSet::new(),
            loading: false,
            page_size,
            view,
        };
        (synchronizer, view_receiver)
    }

    pub fn list(&self) -> &ConversationList {
        &self.list
    }

    /// Process inputs until every sender of the inbox is dropped
    pub async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<SyncInput>) {
        while let Some(input) = inbox.recv().await {
            self.handle(input).await;
        }
        tracing::info!("Conversation synchronizer stopped");
    }

    pub async fn handle(&mut self, input: SyncInput) {
        match input {
            SyncInput::SessionChanged(state) => self.on_session_changed(state),
            SyncInput::Select(conversation_id) => self.on_select(conversation_id),
            SyncInput::CreateOrLoad(peer) => self.on_create_or_load(peer),
            SyncInput::Delete(conversation_id) => {
                self.service.handle_delete(conversation_id, self.generation)
            }
            SyncInput::Send(message) => self.service.handle_send(message, self.generation),
            SyncInput::Push(PushEvent::NewMessage(message)) => self.on_new_message(message).await,
            SyncInput::Push(PushEvent::ConversationDeleted(conversation_id)) => {
                self.on_conversation_deleted(conversation_id).await
            }
            SyncInput::Push(PushEvent::MessagesViewed(viewed)) => self.on_messages_viewed(&viewed),
            SyncInput::AllLoaded { generation, state } => {
                if !self.is_stale(generation) {
                    self.on_all_loaded(state).await
                }
            }
            SyncInput::OneLoaded { generation, state } => {
                if !self.is_stale(generation) {
                    self.on_one_loaded(state).await
                }
            }
            SyncInput::Created {
                generation,
                peer,
                state,
            } => {
                if !self.is_stale(generation) {
                    self.on_created(peer, state).await
                }
            }
            SyncInput::Deleted {
                generation,
                conversation_id,
                state,
            } => {
                if !self.is_stale(generation) {
                    self.on_deleted(conversation_id, state).await
                }
            }
            SyncInput::Sent { generation, state } => {
                if !self.is_stale(generation) {
                    self.on_sent(state).await
                }
            }
        }

        self.publish();
    }

    fn publish(&self) {
        self.view.send_replace(ConversationsView {
            conversations: self.list.as_slice().to_vec(),
            selected: self.list.selected_id(),
            connected_user: self.connected_user.clone(),
            loading: self.loading,
        });
    }

    fn is_stale(&self, generation: u64) -> bool {
        let stale = generation != self.generation;
        if stale {
            tracing::debug!(
                "Discarding outcome requested in a previous session ({} != {})",
                generation,
                self.generation
            );
        }
        stale
    }

    fn connected_user_id(&self) -> Option<PublicId> {
        self.connected_user.as_ref().map(|user| user.public_id)
    }

    fn reset(&mut self) {
        self.list.clear();
        self.pending_creates.clear();
        self.loading = false;
        self.generation += 1;
    }

    fn on_session_changed(&mut self, state: SessionState) {
        match state {
            SessionState::Authenticated(user) => {
                if self.connected_user_id() == Some(user.public_id) {
                    return;
                }
                if let Some(previous) = &self.connected_user {
                    tracing::info!(
                        "Identity changed from '{}' to '{}', clearing conversations",
                        previous.email,
                        user.email
                    );
                    self.reset();
                } else {
                    self.generation += 1;
                }

                tracing::info!("Loading conversations for '{}'", user.email);
                self.connected_user = Some(user);
                self.service
                    .handle_get_all(Pagination::first_page(self.page_size), self.generation);
            }
            SessionState::Anonymous | SessionState::Unresolved => {
                if self.connected_user.take().is_some() {
                    tracing::info!("Session ended, clearing conversations");
                    self.reset();
                }
            }
        }
    }

    fn on_select(&mut self, conversation_id: PublicId) {
        if self.list.select(&conversation_id).is_none() {
            tracing::warn!("Cannot select unknown conversation '{}'", conversation_id);
            return;
        }
        self.service.handle_mark_as_read(conversation_id);
        self.service.navigate_to(conversation_id);
    }

    fn on_create_or_load(&mut self, peer: PublicId) {
        if let Some(existing) = self.list.find_by_member(&peer) {
            let conversation_id = existing.public_id;
            self.list.select(&conversation_id);
            self.service.handle_mark_as_read(conversation_id);
            self.service.navigate_to(conversation_id);
            return;
        }

        if !self.pending_creates.insert(peer) {
            tracing::debug!(
                "Conversation with '{}' is already being created, ignoring",
                peer
            );
            return;
        }
        self.service.handle_create(peer, self.generation);
    }

    async fn on_new_message(&mut self, message: Message) {
        match self.list.apply_new_message(message) {
            NewMessageOutcome::Appended {
                sender_id, sender, ..
            } => {
                if self.connected_user_id() != Some(sender_id) {
                    let sender_name = sender
                        .map(|user| format!("{} {}", user.first_name, user.last_name))
                        .unwrap_or_else(|| sender_id.to_string());
                    self.toasts
                        .success(format!("New message received from {}", sender_name))
                        .await;
                }
            }
            NewMessageOutcome::UnknownConversation(conversation_id) => {
                tracing::debug!(
                    "Message for unknown conversation '{}', fetching it",
                    conversation_id
                );
                self.service.handle_get_one(conversation_id, self.generation);
            }
        }
    }

    async fn on_conversation_deleted(&mut self, conversation_id: PublicId) {
        if self.list.remove(&conversation_id).is_some() {
            self.toasts.success("Conversation deleted by the user").await;
        } else {
            tracing::debug!(
                "Deleted conversation '{}' is not in the list",
                conversation_id
            );
        }
    }

    fn on_messages_viewed(&mut self, viewed: &ConversationViewed) {
        let updated = self.list.mark_viewed(viewed);
        tracing::debug!(
            "{} message(s) marked as read in conversation '{}'",
            updated,
            viewed.conversation_id
        );
    }

    async fn on_all_loaded(&mut self, state: State<Vec<Conversation>>) {
        match state {
            State::Loading => self.loading = true,
            State::Success(conversations) => {
                self.loading = false;
                tracing::info!("Loaded {} conversation(s)", conversations.len());
                self.list.replace_all(conversations);
            }
            State::Failure(e) => {
                self.loading = false;
                tracing::warn!("Failed to load conversations: {}", e);
                self.toasts
                    .danger("Error occurred when fetching conversations")
                    .await;
            }
        }
    }

    async fn on_one_loaded(&mut self, state: State<Conversation>) {
        match state {
            State::Loading => {}
            State::Success(conversation) => {
                self.list.upsert(conversation);
            }
            State::Failure(e) => {
                tracing::warn!("Failed to load conversation: {}", e);
                self.toasts
                    .danger("Error occurred when fetching conversation")
                    .await;
            }
        }
    }

    async fn on_created(&mut self, peer: PublicId, state: State<Conversation>) {
        match state {
            State::Loading => {}
            State::Success(conversation) => {
                self.pending_creates.remove(&peer);
                let conversation_id = conversation.public_id;
                self.list.upsert(conversation);
                self.list.select(&conversation_id);
                self.service.navigate_to(conversation_id);
            }
            State::Failure(e) => {
                self.pending_creates.remove(&peer);
                tracing::warn!("Failed to create conversation with '{}': {}", peer, e);
                self.toasts
                    .danger("Error occurred when creating conversation")
                    .await;
            }
        }
    }

    async fn on_deleted(&mut self, conversation_id: PublicId, state: State<()>) {
        match state {
            State::Loading => {}
            State::Success(()) => {
                if self.list.remove(&conversation_id).is_some() {
                    self.toasts.success("Conversation deleted").await;
                }
            }
            State::Failure(e) => {
                tracing::warn!("Failed to delete conversation '{}': {}", conversation_id, e);
                self.toasts
                    .danger("Error occurred when deleting conversation")
                    .await;
            }
        }
    }

    async fn on_sent(&mut self, state: State<Message>) {
        match state {
            State::Loading => {}
            State::Success(message) => self.on_new_message(message).await,
            State::Failure(e) => {
                tracing::warn!("Failed to send message: {}", e);
                self.toasts.danger("Error occurred when sending message").await;
            }
        }
    }
}

/// Forward every session transition to the synchronizer inbox.
///
/// The current state is forwarded first, so a session resolved before this
/// task started is not missed.
pub async fn forward_session_changes(
    mut session: watch::Receiver<SessionState>,
    inbox: mpsc::UnboundedSender<SyncInput>,
) {
    loop {
        let state = session.borrow_and_update().clone();
        if inbox.send(SyncInput::SessionChanged(state)).is_err() {
            break;
        }
        if session.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        domain::{
            BaseUser, MessageSendState, MessageType, ToastKind,
            port::{MockConversationApi, MockMessageApi, MockNavigator},
        },
        error::ApiError,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 3 経路（REST 応答、ユーザー操作、プッシュ）の入力に対する会話リストの更新
    // - トースト通知と画面遷移の副作用
    // - セッション遷移による初回ロードとリセット
    //
    // 【どのようなシナリオをテストするか】
    // 1. 認証後に 1 回だけ初回ロードが行われる
    // 2. 未知の会話への新着メッセージで 1 回だけ会話取得が行われる
    // 3. 他人からの新着メッセージで通知され、自分のメッセージでは通知されない
    // 4. 既存会話があれば作成せずに開き、なければ作成する（重複リクエストはまとめる）
    // 5. 削除プッシュ、既読プッシュ、ログアウト時のリセット
    // ========================================

    struct Harness {
        synchronizer: ConversationSynchronizer,
        view: watch::Receiver<ConversationsView>,
        inbox: mpsc::UnboundedReceiver<SyncInput>,
        toasts: ToastService,
    }

    impl Harness {
        fn new(
            conversation_api: MockConversationApi,
            message_api: MockMessageApi,
            navigator: MockNavigator,
        ) -> Self {
            let (sender, inbox) = mpsc::unbounded_channel();
            let service = ConversationService::new(
                Arc::new(conversation_api),
                Arc::new(message_api),
                Arc::new(navigator),
                sender,
            );
            let toasts = ToastService::new();
            let (synchronizer, view) =
                ConversationSynchronizer::new(service, toasts.clone(), DEFAULT_PAGE_SIZE);
            Self {
                synchronizer,
                view,
                inbox,
                toasts,
            }
        }

        /// Feed the next outcome posted by a spawned request back into the synchronizer
        async fn pump_one(&mut self) -> SyncInput {
            let input = tokio::time::timeout(std::time::Duration::from_secs(1), self.inbox.recv())
                .await
                .expect("no request outcome posted")
                .expect("inbox closed");
            self.synchronizer.handle(input.clone()).await;
            input
        }

        async fn toast_bodies(&self) -> Vec<(ToastKind, String)> {
            self.toasts
                .toasts()
                .await
                .into_iter()
                .map(|toast| (toast.kind, toast.body))
                .collect()
        }
    }

    fn user(first: &str) -> BaseUser {
        BaseUser {
            public_id: PublicId::generate(),
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            image_url: None,
            last_seen: None,
        }
    }

    fn connected(user: &BaseUser) -> ConnectedUser {
        ConnectedUser {
            public_id: user.public_id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            image_url: None,
            authorities: vec![],
        }
    }

    fn conversation(members: Vec<BaseUser>) -> Conversation {
        Conversation {
            public_id: PublicId::generate(),
            name: "Default".to_string(),
            members,
            messages: vec![],
            active: false,
        }
    }

    fn message(conversation_id: PublicId, sender_id: PublicId, seconds: i64) -> Message {
        Message {
            public_id: PublicId::generate(),
            conversation_id,
            sender_id,
            text_content: "hello".to_string(),
            send_date: Utc.timestamp_opt(seconds, 0).unwrap(),
            state: MessageSendState::Sent,
            message_type: MessageType::Text,
        }
    }

    /// Authenticate `me` and load `conversations` as the first page
    async fn bootstrap(me: &BaseUser, conversations: Vec<Conversation>) -> Harness {
        let mut api = MockConversationApi::new();
        api.expect_get_all()
            .withf(|pagination| pagination.page == 0 && pagination.size == DEFAULT_PAGE_SIZE)
            .times(1)
            .returning(move |_| Ok(conversations.clone()));
        bootstrap_with(me, api, MockNavigator::new()).await
    }

    async fn bootstrap_with(
        me: &BaseUser,
        api: MockConversationApi,
        navigator: MockNavigator,
    ) -> Harness {
        let mut harness = Harness::new(api, MockMessageApi::new(), navigator);
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Authenticated(
                connected(me),
            )))
            .await;
        // Loading marker, then the response
        harness.pump_one().await;
        harness.pump_one().await;
        harness
    }

    #[tokio::test]
    async fn test_bootstrap_loads_first_page_once() {
        // テスト項目: 認証後に初回ロードが 1 回だけ行われ、同じユーザーの再通知では行われない
        // given (前提条件):
        let me = user("Me");
        let c1 = conversation(vec![user("Alice")]);
        let mut harness = bootstrap(&me, vec![c1.clone()]).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Authenticated(
                connected(&me),
            )))
            .await;

        // then (期待する結果):
        assert!(harness.inbox.try_recv().is_err());
        let view = harness.view.borrow().clone();
        assert_eq!(view.conversations, vec![c1]);
        assert!(!view.loading);
        assert_eq!(view.connected_user, Some(connected(&me)));
    }

    #[tokio::test]
    async fn test_bootstrap_failure_shows_error_toast() {
        // テスト項目: 初回ロードに失敗した場合はエラーのトーストが表示される
        // given (前提条件):
        let me = user("Me");
        let mut api = MockConversationApi::new();
        api.expect_get_all()
            .times(1)
            .returning(|_| Err(ApiError::Transport("connection refused".to_string())));

        // when (操作):
        let harness = bootstrap_with(&me, api, MockNavigator::new()).await;

        // then (期待する結果):
        assert_eq!(
            harness.toast_bodies().await,
            vec![(
                ToastKind::Danger,
                "Error occurred when fetching conversations".to_string()
            )]
        );
        assert!(harness.synchronizer.list().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_session_does_not_bootstrap() {
        // テスト項目: 匿名セッションでは初回ロードが行われない
        // given (前提条件):
        let mut api = MockConversationApi::new();
        api.expect_get_all().never();
        let mut harness = Harness::new(api, MockMessageApi::new(), MockNavigator::new());

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Anonymous))
            .await;

        // then (期待する結果):
        assert!(harness.inbox.try_recv().is_err());
        assert!(harness.view.borrow().connected_user.is_none());
    }

    #[tokio::test]
    async fn test_new_message_for_unknown_conversation_fetches_it_once() {
        // テスト項目: 未知の会話への新着メッセージで会話取得が 1 回だけ行われ、既存の会話は変更されない
        // given (前提条件):
        let me = user("Me");
        let alice = user("Alice");
        let known = conversation(vec![me.clone(), alice.clone()]);
        let mut unknown = conversation(vec![me.clone(), user("Bob")]);
        let incoming = message(unknown.public_id, unknown.members[1].public_id, 50);
        unknown.messages.push(incoming.clone());

        let known_for_mock = known.clone();
        let unknown_for_mock = unknown.clone();
        let unknown_id = unknown.public_id;
        let mut api = MockConversationApi::new();
        api.expect_get_all()
            .times(1)
            .returning(move |_| Ok(vec![known_for_mock.clone()]));
        api.expect_get_one()
            .withf(move |id| *id == unknown_id)
            .times(1)
            .returning(move |_| Ok(unknown_for_mock.clone()));
        let mut harness = bootstrap_with(&me, api, MockNavigator::new()).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::Push(PushEvent::NewMessage(incoming)))
            .await;

        // then (期待する結果):
        assert_eq!(harness.synchronizer.list().as_slice(), &[known.clone()]);
        let fetched = harness.pump_one().await;
        assert!(matches!(
            fetched,
            SyncInput::OneLoaded {
                state: State::Success(_),
                ..
            }
        ));
        assert_eq!(harness.synchronizer.list().len(), 2);
        assert_eq!(
            harness.synchronizer.list().as_slice()[0].public_id,
            unknown.public_id
        );
    }

    #[tokio::test]
    async fn test_new_message_from_peer_notifies() {
        // テスト項目: 他のメンバーからの新着メッセージで送信者名入りの通知が表示される
        // given (前提条件):
        let me = user("Me");
        let alice = user("Alice");
        let c1 = conversation(vec![me.clone(), alice.clone()]);
        let mut harness = bootstrap(&me, vec![c1.clone()]).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::Push(PushEvent::NewMessage(message(
                c1.public_id,
                alice.public_id,
                10,
            ))))
            .await;

        // then (期待する結果):
        assert_eq!(
            harness.toast_bodies().await,
            vec![(
                ToastKind::Success,
                "New message received from Alice Tester".to_string()
            )]
        );
        assert_eq!(harness.view.borrow().conversations[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_own_message_does_not_notify() {
        // テスト項目: 自分が送ったメッセージでは通知されない
        // given (前提条件):
        let me = user("Me");
        let c1 = conversation(vec![me.clone(), user("Alice")]);
        let mut harness = bootstrap(&me, vec![c1.clone()]).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::Push(PushEvent::NewMessage(message(
                c1.public_id,
                me.public_id,
                10,
            ))))
            .await;

        // then (期待する結果):
        assert!(harness.toast_bodies().await.is_empty());
        assert_eq!(harness.synchronizer.list().as_slice()[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_create_or_load_opens_existing_conversation() {
        // テスト項目: 相手を含む会話が既にあれば作成せず、既読にしてその会話を開く
        // given (前提条件):
        let me = user("Me");
        let alice = user("Alice");
        let existing = conversation(vec![me.clone(), alice.clone()]);
        let existing_id = existing.public_id;
        let existing_for_mock = existing.clone();

        let mut api = MockConversationApi::new();
        api.expect_get_all()
            .returning(move |_| Ok(vec![existing_for_mock.clone()]));
        api.expect_create().never();
        let (read_tx, mut read_rx) = mpsc::unbounded_channel();
        api.expect_mark_as_read()
            .withf(move |id| *id == existing_id)
            .times(1)
            .returning(move |id| {
                let _ = read_tx.send(id);
                Ok(())
            });
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate_to()
            .withf(move |id| *id == existing_id)
            .times(1)
            .return_const(());
        let mut harness = bootstrap_with(&me, api, navigator).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::CreateOrLoad(alice.public_id))
            .await;

        // then (期待する結果):
        assert_eq!(read_rx.recv().await, Some(existing_id));
        assert_eq!(harness.view.borrow().selected, Some(existing_id));
    }

    #[tokio::test]
    async fn test_create_or_load_creates_missing_conversation_once() {
        // テスト項目: 会話がなければ 1 回だけ作成され、作成中の重複リクエストはまとめられる
        // given (前提条件):
        let me = user("Me");
        let bob = user("Bob");
        let created = conversation(vec![me.clone(), bob.clone()]);
        let created_id = created.public_id;
        let bob_id = bob.public_id;

        let mut api = MockConversationApi::new();
        api.expect_get_all().returning(|_| Ok(vec![]));
        api.expect_create()
            .withf(move |request| request.members == vec![bob_id] && request.name == "Default")
            .times(1)
            .returning(move |_| Ok(created.clone()));
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate_to()
            .withf(move |id| *id == created_id)
            .times(1)
            .return_const(());
        let mut harness = bootstrap_with(&me, api, navigator).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::CreateOrLoad(bob_id))
            .await;
        harness
            .synchronizer
            .handle(SyncInput::CreateOrLoad(bob_id))
            .await;
        let outcome = harness.pump_one().await;

        // then (期待する結果):
        assert!(matches!(outcome, SyncInput::Created { .. }));
        assert!(harness.inbox.try_recv().is_err());
        let view = harness.view.borrow().clone();
        assert_eq!(view.conversations.len(), 1);
        assert_eq!(view.selected, Some(created_id));
    }

    #[tokio::test]
    async fn test_create_failure_shows_error_toast() {
        // テスト項目: 会話作成に失敗した場合はエラーのトーストが表示される
        // given (前提条件):
        let me = user("Me");
        let mut api = MockConversationApi::new();
        api.expect_get_all().returning(|_| Ok(vec![]));
        api.expect_create().times(1).returning(|_| {
            Err(ApiError::Status {
                status: 500,
                body: String::new(),
            })
        });
        let mut harness = bootstrap_with(&me, api, MockNavigator::new()).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::CreateOrLoad(PublicId::generate()))
            .await;
        harness.pump_one().await;

        // then (期待する結果):
        assert_eq!(
            harness.toast_bodies().await,
            vec![(
                ToastKind::Danger,
                "Error occurred when creating conversation".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_pushed_delete_removes_one_entry() {
        // テスト項目: 削除プッシュで対象の会話のみが削除され、通知が表示される
        // given (前提条件):
        let me = user("Me");
        let c1 = conversation(vec![user("Alice")]);
        let c2 = conversation(vec![user("Bob")]);
        let c3 = conversation(vec![user("Carol")]);
        let mut harness = bootstrap(&me, vec![c1.clone(), c2.clone(), c3.clone()]).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::Push(PushEvent::ConversationDeleted(c2.public_id)))
            .await;
        harness
            .synchronizer
            .handle(SyncInput::Push(PushEvent::ConversationDeleted(
                PublicId::generate(),
            )))
            .await;

        // then (期待する結果):
        let remaining: Vec<PublicId> = harness
            .view
            .borrow()
            .conversations
            .iter()
            .map(|c| c.public_id)
            .collect();
        assert_eq!(remaining, vec![c1.public_id, c3.public_id]);
        assert_eq!(
            harness.toast_bodies().await,
            vec![(
                ToastKind::Success,
                "Conversation deleted by the user".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_local_delete_removes_after_success() {
        // テスト項目: ローカルの削除はバックエンドの成功後にリストから取り除かれる
        // given (前提条件):
        let me = user("Me");
        let c1 = conversation(vec![user("Alice")]);
        let c1_id = c1.public_id;
        let mut api = MockConversationApi::new();
        api.expect_get_all()
            .returning(move |_| Ok(vec![c1.clone()]));
        api.expect_delete()
            .withf(move |id| *id == c1_id)
            .times(1)
            .returning(|_| Ok(()));
        let mut harness = bootstrap_with(&me, api, MockNavigator::new()).await;

        // when (操作):
        harness.synchronizer.handle(SyncInput::Delete(c1_id)).await;
        assert_eq!(harness.synchronizer.list().len(), 1);
        harness.pump_one().await;

        // then (期待する結果):
        assert!(harness.synchronizer.list().is_empty());
    }

    #[tokio::test]
    async fn test_messages_viewed_only_for_selected_conversation() {
        // テスト項目: 既読通知は選択中の会話にのみ反映される
        // given (前提条件):
        let me = user("Me");
        let mut c1 = conversation(vec![me.clone(), user("Alice")]);
        c1.messages.push(message(c1.public_id, me.public_id, 20));
        let mut c2 = conversation(vec![me.clone(), user("Bob")]);
        c2.messages.push(message(c2.public_id, me.public_id, 10));
        let c1_id = c1.public_id;

        let (c1_mock, c2_mock) = (c1.clone(), c2.clone());
        let mut api = MockConversationApi::new();
        api.expect_get_all()
            .returning(move |_| Ok(vec![c1_mock.clone(), c2_mock.clone()]));
        api.expect_mark_as_read().returning(|_| Ok(()));
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate_to().return_const(());
        let mut harness = bootstrap_with(&me, api, navigator).await;
        harness.synchronizer.handle(SyncInput::Select(c1_id)).await;

        // when (操作):
        for viewed in [&c1, &c2] {
            harness
                .synchronizer
                .handle(SyncInput::Push(PushEvent::MessagesViewed(ConversationViewed {
                    conversation_id: viewed.public_id,
                    message_ids_viewed: vec![viewed.messages[0].public_id],
                })))
                .await;
        }

        // then (期待する結果):
        let list = harness.synchronizer.list();
        assert_eq!(
            list.get(&c1.public_id).unwrap().messages[0].state,
            MessageSendState::Read
        );
        assert_eq!(
            list.get(&c2.public_id).unwrap().messages[0].state,
            MessageSendState::Sent
        );
    }

    #[tokio::test]
    async fn test_logout_clears_state_and_discards_stale_load() {
        // テスト項目: ログアウトで会話がクリアされ、以前のセッションの読み込み結果は破棄される
        // given (前提条件):
        let me = user("Me");
        let c1 = conversation(vec![user("Alice")]);
        let mut harness = bootstrap(&me, vec![c1.clone()]).await;
        let stale_generation = harness.synchronizer.generation;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Anonymous))
            .await;
        harness
            .synchronizer
            .handle(SyncInput::AllLoaded {
                generation: stale_generation,
                state: State::Success(vec![c1]),
            })
            .await;

        // then (期待する結果):
        let view = harness.view.borrow().clone();
        assert!(view.conversations.is_empty());
        assert!(view.connected_user.is_none());
    }

    #[tokio::test]
    async fn test_identity_change_reloads_for_new_user() {
        // テスト項目: 別ユーザーへの切り替えで会話がクリアされ、新しいユーザーで再ロードされる
        // given (前提条件):
        let me = user("Me");
        let other = user("Other");
        let mine = conversation(vec![me.clone()]);
        let theirs = conversation(vec![other.clone()]);
        let (mine_mock, theirs_mock) = (mine.clone(), theirs.clone());
        let mut calls = 0;
        let mut api = MockConversationApi::new();
        api.expect_get_all().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(vec![mine_mock.clone()])
            } else {
                Ok(vec![theirs_mock.clone()])
            }
        });
        let mut harness = bootstrap_with(&me, api, MockNavigator::new()).await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Authenticated(
                connected(&other),
            )))
            .await;
        assert!(harness.synchronizer.list().is_empty());
        harness.pump_one().await;
        harness.pump_one().await;

        // then (期待する結果):
        assert_eq!(harness.synchronizer.list().as_slice(), &[theirs]);
    }

    #[tokio::test]
    async fn test_created_from_previous_identity_is_discarded() {
        // テスト項目: ユーザー切り替え前に依頼した会話作成の結果は、新しいユーザーの会話リストに追加されない
        // given (前提条件):
        let me = user("Me");
        let other = user("Other");
        let peer = user("Peer");
        let mut api = MockConversationApi::new();
        api.expect_get_all().times(2).returning(|_| Ok(vec![]));
        // navigate_to に期待値を設定しない（呼ばれると失敗する）
        let mut harness = bootstrap_with(&me, api, MockNavigator::new()).await;
        let previous_generation = harness.synchronizer.generation;
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Authenticated(
                connected(&other),
            )))
            .await;
        harness.pump_one().await;
        harness.pump_one().await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::Created {
                generation: previous_generation,
                peer: peer.public_id,
                state: State::Success(conversation(vec![me.clone(), peer.clone()])),
            })
            .await;

        // then (期待する結果):
        let view = harness.view.borrow().clone();
        assert_eq!(view.connected_user, Some(connected(&other)));
        assert!(view.conversations.is_empty());
        assert_eq!(view.selected, None);
    }

    #[tokio::test]
    async fn test_outcomes_from_previous_session_are_discarded_after_logout() {
        // テスト項目: ログアウト前に依頼した会話取得・送信・削除の結果は、ログアウト後に反映も通知もされない
        // given (前提条件):
        let me = user("Me");
        let c1 = conversation(vec![me.clone(), user("Alice")]);
        let mut harness = bootstrap(&me, vec![c1.clone()]).await;
        let previous_generation = harness.synchronizer.generation;
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Anonymous))
            .await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::OneLoaded {
                generation: previous_generation,
                state: State::Success(c1.clone()),
            })
            .await;
        harness
            .synchronizer
            .handle(SyncInput::Sent {
                generation: previous_generation,
                state: State::Success(message(c1.public_id, me.public_id, 30)),
            })
            .await;
        harness
            .synchronizer
            .handle(SyncInput::Deleted {
                generation: previous_generation,
                conversation_id: c1.public_id,
                state: State::Failure(ApiError::Unauthorized),
            })
            .await;

        // then (期待する結果):
        assert!(harness.synchronizer.list().is_empty());
        // 未知の会話として取得し直すこともない
        assert!(harness.inbox.try_recv().is_err());
        assert!(harness.toast_bodies().await.is_empty());
    }

    #[tokio::test]
    async fn test_sent_message_is_appended_without_notification() {
        // テスト項目: 送信したメッセージは会話に追加され、通知は表示されない
        // given (前提条件):
        let me = user("Me");
        let c1 = conversation(vec![me.clone(), user("Alice")]);
        let echoed = message(c1.public_id, me.public_id, 99);
        let (c1_mock, echoed_mock) = (c1.clone(), echoed.clone());
        let mut api = MockConversationApi::new();
        api.expect_get_all()
            .returning(move |_| Ok(vec![c1_mock.clone()]));
        let mut message_api = MockMessageApi::new();
        message_api
            .expect_send()
            .withf(|request| request.text_content == "hello")
            .times(1)
            .returning(move |_| Ok(echoed_mock.clone()));
        let mut harness = Harness::new(api, message_api, MockNavigator::new());
        harness
            .synchronizer
            .handle(SyncInput::SessionChanged(SessionState::Authenticated(
                connected(&me),
            )))
            .await;
        harness.pump_one().await;
        harness.pump_one().await;

        // when (操作):
        harness
            .synchronizer
            .handle(SyncInput::Send(MessageToSend::text(c1.public_id, "hello")))
            .await;
        harness.pump_one().await;

        // then (期待する結果):
        assert_eq!(
            harness.synchronizer.list().as_slice()[0].messages,
            vec![echoed]
        );
        assert!(harness.toast_bodies().await.is_empty());
    }

    #[tokio::test]
    async fn test_forward_session_changes_sends_current_state_first() {
        // テスト項目: セッション転送タスクは現在の状態を最初に送る
        // given (前提条件):
        let (session_tx, session_rx) = watch::channel(SessionState::Anonymous);
        let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(forward_session_changes(session_rx, inbox_tx));

        // when (操作):
        let first = inbox_rx.recv().await;
        drop(session_tx);
        task.await.unwrap();

        // then (期待する結果):
        assert_eq!(
            first,
            Some(SyncInput::SessionChanged(SessionState::Anonymous))
        );
    }
}
