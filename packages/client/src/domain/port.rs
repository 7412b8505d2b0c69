//! Port trait 定義
//!
//! ドメイン層・UseCase 層が必要とする外部サービス（REST バックエンド、画面遷移）への
//! インターフェースを定義します。具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use wac_shared::dto::request::Pagination;

use crate::error::ApiError;

use super::{
    entity::{
        BaseUser, ConnectedUser, Conversation, ConversationToCreate, Message, MessageToSend,
        SearchQuery,
    },
    value_object::PublicId,
};

/// Conversation endpoints of the backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConversationApi: Send + Sync {
    /// ページ単位で会話一覧を取得
    async fn get_all(&self, pagination: Pagination) -> Result<Vec<Conversation>, ApiError>;

    /// 会話を 1 件取得
    async fn get_one(&self, conversation_id: PublicId) -> Result<Conversation, ApiError>;

    /// 会話を作成
    async fn create(&self, request: ConversationToCreate) -> Result<Conversation, ApiError>;

    /// 会話を削除
    async fn delete(&self, conversation_id: PublicId) -> Result<(), ApiError>;

    /// 会話内のメッセージを既読にする
    async fn mark_as_read(&self, conversation_id: PublicId) -> Result<(), ApiError>;
}

/// Message endpoints of the backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageApi: Send + Sync {
    async fn send(&self, message: MessageToSend) -> Result<Message, ApiError>;
}

/// User search endpoint of the backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserSearchApi: Send + Sync {
    async fn search(&self, query: SearchQuery) -> Result<Vec<BaseUser>, ApiError>;
}

/// Principal resolution and credential handling
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// 認証済みユーザーを取得
    async fn authenticated_user(&self) -> Result<ConnectedUser, ApiError>;

    fn has_credentials(&self) -> bool;

    fn set_credentials(&self, access_token: String);

    fn clear_credentials(&self);
}

/// 画面遷移（会話を開く）
#[cfg_attr(test, automock)]
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, conversation_id: PublicId);
}
