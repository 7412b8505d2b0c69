//! reqwest-based implementation of the backend ports.

use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use url::Url;
use wac_shared::dto::{
    conversation::{ConversationDto, ConversationToCreateDto},
    message::{MessageDto, MessageToSendDto},
    request::Pagination,
    user::{BaseUserDto, ConnectedUserDto},
};

use crate::{
    domain::{
        AuthApi, BaseUser, ConnectedUser, Conversation, ConversationApi, ConversationToCreate,
        Message, MessageApi, MessageToSend, PublicId, SearchQuery, UserSearchApi,
    },
    error::{ApiError, SseError},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the backend REST API and event stream subscription.
///
/// Cloning is cheap and clones share the access token.
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    /// Separate client without a total timeout, for the long-lived event stream
    stream_http: reqwest::Client,
    api_url: Url,
    access_token: Arc<RwLock<Option<String>>>,
}

impl HttpApiClient {
    pub fn new(
        api_url: Url,
        timeout: Duration,
        access_token: Option<String>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let stream_http = reqwest::Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            http,
            stream_http,
            api_url,
            access_token: Arc::new(RwLock::new(access_token)),
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn request(
        &self,
        client: &reqwest::Client,
        method: Method,
        segments: &[&str],
    ) -> RequestBuilder {
        let builder = client.request(method, self.endpoint(segments));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send the request and map non-success statuses to errors
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Open the server-sent event stream of the current user
    pub async fn subscribe_events(&self) -> Result<Response, SseError> {
        let builder = self
            .request(&self.stream_http, Method::GET, &["sse", "subscribe"])
            .header(header::ACCEPT, "text/event-stream");

        match self.execute(builder).await {
            Ok(response) => Ok(response),
            Err(ApiError::Unauthorized) => Err(SseError::Unauthorized),
            Err(e) => Err(SseError::Connect(e)),
        }
    }
}

#[async_trait]
impl ConversationApi for HttpApiClient {
    async fn get_all(&self, pagination: Pagination) -> Result<Vec<Conversation>, ApiError> {
        let builder = self
            .request(&self.http, Method::GET, &["conversations"])
            .query(&pagination.to_query());
        let conversations: Vec<ConversationDto> = self.send_json(builder).await?;
        Ok(conversations.into_iter().map(Conversation::from).collect())
    }

    async fn get_one(&self, conversation_id: PublicId) -> Result<Conversation, ApiError> {
        let builder = self
            .request(
                &self.http,
                Method::GET,
                &["conversations", "get-one-by-public-id"],
            )
            .query(&[("conversationId", conversation_id.to_string())]);
        let conversation: ConversationDto = self.send_json(builder).await?;
        Ok(conversation.into())
    }

    async fn create(&self, request: ConversationToCreate) -> Result<Conversation, ApiError> {
        let body = ConversationToCreateDto::from(request);
        let builder = self
            .request(&self.http, Method::POST, &["conversations"])
            .json(&body);
        let conversation: ConversationDto = self.send_json(builder).await?;
        Ok(conversation.into())
    }

    async fn delete(&self, conversation_id: PublicId) -> Result<(), ApiError> {
        let builder = self
            .request(&self.http, Method::DELETE, &["conversations"])
            .query(&[("publicId", conversation_id.to_string())]);
        self.execute(builder).await?;
        Ok(())
    }

    async fn mark_as_read(&self, conversation_id: PublicId) -> Result<(), ApiError> {
        let builder = self
            .request(&self.http, Method::POST, &["conversations", "mark-as-read"])
            .query(&[("conversationId", conversation_id.to_string())]);
        self.execute(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageApi for HttpApiClient {
    async fn send(&self, message: MessageToSend) -> Result<Message, ApiError> {
        let body = MessageToSendDto::from(message);
        let builder = self
            .request(&self.http, Method::POST, &["messages", "send"])
            .json(&body);
        let message: MessageDto = self.send_json(builder).await?;
        Ok(message.into())
    }
}

#[async_trait]
impl UserSearchApi for HttpApiClient {
    async fn search(&self, query: SearchQuery) -> Result<Vec<BaseUser>, ApiError> {
        let mut params = vec![("query", query.query.clone())];
        params.extend(query.page.to_query());
        let builder = self
            .request(&self.http, Method::GET, &["users", "search"])
            .query(&params);
        let users: Vec<BaseUserDto> = self.send_json(builder).await?;
        Ok(users.into_iter().map(BaseUser::from).collect())
    }
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn authenticated_user(&self) -> Result<ConnectedUser, ApiError> {
        let builder = self.request(
            &self.http,
            Method::GET,
            &["users", "get-authenticated-user"],
        );
        let user: ConnectedUserDto = self.send_json(builder).await?;
        Ok(user.into())
    }

    fn has_credentials(&self) -> bool {
        self.token().is_some()
    }

    fn set_credentials(&self, access_token: String) {
        *self
            .access_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(access_token);
    }

    fn clear_credentials(&self) {
        *self
            .access_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
