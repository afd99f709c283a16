use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use playtrack_app::{
    domain::{
        Pagination, TopicId,
        forum::{Comment, Topic, TopicSummary, TopicUpdate},
    },
    workflow::forum::topics::NewTopic,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState, MessageResponse, PageQuery, ServiceError,
    extract::{JsonBody, QueryParams},
    jwt::Claims,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonTopic {
    id: String,
    title: String,
    content: String,
    category: String,
    author_username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_recommended: Option<bool>,
}

impl From<Topic> for JsonTopic {
    fn from(topic: Topic) -> Self {
        Self {
            id: topic.id.to_string(),
            title: topic.title,
            content: topic.content,
            category: topic.category,
            author_username: topic.author,
            created_at: topic.created_at,
            updated_at: topic.updated_at,
            comment_count: None,
            is_recommended: None,
        }
    }
}

impl From<TopicSummary> for JsonTopic {
    fn from(summary: TopicSummary) -> Self {
        Self {
            comment_count: Some(summary.comment_count),
            ..summary.topic.into()
        }
    }
}

impl JsonTopic {
    pub(crate) fn recommended(mut self, is_recommended: bool) -> Self {
        self.is_recommended = Some(is_recommended);
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonTopicPage {
    topics: Vec<JsonTopic>,
    total: usize,
    current_page: usize,
    total_pages: usize,
}

impl JsonTopicPage {
    pub(crate) fn new(topics: Vec<JsonTopic>, total: usize, query: &PageQuery) -> Self {
        Self {
            topics,
            total,
            current_page: query.page(),
            total_pages: query.total_pages(total),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonComment {
    id: String,
    topic_id: String,
    content: String,
    author_username: String,
    created_at: DateTime<Utc>,
}

impl From<Comment> for JsonComment {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            topic_id: comment.topic_id.to_string(),
            content: comment.content,
            author_username: comment.author,
            created_at: comment.created_at,
        }
    }
}

/// Ids that are not UUIDs cannot name an existing topic.
fn parse_topic_id(id: &str) -> Result<TopicId, ServiceError> {
    Uuid::parse_str(id)
        .map(TopicId)
        .map_err(|_| ServiceError::NotFound("Topic not found".to_string()))
}

#[derive(Deserialize)]
pub struct CategoryQuery {
    category: Option<String>,
}

pub async fn list_topics(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CategoryQuery>,
    QueryParams(page): QueryParams<PageQuery>,
) -> Result<Json<JsonTopicPage>, ServiceError> {
    let result = state
        .app
        .topic_use_case
        .list_topics(filter.category, Pagination::page(page.page(), page.limit()))
        .await?;
    let topics = result.items.into_iter().map(JsonTopic::from).collect();
    Ok(Json(JsonTopicPage::new(topics, result.total_count, &page)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonCreateTopicRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    category: Option<String>,
    #[serde(default)]
    author_username: String,
}

pub async fn create_topic(
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonCreateTopicRequest>,
) -> Result<(StatusCode, Json<JsonTopic>), ServiceError> {
    if !request.author_username.is_empty() {
        claims.ensure_subject(&request.author_username)?;
    }
    let topic = state
        .app
        .topic_use_case
        .create_topic(NewTopic {
            title: request.title,
            content: request.content,
            category: request.category,
            author: request.author_username,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(topic.into())))
}

pub async fn get_topic(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<JsonTopic>, ServiceError> {
    let topic = state
        .app
        .topic_use_case
        .get_topic(parse_topic_id(&id)?)
        .await?;
    Ok(Json(topic.into()))
}

#[derive(Deserialize)]
pub struct JsonUpdateTopicRequest {
    content: Option<String>,
    category: Option<String>,
    username: Option<String>,
}

pub async fn update_topic(
    Path(id): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonUpdateTopicRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let username = request.username.unwrap_or_else(|| claims.sub.clone());
    claims.ensure_subject(&username)?;
    state
        .app
        .topic_use_case
        .update_topic(
            parse_topic_id(&id)?,
            &username,
            TopicUpdate {
                content: request.content,
                category: request.category,
            },
        )
        .await?;
    Ok(MessageResponse::new("Topic updated successfully"))
}

#[derive(Deserialize)]
pub struct JsonDeleteTopicRequest {
    username: Option<String>,
}

pub async fn delete_topic(
    Path(id): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    request: Result<Option<Json<JsonDeleteTopicRequest>>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let username = request?
        .and_then(|Json(request)| request.username)
        .unwrap_or_else(|| claims.sub.clone());
    claims.ensure_subject(&username)?;
    state
        .app
        .topic_use_case
        .delete_topic(parse_topic_id(&id)?, &username)
        .await?;
    Ok(MessageResponse::new("Topic deleted"))
}

pub async fn list_comments(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonComment>>, ServiceError> {
    let comments = state
        .app
        .comment_use_case
        .list_comments(parse_topic_id(&id)?)
        .await?;
    Ok(Json(comments.into_iter().map(JsonComment::from).collect()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonCreateCommentRequest {
    #[serde(default)]
    content: String,
    #[serde(default)]
    author_username: String,
}

pub async fn create_comment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonCreateCommentRequest>,
) -> Result<(StatusCode, Json<JsonComment>), ServiceError> {
    if !request.author_username.is_empty() {
        claims.ensure_subject(&request.author_username)?;
    }
    let comment = state
        .app
        .comment_use_case
        .add_comment(
            parse_topic_id(&id)?,
            &request.author_username,
            &request.content,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}
