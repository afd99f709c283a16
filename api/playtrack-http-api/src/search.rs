use axum::{
    Json,
    extract::State,
};
use playtrack_app::workflow::search::UserSearchHit;
use serde::{Deserialize, Serialize};

use crate::{AppState, ServiceError, extract::QueryParams, topics::JsonTopic};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonUserHit {
    username: String,
    email: String,
    avatar: Option<String>,
    friends_count: usize,
    games_count: usize,
}

impl From<UserSearchHit> for JsonUserHit {
    fn from(hit: UserSearchHit) -> Self {
        Self {
            username: hit.username,
            email: hit.email,
            avatar: hit.avatar,
            friends_count: hit.follows_count,
            games_count: hit.games_count,
        }
    }
}

#[derive(Serialize)]
pub struct JsonUserSearch {
    users: Vec<JsonUserHit>,
}

pub async fn search_users(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<JsonUserSearch>, ServiceError> {
    let hits = state.app.search_use_case.search_users(&query.q).await?;
    Ok(Json(JsonUserSearch {
        users: hits.into_iter().map(JsonUserHit::from).collect(),
    }))
}

#[derive(Serialize)]
pub struct JsonTopicSearch {
    topics: Vec<JsonTopic>,
}

pub async fn search_topics(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<JsonTopicSearch>, ServiceError> {
    let topics = state.app.search_use_case.search_topics(&query.q).await?;
    Ok(Json(JsonTopicSearch {
        topics: topics.into_iter().map(JsonTopic::from).collect(),
    }))
}
