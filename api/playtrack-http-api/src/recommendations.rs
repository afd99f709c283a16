use axum::{
    Json,
    extract::{Path, State},
};
use playtrack_app::{
    domain::{Pagination, recommendation::RecommendationKind},
    workflow::recommendation::games::GameRecommendation,
};
use serde::Serialize;

use crate::{
    AppState, PageQuery, ServiceError,
    extract::QueryParams,
    topics::{JsonTopic, JsonTopicPage},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRecommendation {
    title: String,
    genre: Option<String>,
    avg_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    friend_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    player_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similar_players: Option<usize>,
}

impl JsonRecommendation {
    fn new(recommendation: GameRecommendation, kind: RecommendationKind) -> Self {
        let supporters = Some(recommendation.supporters);
        let (friend_count, player_count, similar_players) = match kind {
            RecommendationKind::Friends => (supporters, None, None),
            RecommendationKind::Extended => (None, supporters, None),
            RecommendationKind::Similar => (None, None, supporters),
        };
        Self {
            title: recommendation.title,
            genre: recommendation.genre,
            avg_rating: recommendation.average_score,
            friend_count,
            player_count,
            similar_players,
        }
    }
}

async fn recommend(
    state: AppState,
    username: String,
    kind: RecommendationKind,
) -> Result<Json<Vec<JsonRecommendation>>, ServiceError> {
    let recommendations = state
        .app
        .game_recommendation_use_case
        .recommend(&username, kind)
        .await?;
    Ok(Json(
        recommendations
            .into_iter()
            .map(|r| JsonRecommendation::new(r, kind))
            .collect(),
    ))
}

pub async fn friends(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonRecommendation>>, ServiceError> {
    recommend(state, username, RecommendationKind::Friends).await
}

pub async fn extended(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonRecommendation>>, ServiceError> {
    recommend(state, username, RecommendationKind::Extended).await
}

pub async fn similar(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonRecommendation>>, ServiceError> {
    recommend(state, username, RecommendationKind::Similar).await
}

pub async fn topics(
    Path(username): Path<String>,
    State(state): State<AppState>,
    QueryParams(page): QueryParams<PageQuery>,
) -> Result<Json<JsonTopicPage>, ServiceError> {
    let result = state
        .app
        .topic_recommendation_use_case
        .recommend_topics(&username, Pagination::page(page.page(), page.limit()))
        .await?;
    let topics = result
        .items
        .into_iter()
        .map(|r| JsonTopic::from(r.summary).recommended(r.is_recommended))
        .collect();
    Ok(Json(JsonTopicPage::new(topics, result.total_count, &page)))
}
