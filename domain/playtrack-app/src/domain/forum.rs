use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{
    CommentId, PaginatedResponse, Pagination, RepoError, RepoRetrieveError, RepoUpdateError,
    TopicId, Username,
};

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Clone, Debug, PartialEq)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: Username,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TopicSummary {
    pub topic: Topic,
    pub comment_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub topic_id: TopicId,
    pub content: String,
    pub author: Username,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default)]
pub struct TopicUpdate {
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TopicQuery {
    /// `None` lists every category.
    pub category: Option<String>,
    pub pagination: Pagination,
}

#[async_trait::async_trait]
pub trait ForumRepository {
    async fn create_topic(&self, topic: Topic) -> Result<(), RepoError>;
    async fn get_topic(&self, id: TopicId) -> Result<Topic, RepoRetrieveError>;
    /// Newest first.
    async fn query_topics(
        &self,
        query: TopicQuery,
    ) -> Result<PaginatedResponse<TopicSummary>, RepoError>;
    /// Every topic, newest first.
    async fn list_all_topics(&self) -> Result<Vec<TopicSummary>, RepoError>;
    /// Case-insensitive substring match on title or content, newest first.
    async fn search_topics(&self, query: &str, limit: usize) -> Result<Vec<Topic>, RepoError>;
    async fn update_topic(
        &self,
        id: TopicId,
        update: TopicUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Topic, RepoUpdateError>;
    /// Removes the topic together with its comments.
    async fn delete_topic(&self, id: TopicId) -> Result<(), RepoUpdateError>;
    async fn create_comment(&self, comment: Comment) -> Result<(), RepoError>;
    /// Oldest first.
    async fn list_comments(&self, topic_id: TopicId) -> Result<Vec<Comment>, RepoError>;
    async fn count_topics(&self) -> Result<u64, RepoError>;
    async fn count_comments(&self) -> Result<u64, RepoError>;
}

const KEYWORD_ALIASES: &[(&str, &[&str])] = &[
    ("counter strike", &["cs2", "counter-strike", "counterstrike"]),
    ("league of legends", &["lol", "league"]),
    ("dota", &["dota2", "dota 2"]),
    ("call of duty", &["cod", "warzone"]),
    ("resident evil", &["re4", "re"]),
];

pub const GAME_MATCH_SCORE: u32 = 2;
pub const FOLLOWED_AUTHOR_SCORE: u32 = 1;

/// Lower-cased search keywords derived from the titles in a player's library.
pub fn game_keywords<'a>(titles: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut keywords = Vec::new();
    for title in titles {
        let lower = title.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        keywords.push(lower.clone());
        keywords.push(words.concat());
        keywords.push(words.join("-"));
        for (needle, aliases) in KEYWORD_ALIASES {
            if lower.contains(needle) {
                keywords.extend(aliases.iter().map(|a| a.to_string()));
            }
        }
    }
    keywords.retain(|k| !k.is_empty());
    keywords.sort();
    keywords.dedup();
    keywords
}

pub fn topic_relevance(topic: &Topic, keywords: &[String], followees: &HashSet<Username>) -> u32 {
    let text = format!("{} {}", topic.title, topic.content).to_lowercase();
    let mut score = 0;
    if keywords.iter().any(|k| text.contains(k.as_str())) {
        score += GAME_MATCH_SCORE;
    }
    if followees.contains(&topic.author) {
        score += FOLLOWED_AUTHOR_SCORE;
    }
    score
}
