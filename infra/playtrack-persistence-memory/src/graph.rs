use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use playtrack_app::domain::{
    GameTitle, PaginatedResponse, RepoCreateError, RepoError, RepoRetrieveError,
    RepoUpdateError, TopicId, Username,
    forum::{Comment, ForumRepository, Topic, TopicQuery, TopicSummary, TopicUpdate},
    game::{Game, GameRepository},
    player::{Player, PlayerRepository},
    rating::{LibraryEntry, RatingRepository, Score},
    social::{FollowEdge, SocialRepository},
};

#[derive(Default)]
struct GraphState {
    players: BTreeMap<Username, Player>,
    games: BTreeMap<GameTitle, Game>,
    library: BTreeMap<(Username, GameTitle), LibraryEntry>,
    favorites: BTreeMap<(Username, GameTitle), DateTime<Utc>>,
    follows: BTreeMap<Username, BTreeSet<Username>>,
    blocks: BTreeMap<Username, BTreeSet<Username>>,
    topics: HashMap<TopicId, Topic>,
    comments: Vec<Comment>,
}

impl GraphState {
    fn summarize(&self, topic: &Topic) -> TopicSummary {
        TopicSummary {
            topic: topic.clone(),
            comment_count: self
                .comments
                .iter()
                .filter(|c| c.topic_id == topic.id)
                .count(),
        }
    }

    fn topics_newest_first(&self) -> Vec<&Topic> {
        let mut topics: Vec<&Topic> = self.topics.values().collect();
        topics.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        topics
    }
}

/// Graph store held in process memory. One instance serves every graph repository.
#[derive(Default)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[async_trait::async_trait]
impl PlayerRepository for InMemoryGraphStore {
    async fn create_player(&self, player: Player) -> Result<(), RepoCreateError> {
        let mut state = self.state.write();
        if state.players.contains_key(&player.username) {
            return Err(RepoCreateError::Conflict("username".to_string()));
        }
        if state.players.values().any(|p| p.email == player.email) {
            return Err(RepoCreateError::Conflict("email".to_string()));
        }
        state.players.insert(player.username.clone(), player);
        Ok(())
    }

    async fn get_player(&self, username: &str) -> Result<Player, RepoRetrieveError> {
        self.state
            .read()
            .players
            .get(username)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_players(&self, usernames: &[Username]) -> Result<Vec<Player>, RepoError> {
        let state = self.state.read();
        Ok(usernames
            .iter()
            .filter_map(|u| state.players.get(u).cloned())
            .collect())
    }

    async fn list_players(&self) -> Result<Vec<Player>, RepoError> {
        Ok(self.state.read().players.values().cloned().collect())
    }

    async fn search_players(&self, query: &str, limit: usize) -> Result<Vec<Player>, RepoError> {
        let needle = query.to_lowercase();
        Ok(self
            .state
            .read()
            .players
            .values()
            .filter(|p| contains_ci(&p.username, &needle) || contains_ci(&p.email, &needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: String,
    ) -> Result<(), RepoUpdateError> {
        let mut state = self.state.write();
        let player = state
            .players
            .get_mut(username)
            .ok_or(RepoUpdateError::NotFound)?;
        player.password_hash = password_hash;
        Ok(())
    }

    async fn set_avatar(&self, username: &str, avatar_url: String) -> Result<(), RepoUpdateError> {
        let mut state = self.state.write();
        let player = state
            .players
            .get_mut(username)
            .ok_or(RepoUpdateError::NotFound)?;
        player.avatar = Some(avatar_url);
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameRepository for InMemoryGraphStore {
    async fn create_game(&self, game: Game) -> Result<(), RepoCreateError> {
        let mut state = self.state.write();
        if state.games.contains_key(&game.title) {
            return Err(RepoCreateError::Conflict("title".to_string()));
        }
        state.games.insert(game.title.clone(), game);
        Ok(())
    }

    async fn get_game(&self, title: &str) -> Result<Game, RepoRetrieveError> {
        self.state
            .read()
            .games
            .get(title)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_games(&self, titles: &[GameTitle]) -> Result<Vec<Game>, RepoError> {
        let state = self.state.read();
        Ok(titles
            .iter()
            .filter_map(|t| state.games.get(t).cloned())
            .collect())
    }

    async fn list_games(&self) -> Result<Vec<Game>, RepoError> {
        Ok(self.state.read().games.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl RatingRepository for InMemoryGraphStore {
    async fn add_to_library(
        &self,
        username: &str,
        game_title: &str,
        added_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        self.state
            .write()
            .library
            .entry((username.to_string(), game_title.to_string()))
            .or_insert_with(|| LibraryEntry {
                username: username.to_string(),
                game_title: game_title.to_string(),
                score: None,
                rated_at: None,
                added_at,
            });
        Ok(())
    }

    async fn upsert_rating(
        &self,
        username: &str,
        game_title: &str,
        score: Score,
        rated_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut state = self.state.write();
        let entry = state
            .library
            .entry((username.to_string(), game_title.to_string()))
            .or_insert_with(|| LibraryEntry {
                username: username.to_string(),
                game_title: game_title.to_string(),
                score: None,
                rated_at: None,
                added_at: rated_at,
            });
        entry.score = Some(score);
        entry.rated_at = Some(rated_at);
        Ok(())
    }

    async fn get_library(&self, username: &str) -> Result<Vec<LibraryEntry>, RepoError> {
        Ok(self
            .state
            .read()
            .library
            .values()
            .filter(|e| e.username == username)
            .cloned()
            .collect())
    }

    async fn get_libraries(&self, usernames: &[Username]) -> Result<Vec<LibraryEntry>, RepoError> {
        let wanted: BTreeSet<&Username> = usernames.iter().collect();
        Ok(self
            .state
            .read()
            .library
            .values()
            .filter(|e| wanted.contains(&e.username))
            .cloned()
            .collect())
    }

    async fn get_ratings_for_games(
        &self,
        game_titles: &[GameTitle],
    ) -> Result<Vec<LibraryEntry>, RepoError> {
        let wanted: BTreeSet<&GameTitle> = game_titles.iter().collect();
        Ok(self
            .state
            .read()
            .library
            .values()
            .filter(|e| e.score.is_some() && wanted.contains(&e.game_title))
            .cloned()
            .collect())
    }

    async fn players_with_game(
        &self,
        usernames: &[Username],
        game_title: &str,
    ) -> Result<Vec<Username>, RepoError> {
        let state = self.state.read();
        Ok(usernames
            .iter()
            .filter(|u| {
                state
                    .library
                    .contains_key(&((*u).clone(), game_title.to_string()))
            })
            .cloned()
            .collect())
    }

    async fn add_favorite(
        &self,
        username: &str,
        game_title: &str,
        added_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        self.state
            .write()
            .favorites
            .insert((username.to_string(), game_title.to_string()), added_at);
        Ok(())
    }

    async fn get_favorites(&self, username: &str) -> Result<Vec<GameTitle>, RepoError> {
        Ok(self
            .state
            .read()
            .favorites
            .keys()
            .filter(|(u, _)| u == username)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn count_ratings(&self) -> Result<u64, RepoError> {
        Ok(self.state.read().library.len() as u64)
    }
}

#[async_trait::async_trait]
impl SocialRepository for InMemoryGraphStore {
    async fn follow(&self, follower: &str, followee: &str) -> Result<(), RepoError> {
        self.state
            .write()
            .follows
            .entry(follower.to_string())
            .or_default()
            .insert(followee.to_string());
        Ok(())
    }

    async fn unfollow(&self, follower: &str, followee: &str) -> Result<bool, RepoError> {
        let mut state = self.state.write();
        Ok(state
            .follows
            .get_mut(follower)
            .map(|followees| followees.remove(followee))
            .unwrap_or(false))
    }

    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, RepoError> {
        Ok(self
            .state
            .read()
            .follows
            .get(follower)
            .is_some_and(|followees| followees.contains(followee)))
    }

    async fn get_followees(&self, follower: &str) -> Result<Vec<Username>, RepoError> {
        Ok(self
            .state
            .read()
            .follows
            .get(follower)
            .map(|followees| followees.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_outgoing_edges(&self, followers: &[Username]) -> Result<Vec<FollowEdge>, RepoError> {
        let state = self.state.read();
        Ok(followers
            .iter()
            .filter_map(|from| state.follows.get(from).map(|to| (from, to)))
            .flat_map(|(from, followees)| {
                followees
                    .iter()
                    .map(move |to| FollowEdge::new(from.clone(), to.clone()))
            })
            .collect())
    }

    async fn block(&self, blocker: &str, blocked: &str) -> Result<(), RepoError> {
        self.state
            .write()
            .blocks
            .entry(blocker.to_string())
            .or_default()
            .insert(blocked.to_string());
        Ok(())
    }

    async fn get_blocked(&self, blocker: &str) -> Result<Vec<Username>, RepoError> {
        Ok(self
            .state
            .read()
            .blocks
            .get(blocker)
            .map(|blocked| blocked.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_follows(&self) -> Result<u64, RepoError> {
        Ok(self
            .state
            .read()
            .follows
            .values()
            .map(|followees| followees.len() as u64)
            .sum())
    }
}

#[async_trait::async_trait]
impl ForumRepository for InMemoryGraphStore {
    async fn create_topic(&self, topic: Topic) -> Result<(), RepoError> {
        self.state.write().topics.insert(topic.id, topic);
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Topic, RepoRetrieveError> {
        self.state
            .read()
            .topics
            .get(&id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn query_topics(
        &self,
        query: TopicQuery,
    ) -> Result<PaginatedResponse<TopicSummary>, RepoError> {
        let state = self.state.read();
        let matching: Vec<&Topic> = state
            .topics_newest_first()
            .into_iter()
            .filter(|t| query.category.as_ref().is_none_or(|c| &t.category == c))
            .collect();
        let total_count = matching.len();
        let items = query
            .pagination
            .apply(matching)
            .into_iter()
            .map(|t| state.summarize(t))
            .collect();
        Ok(PaginatedResponse { total_count, items })
    }

    async fn list_all_topics(&self) -> Result<Vec<TopicSummary>, RepoError> {
        let state = self.state.read();
        Ok(state
            .topics_newest_first()
            .into_iter()
            .map(|t| state.summarize(t))
            .collect())
    }

    async fn search_topics(&self, query: &str, limit: usize) -> Result<Vec<Topic>, RepoError> {
        let needle = query.to_lowercase();
        let state = self.state.read();
        Ok(state
            .topics_newest_first()
            .into_iter()
            .filter(|t| contains_ci(&t.title, &needle) || contains_ci(&t.content, &needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_topic(
        &self,
        id: TopicId,
        update: TopicUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Topic, RepoUpdateError> {
        let mut state = self.state.write();
        let topic = state.topics.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        if let Some(content) = update.content {
            topic.content = content;
        }
        if let Some(category) = update.category {
            topic.category = category;
        }
        topic.updated_at = updated_at;
        Ok(topic.clone())
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), RepoUpdateError> {
        let mut state = self.state.write();
        if state.topics.remove(&id).is_none() {
            return Err(RepoUpdateError::NotFound);
        }
        state.comments.retain(|c| c.topic_id != id);
        Ok(())
    }

    async fn create_comment(&self, comment: Comment) -> Result<(), RepoError> {
        self.state.write().comments.push(comment);
        Ok(())
    }

    async fn list_comments(&self, topic_id: TopicId) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .state
            .read()
            .comments
            .iter()
            .filter(|c| c.topic_id == topic_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn count_topics(&self) -> Result<u64, RepoError> {
        Ok(self.state.read().topics.len() as u64)
    }

    async fn count_comments(&self) -> Result<u64, RepoError> {
        Ok(self.state.read().comments.len() as u64)
    }
}
