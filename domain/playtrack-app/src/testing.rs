use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::{
    domain::{
        GameTitle, PaginatedResponse, RepoCreateError, RepoError, RepoRetrieveError,
        RepoUpdateError, TopicId, Username,
        analytics::{
            Activity, ActivityRecord, AnalyticsError, AnalyticsRepository, GameScoreEntry,
            LeaderboardEntry, PlayerGameStats,
        },
        avatar::AvatarImage,
        credentials::{PasswordHashError, PasswordHasher},
        forum::{Comment, ForumRepository, Topic, TopicQuery, TopicSummary, TopicUpdate},
        game::{Game, GameRepository},
        player::{Player, PlayerRepository},
        rating::{LibraryEntry, RatingRepository, Score},
        social::{FollowEdge, SocialRepository},
    },
    ports::avatar_storage::{AvatarStorageError, AvatarStoragePort},
    services::projection::LeaderboardProjectionService,
};

#[derive(Default)]
struct GraphState {
    players: BTreeMap<Username, Player>,
    games: BTreeMap<GameTitle, Game>,
    library: BTreeMap<(Username, GameTitle), LibraryEntry>,
    favorites: BTreeSet<(Username, GameTitle)>,
    follows: BTreeSet<FollowEdge>,
    blocks: BTreeSet<(Username, Username)>,
    topics: Vec<Topic>,
    comments: Vec<Comment>,
}

/// Single store implementing every graph repository.
#[derive(Clone, Default)]
pub struct MockGraph {
    state: Arc<Mutex<GraphState>>,
}

#[allow(unused)]
impl MockGraph {
    pub fn add_player(&self, username: &str) {
        let player = Player {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: format!("hashed:{}", "secret1"),
            age: 18,
            created_at: Utc::now(),
            avatar: None,
        };
        self.state
            .lock()
            .unwrap()
            .players
            .insert(username.to_string(), player);
    }

    pub fn add_game(&self, title: &str) {
        self.state.lock().unwrap().games.insert(
            title.to_string(),
            Game {
                title: title.to_string(),
                genre: Some("Strategy".to_string()),
                release_year: None,
            },
        );
    }

    pub fn rate(&self, username: &str, title: &str, score: i64) {
        let now = Utc::now();
        self.state.lock().unwrap().library.insert(
            (username.to_string(), title.to_string()),
            LibraryEntry {
                username: username.to_string(),
                game_title: title.to_string(),
                score: Some(Score::new(score).unwrap()),
                rated_at: Some(now),
                added_at: now,
            },
        );
    }

    pub fn add_unscored(&self, username: &str, title: &str) {
        self.state.lock().unwrap().library.insert(
            (username.to_string(), title.to_string()),
            LibraryEntry {
                username: username.to_string(),
                game_title: title.to_string(),
                score: None,
                rated_at: None,
                added_at: Utc::now(),
            },
        );
    }

    pub fn add_follow(&self, from: &str, to: &str) {
        self.state
            .lock()
            .unwrap()
            .follows
            .insert(FollowEdge::new(from, to));
    }

    pub fn add_block(&self, from: &str, to: &str) {
        self.state
            .lock()
            .unwrap()
            .blocks
            .insert((from.to_string(), to.to_string()));
    }

    pub fn library_entries(&self, username: &str, title: &str) -> Vec<LibraryEntry> {
        self.state
            .lock()
            .unwrap()
            .library
            .values()
            .filter(|e| e.username == username && e.game_title == title)
            .cloned()
            .collect()
    }

    pub fn follow_count(&self, from: &str, to: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .follows
            .iter()
            .filter(|e| e.from == from && e.to == to)
            .count()
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().unwrap().players.len()
    }

    pub fn comment_count(&self) -> usize {
        self.state.lock().unwrap().comments.len()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait::async_trait]
impl PlayerRepository for MockGraph {
    async fn create_player(&self, player: Player) -> Result<(), RepoCreateError> {
        let mut state = self.state.lock().unwrap();
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
            .lock()
            .unwrap()
            .players
            .get(username)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_players(&self, usernames: &[Username]) -> Result<Vec<Player>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(usernames
            .iter()
            .filter_map(|u| state.players.get(u).cloned())
            .collect())
    }

    async fn list_players(&self) -> Result<Vec<Player>, RepoError> {
        Ok(self.state.lock().unwrap().players.values().cloned().collect())
    }

    async fn search_players(&self, query: &str, limit: usize) -> Result<Vec<Player>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .players
            .values()
            .filter(|p| contains_ci(&p.username, query) || contains_ci(&p.email, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: String,
    ) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let player = state
            .players
            .get_mut(username)
            .ok_or(RepoUpdateError::NotFound)?;
        player.password_hash = password_hash;
        Ok(())
    }

    async fn set_avatar(&self, username: &str, avatar_url: String) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let player = state
            .players
            .get_mut(username)
            .ok_or(RepoUpdateError::NotFound)?;
        player.avatar = Some(avatar_url);
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameRepository for MockGraph {
    async fn create_game(&self, game: Game) -> Result<(), RepoCreateError> {
        let mut state = self.state.lock().unwrap();
        if state.games.contains_key(&game.title) {
            return Err(RepoCreateError::Conflict("title".to_string()));
        }
        state.games.insert(game.title.clone(), game);
        Ok(())
    }

    async fn get_game(&self, title: &str) -> Result<Game, RepoRetrieveError> {
        self.state
            .lock()
            .unwrap()
            .games
            .get(title)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_games(&self, titles: &[GameTitle]) -> Result<Vec<Game>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(titles
            .iter()
            .filter_map(|t| state.games.get(t).cloned())
            .collect())
    }

    async fn list_games(&self) -> Result<Vec<Game>, RepoError> {
        Ok(self.state.lock().unwrap().games.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl RatingRepository for MockGraph {
    async fn add_to_library(
        &self,
        username: &str,
        game_title: &str,
        added_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        self.state
            .lock()
            .unwrap()
            .library
            .entry((username.to_string(), game_title.to_string()))
            .or_insert(LibraryEntry {
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
        let mut state = self.state.lock().unwrap();
        let entry = state
            .library
            .entry((username.to_string(), game_title.to_string()))
            .or_insert(LibraryEntry {
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
            .lock()
            .unwrap()
            .library
            .values()
            .filter(|e| e.username == username)
            .cloned()
            .collect())
    }

    async fn get_libraries(&self, usernames: &[Username]) -> Result<Vec<LibraryEntry>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .library
            .values()
            .filter(|e| usernames.contains(&e.username))
            .cloned()
            .collect())
    }

    async fn get_ratings_for_games(
        &self,
        game_titles: &[GameTitle],
    ) -> Result<Vec<LibraryEntry>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .library
            .values()
            .filter(|e| e.score.is_some() && game_titles.contains(&e.game_title))
            .cloned()
            .collect())
    }

    async fn players_with_game(
        &self,
        usernames: &[Username],
        game_title: &str,
    ) -> Result<Vec<Username>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .library
            .values()
            .filter(|e| e.game_title == game_title && usernames.contains(&e.username))
            .map(|e| e.username.clone())
            .collect())
    }

    async fn add_favorite(
        &self,
        username: &str,
        game_title: &str,
        _added_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        self.state
            .lock()
            .unwrap()
            .favorites
            .insert((username.to_string(), game_title.to_string()));
        Ok(())
    }

    async fn get_favorites(&self, username: &str) -> Result<Vec<GameTitle>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .favorites
            .iter()
            .filter(|(u, _)| u == username)
            .map(|(_, g)| g.clone())
            .collect())
    }

    async fn count_ratings(&self) -> Result<u64, RepoError> {
        Ok(self.state.lock().unwrap().library.len() as u64)
    }
}

#[async_trait::async_trait]
impl SocialRepository for MockGraph {
    async fn follow(&self, follower: &str, followee: &str) -> Result<(), RepoError> {
        self.add_follow(follower, followee);
        Ok(())
    }

    async fn unfollow(&self, follower: &str, followee: &str) -> Result<bool, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .follows
            .remove(&FollowEdge::new(follower, followee)))
    }

    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .follows
            .contains(&FollowEdge::new(follower, followee)))
    }

    async fn get_followees(&self, follower: &str) -> Result<Vec<Username>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .follows
            .iter()
            .filter(|e| e.from == follower)
            .map(|e| e.to.clone())
            .collect())
    }

    async fn get_outgoing_edges(&self, followers: &[Username]) -> Result<Vec<FollowEdge>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .follows
            .iter()
            .filter(|e| followers.contains(&e.from))
            .cloned()
            .collect())
    }

    async fn block(&self, blocker: &str, blocked: &str) -> Result<(), RepoError> {
        self.add_block(blocker, blocked);
        Ok(())
    }

    async fn get_blocked(&self, blocker: &str) -> Result<Vec<Username>, RepoError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .blocks
            .iter()
            .filter(|(from, _)| from == blocker)
            .map(|(_, to)| to.clone())
            .collect())
    }

    async fn count_follows(&self) -> Result<u64, RepoError> {
        Ok(self.state.lock().unwrap().follows.len() as u64)
    }
}

fn summarize(state: &GraphState, topic: &Topic) -> TopicSummary {
    TopicSummary {
        topic: topic.clone(),
        comment_count: state
            .comments
            .iter()
            .filter(|c| c.topic_id == topic.id)
            .count(),
    }
}

fn newest_first(state: &GraphState) -> Vec<TopicSummary> {
    let mut topics: Vec<TopicSummary> = state.topics.iter().map(|t| summarize(state, t)).collect();
    topics.sort_by(|a, b| b.topic.created_at.cmp(&a.topic.created_at));
    topics
}

#[async_trait::async_trait]
impl ForumRepository for MockGraph {
    async fn create_topic(&self, topic: Topic) -> Result<(), RepoError> {
        self.state.lock().unwrap().topics.push(topic);
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Topic, RepoRetrieveError> {
        self.state
            .lock()
            .unwrap()
            .topics
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn query_topics(
        &self,
        query: TopicQuery,
    ) -> Result<PaginatedResponse<TopicSummary>, RepoError> {
        let state = self.state.lock().unwrap();
        let topics: Vec<TopicSummary> = newest_first(&state)
            .into_iter()
            .filter(|t| match &query.category {
                Some(category) => t.topic.category == *category,
                None => true,
            })
            .collect();
        Ok(PaginatedResponse {
            total_count: topics.len(),
            items: query.pagination.apply(topics),
        })
    }

    async fn list_all_topics(&self) -> Result<Vec<TopicSummary>, RepoError> {
        Ok(newest_first(&self.state.lock().unwrap()))
    }

    async fn search_topics(&self, query: &str, limit: usize) -> Result<Vec<Topic>, RepoError> {
        Ok(newest_first(&self.state.lock().unwrap())
            .into_iter()
            .map(|t| t.topic)
            .filter(|t| contains_ci(&t.title, query) || contains_ci(&t.content, query))
            .take(limit)
            .collect())
    }

    async fn update_topic(
        &self,
        id: TopicId,
        update: TopicUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Topic, RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let topic = state
            .topics
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
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
        let mut state = self.state.lock().unwrap();
        let before = state.topics.len();
        state.topics.retain(|t| t.id != id);
        if state.topics.len() == before {
            return Err(RepoUpdateError::NotFound);
        }
        state.comments.retain(|c| c.topic_id != id);
        Ok(())
    }

    async fn create_comment(&self, comment: Comment) -> Result<(), RepoError> {
        self.state.lock().unwrap().comments.push(comment);
        Ok(())
    }

    async fn list_comments(&self, topic_id: TopicId) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .state
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|c| c.topic_id == topic_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn count_topics(&self) -> Result<u64, RepoError> {
        Ok(self.state.lock().unwrap().topics.len() as u64)
    }

    async fn count_comments(&self) -> Result<u64, RepoError> {
        Ok(self.state.lock().unwrap().comments.len() as u64)
    }
}

#[derive(Default)]
struct AnalyticsState {
    aggregates: BTreeMap<Username, LeaderboardEntry>,
    activity: Vec<ActivityRecord>,
    game_scores: BTreeMap<(GameTitle, Username), GameScoreEntry>,
    stats: BTreeMap<(Username, GameTitle), PlayerGameStats>,
}

pub struct MockAnalytics {
    ready: bool,
    writes: AtomicUsize,
    state: Mutex<AnalyticsState>,
}

#[allow(unused)]
impl MockAnalytics {
    pub fn ready() -> Self {
        Self {
            ready: true,
            writes: AtomicUsize::new(0),
            state: Mutex::new(AnalyticsState::default()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            ready: false,
            ..Self::ready()
        }
    }

    pub fn recorded_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), AnalyticsError> {
        if self.ready {
            Ok(())
        } else {
            Err(AnalyticsError::Unavailable)
        }
    }

    fn write(&self) -> Result<std::sync::MutexGuard<'_, AnalyticsState>, AnalyticsError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap())
    }
}

#[async_trait::async_trait]
impl AnalyticsRepository for MockAnalytics {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn upsert_player_aggregate(
        &self,
        username: &str,
        games_played: u32,
        average_rating: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AnalyticsError> {
        let mut state = self.write()?;
        let entry = state
            .aggregates
            .entry(username.to_string())
            .or_insert(LeaderboardEntry {
                username: username.to_string(),
                total_score: 0,
                games_played: 0,
                average_rating: 0.0,
                updated_at,
            });
        entry.games_played = games_played;
        entry.average_rating = average_rating;
        entry.updated_at = updated_at;
        Ok(())
    }

    async fn get_player_aggregate(
        &self,
        username: &str,
    ) -> Result<Option<LeaderboardEntry>, AnalyticsError> {
        self.check()?;
        Ok(self.state.lock().unwrap().aggregates.get(username).cloned())
    }

    async fn award_points(&self, record: ActivityRecord) -> Result<i64, AnalyticsError> {
        let mut state = self.write()?;
        let entry = state
            .aggregates
            .entry(record.username.clone())
            .or_insert(LeaderboardEntry {
                username: record.username.clone(),
                total_score: 0,
                games_played: 0,
                average_rating: 0.0,
                updated_at: record.recorded_at,
            });
        entry.total_score += record.points;
        let total = entry.total_score;
        state.activity.push(record);
        Ok(total)
    }

    async fn get_activity_log(&self, username: &str) -> Result<Vec<ActivityRecord>, AnalyticsError> {
        self.check()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .activity
            .iter()
            .filter(|a| a.username == username)
            .cloned()
            .collect())
    }

    async fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, AnalyticsError> {
        self.check()?;
        let mut entries: Vec<LeaderboardEntry> =
            self.state.lock().unwrap().aggregates.values().cloned().collect();
        entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn upsert_game_score(&self, entry: GameScoreEntry) -> Result<(), AnalyticsError> {
        let mut state = self.write()?;
        state
            .game_scores
            .insert((entry.game_title.clone(), entry.username.clone()), entry);
        Ok(())
    }

    async fn game_leaderboard(
        &self,
        game_title: &str,
        limit: usize,
    ) -> Result<Vec<GameScoreEntry>, AnalyticsError> {
        self.check()?;
        let mut entries: Vec<GameScoreEntry> = self
            .state
            .lock()
            .unwrap()
            .game_scores
            .values()
            .filter(|e| e.game_title == game_title)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn upsert_player_stats(&self, stats: PlayerGameStats) -> Result<(), AnalyticsError> {
        let mut state = self.write()?;
        state
            .stats
            .insert((stats.username.clone(), stats.game_title.clone()), stats);
        Ok(())
    }

    async fn get_player_stats(&self, username: &str) -> Result<Vec<PlayerGameStats>, AnalyticsError> {
        self.check()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .stats
            .values()
            .filter(|s| s.username == username)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionCall {
    PlayerChanged(Username),
    GameRated(Username, GameTitle, u8),
    Award(Username, Activity),
}

#[derive(Clone, Default)]
pub struct MockProjection {
    pub calls: Arc<Mutex<Vec<ProjectionCall>>>,
}

#[allow(unused)]
impl MockProjection {
    pub fn get_calls(&self) -> Vec<ProjectionCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ProjectionCall) -> JoinHandle<()> {
        self.calls.lock().unwrap().push(call);
        tokio::spawn(async {})
    }
}

impl LeaderboardProjectionService for MockProjection {
    fn player_changed(&self, username: &str) -> JoinHandle<()> {
        self.record(ProjectionCall::PlayerChanged(username.to_string()))
    }

    fn game_rated(&self, username: &str, game_title: &str, score: Score) -> JoinHandle<()> {
        self.record(ProjectionCall::GameRated(
            username.to_string(),
            game_title.to_string(),
            score.value(),
        ))
    }

    fn award(&self, username: &str, activity: Activity) -> JoinHandle<()> {
        self.record(ProjectionCall::Award(username.to_string(), activity))
    }
}

/// Plain-text "hashing" so tests stay fast.
pub struct MockHasher;

impl PasswordHasher for MockHasher {
    fn hash_password(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("hashed:{}", password))
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        password_hash == format!("hashed:{}", password)
    }
}

#[derive(Clone, Default)]
pub struct MockAvatarStorage {
    pub stored: Arc<Mutex<Vec<AvatarImage>>>,
}

#[async_trait::async_trait]
impl AvatarStoragePort for MockAvatarStorage {
    async fn store_avatar(&self, image: AvatarImage) -> Result<String, AvatarStorageError> {
        let mut stored = self.stored.lock().unwrap();
        stored.push(image.clone());
        Ok(format!("/uploads/avatar-{}.{}", stored.len(), image.extension))
    }
}
