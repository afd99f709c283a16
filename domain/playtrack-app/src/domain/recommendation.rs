use std::collections::{HashMap, HashSet};

use crate::domain::{GameTitle, Username, rating::LibraryEntry};

pub const RECOMMENDATION_LIMIT: usize = 10;
pub const MIN_RECOMMENDED_SCORE: u8 = 4;
pub const SIMILARITY_TOLERANCE: i32 = 1;
pub const MIN_COMMON_GAMES: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecommendationKind {
    /// Direct followees.
    Friends,
    /// Players one or two FOLLOWS hops away.
    Extended,
    /// Players whose scores on shared games are close to the origin's.
    Similar,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CandidateGame {
    pub title: GameTitle,
    pub average_score: f64,
    /// Distinct cohort members that scored the game at least [`MIN_RECOMMENDED_SCORE`].
    pub supporters: usize,
}

/// What the origin player has already touched and whom they block.
pub struct RecommendationExclusions {
    pub owned_games: HashSet<GameTitle>,
    pub blocked_players: HashSet<Username>,
}

impl RecommendationExclusions {
    pub fn new(own_library: &[LibraryEntry], blocked: Vec<Username>) -> Self {
        Self {
            owned_games: own_library.iter().map(|e| e.game_title.clone()).collect(),
            blocked_players: blocked.into_iter().collect(),
        }
    }
}

/// Ranks games by average cohort score, then cohort size, then title.
pub fn rank_candidate_games(
    origin: &str,
    cohort_ratings: &[LibraryEntry],
    exclusions: &RecommendationExclusions,
    limit: usize,
) -> Vec<CandidateGame> {
    let mut by_game: HashMap<&GameTitle, (u32, HashSet<&Username>)> = HashMap::new();
    for entry in cohort_ratings {
        let Some(score) = entry.score else {
            continue;
        };
        if score.value() < MIN_RECOMMENDED_SCORE
            || entry.username == origin
            || exclusions.owned_games.contains(&entry.game_title)
            || exclusions.blocked_players.contains(&entry.username)
        {
            continue;
        }
        let (sum, supporters) = by_game.entry(&entry.game_title).or_default();
        if supporters.insert(&entry.username) {
            *sum += score.value() as u32;
        }
    }

    let mut candidates: Vec<CandidateGame> = by_game
        .into_iter()
        .map(|(title, (sum, supporters))| CandidateGame {
            title: title.clone(),
            average_score: sum as f64 / supporters.len() as f64,
            supporters: supporters.len(),
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then_with(|| b.supporters.cmp(&a.supporters))
            .then_with(|| a.title.cmp(&b.title))
    });
    candidates.truncate(limit);
    candidates
}

/// Players sharing at least [`MIN_COMMON_GAMES`] scored games with the origin where the
/// two scores differ by at most [`SIMILARITY_TOLERANCE`].
pub fn find_similar_players(
    origin: &str,
    own_library: &[LibraryEntry],
    ratings_of_shared_games: &[LibraryEntry],
    blocked: &HashSet<Username>,
) -> Vec<Username> {
    let own_scores: HashMap<&GameTitle, i32> = own_library
        .iter()
        .filter_map(|e| e.score.map(|s| (&e.game_title, s.value() as i32)))
        .collect();

    let mut common: HashMap<&Username, usize> = HashMap::new();
    for entry in ratings_of_shared_games {
        if entry.username == origin || blocked.contains(&entry.username) {
            continue;
        }
        let (Some(theirs), Some(mine)) = (entry.score, own_scores.get(&entry.game_title)) else {
            continue;
        };
        if (theirs.value() as i32 - mine).abs() <= SIMILARITY_TOLERANCE {
            *common.entry(&entry.username).or_default() += 1;
        }
    }

    let mut similar: Vec<Username> = common
        .into_iter()
        .filter(|(_, count)| *count >= MIN_COMMON_GAMES)
        .map(|(username, _)| username.clone())
        .collect();
    similar.sort();
    similar
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::rating::Score;

    fn rated(username: &str, title: &str, score: i64) -> LibraryEntry {
        LibraryEntry {
            username: username.to_string(),
            game_title: title.to_string(),
            score: Some(Score::new(score).unwrap()),
            rated_at: Some(Utc::now()),
            added_at: Utc::now(),
        }
    }

    fn exclusions(owned: &[LibraryEntry], blocked: &[&str]) -> RecommendationExclusions {
        RecommendationExclusions::new(owned, blocked.iter().map(|b| b.to_string()).collect())
    }

    #[test]
    fn test_rank_applies_exclusions() {
        let own = vec![rated("alice", "Chess", 3)];
        let cohort = vec![
            rated("bob", "Chess", 5),
            rated("bob", "Go", 5),
            rated("carol", "Go", 4),
            rated("carol", "Tetris", 3),
            rated("mallory", "Doom", 5),
        ];
        let result = rank_candidate_games("alice", &cohort, &exclusions(&own, &["mallory"]), 10);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Go");
        assert_eq!(result[0].supporters, 2);
        assert!((result[0].average_score - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_orders_by_average_then_supporters() {
        let cohort = vec![
            rated("bob", "Go", 4),
            rated("carol", "Go", 4),
            rated("bob", "Doom", 4),
            rated("dave", "Zelda", 5),
            rated("erin", "Arkanoid", 4),
        ];
        let result = rank_candidate_games("alice", &cohort, &exclusions(&[], &[]), 3);
        let titles: Vec<&str> = result.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Zelda", "Go", "Arkanoid"]);
    }

    #[test]
    fn test_similar_players_need_two_close_games() {
        let own = vec![
            rated("alice", "Chess", 5),
            rated("alice", "Go", 2),
            rated("alice", "Doom", 4),
        ];
        let shared = vec![
            rated("bob", "Chess", 4),
            rated("bob", "Go", 3),
            rated("carol", "Chess", 5),
            rated("carol", "Go", 5),
            rated("dave", "Chess", 5),
            rated("dave", "Doom", 5),
            rated("alice", "Chess", 5),
            rated("alice", "Go", 2),
        ];
        let blocked: HashSet<Username> = ["dave".to_string()].into_iter().collect();
        assert_eq!(
            find_similar_players("alice", &own, &shared, &blocked),
            vec!["bob".to_string()]
        );
    }
}
