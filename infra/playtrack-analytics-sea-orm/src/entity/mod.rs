pub mod activity_log;
pub mod game_leaderboard;
pub mod global_leaderboard;
pub mod player_stats;
