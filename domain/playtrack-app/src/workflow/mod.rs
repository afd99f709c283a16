pub mod account;
pub mod catalog;
pub mod forum;
pub mod leaderboard;
pub mod recommendation;
pub mod search;
pub mod social;
