pub mod block;
pub mod comment;
pub mod favorite;
pub mod follow;
pub mod game;
pub mod player;
pub mod rating;
pub mod topic;
