pub mod block;
pub mod follow;
pub mod social_distance;
