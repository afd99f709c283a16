use crate::domain::{RepoError, Username};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FollowEdge {
    pub from: Username,
    pub to: Username,
}

impl FollowEdge {
    pub fn new(from: impl Into<Username>, to: impl Into<Username>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait SocialRepository {
    /// Idempotent: following twice leaves a single edge.
    async fn follow(&self, follower: &str, followee: &str) -> Result<(), RepoError>;
    /// Returns whether an edge was removed.
    async fn unfollow(&self, follower: &str, followee: &str) -> Result<bool, RepoError>;
    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, RepoError>;
    async fn get_followees(&self, follower: &str) -> Result<Vec<Username>, RepoError>;
    /// Outgoing FOLLOWS edges of every given player, in one round trip.
    async fn get_outgoing_edges(&self, followers: &[Username]) -> Result<Vec<FollowEdge>, RepoError>;
    async fn block(&self, blocker: &str, blocked: &str) -> Result<(), RepoError>;
    async fn get_blocked(&self, blocker: &str) -> Result<Vec<Username>, RepoError>;
    async fn count_follows(&self) -> Result<u64, RepoError>;
}
