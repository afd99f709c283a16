use chrono::{DateTime, Utc};

use crate::domain::{Username, player::Player};

pub mod avatar;
pub mod change_password;
pub mod get_player;
pub mod get_profile;
pub mod login;
pub mod signup;

/// A player without credentials.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerView {
    pub username: Username,
    pub email: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
    pub avatar: Option<String>,
}

impl From<Player> for PlayerView {
    fn from(player: Player) -> Self {
        Self {
            username: player.username,
            email: player.email,
            age: player.age,
            created_at: player.created_at,
            avatar: player.avatar,
        }
    }
}
