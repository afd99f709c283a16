//! Fills an empty graph store with a small demo community.

use std::sync::Arc;

use playtrack_analytics_sea_orm::AnalyticsRepositoryImpl;
use playtrack_app::{
    domain::game::Game,
    workflow::{
        account::signup::{SignupError, SignupRequest},
        catalog::games::GameCatalogError,
    },
};
use playtrack_server::{config::ServerConfig, logs::init_logger, sea_orm_application};

const PLAYERS: [(&str, u32); 6] = [
    ("marko", 25),
    ("ana", 22),
    ("stefan", 28),
    ("jelena", 24),
    ("nikola", 26),
    ("milica", 23),
];

const GAMES: [(&str, &str, i32); 8] = [
    ("Elden Ring", "Action RPG", 2022),
    ("Resident Evil 4", "Horror", 2023),
    ("Baldurs Gate 3", "RPG", 2023),
    ("Cyberpunk 2077", "Action RPG", 2020),
    ("Dark Souls 3", "Action RPG", 2016),
    ("The Witcher 3", "RPG", 2015),
    ("Sekiro", "Action", 2019),
    ("Bloodborne", "Action RPG", 2015),
];

const FOLLOWS: [(&str, &str); 9] = [
    ("marko", "ana"),
    ("marko", "stefan"),
    ("marko", "jelena"),
    ("ana", "stefan"),
    ("ana", "nikola"),
    ("stefan", "jelena"),
    ("stefan", "milica"),
    ("jelena", "nikola"),
    ("nikola", "milica"),
];

const BLOCKS: [(&str, &str); 1] = [("marko", "milica")];

const RATINGS: [(&str, &str, i64); 16] = [
    ("marko", "Elden Ring", 5),
    ("marko", "Dark Souls 3", 4),
    ("marko", "Cyberpunk 2077", 3),
    ("ana", "Elden Ring", 5),
    ("ana", "Baldurs Gate 3", 5),
    ("ana", "The Witcher 3", 4),
    ("ana", "Bloodborne", 4),
    ("stefan", "Dark Souls 3", 5),
    ("stefan", "Baldurs Gate 3", 4),
    ("stefan", "Sekiro", 5),
    ("jelena", "Resident Evil 4", 4),
    ("jelena", "Baldurs Gate 3", 5),
    ("jelena", "Cyberpunk 2077", 3),
    ("nikola", "The Witcher 3", 5),
    ("nikola", "Cyberpunk 2077", 4),
    ("nikola", "Bloodborne", 5),
];

const FAVORITES: [(&str, &str); 2] = [("marko", "Elden Ring"), ("ana", "Baldurs Gate 3")];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _logger = init_logger().expect("Failed to initialize logger");
    let config = ServerConfig::from_env().expect("Invalid configuration");

    // Leaderboard rows are rebuilt afterwards with sync_analytics.
    let app = sea_orm_application(&config, Arc::new(AnalyticsRepositoryImpl::disabled())).await;

    for (username, age) in PLAYERS {
        let request = SignupRequest {
            username: username.to_string(),
            email: format!("{}@test.com", username),
            password: format!("{}123", username),
            age: Some(age),
        };
        match app.signup_use_case.signup(request).await {
            Ok(_) => log::info!("Created player {}", username),
            Err(SignupError::UsernameTaken) => log::warn!("Player {} already exists", username),
            Err(e) => panic!("Failed to create player {}: {:?}", username, e),
        }
    }

    for (title, genre, release_year) in GAMES {
        let game = Game {
            title: title.to_string(),
            genre: Some(genre.to_string()),
            release_year: Some(release_year),
        };
        match app.game_catalog_use_case.create_game(game).await {
            Ok(_) => log::info!("Created game {}", title),
            Err(GameCatalogError::AlreadyExists) => log::warn!("Game {} already exists", title),
            Err(e) => panic!("Failed to create game {}: {:?}", title, e),
        }
    }

    for (from, to) in FOLLOWS {
        app.follow_use_case
            .follow(from, to)
            .await
            .unwrap_or_else(|e| panic!("Failed to add {} -> {}: {:?}", from, to, e));
    }

    for (blocker, blocked) in BLOCKS {
        app.block_use_case
            .block(blocker, blocked)
            .await
            .unwrap_or_else(|e| panic!("Failed to block {} -> {}: {:?}", blocker, blocked, e));
    }

    for (username, title, score) in RATINGS {
        app.library_use_case
            .rate_game(username, title, score)
            .await
            .unwrap_or_else(|e| panic!("Failed to rate {} for {}: {:?}", title, username, e));
    }

    for (username, title) in FAVORITES {
        app.library_use_case
            .favorite_game(username, title)
            .await
            .unwrap_or_else(|e| panic!("Failed to favorite {} for {}: {:?}", title, username, e));
    }

    println!(
        "Seeded {} players, {} games, {} follows, {} blocks, {} ratings and {} favorites",
        PLAYERS.len(),
        GAMES.len(),
        FOLLOWS.len(),
        BLOCKS.len(),
        RATINGS.len(),
        FAVORITES.len()
    );
}
