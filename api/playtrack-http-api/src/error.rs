use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use playtrack_app::workflow::{
    account::{
        avatar::AvatarUseCaseError, change_password::ChangePasswordError,
        get_player::GetPlayerError, get_profile::GetProfileError, login::LoginError,
        signup::SignupError,
    },
    catalog::{games::GameCatalogError, library::LibraryError},
    forum::{comments::CommentError, topics::TopicError},
    leaderboard::LeaderboardError,
    recommendation::{games::RecommendationError, topics::TopicRecommendationError},
    search::SearchError,
    social::{block::BlockError, follow::FollowError, social_distance::SocialDistanceError},
};

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    Unavailable(String),
    /// Logged in full; the client only sees a generic message.
    Internal(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            ServiceError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServiceError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServiceError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ServiceError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };
        let body = serde_json::json!({ "error": msg });
        (status, Json(body)).into_response()
    }
}

fn not_found(what: &str) -> ServiceError {
    ServiceError::NotFound(format!("{} not found", what))
}

impl From<SignupError> for ServiceError {
    fn from(e: SignupError) -> Self {
        match e {
            SignupError::Invalid(e) => ServiceError::BadRequest(e.to_string()),
            SignupError::UsernameTaken => {
                ServiceError::Conflict("Username already exists".to_string())
            }
            SignupError::EmailTaken => ServiceError::Conflict("Email already exists".to_string()),
            SignupError::Internal => ServiceError::Internal("signup failed".to_string()),
        }
    }
}

impl From<LoginError> for ServiceError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::MissingCredentials => {
                ServiceError::BadRequest("Username and password are required".to_string())
            }
            LoginError::InvalidCredentials => {
                ServiceError::Unauthorized("Invalid username or password".to_string())
            }
            LoginError::Internal => ServiceError::Internal("login failed".to_string()),
        }
    }
}

impl From<GetPlayerError> for ServiceError {
    fn from(e: GetPlayerError) -> Self {
        match e {
            GetPlayerError::NotFound => not_found("Player"),
            GetPlayerError::RepositoryError => {
                ServiceError::Internal("player lookup failed".to_string())
            }
        }
    }
}

impl From<GetProfileError> for ServiceError {
    fn from(e: GetProfileError) -> Self {
        match e {
            GetProfileError::NotFound => not_found("Player"),
            GetProfileError::RepositoryError => {
                ServiceError::Internal("profile lookup failed".to_string())
            }
        }
    }
}

impl From<ChangePasswordError> for ServiceError {
    fn from(e: ChangePasswordError) -> Self {
        match e {
            ChangePasswordError::Invalid(e) => ServiceError::BadRequest(e.to_string()),
            ChangePasswordError::WrongPassword => {
                ServiceError::Unauthorized("Current password is incorrect".to_string())
            }
            ChangePasswordError::NotFound => not_found("Player"),
            ChangePasswordError::Internal => {
                ServiceError::Internal("password change failed".to_string())
            }
        }
    }
}

impl From<AvatarUseCaseError> for ServiceError {
    fn from(e: AvatarUseCaseError) -> Self {
        match e {
            AvatarUseCaseError::Invalid(e) => ServiceError::BadRequest(e.to_string()),
            AvatarUseCaseError::PlayerNotFound => not_found("Player"),
            AvatarUseCaseError::Internal => {
                ServiceError::Internal("avatar update failed".to_string())
            }
        }
    }
}

impl From<GameCatalogError> for ServiceError {
    fn from(e: GameCatalogError) -> Self {
        match e {
            GameCatalogError::MissingTitle => {
                ServiceError::BadRequest("Game title is required".to_string())
            }
            GameCatalogError::AlreadyExists => {
                ServiceError::Conflict("Game already exists".to_string())
            }
            GameCatalogError::RepositoryError => {
                ServiceError::Internal("game catalog failed".to_string())
            }
        }
    }
}

impl From<LibraryError> for ServiceError {
    fn from(e: LibraryError) -> Self {
        match e {
            LibraryError::MissingGameTitle => {
                ServiceError::BadRequest("Game title is required".to_string())
            }
            LibraryError::InvalidScore => {
                ServiceError::BadRequest("Rating must be between 1 and 5".to_string())
            }
            LibraryError::PlayerNotFound => not_found("Player"),
            LibraryError::GameNotFound => not_found("Game"),
            LibraryError::Internal => ServiceError::Internal("library update failed".to_string()),
        }
    }
}

impl From<FollowError> for ServiceError {
    fn from(e: FollowError) -> Self {
        match e {
            FollowError::MissingTarget => {
                ServiceError::BadRequest("Target username is required".to_string())
            }
            FollowError::SelfFollow => {
                ServiceError::BadRequest("Players cannot follow themselves".to_string())
            }
            FollowError::PlayerNotFound => not_found("Player"),
            FollowError::Internal => ServiceError::Internal("follow update failed".to_string()),
        }
    }
}

impl From<BlockError> for ServiceError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::MissingTarget => {
                ServiceError::BadRequest("Target username is required".to_string())
            }
            BlockError::PlayerNotFound => not_found("Player"),
            BlockError::Internal => ServiceError::Internal("block update failed".to_string()),
        }
    }
}

impl From<SocialDistanceError> for ServiceError {
    fn from(e: SocialDistanceError) -> Self {
        match e {
            SocialDistanceError::MissingOrigin => {
                ServiceError::BadRequest("Username is required".to_string())
            }
            SocialDistanceError::MissingGame => {
                ServiceError::BadRequest("Game title is required".to_string())
            }
            SocialDistanceError::RepositoryError => {
                ServiceError::Internal("social distance query failed".to_string())
            }
        }
    }
}

impl From<RecommendationError> for ServiceError {
    fn from(e: RecommendationError) -> Self {
        match e {
            RecommendationError::RepositoryError => {
                ServiceError::Internal("recommendation query failed".to_string())
            }
        }
    }
}

impl From<TopicRecommendationError> for ServiceError {
    fn from(e: TopicRecommendationError) -> Self {
        match e {
            TopicRecommendationError::RepositoryError => {
                ServiceError::Internal("topic recommendation failed".to_string())
            }
        }
    }
}

impl From<TopicError> for ServiceError {
    fn from(e: TopicError) -> Self {
        match e {
            TopicError::MissingFields => {
                ServiceError::BadRequest("Title, content and author are required".to_string())
            }
            TopicError::AuthorNotFound => not_found("Author"),
            TopicError::TopicNotFound => not_found("Topic"),
            TopicError::NotAuthor => {
                ServiceError::Forbidden("Only the author may change this topic".to_string())
            }
            TopicError::Internal => ServiceError::Internal("topic update failed".to_string()),
        }
    }
}

impl From<CommentError> for ServiceError {
    fn from(e: CommentError) -> Self {
        match e {
            CommentError::MissingFields => {
                ServiceError::BadRequest("Content and authorUsername are required".to_string())
            }
            CommentError::TopicNotFound => not_found("Topic"),
            CommentError::AuthorNotFound => not_found("Author"),
            CommentError::Internal => ServiceError::Internal("comment update failed".to_string()),
        }
    }
}

impl From<SearchError> for ServiceError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::RepositoryError => ServiceError::Internal("search failed".to_string()),
        }
    }
}

impl From<LeaderboardError> for ServiceError {
    fn from(e: LeaderboardError) -> Self {
        match e {
            LeaderboardError::Unavailable => {
                ServiceError::Unavailable("Analytics store is not available".to_string())
            }
            LeaderboardError::MissingFields => {
                ServiceError::BadRequest("Required fields are missing".to_string())
            }
            LeaderboardError::Internal => {
                ServiceError::Internal("leaderboard operation failed".to_string())
            }
        }
    }
}
