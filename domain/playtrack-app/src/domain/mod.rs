pub mod analytics;
pub mod avatar;
pub mod credentials;
pub mod forum;
pub mod game;
pub mod player;
pub mod rating;
pub mod recommendation;
pub mod social;
pub mod social_distance;

pub type Username = String;
pub type GameTitle = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TopicId(pub uuid::Uuid);

impl TopicId {
    pub fn new() -> Self {
        TopicId(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommentId(pub uuid::Uuid);

impl CommentId {
    pub fn new() -> Self {
        CommentId(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Pagination {
    /// Pages are 1-based; page 0 is treated as the first page.
    pub fn page(page: usize, limit: usize) -> Self {
        Self {
            offset: Some(page.saturating_sub(1) * limit),
            limit: Some(limit),
        }
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PaginatedResponse<T> {
    pub total_count: usize,
    pub items: Vec<T>,
}

#[derive(Debug)]
pub enum RepoError {
    StorageError(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum RepoRetrieveError {
    NotFound,
    StorageError(String),
}

impl std::fmt::Display for RepoRetrieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoRetrieveError::NotFound => write!(f, "Resource not found"),
            RepoRetrieveError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum RepoCreateError {
    Conflict(String),
    StorageError(String),
}

impl std::fmt::Display for RepoCreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoCreateError::Conflict(field) => write!(f, "Resource conflict on {}", field),
            RepoCreateError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum RepoUpdateError {
    NotFound,
    StorageError(String),
}

impl std::fmt::Display for RepoUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoUpdateError::NotFound => write!(f, "Resource not found"),
            RepoUpdateError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_page() {
        let pagination = Pagination::page(3, 10);
        assert_eq!(pagination.offset, Some(20));
        assert_eq!(pagination.limit, Some(10));

        let first = Pagination::page(0, 10);
        assert_eq!(first.offset, Some(0));
    }

    #[test]
    fn test_pagination_apply() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(Pagination::page(3, 10).apply(items.clone()), (20..25).collect::<Vec<_>>());
        assert_eq!(Pagination::default().apply(items.clone()).len(), 25);
    }
}
