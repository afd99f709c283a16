pub mod comments;
pub mod topics;
