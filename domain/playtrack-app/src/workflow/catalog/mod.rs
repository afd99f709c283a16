pub mod games;
pub mod library;
