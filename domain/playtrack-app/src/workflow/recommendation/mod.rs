pub mod games;
pub mod topics;
