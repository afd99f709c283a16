pub mod avatar_storage;
