pub mod config;
pub mod conversation;
pub mod error;
pub mod generation;
pub mod media;
pub mod message;
pub mod session;
