pub mod comment;
pub mod connection;
pub mod guest;
pub mod migration;
