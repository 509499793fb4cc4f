pub mod auth;
pub mod projects;
pub mod server;
pub mod settings;
pub mod upload;
