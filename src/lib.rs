pub mod app;
pub mod comments;
pub mod config;
pub mod db;
pub mod feed;
pub mod hn_client;
pub mod loader;
pub mod location;
pub mod logging;
pub mod models;
pub mod session;
pub mod theme;
