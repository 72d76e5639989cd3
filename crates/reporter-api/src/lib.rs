pub mod auth;
pub mod config;
pub mod error;
pub mod integrations;
pub mod middleware;
pub mod org;
pub mod router;
pub mod token;
pub mod webhooks;
