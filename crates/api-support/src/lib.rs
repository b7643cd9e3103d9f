mod config;
mod env;
mod error;
mod github;
mod logs;
mod mcp;
mod openapi;
mod routes;
mod state;

pub use config::SupportConfig;
pub use env::{
    ChatwootEnv, GitHubAppEnv, OpenRouterEnv, StripeEnv, SupabaseEnv, SupportDatabaseEnv,
};
pub use openapi::openapi;
pub use routes::router;
