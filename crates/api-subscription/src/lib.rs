mod config;
mod env;
mod error;
mod openapi;
mod routes;
mod state;
mod stripe;
mod supabase;
mod trial;

pub use config::SubscriptionConfig;
pub use env::StripeEnv;
pub use openapi::openapi;
pub use routes::router;
