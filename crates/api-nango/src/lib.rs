mod config;
mod error;
pub mod extractor;
pub mod integrations;
mod openapi;
mod routes;
mod state;
mod supabase;

pub use config::NangoConfig;
pub use extractor::{NangoConnection, NangoConnectionError, NangoConnectionState};
pub use integrations::{GoogleCalendar, GoogleDrive, NangoIntegrationId};
pub use openapi::openapi;
pub use routes::{router, webhook_router};
