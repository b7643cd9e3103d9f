mod error;
mod openapi;
mod provider;
mod providers;
mod routes;

pub use openapi::openapi;
pub use provider::CalendarConfig;
pub use routes::router;
