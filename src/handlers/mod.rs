//! HTTP handlers. Each delegates storage and permission concerns to the
//! services in `AppState`.

pub mod health_handlers;
pub mod meta_handlers;
pub mod object_handlers;
