//! HTTP handlers, one module per resource

pub mod admin;
pub mod auth;
pub mod crop;
pub mod health;
pub mod photo;
pub mod profile;
pub mod task;
pub mod watering;
pub mod weather;

pub use admin::*;
pub use auth::*;
pub use crop::*;
pub use health::*;
pub use photo::*;
pub use profile::*;
pub use task::*;
pub use watering::*;
pub use weather::*;
