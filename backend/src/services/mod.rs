//! Business logic services for the Grow Smart garden tracker

pub mod admin;
pub mod auth;
pub mod crop;
pub mod photo;
pub mod profile;
pub mod task;
pub mod watering;
pub mod weather;

pub use admin::AdminService;
pub use auth::AuthService;
pub use crop::CropService;
pub use photo::PhotoService;
pub use profile::ProfileService;
pub use task::TaskService;
pub use watering::WateringService;
pub use weather::WeatherService;
