//! External API integrations

pub mod image_host;
pub mod weather;

pub use image_host::ImageHostClient;
pub use weather::WeatherClient;
