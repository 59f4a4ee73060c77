//! Domain models for the Grow Smart garden tracker

mod crop;
mod growth;
mod task;
mod user;
mod weather;

pub use crop::*;
pub use growth::*;
pub use task::*;
pub use user::*;
pub use weather::*;
