pub mod catalog;
pub mod error;
pub mod model;
pub mod rules;
pub mod scoring;
pub mod time;
pub mod timer;

pub use error::Error;
pub use time::Clock;
