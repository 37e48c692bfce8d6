mod points;
mod secret;

pub mod luhn;

pub use points::{Points, PointsConversionError};
pub use secret::Secret;
