//! Domain entities

pub mod weather;

pub use weather::WeatherData;
