pub mod client;
pub mod error;
pub mod loader;
pub mod provider;
pub mod types;

pub use client::GeocoderClient;
pub use error::{GeocodeError, LoadError, SensorError};
pub use loader::ProviderLoader;
pub use provider::{FixedSensor, GeocodeProvider, PositionSensor, SearchBias, SensorOptions};
