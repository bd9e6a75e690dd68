//! Shared configuration, constants and primitive types for kasumi.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{BrokerConfig, ParserConfig, SerializerConfig, Settings, load_config};
pub use error::{CoreError, CoreResult};
pub use types::DocumentKind;
