pub mod settings;

pub use settings::{Settings, SettingsBuilder, error::SettingsError};
