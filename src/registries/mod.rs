mod settings_registry;

pub use settings_registry::{FileSettingsRegistry, Settings, SettingsError, COMPILER_ENV};
