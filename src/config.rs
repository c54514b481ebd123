//! Layered configuration: defaults, presets, project file, CLI overrides

pub mod discover;
pub mod settings;

pub use discover::{CONFIG_CANDIDATES, UpwardSearch, find_config_file};
pub use settings::{FileConfig, LimitKey, Limits, Patch, Settings, preset, preset_names, resolve};
