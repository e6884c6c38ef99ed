//! Configuration file and typed settings.
//!
//! The user configuration lives in `~/.cduwind/config.ini`. [`ConfigFile`]
//! loads it over the defaults and saves it back with comments;
//! [`ConfigKey`] gives validated get/set access by `section.key` name.

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    ConfigFile, ControlSettings, IngestionSettings, LoggingSettings, SequenceSettings,
    WindSettings,
};
