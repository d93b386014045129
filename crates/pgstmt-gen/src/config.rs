//! Configuration for the offline generator

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure: generator settings plus the statements themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Code generation settings
    pub generator: GeneratorSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Statements to generate, in output order
    #[serde(default)]
    pub statements: Vec<StatementConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Path of the runtime crate in generated code
    pub crate_path: String,

    /// Visibility of generated structs and fields
    pub visibility: String,

    /// Derives on generated statement structs
    pub derives: Vec<String>,

    /// Emit the "@generated" banner
    pub header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json or pretty)
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementConfig {
    /// snake_case name; the struct is its UpperCamelCase form
    pub name: String,

    /// Statement template
    pub sql: String,

    /// Row type name, `<Struct>Row` when unset
    #[serde(default)]
    pub row: Option<String>,

    /// Doc comment for the generated struct
    #[serde(default)]
    pub doc: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorSettings {
                crate_path: "::pgstmt".to_string(),
                visibility: "pub".to_string(),
                derives: vec!["Debug".to_string(), "Clone".to_string()],
                header: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            statements: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Defaults, then the manifest at `path` if it exists, then `PGSTMT__*` variables
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&GeneratorConfig::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix("PGSTMT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("generator.derives")
    }
}
