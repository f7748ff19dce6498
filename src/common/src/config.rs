use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

/// Runtime configuration: the two positional stream paths plus the knobs
/// for where state lives and how chatty the logger is.
#[derive(Clone, Deserialize, Debug, Parser)]
#[serde(default)]
pub struct ServerConfig {
    /// Input command file
    #[clap(default_value = "commands.txt")]
    pub input_file: PathBuf,
    /// Output result file
    #[clap(default_value = "results.txt")]
    pub output_file: PathBuf,
    /// Directory holding heap files and index files
    #[clap(short = 'd', long = "data_dir", default_value = ".")]
    pub data_dir: PathBuf,
    /// Operation log, appended to across runs
    #[clap(short = 'g', long = "op_log", default_value = "horadrimLog.csv")]
    pub op_log: PathBuf,
    /// Log level
    #[clap(short = 'v', long = "log_level", default_value = "warn")]
    pub log_level: String,
    /// Path to configuration file (if provided, it will override command-line args)
    #[clap(short = 'c', long = "config_file")]
    pub config_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            input_file: "commands.txt".into(),
            output_file: "results.txt".into(),
            data_dir: ".".into(),
            op_log: "horadrimLog.csv".into(),
            log_level: "warn".to_owned(),
            config_file: None,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        ServerConfig::default()
    }

    /// A config rooted in a fresh temp directory, for tests.
    pub fn temporary() -> Self {
        let base_dir = tempfile::tempdir().unwrap().into_path();
        ServerConfig {
            input_file: base_dir.join("commands.txt"),
            output_file: base_dir.join("results.txt"),
            op_log: base_dir.join("horadrimLog.csv"),
            data_dir: base_dir,
            ..ServerConfig::default()
        }
    }

    /// Loads configuration from a JSON file, using default values for any
    /// unspecified options.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let mut file = File::open(&path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        // Missing fields fall back to default values automatically.
        match serde_json::from_str(&contents) {
            Ok(config) => {
                debug!("parsed server config from {}", path.as_ref().display());
                Ok(config)
            }
            Err(e) => {
                warn!(
                    "failed to parse server config from {}: {}",
                    path.as_ref().display(),
                    e
                );
                Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            }
        }
    }

    /// Creates a ServerConfig from command-line arguments, letting a config
    /// file named there take full precedence when it loads.
    pub fn from_command_line() -> Self {
        let args_config = ServerConfig::parse();

        if let Some(config_path) = &args_config.config_file {
            if let Ok(file_config) = Self::from_file(config_path) {
                let mut config = file_config;
                config.config_file = args_config.config_file.clone();
                info!("using configuration from file {}", config_path.display());
                return config;
            }
            warn!(
                "could not load config file {}, falling back to command-line arguments",
                config_path.display()
            );
        }

        args_config
    }
}
