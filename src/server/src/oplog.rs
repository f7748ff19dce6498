use chrono::Utc;
use common::prelude::*;
use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Outcome recorded for a processed command. Every recoverable error maps
/// to `Failure`; the taxonomy behind it stays in the server log only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Success,
    Failure,
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStatus::Success => write!(f, "success"),
            LogStatus::Failure => write!(f, "failure"),
        }
    }
}

/// The append-only operation log: one CSV record per processed command,
/// `<unix_seconds>,<original_command_line>,<status>`. The file is opened
/// per append and flushed before close, so no handle spans commands.
pub struct OperationLog {
    path: PathBuf,
}

impl OperationLog {
    pub fn new(path: PathBuf) -> Self {
        OperationLog { path }
    }

    pub fn append(&self, command_line: &str, status: LogStatus) -> Result<(), HoradrimError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record([
                Utc::now().timestamp().to_string().as_str(),
                command_line,
                status.to_string().as_str(),
            ])
            .map_err(|e| HoradrimError::IOError(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| HoradrimError::IOError(e.to_string()))?;
        Ok(())
    }
}
