use crate::database_state::DatabaseState;
use crate::handler::handle_command;
use crate::oplog::{LogStatus, OperationLog};
use common::commands;
use common::config::ServerConfig;
use common::HoradrimError;
use env_logger::Env;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

/// The driver: reads the command stream line by line, dispatches each
/// command, writes result lines to the output stream (flushing after each),
/// and stamps exactly one operation-log entry per processed command.
///
/// Strictly sequential; the next command is not read until the previous one
/// has fully settled on disk.
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let _ = env_logger::Builder::from_env(
            Env::default().default_filter_or(config.log_level.as_str()),
        )
        .try_init();
        Server { config }
    }

    pub fn run(&mut self) -> Result<(), HoradrimError> {
        let db = DatabaseState::new(&self.config)?;
        let oplog = OperationLog::new(self.config.op_log.clone());

        let input = File::open(&self.config.input_file)?;
        let mut output = File::create(&self.config.output_file)?;

        for line in BufReader::new(input).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.process_line(&db, &oplog, &mut output, line)?;
        }
        info!("command stream exhausted, shutting down");
        Ok(())
    }

    /// Run one command to completion: result lines, then the log entry.
    /// Errors returned here are I/O failures on the streams themselves and
    /// abort the run; command failures are absorbed into the log.
    fn process_line(
        &self,
        db: &DatabaseState,
        oplog: &OperationLog,
        output: &mut File,
        line: &str,
    ) -> Result<(), HoradrimError> {
        let parsed = match commands::parse_command(line) {
            Some(parsed) => parsed,
            None => {
                warn!("unrecognized command: {}", line);
                return oplog.append(line, LogStatus::Failure);
            }
        };

        match handle_command(db, &parsed) {
            Ok(lines) => {
                for l in &lines {
                    writeln!(output, "{}", l)?;
                    output.flush()?;
                }
                oplog.append(line, LogStatus::Success)
            }
            Err(e) => {
                debug!("command failed: {}: {}", line, e);
                oplog.append(line, LogStatus::Failure)
            }
        }
    }
}
