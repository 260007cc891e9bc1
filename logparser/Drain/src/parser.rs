use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ParserConfig;
use crate::drain::Drain;
use crate::error::Result;
use crate::format::{LogFormat, LogTable};
use crate::output::{write_structured, write_templates};
use crate::preprocess::Preprocessor;

/// Result of one [`LogParser::parse`] run
#[derive(Debug, Clone, PartialEq)]
pub struct ParseSummary {
    pub lines: usize,
    pub skipped: usize,
    pub clusters: usize,
    pub structured_path: PathBuf,
    pub templates_path: PathBuf,
}

/// Reads a log file, mines its templates and writes the CSV results.
#[derive(Debug)]
pub struct LogParser {
    in_dir: PathBuf,
    out_dir: PathBuf,
    log_format: LogFormat,
    preprocessor: Preprocessor,
    keep_para: bool,
    drain: Drain,
}

impl LogParser {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(LogParser {
            in_dir: config.input_dir.clone(),
            out_dir: config.output_dir.clone(),
            log_format: LogFormat::new(&config.log_format)?,
            preprocessor: Preprocessor::new(&config.preprocess_patterns)?,
            keep_para: config.keep_parameters,
            drain: Drain::new(&config.drain)?,
        })
    }

    /// Parse `in_dir/log_name`, writing `<log_name>_structured.csv` and
    /// `<log_name>_templates.csv` into `out_dir`.
    pub fn parse(&mut self, log_name: &str) -> Result<ParseSummary> {
        let log_file_path = self.in_dir.join(log_name);
        log::info!("Parsing file: {}", log_file_path.display());

        let table = LogTable::load(&log_file_path, &self.log_format)?;
        self.drain.reset();

        let total_rows = table.len();
        for (count, record) in table.records().iter().enumerate() {
            let tokens = self.preprocessor.tokenize(table.content(record))?;
            self.drain.add_log_message(record.line_id, tokens);

            let count = count + 1;
            if count % 1000 == 0 || count == total_rows {
                log::info!(
                    "Processed {:.1}%",
                    count as f64 * 100.0 / total_rows as f64
                );
            }
        }

        fs::create_dir_all(&self.out_dir)?;
        let structured_path = self.out_dir.join(format!("{log_name}_structured.csv"));
        let templates_path = self.out_dir.join(format!("{log_name}_templates.csv"));
        write_structured(
            &structured_path,
            &table,
            self.drain.clusters(),
            self.keep_para,
        )?;
        write_templates(&templates_path, self.drain.clusters())?;

        log::debug!("prefix tree:\n{}", self.drain.tree().render());
        log::info!(
            "Parsing done: {} lines, {} clusters",
            total_rows,
            self.drain.cluster_count()
        );

        Ok(ParseSummary {
            lines: total_rows,
            skipped: table.skipped(),
            clusters: self.drain.cluster_count(),
            structured_path,
            templates_path,
        })
    }

    /// The engine state left by the last [`LogParser::parse`]
    pub fn drain(&self) -> &Drain {
        &self.drain
    }

    pub fn output_dir(&self) -> &Path {
        &self.out_dir
    }
}
