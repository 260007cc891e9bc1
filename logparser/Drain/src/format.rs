use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;

use crate::error::{DrainError, Result};

/// Field holding the free-text message that gets clustered
pub const CONTENT_FIELD: &str = "Content";

/// A line layout such as `<Date> <Time> <Level> <Component>: <Content>`,
/// compiled to an anchored regex with one named group per field.
#[derive(Debug, Clone)]
pub struct LogFormat {
    headers: Vec<String>,
    regex: Regex,
}

impl LogFormat {
    pub fn new(log_format: &str) -> Result<Self> {
        let field_re = Regex::new(r"<[^<>]+>")?;
        let splitter = Regex::new(" +")?;

        let headers: Vec<String> = field_re
            .find_iter(log_format)
            .map(|m| {
                m.as_str()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
            .collect();
        if headers.is_empty() {
            return Err(DrainError::invalid_log_format(format!(
                "no <Field> placeholders in {log_format:?}"
            )));
        }
        if !headers.iter().any(|h| h == CONTENT_FIELD) {
            return Err(DrainError::missing_field(CONTENT_FIELD));
        }

        let mut pattern = String::from("^");
        for (literal, header) in field_re.split(log_format).zip(&headers) {
            pattern.push_str(&splitter.replace_all(&regex::escape(literal), r"\s+"));
            pattern.push_str(&format!("(?P<{header}>.*?)"));
        }
        // text after the last field
        if let Some(tail) = field_re.split(log_format).nth(headers.len()) {
            pattern.push_str(&splitter.replace_all(&regex::escape(tail), r"\s+"));
        }
        pattern.push('$');

        let regex = Regex::new(&pattern)
            .map_err(|e| DrainError::invalid_log_format(format!("{log_format:?}: {e}")))?;
        Ok(Self { headers, regex })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn content_index(&self) -> usize {
        self.headers
            .iter()
            .position(|h| h == CONTENT_FIELD)
            .unwrap_or_default()
    }

    /// Field values of `line` in header order, or `None` if it doesn't fit
    pub fn split_line(&self, line: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(line)?;
        Some(
            self.headers
                .iter()
                .map(|h| caps.name(h).map_or("", |m| m.as_str()).to_string())
                .collect(),
        )
    }
}

/// One matched input line
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// 1-based, counting matched lines only
    pub line_id: u64,
    /// Values aligned with [`LogFormat::headers`]
    pub fields: Vec<String>,
}

/// All matched lines of a log file
#[derive(Debug, Clone)]
pub struct LogTable {
    headers: Vec<String>,
    content_index: usize,
    records: Vec<LogRecord>,
    skipped: usize,
}

impl LogTable {
    pub fn load(path: impl AsRef<Path>, format: &LogFormat) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file), format)
    }

    pub fn from_reader<R: BufRead>(reader: R, format: &LogFormat) -> Result<Self> {
        let mut records = Vec::new();
        let mut skipped = 0;

        for line in reader.lines() {
            let line = line?;
            match format.split_line(line.trim()) {
                Some(fields) => records.push(LogRecord {
                    line_id: records.len() as u64 + 1,
                    fields,
                }),
                None => {
                    log::warn!("Skip line: {line}");
                    skipped += 1;
                }
            }
        }

        log::info!("Total lines: {}", records.len());

        Ok(Self {
            headers: format.headers().to_vec(),
            content_index: format.content_index(),
            records,
            skipped,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// `Content` field of a record from this table
    pub fn content<'a>(&self, record: &'a LogRecord) -> &'a str {
        &record.fields[self.content_index]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lines dropped because they didn't match the format
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
