//! Online log template mining.
//!
//! [`Drain`] groups a stream of tokenized log lines into clusters that share
//! a template, using a fixed-depth prefix tree to find candidates and token
//! similarity to decide merges. [`LogParser`] wraps it with log-format
//! parsing, masking of known variables and CSV output.

mod cluster;
mod config;
mod drain;
mod error;
mod format;
mod matcher;
mod output;
mod parser;
mod preprocess;
mod protected;
mod template;
mod tree;

pub mod ffi;

pub use cluster::{ClusterId, ClusterStore, LogCluster};
pub use config::{DrainConfig, ParserConfig};
pub use drain::{AddOutcome, Drain};
pub use error::{DrainError, Result};
pub use format::{LogFormat, LogRecord, LogTable, CONTENT_FIELD};
pub use matcher::{fast_match, seq_dist, tree_search, Distance};
pub use output::{template_id, write_structured, write_templates, ParameterExtractor};
pub use parser::{LogParser, ParseSummary};
pub use preprocess::Preprocessor;
pub use protected::ProtectedPatterns;
pub use template::{get_template, has_numbers, must_split, WILDCARD};
pub use tree::{Node, PrefixTree, Slot};
