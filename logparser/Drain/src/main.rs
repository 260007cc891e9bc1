use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use drain::{LogParser, ParserConfig};

#[derive(Parser)]
#[command(name = "drain-parse")]
#[command(about = "Mine log templates from a log file", long_about = None)]
#[command(version)]
struct Cli {
    /// Log file name, relative to the input directory
    #[arg(long)]
    log_name: String,

    /// Line layout, e.g. "<Date> <Time> <Level> <Component>: <Content>"
    #[arg(long)]
    log_format: Option<String>,

    /// TOML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    input_dir: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Tree depth, counting the length and leaf layers
    #[arg(long)]
    depth: Option<usize>,

    /// Similarity threshold in [0, 1]
    #[arg(long)]
    st: Option<f64>,

    /// Maximum children per tree node
    #[arg(long)]
    max_child: Option<usize>,

    /// Preprocessing regex; matches are replaced with <*> (repeatable)
    #[arg(long = "regex")]
    regex: Vec<String>,

    /// Regex for tokens that must never be generalized (repeatable)
    #[arg(long = "protected")]
    protected: Vec<String>,

    /// Do not write the ParameterList column
    #[arg(long)]
    no_parameters: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> Result<(ParserConfig, String)> {
        let mut config = match &self.config {
            Some(path) => ParserConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ParserConfig::default(),
        };

        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        if config.log_format.trim().is_empty() {
            bail!("no log format given: pass --log-format or set log_format in --config");
        }
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(depth) = self.depth {
            config.drain.depth = depth;
        }
        if let Some(st) = self.st {
            config.drain.similarity_threshold = st;
        }
        if let Some(max_child) = self.max_child {
            config.drain.max_child = max_child;
        }
        if !self.regex.is_empty() {
            config.preprocess_patterns = self.regex;
        }
        if !self.protected.is_empty() {
            config.drain.protected_patterns = self.protected;
        }
        if self.no_parameters {
            config.keep_parameters = false;
        }

        Ok((config, self.log_name))
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let (config, log_name) = cli.into_config()?;
    let mut log_parser = LogParser::new(&config).context("invalid configuration")?;
    let summary = log_parser
        .parse(&log_name)
        .with_context(|| format!("failed to parse {log_name}"))?;

    println!(
        "{} lines ({} skipped), {} templates",
        summary.lines, summary.skipped, summary.clusters
    );
    println!("structured: {}", summary.structured_path.display());
    println!("templates:  {}", summary.templates_path.display());
    Ok(())
}
