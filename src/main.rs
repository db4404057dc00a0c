use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;

use rebuild::{Pattern, evaluate, re};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chain to evaluate, e.g. 'RE.matching.oneOrMore.digit'
    #[arg(value_name = "CHAIN")]
    chain: String,

    /// Replace the chain's flags with these letters
    #[arg(short = 'f', long, value_name = "FLAGS")]
    flags: Option<String>,

    /// Report whether TEXT matches (repeatable)
    #[arg(short = 't', long, value_name = "TEXT")]
    test: Vec<String>,

    /// Show the first match in TEXT with its groups
    #[arg(short = 'e', long, value_name = "TEXT")]
    exec: Option<String>,

    /// Show the index of the first match in TEXT
    #[arg(short = 's', long, value_name = "TEXT")]
    search: Option<String>,

    /// Split TEXT on matches
    #[arg(long, value_name = "TEXT")]
    split: Option<String>,

    /// Replace matches in TEXT using a `$` template
    #[arg(short = 'r', long, num_args = 2, value_names = ["TEXT", "REPLACEMENT"])]
    replace: Option<Vec<String>>,
}

/// Enable with `RUST_LOG=rebuild=debug` or `RUST_LOG=rebuild=trace`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut pattern =
        evaluate(&args.chain).with_context(|| format!("Failed to evaluate {}", args.chain))?;
    if let Some(flags) = args.flags.as_deref() {
        pattern = re().with_flags(flags).text(&pattern);
    }
    println!("{pattern}");

    for text in &args.test {
        println!("test {text:?}: {}", pattern.test(text)?);
    }
    if let Some(text) = args.exec.as_deref() {
        println!("exec {text:?}: {}", describe_exec(&pattern, text)?);
    }
    if let Some(text) = args.search.as_deref() {
        match pattern.search(text)? {
            Some(index) => println!("search {text:?}: {index}"),
            None => println!("search {text:?}: -1"),
        }
    }
    if let Some(text) = args.split.as_deref() {
        let parts = pattern.split(text)?;
        let parts = parts.iter().map(|part| format!("{part:?}")).join(", ");
        println!("split {text:?}: [{parts}]");
    }
    if let Some([text, replacement]) = args.replace.as_deref() {
        println!("replace {text:?}: {:?}", pattern.replace(text, replacement)?);
    }
    Ok(())
}

fn describe_exec(pattern: &Pattern, text: &str) -> Result<String> {
    let Some(found) = pattern.exec(text)? else {
        return Ok("no match".to_string());
    };
    let groups = found
        .groups
        .iter()
        .map(|group| match group {
            Some(group) => format!("{group:?}"),
            None => "undefined".to_string(),
        })
        .join(", ");
    Ok(format!("{:?} at {} [{}]", found.text, found.index, groups))
}
