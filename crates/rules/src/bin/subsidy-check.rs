//! subsidy-check: lint rule definitions and run them against application data.
//!
//! Reads a `validation` block (or a subsidy catalog with `--subsidy`) and
//! either reports what it parsed (`lint`) or evaluates an application
//! (`validate`). Exit status of `validate` is 0 when the application is
//! submit-ready and 2 when a blocking finding remains.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use shinsei_core::Config;
use shinsei_rules::{catalog, FindingKind, RuleSet, RuleSetDefinition, ValidationResult};

// ── CLI ─────────────────────────────────────────────────────────────

/// Subsidy rule checker.
#[derive(Parser, Debug)]
#[command(name = "subsidy-check", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RulesArgs {
    /// Rule file: a validation block, or a subsidy catalog when --subsidy is set.
    #[arg(long, env = "SHINSEI_RULES")]
    rules: PathBuf,

    /// Subsidy id to look up in the catalog.
    #[arg(long, env = "SHINSEI_SUBSIDY")]
    subsidy: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse the rules and report how many of each kind were loaded.
    Lint {
        #[command(flatten)]
        rules: RulesArgs,
    },
    /// Evaluate application data (JSON, or YAML by extension).
    Validate {
        #[command(flatten)]
        rules: RulesArgs,

        #[arg(long)]
        data: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    shinsei_core::config::load_dotenv();
    let config = Config::from_env();
    shinsei_core::init_tracing(&config.log);
    config.log_summary();

    let cli = Cli::parse();

    match cli.command {
        Command::Lint { rules } => {
            let set = load_rules(&rules, &config)?;
            let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
            for rule in &set {
                *by_kind.entry(rule.kind().as_str()).or_default() += 1;
            }
            println!("{} rules OK", set.len());
            for (kind, count) in by_kind {
                println!("  {kind}: {count}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate {
            rules,
            data,
            format,
        } => {
            let set = load_rules(&rules, &config)?;
            let data = load_data(&data)?;
            let result = set.validate(&data);

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                Format::Text => print_text(&result),
            }

            Ok(if result.submit_ready() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
    }
}

fn load_rules(args: &RulesArgs, config: &Config) -> Result<RuleSet> {
    let text = fs::read_to_string(&args.rules)
        .with_context(|| format!("failed to read {}", args.rules.display()))?;

    let set = match &args.subsidy {
        Some(id) => catalog::rule_set_for_subsidy(&text, id, &config.rules)
            .with_context(|| format!("invalid catalog {}", args.rules.display()))?
            .with_context(|| format!("subsidy '{id}' not found in {}", args.rules.display()))?,
        None => {
            let definition: RuleSetDefinition = serde_yaml::from_str(&text)
                .with_context(|| format!("invalid rule file {}", args.rules.display()))?;
            RuleSet::parse_with(&definition, &config.rules)
                .with_context(|| format!("invalid rule file {}", args.rules.display()))?
        }
    };

    info!(rules = set.len(), path = %args.rules.display(), "loaded rule set");
    Ok(set)
}

fn load_data(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

fn print_text(result: &ValidationResult) {
    println!(
        "submit ready: {}",
        if result.submit_ready() { "yes" } else { "no" }
    );
    println!(
        "blocks: {}, warnings: {}",
        result.blocks().count(),
        result.warnings().count()
    );
    for finding in result.findings() {
        let marker = match finding.kind {
            FindingKind::Violation => "",
            FindingKind::EvaluationError => ", evaluation error",
        };
        match &finding.field {
            Some(field) => println!(
                "- [{}{}] {}: {} ({})",
                finding.severity, marker, finding.rule_id, finding.message, field
            ),
            None => println!(
                "- [{}{}] {}: {}",
                finding.severity, marker, finding.rule_id, finding.message
            ),
        }
    }
}
