//! quarry: render JSON query documents to SQL
//!
//! # Usage
//!
//! ```bash
//! # Render a query for PostgreSQL
//! quarry render query.json --schema schema.qsl
//!
//! # SQL Server, positional placeholders, machine-readable output
//! quarry render query.json --schema schema.json --dialect mssql --numbered --json
//!
//! # Validate identifiers only
//! quarry check query.json --schema schema.toml
//!
//! # Show what each dialect can express
//! quarry dialects
//! ```

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::*;
use quarry::ast::{BinaryOp, JoinKind, JsonPath, LockMode, SetOperation, Statement};
use quarry::config::{Config, PlaceholderStyle, RenderOptions};
use quarry::schema::Schema;
use quarry::transpiler::{Dialect, ReturningStyle, ToSql, UpsertStyle};
use quarry::validator::validate_statement;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quarry")]
#[command(version)]
#[command(about = "Typed queries to parameterized SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    quarry render query.json --schema schema.qsl
    quarry render query.json --dialect sqlite --numbered
    quarry check query.json --schema schema.json
    quarry dialects")]
struct Cli {
    /// Config file (defaults to ./quarry.toml, then the user config dir)
    #[arg(short, long, global = true, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and render a query document
    Render {
        #[command(flatten)]
        input: QueryInput,

        /// Target dialect (postgres, mysql, sqlite, sqlserver)
        #[arg(short, long)]
        dialect: Option<Dialect>,

        /// Positional placeholders ($1, ?1, @p1) instead of named ones
        #[arg(long)]
        numbered: bool,

        /// Maximum subquery nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print the rendered query as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate every identifier in a query document against the schema
    Check {
        #[command(flatten)]
        input: QueryInput,
    },
    /// Show the capability matrix of every dialect
    Dialects,
}

#[derive(Args)]
struct QueryInput {
    /// JSON query document
    query: PathBuf,

    /// Schema file (.json, .toml or .qsl); overrides the config
    #[arg(short, long)]
    schema: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "quarry=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("QUARRY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Render {
            input,
            dialect,
            numbered,
            max_depth,
            json,
        } => {
            let mut options = config.render.clone();
            if let Some(dialect) = dialect {
                options.dialect = dialect;
            }
            if numbered {
                options.placeholders = PlaceholderStyle::Numbered;
            }
            if let Some(depth) = max_depth {
                options.max_subquery_depth = depth;
            }
            render(&input, &config, &options, json, cli.verbose)
        }
        Commands::Check { input } => {
            let statement = load_checked(&input, &config)?;
            let kind = match statement {
                Statement::Query(_) => "query",
                Statement::Compound(_) => "compound query",
            };
            println!("{} {} is valid", "✓".green().bold(), kind);
            Ok(())
        }
        Commands::Dialects => {
            show_dialects();
            Ok(())
        }
    }
}

fn render(
    input: &QueryInput,
    config: &Config,
    options: &RenderOptions,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let statement = load_checked(input, config)?;
    if verbose {
        println!(
            "{} {}",
            "Dialect:".dimmed(),
            options.dialect.to_string().yellow()
        );
    }

    let rendered = statement.to_sql_with_options(options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    println!("{}", "Generated SQL:".green().bold());
    println!("{}", rendered.sql.white());
    if !rendered.params.is_empty() {
        println!();
        println!("{}", "Parameters:".green().bold());
        for (i, name) in rendered.params.iter().enumerate() {
            println!("  {:>3}  {}", (i + 1).to_string().dimmed(), name.cyan());
        }
    }
    Ok(())
}

/// Read the query document and validate it against the schema.
fn load_checked(input: &QueryInput, config: &Config) -> Result<Statement> {
    let schema_path = input
        .schema
        .as_deref()
        .or(config.schema.as_deref())
        .context("no schema given; pass --schema or set `schema` in quarry.toml")?;
    let schema = Schema::from_file(schema_path)?;
    let statement = read_statement(&input.query)?;

    if let Err(errors) = validate_statement(&schema, &statement) {
        for err in &errors {
            eprintln!("  {} {}", "✗".red(), err);
        }
        bail!("{} identifier error(s) in {}", errors.len(), input.query.display());
    }
    Ok(statement)
}

fn read_statement(path: &Path) -> Result<Statement> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid query document {}", path.display()))
}

fn show_dialects() {
    println!("{}", "Dialect capabilities".cyan().bold());
    println!();

    let rows: [(&str, fn(Dialect) -> bool); 10] = [
        ("DISTINCT ON", |d| d.generator().supports_distinct_on()),
        ("NULLS FIRST/LAST", |d| d.generator().supports_nulls_ordering()),
        ("Aggregate FILTER", |d| d.generator().supports_aggregate_filter()),
        ("FULL JOIN", |d| d.generator().supports_join(JoinKind::Full)),
        ("INTERSECT/EXCEPT ALL", |d| {
            d.generator().supports_set_operation(SetOperation::IntersectAll)
        }),
        ("JSON paths", |d| {
            JsonPath::key("k")
                .map(|path| d.generator().json_access("c", &path).is_ok())
                .unwrap_or(false)
        }),
        ("Vector distance", |d| {
            d.generator()
                .binary_expr("a", BinaryOp::L2Distance, "b")
                .is_ok()
        }),
        ("Row locking", |d| d.generator().lock_clause(LockMode::for_update()).is_ok()),
        ("Numbered placeholders", |d| d.generator().numbered_placeholder(1).is_ok()),
        ("Upsert", |d| d.generator().upsert_style() != UpsertStyle::Unsupported),
    ];

    print!("{:<24}", "");
    for dialect in Dialect::ALL {
        print!("{:<12}", dialect.to_string().bold());
    }
    println!();

    for (feature, supported) in rows {
        print!("{:<24}", feature);
        for dialect in Dialect::ALL {
            let mark = if supported(dialect) {
                "yes".green()
            } else {
                "no".red()
            };
            print!("{:<12}", mark);
        }
        println!();
    }

    print!("{:<24}", "Affected rows");
    for dialect in Dialect::ALL {
        let style = match dialect.generator().returning_style() {
            ReturningStyle::Returning => "RETURNING".green(),
            ReturningStyle::Output => "OUTPUT".yellow(),
            ReturningStyle::Unsupported => "no".red(),
        };
        print!("{:<12}", style);
    }
    println!();
}
