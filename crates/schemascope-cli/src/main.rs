//! schemascope CLI - Read-only database schema introspection and rendering.

use clap::{Parser, Subcommand};
use schemascope::{
    AdapterResolver, Config, ConnectionHandler, HtmlRenderer, IntrospectError, JsonRenderer,
    MysqlConnection, OutputFormat, Renderer, Visualizer,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "schemascope")]
#[command(about = "Read-only database schema introspection")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect a database and render its schema
    Render {
        /// Output format: json or html [default: visualization.default_format]
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Render this database instead of the configured one
        #[arg(long)]
        database: Option<String>,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Allow rendering even if visualization.enabled is false
        #[arg(long)]
        enable: bool,
    },

    /// List table names
    Tables {
        /// List tables of this database instead of the configured one
        #[arg(long)]
        database: Option<String>,
    },

    /// List databases visible to the connection
    Databases,

    /// Test the database connection and report engine capabilities
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), IntrospectError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(IntrospectError::Config)?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    // Refuse before opening a connection
    if let Commands::Render { format, enable, .. } = &cli.command {
        if !(*enable || config.visualization.enabled) {
            let format = format.unwrap_or(config.visualization.default_format);
            return Err(IntrospectError::visualization_disabled(format.as_str()));
        }
    }

    // An explicit --database binds the handler so no default is required
    let database = match &cli.command {
        Commands::Render { database, .. } | Commands::Tables { database } => {
            database.as_deref().or(config.connection.database.as_deref())
        }
        Commands::Databases | Commands::HealthCheck => config.connection.database.as_deref(),
    };

    let resolver = AdapterResolver::with_builtins();
    let connection = open_connection(&config, &resolver).await?;
    let started = Instant::now();
    let result = ConnectionHandler::new(connection.clone(), database, &resolver).await;

    let handler = match result {
        Ok(handler) => Arc::new(handler),
        Err(e) => {
            connection.close().await;
            return Err(e);
        }
    };
    let latency_ms = started.elapsed().as_millis() as u64;

    let outcome = execute(&cli, &config, handler, latency_ms).await;
    connection.close().await;
    outcome
}

async fn execute(
    cli: &Cli,
    config: &Config,
    handler: Arc<ConnectionHandler>,
    latency_ms: u64,
) -> Result<(), IntrospectError> {
    match &cli.command {
        Commands::Render {
            format,
            database,
            output,
            pretty,
            enable: _,
        } => {
            let format = format.unwrap_or(config.visualization.default_format);
            let renderer: Box<dyn Renderer> = match format {
                OutputFormat::Json => Box::new(
                    JsonRenderer::new().pretty(*pretty || config.visualization.pretty),
                ),
                // A static file has no host to answer the switcher
                OutputFormat::Html if output.is_some() => Box::new(HtmlRenderer::new()),
                OutputFormat::Html => Box::new(
                    HtmlRenderer::new().with_databases(handler.available_databases().await?),
                ),
            };

            let schema = handler.schema(database.as_deref()).await?;
            let mut visualizer = Visualizer::new(schema).with_handler(handler.clone());
            visualizer.enable();

            let rendered = visualizer
                .render_for(renderer.as_ref(), database.as_deref())
                .await?;

            match output {
                Some(path) => {
                    std::fs::write(path, &rendered)?;
                    info!(
                        "Wrote {} output ({}) to {:?}",
                        renderer.name(),
                        renderer.mime_type(),
                        path
                    );
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Tables { database } => {
            let names = handler
                .introspector()
                .table_names(database.as_deref())
                .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in &names {
                    println!("{}", name);
                }
            }
        }

        Commands::Databases => {
            let names = handler.available_databases().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in &names {
                    let marker = if name == handler.database() { "*" } else { " " };
                    println!("{} {}", marker, name);
                }
            }
        }

        Commands::HealthCheck => {
            let capabilities = handler.capabilities().await;

            if cli.output_json {
                let result = serde_json::json!({
                    "healthy": true,
                    "engine": handler.engine(),
                    "database": handler.database(),
                    "latency_ms": latency_ms,
                    "capabilities": capabilities,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!("  Connection: OK ({}ms)", latency_ms);
                println!("  Engine: {} {}", capabilities.engine, capabilities.version);
                println!("  Database: {}", handler.database());
                println!(
                    "  Foreign keys: {}",
                    yes_no(capabilities.supports_foreign_keys)
                );
                println!("  Views: {}", yes_no(capabilities.supports_views));
                println!(
                    "  Check constraints: {}",
                    yes_no(capabilities.supports_check_constraints)
                );
                println!(
                    "  Max identifier length: table {}, column {}, index {}",
                    capabilities.max_table_name_length,
                    capabilities.max_column_name_length,
                    capabilities.max_index_name_length
                );
            }
        }
    }

    Ok(())
}

/// Open a pool for the configured connection type.
async fn open_connection(
    config: &Config,
    resolver: &AdapterResolver,
) -> Result<Arc<MysqlConnection>, IntrospectError> {
    match config.connection.r#type.to_lowercase().as_str() {
        "mysql" | "mariadb" => Ok(Arc::new(MysqlConnection::connect(&config.connection).await?)),
        other => Err(IntrospectError::UnsupportedEngine {
            engine: other.to_string(),
            supported: resolver.identifiers(),
        }),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown verbosity '{}'", other)),
    };

    // Logs go to stderr so rendered output on stdout stays clean
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}'", other)),
    }

    Ok(())
}
