use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::{Stream, StreamExt};
use gcf_table::config::Config;
use gcf_table::gcp::client::GcpClient;
use gcf_table::{functions_table, ErrorKind, Row, Scope};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Query Google Cloud Functions as table rows
#[derive(Parser, Debug)]
#[command(name = "gcf-table", version, about, long_about = None)]
struct Args {
    /// GCP project to query
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Columns to return (comma separated); all columns when omitted
    #[arg(short, long, value_delimiter = ',', global = true)]
    columns: Vec<String>,

    /// Rows evaluated concurrently while listing
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every function in the project, across all locations
    List,
    /// Fetch one function by its fully-qualified name
    Get {
        /// projects/{project}/locations/{location}/functions/{function}
        name: String,
    },
    /// Describe the table's columns
    Columns,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcf-table started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcf-table").join("gcf-table.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcf-table").join("gcf-table.log");
    }
    PathBuf::from("gcf-table.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_guard = setup_logging(args.log_level)?;

    if let Err(err) = run(args).await {
        tracing::error!("{:#}", err);
        match err.downcast_ref::<gcf_table::Error>() {
            Some(e) => eprintln!("Error: {}", e.user_message()),
            None => eprintln!("Error: {err:#}"),
        }
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();
    let table = functions_table().with_concurrency(config.effective_concurrency(args.concurrency));

    if let Command::Columns = args.command {
        return print_columns(&table);
    }

    let project = config.effective_project(args.project.as_deref())?.context(
        "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag",
    )?;
    let columns = config.effective_columns(&args.columns);
    let projection = table.projection(&columns[..])?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, cancelling query");
                cancel.cancel();
            }
        });
    }

    let scope = Scope::with_cancel(project, cancel);
    let client = GcpClient::new(config.api_endpoint.as_deref()).await?;

    tracing::info!(query_id = %scope.query_id(), project = scope.project(), "Query start");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::List => {
            let rows = table.list_rows(&client, &scope, projection);
            let (written, failed) =
                write_rows(&mut out, &mut io::stderr(), rows, args.output).await?;
            tracing::info!(
                query_id = %scope.query_id(),
                rows = written,
                failed,
                "Query complete"
            );
            if failed > 0 {
                out.flush()?;
                bail!("{} of {} rows failed", failed, written + failed);
            }
        }
        Command::Get { name } => {
            let row = table.get_row(&client, &scope, &name, &projection).await?;
            write_row(&mut out, &row, args.output)?;
        }
        Command::Columns => {}
    }

    out.flush()?;
    Ok(())
}

/// Write rows as they arrive. A failed row is reported on `err` and skipped;
/// cancellation stops the output. Returns (written, failed).
async fn write_rows<S>(
    out: &mut impl Write,
    err: &mut impl Write,
    mut rows: S,
    format: OutputFormat,
) -> Result<(usize, usize)>
where
    S: Stream<Item = gcf_table::Result<Row>> + Unpin,
{
    let mut written = 0usize;
    let mut failed = 0usize;

    while let Some(row) = rows.next().await {
        match row {
            Ok(row) => {
                write_row(out, &row, format)?;
                written += 1;
            }
            Err(e) if e.kind() == ErrorKind::Cancelled => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Row failed: {}", e);
                writeln!(err, "Error: {}", e.user_message())?;
                failed += 1;
            }
        }
    }

    Ok((written, failed))
}

fn write_row(out: &mut impl Write, row: &Row, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(row)?)?,
        OutputFormat::Yaml => write!(out, "---\n{}", serde_yaml::to_string(row)?)?,
    }
    Ok(())
}

#[derive(Serialize)]
struct ColumnInfo<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    column_type: &'a str,
    nullable: bool,
    hydrate: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a serde_json::Value>,
    description: &'a str,
}

fn print_columns(table: &gcf_table::Table) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for column in table.columns() {
        let info = ColumnInfo {
            name: column.name,
            column_type: column.column_type.as_str(),
            nullable: column.nullable,
            hydrate: column.hydrate.map(|h| h.name()),
            default: column.default.as_ref(),
            description: column.description,
        };
        writeln!(out, "{}", serde_json::to_string(&info)?)?;
    }

    Ok(())
}
