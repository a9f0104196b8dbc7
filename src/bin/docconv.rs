//! CLI binary for edgequake-docconv.
//!
//! A thin shim over the library crate: `serve` maps flags to
//! `ServerConfig` and runs the HTTP service, `convert` runs one local
//! conversion through the same `Converter`.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_docconv::{
    serve, AppState, Conversion, ConversionStats, Converter, DocumentFormat, ServerConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on the default port
  docconv serve

  # Custom port and directories, keep files for inspection
  docconv serve --listen 127.0.0.1:8080 --uploads-dir /tmp/up --retain-files

  # Convert a local PDF (writes report.docx next to it)
  docconv convert report.pdf

  # Convert a Word document to a chosen path, print stats as JSON
  docconv convert notes.docx -o out/notes.pdf --json

HTTP ENDPOINTS:
  POST /convert-pdf-to-word   multipart field `file` (.pdf)  → DOCX attachment
  POST /convert-word-to-pdf   multipart field `file` (.docx) → PDF attachment
  GET  /health                liveness probe
  GET  /*                     static files from --static-dir

Failed conversions return a short plain-text message; the failure class is
in the `x-error-code` response header.
"#;

/// Convert documents between PDF and DOCX.
#[derive(Parser, Debug)]
#[command(
    name = "docconv",
    version,
    about = "Convert documents between PDF and DOCX, over HTTP or locally",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCCONV_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP conversion service.
    Serve(ServeArgs),
    /// Convert one local file.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "DOCCONV_LISTEN", default_value = "0.0.0.0:3000")]
    listen: SocketAddr,

    /// Directory for raw uploads.
    #[arg(long, env = "DOCCONV_UPLOADS_DIR", default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Directory for converted artifacts.
    #[arg(long, env = "DOCCONV_CONVERTED_DIR", default_value = "converted")]
    converted_dir: PathBuf,

    /// Directory of static frontend files.
    #[arg(long, env = "DOCCONV_STATIC_DIR", default_value = "public")]
    static_dir: PathBuf,

    /// Maximum upload size in MiB.
    #[arg(long, env = "DOCCONV_MAX_UPLOAD_MB", default_value_t = 50,
          value_parser = clap::value_parser!(u64).range(1..=4096))]
    max_upload_mb: u64,

    /// Per-request conversion timeout in seconds.
    #[arg(long, env = "DOCCONV_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Keep uploads and artifacts on disk after each response.
    #[arg(long, env = "DOCCONV_RETAIN_FILES")]
    retain_files: bool,

    /// Require a .docx extension on the Word→PDF endpoint too.
    #[arg(long, env = "DOCCONV_STRICT_INTAKE")]
    strict_intake: bool,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input .pdf or .docx file.
    input: PathBuf,

    /// Output path. Default: the input path with the target extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target format. Default: inferred from the input extension.
    #[arg(long, value_enum)]
    to: Option<FormatArg>,

    /// Print ConversionStats as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Conversion timeout in seconds.
    #[arg(long, env = "DOCCONV_TIMEOUT", default_value_t = 120)]
    timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Pdf,
    Docx,
}

impl From<FormatArg> for DocumentFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Pdf => DocumentFormat::Pdf,
            FormatArg::Docx => DocumentFormat::Docx,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers one-shot conversions; INFO logs would tear it.
    let quiet_logs = cli.quiet || matches!(cli.command, Command::Convert(_));
    let filter = if cli.verbose {
        "debug"
    } else if quiet_logs {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Convert(args) => run_convert(args, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig::builder()
        .listen_addr(args.listen)
        .uploads_dir(args.uploads_dir)
        .converted_dir(args.converted_dir)
        .static_dir(args.static_dir)
        .max_upload_bytes((args.max_upload_mb as usize) * 1024 * 1024)
        .request_timeout_secs(args.timeout)
        .retain_files(args.retain_files)
        .strict_intake(args.strict_intake)
        .build()
        .context("Invalid server configuration")?;

    serve(AppState::new(config))
        .await
        .context("Server failed")?;
    Ok(())
}

async fn run_convert(args: ConvertArgs, quiet: bool) -> Result<()> {
    let conversion = resolve_conversion(&args.input, args.to)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(conversion.target().extension()));

    if args.timeout == 0 {
        bail!("--timeout must be at least 1 second");
    }
    let converter = Converter::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build();

    let spinner = (!quiet && !args.json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.set_message(format!("{} ({})", args.input.display(), conversion));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = converter
        .convert_to_file(conversion, &args.input, &output)
        .await;
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let stats = result.with_context(|| format!("Failed to convert {}", args.input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !quiet {
        print_summary(&stats, &output);
    }
    Ok(())
}

/// `--to` wins; otherwise the input extension picks the direction.
fn resolve_conversion(input: &Path, to: Option<FormatArg>) -> Result<Conversion> {
    if let Some(target) = to {
        return Ok(Conversion::to(target.into()));
    }
    let name = input.to_string_lossy();
    match DocumentFormat::from_filename(&name) {
        Some(source) => Ok(Conversion::from_source(source)),
        None => bail!(
            "Cannot infer conversion from '{}': expected a .pdf or .docx file, or pass --to",
            input.display()
        ),
    }
}

fn print_summary(stats: &ConversionStats, output: &Path) {
    eprintln!(
        "{}  {}  {}ms  →  {}",
        green("✔"),
        stats.conversion,
        stats.total_duration_ms,
        bold(&output.display().to_string()),
    );
    let detail = match stats.paragraphs {
        Some(n) => format!(
            "{} chars, {} paragraphs, {} → {} bytes",
            stats.extracted_chars, n, stats.input_bytes, stats.output_bytes
        ),
        None => format!(
            "{} chars, {} → {} bytes",
            stats.extracted_chars, stats.input_bytes, stats.output_bytes
        ),
    };
    eprintln!("   {}", dim(&detail));
}
