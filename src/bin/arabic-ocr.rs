//! CLI binary for arabic-ocr.
//!
//! A thin shim over the library crate that maps CLI flags to `OcrConfig`
//! and prints results.

use anyhow::{bail, Context, Result};
use arabic_ocr::{
    export_report, transliterate, ErrorResponse, OcrConfig, OcrConfigBuilder, OcrPipeline,
    OcrProgressCallback, ProgressCallback, Translator,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar over engine calls. Calls finish out of order, so the bar
/// counts completions rather than tracking positions.
struct CliProgressCallback {
    bar: ProgressBar,
    engines_per_page: usize,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new(engines_per_page: usize) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Rendering pages…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            engines_per_page,
            errors: AtomicUsize::new(0),
        })
    }
}

impl OcrProgressCallback for CliProgressCallback {
    fn on_ocr_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} calls  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length((total_pages * self.engines_per_page) as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Recognising");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Running OCR on {total_pages} page(s)…"))
        ));
    }

    fn on_engine_complete(&self, page: usize, total: usize, engine: &str, chars: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            page,
            total,
            engine,
            dim(&format!("{chars:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_engine_error(&self, page: usize, total: usize, engine: &str, message: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg: String = if message.chars().count() > 80 {
            format!("{}…", message.chars().take(79).collect::<String>())
        } else {
            message.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<12}  {}",
            red("✗"),
            page,
            total,
            engine,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_ocr_complete(&self, total_pages: usize, failed_calls: usize) {
        self.bar.finish_and_clear();
        if failed_calls == 0 {
            eprintln!("{} {} page(s) recognised", green("✔"), bold(&total_pages.to_string()));
        } else {
            eprintln!(
                "{} {} page(s) recognised  ({} engine call(s) failed)",
                cyan("⚠"),
                bold(&total_pages.to_string()),
                red(&failed_calls.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Offline engine, text to stdout
  arabic-ocr ocr scan.pdf

  # Both engines, written to a file
  arabic-ocr ocr --engine both scan.pdf -o scan.txt

  # JSON response ({"success", "text", "upload_id"})
  arabic-ocr ocr --engine mistral --json page.jpg

  # Translate and transliterate the result
  arabic-ocr translate --target fr - < scan.txt
  arabic-ocr transliterate - < scan.txt

  # DOCX report (use a .md target for Markdown)
  arabic-ocr export --arabic scan.txt --translation scan.en.txt -o report.docx

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY           Mistral API key (engine "mistral")
  OPENAI_API_KEY            OpenAI API key (translation)
  PDFIUM_LIB_PATH           Path to libpdfium (file or directory)
  ARABIC_OCR_WORKSPACE_DIR  Root for per-request scratch directories
"#;

/// Extract, translate and transliterate text from scanned Arabic documents.
#[derive(Parser, Debug)]
#[command(
    name = "arabic-ocr",
    version,
    about = "Extract text from scanned Arabic PDFs and images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "ARABIC_OCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "ARABIC_OCR_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run OCR over a PDF or image.
    Ocr(OcrArgs),
    /// Translate Arabic text.
    Translate(TranslateArgs),
    /// Transliterate Arabic text into Latin script.
    Transliterate(TextArg),
    /// Write a DOCX or Markdown report from text files.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct OcrArgs {
    /// PDF, PNG, JPG or JPEG file.
    input: PathBuf,

    /// Engine selection: qari, mistral or both.
    #[arg(short, long, env = "ARABIC_OCR_ENGINE", default_value = "qari")]
    engine: String,

    /// Write the text to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the JSON response instead of plain text.
    #[arg(long)]
    json: bool,

    /// Number of concurrent engine calls.
    #[arg(short, long, env = "ARABIC_OCR_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Root directory for per-request workspaces.
    #[arg(long, env = "ARABIC_OCR_WORKSPACE_DIR")]
    workspace_dir: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "ARABIC_OCR_PASSWORD")]
    password: Option<String>,

    /// Remote API timeout in seconds.
    #[arg(long, env = "ARABIC_OCR_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Longest edge of a rendered PDF page, in pixels.
    #[arg(long, env = "ARABIC_OCR_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Mistral model ID.
    #[arg(long, env = "ARABIC_OCR_MISTRAL_MODEL")]
    mistral_model: Option<String>,

    /// Keep the remote engine output exactly as returned.
    #[arg(long)]
    raw: bool,

    /// Disable progress bar.
    #[arg(long, env = "ARABIC_OCR_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct TextArg {
    /// Text to process, or `-` (default) to read stdin.
    #[arg(default_value = "-")]
    text: String,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Target language (ISO 639-1 code).
    #[arg(short, long, default_value = "en")]
    target: String,

    /// Translation model ID.
    #[arg(long, env = "ARABIC_OCR_TRANSLATION_MODEL")]
    model: Option<String>,

    #[command(flatten)]
    text: TextArg,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// File holding the extracted Arabic text.
    #[arg(long)]
    arabic: PathBuf,

    /// File holding the translation.
    #[arg(long)]
    translation: Option<PathBuf>,

    /// File holding the transliteration.
    #[arg(long)]
    transliteration: Option<PathBuf>,

    /// Report path. `.md` writes Markdown, anything else DOCX.
    #[arg(short, long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would interleave with the progress bar, which already gives
    // the feedback that matters.
    let show_progress = match &cli.command {
        Command::Ocr(args) => !cli.quiet && !args.no_progress && !args.json,
        _ => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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
        Command::Ocr(args) => run_ocr(args, show_progress, cli.quiet).await,
        Command::Translate(args) => run_translate(args).await,
        Command::Transliterate(arg) => {
            let text = read_text(&arg.text)?;
            write_stdout(&transliterate(&text))
        }
        Command::Export(args) => run_export(args, cli.quiet).await,
    }
}

async fn run_ocr(args: OcrArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let engines_per_page = if args.engine.trim().eq_ignore_ascii_case("both") {
        2
    } else {
        1
    };
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(engines_per_page) as Arc<dyn OcrProgressCallback>)
    } else {
        None
    };

    let config = build_config(&args, progress)?;
    let pipeline = OcrPipeline::new(config).context("Failed to set up the OCR pipeline")?;

    let doc = match pipeline.process_file(&args.input, &args.engine).await {
        Ok(doc) => doc,
        Err(e) if args.json => {
            let body = serde_json::to_string_pretty(&ErrorResponse::from(&e))
                .context("Failed to serialise error response")?;
            println!("{body}");
            bail!(e);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("OCR failed for {}", args.input.display()))
        }
    };

    let rendered = if args.json {
        serde_json::to_string_pretty(&doc).context("Failed to serialise output")?
    } else {
        doc.text.clone()
    };

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, with_newline(&rendered))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{}  {} page(s)  {}ms  →  {}",
                    green("✔"),
                    doc.stats.total_pages,
                    doc.stats.total_duration_ms,
                    bold(&path.display().to_string()),
                );
            }
        }
        None => write_stdout(&rendered)?,
    }

    if !quiet && !show_progress && !args.json {
        eprintln!(
            "Recognised {} page(s) with {} engine call(s) ({} failed) in {}ms",
            doc.stats.total_pages,
            doc.stats.engine_calls,
            doc.stats.failed_engine_calls,
            doc.stats.total_duration_ms
        );
    }
    Ok(())
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut builder = OcrConfig::builder().with_env();
    if let Some(model) = &args.model {
        builder = builder.translation_model(model);
    }
    let config = builder.build()?;
    let translator = Translator::new(&config.translation)?;

    let text = read_text(&args.text.text)?;
    let translated = translator
        .translate(&text, &args.target)
        .await
        .context("Translation failed")?;
    write_stdout(&translated)
}

async fn run_export(args: ExportArgs, quiet: bool) -> Result<()> {
    let arabic = read_file(&args.arabic).await?;
    let translation = match &args.translation {
        Some(p) => Some(read_file(p).await?),
        None => None,
    };
    let transliteration = match &args.transliteration {
        Some(p) => Some(read_file(p).await?),
        None => None,
    };

    let format = export_report(
        &args.output,
        &arabic,
        translation.as_deref(),
        transliteration.as_deref(),
    )
    .await
    .context("Export failed")?;

    if !quiet {
        eprintln!(
            "{} {:?} report written to {}",
            green("✔"),
            format,
            bold(&args.output.display().to_string())
        );
    }
    Ok(())
}

/// Map CLI args to `OcrConfig`.
fn build_config(args: &OcrArgs, progress: Option<ProgressCallback>) -> Result<OcrConfig> {
    let mut builder: OcrConfigBuilder = OcrConfig::builder()
        .with_env()
        .concurrency(args.concurrency)
        .api_timeout_secs(args.api_timeout)
        .max_rendered_pixels(args.max_pixels)
        .clean_output(!args.raw);

    if let Some(dir) = &args.workspace_dir {
        builder = builder.workspace_root(dir);
    }
    if let Some(pwd) = &args.password {
        builder = builder.password(pwd);
    }
    if let Some(model) = &args.mistral_model {
        builder = builder.mistral_model(model);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn read_text(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        Ok(arg.to_string())
    }
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn with_newline(s: &str) -> String {
    if s.ends_with('\n') {
        s.to_string()
    } else {
        format!("{s}\n")
    }
}

fn write_stdout(s: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(with_newline(s).as_bytes())
        .context("Failed to write to stdout")
}
