//! CLI binary for autocrop.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `CropConfig` and prints results.

use anyhow::{Context, Result};
use autocrop::{
    crop, inspect, CropConfig, CropOutput, CropProgressCallback, InputSummary, ProgressCallback,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a page progress bar plus one log line per
/// saved sub-image.
struct CliProgressCallback {
    bar: ProgressBar,
    undetected: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_run_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            undetected: AtomicUsize::new(0),
        })
    }

    /// Clear the bar when the run ends in an error.
    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Cropping");
    }
}

impl CropProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        if page_num > 1 {
            self.bar.inc(1);
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_regions_found(&self, page_num: usize, count: usize) {
        if count == 0 {
            self.bar.println(format!(
                "  {} Page {:>3}  {}",
                yellow("–"),
                page_num,
                dim("no sub-images found")
            ));
        }
    }

    fn on_image_saved(&self, index: usize, path: &Path, rotation: u16, detected: bool) {
        let how = if detected {
            green(&format!("{rotation:>3}°"))
        } else {
            self.undetected.fetch_add(1, Ordering::SeqCst);
            yellow("  ?°")
        };
        self.bar.println(format!(
            "  {} #{:<3} {}  {}",
            green("✓"),
            index,
            how,
            dim(&path.display().to_string()),
        ));
    }

    fn on_run_complete(&self, saved: usize) {
        self.bar.finish_and_clear();
        let undetected = self.undetected.load(Ordering::SeqCst);
        if undetected == 0 {
            eprintln!("{} {} image(s) saved", green("✔"), bold(&saved.to_string()));
        } else {
            eprintln!(
                "{} {} image(s) saved  ({} without a header bar, left unrotated)",
                cyan("⚠"),
                bold(&saved.to_string()),
                yellow(&undetected.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split a scanned album page into final_image_1.jpg, final_image_2.jpg, …
  autocrop page.png

  # Every page of a PDF, into a separate folder
  autocrop album.pdf -o crops/

  # See what would be cut without running OCR or writing files
  autocrop --inspect-only album.pdf

  # Machine-readable report
  autocrop --json album.pdf > report.json

REQUIREMENTS:
  tesseract   OCR engine used to read header bars (https://github.com/tesseract-ocr/tesseract)
  pdfium      only for PDF input; set PDFIUM_LIB_PATH=/path/to/libpdfium if it is not
              installed system-wide or in the working directory

HOW ORIENTATION WORKS:
  Each picture is tried at 0°, 90°, 180° and 270°. If the top strip is dark, it is read
  with OCR; the rotation giving the longest multi-word text wins (ties: smallest angle).
  Pictures with no readable dark header bar are saved unrotated.
"#;

/// Extract sub-images from a scanned image or PDF and save each upright as JPEG.
#[derive(Parser, Debug)]
#[command(
    name = "autocrop",
    version,
    about = "Extract sub-images from a scanned image or PDF, rotate them upright, save as JPEG",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the input file (PDF, PNG, or JPG).
    input_file: PathBuf,

    /// Directory for the output JPEGs.
    #[arg(short, long, env = "AUTOCROP_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Output file name prefix.
    #[arg(long, env = "AUTOCROP_PREFIX", default_value = "final_image_")]
    prefix: String,

    /// PDF rasterisation DPI (72–600).
    #[arg(long, env = "AUTOCROP_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "AUTOCROP_PASSWORD")]
    password: Option<String>,

    /// Luma above which a pixel is page background (0–255).
    #[arg(long, env = "AUTOCROP_THRESHOLD", default_value_t = 200)]
    threshold: u8,

    /// Minimum contour area, in px², for a sub-image.
    #[arg(long, env = "AUTOCROP_MIN_AREA", default_value_t = 5000.0)]
    min_area: f64,

    /// Height of the header strip as a fraction of the picture height.
    #[arg(long, env = "AUTOCROP_HEADER_FRACTION", default_value_t = 0.10)]
    header_fraction: f32,

    /// Mean strip luma below which the strip counts as a dark header bar.
    #[arg(long, env = "AUTOCROP_DARK_MEAN", default_value_t = 100.0)]
    dark_mean: f32,

    /// JPEG quality (1–100).
    #[arg(long, env = "AUTOCROP_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Keep white margins instead of trimming them.
    #[arg(long, env = "AUTOCROP_NO_TRIM")]
    no_trim: bool,

    /// Tesseract executable.
    #[arg(long, env = "AUTOCROP_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// OCR language(s), as passed to tesseract `-l`.
    #[arg(long, env = "AUTOCROP_LANG", default_value = "eng")]
    lang: String,

    /// List pages and detected regions only; no OCR, no output files.
    #[arg(long)]
    inspect_only: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "AUTOCROP_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "AUTOCROP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "AUTOCROP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "AUTOCROP_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs; verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    let cli_progress = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn CropProgressCallback>);

    clear_on_error(
        run(&cli, progress_cb, show_progress),
        cli_progress.as_deref(),
    )
}

/// A failed run never reaches `on_run_complete`, so the spinner is cleared
/// here before the error is printed.
fn clear_on_error<T>(result: Result<T>, progress: Option<&CliProgressCallback>) -> Result<T> {
    if result.is_err() {
        if let Some(cb) = progress {
            cb.abandon();
        }
    }
    result
}

fn run(cli: &Cli, progress_cb: Option<ProgressCallback>, show_progress: bool) -> Result<()> {
    let config = build_config(cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let summary = inspect(&cli.input_file, &config).context("Failed to inspect input")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
            );
        } else {
            print_summary(&summary);
        }
        return Ok(());
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let output = crop(&cli.input_file, &config).context("Processing failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise report")?
        );
    } else if !cli.quiet && !show_progress {
        print_report(&output);
    }

    Ok(())
}

/// Map CLI args to `CropConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<CropConfig> {
    let mut builder = CropConfig::builder()
        .dpi(cli.dpi)
        .foreground_threshold(cli.threshold)
        .min_region_area(cli.min_area)
        .header_fraction(cli.header_fraction)
        .dark_mean_max(cli.dark_mean)
        .jpeg_quality(cli.quality)
        .trim_border(!cli.no_trim)
        .tesseract_cmd(&cli.tesseract)
        .ocr_lang(&cli.lang)
        .output_dir(&cli.output_dir)
        .file_prefix(&cli.prefix);

    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(summary: &InputSummary) {
    println!("File:     {}", summary.path.display());
    println!("Kind:     {:?}", summary.kind);
    println!("Pages:    {}", summary.pages.len());
    println!("Regions:  {}", summary.region_count());
    for page in &summary.pages {
        println!(
            "  page {:>3}  {}x{} px  {} region(s)",
            page.page,
            page.width,
            page.height,
            page.regions.len()
        );
        for region in &page.regions {
            println!("      {}", region);
        }
    }
}

fn print_report(output: &CropOutput) {
    for image in &output.images {
        let how = match image.header_text {
            Some(ref text) => format!("{}° ({text:?})", image.rotation_degrees),
            None => "0° (no header bar)".to_string(),
        };
        eprintln!(
            "#{:<3} page {:<3} {:<16} → {}",
            image.index,
            image.page,
            image.region.to_string(),
            how
        );
    }
    eprintln!(
        "Saved {} final image(s) from {} page(s) in {}ms",
        output.stats.saved_images, output.stats.total_pages, output.stats.total_duration_ms
    );
}
