//! Run entry points: load → segment → orient → write.
//!
//! [`crop`] is what the CLI calls. [`crop_with_recognizer`] is the same run
//! with a caller-supplied OCR engine, and [`crop_page`] processes a single
//! already-decoded page against a shared [`OutputWriter`], for callers that
//! source pages themselves. [`inspect`] stops after segmentation.

use crate::config::CropConfig;
use crate::error::AutocropError;
use crate::output::{CropOutput, CropStats, InputSummary, PageSummary, SavedImage};
use crate::pipeline::ocr::{TesseractCli, TextRecognizer};
use crate::pipeline::write::{trim_border, OutputWriter};
use crate::pipeline::{input, orient, segment};
use image::DynamicImage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract, orient and save every sub-image of `input_path`.
///
/// OCR runs through the `tesseract` executable named in the config, which is
/// probed before any page is touched.
///
/// # Errors
/// Returns `Err(AutocropError)` for any fatal condition: missing or
/// unreadable input, decode/rasterisation failure, OCR engine unavailable,
/// or an output file that cannot be written.
pub fn crop(
    input_path: impl AsRef<Path>,
    config: &CropConfig,
) -> Result<CropOutput, AutocropError> {
    let recognizer = TesseractCli::from_config(config);
    let version = recognizer.probe()?;
    info!("Using OCR engine: {}", version);
    crop_with_recognizer(input_path, config, &recognizer)
}

/// Like [`crop`], but reading header bars with `recognizer`.
pub fn crop_with_recognizer(
    input_path: impl AsRef<Path>,
    config: &CropConfig,
    recognizer: &dyn TextRecognizer,
) -> Result<CropOutput, AutocropError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting run: {}", input_path.display());

    // ── Step 1: Resolve and load ─────────────────────────────────────────
    let doc = input::resolve_input(input_path)?;
    let pages = input::load_pages(&doc, config)?;
    let total_pages = pages.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total_pages);
    }

    // ── Step 2: Process pages in order with one shared counter ───────────
    let mut writer = OutputWriter::create(config)?;
    let mut images = Vec::new();
    let mut empty_pages = 0;

    for (idx, page) in pages.into_iter().enumerate() {
        let page_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let saved = crop_page(&page, page_num, config, recognizer, &mut writer)?;
        if saved.is_empty() {
            empty_pages += 1;
        }
        images.extend(saved);
    }

    // ── Step 3: Report ───────────────────────────────────────────────────
    let oriented = images.iter().filter(|i| i.orientation_detected()).count();
    let stats = CropStats {
        total_pages,
        empty_pages,
        saved_images: images.len(),
        oriented_images: oriented,
        fallback_images: images.len() - oriented,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Processing complete. Saved {} final image(s) from {} page(s) in {}ms",
        stats.saved_images, stats.total_pages, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(stats.saved_images);
    }

    Ok(CropOutput { images, stats })
}

/// Segment one page and write each sub-image through `writer`.
///
/// `page_num` is 1-based and only used for reporting.
pub fn crop_page(
    page: &DynamicImage,
    page_num: usize,
    config: &CropConfig,
    recognizer: &dyn TextRecognizer,
    writer: &mut OutputWriter,
) -> Result<Vec<SavedImage>, AutocropError> {
    let regions = segment::find_regions(page, config);
    if let Some(ref cb) = config.progress_callback {
        cb.on_regions_found(page_num, regions.len());
    }

    if regions.is_empty() {
        warn!(
            "No images found on page {} (or settings are wrong). Skipping.",
            page_num
        );
        return Ok(Vec::new());
    }

    let mut saved = Vec::with_capacity(regions.len());

    for region in regions {
        info!(
            "Page {}: found sub-image at {} (WxH: {}x{})",
            page_num, region, region.width, region.height
        );
        let sub_image = segment::crop_region(page, &region);

        let orientation = orient::detect_orientation(&sub_image, config, recognizer);
        if orientation.detected() {
            info!(
                "Detected rotation: {} degrees",
                orientation.rotation.degrees()
            );
        } else {
            info!("Could not detect orientation. Using original orientation.");
        }

        let mut upright = orientation.rotation.apply(&sub_image);
        if config.trim_border {
            upright = trim_border(&upright);
        }

        let (index, path) = writer.write(&upright)?;
        info!("Saved to: {}", path.display());

        if let Some(ref cb) = config.progress_callback {
            cb.on_image_saved(
                index,
                &path,
                orientation.rotation.degrees(),
                orientation.detected(),
            );
        }

        saved.push(SavedImage {
            index,
            page: page_num,
            region,
            rotation_degrees: orientation.rotation.degrees(),
            header_text: orientation.header_text,
            path,
            width: upright.width(),
            height: upright.height(),
        });
    }

    Ok(saved)
}

/// Load and segment `input_path` without OCR or writing anything.
pub fn inspect(
    input_path: impl AsRef<Path>,
    config: &CropConfig,
) -> Result<InputSummary, AutocropError> {
    let doc = input::resolve_input(input_path)?;
    let pages = input::load_pages(&doc, config)?;

    let pages = pages
        .iter()
        .enumerate()
        .map(|(idx, page)| {
            let regions = segment::find_regions(page, config);
            debug!("Page {}: {} region(s)", idx + 1, regions.len());
            PageSummary {
                page: idx + 1,
                width: page.width(),
                height: page.height(),
                regions,
            }
        })
        .collect();

    Ok(InputSummary {
        path: doc.path,
        kind: doc.kind,
        pages,
    })
}
