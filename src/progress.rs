//! Progress-callback trait for per-page and per-image events.
//!
//! Inject an [`Arc<dyn CropProgressCallback>`] via
//! [`crate::config::CropConfigBuilder::progress_callback`] to receive events
//! as the pipeline walks the input. The CLI uses it to drive a terminal
//! progress bar; library callers can forward events wherever they like.
//!
//! # Example
//!
//! ```rust
//! use autocrop::{CropConfig, CropProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl CropProgressCallback for CountingCallback {
//!     fn on_image_saved(&self, index: usize, path: &Path, _rotation: u16, _detected: bool) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("#{index} → {}", path.display());
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { saved: AtomicUsize::new(0) });
//! let config = CropConfig::builder()
//!     .progress_callback(cb as Arc<dyn CropProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it processes each page and sub-image.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is sequential, so events arrive in
/// order; the `Send + Sync` bound lets the config itself be shared.
pub trait CropProgressCallback: Send + Sync {
    /// Called once after the input is loaded, before any page is segmented.
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is segmented (`page_num` is 1-indexed).
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once the regions of a page are known.
    fn on_regions_found(&self, page_num: usize, count: usize) {
        let _ = (page_num, count);
    }

    /// Called after each output JPEG is written.
    ///
    /// # Arguments
    /// * `index`   : output counter value used in the file name
    /// * `path`    : where the JPEG was written
    /// * `rotation`: counter-clockwise degrees applied (0, 90, 180, 270)
    /// * `detected`: `false` when no header bar was found and 0° was assumed
    fn on_image_saved(&self, index: usize, path: &Path, rotation: u16, detected: bool) {
        let _ = (index, path, rotation, detected);
    }

    /// Called once after every page has been processed.
    fn on_run_complete(&self, saved: usize) {
        let _ = saved;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl CropProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CropConfig`].
pub type ProgressCallback = Arc<dyn CropProgressCallback>;
