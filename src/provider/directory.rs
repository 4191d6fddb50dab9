//! Provider reading datasets from a directory tree.
//!
//! ```text
//! <root>/<dataset>/process.json
//! <root>/<dataset>/*.png | *.jpg | ...
//! ```

use std::path::{Path, PathBuf};

use crate::constants::PROCESS_FILE_NAME;
use crate::error::AnnotationError;
use crate::model::{ImageRecord, ProcessDescriptor};
use crate::provider::DatasetProvider;

/// Image file extensions picked up from a dataset directory (lowercase).
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Reads `<root>/<dataset>/` from the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl DatasetProvider for DirectoryProvider {
    fn fetch_images(&self, dataset: &str) -> Result<Vec<ImageRecord>, AnnotationError> {
        let dir = self.dataset_dir(dataset);
        let entries = std::fs::read_dir(&dir).map_err(|e| {
            AnnotationError::fetch_failed(format!("cannot read {:?}: {}", dir, e))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| AnnotationError::fetch_failed(format!("non UTF-8 filename {:?}", path)))?
                .to_string();
            let pixels = image::open(&path)
                .map_err(|e| AnnotationError::fetch_failed(format!("failed to decode {:?}: {}", path, e)))?
                .to_rgba8();
            log::trace!("Loaded {} ({}x{})", filename, pixels.width(), pixels.height());
            images.push(ImageRecord::new(filename, pixels));
        }

        log::info!("Loaded {} images for dataset '{}'", images.len(), dataset);
        Ok(images)
    }

    fn fetch_process(&self, dataset: &str) -> Result<ProcessDescriptor, AnnotationError> {
        let path = self.dataset_dir(dataset).join(PROCESS_FILE_NAME);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            AnnotationError::fetch_failed(format!("cannot read {:?}: {}", path, e))
        })?;
        ProcessDescriptor::from_json(&json)
    }
}
