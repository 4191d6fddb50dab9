//! Assembles a session from images and process descriptor, in either order.

use std::collections::HashSet;

use crate::error::AnnotationError;
use crate::model::{GridConfig, GridLimits, ImageRecord, ProcessDescriptor};
use crate::provider::DatasetProvider;
use crate::session::AnnotationSession;

/// Collects a dataset's inputs until a session can be built.
#[derive(Debug)]
pub struct SessionLoader {
    dataset_name: String,
    limits: GridLimits,
    images: Option<Vec<ImageRecord>>,
    config: Option<GridConfig>,
}

impl SessionLoader {
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            limits: GridLimits::default(),
            images: None,
            config: None,
        }
    }

    /// Override the grid limits used to validate the descriptor.
    pub fn with_limits(mut self, limits: GridLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// Accept the dataset's image sequence.
    pub fn receive_images(&mut self, images: Vec<ImageRecord>) -> Result<(), AnnotationError> {
        validate_images(&images)?;
        log::debug!("Received {} images for '{}'", images.len(), self.dataset_name);
        self.images = Some(images);
        Ok(())
    }

    /// Accept the dataset's process descriptor and derive the grid.
    pub fn receive_process(&mut self, descriptor: &ProcessDescriptor) -> Result<(), AnnotationError> {
        let config = GridConfig::from_descriptor_with_limits(descriptor, &self.limits)?;
        log::debug!(
            "Received process for '{}': {}x{} cells, classes {:?}",
            self.dataset_name,
            config.grid_width(),
            config.grid_height(),
            config.classes()
        );
        self.config = Some(config);
        Ok(())
    }

    /// Whether both inputs have arrived.
    pub fn is_ready(&self) -> bool {
        self.images.is_some() && self.config.is_some()
    }

    /// Build the session. Fails if either input is still missing.
    pub fn build(self) -> Result<AnnotationSession, AnnotationError> {
        let images = self
            .images
            .ok_or_else(|| AnnotationError::fetch_failed("images have not been received"))?;
        let config = self
            .config
            .ok_or_else(|| AnnotationError::fetch_failed("process descriptor has not been received"))?;
        AnnotationSession::new(self.dataset_name, images, config)
    }

    /// Fetch both inputs from `provider` and build the session.
    pub fn load<P: DatasetProvider + ?Sized>(mut self, provider: &P) -> Result<AnnotationSession, AnnotationError> {
        let images = provider.fetch_images(&self.dataset_name)?;
        self.receive_images(images)?;
        let descriptor = provider.fetch_process(&self.dataset_name)?;
        self.receive_process(&descriptor)?;
        self.build()
    }
}

/// Reject sequences that can't back a session: empty, or with repeated filenames.
pub(crate) fn validate_images(images: &[ImageRecord]) -> Result<(), AnnotationError> {
    if images.is_empty() {
        return Err(AnnotationError::fetch_failed("dataset has no images"));
    }
    let mut seen = HashSet::new();
    for image in images {
        if !seen.insert(image.filename()) {
            return Err(AnnotationError::fetch_failed(format!(
                "filename '{}' appears more than once",
                image.filename()
            )));
        }
    }
    Ok(())
}
