//! Process descriptor and the grid geometry derived from it.
//!
//! A dataset's process descriptor arrives from upstream untyped-ish: integers that
//! may be negative or too large, and a comma-separated class list. [`GridConfig`]
//! is the validated form every other component works with.

use serde::{Deserialize, Serialize};

use crate::constants::{CLASS_SEPARATOR, MIN_PATCH_SIZE, MIN_RESIZE};
use crate::error::AnnotationError;
use crate::model::CellCoord;

/// Upstream configuration record for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// Width every image is resized to
    pub resize_x: i64,
    /// Height every image is resized to
    pub resize_y: i64,
    /// Edge length of one grid cell
    pub patch_size: i64,
    /// Comma-separated class vocabulary; the first entry is the unlabeled class
    pub class_names: String,
}

impl ProcessDescriptor {
    pub fn new(resize_x: i64, resize_y: i64, patch_size: i64, class_names: impl Into<String>) -> Self {
        Self {
            resize_x,
            resize_y,
            patch_size,
            class_names: class_names.into(),
        }
    }

    /// Parse a descriptor from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, AnnotationError> {
        serde_json::from_str(json)
            .map_err(|e| AnnotationError::fetch_failed(format!("malformed process descriptor: {}", e)))
    }
}

/// Lower bounds applied when validating a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLimits {
    /// Smallest accepted patch size
    pub min_patch_size: u32,
    /// Smallest accepted resize width/height
    pub min_resize: u32,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            min_patch_size: MIN_PATCH_SIZE,
            min_resize: MIN_RESIZE,
        }
    }
}

/// Validated grid geometry and class vocabulary for one dataset.
///
/// Invariants: both resize dimensions are whole multiples of `patch_size`, and
/// `classes` holds at least one distinct, non-empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    resize_width: u32,
    resize_height: u32,
    patch_size: u32,
    classes: Vec<String>,
}

impl GridConfig {
    /// Derive a grid from a descriptor using the default limits.
    pub fn from_descriptor(descriptor: &ProcessDescriptor) -> Result<Self, AnnotationError> {
        Self::from_descriptor_with_limits(descriptor, &GridLimits::default())
    }

    /// Derive a grid from a descriptor, enforcing `limits`.
    pub fn from_descriptor_with_limits(
        descriptor: &ProcessDescriptor,
        limits: &GridLimits,
    ) -> Result<Self, AnnotationError> {
        let patch_size = positive_dimension("patch_size", descriptor.patch_size)?;
        if patch_size < limits.min_patch_size {
            return Err(AnnotationError::invalid_config(format!(
                "patch_size {} is below the minimum of {}",
                patch_size, limits.min_patch_size
            )));
        }

        let resize_width = positive_dimension("resize_x", descriptor.resize_x)?;
        let resize_height = positive_dimension("resize_y", descriptor.resize_y)?;

        for (field, value) in [("resize_x", resize_width), ("resize_y", resize_height)] {
            if value < limits.min_resize {
                return Err(AnnotationError::invalid_config(format!(
                    "{} {} is below the minimum of {}",
                    field, value, limits.min_resize
                )));
            }
            if value % patch_size != 0 {
                return Err(AnnotationError::invalid_config(format!(
                    "{} {} is not a multiple of patch_size {}",
                    field, value, patch_size
                )));
            }
        }

        let classes = parse_class_names(&descriptor.class_names)?;

        Ok(Self {
            resize_width,
            resize_height,
            patch_size,
            classes,
        })
    }

    pub fn resize_width(&self) -> u32 {
        self.resize_width
    }

    pub fn resize_height(&self) -> u32 {
        self.resize_height
    }

    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    /// Number of cell columns.
    pub fn grid_width(&self) -> u32 {
        self.resize_width / self.patch_size
    }

    /// Number of cell rows.
    pub fn grid_height(&self) -> u32 {
        self.resize_height / self.patch_size
    }

    /// Full class vocabulary, default class first.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The unlabeled class. Never an annotation target.
    pub fn default_class(&self) -> &str {
        &self.classes[0]
    }

    /// Classes a cell may be tagged with, in descriptor order.
    pub fn assignable_classes(&self) -> &[String] {
        &self.classes[1..]
    }

    /// Position of `class` within [`Self::assignable_classes`].
    ///
    /// Returns `None` for the default class and for unknown names.
    pub fn assignable_index(&self, class: &str) -> Option<usize> {
        self.assignable_classes().iter().position(|c| c == class)
    }

    /// Check whether `coord` addresses a cell of this grid.
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.col < self.grid_width() && coord.row < self.grid_height()
    }
}

impl TryFrom<&ProcessDescriptor> for GridConfig {
    type Error = AnnotationError;

    fn try_from(descriptor: &ProcessDescriptor) -> Result<Self, Self::Error> {
        Self::from_descriptor(descriptor)
    }
}

fn positive_dimension(field: &str, value: i64) -> Result<u32, AnnotationError> {
    if value <= 0 {
        return Err(AnnotationError::invalid_config(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    u32::try_from(value).map_err(|_| {
        AnnotationError::invalid_config(format!("{} {} is too large", field, value))
    })
}

fn parse_class_names(raw: &str) -> Result<Vec<String>, AnnotationError> {
    if raw.trim().is_empty() {
        return Err(AnnotationError::invalid_config("class list is empty"));
    }

    let mut classes: Vec<String> = Vec::new();
    for name in raw.split(CLASS_SEPARATOR).map(str::trim) {
        if name.is_empty() {
            return Err(AnnotationError::invalid_config(format!(
                "class list '{}' contains an empty name",
                raw
            )));
        }
        if classes.iter().any(|c| c == name) {
            return Err(AnnotationError::invalid_config(format!(
                "class '{}' is listed more than once",
                name
            )));
        }
        classes.push(name.to_string());
    }
    Ok(classes)
}
