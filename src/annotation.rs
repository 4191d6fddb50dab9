//! Annotation store: which grid cells of which image belong to which class.
//!
//! Each image owns one cell set per assignable class. The sets partition the
//! labeled cells of that image: a cell is either unlabeled or sits in exactly one
//! set. The only mutation is [`AnnotationStore::toggle`], which preserves that.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::AnnotationError;
use crate::model::{CellCoord, GridConfig, ImageRecord};

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Cell was unlabeled and now belongs to the requested class.
    Assigned,
    /// Cell belonged to the requested class and is unlabeled again.
    Cleared,
    /// Cell was taken from another class.
    Reassigned {
        /// The class the cell belonged to before
        from: String,
    },
}

/// Cell sets of a single image, indexed by assignable class position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAnnotations {
    cells: Vec<BTreeSet<CellCoord>>,
}

impl ImageAnnotations {
    /// Create empty sets for `class_count` assignable classes.
    pub fn new(class_count: usize) -> Self {
        Self {
            cells: vec![BTreeSet::new(); class_count],
        }
    }

    /// Cells assigned to the class at `class_index`.
    pub fn cells(&self, class_index: usize) -> Option<&BTreeSet<CellCoord>> {
        self.cells.get(class_index)
    }

    /// Index of the class currently owning `coord`, if any.
    pub fn class_of(&self, coord: CellCoord) -> Option<usize> {
        self.cells.iter().position(|set| set.contains(&coord))
    }

    /// Iterate over `(class_index, cells)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<CellCoord>)> {
        self.cells.iter().enumerate()
    }

    /// Total number of labeled cells.
    pub fn len(&self) -> usize {
        self.cells.iter().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(BTreeSet::is_empty)
    }
}

/// Per-session mapping `filename → class → cells`.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    config: GridConfig,
    entries: HashMap<String, ImageAnnotations>,
    /// Bumped on every mutation; lets a submission tell whether it saw the latest state.
    revision: u64,
    dirty: bool,
}

impl AnnotationStore {
    /// Create an empty store for the given grid.
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            revision: 0,
            dirty: false,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Create an empty entry for every image that doesn't have one yet.
    ///
    /// Existing entries are left untouched. Returns the number of entries created.
    pub fn initialize(&mut self, images: &[ImageRecord]) -> usize {
        let class_count = self.config.assignable_classes().len();
        let mut created = 0;
        for image in images {
            if !self.entries.contains_key(image.filename()) {
                self.entries
                    .insert(image.filename().to_string(), ImageAnnotations::new(class_count));
                created += 1;
            }
        }
        log::debug!(
            "Initialized {} annotation entries ({} total)",
            created,
            self.entries.len()
        );
        created
    }

    /// Toggle `coord` of `filename` for `class`.
    ///
    /// An unlabeled cell, or one owned by another class, is assigned to `class`.
    /// A cell already owned by `class` is cleared. Nothing is mutated on error.
    pub fn toggle(
        &mut self,
        filename: &str,
        coord: CellCoord,
        class: &str,
    ) -> Result<ToggleOutcome, AnnotationError> {
        let class_index = self
            .config
            .assignable_index(class)
            .ok_or_else(|| AnnotationError::invalid_class(class))?;

        if !self.config.contains(coord) {
            return Err(AnnotationError::OutOfBounds {
                col: i64::from(coord.col),
                row: i64::from(coord.row),
            });
        }

        let entry = self
            .entries
            .get_mut(filename)
            .ok_or_else(|| AnnotationError::unknown_image(filename))?;

        let outcome = match entry.class_of(coord) {
            Some(current) if current == class_index => {
                entry.cells[current].remove(&coord);
                ToggleOutcome::Cleared
            }
            Some(other) => {
                entry.cells[other].remove(&coord);
                entry.cells[class_index].insert(coord);
                ToggleOutcome::Reassigned {
                    from: self.config.assignable_classes()[other].clone(),
                }
            }
            None => {
                entry.cells[class_index].insert(coord);
                ToggleOutcome::Assigned
            }
        };

        self.revision += 1;
        self.dirty = true;

        log::debug!("{} {} as '{}': {:?}", filename, coord, class, outcome);
        Ok(outcome)
    }

    /// Annotations of one image.
    pub fn annotations(&self, filename: &str) -> Option<&ImageAnnotations> {
        self.entries.get(filename)
    }

    /// Name of the class owning `coord` in `filename`, if any.
    pub fn class_of(&self, filename: &str, coord: CellCoord) -> Option<&str> {
        let index = self.entries.get(filename)?.class_of(coord)?;
        self.config.assignable_classes().get(index).map(String::as_str)
    }

    /// Number of images with an entry.
    pub fn image_count(&self) -> usize {
        self.entries.len()
    }

    /// Labeled cells across all images.
    pub fn labeled_cell_count(&self) -> usize {
        self.entries.values().map(ImageAnnotations::len).sum()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether mutations exist that no successful submission has covered.
    pub fn has_unsaved_work(&self) -> bool {
        self.dirty
    }

    /// Record that the state at `revision` was accepted by the sink.
    ///
    /// The store only becomes clean if nothing changed since that revision.
    pub fn mark_submitted(&mut self, revision: u64) {
        if revision == self.revision {
            self.dirty = false;
        }
    }

    /// Snapshot as `filename → class → ordered cells`, ready for the wire.
    ///
    /// Every image and every assignable class is present, empty or not.
    pub fn coordinates_data(&self) -> BTreeMap<String, BTreeMap<String, Vec<CellCoord>>> {
        let classes = self.config.assignable_classes();
        self.entries
            .iter()
            .map(|(filename, entry)| {
                let per_class: BTreeMap<String, Vec<CellCoord>> = entry
                    .iter()
                    .map(|(index, cells)| {
                        (classes[index].clone(), cells.iter().copied().collect::<Vec<_>>())
                    })
                    .collect();
                (filename.clone(), per_class)
            })
            .collect()
    }
}
