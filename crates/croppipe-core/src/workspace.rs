use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use image::RgbImage;
use tracing::{info, warn};

use crate::config::ImportConfig;
use crate::error::{CropPipeError, ImageLoadError, Result};
use crate::pipeline::{ResizeSpec, StageState};
use crate::record::{ImageId, ImageRecord};

/// Outcome of a batch import. Failures never abort the rest of the batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub loaded: Vec<ImageId>,
    /// Paths skipped because they are already in the workspace.
    pub duplicates: usize,
    pub failures: Vec<ImageLoadError>,
}

impl ImportReport {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.duplicates == 0 && self.failures.is_empty()
    }
}

/// Per-image outcome of a batch stage action.
pub type StageOutcome = (ImageId, Result<StageState>);

/// The working set of images, in import order.
#[derive(Debug)]
pub struct Workspace {
    records: Vec<ImageRecord>,
    /// Duplicate-detection key of every record's path.
    keys: HashMap<String, ImageId>,
    next_id: u64,
    extensions: Vec<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(&ImportConfig::default())
    }
}

impl Workspace {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            records: Vec::new(),
            keys: HashMap::new(),
            next_id: 1,
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: ImageId) -> Option<&mut ImageRecord> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    pub fn position(&self, id: ImageId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Row label shown in image lists: `P00001` for the first row.
    pub fn label(index: usize) -> String {
        format!("P{:05}", index + 1)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.keys.contains_key(&normalize_path(path))
    }

    /// Load every path, skipping ones already present and collecting failures.
    pub fn import_files<I, P>(&mut self, paths: I) -> ImportReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = ImportReport::default();
        for path in paths {
            let path = path.as_ref();
            let key = normalize_path(path);
            if self.keys.contains_key(&key) {
                report.duplicates += 1;
                continue;
            }
            let id = self.allocate_id();
            match ImageRecord::open(id, path) {
                Ok(record) => {
                    self.keys.insert(key, id);
                    self.records.push(record);
                    report.loaded.push(id);
                }
                Err(e) => {
                    warn!(error = %e, "Image failed to load");
                    report.failures.push(e);
                }
            }
        }
        info!(
            loaded = report.loaded.len(),
            duplicates = report.duplicates,
            failed = report.failures.len(),
            total = self.records.len(),
            "Import finished"
        );
        report
    }

    /// Recursively import every file under `dir` with a known image extension.
    pub fn import_folder(&mut self, dir: &Path) -> Result<ImportReport> {
        let mut files = Vec::new();
        self.collect_images(dir, &mut files)?;
        files.sort();
        Ok(self.import_files(files))
    }

    /// Add an already decoded image.
    pub fn insert_pixels(
        &mut self,
        path: impl Into<PathBuf>,
        pixels: RgbImage,
    ) -> std::result::Result<ImageId, ImageLoadError> {
        let id = self.allocate_id();
        let record = ImageRecord::from_pixels(id, path, pixels)?;
        self.keys.insert(normalize_path(record.path()), id);
        self.records.push(record);
        Ok(id)
    }

    /// Remove images, dropping their pixel buffers. Returns the ids actually removed.
    pub fn remove(&mut self, ids: &[ImageId]) -> Vec<ImageId> {
        let mut removed = Vec::new();
        self.records.retain(|r| {
            let drop = ids.contains(&r.id());
            if drop {
                removed.push(r.id());
            }
            !drop
        });
        self.keys.retain(|_, id| !removed.contains(id));
        info!(count = removed.len(), "Images removed");
        removed
    }

    /// Empty the workspace, returning the ids that were in it.
    pub fn clear(&mut self) -> Vec<ImageId> {
        let ids = self.records.iter().map(ImageRecord::id).collect();
        self.records.clear();
        self.keys.clear();
        info!("Workspace cleared");
        ids
    }

    pub fn apply_resize(&mut self, ids: &[ImageId], spec: ResizeSpec) -> Vec<StageOutcome> {
        self.apply(ids, |r| r.pipeline_mut().set_resize(spec))
    }

    pub fn apply_infer(&mut self, ids: &[ImageId], prompt: &str) -> Vec<StageOutcome> {
        self.apply(ids, |r| r.pipeline_mut().set_infer(prompt))
    }

    pub fn apply_fix(&mut self, ids: &[ImageId], prompt: &str) -> Vec<StageOutcome> {
        self.apply(ids, |r| r.pipeline_mut().set_fix(prompt))
    }

    fn apply(
        &mut self,
        ids: &[ImageId],
        mut action: impl FnMut(&mut ImageRecord) -> Result<StageState>,
    ) -> Vec<StageOutcome> {
        ids.iter()
            .map(|&id| {
                let outcome = match self.get_mut(id) {
                    Some(record) => action(record),
                    None => Err(CropPipeError::UnknownImage(id)),
                };
                (id, outcome)
            })
            .collect()
    }

    fn allocate_id(&mut self) -> ImageId {
        let id = ImageId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn has_image_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(e)))
    }

    fn collect_images(&self, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if let Err(e) = self.collect_images(&path, out) {
                    warn!(dir = %path.display(), error = %e, "Skipping unreadable folder");
                }
            } else if self.has_image_extension(&path) {
                out.push(path);
            }
        }
        Ok(())
    }
}

/// Comparison key for duplicate detection: resolved where possible,
/// `.`/`..` folded, separators unified, case-insensitive.
fn normalize_path(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| {
        let mut out = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    out.pop();
                }
                other => out.push(other),
            }
        }
        out
    });
    resolved
        .to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}
