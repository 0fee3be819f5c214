//! Gilt reference sources backed by workbooks on disk or held in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use gilt_core::Date;
use gilt_traits::{GiltDirectory, GiltRecord, GiltReferenceSource, TraitError};

use crate::discovery::{discover_workbooks, signature, FileSignature};
use crate::error::IngestResult;
use crate::workbook::{load_workbook, WorkbookData};

/// Reads one workbook file.
pub type WorkbookLoader = fn(&Path) -> IngestResult<WorkbookData>;

/// Merges parsed workbooks into a single directory.
///
/// For each ISIN the record from the workbook with the newest data date
/// wins. The directory is stamped with the newest data date seen.
///
/// # Errors
///
/// Returns `TraitError::SourceNotAvailable` when `workbooks` is empty and
/// `TraitError::InvalidInput` when a surviving record has invalid terms.
pub fn merge_workbooks(
    workbooks: impl IntoIterator<Item = WorkbookData>,
) -> Result<GiltDirectory, TraitError> {
    let mut newest: Option<Date> = None;
    let mut by_isin: HashMap<String, (Date, GiltRecord)> = HashMap::new();

    for workbook in workbooks {
        newest = newest.max(Some(workbook.data_date));
        for record in workbook.records {
            match by_isin.get(&record.isin) {
                Some((seen, _)) if *seen >= workbook.data_date => {}
                _ => {
                    by_isin.insert(record.isin.clone(), (workbook.data_date, record));
                }
            }
        }
    }

    let data_date =
        newest.ok_or_else(|| TraitError::SourceNotAvailable("no workbooks to merge".to_string()))?;
    GiltDirectory::new(data_date, by_isin.into_values().map(|(_, r)| r).collect())
}

// =============================================================================
// XLS GILT SOURCE
// =============================================================================

struct CachedDirectory {
    signature: Vec<FileSignature>,
    directory: Arc<GiltDirectory>,
}

/// Workbook-backed gilt source.
///
/// Every snapshot re-lists the gilts directory. The parsed directory is
/// reused for as long as the set of workbooks and their modification times
/// and sizes stay the same.
pub struct XlsGiltSource {
    gilts_dir: PathBuf,
    loader: WorkbookLoader,
    cache: Arc<DashMap<PathBuf, CachedDirectory>>,
}

impl XlsGiltSource {
    /// Create a source reading workbooks from `gilts_dir`.
    pub fn new(gilts_dir: impl AsRef<Path>) -> Self {
        Self {
            gilts_dir: gilts_dir.as_ref().to_path_buf(),
            loader: load_workbook,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Replaces the per-file loader.
    #[must_use]
    pub fn with_loader(mut self, loader: WorkbookLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Directory scanned for workbooks.
    pub fn gilts_dir(&self) -> &Path {
        &self.gilts_dir
    }

    /// Drops any cached directory and reloads from disk.
    pub fn reload(&self) -> Result<Arc<GiltDirectory>, TraitError> {
        self.cache.clear();
        load_cached(&self.gilts_dir, self.loader, &self.cache)
    }
}

fn load_cached(
    gilts_dir: &Path,
    loader: WorkbookLoader,
    cache: &DashMap<PathBuf, CachedDirectory>,
) -> Result<Arc<GiltDirectory>, TraitError> {
    let paths = discover_workbooks(gilts_dir)?;
    let signature = signature(&paths)?;

    if let Some(cached) = cache.get(gilts_dir) {
        if cached.signature == signature {
            return Ok(Arc::clone(&cached.directory));
        }
    }

    log::info!("loading {} gilt workbook(s) from {}", paths.len(), gilts_dir.display());
    let workbooks = paths
        .iter()
        .map(|path| loader(path))
        .collect::<IngestResult<Vec<_>>>()?;
    let directory = Arc::new(merge_workbooks(workbooks)?);
    log::info!(
        "gilt directory as of {} holds {} conventional gilts",
        directory.data_date(),
        directory.len()
    );

    cache.insert(
        gilts_dir.to_path_buf(),
        CachedDirectory {
            signature,
            directory: Arc::clone(&directory),
        },
    );
    Ok(directory)
}

#[async_trait]
impl GiltReferenceSource for XlsGiltSource {
    async fn snapshot(&self) -> Result<Arc<GiltDirectory>, TraitError> {
        let gilts_dir = self.gilts_dir.clone();
        let loader = self.loader;
        let cache = Arc::clone(&self.cache);

        tokio::task::spawn_blocking(move || load_cached(&gilts_dir, loader, &cache))
            .await
            .map_err(|e| TraitError::Internal(format!("workbook load task failed: {e}")))?
    }
}

// =============================================================================
// IN-MEMORY GILT SOURCE
// =============================================================================

/// Gilt source serving a fixed directory.
pub struct InMemoryGiltSource {
    directory: Arc<GiltDirectory>,
}

impl InMemoryGiltSource {
    /// Wrap an existing directory.
    pub fn new(directory: GiltDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }

    /// Build a directory from records.
    pub fn from_records(data_date: Date, records: Vec<GiltRecord>) -> Result<Self, TraitError> {
        Ok(Self::new(GiltDirectory::new(data_date, records)?))
    }
}

#[async_trait]
impl GiltReferenceSource for InMemoryGiltSource {
    async fn snapshot(&self) -> Result<Arc<GiltDirectory>, TraitError> {
        Ok(Arc::clone(&self.directory))
    }
}
