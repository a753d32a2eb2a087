//! Source discovery and CSV parsing.
//!
//! Files are matched to a source by a case-insensitive token in their name
//! (`facebook`, `google`, `tiktok`, `business`). Directory entries are visited
//! in name order so repeated runs pick the same file; when two files match the
//! same source the first one wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use marketpulse_core::{PulseError, PulseResult, RawTable, SourceKind};
use tracing::{debug, info, warn};

/// Which file backs each source, before anything is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceManifest {
    files: BTreeMap<SourceKind, PathBuf>,
}

impl SourceManifest {
    pub fn get(&self, source: SourceKind) -> Option<&Path> {
        self.files.get(&source).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceKind, &Path)> {
        self.files.iter().map(|(k, p)| (*k, p.as_path()))
    }

    /// Required sources with no matching file, in canonical order.
    pub fn missing(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|s| !self.files.contains_key(s))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Parsed tables keyed by source. May be partial until validated.
#[derive(Debug, Clone, Default)]
pub struct LoadedSources {
    tables: BTreeMap<SourceKind, RawTable>,
}

impl LoadedSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: SourceKind, table: RawTable) {
        self.tables.insert(source, table);
    }

    pub fn get(&self, source: SourceKind) -> Option<&RawTable> {
        self.tables.get(&source)
    }

    pub fn contains(&self, source: SourceKind) -> bool {
        self.tables.contains_key(&source)
    }

    /// Table for a source that validation already confirmed is present.
    pub fn require(&self, source: SourceKind) -> PulseResult<&RawTable> {
        self.get(source).ok_or_else(|| PulseError::MissingSource {
            missing: vec![source.file_name().to_string()],
        })
    }
}

/// Loads the four source feeds from a data directory.
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Scan the data directory and match CSV files to sources.
    pub fn discover(&self) -> PulseResult<SourceManifest> {
        if !self.data_dir.is_dir() {
            return Err(PulseError::DirectoryNotFound(self.data_dir.clone()));
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        let mut manifest = SourceManifest::default();
        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let lower = name.to_lowercase();
            if !lower.ends_with(".csv") {
                continue;
            }
            let Some(source) = SourceKind::ALL
                .into_iter()
                .find(|s| lower.contains(s.token()))
            else {
                debug!(file = %name, "Skipping CSV that matches no source");
                continue;
            };

            if let Some(existing) = manifest.files.get(&source) {
                warn!(
                    source = %source,
                    kept = %existing.display(),
                    ignored = %path.display(),
                    "Multiple files match one source"
                );
                continue;
            }
            manifest.files.insert(source, path);
        }

        Ok(manifest)
    }

    /// Parse every discovered file. Any parse failure aborts the whole load.
    pub fn load(&self, manifest: &SourceManifest) -> PulseResult<LoadedSources> {
        let mut loaded = LoadedSources::new();
        for (source, path) in manifest.iter() {
            let table = read_table(path)?;
            debug!(
                source = %source,
                file = %path.display(),
                rows = table.len(),
                columns = table.headers.len(),
                "Parsed source file"
            );
            loaded.insert(source, table);
        }
        info!(
            data_dir = %self.data_dir.display(),
            sources = manifest.len(),
            "Loaded source files"
        );
        Ok(loaded)
    }

    /// Discover and parse in one step.
    pub fn load_csv_files(&self) -> PulseResult<LoadedSources> {
        let manifest = self.discover()?;
        self.load(&manifest)
    }

    /// Fail with every absent source named unless all four are present.
    pub fn validate_data_files(sources: &LoadedSources) -> PulseResult<()> {
        let missing: Vec<String> = SourceKind::ALL
            .into_iter()
            .filter(|s| !sources.contains(*s))
            .map(|s| s.file_name().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PulseError::MissingSource { missing })
        }
    }
}

/// Parse one header-led CSV file. Short rows are kept and their missing
/// cells read as absent; a row with more fields than the header is a parse
/// error.
pub fn read_table(path: &Path) -> PulseResult<RawTable> {
    let parse_err = |source: csv::Error| PulseError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(parse_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_err)?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(parse_err(csv::Error::from(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "line {line}: found {} fields, but the header has {}",
                    record.len(),
                    headers.len()
                ),
            ))));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}
