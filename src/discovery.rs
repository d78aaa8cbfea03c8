use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::HarnessConfig;
use crate::fixture::parse_fixture;
use crate::test::TestCase;
use crate::KatsError;

/// Finds the fixture document and documentation files of a suite.
#[derive(Debug)]
pub struct TestDiscoverer;

impl TestDiscoverer {
    /// Reads and parses the fixture document named by `config`.
    ///
    /// The fixture is mandatory: a missing file aborts the run.
    pub fn fixture_cases(config: &HarnessConfig) -> Result<Vec<TestCase>, KatsError> {
        let source = read_source(&config.fixtures)?;
        let name = config.fixtures.display().to_string();
        parse_fixture(&source, &name, &config.tests_dir)
    }

    /// Lists the regular files directly inside `dir`, sorted by file name so
    /// that runs are reproducible.
    ///
    /// A missing directory is an empty corpus. Subdirectories are not
    /// descended into.
    pub fn doc_files(dir: &Path) -> Result<Vec<PathBuf>, KatsError> {
        if !dir.exists() {
            warn!(dir = %dir.display(), "documentation directory not found, skipping doc tests");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|source| KatsError::ListDocs {
                path: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            files.push(entry.into_path());
        }
        debug!(dir = %dir.display(), count = files.len(), "discovered documentation files");
        Ok(files)
    }
}

/// Reads a fixture or documentation file.
pub fn read_source(path: &Path) -> Result<String, KatsError> {
    fs::read_to_string(path).map_err(|e| KatsError::read(path, e))
}
