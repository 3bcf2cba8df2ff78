use std::{env, fs, path::{Path, PathBuf}, ops::Deref, fmt::{self, Formatter, Display}};
use tempfile::TempDir;

pub const TEST_DATA_DIR: &str = "tests/test-data";

/// A test-data file, copied into its own temporary directory.
pub struct Fixture {
    path: PathBuf,
    tempdir: TempDir,
}

impl Fixture {
    /// Reserve a path named `filename` within a fresh temporary directory, without creating it.
    pub fn blank(filename: &str) -> Self {
        let tempdir = tempfile::tempdir().expect("Failed to generate temp directory");
        let path    = tempdir.path().join(filename);
        Fixture{path, tempdir}
    }

    /// Copy `tests/test-data/<fixture_filename>` within a fresh temporary directory.
    pub fn copy(fixture_filename: &str) -> Self {
        let root_dir = env::var("CARGO_MANIFEST_DIR").expect("$CARGO_MANIFEST_DIR");
        let source   = Path::new(&root_dir).join(TEST_DATA_DIR).join(fixture_filename);
        let filename = source.file_name().expect("Invalid fixture filename").to_string_lossy().to_string();

        let fixture = Fixture::blank(&filename);
        fs::copy(&source, &fixture.path)
            .unwrap_or_else(|e| panic!("Failed to copy fixture {}: {e}", source.display()));
        fixture
    }

    /// Another path, sharing the temporary directory of this fixture.
    pub fn sibling(&self, filename: &str) -> PathBuf {
        self.tempdir.path().join(filename)
    }
}

impl Deref for Fixture {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.path
    }
}

impl Display for Fixture {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
