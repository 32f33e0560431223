use std::path::PathBuf;

pub(crate) const DEFAULT_FILENAME: &str = ".env";
pub(crate) const DEFAULT_MAX_DEPTH: usize = 3;

/// A parsed `KEY=VALUE` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    /// 1-based line number in the source stream, or 0 for a lone line.
    pub line: u32,
}

/// Summary of a load operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Variables actually written to the target.
    pub loaded: usize,
    /// Entries left alone because the variable was already set.
    pub skipped_existing: usize,
    /// Lines rejected by the parser.
    pub skipped_invalid: usize,
    /// File that was read, if the load went through the locator.
    pub path: Option<PathBuf>,
}

/// Options for a single load call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File name to look for. Defaults to `.env`.
    pub filename: PathBuf,
    /// Replace variables that are already set to a non-empty value.
    pub override_existing: bool,
    /// Emit `tracing` debug events for skipped and applied lines.
    pub debug: bool,
    /// How many parent directories to search after the start directory.
    /// Zero is treated as unset and replaced by the default of 3.
    pub max_depth: usize,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Copy of these options with unset fields replaced by their defaults.
    pub fn normalized(&self) -> Self {
        let mut options = self.clone();
        if options.filename.as_os_str().is_empty() {
            options.filename = PathBuf::from(DEFAULT_FILENAME);
        }
        if options.max_depth == 0 {
            options.max_depth = DEFAULT_MAX_DEPTH;
        }
        options
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_FILENAME),
            override_existing: false,
            debug: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
