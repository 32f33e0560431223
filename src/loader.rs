use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::env::TargetEnv;
use crate::error::Error;
use crate::locator::{find_env_file, find_env_file_from};
use crate::model::{LoadOptions, LoadReport};
use crate::parser::parse_statement;

/// Locate `.env` with default options and load it into the process environment.
///
/// # Safety
///
/// Mutates the process environment. The caller must ensure no other threads
/// concurrently read or write it.
pub unsafe fn load() -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    unsafe { load_with(&LoadOptions::default()) }
}

/// Locate and load a dotenv file into the process environment.
///
/// `options` is copied; the caller's value is never modified.
///
/// # Safety
///
/// Mutates the process environment. The caller must ensure no other threads
/// concurrently read or write it.
pub unsafe fn load_with(options: &LoadOptions) -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    let target = unsafe { TargetEnv::process() };
    EnvLoader::with_options(options).target(target).load()
}

/// Like [`load`], but panics on failure.
///
/// # Safety
///
/// See [`load`].
pub unsafe fn must_load() -> usize {
    // SAFETY: forwarded to the caller.
    unsafe { must_load_with(&LoadOptions::default()) }
}

/// Like [`load_with`], but panics on failure.
///
/// # Safety
///
/// See [`load_with`].
pub unsafe fn must_load_with(options: &LoadOptions) -> usize {
    // SAFETY: forwarded to the caller.
    match unsafe { load_with(options) } {
        Ok(report) => report.loaded,
        Err(err) => panic!("dotwalk: {err}"),
    }
}

/// Builder-style dotenv loader.
///
/// A loader created with [`EnvLoader::new`] writes into an in-memory target;
/// pass [`TargetEnv::process`] to [`EnvLoader::target`] to mutate the process
/// environment instead.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    options: LoadOptions,
    start_dir: Option<PathBuf>,
    target: TargetEnv,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: &LoadOptions) -> Self {
        Self {
            options: options.normalized(),
            ..Self::default()
        }
    }

    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.options.filename = filename.into();
        self.options = self.options.normalized();
        self
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.options.override_existing = override_existing;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self.options = self.options.normalized();
        self
    }

    /// Start the search from `dir` instead of the current working directory.
    pub fn start_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.start_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn target_env(&self) -> &TargetEnv {
        &self.target
    }

    pub fn into_target(self) -> TargetEnv {
        self.target
    }

    /// Resolve the dotenv file this loader would read.
    pub fn locate(&self) -> Result<PathBuf, Error> {
        let filename = &self.options.filename;
        match &self.start_dir {
            Some(dir) => find_env_file_from(dir, filename, self.options.max_depth),
            None => find_env_file(filename, self.options.max_depth),
        }
    }

    /// Locate the dotenv file and apply it to the target.
    ///
    /// Nothing is applied when the file cannot be found or opened.
    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let path = self.locate()?;
        let file = File::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;

        let mut report = self.load_reader(BufReader::new(file))?;
        report.path = Some(path);
        Ok(report)
    }

    /// Apply every valid line of `reader` to the target.
    ///
    /// Malformed lines are skipped. A failing reader or a rejected variable
    /// aborts the load; the error carries the number of variables already set.
    pub fn load_reader<R: BufRead>(&mut self, reader: R) -> Result<LoadReport, Error> {
        let debug = self.options.debug;
        let mut report = LoadReport::default();

        for (line, line_num) in reader.lines().zip(1u32..) {
            let line = line.map_err(|source| Error::Read {
                loaded: report.loaded,
                source,
            })?;

            let entry = match parse_statement(&line, line_num) {
                None => continue,
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    report.skipped_invalid += 1;
                    if debug {
                        tracing::debug!(
                            target: "dotwalk",
                            line = line_num,
                            text = line.trim(),
                            error = %err,
                            "skip invalid line"
                        );
                    }
                    continue;
                }
            };

            if !self.options.override_existing && !self.target.is_unset(&entry.key) {
                report.skipped_existing += 1;
                if debug {
                    tracing::debug!(target: "dotwalk", key = %entry.key, "skip existing key");
                }
                continue;
            }

            self.target
                .set_var(&entry.key, &entry.value)
                .map_err(|reason| Error::Set {
                    key: entry.key.clone(),
                    loaded: report.loaded,
                    reason,
                })?;
            report.loaded += 1;

            if debug {
                tracing::debug!(
                    target: "dotwalk",
                    key = %entry.key,
                    value = %mask_value(&entry.value),
                    "set variable"
                );
            }
        }

        Ok(report)
    }
}

/// Mask a value for logging: one `*` per character below four characters,
/// otherwise a fixed `***`.
fn mask_value(value: &str) -> String {
    let len = value.chars().count();
    if len < 4 {
        "*".repeat(len)
    } else {
        "***".to_owned()
    }
}
