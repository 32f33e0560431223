use std::collections::BTreeMap;

/// Destination for loaded environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnv {
    kind: TargetEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetEnvKind {
    /// Apply entries to the current process environment.
    ///
    /// This writes through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    /// Apply entries to an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::memory()
    }
}

impl TargetEnv {
    /// Create a process-environment target.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// target.
    pub unsafe fn process() -> Self {
        Self {
            kind: TargetEnvKind::Process,
        }
    }

    /// Create an empty in-memory target.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory target seeded with existing variables.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: TargetEnvKind::Memory(map),
        }
    }

    pub fn is_process(&self) -> bool {
        matches!(self.kind, TargetEnvKind::Process)
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub(crate) fn get_var(&self, key: &str) -> Option<String> {
        match &self.kind {
            TargetEnvKind::Process => {
                std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            }
            TargetEnvKind::Memory(map) => map.get(key).cloned(),
        }
    }

    /// Whether `key` is unset or set to an empty string.
    pub(crate) fn is_unset(&self, key: &str) -> bool {
        self.get_var(key).is_none_or(|value| value.is_empty())
    }

    /// Write a variable, returning the reason if the target rejects it.
    pub(crate) fn set_var(&mut self, key: &str, value: &str) -> Result<(), &'static str> {
        match &mut self.kind {
            TargetEnvKind::Process => {
                check_process_var(key, value)?;
                // SAFETY: `TargetEnv::process` is unsafe and its caller vouched
                // for exclusive access to the process environment.
                unsafe { std::env::set_var(key, value) };
                Ok(())
            }
            TargetEnvKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
                Ok(())
            }
        }
    }
}

// `std::env::set_var` panics on these instead of reporting them.
fn check_process_var(key: &str, value: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("empty variable name");
    }
    if key.contains('=') {
        return Err("variable name contains '='");
    }
    if key.contains('\0') {
        return Err("variable name contains NUL");
    }
    if value.contains('\0') {
        return Err("value contains NUL");
    }
    Ok(())
}

/// Read a process environment variable, falling back to `default` when it is
/// unset or empty.
pub fn get_env(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_owned(),
    }
}

/// Read a process environment variable that must be set.
///
/// # Panics
///
/// Panics if the variable is unset, empty or not valid Unicode.
pub fn get_env_or_panic(key: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => panic!("dotwalk: required environment variable {key} is not set"),
    }
}
