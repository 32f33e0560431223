//! Locate a `.env` file and load it into the environment.
//!
//! The file is looked up in the current directory first, then in up to
//! [`LoadOptions::max_depth`] parent directories. Each line is a `KEY=VALUE`
//! assignment with an optional `export` prefix and optional surrounding quotes
//! on the value. Blank lines and `#` comments are ignored and malformed lines
//! are skipped.
//!
//! [`EnvLoader::load`] writes into an in-memory map by default and is safe.
//! The convenience loaders ([`load`], [`load_with`], [`must_load`],
//! [`must_load_with`]) mutate the process environment and are `unsafe`,
//! because callers must guarantee no concurrent process-environment access.
//! No locking is done internally.

mod env;
mod error;
mod loader;
mod locator;
mod model;
mod parser;

pub use env::{TargetEnv, get_env, get_env_or_panic};
pub use error::{Error, ParseError};
pub use loader::{EnvLoader, load, load_with, must_load, must_load_with};
pub use locator::{find_env_file, find_env_file_from};
pub use model::{Entry, LoadOptions, LoadReport};
pub use parser::{is_valid_key, parse_line, parse_reader, parse_str, unquote};
