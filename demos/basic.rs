//! Load `.env` from the current directory (or up to three parents) and print
//! a couple of settings.
//!
//! Run with `cargo run --example basic` from a directory containing a `.env`.

use dotwalk::{LoadOptions, get_env};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let options = LoadOptions::new().override_existing(true).debug(true);
    // SAFETY: single-threaded at this point; nothing else touches the environment.
    let report = match unsafe { dotwalk::load_with(&options) } {
        Ok(report) => report,
        Err(err) => {
            eprintln!("dotwalk: {err}");
            std::process::exit(1);
        }
    };

    let config_path = get_env("CONFIG_PATH", "config/local.env");
    let port = get_env("DB_PORT", "8000");

    println!("{} {config_path} {port}", report.loaded);
}
