//! Pretty-printing messages to the console, plus the `log`/`env_logger`
//! diagnostic channel. The two are independent: `error` is user-facing
//! and always on, while `init` wires up `log::debug!` et al. for whoever
//! sets `RUST_LOG`.

use colored::Colorize;

/// Pretty-print an error message to the console
pub fn error(error_message: String) {
    let error_title = "error:".red().bold();
    eprintln!("{} {}", error_title, error_message);
}

/// Install the `env_logger` backend for the `log` facade. Call once at
/// process startup; safe to call more than once (later calls are no-ops).
pub fn init() {
    let _ = env_logger::try_init();
}
