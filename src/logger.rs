//! Logging setup for the command-line tool.

/// Initializes env_logger: `debug` with `--verbose`, `warn` otherwise.
/// `RUST_LOG` still overrides both.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .format_target(false)
        .init();
}
