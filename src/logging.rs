use {crate::config::Config, log::LevelFilter, std::fs::OpenOptions};

/// Initialize env_logger for the binaries
///
/// Default filter is `info` unless RUST_LOG says otherwise. Logs go to stderr,
/// or are appended to `SCANFLOW_LOG_FILE` when set. With `terminal_ui` and no
/// log file, stderr only gets warnings and errors so the UI screen stays intact.
///
/// Configuration warnings collected before the logger existed are emitted
/// once it is installed.
pub fn init_logging(config: &Config, terminal_ui: bool) {
    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_default_env()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    };

    // reqwest/hyper are chatty at debug
    let log_level = config.rust_log.as_deref().unwrap_or("info");
    if !log_level.contains("hyper") {
        builder.filter_module("hyper", LevelFilter::Warn);
        builder.filter_module("hyper_util", LevelFilter::Warn);
    }

    let target = match &config.log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => env_logger::Target::Pipe(Box::new(file)),
            Err(e) => {
                eprintln!("Cannot open log file {}: {}, logging to stderr", path, e);
                env_logger::Target::Stderr
            }
        },
        None => env_logger::Target::Stderr,
    };

    let file_target = matches!(target, env_logger::Target::Pipe(_));

    // A second init (tests, embedding) keeps the first logger
    let _ = builder.target(target).try_init();

    if let Some(cap) = stderr_level_cap(terminal_ui, file_target) {
        log::set_max_level(cap.min(log::max_level()));
    }

    for warning in &config.warnings {
        log::warn!("{}", warning);
    }
}

/// Level limit for logs written to the terminal while the UI draws on it
fn stderr_level_cap(terminal_ui: bool, file_target: bool) -> Option<LevelFilter> {
    (terminal_ui && !file_target).then_some(LevelFilter::Warn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_level_cap() {
        assert_eq!(stderr_level_cap(true, false), Some(LevelFilter::Warn));
        assert_eq!(stderr_level_cap(true, true), None);
        assert_eq!(stderr_level_cap(false, false), None);
        assert_eq!(stderr_level_cap(false, true), None);
    }
}
