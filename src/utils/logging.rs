use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

/// Log files are named `habitgrid.<date>` inside [LogSettings::directory].
pub const LOG_FILE_PREFIX: &str = "habitgrid";
pub const LOG_DIR_NAME: &str = "logs";
const MAX_LOG_FILES: usize = 5;
const DEFAULT_LEVEL: &str = "info";

/// How a single CLI invocation logs. Everything goes into a daily rotated file, and stderr
/// receives a copy only when asked for, because `export` prints the document to stdout and the
/// grid is read by people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub directory: PathBuf,
    pub level: Option<LevelFilter>,
    pub mirror_to_stderr: bool,
}

impl LogSettings {
    /// `--log` turns on everything, including span timings of the ledger operations.
    pub fn for_app_dir(app_dir: &Path, verbose: bool) -> Self {
        Self {
            directory: app_dir.join(LOG_DIR_NAME),
            level: verbose.then_some(LevelFilter::TRACE),
            mirror_to_stderr: verbose,
        }
    }

    /// Filter directive for the subscriber. An explicit level wins over `RUST_LOG`. A bare level in
    /// `RUST_LOG` (`debug`) is scoped to this crate so dependencies stay quiet, while a full
    /// directive (`habitgrid=trace,tokio=debug`) is taken as written.
    fn directive(&self, rust_log: Option<&str>) -> String {
        let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
        match (self.level, rust_log.map(str::trim).filter(|v| !v.is_empty())) {
            (Some(level), _) => format!("{crate_target}={level}"),
            (None, Some(env)) if env.contains('=') || env.contains(',') => env.to_owned(),
            (None, Some(env)) => format!("{crate_target}={env}"),
            (None, None) => format!("{crate_target}={DEFAULT_LEVEL}"),
        }
    }
}

/// Installs the global subscriber for the process.
pub fn enable_logging(settings: &LogSettings) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(&settings.directory)?;

    let mirror = settings.mirror_to_stderr;
    let stderr = std::io::stderr.with_filter(move |_| mirror);

    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = settings.directive(rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&directive)?)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stderr.and(appender))
        .with_ansi(false)
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tracing::level_filters::LevelFilter;

    use super::LogSettings;

    #[test]
    fn test_logs_live_under_app_dir() {
        let quiet = LogSettings::for_app_dir(Path::new("/state/habitgrid"), false);
        assert_eq!(quiet.directory, Path::new("/state/habitgrid/logs"));
        assert_eq!(quiet.level, None);
        assert!(!quiet.mirror_to_stderr);

        let verbose = LogSettings::for_app_dir(Path::new("/state/habitgrid"), true);
        assert_eq!(verbose.level, Some(LevelFilter::TRACE));
        assert!(verbose.mirror_to_stderr);
    }

    #[test]
    fn test_directive_precedence() {
        let quiet = LogSettings::for_app_dir(Path::new("/tmp"), false);
        assert_eq!(quiet.directive(None), "habitgrid=info");
        assert_eq!(quiet.directive(Some("  ")), "habitgrid=info");
        assert_eq!(quiet.directive(Some("debug")), "habitgrid=debug");
        assert_eq!(
            quiet.directive(Some("habitgrid=trace,tokio=debug")),
            "habitgrid=trace,tokio=debug"
        );

        let verbose = LogSettings::for_app_dir(Path::new("/tmp"), true);
        assert_eq!(
            verbose.directive(Some("warn")),
            format!("habitgrid={}", LevelFilter::TRACE)
        );
    }
}
