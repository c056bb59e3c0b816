use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};
use watchlog_config::PathManager;

/// Filter directives for a verbosity level. sqlx logs every statement at info, so it is held back
/// one level below the rest.
fn filter_directives(verbose_level: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose_level {
        0 => "info,sqlx=warn",
        // -v: debug, but keep the HTTP and database internals quiet
        1 => "debug,hyper=warn,reqwest=info,sqlx=info",
        _ => "trace",
    }
}

/// An explicit `--log-file` wins; `--log-to-file` falls back to the managed log path.
pub fn resolve_log_file(log_file: Option<PathBuf>, log_to_file: bool, paths: &PathManager) -> Option<PathBuf> {
    log_file.or_else(|| log_to_file.then(|| paths.log_file()))
}

pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let directives = filter_directives(verbose_level, quiet);
    let filter = if quiet {
        EnvFilter::new(directives)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    match log_file {
        Some(log_path) => {
            let file_appender = rolling_appender(&log_path)?;
            if json {
                registry
                    .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(file_appender))
                    .init();
            } else {
                registry
                    .with(
                        fmt::layer()
                            .with_timer(ChronoUtc::rfc_3339())
                            .with_ansi(false)
                            .with_writer(file_appender),
                    )
                    .init();
            }
        }
        None => {
            if json {
                registry
                    .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                    .init();
            } else {
                registry
                    .with(fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                    .init();
            }
        }
    }

    Ok(())
}

/// Daily-rotated appender: `watchlog.log` becomes `watchlog.2026-01-17` and so on.
fn rolling_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = match log_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&log_dir)?;

    let prefix = log_file_prefix(log_path)?;
    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, prefix))
}

fn log_file_prefix(log_path: &Path) -> Result<String> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;

    Ok(file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(3, true), "error");
        assert_eq!(filter_directives(0, false), "info,sqlx=warn");
        assert!(filter_directives(1, false).starts_with("debug"));
        assert_eq!(filter_directives(2, false), "trace");
    }

    #[test]
    fn test_resolve_log_file() {
        let paths = PathManager::from_base(PathBuf::from("/srv/watchlog"));
        assert_eq!(resolve_log_file(None, false, &paths), None);
        assert_eq!(
            resolve_log_file(None, true, &paths),
            Some(PathBuf::from("/srv/watchlog/logs/watchlog.log"))
        );
        assert_eq!(
            resolve_log_file(Some(PathBuf::from("import.log")), true, &paths),
            Some(PathBuf::from("import.log"))
        );
    }

    #[test]
    fn test_log_file_prefix() {
        assert_eq!(log_file_prefix(Path::new("/var/log/watchlog.log")).unwrap(), "watchlog");
        assert_eq!(log_file_prefix(Path::new("import")).unwrap(), "import");
        assert_eq!(log_file_prefix(Path::new(".hidden")).unwrap(), ".hidden");
    }
}
