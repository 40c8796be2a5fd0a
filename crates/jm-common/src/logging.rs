use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_DIR_ENV: &str = "JM_LOG_DIR";
const BACKTRACE_ENV: &str = "JM_LOG_INCLUDE_BACKTRACE";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Routes panics through `tracing` so they land in the same sink as every
/// other event. Installed once per process; later calls are no-ops.
pub fn install_tracing_panic_hook(service: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        let chain_default = env_flag(BACKTRACE_ENV);

        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let thread_name = thread.name().unwrap_or("unnamed");

            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()));
            let payload = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic payload>".into());

            tracing::error!(
                service,
                thread = %thread_name,
                location = location.as_deref().unwrap_or("unknown"),
                %payload,
                "panic"
            );

            if chain_default {
                default_hook(info);
            }
        }));
    });
}

fn daily_file_writer(service: &'static str) -> Option<BoxMakeWriter> {
    let dir = PathBuf::from(std::env::var_os(LOG_DIR_ENV)?);
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("cannot create {LOG_DIR_ENV} {}: {err}; logging to stdout", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, format!("{service}.log"));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(BoxMakeWriter::new(writer))
}

/// Installs the global subscriber. `RUST_LOG` drives filtering (default
/// `info`). With `JM_LOG_DIR` set, output goes to `<dir>/<service>.log`
/// rotated daily instead of stdout.
pub fn init_tracing_subscriber(service: &'static str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match daily_file_writer(service) {
        Some(writer) => {
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
        }
        None => {
            let _ = builder.try_init();
        }
    }
}
