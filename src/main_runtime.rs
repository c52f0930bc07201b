use factory_status::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

fn env_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},factory_status=debug,sqlx=warn",
            logging.level
        ))
    })
}

/// Daily rotating file writer under FACTORY_LOG_DIR, if that directory is writable.
fn file_writer() -> Option<(tracing_appender::non_blocking::NonBlocking, String)> {
    let log_dir = std::env::var("FACTORY_LOG_DIR").ok()?;

    // `rolling::daily` panics if it cannot create the initial file, so check first
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory {log_dir} ({e}), file logging disabled");
        return None;
    }
    let test_path = std::path::Path::new(&log_dir).join(".factory_write_test");
    if let Err(e) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&test_path)
    {
        eprintln!("Warning: Could not write to log directory {log_dir} ({e}), file logging disabled");
        return None;
    }
    let _ = std::fs::remove_file(&test_path);

    let file_appender = tracing_appender::rolling::daily(&log_dir, "factory-status.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the guard alive for the life of the process
    Box::leak(Box::new(guard));

    Some((non_blocking, log_dir))
}

pub fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let file = file_writer();
    let file_dir = file.as_ref().map(|(_, dir)| dir.clone());
    let file_layer = file.map(|(writer, _)| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false) // No color codes in file
            .with_target(true)
    });

    // Console layer, plain or JSON
    let (console_layer, json_layer) = if logging.json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(env_filter(logging))
        .with(console_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = file_dir {
        eprintln!("Logging to: {dir}/factory-status.log");
    }
}

pub fn init_logging_simple() {
    // Minimal logging for one-shot commands; stdout carries the snapshot
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .try_init();
}
