use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "nabu_engine=trace,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Caps wgpu's internal crates at `warn` unless the filter names them.
    pub quiet_wgpu: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            quiet_wgpu: true,
        }
    }
}

const WGPU_CRATES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. If another logger is already installed
/// (e.g. by a test harness) it is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(log::LevelFilter::Info);

        if config.quiet_wgpu {
            for name in WGPU_CRATES {
                builder.filter_module(name, log::LevelFilter::Warn);
            }
        }

        // Explicit filters come last so they override the defaults above.
        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());
        if let Some(filter) = &filter {
            builder.parse_filters(filter);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized (filter: {})", filter.as_deref().unwrap_or("info"));
        }
    });
}
