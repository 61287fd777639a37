//! Logging to stderr.

use anyhow::Context as _;
use log::Log as _;

/// A [`clap::Args`] struct for options controlling log output to stderr.
#[derive(Clone, Debug, clap::Args)]
#[allow(clippy::module_name_repetitions)]
pub(crate) struct LoggingArgs {
    /// Additional logging to stderr.
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Remove timestamps from logs so that they are deterministic.
    ///
    /// This option is intended for internal tests only.
    #[arg(long = "simplify-log-format", hide = true)]
    pub simplify_log_format: bool,
}

/// Install a [`log`] global logger based on user-provided `options`.
pub(crate) fn install(options: &LoggingArgs) -> Result<(), anyhow::Error> {
    use log::LevelFilter::{Error, Info, Off, Trace};

    let &LoggingArgs {
        verbose,
        simplify_log_format,
    } = options;

    let stderr_logger = *simplelog::WriteLogger::new(
        if verbose { Trace } else { Info },
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .set_time_level(if simplify_log_format { Off } else { Error })
            .build(),
        std::io::stderr(),
    );
    let max_level = simplelog::SharedLogger::level(&stderr_logger);

    log::set_boxed_logger(Box::new(VoxschemLogger { stderr_logger }))
        .context("failed to initialize logging")?;
    log::set_max_level(max_level);
    Ok(())
}

/// [`log::Log`] implementation that [`install()`] registers globally.
struct VoxschemLogger {
    stderr_logger: simplelog::WriteLogger<std::io::Stderr>,
}

impl log::Log for VoxschemLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        own_crates_filter(metadata) && self.stderr_logger.enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        if own_crates_filter(record.metadata()) {
            self.stderr_logger.log(record);
        }
    }

    fn flush(&self) {
        self.stderr_logger.flush();
    }
}

/// Only messages from this program and its library are shown; dependencies are quiet.
fn own_crates_filter(metadata: &log::Metadata<'_>) -> bool {
    metadata.target().starts_with("voxschem")
}
