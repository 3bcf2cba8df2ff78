use std::{io::Write, time::Duration};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::{Level, LevelFilter};
use env_logger::{Builder, Env, fmt::Color};
use once_cell::sync::OnceCell;
use thiserror::Error;

/// Environment variable overriding the command-line verbosity. e.g. `ADMIXSIM_LOG=demography=trace`
pub const LOG_ENV_VAR: &str = "ADMIXSIM_LOG";

static INSTANCE: OnceCell<Logger> = OnceCell::new();

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Failed to register the global logger: a logger was already set")]
    AlreadySet(#[from] log::SetLoggerError),

    #[error("Logger was initialized twice")]
    AlreadyInitialized,
}

#[derive(Debug)]
pub struct Logger {
    multi_pg: MultiProgress,
}

impl Logger {
    /// Initialize the global logger, with a verbosity level ranging from 0 (errors only) to 4 (trace).
    /// 
    /// # Errors
    /// - if a global logger has already been set for this process.
    pub fn init(verbosity: u8) -> Result<(), LoggerError> {
        let log_level = Self::u8_to_loglevel(verbosity);
        let env = Env::default().filter(LOG_ENV_VAR);

        let logger = Builder::new().filter_level(log_level)
            .format(|buf, record| {
                let (traceback, set_intensity) = match record.level() {
                    Level::Error => (format!("(@ {}:{}) ", record.file().unwrap_or("unknown"), record.line().unwrap_or(0)), true),
                    _            => (String::new(), false),
                };

                let mut arg_style = buf.style();
                arg_style.set_intense(set_intensity);

                let mut level_style = buf.style();
                let color = match record.level() {
                    Level::Error => Color::Red,
                    Level::Warn  => Color::Yellow,
                    Level::Info  => Color::Green,
                    Level::Debug => Color::Blue,
                    Level::Trace => Color::Cyan
                };
                level_style.set_color(color).set_bold(true);

                writeln!(
                    buf,
                    "[{} {: <5} {}] {traceback}{}",
                    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                    level_style.value(record.level()),
                    record.target(),
                    arg_style.value(record.args())
                )
            })
            .parse_env(env)
            .build();

        // Route log records through the progress bars, to avoid garbled spinners.
        let max_level = logger.filter();
        let multi_pg  = MultiProgress::new();
        LogWrapper::new(multi_pg.clone(), logger).try_init()?;
        log::set_max_level(max_level);

        INSTANCE.set(Self{multi_pg}).map_err(|_| LoggerError::AlreadyInitialized)
    }

    fn u8_to_loglevel(verbosity: u8) -> LevelFilter {
        match verbosity {
            0            => LevelFilter::Error,
            1            => LevelFilter::Warn,
            2            => LevelFilter::Info,
            3            => LevelFilter::Debug,
            4..= u8::MAX => LevelFilter::Trace
        }
    }

    pub fn set_level(verbosity: u8) {
        log::set_max_level(Self::u8_to_loglevel(verbosity));
    }

    /// Shared progress-bar handle. Returns `None` when the logger was never initialized
    /// (e.g. when running as a library).
    pub fn multi() -> Option<&'static MultiProgress> {
        INSTANCE.get().map(|logger| &logger.multi_pg)
    }

    /// Spawn a ticking spinner carrying `message`. The spinner is hidden if the logger was
    /// never initialized.
    pub fn spinner(message: impl Into<String>) -> ProgressBar {
        let spinner = match Self::multi() {
            Some(multi) => multi.add(ProgressBar::new_spinner()),
            None        => ProgressBar::hidden(),
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }
}
