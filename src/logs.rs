use log::LevelFilter;
use log4rs::{
    Config, Handle,
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            RollingFileAppender,
            policy::compound::{
                CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
            },
        },
    },
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const LOG_SIZE_LIMIT: u64 = 10 * 1024 * 1024; // 10 MB

const LOG_FILE_COUNT: u32 = 3;

/// Database drivers log every statement at info.
const QUIET_TARGETS: [&str; 2] = ["sqlx", "sea_orm"];

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("{0} must be set")]
    MissingVar(&'static str),
    #[error("invalid log file setup: {0}")]
    Appender(String),
    #[error("invalid logger config: {0}")]
    Config(String),
}

fn env(name: &'static str) -> Result<String, LogSetupError> {
    std::env::var(name).map_err(|_| LogSetupError::MissingVar(name))
}

pub fn init_logger() -> Result<Handle, LogSetupError> {
    let file_path = env("LOG_FILE_PATH")?;
    let archive_pattern = env("LOG_ARCHIVE_PATTERN")?;

    let stderr_level = LevelFilter::Info;
    let file_level = LevelFilter::Debug;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();

    let trigger = SizeTrigger::new(LOG_SIZE_LIMIT);
    let roller = FixedWindowRoller::builder()
        .build(&archive_pattern, LOG_FILE_COUNT)
        .map_err(|e| LogSetupError::Appender(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    let logfile = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
        .build(file_path, Box::new(policy))
        .map_err(|e| LogSetupError::Appender(e.to_string()))?;

    let mut builder = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(file_level)))
                .build("logfile", Box::new(logfile)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(stderr_level)))
                .build("stderr", Box::new(stderr)),
        );
    for target in QUIET_TARGETS {
        builder = builder.logger(Logger::builder().build(target, LevelFilter::Warn));
    }
    let config = builder
        .build(
            Root::builder()
                .appender("logfile")
                .appender("stderr")
                .build(LevelFilter::Trace),
        )
        .map_err(|e| LogSetupError::Config(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| LogSetupError::Config(e.to_string()))
}
