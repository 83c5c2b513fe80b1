// UI layer: the continue/abort question asked after a failed file, the
// progress bar shown while the tree is processed and the logger that keeps
// log lines from tearing that bar.

use crate::error::Error;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use log::{Log, Metadata, Record};

/// Decides whether the run goes on after a file could not be uploaded.
pub trait FailurePrompt {
    /// `true` skips the failed file and continues, `false` aborts the run.
    fn should_continue(&mut self, failure: &Error) -> bool;
}

/// What to do when a file fails, as chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OnFailure {
    /// Ask the operator every time.
    Ask,
    /// Log the failure and move on.
    Skip,
    /// Stop at the first failure.
    Abort,
}

impl FailurePrompt for OnFailure {
    fn should_continue(&mut self, failure: &Error) -> bool {
        match self {
            OnFailure::Ask => TerminalPrompt.should_continue(failure),
            OnFailure::Skip => true,
            OnFailure::Abort => false,
        }
    }
}

/// Asks `continue? Y/n` on the terminal. An empty answer or `y` continues;
/// anything else, including a closed stdin, aborts.
pub struct TerminalPrompt;

impl FailurePrompt for TerminalPrompt {
    fn should_continue(&mut self, failure: &Error) -> bool {
        eprintln!("{failure}");
        let answer = match Input::<String>::new()
            .with_prompt("continue? Y/n")
            .allow_empty(true)
            .interact_text()
        {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("cannot read answer: {e}");
                return false;
            }
        };
        is_yes(&answer)
    }
}

/// Answer parsing for [`TerminalPrompt`]: the default is yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "" | "y" | "Y")
}

/// Bar counting processed files.
pub fn file_progress(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }
    bar
}

/// `env_logger` output printed with the progress bar hidden for the write.
pub struct BarLogger {
    inner: env_logger::Logger,
    bar: ProgressBar,
}

impl BarLogger {
    pub fn new(inner: env_logger::Logger, bar: ProgressBar) -> Self {
        BarLogger { inner, bar }
    }
}

impl Log for BarLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.inner.matches(record) {
            self.bar.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger (`RUST_LOG`, default `info`) around `bar`.
pub fn init_logging(bar: &ProgressBar) -> Result<(), log::SetLoggerError> {
    let inner = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .build();
    let level = inner.filter();
    log::set_boxed_logger(Box::new(BarLogger::new(inner, bar.clone())))?;
    log::set_max_level(level);
    Ok(())
}
