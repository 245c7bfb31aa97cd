//! Nice output formatting for unfolding runs.

use std::fmt;

use log;

const UNFOLD_BANNER_LENGTH: usize = 103;

/// Logs an error to the `bandunfold-output` logger as well as the default logger.
macro_rules! unfold_error {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::error!($fmt, $($($arg)*)?);
        log::error!(target: "bandunfold-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a warning to the `bandunfold-output` logger.
macro_rules! unfold_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::warn!(target: "bandunfold-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a main output line to the `bandunfold-output` logger.
macro_rules! unfold_output {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::info!(target: "bandunfold-output", $fmt, $($($arg)*)?);
    }
}

pub(crate) use {unfold_error, unfold_output, unfold_warn};

/// Logs a nicely formatted section title to the `bandunfold-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(UNFOLD_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    unfold_output!("┌──{bar}──┐");
    unfold_output!("│§ {title:^length$} §│");
    unfold_output!("└──{bar}──┘");
}

/// Logs a nicely formatted subtitle to the `bandunfold-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let bar = "═".repeat(subtitle.chars().count());
    unfold_output!("{subtitle}");
    unfold_output!("{bar}");
}

/// Logs a nicely formatted macro-section beginning to the `bandunfold-output` logger.
pub(crate) fn log_macsec_begin(sectitle: &str) {
    let width = UNFOLD_BANNER_LENGTH - 14;
    let sectitle_space = sectitle.to_string() + " ";
    unfold_output!("❬❬❬❬❬ [Begin] {sectitle_space:❬<width$}");
}

/// Logs a nicely formatted macro-section ending to the `bandunfold-output` logger.
pub(crate) fn log_macsec_end(sectitle: &str) {
    let width = UNFOLD_BANNER_LENGTH - 14;
    let sectitle_space = sectitle.to_string() + " ";
    unfold_output!("❭❭❭❭❭ [ End ] {sectitle_space:❭<width$}");
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging unfolding outputs nicely.
pub(crate) trait UnfoldOutput: fmt::Display {
    /// Logs display output line by line.
    fn log_output_display(&self) {
        self.to_string().lines().for_each(|line| {
            unfold_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> UnfoldOutput for T where T: fmt::Display {}
