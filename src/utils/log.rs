// src/utils/log.rs

//! Console reporter for classification events.
//!
//! Every event is printed as one line starting with a bracketed tag
//! (`[NEW]`, `[CHANGED]`, `[UNCHANGED]`, `[inf]`, `[wrn]`, `[err]`).
//! Diagnostics that are not part of the user-facing report go through the
//! `log` facade instead.

use std::path::Path;
use std::time::Duration;

use crate::models::{Outcome, UnchangedReason};

/// How much the reporter prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Classifications and problems, no run summary
    Quiet,
    /// Classifications, problems and the run summary
    #[default]
    Normal,
    /// Everything, including per-step progress and unchanged resources
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Self::Verbose,
            (false, true) => Self::Quiet,
            _ => Self::Normal,
        }
    }
}

/// Line tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Info,
    Warn,
    Error,
}

impl Tag {
    fn as_str(&self) -> &'static str {
        match self {
            Tag::Info => "inf",
            Tag::Warn => "wrn",
            Tag::Error => "err",
        }
    }
}

/// Format a tagged line.
pub fn format_line(tag: Tag, message: &str) -> String {
    format!("[{}] {}", tag.as_str(), message)
}

/// Format the lines reported for a classification.
///
/// Unchanged outcomes are only printed in verbose mode, which the caller
/// decides.
pub fn format_outcome(canonical: &str, outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::New { .. } => vec![format!("[NEW] {canonical}")],
        Outcome::Changed { old_path, new_path } => {
            let old = old_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unknown)".to_string());
            vec![
                format!("[CHANGED] {canonical}"),
                format!("    Old file: {old}"),
                format!("    New file: {}", new_path.display()),
            ]
        }
        Outcome::Unchanged { reason } => {
            let why = match reason {
                UnchangedReason::RawHashMatch => "raw hash match",
                UnchangedReason::StoredHashMatch => "stored hash match",
            };
            vec![format!("[UNCHANGED] {canonical} ({why})")]
        }
    }
}

/// Prints user-facing report lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbosity: Verbosity,
}

impl Reporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Per-step progress, verbose only.
    pub fn step(&self, message: &str) {
        if self.is_verbose() {
            println!("{}", format_line(Tag::Info, message));
        }
    }

    /// Warning that does not stop the current URL.
    pub fn warn(&self, message: &str) {
        eprintln!("{}", format_line(Tag::Warn, message));
    }

    /// Error that ended the current URL's pipeline.
    pub fn error(&self, message: &str) {
        eprintln!("{}", format_line(Tag::Error, message));
    }

    /// Classification of one check.
    pub fn outcome(&self, canonical: &str, outcome: &Outcome) {
        if matches!(outcome, Outcome::Unchanged { .. }) && !self.is_verbose() {
            return;
        }
        for line in format_outcome(canonical, outcome) {
            println!("{line}");
        }
        if matches!(outcome, Outcome::Changed { .. }) {
            println!();
        }
    }

    /// Saved-file notice, verbose only.
    pub fn saved(&self, url: &str, path: &Path) {
        self.step(&format!("saving {} -> {}", url, path.display()));
    }

    /// Run summary, suppressed in quiet mode.
    pub fn completed(&self, elapsed: Duration) {
        if self.verbosity > Verbosity::Quiet {
            println!();
            println!("{}", format_line(Tag::Info, &format!("Completed in {elapsed:?}")));
        }
    }

    /// A titled listing requested explicitly by the user; printed at any verbosity.
    pub fn section(&self, title: &str, items: &[String]) {
        println!("{}", format_line(Tag::Info, title));
        for item in items {
            println!("    {item}");
        }
    }

    /// A summary section with key/value items, suppressed in quiet mode.
    pub fn summary(&self, title: &str, items: &[(&str, String)]) {
        if self.verbosity > Verbosity::Quiet {
            println!("{}", format_line(Tag::Info, title));
            for (key, value) in items {
                println!("    {key}: {value}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
    }

    #[test]
    fn test_format_line() {
        assert_eq!(format_line(Tag::Warn, "careful"), "[wrn] careful");
        assert_eq!(format_line(Tag::Error, "boom"), "[err] boom");
    }

    #[test]
    fn test_format_changed_with_unknown_old_file() {
        let outcome = Outcome::Changed {
            old_path: None,
            new_path: PathBuf::from("data/ex.com/2026-01-01_10/abc/a.js"),
        };
        let lines = format_outcome("https://ex.com/a.js", &outcome);
        assert_eq!(lines[0], "[CHANGED] https://ex.com/a.js");
        assert_eq!(lines[1], "    Old file: (unknown)");
        assert_eq!(lines[2], "    New file: data/ex.com/2026-01-01_10/abc/a.js");
    }

    #[test]
    fn test_format_unchanged_reason() {
        let outcome = Outcome::Unchanged {
            reason: UnchangedReason::RawHashMatch,
        };
        assert_eq!(
            format_outcome("https://ex.com/a.js", &outcome),
            vec!["[UNCHANGED] https://ex.com/a.js (raw hash match)"]
        );
    }
}
