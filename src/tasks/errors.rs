//! Task error parsing and categorization
//!
//! Parses output from failed maintenance commands and categorizes errors
//! to provide user-friendly messages with actionable suggestions.

use regex::Regex;
use std::sync::LazyLock;

/// Category of the error with associated details
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)] // Reserved for per-category icons/colors in the UI
pub enum ErrorCategory {
    /// Another package manager instance holds the database lock
    DatabaseLocked,
    /// Network issues (mirror unreachable, download failure)
    Network { detail: String },
    /// Signature or keyring problems
    Keyring { package: Option<String> },
    /// Not enough disk space for the transaction
    DiskSpace,
    /// Permission denied (sudo declined or misconfigured askpass)
    Permission,
    /// Dependency conflicts blocking the transaction
    Dependency { detail: String },
    /// Generic/unknown error
    Unknown,
}

/// Parsed error with user-friendly information
#[derive(Debug, Clone)]
pub struct ParsedError {
    pub category: ErrorCategory,
    /// Short summary (one line)
    pub summary: String,
    /// Longer description if available
    pub detail: Option<String>,
    /// User-friendly suggestion
    pub suggestion: String,
}

impl ParsedError {
    /// Parse failed command output into a categorized error
    pub fn from_output(output: &str, operation: &str) -> Self {
        if let Some(err) = parse_lock_error(output, operation) {
            return err;
        }
        if let Some(err) = parse_keyring_error(output, operation) {
            return err;
        }
        if let Some(err) = parse_network_error(output, operation) {
            return err;
        }
        if let Some(err) = parse_disk_space_error(output, operation) {
            return err;
        }
        if let Some(err) = parse_permission_error(output, operation) {
            return err;
        }
        if let Some(err) = parse_dependency_error(output, operation) {
            return err;
        }

        Self::generic(output, operation)
    }

    fn generic(output: &str, operation: &str) -> Self {
        let detail = output
            .lines()
            .find(|line| line.contains("error:"))
            .or_else(|| output.lines().find(|line| !line.trim().is_empty()))
            .map(|line| line.trim().trim_start_matches("error:").trim().to_string())
            .filter(|detail| !detail.is_empty());

        Self {
            category: ErrorCategory::Unknown,
            summary: format!("{} failed", operation),
            detail,
            suggestion: "Check the output above for details.".to_string(),
        }
    }
}

static LOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)unable to lock database|db\.lck").unwrap());

fn parse_lock_error(output: &str, operation: &str) -> Option<ParsedError> {
    if !LOCK_RE.is_match(output) {
        return None;
    }
    Some(ParsedError {
        category: ErrorCategory::DatabaseLocked,
        summary: format!("{} failed: package database is locked", operation),
        detail: Some("Another package manager instance may be running.".to_string()),
        suggestion: "Close other package managers, or remove /var/lib/pacman/db.lck if none is running.".to_string(),
    })
}

static KEYRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)signature from .* is (?:unknown trust|invalid)|key .* could not be looked up|marginal trust")
        .unwrap()
});

static KEYRING_PKG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([a-z0-9@._+-]+):\s+signature from").unwrap());

fn parse_keyring_error(output: &str, operation: &str) -> Option<ParsedError> {
    if !KEYRING_RE.is_match(output) {
        return None;
    }
    let package = KEYRING_PKG_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let detail = package
        .as_ref()
        .map(|p| format!("Signature check failed for '{}'.", p));

    Some(ParsedError {
        category: ErrorCategory::Keyring { package },
        summary: format!("{} failed: package signature error", operation),
        detail,
        suggestion: "Refresh the keyrings: sudo pacman -Sy archlinux-keyring manjaro-keyring".to_string(),
    })
}

static NETWORK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)failed retrieving file|could not resolve host|connection timed out|download library error|temporary failure in name resolution")
        .unwrap()
});

fn parse_network_error(output: &str, operation: &str) -> Option<ParsedError> {
    if !NETWORK_RE.is_match(output) {
        return None;
    }
    let detail = output
        .lines()
        .find(|line| NETWORK_RE.is_match(line))
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| "Download failure".to_string());

    Some(ParsedError {
        category: ErrorCategory::Network {
            detail: detail.clone(),
        },
        summary: format!("{} failed: network error", operation),
        detail: Some(detail),
        suggestion: "Check your internet connection, or refresh the mirror list and retry.".to_string(),
    })
}

static DISK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)not enough free disk space|no space left on device").unwrap());

fn parse_disk_space_error(output: &str, operation: &str) -> Option<ParsedError> {
    if !DISK_RE.is_match(output) {
        return None;
    }
    Some(ParsedError {
        category: ErrorCategory::DiskSpace,
        summary: format!("{} failed: not enough disk space", operation),
        detail: None,
        suggestion: "Free up space, e.g. clean the package cache or vacuum old logs.".to_string(),
    })
}

static PERMISSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)permission denied|sudo: .*(askpass|authenticat)|you cannot perform this operation unless you are root")
        .unwrap()
});

fn parse_permission_error(output: &str, operation: &str) -> Option<ParsedError> {
    if !PERMISSION_RE.is_match(output) {
        return None;
    }
    Some(ParsedError {
        category: ErrorCategory::Permission,
        summary: format!("{} failed: permission denied", operation),
        detail: output
            .lines()
            .find(|line| PERMISSION_RE.is_match(line))
            .map(|line| line.trim().to_string()),
        suggestion: "Check that sudo works for your user and the configured askpass helper exists.".to_string(),
    })
}

static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)unresolvable package conflicts|breaks dependency|dependency cycle|removing .* breaks")
        .unwrap()
});

fn parse_dependency_error(output: &str, operation: &str) -> Option<ParsedError> {
    if !DEPENDENCY_RE.is_match(output) {
        return None;
    }
    let detail = output
        .lines()
        .find(|line| DEPENDENCY_RE.is_match(line))
        .map(|line| line.trim().to_string())
        .unwrap_or_default();

    Some(ParsedError {
        category: ErrorCategory::Dependency {
            detail: detail.clone(),
        },
        summary: format!("{} failed: dependency conflict", operation),
        detail: Some(detail),
        suggestion: "Resolve the conflict manually, then run the fix dependencies task.".to_string(),
    })
}
