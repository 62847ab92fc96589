//! Package manager command builders and queries
//!
//! The command strings live here, in one place, as configuration data. All
//! mutating commands are wrapped with the askpass-driven sudo prefix so no
//! interactive password prompt blocks a task worker.

use anyhow::Result;

use super::executor::{command_exists, run_capture};
use crate::config::Config;

/// AUR helpers probed when no override is configured
const AUR_HELPER_CANDIDATES: &[&str] = &["yay", "paru"];

/// Quote a string for the POSIX shell using single quotes
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Wrap a command with privilege escalation via sudo and the askpass helper
pub fn sudo_shell(config: &Config, command: &str) -> String {
    format!(
        "env SUDO_ASKPASS={} sudo -A sh -c {}",
        config.askpass.display(),
        shell_quote(command)
    )
}

pub fn mirror_refresh_command(config: &Config) -> String {
    sudo_shell(
        config,
        &format!(
            "pacman-mirrors --fasttrack {} && pacman -Syy",
            config.mirror_fasttrack
        ),
    )
}

pub fn upgrade_command(config: &Config) -> String {
    sudo_shell(config, "pacman -Syu --noconfirm")
}

pub fn cache_clean_command(config: &Config) -> String {
    sudo_shell(config, "pacman -Sc --noconfirm")
}

pub fn orphan_removal_command(config: &Config, orphans: &[String]) -> String {
    sudo_shell(
        config,
        &format!("pacman -Rns {} --noconfirm", orphans.join(" ")),
    )
}

pub fn vacuum_logs_command(config: &Config) -> String {
    sudo_shell(
        config,
        &format!(
            "journalctl --vacuum-time={} && find /var/log -type f -name \"*.log.*\" -delete 2>/dev/null || true",
            config.journal_retention
        ),
    )
}

/// AUR helpers run unprivileged; they escalate internally when needed
pub fn aur_upgrade_command(helper: &str) -> String {
    format!("{} -Sua --noconfirm", helper)
}

/// Query the current orphan list (`pacman -Qtdq`).
///
/// pacman exits non-zero when there are no orphans, so only the output is
/// consulted.
pub async fn list_orphans() -> Result<Vec<String>> {
    let (_, stdout, _) = run_capture("pacman", &["-Qtdq"]).await?;
    Ok(parse_package_list(&stdout))
}

/// Check installed package files (`pacman -Qk`) and return problem lines
pub async fn integrity_issues() -> Result<Vec<String>> {
    let (_, stdout, stderr) = run_capture("pacman", &["-Qk"]).await?;
    let mut combined = stdout;
    combined.push('\n');
    combined.push_str(&stderr);
    Ok(filter_integrity_lines(&combined))
}

/// Find a usable AUR helper: the configured override, or the first of
/// yay/paru present on PATH
pub async fn detect_aur_helper(config: &Config) -> Option<String> {
    if let Some(helper) = &config.aur_helper {
        if command_exists(helper).await {
            return Some(helper.clone());
        }
        tracing::warn!("Configured AUR helper '{}' not found on PATH", helper);
        return None;
    }
    for candidate in AUR_HELPER_CANDIDATES {
        if command_exists(candidate).await {
            return Some(candidate.to_string());
        }
    }
    None
}

/// One package name per non-empty line
pub fn parse_package_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Lines from `pacman -Qk` that indicate real problems
pub fn filter_integrity_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| {
            line.contains("missing") || line.contains("changed") || line.contains("corrupted")
        })
        .map(|line| line.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("pacman -Syu"), "'pacman -Syu'");
    }

    #[test]
    fn test_shell_quote_embedded_single_quote() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_sudo_shell_wraps_with_askpass() {
        let config = Config::default();
        let cmd = sudo_shell(&config, "pacman -Syu --noconfirm");
        assert_eq!(
            cmd,
            "env SUDO_ASKPASS=/usr/bin/ssh-askpass sudo -A sh -c 'pacman -Syu --noconfirm'"
        );
    }

    #[test]
    fn test_mirror_refresh_uses_configured_count() {
        let config = Config {
            mirror_fasttrack: 8,
            ..Config::default()
        };
        let cmd = mirror_refresh_command(&config);
        assert!(cmd.contains("pacman-mirrors --fasttrack 8"));
        assert!(cmd.contains("pacman -Syy"));
    }

    #[test]
    fn test_orphan_removal_joins_packages() {
        let config = Config::default();
        let orphans = vec!["libfoo".to_string(), "libbar".to_string()];
        let cmd = orphan_removal_command(&config, &orphans);
        assert!(cmd.contains("pacman -Rns libfoo libbar --noconfirm"));
    }

    #[test]
    fn test_vacuum_uses_configured_retention() {
        let config = Config {
            journal_retention: "14d".to_string(),
            ..Config::default()
        };
        assert!(vacuum_logs_command(&config).contains("--vacuum-time=14d"));
    }

    #[test]
    fn test_aur_upgrade_is_unprivileged() {
        let cmd = aur_upgrade_command("yay");
        assert_eq!(cmd, "yay -Sua --noconfirm");
        assert!(!cmd.contains("sudo"));
    }

    #[test]
    fn test_parse_package_list() {
        assert_eq!(
            parse_package_list("libfoo\nlibbar\n\n  libbaz  \n"),
            vec!["libfoo", "libbar", "libbaz"]
        );
        assert!(parse_package_list("").is_empty());
        assert!(parse_package_list("\n\n").is_empty());
    }

    #[test]
    fn test_filter_integrity_lines() {
        let output = "\
backup file: glibc: /etc/locale.gen (Modification time mismatch)
warning: libfoo: /usr/lib/libfoo.so (GID mismatch)
libbar: 3 missing files
libbaz: /usr/bin/baz (md5 checksum changed)
pkg: 120 total files, 0 altered files";
        let issues = filter_integrity_lines(output);
        assert_eq!(
            issues,
            vec![
                "libbar: 3 missing files",
                "libbaz: /usr/bin/baz (md5 checksum changed)"
            ]
        );
    }
}
