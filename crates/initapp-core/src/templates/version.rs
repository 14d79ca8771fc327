//! Version comparison between the CLI and a template pack

use semver::Version;

/// Command suggested when the CLI is older than the pack
pub const UPGRADE_COMMAND: &str = "cargo install init-app --force";

/// Parse a version string, accepting a leading `v`
pub fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).ok()
}

/// Warn when the pack was written for a newer CLI.
///
/// Unparseable versions never produce a warning.
pub fn check_compatibility(cli_version: &str, pack_version: &str) -> Option<String> {
    let cli = parse_version(cli_version)?;
    let pack = parse_version(pack_version)?;

    (cli < pack).then(|| {
        format!(
            "template pack {} expects init-app {} or newer (running {}); upgrade with `{}`",
            pack_version, pack, cli, UPGRADE_COMMAND
        )
    })
}
