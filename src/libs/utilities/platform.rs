// Platform detection for release selection.
//
// The Cloud SDK publishes releases keyed by the platform tokens `linux`,
// `darwin` and `win32`, and by the architecture tokens `x64` and `arm64`.
// These helpers map what the Rust toolchain reports
// (`std::env::consts::{OS, ARCH}`) onto those tokens. Unknown values pass
// through unchanged with a warning; whether they are fatal is decided where
// the release URL is built.

use crate::log_warn;
use colored::Colorize;

/// Detects the current operating system as a release platform token
/// (`linux`, `darwin` or `win32`).
pub fn detect_os() -> String {
    normalize_os(std::env::consts::OS)
}

/// Detects the current CPU architecture as a release architecture token
/// (`x64` or `arm64`).
pub fn detect_arch() -> String {
    normalize_arch(std::env::consts::ARCH)
}

/// Normalizes an OS name into the release platform token.
///
/// `macos`/`darwin` map to `darwin`, `windows`/`win32` to `win32`, `linux`
/// stays `linux`. Anything else is returned lowercased as-is; the release
/// addresser rejects unrecognized platforms with a descriptive error.
pub fn normalize_os(os: &str) -> String {
    match os.to_lowercase().as_str() {
        "linux" => "linux".to_string(),
        "macos" | "darwin" | "apple-darwin" => "darwin".to_string(),
        "windows" | "win32" | "win64" => "win32".to_string(),
        other => {
            log_warn!(
                "[Platform] Unknown OS variant '{}', using as-is. The Cloud SDK may not publish releases for it.",
                other.purple()
            );
            other.to_string()
        }
    }
}

/// Normalizes a CPU architecture name into the release architecture token.
///
/// `x86_64`/`amd64` map to `x64`, `aarch64` to `arm64`. Anything else is
/// returned lowercased as-is and will be embedded in the release filename
/// unchanged.
pub fn normalize_arch(arch: &str) -> String {
    match arch.to_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" => "x64".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        other => {
            log_warn!(
                "[Platform] Unknown ARCH variant '{}', using as-is.",
                other.purple()
            );
            other.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_variants_normalize_to_release_tokens() {
        assert_eq!(normalize_os("linux"), "linux");
        assert_eq!(normalize_os("macos"), "darwin");
        assert_eq!(normalize_os("Darwin"), "darwin");
        assert_eq!(normalize_os("windows"), "win32");
    }

    #[test]
    fn unknown_os_passes_through_lowercased() {
        assert_eq!(normalize_os("TempleOS"), "templeos");
    }

    #[test]
    fn arch_variants_normalize_to_release_tokens() {
        assert_eq!(normalize_arch("x86_64"), "x64");
        assert_eq!(normalize_arch("amd64"), "x64");
        assert_eq!(normalize_arch("aarch64"), "arm64");
        assert_eq!(normalize_arch("arm64"), "arm64");
    }

    #[test]
    fn unknown_arch_passes_through() {
        assert_eq!(normalize_arch("s390x"), "s390x");
    }
}
