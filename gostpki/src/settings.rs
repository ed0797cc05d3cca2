//! Process-wide library settings.
//!
//! Settings are installed once during single-threaded initialization and
//! read immutably afterwards; worker code receives values, never mutable
//! references. The openssl-compatibility flag additionally travels as an
//! explicit codec parameter, so imports never mutate global state.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default PBKDF2 iteration count for password-derived container keys.
const DEFAULT_PBKDF2_ITERATIONS: u32 = 2000;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Library-wide defaults.
#[derive(Clone, Debug)]
pub struct Settings {
    /// PBKDF2 iteration count used when deriving container keys from
    /// passwords.
    pub pbkdf2_iteration_count: u32,
    /// Whether key wraps are written in the byte order compatible with
    /// OpenSSL's GOST engine.
    pub openssl_compat: bool,
    /// Directory of the trusted CA certificate repository.
    pub ca_repository_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pbkdf2_iteration_count: DEFAULT_PBKDF2_ITERATIONS,
            openssl_compat: false,
            ca_repository_path: std::env::temp_dir().join("gostpki-ca"),
        }
    }
}

impl Settings {
    /// Install the process-wide settings. Returns `false` when settings
    /// were installed before; the first installation wins.
    pub fn install(self) -> bool {
        SETTINGS.set(self).is_ok()
    }

    /// A copy of the installed settings, or the defaults.
    pub fn get() -> Settings {
        SETTINGS.get().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::get();
        assert!(settings.pbkdf2_iteration_count >= 1000);
        assert!(!settings.openssl_compat);
    }
}
