use std::path::PathBuf;

use vid_core::VidConfig;

pub const ENV_PREFIX: &str = "VIDRS";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3003;
pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100_000_000;
pub const DEFAULT_UPLOAD_FIELD: &str = "video";
pub const DEFAULT_UPLOAD_MIME: &str = "video/mp4";

/// Plain deployment variables and the keys they feed.
const ENV_BINDINGS: &[(&str, &str)] = &[
    ("http.host", "HOST"),
    ("http.port", "PORT"),
    ("http.base_url", "BASE_URL"),
    ("uploads.dir", "UPLOAD_DIR"),
    ("uploads.max_bytes", "MAX_UPLOAD_BYTES"),
    ("uploads.field", "UPLOAD_FIELD"),
    ("uploads.mime", "UPLOAD_MIME"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub upload_field: String,
    pub upload_mime: String,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// Plain variables (`PORT`, `BASE_URL`, ...) are read first; prefixed
    /// ones (`VIDRS__HTTP__PORT`) override them.
    pub fn from_env() -> Self {
        let mut config = VidConfig::new();
        for (key, var) in ENV_BINDINGS {
            config.bind_env(key, var);
        }
        config.load_env(ENV_PREFIX);
        Self::from_config(config)
    }

    pub fn from_config(mut config: VidConfig) -> Self {
        config.set_default("http.host", DEFAULT_HOST);
        config.set_default("http.base_url", DEFAULT_BASE_URL);
        config.set_default("uploads.dir", DEFAULT_UPLOAD_DIR);
        config.set_default("uploads.field", DEFAULT_UPLOAD_FIELD);
        config.set_default("uploads.mime", DEFAULT_UPLOAD_MIME);

        Self {
            host: text(&config, "http.host"),
            port: number(&config, "http.port", VidConfig::get_u16, DEFAULT_PORT),
            base_url: text(&config, "http.base_url"),
            upload_dir: PathBuf::from(text(&config, "uploads.dir")),
            max_upload_bytes: number(
                &config,
                "uploads.max_bytes",
                VidConfig::get_u64,
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
            upload_field: text(&config, "uploads.field"),
            upload_mime: text(&config, "uploads.mime"),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(VidConfig::new())
    }
}

fn text(config: &VidConfig, key: &str) -> String {
    config.get(key).unwrap_or_default().to_string()
}

fn number<T>(config: &VidConfig, key: &str, read: fn(&VidConfig, &str) -> Option<T>, default: T) -> T
where
    T: std::fmt::Display + Copy,
{
    match (read(config, key), config.get(key)) {
        (Some(value), _) => value,
        (None, Some(raw)) => {
            tracing::warn!(key, value = raw, default = %default, "invalid number in config, using default");
            default
        }
        (None, None) => default,
    }
}
