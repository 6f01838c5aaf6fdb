//! # vidrs Configuration
//!
//! A minimal configuration system based on a string key/value store.
//! Keys are dotted (`http.port`, `uploads.max_bytes`); typed getters parse
//! on read so a bad value surfaces where it is used.
//!
//! ## Setting and reading values
//! ```rust
//! use vid_core::VidConfig;
//! let mut config = VidConfig::new();
//!
//! config.set("http.port", "3003");
//! config.set("uploads.dir", "uploads");
//!
//! assert_eq!(config.get("uploads.dir"), Some("uploads"));
//! assert_eq!(config.get_u16("http.port"), Some(3003));
//! ```
//!
//! ## Environment overrides
//! Two conventions are supported:
//!
//! - prefixed, nested variables: `VIDRS__UPLOADS__MAX_BYTES=5000` becomes
//!   `uploads.max_bytes` via [`VidConfig::load_env`]
//! - plain deployment variables (`PORT`, `BASE_URL`) bound to a key with
//!   [`VidConfig::bind_env`]

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct VidConfig {
    values: HashMap<String, String>,
}

impl VidConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    ///
    /// Example: config.set("http.port", "3003")
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only if nothing has been set for it yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Get a configuration value by key.
    ///
    /// Returns None if the key is not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|v| v.trim().parse::<u16>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// Copy every `PREFIX__A__B=value` environment variable into `a.b`.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    /// Bind a plain environment variable to `key`, if it is set.
    pub fn bind_env(&mut self, key: &str, var: &str) {
        if let Ok(value) = std::env::var(var) {
            self.set(key, value);
        }
    }

    fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}__", prefix);
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(&prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }
}
