//! Live settings store
//!
//! Owns the current [`Config`], its JSON file and the list of subscribers.
//! Updates are serialised: mutate, persist, then notify, under one guard.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::fields::FieldRegistry;
use crate::config::settings::{Config, CONFIG_VERSION};
use crate::constants::CONFIG_FILE_NAME;
use crate::error::Result;
use crate::protocol::Value;

/// Callback invoked with the new config after every change.
pub type Subscriber = Box<dyn Fn(&Config) + Send + Sync>;

pub struct ConfigStore {
    path: PathBuf,
    config: Mutex<Config>,
    subscribers: Mutex<Vec<Subscriber>>,
    registry: FieldRegistry,
    /// Held across mutate + persist + notify
    update_guard: Mutex<()>,
}

impl ConfigStore {
    /// Create a store backed by `CONFIG_FILE_NAME` inside `dir`.
    /// Starts from defaults; call [`ConfigStore::load`] to read the file.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_path(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Mutex::new(Config::default()),
            subscribers: Mutex::new(Vec::new()),
            registry: FieldRegistry::new(),
            update_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> Config {
        self.config.lock().clone()
    }

    /// Load settings from disk, healing a missing or corrupt file with
    /// defaults. Never fails; problems are logged.
    pub fn load(&self) -> Config {
        let _guard = self.update_guard.lock();

        let loaded = match fs::read_to_string(&self.path) {
            Ok(json) => match serde_json::from_str::<Config>(&json) {
                Ok(config) => {
                    info!("Loaded config from {}", self.path.display());
                    Some(config.sanitized())
                }
                Err(e) => {
                    warn!(
                        "Config at {} could not be decoded ({}), overwriting with defaults",
                        self.path.display(),
                        e
                    );
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config file did not exist, creating one at {}", self.path.display());
                None
            }
            Err(e) => {
                warn!("Failed to read config at {}: {}, using defaults", self.path.display(), e);
                None
            }
        };

        let config = match loaded {
            Some(config) if config.version != CONFIG_VERSION => {
                warn!(
                    "Config version {} does not match {}, rewriting in the current format",
                    config.version, CONFIG_VERSION
                );
                let current = Config {
                    version: CONFIG_VERSION,
                    ..config
                };
                if let Err(e) = self.write(&current) {
                    error!("Failed to rewrite config: {}", e);
                }
                current
            }
            Some(config) => config,
            None => {
                let defaults = Config::default();
                if let Err(e) = self.write(&defaults) {
                    error!("Failed to write default config: {}", e);
                }
                defaults
            }
        };

        *self.config.lock() = config.clone();
        self.notify(&config);
        config
    }

    /// Persist the current settings.
    pub fn save(&self) -> Result<()> {
        let _guard = self.update_guard.lock();
        let config = self.snapshot();
        self.write(&config)
    }

    /// Update one field by name from an OSC value.
    ///
    /// Returns `true` when the field was updated. Unknown names and values
    /// of the wrong type are logged and ignored: nothing is persisted and no
    /// subscriber is notified.
    pub fn update_field(&self, name: &str, value: &Value) -> bool {
        let _guard = self.update_guard.lock();

        let mut config = self.snapshot();
        if let Err(e) = self.registry.apply(&mut config, name, value) {
            warn!("Ignoring settings update: {}", e);
            return false;
        }

        info!("[UPDATE] {} = {}", name, value);
        *self.config.lock() = config.clone();

        if let Err(e) = self.write(&config) {
            error!("Failed to persist config after updating {}: {}", name, e);
        }
        self.notify(&config);
        true
    }

    /// Register a callback run after every change, in registration order.
    ///
    /// Callbacks run on whichever thread made the change and must not call
    /// back into [`ConfigStore::update_field`] or [`ConfigStore::load`].
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&Config) + Send + Sync + 'static,
    {
        self.subscribers.lock().push(Box::new(callback));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn write(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        debug!("Saved config at {}", self.path.display());
        Ok(())
    }

    fn notify(&self, config: &Config) {
        for subscriber in self.subscribers.lock().iter() {
            subscriber(config);
        }
    }
}
