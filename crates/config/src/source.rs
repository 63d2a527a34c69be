use crate::schema::PowerBarConfig;
use std::sync::{Arc, PoisonError, RwLock};

/// Host configuration accessor, consulted on every render cycle.
pub trait ConfigSource: Send + Sync {
    fn get_config(&self) -> PowerBarConfig;
}

impl ConfigSource for PowerBarConfig {
    fn get_config(&self) -> PowerBarConfig {
        self.clone()
    }
}

/// Live configuration that can be swapped while widgets are mounted.
///
/// Clones share the same underlying value.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<PowerBarConfig>>,
}

impl SharedConfig {
    pub fn new(config: PowerBarConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the current configuration.
    pub fn replace(&self, config: PowerBarConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Apply an in-place edit to the current configuration.
    pub fn update(&self, edit: impl FnOnce(&mut PowerBarConfig)) {
        edit(&mut self.inner.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl ConfigSource for SharedConfig {
    fn get_config(&self) -> PowerBarConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
