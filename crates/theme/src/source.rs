use powerbar_config::StyleConfig;
use powerbar_core::{PowerBarError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where static stylesheet text comes from.
///
/// Read synchronously on every injection, so keep implementations cheap
/// and stay off hot paths.
pub trait StylesheetSource: Send + Sync {
    fn read(&self, name: &str) -> Result<String>;
}

/// Stylesheets stored as files under a base directory.
#[derive(Debug, Clone)]
pub struct FileStylesheets {
    base: PathBuf,
}

impl FileStylesheets {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Use `style.directory` if set, otherwise the directory holding the
    /// config file.
    pub fn for_config(style: &StyleConfig, config_path: &Path) -> Self {
        let base = style.directory.clone().unwrap_or_else(|| {
            config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        Self::new(base)
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }
}

impl StylesheetSource for FileStylesheets {
    fn read(&self, name: &str) -> Result<String> {
        let path = self.resolve(name);
        std::fs::read_to_string(&path).map_err(|e| {
            PowerBarError::Stylesheet(format!("cannot read '{}': {e}", path.display()))
        })
    }
}

/// Stylesheets held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InlineStylesheets {
    sheets: HashMap<String, String>,
}

impl InlineStylesheets {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.sheets.insert(name.into(), text.into());
        self
    }
}

impl StylesheetSource for InlineStylesheets {
    fn read(&self, name: &str) -> Result<String> {
        self.sheets
            .get(name)
            .cloned()
            .ok_or_else(|| PowerBarError::Stylesheet(format!("no stylesheet named '{name}'")))
    }
}
