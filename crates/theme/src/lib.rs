pub mod source;

pub use source::{FileStylesheets, InlineStylesheets, StylesheetSource};

use powerbar_core::Result;
use powerbar_renderer::Node;
use std::collections::BTreeMap;
use std::sync::Arc;

/// CSS custom properties appended to an injected stylesheet.
///
/// Keeps insertion order; setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomProperties {
    entries: Vec<(String, String)>,
}

impl CustomProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// `:root {--name: value;\n…}`
    pub fn root_block(&self) -> String {
        let vars: String = self
            .entries
            .iter()
            .map(|(name, value)| format!("--{name}: {value};\n"))
            .collect();
        format!(":root {{{vars}}}")
    }
}

impl From<&BTreeMap<String, String>> for CustomProperties {
    fn from(map: &BTreeMap<String, String>) -> Self {
        map.iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (name, value) in iter {
            props.set(name, value);
        }
        props
    }
}

/// Keeps one `<style name="…">` element per stylesheet name inside a container.
#[derive(Clone)]
pub struct StyleInjector {
    source: Arc<dyn StylesheetSource>,
}

impl StyleInjector {
    pub fn new(source: Arc<dyn StylesheetSource>) -> Self {
        Self { source }
    }

    /// Create or refresh the style element for `name` under `container`.
    ///
    /// An existing element tagged with `name` is reused, so repeated calls
    /// never produce duplicates.  Its content becomes the stylesheet text
    /// followed by the custom-property block.  If the stylesheet can't be
    /// read, nothing is created and the error is returned.
    pub fn apply(&self, container: &Node, name: &str, properties: &CustomProperties) -> Result<Node> {
        let css = self.source.read(name)?;

        let style = container
            .find("style", "name", name)
            .unwrap_or_else(|| Node::new("style"));

        style.set_attribute("name", name);
        style.set_content(format!("{css}\n{}", properties.root_block()));
        tracing::debug!("Applied stylesheet '{name}'");

        Ok(container.append_child(&style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injector() -> StyleInjector {
        StyleInjector::new(Arc::new(
            InlineStylesheets::new().with("style.css", "progress { width: 100%; }"),
        ))
    }

    #[test]
    fn root_block_keeps_insertion_order() {
        let props = CustomProperties::new()
            .with("height", "2px")
            .with("color", "red")
            .with("height", "3px");

        assert_eq!(props.get("height"), Some("3px"));
        assert_eq!(props.root_block(), ":root {--height: 3px;\n--color: red;\n}");
        assert_eq!(CustomProperties::new().root_block(), ":root {}");
    }

    #[test]
    fn apply_twice_reuses_one_style_node() {
        let container = Node::new("aside");
        let injector = injector();

        let first = injector
            .apply(&container, "style.css", &CustomProperties::new().with("height", "2px"))
            .unwrap();
        let second = injector
            .apply(&container, "style.css", &CustomProperties::new().with("height", "5px"))
            .unwrap();

        assert!(first.same(&second));
        let styles = container.find_all("style", "name", "style.css");
        assert_eq!(styles.len(), 1);
        assert_eq!(
            styles[0].content(),
            "progress { width: 100%; }\n:root {--height: 5px;\n}"
        );
    }

    #[test]
    fn apply_with_missing_stylesheet_creates_nothing() {
        let container = Node::new("aside");
        let err = injector()
            .apply(&container, "missing.css", &CustomProperties::new())
            .unwrap_err();

        assert!(matches!(err, powerbar_core::PowerBarError::Stylesheet(_)));
        assert!(container.children().is_empty());
    }

    #[test]
    fn properties_from_config_map() {
        let map = BTreeMap::from([
            ("height".to_string(), "2px".to_string()),
            ("accent".to_string(), "#cba6f7".to_string()),
        ]);
        let props = CustomProperties::from(&map);
        assert_eq!(props.root_block(), ":root {--accent: #cba6f7;\n--height: 2px;\n}");
    }
}
