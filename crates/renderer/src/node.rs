//! Minimal retained element tree the widget renders into.
//!
//! A [`Node`] is a cheap, clonable handle; clones refer to the same element.
//! Identity is compared with [`Node::same`], never by value.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Debug, Default)]
struct NodeData {
    tag:        String,
    classes:    Vec<String>,
    attributes: BTreeMap<String, String>,
    content:    String,
    children:   Vec<Node>,
    parent:     Weak<Mutex<NodeData>>,
}

/// Handle to one element.
#[derive(Debug, Clone)]
pub struct Node(Arc<Mutex<NodeData>>);

impl Node {
    /// Create a detached element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(NodeData {
            tag: tag.into(),
            ..NodeData::default()
        })))
    }

    fn data(&self) -> MutexGuard<'_, NodeData> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` if both handles refer to the same element.
    pub fn same(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn tag(&self) -> String {
        self.data().tag.clone()
    }

    // ── Tree ──────────────────────────────────────────────────────────────────

    /// Append `child` as the last child, detaching it from any previous parent.
    /// Returns the child for chaining.
    pub fn append_child(&self, child: &Node) -> Node {
        child.remove();
        child.data().parent = Arc::downgrade(&self.0);
        self.data().children.push(child.clone());
        child.clone()
    }

    /// Detach from the parent.  A detached node is a no-op.
    pub fn remove(&self) {
        let parent = std::mem::take(&mut self.data().parent);
        if let Some(parent) = parent.upgrade() {
            parent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .children
                .retain(|c| !c.same(self));
        }
    }

    pub fn parent(&self) -> Option<Node> {
        self.data().parent.upgrade().map(Node)
    }

    /// `true` while this node has a parent.
    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// `true` if `self` is `other` or one of its descendants.
    pub fn is_within(&self, other: &Node) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.same(other) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    pub fn children(&self) -> Vec<Node> {
        self.data().children.clone()
    }

    /// First descendant (depth-first, document order) matching `tag` whose
    /// attribute `name` equals `value`.
    pub fn find(&self, tag: &str, name: &str, value: &str) -> Option<Node> {
        self.find_all(tag, name, value).into_iter().next()
    }

    /// All descendants matching `tag` whose attribute `name` equals `value`.
    pub fn find_all(&self, tag: &str, name: &str, value: &str) -> Vec<Node> {
        let mut found = Vec::new();
        for child in self.children() {
            let matches = {
                let data = child.data();
                data.tag == tag && data.attributes.get(name).is_some_and(|v| v == value)
            };
            if matches {
                found.push(child.clone());
            }
            found.extend(child.find_all(tag, name, value));
        }
        found
    }

    // ── Attributes ────────────────────────────────────────────────────────────

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.data().attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.data().attributes.get(name).cloned()
    }

    // ── Classes ───────────────────────────────────────────────────────────────

    /// Add each class not already present, keeping first-insertion order.
    pub fn add_classes(&self, names: &[&str]) {
        let mut data = self.data();
        for name in names {
            if !data.classes.iter().any(|c| c == name) {
                data.classes.push((*name).to_string());
            }
        }
    }

    pub fn add_class(&self, name: &str) {
        self.add_classes(&[name]);
    }

    pub fn remove_class(&self, name: &str) {
        self.data().classes.retain(|c| c != name);
    }

    /// Add `name` when `on`, remove it otherwise.
    pub fn toggle_class(&self, name: &str, on: bool) {
        if on {
            self.add_class(name);
        } else {
            self.remove_class(name);
        }
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.data().classes.iter().any(|c| c == name)
    }

    pub fn classes(&self) -> Vec<String> {
        self.data().classes.clone()
    }

    // ── Content ───────────────────────────────────────────────────────────────

    /// Replace the node's inner markup.
    pub fn set_content(&self, content: impl Into<String>) {
        self.data().content = content.into();
    }

    pub fn content(&self) -> String {
        self.data().content.clone()
    }

    /// Serialise this node and its subtree, e.g.
    /// `<aside class="power-bar-container"><label>…</label></aside>`.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        let (tag, children) = {
            let data = self.data();
            let _ = write!(out, "<{}", data.tag);
            if !data.classes.is_empty() {
                let _ = write!(out, " class=\"{}\"", data.classes.join(" "));
            }
            for (name, value) in &data.attributes {
                let _ = write!(out, " {name}=\"{value}\"");
            }
            out.push('>');
            out.push_str(&data.content);
            (data.tag.clone(), data.children.clone())
        };
        for child in &children {
            child.write_markup(out);
        }
        let _ = write!(out, "</{tag}>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_remove_keep_parent_links() {
        let root = Node::new("body");
        let aside = root.append_child(&Node::new("aside"));
        let label = aside.append_child(&Node::new("label"));

        assert!(aside.parent().unwrap().same(&root));
        assert!(label.is_within(&root));

        aside.remove();
        assert!(!aside.is_attached());
        assert!(root.children().is_empty());
        assert!(label.is_within(&aside));
        assert!(!label.is_within(&root));

        // Removing twice is harmless.
        aside.remove();
    }

    #[test]
    fn append_moves_between_parents() {
        let a = Node::new("div");
        let b = Node::new("div");
        let child = a.append_child(&Node::new("span"));

        b.append_child(&child);
        assert!(a.children().is_empty());
        assert_eq!(b.children().len(), 1);
        assert!(child.parent().unwrap().same(&b));
    }

    #[test]
    fn find_matches_tag_and_attribute() {
        let root = Node::new("aside");
        let style = root.append_child(&Node::new("style"));
        style.set_attribute("name", "style.css");
        let nested = root.append_child(&Node::new("div")).append_child(&Node::new("style"));
        nested.set_attribute("name", "other.css");

        assert!(root.find("style", "name", "style.css").unwrap().same(&style));
        assert!(root.find("style", "name", "other.css").unwrap().same(&nested));
        assert!(root.find("style", "name", "missing.css").is_none());
        assert!(root.find("link", "name", "style.css").is_none());
    }

    #[test]
    fn classes_are_a_set_in_insertion_order() {
        let node = Node::new("progress");
        node.add_classes(&["battery-bar", "charged", "battery-bar"]);
        assert_eq!(node.classes(), ["battery-bar", "charged"]);

        node.toggle_class("hidden", true);
        assert!(node.has_class("hidden"));
        node.toggle_class("hidden", false);
        assert!(!node.has_class("hidden"));
    }

    #[test]
    fn markup_includes_classes_attributes_and_children() {
        let root = Node::new("aside");
        root.add_class("power-bar-container");
        let label = root.append_child(&Node::new("label"));
        label.set_content("<span>50%</span>");
        let bar = root.append_child(&Node::new("progress"));
        bar.set_attribute("max", "100");

        assert_eq!(
            root.to_markup(),
            "<aside class=\"power-bar-container\"><label><span>50%</span></label>\
             <progress max=\"100\"></progress></aside>"
        );
    }
}
