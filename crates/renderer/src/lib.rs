//! Element creation and in-place rendering for the battery indicator.
//!
//! The widget owns three elements for its whole mounted life:
//! - container (`aside`): visibility and layout hook
//! - label (`label`): percentage and time remaining
//! - indicator (`progress`): the bar itself, classed with the state tag
//!
//! Every render cycle mutates those same elements; nothing is recreated.

pub mod node;

pub use node::Node;

use powerbar_core::state::{FormattedSummary, StateTag};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// How long the label keeps its `updated` class after a render.
pub const UPDATED_MARKER_DELAY: Duration = Duration::from_millis(50);

/// The elements one mounted widget renders into.
#[derive(Debug, Clone)]
pub struct WidgetElements {
    pub container: Node,
    pub indicator: Node,
    pub label:     Node,
}

impl WidgetElements {
    /// Build the container with its label and indicator and append it to `root`.
    pub fn create(root: &Node) -> Self {
        let container = Node::new("aside");
        let label     = container.append_child(&Node::new("label"));
        let indicator = container.append_child(&Node::new("progress"));
        root.append_child(&container);

        Self {
            container,
            indicator,
            label,
        }
    }

    /// Detach the container (and with it every child) from the tree.
    pub fn remove(&self) {
        self.container.remove();
    }
}

/// Open while a widget's elements may be mutated; closed once for good on
/// unmount.
///
/// [`run`](Self::run) holds the lock for the whole closure, so
/// [`close`](Self::close) waits for a mutation already in progress and none
/// starts afterwards.
#[derive(Debug, Clone)]
pub struct RenderGate(Arc<Mutex<bool>>);

impl RenderGate {
    pub fn open() -> Self {
        Self(Arc::new(Mutex::new(true)))
    }

    pub fn close(&self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub fn is_open(&self) -> bool {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` if the gate is still open.  Must not be re-entered from `f`.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let open = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        (*open).then(f)
    }
}

/// Reflect `summary` in `elements`.
///
/// The `updated` marker on the label is cleared by a task on the current
/// Tokio runtime after [`UPDATED_MARKER_DELAY`], unless `gate` has been
/// closed by then.  Outside a runtime it stays until the next render
/// replaces it.
pub fn render(
    summary: &FormattedSummary,
    elements: &WidgetElements,
    visible: bool,
    gate: &RenderGate,
) {
    let WidgetElements {
        container,
        indicator,
        label,
    } = elements;

    indicator.set_attribute("min", "0");
    indicator.set_attribute("max", "100");
    indicator.set_attribute("value", summary.level.to_string());

    label.set_content(label_markup(summary));
    label.add_classes(&["battery-level", "updated"]);

    for tag in StateTag::ALL {
        if tag != summary.state_tag {
            indicator.remove_class(tag.as_str());
        }
    }
    indicator.add_classes(&["battery-bar", summary.state_tag.as_str()]);

    container.add_class("power-bar-container");
    container.toggle_class("hidden", !visible);

    if let Ok(runtime) = tokio::runtime::Handle::try_current() {
        let label = label.clone();
        let gate = gate.clone();
        runtime.spawn(async move {
            tokio::time::sleep(UPDATED_MARKER_DELAY).await;
            gate.run(|| label.remove_class("updated"));
        });
    }
}

/// Inner markup of the label, e.g.
/// `<span class='level'>55.0%</span><time>2.0 hours until empty</time>`.
pub fn label_markup(summary: &FormattedSummary) -> String {
    format!(
        "<span class='level'>{}%</span><time>{}{}</time>",
        summary.percentage_text, summary.time_text, summary.charging_suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(level: f64, tag: StateTag) -> FormattedSummary {
        FormattedSummary {
            level,
            percentage_text: format!("{level:.1}"),
            time_text: "2.0 hours".into(),
            charging_suffix: " until empty",
            state_tag: tag,
        }
    }

    #[test]
    fn create_builds_label_before_indicator() {
        let root = Node::new("body");
        let elements = WidgetElements::create(&root);

        assert!(elements.container.parent().unwrap().same(&root));
        assert_eq!(elements.container.tag(), "aside");
        assert_eq!(elements.label.tag(), "label");
        assert_eq!(elements.indicator.tag(), "progress");
        let children = elements.container.children();
        assert_eq!(children.len(), 2);
        assert!(children[0].same(&elements.label));
        assert!(children[1].same(&elements.indicator));
    }

    #[test]
    fn render_sets_indicator_label_and_container() {
        let root = Node::new("body");
        let elements = WidgetElements::create(&root);

        render(&summary(55.0, StateTag::Charged), &elements, true, &RenderGate::open());

        assert_eq!(elements.indicator.attribute("max").as_deref(), Some("100"));
        assert_eq!(elements.indicator.attribute("min").as_deref(), Some("0"));
        assert_eq!(elements.indicator.attribute("value").as_deref(), Some("55"));
        assert_eq!(elements.indicator.classes(), ["battery-bar", "charged"]);
        assert_eq!(
            elements.label.content(),
            "<span class='level'>55.0%</span><time>2.0 hours until empty</time>"
        );
        assert!(elements.label.has_class("battery-level"));
        assert!(elements.label.has_class("updated"));
        assert!(elements.container.has_class("power-bar-container"));
        assert!(!elements.container.has_class("hidden"));
    }

    #[test]
    fn render_replaces_previous_state_tag() {
        let root = Node::new("body");
        let elements = WidgetElements::create(&root);

        render(&summary(55.0, StateTag::Charged), &elements, true, &RenderGate::open());
        render(&summary(10.0, StateTag::LowPower), &elements, true, &RenderGate::open());

        assert_eq!(elements.indicator.classes(), ["battery-bar", "low-power"]);
    }

    #[test]
    fn render_toggles_hidden() {
        let root = Node::new("body");
        let elements = WidgetElements::create(&root);

        render(&summary(55.0, StateTag::Charged), &elements, false, &RenderGate::open());
        assert!(elements.container.has_class("hidden"));

        render(&summary(55.0, StateTag::Charged), &elements, true, &RenderGate::open());
        assert!(!elements.container.has_class("hidden"));
    }

    #[tokio::test(start_paused = true)]
    async fn updated_marker_expires() {
        let root = Node::new("body");
        let elements = WidgetElements::create(&root);

        render(&summary(55.0, StateTag::Charged), &elements, true, &RenderGate::open());
        assert!(elements.label.has_class("updated"));

        tokio::time::sleep(UPDATED_MARKER_DELAY / 2).await;
        assert!(elements.label.has_class("updated"));

        tokio::time::sleep(UPDATED_MARKER_DELAY).await;
        assert!(!elements.label.has_class("updated"));
        assert!(elements.label.has_class("battery-level"));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_gate_keeps_updated_marker() {
        let root = Node::new("body");
        let elements = WidgetElements::create(&root);
        let gate = RenderGate::open();

        render(&summary(55.0, StateTag::Charged), &elements, true, &gate);
        gate.close();
        tokio::time::sleep(UPDATED_MARKER_DELAY * 2).await;

        assert!(elements.label.has_class("updated"));
    }

    #[test]
    fn gate_runs_only_while_open() {
        let gate = RenderGate::open();
        assert_eq!(gate.run(|| 1), Some(1));
        assert!(gate.is_open());

        gate.clone().close();
        assert!(!gate.is_open());
        assert_eq!(gate.run(|| 1), None);
    }

    #[test]
    fn remove_detaches_container() {
        let root = Node::new("body");
        let elements = WidgetElements::create(&root);
        elements.remove();
        assert!(root.children().is_empty());
        assert!(elements.label.is_within(&elements.container));
    }
}
