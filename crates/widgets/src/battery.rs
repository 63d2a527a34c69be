use powerbar_config::ConfigSource;
use powerbar_core::{PowerBarError, PowerEvent, Result};
use powerbar_renderer::{render, Node, RenderGate, WidgetElements};
use powerbar_system::{observe, BatteryInfoSource, PowerSupply, Subscription};
use powerbar_theme::{CustomProperties, StyleInjector};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Battery indicator with an explicit mount / unmount lifecycle.
///
/// While mounted, every level or time-to-empty change (plus one initial
/// trigger) starts a render cycle: fetch the three battery accessors
/// concurrently, classify and format, then update the elements in place.
/// Cycles are not serialised; the last one to finish wins.
pub struct BatteryWidget {
    source: BatteryInfoSource,
    config: Arc<dyn ConfigSource>,
    styles: StyleInjector,
    state:  Lifecycle,
}

enum Lifecycle {
    Inactive,
    Active(Mounted),
}

struct Mounted {
    elements:     WidgetElements,
    style:        Node,
    /// `None` when the host had no power supply to observe at mount time.
    subscription: Option<Subscription>,
    gate:         RenderGate,
}

/// Everything a render cycle needs, shared by all cycles of one mount.
struct RenderContext {
    source:   BatteryInfoSource,
    config:   Arc<dyn ConfigSource>,
    elements: WidgetElements,
    gate:     RenderGate,
}

impl BatteryWidget {
    pub fn new(
        supply: Arc<dyn PowerSupply>,
        config: Arc<dyn ConfigSource>,
        styles: StyleInjector,
    ) -> Self {
        Self {
            source: BatteryInfoSource::new(supply),
            config,
            styles,
            state: Lifecycle::Inactive,
        }
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, Lifecycle::Active(_))
    }

    /// Elements of the current mount, if any.
    pub fn elements(&self) -> Option<&WidgetElements> {
        match &self.state {
            Lifecycle::Active(mounted) => Some(&mounted.elements),
            Lifecycle::Inactive => None,
        }
    }

    /// Style element of the current mount, if any.
    pub fn style_node(&self) -> Option<&Node> {
        match &self.state {
            Lifecycle::Active(mounted) => Some(&mounted.style),
            Lifecycle::Inactive => None,
        }
    }

    /// Create fresh elements under `root`, inject the stylesheet and start
    /// observing the battery.  The first render is triggered before this
    /// returns.
    ///
    /// Fails with [`PowerBarError::MisorderedLifecycleCall`] if already
    /// mounted.  A host without a power supply still mounts, with empty
    /// elements and nothing to observe.  On any other failure the partial
    /// elements are removed and the widget stays unmounted.
    pub async fn mount(&mut self, root: &Node) -> Result<WidgetElements> {
        if self.is_mounted() {
            error!("mount() called on a mounted battery widget");
            return Err(PowerBarError::MisorderedLifecycleCall("mount while mounted"));
        }

        let config = self.config.get_config();
        let elements = WidgetElements::create(root);

        let style = match self.styles.apply(
            &elements.container,
            &config.style.stylesheet,
            &CustomProperties::from(&config.style.variables),
        ) {
            Ok(style) => style,
            Err(e) => {
                elements.remove();
                return Err(e);
            }
        };

        let gate = RenderGate::open();
        let context = Arc::new(RenderContext {
            source:   self.source.clone(),
            config:   Arc::clone(&self.config),
            elements: elements.clone(),
            gate:     gate.clone(),
        });

        let supply = Arc::clone(self.source.supply());
        let subscription = match observe(supply.as_ref(), move |event| {
            spawn_render_cycle(Arc::clone(&context), event);
        })
        .await
        {
            Ok(subscription) => Some(subscription),
            Err(e) if e.is_capability_unavailable() => {
                warn!("Battery widget mounted without a power supply: {e}");
                None
            }
            Err(e) => {
                gate.close();
                style.remove();
                elements.remove();
                return Err(e);
            }
        };

        info!("Battery widget mounted");
        self.state = Lifecycle::Active(Mounted {
            elements: elements.clone(),
            style,
            subscription,
            gate,
        });

        Ok(elements)
    }

    /// Stop observing and remove the style element and the container.
    ///
    /// Waits for a render already mutating the elements.  Render cycles still
    /// in flight finish their fetch but no longer touch the removed elements.
    /// Fails with [`PowerBarError::MisorderedLifecycleCall`] if not mounted.
    pub fn unmount(&mut self) -> Result<()> {
        let Lifecycle::Active(mounted) = std::mem::replace(&mut self.state, Lifecycle::Inactive)
        else {
            error!("unmount() called on an unmounted battery widget");
            return Err(PowerBarError::MisorderedLifecycleCall("unmount while not mounted"));
        };

        mounted.gate.close();
        if let Some(subscription) = mounted.subscription {
            subscription.dispose();
        }
        mounted.style.remove();
        mounted.elements.remove();

        info!("Battery widget unmounted");
        Ok(())
    }
}

impl Drop for BatteryWidget {
    fn drop(&mut self) {
        if self.is_mounted() {
            warn!("Battery widget dropped while mounted; unmounting");
            let _ = self.unmount();
        }
    }
}

fn spawn_render_cycle(context: Arc<RenderContext>, event: Option<PowerEvent>) {
    if let Some(event) = event {
        debug!("Battery change event: {event}");
    }

    tokio::spawn(async move {
        if !context.gate.is_open() {
            return;
        }

        let summary = match context.source.summary().await {
            Ok(summary) => summary,
            Err(e) if e.is_capability_unavailable() => {
                debug!("Skipping battery render: {e}");
                return;
            }
            Err(e) => {
                warn!("Battery render failed: {e}");
                return;
            }
        };

        let visible = context.config.get_config().show_battery_bar;
        let rendered = context
            .gate
            .run(|| render(&summary, &context.elements, visible, &context.gate));
        if rendered.is_none() {
            debug!("Dropping battery render that finished after unmount");
        }
    });
}
