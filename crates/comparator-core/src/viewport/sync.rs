use std::collections::BTreeMap;

use super::controller::{ApplyOptions, PanZoomController};
use super::model::ViewportState;
use crate::surface::ViewportRole;

/// Keeps live pan/zoom controllers numerically identical.
///
/// In side-by-side mode the left and right controllers are linked both ways;
/// in overlay modes a single controller is driven on its own. Geometry that
/// has to survive a topology change is captured here before teardown and
/// restored on the next tick, once the new controllers have valid layout.
#[derive(Default)]
pub struct ViewportSyncEngine {
    controllers: BTreeMap<ViewportRole, Box<dyn PanZoomController>>,
    /// Directed (source, target) pairs.
    links: Vec<(ViewportRole, ViewportRole)>,
    /// Set while geometry from one change event is being applied to peers.
    in_flight: bool,
    pending_restore: Option<ViewportState>,
}

impl ViewportSyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller, destroying any previous one for the role.
    pub fn attach(&mut self, role: ViewportRole, controller: Box<dyn PanZoomController>) {
        if let Some(mut previous) = self.controllers.insert(role, controller) {
            tracing::warn!(
                "[ViewportSyncEngine] Replacing live {:?} controller without teardown",
                role
            );
            previous.destroy();
        }
    }

    /// Destroys the controller for `role` and drops every link touching it.
    ///
    /// Returns `false` when nothing was attached, which makes teardown idempotent.
    pub fn detach(&mut self, role: ViewportRole) -> bool {
        self.links
            .retain(|(source, target)| *source != role && *target != role);
        match self.controllers.remove(&role) {
            Some(mut controller) => {
                controller.destroy();
                true
            }
            None => false,
        }
    }

    pub fn detach_all(&mut self) {
        let roles: Vec<ViewportRole> = self.controllers.keys().copied().collect();
        for role in roles {
            self.detach(role);
        }
        self.pending_restore = None;
    }

    /// Installs a bidirectional link between two controllers.
    pub fn sync(&mut self, a: ViewportRole, b: ViewportRole) {
        for link in [(a, b), (b, a)] {
            if !self.links.contains(&link) {
                self.links.push(link);
            }
        }
    }

    pub fn is_linked(&self, source: ViewportRole, target: ViewportRole) -> bool {
        self.links.contains(&(source, target))
    }

    /// Handles a geometry change event emitted by `source`.
    ///
    /// Returns the number of peers that were updated.
    pub fn on_geometry_change(&mut self, source: ViewportRole) -> usize {
        let Some(state) = self.controllers.get(&source).map(|c| c.geometry()) else {
            return 0;
        };
        self.propagate(source, state)
    }

    fn propagate(&mut self, source: ViewportRole, state: ViewportState) -> usize {
        if self.in_flight {
            tracing::trace!(
                "[ViewportSyncEngine] Ignoring re-entrant change from {:?}",
                source
            );
            return 0;
        }
        self.in_flight = true;

        let targets: Vec<ViewportRole> = self
            .links
            .iter()
            .filter(|(from, _)| *from == source)
            .map(|(_, to)| *to)
            .collect();

        let mut applied = 0;
        let mut echoes = Vec::new();
        for target in targets {
            if let Some(controller) = self.controllers.get_mut(&target) {
                if let Some(echo) = controller.apply(state, ApplyOptions::SILENT) {
                    echoes.push((target, echo));
                }
                applied += 1;
            }
        }

        // Controllers that ignore `silent` still must not bounce back.
        for (target, echo) in echoes {
            self.propagate(target, echo);
        }

        self.in_flight = false;
        applied
    }

    /// Current geometry of the panel.
    ///
    /// A restore that has not been flushed yet wins: the live controllers still
    /// show their default framing until the next tick. Otherwise geometry is
    /// read from the authoritative controller: overlay, else left, else right.
    pub fn capture(&self) -> Option<ViewportState> {
        if let Some(state) = self.pending_restore {
            return Some(state);
        }
        [ViewportRole::Overlay, ViewportRole::Left, ViewportRole::Right]
            .iter()
            .find_map(|role| self.controllers.get(role))
            .map(|controller| controller.geometry())
    }

    /// Queues geometry to be applied once the current controllers have layout.
    pub fn schedule_restore(&mut self, state: ViewportState) {
        self.pending_restore = Some(state);
    }

    pub fn pending_restore(&self) -> Option<ViewportState> {
        self.pending_restore
    }

    /// Applies a previously scheduled restore, if any.
    pub fn flush_restore(&mut self) -> Option<ViewportState> {
        let state = self.pending_restore.take()?;
        self.restore(state);
        Some(state)
    }

    /// Silently applies geometry to every live controller.
    pub fn restore(&mut self, state: ViewportState) {
        self.in_flight = true;
        for controller in self.controllers.values_mut() {
            // Echoes are dropped: a restore must not re-trigger synchronization.
            let _ = controller.apply(state, ApplyOptions::SILENT);
        }
        self.in_flight = false;
    }

    /// Applies each controller's default framing.
    pub fn reset(&mut self) {
        self.pending_restore = None;
        for controller in self.controllers.values_mut() {
            controller.reset();
        }
    }

    pub fn geometry(&self, role: ViewportRole) -> Option<ViewportState> {
        self.controllers.get(&role).map(|c| c.geometry())
    }

    pub fn is_live(&self, role: ViewportRole) -> bool {
        self.controllers.contains_key(&role)
    }

    pub fn live_roles(&self) -> Vec<ViewportRole> {
        self.controllers.keys().copied().collect()
    }

    pub fn live_count(&self) -> usize {
        self.controllers.len()
    }
}
