//! Listener and controller lifetimes.
//!
//! Every subscription and every pan/zoom controller created on behalf of a
//! session is recorded here together with the scope that owns it. Tearing a
//! scope down drains exactly the entries it recorded.

use serde::{Deserialize, Serialize};

use crate::surface::{ComparisonSurface, EventSource, SubscriptionId, ViewportRole};
use crate::viewport::ViewportSyncEngine;

/// Who owns a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Lives until the session closes (keyboard shortcuts).
    Session,
    /// Lives until the next mode transition.
    Mode,
}

/// Something that must be released exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Subscription(SubscriptionId),
    Controller(ViewportRole),
}

#[derive(Debug, Default)]
pub struct DisposableArena {
    entries: Vec<(Scope, Resource)>,
}

impl DisposableArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: Scope, resource: Resource) {
        self.entries.push((scope, resource));
    }

    /// Subscribes through the surface and records the handle.
    pub fn subscribe(
        &mut self,
        scope: Scope,
        surface: &mut dyn ComparisonSurface,
        source: EventSource,
    ) -> SubscriptionId {
        let id = surface.subscribe(source);
        self.push(scope, Resource::Subscription(id));
        id
    }

    /// Creates a controller through the surface and attaches it to the engine.
    pub fn attach_controller(
        &mut self,
        scope: Scope,
        surface: &mut dyn ComparisonSurface,
        viewports: &mut ViewportSyncEngine,
        role: ViewportRole,
    ) {
        let controller = surface.create_controller(role);
        viewports.attach(role, controller);
        self.push(scope, Resource::Controller(role));
    }

    /// Removes and returns every entry owned by `scope`, newest first.
    pub fn take(&mut self, scope: Scope) -> Vec<Resource> {
        let mut taken = Vec::new();
        self.entries.retain(|(owner, resource)| {
            if *owner == scope {
                taken.push(*resource);
                false
            } else {
                true
            }
        });
        taken.reverse();
        taken
    }

    /// Releases every entry owned by `scope`. Returns how many were released.
    pub fn drain(
        &mut self,
        scope: Scope,
        surface: &mut dyn ComparisonSurface,
        viewports: &mut ViewportSyncEngine,
    ) -> usize {
        let resources = self.take(scope);
        let count = resources.len();
        for resource in resources {
            match resource {
                Resource::Subscription(id) => surface.unsubscribe(id),
                Resource::Controller(role) => {
                    viewports.detach(role);
                }
            }
        }
        if count > 0 {
            tracing::debug!("[DisposableArena] Released {} {:?}-scoped resources", count, scope);
        }
        count
    }

    /// Releases everything, mode scope first.
    pub fn drain_all(
        &mut self,
        surface: &mut dyn ComparisonSurface,
        viewports: &mut ViewportSyncEngine,
    ) -> usize {
        self.drain(Scope::Mode, surface, viewports) + self.drain(Scope::Session, surface, viewports)
    }

    pub fn live(&self, scope: Scope) -> usize {
        self.entries.iter().filter(|(owner, _)| *owner == scope).count()
    }

    pub fn live_subscriptions(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, resource)| matches!(resource, Resource::Subscription(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_only_touches_scope() {
        let mut arena = DisposableArena::new();
        arena.push(Scope::Session, Resource::Subscription(SubscriptionId(1)));
        arena.push(Scope::Mode, Resource::Subscription(SubscriptionId(2)));
        arena.push(Scope::Mode, Resource::Controller(ViewportRole::Overlay));

        let taken = arena.take(Scope::Mode);
        assert_eq!(
            taken,
            vec![
                Resource::Controller(ViewportRole::Overlay),
                Resource::Subscription(SubscriptionId(2)),
            ]
        );
        assert_eq!(arena.live(Scope::Mode), 0);
        assert_eq!(arena.live(Scope::Session), 1);
        assert!(arena.take(Scope::Mode).is_empty());
    }

    #[test]
    fn test_live_subscriptions_ignores_controllers() {
        let mut arena = DisposableArena::new();
        arena.push(Scope::Mode, Resource::Controller(ViewportRole::Left));
        arena.push(Scope::Mode, Resource::Subscription(SubscriptionId(9)));
        assert_eq!(arena.live_subscriptions(), 1);
        assert!(!arena.is_empty());
    }
}
