//! Default [`SchedulerRegistry`]: an in-process `dashmap` set of live
//! handle ids, for observability (`len()`/`is_registered()`) rather than
//! any scheduling decision — the registry never drives behavior, it only
//! records it (spec §6).

use chronofuture_kernel::{HandleId, SchedulerRegistry};
use dashmap::DashSet;

pub struct LocalSchedulerRegistry {
    live: DashSet<HandleId>,
}

impl LocalSchedulerRegistry {
    pub fn new() -> Self {
        Self {
            live: DashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_registered(&self, id: HandleId) -> bool {
        self.live.contains(&id)
    }
}

impl Default for LocalSchedulerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerRegistry for LocalSchedulerRegistry {
    fn on_scheduled(&self, id: HandleId) {
        self.live.insert(id);
    }

    fn on_descheduled(&self, id: HandleId) {
        self.live.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_scheduled_and_descheduled_handles() {
        let registry = LocalSchedulerRegistry::new();
        let id = HandleId::new();
        assert!(!registry.is_registered(id));
        registry.on_scheduled(id);
        assert!(registry.is_registered(id));
        assert_eq!(registry.len(), 1);
        registry.on_descheduled(id);
        assert!(!registry.is_registered(id));
        assert!(registry.is_empty());
    }
}
