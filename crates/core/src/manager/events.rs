//! Level lifecycle notifications and the listener registry.

use glam::Vec3;

use crate::generator::PopulationReport;
use crate::types::{LevelIndex, Topology};

#[derive(Clone, Debug, PartialEq)]
pub enum LevelEvent {
    /// Structure is attached; population, if any, has not started yet.
    LevelLoaded { index: LevelIndex, topology: Topology, spawn_point: Option<Vec3> },
    /// A population pass ran against a ready world.
    LevelPopulated { index: LevelIndex, report: PopulationReport },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&LevelEvent)>;

/// Callbacks invoked in registration order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl ListenerRegistry {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&mut self, event: &LevelEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}
