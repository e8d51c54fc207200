use indexmap::IndexMap;

use crate::{Channel, EventKey, PropertyPath, Trigger};

/// Event key → dotted path into the runtime props that supplies its value.
pub type DevOverrides = IndexMap<EventKey, PropertyPath>;

/// Trigger → channel → overrides, exactly as the integrator supplies it.
pub type TriggerMappings = IndexMap<Trigger, IndexMap<Channel, DevOverrides>>;

/// The integrator's routing table. A trigger is only dispatched to the
/// channels listed under it here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    mappings: TriggerMappings,
}

impl OverrideTable {
    pub fn new(mappings: TriggerMappings) -> Self {
        Self { mappings }
    }

    /// Channels registered for `trigger`, in configuration order.
    pub fn trigger(&self, trigger: &str) -> Option<&IndexMap<Channel, DevOverrides>> {
        self.mappings.get(trigger)
    }

    pub fn channel_overrides(&self, trigger: &str, channel: &str) -> Option<&DevOverrides> {
        self.mappings.get(trigger)?.get(channel)
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.mappings.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl From<TriggerMappings> for OverrideTable {
    fn from(mappings: TriggerMappings) -> Self {
        Self::new(mappings)
    }
}
