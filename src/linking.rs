//! Linking groups and the context bus.
//!
//! Each palette color is a channel: it remembers the last selection that was
//! published to it and which windows are listening. Windows that join a group
//! later read the stored selection immediately instead of waiting for the next
//! publish.

use serde::{Deserialize, Serialize};

use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkingGroup {
    Red,
    Blue,
    Green,
    Yellow,
}

impl LinkingGroup {
    pub const PALETTE: [LinkingGroup; 4] = [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
            Self::Green => 2,
            Self::Yellow => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
        }
    }
}

/// A window's place inside its linking group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Defines the group's shared selection.
    #[default]
    Master,
    /// Follows the selection published by the master.
    Child,
}

/// The selection payload shared through a linking group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkingContext {
    pub entity_id: String,
    #[serde(default)]
    pub entity_number: Option<String>,
}

impl LinkingContext {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_number: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.entity_number = Some(number.into());
        self
    }

    /// Human-readable label, preferring the entity number.
    pub fn label(&self) -> &str {
        self.entity_number.as_deref().unwrap_or(&self.entity_id)
    }
}

#[derive(Debug, Default)]
struct Channel {
    context: Option<LinkingContext>,
    subscribers: Vec<WindowId>,
    last_assigned: u64,
}

#[derive(Debug, Default)]
pub struct ContextBus {
    channels: [Channel; 4],
    assign_seq: u64,
}

impl ContextBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, group: LinkingGroup) -> &Channel {
        &self.channels[group.index()]
    }

    fn channel_mut(&mut self, group: LinkingGroup) -> &mut Channel {
        &mut self.channels[group.index()]
    }

    pub fn subscribe(&mut self, group: LinkingGroup, id: WindowId) {
        self.assign_seq += 1;
        let seq = self.assign_seq;
        let channel = self.channel_mut(group);
        channel.last_assigned = seq;
        if !channel.subscribers.contains(&id) {
            channel.subscribers.push(id);
        }
    }

    /// Remove `id` from `group`. Returns `true` when the group became unused,
    /// in which case its stored context has been cleared.
    pub fn unsubscribe(&mut self, group: LinkingGroup, id: WindowId) -> bool {
        let channel = self.channel_mut(group);
        channel.subscribers.retain(|subscriber| *subscriber != id);
        if channel.subscribers.is_empty() {
            if channel.context.take().is_some() {
                tracing::debug!(group = group.label(), "linking context reset");
            }
            return true;
        }
        false
    }

    /// Store `payload` as the group's context and return every subscriber.
    pub fn publish(&mut self, group: LinkingGroup, payload: LinkingContext) -> Vec<WindowId> {
        let channel = self.channel_mut(group);
        tracing::debug!(
            group = group.label(),
            entity = %payload.entity_id,
            listeners = channel.subscribers.len(),
            "publish linking context"
        );
        channel.context = Some(payload);
        channel.subscribers.clone()
    }

    pub fn context(&self, group: LinkingGroup) -> Option<&LinkingContext> {
        self.channel(group).context.as_ref()
    }

    pub fn subscribers(&self, group: LinkingGroup) -> &[WindowId] {
        &self.channel(group).subscribers
    }

    pub fn in_use(&self, group: LinkingGroup) -> bool {
        !self.channel(group).subscribers.is_empty()
    }

    /// First unused palette color; once every color is taken, the one that was
    /// assigned longest ago is reused.
    pub fn find_available(&self) -> LinkingGroup {
        if let Some(free) = LinkingGroup::PALETTE
            .iter()
            .copied()
            .find(|group| !self.in_use(*group))
        {
            return free;
        }
        LinkingGroup::PALETTE
            .iter()
            .copied()
            .min_by_key(|group| self.channel(*group).last_assigned)
            .unwrap_or(LinkingGroup::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_joiners_read_the_last_publish() {
        let mut bus = ContextBus::new();
        bus.subscribe(LinkingGroup::Red, WindowId::from_raw(1));
        let listeners = bus.publish(LinkingGroup::Red, LinkingContext::new("42").with_number("Q-42"));
        assert_eq!(listeners, vec![WindowId::from_raw(1)]);
        bus.subscribe(LinkingGroup::Red, WindowId::from_raw(2));
        assert_eq!(
            bus.context(LinkingGroup::Red).map(LinkingContext::label),
            Some("Q-42")
        );
        assert!(bus.context(LinkingGroup::Blue).is_none());
    }

    #[test]
    fn context_resets_when_last_member_leaves() {
        let mut bus = ContextBus::new();
        let a = WindowId::from_raw(1);
        let b = WindowId::from_raw(2);
        bus.subscribe(LinkingGroup::Green, a);
        bus.subscribe(LinkingGroup::Green, b);
        bus.publish(LinkingGroup::Green, LinkingContext::new("7"));
        assert!(!bus.unsubscribe(LinkingGroup::Green, a));
        assert!(bus.context(LinkingGroup::Green).is_some());
        assert!(bus.unsubscribe(LinkingGroup::Green, b));
        assert!(bus.context(LinkingGroup::Green).is_none());
    }

    #[test]
    fn find_available_prefers_unused_then_oldest_assignment() {
        let mut bus = ContextBus::new();
        assert_eq!(bus.find_available(), LinkingGroup::Red);
        bus.subscribe(LinkingGroup::Red, WindowId::from_raw(1));
        assert_eq!(bus.find_available(), LinkingGroup::Blue);
        bus.subscribe(LinkingGroup::Blue, WindowId::from_raw(2));
        bus.subscribe(LinkingGroup::Green, WindowId::from_raw(3));
        bus.subscribe(LinkingGroup::Yellow, WindowId::from_raw(4));
        assert_eq!(bus.find_available(), LinkingGroup::Red);
        bus.subscribe(LinkingGroup::Red, WindowId::from_raw(5));
        assert_eq!(bus.find_available(), LinkingGroup::Blue);
    }

    #[test]
    fn context_serializes_with_camel_case_fields() {
        let ctx = LinkingContext::new("9").with_number("P-9");
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"entityId":"9","entityNumber":"P-9"}"#);
    }
}
