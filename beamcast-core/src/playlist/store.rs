//! In-memory ownership of the current channel collection.
//!
//! Pure data, no I/O: selection, favorite bookkeeping, and the group
//! partition live here. Insertion order is preserved for grouping and
//! display.

use uuid::Uuid;

use super::ChannelRecord;

/// Ordered channel collection with selection and favorite bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ChannelStore {
    channels: Vec<ChannelRecord>,
    selected: Option<Uuid>,
}

/// One entry of the group partition: ordered member ids under a group name.
///
/// A non-owning index recomputed on read, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub name: String,
    pub channel_ids: Vec<Uuid>,
}

/// Result of deleting a channel from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No channel with the given id exists
    NotFound,
    /// A non-selected channel was removed; selection is unchanged
    Removed,
    /// The selected channel was removed; selection fell back to the first
    /// remaining channel in original order, or cleared
    RemovedSelected { fallback: Option<Uuid> },
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection, as happens when a new playlist is
    /// loaded. Selection moves to the first record of the new collection,
    /// or clears when it is empty. Returns the new selection.
    pub fn replace_all(&mut self, channels: Vec<ChannelRecord>) -> Option<Uuid> {
        self.channels = channels;
        self.selected = self.channels.first().map(|channel| channel.id);
        self.selected
    }

    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&ChannelRecord> {
        self.channels.iter().find(|channel| channel.id == id)
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    /// The currently selected channel record, if any.
    pub fn selected(&self) -> Option<&ChannelRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Selects a channel by id. Returns false for an unknown id, leaving
    /// the previous selection in place.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Flips the favorite flag of a channel, identity unchanged. Returns
    /// false for an unknown id.
    pub fn toggle_favorite(&mut self, id: Uuid) -> bool {
        match self.channels.iter_mut().find(|channel| channel.id == id) {
            Some(channel) => {
                channel.is_favorite = !channel.is_favorite;
                true
            }
            None => false,
        }
    }

    /// Removes a channel. When the selected channel is removed, selection
    /// deterministically falls back to the first remaining channel in
    /// original order, or clears if none remain.
    pub fn delete(&mut self, id: Uuid) -> DeleteOutcome {
        let Some(position) = self.channels.iter().position(|channel| channel.id == id) else {
            return DeleteOutcome::NotFound;
        };
        self.channels.remove(position);

        if self.selected == Some(id) {
            self.selected = self.channels.first().map(|channel| channel.id);
            DeleteOutcome::RemovedSelected {
                fallback: self.selected,
            }
        } else {
            DeleteOutcome::Removed
        }
    }

    /// The favorite subset, cloned in original order.
    pub fn favorites(&self) -> Vec<ChannelRecord> {
        self.channels
            .iter()
            .filter(|channel| channel.is_favorite)
            .cloned()
            .collect()
    }

    /// Partitions channels by group, groups ordered by first appearance and
    /// members in original order.
    pub fn groups(&self) -> Vec<ChannelGroup> {
        let mut groups: Vec<ChannelGroup> = Vec::new();
        for channel in &self.channels {
            match groups.iter_mut().find(|group| group.name == channel.group) {
                Some(group) => group.channel_ids.push(channel.id),
                None => groups.push(ChannelGroup {
                    name: channel.group.clone(),
                    channel_ids: vec![channel.id],
                }),
            }
        }
        groups
    }
}
