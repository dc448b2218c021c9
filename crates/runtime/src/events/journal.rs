use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{BattleEvent, BattleEventKind};

/// One dispatched event as recorded by the journal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Dispatch order since the battle was created.
    pub sequence: u64,
    /// Nesting level: 0 for events published from outside.
    pub depth: usize,
    pub event: BattleEvent,
}

/// Bounded ring buffer of dispatched events.
///
/// Oldest entries are evicted once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct EventJournal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
    next_sequence: u64,
}

impl EventJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            next_sequence: 0,
        }
    }

    pub fn record(&mut self, depth: usize, event: &BattleEvent) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            sequence: self.next_sequence,
            depth,
            event: event.clone(),
        });
        self.next_sequence += 1;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn events(&self) -> impl Iterator<Item = &BattleEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    /// Retained events of one kind, oldest first.
    pub fn of_kind(&self, kind: BattleEventKind) -> impl Iterator<Item = &BattleEvent> {
        self.events().filter(move |event| event.kind() == kind)
    }

    pub fn count(&self, kind: BattleEventKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    /// Total events recorded, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.next_sequence
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::ContextId;

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut journal = EventJournal::new(2);
        for i in 0..3 {
            journal.record(0, &BattleEvent::ImpactNow {
                context: ContextId(i),
            });
        }
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.total_recorded(), 3);
        assert_eq!(journal.iter().next().map(|e| e.sequence), Some(1));
    }
}
