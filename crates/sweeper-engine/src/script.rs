//! Scripted contact source.
//!
//! Replays the `script` section of the configuration: each entry names a
//! scene object and the time, in seconds after the scene loaded, at which
//! the contact happens. After a reload the script starts over.

use sweeper_core::config::ScriptedContact;
use sweeper_core::runner::ContactSource;
use sweeper_core::tick::TargetedContact;
use tracing::warn;

/// Contact source backed by a fixed, time-ordered script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedContacts {
    entries: Vec<ScriptedContact>,
    cursor: usize,
}

impl ScriptedContacts {
    /// Build a source from script entries in any order.
    ///
    /// Entries with a non-finite time are dropped. Entries sharing a time
    /// keep their relative order.
    pub fn new(mut entries: Vec<ScriptedContact>) -> Self {
        entries.retain(|entry| {
            let keep = entry.at.is_finite();
            if !keep {
                warn!(target_name = %entry.target, "dropping scripted contact with invalid time");
            }
            keep
        });
        entries.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { entries, cursor: 0 }
    }

    /// Total number of entries in the script.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the script has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries not yet delivered since the last (re)load.
    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.cursor)
    }
}

impl ContactSource for ScriptedContacts {
    fn poll(&mut self, scene_time: f64) -> Vec<TargetedContact> {
        let due: Vec<TargetedContact> = self
            .entries
            .iter()
            .skip(self.cursor)
            .take_while(|entry| entry.at <= scene_time)
            .map(|entry| TargetedContact {
                target: entry.target.clone(),
                event: entry.to_event(),
            })
            .collect();
        self.cursor = self.cursor.saturating_add(due.len());
        due
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use sweeper_types::ContactKind;

    use super::*;

    fn entry(at: f64, target: &str, kind: ContactKind) -> ScriptedContact {
        ScriptedContact {
            at,
            target: target.to_owned(),
            tag: "Player".to_owned(),
            layer: 0,
            kind,
        }
    }

    #[test]
    fn delivers_due_entries_in_time_order() {
        let mut script = ScriptedContacts::new(vec![
            entry(2.0, "plate", ContactKind::Exit),
            entry(1.0, "plate", ContactKind::Enter),
            entry(3.0, "beacon", ContactKind::Enter),
        ]);

        assert!(script.poll(0.5).is_empty());

        let due = script.poll(2.0);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].event.kind, ContactKind::Enter);
        assert_eq!(due[1].event.kind, ContactKind::Exit);
        assert_eq!(script.remaining(), 1);

        let due = script.poll(10.0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].target, "beacon");
        assert!(script.poll(20.0).is_empty());
    }

    #[test]
    fn rewind_replays_the_script() {
        let mut script = ScriptedContacts::new(vec![entry(0.5, "beacon", ContactKind::Enter)]);
        assert_eq!(script.poll(1.0).len(), 1);
        assert!(script.poll(2.0).is_empty());

        script.rewind();
        assert_eq!(script.remaining(), 1);
        assert_eq!(script.poll(1.0).len(), 1);
    }

    #[test]
    fn invalid_times_are_dropped() {
        let script = ScriptedContacts::new(vec![
            entry(f64::NAN, "beacon", ContactKind::Enter),
            entry(1.0, "beacon", ContactKind::Enter),
        ]);
        assert_eq!(script.len(), 1);
        assert!(!script.is_empty());
    }
}
