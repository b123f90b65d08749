//! Dependency tracking for derived values.
//!
//! Every resolved value is addressed by an [`EntryKey`] (token, element).
//! While a derived value is evaluated, each read made through its
//! [`TokenReader`](crate::TokenReader) is appended to the top frame of the
//! [`EvaluationStack`]. When the evaluation finishes the reads become the
//! entry's edges in the [`DependencyGraph`], replacing whatever it read last
//! time.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::token::TokenId;
use crate::tree::ElementId;

/// One resolvable (token, element) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct EntryKey {
    pub(crate) token: TokenId,
    pub(crate) element: ElementId,
}

impl EntryKey {
    pub(crate) fn new(token: TokenId, element: ElementId) -> Self {
        Self { token, element }
    }
}

/// Reads made by one evaluation. Most derive functions read a handful of tokens.
pub(crate) type ReadSet = SmallVec<[EntryKey; 4]>;

/// Forward and reverse dependency edges between entries.
#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    dependencies: HashMap<EntryKey, ReadSet>,
    dependents: HashMap<EntryKey, HashSet<EntryKey>>,
}

impl DependencyGraph {
    /// Replaces the edges of `key` with `reads`.
    pub(crate) fn record(&mut self, key: EntryKey, reads: ReadSet) {
        self.clear(key);
        if reads.is_empty() {
            return;
        }
        for read in &reads {
            self.dependents.entry(*read).or_default().insert(key);
        }
        self.dependencies.insert(key, reads);
    }

    /// Drops the outgoing edges of `key`. Entries that read `key` keep their edges.
    pub(crate) fn clear(&mut self, key: EntryKey) {
        let Some(reads) = self.dependencies.remove(&key) else {
            return;
        };
        for read in reads {
            if let Some(set) = self.dependents.get_mut(&read) {
                set.remove(&key);
                if set.is_empty() {
                    self.dependents.remove(&read);
                }
            }
        }
    }

    /// Entries whose last evaluation read `key`.
    pub(crate) fn dependents_of(&self, key: EntryKey) -> Vec<EntryKey> {
        self.dependents
            .get(&key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn dependencies_of(&self, key: EntryKey) -> &[EntryKey] {
        self.dependencies
            .get(&key)
            .map(|reads| reads.as_slice())
            .unwrap_or(&[])
    }

    /// Removes every edge touching `element`.
    pub(crate) fn forget_element(&mut self, element: ElementId) {
        let owned: Vec<EntryKey> = self
            .dependencies
            .keys()
            .filter(|key| key.element == element)
            .copied()
            .collect();
        for key in owned {
            self.clear(key);
        }

        let read: Vec<EntryKey> = self
            .dependents
            .keys()
            .filter(|key| key.element == element)
            .copied()
            .collect();
        for key in read {
            for dependent in self.dependents.remove(&key).unwrap_or_default() {
                if let Some(reads) = self.dependencies.get_mut(&dependent) {
                    reads.retain(|r| *r != key);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dependents.is_empty()
    }
}

/// An evaluation in progress.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) key: EntryKey,
    pub(crate) reads: ReadSet,
    /// Something this evaluation read (or its own entry) was invalidated
    /// while it ran.
    pub(crate) stale: bool,
    /// Set when this evaluation is part of a detected cycle.
    pub(crate) cycle: Option<Vec<EntryKey>>,
}

/// The chain of derived evaluations currently running, innermost last.
#[derive(Debug, Default)]
pub(crate) struct EvaluationStack {
    frames: Vec<Frame>,
}

impl EvaluationStack {
    /// Starts evaluating `key`.
    ///
    /// If `key` is already being evaluated, returns the cycle path (first
    /// occurrence of `key` through the top of the stack, then `key` again)
    /// and flags every frame on that path as cyclic.
    pub(crate) fn push(&mut self, key: EntryKey) -> Result<(), Vec<EntryKey>> {
        if let Some(start) = self.frames.iter().position(|frame| frame.key == key) {
            let path: Vec<EntryKey> = self.frames[start..]
                .iter()
                .map(|frame| frame.key)
                .chain(std::iter::once(key))
                .collect();
            for frame in &mut self.frames[start..] {
                frame.cycle = Some(path.clone());
            }
            return Err(path);
        }

        self.frames.push(Frame {
            key,
            reads: ReadSet::new(),
            stale: false,
            cycle: None,
        });
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Records a read by the innermost evaluation.
    pub(crate) fn record_read(&mut self, key: EntryKey) {
        if let Some(frame) = self.frames.last_mut() {
            if !frame.reads.contains(&key) {
                frame.reads.push(key);
            }
        }
    }

    /// Flags evaluations that already read `key`, or are computing it.
    pub(crate) fn mark_stale(&mut self, key: EntryKey) {
        for frame in &mut self.frames {
            if frame.key == key || frame.reads.contains(&key) {
                frame.stale = true;
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ElementArena;

    fn keys(n: usize) -> Vec<EntryKey> {
        let mut arena = ElementArena::new();
        let element = arena.insert(None).unwrap();
        (0..n)
            .map(|_| {
                let token = crate::Token::<f64>::create("k").id();
                EntryKey::new(token, element)
            })
            .collect()
    }

    #[test]
    fn test_record_replaces_edges() {
        let k = keys(3);
        let mut graph = DependencyGraph::default();

        graph.record(k[0], ReadSet::from_slice(&[k[1]]));
        assert_eq!(graph.dependents_of(k[1]), vec![k[0]]);

        graph.record(k[0], ReadSet::from_slice(&[k[2]]));
        assert!(graph.dependents_of(k[1]).is_empty());
        assert_eq!(graph.dependents_of(k[2]), vec![k[0]]);
        assert_eq!(graph.dependencies_of(k[0]), &[k[2]]);
    }

    #[test]
    fn test_clear_keeps_incoming_edges() {
        let k = keys(3);
        let mut graph = DependencyGraph::default();
        graph.record(k[0], ReadSet::from_slice(&[k[1]]));
        graph.record(k[1], ReadSet::from_slice(&[k[2]]));

        graph.clear(k[1]);
        assert!(graph.dependents_of(k[2]).is_empty());
        assert_eq!(graph.dependents_of(k[1]), vec![k[0]]);
    }

    #[test]
    fn test_forget_element_drops_everything() {
        let k = keys(2);
        let mut graph = DependencyGraph::default();
        graph.record(k[0], ReadSet::from_slice(&[k[1]]));
        graph.forget_element(k[0].element);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_push_detects_cycle() {
        let k = keys(3);
        let mut stack = EvaluationStack::default();
        stack.push(k[0]).unwrap();
        stack.push(k[1]).unwrap();
        stack.push(k[2]).unwrap();

        let path = stack.push(k[1]).unwrap_err();
        assert_eq!(path, vec![k[1], k[2], k[1]]);

        assert!(stack.pop().unwrap().cycle.is_some());
        assert!(stack.pop().unwrap().cycle.is_some());
        assert!(stack.pop().unwrap().cycle.is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_mark_stale_only_hits_readers() {
        let k = keys(3);
        let mut stack = EvaluationStack::default();
        stack.push(k[0]).unwrap();
        stack.record_read(k[1]);
        stack.record_read(k[1]);
        stack.push(k[2]).unwrap();

        stack.mark_stale(k[1]);
        let inner = stack.pop().unwrap();
        let outer = stack.pop().unwrap();
        assert!(!inner.stale);
        assert!(outer.stale);
        assert_eq!(outer.reads.len(), 1);
    }
}
