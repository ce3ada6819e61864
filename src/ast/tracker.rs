//! Which keyed nodes and marks are identical to their pristine version.

use std::collections::HashMap;

use super::{Document, Node, NodeType, TypeName};

type Key = (String, TypeName);

/// Where a node sits: its parent's type and the nearest keyed ancestor.
type Placement = (NodeType, Option<Key>);

/// What the pristine document holds for one key.
enum Entry<'p> {
    Node(&'p Node, Placement),
    /// The inline siblings a mark spans.
    Run(&'p [Node]),
    /// Seen more than once, or a mark whose run has gaps.
    Ambiguous,
}

/// Per-serialization map of "unchanged since pristine" verdicts keyed by
/// `(sourceMapKey, type)`. Keys without a pristine counterpart are absent
/// and count as changed.
///
/// A node whose source spans several lines also has to stay where it was:
/// its later lines carry the prefixes of its original containers.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    verdicts: HashMap<Key, bool>,
}

impl ChangeTracker {
    /// A tracker that treats everything as changed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn track(current: &Document, pristine: &Document) -> Self {
        let mut index: HashMap<Key, Entry<'_>> = HashMap::new();
        index_node(&pristine.root, (NodeType::Doc, None), &mut index);

        let mut tracker = ChangeTracker::default();
        tracker.visit(&current.root, (NodeType::Doc, None), &index);
        tracing::trace!(keys = tracker.verdicts.len(), "tracked document changes");
        tracker
    }

    pub fn is_unchanged(&self, key: &str, type_name: TypeName) -> bool {
        self.verdicts
            .get(&(key.to_string(), type_name))
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    fn record(&mut self, key: Key, unchanged: bool) {
        self.verdicts
            .entry(key)
            .and_modify(|v| *v &= unchanged)
            .or_insert(unchanged);
    }

    fn visit(&mut self, node: &Node, placement: Placement, index: &HashMap<Key, Entry<'_>>) {
        let own = node_key(node);
        if let Some(key) = &own {
            if let Some(entry) = index.get(key) {
                let unchanged = match entry {
                    Entry::Node(p, at) => {
                        *p == node && (*at == placement || !spans_lines(node))
                    }
                    _ => false,
                };
                self.record(key.clone(), unchanged);
            }
        }
        for (key, run) in mark_runs(&node.content) {
            if let Some(entry) = index.get(&key) {
                let unchanged = match (entry, run) {
                    (Entry::Run(p), Some(run)) => *p == run,
                    _ => false,
                };
                self.record(key, unchanged);
            }
        }
        let inner = (node.node_type, own.or(placement.1));
        for child in &node.content {
            self.visit(child, inner.clone(), index);
        }
    }
}

fn node_key(node: &Node) -> Option<Key> {
    let key = node.attrs.source_map_key()?;
    Some((key.to_string(), TypeName::Node(node.node_type)))
}

fn spans_lines(node: &Node) -> bool {
    node.attrs
        .source_markdown()
        .is_some_and(|source| source.contains('\n'))
}

fn index_node<'p>(node: &'p Node, placement: Placement, index: &mut HashMap<Key, Entry<'p>>) {
    let own = node_key(node);
    if let Some(key) = &own {
        insert(index, key.clone(), Entry::Node(node, placement.clone()));
    }
    for (key, run) in mark_runs(&node.content) {
        let entry = run.map_or(Entry::Ambiguous, Entry::Run);
        insert(index, key, entry);
    }
    let inner = (node.node_type, own.or(placement.1));
    for child in &node.content {
        index_node(child, inner.clone(), index);
    }
}

fn insert<'p>(index: &mut HashMap<Key, Entry<'p>>, key: Key, entry: Entry<'p>) {
    index
        .entry(key)
        .and_modify(|e| *e = Entry::Ambiguous)
        .or_insert(entry);
}

/// Keyed marks among `siblings` with the slice each one spans, or `None`
/// when the siblings carrying it are not contiguous.
fn mark_runs(siblings: &[Node]) -> Vec<(Key, Option<&[Node]>)> {
    let mut spans: Vec<(Key, usize, usize, usize)> = Vec::new();
    for (i, node) in siblings.iter().enumerate() {
        for mark in &node.marks {
            let Some(key) = mark.attrs.source_map_key() else {
                continue;
            };
            let key = (key.to_string(), TypeName::Mark(mark.mark_type));
            match spans.iter_mut().find(|(k, ..)| *k == key) {
                Some((_, _, last, count)) => {
                    *last = i;
                    *count += 1;
                }
                None => spans.push((key, i, i, 1)),
            }
        }
    }
    spans
        .into_iter()
        .map(|(key, first, last, count)| {
            let run = (count == last - first + 1).then(|| &siblings[first..=last]);
            (key, run)
        })
        .collect()
}
