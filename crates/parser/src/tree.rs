//! Structural parser
//!
//! Builds a parent/child tree purely from indentation depth, then folds it
//! into a [`DocValue`].
//!
//! Both passes are iterative. Placement keeps an explicit stack of open nodes
//! and a cursor over the line records. Nodes live in an arena indexed by line
//! order; because every subtree is a contiguous run of lines, children always
//! have larger indices than their parent, and walking the arena backwards
//! visits children before parents.

use crate::line::{LineRecord, LineShape};
use indexmap::IndexMap;
use looseapi_common::{DocValue, Recovery, RecoveryKind};

/// Arena index of the synthetic root node. Node `i + 1` holds record `i`.
const ROOT: usize = 0;

/// An open node on the placement stack
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    group_depth: usize,
}

/// Parent/child structure over a slice of line records
#[derive(Debug)]
pub(crate) struct ParseTree<'a> {
    records: &'a [LineRecord],
    children: Vec<Vec<usize>>,
}

impl<'a> ParseTree<'a> {
    /// Place every record under its parent.
    ///
    /// A line at the current group depth becomes a sibling; a deeper line
    /// descends into the last sibling; a line at or above the current node's
    /// own depth closes that node. A line that lands strictly between a node's
    /// depth and its group depth is adopted by the node and reported.
    pub(crate) fn build(records: &'a [LineRecord], recoveries: &mut Vec<Recovery>) -> Self {
        let mut children = vec![Vec::new(); records.len() + 1];

        let Some(first) = records.first() else {
            return Self { records, children };
        };

        let root = Frame {
            node: ROOT,
            group_depth: first.depth,
        };
        let mut stack: Vec<Frame> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let node = index + 1;

            loop {
                let frame = stack.last().copied().unwrap_or(root);
                let own_depth = Self::depth_of(records, frame.node);

                if record.depth == frame.group_depth {
                    children[frame.node].push(node);
                    break;
                }

                if record.depth > frame.group_depth {
                    match children[frame.node].last().copied() {
                        Some(last) => {
                            stack.push(Frame {
                                node: last,
                                group_depth: record.depth,
                            });
                            continue;
                        },
                        None => {
                            children[frame.node].push(node);
                            break;
                        },
                    }
                }

                if own_depth.is_some_and(|depth| record.depth <= depth) {
                    stack.pop();
                    continue;
                }

                let recovery = Recovery {
                    line: record.line_number,
                    kind: RecoveryKind::MisalignedIndent {
                        depth: record.depth,
                        parent_depth: own_depth,
                        group_depth: frame.group_depth,
                    },
                };
                report(recoveries, recovery);
                children[frame.node].push(node);
                break;
            }
        }

        Self { records, children }
    }

    fn depth_of(records: &[LineRecord], node: usize) -> Option<usize> {
        if node == ROOT {
            None
        } else {
            Some(records[node - 1].depth)
        }
    }

    fn record(&self, node: usize) -> &LineRecord {
        &self.records[node - 1]
    }

    /// Whether the lines under `node` are text belonging to its value
    fn folds_children(&self, node: usize) -> bool {
        let record = self.record(node);
        record.is_block_scalar
            || (!self.children[node].is_empty() && matches!(record.shape(), LineShape::Pair(..)))
    }

    #[cfg(test)]
    pub(crate) fn children_of(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    /// Convert the tree into a document value.
    pub(crate) fn into_value(self, recoveries: &mut Vec<Recovery>) -> DocValue {
        let count = self.children.len();

        // Nodes under a block scalar or a multi-line plain scalar are folded
        // as text, never converted.
        let mut folded_away = vec![false; count];
        for node in 0..count {
            let hide = folded_away[node] || (node != ROOT && self.folds_children(node));
            if hide {
                for &child in &self.children[node] {
                    folded_away[child] = true;
                }
            }
        }

        // Last arena index inside each node's subtree.
        let mut subtree_end: Vec<usize> = (0..count).collect();
        for node in (0..count).rev() {
            if let Some(&last) = self.children[node].last() {
                subtree_end[node] = subtree_end[last];
            }
        }

        let mut values: Vec<Option<DocValue>> = vec![None; count];

        for node in (1..count).rev() {
            if folded_away[node] {
                continue;
            }
            let value = self.node_value(node, subtree_end[node], &mut values, recoveries);
            values[node] = Some(value);
        }

        if self.children[ROOT].is_empty() {
            DocValue::Map(IndexMap::new())
        } else {
            self.children_value(ROOT, &mut values, recoveries)
        }
    }

    fn node_value(
        &self,
        node: usize,
        subtree_end: usize,
        values: &mut [Option<DocValue>],
        recoveries: &mut Vec<Recovery>,
    ) -> DocValue {
        let record = self.record(node);
        let has_children = !self.children[node].is_empty();

        if record.is_block_scalar {
            let (key, head) = record.block_head();
            return DocValue::pair(key, self.fold(head, node + 1..=subtree_end));
        }

        match record.shape() {
            // A `key: value` line with indented continuation lines is a
            // multi-line plain scalar.
            LineShape::Pair(key, value) if has_children => {
                for continuation in node + 1..=subtree_end {
                    let line = self.record(continuation);
                    if let LineShape::Pair(entry, _) | LineShape::Key(entry) = line.shape() {
                        report(
                            recoveries,
                            Recovery {
                                line: line.line_number,
                                kind: RecoveryKind::FoldedEntry { key: entry },
                            },
                        );
                    }
                }
                DocValue::pair(key, self.fold(Some(value), node + 1..=subtree_end))
            },
            LineShape::Pair(key, value) => DocValue::pair(key, DocValue::String(value)),
            LineShape::Key(key) if has_children => {
                DocValue::pair(key, self.children_value(node, values, recoveries))
            },
            LineShape::Key(key) => DocValue::pair(key, DocValue::Null),
            LineShape::Scalar(text) if has_children => {
                DocValue::pair(text, self.children_value(node, values, recoveries))
            },
            LineShape::Scalar(text) => DocValue::String(text),
        }
    }

    /// Space-join the inline head and the raw text of every line in `range`.
    /// Nothing to join yields the `Null` placeholder.
    fn fold(&self, head: Option<String>, range: std::ops::RangeInclusive<usize>) -> DocValue {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(head) = head.as_deref() {
            parts.push(head);
        }
        for node in range {
            parts.push(&self.record(node).raw);
        }

        let text = parts.join(" ").trim().to_string();
        if text.is_empty() {
            DocValue::Null
        } else {
            DocValue::String(text)
        }
    }

    /// Combine the converted children of `node` into one value.
    fn children_value(
        &self,
        node: usize,
        values: &mut [Option<DocValue>],
        recoveries: &mut Vec<Recovery>,
    ) -> DocValue {
        let kids = &self.children[node];
        let starts_list = kids
            .first()
            .is_some_and(|&first| self.record(first).is_list_item);

        let mut taken = kids
            .iter()
            .map(|&child| (child, values[child].take().unwrap_or_default()));

        if kids.len() == 1 {
            let value = taken.next().map(|(_, v)| v).unwrap_or_default();
            return if starts_list {
                DocValue::List(vec![value])
            } else {
                value
            };
        }

        if starts_list {
            let mut items: Vec<DocValue> = Vec::new();
            for (child, value) in taken {
                if self.record(child).is_list_item {
                    items.push(value);
                } else {
                    self.continue_list_item(child, value, &mut items, recoveries);
                }
            }
            return DocValue::List(items);
        }

        let mut map = IndexMap::new();
        for (child, value) in taken {
            let line = self.record(child).line_number;
            match value {
                DocValue::Map(entries) => merge_entries(&mut map, entries, line, recoveries),
                other => {
                    let text = other.scalar_text().unwrap_or_default().into_owned();
                    report(
                        recoveries,
                        Recovery {
                            line,
                            kind: RecoveryKind::ScalarInMapping { text: text.clone() },
                        },
                    );
                    map.insert(text, DocValue::Null);
                },
            }
        }
        DocValue::Map(map)
    }

    /// Attach a non-list line that appeared inside a list block.
    ///
    /// Mapping lines extend a mapping item; that is how the keys after the
    /// first one of a list-of-maps item are written. Scalar text continues a
    /// scalar item. Anything else becomes an item of its own.
    fn continue_list_item(
        &self,
        child: usize,
        value: DocValue,
        items: &mut Vec<DocValue>,
        recoveries: &mut Vec<Recovery>,
    ) {
        let line = self.record(child).line_number;

        match (items.last_mut(), value) {
            (Some(DocValue::Map(item)), DocValue::Map(entries)) => {
                merge_entries(item, entries, line, recoveries);
            },
            (Some(DocValue::String(item)), DocValue::String(text)) => {
                item.push(' ');
                item.push_str(&text);
                report(
                    recoveries,
                    Recovery {
                        line,
                        kind: RecoveryKind::StrayListContinuation { merged: true },
                    },
                );
            },
            (_, value) => {
                items.push(value);
                report(
                    recoveries,
                    Recovery {
                        line,
                        kind: RecoveryKind::StrayListContinuation { merged: false },
                    },
                );
            },
        }
    }
}

/// Insert entries, last write wins, reporting collisions
fn merge_entries(
    target: &mut IndexMap<String, DocValue>,
    entries: IndexMap<String, DocValue>,
    line: usize,
    recoveries: &mut Vec<Recovery>,
) {
    for (key, value) in entries {
        if target.contains_key(&key) {
            report(
                recoveries,
                Recovery {
                    line,
                    kind: RecoveryKind::DuplicateKey { key: key.clone() },
                },
            );
        }
        target.insert(key, value);
    }
}

fn report(recoveries: &mut Vec<Recovery>, recovery: Recovery) {
    tracing::warn!(line = recovery.line, "structural recovery: {}", recovery.kind);
    recoveries.push(recovery);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BlockScalarPolicy;

    fn records(text: &str) -> Vec<LineRecord> {
        let policy = BlockScalarPolicy::default();
        text.split('\n')
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| LineRecord::classify(i + 1, line, &policy))
            .collect()
    }

    fn assert_depth_monotone(tree: &ParseTree<'_>, node: usize) {
        for &child in tree.children_of(node) {
            if node != ROOT {
                assert!(
                    tree.record(child).depth > tree.record(node).depth,
                    "child line {} is not deeper than parent line {}",
                    tree.record(child).line_number,
                    tree.record(node).line_number
                );
            }
            assert_depth_monotone(tree, child);
        }
    }

    #[test]
    fn test_children_are_deeper_than_parents() {
        let lines = records(
            "a:\n  b:\n    c: 1\n  d: 2\n      e: 3\n   f: 4\ng:\n  - x\n  - y\n",
        );
        let mut recoveries = Vec::new();
        let tree = ParseTree::build(&lines, &mut recoveries);
        assert_depth_monotone(&tree, ROOT);
    }

    #[test]
    fn test_subtrees_are_contiguous() {
        let lines = records("a:\n  b: 1\n  c:\n    d: 2\ne: 3\n");
        let mut recoveries = Vec::new();
        let tree = ParseTree::build(&lines, &mut recoveries);

        assert_eq!(tree.children_of(ROOT), &[1, 5]);
        assert_eq!(tree.children_of(1), &[2, 3]);
        assert_eq!(tree.children_of(3), &[4]);
        assert!(recoveries.is_empty());
    }

    #[test]
    fn test_misaligned_dedent_is_adopted() {
        let lines = records("a:\n    b: 1\n  c: 2\n");
        let mut recoveries = Vec::new();
        let tree = ParseTree::build(&lines, &mut recoveries);

        assert_eq!(tree.children_of(1), &[2, 3]);
        assert_eq!(recoveries.len(), 1);
        assert_eq!(recoveries[0].line, 3);
        assert!(matches!(
            recoveries[0].kind,
            RecoveryKind::MisalignedIndent {
                depth: 2,
                parent_depth: Some(0),
                group_depth: 4
            }
        ));
    }

    #[test]
    fn test_root_adopts_shallower_lines() {
        let lines = records("  a: 1\nb: 2\n");
        let mut recoveries = Vec::new();
        let tree = ParseTree::build(&lines, &mut recoveries);

        assert_eq!(tree.children_of(ROOT), &[1, 2]);
        assert!(matches!(
            recoveries[0].kind,
            RecoveryKind::MisalignedIndent {
                parent_depth: None,
                ..
            }
        ));
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut text = String::new();
        for level in 0..5_000 {
            text.push_str(&" ".repeat(level));
            text.push_str("k:\n");
        }
        let lines = records(&text);
        let mut recoveries = Vec::new();
        let tree = ParseTree::build(&lines, &mut recoveries);
        assert_eq!(tree.children_of(1), &[2]);
        // Value nesting mirrors the input; dropping it iteratively avoids a
        // recursive drop of a 5000-deep value in the test itself.
        let value = tree.into_value(&mut recoveries);
        let mut cursor = value;
        let mut depth = 0;
        while let DocValue::Map(mut map) = cursor {
            depth += 1;
            cursor = map.swap_remove("k").unwrap_or_default();
        }
        assert_eq!(depth, 5_000);
        assert!(recoveries.is_empty());
    }
}
