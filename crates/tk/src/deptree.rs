//! Dependency tree analysis for a root ticket.
//!
//! [`DepTree::build`] walks the `deps` edges reachable from a root ticket and
//! computes two numbers per reached ticket:
//!
//! - **max depth**: the longest acyclic path length from the root. In the
//!   default rendering a ticket reachable along several paths is drawn once,
//!   under the parent that puts it deepest.
//! - **subtree depth**: the height of the ticket's own dependency subtree,
//!   used to order siblings so shallow subtrees come first.
//!
//! [`DepTree::rows`] then lays the tree out depth first as a list of
//! [`TreeRow`]s ready to print.
//!
//! Every walk uses an explicit stack and carries the ancestor path of the
//! current node, so arbitrarily deep graphs cannot overflow the call stack
//! and cycles are cut where they close: a node already on its own ancestor
//! path is never expanded again. Deps naming tickets that are not in the
//! map, and empty dep strings, are skipped.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use tk::deptree::{DepTree, RenderMode};
//! use tk::domain::Ticket;
//!
//! let mut a = Ticket::new("a-1111", "Top");
//! a.deps = vec!["b-2222".to_string()];
//! let b = Ticket::new("b-2222", "Bottom");
//!
//! let tickets: HashMap<String, Ticket> =
//!     [a, b].into_iter().map(|t| (t.id.clone(), t)).collect();
//!
//! let tree = DepTree::build(&tickets, "a-1111");
//! let ids: Vec<&str> = tree
//!     .rows(RenderMode::Deduplicated)
//!     .iter()
//!     .map(|row| row.ticket.id.as_str())
//!     .collect();
//! assert_eq!(ids, ["a-1111", "b-2222"]);
//! ```

use crate::domain::Ticket;
use std::collections::{HashMap, HashSet};

/// How repeated tickets are handled when laying out the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Draw each ticket once, at its maximum depth.
    #[default]
    Deduplicated,
    /// Draw every path; a ticket appears under each parent that depends on
    /// it. Cycles are still cut.
    Full,
}

/// Per-ticket results of the analysis passes.
#[derive(Debug, Clone, Copy)]
struct NodeInfo<'a> {
    ticket: &'a Ticket,
    max_depth: Option<usize>,
    subtree_depth: Option<usize>,
}

/// The analysed dependency graph below one root ticket.
#[derive(Debug, Clone)]
pub struct DepTree<'a> {
    root: &'a str,
    nodes: HashMap<&'a str, NodeInfo<'a>>,
}

/// One printable line of a dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow<'a> {
    /// The ticket on this line.
    pub ticket: &'a Ticket,
    /// Distance from the root (the root is `0`).
    pub depth: usize,
    /// For each ancestor level between the root and this row's parent,
    /// whether that ancestor still has siblings below it. Drives the
    /// vertical continuation lines.
    pub guides: Vec<bool>,
    /// Whether this row is the last child of its parent.
    pub is_last: bool,
}

struct MaxDepthFrame<'a> {
    id: &'a str,
    depth: usize,
    ancestors: Vec<&'a str>,
}

struct SubtreeFrame<'a> {
    id: &'a str,
    ancestors: Vec<&'a str>,
    expanded: bool,
}

struct RenderFrame<'a> {
    id: &'a str,
    depth: usize,
    ancestors: Vec<&'a str>,
    guides: Vec<bool>,
    is_last: bool,
}

impl<'a> DepTree<'a> {
    /// Analyse the graph reachable from `root` over `tickets`.
    ///
    /// An unknown root yields an empty tree.
    #[must_use]
    pub fn build(tickets: &'a HashMap<String, Ticket>, root: &'a str) -> Self {
        let nodes = tickets
            .iter()
            .map(|(id, ticket)| {
                (
                    id.as_str(),
                    NodeInfo {
                        ticket,
                        max_depth: None,
                        subtree_depth: None,
                    },
                )
            })
            .collect();

        let mut tree = Self { root, nodes };
        tree.compute_max_depths();
        tree.compute_subtree_depths();
        tree
    }

    /// The root ticket ID.
    #[must_use]
    pub fn root(&self) -> &str {
        self.root
    }

    /// Longest acyclic distance from the root, or `None` if `id` is not
    /// reachable.
    #[must_use]
    pub fn max_depth(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).and_then(|node| node.max_depth)
    }

    /// Height of the dependency subtree below `id`, or `None` if `id` is not
    /// reachable.
    #[must_use]
    pub fn subtree_depth(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).and_then(|node| node.subtree_depth)
    }

    fn ticket(&self, id: &str) -> Option<&'a Ticket> {
        self.nodes.get(id).map(|node| node.ticket)
    }

    /// Deps of `id` that name known tickets, in declaration order.
    fn known_deps(&self, id: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.ticket(id)
            .into_iter()
            .flat_map(|ticket| ticket.deps.iter())
            .map(String::as_str)
            .filter(|dep| !dep.is_empty() && self.nodes.contains_key(dep))
    }

    fn compute_max_depths(&mut self) {
        let mut stack = vec![MaxDepthFrame {
            id: self.root,
            depth: 0,
            ancestors: Vec::new(),
        }];

        while let Some(frame) = stack.pop() {
            if frame.ancestors.contains(&frame.id) {
                continue;
            }
            let Some(node) = self.nodes.get_mut(frame.id) else {
                continue;
            };
            if node.max_depth.is_none_or(|depth| frame.depth > depth) {
                node.max_depth = Some(frame.depth);
            }

            let mut ancestors = frame.ancestors;
            ancestors.push(frame.id);
            let deps: Vec<&'a str> = self.known_deps(frame.id).collect();
            for dep in deps.into_iter().rev() {
                stack.push(MaxDepthFrame {
                    id: dep,
                    depth: frame.depth + 1,
                    ancestors: ancestors.clone(),
                });
            }
        }
    }

    fn compute_subtree_depths(&mut self) {
        if !self.nodes.contains_key(self.root) {
            return;
        }

        let mut stack = vec![SubtreeFrame {
            id: self.root,
            ancestors: Vec::new(),
            expanded: false,
        }];

        while let Some(top) = stack.len().checked_sub(1) {
            let id = stack[top].id;

            if !stack[top].expanded {
                if self.subtree_depth(id).is_some() {
                    stack.pop();
                    continue;
                }
                stack[top].expanded = true;

                let mut ancestors = stack[top].ancestors.clone();
                ancestors.push(id);
                let pending: Vec<&'a str> = self
                    .known_deps(id)
                    .filter(|dep| !ancestors.contains(dep) && self.subtree_depth(dep).is_none())
                    .collect();
                for dep in pending.into_iter().rev() {
                    stack.push(SubtreeFrame {
                        id: dep,
                        ancestors: ancestors.clone(),
                        expanded: false,
                    });
                }
                continue;
            }

            let Some(frame) = stack.pop() else {
                break;
            };
            let own = self.max_depth(id).unwrap_or(0);
            let depth = self
                .known_deps(id)
                .filter(|dep| *dep != id && !frame.ancestors.contains(dep))
                .filter_map(|dep| self.subtree_depth(dep))
                .fold(own, usize::max);

            if let Some(node) = self.nodes.get_mut(id) {
                node.subtree_depth = Some(depth);
            }
        }
    }

    /// Lay the tree out depth first, root first.
    ///
    /// A dep is drawn under a parent at depth `d` when it is not on the
    /// parent's own ancestor path and, in [`RenderMode::Deduplicated`], when
    /// it has not been drawn yet and its max depth is `d + 1`. Siblings are
    /// ordered by subtree depth, then by ID.
    #[must_use]
    pub fn rows(&self, mode: RenderMode) -> Vec<TreeRow<'a>> {
        let mut rows = Vec::new();
        if self.ticket(self.root).is_none() {
            return rows;
        }

        let mut printed: HashSet<&'a str> = HashSet::new();
        let mut stack = vec![RenderFrame {
            id: self.root,
            depth: 0,
            ancestors: Vec::new(),
            guides: Vec::new(),
            is_last: true,
        }];

        while let Some(frame) = stack.pop() {
            let Some(ticket) = self.ticket(frame.id) else {
                continue;
            };
            printed.insert(frame.id);

            let mut ancestors = frame.ancestors;
            ancestors.push(frame.id);

            let children = self.renderable_children(frame.id, frame.depth, &ancestors, &printed, mode);
            let child_guides = if frame.depth == 0 {
                Vec::new()
            } else {
                let mut guides = frame.guides.clone();
                guides.push(!frame.is_last);
                guides
            };

            let count = children.len();
            for (index, child) in children.into_iter().enumerate().rev() {
                stack.push(RenderFrame {
                    id: child,
                    depth: frame.depth + 1,
                    ancestors: ancestors.clone(),
                    guides: child_guides.clone(),
                    is_last: index + 1 == count,
                });
            }

            rows.push(TreeRow {
                ticket,
                depth: frame.depth,
                guides: frame.guides,
                is_last: frame.is_last,
            });
        }

        rows
    }

    fn renderable_children(
        &self,
        id: &str,
        depth: usize,
        ancestors: &[&'a str],
        printed: &HashSet<&'a str>,
        mode: RenderMode,
    ) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut children: Vec<&'a str> = self
            .known_deps(id)
            .filter(|dep| seen.insert(*dep))
            .filter(|dep| !ancestors.contains(dep))
            .filter(|dep| match mode {
                RenderMode::Full => true,
                RenderMode::Deduplicated => {
                    !printed.contains(dep) && self.max_depth(dep) == Some(depth + 1)
                }
            })
            .collect();

        children.sort_by(|a, b| {
            self.subtree_depth(a)
                .cmp(&self.subtree_depth(b))
                .then_with(|| a.cmp(b))
        });
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: &str, deps: &[&str]) -> Ticket {
        let mut ticket = Ticket::new(id, format!("Ticket {id}"));
        ticket.deps = deps.iter().map(ToString::to_string).collect();
        ticket
    }

    fn map(tickets: Vec<Ticket>) -> HashMap<String, Ticket> {
        tickets.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    fn ids<'a>(rows: &[TreeRow<'a>]) -> Vec<(&'a str, usize)> {
        rows.iter().map(|row| (row.ticket.id.as_str(), row.depth)).collect()
    }

    #[test]
    fn chain_depths() {
        let tickets = map(vec![
            ticket("a", &["b"]),
            ticket("b", &["c"]),
            ticket("c", &[]),
        ]);
        let tree = DepTree::build(&tickets, "a");

        assert_eq!(tree.max_depth("a"), Some(0));
        assert_eq!(tree.max_depth("b"), Some(1));
        assert_eq!(tree.max_depth("c"), Some(2));
        assert_eq!(tree.subtree_depth("a"), Some(2));
        assert_eq!(tree.subtree_depth("c"), Some(2));
    }

    #[test]
    fn unreachable_tickets_have_no_depth() {
        let tickets = map(vec![ticket("a", &[]), ticket("z", &[])]);
        let tree = DepTree::build(&tickets, "a");
        assert_eq!(tree.max_depth("z"), None);
        assert_eq!(tree.subtree_depth("z"), None);
    }

    #[test]
    fn unknown_root_is_empty() {
        let tickets = map(vec![ticket("a", &[])]);
        let tree = DepTree::build(&tickets, "nope");
        assert!(tree.rows(RenderMode::Full).is_empty());
        assert_eq!(tree.root(), "nope");
    }

    #[test]
    fn dangling_and_empty_deps_are_skipped() {
        let tickets = map(vec![ticket("a", &["ghost", "", "b"]), ticket("b", &[])]);
        let tree = DepTree::build(&tickets, "a");
        assert_eq!(ids(&tree.rows(RenderMode::Full)), vec![("a", 0), ("b", 1)]);
    }

    #[test]
    fn self_dependency_terminates() {
        let tickets = map(vec![ticket("a", &["a"])]);
        let tree = DepTree::build(&tickets, "a");
        assert_eq!(tree.max_depth("a"), Some(0));
        assert_eq!(ids(&tree.rows(RenderMode::Full)), vec![("a", 0)]);
    }

    #[test]
    fn siblings_sorted_by_subtree_depth_then_id() {
        // a -> [x, c, b]; x has a child, so it sorts after the leaves.
        let tickets = map(vec![
            ticket("a", &["x", "c", "b"]),
            ticket("x", &["y"]),
            ticket("y", &[]),
            ticket("b", &[]),
            ticket("c", &[]),
        ]);
        let tree = DepTree::build(&tickets, "a");
        assert_eq!(
            ids(&tree.rows(RenderMode::Deduplicated)),
            vec![("a", 0), ("b", 1), ("c", 1), ("x", 1), ("y", 2)]
        );
    }

    #[test]
    fn guides_track_open_ancestors() {
        let tickets = map(vec![
            ticket("a", &["b", "c"]),
            ticket("b", &["d"]),
            ticket("c", &[]),
            ticket("d", &[]),
        ]);
        let tree = DepTree::build(&tickets, "a");
        let rows = tree.rows(RenderMode::Deduplicated);

        // c is a leaf, so it sorts before b.
        assert_eq!(ids(&rows), vec![("a", 0), ("c", 1), ("b", 1), ("d", 2)]);
        assert!(!rows[1].is_last);
        assert!(rows[2].is_last);
        assert_eq!(rows[3].guides, vec![false]);
        assert!(rows[3].is_last);
    }

    #[test]
    fn duplicate_deps_render_once() {
        let tickets = map(vec![ticket("a", &["b", "b"]), ticket("b", &[])]);
        let tree = DepTree::build(&tickets, "a");
        assert_eq!(ids(&tree.rows(RenderMode::Full)), vec![("a", 0), ("b", 1)]);
    }
}
