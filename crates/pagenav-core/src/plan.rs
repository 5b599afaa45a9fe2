/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Route planning over the page graph.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::graph::{PageGraph, PageKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    NoPath { from: String, to: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPath { from, to } => write!(f, "No path found from {from} to {to}"),
        }
    }
}

impl std::error::Error for PlanError {}

/// Ordered page sequence `[current, ..., target]`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRoute {
    pages: Vec<PageKey>,
}

impl PageRoute {
    /// `None` for an empty sequence; a route always contains its origin.
    pub fn new(pages: Vec<PageKey>) -> Option<Self> {
        (!pages.is_empty()).then_some(Self { pages })
    }

    pub fn pages(&self) -> &[PageKey] {
        &self.pages
    }

    /// Number of edges to traverse.
    pub fn hops(&self) -> usize {
        self.pages.len() - 1
    }

    /// Consecutive `(from, to)` pairs.
    pub fn steps(&self) -> impl Iterator<Item = (PageKey, PageKey)> + '_ {
        self.pages.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn describe(&self, graph: &PageGraph) -> String {
        self.pages
            .iter()
            .map(|key| graph.name_of(*key))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Breadth-first search along declared links only.
///
/// Pages are marked visited when enqueued, and each page's links are expanded
/// in declaration order, so among equally short routes the one reached through
/// earlier-declared links wins.
pub fn plan_path(
    graph: &PageGraph,
    current: PageKey,
    target: PageKey,
) -> Result<PageRoute, PlanError> {
    if current == target {
        return Ok(PageRoute {
            pages: vec![current],
        });
    }

    let mut queue = VecDeque::from([current]);
    let mut visited = HashSet::from([current]);
    let mut discovered_from: HashMap<PageKey, PageKey> = HashMap::new();

    while let Some(page) = queue.pop_front() {
        for (next, _) in graph.links(page) {
            if !visited.insert(next) {
                continue;
            }
            discovered_from.insert(next, page);
            if next == target {
                return Ok(PageRoute {
                    pages: unwind(&discovered_from, current, target),
                });
            }
            queue.push_back(next);
        }
    }

    Err(PlanError::NoPath {
        from: graph.name_of(current),
        to: graph.name_of(target),
    })
}

fn unwind(
    discovered_from: &HashMap<PageKey, PageKey>,
    origin: PageKey,
    target: PageKey,
) -> Vec<PageKey> {
    let mut pages = vec![target];
    let mut cursor = target;
    while cursor != origin {
        match discovered_from.get(&cursor) {
            Some(previous) => {
                pages.push(*previous);
                cursor = *previous;
            }
            None => break,
        }
    }
    pages.reverse();
    pages
}
