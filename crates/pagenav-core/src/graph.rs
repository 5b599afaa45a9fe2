/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Page graph.
//!
//! Core structures:
//! - `PageGraphBuilder`: mutable declaration surface used once at startup
//! - `PageGraph`: frozen catalog backed by petgraph::StableGraph, shared read-only
//!
//! Edge declaration order matters: outgoing links are always reported in the
//! order they were first declared, which is what route planning tie-breaks on.

use std::collections::HashMap;
use std::fmt;

use petgraph::Directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;

use crate::anchor::{Anchor, PageAction, ScreenRegion};
use crate::oracle::RecognitionOracle;
use crate::page::Page;

/// Stable page handle (petgraph NodeIndex).
pub type PageKey = NodeIndex;

/// Title strip used by titled pages when no region is configured.
pub const DEFAULT_TITLE_REGION: ScreenRegion = ScreenRegion::new(80, 20, 400, 48);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicatePage(String),
    UnknownPage(PageKey),
    /// Titled pages are matched by title and cannot carry anchors.
    AnchorOnTitledPage(String),
    SelfLink(String),
    MissingMainPage,
    MissingLoadingPage,
    /// The main page doubles as the loading sentinel.
    SentinelIsMain(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePage(name) => write!(f, "page '{name}' is declared twice"),
            Self::UnknownPage(key) => write!(f, "page {key:?} is not registered"),
            Self::AnchorOnTitledPage(name) => {
                write!(f, "titled page '{name}' cannot carry check anchors")
            }
            Self::SelfLink(name) => write!(f, "page '{name}' links to itself"),
            Self::MissingMainPage => write!(f, "no main page designated"),
            Self::MissingLoadingPage => write!(f, "no loading page designated"),
            Self::SentinelIsMain(name) => {
                write!(f, "page '{name}' cannot be both main and loading")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Declaration surface for a page catalog.
pub struct PageGraphBuilder {
    inner: StableGraph<Page, PageAction, Directed>,
    name_to_page: HashMap<String, PageKey>,
    catalog: Vec<PageKey>,
    main: Option<PageKey>,
    loading: Option<PageKey>,
    title_region: ScreenRegion,
}

impl PageGraphBuilder {
    pub fn new() -> Self {
        Self {
            inner: StableGraph::new(),
            name_to_page: HashMap::new(),
            catalog: Vec::new(),
            main: None,
            loading: None,
            title_region: DEFAULT_TITLE_REGION,
        }
    }

    pub fn with_title_region(mut self, region: ScreenRegion) -> Self {
        self.title_region = region;
        self
    }

    /// Register a page. Catalog order is registration order.
    pub fn add_page(&mut self, page: Page) -> Result<PageKey, GraphError> {
        if self.name_to_page.contains_key(page.name()) {
            return Err(GraphError::DuplicatePage(page.name().to_string()));
        }
        let name = page.name().to_string();
        let key = self.inner.add_node(page);
        self.name_to_page.insert(name, key);
        self.catalog.push(key);
        Ok(key)
    }

    pub fn page(
        &mut self,
        name: impl Into<String>,
        check_anchors: Vec<Anchor>,
    ) -> Result<PageKey, GraphError> {
        self.add_page(Page::anchored(name, check_anchors))
    }

    pub fn title_page(
        &mut self,
        name: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<PageKey, GraphError> {
        self.add_page(Page::titled(name, title))
    }

    pub fn add_check_anchor(
        &mut self,
        key: PageKey,
        anchor: impl Into<Anchor>,
    ) -> Result<(), GraphError> {
        let page = self
            .inner
            .node_weight_mut(key)
            .ok_or(GraphError::UnknownPage(key))?;
        if page.push_anchor(anchor.into()) {
            Ok(())
        } else {
            Err(GraphError::AnchorOnTitledPage(page.name().to_string()))
        }
    }

    /// Declare `from -> to`. Re-linking an existing pair replaces the action
    /// but keeps the edge's original position in `from`'s link order.
    pub fn link(
        &mut self,
        from: PageKey,
        to: PageKey,
        action: impl Into<PageAction>,
    ) -> Result<(), GraphError> {
        for key in [from, to] {
            if !self.inner.contains_node(key) {
                return Err(GraphError::UnknownPage(key));
            }
        }
        if from == to {
            return Err(GraphError::SelfLink(self.inner[from].name().to_string()));
        }
        let action = action.into();
        match self.inner.find_edge(from, to) {
            Some(edge) => self.inner[edge] = action,
            None => {
                self.inner.add_edge(from, to, action);
            }
        }
        Ok(())
    }

    pub fn set_main(&mut self, key: PageKey) -> Result<(), GraphError> {
        if !self.inner.contains_node(key) {
            return Err(GraphError::UnknownPage(key));
        }
        self.main = Some(key);
        Ok(())
    }

    pub fn set_loading(&mut self, key: PageKey) -> Result<(), GraphError> {
        if !self.inner.contains_node(key) {
            return Err(GraphError::UnknownPage(key));
        }
        self.loading = Some(key);
        Ok(())
    }

    pub fn build(self) -> Result<PageGraph, GraphError> {
        let main = self.main.ok_or(GraphError::MissingMainPage)?;
        let loading = self.loading.ok_or(GraphError::MissingLoadingPage)?;
        if main == loading {
            return Err(GraphError::SentinelIsMain(
                self.inner[main].name().to_string(),
            ));
        }

        let (titled, anchored): (Vec<PageKey>, Vec<PageKey>) = self
            .catalog
            .iter()
            .copied()
            .filter(|key| *key != loading)
            .partition(|key| self.inner[*key].is_titled());
        let detection_order = titled.into_iter().chain(anchored).collect();

        log::debug!(
            "page graph built: {} pages, {} links",
            self.inner.node_count(),
            self.inner.edge_count()
        );

        Ok(PageGraph {
            inner: self.inner,
            name_to_page: self.name_to_page,
            catalog: self.catalog,
            detection_order,
            main,
            loading,
            title_region: self.title_region,
        })
    }
}

impl Default for PageGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen page catalog. Never mutated after `PageGraphBuilder::build`.
#[derive(Debug, Clone)]
pub struct PageGraph {
    pub(crate) inner: StableGraph<Page, PageAction, Directed>,
    name_to_page: HashMap<String, PageKey>,
    catalog: Vec<PageKey>,
    /// Titled pages first, then anchored pages, each in catalog order.
    /// The loading sentinel is never a detection candidate.
    detection_order: Vec<PageKey>,
    main: PageKey,
    loading: PageKey,
    title_region: ScreenRegion,
}

impl PageGraph {
    pub fn page(&self, key: PageKey) -> Option<&Page> {
        self.inner.node_weight(key)
    }

    pub fn key_of(&self, name: &str) -> Option<PageKey> {
        self.name_to_page.get(name).copied()
    }

    /// Page name for logs and error messages.
    pub fn name_of(&self, key: PageKey) -> String {
        self.page(key)
            .map(|page| page.name().to_string())
            .unwrap_or_else(|| format!("{key:?}"))
    }

    pub fn main(&self) -> PageKey {
        self.main
    }

    pub fn loading(&self) -> PageKey {
        self.loading
    }

    pub fn title_region(&self) -> &ScreenRegion {
        &self.title_region
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// All pages in catalog order, sentinel included.
    pub fn pages(&self) -> impl Iterator<Item = (PageKey, &Page)> + '_ {
        self.catalog.iter().map(|key| (*key, &self.inner[*key]))
    }

    pub fn detection_order(&self) -> &[PageKey] {
        &self.detection_order
    }

    pub fn has_titled_pages(&self) -> bool {
        self.detection_order
            .first()
            .is_some_and(|key| self.inner[*key].is_titled())
    }

    /// Outgoing links of `key` in declaration order.
    pub fn links(&self, key: PageKey) -> Vec<(PageKey, &PageAction)> {
        if !self.inner.contains_node(key) {
            return Vec::new();
        }
        // petgraph walks adjacency most-recent first; edge ids are allocated
        // in declaration order and never reused because the graph is frozen.
        let mut edges: Vec<_> = self.inner.edges(key).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| (edge.target(), edge.weight()))
            .collect()
    }

    pub fn action(&self, from: PageKey, to: PageKey) -> Option<&PageAction> {
        let edge = self.inner.find_edge(from, to)?;
        self.inner.edge_weight(edge)
    }

    /// Detection predicate of a single page. Unknown keys never match.
    pub fn is_current(&self, key: PageKey, oracle: &dyn RecognitionOracle) -> bool {
        self.page(key)
            .is_some_and(|page| page.is_current(oracle, &self.title_region))
    }
}
