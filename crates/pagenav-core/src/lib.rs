/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Page graph kernel for pagenav.
//!
//! Everything here is free of input side effects: pages, anchors, the frozen
//! page graph, the recognition contract the engine drives, and route planning.

pub mod anchor;
pub mod graph;
pub mod oracle;
pub mod page;
pub mod plan;

pub use anchor::{Anchor, PageAction, ScreenRegion, TextAnchor, VisualAnchor};
pub use graph::{DEFAULT_TITLE_REGION, GraphError, PageGraph, PageGraphBuilder, PageKey};
pub use oracle::RecognitionOracle;
pub use page::{Page, PageKind};
pub use plan::{PageRoute, PlanError, plan_path};
