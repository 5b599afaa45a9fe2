/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph-based page navigation for automating a game's user interface.
//!
//! The page model, graph, and route planner live in `pagenav-core`; this crate
//! adds the navigation engine that drives a recognition oracle along planned
//! routes, plus configuration, diagnostics, a simulated game and the CLI.

pub mod catalog;
pub mod cli;
pub mod diagnostics;
pub mod navigation;
pub mod oracle;
pub mod prefs;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use navigation::{EscapeRecovery, MainPageRecovery, NavState, NavigationError, Navigator};
pub use pagenav_core::{
    Anchor, GraphError, Page, PageAction, PageGraph, PageGraphBuilder, PageKey, PageKind,
    PageRoute, PlanError, RecognitionOracle, ScreenRegion, TextAnchor, VisualAnchor,
};
pub use prefs::NavigatorPrefs;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the process-wide subscriber. `log` records from the engine are
/// forwarded into it. A second call is a no-op.
#[cfg(feature = "tracing")]
pub fn init_tracing(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::from_default_env(),
    };
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        eprintln!("tracing was already initialized: {err}");
        return;
    }
    tracing::debug!(version = VERSION, "pagenav tracing initialized");
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing(_filter: Option<&str>) {}
