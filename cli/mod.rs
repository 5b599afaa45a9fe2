/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! `pagenav` command line: inspect the demo catalog, plan routes over it, and
//! run the navigator against the simulated game.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use bpaf::Bpaf;
use pagenav_core::{GraphError, PageGraph, PageKind, plan_path};

use crate::catalog::{DemoCatalog, demo_catalog};
use crate::diagnostics::DiagnosticsState;
use crate::navigation::{NavigationError, Navigator};
use crate::oracle::SimulatedGame;
use crate::prefs::{NavigatorPrefs, PrefsError};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
/// Graph-based page navigation for game UI automation
pub struct Options {
    /// Navigator preferences file (TOML)
    #[bpaf(long, argument("PATH"))]
    pub config: Option<PathBuf>,
    /// Log filter, e.g. `debug` or `pagenav=trace`
    #[bpaf(long, argument("FILTER"), fallback(String::from("info")), display_fallback)]
    pub log: String,
    /// Print a diagnostics snapshot on exit
    #[bpaf(long)]
    pub diagnostics: bool,
    #[bpaf(external(command))]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Bpaf)]
pub enum Command {
    /// List catalog pages with their outgoing links
    #[bpaf(command)]
    Pages,
    /// Print the shortest route between two pages
    #[bpaf(command)]
    Plan {
        #[bpaf(long, argument("PAGE"))]
        from: String,
        #[bpaf(long, argument("PAGE"))]
        to: String,
    },
    /// Navigate the simulated game from one page to another
    #[bpaf(command)]
    Simulate {
        #[bpaf(long, argument("PAGE"))]
        from: String,
        #[bpaf(long, argument("PAGE"))]
        to: String,
        /// Override the configured retry budget
        #[bpaf(long, argument("N"))]
        max_retry: Option<u32>,
        /// Number of leading inputs the simulated game swallows
        #[bpaf(long, argument("N"), fallback(0))]
        drop_actions: u32,
    },
}

#[derive(Debug)]
pub enum CliError {
    Prefs(PrefsError),
    Catalog(GraphError),
    Navigation(NavigationError),
    /// A simulated navigation failed; `trace` holds the inputs and end state.
    Simulation {
        trace: String,
        source: NavigationError,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefs(err) => write!(f, "failed to load preferences: {err}"),
            Self::Catalog(err) => write!(f, "invalid page catalog: {err}"),
            Self::Navigation(err) | Self::Simulation { source: err, .. } => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Prefs(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Navigation(err) | Self::Simulation { source: err, .. } => Some(err),
        }
    }
}

impl From<PrefsError> for CliError {
    fn from(err: PrefsError) -> Self {
        Self::Prefs(err)
    }
}

impl From<GraphError> for CliError {
    fn from(err: GraphError) -> Self {
        Self::Catalog(err)
    }
}

impl From<NavigationError> for CliError {
    fn from(err: NavigationError) -> Self {
        Self::Navigation(err)
    }
}

pub fn main() -> ExitCode {
    let opts = options().run();
    crate::init_tracing(Some(&opts.log));

    let mut diagnostics = opts.diagnostics.then(DiagnosticsState::new);
    if let Some(state) = &diagnostics {
        state.install();
    }

    let result = run(&opts);

    if let Some(state) = diagnostics.as_mut() {
        state.drain();
        match serde_json::to_string_pretty(&state.snapshot_json()) {
            Ok(snapshot) => println!("{snapshot}"),
            Err(err) => log::warn!("failed to render diagnostics snapshot: {err}"),
        }
    }

    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if let CliError::Simulation { trace, .. } = &err {
                print!("{trace}");
            }
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one command and returns what it would print.
pub fn run(opts: &Options) -> Result<String, CliError> {
    let prefs = NavigatorPrefs::load_or_default(opts.config.as_deref())?;
    let catalog = demo_catalog()?;

    match &opts.command {
        Command::Pages => Ok(render_pages(&catalog.graph)),
        Command::Plan { from, to } => render_plan(&catalog, from, to),
        Command::Simulate {
            from,
            to,
            max_retry,
            drop_actions,
        } => simulate(&catalog, prefs, from, to, *max_retry, *drop_actions),
    }
}

fn lookup(catalog: &DemoCatalog, name: &str) -> Result<pagenav_core::PageKey, CliError> {
    catalog
        .key(name)
        .ok_or_else(|| NavigationError::UnknownPage(name.to_string()).into())
}

pub fn render_pages(graph: &PageGraph) -> String {
    let mut out = String::new();
    for (key, page) in graph.pages() {
        let role = if key == graph.main() {
            " [main]"
        } else if key == graph.loading() {
            " [loading]"
        } else {
            ""
        };
        let kind = match page.kind() {
            PageKind::Titled { title } => format!("title \"{title}\""),
            PageKind::Anchored { check_anchors } => {
                let anchors: Vec<String> = check_anchors.iter().map(ToString::to_string).collect();
                format!("anchors [{}]", anchors.join(", "))
            }
        };
        let _ = writeln!(out, "{page}{role}: {kind}");
        for (to, action) in graph.links(key) {
            let _ = writeln!(out, "  -> {} via {action}", graph.name_of(to));
        }
    }
    out
}

fn render_plan(catalog: &DemoCatalog, from: &str, to: &str) -> Result<String, CliError> {
    let from = lookup(catalog, from)?;
    let to = lookup(catalog, to)?;
    let route = plan_path(&catalog.graph, from, to).map_err(NavigationError::from)?;
    let mut out = format!("{}\n", route.describe(&catalog.graph));
    for (step, (a, b)) in route.steps().enumerate() {
        if let Some(action) = catalog.graph.action(a, b) {
            let _ = writeln!(out, "  {}. {action}", step + 1);
        }
    }
    Ok(out)
}

fn simulate(
    catalog: &DemoCatalog,
    prefs: NavigatorPrefs,
    from: &str,
    to: &str,
    max_retry: Option<u32>,
    drop_actions: u32,
) -> Result<String, CliError> {
    let from = lookup(catalog, from)?;
    let to = lookup(catalog, to)?;
    let max_retry = max_retry.unwrap_or(prefs.max_retry);

    let game = Arc::new(SimulatedGame::new(catalog.graph.clone(), from));
    game.ignore_next_inputs(drop_actions);
    let navigator = Navigator::new(catalog.graph.clone(), game.clone(), prefs);

    let outcome = navigator.goto_page_with_retry(to, max_retry);

    let mut out = String::new();
    for input in game.inputs() {
        let _ = writeln!(out, "input: {input}");
    }
    let _ = writeln!(
        out,
        "at {} after {:?} simulated, state {:?}",
        catalog.graph.name_of(game.current_page()),
        game.simulated_elapsed(),
        navigator.state()
    );
    match outcome {
        Ok(()) => Ok(out),
        Err(source) => Err(CliError::Simulation { trace: out, source }),
    }
}
