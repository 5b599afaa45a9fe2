/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A headless stand-in for the game window.
//!
//! `SimulatedGame` renders whatever page of a `PageGraph` it is "on" and moves
//! along the graph's declared links when it receives the matching key or click.
//! Time is virtual: `sleep` returns immediately and advances a clock, and every
//! sleep consumes one pending loading frame.

use std::sync::Arc;
use std::time::Duration;

use pagenav_core::{
    Anchor, PageAction, PageGraph, PageKey, RecognitionOracle, ScreenRegion, TextAnchor,
    VisualAnchor,
};
use parking_lot::Mutex;

/// Key that dismisses a popup and drops the game back to its main page.
pub const DISMISS_KEY: &str = "esc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedInput {
    Key(String),
    Click(Anchor),
}

impl From<&PageAction> for SimulatedInput {
    fn from(action: &PageAction) -> Self {
        match action {
            PageAction::Key(token) => SimulatedInput::Key(token.clone()),
            PageAction::Click(anchor) => SimulatedInput::Click(anchor.clone()),
        }
    }
}

impl std::fmt::Display for SimulatedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulatedInput::Key(token) => write!(f, "key '{token}'"),
            SimulatedInput::Click(anchor) => write!(f, "click {anchor}"),
        }
    }
}

/// What the window shows right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Popup,
    Loading,
    Page(PageKey),
}

#[derive(Debug)]
struct GameState {
    current: PageKey,
    popup: bool,
    loading_frames: u32,
    loading_frames_per_transition: u32,
    ignore_next: u32,
    ignore_matching: Vec<(SimulatedInput, u32)>,
    inputs: Vec<SimulatedInput>,
    sleeps: u32,
    elapsed: Duration,
}

impl GameState {
    /// Consumes an ignore budget if one applies to `input`.
    fn swallow(&mut self, input: &SimulatedInput) -> bool {
        if let Some((_, remaining)) = self
            .ignore_matching
            .iter_mut()
            .find(|(pattern, remaining)| pattern == input && *remaining > 0)
        {
            *remaining -= 1;
            return true;
        }
        if self.ignore_next > 0 {
            self.ignore_next -= 1;
            return true;
        }
        false
    }

    fn arrive(&mut self, page: PageKey) {
        self.current = page;
        self.loading_frames = self.loading_frames_per_transition;
    }
}

pub struct SimulatedGame {
    graph: Arc<PageGraph>,
    state: Mutex<GameState>,
}

impl SimulatedGame {
    pub fn new(graph: Arc<PageGraph>, start: PageKey) -> Self {
        Self {
            graph,
            state: Mutex::new(GameState {
                current: start,
                popup: false,
                loading_frames: 0,
                loading_frames_per_transition: 0,
                ignore_next: 0,
                ignore_matching: Vec::new(),
                inputs: Vec::new(),
                sleeps: 0,
                elapsed: Duration::ZERO,
            }),
        }
    }

    pub fn graph(&self) -> &PageGraph {
        &self.graph
    }

    /// The page the game is logically on, regardless of overlays.
    pub fn current_page(&self) -> PageKey {
        self.state.lock().current
    }

    /// Teleport. Clears any popup or pending loading frames.
    pub fn set_current_page(&self, page: PageKey) {
        let mut state = self.state.lock();
        state.current = page;
        state.popup = false;
        state.loading_frames = 0;
    }

    /// Cover the window with something no catalog page matches.
    pub fn show_popup(&self) {
        self.state.lock().popup = true;
    }

    pub fn begin_loading(&self, frames: u32) {
        self.state.lock().loading_frames = frames;
    }

    /// Loading frames shown after every successful page change.
    pub fn set_loading_frames_per_transition(&self, frames: u32) {
        self.state.lock().loading_frames_per_transition = frames;
    }

    /// The next `count` inputs are recorded but have no effect.
    pub fn ignore_next_inputs(&self, count: u32) {
        self.state.lock().ignore_next = count;
    }

    /// Like `ignore_next_inputs`, restricted to one specific input.
    pub fn ignore_inputs_matching(&self, input: SimulatedInput, count: u32) {
        self.state.lock().ignore_matching.push((input, count));
    }

    /// Every input received, including ignored ones.
    pub fn inputs(&self) -> Vec<SimulatedInput> {
        self.state.lock().inputs.clone()
    }

    pub fn sleep_count(&self) -> u32 {
        self.state.lock().sleeps
    }

    pub fn simulated_elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    fn frame(&self) -> Frame {
        let state = self.state.lock();
        if state.popup {
            Frame::Popup
        } else if state.loading_frames > 0 {
            Frame::Loading
        } else {
            Frame::Page(state.current)
        }
    }

    fn visible_anchors(&self) -> Vec<Anchor> {
        let page = match self.frame() {
            Frame::Popup => return Vec::new(),
            Frame::Loading => self.graph.loading(),
            Frame::Page(key) => key,
        };
        self.graph
            .page(page)
            .map(|page| page.check_anchors().to_vec())
            .unwrap_or_default()
    }

    fn receive(&self, input: SimulatedInput) {
        let mut state = self.state.lock();
        state.inputs.push(input.clone());
        if state.swallow(&input) {
            log::trace!("simulated game ignored {input}");
            return;
        }

        if state.popup {
            if input == SimulatedInput::Key(DISMISS_KEY.to_string()) {
                state.popup = false;
                let main = self.graph.main();
                state.arrive(main);
            }
            return;
        }

        let next = self
            .graph
            .links(state.current)
            .into_iter()
            .find(|(_, action)| SimulatedInput::from(*action) == input)
            .map(|(to, _)| to);
        if let Some(to) = next {
            log::trace!("simulated game moved to {}", self.graph.name_of(to));
            state.arrive(to);
        }
    }
}

impl RecognitionOracle for SimulatedGame {
    fn read_title_text(&self, _region: &ScreenRegion) -> String {
        let page = match self.frame() {
            Frame::Popup => return String::new(),
            Frame::Loading => self.graph.loading(),
            Frame::Page(key) => key,
        };
        self.graph
            .page(page)
            .and_then(|page| page.title())
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn detect_visual_anchor(&self, anchor: &VisualAnchor) -> bool {
        self.visible_anchors().iter().any(|visible| match visible {
            Anchor::Visual(visual) => visual.name == anchor.name,
            Anchor::Text(_) => false,
        })
    }

    fn detect_text_anchor(&self, anchor: &TextAnchor) -> bool {
        self.visible_anchors().iter().any(|visible| match visible {
            Anchor::Text(text) => text.text == anchor.text,
            Anchor::Visual(_) => false,
        })
    }

    fn perform_key(&self, token: &str) {
        self.receive(SimulatedInput::Key(token.to_string()));
    }

    fn perform_click(&self, anchor: &Anchor) {
        self.receive(SimulatedInput::Click(anchor.clone()));
    }

    fn sleep(&self, duration: Duration, reason: &str) {
        let mut state = self.state.lock();
        state.sleeps = state.sleeps.saturating_add(1);
        state.elapsed += duration;
        state.loading_frames = state.loading_frames.saturating_sub(1);
        log::trace!("simulated sleep {duration:?}: {reason}");
    }
}
