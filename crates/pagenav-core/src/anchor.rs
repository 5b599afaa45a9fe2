/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Recognition anchors and edge actions.
//!
//! An anchor is a feature on the game frame (an icon template or a piece of
//! text) whose presence identifies a page. Anchors are opaque descriptors:
//! how they are matched is the recognition oracle's business.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rectangle in game-window pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for ScreenRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Icon template anchor, optionally restricted to a search region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualAnchor {
    /// Template identifier understood by the oracle.
    pub name: String,
    pub region: Option<ScreenRegion>,
}

impl VisualAnchor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
        }
    }

    pub fn in_region(mut self, region: ScreenRegion) -> Self {
        self.region = Some(region);
        self
    }
}

/// On-screen text anchor, optionally restricted to a search region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextAnchor {
    pub text: String,
    pub region: Option<ScreenRegion>,
}

impl TextAnchor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region: None,
        }
    }

    pub fn in_region(mut self, region: ScreenRegion) -> Self {
        self.region = Some(region);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    Visual(VisualAnchor),
    Text(TextAnchor),
}

impl From<VisualAnchor> for Anchor {
    fn from(anchor: VisualAnchor) -> Self {
        Anchor::Visual(anchor)
    }
}

impl From<TextAnchor> for Anchor {
    fn from(anchor: TextAnchor) -> Self {
        Anchor::Text(anchor)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Visual(anchor) => write!(f, "icon:{}", anchor.name),
            Anchor::Text(anchor) => write!(f, "text:{}", anchor.text),
        }
    }
}

/// What the engine does to traverse an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageAction {
    /// Press a key token, e.g. `"esc"` or `"m"`.
    Key(String),
    /// Wait for the anchor to appear, then click it.
    Click(Anchor),
}

impl PageAction {
    pub fn key(token: impl Into<String>) -> Self {
        PageAction::Key(token.into())
    }

    pub fn click_icon(anchor: VisualAnchor) -> Self {
        PageAction::Click(Anchor::Visual(anchor))
    }

    pub fn click_text(anchor: TextAnchor) -> Self {
        PageAction::Click(Anchor::Text(anchor))
    }
}

impl From<&str> for PageAction {
    fn from(token: &str) -> Self {
        PageAction::key(token)
    }
}

impl fmt::Display for PageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageAction::Key(token) => write!(f, "key '{token}'"),
            PageAction::Click(anchor) => write!(f, "click {anchor}"),
        }
    }
}
