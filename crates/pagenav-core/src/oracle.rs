/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use crate::anchor::{Anchor, ScreenRegion, TextAnchor, VisualAnchor};

/// Recognition and input capability over the live game window.
///
/// Queries are side-effect free. Actions are fire-and-forget: the engine never
/// inspects their outcome directly, it verifies the resulting page instead.
/// Implementations are shared across threads, so interior state must be
/// synchronized.
pub trait RecognitionOracle: Send + Sync {
    /// Exact single-line text read from a fixed region.
    fn read_title_text(&self, region: &ScreenRegion) -> String;

    fn detect_visual_anchor(&self, anchor: &VisualAnchor) -> bool;

    fn detect_text_anchor(&self, anchor: &TextAnchor) -> bool;

    fn perform_key(&self, token: &str);

    /// Locate the anchor on screen and click it.
    fn perform_click(&self, anchor: &Anchor);

    /// Blocking delay. `reason` is for diagnostics only.
    fn sleep(&self, duration: Duration, reason: &str);

    fn detect_anchor(&self, anchor: &Anchor) -> bool {
        match anchor {
            Anchor::Visual(visual) => self.detect_visual_anchor(visual),
            Anchor::Text(text) => self.detect_text_anchor(text),
        }
    }
}
