/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Page nodes.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::anchor::{Anchor, ScreenRegion};
use crate::oracle::RecognitionOracle;

/// How a page recognizes itself on the live frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// Current when any anchor is detected.
    Anchored { check_anchors: Vec<Anchor> },
    /// Current when the title region reads exactly `title`.
    Titled { title: String },
}

/// A recognizable game screen.
///
/// Identity is the name alone: two pages with the same name compare and hash
/// equal regardless of how they detect themselves.
#[derive(Debug, Clone)]
pub struct Page {
    name: String,
    kind: PageKind,
}

impl Page {
    pub fn anchored(name: impl Into<String>, check_anchors: Vec<Anchor>) -> Self {
        Self {
            name: name.into(),
            kind: PageKind::Anchored { check_anchors },
        }
    }

    pub fn titled(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PageKind::Titled {
                title: title.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PageKind {
        &self.kind
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            PageKind::Titled { title } => Some(title),
            PageKind::Anchored { .. } => None,
        }
    }

    pub fn check_anchors(&self) -> &[Anchor] {
        match &self.kind {
            PageKind::Anchored { check_anchors } => check_anchors,
            PageKind::Titled { .. } => &[],
        }
    }

    pub fn is_titled(&self) -> bool {
        matches!(self.kind, PageKind::Titled { .. })
    }

    /// Returns false for titled pages, which carry no anchors.
    pub(crate) fn push_anchor(&mut self, anchor: Anchor) -> bool {
        match &mut self.kind {
            PageKind::Anchored { check_anchors } => {
                check_anchors.push(anchor);
                true
            }
            PageKind::Titled { .. } => false,
        }
    }

    /// Detection predicate against the live frame.
    pub fn is_current(&self, oracle: &dyn RecognitionOracle, title_region: &ScreenRegion) -> bool {
        match &self.kind {
            PageKind::Anchored { check_anchors } => check_anchors
                .iter()
                .any(|anchor| oracle.detect_anchor(anchor)),
            PageKind::Titled { title } => oracle.read_title_text(title_region) == *title,
        }
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Page {}

impl Hash for Page {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::anchor::{TextAnchor, VisualAnchor};

    #[derive(Default)]
    struct FrameStub {
        visible_icons: Vec<String>,
        title: String,
        title_reads: Mutex<usize>,
    }

    impl RecognitionOracle for FrameStub {
        fn read_title_text(&self, _region: &ScreenRegion) -> String {
            *self.title_reads.lock().unwrap() += 1;
            self.title.clone()
        }
        fn detect_visual_anchor(&self, anchor: &VisualAnchor) -> bool {
            self.visible_icons.contains(&anchor.name)
        }
        fn detect_text_anchor(&self, _anchor: &TextAnchor) -> bool {
            false
        }
        fn perform_key(&self, _token: &str) {}
        fn perform_click(&self, _anchor: &Anchor) {}
        fn sleep(&self, _duration: Duration, _reason: &str) {}
    }

    const REGION: ScreenRegion = ScreenRegion::new(0, 0, 100, 20);

    #[test]
    fn equality_and_hash_use_name_only() {
        let a = Page::anchored("bag", vec![VisualAnchor::new("bag_icon").into()]);
        let b = Page::titled("bag", "Bag");
        assert_eq!(a, b);

        let set: HashSet<Page> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn anchored_page_matches_when_any_anchor_is_present() {
        let page = Page::anchored(
            "map",
            vec![
                VisualAnchor::new("compass").into(),
                VisualAnchor::new("map_pin").into(),
            ],
        );
        let frame = FrameStub {
            visible_icons: vec!["map_pin".to_string()],
            ..FrameStub::default()
        };
        assert!(page.is_current(&frame, &REGION));
    }

    #[test]
    fn anchored_page_without_anchors_never_matches() {
        let page = Page::anchored("empty", Vec::new());
        assert!(!page.is_current(&FrameStub::default(), &REGION));
    }

    #[test]
    fn titled_page_requires_exact_title() {
        let page = Page::titled("handbook", "Handbook");
        let frame = FrameStub {
            title: "Handbook ".to_string(),
            ..FrameStub::default()
        };
        assert!(!page.is_current(&frame, &REGION));
        assert_eq!(*frame.title_reads.lock().unwrap(), 1);
    }

    #[test]
    fn titled_page_rejects_extra_anchors() {
        let mut page = Page::titled("handbook", "Handbook");
        assert!(!page.push_anchor(TextAnchor::new("x").into()));
        assert!(page.check_anchors().is_empty());
    }
}
