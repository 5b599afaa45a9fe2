/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use pagenav_core::PlanError;

/// Navigation failures, each carrying page names for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A page name or key outside the catalog.
    UnknownPage(String),
    /// No catalog page matches the live frame.
    PageNotRecognized,
    /// The target is unreachable along declared links.
    NoPath { from: String, to: String },
    /// A route step has no declared action. Indicates a planning or graph defect.
    MissingEdge { from: String, to: String },
    /// The page after `step` (1-based, of `hops`) did not verify.
    StepVerification {
        from: String,
        expected: String,
        step: usize,
        hops: usize,
    },
    RetriesExhausted {
        target: String,
        max_retry: u32,
        last_failure: Box<NavigationError>,
    },
}

impl NavigationError {
    /// Only verification failures are transient; everything else is surfaced
    /// on first occurrence.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StepVerification { .. })
    }
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPage(name) => write!(f, "page '{name}' is not in the catalog"),
            Self::PageNotRecognized => write!(f, "Unable to recognize the current page"),
            Self::NoPath { from, to } => write!(f, "No path found from {from} to {to}"),
            Self::MissingEdge { from, to } => {
                write!(f, "No action declared to go from {from} to {to}")
            }
            Self::StepVerification {
                from,
                expected,
                step,
                hops,
            } => write!(
                f,
                "Expected to be at {expected} after leaving {from} (step {step} of {hops}), but verification failed"
            ),
            Self::RetriesExhausted {
                target,
                max_retry,
                last_failure,
            } => write!(
                f,
                "Failed to navigate to {target} after {max_retry} retries: {last_failure}"
            ),
        }
    }
}

impl std::error::Error for NavigationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RetriesExhausted { last_failure, .. } => Some(last_failure.as_ref()),
            _ => None,
        }
    }
}

impl From<PlanError> for NavigationError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::NoPath { from, to } => Self::NoPath { from, to },
        }
    }
}
