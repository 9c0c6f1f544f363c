//! In-progress navigation state.
//!
//! # State Machine
//! ```text
//! Idle ──navigate──▶ Loading(normal) ─────────────────────────────▶ Idle
//!   │                     │ redirect
//!   │                     ▼
//!   │                Loading(redirect) ──────────────────────────▶ Idle
//!   │
//!   ├──GET submit──▶ SubmittingLoader ──redirect──▶ SubmissionRedirect ─▶ Idle
//!   │                     └──────────────────────────────────────▶ Idle
//!   │
//!   └──POST submit─▶ SubmittingAction ──▶ LoadingAction ─────────▶ Idle
//!                         │ redirect           │ redirect
//!                         └────────────────────┴──▶ SubmissionRedirect ─▶ Idle
//! ```

use serde::Serialize;

use crate::navigation::location::Location;
use crate::navigation::submission::Submission;

/// Coarse phase of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionState {
    Idle,
    Loading,
    Submitting,
}

/// Why a plain load is happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    Normal,
    Redirect,
}

/// Exactly one of these is active at any time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transition {
    Idle,
    Loading {
        location: Location,
        kind: LoadKind,
    },
    SubmittingLoader {
        location: Location,
        submission: Submission,
    },
    SubmittingAction {
        location: Location,
        submission: Submission,
    },
    LoadingAction {
        location: Location,
        submission: Submission,
    },
    SubmissionRedirect {
        location: Location,
        submission: Submission,
    },
}

impl Transition {
    pub fn state(&self) -> TransitionState {
        match self {
            Transition::Idle => TransitionState::Idle,
            Transition::Loading { .. }
            | Transition::LoadingAction { .. }
            | Transition::SubmissionRedirect { .. } => TransitionState::Loading,
            Transition::SubmittingLoader { .. } | Transition::SubmittingAction { .. } => {
                TransitionState::Submitting
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Transition::Idle)
    }

    /// Destination of the transition; `None` only for `Idle`.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Transition::Idle => None,
            Transition::Loading { location, .. }
            | Transition::SubmittingLoader { location, .. }
            | Transition::SubmittingAction { location, .. }
            | Transition::LoadingAction { location, .. }
            | Transition::SubmissionRedirect { location, .. } => Some(location),
        }
    }

    pub fn submission(&self) -> Option<&Submission> {
        match self {
            Transition::Idle | Transition::Loading { .. } => None,
            Transition::SubmittingLoader { submission, .. }
            | Transition::SubmittingAction { submission, .. }
            | Transition::LoadingAction { submission, .. }
            | Transition::SubmissionRedirect { submission, .. } => Some(submission),
        }
    }

    /// Loaders run after a mutation and must all revalidate.
    pub fn is_post_submission(&self) -> bool {
        match self {
            Transition::LoadingAction { .. } | Transition::SubmissionRedirect { .. } => true,
            Transition::Idle
            | Transition::Loading { .. }
            | Transition::SubmittingLoader { .. }
            | Transition::SubmittingAction { .. } => false,
        }
    }

    /// Variant name as used in logs and serialized snapshots.
    pub fn kind(&self) -> &'static str {
        match self {
            Transition::Idle => "idle",
            Transition::Loading {
                kind: LoadKind::Normal,
                ..
            } => "normalLoad",
            Transition::Loading {
                kind: LoadKind::Redirect,
                ..
            } => "normalRedirect",
            Transition::SubmittingLoader { .. } => "loaderSubmission",
            Transition::SubmittingAction { .. } => "actionSubmission",
            Transition::LoadingAction { .. } => "actionReload",
            Transition::SubmissionRedirect { .. } => "submissionRedirect",
        }
    }

    /// Transition for a redirect issued while `self` was in flight.
    pub fn redirected(&self, location: Location) -> Transition {
        match self {
            Transition::SubmittingLoader { submission, .. }
            | Transition::SubmittingAction { submission, .. }
            | Transition::LoadingAction { submission, .. }
            | Transition::SubmissionRedirect { submission, .. } => Transition::SubmissionRedirect {
                location,
                submission: submission.clone(),
            },
            Transition::Idle | Transition::Loading { .. } => Transition::Loading {
                location,
                kind: LoadKind::Redirect,
            },
        }
    }
}
