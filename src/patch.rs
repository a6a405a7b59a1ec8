//! Idempotent badge patching for markdown documents
//!
//! An existing badge is located by its structural shape only:
//! `![<anything but ]>-shield-badge-<digit>](https://<anything>.svg)`, matched
//! case-insensitively across the whole document. The subject is not part of the
//! match, so a document holding badges for two subjects has both replaced.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::store::FileStore;

static BADGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)!\[[^\]]+-shield-badge-[0-9]\]\(https://.+\.svg\)")
        .expect("badge marker regex is valid")
});

/// What a patch did to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOutcome {
    /// No badge was found; the new one was prepended
    Created,
    /// Every existing badge was replaced
    Updated,
    /// Nothing was patched (configuration missing or I/O failed before the transform)
    None,
}

impl PatchOutcome {
    pub fn verb(&self) -> &'static str {
        match self {
            PatchOutcome::Created => "added",
            PatchOutcome::Updated => "updated",
            PatchOutcome::None => "left unchanged",
        }
    }
}

/// Result of patching a document in place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchResult {
    pub succeeded: bool,
    pub outcome: PatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PatchResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            outcome: PatchOutcome::None,
            error: Some(error.into()),
            text: None,
        }
    }
}

/// Replace every badge in `document` with `markdown`, or prepend it followed by a blank line.
pub fn patch(document: &str, markdown: &str) -> (String, PatchOutcome) {
    if BADGE_RE.is_match(document) {
        let text = BADGE_RE.replace_all(document, NoExpand(markdown)).into_owned();
        (text, PatchOutcome::Updated)
    } else {
        (format!("{}\n\n{}", markdown, document), PatchOutcome::Created)
    }
}

/// Read `path`, patch it with `markdown`, and write it back.
///
/// The write happens even when the patched text equals the original.
pub async fn patch_file(store: &dyn FileStore, path: &Path, markdown: &str) -> PatchResult {
    let document = match store.read_to_string(path).await {
        Ok(document) => document,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "badge patch read failed");
            return PatchResult::failed(format!("{:#}", e));
        }
    };

    let (text, outcome) = patch(&document, markdown);
    debug!(path = %path.display(), ?outcome, "badge patched in memory");

    if let Err(e) = store.write(path, &text).await {
        debug!(path = %path.display(), error = %e, "badge patch write failed");
        return PatchResult {
            succeeded: false,
            outcome,
            error: Some(format!("{:#}", e)),
            text: Some(text),
        };
    }

    PatchResult {
        succeeded: true,
        outcome,
        error: None,
        text: Some(text),
    }
}
