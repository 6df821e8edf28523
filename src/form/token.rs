//! Value Normalizer
//!
//! Raw form values arrive either as symbolic names (`/On`, `/Off`, `/Choice1`)
//! or as plain strings typed by a user. Both shapes converge on one canonical
//! string here, optionally folding the boolean-like vocabulary into `Yes`/`No`.

use serde::Serialize;
use std::fmt;

/// Leading marker carried by the textual form of a symbolic name.
pub const NAME_MARKER: char = '/';

/// Canonical "checked" value.
pub const YES: &str = "Yes";
/// Canonical "unchecked" value.
pub const NO: &str = "No";

const TRUTHY: [&str; 4] = ["On", "Yes", "True", "1"];
const FALSY: [&str; 4] = ["Off", "No", "False", "0"];

/// A raw field value as found in the document.
///
/// Absence is modelled as `Option<Token>` at every use site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Token {
    /// Named constant; the text includes the leading [`NAME_MARKER`].
    SymbolicName(String),
    /// Free text.
    PlainText(String),
}

impl Token {
    /// Symbolic name from a bare name (`On` becomes `/On`).
    pub fn name(bare: &str) -> Self {
        Self::SymbolicName(format!("{NAME_MARKER}{bare}"))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::PlainText(text.into())
    }

    /// Textual form exactly as stored.
    pub fn raw(&self) -> &str {
        match self {
            Self::SymbolicName(s) | Self::PlainText(s) => s,
        }
    }

    /// Textual form with at most one leading marker removed.
    pub fn stripped(&self) -> &str {
        let raw = self.raw();
        raw.strip_prefix(NAME_MARKER).unwrap_or(raw)
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::SymbolicName(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

/// Normalize a raw token into its canonical string.
///
/// Absent stays absent. One leading marker is stripped whichever shape the
/// token has. With `interpret_boolean`, the boolean-like vocabulary (exact,
/// case-sensitive) becomes `Yes`/`No`; anything else passes through.
pub fn normalize(token: Option<&Token>, interpret_boolean: bool) -> Option<String> {
    let text = token?.stripped();
    if interpret_boolean {
        Some(interpret(text).to_string())
    } else {
        Some(text.to_string())
    }
}

/// Fold a marker-free value into `Yes`/`No` when it is boolean-like.
pub fn interpret(text: &str) -> &str {
    if TRUTHY.contains(&text) {
        YES
    } else if FALSY.contains(&text) {
        NO
    } else {
        text
    }
}

/// Checkbox verdict for a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Checked,
    Unchecked,
    /// Not part of the boolean vocabulary (e.g. a named export value).
    Other,
}

impl CheckState {
    pub fn of(token: Option<&Token>) -> Option<Self> {
        let text = token?.stripped();
        Some(match interpret(text) {
            YES => Self::Checked,
            NO => Self::Unchecked,
            _ => Self::Other,
        })
    }

    pub fn mark(&self) -> &'static str {
        match self {
            Self::Checked => "✓",
            Self::Unchecked => "✗",
            Self::Other => "?",
        }
    }
}
