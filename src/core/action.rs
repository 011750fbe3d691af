//! Wheel action specs: `kind` or `kind:param`.
//!
//! Wheel options carry their action as a short string so configuration
//! files stay hand-editable. `ActionSpec::parse` turns that string into a
//! closed `ActionKind`, failing fast on malformed parameters.
//!
//! | spec            | kind                         |
//! |-----------------|------------------------------|
//! | `add_fixed:N`   | `AddFixed(N)`                |
//! | `steal:N`       | `Steal(N)`                   |
//! | `share_all:N`   | `ShareAll(N)`                |
//! | `multiply:N`    | `Multiply(N)`                |
//! | `divide:N`      | `Divide(N)` (N != 0)         |
//! | `swap_random`   | `SwapRandom`                 |
//! | `wildcard`      | `Wildcard`                   |
//! | anything else   | `Unknown(kind)`              |

use serde::{Deserialize, Serialize};

/// The closed vocabulary of wheel actions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Add a fixed delta to the acting team (rubber-banded at zero).
    AddFixed(i64),
    /// Take up to N points from a random team that has points.
    Steal(i64),
    /// Every team receives the delta.
    ShareAll(i64),
    /// Multiply the acting team's score, respecting the points cap.
    Multiply(i64),
    /// Divide the acting team's score, rounding up.
    Divide(i64),
    /// Swap scores with a random other team.
    SwapRandom,
    /// Judge-determined reward, currently a flat bonus.
    Wildcard,
    /// Unrecognized kind: flat mystery bonus.
    Unknown(String),
}

impl ActionKind {
    /// Does this kind require a numeric parameter?
    #[must_use]
    pub fn takes_parameter(kind: &str) -> Option<bool> {
        match kind {
            "add_fixed" | "steal" | "share_all" | "multiply" | "divide" => Some(true),
            "swap_random" | "wildcard" => Some(false),
            _ => None,
        }
    }
}

/// A parsed action spec, keeping the raw text for event records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionSpec {
    /// The spec as written in configuration (e.g. `"steal:5"`).
    pub raw: String,
    /// Parsed action.
    pub kind: ActionKind,
}

impl ActionSpec {
    /// Parse a `kind` / `kind:param` string.
    pub fn parse(raw: &str) -> Result<Self, ActionSpecError> {
        let (name, param) = match raw.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (raw, None),
        };

        let kind = match (ActionKind::takes_parameter(name), param) {
            (Some(true), Some(param)) => {
                let value: i64 = param.trim().parse().map_err(|_| {
                    ActionSpecError::InvalidParameter {
                        spec: raw.to_string(),
                        param: param.to_string(),
                    }
                })?;
                match name {
                    "add_fixed" => ActionKind::AddFixed(value),
                    "steal" => ActionKind::Steal(value),
                    "share_all" => ActionKind::ShareAll(value),
                    "multiply" => ActionKind::Multiply(value),
                    _ if value == 0 => {
                        return Err(ActionSpecError::ZeroDivisor(raw.to_string()));
                    }
                    _ => ActionKind::Divide(value),
                }
            }
            (Some(true), None) => {
                return Err(ActionSpecError::MissingParameter(raw.to_string()));
            }
            (Some(false), Some(_)) => {
                return Err(ActionSpecError::UnexpectedParameter(raw.to_string()));
            }
            (Some(false), None) if name == "swap_random" => ActionKind::SwapRandom,
            (Some(false), None) => ActionKind::Wildcard,
            (None, _) => ActionKind::Unknown(name.to_string()),
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }
}

impl std::fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A configuration-authoring error in an action spec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionSpecError {
    #[error("action '{0}' requires an integer parameter")]
    MissingParameter(String),

    #[error("action '{spec}' has a non-integer parameter '{param}'")]
    InvalidParameter { spec: String, param: String },

    #[error("action '{0}' does not take a parameter")]
    UnexpectedParameter(String),

    #[error("action '{0}' divides by zero")]
    ZeroDivisor(String),
}
