use std::fmt;

use serde_json::Value;

/// Caller-facing knobs for one `recover` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverOptions {
    /// Opt into the truncation ladder; off, the engine only ever returns
    /// `Full` or `None`.
    pub allow_partial: bool,
    /// Array field names the named-array rescue may look for, in order.
    pub expected_array_names: Vec<String>,
    /// Top-level scalar field names the scalar-field rescue may look for.
    pub expected_scalar_names: Vec<String>,
    /// Cap on position-guided repair rounds for one input.
    pub max_repair_rounds: usize,
}

impl Default for RecoverOptions {
    fn default() -> Self {
        Self {
            allow_partial: false,
            expected_array_names: Vec::new(),
            expected_scalar_names: Vec::new(),
            max_repair_rounds: 5,
        }
    }
}

/// One self-contained repair/parse technique in the chain, in the order
/// the orchestrator runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    CosmeticFixes,
    OffsetRepair,
    ContainerTruncation,
    StringClose,
    NamedArrayRescue,
    ScalarFieldRescue,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Direct => "direct",
            Strategy::CosmeticFixes => "cosmetic_fixes",
            Strategy::OffsetRepair => "offset_repair",
            Strategy::ContainerTruncation => "container_truncation",
            Strategy::StringClose => "string_close",
            Strategy::NamedArrayRescue => "named_array_rescue",
            Strategy::ScalarFieldRescue => "scalar_field_rescue",
        };
        f.write_str(name)
    }
}

/// Why the engine came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// Raw text was empty or whitespace-only.
    EmptyInput,
    /// No opening brace/bracket anywhere in the normalized text.
    NoDocumentFound,
    /// Every strategy, including the ladder if enabled, failed.
    UnrecoverableSyntax,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailReason::EmptyInput => "empty input",
            FailReason::NoDocumentFound => "no document found",
            FailReason::UnrecoverableSyntax => "unrecoverable syntax",
        };
        f.write_str(name)
    }
}

/// Final outcome of one `recover` call.
///
/// `Full` means the value is structurally complete and was not modified
/// beyond cosmetic fixes. `Partial` is a strict subset of the intended
/// document and carries the ladder strategy that produced it. Callers only
/// ever branch on these three; the engine never raises.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    Full(Value),
    Partial { value: Value, strategy: Strategy },
    None(FailReason),
}

impl Recovery {
    /// The recovered value, full or partial.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Recovery::Full(v) => Some(v),
            Recovery::Partial { value, .. } => Some(value),
            Recovery::None(_) => None,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Recovery::Full(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Recovery::Partial { .. })
    }
}

/// Diagnostics side channel: which strategies ran and which one won.
/// Handed to an observability sink; never affects control flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveryReport {
    pub attempted: Vec<Strategy>,
    pub succeeded: Option<Strategy>,
}

impl RecoveryReport {
    pub(crate) fn attempt(&mut self, strategy: Strategy) {
        self.attempted.push(strategy);
    }

    pub(crate) fn succeed(&mut self, strategy: Strategy) {
        self.succeeded = Some(strategy);
    }
}
