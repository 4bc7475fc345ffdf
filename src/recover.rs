//! Strategy orchestrator: run the repair strategies in a fixed, documented
//! order, short-circuit on the first success, and report which strategy
//! won. The public entry points never panic and never return through an
//! error; every internal fault resolves to one of the three `Recovery`
//! outcomes.

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{debug, warn};
use serde_json::Value;

use crate::fixes::apply_cosmetic_fixes;
use crate::normalize::normalize;
use crate::offset_repair::{error_offset, repair_at_offset};
use crate::truncation::{
    close_open_string, named_array_rescue, scalar_field_rescue, truncate_to_last_container,
};
use crate::types::{FailReason, RecoverOptions, Recovery, RecoveryReport, Strategy};

/// Recover the best-available structured value from one raw completion.
pub fn recover(raw: &str, opts: &RecoverOptions) -> Recovery {
    recover_with_report(raw, opts).0
}

/// Like [`recover`], also returning the diagnostics report for an
/// observability sink. The report never affects the outcome.
pub fn recover_with_report(raw: &str, opts: &RecoverOptions) -> (Recovery, RecoveryReport) {
    let mut report = RecoveryReport::default();

    if raw.trim().is_empty() {
        return (Recovery::None(FailReason::EmptyInput), report);
    }

    let text = catch_unwind(AssertUnwindSafe(|| normalize(raw))).unwrap_or_else(|_| {
        warn!("input normalization faulted internally; continuing on the raw text");
        raw.trim().to_string()
    });
    // The normalizer slices from the document opener, so anything else at
    // the front means no document was found.
    if !text.starts_with(['{', '[']) {
        return (Recovery::None(FailReason::NoDocumentFound), report);
    }

    report.attempt(Strategy::Direct);
    if let Some(v) = contained(Strategy::Direct, || serde_json::from_str::<Value>(&text).ok()) {
        report.succeed(Strategy::Direct);
        return (Recovery::Full(v), report);
    }

    report.attempt(Strategy::CosmeticFixes);
    let fixed = contained(Strategy::CosmeticFixes, || Some(apply_cosmetic_fixes(&text)))
        .unwrap_or_else(|| text.clone());
    let mut last_err = match serde_json::from_str::<Value>(&fixed) {
        Ok(v) => {
            report.succeed(Strategy::CosmeticFixes);
            return (Recovery::Full(v), report);
        }
        Err(e) => e,
    };

    report.attempt(Strategy::OffsetRepair);
    let mut cur = fixed.clone();
    for round in 0..opts.max_repair_rounds {
        let edited = contained(Strategy::OffsetRepair, || {
            let offset = error_offset(&cur, &last_err);
            repair_at_offset(&cur, offset).map(|next| (offset, next))
        });
        let (offset, next) = match edited {
            Some(pair) if pair.1 != cur => pair,
            // No textual change this round: stop rather than loop.
            _ => break,
        };
        debug!("offset repair round {} edited near byte {}", round + 1, offset);
        cur = next;
        match serde_json::from_str::<Value>(&cur) {
            Ok(v) => {
                report.succeed(Strategy::OffsetRepair);
                return (Recovery::Full(v), report);
            }
            Err(e) => last_err = e,
        }
    }

    if !opts.allow_partial {
        return (Recovery::None(FailReason::UnrecoverableSyntax), report);
    }

    // Truncation ladder, on the cosmetically fixed text: offset-repair
    // edits that did not lead to a parse are not trusted here.
    if let Some(r) = attempt_partial(&mut report, Strategy::ContainerTruncation, || {
        truncate_to_last_container(&fixed).and_then(|t| serde_json::from_str(&t).ok())
    }) {
        return (r, report);
    }
    if let Some(r) = attempt_partial(&mut report, Strategy::StringClose, || {
        close_open_string(&fixed).and_then(|t| serde_json::from_str(&t).ok())
    }) {
        return (r, report);
    }
    if let Some(r) = attempt_partial(&mut report, Strategy::NamedArrayRescue, || {
        named_array_rescue(&fixed, &opts.expected_array_names)
    }) {
        return (r, report);
    }
    if let Some(r) = attempt_partial(&mut report, Strategy::ScalarFieldRescue, || {
        scalar_field_rescue(&fixed, &opts.expected_scalar_names)
    }) {
        return (r, report);
    }

    (Recovery::None(FailReason::UnrecoverableSyntax), report)
}

/// Fault containment for one strategy: a panic inside it is logged and
/// treated as that strategy's failure, so the chain keeps going and the
/// no-throw contract holds for every stage, not only the ladder.
fn contained<T, F>(strategy: Strategy, f: F) -> Option<T>
where
    F: FnOnce() -> Option<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => v,
        Err(_) => {
            warn!("{} faulted internally; treated as failure", strategy);
            None
        }
    }
}

/// One ladder step: record the attempt, run it contained, wrap a produced
/// value as a partial recovery.
fn attempt_partial<F>(report: &mut RecoveryReport, strategy: Strategy, f: F) -> Option<Recovery>
where
    F: FnOnce() -> Option<Value>,
{
    report.attempt(strategy);
    let value = contained(strategy, f)?;
    debug!("{} produced a partial document", strategy);
    report.succeed(strategy);
    Some(Recovery::Partial { value, strategy })
}
