//! # salvage
//!
//! Resilient recovery of structured JSON from damaged language-model
//! output. Completions that were *supposed* to be a JSON document often
//! arrive wrapped in prose or code fences, cut short by a length limit,
//! or littered with trailing commas, curly quotes, and unterminated
//! strings. `salvage` turns one such raw blob into the best-available
//! structured value through an ordered chain of increasingly aggressive
//! repair strategies, without ever panicking at the caller and without
//! touching text that was already valid.
//!
//! ```
//! use salvage::{recover, RecoverOptions, Recovery};
//!
//! let raw = "Here is your itinerary:\n```json\n{\"title\": \"Trip\",}\n```";
//! match recover(raw, &RecoverOptions::default()) {
//!     Recovery::Full(value) => assert_eq!(value["title"], "Trip"),
//!     other => panic!("expected full recovery, got {:?}", other),
//! }
//! ```
//!
//! Truncated input needs an explicit opt-in, because the result is a
//! strict subset of what the model meant to produce:
//!
//! ```
//! use salvage::{recover, RecoverOptions, Recovery};
//!
//! let cut = r#"{"days":[{"day":1,"note":"ok"},{"day":2,"note":"unte"#;
//! let opts = RecoverOptions { allow_partial: true, ..Default::default() };
//! let got = recover(cut, &opts);
//! assert!(got.is_partial());
//! assert_eq!(got.value().unwrap()["days"].as_array().unwrap().len(), 1);
//! ```
//!
//! The engine is synchronous, allocation-local, and holds no cross-call
//! state; it is safe to call from any number of threads at once.

mod fixes;
mod normalize;
mod offset_repair;
mod recover;
mod scanner;
mod truncation;
mod types;

pub use recover::{recover, recover_with_report};
pub use types::{FailReason, RecoverOptions, Recovery, RecoveryReport, Strategy};

// The scanner is the primitive every strategy is built on; exposed for
// callers that want to probe structure without running the full chain.
pub use scanner::{
    find_matching_close, is_unterminated_string, unclosed_container_counts, ScanState,
};
