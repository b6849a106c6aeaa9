//! Policy warnings.
//!
//! Diagnostics never fail an operation. They are reported through the
//! collaborator's [`Executor::log_warning`] sink and the operation carries on.

use crate::dialect::Capabilities;
use crate::executor::Executor;
use crate::options::SequenceOptions;
use std::fmt;

/// A flagged option combination or a downgraded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `increment`/`step` ≠ 1 on a backend that always advances by 1
    UnsupportedIncrement { increment: i64 },
    /// An option the backend ignores entirely
    IgnoredOption { option: &'static str },
    /// `setval` below the current value was refused
    RegressionRejected {
        sequence: String,
        requested: i64,
        current: i64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedIncrement { increment } => write!(
                f,
                "The 'increment' (or 'step') option {increment} is not applied by this backend; \
                 the sequence advances by 1"
            ),
            Diagnostic::IgnoredOption { option } => {
                write!(f, "The '{option}' option is ignored by this backend")
            }
            Diagnostic::RegressionRejected {
                sequence,
                requested,
                current,
            } => write!(
                f,
                "Refusing to set sequence '{sequence}' to {requested}: it is below the current \
                 value {current} and could reissue an existing id; the value is unchanged"
            ),
        }
    }
}

/// Flags the options `capabilities` cannot honour.
pub fn check_options(options: &SequenceOptions, capabilities: &Capabilities) -> Vec<Diagnostic> {
    let mut found = Vec::new();

    if let Some(increment) = options.increment {
        if increment != 1 && !capabilities.supports_increment {
            found.push(Diagnostic::UnsupportedIncrement { increment });
        }
    }

    if !capabilities.native_sequences {
        let native_only = [
            ("minvalue", options.minvalue.is_some()),
            ("maxvalue", options.maxvalue.is_some()),
            ("cache", options.cache.is_some()),
            ("cycle", options.cycle.is_some()),
        ];
        for (option, given) in native_only {
            if given {
                found.push(Diagnostic::IgnoredOption { option });
            }
        }
    }
    if options.numeric_label.is_some() && !capabilities.supports_labels {
        found.push(Diagnostic::IgnoredOption { option: "numeric_label" });
    }
    if options.owned_by.is_some() && !capabilities.supports_owned_by {
        found.push(Diagnostic::IgnoredOption { option: "owned_by" });
    }
    if options.data_type.is_some() && !capabilities.supports_data_type {
        found.push(Diagnostic::IgnoredOption { option: "data_type" });
    }

    found
}

/// Sends every diagnostic to the collaborator's warning sink.
pub fn report(executor: &dyn Executor, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        executor.log_warning(&diagnostic.to_string());
    }
}
