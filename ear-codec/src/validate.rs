// Licensed under the Apache-2.0 license

use crate::error::{EarError, EarResult};

/// Field-level invariant checks, run by the caller after decoding or before
/// signing.
///
/// Implementations recurse into every nested record and stop at the first
/// violation.
pub trait Validate {
    fn validate(&self) -> EarResult<()>;
}

pub(crate) fn non_empty(value: &str, what: &str) -> EarResult<()> {
    if value.is_empty() {
        return Err(EarError::Validation(format!(
            "{what} must be a non-empty string"
        )));
    }
    Ok(())
}
