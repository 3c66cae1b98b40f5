//! Verification driver.
//!
//! For each entity the driver checks, in order: configured size limits,
//! the entity-specific [`FunctionLike::verify_type`] hook, the structural
//! [`FunctionLike::verify_body`] check and the argument/result attribute
//! sequences. Failures are collected into a [`VerificationReport`]; nothing is
//! ever corrected.
use crate::{
    config::VerifierConfig,
    interface::FunctionLike,
    utils::{Error, SignatureSlot},
};

/// Failures collected while verifying one or more entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    errors: Vec<Error>,
}

impl VerificationReport {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// `Err` with the first failure, if any.
    pub fn into_result(self) -> Result<(), Error> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub(crate) fn is_full(&self, config: &VerifierConfig) -> bool {
        config.max_errors != 0 && self.errors.len() >= config.max_errors
    }

    fn push(&mut self, config: &VerifierConfig, result: Result<(), Error>) {
        if let Err(err) = result {
            if !self.is_full(config) {
                self.errors.push(err);
            }
        }
    }
}

impl std::fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ok() {
            return write!(f, "verification passed");
        }
        writeln!(f, "verification failed with {} error(s):", self.errors.len())?;
        for err in &self.errors {
            writeln!(f, "  - {}", err)?;
        }
        Ok(())
    }
}

/// Verify one entity, appending its failures to `report`.
pub fn verify_function(
    function: &dyn FunctionLike,
    config: &VerifierConfig,
    report: &mut VerificationReport,
) {
    report.push(config, verify_limits(function, config));
    report.push(config, function.verify_type());
    report.push(config, function.verify_body());
    for slot in [SignatureSlot::Argument, SignatureSlot::Result] {
        report.push(config, verify_attributes(function, slot, config));
    }
}

fn verify_limits(function: &dyn FunctionLike, config: &VerifierConfig) -> Result<(), Error> {
    let function_name = || function.name().to_string();

    let count = function.num_arguments();
    if let Some(max) = config.max_arguments.filter(|&max| count > max) {
        return Err(Error::FunctionTooManyArguments {
            function: function_name(),
            count,
            max,
        });
    }

    let count = function.num_results();
    if let Some(max) = config.max_results.filter(|&max| count > max) {
        return Err(Error::FunctionTooManyResults {
            function: function_name(),
            count,
            max,
        });
    }

    let count = function.body().len();
    if let Some(max) = config.max_blocks.filter(|&max| count > max) {
        return Err(Error::FunctionTooManyBlocks {
            function: function_name(),
            count,
            max,
        });
    }
    Ok(())
}

/// Check the stored attribute sequence of `slot` against the arity and, when
/// configured, the namespacing rule for keys.
pub fn verify_attributes(
    function: &dyn FunctionLike,
    slot: SignatureSlot,
    config: &VerifierConfig,
) -> Result<(), Error> {
    let seq = function.slot_attrs(slot);
    let count = function.slot_count(slot);
    if seq.len() > count {
        return Err(Error::AttrSeqTooLong {
            function: function.name().to_string(),
            slot,
            len: seq.len(),
            count,
        });
    }

    if config.require_namespaced_attrs {
        for (index, dict) in seq.as_slice().iter().enumerate() {
            if let Some(key) = dict.keys().find(|key| !key.contains('.')) {
                return Err(Error::AttrNotNamespaced {
                    function: function.name().to_string(),
                    slot,
                    index,
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(())
}
