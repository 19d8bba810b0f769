//! Input binding resolution.
//!
//! Checks caller-supplied values against a descriptor's declared inputs and
//! fills in defaults. Placeholders are never substituted here; the engine
//! does that with the resolved values.

use crate::types::{InputValues, TemplateDescriptor};
use promptctl_core::{AppError, AppResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// A value set that is safe to dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedInputs(BTreeMap<String, String>);

impl ResolvedInputs {
    /// Wrap values that cannot be checked locally.
    ///
    /// Used for managed runs, where only the engine knows the registered
    /// template's inputs and validates them itself.
    pub fn unchecked(values: InputValues) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Resolve `values` against the inputs declared by `descriptor`.
///
/// Every declared key ends up in the result with the supplied value, else its
/// default; optional inputs with neither are left out.
///
/// # Errors
/// - `AppError::MissingInput` for the first required input (declaration
///   order) that has no value
/// - `AppError::UnknownInput` for a value whose key is not declared
pub fn resolve(descriptor: &TemplateDescriptor, values: &InputValues) -> AppResult<ResolvedInputs> {
    if let Some(missing) = descriptor
        .inputs()
        .iter()
        .find(|spec| spec.is_required() && !values.contains_key(&spec.key))
    {
        return Err(AppError::MissingInput(missing.key.clone()));
    }

    if let Some(unknown) = values.keys().find(|key| descriptor.input(key).is_none()) {
        return Err(AppError::UnknownInput(unknown.clone()));
    }

    let resolved: BTreeMap<String, String> = descriptor
        .inputs()
        .iter()
        .filter_map(|spec| {
            values
                .get(&spec.key)
                .or(spec.default_value.as_ref())
                .map(|value| (spec.key.clone(), value.clone()))
        })
        .collect();

    tracing::debug!(
        "Resolved {} of {} declared inputs",
        resolved.len(),
        descriptor.inputs().len()
    );

    Ok(ResolvedInputs(resolved))
}
