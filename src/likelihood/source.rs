//! Parameter sources: how the surrounding sampler hands parameter values to `logp`.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Supplies parameter values by name.
pub trait ParameterSource {
    fn param(&self, name: &str) -> Option<f64>;
}

impl<S: BuildHasher> ParameterSource for HashMap<String, f64, S> {
    fn param(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl ParameterSource for BTreeMap<String, f64> {
    fn param(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl ParameterSource for [(&str, f64)] {
    fn param(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
    }
}

/// Adapts a closure into a [`ParameterSource`].
pub struct FnSource<F>(pub F);

impl<F> ParameterSource for FnSource<F>
where
    F: Fn(&str) -> Option<f64>,
{
    fn param(&self, name: &str) -> Option<f64> {
        (self.0)(name)
    }
}
