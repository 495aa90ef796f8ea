//! Background knowledge: forbidden and required directed edges, plus
//! temporal tiers (a variable in a later tier can never cause one in an
//! earlier tier).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knowledge {
    #[serde(default)]
    forbidden: BTreeSet<(String, String)>,
    #[serde(default)]
    required: BTreeSet<(String, String)>,
    #[serde(default)]
    tiers: Vec<Vec<String>>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn forbid(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.forbidden.insert((from.into(), to.into()));
        self
    }

    #[must_use]
    pub fn require(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.required.insert((from.into(), to.into()));
        self
    }

    /// Appends a tier. Tiers are ordered by insertion.
    #[must_use]
    pub fn tier<S: Into<String>>(mut self, names: Vec<S>) -> Self {
        self.tiers.push(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.required.is_empty() && self.tiers.is_empty()
    }

    fn tier_of(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.iter().any(|n| n == name))
    }

    /// Whether `from --> to` is ruled out, explicitly or by tier order.
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        if self.forbidden.contains(&(from.to_string(), to.to_string())) {
            return true;
        }
        matches!(
            (self.tier_of(from), self.tier_of(to)),
            (Some(tf), Some(tt)) if tf > tt
        )
    }

    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&(from.to_string(), to.to_string()))
    }

    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// FAIL FAST on contradictory knowledge.
    ///
    /// # Errors
    ///
    /// `ValidationError` if a required edge is also forbidden.
    pub fn validate(&self) -> CoreResult<()> {
        for (from, to) in &self.required {
            if self.is_forbidden(from, to) {
                return Err(CoreError::validation(
                    "knowledge",
                    format!("edge {} --> {} is both required and forbidden", from, to),
                ));
            }
        }
        Ok(())
    }
}
