//! Package-level exclusion rules.

use regex::Regex;
use std::fmt;

use super::{compile, RuleError};
use crate::model::PackageNode;

/// Decides whether a package is left out of the rendered graph.
pub trait PackageRule {
    /// Returns true if `package` must not be drawn.
    fn is_excluded(&self, package: &PackageNode) -> bool;
}

impl<F> PackageRule for F
where
    F: Fn(&PackageNode) -> bool,
{
    fn is_excluded(&self, package: &PackageNode) -> bool {
        self(package)
    }
}

/// Excludes packages whose name matches a regular expression.
#[derive(Debug, Clone)]
pub struct NamePatternRule {
    pattern: Regex,
}

impl NamePatternRule {
    /// Compiles `pattern`, failing on an invalid expression.
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }
}

impl PackageRule for NamePatternRule {
    fn is_excluded(&self, package: &PackageNode) -> bool {
        self.pattern.is_match(&package.name)
    }
}

/// Ordered list of package rules, OR-ed with early exit.
#[derive(Default)]
pub struct PackageRuleChain {
    rules: Vec<Box<dyn PackageRule>>,
}

impl PackageRuleChain {
    /// Creates an empty chain, which excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain of [`NamePatternRule`]s, one per pattern.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, RuleError> {
        patterns.iter().try_fold(Self::new(), |chain, pattern| {
            Ok(chain.with(NamePatternRule::new(pattern.as_ref())?))
        })
    }

    /// Appends a rule and returns the chain.
    pub fn with(mut self, rule: impl PackageRule + 'static) -> Self {
        self.push(rule);
        self
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: impl PackageRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl PackageRule for PackageRuleChain {
    fn is_excluded(&self, package: &PackageNode) -> bool {
        self.rules.iter().any(|rule| rule.is_excluded(package))
    }
}

impl fmt::Debug for PackageRuleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageRuleChain")
            .field("rules", &self.rules.len())
            .finish()
    }
}
