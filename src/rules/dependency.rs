//! Dependency-level exclusion rules.

use regex::Regex;
use std::fmt;

use super::{compile, RuleError};
use crate::model::Dependency;

/// Decides whether a dependency edge is left out of the rendered graph.
pub trait DependencyRule {
    /// Returns true if `dependency` must not be followed.
    fn is_excluded(&self, dependency: &Dependency<'_>) -> bool;
}

impl<F> DependencyRule for F
where
    F: Fn(&Dependency<'_>) -> bool,
{
    fn is_excluded(&self, dependency: &Dependency<'_>) -> bool {
        self(dependency)
    }
}

/// Excludes every dev dependency, including the root's own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevDependencyRule;

impl DependencyRule for DevDependencyRule {
    fn is_excluded(&self, dependency: &Dependency<'_>) -> bool {
        dependency.is_dev_dependency()
    }
}

/// Excludes dependencies whose version constraint matches a regular expression.
#[derive(Debug, Clone)]
pub struct ConstraintPatternRule {
    pattern: Regex,
}

impl ConstraintPatternRule {
    /// Compiles `pattern`, failing on an invalid expression.
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }
}

impl DependencyRule for ConstraintPatternRule {
    fn is_excluded(&self, dependency: &Dependency<'_>) -> bool {
        self.pattern.is_match(dependency.version_constraint())
    }
}

/// Ordered list of dependency rules, OR-ed with early exit.
#[derive(Default)]
pub struct DependencyRuleChain {
    rules: Vec<Box<dyn DependencyRule>>,
}

impl DependencyRuleChain {
    /// Creates an empty chain, which excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain of [`ConstraintPatternRule`]s, one per pattern.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, RuleError> {
        patterns.iter().try_fold(Self::new(), |chain, pattern| {
            Ok(chain.with(ConstraintPatternRule::new(pattern.as_ref())?))
        })
    }

    /// Appends a rule and returns the chain.
    pub fn with(mut self, rule: impl DependencyRule + 'static) -> Self {
        self.push(rule);
        self
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: impl DependencyRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl DependencyRule for DependencyRuleChain {
    fn is_excluded(&self, dependency: &Dependency<'_>) -> bool {
        self.rules.iter().any(|rule| rule.is_excluded(dependency))
    }
}

impl fmt::Debug for DependencyRuleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyRuleChain")
            .field("rules", &self.rules.len())
            .finish()
    }
}
