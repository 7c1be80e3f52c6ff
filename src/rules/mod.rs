//! Exclusion rules for packages and dependency edges.
//!
//! Two independent rule families decide what is left out of a rendered
//! graph: [`PackageRule`]s look at a package, [`DependencyRule`]s look at
//! a single "requires" edge. Rules are combined into chains that exclude
//! a subject as soon as any member does. An empty chain excludes nothing.
//!
//! # Example
//!
//! ```rust
//! use graph_composer::model::PackageNode;
//! use graph_composer::rules::{NamePatternRule, PackageRule, PackageRuleChain};
//!
//! let chain = PackageRuleChain::new()
//!     .with(NamePatternRule::new("^ext-").unwrap())
//!     .with(|p: &PackageNode| p.name == "php");
//!
//! assert!(chain.is_excluded(&PackageNode::new("ext-json")));
//! assert!(chain.is_excluded(&PackageNode::new("php")));
//! assert!(!chain.is_excluded(&PackageNode::new("psr/log")));
//! ```

mod dependency;
mod package;

pub use dependency::{ConstraintPatternRule, DependencyRule, DependencyRuleChain, DevDependencyRule};
pub use package::{NamePatternRule, PackageRule, PackageRuleChain};

/// Errors raised while building exclusion rules.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A rule pattern is not a valid regular expression.
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub(crate) fn compile(pattern: &str) -> Result<regex::Regex, RuleError> {
    regex::Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
