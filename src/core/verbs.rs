//! Verb paths and prefix matching
//!
//! A verb path is the ordered list of literal tokens that selects a
//! subcommand (`ship new`, `mine set`). Matching is a pure prefix test
//! against the process arguments that follow the program name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered literal tokens identifying a subcommand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbPath(Vec<String>);

impl VerbPath {
    /// Create a verb path from its tokens
    ///
    /// Token validity (non-empty path, no blank tokens, no whitespace) is
    /// checked when the path is registered, not here.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// The individual tokens
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no tokens
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First token, offered by the completion provider at top level
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Tokens joined by single spaces
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }

    /// Whether `args` starts with this verb path
    pub fn matches(&self, args: &[String]) -> bool {
        verb_match(self.tokens(), args)
    }

    /// Whether this path is a (non-strict) token prefix of `other`
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        verb_match(self.tokens(), other.tokens())
    }
}

impl fmt::Display for VerbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Returns true iff `args` begins with every token of `verbs`, in order.
///
/// `args` excludes the program name. Tokens after the verb path do not take
/// part in the decision; they belong to the subcommand's option grammar.
pub fn verb_match<S: AsRef<str>>(verbs: &[S], args: &[String]) -> bool {
    if args.len() < verbs.len() {
        return false;
    }

    verbs
        .iter()
        .zip(args)
        .all(|(verb, arg)| verb.as_ref() == arg.as_str())
}

/// Verb path plus human description, computed once per subcommand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcommandDescriptor {
    pub verbs: VerbPath,
    pub description: String,
}

impl SubcommandDescriptor {
    pub fn new(verbs: VerbPath, description: impl Into<String>) -> Self {
        Self {
            verbs,
            description: description.into(),
        }
    }
}
