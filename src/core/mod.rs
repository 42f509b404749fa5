//! Core dispatch functionality
//!
//! Contains verb matching, the subcommand capability, the registry, the
//! completion provider and the dispatcher that ties them together.

pub mod completion;
pub mod dispatcher;
pub mod registry;
pub mod subcommand;
pub mod verbs;

pub use completion::CompletionProvider;
pub use dispatcher::{Attempt, Dispatcher, DispatcherBuilder, Outcome};
pub use registry::Registry;
pub use subcommand::{
    EXIT_FAILURE, EXIT_SUCCESS, ExitCode, ParsedOptions, Subcommand, grammar,
};
pub use verbs::{SubcommandDescriptor, VerbPath, verb_match};
