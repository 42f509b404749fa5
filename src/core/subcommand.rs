//! The subcommand capability
//!
//! Every registered handler implements [`Subcommand`]: it names its verb
//! path, describes its option grammar as a `clap::Command`, checks the
//! parsed options in [`Subcommand::validate`] and does its work in
//! [`Subcommand::exec`]. The dispatcher only ever calls `parse` after the
//! verb path matched and `exec` after `parse` succeeded.

use crate::{
    core::verbs::{SubcommandDescriptor, VerbPath},
    error::{Result, VerbError},
};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use tracing::debug;

/// Process exit code produced by a subcommand or the dispatcher
pub type ExitCode = i32;

/// Everything matched, parsed, validated and executed
pub const EXIT_SUCCESS: ExitCode = 0;

/// A parse, validation or execution failure
pub const EXIT_FAILURE: ExitCode = 1;

/// Options produced by the grammar for one dispatch invocation
#[derive(Debug, Clone)]
pub struct ParsedOptions {
    matches: ArgMatches,
}

impl ParsedOptions {
    pub fn new(matches: ArgMatches) -> Self {
        Self { matches }
    }

    /// Number of times `name` was supplied on the command line.
    ///
    /// Defaults do not count, so an option with a default value that the
    /// user left out reports zero.
    pub fn count(&self, name: &str) -> usize {
        if !self.matches.ids().any(|id| id.as_str() == name) {
            return 0;
        }

        if self.matches.value_source(name) != Some(ValueSource::CommandLine) {
            return 0;
        }

        if let Ok(Some(counted)) = self.matches.try_get_one::<u8>(name) {
            return usize::from(*counted);
        }

        self.matches
            .try_get_raw_occurrences(name)
            .ok()
            .flatten()
            .map_or(1, |occurrences| occurrences.count().max(1))
    }

    /// Whether `name` was supplied at least once
    pub fn flag(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    /// Single string value, including defaults
    pub fn value(&self, name: &str) -> Option<&str> {
        self.matches
            .try_get_one::<String>(name)
            .ok()
            .flatten()
            .map(String::as_str)
    }

    /// Every string value, in command-line order
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.matches
            .try_get_many::<String>(name)
            .ok()
            .flatten()
            .map(|values| values.map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The underlying matches, for typed access
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }
}

/// Base grammar shared by every subcommand: named after the verb path,
/// with clap's own help and version handling replaced by a plain `--help`
/// flag that [`Subcommand::validate`] turns into a help short-circuit.
pub fn grammar(verbs: &VerbPath, description: &str) -> Command {
    Command::new(verbs.joined())
        .about(description.to_string())
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::SetTrue)
                .help("Print help"),
        )
}

/// A registered handler bound to one verb path
pub trait Subcommand {
    /// The fixed prefix identifying this subcommand
    fn verbs(&self) -> &VerbPath;

    /// One-line human description
    fn description(&self) -> &str;

    /// Option grammar applied to the arguments after the verbs
    fn options(&self) -> Command {
        grammar(self.verbs(), self.description())
    }

    /// Subcommand-specific semantic checks (required combinations, mutual
    /// exclusivity). The default only handles `--help`.
    fn validate(&self, options: &ParsedOptions) -> Result<()> {
        self.check_help(options)
    }

    /// The subcommand's behavior
    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode>;

    /// Receive the registry inventory before dispatch; only the completion
    /// provider cares.
    fn set_inventory(&mut self, _inventory: &[SubcommandDescriptor]) {}

    /// Whether the arguments (program name excluded) start with this verb path
    fn matches(&self, args: &[String]) -> bool {
        self.verbs().matches(args)
    }

    /// Run the grammar over the arguments that follow the verbs, then validate
    fn parse(&self, args_after_verbs: &[String]) -> Result<ParsedOptions> {
        debug!(
            "Parsing {} option token(s) for `{}`",
            args_after_verbs.len(),
            self.verbs()
        );

        let matches = self
            .options()
            .try_get_matches_from(args_after_verbs)
            .map_err(|source| VerbError::parse(self.verbs().joined(), source))?;

        let options = ParsedOptions::new(matches);
        self.validate(&options)?;
        Ok(options)
    }

    /// Rendered help text of the option grammar
    fn help(&self) -> String {
        self.options().render_help().to_string()
    }

    /// Help short-circuit used by `validate` implementations
    fn check_help(&self, options: &ParsedOptions) -> Result<()> {
        if options.flag("help") {
            return Err(VerbError::help(self.help()));
        }
        Ok(())
    }

    /// Validation error tagged with this subcommand's verbs
    fn invalid(&self, message: impl Into<String>) -> VerbError
    where
        Self: Sized,
    {
        VerbError::validation(self.verbs().joined(), message)
    }

    /// Verb path and description snapshot
    fn descriptor(&self) -> SubcommandDescriptor {
        SubcommandDescriptor::new(self.verbs().clone(), self.description())
    }
}
