//! Subcommand registry
//!
//! The ordered, fixed set of subcommands composed at startup. Construction
//! rejects registries that could make dispatch ambiguous.

use crate::core::subcommand::Subcommand;
use crate::core::verbs::SubcommandDescriptor;
use crate::error::{RegistryError, Result};
use std::fmt;
use tracing::{debug, instrument};

/// Ordered collection of subcommands
pub struct Registry {
    commands: Vec<Box<dyn Subcommand>>,
}

impl Registry {
    /// Validate and freeze a list of subcommands.
    ///
    /// `listing_width` is the verb column of the "no command" listing; every
    /// joined verb path must be strictly narrower so the columns stay apart.
    #[instrument(level = "debug", skip_all, fields(count = commands.len()))]
    pub fn new(commands: Vec<Box<dyn Subcommand>>, listing_width: usize) -> Result<Self> {
        for command in &commands {
            Self::check_verbs(command.as_ref(), listing_width)?;
        }

        for (i, a) in commands.iter().enumerate() {
            for b in &commands[i + 1..] {
                Self::check_pair(a.as_ref(), b.as_ref())?;
            }
        }

        debug!("Registry accepted {} subcommand(s)", commands.len());
        Ok(Self { commands })
    }

    fn check_verbs(command: &dyn Subcommand, listing_width: usize) -> Result<()> {
        let verbs = command.verbs();

        if verbs.is_empty() {
            return Err(RegistryError::EmptyVerbPath {
                description: command.description().to_string(),
            }
            .into());
        }

        if verbs
            .tokens()
            .iter()
            .any(|token| token.is_empty() || token.chars().any(char::is_whitespace))
        {
            return Err(RegistryError::InvalidToken {
                verbs: verbs.joined(),
            }
            .into());
        }

        if verbs.joined().chars().count() >= listing_width {
            return Err(RegistryError::TooWide {
                verbs: verbs.joined(),
                width: listing_width,
            }
            .into());
        }

        Ok(())
    }

    fn check_pair(a: &dyn Subcommand, b: &dyn Subcommand) -> Result<()> {
        let (a, b) = (a.verbs(), b.verbs());

        if a == b {
            return Err(RegistryError::Duplicate { verbs: a.joined() }.into());
        }

        let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        if shorter.is_prefix_of(longer) {
            return Err(RegistryError::PrefixCollision {
                shorter: shorter.joined(),
                longer: longer.joined(),
            }
            .into());
        }

        Ok(())
    }

    /// Verb path and description of every subcommand, in registry order
    pub fn descriptors(&self) -> Vec<SubcommandDescriptor> {
        self.commands.iter().map(|c| c.descriptor()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Subcommand> {
        self.commands.iter().map(|c| c.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Subcommand>> {
        self.commands.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|c| c.verbs().joined()))
            .finish()
    }
}
