//! Dispatch protocol
//!
//! One invocation: snapshot the registry inventory, hand it to every
//! subcommand (only the completion provider keeps it), then scan the
//! registry in order. A subcommand whose verbs prefix the arguments is
//! parsed and, on success, executed. Failures from parsing, validation or
//! execution are reported here and reduced to exit codes; none of them
//! escape as a fault.
//!
//! When nothing matched, a listing of every verb path and description is
//! printed and the configured "no command" code is returned.

use crate::config::Config;
use crate::core::completion::CompletionProvider;
use crate::core::registry::Registry;
use crate::core::subcommand::{EXIT_FAILURE, EXIT_SUCCESS, ExitCode, Subcommand};
use crate::core::verbs::SubcommandDescriptor;
use crate::error::{Result, VerbError};
use std::io::{self, Write};
use tracing::{debug, instrument};

/// Result of offering the arguments to one subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub matched: bool,
    /// Present only when `matched`
    pub exit_code: Option<ExitCode>,
}

impl Attempt {
    const UNMATCHED: Self = Self {
        matched: false,
        exit_code: None,
    };

    fn matched(exit_code: ExitCode) -> Self {
        Self {
            matched: true,
            exit_code: Some(exit_code),
        }
    }
}

/// Process-level result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// One entry per registered subcommand, in registry order
    pub attempts: Vec<Attempt>,
    pub exit_code: ExitCode,
}

impl Outcome {
    /// Whether any subcommand matched
    pub fn matched(&self) -> bool {
        self.attempts.iter().any(|a| a.matched)
    }
}

/// Exit code of the last matched attempt in registry order, if any.
///
/// A validated registry admits at most one match, so "last" only matters
/// for registries built without [`Registry::new`]'s checks.
pub fn reduce(attempts: &[Attempt]) -> Option<ExitCode> {
    attempts
        .iter()
        .rev()
        .find(|a| a.matched)
        .and_then(|a| a.exit_code)
}

/// Render the "no command" listing: one line per descriptor, verbs
/// left-aligned in a `width`-column field after `indent` spaces.
pub fn render_listing(descriptors: &[SubcommandDescriptor], indent: usize, width: usize) -> String {
    descriptors
        .iter()
        .map(|d| {
            format!(
                "{:indent$}{:<width$}{}\n",
                "",
                d.verbs.joined(),
                d.description,
                indent = indent,
                width = width
            )
        })
        .collect()
}

/// Builder collecting subcommands before the registry is frozen
pub struct DispatcherBuilder {
    config: Config,
    commands: Vec<Box<dyn Subcommand>>,
}

impl DispatcherBuilder {
    /// Register a subcommand; registry order is registration order
    pub fn command<S: Subcommand + 'static>(mut self, command: S) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    /// Append the completion provider and validate the registry
    pub fn build(self) -> Result<Dispatcher> {
        self.config.validate()?;

        let mut commands = self.commands;
        commands.push(Box::new(CompletionProvider::new(
            self.config.completion_verb.clone(),
        )?));

        let registry = Registry::new(commands, self.config.listing_width)?;
        Ok(Dispatcher {
            config: self.config,
            registry,
        })
    }
}

/// Owns the registry and runs the dispatch protocol
#[derive(Debug)]
pub struct Dispatcher {
    config: Config,
    registry: Registry,
}

impl Dispatcher {
    pub fn builder(config: Config) -> DispatcherBuilder {
        DispatcherBuilder {
            config,
            commands: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatch against the process's stdout and stderr
    pub fn dispatch(&mut self, argv: &[String]) -> Result<Outcome> {
        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut out = stdout.lock();
        let mut err = stderr.lock();
        self.dispatch_with(argv, &mut out, &mut err)
    }

    /// Dispatch `argv` (program name first) writing to the given streams.
    ///
    /// Only stream write failures are returned as errors.
    #[instrument(level = "debug", skip_all, fields(argc = argv.len()))]
    pub fn dispatch_with<O: Write, E: Write>(
        &mut self,
        argv: &[String],
        out: &mut O,
        err: &mut E,
    ) -> Result<Outcome> {
        let args = argv.get(1..).unwrap_or_default();

        let descriptors = self.registry.descriptors();
        for command in self.registry.iter_mut() {
            command.set_inventory(&descriptors);
        }

        let mut attempts = Vec::with_capacity(self.registry.len());
        for command in self.registry.iter_mut() {
            if !command.matches(args) {
                attempts.push(Attempt::UNMATCHED);
                continue;
            }

            debug!("Matched `{}`", command.verbs());
            let rest = &args[command.verbs().len()..];
            let code = Self::run(command.as_mut(), rest, out, err)?;
            attempts.push(Attempt::matched(code));
        }

        let exit_code = match reduce(&attempts) {
            Some(code) => code,
            None => {
                debug!("No subcommand matched {:?}", args);
                writeln!(out, "Available commands:")?;
                out.write_all(
                    render_listing(
                        &descriptors,
                        self.config.listing_indent,
                        self.config.listing_width,
                    )
                    .as_bytes(),
                )?;
                self.config.no_command_code
            }
        };

        out.flush()?;
        Ok(Outcome {
            attempts,
            exit_code,
        })
    }

    /// Parse, then exec on success; every failure becomes a diagnostic
    fn run<O: Write, E: Write>(
        command: &mut dyn Subcommand,
        rest: &[String],
        out: &mut O,
        err: &mut E,
    ) -> Result<ExitCode> {
        let options = match command.parse(rest) {
            Ok(options) => options,
            Err(VerbError::HelpRequested { help }) => {
                write!(out, "{help}")?;
                if !help.ends_with('\n') {
                    writeln!(out)?;
                }
                return Ok(EXIT_SUCCESS);
            }
            Err(e) => {
                debug!("Rejected: {}", e);
                writeln!(err, "error: {e}")?;
                return Ok(EXIT_FAILURE);
            }
        };

        match command.exec(&options, out) {
            Ok(code) => Ok(code),
            Err(e) => {
                debug!("`{}` failed: {:#}", command.verbs(), e);
                writeln!(err, "error: {e:#}")?;
                Ok(EXIT_FAILURE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subcommand::{ParsedOptions, grammar};
    use crate::core::verbs::VerbPath;
    use clap::{Arg, Command};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every exec it receives
    struct Recorder {
        verbs: VerbPath,
        log: Rc<RefCell<Vec<String>>>,
        code: ExitCode,
    }

    impl Recorder {
        fn new(tokens: &[&str], log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                verbs: VerbPath::new(tokens.iter().copied()),
                log: Rc::clone(log),
                code: EXIT_SUCCESS,
            }
        }
    }

    impl Subcommand for Recorder {
        fn verbs(&self) -> &VerbPath {
            &self.verbs
        }

        fn description(&self) -> &str {
            "recording subcommand"
        }

        fn options(&self) -> Command {
            grammar(self.verbs(), self.description())
                .arg(Arg::new("module").short('m').long("module"))
                .arg(Arg::new("x").short('x'))
                .arg(Arg::new("y").short('y'))
        }

        fn validate(&self, options: &ParsedOptions) -> Result<()> {
            self.check_help(options)?;
            if options.flag("x") != options.flag("y") {
                return Err(self.invalid("-x and -y must be given together"));
            }
            Ok(())
        }

        fn exec(
            &mut self,
            options: &ParsedOptions,
            out: &mut dyn Write,
        ) -> anyhow::Result<ExitCode> {
            let module = options.value("module").unwrap_or("-").to_string();
            writeln!(out, "ran {} {}", self.verbs, module)?;
            self.log.borrow_mut().push(format!("{} {}", self.verbs, module));
            Ok(self.code)
        }
    }

    struct Failing(VerbPath);

    impl Subcommand for Failing {
        fn verbs(&self) -> &VerbPath {
            &self.0
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn exec(
            &mut self,
            _options: &ParsedOptions,
            _out: &mut dyn Write,
        ) -> anyhow::Result<ExitCode> {
            anyhow::bail!("disk on fire")
        }
    }

    fn argv(tokens: &[&str]) -> Vec<String> {
        std::iter::once("prog")
            .chain(tokens.iter().copied())
            .map(String::from)
            .collect()
    }

    struct Run {
        outcome: Outcome,
        out: String,
        err: String,
    }

    fn run(dispatcher: &mut Dispatcher, tokens: &[&str]) -> Run {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = dispatcher
            .dispatch_with(&argv(tokens), &mut out, &mut err)
            .unwrap();
        Run {
            outcome,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    fn naval(log: &Rc<RefCell<Vec<String>>>) -> Dispatcher {
        Dispatcher::builder(Config::default())
            .command(Recorder::new(&["init"], log))
            .command(Recorder::new(&["ship", "new"], log))
            .command(Recorder::new(&["ship", "move"], log))
            .command(Recorder::new(&["mine", "set"], log))
            .build()
            .unwrap()
    }

    #[test]
    fn test_matched_subcommand_parses_and_execs() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let run = run(&mut dispatcher, &["init", "--module", "x"]);

        assert_eq!(run.outcome.exit_code, EXIT_SUCCESS);
        assert!(run.outcome.matched());
        assert_eq!(run.out, "ran init x\n");
        assert_eq!(*log.borrow(), vec!["init x"]);
    }

    #[test]
    fn test_at_most_one_exec_per_invocation() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let run = run(&mut dispatcher, &["ship", "move", "-m", "hull"]);

        let matched: Vec<_> = run.outcome.attempts.iter().filter(|a| a.matched).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(run.outcome.attempts[2], Attempt::matched(EXIT_SUCCESS));
        assert_eq!(*log.borrow(), vec!["ship move hull"]);
    }

    #[test]
    fn test_short_args_print_listing() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let run = run(&mut dispatcher, &["ship"]);

        assert!(!run.outcome.matched());
        assert_eq!(run.outcome.exit_code, dispatcher.config().no_command_code);
        assert_ne!(run.outcome.exit_code, EXIT_SUCCESS);
        assert!(log.borrow().is_empty());

        let mut lines = run.out.lines();
        assert_eq!(lines.next(), Some("Available commands:"));
        assert_eq!(lines.count(), dispatcher.registry().len());
    }

    #[test]
    fn test_empty_args_print_listing() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let run = run(&mut dispatcher, &[]);

        assert!(!run.outcome.matched());
        assert!(run.out.contains("ship new"));
        assert!(run.out.contains("completion"));
    }

    #[test]
    fn test_listing_round_trips_through_columns() {
        let config = Config::default();
        let log = Rc::default();
        let dispatcher = naval(&log);
        let descriptors = dispatcher.registry().descriptors();

        let listing = render_listing(&descriptors, config.listing_indent, config.listing_width);

        let parsed: Vec<(String, String)> = listing
            .lines()
            .map(|line| {
                let line = &line[config.listing_indent..];
                let (verbs, description) = line.split_at(config.listing_width);
                (verbs.trim_end().to_string(), description.to_string())
            })
            .collect();
        let expected: Vec<(String, String)> = descriptors
            .iter()
            .map(|d| (d.verbs.joined(), d.description.clone()))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_validation_failure_prevents_exec() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let run = run(&mut dispatcher, &["mine", "set", "-x", "3"]);

        assert_eq!(run.outcome.exit_code, EXIT_FAILURE);
        assert!(run.outcome.matched());
        assert!(run.out.is_empty());
        assert!(run.err.starts_with("error: mine set: -x and -y must be given together"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_parse_error_is_reported_not_raised() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let run = run(&mut dispatcher, &["ship", "new", "--bogus"]);

        assert_eq!(run.outcome.exit_code, EXIT_FAILURE);
        assert!(run.err.starts_with("error: invalid options for `ship new`:"));
        assert_eq!(run.err.lines().count(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_help_short_circuits_with_success() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let run = run(&mut dispatcher, &["init", "--help"]);

        assert_eq!(run.outcome.exit_code, EXIT_SUCCESS);
        assert!(run.out.contains("recording subcommand"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_exec_error_becomes_failure_code() {
        let mut dispatcher = Dispatcher::builder(Config::default())
            .command(Failing(VerbPath::new(["burn"])))
            .build()
            .unwrap();

        let run = run(&mut dispatcher, &["burn"]);

        assert_eq!(run.outcome.exit_code, EXIT_FAILURE);
        assert_eq!(run.err, "error: disk on fire\n");
    }

    #[test]
    fn test_non_zero_exec_code_is_propagated() {
        let log = Rc::default();
        let mut recorder = Recorder::new(&["sync"], &log);
        recorder.code = 3;
        let mut dispatcher = Dispatcher::builder(Config::default())
            .command(recorder)
            .build()
            .unwrap();

        assert_eq!(run(&mut dispatcher, &["sync"]).outcome.exit_code, 3);
    }

    #[test]
    fn test_completion_sees_other_subcommands() {
        let log = Rc::default();
        let mut dispatcher = naval(&log);

        let query = run(&mut dispatcher, &["completion", "ship"]);
        assert_eq!(query.outcome.exit_code, EXIT_SUCCESS);
        assert_eq!(query.out, "ship new\nship move\n");

        let top = run(&mut dispatcher, &["completion"]);
        assert_eq!(top.out, "init\nship\nship\nmine\n");
    }

    #[test]
    fn test_builder_rejects_reserved_completion_verb() {
        let log = Rc::default();
        let result = Dispatcher::builder(Config::default())
            .command(Recorder::new(&["completion"], &log))
            .build();
        assert!(matches!(result, Err(VerbError::Registry(_))));
    }

    #[test]
    fn test_reduce_last_match_wins() {
        let attempts = [
            Attempt::matched(4),
            Attempt::UNMATCHED,
            Attempt::matched(7),
            Attempt::UNMATCHED,
        ];
        assert_eq!(reduce(&attempts), Some(7));
        assert_eq!(reduce(&[Attempt::UNMATCHED]), None);
        assert_eq!(reduce(&[]), None);
    }
}
