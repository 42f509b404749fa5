//! Shell completion provider
//!
//! A built-in subcommand bound to a reserved verb. With `--script <EXEC>` it
//! emits a Bash completion function for the executable; otherwise it treats
//! its positional arguments as the verbs typed so far and prints, one per
//! line, the registered verb paths that complete them.

use crate::core::subcommand::{EXIT_SUCCESS, ExitCode, ParsedOptions, Subcommand, grammar};
use crate::core::verbs::{SubcommandDescriptor, VerbPath};
use crate::error::{Result, VerbError};
use anyhow::Context;
use clap::{Arg, Command};
use regex::Regex;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, instrument};

const SCRIPT_TEMPLATE: &str = r#"# bash completion for @EXEC@
@FUNCTION@()
{
    local cur words candidates
    COMPREPLY=()
    cur="${COMP_WORDS[COMP_CWORD]}"
    words=("${COMP_WORDS[@]:1:COMP_CWORD-1}")
    candidates=$(@EXEC@ @VERB@ -- "${words[@]}" 2>/dev/null \
        | awk -v field="${COMP_CWORD}" 'NF >= field { print $field }')
    COMPREPLY=( $(compgen -W "${candidates}" -- "${cur}") )
    return 0
}
complete -F @FUNCTION@ @EXEC@
"#;

/// Completion provider fed with the registry inventory before dispatch
#[derive(Debug)]
pub struct CompletionProvider {
    verbs: VerbPath,
    inventory: Option<Vec<SubcommandDescriptor>>,
    /// Characters not allowed in a Bash function name
    re_unsafe_name: Regex,
}

impl CompletionProvider {
    /// Create a provider bound to the given reserved verb
    pub fn new(verb: impl Into<String>) -> Result<Self> {
        Ok(Self {
            verbs: VerbPath::new([verb.into()]),
            inventory: None,
            re_unsafe_name: compile(r"[^A-Za-z0-9_]")?,
        })
    }

    /// Verb paths completing `words`, excluding the provider's own.
    ///
    /// No words yields the first token of every other verb path; otherwise
    /// every joined verb path starting with the joined words. Without an
    /// inventory there are no candidates.
    #[instrument(level = "debug", skip(self))]
    pub fn candidates(&self, words: &[&str]) -> Result<Vec<String>> {
        let Some(inventory) = &self.inventory else {
            debug!("No inventory injected, offering no candidates");
            return Ok(Vec::new());
        };

        let others = inventory.iter().filter(|d| d.verbs != self.verbs);

        if words.is_empty() {
            return Ok(others
                .filter_map(|d| d.verbs.first().map(str::to_string))
                .collect());
        }

        // Anchored literal: "ship" also completes mid-token, e.g. "sh".
        let filter = compile(&format!("^{}", regex::escape(&words.join(" "))))?;
        Ok(others
            .map(|d| d.verbs.joined())
            .filter(|joined| filter.is_match(joined))
            .collect())
    }

    /// Bash completion script for `exec_name`
    pub fn script(&self, exec_name: &str) -> String {
        SCRIPT_TEMPLATE
            .replace("@FUNCTION@", &self.function_name(exec_name))
            .replace("@EXEC@", exec_name)
            .replace("@VERB@", &self.verbs.joined())
    }

    /// Bash function name derived from the executable's file name
    fn function_name(&self, exec_name: &str) -> String {
        let file_name = Path::new(exec_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(exec_name);
        format!("_{}_complete", self.re_unsafe_name.replace_all(file_name, "_"))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| VerbError::config(format!("Failed to compile regex: {}", e)))
}

impl Subcommand for CompletionProvider {
    fn verbs(&self) -> &VerbPath {
        &self.verbs
    }

    fn description(&self) -> &str {
        "Shell completion script and candidates"
    }

    fn options(&self) -> Command {
        grammar(self.verbs(), self.description())
            .arg(
                Arg::new("script")
                    .short('s')
                    .long("script")
                    .value_name("EXEC")
                    .help("Emit a Bash completion script for EXEC"),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .value_name("FILE")
                    .help("Write the script to FILE instead of stdout"),
            )
            .arg(
                Arg::new("words")
                    .value_name("WORDS")
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .help("Verbs typed so far"),
            )
    }

    fn validate(&self, options: &ParsedOptions) -> Result<()> {
        self.check_help(options)?;

        let script = options.flag("script");
        if options.value("script").is_some_and(|exec| exec.trim().is_empty()) {
            return Err(self.invalid("--script needs an executable name"));
        }
        if options.flag("output") && !script {
            return Err(self.invalid("--output requires --script"));
        }
        if script && !options.values("words").is_empty() {
            return Err(self.invalid("--script takes no verbs"));
        }
        Ok(())
    }

    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        if let Some(exec_name) = options.value("script") {
            let script = self.script(exec_name);
            match options.value("output") {
                Some(path) => {
                    std::fs::write(path, script)
                        .with_context(|| format!("Failed to write completion script to {path}"))?;
                    info!("Completion script written to {}", path);
                }
                None => out.write_all(script.as_bytes())?,
            }
            return Ok(EXIT_SUCCESS);
        }

        let words = options.values("words");
        for candidate in self.candidates(&words)? {
            writeln!(out, "{candidate}")?;
        }
        Ok(EXIT_SUCCESS)
    }

    fn set_inventory(&mut self, inventory: &[SubcommandDescriptor]) {
        debug!("Completion inventory holds {} verb path(s)", inventory.len());
        self.inventory = Some(inventory.to_vec());
    }
}
