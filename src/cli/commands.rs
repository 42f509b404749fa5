//! Subcommands of the `naval` demonstration tool

use crate::{
    config::Config,
    core::{Dispatcher, EXIT_SUCCESS, ExitCode, ParsedOptions, Subcommand, VerbPath, grammar},
    error::Result,
};
use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use std::io::Write;
use tracing::{debug, instrument};

/// Build the dispatcher with every `naval` subcommand registered
pub fn naval_dispatcher(config: Config) -> Result<Dispatcher> {
    Dispatcher::builder(config)
        .command(Init::new())
        .command(DevAdd::new())
        .command(ShipNew::new())
        .command(ShipMove::new())
        .command(ShipShoot::new())
        .command(MineSet::new())
        .build()
}

fn module_arg() -> Arg {
    Arg::new("module")
        .short('m')
        .long("module")
        .value_name("NAME")
        .help("Module name")
}

fn parse_coordinate(command: &impl Subcommand, name: &str, raw: Option<&str>) -> Result<()> {
    match raw {
        None => Err(command.invalid(format!("missing <{}>", name.to_uppercase()))),
        Some(raw) if raw.parse::<f64>().is_err() => Err(command.invalid(format!(
            "<{}> must be a number, got '{}'",
            name.to_uppercase(),
            raw
        ))),
        Some(_) => Ok(()),
    }
}

fn coordinate(options: &ParsedOptions, name: &str) -> anyhow::Result<f64> {
    let raw = options
        .value(name)
        .with_context(|| format!("missing <{}>", name.to_uppercase()))?;
    raw.parse()
        .with_context(|| format!("<{}> is not a number: '{}'", name.to_uppercase(), raw))
}

/// `init`: initialise a repository module
pub struct Init {
    verbs: VerbPath,
}

impl Init {
    pub fn new() -> Self {
        Self {
            verbs: VerbPath::new(["init"]),
        }
    }
}

impl Default for Init {
    fn default() -> Self {
        Self::new()
    }
}

impl Subcommand for Init {
    fn verbs(&self) -> &VerbPath {
        &self.verbs
    }

    fn description(&self) -> &str {
        "Initialise repository"
    }

    fn options(&self) -> Command {
        grammar(self.verbs(), self.description()).arg(module_arg().default_value("my_module"))
    }

    #[instrument(skip_all)]
    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let module = options.value("module").unwrap_or("my_module");
        debug!("Initialising module {}", module);
        writeln!(out, "command : {}", self.verbs)?;
        writeln!(out, "module : {module}")?;
        Ok(EXIT_SUCCESS)
    }
}

/// `dev add`: add a development module
pub struct DevAdd {
    verbs: VerbPath,
}

impl DevAdd {
    pub fn new() -> Self {
        Self {
            verbs: VerbPath::new(["dev", "add"]),
        }
    }
}

impl Default for DevAdd {
    fn default() -> Self {
        Self::new()
    }
}

impl Subcommand for DevAdd {
    fn verbs(&self) -> &VerbPath {
        &self.verbs
    }

    fn description(&self) -> &str {
        "Add a development module"
    }

    fn options(&self) -> Command {
        grammar(self.verbs(), self.description()).arg(module_arg())
    }

    fn validate(&self, options: &ParsedOptions) -> Result<()> {
        self.check_help(options)?;
        if !options.flag("module") {
            return Err(self.invalid("--module is required"));
        }
        Ok(())
    }

    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let module = options.value("module").context("missing --module")?;
        writeln!(out, "Added development module {module}")?;
        Ok(EXIT_SUCCESS)
    }
}

/// `ship new <NAME>...`
pub struct ShipNew {
    verbs: VerbPath,
}

impl ShipNew {
    pub fn new() -> Self {
        Self {
            verbs: VerbPath::new(["ship", "new"]),
        }
    }
}

impl Default for ShipNew {
    fn default() -> Self {
        Self::new()
    }
}

impl Subcommand for ShipNew {
    fn verbs(&self) -> &VerbPath {
        &self.verbs
    }

    fn description(&self) -> &str {
        "Create one or more ships"
    }

    fn options(&self) -> Command {
        grammar(self.verbs(), self.description()).arg(
            Arg::new("names")
                .value_name("NAME")
                .num_args(0..)
                .help("Names of the ships to create"),
        )
    }

    fn validate(&self, options: &ParsedOptions) -> Result<()> {
        self.check_help(options)?;
        if options.values("names").is_empty() {
            return Err(self.invalid("at least one <NAME> is required"));
        }
        Ok(())
    }

    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        for name in options.values("names") {
            writeln!(out, "Created ship {name}")?;
        }
        Ok(EXIT_SUCCESS)
    }
}

/// `ship move <NAME> <X> <Y> [--speed <KN>]`
pub struct ShipMove {
    verbs: VerbPath,
}

impl ShipMove {
    pub fn new() -> Self {
        Self {
            verbs: VerbPath::new(["ship", "move"]),
        }
    }
}

impl Default for ShipMove {
    fn default() -> Self {
        Self::new()
    }
}

impl Subcommand for ShipMove {
    fn verbs(&self) -> &VerbPath {
        &self.verbs
    }

    fn description(&self) -> &str {
        "Move a ship to a position"
    }

    fn options(&self) -> Command {
        grammar(self.verbs(), self.description())
            .arg(Arg::new("name").value_name("NAME").help("Ship name"))
            .arg(Arg::new("x").value_name("X").allow_negative_numbers(true))
            .arg(Arg::new("y").value_name("Y").allow_negative_numbers(true))
            .arg(
                Arg::new("speed")
                    .long("speed")
                    .value_name("KN")
                    .default_value("10")
                    .help("Speed in knots"),
            )
    }

    fn validate(&self, options: &ParsedOptions) -> Result<()> {
        self.check_help(options)?;
        if options.value("name").is_none() {
            return Err(self.invalid("missing <NAME>"));
        }
        parse_coordinate(self, "x", options.value("x"))?;
        parse_coordinate(self, "y", options.value("y"))?;
        if options
            .value("speed")
            .is_some_and(|speed| speed.parse::<u32>().is_err())
        {
            return Err(self.invalid("--speed must be a whole number of knots"));
        }
        Ok(())
    }

    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let name = options.value("name").context("missing <NAME>")?;
        let x = coordinate(options, "x")?;
        let y = coordinate(options, "y")?;
        let speed = options.value("speed").unwrap_or("10");
        writeln!(out, "Moving ship {name} to ({x}, {y}) at {speed} knots")?;
        Ok(EXIT_SUCCESS)
    }
}

/// `ship shoot -x <X> -y <Y>`
pub struct ShipShoot {
    verbs: VerbPath,
}

impl ShipShoot {
    pub fn new() -> Self {
        Self {
            verbs: VerbPath::new(["ship", "shoot"]),
        }
    }
}

impl Default for ShipShoot {
    fn default() -> Self {
        Self::new()
    }
}

impl Subcommand for ShipShoot {
    fn verbs(&self) -> &VerbPath {
        &self.verbs
    }

    fn description(&self) -> &str {
        "Fire at a position"
    }

    fn options(&self) -> Command {
        grammar(self.verbs(), self.description())
            .arg(
                Arg::new("x")
                    .short('x')
                    .value_name("X")
                    .allow_negative_numbers(true),
            )
            .arg(
                Arg::new("y")
                    .short('y')
                    .value_name("Y")
                    .allow_negative_numbers(true),
            )
    }

    fn validate(&self, options: &ParsedOptions) -> Result<()> {
        self.check_help(options)?;
        if !(options.flag("x") && options.flag("y")) {
            return Err(self.invalid("both -x and -y are required"));
        }
        parse_coordinate(self, "x", options.value("x"))?;
        parse_coordinate(self, "y", options.value("y"))
    }

    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let x = coordinate(options, "x")?;
        let y = coordinate(options, "y")?;
        writeln!(out, "Shooting at ({x}, {y})")?;
        Ok(EXIT_SUCCESS)
    }
}

/// `mine set <X> <Y> [--moored | --drifting]`
pub struct MineSet {
    verbs: VerbPath,
}

impl MineSet {
    pub fn new() -> Self {
        Self {
            verbs: VerbPath::new(["mine", "set"]),
        }
    }
}

impl Default for MineSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Subcommand for MineSet {
    fn verbs(&self) -> &VerbPath {
        &self.verbs
    }

    fn description(&self) -> &str {
        "Set a mine at a position"
    }

    fn options(&self) -> Command {
        grammar(self.verbs(), self.description())
            .arg(Arg::new("x").value_name("X").allow_negative_numbers(true))
            .arg(Arg::new("y").value_name("Y").allow_negative_numbers(true))
            .arg(
                Arg::new("moored")
                    .long("moored")
                    .action(ArgAction::SetTrue)
                    .help("Moored (anchored) mine"),
            )
            .arg(
                Arg::new("drifting")
                    .long("drifting")
                    .action(ArgAction::SetTrue)
                    .help("Drifting mine"),
            )
    }

    fn validate(&self, options: &ParsedOptions) -> Result<()> {
        self.check_help(options)?;
        if options.flag("moored") && options.flag("drifting") {
            return Err(self.invalid("--moored and --drifting are mutually exclusive"));
        }
        parse_coordinate(self, "x", options.value("x"))?;
        parse_coordinate(self, "y", options.value("y"))
    }

    fn exec(&mut self, options: &ParsedOptions, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let x = coordinate(options, "x")?;
        let y = coordinate(options, "y")?;
        let kind = if options.flag("drifting") {
            "drifting"
        } else {
            "moored"
        };
        writeln!(out, "Setting {kind} mine at ({x}, {y})")?;
        Ok(EXIT_SUCCESS)
    }
}
