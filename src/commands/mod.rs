//! The command tree.
//!
//! Every node of the CLI is a [`CliCommand`]. A node declares its own flags and children onto a
//! [`clap::Command`], builds a validated instance of itself from [`ParsedArguments`], and runs.
//! The tree is fixed:
//!
//! ```text
//! dns-block-blackhole [--interactive]
//! ├── server
//! └── certbot-route53
//!     ├── acquire-cert
//!     └── renew-cert
//! ```
//!
//! Group nodes (the root and `certbot-route53`) keep the default [`CliCommand::run`], which
//! reports [`Error::NotRunnable`] so the dispatcher can print their help instead.

use crate::backends::Backends;
use crate::error::Error;
use clap::ArgMatches;
use std::ffi::OsString;

pub mod certbot;
pub mod root;
pub mod server;

pub use certbot::{AcquireCertCommand, CertRequest, CertbotRoute53Command, RenewCertCommand};
pub use root::RootCommand;
pub use server::ServerCommand;

/// Literal token separating operator arguments from pass-through arguments.
pub const SEPARATOR: &str = "--";

/// Capabilities shared by every node of the command tree.
pub trait CliCommand: Sized {
    /// Name of the subcommand (the binary name for the root).
    const NAME: &'static str;

    /// Declare flags, positionals, help text and child subcommands on `cmd`.
    fn configure(cmd: clap::Command) -> clap::Command;

    /// Build a fully validated instance from parsed input.
    ///
    /// # Errors
    ///
    /// Returns an informative [`Error`] naming the offending field when any input is invalid.
    fn construct(parsed: &ParsedArguments) -> Result<Self, Error>;

    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunnable`] for group commands, which is the default.
    fn run(&self, _ctx: &RunContext) -> Result<(), Error> {
        Err(Error::NotRunnable)
    }
}

/// Identifies which node of the tree was selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Root,
    Server,
    CertbotRoute53,
    AcquireCert,
    RenewCert,
}

const DISPATCH: &[(&[&str], CommandKind)] = &[
    (&[], CommandKind::Root),
    (&[ServerCommand::NAME], CommandKind::Server),
    (&[CertbotRoute53Command::NAME], CommandKind::CertbotRoute53),
    (
        &[CertbotRoute53Command::NAME, AcquireCertCommand::NAME],
        CommandKind::AcquireCert,
    ),
    (
        &[CertbotRoute53Command::NAME, RenewCertCommand::NAME],
        CommandKind::RenewCert,
    ),
];

impl CommandKind {
    fn from_path(path: &[&str]) -> Option<Self> {
        DISPATCH
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, kind)| *kind)
    }

    /// Subcommand names leading from the root to this node.
    #[must_use]
    pub fn path(self) -> &'static [&'static str] {
        DISPATCH
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or(&[], |(p, _)| p)
    }

    /// Whether the node forwards arguments after `--` to an external tool.
    #[must_use]
    pub fn accepts_passthrough(self) -> bool {
        matches!(self, CommandKind::AcquireCert | CommandKind::RenewCert)
    }

    /// Whether running the node needs the external certificate tooling.
    #[must_use]
    pub fn needs_backends(self) -> bool {
        matches!(self, CommandKind::AcquireCert | CommandKind::RenewCert)
    }

    /// Construct the concrete command for this node.
    ///
    /// # Errors
    ///
    /// Returns the variant's validation error.
    pub fn construct(self, parsed: &ParsedArguments) -> Result<Command, Error> {
        Ok(match self {
            CommandKind::Root => Command::Root(RootCommand::construct(parsed)?),
            CommandKind::Server => Command::Server(ServerCommand::construct(parsed)?),
            CommandKind::CertbotRoute53 => {
                Command::CertbotRoute53(CertbotRoute53Command::construct(parsed)?)
            }
            CommandKind::AcquireCert => {
                Command::AcquireCert(AcquireCertCommand::construct(parsed)?)
            }
            CommandKind::RenewCert => Command::RenewCert(RenewCertCommand::construct(parsed)?),
        })
    }
}

/// A constructed, validated command.
#[derive(Debug)]
pub enum Command {
    Root(RootCommand),
    Server(ServerCommand),
    CertbotRoute53(CertbotRoute53Command),
    AcquireCert(AcquireCertCommand),
    RenewCert(RenewCertCommand),
}

impl Command {
    /// Run the wrapped command.
    ///
    /// # Errors
    ///
    /// See [`CliCommand::run`].
    pub fn run(&self, ctx: &RunContext) -> Result<(), Error> {
        match self {
            Command::Root(cmd) => cmd.run(ctx),
            Command::Server(cmd) => cmd.run(ctx),
            Command::CertbotRoute53(cmd) => cmd.run(ctx),
            Command::AcquireCert(cmd) => cmd.run(ctx),
            Command::RenewCert(cmd) => cmd.run(ctx),
        }
    }

    /// Whether the command asked for debug output.
    #[must_use]
    pub fn debug(&self) -> bool {
        matches!(self, Command::Server(cmd) if cmd.debug)
    }
}

/// Build the complete command-line surface.
#[must_use]
pub fn surface() -> clap::Command {
    RootCommand::configure(clap::Command::new(RootCommand::NAME))
}

/// Raw input for command construction: clap's matches plus the pass-through tail.
#[derive(Debug, Clone)]
pub struct ParsedArguments {
    /// Selected node of the tree.
    pub kind: CommandKind,
    /// Matches for the root command.
    pub root: ArgMatches,
    /// Matches for the selected node (the same as `root` when no subcommand is given).
    pub leaf: ArgMatches,
    /// Tokens after the first literal `--`.
    pub passthrough: Vec<String>,
}

impl ParsedArguments {
    /// Split `argv` at the first `--`, then parse the head against [`surface`].
    ///
    /// # Errors
    ///
    /// Returns clap's error for usage problems, `--help` and `--version`.
    pub fn parse<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut head: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let passthrough = match head.iter().position(|a| a == SEPARATOR) {
            Some(idx) => head
                .split_off(idx)
                .into_iter()
                .skip(1)
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            None => Vec::new(),
        };

        let root = surface().try_get_matches_from(head)?;
        let mut path = Vec::new();
        let mut leaf = &root;
        while let Some((name, sub)) = leaf.subcommand() {
            path.push(name);
            leaf = sub;
        }
        let kind = CommandKind::from_path(&path).ok_or_else(|| {
            surface().error(
                clap::error::ErrorKind::InvalidSubcommand,
                format!("unknown command path: {}", path.join(" ")),
            )
        })?;
        let leaf = leaf.clone();

        Ok(Self {
            kind,
            root,
            leaf,
            passthrough,
        })
    }
}

/// Explicit context handed to [`CliCommand::run`].
pub struct RunContext {
    /// Root flags shared by every subcommand.
    pub root: RootCommand,
    backends: Option<Backends>,
}

impl RunContext {
    #[must_use]
    pub fn new(root: RootCommand, backends: Option<Backends>) -> Self {
        Self { root, backends }
    }

    /// The external collaborators, if they were probed for this invocation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the dispatcher did not probe them.
    pub fn backends(&self) -> Result<&Backends, Error> {
        self.backends
            .as_ref()
            .ok_or_else(|| Error::Internal(anyhow::anyhow!("backends were not probed")))
    }
}
