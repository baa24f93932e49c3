//! Entry point tying parsing, construction and execution together.
use crate::backends::Backends;
use crate::commands::{
    surface, CliCommand, Command, CommandKind, ParsedArguments, RootCommand, RunContext,
};
use crate::error::Error;
use std::ffi::OsString;

/// Exit code when the selected command ran successfully.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when a group command was selected on its own and its help was printed.
pub const EXIT_NOT_RUNNABLE: u8 = 1;
/// Exit code for informative (user-actionable) errors.
pub const EXIT_INFORMATIVE: u8 = 2;

type Probe = Box<dyn Fn() -> Result<Backends, Error>>;
type Hook = Box<dyn Fn(&Command)>;

/// Parses argv, constructs the selected command and runs it.
pub struct Dispatcher {
    probe: Probe,
    on_constructed: Hook,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            probe: Box::new(Backends::probe),
            on_constructed: Box::new(|_| {}),
        }
    }
}

impl Dispatcher {
    /// Replace how external collaborators are located.
    #[must_use]
    pub fn with_probe(mut self, probe: impl Fn() -> Result<Backends, Error> + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Call `hook` with the command once it has been constructed, before it runs.
    #[must_use]
    pub fn on_constructed(mut self, hook: impl Fn(&Command) + 'static) -> Self {
        self.on_constructed = Box::new(hook);
        self
    }

    /// Dispatch `argv` (including the program name) and return the process exit code.
    ///
    /// Group commands print their help and return [`EXIT_NOT_RUNNABLE`]. Informative errors are
    /// printed as a single line and return [`EXIT_INFORMATIVE`]. Usage errors are reported by clap
    /// with its own exit code.
    ///
    /// # Errors
    ///
    /// Any other failure is returned as is, with its context chain intact.
    pub fn dispatch<I, T>(&self, argv: I) -> anyhow::Result<u8>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let parsed = match ParsedArguments::parse(argv) {
            Ok(parsed) => parsed,
            Err(err) => {
                err.print()?;
                return Ok(u8::try_from(err.exit_code()).unwrap_or(EXIT_NOT_RUNNABLE));
            }
        };

        match self.run(&parsed) {
            Ok(()) => Ok(EXIT_SUCCESS),
            Err(Error::NotRunnable) => {
                print_help(parsed.kind)?;
                Ok(EXIT_NOT_RUNNABLE)
            }
            Err(err) if err.is_informative() => {
                eprintln!("error: {err}");
                Ok(EXIT_INFORMATIVE)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn run(&self, parsed: &ParsedArguments) -> Result<(), Error> {
        let kind = parsed.kind;
        if !parsed.passthrough.is_empty() && !kind.accepts_passthrough() {
            let name = kind.path().last().copied().unwrap_or(RootCommand::NAME);
            return Err(Error::UnexpectedPassthrough(name.to_string()));
        }

        let backends = if kind.needs_backends() {
            Some((self.probe)()?)
        } else {
            None
        };
        let root = RootCommand::construct(parsed)?;
        let command = kind.construct(parsed)?;
        (self.on_constructed)(&command);
        tracing::debug!("constructed {command:?}");
        command.run(&RunContext::new(root, backends))
    }
}

// Print help for the most specific subcommand matched.
fn print_help(kind: CommandKind) -> std::io::Result<()> {
    let mut cmd = surface();
    cmd.build();
    let target = kind
        .path()
        .iter()
        .try_fold(&mut cmd, |cmd, name| cmd.find_subcommand_mut(name));
    match target {
        Some(target) => target.print_help(),
        None => surface().print_help(),
    }
}
