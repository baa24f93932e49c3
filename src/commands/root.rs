use crate::commands::{CertbotRoute53Command, CliCommand, ParsedArguments, ServerCommand};
use crate::error::Error;
use crate::validate;
use clap::{Arg, ArgAction};

/// Top of the command tree. Carries flags shared by every subcommand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootCommand {
    /// Use prompts where necessary instead of failing.
    pub interactive: bool,
}

impl CliCommand for RootCommand {
    const NAME: &'static str = "dns-block-blackhole";

    fn configure(cmd: clap::Command) -> clap::Command {
        cmd.about("HTTP/S server to redirect to with your pihole, plus related utilities")
            .version(env!("CARGO_PKG_VERSION"))
            .arg(
                Arg::new("interactive")
                    .long("interactive")
                    .short('i')
                    .global(true)
                    .action(ArgAction::SetTrue)
                    .help("use prompts where necessary"),
            )
            .subcommand(CertbotRoute53Command::configure(clap::Command::new(
                CertbotRoute53Command::NAME,
            )))
            .subcommand(ServerCommand::configure(clap::Command::new(
                ServerCommand::NAME,
            )))
    }

    fn construct(parsed: &ParsedArguments) -> Result<Self, Error> {
        Ok(Self {
            interactive: validate::flag(parsed.root.get_one::<bool>("interactive").copied()),
        })
    }
}
