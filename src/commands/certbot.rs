//! Certificate management through certbot and its Route53 DNS-01 plugin.
//!
//! [`build_args`] is the single place that knows certbot's argument grammar. The order of the
//! arguments it produces is fixed.

use crate::commands::{CliCommand, ParsedArguments, RunContext, SEPARATOR};
use crate::error::Error;
use crate::validate;
use clap::{Arg, ArgAction};
use std::borrow::Cow;

/// Group node for the `certbot-route53` subcommands. Not runnable on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CertbotRoute53Command;

impl CliCommand for CertbotRoute53Command {
    const NAME: &'static str = "certbot-route53";

    fn configure(cmd: clap::Command) -> clap::Command {
        cmd.about("manage SSL certs using Certbot and AWS Route53")
            .subcommand(AcquireCertCommand::configure(clap::Command::new(
                AcquireCertCommand::NAME,
            )))
            .subcommand(RenewCertCommand::configure(clap::Command::new(
                RenewCertCommand::NAME,
            )))
    }

    fn construct(_parsed: &ParsedArguments) -> Result<Self, Error> {
        Ok(Self)
    }
}

/// Validated certificate request shared by `acquire-cert` and `renew-cert`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertRequest {
    /// Certbot's name for the lineage. Empty lets certbot choose.
    pub cert_name: String,
    pub email: String,
    pub domains: Vec<String>,
    /// Keep an existing cert that still matches the request, unless `--force` is given.
    pub keep_valid_cert: bool,
    /// Use the ACME staging server.
    pub test_mode: bool,
    pub dry_run: bool,
    /// Arguments forwarded to certbot verbatim.
    pub extra_args: Vec<String>,
}

impl CertRequest {
    fn configure(cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new("name")
                .long("name")
                .short('n')
                .help("name for the cert (used by certbot)"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .short('e')
                .required(true)
                .help("email for account notifications"),
        )
        .arg(
            Arg::new("domains")
                .long("domain")
                .short('d')
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .help("domains to manage"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .short('f')
                .action(ArgAction::SetTrue)
                .help("if the request matches an existing cert, overwrite it anyway"),
        )
        .arg(
            Arg::new("test")
                .long("test")
                .action(ArgAction::SetTrue)
                .help("use a staging ACME server"),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("do not edit any actual files"),
        )
        .arg(
            Arg::new("extra_args")
                .value_name("...")
                .num_args(1..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help(
                    "extra (unrecognized) arguments are passed through unmodified to certbot; \
                     use -- to force the start of passthrough arguments",
                ),
        )
    }

    fn construct(parsed: &ParsedArguments) -> Result<Self, Error> {
        let args = &parsed.leaf;
        let cert_name = args.get_one::<String>("name").cloned().unwrap_or_default();
        let email = args.get_one::<String>("email").cloned().unwrap_or_default();
        let (domains, mut spilled) = args
            .get_occurrences::<String>("domains")
            .map(split_domain_values)
            .unwrap_or_default();
        let keep_valid_cert = !validate::flag(args.get_one::<bool>("force").copied());
        let test_mode = validate::flag(args.get_one::<bool>("test").copied());
        let dry_run = validate::flag(args.get_one::<bool>("dry_run").copied());
        spilled.extend(
            args.get_many::<String>("extra_args")
                .into_iter()
                .flatten()
                .cloned(),
        );

        if !validate::is_email(&email) {
            return Err(Error::invalid("email address", &email));
        }
        if !validate::domain_list(&domains) {
            return Err(Error::invalid("domain list", &domains));
        }

        Ok(Self {
            cert_name,
            email,
            domains,
            keep_valid_cert,
            test_mode,
            dry_run,
            extra_args: merge_extra_args(&parsed.passthrough, &spilled),
        })
    }
}

// clap lets a multi-value `-d` swallow unknown flags that follow it. Within each occurrence,
// everything from the first hyphen-leading value on belongs to certbot, not the domain list.
fn split_domain_values<'a>(
    occurrences: impl Iterator<Item = impl Iterator<Item = &'a String>>,
) -> (Vec<String>, Vec<String>) {
    let mut domains = Vec::new();
    let mut spilled = Vec::new();
    for occurrence in occurrences {
        let mut in_domains = true;
        for value in occurrence {
            in_domains &= !value.starts_with('-');
            if in_domains {
                domains.push(value.clone());
            } else {
                spilled.push(value.clone());
            }
        }
    }
    (domains, spilled)
}

/// Combine the arguments given after `--` with trailing positional ones, explicit first. A single
/// leading separator token is dropped.
#[must_use]
pub fn merge_extra_args(explicit: &[String], positional: &[String]) -> Vec<String> {
    let mut args: Vec<String> = explicit.iter().chain(positional).cloned().collect();
    if args.first().is_some_and(|a| a == SEPARATOR) {
        args.remove(0);
    }
    args
}

/// Map a certificate request to certbot arguments, in certbot's expected order.
#[must_use]
pub fn build_args(req: &CertRequest, interactive: bool) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    if !interactive {
        args.push("--non-interactive".into());
        args.push("--agree-tos".into());
    }
    if req.test_mode {
        args.push("--test-cert".into());
    }
    if req.dry_run {
        args.push("--dry-run".into());
    }

    args.push(if req.keep_valid_cert { "--keep" } else { "--reinstall" }.into());
    args.push("--dns-route53".into());

    if !req.cert_name.is_empty() {
        args.push("--cert-name".into());
        args.push(req.cert_name.clone());
    }

    args.push("-m".into());
    args.push(req.email.clone());

    for domain in &req.domains {
        args.push("-d".into());
        args.push(domain.clone());
    }

    args.extend(req.extra_args.iter().cloned());
    args
}

fn shell_quote(arg: &str) -> Cow<'_, str> {
    let safe = |c: char| c.is_alphanumeric() || "@%+=:,./-_".contains(c);
    if !arg.is_empty() && arg.chars().all(safe) {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r#"'"'"'"#)))
    }
}

fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_quote(a))
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_aws_creds(ctx: &RunContext) -> Result<(), Error> {
    tracing::info!("Checking AWS credentials...");
    ctx.backends()?.credentials.check()
}

/// Requests a new certificate with `certbot certonly`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireCertCommand {
    pub request: CertRequest,
}

impl CliCommand for AcquireCertCommand {
    const NAME: &'static str = "acquire-cert";

    fn configure(cmd: clap::Command) -> clap::Command {
        CertRequest::configure(cmd.about("acquire a new cert"))
    }

    fn construct(parsed: &ParsedArguments) -> Result<Self, Error> {
        Ok(Self {
            request: CertRequest::construct(parsed)?,
        })
    }

    fn run(&self, ctx: &RunContext) -> Result<(), Error> {
        check_aws_creds(ctx)?;
        let mut args = vec!["certonly".to_string()];
        args.extend(build_args(&self.request, ctx.root.interactive));
        tracing::info!("Requesting cert using args: {}", shell_join(&args));
        ctx.backends()?.acme.run(&args)?;
        Ok(())
    }
}

/// Renews an existing certificate.
///
/// Only the credential check runs; certbot itself is not invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewCertCommand {
    pub request: CertRequest,
}

impl CliCommand for RenewCertCommand {
    const NAME: &'static str = "renew-cert";

    fn configure(cmd: clap::Command) -> clap::Command {
        CertRequest::configure(cmd.about("renew an existing cert"))
    }

    fn construct(parsed: &ParsedArguments) -> Result<Self, Error> {
        Ok(Self {
            request: CertRequest::construct(parsed)?,
        })
    }

    fn run(&self, ctx: &RunContext) -> Result<(), Error> {
        tracing::info!("renewing cert for {}", self.request.domains.join(", "));
        check_aws_creds(ctx)
    }
}
