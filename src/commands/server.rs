use crate::blackhole;
use crate::commands::{CliCommand, ParsedArguments, RunContext};
use crate::error::Error;
use crate::validate;
use clap::{value_parser, Arg, ArgAction};
use std::path::{Path, PathBuf};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: i64 = 80;
const DEFAULT_HTTPS_PORT: i64 = 443;

/// Runs the blackhole HTTP/S responder.
///
/// A constructed `ServerCommand` always has `ssl_enabled` set exactly when both `ssl_cert` and
/// `ssl_key` are existing files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub ssl_enabled: bool,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub ssl_cert: Option<PathBuf>,
    pub ssl_key: Option<PathBuf>,
}

impl ServerCommand {
    /// Certificate chain and private key paths, when serving HTTPS.
    #[must_use]
    pub fn tls_files(&self) -> Option<(&Path, &Path)> {
        match (self.ssl_enabled, &self.ssl_cert, &self.ssl_key) {
            (true, Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }
}

impl CliCommand for ServerCommand {
    const NAME: &'static str = "server";

    fn configure(cmd: clap::Command) -> clap::Command {
        cmd.about("run the black hole HTTP/S server(s)")
            .arg(
                Arg::new("host")
                    .long("host")
                    .short('H')
                    .env("BLACKHOLE_HOST")
                    .default_value(DEFAULT_HOST)
                    .help("host/address to listen to"),
            )
            .arg(
                Arg::new("port")
                    .long("port")
                    .short('p')
                    .env("BLACKHOLE_PORT")
                    .value_parser(value_parser!(i64))
                    .allow_negative_numbers(true)
                    .help("port to listen on; default is 80 for HTTP, 443 for HTTPS"),
            )
            .arg(
                Arg::new("ssl")
                    .long("ssl")
                    .action(ArgAction::SetTrue)
                    .help("enable HTTPS mode"),
            )
            .arg(
                Arg::new("ssl_cert")
                    .long("ssl-cert")
                    .short('c')
                    .env("BLACKHOLE_SSL_CERT")
                    .value_parser(value_parser!(PathBuf))
                    .help("path to SSL certfile"),
            )
            .arg(
                Arg::new("ssl_key")
                    .long("ssl-key")
                    .short('k')
                    .env("BLACKHOLE_SSL_KEY")
                    .value_parser(value_parser!(PathBuf))
                    .help("path to SSL keyfile"),
            )
            .arg(
                Arg::new("debug")
                    .long("debug")
                    .action(ArgAction::SetTrue)
                    .help("enable debug mode"),
            )
    }

    fn construct(parsed: &ParsedArguments) -> Result<Self, Error> {
        let args = &parsed.leaf;
        let ssl_enabled = validate::flag(args.get_one::<bool>("ssl").copied());
        let host = args.get_one::<String>("host").cloned().unwrap_or_default();
        let raw_port = args.get_one::<i64>("port").copied().unwrap_or(if ssl_enabled {
            DEFAULT_HTTPS_PORT
        } else {
            DEFAULT_HTTP_PORT
        });
        let debug = validate::flag(args.get_one::<bool>("debug").copied());
        let ssl_cert = args.get_one::<PathBuf>("ssl_cert").cloned();
        let ssl_key = args.get_one::<PathBuf>("ssl_key").cloned();

        if host.is_empty() {
            return Err(Error::Server("host is required".to_string()));
        }
        let port = validate::port(raw_port)
            .ok_or_else(|| Error::Server(format!("invalid port: {raw_port}")))?;

        let cert_ok = validate::is_file(ssl_cert.as_deref());
        let key_ok = validate::is_file(ssl_key.as_deref());
        if ssl_enabled && !(cert_ok && key_ok) {
            return Err(Error::Server(
                "SSL enabled, but cert/key files are not valid".to_string(),
            ));
        }
        if !ssl_enabled && (cert_ok || key_ok) {
            return Err(Error::Server(
                "SSL disabled, but SSL cert/key specified".to_string(),
            ));
        }

        Ok(Self {
            ssl_enabled,
            host,
            port,
            debug,
            ssl_cert,
            ssl_key,
        })
    }

    fn run(&self, _ctx: &RunContext) -> Result<(), Error> {
        blackhole::serve(self)
    }
}
