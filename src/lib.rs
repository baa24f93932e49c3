//! DNS Block Blackhole
//!
//! A companion for DNS blocklists such as [Pi-hole]: point blocked names at this server and it
//! answers every request with a short explanation instead of a connection error.
//!
//! Two tools are provided behind one command line:
//!
//! * `server` runs the [blackhole responder][crate::blackhole] over HTTP or HTTPS.
//! * `certbot-route53` acquires certificates for the HTTPS responder with [certbot] and its
//!   [Route53] plugin, solving [RFC-8555][RFC-8555] [DNS-01] challenges against AWS.
//!
//! [Pi-hole]: https://pi-hole.net
//! [certbot]: https://certbot.eff.org
//! [Route53]: https://certbot-dns-route53.readthedocs.io
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//!
#![warn(clippy::pedantic)]

pub mod backends;
pub mod blackhole;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod validate;

pub use backends::Backends;
pub use commands::{Command, CommandKind};
pub use dispatch::Dispatcher;
pub use error::Error;
