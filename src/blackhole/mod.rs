//! The blackhole HTTP/S responder.
//!
//! Meant to be the target of a DNS blocklist (e.g. a pihole configured to answer blocked names
//! with this server's address). Instead of a connection error, clients get an explanation.
//!
//! # Responses
//!
//! ## Any method, any path, over HTTPS
//!
//!   Returns HTTP 599 and a `text/plain` block page naming the refused host and path. 599 is
//!   deliberately non-standard: the request is refused permanently and nothing retries it
//!   successfully.
//!
//! ## Any method, any path, over plain HTTP
//!
//!   Returns HTTP 307 (Temporary Redirect) to the same host and path over `https`. Ports 80 and
//!   443 are dropped from the target, other ports are kept.
//!
//!   ```bash
//!   ❯ curl -si http://ads.example.com/pixel.gif | head -n 2
//!   HTTP/1.1 307 Temporary Redirect
//!   location: https://ads.example.com/pixel.gif
//!   ```

mod model;
mod routes;
mod server;
mod tls;

pub use model::{render_block_page, RequestContext, Scheme};
pub use routes::{new as router, GO_AWAY_STATUS_CODE};
pub use server::serve;
