use axum::http::header::{HOST, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, Method, Uri};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Transport a request arrived over, attached to each request by the server that accepted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        })
    }
}

/// The parts of an inbound request the block page can refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    pub scheme: Scheme,
    pub host: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(scheme: Scheme, method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            method: method.clone(),
            scheme,
            host: uri
                .authority()
                .map(ToString::to_string)
                .or_else(|| header(HOST)),
            path: uri.path().to_string(),
            query: uri.query().map(ToString::to_string),
            user_agent: header(USER_AGENT),
        }
    }

    /// The requested URL, as far as it is known.
    #[must_use]
    pub fn url(&self) -> String {
        let host = self.host.as_deref().unwrap_or("");
        match &self.query {
            Some(query) => format!("{}://{host}{}?{query}", self.scheme, self.path),
            None => format!("{}://{host}{}", self.scheme, self.path),
        }
    }
}

/// Render the block page for `ctx`.
#[must_use]
pub fn render_block_page(ctx: &RequestContext) -> String {
    let refused_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    let host = ctx.host.as_deref().unwrap_or("this site");
    format!(
        "GO AWAY\n\
         \n\
         {host} is blocked on this network.\n\
         \n\
         The request was refused by a DNS blocklist and was not forwarded anywhere.\n\
         If you think this is a mistake, ask whoever runs the network to allow it.\n\
         \n\
         \x20 method:     {method}\n\
         \x20 url:        {url}\n\
         \x20 user agent: {user_agent}\n\
         \x20 refused at: {refused_at}\n",
        method = ctx.method,
        url = ctx.url(),
        user_agent = ctx.user_agent.as_deref().unwrap_or("-"),
    )
}
