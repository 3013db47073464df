//! Notification adapters.
//!
//! [`MailNotifier`] implements [`NotifierPort`] over a mail / SMS-gateway
//! transport.  Each recipient address is routed by substring match against
//! a static provider table:
//!
//! ```text
//!  "alice@gmail.com"       ──▶ smtp.gmail.com:587      (submission)
//!  "5551234567@vtext.com"  ──▶ vtext.com:25            (SMS gateway)
//!  "bob@example.org"       ──▶ NotifyError::UnknownProvider
//! ```
//!
//! Wire delivery lives behind [`MailTransport`]; this crate ships only
//! [`LogTransport`].  [`LogNotifier`] is the console channel.

use heapless::{String, Vec};
use log::{info, warn};

use crate::app::ports::NotifierPort;
use crate::config::{MAX_RECIPIENTS, MailConfig};
use crate::error::NotifyError;

/// Subject line for every outgoing mail.
pub const SUBJECT: &str = "PlantBot Notification";

/// Longest body a transport will accept.
pub const MAX_BODY_LEN: usize = 1024;

const SUBMISSION_PORT: u16 = 587;
const GATEWAY_PORT: u16 = 25;

// ── Routing ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Authenticated SMTP submission server.
    Submission,
    /// Carrier SMS-to-email gateway.
    SmsGateway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub provider: &'static str,
    pub host: &'static str,
    pub port: u16,
    pub kind: RouteKind,
}

const fn submission(provider: &'static str, host: &'static str) -> Route {
    Route {
        provider,
        host,
        port: SUBMISSION_PORT,
        kind: RouteKind::Submission,
    }
}

const fn gateway(provider: &'static str, host: &'static str) -> Route {
    Route {
        provider,
        host,
        port: GATEWAY_PORT,
        kind: RouteKind::SmsGateway,
    }
}

/// `(needle, route)`, matched against the domain, first match wins.
static PROVIDERS: [(&str, Route); 10] = [
    ("gmail", submission("gmail", "smtp.gmail.com")),
    ("hotmail", submission("outlook", "smtp.live.com")),
    ("outlook", submission("outlook", "smtp.live.com")),
    ("live", submission("outlook", "smtp.live.com")),
    ("yahoo", submission("yahoo", "smtp.mail.yahoo.com")),
    ("att", gateway("att", "txt.att.net")),
    ("vtext", gateway("verizon", "vtext.com")),
    ("verizon", gateway("verizon", "vtext.com")),
    ("tmo", gateway("tmobile", "tmomail.net")),
    ("sprint", gateway("sprint", "messaging.sprintpcs.com")),
];

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Pick the server for `address` from its domain part.  Addresses
/// without an `@` have no domain and match nothing.
pub fn resolve_route(address: &str) -> Result<Route, NotifyError> {
    let (_, domain) = address
        .rsplit_once('@')
        .ok_or(NotifyError::UnknownProvider)?;
    PROVIDERS
        .iter()
        .find(|(needle, _)| contains_ignore_case(domain, needle))
        .map(|(_, route)| *route)
        .ok_or(NotifyError::UnknownProvider)
}

// ── Transport ─────────────────────────────────────────────────

/// One envelope, ready for the wire.
#[derive(Debug, Clone, Copy)]
pub struct MailMessage<'a> {
    pub route: Route,
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

pub trait MailTransport {
    fn deliver(&mut self, message: &MailMessage<'_>) -> Result<(), NotifyError>;
}

/// Transport that logs the envelope instead of opening a connection.
#[derive(Debug, Default)]
pub struct LogTransport {
    delivered: u32,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }
}

impl MailTransport for LogTransport {
    fn deliver(&mut self, m: &MailMessage<'_>) -> Result<(), NotifyError> {
        self.delivered += 1;
        info!(
            "mail: {} -> {} via {}:{} ({}) | {} | {} bytes",
            m.from,
            m.to,
            m.route.host,
            m.route.port,
            m.route.provider,
            m.subject,
            m.body.len()
        );
        Ok(())
    }
}

// ── Notifiers ─────────────────────────────────────────────────

/// Mail / SMS notification channel.
pub struct MailNotifier<T> {
    sender: String<64>,
    recipients: Vec<String<64>, MAX_RECIPIENTS>,
    transport: T,
}

impl<T: MailTransport> MailNotifier<T> {
    pub fn new(config: &MailConfig, transport: T) -> Self {
        Self {
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: MailTransport> NotifierPort for MailNotifier<T> {
    fn channel(&self) -> &str {
        "mail"
    }

    /// One envelope per recipient.  Every recipient is attempted; the
    /// first failure is returned.
    fn send(&mut self, message: &str) -> Result<(), NotifyError> {
        if message.len() > MAX_BODY_LEN {
            return Err(NotifyError::MessageTooLong);
        }

        let mut first_error = None;
        for to in &self.recipients {
            let result = resolve_route(to).and_then(|route| {
                self.transport.deliver(&MailMessage {
                    route,
                    from: self.sender.as_str(),
                    to: to.as_str(),
                    subject: SUBJECT,
                    body: message,
                })
            });
            if let Err(e) = result {
                warn!("mail to {} failed: {}", to, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Console notification channel.
#[derive(Debug, Default)]
pub struct LogNotifier {
    sent: u32,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl NotifierPort for LogNotifier {
    fn channel(&self) -> &str {
        "log"
    }

    fn send(&mut self, message: &str) -> Result<(), NotifyError> {
        self.sent += 1;
        for line in message.lines() {
            info!("notify | {}", line);
        }
        Ok(())
    }
}
