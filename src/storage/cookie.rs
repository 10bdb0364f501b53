//! Cookie capability, expiry rendering and an in-memory jar.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::Result;

/// Date format used in the `expires` cookie attribute.
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// == Cookie Expiry ==
/// Lifetime requested for a written cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieExpiry {
    /// Far-future expiry (31 Dec 9999), effectively unlimited
    Never,
    /// No `expires` attribute; the cookie ends with the browser session
    Session,
    /// Expires at the given instant
    At(DateTime<Utc>),
}

impl CookieExpiry {
    /// Returns the instant this expiry resolves to, None for session cookies.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            CookieExpiry::Never => Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).single(),
            CookieExpiry::Session => None,
            CookieExpiry::At(at) => Some(*at),
        }
    }

    /// Renders the `expires=...` attribute, None for session cookies.
    pub fn attribute(&self) -> Option<String> {
        self.instant()
            .map(|at| format!("expires={}", at.format(EXPIRES_FORMAT)))
    }
}

// == Cookie ==
/// A cookie ready to be handed to a [`CookieJar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expiry: CookieExpiry,
    pub path: String,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        expiry: CookieExpiry,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expiry,
            path: path.into(),
        }
    }

    /// Renders the cookie as a `document.cookie` assignment string.
    ///
    /// e.g. `csses=a2,a1;expires=Fri, 31 Dec 9999 23:59:59 GMT;path=/`
    pub fn to_header_string(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);
        if let Some(expires) = self.expiry.attribute() {
            header.push(';');
            header.push_str(&expires);
        }
        header.push_str(";path=");
        header.push_str(&self.path);
        header
    }
}

// == Cookie Jar ==
/// Capability over reading and writing cookies by name.
pub trait CookieJar {
    /// Returns the current value of the named cookie, if any.
    fn read(&self, name: &str) -> Option<String>;

    /// Writes a cookie, replacing any previous value with the same name.
    fn write(&mut self, cookie: Cookie) -> Result<()>;
}

// == Header Parsing ==
/// Extracts the value of `name` from a `name=value; other=value` header.
///
/// Whitespace around names and before values is ignored. When a name appears
/// more than once the last occurrence wins.
pub fn parse_cookie_header(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim_start().to_string())
        .last()
}

// == Memory Cookie Jar ==
/// In-memory [`CookieJar`] keyed by cookie name.
#[derive(Debug, Default, Clone)]
pub struct MemoryCookieJar {
    cookies: BTreeMap<String, Cookie>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a jar from a raw `name=value; ...` header as sent by a browser.
    ///
    /// Seeded cookies carry no expiry information and are treated as session cookies.
    pub fn from_header(header: &str) -> Self {
        let mut jar = Self::new();
        for (name, _) in header.split(';').filter_map(|pair| pair.split_once('=')) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(value) = parse_cookie_header(header, name) {
                jar.cookies.insert(
                    name.to_string(),
                    Cookie::new(name, value, CookieExpiry::Session, "/"),
                );
            }
        }
        jar
    }

    /// Returns the full cookie last written under `name`.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// Renders all cookies as a request header, sorted by name.
    pub fn header(&self) -> String {
        self.cookies
            .values()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl CookieJar for MemoryCookieJar {
    fn read(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|cookie| cookie.value.clone())
    }

    fn write(&mut self, cookie: Cookie) -> Result<()> {
        self.cookies.insert(cookie.name.clone(), cookie);
        Ok(())
    }
}
