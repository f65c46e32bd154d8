use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

/// Anything that can look up a request header by name, ignoring case.
pub trait HeaderSource {
    fn header(&self, name: &str) -> Option<&str>;
}

fn lookup<'a, K, V>(pairs: impl IntoIterator<Item = (&'a K, &'a V)>, name: &str) -> Option<&'a str>
where
    K: AsRef<str> + ?Sized + 'a,
    V: AsRef<str> + ?Sized + 'a,
{
    pairs
        .into_iter()
        .find(|(k, _)| k.as_ref().eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_ref())
}

impl HeaderSource for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        lookup(self.iter(), name)
    }
}

impl HeaderSource for BTreeMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        lookup(self.iter(), name)
    }
}

impl HeaderSource for IndexMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        lookup(self.iter(), name)
    }
}

impl HeaderSource for Vec<(String, String)> {
    fn header(&self, name: &str) -> Option<&str> {
        lookup(self.iter().map(|(k, v)| (k, v)), name)
    }
}

impl HeaderSource for [(&str, &str)] {
    fn header(&self, name: &str) -> Option<&str> {
        lookup(self.iter().map(|(k, v)| (*k, *v)), name)
    }
}

impl<const N: usize> HeaderSource for [(&str, &str); N] {
    fn header(&self, name: &str) -> Option<&str> {
        lookup(self.iter().map(|(k, v)| (*k, *v)), name)
    }
}

/// Where the cookie string for one resolution comes from.
///
/// Exactly one source is consulted per call. [`CookieSource::select`] applies
/// the precedence: a live document cookie store, then the request's `Cookie`
/// header, then nothing.
#[derive(Clone, Copy)]
pub enum CookieSource<'a> {
    /// The live `document.cookie` string of a browser-like context.
    Document(&'a str),
    /// An incoming HTTP request.
    Request(&'a dyn HeaderSource),
    /// No cookies at all: every hint resolves to its fallback.
    Empty,
}

impl<'a> CookieSource<'a> {
    pub fn select(document: Option<&'a str>, request: Option<&'a dyn HeaderSource>) -> Self {
        match (document, request) {
            (Some(cookie), _) => Self::Document(cookie),
            (None, Some(request)) => Self::Request(request),
            (None, None) => Self::Empty,
        }
    }

    /// The raw cookie header. A request without a `Cookie` header yields `""`.
    pub fn cookie_header(&self) -> &'a str {
        match *self {
            Self::Document(cookie) => cookie,
            Self::Request(request) => request.header("Cookie").unwrap_or(""),
            Self::Empty => "",
        }
    }
}
