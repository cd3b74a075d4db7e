use http::Method;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The HTTP verbs a handler can be registered for.
///
/// `HEAD` and `OPTIONS` are not verbs here: they are answered by the dispatch engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown http verb: {0}")]
pub struct UnknownVerb(pub String);

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Get, Verb::Post, Verb::Put, Verb::Patch, Verb::Delete];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }

    pub fn as_method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    /// `true` for the method tokens answered without a registered handler.
    pub fn is_meta_token(token: &str) -> bool {
        token == "HEAD" || token == "OPTIONS"
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a wire-level method token. Matching is case-sensitive, as method tokens are.
impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL.into_iter().find(|verb| verb.as_str() == s).ok_or_else(|| UnknownVerb(s.to_string()))
    }
}

impl TryFrom<&Method> for Verb {
    type Error = UnknownVerb;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        verb.as_method()
    }
}
