use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Post,
    Get,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Post => "POST",
            Verb::Get => "GET",
            Verb::Delete => "DELETE",
        }
    }

    /// Whether a successful command must be followed by a snapshot.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Verb::Post | Verb::Delete)
    }
}

impl FromStr for Verb {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST" => Ok(Verb::Post),
            "GET" => Ok(Verb::Get),
            "DELETE" => Ok(Verb::Delete),
            other => Err(AppError::BadRequest(format!("unknown verb: {}", other))),
        }
    }
}

/// One parsed request line: `<VERB> <argument>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    pub argument: String,
}

impl Command {
    /// Splits a request line into verb and argument.
    ///
    /// The line must hold exactly two whitespace-separated tokens. A trailing
    /// `\r` from CRLF clients is ignored.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for an empty line, an unknown verb, a
    /// missing argument or trailing tokens.
    pub fn parse(line: &str) -> Result<Self, AppError> {
        let mut tokens = line.trim_end_matches(['\r', '\n']).split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| AppError::BadRequest("empty command line".to_string()))?
            .parse::<Verb>()?;
        let argument = tokens
            .next()
            .ok_or_else(|| AppError::BadRequest(format!("{} requires an argument", verb.as_str())))?;
        if tokens.next().is_some() {
            return Err(AppError::BadRequest("unexpected trailing tokens".to_string()));
        }
        Ok(Self { verb, argument: argument.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
        }
    }

    pub fn as_line(&self) -> &'static str {
        match self {
            Status::Ok => "200 OK",
            Status::Created => "201 Created",
            Status::NoContent => "204 No Content",
            Status::BadRequest => "400 Bad Request",
            Status::NotFound => "404 Not Found",
            Status::InternalServerError => "500 Internal Server Error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_line())
    }
}

/// Result of a `GET`: both flags are read under one lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub possibly_contained: bool,
    pub blacklisted: bool,
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.possibly_contained {
            write!(f, "true {}", self.blacklisted)
        } else {
            f.write_str("false")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub body: Option<String>,
}

impl Reply {
    pub fn new(status: Status) -> Self {
        Self { status, body: None }
    }

    pub fn with_body(status: Status, body: impl Into<String>) -> Self {
        Self { status, body: Some(body.into()) }
    }

    /// Wire form: the status line, then a blank line and the body when present.
    pub fn render(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}\n", self.status, body),
            None => format!("{}\n", self.status),
        }
    }
}

impl From<AppError> for Reply {
    fn from(err: AppError) -> Self {
        Reply::new(err.status())
    }
}
