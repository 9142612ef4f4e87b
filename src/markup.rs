//! Converts post bodies from a lightweight markup language into HTML. The
//! rest of the pipeline only sees the [`Converter`] trait, so the markup
//! library can be swapped without touching post extraction or rendering.

use serde::Deserialize;
use std::fmt;
use std::io;
use std::string::FromUtf8Error;

/// Turns markup text into an HTML fragment.
pub trait Converter {
    fn convert(&self, markup: &str) -> Result<String>;
}

/// The markup languages a site can be written in. Selected by the `markup`
/// field of the configuration file.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    Org,
    Markdown,
}

impl Default for Markup {
    fn default() -> Self {
        Markup::Org
    }
}

impl Markup {
    /// The file-name suffix that marks a source file as a post. Matching is
    /// case-sensitive.
    pub fn extension(self) -> &'static str {
        match self {
            Markup::Org => ".org",
            Markup::Markdown => ".md",
        }
    }

    /// Returns the [`Converter`] for this language.
    pub fn converter(self) -> Box<dyn Converter> {
        match self {
            Markup::Org => Box::new(OrgConverter),
            Markup::Markdown => Box::new(MarkdownConverter),
        }
    }
}

/// Converts Org-mode text via [`orgize`].
pub struct OrgConverter;

impl Converter for OrgConverter {
    fn convert(&self, markup: &str) -> Result<String> {
        let mut html = Vec::new();
        orgize::Org::parse(markup).write_html(&mut html)?;
        Ok(String::from_utf8(html)?)
    }
}

/// Converts CommonMark text via [`pulldown_cmark`].
pub struct MarkdownConverter;

impl Converter for MarkdownConverter {
    fn convert(&self, markup: &str) -> Result<String> {
        use pulldown_cmark::{html, Options, Parser};

        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut out = String::with_capacity(markup.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(markup, options));
        Ok(out)
    }
}

/// The result of a conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error converting markup to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned when the converter fails to write its output.
    Io(io::Error),

    /// Returned when the converter produces bytes that aren't UTF-8.
    Utf8(FromUtf8Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "converting markup: {}", err),
            Error::Utf8(err) => write!(f, "converting markup: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Utf8(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts a [`io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for IO operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Error {
        Error::Utf8(err)
    }
}
