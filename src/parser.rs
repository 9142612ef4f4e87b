//! Defines the [`Parser`] and [`Error`] types: the logic for reading post
//! source files from the file system into [`Post`] objects.

use std::{fmt, fs, path::Path};

use walkdir::WalkDir;

use crate::{markup, markup::Converter, post::Post};

/// The marker the first line of every post must begin with.
pub const TITLE_MARKER: &str = "#+TITLE:";

/// The marker the second line of every post must begin with.
pub const DATE_MARKER: &str = "#+DATE:";

const HTML_EXTENSION: &str = ".html";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// Converts post bodies to HTML.
    converter: &'a dyn Converter,

    /// Only files whose names end with `extension` are parsed as posts.
    extension: &'a str,

    /// `output_post_directory` prefixes every post URL (i.e., the URL for a
    /// post is `{output_post_directory}/{post_id}.html`).
    output_post_directory: &'a str,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(
        converter: &'a dyn Converter,
        extension: &'a str,
        output_post_directory: &'a str,
    ) -> Parser<'a> {
        Parser {
            converter,
            extension,
            output_post_directory,
        }
    }

    /// Recursively searches `source_directory` for post files and returns
    /// them as [`Post`] objects in walk order (entries within a directory
    /// are visited by file name). Each post file must be structured as
    /// follows:
    ///
    /// 1. A title line beginning with `#+TITLE:`
    /// 2. A date line beginning with `#+DATE:`; angle brackets around the
    ///    date are optional
    /// 3. Post body
    ///
    /// For example:
    ///
    /// ```org
    /// #+TITLE: Hello, world!
    /// #+DATE: <2021-04-16>
    /// * Hello
    ///
    /// World
    /// ```
    ///
    /// The first file that can't be read or parsed aborts the whole
    /// operation.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in WalkDir::new(source_directory)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(self.extension) {
                posts.push(self.parse_post(entry.path())?);
            }
        }

        tracing::debug!(
            "collected {} posts from {}",
            posts.len(),
            source_directory.display()
        );
        Ok(posts)
    }

    /// Reads and parses the single post file at `path`, annotating any error
    /// with the path.
    fn parse_post(&self, path: &Path) -> Result<Post> {
        match self._parse_post(path) {
            Ok(p) => {
                tracing::debug!("parsed post `{}` from {}", p.title, path.display());
                Ok(p)
            }
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, path: &Path) -> Result<Post> {
        let contents = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        self.parse_str(&file_name, &String::from_utf8_lossy(&contents))
    }

    /// Parses a post from the contents of its source file. `file_name` is the
    /// source file's name, from which the URL is derived.
    pub fn parse_str(&self, file_name: &str, input: &str) -> Result<Post> {
        let (title, date, body) = split_headers(input)?;
        Ok(Post {
            title: title.to_owned(),
            date: date.to_owned(),
            url: self.post_url(file_name),
            content: self.converter.convert(&body)?,
        })
    }

    /// Derives a post's URL from its source file name: directories and the
    /// markup extension are stripped, the output post directory is
    /// prepended and `.html` appended. `notes/hello.org` becomes
    /// `posts/hello.html` for an output post directory of `posts`.
    pub fn post_url(&self, file_name: &str) -> String {
        let base_name = file_name
            .rsplit(&['/', std::path::MAIN_SEPARATOR][..])
            .next()
            .unwrap_or(file_name);
        let id = base_name.strip_suffix(self.extension).unwrap_or(base_name);
        format!("{}/{}{}", self.output_post_directory, id, HTML_EXTENSION)
    }
}

/// Splits post source text into its title, date, and body. The title and date
/// are the first two lines with their markers removed; the body is every
/// following line.
pub fn split_headers(input: &str) -> Result<(&str, &str, String)> {
    let lines: Vec<&str> = input.split('\n').collect();
    if lines.len() < 2 {
        return Err(Error::InvalidPostContent);
    }
    let title = lines[0]
        .strip_prefix(TITLE_MARKER)
        .ok_or(Error::InvalidPostContent)?
        .trim_matches(' ');
    let date = lines[1]
        .strip_prefix(DATE_MARKER)
        .ok_or(Error::InvalidPostContent)?
        .trim_matches(&[' ', '<', '>'][..]);
    Ok((title, date, lines[2..].join("\n")))
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file doesn't begin with a `#+TITLE:` line
    /// followed by a `#+DATE:` line.
    InvalidPostContent,

    /// Returned when the post body can't be converted to HTML.
    Markup(markup::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for errors walking the source directory.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidPostContent => write!(f, "invalid post content"),
            Error::Markup(err) => fmt::Display::fmt(err, f),
            Error::Io(err) => fmt::Display::fmt(err, f),
            Error::WalkDir(err) => fmt::Display::fmt(err, f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPostContent => None,
            Error::Markup(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl Error {
    /// Strips any annotations and returns the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Error::Annotated(_, err) => err.root(),
            _ => self,
        }
    }
}

impl From<markup::Error> for Error {
    fn from(err: markup::Error) -> Error {
        Error::Markup(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the source directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
