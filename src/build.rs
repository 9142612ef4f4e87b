//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::parser`]), cleaning the output directory and copying the static
//! assets ([`crate::output`]), and rendering index and post pages
//! ([`crate::write`]).

use crate::config::Config;
use crate::output::{self, clean_output_dir, copy_dir};
use crate::parser::{self, Parser as PostParser};
use crate::post::Post;
use crate::write::{self, parse_template, Writer};
use std::fmt;
use std::io::{self, Write};

/// Printed after a step that succeeded.
pub const SUCCEED_MARK: &str = "\u{2713}";

/// Printed after a step that failed.
pub const FAILED_MARK: &str = "\u{2717}";

/// Builds the site described by `config`, writing one status line per step
/// to `status`. The steps run in order and the first failure stops the
/// build:
///
/// 1. Collect all posts
/// 2. Clean the output directory
/// 3. Render the index and post templates
/// 4. Copy the static directory into the output directory
///
/// Because posts are collected before anything is written, a single invalid
/// post leaves the previous output untouched.
pub fn build_site<W: Write>(config: &Config, status: &mut W) -> Result<()> {
    let posts = step(status, "1. Collect all posts", || collect_posts(config))?;
    step(status, "2. Clean output directory", || {
        clean_output_dir(&config.output_directory).map_err(Error::from)
    })?;
    step(status, "3. Rendering template", || render(config, &posts))?;
    step(status, "4. Copy static to out directory", || {
        copy_dir(
            &config.static_source_directory(),
            &config.static_output_directory(),
        )
        .map_err(Error::from)
    })?;
    Ok(())
}

/// Runs one step of the build, reporting its label and outcome on `status`.
/// The label is flushed before the step runs so a slow step shows what is in
/// progress.
pub fn step<W, T, E, F>(status: &mut W, label: &str, f: F) -> std::result::Result<T, E>
where
    W: Write,
    F: FnOnce() -> std::result::Result<T, E>,
    E: From<io::Error>,
{
    write!(status, "{}", label)?;
    status.flush()?;
    let result = f();
    let mark = if result.is_ok() { SUCCEED_MARK } else { FAILED_MARK };
    writeln!(status, "\t\t{}", mark)?;
    result
}

fn collect_posts(config: &Config) -> Result<Vec<Post>> {
    let converter = config.markup.converter();
    let parser = PostParser::new(
        converter.as_ref(),
        config.markup.extension(),
        &config.output_post_directory,
    );
    let posts = parser.parse_posts(&config.content_directory)?;
    tracing::info!("collected {} posts", posts.len());
    Ok(posts)
}

fn render(config: &Config, posts: &[Post]) -> Result<()> {
    let index_template = parse_template(&config.index_template())?;
    let post_template = parse_template(&config.post_template())?;
    Writer {
        index_template: &index_template,
        post_template: &post_template,
        output_directory: &config.output_directory,
        index_file_name: &config.index_template_name,
        post_directory: &config.output_post_directory,
    }
    .write_all(posts)?;
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// preparing the output directory, writing pages, and writing status lines.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(parser::Error),

    /// Returned for errors cleaning the output directory or copying the
    /// static assets.
    Output(output::Error),

    /// Returned for errors templating and writing [`Post`]s to disk.
    Write(write::Error),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => fmt::Display::fmt(err, f),
            Error::Output(err) => fmt::Display::fmt(err, f),
            Error::Write(err) => fmt::Display::fmt(err, f),
            Error::Io(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`]. [`Error`] displays as
    /// the wrapped error, so the chain continues from that error's source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => err.source(),
            Error::Output(err) => err.source(),
            Error::Write(err) => err.source(),
            Error::Io(err) => err.source(),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<parser::Error> for Error {
    fn from(err: parser::Error) -> Error {
        Error::Parse(err)
    }
}

impl From<output::Error> for Error {
    fn from(err: output::Error) -> Error {
        Error::Output(err)
    }
}

impl From<write::Error> for Error {
    fn from(err: write::Error) -> Error {
        Error::Write(err)
    }
}
