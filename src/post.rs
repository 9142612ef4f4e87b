//! Defines the [`Post`] type, the in-memory form of one source file.

/// A single post, parsed from one markup source file. See
/// [`crate::parser::Parser::parse_posts`] for how each field is derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// The text of the `#+TITLE:` header line.
    pub title: String,

    /// The text of the `#+DATE:` header line, without angle brackets. The
    /// date is never parsed, so any format the author uses passes through
    /// untouched.
    pub date: String,

    /// The output path of the post page relative to the output directory,
    /// e.g. `posts/hello.html`. Also usable as a relative link from the
    /// index page.
    pub url: String,

    /// The post body rendered as HTML.
    pub content: String,
}
