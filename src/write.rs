//! Templating and writing HTML pages to disk from [`Post`] sources. Templates
//! use Go `text/template` syntax via [`gtmpl`].

use crate::post::Post;
use crate::value::posts_to_value;
use gtmpl::{Context, Template, Value};
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Loads the template file at `path` and parses it into a [`Template`].
pub fn parse_template(path: &Path) -> Result<Template> {
    let contents = fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
        path: path.to_owned(),
        err,
    })?;

    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|message| Error::ParseTemplate {
            path: path.to_owned(),
            message: message.to_string(),
        })?;
    Ok(template)
}

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The template for the index page. It's executed once with the full
    /// list of posts as its data.
    pub index_template: &'a Template,

    /// The template for post pages. It's executed once per post with that
    /// post as its data.
    pub post_template: &'a Template,

    /// The directory all pages are written into. Post URLs are relative to
    /// this directory.
    pub output_directory: &'a Path,

    /// The file name of the index page within `output_directory`.
    pub index_file_name: &'a str,

    /// The subdirectory of `output_directory` that receives post pages.
    pub post_directory: &'a str,
}

impl Writer<'_> {
    /// Writes the index page followed by every post page.
    pub fn write_all(&self, posts: &[Post]) -> Result<()> {
        self.write_index(posts)?;
        self.write_posts(posts)
    }

    /// Templates the full, ordered list of posts into the index page at
    /// `{output_directory}/{index_file_name}`.
    pub fn write_index(&self, posts: &[Post]) -> Result<()> {
        let path = self.output_directory.join(self.index_file_name);
        write_page(self.index_template, posts_to_value(posts), &path)?;
        tracing::debug!("wrote index of {} posts to {}", posts.len(), path.display());
        Ok(())
    }

    /// Creates the post directory and templates each post into
    /// `{output_directory}/{post.url}`. The post directory must not exist yet.
    pub fn write_posts(&self, posts: &[Post]) -> Result<()> {
        let dir = self.output_directory.join(self.post_directory);
        fs::create_dir(&dir).map_err(|err| Error::CreateDirectory {
            path: dir.clone(),
            err,
        })?;

        let mut seen_urls: HashSet<&str> = HashSet::new();
        for post in posts {
            if !seen_urls.insert(&post.url) {
                tracing::warn!("post `{}` overwrites an earlier post at {}", post.title, post.url);
            }
            let path = self.output_directory.join(&post.url);
            write_page(self.post_template, Value::from(post), &path)?;
            tracing::debug!("wrote post `{}` to {}", post.title, path.display());
        }
        Ok(())
    }
}

/// Executes `template` against `value` and writes the result to `path`. The
/// page is rendered in memory first, so a failed render leaves no file behind.
/// The file is closed before this returns.
fn write_page(template: &Template, value: Value, path: &Path) -> Result<()> {
    let context = Context::from(value).map_err(|e| Error::Template(e.to_string()))?;
    let mut page = Vec::new();
    template
        .execute(&mut page, &context)
        .map_err(|e| Error::Template(format!("rendering '{}': {}", path.display(), e)))?;

    let create_file = |err| Error::CreateFile {
        path: path.to_owned(),
        err,
    };
    let mut file = File::create(path).map_err(create_file)?;
    file.write_all(&page).map_err(create_file)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate { path: PathBuf, message: String },

    /// An error during templating.
    Template(String),

    /// Returned when the post directory can't be created, including when it
    /// already exists.
    CreateDirectory { path: PathBuf, err: io::Error },

    /// Returned for errors creating or writing an output file.
    CreateFile { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { path, message } => {
                write!(f, "Parsing template file '{}': {}", path.display(), message)
            }
            Error::Template(err) => fmt::Display::fmt(err, f),
            Error::CreateDirectory { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::CreateFile { path, err } => {
                write!(f, "Writing file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate { .. } => None,
            Error::Template(_) => None,
            Error::CreateDirectory { path: _, err } => Some(err),
            Error::CreateFile { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    const INDEX: &str =
        "<ul>{{range .}}<li><a href=\"{{.URL}}\">{{.Title}}</a> {{.Date}}</li>{{end}}</ul>";
    const POST: &str = "<h1>{{.Title}}</h1><time>{{.Date}}</time>{{.Content}}";

    fn posts() -> Vec<Post> {
        vec![
            Post {
                title: "Hello".to_owned(),
                date: "2021-01-01".to_owned(),
                url: "posts/hello.html".to_owned(),
                content: "<p>Hi</p>".to_owned(),
            },
            Post {
                title: "Again".to_owned(),
                date: "2021-01-02".to_owned(),
                url: "posts/again.html".to_owned(),
                content: "<p>Bye</p>".to_owned(),
            },
        ]
    }

    fn template(text: &str) -> Template {
        let mut template = Template::default();
        template.parse(text).unwrap();
        template
    }

    fn render(dir: &Path, posts: &[Post]) -> Result<()> {
        let index = template(INDEX);
        let post = template(POST);
        Writer {
            index_template: &index,
            post_template: &post,
            output_directory: dir,
            index_file_name: "index.html",
            post_directory: "posts",
        }
        .write_all(posts)
    }

    #[test]
    fn test_write_all() -> Result<()> {
        let tmp = TempDir::new().unwrap();
        render(tmp.path(), &posts())?;

        assert_eq!(
            fs::read_to_string(tmp.path().join("index.html")).unwrap(),
            "<ul><li><a href=\"posts/hello.html\">Hello</a> 2021-01-01</li>\
             <li><a href=\"posts/again.html\">Again</a> 2021-01-02</li></ul>"
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join("posts/hello.html")).unwrap(),
            "<h1>Hello</h1><time>2021-01-01</time><p>Hi</p>"
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join("posts/again.html")).unwrap(),
            "<h1>Again</h1><time>2021-01-02</time><p>Bye</p>"
        );
        Ok(())
    }

    #[test]
    fn test_rendering_is_deterministic() -> Result<()> {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        render(first.path(), &posts())?;
        render(second.path(), &posts())?;
        for file in &["index.html", "posts/hello.html", "posts/again.html"] {
            assert_eq!(
                fs::read(first.path().join(file)).unwrap(),
                fs::read(second.path().join(file)).unwrap()
            );
        }
        Ok(())
    }

    #[test]
    fn test_no_posts() -> Result<()> {
        let tmp = TempDir::new().unwrap();
        render(tmp.path(), &[])?;
        assert_eq!(
            fs::read_to_string(tmp.path().join("index.html")).unwrap(),
            "<ul></ul>"
        );
        assert!(tmp.path().join("posts").is_dir());
        Ok(())
    }

    #[test]
    fn test_existing_post_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("posts")).unwrap();
        match render(tmp.path(), &posts()) {
            Err(Error::CreateDirectory { path, .. }) => {
                assert_eq!(path, tmp.path().join("posts"))
            }
            other => panic!("wanted CreateDirectory, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_template_file() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.html");
        fs::write(&good, POST).unwrap();
        assert!(parse_template(&good).is_ok());

        let bad = tmp.path().join("bad.html");
        fs::write(&bad, "<h1>{{.Title</h1>").unwrap();
        match parse_template(&bad) {
            Err(Error::ParseTemplate { path, .. }) => assert_eq!(path, bad),
            Err(other) => panic!("wanted ParseTemplate, got {:?}", other),
            Ok(_) => panic!("wanted ParseTemplate, got a template"),
        }

        match parse_template(&tmp.path().join("missing.html")) {
            Err(Error::OpenTemplateFile { .. }) => {}
            Err(other) => panic!("wanted OpenTemplateFile, got {:?}", other),
            Ok(_) => panic!("wanted OpenTemplateFile, got a template"),
        }
    }

    #[test]
    fn test_unknown_field_in_index() {
        let tmp = TempDir::new().unwrap();
        let index = template("{{range .}}{{.Bogus}}{{end}}");
        let post = template(POST);
        let result = Writer {
            index_template: &index,
            post_template: &post,
            output_directory: tmp.path(),
            index_file_name: "index.html",
            post_directory: "posts",
        }
        .write_all(&posts());

        match result {
            Err(Error::Template(message)) => {
                assert!(message.contains("index.html"), "got {}", message)
            }
            other => panic!("wanted Template, got {:?}", other),
        }
        assert!(!tmp.path().join("index.html").exists());
        assert!(!tmp.path().join("posts").exists());
    }

    #[test]
    fn test_unknown_field_in_post() {
        let tmp = TempDir::new().unwrap();
        let index = template(INDEX);
        let post = template("<h1>{{.Bogus}}</h1>");
        let result = Writer {
            index_template: &index,
            post_template: &post,
            output_directory: tmp.path(),
            index_file_name: "index.html",
            post_directory: "posts",
        }
        .write_all(&posts());

        match result {
            Err(Error::Template(_)) => {}
            other => panic!("wanted Template, got {:?}", other),
        }
        assert!(tmp.path().join("index.html").is_file());
        assert!(!tmp.path().join("posts/hello.html").exists());
    }
}
