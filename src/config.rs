//! Loads the site configuration from `config.yml`.

use crate::markup::Markup;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.yml";

/// The on-disk schema. Absent fields deserialize to empty strings.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct Project {
    content: String,
    output: String,
    template: Templates,
    output_post: String,
    #[serde(rename = "static")]
    static_directory: String,
    markup: Markup,
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct Templates {
    directory: String,
    index: String,
    post: String,
}

/// The site configuration. Every relative path is resolved against
/// `base_directory`, the directory the configuration file was loaded from.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_directory: PathBuf,
    pub content_directory: PathBuf,
    pub output_directory: PathBuf,
    pub template_directory: PathBuf,

    /// File name of the index template. The rendered index page is written
    /// under the same name in the output directory.
    pub index_template_name: String,
    pub post_template_name: String,

    /// Subdirectory of the output directory that receives post pages. Also
    /// the prefix of every post URL.
    pub output_post_directory: String,

    /// The static assets directory as configured. It's resolved against the
    /// base directory for reading and against the output directory for
    /// writing.
    pub static_directory: String,
    pub markup: Markup,
}

impl Config {
    /// Loads `config.yml` from `dir`.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        Config::from_project_file(&dir.join(CONFIG_FILE))
    }

    /// Loads the configuration file at `path`. Relative paths in the file are
    /// resolved against the file's parent directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "config")?)
            .with_context(|| format!("Parsing config file `{}`", path.display()))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided config file path '{:?}'",
                path
            )),
            Some(base_directory) => Config::from_project(base_directory, project)
                .with_context(|| format!("Loading config file `{}`", path.display())),
        }
    }

    /// Parses configuration YAML directly; relative paths resolve against
    /// `base_directory`.
    pub fn from_yaml(base_directory: &Path, yaml: &str) -> Result<Config> {
        Config::from_project(base_directory, serde_yaml::from_str(yaml)?)
    }

    fn from_project(base_directory: &Path, project: Project) -> Result<Config> {
        for (field, value) in &[
            ("output", &project.output),
            ("output_post", &project.output_post),
            ("template.index", &project.template.index),
            ("template.post", &project.template.post),
            ("static", &project.static_directory),
        ] {
            if value.is_empty() {
                return Err(anyhow!("Missing or empty field `{}`", field));
            }
        }

        Ok(Config {
            base_directory: base_directory.to_owned(),
            content_directory: base_directory.join(&project.content),
            output_directory: base_directory.join(&project.output),
            template_directory: base_directory.join(&project.template.directory),
            index_template_name: project.template.index,
            post_template_name: project.template.post,
            output_post_directory: project.output_post,
            static_directory: project.static_directory,
            markup: project.markup,
        })
    }

    pub fn index_template(&self) -> PathBuf {
        self.template_directory.join(&self.index_template_name)
    }

    pub fn post_template(&self) -> PathBuf {
        self.template_directory.join(&self.post_template_name)
    }

    /// Where the rendered index page goes: `{output}/{template.index}`.
    pub fn index_output_file(&self) -> PathBuf {
        self.output_directory.join(&self.index_template_name)
    }

    pub fn post_output_directory(&self) -> PathBuf {
        self.output_directory.join(&self.output_post_directory)
    }

    pub fn static_source_directory(&self) -> PathBuf {
        self.base_directory.join(&self.static_directory)
    }

    pub fn static_output_directory(&self) -> PathBuf {
        self.output_directory.join(&self.static_directory)
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}
