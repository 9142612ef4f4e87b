//! The library code for the `orgpress` static site generator. A build is a
//! straight pipeline, driven by [`build::build_site`]:
//!
//! 1. Loading the site configuration from `config.yml` ([`crate::config`])
//! 2. Parsing posts from markup source files on disk ([`crate::parser`]),
//!    converting each body to HTML ([`crate::markup`])
//! 3. Emptying the output directory ([`crate::output`])
//! 4. Rendering the index page and one page per post through Go-style
//!    templates ([`crate::write`])
//! 5. Copying the static assets into the output directory
//!    ([`crate::output`])
//!
//! Every step stops at its first error; nothing is retried and nothing is
//! skipped.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod markup;
pub mod output;
pub mod parser;
pub mod post;
pub mod value;
pub mod write;
