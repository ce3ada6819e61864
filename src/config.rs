//! Layered configuration for the renderer and serializer.
//!
//! `defaults/roundtrip.default.toml` is embedded so library defaults and the
//! documented file stay in sync. Callers layer their own files or overrides on
//! top through [`Loader`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use pulldown_cmark::Options;
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

const DEFAULT_TOML: &str = include_str!("../defaults/roundtrip.default.toml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderOptions,
    pub serializer: SerializerOptions,
}

/// Markdown extensions enabled in [`crate::markup::CmarkRenderer`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
    /// Turn raw HTML into elements. When off, HTML is dropped.
    pub html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: true,
            html: true,
        }
    }
}

impl RenderOptions {
    pub fn parser_options(&self) -> Options {
        let mut opts = Options::empty();
        opts.set(Options::ENABLE_TABLES, self.tables);
        opts.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        opts.set(Options::ENABLE_TASKLISTS, self.tasklists);
        opts.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        opts
    }
}

/// Fallback formatting used when a node has no source to sniff from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    pub bullet: char,
    pub ordered_delimiter: char,
    pub tight_lists: bool,
    pub preserve_unchanged: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        SerializerOptions {
            bullet: '*',
            ordered_delimiter: '.',
            tight_lists: true,
            preserve_unchanged: true,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file. A missing file is an error at `build()`.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file that may be absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer TOML text, e.g. a document's front matter settings.
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<Settings> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<Settings> {
    Loader::new().build()
}
