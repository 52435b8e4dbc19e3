use std::{
    io,
    path::{Path, PathBuf},
    str::{self, Utf8Error},
};

use base64::{Engine, prelude::BASE64_STANDARD};
use displaydoc::Display;
use thiserror::Error;
use tracing::{debug, info};

use crate::{NodeTable, Story, TableError};

pub const STORY_BUNDLE_EXTENSION: &str = "storybundle";

/// Key present only in nested story documents.
const ROOT_NODE_KEY: &str = "rootNode";

#[derive(Debug, Error, Display)]
pub enum DocumentError {
    /// Failed to read story document {path:?}
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Story document {path:?} is not valid UTF-8
    Utf8 {
        path: PathBuf,
        #[source]
        source: Utf8Error,
    },
    /// Story bundle {path:?} is not valid base64
    Base64 {
        path: PathBuf,
        #[source]
        source: base64::DecodeError,
    },
    /// Failed to parse JSON story document {path:?}
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Failed to parse TOML story document {path:?}
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Unsupported story document format {path:?}, expected .json, .toml or .storybundle
    UnsupportedFormat { path: PathBuf },
    /// Node table is inconsistent
    Table(#[from] TableError),
    /// Failed to encode story as JSON
    Encode(#[source] serde_json::Error),
    /// Failed to encode story as TOML
    EncodeToml(#[source] toml::ser::Error),
    /// Failed to write story document {path:?}
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A story on disk: either nested from the root node down, or a flat
/// node table.
#[derive(Debug, Clone)]
pub enum StoryDocument {
    Nested(Story),
    Table(NodeTable),
}

impl StoryDocument {
    pub fn into_story(self) -> Result<Story, TableError> {
        match self {
            StoryDocument::Nested(story) => Ok(story),
            StoryDocument::Table(table) => table.to_story(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
    /// Base64 of the nested JSON document.
    Bundle,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            STORY_BUNDLE_EXTENSION => Some(Format::Bundle),
            _ => None,
        }
    }
}

impl StoryDocument {
    /// Parse document bytes, picking the format from the file extension.
    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Self, DocumentError> {
        match Format::of(path) {
            Some(Format::Json) => parse_json(path, bytes),
            Some(Format::Toml) => {
                let code = str::from_utf8(bytes).map_err(|source| DocumentError::Utf8 {
                    path: path.to_path_buf(),
                    source,
                })?;
                parse_toml(path, code)
            }
            Some(Format::Bundle) => {
                let json = BASE64_STANDARD
                    .decode(bytes.trim_ascii())
                    .map_err(|source| DocumentError::Base64 {
                        path: path.to_path_buf(),
                        source,
                    })?;
                let story = serde_json::from_slice(&json).map_err(|source| DocumentError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(StoryDocument::Nested(story))
            }
            None => Err(DocumentError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn parse_json(path: &Path, bytes: &[u8]) -> Result<StoryDocument, DocumentError> {
    let json_error = |source: serde_json::Error| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    };
    let shape: serde_json::Value = serde_json::from_slice(bytes).map_err(json_error)?;
    if shape.get(ROOT_NODE_KEY).is_some() {
        serde_json::from_slice(bytes)
            .map(StoryDocument::Nested)
            .map_err(json_error)
    } else {
        serde_json::from_slice(bytes)
            .map(StoryDocument::Table)
            .map_err(json_error)
    }
}

fn parse_toml(path: &Path, code: &str) -> Result<StoryDocument, DocumentError> {
    let toml_error = |source: toml::de::Error| DocumentError::Toml {
        path: path.to_path_buf(),
        source,
    };
    let shape: toml::Table = toml::from_str(code).map_err(toml_error)?;
    if shape.contains_key(ROOT_NODE_KEY) {
        toml::from_str(code).map(StoryDocument::Nested).map_err(toml_error)
    } else {
        toml::from_str(code).map(StoryDocument::Table).map_err(toml_error)
    }
}

impl Story {
    /// Read a story document: JSON, TOML or a `.storybundle`, by extension.
    #[tracing::instrument]
    pub async fn load(path: &Path) -> Result<Story, DocumentError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DocumentError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let document = StoryDocument::parse(path, &bytes)?;
        debug!(
            table = matches!(document, StoryDocument::Table(_)),
            "parsed story document"
        );
        let story = document.into_story()?;
        info!(story = %story.id, title = story.title_or_untitled(), "loaded story");
        Ok(story)
    }

    /// Write the story nested, in the format named by the extension.
    pub async fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let bytes = match Format::of(path) {
            Some(Format::Json) => serde_json::to_vec_pretty(self).map_err(DocumentError::Encode)?,
            Some(Format::Toml) => toml::to_string_pretty(self)
                .map_err(DocumentError::EncodeToml)?
                .into_bytes(),
            Some(Format::Bundle) => {
                let json = serde_json::to_vec(self).map_err(DocumentError::Encode)?;
                BASE64_STANDARD.encode(json).into_bytes()
            }
            None => {
                return Err(DocumentError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| DocumentError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// File name a shared story is offered under.
    pub fn bundle_file_name(&self) -> String {
        format!("{}.{STORY_BUNDLE_EXTENSION}", self.title_or_untitled())
    }
}
