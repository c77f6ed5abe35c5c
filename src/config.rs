// src/config.rs
use crate::error::AppError;
use crate::model::RecordKind;
use crate::types::{AdminToken, ApiKey, ValidatedUrl};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const ENV_ADMIN_URL: &str = "FOLIO_ADMIN_URL";
pub const ENV_API_KEY: &str = "FOLIO_API_KEY";
pub const ENV_ADMIN_TOKEN: &str = "FOLIO_ADMIN_TOKEN";
pub const ENV_STORAGE_URL: &str = "FOLIO_STORAGE_URL";
pub const ENV_STORAGE_BUCKET: &str = "FOLIO_STORAGE_BUCKET";
pub const ENV_STATE_DIR: &str = "FOLIO_STATE_DIR";

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about = "Content tools for the site admin", long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a block document (JSON) to HTML
    Render {
        /// Block array JSON file, `-` for stdin
        input: String,
        /// Resolve videos to embeds instead of editor placeholders
        #[arg(long, default_value_t = false)]
        display: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse HTML into a block document (JSON)
    Parse {
        /// HTML file, `-` for stdin
        input: String,
        /// Editor toolbar the content is meant for
        #[arg(long, default_value = "article")]
        toolbar: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-derive blocks from a stored record's content field
    Normalize {
        /// JSON file holding the stored content value, `-` for stdin
        input: String,
        /// Legacy image URL fields to fold into the document
        #[arg(long = "legacy-image")]
        legacy_images: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload images to storage
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Storage folder for the objects
        #[arg(long, default_value = crate::constants::DEFAULT_UPLOAD_FOLDER)]
        folder: String,
        /// Upload files as-is instead of re-encoding to WebP
        #[arg(long, default_value_t = false)]
        no_optimize: bool,
    },
    /// Import blog posts from a Squarespace/WordPress XML export as drafts
    Import {
        /// Export file
        file: PathBuf,
        /// Collection the posts become
        #[arg(long, value_enum, default_value_t = ImportTarget::News)]
        target: ImportTarget,
        /// List the posts without importing
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Deselect posts by their 1-based row number
        #[arg(long = "skip")]
        skip: Vec<usize>,
    },
    /// Ask the admin API for SEO suggestions for an article form (JSON)
    Suggest {
        input: String,
        #[arg(long, value_enum, default_value_t = SuggestField::Tags)]
        field: SuggestField,
    },
    /// Manage autosaved article drafts in the local state directory
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum DraftAction {
    /// Save an article form (JSON) as the draft of a record
    Save {
        /// Article form JSON file, `-` for stdin
        input: String,
        /// Record the draft belongs to; omit for a new article
        #[arg(long)]
        record: Option<String>,
    },
    /// Print a saved draft with its `savedAt` time
    Show {
        #[arg(long)]
        record: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a saved draft
    Discard {
        #[arg(long)]
        record: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    News,
    Articles,
}

impl From<ImportTarget> for RecordKind {
    fn from(target: ImportTarget) -> Self {
        match target {
            ImportTarget::News => RecordKind::News,
            ImportTarget::Articles => RecordKind::Article,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestField {
    Tags,
    Description,
    ReadTime,
}

/// Direct object-storage target.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: ValidatedUrl,
    pub bucket: String,
}

/// Resolved connection settings for the admin API and storage.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base of the admin functions, e.g. `https://x.example/functions/v1/admin`
    pub admin_url: ValidatedUrl,
    pub api_key: ApiKey,
    pub admin_token: AdminToken,
    /// Without storage settings uploads go straight to the admin endpoint.
    pub storage: Option<StorageConfig>,
}

impl AdminConfig {
    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its value.
    pub fn resolve<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    AppError::MissingConfiguration(format!(
                        "{} environment variable not set",
                        name
                    ))
                })
        };

        let admin_url = ValidatedUrl::parse(&required(ENV_ADMIN_URL)?)?;
        let api_key = ApiKey::new(required(ENV_API_KEY)?)?;
        let admin_token = AdminToken::new(required(ENV_ADMIN_TOKEN)?)?;

        let storage = match (
            lookup(ENV_STORAGE_URL).filter(|v| !v.trim().is_empty()),
            lookup(ENV_STORAGE_BUCKET).filter(|v| !v.trim().is_empty()),
        ) {
            (Some(url), Some(bucket)) => Some(StorageConfig {
                url: ValidatedUrl::parse(&url)?,
                bucket: bucket.trim().trim_matches('/').to_string(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(AppError::MissingConfiguration(format!(
                    "{} is set but {} is not",
                    ENV_STORAGE_URL, ENV_STORAGE_BUCKET
                )))
            }
            (None, Some(_)) => {
                return Err(AppError::MissingConfiguration(format!(
                    "{} is set but {} is not",
                    ENV_STORAGE_BUCKET, ENV_STORAGE_URL
                )))
            }
        };

        Ok(Self {
            admin_url,
            api_key,
            admin_token,
            storage,
        })
    }
}

/// Draft directory: `drafts` under the local state directory.
pub fn draft_dir_from_env() -> PathBuf {
    state_dir(&|name: &str| std::env::var(name).ok()).join("drafts")
}

/// Local state directory, from `FOLIO_STATE_DIR` or the platform default.
pub fn state_dir<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_STATE_DIR)
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            crate::store::DraftStore::default_dir()
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("folio"))
        })
}
