use std::borrow::Cow;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::report::{DEFAULT_INDENT, DEFAULT_TITLE, ReportStyle};

pub const CONFIG_FILE_NAME: &str = "acorn.yaml";

const MAX_INDENT: i64 = 16;

/// Settings read from the `listing` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    pub title: String,
    pub indent: usize,
    pub workers: Option<NonZeroUsize>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            indent: DEFAULT_INDENT,
            workers: None,
        }
    }
}

impl ListingConfig {
    /// Reads the configuration at `path`, falling back to defaults when the file does not exist.
    pub async fn read(path: &Path) -> Result<Self, ListingConfigError> {
        debug!("Opening config file: {}", path.display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.to_path_buf(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.to_path_buf(),
        })?;
        contents.as_str().try_into()
    }

    pub fn report_style(&self, color: bool) -> ReportStyle {
        ReportStyle {
            title: self.title.clone(),
            indent: self.indent,
            color,
        }
    }

    fn apply_listing_section(
        &mut self,
        listing: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), ListingConfigError> {
        for (key, value) in listing {
            match key.as_str() {
                Some("title") => {
                    self.title = value
                        .as_str()
                        .ok_or(ListingConfigError::InvalidTitle)?
                        .to_string();
                }
                Some("indent") => {
                    self.indent = value
                        .as_integer()
                        .filter(|indent| (1..=MAX_INDENT).contains(indent))
                        .and_then(|indent| usize::try_from(indent).ok())
                        .ok_or(ListingConfigError::InvalidIndent)?;
                }
                Some("workers") => {
                    let workers = value
                        .as_integer()
                        .and_then(|workers| usize::try_from(workers).ok())
                        .and_then(NonZeroUsize::new)
                        .ok_or(ListingConfigError::InvalidWorkers)?;
                    self.workers = Some(workers);
                }
                _ => debug!("Skipping unknown listing setting: {:?}", key),
            }
        }
        Ok(())
    }
}

impl TryFrom<&str> for ListingConfig {
    type Error = ListingConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents)
            .map_err(|e| ListingConfigError::ParseError { source: e })?;
        let contents = contents_vec
            .first()
            .ok_or(ListingConfigError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(ListingConfigError::TopLevelNotMap)?;

        let mut config = Self::default();
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed("listing")))) {
            Some(listing) => {
                let listing = listing
                    .as_mapping()
                    .ok_or(ListingConfigError::ListingNotMap)?;
                config.apply_listing_section(listing)?;
            }
            None => debug!("Config has no listing section, using defaults"),
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ListingConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path.display()))]
    ReadError {
        file_path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path.display()))]
    EncodingError {
        file_path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Listing section should be a map"))]
    ListingNotMap,
    #[snafu(display("Listing title should be a string"))]
    InvalidTitle,
    #[snafu(display("Listing indent should be an integer between 1 and {}", MAX_INDENT))]
    InvalidIndent,
    #[snafu(display("Listing workers should be a positive integer"))]
    InvalidWorkers,
}
