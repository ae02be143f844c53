use std::io;
use std::rc::Rc;

use snafu::Snafu;
use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::config::{ListingConfig, ListingConfigError};
use crate::disk::{LocalDisk, LocalDiskCreationError};
use crate::gather::{self, ListingRunError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let config = ListingConfig::read(&app_config.config_path)
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        let workers = app_config.workers.or(config.workers);
        let disk = Rc::new(LocalDisk::new(workers).context(DiskCreationSnafu)?);
        let style = config.report_style(supports_color::on(Stream::Stdout).is_some());

        let summary = gather::start(disk, app_config.root.clone(), style, io::stdout())
            .await
            .context(ListingCanceledSnafu)?
            .context(ListingSnafu)?;

        info!(
            "Content listing of {} finished: {} directories, {} files, {} failed listings",
            app_config.root.display(),
            summary.directories,
            summary.files,
            summary.failures
        );

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ListingConfigError },
    #[snafu(display("Critical failure encountered while preparing the disk"))]
    DiskCreationError { source: LocalDiskCreationError },
    #[snafu(display("Content listing was dropped before it finished"))]
    ListingCanceledError {
        source: futures_channel::oneshot::Canceled,
    },
    #[snafu(display("Critical failure encountered while writing the content listing"))]
    ListingError { source: ListingRunError },
}
