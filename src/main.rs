// Entrypoint for the uploader.
// - Keeps `main` small: build the config and API client, hand them to the
//   walker and report the summary.
// - Returns `anyhow::Result`; an aborted or failed run exits with status 1.

use clap::Parser;
use disk_image_uploader::api::DiskClient;
use disk_image_uploader::config::{Cli, Config};
use disk_image_uploader::store::ProgressStore;
use disk_image_uploader::ui::{file_progress, init_logging};
use disk_image_uploader::walker::{Job, Uploader};

fn main() -> anyhow::Result<()> {
    let progress = file_progress(0);
    init_logging(&progress)?;

    let config = Config::from_cli(Cli::parse())?;
    let api = DiskClient::new(&config.api_url, &config.token)?;
    let store = ProgressStore::new(&config.output, config.retry);
    let job = Job {
        root: config.root.clone(),
        remote_base: config.remote_base.clone(),
        extensions: config.extensions.clone(),
        name_filter: config.name_filter.clone(),
    };

    let mut uploader = Uploader::new(&api, config.retry, store, config.on_failure)
        .with_progress(progress);
    let summary = uploader.run(&job)?;

    log::info!(
        "done: {} uploaded, {} already present, {} failed; links saved in {}",
        summary.uploaded,
        summary.already_uploaded,
        summary.failed,
        config.output.display()
    );
    Ok(())
}
