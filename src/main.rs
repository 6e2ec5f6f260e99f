use std::path::Path;

use suncg_export::{
    batch::{Batch, BatchStatus, Exporter},
    config::ExportConfig,
    context::Context,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "export_config.json".to_string());
    let config = ExportConfig::load(Path::new(&config_path))?;
    log::info!(
        "exporting {} houses x {} buffers at {}x{}",
        config.houses.len(),
        config.buffer_ids.len(),
        config.export_dim,
        config.export_dim
    );

    let ctx = pollster::block_on(Context::new())?;
    let mut exporter = Exporter::new(ctx, config.clone())?;
    let mut batch = Batch::new(config.houses.clone());

    while batch.tick(&mut exporter) == BatchStatus::Working {}

    Ok(())
}
