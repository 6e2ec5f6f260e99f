//! Per-tick batch orchestration over the house corpus.
//!
//! Each tick processes exactly one house: clear the previous scene state,
//! load the house and its camera poses, render every camera through every
//! configured buffer spec, and advance. Once the index passes the corpus the
//! batch is done; completion is announced exactly once and further ticks are
//! no-ops.
//!
//! Per-house failure policy: a house that fails to load or render (including
//! a malformed camera-pose file) is logged and skipped, and the batch
//! continues with the next house. A corpus of thousands of houses must not
//! abort over one bad entry.

use crate::{
    camera::{self, CameraPose},
    config::{ConfigError, ExportConfig},
    context::Context,
    house::House,
    render::{self, BufferSpec},
    scene::{self, Scene},
};

/// Seam between the orchestrator state machine and the GPU-backed exporter.
pub trait HouseExporter {
    fn export_house(&mut self, house_id: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Working,
    Done,
}

/// The corpus iterator. Holds no GPU state of its own.
#[derive(Debug)]
pub struct Batch {
    houses: Vec<String>,
    index: usize,
    finished: bool,
}

impl Batch {
    pub fn new(houses: Vec<String>) -> Self {
        Self {
            houses,
            index: 0,
            finished: false,
        }
    }

    /// Process the next house, or report completion. The completion notice
    /// is emitted exactly once no matter how many further ticks occur.
    pub fn tick(&mut self, exporter: &mut impl HouseExporter) -> BatchStatus {
        if self.index >= self.houses.len() {
            if !self.finished {
                log::info!("export complete");
                self.finished = true;
            }
            return BatchStatus::Done;
        }

        let house_id = &self.houses[self.index];
        if let Err(e) = exporter.export_house(house_id) {
            log::error!("house {house_id} failed: {e:#}; skipping");
        }
        self.index += 1;
        log::info!("House {}/{}", self.index, self.houses.len());
        BatchStatus::Working
    }
}

/// The GPU-backed exporter: owns the context and the per-house scene arena.
pub struct Exporter {
    ctx: Context,
    config: ExportConfig,
    specs: Vec<BufferSpec>,
    generation: u64,
    scene: Option<Scene>,
    cameras: Vec<CameraPose>,
}

impl Exporter {
    /// Resolve the configured buffer catalog up front; unknown ids are fatal
    /// before any house is touched.
    pub fn new(ctx: Context, config: ExportConfig) -> Result<Self, ConfigError> {
        let specs = render::resolve_buffer_specs(&config)?;
        Ok(Self {
            ctx,
            config,
            specs,
            generation: 0,
            scene: None,
            cameras: Vec::new(),
        })
    }

    /// Drop every runtime object of the previous iteration — scene instances
    /// and cameras — before the next house loads.
    fn clear_scene(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            log::debug!(
                "clearing {} instances of generation {}",
                scene.len(),
                scene.generation()
            );
            scene.clear();
        }
        self.cameras.clear();
        self.generation += 1;
    }
}

impl HouseExporter for Exporter {
    fn export_house(&mut self, house_id: &str) -> anyhow::Result<()> {
        self.clear_scene();

        let house = House::load_from_json(&self.config.house_json_path(house_id))?;
        let placements = scene::assemble(&house, &self.config);
        let scene = scene::upload(
            &self.ctx,
            &self.config,
            house_id,
            placements,
            self.generation,
        )?;
        let cameras = camera::load_camera_poses(&self.config.camera_path(house_id))?;

        render::render_house(&mut self.ctx, &self.config, &scene, &cameras, &self.specs)?;

        // Kept until the next tick clears them, mirroring one-house-at-a-time
        // resource residency.
        self.scene = Some(scene);
        self.cameras = cameras;
        Ok(())
    }
}
