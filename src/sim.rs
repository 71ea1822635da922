//! Bolt population and the per-tick branching walk.

use crate::bolt::Bolt;
use crate::buffer::IntensityBuffer;
use crate::config::LightningConfig;
use crate::error::LightningError;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// What one `advance` pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Branches born during the pass. They join after it and first move next tick.
    pub branched: usize,
    /// Bolts that reached the bottom row and were removed.
    pub grounded: usize,
}

pub struct BoltSimulator {
    width: i32,
    height: i32,
    config: LightningConfig,
    bolts: Vec<Bolt>,
    rng: StdRng,
}

impl BoltSimulator {
    pub fn new(
        width: usize,
        height: usize,
        config: LightningConfig,
    ) -> Result<Self, LightningError> {
        Self::with_rng(width, height, config, StdRng::from_entropy())
    }

    /// Reproducible simulator: the same seed and config give the same storm.
    pub fn with_seed(
        width: usize,
        height: usize,
        config: LightningConfig,
        seed: u64,
    ) -> Result<Self, LightningError> {
        Self::with_rng(width, height, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        width: usize,
        height: usize,
        config: LightningConfig,
        rng: StdRng,
    ) -> Result<Self, LightningError> {
        if width == 0 || height == 0 {
            return Err(LightningError::invalid(format!(
                "simulator dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(LightningError::invalid(format!(
                "simulator dimensions {width}x{height} are too large"
            )));
        };
        config.validate()?;
        Ok(Self {
            width: w,
            height: h,
            config,
            bolts: Vec::with_capacity(config.max_active),
            rng,
        })
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn config(&self) -> &LightningConfig {
        &self.config
    }

    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    pub fn len(&self) -> usize {
        self.bolts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bolts.is_empty()
    }

    pub fn clear(&mut self) {
        self.bolts.clear();
    }

    /// Roll for a new root strike. Returns whether one was created.
    pub fn maybe_spawn(&mut self) -> bool {
        if self.bolts.len() >= self.config.max_active {
            return false;
        }
        if !self.rng.gen_bool(self.config.spawn_chance) {
            return false;
        }
        self.push_root();
        true
    }

    /// Force a root strike, still honouring the population cap.
    pub fn spawn_root(&mut self) -> bool {
        if self.bolts.len() >= self.config.max_active {
            return false;
        }
        self.push_root();
        true
    }

    fn push_root(&mut self) {
        let bolt = Bolt::root(self.width, &self.config, &mut self.rng);
        log::debug!("strike at column {} ({} active)", bolt.x(), self.bolts.len() + 1);
        self.bolts.push(bolt);
    }

    /// Chance that a bolt at `depth` forks while sitting on row `y`.
    pub fn branch_chance(&self, depth: u32, y: i32) -> f64 {
        branch_chance(&self.config, self.height, depth, y)
    }

    /// Drop every bolt `sub_steps_per_tick` rows, burning its trail into `buffer`.
    pub fn advance(&mut self, buffer: &mut IntensityBuffer) -> AdvanceReport {
        let Self {
            width,
            height,
            config,
            bolts,
            rng,
        } = self;
        let (width, height) = (*width, *height);

        let live = bolts.len();
        let mut born: Vec<Bolt> = Vec::new();

        for bolt in bolts.iter_mut() {
            for _ in 0..config.sub_steps_per_tick {
                buffer.set_max(bolt.x(), bolt.y(), bolt.brightness());
                if bolt.y() >= height {
                    break;
                }

                let p = branch_chance(config, height, bolt.depth(), bolt.y());
                if rng.gen_bool(p) && live + born.len() < config.max_active {
                    log::trace!(
                        "branch at ({}, {}) depth {}",
                        bolt.x(),
                        bolt.y(),
                        bolt.depth() + 1
                    );
                    born.push(bolt.branch());
                }

                bolt.step(width, config, rng);
            }
        }

        let before = bolts.len();
        bolts.retain(|b| b.y() < height);
        let grounded = before - bolts.len();
        if grounded > 0 {
            log::debug!("{grounded} bolt(s) grounded");
        }

        let branched = born.len();
        bolts.append(&mut born);

        AdvanceReport { branched, grounded }
    }
}

fn branch_chance(cfg: &LightningConfig, height: i32, depth: u32, y: i32) -> f64 {
    let fall = 1.0 - y as f64 / height as f64;
    let p = cfg.branch_base * (-cfg.branch_depth_decay * depth as f64).exp() * fall;
    p.max(cfg.branch_min_chance).clamp(0.0, 1.0)
}
