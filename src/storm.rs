//! One buffer, one simulator and one flash, ticked in a fixed order.

use crate::buffer::IntensityBuffer;
use crate::config::LightningConfig;
use crate::error::LightningError;
use crate::flash::Flash;
use crate::sim::{AdvanceReport, BoltSimulator};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub struck: bool,
    pub branched: usize,
    pub grounded: usize,
    pub active: usize,
}

pub struct Storm {
    buffer: IntensityBuffer,
    sim: BoltSimulator,
    flash: Flash,
    ticks: u64,
}

impl Storm {
    pub fn new(
        width: usize,
        height: usize,
        config: LightningConfig,
    ) -> Result<Self, LightningError> {
        let sim = BoltSimulator::new(width, height, config)?;
        Self::assemble(sim)
    }

    pub fn with_seed(
        width: usize,
        height: usize,
        config: LightningConfig,
        seed: u64,
    ) -> Result<Self, LightningError> {
        let sim = BoltSimulator::with_seed(width, height, config, seed)?;
        Self::assemble(sim)
    }

    fn assemble(sim: BoltSimulator) -> Result<Self, LightningError> {
        let buffer = IntensityBuffer::new(sim.width(), sim.height())?;
        let cfg = sim.config();
        let flash = Flash::new(cfg.flash_strength, cfg.flash_fade);
        Ok(Self {
            buffer,
            sim,
            flash,
            ticks: 0,
        })
    }

    pub fn buffer(&self) -> &IntensityBuffer {
        &self.buffer
    }

    /// Point-set access for scene decorations drawn between ticks.
    pub fn buffer_mut(&mut self) -> &mut IntensityBuffer {
        &mut self.buffer
    }

    pub fn simulator(&self) -> &BoltSimulator {
        &self.sim
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fade, maybe strike, advance every bolt.
    pub fn tick(&mut self) -> TickReport {
        self.flash.fade();
        self.buffer.decay(self.sim.config().decay);
        let struck = self.sim.maybe_spawn();
        let report = self.sim.advance(&mut self.buffer);
        self.finish_tick(struck, report)
    }

    /// Tick with a forced strike in place of the spawn roll.
    pub fn strike(&mut self) -> TickReport {
        self.flash.fade();
        self.buffer.decay(self.sim.config().decay);
        let struck = self.sim.spawn_root();
        let report = self.sim.advance(&mut self.buffer);
        self.finish_tick(struck, report)
    }

    fn finish_tick(&mut self, struck: bool, report: AdvanceReport) -> TickReport {
        if struck || report.grounded > 0 {
            self.flash.trigger();
        }
        self.ticks += 1;
        TickReport {
            struck,
            branched: report.branched,
            grounded: report.grounded,
            active: self.sim.len(),
        }
    }

    /// Current frame as RGBA bytes, flash included.
    pub fn frame(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_frame(&mut out);
        out
    }

    pub fn write_frame(&self, out: &mut Vec<u8>) {
        self.buffer.write_image(out);
        self.flash.apply(out);
    }

    /// Dark sky, no bolts, no flash.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sim.clear();
        self.flash.reset();
    }
}
