//! Procedural lightning: branching random-walk bolts burned into a fading
//! intensity buffer.
//!
//! Per tick the driver fades the buffer, rolls for a new strike, advances
//! every bolt and reads the frame back out:
//!
//! ```
//! use boltfall::{BoltSimulator, IntensityBuffer, LightningConfig};
//!
//! let cfg = LightningConfig::classic();
//! let mut buffer = IntensityBuffer::new(64, 48)?;
//! let mut sim = BoltSimulator::with_seed(64, 48, cfg, 7)?;
//! for _ in 0..30 {
//!     buffer.decay(cfg.decay);
//!     sim.maybe_spawn();
//!     sim.advance(&mut buffer);
//! }
//! assert_eq!(buffer.to_image().len(), 64 * 48 * 4);
//! # Ok::<(), boltfall::LightningError>(())
//! ```

pub mod bolt;
pub mod buffer;
pub mod config;
pub mod error;
pub mod flash;
pub mod sim;
pub mod storm;

pub use bolt::{Bolt, BoltSeed, Drift};
pub use buffer::IntensityBuffer;
pub use config::{LightningConfig, SegmentRange};
pub use error::LightningError;
pub use flash::Flash;
pub use sim::{AdvanceReport, BoltSimulator};
pub use storm::{Storm, TickReport};
