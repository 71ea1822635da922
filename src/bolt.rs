use crate::config::LightningConfig;
use rand::Rng;

/// Horizontal bias held for the length of one segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drift {
    Left,
    Straight,
    Right,
}

impl Drift {
    pub const ALL: [Drift; 3] = [Drift::Left, Drift::Straight, Drift::Right];

    pub fn offset(self) -> i32 {
        match self {
            Drift::Left => -1,
            Drift::Straight => 0,
            Drift::Right => 1,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Every field a new bolt starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoltSeed {
    pub x: i32,
    pub y: i32,
    pub depth: u32,
    pub segment_remaining: u32,
    pub drift: Drift,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bolt {
    x: i32,
    y: i32,
    depth: u32,
    segment_remaining: u32,
    drift: Drift,
}

impl Bolt {
    pub fn new(seed: BoltSeed) -> Self {
        Self {
            x: seed.x,
            y: seed.y,
            depth: seed.depth,
            segment_remaining: seed.segment_remaining.max(1),
            drift: seed.drift,
        }
    }

    /// Fresh strike at the top row of a `width`-wide field.
    pub fn root<R: Rng + ?Sized>(width: i32, cfg: &LightningConfig, rng: &mut R) -> Self {
        Self::new(BoltSeed {
            x: rng.gen_range(0..width),
            y: 0,
            depth: 0,
            segment_remaining: cfg.segment_length.sample(rng),
            drift: Drift::random(rng),
        })
    }

    /// A branch forking off at this bolt's current position, one generation deeper.
    pub fn branch(&self) -> Self {
        Self::new(BoltSeed {
            x: self.x,
            y: self.y,
            depth: self.depth + 1,
            segment_remaining: self.segment_remaining,
            drift: self.drift,
        })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn segment_remaining(&self) -> u32 {
        self.segment_remaining
    }

    pub fn drift(&self) -> Drift {
        self.drift
    }

    /// Light deposited at each row; roots burn brightest.
    pub fn brightness(&self) -> f32 {
        1.0 / (self.depth as f32 + 1.0)
    }

    /// Kink, drift, roll the segment, then drop one row.
    pub(crate) fn step<R: Rng + ?Sized>(&mut self, width: i32, cfg: &LightningConfig, rng: &mut R) {
        if rng.gen_bool(cfg.kink_chance) {
            let k = i32::try_from(cfg.max_kink).unwrap_or(i32::MAX);
            self.x = self.x.saturating_add(rng.gen_range(-k..=k));
        }
        self.x = self.x.saturating_add(self.drift.offset()).clamp(0, width - 1);

        self.segment_remaining = self.segment_remaining.saturating_sub(1);
        if self.segment_remaining == 0 {
            self.segment_remaining = cfg.segment_length.sample(rng);
            self.drift = Drift::random(rng);
        }

        self.y += 1;
    }
}
