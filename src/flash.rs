/// Whole-frame white flash that fades linearly after a strike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flash {
    opacity: f32,
    strength: f32,
    fade: f32,
}

impl Flash {
    pub fn new(strength: f32, fade: f32) -> Self {
        Self {
            opacity: 0.0,
            strength: strength.clamp(0.0, 1.0),
            fade: fade.max(0.0),
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn trigger(&mut self) {
        self.opacity = self.opacity.max(self.strength);
    }

    pub fn fade(&mut self) {
        self.opacity = (self.opacity - self.fade).max(0.0);
    }

    pub fn reset(&mut self) {
        self.opacity = 0.0;
    }

    /// Blend white over the RGB channels of an RGBA image.
    pub fn apply(&self, rgba: &mut [u8]) {
        if self.opacity <= 0.0 {
            return;
        }
        let a = self.opacity;
        for px in rgba.chunks_exact_mut(4) {
            for c in &mut px[..3] {
                let v = *c as f32;
                *c = (v + (255.0 - v) * a).round().min(255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_to_zero_and_stays_there() {
        let mut f = Flash::new(0.3, 0.1);
        f.trigger();
        assert_eq!(f.opacity(), 0.3);
        for _ in 0..5 {
            f.fade();
        }
        assert_eq!(f.opacity(), 0.0);
    }

    #[test]
    fn blends_toward_white() {
        let mut f = Flash::new(0.5, 0.1);
        let mut img = vec![0, 100, 255, 255];
        f.apply(&mut img);
        assert_eq!(img, vec![0, 100, 255, 255]);

        f.trigger();
        f.apply(&mut img);
        assert_eq!(img, vec![128, 178, 255, 255]);
    }

    #[test]
    fn zero_strength_never_shows() {
        let mut f = Flash::new(0.0, 0.1);
        f.trigger();
        assert_eq!(f.opacity(), 0.0);
    }
}
