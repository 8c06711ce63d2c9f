use log::{debug, warn};
use rand::Rng;

use crate::config::CellConfig;
use crate::particle::{Particle, REFERENCE_FRAME_RATE};
use crate::path::CatmullRomPath;

/// The population of cells travelling through the vessel.
///
/// Starts empty and is populated once, when the shared cell model arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    particles: Vec<Particle>,
    speed_scale: f32,
    populated: bool,
}

impl Flow {
    pub fn new(speed_scale: f32) -> Self {
        Self {
            particles: Vec::new(),
            speed_scale,
            populated: false,
        }
    }

    /// Spawns `count` cells. Only the first call has an effect.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
        config: &CellConfig,
        path: &CatmullRomPath,
    ) -> bool {
        if self.populated {
            warn!("cell population already spawned; ignoring repeated request");
            return false;
        }
        self.particles = (0..count)
            .map(|_| Particle::spawn(rng, config, path))
            .collect();
        self.populated = true;
        debug!("spawned {count} cells");
        true
    }

    /// Pure frame step: returns the flow `dt` seconds later.
    pub fn advance(&self, path: &CatmullRomPath, dt: f32) -> Self {
        let frames = dt.max(0.0) * REFERENCE_FRAME_RATE;
        Self {
            particles: self
                .particles
                .iter()
                .map(|particle| particle.advanced(path, frames, self.speed_scale))
                .collect(),
            speed_scale: self.speed_scale,
            populated: self.populated,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::PathConfig;

    fn path() -> CatmullRomPath {
        let config = PathConfig::default();
        CatmullRomPath::new(config.control_points, config.curve_type, config.tension).unwrap()
    }

    #[test]
    fn populates_exactly_once() {
        let path = path();
        let mut rng = StdRng::seed_from_u64(1);
        let mut flow = Flow::new(0.5);
        assert!(flow.is_empty());
        assert!(flow.populate(1001, &mut rng, &CellConfig::default(), &path));
        assert!(!flow.populate(5, &mut rng, &CellConfig::default(), &path));
        assert_eq!(flow.len(), 1001);
    }

    #[test]
    fn advance_is_pure() {
        let path = path();
        let mut rng = StdRng::seed_from_u64(2);
        let mut flow = Flow::new(0.5);
        flow.populate(10, &mut rng, &CellConfig::default(), &path);
        let before = flow.clone();
        let after = flow.advance(&path, 1.0 / 60.0);
        assert_eq!(flow, before);
        assert_ne!(after, before);
        assert_eq!(after.advance(&path, 0.0).particles(), after.particles());
    }

    #[test]
    fn one_reference_frame_matches_per_frame_step() {
        let path = path();
        let mut rng = StdRng::seed_from_u64(4);
        let mut flow = Flow::new(0.5);
        flow.populate(20, &mut rng, &CellConfig::default(), &path);
        let stepped = flow.advance(&path, 1.0 / REFERENCE_FRAME_RATE);
        for (old, new) in flow.particles().iter().zip(stepped.particles()) {
            let expected = old.advanced(&path, 1.0, 0.5);
            assert!((new.progress - expected.progress).abs() < 1e-6);
            assert!(new.position.distance(expected.position) < 1e-5);
        }
    }

    #[test]
    fn empty_flow_advances_to_empty() {
        let flow = Flow::new(0.5);
        assert!(flow.advance(&path(), 1.0).is_empty());
    }
}
