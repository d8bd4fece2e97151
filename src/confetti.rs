//! One-shot confetti burst shown after a correct answer.
//!
//! The particle simulation is plain data stepped by elapsed milliseconds; the
//! DOM side owns the canvas and drives [`Confetti::step`] from
//! `requestAnimationFrame` until [`Confetti::is_finished`].

use rand::Rng;
use web_sys::CanvasRenderingContext2d;

use crate::error::Result;

const COLORS: [&str; 6] = [
    "#f94144", "#f8961e", "#f9c74f", "#90be6d", "#43aa8b", "#577590",
];
/// Downward acceleration in px/ms².
const GRAVITY: f64 = 0.0009;
/// Fraction of horizontal speed kept per ms.
const DRAG: f64 = 0.999;
const LIFETIME_MS: f64 = 3_200.0;

#[derive(Clone, Debug, PartialEq)]
struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    angle: f64,
    spin: f64,
    size: f64,
    color: &'static str,
}

/// Live burst of particles inside a `width` × `height` area.
#[derive(Clone, Debug)]
pub struct Confetti {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    age_ms: f64,
}

impl Confetti {
    /// Spawn `count` particles from the top edge, spreading downward.
    pub fn burst<R: Rng + ?Sized>(count: usize, width: f64, height: f64, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|i| Particle {
                x: rng.gen_range(0.0..=width.max(1.0)),
                y: rng.gen_range(-height * 0.25..=0.0),
                vx: rng.gen_range(-0.15..=0.15),
                vy: rng.gen_range(0.05..=0.35),
                angle: rng.gen_range(0.0..std::f64::consts::TAU),
                spin: rng.gen_range(-0.01..=0.01),
                size: rng.gen_range(6.0..=12.0),
                color: COLORS[i % COLORS.len()],
            })
            .collect();
        Self {
            particles,
            width,
            height,
            age_ms: 0.0,
        }
    }

    /// Advance the simulation by `dt_ms`; particles leaving the area are dropped.
    pub fn step(&mut self, dt_ms: f64) {
        let dt = dt_ms.clamp(0.0, 100.0);
        self.age_ms += dt;
        let drag = DRAG.powf(dt);
        for p in &mut self.particles {
            p.vy += GRAVITY * dt;
            p.vx *= drag;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.angle += p.spin * dt;
        }
        let (w, h) = (self.width, self.height);
        self.particles
            .retain(|p| p.y < h + p.size && p.x > -p.size && p.x < w + p.size);
    }

    pub fn is_finished(&self) -> bool {
        self.particles.is_empty() || self.age_ms >= LIFETIME_MS
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Draw the current frame, fading out over the last second.
    pub fn paint(&self, ctx: &CanvasRenderingContext2d) -> Result<()> {
        ctx.clear_rect(0.0, 0.0, self.width, self.height);
        let alpha = ((LIFETIME_MS - self.age_ms) / 1_000.0).clamp(0.0, 1.0);
        ctx.set_global_alpha(alpha);
        for p in &self.particles {
            ctx.save();
            let placed = ctx.translate(p.x, p.y).and_then(|()| ctx.rotate(p.angle));
            if placed.is_ok() {
                ctx.set_fill_style_str(p.color);
                ctx.fill_rect(-p.size / 2.0, -p.size / 4.0, p.size, p.size / 2.0);
            }
            ctx.restore();
            if let Err(err) = placed {
                ctx.set_global_alpha(1.0);
                return Err(err.into());
            }
        }
        ctx.set_global_alpha(1.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn burst_spawns_requested_count_inside_width() {
        let c = Confetti::burst(50, 300.0, 200.0, &mut StdRng::seed_from_u64(1));
        assert_eq!(c.len(), 50);
        assert!(c.particles.iter().all(|p| (0.0..=300.0).contains(&p.x) && p.y <= 0.0));
        assert!(!c.is_finished());
    }

    #[test]
    fn particles_fall_under_gravity() {
        let mut c = Confetti::burst(10, 300.0, 10_000.0, &mut StdRng::seed_from_u64(2));
        let before: Vec<f64> = c.particles.iter().map(|p| p.y).collect();
        c.step(16.0);
        for (p, y0) in c.particles.iter().zip(before) {
            assert!(p.y > y0);
        }
    }

    #[test]
    fn burst_ends_after_lifetime() {
        let mut c = Confetti::burst(20, 300.0, 200.0, &mut StdRng::seed_from_u64(3));
        for _ in 0..400 {
            c.step(16.0);
        }
        assert!(c.is_finished());
    }

    #[test]
    fn empty_burst_is_finished_immediately() {
        let c = Confetti::burst(0, 300.0, 200.0, &mut StdRng::seed_from_u64(4));
        assert!(c.is_empty());
        assert!(c.is_finished());
    }
}
