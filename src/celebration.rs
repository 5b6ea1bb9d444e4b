use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

/// Pieces of confetti across all bursts of one celebration.
pub const CONFETTI_COUNT: usize = 120;
/// Confetti leaves from this fraction of the screen height.
const ORIGIN_Y: f64 = 0.7;
const GRAVITY: f64 = 18.0;
/// Terminal cells are about twice as tall as wide.
const CELL_ASPECT: f64 = 0.5;
const VELOCITY_SCALE: f64 = 0.9;
const STEP: f64 = 0.1;

const CONFETTI_SYMBOLS: [char; 7] = ['*', '+', '•', '◆', '▪', '~', '°'];
const SOLVED_WORDS: [&str; 4] = ["SOLVED!", "NAILED IT!", "BRILLIANT!", "SPLENDID!"];

/// One shot of the confetti cannon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// Share of [`CONFETTI_COUNT`] fired by this burst.
    pub ratio: f64,
    /// Cone width in degrees around straight up.
    pub spread: f64,
    pub start_velocity: f64,
    /// Velocity kept per step.
    pub decay: f64,
    /// Lifetime multiplier; bigger pieces linger.
    pub scalar: f64,
}

impl Burst {
    const fn new(ratio: f64, spread: f64) -> Self {
        Self {
            ratio,
            spread,
            start_velocity: 45.0,
            decay: 0.9,
            scalar: 1.0,
        }
    }

    pub fn particle_count(&self) -> usize {
        (CONFETTI_COUNT as f64 * self.ratio).floor() as usize
    }
}

pub const BURSTS: [Burst; 5] = [
    Burst {
        start_velocity: 55.0,
        ..Burst::new(0.25, 26.0)
    },
    Burst::new(0.2, 60.0),
    Burst {
        decay: 0.91,
        scalar: 0.8,
        ..Burst::new(0.35, 100.0)
    },
    Burst {
        start_velocity: 25.0,
        decay: 0.92,
        scalar: 1.2,
        ..Burst::new(0.1, 120.0)
    },
    Burst::new(0.1, 120.0),
];

#[derive(Debug, Clone)]
pub struct CelebrationParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub decay: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Letters fly to a fixed spot and spell the banner.
    pub is_text: bool,
    pub target_x: f64,
    pub target_y: f64,
}

impl CelebrationParticle {
    fn confetti<R: Rng + ?Sized>(x: f64, y: f64, burst: &Burst, rng: &mut R) -> Self {
        let half_spread = burst.spread.to_radians() / 2.0;
        let angle = std::f64::consts::FRAC_PI_2 + rng.gen_range(-half_spread..=half_spread);
        let speed = burst.start_velocity * VELOCITY_SCALE * rng.gen_range(0.5..1.0);

        Self {
            x,
            y,
            vel_x: angle.cos() * speed,
            vel_y: -angle.sin() * speed * CELL_ASPECT,
            decay: burst.decay,
            symbol: *CONFETTI_SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(2.0..3.0) * burst.scalar,
            is_text: false,
            target_x: x,
            target_y: y,
        }
    }

    fn letter(x: f64, y: f64, target_x: f64, target_y: f64, symbol: char, color: usize) -> Self {
        Self {
            x,
            y,
            vel_x: target_x - x,
            vel_y: target_y - y,
            decay: 0.95,
            symbol,
            color_index: color,
            age: 0.0,
            max_age: 4.0,
            is_text: true,
            target_x,
            target_y,
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        if self.is_text {
            let dist_to_target =
                ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt();
            if dist_to_target > 1.0 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_x *= self.decay;
                self.vel_y *= self.decay;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
                self.vel_x = 0.0;
                self.vel_y = 0.0;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_x *= self.decay;
            self.vel_y = self.vel_y * self.decay + GRAVITY * dt;
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Win confetti drawn over the board.
#[derive(Debug)]
pub struct CelebrationAnimation {
    pub particles: Vec<CelebrationParticle>,
    pub banner: &'static str,
    pub duration: Duration,
    pub is_active: bool,
    started_at: Option<Instant>,
    last_update: Option<Instant>,
    terminal_width: f64,
    terminal_height: f64,
}

impl CelebrationAnimation {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            banner: SOLVED_WORDS[0],
            duration: Duration::from_secs(3),
            is_active: false,
            started_at: None,
            last_update: None,
            terminal_width: 80.0,
            terminal_height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16, now: Instant) {
        self.start_with(width, height, now, &mut rand::thread_rng());
    }

    pub fn start_with<R: Rng + ?Sized>(&mut self, width: u16, height: u16, now: Instant, rng: &mut R) {
        self.particles.clear();
        self.started_at = Some(now);
        self.last_update = Some(now);
        self.is_active = true;
        self.terminal_width = width as f64;
        self.terminal_height = height as f64;

        let origin_x = self.terminal_width / 2.0;
        let origin_y = self.terminal_height * ORIGIN_Y;

        self.banner = SOLVED_WORDS.choose(rng).copied().unwrap_or(SOLVED_WORDS[0]);
        self.spell_banner(origin_x, self.terminal_height / 3.0, rng);

        for burst in &BURSTS {
            for _ in 0..burst.particle_count() {
                self.particles
                    .push(CelebrationParticle::confetti(origin_x, origin_y, burst, rng));
            }
        }
    }

    fn spell_banner<R: Rng + ?Sized>(&mut self, center_x: f64, row: f64, rng: &mut R) {
        let char_width = 2.0;
        let text_width = (self.banner.chars().count() as f64 - 1.0) * char_width;
        let left = center_x - text_width / 2.0;

        for (i, ch) in self.banner.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let from_x = center_x + rng.gen_range(-10.0..10.0);
            let from_y = row + rng.gen_range(-5.0..5.0);
            self.particles.push(CelebrationParticle::letter(
                from_x,
                from_y,
                left + i as f64 * char_width,
                row,
                ch,
                rng.gen_range(0..7),
            ));
        }
    }

    /// Advances the animation by whole steps since the last update.
    pub fn update(&mut self, now: Instant) {
        let (Some(started_at), Some(last)) = (self.started_at, self.last_update) else {
            return;
        };
        if !self.is_active {
            return;
        }

        if now.saturating_duration_since(started_at) >= self.duration {
            self.stop();
            return;
        }

        let steps = (now.saturating_duration_since(last).as_secs_f64() / STEP).floor() as u32;
        if steps == 0 {
            return;
        }
        self.last_update = Some(last + Duration::from_secs_f64(STEP * steps as f64));

        let buffer = 5.0;
        let (width, height) = (self.terminal_width, self.terminal_height);
        for _ in 0..steps {
            self.particles.retain_mut(|particle| {
                let still_alive = particle.update(STEP);
                if particle.is_text {
                    return still_alive;
                }
                let off_screen = particle.y > height + buffer
                    || particle.x < -buffer
                    || particle.x > width + buffer;
                still_alive && !off_screen
            });
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
        self.started_at = None;
        self.last_update = None;
    }
}

impl Default for CelebrationAnimation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_burst_ratios_cover_the_count() {
        let total: usize = BURSTS.iter().map(Burst::particle_count).sum();
        let ratio: f64 = BURSTS.iter().map(|b| b.ratio).sum();

        assert!((ratio - 1.0).abs() < 1e-9);
        assert!(total <= CONFETTI_COUNT && total >= CONFETTI_COUNT - BURSTS.len());
        assert_eq!(BURSTS[2].decay, 0.91);
        assert_eq!(BURSTS[3].start_velocity, 25.0);
        assert_eq!(BURSTS[4].start_velocity, 45.0);
    }

    #[test]
    fn test_confetti_flies_up_then_falls() {
        let mut particle = CelebrationParticle::confetti(40.0, 17.0, &BURSTS[0], &mut rng());
        let initial_vel_y = particle.vel_y;
        assert!(initial_vel_y < 0.0);

        assert!(particle.update(0.1));

        assert!(particle.y < 17.0);
        assert!(particle.vel_y > initial_vel_y);
    }

    #[test]
    fn test_letter_moves_to_target() {
        let mut letter = CelebrationParticle::letter(0.0, 0.0, 10.0, 5.0, 'S', 0);

        assert!(letter.is_text);
        for _ in 0..10 {
            letter.update(0.1);
        }

        let distance =
            ((letter.target_x - letter.x).powi(2) + (letter.target_y - letter.y).powi(2)).sqrt();
        assert!(distance < 5.0);
    }

    #[test]
    fn test_start_spells_banner_and_fires_bursts() {
        let mut celebration = CelebrationAnimation::new();
        assert!(!celebration.is_active);
        assert!(celebration.particles.is_empty());

        celebration.start_with(80, 24, Instant::now(), &mut rng());

        let letters = celebration.particles.iter().filter(|p| p.is_text).count();
        let confetti = celebration.particles.iter().filter(|p| !p.is_text).count();
        assert!(celebration.is_active);
        assert_eq!(letters, celebration.banner.chars().filter(|c| *c != ' ').count());
        assert_eq!(confetti, BURSTS.iter().map(Burst::particle_count).sum::<usize>());
    }

    #[test]
    fn test_update_moves_particles() {
        let t0 = Instant::now();
        let mut celebration = CelebrationAnimation::new();
        celebration.start_with(80, 24, t0, &mut rng());
        let before: Vec<(f64, f64)> = celebration.particles.iter().map(|p| (p.x, p.y)).collect();

        celebration.update(t0 + Duration::from_millis(500));

        let moved = celebration
            .particles
            .iter()
            .zip(before.iter())
            .filter(|(p, &(x, y))| (p.x - x).abs() > 0.1 || (p.y - y).abs() > 0.1)
            .count();
        assert!(moved > 0);
        assert!(celebration.is_active);
    }

    #[test]
    fn test_ends_after_duration() {
        let t0 = Instant::now();
        let mut celebration = CelebrationAnimation::new();
        celebration.start_with(80, 24, t0, &mut rng());

        celebration.update(t0 + Duration::from_secs(3));

        assert!(!celebration.is_active);
        assert!(celebration.particles.is_empty());
    }

    #[test]
    fn test_particles_removed_when_off_screen() {
        let t0 = Instant::now();
        let mut celebration = CelebrationAnimation::new();
        celebration.start_with(20, 10, t0, &mut rng());
        celebration
            .particles
            .push(CelebrationParticle::letter(1.0, 1.0, 1.0, 1.0, 'X', 0));
        let mut stray = CelebrationParticle::confetti(10.0, 7.0, &BURSTS[1], &mut rng());
        stray.y = 100.0;
        celebration.particles.push(stray);

        celebration.update(t0 + Duration::from_millis(200));

        for particle in celebration.particles.iter().filter(|p| !p.is_text) {
            assert!(particle.y <= 15.0 && particle.x >= -5.0 && particle.x <= 25.0);
        }
    }
}
