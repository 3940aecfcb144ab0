use rand::{seq::SliceRandom, Rng};

/// Animation step per tick, in seconds
const STEP_SECS: f64 = 0.1;
const GRAVITY: f64 = 12.0;

/// Particle for the found-it burst
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
}

impl Particle {
    fn new<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-6.0..6.0),
            vel_y: rng.gen_range(-6.0..-1.0),
            symbol: *['*', '+', '✦', '·', '✧', '•'].choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(1.0..2.5),
        }
    }

    /// Advances the particle; false once it has burnt out.
    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += GRAVITY * dt;
        self.age += dt;
        self.age < self.max_age
    }

    /// 1.0 when fresh, approaching 0.0 as the particle ages
    pub fn brightness(&self) -> f64 {
        (1.0 - self.age / self.max_age).max(0.0)
    }
}

/// Burst of particles around the spot where the target was found
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    pub elapsed: f64,
    pub duration: f64,
    pub is_active: bool,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            elapsed: 0.0,
            duration: 2.5,
            is_active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    /// Starts a burst at the given cell; `width`/`height` bound the screen.
    pub fn start(&mut self, x: u16, y: u16, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.elapsed = 0.0;
        self.is_active = true;
        self.width = width as f64;
        self.height = height as f64;

        for _ in 0..30 {
            self.particles
                .push(Particle::new(x as f64 + 0.5, y as f64 + 0.5, &mut rng));
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        self.elapsed += STEP_SECS;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|particle| {
            let alive = particle.update(STEP_SECS);
            let margin = 3.0;
            let off_screen =
                particle.y > height + margin || particle.x < -margin || particle.x > width + margin;
            alive && !off_screen
        });
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}
