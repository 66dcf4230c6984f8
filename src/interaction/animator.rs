use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::primitives::clamp_f64;

/// Values the animator can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimatedValue {
    Offset,
    MinPrice,
    MaxPrice,
    MaxVolume,
}

/// State the animator reads from and writes into.
pub trait AnimationTarget {
    fn value(&self, key: AnimatedValue) -> f64;
    fn set_value(&mut self, key: AnimatedValue, value: f64);
}

/// Damped harmonic oscillator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub rest_displacement_threshold: f64,
    pub rest_speed_threshold: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 0.1,
            stiffness: 50.0,
            damping: 50.0,
            rest_displacement_threshold: 0.01,
            rest_speed_threshold: 2.0,
        }
    }
}

impl SpringConfig {
    /// Scales the rest thresholds to the largest travel distance so springs
    /// covering different distances settle together.
    #[must_use]
    pub fn normalized(self, distances: &[f64]) -> Self {
        let scale = distances
            .iter()
            .copied()
            .filter(|distance| distance.is_finite())
            .fold(1.0_f64, |acc, distance| acc.max(distance.abs()));
        Self {
            rest_displacement_threshold: self.rest_displacement_threshold * scale,
            rest_speed_threshold: self.rest_speed_threshold * scale,
            ..self
        }
    }
}

/// Momentum tuning for one decay run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Initial velocity in units per second.
    pub velocity: f64,
    /// Velocity multiplier per elapsed millisecond.
    pub deceleration: f64,
    /// Decay stops below this speed (units per second).
    pub rest_velocity: f64,
    pub clamp: Option<(f64, f64)>,
}

/// Emitted exactly once per decay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecaySettled {
    pub key: AnimatedValue,
    /// `false` when another write cancelled the decay.
    pub completed: bool,
    /// The run stopped against its clamp range.
    pub hit_boundary: bool,
}

/// Outcome of one animator step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// At least one value moved.
    pub changed: bool,
    pub settled: SmallVec<[DecaySettled; 1]>,
    /// A deferred `run_after_animations` request is due.
    pub after_animations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpringAnimation {
    target: f64,
    initial_displacement: f64,
    initial_velocity: f64,
    elapsed_seconds: f64,
    config: SpringConfig,
}

impl SpringAnimation {
    /// Displacement from target and velocity at `t` seconds.
    fn state_at(&self, t: f64) -> (f64, f64) {
        let SpringConfig {
            mass,
            stiffness,
            damping,
            ..
        } = self.config;
        let x0 = self.initial_displacement;
        let v0 = self.initial_velocity;
        let omega0 = (stiffness / mass).sqrt();
        let zeta = damping / (2.0 * (stiffness * mass).sqrt());

        if zeta < 1.0 {
            let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega0 * t).exp();
            let b = (v0 + zeta * omega0 * x0) / omega1;
            let (sin, cos) = (omega1 * t).sin_cos();
            let x = envelope * (x0 * cos + b * sin);
            let v = envelope
                * ((b * omega1 - zeta * omega0 * x0) * cos - (x0 * omega1 + zeta * omega0 * b) * sin);
            (x, v)
        } else if (zeta - 1.0).abs() <= f64::EPSILON {
            let envelope = (-omega0 * t).exp();
            let b = v0 + omega0 * x0;
            let x = envelope * (x0 + b * t);
            let v = envelope * (b - omega0 * (x0 + b * t));
            (x, v)
        } else {
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -omega0 * (zeta - root);
            let r2 = -omega0 * (zeta + root);
            let c1 = (v0 - r2 * x0) / (r1 - r2);
            let c2 = x0 - c1;
            let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
            (c1 * e1 + c2 * e2, c1 * r1 * e1 + c2 * r2 * e2)
        }
    }

    fn is_at_rest(&self, displacement: f64, velocity: f64) -> bool {
        displacement.abs() < self.config.rest_displacement_threshold
            && velocity.abs() < self.config.rest_speed_threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DecayAnimation {
    velocity: f64,
    config: DecayConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Animation {
    Spring(SpringAnimation),
    Decay(DecayAnimation),
}

/// Drives spring, decay and direct transitions.
///
/// At most one animation runs per value; starting a new one supersedes the
/// previous run.
#[derive(Debug, Default)]
pub struct Animator {
    running: IndexMap<AnimatedValue, Animation>,
    after_animations_pending: bool,
    pending_settled: SmallVec<[DecaySettled; 1]>,
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    #[must_use]
    pub fn is_animating_value(&self, key: AnimatedValue) -> bool {
        self.running.contains_key(&key)
    }

    #[must_use]
    pub fn is_decaying(&self, key: AnimatedValue) -> bool {
        matches!(self.running.get(&key), Some(Animation::Decay(_)))
    }

    /// Springs `key` from its current value toward `target`. A spring already
    /// running on `key` hands over its current velocity.
    pub fn spring(
        &mut self,
        target_state: &impl AnimationTarget,
        key: AnimatedValue,
        target: f64,
        config: SpringConfig,
    ) {
        let current = target_state.value(key);
        let initial_velocity = match self.running.get(&key) {
            Some(Animation::Spring(spring)) => spring.state_at(spring.elapsed_seconds).1,
            Some(Animation::Decay(decay)) => decay.velocity,
            None => 0.0,
        };
        self.cancel(key);

        if current == target && initial_velocity == 0.0 {
            return;
        }
        self.running.insert(
            key,
            Animation::Spring(SpringAnimation {
                target,
                initial_displacement: current - target,
                initial_velocity,
                elapsed_seconds: 0.0,
                config,
            }),
        );
        trace!(?key, from = current, to = target, "spring started");
    }

    /// Starts a momentum run on `key`, replacing anything running on it.
    pub fn decay(&mut self, key: AnimatedValue, config: DecayConfig) {
        self.cancel(key);
        self.running.insert(
            key,
            Animation::Decay(DecayAnimation {
                velocity: config.velocity,
                config,
            }),
        );
        trace!(?key, velocity = config.velocity, "decay started");
    }

    /// Sets `key` immediately, cancelling any animation on it.
    pub fn direct(&mut self, target_state: &mut impl AnimationTarget, key: AnimatedValue, value: f64) {
        self.cancel(key);
        target_state.set_value(key, value);
    }

    /// Stops the animation on `key`. A cancelled decay reports
    /// `completed = false` on the next tick.
    pub fn cancel(&mut self, key: AnimatedValue) {
        if let Some(Animation::Decay(_)) = self.running.shift_remove(&key) {
            self.pending_settled.push(DecaySettled {
                key,
                completed: false,
                hit_boundary: false,
            });
        }
    }

    pub fn cancel_all(&mut self) {
        let keys: SmallVec<[AnimatedValue; 4]> = self.running.keys().copied().collect();
        for key in keys {
            self.cancel(key);
        }
    }

    /// Returns `true` when nothing is animating and the caller should run the
    /// deferred work now; otherwise defers it to the tick that goes idle.
    pub fn run_after_animations(&mut self) -> bool {
        if self.running.is_empty() {
            return true;
        }
        self.after_animations_pending = true;
        false
    }

    /// Settle reports produced outside of a tick (cancellations).
    pub fn take_settled(&mut self) -> SmallVec<[DecaySettled; 1]> {
        std::mem::take(&mut self.pending_settled)
    }

    /// Advances every running animation by `dt_ms` milliseconds.
    pub fn tick(&mut self, target_state: &mut impl AnimationTarget, dt_ms: f64) -> TickReport {
        let mut report = TickReport {
            settled: self.take_settled(),
            ..TickReport::default()
        };
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        let mut finished: SmallVec<[AnimatedValue; 4]> = SmallVec::new();
        for (key, animation) in &mut self.running {
            let before = target_state.value(*key);
            match animation {
                Animation::Spring(spring) => {
                    spring.elapsed_seconds += dt_ms / 1_000.0;
                    let (displacement, velocity) = spring.state_at(spring.elapsed_seconds);
                    if spring.is_at_rest(displacement, velocity) || !displacement.is_finite() {
                        target_state.set_value(*key, spring.target);
                        finished.push(*key);
                    } else {
                        target_state.set_value(*key, spring.target + displacement);
                    }
                }
                Animation::Decay(decay) => {
                    let deceleration = decay.config.deceleration;
                    let kv = deceleration.powf(dt_ms);
                    let kx = deceleration * (1.0 - kv) / (1.0 - deceleration);
                    let mut next = before + decay.velocity / 1_000.0 * kx;
                    decay.velocity *= kv;

                    let mut hit_boundary = false;
                    if let Some((min, max)) = decay.config.clamp {
                        if next <= min || next >= max {
                            next = clamp_f64(next, min, max);
                            hit_boundary = true;
                        }
                    }
                    target_state.set_value(*key, next);

                    if hit_boundary || decay.velocity.abs() < decay.config.rest_velocity {
                        finished.push(*key);
                        report.settled.push(DecaySettled {
                            key: *key,
                            completed: true,
                            hit_boundary,
                        });
                    }
                }
            }
            report.changed |= target_state.value(*key) != before;
        }

        for key in finished {
            self.running.shift_remove(&key);
        }

        if self.after_animations_pending && self.running.is_empty() {
            self.after_animations_pending = false;
            report.after_animations = true;
        }
        report
    }
}
