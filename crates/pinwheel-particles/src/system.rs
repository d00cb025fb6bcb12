//! The particle engine: pool ownership, emission scheduling and the tick loop

use crate::emitter::{EmissionRegion, EmitterAnchor, ParticleConfig};
use crate::field::ParticleField;
use crate::host::{EmitterBounds, SurfaceHost};
use crate::initializer::{AccelerationInitializer, ParticleInitializer, SpeedRangeInitializer};
use crate::modifier::{empty_modifiers, with_modifier, ModifierList, ParticleModifier};
use crate::particle::ParticlePool;
use crate::rand::ParticleRng;
use parking_lot::Mutex;
use pinwheel_core::Sprite;
use pinwheel_runtime::{Animated, TimerHandle, TimerQueue};
use std::sync::Arc;
use std::time::Duration;

/// Virtual time added per tick
pub const TICK_INTERVAL_MS: u64 = 10;
/// Real delay before the next tick fires
pub const TICK_DELAY: Duration = Duration::from_millis(1);
/// Real delay before the first tick after `emit()`/`one_shot()`
pub const FIRST_TICK_DELAY: Duration = Duration::from_millis(TICK_INTERVAL_MS);
/// One-shot completion counter step per tick, independent of `TICK_INTERVAL_MS`
pub const ONE_SHOT_STEP_MS: u64 = 40;

/// Messages the engine schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMessage {
    /// Continuous emission tick
    Loop,
    /// One-shot tick carrying its completion counter
    OneShot { counter: u64 },
    /// Drain everything and stop ticking
    Cancel,
}

/// Lifecycle as observed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    /// Unbounded emission
    Emitting,
    /// Emission that cancels itself once the counter passes the time-to-live
    OneShot,
    /// No new activations; live particles keep animating
    StoppingEmission,
    /// `free()` was called; the sprite is gone
    Released,
}

/// Pooled sprite particle engine driven by its own timer queue.
///
/// ```ignore
/// let mut system = ParticleSystem::new(Some(sprite), 30, 6000, density);
/// system
///     .set_speed_range(-0.08, 0.08, -0.08, 0.08)
///     .add_modifier(AlphaModifier::new(-250, 250, 0, 2000))
///     .add_modifier(ScaleModifier::new(0.3, 0.5, 0, 400));
/// system.set_parent(Box::new(host));
/// system.emit();
/// // every frame:
/// system.advance(frame_dt);
/// ```
pub struct ParticleSystem {
    pool: Arc<Mutex<ParticlePool>>,
    max_particles: usize,
    time_to_live: u64,
    display_scale: f32,
    particles_per_second: f32,

    modifiers: ModifierList,
    initializers: Vec<Box<dyn ParticleInitializer>>,
    rng: ParticleRng,

    timers: TimerQueue<EngineMessage>,
    pending_tick: Option<TimerHandle>,

    parent: Option<Box<dyn SurfaceHost>>,
    emitter: Option<Box<dyn EmitterBounds>>,
    anchor: EmitterAnchor,
    field: Option<ParticleField>,
    region: EmissionRegion,

    /// Virtual clock in ms; keeps running across emit() calls
    current_time: u64,
    activated: usize,
    particles_per_ms: f32,
    /// None = unbounded
    emitting_deadline: Option<u64>,
    state: EngineState,
    throttle_logged: bool,
}

impl ParticleSystem {
    /// Allocate `max_particles` particles for `sprite`. Without a sprite no
    /// particles are allocated and every run is empty.
    pub fn new(
        sprite: Option<Arc<Sprite>>,
        max_particles: usize,
        time_to_live: u64,
        display_scale: f32,
    ) -> Self {
        if sprite.is_none() {
            log::warn!("[particles] no sprite supplied, particle system will stay empty");
        }
        Self {
            pool: Arc::new(Mutex::new(ParticlePool::new(sprite, max_particles))),
            max_particles,
            time_to_live,
            display_scale,
            particles_per_second: max_particles as f32,
            modifiers: empty_modifiers(),
            initializers: Vec::new(),
            rng: ParticleRng::from_entropy(),
            timers: TimerQueue::new(),
            pending_tick: None,
            parent: None,
            emitter: None,
            anchor: EmitterAnchor::Center,
            field: None,
            region: EmissionRegion::default(),
            current_time: 0,
            activated: 0,
            particles_per_ms: 0.0,
            emitting_deadline: None,
            state: EngineState::Idle,
            throttle_logged: false,
        }
    }

    /// Build an engine from a parsed config
    pub fn from_config(config: &ParticleConfig, sprite: Option<Arc<Sprite>>) -> Self {
        let mut system = Self::new(
            sprite,
            config.max_particles,
            config.time_to_live,
            config.display_scale,
        );
        system.particles_per_second = config.particles_per_ms() * 1000.0;
        system.anchor = config.anchor;
        if let Some([min_x, max_x, min_y, max_y]) = config.speed {
            system.set_speed_range(min_x, max_x, min_y, max_y);
        }
        if let Some([min_x, max_x, min_y, max_y]) = config.acceleration {
            system.set_acceleration_range(min_x, max_x, min_y, max_y);
        }
        for modifier in &config.modifiers {
            system.add_shared_modifier(modifier.build());
        }
        system
    }

    /// Replace the random source with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ParticleRng::new(seed);
        self
    }

    pub fn dp_to_px(&self, dp: f32) -> f32 {
        dp * self.display_scale
    }

    // ── fluent configuration ──

    pub fn add_modifier(&mut self, modifier: impl ParticleModifier + 'static) -> &mut Self {
        self.add_shared_modifier(Arc::new(modifier))
    }

    /// Particles already in flight keep the list they were activated with
    pub fn add_shared_modifier(&mut self, modifier: Arc<dyn ParticleModifier>) -> &mut Self {
        self.modifiers = with_modifier(&self.modifiers, modifier);
        self
    }

    pub fn add_initializer(&mut self, initializer: impl ParticleInitializer + 'static) -> &mut Self {
        self.initializers.push(Box::new(initializer));
        self
    }

    /// Speed range in dp per ms, converted to pixels with the display scale
    pub fn set_speed_range(&mut self, min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> &mut Self {
        let init = SpeedRangeInitializer::new(
            self.dp_to_px(min_x),
            self.dp_to_px(max_x),
            self.dp_to_px(min_y),
            self.dp_to_px(max_y),
        );
        self.add_initializer(init)
    }

    /// Acceleration range in dp per ms², converted to pixels with the display scale
    pub fn set_acceleration_range(
        &mut self,
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
    ) -> &mut Self {
        let init = AccelerationInitializer::new(
            self.dp_to_px(min_x),
            self.dp_to_px(max_x),
            self.dp_to_px(min_y),
            self.dp_to_px(max_y),
        );
        self.add_initializer(init)
    }

    pub fn set_particles_per_second(&mut self, rate: f32) -> &mut Self {
        self.particles_per_second = rate.max(0.0);
        self
    }

    /// Container the particle field is mounted into. It is also the emitter
    /// unless `set_emitter` names another one.
    pub fn set_parent(&mut self, parent: Box<dyn SurfaceHost>) -> &mut Self {
        self.parent = Some(parent);
        self
    }

    pub fn set_emitter(&mut self, emitter: Box<dyn EmitterBounds>) -> &mut Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn set_emitter_anchor(&mut self, anchor: EmitterAnchor) -> &mut Self {
        self.anchor = anchor;
        self
    }

    // ── lifecycle ──

    /// Start continuous emission from the emitter's current bounds.
    ///
    /// # Panics
    ///
    /// Panics if no parent surface was set with `set_parent`.
    pub fn emit(&mut self) {
        self.start_emitting(EngineMessage::Loop, EngineState::Emitting);
    }

    /// Emit for a bounded run, then cancel automatically.
    ///
    /// # Panics
    ///
    /// Panics if no parent surface was set with `set_parent`.
    pub fn one_shot(&mut self) {
        self.start_emitting(EngineMessage::OneShot { counter: 0 }, EngineState::OneShot);
    }

    /// Stop activating particles; those already live animate until they expire
    pub fn stop_emitting(&mut self) {
        self.emitting_deadline = Some(self.current_time);
        if matches!(self.state, EngineState::Emitting | EngineState::OneShot) {
            log::debug!("[particles] stop emitting at {} ms", self.current_time);
            self.state = EngineState::StoppingEmission;
        }
    }

    /// Drop pending ticks, unmount the field and return every particle to the pool
    pub fn cancel(&mut self) {
        self.timers.cancel_all();
        self.pending_tick = None;
        self.cleanup_animation();
    }

    /// Cancel and release the sprite. Safe to call any number of times.
    pub fn free(&mut self) {
        if self.state == EngineState::Released {
            return;
        }
        self.cancel();
        self.pool.lock().release_sprite();
        self.state = EngineState::Released;
        log::debug!("[particles] released");
    }

    /// Let `dt` of real time pass, running every tick that falls due
    pub fn advance(&mut self, dt: Duration) {
        self.timers.advance(dt);
        while let Some((handle, message)) = self.timers.pop_due() {
            if self.pending_tick == Some(handle) {
                self.pending_tick = None;
            }
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::Loop => {
                self.on_update(self.current_time);
                self.current_time += TICK_INTERVAL_MS;
                self.pending_tick = Some(self.timers.schedule(EngineMessage::Loop, TICK_DELAY));
            }
            EngineMessage::OneShot { counter } => {
                if counter > self.time_to_live {
                    self.pending_tick =
                        Some(self.timers.schedule(EngineMessage::Cancel, Duration::ZERO));
                } else {
                    self.on_update(self.current_time);
                    self.current_time += TICK_INTERVAL_MS;
                    let next = EngineMessage::OneShot {
                        counter: counter + ONE_SHOT_STEP_MS,
                    };
                    self.pending_tick = Some(self.timers.schedule(next, TICK_DELAY));
                }
            }
            EngineMessage::Cancel => {
                log::debug!("[particles] one-shot finished at {} ms", self.current_time);
                self.cancel();
            }
        }
    }

    // ── introspection ──

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn active_count(&self) -> usize {
        self.pool.lock().active_count()
    }

    pub fn free_count(&self) -> usize {
        self.pool.lock().free_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.lock().capacity()
    }

    pub fn activated_count(&self) -> usize {
        self.activated
    }

    pub fn virtual_time_ms(&self) -> u64 {
        self.current_time
    }

    pub fn emission_region(&self) -> EmissionRegion {
        self.region
    }

    pub fn is_ticking(&self) -> bool {
        self.pending_tick.is_some()
    }

    /// The field currently mounted in the parent, if any
    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    /// Run `f` with the pool locked
    pub fn with_pool<R>(&self, f: impl FnOnce(&ParticlePool) -> R) -> R {
        f(&self.pool.lock())
    }

    // ── internals ──

    fn start_emitting(&mut self, first: EngineMessage, state: EngineState) {
        if self.state == EngineState::Released {
            log::warn!("[particles] start requested after free(), ignoring");
            return;
        }
        if self.parent.is_none() {
            panic!("ParticleSystem started before set_parent(): a surface host is required");
        }

        if self.state != EngineState::Idle {
            // Restart: one tick loop and one mounted field at a time
            if let Some(handle) = self.pending_tick.take() {
                self.timers.cancel(handle);
            }
            self.timers.cancel_all();
            self.unmount_field();
        }

        self.configure_emitter();
        self.activated = 0;
        self.throttle_logged = false;
        self.particles_per_ms = self.particles_per_second / 1000.0;

        let field = ParticleField::new(Arc::clone(&self.pool));
        if let Some(parent) = self.parent.as_mut() {
            parent.attach(field.clone());
        }
        self.field = Some(field);
        self.emitting_deadline = None;
        self.pending_tick = Some(self.timers.schedule(first, FIRST_TICK_DELAY));
        self.state = state;

        log::debug!(
            "[particles] {:?} from {:?}, {} particles, ttl {} ms",
            state,
            self.region,
            self.max_particles,
            self.time_to_live
        );
    }

    fn configure_emitter(&mut self) {
        let Some(parent) = self.parent.as_ref() else {
            return;
        };
        let parent_bounds = parent.bounds_in_window();
        let emitter_bounds = match &self.emitter {
            Some(emitter) => emitter.bounds_in_window(),
            None => parent_bounds,
        };
        self.region = EmissionRegion::from_bounds(
            emitter_bounds,
            parent_bounds.left,
            parent_bounds.top,
            self.anchor,
        );
    }

    fn should_emit(&self, now: u64) -> bool {
        match self.emitting_deadline {
            None => true,
            Some(deadline) => now < deadline,
        }
    }

    fn on_update(&mut self, now: u64) {
        let pool = Arc::clone(&self.pool);
        {
            let mut pool = pool.lock();
            while self.should_emit(now)
                && pool.free_count() > 0
                && (self.activated as f32) < self.particles_per_ms * now as f32
            {
                if !self.activate_particle(&mut pool, now) {
                    break;
                }
            }
            if self.should_emit(now)
                && pool.free_count() == 0
                && pool.capacity() > 0
                && !self.throttle_logged
            {
                log::debug!("[particles] pool exhausted at {now} ms, emission follows recycling");
                self.throttle_logged = true;
            }
            pool.update_and_recycle(now, &mut self.rng);
        }
        if self.field.is_some() {
            if let Some(parent) = self.parent.as_mut() {
                parent.request_redraw();
            }
        }
    }

    fn activate_particle(&mut self, pool: &mut ParticlePool, now: u64) -> bool {
        let Some(p) = pool.spawn() else {
            return false;
        };
        p.reset();
        // Initializers go first: they may set values configure() depends on
        for initializer in &self.initializers {
            initializer.init(p, &mut self.rng);
        }
        let (x, y) = self.region.pick(&mut self.rng);
        p.configure(self.time_to_live, x as f32, y as f32);
        p.activate(now, Arc::clone(&self.modifiers));
        self.activated += 1;
        true
    }

    fn unmount_field(&mut self) {
        if self.field.take().is_some() {
            if let Some(parent) = self.parent.as_mut() {
                parent.detach();
            }
        }
    }

    fn cleanup_animation(&mut self) {
        self.unmount_field();
        if let Some(parent) = self.parent.as_mut() {
            parent.request_redraw();
        }
        self.pool.lock().drain_active();
        if self.state != EngineState::Released {
            if self.state != EngineState::Idle {
                log::debug!("[particles] cancelled at {} ms", self.current_time);
            }
            self.state = EngineState::Idle;
        }
    }
}

impl Animated for ParticleSystem {
    fn advance(&mut self, dt: Duration) {
        ParticleSystem::advance(self, dt);
    }

    fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.active_count() == 0
    }

    fn name(&self) -> &str {
        "particles"
    }
}

impl Drop for ParticleSystem {
    fn drop(&mut self) {
        self.free();
    }
}
