//! Pinwheel choreography: progress arc, spinning pinwheel and particle burst

use crate::progress::CircleProgressBar;
use crate::surface::WidgetSurface;
use crate::tween::{Tween, TweenEvent};
use glam::{Affine2, Vec2};
use pinwheel_core::{Canvas, Paint, Rect, Sprite};
use pinwheel_particles::{Easing, EngineState, ParticleConfig, ParticleSystem};
use pinwheel_runtime::{Animated, TimerQueue};
use std::sync::Arc;
use std::time::Duration;

/// Degrees the pinwheel turns per frame at full speed
pub const UNIFORM_DEGREE: f32 = 16.0;
/// Progress arc animation length; the slow-down runs twice as long
pub const PROGRESS_DURATION: Duration = Duration::from_millis(495);
pub const START_DEGREE: f32 = -222.0;
pub const TOTAL_DEGREE: f32 = 264.0;
pub const MAX_PROGRESS: f32 = 100.0;
/// Pinwheel size relative to the widget's half size
const PINWHEEL_SCALE: f32 = 0.67;
const CANCEL_EMIT_DELAY: Duration = Duration::from_millis(5);

/// Deferred particle commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidgetMessage {
    StopEmit,
    CancelEmit,
}

/// Circular progress bar with a pinwheel that spins up on `start()` and
/// winds down on `stop()`, emitting particles while it runs.
///
/// `init()` must be called before `start()`. Call `advance()` once per frame
/// and `draw()` whenever a redraw is needed; `free()` when done.
pub struct PinWheelWidget {
    bar: CircleProgressBar,
    surface: WidgetSurface,
    display_scale: f32,
    pinwheel: Option<Arc<Sprite>>,
    particle_sprite: Option<Arc<Sprite>>,
    particle_config: ParticleConfig,
    particles: Option<ParticleSystem>,
    seed: Option<u64>,
    timers: TimerQueue<WidgetMessage>,

    progress_start: Option<Tween>,
    speed_up: Option<Tween>,
    progress_stop: Option<Tween>,
    slow_down: Option<Tween>,

    rotation_degree: f32,
    rotation_visible: bool,
    uniform: bool,
    running: bool,
    initialized: bool,
}

impl PinWheelWidget {
    pub fn new() -> Self {
        let mut bar = CircleProgressBar::new(1.0);
        bar.set_start_degree(START_DEGREE).set_total_degree(TOTAL_DEGREE);
        bar.set_max(MAX_PROGRESS);
        Self {
            bar,
            surface: WidgetSurface::default(),
            display_scale: 1.0,
            pinwheel: None,
            particle_sprite: None,
            particle_config: ParticleConfig::pinwheel(),
            particles: None,
            seed: None,
            timers: TimerQueue::new(),
            progress_start: None,
            speed_up: None,
            progress_stop: None,
            slow_down: None,
            rotation_degree: 0.0,
            rotation_visible: false,
            uniform: false,
            running: false,
            initialized: false,
        }
    }

    /// Supply display density and sprites. Required before `start()`.
    ///
    /// Without a particle sprite the widget still spins but emits nothing.
    pub fn init(
        &mut self,
        display_scale: f32,
        pinwheel: Arc<Sprite>,
        particle_sprite: Option<Arc<Sprite>>,
    ) {
        self.rotation_degree = 0.0;
        self.display_scale = display_scale;
        self.bar.set_stroke_width((display_scale + 0.5).trunc());
        self.pinwheel = Some(pinwheel);
        self.particle_sprite = particle_sprite;
        self.initialized = true;
    }

    /// Position and size of the widget in window pixels
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.surface.set_bounds(bounds);
        self.bar
            .on_size_changed(bounds.width().max(0.0) as u32, bounds.height().max(0.0) as u32);
    }

    /// Particle setup used by the next `start()`. Density comes from `init()`.
    pub fn set_particle_config(&mut self, config: ParticleConfig) {
        self.particle_config = config;
    }

    /// Seed particle randomness for reproducible runs
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    /// Start emitting, run the progress arc down to zero and spin the pinwheel up.
    /// Returns false if already running.
    ///
    /// # Panics
    ///
    /// Panics if `init()` has not been called.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        assert!(
            self.initialized,
            "PinWheelWidget::start() called before init()"
        );
        self.running = true;
        self.rotation_degree = 0.0;

        // A start during the wind-down supersedes it
        self.timers.cancel_all();
        self.progress_stop = None;
        self.slow_down = None;
        if let Some(mut old) = self.particles.take() {
            old.free();
        }

        let mut config = self.particle_config.clone();
        config.display_scale = self.display_scale;
        let mut particles = ParticleSystem::from_config(&config, self.particle_sprite.clone());
        if let Some(seed) = self.seed {
            particles = particles.with_seed(seed);
        }
        particles.set_parent(Box::new(self.surface.clone()));
        particles.emit();
        self.particles = Some(particles);

        self.progress_start = Some(Tween::new(
            self.bar.progress(),
            0.0,
            PROGRESS_DURATION,
            Easing::AccelerateDecelerate,
        ));
        log::info!("[pinwheel] start from progress {}", self.bar.progress());
        true
    }

    /// Run the progress arc back up, slow the pinwheel down and wind the
    /// particles down. Returns false if not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.rotation_degree = 0.0;
        self.progress_start = None;
        self.speed_up = None;
        self.slow_down = None;
        self.progress_stop = Some(Tween::new(
            0.0,
            self.bar.progress(),
            PROGRESS_DURATION,
            Easing::AccelerateDecelerate,
        ));
        self.running = false;
        log::info!("[pinwheel] stop at progress {}", self.bar.progress());
        true
    }

    /// Set the final progress, then `stop()`
    pub fn stop_at(&mut self, progress: f32) -> bool {
        self.bar.set_progress(progress);
        self.stop()
    }

    /// Drop every pending animation and release the sprites. Safe to repeat.
    pub fn free(&mut self) {
        self.timers.cancel_all();
        if let Some(mut particles) = self.particles.take() {
            particles.free();
        }
        self.progress_start = None;
        self.speed_up = None;
        self.progress_stop = None;
        self.slow_down = None;
        self.uniform = false;
        self.running = false;
        if self.initialized {
            log::debug!("[pinwheel] freed");
        }
        self.pinwheel = None;
        self.particle_sprite = None;
        self.initialized = false;
    }

    /// Drive timers, tweens, the uniform spin and the particle engine by one frame
    pub fn advance(&mut self, dt: Duration) {
        self.timers.advance(dt);
        while let Some((_, message)) = self.timers.pop_due() {
            self.handle_message(message);
        }
        if self.uniform {
            self.rotate_by(UNIFORM_DEGREE);
        }
        self.advance_start_tweens(dt);
        self.advance_stop_tweens(dt);
        if let Some(particles) = self.particles.as_mut() {
            particles.advance(dt);
        }
    }

    /// Progress arc, pinwheel, then particles on top
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.bar.draw(canvas);
        self.draw_pinwheel(canvas);
        self.surface.draw(canvas);
    }

    // ── accessors ──

    pub fn bar(&self) -> &CircleProgressBar {
        &self.bar
    }

    pub fn bar_mut(&mut self) -> &mut CircleProgressBar {
        &mut self.bar
    }

    pub fn progress(&self) -> f32 {
        self.bar.progress()
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.bar.set_progress(progress);
    }

    pub fn rotation_degree(&self) -> f32 {
        self.rotation_degree
    }

    pub fn is_rotation_visible(&self) -> bool {
        self.rotation_visible
    }

    /// Spinning at constant speed
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn particles(&self) -> Option<&ParticleSystem> {
        self.particles.as_ref()
    }

    pub fn particle_state(&self) -> Option<EngineState> {
        self.particles.as_ref().map(ParticleSystem::state)
    }

    pub fn surface(&self) -> &WidgetSurface {
        &self.surface
    }

    /// Whether the last frames changed anything visible
    pub fn take_redraw(&mut self) -> bool {
        let animating = self.uniform
            || self.progress_start.is_some()
            || self.speed_up.is_some()
            || self.progress_stop.is_some()
            || self.slow_down.is_some();
        let bar = self.bar.take_dirty();
        let particles = self.surface.take_redraw();
        animating || bar || particles
    }

    // ── internals ──

    fn handle_message(&mut self, message: WidgetMessage) {
        let Some(particles) = self.particles.as_mut() else {
            return;
        };
        match message {
            WidgetMessage::StopEmit => particles.stop_emitting(),
            WidgetMessage::CancelEmit => particles.cancel(),
        }
    }

    fn rotate_by(&mut self, degrees: f32) {
        self.rotation_degree -= degrees;
    }

    fn advance_start_tweens(&mut self, dt: Duration) {
        if let Some(tween) = self.progress_start.as_mut() {
            let event = tween.advance(dt);
            let value = tween.value();
            if event != TweenEvent::Idle {
                self.bar.set_progress(value);
            }
            match event {
                TweenEvent::Started => {
                    self.rotation_visible = true;
                    self.speed_up = Some(Tween::new(
                        0.0,
                        UNIFORM_DEGREE,
                        PROGRESS_DURATION,
                        Easing::AccelerateDecelerate,
                    ));
                }
                TweenEvent::Finished => self.progress_start = None,
                TweenEvent::Updated | TweenEvent::Idle => {}
            }
        }

        if let Some(tween) = self.speed_up.as_mut() {
            let event = tween.advance(dt);
            let value = tween.value();
            if event != TweenEvent::Idle {
                self.rotate_by(value);
            }
            if event == TweenEvent::Finished {
                self.speed_up = None;
                self.uniform = true;
                self.rotation_degree = 0.0;
                log::debug!("[pinwheel] full speed");
            }
        }
    }

    fn advance_stop_tweens(&mut self, dt: Duration) {
        if let Some(tween) = self.progress_stop.as_mut() {
            let event = tween.advance(dt);
            let value = tween.value();
            if event != TweenEvent::Idle {
                self.bar.set_progress(value);
            }
            match event {
                TweenEvent::Started => {
                    self.slow_down = Some(Tween::new(
                        UNIFORM_DEGREE,
                        0.0,
                        PROGRESS_DURATION * 2,
                        Easing::Linear,
                    ));
                }
                TweenEvent::Finished => {
                    self.progress_stop = None;
                    self.timers.schedule(WidgetMessage::StopEmit, Duration::ZERO);
                }
                TweenEvent::Updated | TweenEvent::Idle => {}
            }
        }

        if let Some(tween) = self.slow_down.as_mut() {
            let event = tween.advance(dt);
            let value = tween.value();
            if event == TweenEvent::Started {
                self.uniform = false;
            }
            // The tail of the slow-down is too small to show
            if event != TweenEvent::Idle && value > 1.0 {
                self.rotate_by(value);
            }
            if event == TweenEvent::Finished {
                self.slow_down = None;
                self.rotation_visible = true;
                self.timers.schedule(WidgetMessage::CancelEmit, CANCEL_EMIT_DELAY);
                log::debug!("[pinwheel] stopped spinning");
            }
        }
    }

    fn draw_pinwheel(&self, canvas: &mut dyn Canvas) {
        let Some(sprite) = self.pinwheel.as_ref() else {
            return;
        };
        let half = sprite.half_extents();
        if half.x <= 0.0 || half.y <= 0.0 {
            return;
        }
        let center = self.bar.center();
        let scale = Vec2::new(
            PINWHEEL_SCALE * center.x / half.x,
            PINWHEEL_SCALE * center.y / half.y,
        );

        let mut transform = Affine2::from_translation(center) * Affine2::from_scale(scale);
        if self.rotation_visible {
            transform = transform * Affine2::from_angle(self.rotation_degree.to_radians());
        }
        transform = transform * Affine2::from_translation(-half);
        canvas.draw_image(sprite, transform, &Paint::default());
    }
}

impl Default for PinWheelWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Animated for PinWheelWidget {
    fn advance(&mut self, dt: Duration) {
        PinWheelWidget::advance(self, dt);
    }

    fn is_idle(&self) -> bool {
        !self.running
            && !self.uniform
            && self.timers.is_empty()
            && self.progress_start.is_none()
            && self.speed_up.is_none()
            && self.progress_stop.is_none()
            && self.slow_down.is_none()
            && self.particles.as_ref().map_or(true, |p| p.is_idle())
    }

    fn name(&self) -> &str {
        "pinwheel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinwheel_core::{Color, DrawCommand, RecordingCanvas};

    const FRAME: Duration = Duration::from_millis(16);

    fn widget() -> PinWheelWidget {
        let mut widget = PinWheelWidget::new();
        widget.set_bounds(Rect::new(0.0, 0.0, 200.0, 200.0));
        widget.set_seed(7);
        widget.init(
            1.0,
            Arc::new(Sprite::solid(64, 64, Color::WHITE)),
            Some(Arc::new(Sprite::solid(8, 8, Color::WHITE))),
        );
        widget
    }

    fn run(widget: &mut PinWheelWidget, ms: u64) {
        for _ in 0..ms / 16 {
            widget.advance(FRAME);
        }
    }

    #[test]
    #[should_panic(expected = "init()")]
    fn start_before_init_panics() {
        let mut widget = PinWheelWidget::new();
        widget.start();
    }

    #[test]
    fn start_and_stop_report_transitions() {
        let mut widget = widget();
        assert!(!widget.stop());
        assert!(widget.start());
        assert!(!widget.start());
        assert!(widget.stop());
        assert!(!widget.stop());
    }

    #[test]
    fn start_runs_progress_down_and_spins_up() {
        let mut widget = widget();
        widget.set_progress(60.0);
        widget.start();
        assert_eq!(widget.particle_state(), Some(EngineState::Emitting));

        widget.advance(FRAME);
        assert!(widget.is_rotation_visible());
        assert!((widget.progress() - 60.0).abs() < 1e-4);

        run(&mut widget, 600);
        assert!(widget.progress().abs() < 1e-4);
        assert!(widget.is_uniform());

        let before = widget.rotation_degree();
        widget.advance(FRAME);
        assert_eq!(widget.rotation_degree(), before - UNIFORM_DEGREE);

        assert!(widget.surface().has_field());
        assert!(widget.particles().is_some_and(|p| p.active_count() > 0));
    }

    #[test]
    fn stop_winds_everything_down() {
        let mut widget = widget();
        widget.start();
        run(&mut widget, 1000);

        assert!(widget.stop_at(40.0));
        assert_eq!(widget.rotation_degree(), 0.0);

        run(&mut widget, 600);
        assert!((widget.progress() - 40.0).abs() < 1e-4);
        assert!(!widget.is_uniform());
        assert_eq!(widget.particle_state(), Some(EngineState::StoppingEmission));

        run(&mut widget, 500);
        assert_eq!(widget.particle_state(), Some(EngineState::Idle));
        assert!(widget.particles().is_some_and(|p| p.active_count() == 0));
        assert!(!widget.surface().has_field());

        // Fully stopped: the pinwheel holds its angle
        let resting = widget.rotation_degree();
        run(&mut widget, 100);
        assert_eq!(widget.rotation_degree(), resting);
        assert!(Animated::is_idle(&widget));
    }

    #[test]
    fn restart_during_wind_down_keeps_emitting() {
        let mut widget = widget();
        widget.start();
        run(&mut widget, 600);
        widget.stop();
        run(&mut widget, 100);

        assert!(widget.start());
        run(&mut widget, 1200);
        assert_eq!(widget.particle_state(), Some(EngineState::Emitting));
        assert!(widget.is_uniform());
    }

    #[test]
    fn draw_layers_bar_pinwheel_particles() {
        let mut widget = widget();
        widget.start();
        run(&mut widget, 600);

        let mut canvas = RecordingCanvas::new();
        widget.draw(&mut canvas);
        assert_eq!(canvas.arcs().count(), 1);

        let active = widget.particles().map_or(0, |p| p.active_count());
        assert_eq!(canvas.image_count(), 1 + active);
        match &canvas.commands[1] {
            DrawCommand::Image { width, transform, .. } => {
                assert_eq!(*width, 64);
                // Sprite center lands on the widget center
                let mid = transform.transform_point2(Vec2::new(32.0, 32.0));
                assert!((mid - Vec2::new(100.0, 100.0)).length() < 1e-3);
            }
            other => panic!("expected pinwheel image, got {other:?}"),
        }
    }

    #[test]
    fn free_is_idempotent() {
        let mut widget = widget();
        widget.start();
        run(&mut widget, 200);
        widget.free();
        widget.free();
        assert!(widget.particles().is_none());
        assert!(!widget.surface().has_field());
        assert!(!widget.is_running());

        let mut canvas = RecordingCanvas::new();
        widget.draw(&mut canvas);
        assert_eq!(canvas.image_count(), 0);
    }
}
