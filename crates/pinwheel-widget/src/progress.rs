//! Circular progress arc

use glam::Vec2;
use pinwheel_core::{Canvas, Color, Paint, Rect, StrokeCap};

/// Stroke width in dp before conversion to pixels
const DEFAULT_STROKE_WIDTH_DP: f32 = 1.0;

/// Progress drawn as an arc over a background arc, with an optional filled
/// background circle.
///
/// Angles are degrees clockwise from 3 o'clock. Geometry is set by
/// `on_size_changed`; before that the arc is degenerate at the origin.
#[derive(Debug, Clone)]
pub struct CircleProgressBar {
    max: f32,
    progress: f32,
    indeterminate: bool,
    start_degree: f32,
    total_degree: f32,
    stroke_width: f32,
    cap: StrokeCap,
    background_color: Color,
    progress_background_color: Color,
    progress_color: Color,
    center: Vec2,
    radius: f32,
    progress_rect: Rect,
    dirty: bool,
}

impl CircleProgressBar {
    pub fn new(display_scale: f32) -> Self {
        Self {
            max: 100.0,
            progress: 0.0,
            indeterminate: false,
            start_degree: -90.0,
            total_degree: 360.0,
            stroke_width: (display_scale * DEFAULT_STROKE_WIDTH_DP + 0.5).trunc(),
            cap: StrokeCap::Round,
            background_color: Color::TRANSPARENT,
            progress_background_color: Color::GRAY,
            progress_color: Color::WHITE,
            center: Vec2::ZERO,
            radius: 0.0,
            progress_rect: Rect::ZERO,
            dirty: true,
        }
    }

    /// 0 while indeterminate
    pub fn progress(&self) -> f32 {
        if self.indeterminate {
            0.0
        } else {
            self.progress
        }
    }

    /// Clamped to `[0, max]`; ignored while indeterminate
    pub fn set_progress(&mut self, progress: f32) {
        if self.indeterminate {
            return;
        }
        let progress = progress.clamp(0.0, self.max);
        if progress != self.progress {
            self.progress = progress;
            self.dirty = true;
        }
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn set_max(&mut self, max: f32) {
        self.max = max;
        self.dirty = true;
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    pub fn set_indeterminate(&mut self, indeterminate: bool) {
        self.indeterminate = indeterminate;
        self.dirty = true;
    }

    pub fn start_degree(&self) -> f32 {
        self.start_degree
    }

    pub fn set_start_degree(&mut self, degree: f32) -> &mut Self {
        self.start_degree = degree;
        self
    }

    pub fn total_degree(&self) -> f32 {
        self.total_degree
    }

    pub fn set_total_degree(&mut self, degree: f32) -> &mut Self {
        self.total_degree = degree;
        self
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = width;
        self.update_rect();
        self.dirty = true;
    }

    pub fn cap(&self) -> StrokeCap {
        self.cap
    }

    pub fn set_cap(&mut self, cap: StrokeCap) {
        self.cap = cap;
        self.dirty = true;
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
        self.dirty = true;
    }

    pub fn progress_background_color(&self) -> Color {
        self.progress_background_color
    }

    pub fn set_progress_background_color(&mut self, color: Color) {
        self.progress_background_color = color;
        self.dirty = true;
    }

    pub fn progress_color(&self) -> Color {
        self.progress_color
    }

    pub fn set_progress_color(&mut self, color: Color) {
        self.progress_color = color;
        self.dirty = true;
    }

    /// Recompute center, radius and arc bounds for a `width` x `height` view
    pub fn on_size_changed(&mut self, width: u32, height: u32) {
        self.center = Vec2::new((width / 2) as f32, (height / 2) as f32);
        self.radius = self.center.x.min(self.center.y);
        self.update_rect();
        self.dirty = true;
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Arc bounds, inset by half the stroke so the stroke is not clipped
    pub fn progress_rect(&self) -> Rect {
        self.progress_rect
    }

    /// Whether anything changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        if !self.background_color.is_transparent() {
            let paint = Paint::stroke(self.background_color, self.stroke_width, self.cap);
            canvas.draw_circle(self.center, self.radius, &paint);
        }

        let track = Paint::stroke(self.progress_background_color, self.stroke_width, self.cap);
        canvas.draw_arc(self.progress_rect, self.start_degree, self.total_degree, &track);

        let progress = self.progress();
        if progress != 0.0 {
            let paint = Paint::stroke(self.progress_color, self.stroke_width, self.cap);
            let sweep = self.total_degree * progress / self.max;
            canvas.draw_arc(self.progress_rect, self.start_degree, sweep, &paint);
        }
    }

    fn update_rect(&mut self) {
        let half = self.stroke_width / 2.0;
        self.progress_rect = Rect::square_around(self.center, self.radius).inset(half, half);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinwheel_core::{DrawCommand, RecordingCanvas};

    #[test]
    fn stroke_width_rounds_from_density() {
        assert_eq!(CircleProgressBar::new(1.0).stroke_width(), 1.0);
        assert_eq!(CircleProgressBar::new(2.75).stroke_width(), 3.0);
    }

    #[test]
    fn progress_is_clamped() {
        let mut bar = CircleProgressBar::new(1.0);
        bar.set_progress(150.0);
        assert_eq!(bar.progress(), 100.0);
        bar.set_progress(-3.0);
        assert_eq!(bar.progress(), 0.0);
    }

    #[test]
    fn indeterminate_ignores_progress() {
        let mut bar = CircleProgressBar::new(1.0);
        bar.set_progress(40.0);
        bar.set_indeterminate(true);
        assert_eq!(bar.progress(), 0.0);
        bar.set_progress(70.0);
        bar.set_indeterminate(false);
        assert_eq!(bar.progress(), 40.0);
    }

    #[test]
    fn dirty_only_on_change() {
        let mut bar = CircleProgressBar::new(1.0);
        bar.take_dirty();
        bar.set_progress(0.0);
        assert!(!bar.take_dirty());
        bar.set_progress(10.0);
        assert!(bar.take_dirty());
    }

    #[test]
    fn size_change_sets_inset_square() {
        let mut bar = CircleProgressBar::new(4.0);
        bar.on_size_changed(201, 100);
        assert_eq!(bar.center(), Vec2::new(100.0, 50.0));
        assert_eq!(bar.radius(), 50.0);
        let rect = bar.progress_rect();
        assert_eq!(rect, Rect::new(52.0, 2.0, 148.0, 98.0));
    }

    #[test]
    fn draws_track_then_progress() {
        let mut bar = CircleProgressBar::new(1.0);
        bar.on_size_changed(100, 100);
        bar.set_start_degree(-222.0).set_total_degree(264.0);

        let mut canvas = RecordingCanvas::new();
        bar.draw(&mut canvas);
        assert_eq!(canvas.arcs().count(), 1);

        bar.set_progress(50.0);
        canvas.clear();
        bar.draw(&mut canvas);
        let arcs: Vec<_> = canvas.arcs().collect();
        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].1, -222.0);
        assert_eq!(arcs[0].2, 264.0);
        assert!((arcs[1].2 - 132.0).abs() < 1e-4);
    }

    #[test]
    fn opaque_background_draws_circle() {
        let mut bar = CircleProgressBar::new(1.0);
        bar.on_size_changed(80, 80);
        bar.set_background_color(Color::BLACK);
        let mut canvas = RecordingCanvas::new();
        bar.draw(&mut canvas);
        assert!(matches!(
            canvas.commands[0],
            DrawCommand::Circle { radius, .. } if radius == 40.0
        ));
    }
}
