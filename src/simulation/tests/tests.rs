use super::*;
use crate::domain::color::Rgb;
use crate::domain::settings::{ImageOptions, ImageSettings, TextOptions, TextSettings};
use crate::core::SurfaceError;
use crate::domain::color::Paint;
use crate::domain::settings::TextStyle;
use crate::surface::raster::{Bitmap, PixelBuffer};
use crate::surface::Surface;
use std::cell::Cell;
use std::rc::Rc;

const RED: [u8; 4] = [255, 0, 0, 255];

fn red_image_effect(size: u32, gap: u32) -> ImageEffect<PixelBuffer> {
    let settings = ImageSettings { gap, ..ImageSettings::default() };
    let mut effect = ImageEffect::new(PixelBuffer::new(size, size), settings);
    effect.load(Bitmap::filled(10, 10, RED)).unwrap();
    effect
}

fn text_effect(width: u32, options: &str, text: &str) -> TextEffect<PixelBuffer> {
    let options = TextOptions::from_json(options).unwrap();
    TextEffect::new(
        PixelBuffer::new(width, 1),
        TextBox::new(width),
        text,
        TextSettings::from_options(&options),
    )
}

fn offsets(particles: &[Particle]) -> Vec<(f64, f64)> {
    particles.iter().map(|p| (p.x - p.origin().0, p.y - p.origin().1)).collect()
}

// === Sampling ===

#[test]
fn solid_red_square_samples_four_particles() {
    let effect = red_image_effect(10, 5);

    let particles = effect.particles();
    let origins: Vec<_> = particles.iter().map(|p| p.origin()).collect();
    assert_eq!(origins, vec![(0.0, 0.0), (5.0, 0.0), (0.0, 5.0), (5.0, 5.0)]);
    for p in particles {
        assert_eq!(p.color(), Rgb::new(255, 0, 0));
        assert_eq!(p.color().to_string(), "rgb(255,0,0)");
        assert_eq!(p.size, 5.0);
        assert!(p.is_at_rest());
    }

    // Particles are drawn at rest once sampled
    assert_eq!(effect.surface().painted_pixels(), 100);
}

#[test]
fn image_is_centred_before_sampling() {
    let effect = red_image_effect(20, 5);
    let origins: Vec<_> = effect.particles().iter().map(|p| p.origin()).collect();
    assert_eq!(origins, vec![(5.0, 5.0), (10.0, 5.0), (5.0, 10.0), (10.0, 10.0)]);
}

#[test]
fn resampling_is_deterministic() {
    let mut image = Bitmap::filled(12, 9, [0, 0, 0, 0]);
    for y in 0..9 {
        for x in 0..12 {
            if (x + y) % 3 != 0 {
                image.set_pixel(x, y, [x as u8 * 20, y as u8 * 25, 7, 255]);
            }
        }
    }
    let mut effect = ImageEffect::new(
        PixelBuffer::new(12, 9),
        ImageSettings { gap: 2, ..ImageSettings::default() },
    );
    effect.load(image).unwrap();
    let first = effect.particles().to_vec();

    effect.resample().unwrap();
    assert!(!first.is_empty());
    assert_eq!(effect.particles(), first.as_slice());
}

// === Physics properties ===

#[test]
fn origin_never_changes_under_updates() {
    let mut effect = red_image_effect(10, 5);
    let before: Vec<_> = effect.particles().iter().map(|p| p.origin()).collect();

    let path = [(1.5, 2.0), (6.0, 4.5), (9.0, 9.0), (3.2, 7.7)];
    for (x, y) in path {
        effect.pointer_move(x, y);
        for _ in 0..5 {
            assert!(effect.frame());
        }
    }
    effect.pointer_leave();
    for _ in 0..20 {
        effect.frame();
    }

    let after: Vec<_> = effect.particles().iter().map(|p| p.origin()).collect();
    assert_eq!(before, after);
}

#[test]
fn absent_pointer_decays_strictly_toward_origin() {
    let pointer = Pointer::new(3000.0);
    for ease in [0.05, 0.5, 0.95] {
        for friction in [0.1, 0.5, 0.9] {
            for dx in [-20.0, -6.0, 0.0, 1.0, 13.0] {
                for dy in [-9.0, 0.0, 4.0, 20.0] {
                    if dx == 0.0 && dy == 0.0 {
                        continue;
                    }
                    let mut p = Particle::new(50.0, 50.0, Rgb::default(), 3.0, ease, friction);
                    p.x += dx;
                    p.y += dy;
                    let before = dx * dx + dy * dy;

                    p.update(&pointer);

                    let (ox, oy) = p.origin();
                    let after = (p.x - ox).powi(2) + (p.y - oy).powi(2);
                    assert!(after < before, "ease={ease} friction={friction} d=({dx},{dy})");
                }
            }
        }
    }
}

#[test]
fn rest_is_idempotent() {
    let pointer = Pointer::new(3000.0);
    let mut exact = Particle::new(7.0, 3.0, Rgb::default(), 3.0, 0.1, 0.9);
    exact.update(&pointer);
    assert_eq!((exact.x, exact.y), (7.0, 3.0));

    let mut near = Particle::new(7.0, 3.0, Rgb::default(), 3.0, 0.1, 0.9);
    near.x += 0.3;
    near.y -= 0.4;
    assert!(near.is_at_rest());
    for _ in 0..50 {
        near.update(&pointer);
        assert!(near.is_at_rest());
    }
}

#[test]
fn damped_trajectory_matches_closed_form() {
    const D: f64 = 40.0;
    const EASE: f64 = 0.1;
    let pointer = Pointer::new(3000.0);
    let mut p = Particle::new(100.0, 100.0, Rgb::default(), 3.0, EASE, 0.9);
    p.x += D;

    for n in 1..=30 {
        p.update(&pointer);
        let expected = D * (1.0 - EASE).powi(n);
        assert!((p.x - 100.0 - expected).abs() < 1e-9, "tick {n}");
        assert_eq!(p.y, 100.0);
    }
}

// === Lifecycle ===

#[test]
fn frames_only_run_while_animating() {
    let mut effect = red_image_effect(10, 5);
    assert_eq!(effect.scene().phase(), Phase::Idle);
    assert!(!effect.frame());

    assert_eq!(effect.pointer_move(6.0, 1.0), Schedule::RequestFrame);
    assert!(effect.frame());
    assert!(!effect.scene().is_at_rest());

    assert_eq!(effect.pointer_leave(), Schedule::StartDrainTimer);
    assert_eq!(effect.scene().phase(), Phase::Draining);
    assert!(effect.frame());
}

#[test]
fn drain_settles_once_particles_return() {
    let mut effect = red_image_effect(10, 5);
    effect.pointer_move(6.0, 1.0);
    effect.frame();
    effect.pointer_leave();

    let mut polls = 0;
    loop {
        effect.frame();
        polls += 1;
        match effect.drain_check(true) {
            Drain::Continue => assert!(polls < 10_000, "never settled"),
            Drain::Stop => break,
            Drain::Reset => panic!("visible surface was reset"),
        }
    }
    assert_eq!(effect.scene().phase(), Phase::Idle);
    assert!(effect.scene().is_at_rest());
    assert!(!effect.frame());
}

#[test]
fn leaving_viewport_mid_flight_resets_to_rest() {
    let mut effect = red_image_effect(10, 5);
    effect.pointer_move(6.0, 1.0);
    for _ in 0..3 {
        effect.frame();
    }
    effect.pointer_leave();
    assert!(offsets(effect.particles()).iter().any(|&o| o != (0.0, 0.0)));

    assert_eq!(effect.drain_check(false), Drain::Reset);

    assert_eq!(effect.scene().phase(), Phase::Idle);
    assert_eq!(effect.particles().len(), 4);
    assert!(offsets(effect.particles()).iter().all(|&o| o == (0.0, 0.0)));
    assert!(effect.particles().iter().all(|p| (p.vx, p.vy) == (0.0, 0.0)));
}

#[test]
fn reentering_while_draining_keeps_frames_running() {
    let mut effect = red_image_effect(10, 5);
    effect.pointer_move(6.0, 1.0);
    effect.pointer_leave();
    assert_eq!(effect.pointer_enter(), Schedule::StopDrainTimer);
    assert_eq!(effect.scene().phase(), Phase::Running);
    assert!(effect.frame());
}

/// Host side of the frame loop: fires each queued callback once and queues
/// it again while `frame()` asks for more.
fn fire_queued(effect: &mut ImageEffect<PixelBuffer>, queued: &mut usize) {
    let mut next = 0;
    for _ in 0..*queued {
        if effect.frame() {
            next += 1;
        }
    }
    *queued = next;
}

fn queue(schedule: Schedule, queued: &mut usize) {
    if schedule == Schedule::RequestFrame {
        *queued += 1;
    }
}

#[test]
fn reentry_after_drain_keeps_a_single_frame_chain() {
    let mut effect = red_image_effect(10, 5);
    let mut queued = 0;

    queue(effect.pointer_move(6.0, 1.0), &mut queued);
    for _ in 0..3 {
        fire_queued(&mut effect, &mut queued);
    }
    effect.pointer_leave();
    let mut polls = 0;
    loop {
        fire_queued(&mut effect, &mut queued);
        polls += 1;
        assert!(polls < 10_000, "never settled");
        if effect.drain_check(true) != Drain::Continue {
            break;
        }
    }
    assert_eq!(effect.scene().phase(), Phase::Idle);
    assert_eq!(queued, 1);

    // Pointer comes back before the last callback ran
    queue(effect.pointer_move(6.0, 1.0), &mut queued);
    assert_eq!(queued, 1);
    fire_queued(&mut effect, &mut queued);
    assert_eq!(queued, 1);
}

#[test]
fn reentry_after_cancel_keeps_a_single_frame_chain() {
    let mut effect = red_image_effect(10, 5);
    let mut queued = 0;

    queue(effect.pointer_move(6.0, 1.0), &mut queued);
    fire_queued(&mut effect, &mut queued);
    effect.set_gap(2.0);
    assert_eq!(effect.scene().phase(), Phase::Idle);

    assert_eq!(effect.pointer_move(6.0, 1.0), Schedule::Nothing);
    fire_queued(&mut effect, &mut queued);
    assert_eq!(queued, 1);

    // Once the chain has ended, the next move starts a new one
    effect.set_gap(5.0);
    fire_queued(&mut effect, &mut queued);
    assert_eq!(queued, 0);
    assert_eq!(effect.pointer_move(6.0, 1.0), Schedule::RequestFrame);
}

// === Image setters ===

#[test]
fn set_gap_resamples_and_cancels_animation() {
    let mut effect = red_image_effect(10, 5);
    effect.pointer_move(6.0, 1.0);
    effect.frame();

    assert_eq!(effect.set_gap(2.9), Schedule::Nothing);
    assert_eq!(effect.settings().gap, 2);
    assert_eq!(effect.scene().phase(), Phase::Idle);
    assert_eq!(effect.particles().len(), 25);
    assert!(effect.scene().is_at_rest());

    // Invalid gaps are ignored
    assert_eq!(effect.set_gap(0.4), Schedule::Nothing);
    assert_eq!(effect.set_gap(f64::NAN), Schedule::Nothing);
    assert_eq!(effect.settings().gap, 2);
}

#[test]
fn motion_setters_update_particles_in_place() {
    let mut effect = red_image_effect(10, 5);
    effect.pointer_move(6.0, 1.0);
    effect.frame();
    let displaced = offsets(effect.particles());

    effect.set_friction(0.5);
    effect.set_ease(0.25);
    effect.set_radius(6000.9);
    effect.set_friction(f64::INFINITY);

    assert_eq!(offsets(effect.particles()), displaced);
    assert!(effect.particles().iter().all(|p| p.friction == 0.5 && p.ease == 0.25));
    assert_eq!(effect.scene().pointer().radius, 6000.0);

    // Resampled particles keep the new motion
    effect.set_gap(2.0);
    assert!(effect.particles().iter().all(|p| p.friction == 0.5 && p.ease == 0.25));
}

#[test]
fn set_applies_option_subsets() {
    let mut effect = red_image_effect(10, 5);
    let options = ImageOptions::from_json(r#"{"particleSize": 5, "friction": 0.3, "radius": "far"}"#)
        .unwrap();
    assert_eq!(effect.set(&options), Schedule::Nothing);
    assert_eq!(effect.particles().len(), 4);
    assert!(effect.particles().iter().all(|p| p.friction == 0.3));
    assert_eq!(effect.scene().pointer().radius, 3000.0);

    effect.set(&ImageOptions::from_json(r#"{"gap": 1}"#).unwrap());
    assert_eq!(effect.particles().len(), 100);
}

#[test]
fn missing_image_shows_error_message() {
    let mut effect = ImageEffect::new(PixelBuffer::new(400, 100), ImageSettings::default());
    let err = effect.load(Bitmap::filled(0, 0, RED)).unwrap_err();
    assert!(matches!(err, crate::core::EffectError::InvalidImage { .. }));

    assert!(effect.particles().is_empty());
    let surface = effect.surface();
    assert!(surface.painted_pixels() > 0);
    assert_eq!(surface.pixel(200, 50), [255, 255, 255, 255]);
}

// === Text ===

#[test]
fn text_is_sampled_in_fill_colour() {
    let effect = text_effect(200, r#"{"font_size": 10, "color": "red", "particles": {"size": 2}}"#, "hi there");

    assert_eq!(effect.block().lines, vec!["hi there "]);
    assert_eq!(effect.surface().height(), 10);
    assert!(!effect.particles().is_empty());
    for p in effect.particles() {
        assert_eq!(p.color(), Rgb::new(255, 0, 0));
        assert_eq!(p.size, 2.0);
        assert_eq!(p.friction, 0.8);
    }
}

#[test]
fn narrow_wrap_width_adds_lines() {
    let effect = text_effect(200, r#"{"font_size": 10, "text_max_width": 0.1}"#, "hi there");
    assert_eq!(effect.max_text_width(), 20.0);
    assert_eq!(effect.block().lines, vec!["hi ", "there "]);
    assert_eq!(effect.surface().height(), 20);
}

#[test]
fn text_resize_follows_viewport_up_to_original_width() {
    let mut effect = text_effect(200, r#"{"font_size": 10}"#, "hello world");
    let wide = effect.particles().to_vec();

    effect.pointer_move(100.0, 5.0);
    assert_eq!(effect.resize(120), Schedule::Nothing);
    assert_eq!(effect.surface().width(), 120);
    assert_eq!(effect.text_x(), 60.0);
    assert_eq!(effect.scene().phase(), Phase::Idle);
    assert!(!effect.particles().is_empty());
    assert!(effect.scene().is_at_rest());

    effect.resize(500);
    assert_eq!(effect.surface().width(), 200);
    assert_eq!(effect.particles(), wide.as_slice());
    assert_eq!(effect.resize(900), Schedule::Nothing);
}

#[test]
fn trail_colour_changes_without_resampling() {
    let mut effect = text_effect(200, r#"{"font_size": 10}"#, "hello");
    effect.pointer_move(100.0, 5.0);
    effect.frame();
    assert!(!effect.scene().is_at_rest());

    let options = TextOptions::from_json(r#"{"particles": {"trail_color": "blue", "ease": 0.2}}"#).unwrap();
    assert_eq!(effect.set(&options, None), Schedule::Nothing);
    assert_eq!(effect.scene().trail(), Some("blue"));
    assert!(!effect.scene().is_at_rest());
    assert!(effect.particles().iter().all(|p| p.ease == 0.2));

    effect.set(&TextOptions::from_json(r#"{"particles": {"trail_color": "none"}}"#).unwrap(), None);
    assert_eq!(effect.scene().trail(), None);
}

#[test]
fn displaced_text_particles_draw_in_trail_colour() {
    let mut effect = text_effect(200, r#"{"font_size": 10, "particles": {"trail_color": "blue"}}"#, "hello");
    effect.pointer_move(100.0, 5.0);
    effect.frame();
    effect.frame();

    let moving = effect.particles().iter().filter(|p| !p.is_at_rest()).count();
    assert!(moving > 0);
    let blue = (0..effect.surface().width())
        .flat_map(|x| (0..effect.surface().height()).map(move |y| (x, y)))
        .filter(|&(x, y)| effect.surface().pixel(x, y) == [0, 0, 255, 255])
        .count();
    assert!(blue > 0);
}

#[test]
fn new_text_resamples() {
    let mut effect = text_effect(200, r#"{"font_size": 10}"#, "a");
    let one = effect.particles().len();
    effect.set_text("a a a");
    assert_eq!(effect.text(), "a a a");
    assert_eq!(effect.particles().len(), one * 3);
}

#[test]
fn text_leaving_viewport_rewraps_at_rest() {
    let mut effect = text_effect(200, r#"{"font_size": 10}"#, "hello world");
    effect.pointer_move(60.0, 5.0);
    for _ in 0..4 {
        effect.frame();
    }
    effect.pointer_leave();
    assert!(!effect.scene().is_at_rest());

    assert_eq!(effect.drain_check(false), Drain::Reset);
    assert!(offsets(effect.particles()).iter().all(|&o| o == (0.0, 0.0)));
}

#[test]
fn unsupported_spacing_still_renders() {
    let options = TextSettings::from_options(
        &TextOptions::from_json(r#"{"font_size": 10, "letter_spacing": 4}"#).unwrap(),
    );
    let plain = TextEffect::new(
        PixelBuffer::new(200, 1).without_spacing_support(),
        TextBox::new(200),
        "spaced",
        options.clone(),
    );
    let reference = text_effect(200, r#"{"font_size": 10}"#, "spaced");
    assert_eq!(plain.particles(), reference.particles());

    let spaced = TextEffect::new(PixelBuffer::new(200, 1), TextBox::new(200), "spaced", options);
    assert_ne!(spaced.particles(), reference.particles());
}

// === Perf ===

#[test]
fn frame_stats_only_collected_when_enabled() {
    let mut effect = red_image_effect(10, 5);
    effect.pointer_move(1.0, 1.0);
    effect.frame();
    assert_eq!(effect.scene().stats().frames(), 0);

    effect.scene_mut().enable_perf_metrics(true);
    effect.frame();
    effect.frame();
    let stats = effect.scene().stats();
    assert_eq!(stats.frames(), 2);
    assert_eq!(stats.particle_count(), 4);
    assert!(stats.frame_ms() >= 0.0);

    effect.scene_mut().enable_perf_metrics(false);
    assert_eq!(effect.scene().stats(), FrameStats::default());
}

// === Surface failures ===

/// Pixel buffer whose read-back can be switched off from outside.
struct Unreadable {
    inner: PixelBuffer,
    fail: Rc<Cell<bool>>,
}

impl Surface for Unreadable {
    type Image = Bitmap;

    fn width(&self) -> u32 { self.inner.width() }
    fn height(&self) -> u32 { self.inner.height() }
    fn resize(&mut self, width: u32, height: u32) { self.inner.resize(width, height) }
    fn clear(&mut self) { self.inner.clear() }
    fn fill_rect(&mut self, x: f64, y: f64, size: f64, paint: Paint<'_>) {
        self.inner.fill_rect(x, y, size, paint)
    }
    fn draw_image(&mut self, image: &Bitmap, x: f64, y: f64) { self.inner.draw_image(image, x, y) }
    fn image_size(image: &Bitmap) -> (u32, u32) { PixelBuffer::image_size(image) }

    fn read_pixels(&self) -> Result<Vec<u8>, SurfaceError> {
        if self.fail.get() {
            return Err(SurfaceError::ReadPixels("tainted".to_string()));
        }
        self.inner.read_pixels()
    }

    fn set_text_style(&mut self, style: &TextStyle) { self.inner.set_text_style(style) }
    fn set_letter_spacing(&mut self, px: f64) -> Result<(), SurfaceError> {
        self.inner.set_letter_spacing(px)
    }
    fn set_word_spacing(&mut self, px: f64) -> Result<(), SurfaceError> {
        self.inner.set_word_spacing(px)
    }
    fn measure_text(&self, text: &str) -> f64 { self.inner.measure_text(text) }
    fn fill_text(&mut self, text: &str, x: f64, y: f64) { self.inner.fill_text(text, x, y) }
    fn stroke_text(&mut self, text: &str, x: f64, y: f64) { self.inner.stroke_text(text, x, y) }
}

fn unreadable(width: u32, height: u32) -> (Unreadable, Rc<Cell<bool>>) {
    let fail = Rc::new(Cell::new(false));
    let surface = Unreadable { inner: PixelBuffer::new(width, height), fail: Rc::clone(&fail) };
    (surface, fail)
}

#[test]
fn failed_image_read_back_drops_stale_particles() {
    let (surface, fail) = unreadable(10, 10);
    let settings = ImageSettings { gap: 5, ..ImageSettings::default() };
    let mut effect = ImageEffect::new(surface, settings);
    effect.load(Bitmap::filled(10, 10, RED)).unwrap();
    assert_eq!(effect.particles().len(), 4);

    fail.set(true);
    assert!(matches!(
        effect.resample(),
        Err(crate::core::EffectError::Surface(SurfaceError::ReadPixels(_)))
    ));
    assert!(effect.particles().is_empty());

    fail.set(false);
    effect.set_gap(2.0);
    assert_eq!(effect.particles().len(), 25);
}

#[test]
fn failed_text_read_back_drops_stale_particles() {
    let (surface, fail) = unreadable(200, 1);
    let options = TextOptions::from_json(r#"{"font_size": 20}"#).unwrap();
    let mut effect =
        TextEffect::new(surface, TextBox::new(200), "stale", TextSettings::from_options(&options));
    assert!(!effect.particles().is_empty());

    fail.set(true);
    effect.resize(120);
    assert_eq!(effect.surface().width(), 120);
    assert!(effect.particles().is_empty());
}
