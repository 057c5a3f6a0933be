//! Hand landmark overlay rendering.
//!
//! Every call to [`Overlay::render`] redraws the whole target from scratch:
//!
//! 1. The target is cleared.
//! 2. The camera frame is drawn as background, if one is given.
//! 3. For every hand, the skeleton, the 21 landmark markers, and an info panel listing the state of
//!    each finger are drawn.
//!
//! Nothing is carried over between calls, so rendering the same input twice produces the same
//! output.

use std::sync::{Mutex, PoisonError, TryLockError};

use crate::{
    finger::{evaluate_hand, FingerStates},
    image::{Color, Image, Rect},
    landmark::{Hand, LandmarkPoint, CONNECTIVITY},
    surface::Surface,
};

/// Visual configuration of an [`Overlay`].
///
/// The [`Default`] style draws a green skeleton with red landmarks and a white info panel per hand
/// in the top left corner, stacked vertically.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub connector_color: Color,
    pub connector_width: u32,
    pub landmark_color: Color,
    pub landmark_radius: u32,
    /// Top left corner of the first hand's panel.
    pub panel_origin: (i32, i32),
    /// Width and height of each panel.
    pub panel_size: (u32, u32),
    /// Vertical distance between the top edges of consecutive panels.
    ///
    /// Values smaller than the panel height are raised to the panel height.
    pub panel_stride: u32,
    pub panel_color: Color,
    pub text_color: Color,
    /// Horizontal distance between the panel's left edge and its text.
    pub text_inset: i32,
    /// Distance between the panel's top edge and the baseline of the title line.
    pub title_offset: i32,
    pub line_height: i32,
    pub extended_glyph: char,
    pub flexed_glyph: char,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            connector_color: Color::from_rgb8(0x00, 0xFF, 0x00),
            connector_width: 2,
            landmark_color: Color::from_rgb8(0xFF, 0x00, 0x00),
            landmark_radius: 3,
            panel_origin: (10, 10),
            panel_size: (150, 130),
            panel_stride: 150,
            panel_color: Color::WHITE,
            text_color: Color::BLACK,
            text_inset: 10,
            title_offset: 25,
            line_height: 20,
            // The raster backend's fonts are ASCII-only.
            extended_glyph: '^',
            flexed_glyph: 'v',
        }
    }
}

/// Counts of what a single [`Overlay::render`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Number of hands whose annotations were drawn.
    pub drawn: usize,
    /// Number of hands skipped because of incomplete landmark data.
    pub skipped: usize,
}

/// Renders hand annotations onto a [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    style: OverlayStyle,
}

impl Overlay {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Redraws `target` with `background` and annotations for all `hands`.
    ///
    /// Each hand is a raw landmark sequence. Hands with fewer than 21 landmarks are skipped; the
    /// remaining hands keep the panel position belonging to their index in `hands`.
    pub fn render<S, H>(
        &self,
        target: &mut S,
        background: Option<&Image>,
        hands: &[H],
    ) -> RenderReport
    where
        S: Surface + ?Sized,
        H: AsRef<[LandmarkPoint]>,
    {
        target.clear();
        if let Some(background) = background {
            target.draw_image(background);
        }

        let mut report = RenderReport::default();
        for (index, points) in hands.iter().enumerate() {
            let hand = match Hand::from_points(points.as_ref()) {
                Ok(hand) => hand,
                Err(e) => {
                    log::debug!("skipping hand {index}: {e}");
                    report.skipped += 1;
                    continue;
                }
            };

            let rotation = hand.rotation_radians().to_degrees();
            if rotation.abs() > 45.0 {
                log::trace!(
                    "hand {index} is rotated by {rotation:.1} deg, finger states are unreliable"
                );
            }

            let states = evaluate_hand(&hand);
            log::trace!("hand {index}: {states}");
            self.draw_hand(target, &hand, &states, index);
            report.drawn += 1;
        }

        report
    }

    /// Draws the skeleton, landmarks, and info panel of a single hand.
    ///
    /// `index` determines where the info panel is placed (see [`Overlay::panel_rect`]).
    pub fn draw_hand<S: Surface + ?Sized>(
        &self,
        target: &mut S,
        hand: &Hand,
        states: &FingerStates,
        index: usize,
    ) {
        let style = &self.style;

        for (a, b) in CONNECTIVITY {
            let a = hand.landmark(*a);
            let b = hand.landmark(*b);
            target.draw_line(
                [a.x, a.y],
                [b.x, b.y],
                style.connector_color,
                style.connector_width,
            );
        }
        for p in hand.points() {
            target.fill_circle([p.x, p.y], style.landmark_radius, style.landmark_color);
        }

        let panel = self.panel_rect(index);
        target.fill_rect(panel, style.panel_color);

        let x = panel.x() + style.text_inset;
        let mut y = panel.y() + style.title_offset;
        target.draw_text(x, y, &format!("Hand {}:", index + 1), style.text_color);
        for (finger, extended) in states.iter() {
            y += style.line_height;
            let glyph = if extended {
                style.extended_glyph
            } else {
                style.flexed_glyph
            };
            target.draw_text(x, y, &format!("{finger}: {glyph}"), style.text_color);
        }
    }

    /// Returns the info panel rectangle of the hand at `index`.
    ///
    /// Panels of different indices never overlap.
    pub fn panel_rect(&self, index: usize) -> Rect {
        let (x, y) = self.style.panel_origin;
        let (width, height) = self.style.panel_size;
        let stride = self.style.panel_stride.max(height);
        let offset = i64::from(stride).saturating_mul(i64::try_from(index).unwrap_or(i64::MAX));
        let y = i64::from(y).saturating_add(offset).min(i64::from(i32::MAX)) as i32;
        Rect::from_top_left(x, y, width, height)
    }
}

/// The result of [`RenderSlot::try_render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(RenderReport),
    /// Another render to the same target was still in progress, so this frame was dropped.
    Skipped,
}

/// A render target that can be shared between frame callbacks.
///
/// Renders to the same target never interleave: if a render is requested while another one is
/// running, the new one is dropped and the target keeps showing the previous frame until the
/// running render completes.
#[derive(Debug, Default)]
pub struct RenderSlot<S> {
    target: Mutex<S>,
}

impl<S: Surface> RenderSlot<S> {
    pub fn new(target: S) -> Self {
        Self {
            target: Mutex::new(target),
        }
    }

    /// Renders a frame, unless a render to this target is already in progress.
    pub fn try_render<H: AsRef<[LandmarkPoint]>>(
        &self,
        overlay: &Overlay,
        background: Option<&Image>,
        hands: &[H],
    ) -> RenderOutcome {
        let mut target = match self.target.try_lock() {
            Ok(target) => target,
            // Every render starts by clearing the target, so content left over by a panicked render
            // is harmless.
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
            Err(TryLockError::WouldBlock) => {
                log::trace!("render in progress, dropping frame");
                return RenderOutcome::Skipped;
            }
        };

        RenderOutcome::Rendered(overlay.render(&mut *target, background, hands))
    }

    /// Grants access to the target, blocking until any in-progress render has finished.
    pub fn with_target<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut target)
    }

    pub fn into_inner(self) -> S {
        self.target
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread};

    use crate::{
        landmark::{tests::open_hand, LandmarkIdx},
        resolution::Resolution,
        surface::{DrawOp, Recorder},
    };

    use super::*;

    fn recorder() -> Recorder {
        Recorder::new(Resolution::OVERLAY)
    }

    #[test]
    fn zero_hands() {
        let overlay = Overlay::default();
        let mut rec = recorder();
        rec.fill_rect(Rect::from_top_left(0, 0, 1, 1), Color::RED);

        let hands: &[Vec<LandmarkPoint>] = &[];
        let report = overlay.render(&mut rec, None, hands);
        assert_eq!(report, RenderReport::default());
        assert_eq!(
            rec.ops(),
            &[DrawOp::ClearRect(Rect::from_top_left(0, 0, 720, 560))]
        );

        let background = Image::new(640, 480);
        overlay.render(&mut rec, Some(&background), hands);
        assert_eq!(
            rec.ops(),
            &[
                DrawOp::ClearRect(Rect::from_top_left(0, 0, 720, 560)),
                DrawOp::Image(Resolution::new(640, 480)),
            ]
        );
    }

    #[test]
    fn draw_order() {
        let overlay = Overlay::default();
        let mut rec = recorder();
        let background = Image::new(720, 560);
        let report = overlay.render(&mut rec, Some(&background), &[open_hand()]);
        assert_eq!(report.drawn, 1);

        let ops = rec.ops();
        assert!(matches!(ops[0], DrawOp::ClearRect(_)));
        assert!(matches!(ops[1], DrawOp::Image(_)));
        let lines = &ops[2..2 + CONNECTIVITY.len()];
        assert!(lines.iter().all(|op| matches!(op, DrawOp::Line { .. })));
        let circles = &ops[2 + CONNECTIVITY.len()..2 + CONNECTIVITY.len() + 21];
        assert!(circles.iter().all(|op| matches!(op, DrawOp::Circle { .. })));
        let rest = &ops[2 + CONNECTIVITY.len() + 21..];
        assert_eq!(
            rest[0],
            DrawOp::FillRect {
                rect: Rect::from_top_left(10, 10, 150, 130),
                color: Color::WHITE,
            }
        );
        assert_eq!(rest.len(), 1 + 6);

        let texts = rec.texts().collect::<Vec<_>>();
        assert_eq!(
            texts,
            ["Hand 1:", "Thumb: ^", "Index: ^", "Middle: ^", "Ring: ^", "Pinky: ^"]
        );
    }

    #[test]
    fn text_layout() {
        let overlay = Overlay::default();
        let mut rec = recorder();
        let mut flexed = open_hand();
        flexed[8].y = 400.0;
        overlay.render(&mut rec, None, &[open_hand(), flexed]);

        let positions = rec
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(positions[0], (20, 35, "Hand 1:"));
        assert_eq!(positions[1], (20, 55, "Thumb: ^"));
        assert_eq!(positions[5], (20, 135, "Pinky: ^"));
        assert_eq!(positions[6], (20, 185, "Hand 2:"));
        assert_eq!(positions[8], (20, 225, "Index: v"));
    }

    #[test]
    fn panels_do_not_overlap() {
        let overlay = Overlay::default();
        let mut rec = recorder();
        let hands = vec![open_hand(); 3];
        let report = overlay.render(&mut rec, None, &hands);
        assert_eq!(report.drawn, 3);

        let panels = rec.filled_rects().collect::<Vec<_>>();
        assert_eq!(panels.len(), 3);
        for (i, a) in panels.iter().enumerate() {
            assert_eq!(*a, overlay.panel_rect(i));
            for b in &panels[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn small_stride_is_raised() {
        let overlay = Overlay::new(OverlayStyle {
            panel_stride: 10,
            ..Default::default()
        });
        assert!(!overlay.panel_rect(0).intersects(&overlay.panel_rect(1)));
        assert_eq!(overlay.panel_rect(1).y(), 140);
        // Absurd indices don't overflow.
        overlay.panel_rect(usize::MAX);
    }

    #[test]
    fn incomplete_hand_is_skipped() {
        let overlay = Overlay::default();
        let mut rec = recorder();
        let short = open_hand()[..20].to_vec();
        let report = overlay.render(&mut rec, None, &[short, open_hand()]);
        assert_eq!(report, RenderReport { drawn: 1, skipped: 1 });

        // The complete hand keeps the panel of its own index.
        let panels = rec.filled_rects().collect::<Vec<_>>();
        assert_eq!(panels, [overlay.panel_rect(1)]);
        assert_eq!(rec.texts().next(), Some("Hand 2:"));
    }

    #[test]
    fn repeated_render_is_pixel_identical() {
        let overlay = Overlay::default();
        let background = Image::filled(Resolution::new(360, 280), Color::BLUE);
        let hands = [open_hand()];

        let mut target = Image::new(720, 560);
        overlay.render(&mut target, Some(&background), &hands);
        let first = target.clone();
        overlay.render(&mut target, Some(&background), &hands);
        assert_eq!(target, first);

        // Rendering with no hands afterwards leaves no annotations behind.
        overlay.render(&mut target, Some(&background), &[] as &[Vec<LandmarkPoint>]);
        assert_eq!(target, Image::filled(Resolution::OVERLAY, Color::BLUE));
    }

    #[test]
    fn stale_annotations_are_cleared_without_background() {
        let overlay = Overlay::default();
        let mut target = Image::new(720, 560);
        overlay.render(&mut target, None, &[open_hand()]);
        assert_eq!(target.get(150, 15), Color::WHITE);
        overlay.render(&mut target, None, &[] as &[Vec<LandmarkPoint>]);
        assert_eq!(target, Image::new(720, 560));
    }

    #[test]
    fn landmarks_far_outside_target() {
        let overlay = Overlay::default();
        let mut far_right = open_hand();
        far_right[LandmarkIdx::IndexFingerTip.index()] = LandmarkPoint::new(1e8, 300.0);
        let mut infinite = open_hand();
        infinite[LandmarkIdx::IndexFingerTip.index()] = LandmarkPoint::new(f32::INFINITY, 300.0);
        infinite[LandmarkIdx::PinkyTip.index()] = LandmarkPoint::new(300.0, f32::NAN);
        let mut far_left = open_hand();
        far_left[LandmarkIdx::ThumbTip.index()] = LandmarkPoint::new(-5e7, -900.0);

        let mut target = Image::new(720, 560);
        let report = overlay.render(&mut target, None, &[far_right, infinite, far_left]);
        assert_eq!(report, RenderReport { drawn: 3, skipped: 0 });

        // The clipped index finger line runs up to the right edge.
        assert!((299..=301).any(|y| target.get(719, y) == Color::GREEN));
        // Landmarks on the target and all three panels are still drawn.
        assert_eq!(target.get(360, 500), Color::RED);
        assert_eq!(target.get(360, 375), Color::RED);
        for i in 0..3 {
            let panel = overlay.panel_rect(i);
            let (x, y) = (panel.x() + panel.width() as i32 - 2, panel.y() + 2);
            assert_eq!(target.get(x as u32, y as u32), Color::WHITE, "panel {i}");
        }
    }

    #[test]
    fn slot_skips_overlapping_render() {
        let overlay = Overlay::default();
        let slot = RenderSlot::new(recorder());
        let (locked_tx, locked_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let slot_ref = &slot;
        thread::scope(|s| {
            s.spawn(move || {
                slot_ref.with_target(|_| {
                    locked_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                });
            });

            locked_rx.recv().unwrap();
            assert_eq!(
                slot.try_render(&overlay, None, &[open_hand()]),
                RenderOutcome::Skipped
            );
            release_tx.send(()).unwrap();
        });

        assert_eq!(
            slot.try_render(&overlay, None, &[open_hand()]),
            RenderOutcome::Rendered(RenderReport {
                drawn: 1,
                skipped: 0
            })
        );
        assert_eq!(slot.into_inner().filled_rects().count(), 1);
    }
}
