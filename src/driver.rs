//! Frame loop driving detection and rendering.
//!
//! The landmark model and the camera are external collaborators, abstracted by the
//! [`LandmarkSource`] and [`FrameSource`] traits. [`FrameLoop`] pulls a frame, runs detection on
//! it, and renders the result. Every frame is processed independently.

use std::{
    thread,
    time::{Duration, Instant},
};

use crate::{
    image::Image,
    landmark::LandmarkPoint,
    overlay::{Overlay, RenderReport},
    surface::Surface,
    timer::{FpsCounter, Timer},
};

/// Raw landmark sequences of all hands detected in one frame.
pub type Detections = Vec<Vec<LandmarkPoint>>;

/// A source of camera frames.
pub trait FrameSource {
    /// Returns the next frame, or `None` when the stream has ended.
    ///
    /// This may block until a frame is available.
    fn next_frame(&mut self) -> Result<Option<Image>, crate::Error>;
}

/// Adapter turning an iterator over [`Image`]s into a [`FrameSource`].
#[derive(Debug, Clone)]
pub struct IterFrames<I>(pub I);

impl<I: Iterator<Item = Image>> FrameSource for IterFrames<I> {
    fn next_frame(&mut self) -> Result<Option<Image>, crate::Error> {
        Ok(self.0.next())
    }
}

/// A hand landmark detector.
///
/// Implementations return the landmarks of every detected hand, in display coordinates of the
/// frame passed in.
pub trait LandmarkSource {
    fn detect(&mut self, frame: &Image) -> Result<Detections, crate::Error>;
}

impl<F> LandmarkSource for F
where
    F: FnMut(&Image) -> Result<Detections, crate::Error>,
{
    fn detect(&mut self, frame: &Image) -> Result<Detections, crate::Error> {
        self(frame)
    }
}

/// How often the [`FrameLoop`] processes frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Process frames as fast as the frame source delivers them.
    Continuous,
    /// Start processing a frame at most once per interval.
    Interval(Duration),
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Interval(Duration::from_millis(100))
    }
}

/// What happened to a single frame in [`FrameLoop::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Number of hands the landmark source returned.
    pub detected: usize,
    /// `None` if detection failed and the target was left untouched.
    pub render: Option<RenderReport>,
}

/// Drives frame acquisition, landmark detection and overlay rendering.
pub struct FrameLoop<F, L> {
    frames: F,
    landmarks: L,
    overlay: Overlay,
    cadence: Cadence,
    draw_background: bool,
    max_hands: Option<usize>,
    last_start: Option<Instant>,
    t_detect: Timer,
    t_render: Timer,
    fps: FpsCounter,
}

impl<F: FrameSource, L: LandmarkSource> FrameLoop<F, L> {
    /// Creates a frame loop with the default [`Cadence`] that draws the frame as background.
    pub fn new(frames: F, landmarks: L, overlay: Overlay) -> Self {
        Self {
            frames,
            landmarks,
            overlay,
            cadence: Cadence::default(),
            draw_background: true,
            max_hands: None,
            last_start: None,
            t_detect: Timer::new("detect"),
            t_render: Timer::new("render"),
            fps: FpsCounter::new("frame loop"),
        }
    }

    pub fn cadence(self, cadence: Cadence) -> Self {
        Self { cadence, ..self }
    }

    /// Sets whether the camera frame is drawn underneath the annotations.
    ///
    /// Disable this when the target is composited over the live video by other means.
    pub fn draw_background(self, draw_background: bool) -> Self {
        Self {
            draw_background,
            ..self
        }
    }

    /// Limits how many of the detected hands get rendered per frame.
    ///
    /// Hands past the limit are dropped in the order the landmark source returned them. Landmark
    /// models usually have a setting like this themselves (MediaPipe Hands is typically run with
    /// at most 2 hands); this is for sources that don't. `None`, the default, renders all hands.
    pub fn max_hands(self, max_hands: Option<usize>) -> Self {
        Self { max_hands, ..self }
    }

    /// Processes a single frame.
    ///
    /// Returns `Ok(None)` once the frame source has ended. Errors from the frame source are
    /// returned, errors from the landmark source are logged and leave `target` showing the
    /// previous frame.
    pub fn step<S: Surface + ?Sized>(
        &mut self,
        target: &mut S,
    ) -> Result<Option<FrameReport>, crate::Error> {
        self.wait_for_cadence();

        let frame = match self.frames.next_frame()? {
            Some(frame) => frame,
            None => {
                log::debug!("frame source ended");
                return Ok(None);
            }
        };

        let landmarks = &mut self.landmarks;
        let mut hands = match self.t_detect.time(|| landmarks.detect(&frame)) {
            Ok(hands) => hands,
            Err(e) => {
                log::warn!("landmark detection failed: {e}");
                return Ok(Some(FrameReport {
                    detected: 0,
                    render: None,
                }));
            }
        };
        let detected = hands.len();
        log::trace!("detected {detected} hands in {frame:?}");
        if let Some(max) = self.max_hands {
            if detected > max {
                log::debug!("rendering {max} of {detected} detected hands");
                hands.truncate(max);
            }
        }

        let background = self.draw_background.then_some(&frame);
        let overlay = &self.overlay;
        let report = self
            .t_render
            .time(|| overlay.render(target, background, &hands));

        Ok(Some(FrameReport {
            detected,
            render: Some(report),
        }))
    }

    /// Processes frames until the frame source ends, returning the number of frames processed.
    pub fn run<S: Surface + ?Sized>(&mut self, target: &mut S) -> Result<usize, crate::Error> {
        let mut count = 0;
        while self.step(target)?.is_some() {
            count += 1;
            self.fps.tick_with([&self.t_detect, &self.t_render]);
        }
        Ok(count)
    }

    /// Returns profiling timers for detection and rendering.
    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [&self.t_detect, &self.t_render]
    }

    pub fn into_parts(self) -> (F, L, Overlay) {
        (self.frames, self.landmarks, self.overlay)
    }

    fn wait_for_cadence(&mut self) {
        if let (Cadence::Interval(interval), Some(last)) = (self.cadence, self.last_start) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last_start = Some(Instant::now());
    }
}
