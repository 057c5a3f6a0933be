use fingerpose::{
    driver::{Cadence, Detections, FrameLoop, IterFrames},
    finger::{self, Finger},
    image::{Color, Image},
    landmark::{Hand, LandmarkIdx, LandmarkPoint, CONNECTIVITY},
    overlay::{Overlay, OverlayStyle, RenderReport},
    resolution::Resolution,
    surface::{DrawOp, Recorder},
};

fn random_hand(rng: &mut fastrand::Rng) -> Vec<LandmarkPoint> {
    (0..21)
        .map(|_| LandmarkPoint::new(200.0 + rng.f32() * 500.0, rng.f32() * 560.0))
        .collect()
}

#[test]
fn index_extended_thumb_flexed() {
    let mut points = vec![LandmarkPoint::new(0.0, 300.0); 21];
    points[LandmarkIdx::IndexFingerTip.index()].y = 100.0;
    points[LandmarkIdx::IndexFingerDip.index()].y = 150.0;
    points[LandmarkIdx::ThumbTip.index()].y = 200.0;
    points[LandmarkIdx::ThumbIp.index()].y = 150.0;

    let states = finger::evaluate(&points).unwrap();
    assert!(states.get(Finger::Index));
    assert!(!states.get(Finger::Thumb));
    assert_eq!(
        states.iter().map(|(f, _)| f).collect::<Vec<_>>(),
        Finger::ALL
    );
}

#[test]
fn incomplete_data_is_an_error_not_a_panic() {
    let points = vec![LandmarkPoint::default(); 5];
    let err = finger::evaluate(&points).unwrap_err();
    assert_eq!(err.found(), 5);
    let err: fingerpose::Error = err.into();
    assert!(err.to_string().contains("incomplete landmark data"));
}

#[test]
fn raster_render_is_deterministic() {
    let mut rng = fastrand::Rng::with_seed(7);
    let overlay = Overlay::default();
    let background = Image::filled(Resolution::new(64, 48), Color::from_rgb8(30, 30, 30));

    for _ in 0..5 {
        let hands = (0..rng.usize(0..4))
            .map(|_| random_hand(&mut rng))
            .collect::<Vec<_>>();

        let mut a = Image::new(720, 560);
        let mut b = Image::filled(Resolution::OVERLAY, Color::RED);
        overlay.render(&mut a, Some(&background), &hands);
        overlay.render(&mut b, Some(&background), &hands);
        overlay.render(&mut b, Some(&background), &hands);
        assert!(a == b, "render output depends on previous target contents");
    }
}

#[test]
fn panels_positioned_by_index() {
    let mut rng = fastrand::Rng::with_seed(99);
    let overlay = Overlay::default();
    let hands = (0..3).map(|_| random_hand(&mut rng)).collect::<Vec<_>>();
    let mut target = Image::new(720, 560);
    let report = overlay.render(&mut target, None, &hands);
    assert_eq!(
        report,
        RenderReport {
            drawn: 3,
            skipped: 0
        }
    );

    // Top right corner of each panel is white and not touched by text. Random hands are kept to the
    // right of the panels.
    for i in 0..3 {
        let panel = overlay.panel_rect(i);
        let x = (panel.x() + panel.width() as i32 - 2) as u32;
        let y = (panel.y() + 2) as u32;
        assert_eq!(target.get(x, y), Color::WHITE, "panel {i}");
    }
    // Gap between panels stays transparent.
    assert_eq!(target.get(80, 145), Color::NULL);
}

#[test]
fn recorded_counts() {
    let mut rng = fastrand::Rng::with_seed(1);
    let overlay = Overlay::new(OverlayStyle {
        extended_glyph: '+',
        flexed_glyph: '-',
        ..Default::default()
    });
    let mut rec = Recorder::new(Resolution::OVERLAY);
    let hands = vec![random_hand(&mut rng), random_hand(&mut rng)];
    overlay.render(&mut rec, None, &hands);

    let count = |f: fn(&DrawOp) -> bool| rec.ops().iter().filter(|op| f(op)).count();
    assert_eq!(count(|op| matches!(op, DrawOp::Line { .. })), 2 * CONNECTIVITY.len());
    assert_eq!(count(|op| matches!(op, DrawOp::Circle { .. })), 2 * 21);
    assert_eq!(count(|op| matches!(op, DrawOp::FillRect { .. })), 2);
    assert_eq!(count(|op| matches!(op, DrawOp::Text { .. })), 2 * 6);

    for (i, hand) in hands.iter().enumerate() {
        let states = finger::evaluate(hand).unwrap();
        let lines = rec.texts().skip(i * 6 + 1).take(5).collect::<Vec<_>>();
        for ((finger, extended), line) in states.iter().zip(lines) {
            let glyph = if extended { '+' } else { '-' };
            assert_eq!(line, format!("{}: {glyph}", finger.name()));
        }
    }
}

#[test]
fn frame_loop_end_to_end() {
    let frames = vec![Image::filled(Resolution::new(72, 56), Color::BLUE); 4];
    let mut n = 0;
    let detector = move |frame: &Image| -> Result<Detections, fingerpose::Error> {
        n += 1;
        let mut hand = Hand::from_points(&vec![LandmarkPoint::new(0.5, 0.5); 21])?;
        hand.scale(frame.width() as f32 * 10.0, frame.height() as f32 * 10.0);
        // Every other frame reports one truncated hand in addition.
        let mut hands = vec![hand.points().to_vec()];
        if n % 2 == 0 {
            hands.push(hand.points()[..10].to_vec());
        }
        Ok(hands)
    };

    let mut frame_loop =
        FrameLoop::new(IterFrames(frames.into_iter()), detector, Overlay::default())
            .cadence(Cadence::Continuous);
    let mut target = Image::new(720, 560);
    let mut reports = Vec::new();
    while let Some(report) = frame_loop.step(&mut target).unwrap() {
        reports.push(report);
    }

    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0].render.unwrap(), RenderReport { drawn: 1, skipped: 0 });
    assert_eq!(reports[1].detected, 2);
    assert_eq!(reports[1].render.unwrap(), RenderReport { drawn: 1, skipped: 1 });

    // Background fills the target, the landmark cluster sits in the middle.
    assert_eq!(target.get(700, 540), Color::BLUE);
    assert_eq!(target.get(360, 280), Color::RED);
}
