use std::{env, fs, process};

use fingerpose::{
    driver::{Cadence, Detections, FrameLoop, IterFrames},
    image::Image,
    landmark::LandmarkPoint,
    overlay::Overlay,
    Error,
};

const USAGE: &str = "usage: fingerpose <background image> <landmark file> <output png> [--normalized]

The landmark file lists one `x y [z]` point per line, 21 per hand, with an empty line between
hands. Lines starting with `#` are ignored. With `--normalized`, coordinates are in range 0..=1 and
get scaled to the background image's size.";

fn main() -> Result<(), Error> {
    fingerpose::init_logger!();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let (background, landmarks, output, normalized) = match &args[..] {
        [b, l, o] => (b, l, o, false),
        [b, l, o, flag] if flag == "--normalized" => (b, l, o, true),
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let background = Image::load(background)?;
    let mut hands = parse_landmarks(&fs::read_to_string(landmarks)?)?;
    if normalized {
        let (w, h) = (background.width() as f32, background.height() as f32);
        for p in hands.iter_mut().flatten() {
            p.x *= w;
            p.y *= h;
        }
    }
    log::info!("read {} hands from {}", hands.len(), landmarks);

    let mut target = Image::new(background.width(), background.height());
    let detector = move |_: &Image| -> Result<Detections, Error> { Ok(hands.clone()) };
    let mut frame_loop = FrameLoop::new(
        IterFrames(Some(background).into_iter()),
        detector,
        Overlay::default(),
    )
    .cadence(Cadence::Continuous);

    if let Some(report) = frame_loop.step(&mut target)? {
        if let Some(render) = report.render {
            log::info!(
                "rendered {} hands, skipped {} with incomplete landmarks",
                render.drawn,
                render.skipped
            );
        }
    }

    target.save(output)?;
    Ok(())
}

fn parse_landmarks(text: &str) -> Result<Detections, Error> {
    let mut hands = Vec::new();
    let mut current = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            if !current.is_empty() {
                hands.push(std::mem::take(&mut current));
            }
            continue;
        }

        let coords = line
            .split_whitespace()
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("line {}: {e}", lineno + 1))?;
        let point = match coords[..] {
            [x, y] => LandmarkPoint::new(x, y),
            [x, y, z] => LandmarkPoint::with_z(x, y, z),
            _ => {
                return Err(format!(
                    "line {}: expected 2 or 3 coordinates, got {}",
                    lineno + 1,
                    coords.len()
                )
                .into())
            }
        };
        current.push(point);
    }
    if !current.is_empty() {
        hands.push(current);
    }

    Ok(hands)
}
