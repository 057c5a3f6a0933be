//! V4L2 webcam access.
//!
//! Currently, only V4L2 `VIDEO_CAPTURE` devices yielding JFIF JPEG or Motion JPEG frames are
//! supported.

use std::env;

use linuxvideo::{
    format::{PixFormat, Pixelformat},
    stream::ReadStream,
    CapabilityFlags, Device,
};

use crate::{driver::FrameSource, image::Image, resolution::Resolution, timer::Timer};

const ENV_VAR_WEBCAM_NAME: &str = "FINGERPOSE_WEBCAM_NAME";

/// Device selection and format options for [`Webcam::open`].
#[derive(Debug, Clone, Default)]
pub struct WebcamOptions {
    name: Option<String>,
    resolution: Resolution,
}

impl WebcamOptions {
    /// Sets the name of the webcam device to open.
    ///
    /// If no webcam with the given name can be found, opening the webcam will result in an error.
    /// Takes precedence over the `FINGERPOSE_WEBCAM_NAME` environment variable.
    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the requested image resolution.
    ///
    /// The device may pick a different one. Defaults to [`Resolution::OVERLAY`].
    pub fn resolution(self, resolution: Resolution) -> Self {
        Self { resolution, ..self }
    }
}

/// A webcam yielding a stream of [`Image`]s.
pub struct Webcam {
    stream: ReadStream,
    width: u32,
    height: u32,
    t_dequeue: Timer,
    t_decode: Timer,
}

impl Webcam {
    /// Opens the first supported webcam found.
    ///
    /// This function can block for a significant amount of time while the webcam initializes (on
    /// the order of hundreds of milliseconds).
    pub fn open(options: WebcamOptions) -> Result<Self, crate::Error> {
        let name = options.name.clone().or_else(|| env::var(ENV_VAR_WEBCAM_NAME).ok());
        if let Some(name) = &name {
            log::debug!("looking for webcam named '{name}'");
        }

        for res in linuxvideo::list()? {
            match res {
                Ok(dev) => match Self::open_impl(dev, name.as_deref(), options.resolution) {
                    Ok(Some(webcam)) => return Ok(webcam),
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("{}", e);
                    }
                },
                Err(e) => {
                    log::warn!("{}", e);
                }
            }
        }

        match name {
            Some(name) => Err(format!("no supported webcam named '{name}' found").into()),
            None => Err("no supported webcam device found".into()),
        }
    }

    fn open_impl(
        dev: Device,
        name: Option<&str>,
        resolution: Resolution,
    ) -> Result<Option<Self>, crate::Error> {
        let caps = dev.capabilities()?;
        if let Some(name) = name {
            if caps.card() != name {
                return Ok(None);
            }
        }

        let cap_flags = caps.device_capabilities();
        let path = dev.path()?;
        log::debug!(
            "device {} ({}) capabilities: {:?}",
            caps.card(),
            path.display(),
            cap_flags,
        );

        if !cap_flags.contains(CapabilityFlags::VIDEO_CAPTURE) {
            return Ok(None);
        }

        let capture = dev.video_capture(PixFormat::new(
            resolution.width(),
            resolution.height(),
            Pixelformat::MJPG,
        ))?;

        let format = capture.format();
        let width = format.width();
        let height = format.height();
        match format.pixelformat() {
            Pixelformat::JPEG | Pixelformat::MJPG => {}
            e => return Err(format!("unsupported pixel format {}", e).into()),
        }

        log::info!(
            "opened {} ({}), {}x{}",
            caps.card(),
            path.display(),
            width,
            height,
        );

        let stream = capture.into_stream(2)?;

        Ok(Some(Self {
            stream,
            width,
            height,
            t_dequeue: Timer::new("dequeue"),
            t_decode: Timer::new("decode"),
        }))
    }

    /// Reads the next frame from the camera.
    ///
    /// If no frame is available, this method will block until one is.
    pub fn read(&mut self) -> Result<Image, crate::Error> {
        let dequeue_guard = self.t_dequeue.start();
        let image = self.stream.dequeue(|buf| {
            drop(dequeue_guard);
            let image = match self.t_decode.time(|| Image::decode_jpeg(&buf)) {
                Ok(image) => image,
                Err(e) => {
                    // Webcams occasionally produce corrupted MJPG frames. A blank frame yields no
                    // detections and is overwritten by the next one.
                    log::error!("webcam decode error: {}", e);
                    Image::new(self.width, self.height)
                }
            };
            Ok(image)
        })?;
        Ok(image)
    }

    /// Returns profiling timers for webcam access and decoding.
    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [&self.t_dequeue, &self.t_decode]
    }
}

impl FrameSource for Webcam {
    fn next_frame(&mut self) -> Result<Option<Image>, crate::Error> {
        self.read().map(Some)
    }
}
