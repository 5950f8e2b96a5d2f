//! Image decoding collaborator
//!
//! The viewer asks an [`ImageSource`] for a picture and gets the decoded
//! pixels back through a completion callback, on whatever thread the source
//! decodes on. [`ImageLoader`] is the default source: one worker thread fed
//! by a channel, reading the file in chunks so it can report progress.

use crate::ViewerError;
use crossbeam_channel::{unbounded, Sender};
use image::ImageReader;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

const READ_CHUNK: usize = 64 * 1024;

/// Decoded RGBA8 picture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Load progress in percent (0.0 ..= 100.0)
pub type ProgressCallback = Box<dyn Fn(f32) + Send>;

/// Receives the decoded picture, or `None` when it could not be decoded
pub type DoneCallback = Box<dyn FnOnce(Option<DecodedImage>) + Send>;

/// Asynchronous picture decoding
pub trait ImageSource: Send + Sync {
    /// Start decoding `path`. Callbacks may run on any thread; `on_done` is
    /// called exactly once.
    fn request_image(&self, path: &Path, on_progress: ProgressCallback, on_done: DoneCallback);
}

/// Load request
struct LoadRequest {
    path: PathBuf,
    on_progress: ProgressCallback,
    on_done: DoneCallback,
}

/// Default image source backed by the `image` crate
pub struct ImageLoader {
    request_tx: Option<Sender<LoadRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl ImageLoader {
    /// Create a new image loader with its own decode thread
    pub fn new() -> Result<Self, ViewerError> {
        let (request_tx, request_rx) = unbounded::<LoadRequest>();

        let worker = std::thread::Builder::new()
            .name("image-decoder".into())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let image = match load_image_sync(&request.path, &request.on_progress) {
                        Ok(image) => Some(image),
                        Err(e) => {
                            tracing::warn!("Cannot load {}: {}", request.path.display(), e);
                            None
                        }
                    };
                    (request.on_done)(image);
                }
                tracing::debug!("Image decoder stopped");
            })
            .map_err(|e| ViewerError::Thread(e.to_string()))?;

        Ok(Self {
            request_tx: Some(request_tx),
            worker: Some(worker),
        })
    }
}

impl ImageSource for ImageLoader {
    fn request_image(&self, path: &Path, on_progress: ProgressCallback, on_done: DoneCallback) {
        let request = LoadRequest {
            path: path.to_path_buf(),
            on_progress,
            on_done,
        };
        let Some(tx) = self.request_tx.as_ref() else {
            (request.on_done)(None);
            return;
        };
        if let Err(e) = tx.send(request) {
            tracing::warn!("Image decoder is gone");
            (e.into_inner().on_done)(None);
        }
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Image decoder panicked");
            }
        }
    }
}

/// Read and decode a picture, reporting read progress
pub fn load_image_sync(path: &Path, on_progress: &dyn Fn(f32)) -> Result<DecodedImage, ViewerError> {
    tracing::debug!("Loading image: {}", path.display());

    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ViewerError::FileNotFound(path.display().to_string()),
        _ => ViewerError::Io(e),
    })?;
    let total = file.metadata()?.len() as usize;

    let mut data = Vec::with_capacity(total);
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut last_percent = -1i32;
    on_progress(0.0);
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        if total > 0 {
            let percent = (data.len().min(total) * 100 / total) as i32;
            if percent != last_percent {
                last_percent = percent;
                on_progress(percent as f32);
            }
        }
    }
    if last_percent != 100 {
        on_progress(100.0);
    }

    let img = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()?
        .decode()?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_load_sync_decodes_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 4, 3);

        let seen = Mutex::new(Vec::new());
        let img = load_image_sync(&path, &|p| seen.lock().push(p)).unwrap();
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.pixels.len(), 4 * 3 * 4);
        assert_eq!(&img.pixels[..4], &[10, 20, 30, 255]);

        let seen = seen.into_inner();
        assert_eq!(seen.first(), Some(&0.0));
        assert_eq!(seen.last(), Some(&100.0));
    }

    #[test]
    fn test_load_sync_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_image_sync(&dir.path().join("none.png"), &|_| {});
        assert!(matches!(missing, Err(ViewerError::FileNotFound(_))));

        let text = dir.path().join("notes.png");
        std::fs::write(&text, b"definitely not a picture").unwrap();
        assert!(load_image_sync(&text, &|_| {}).is_err());
    }

    #[test]
    fn test_loader_callbacks() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 2, 2);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"xx").unwrap();

        let loader = ImageLoader::new().unwrap();
        let (tx, rx) = bounded(2);
        let progress = Arc::new(Mutex::new(0.0f32));

        let tx_good = tx.clone();
        let progress_sink = progress.clone();
        loader.request_image(
            &good,
            Box::new(move |p| *progress_sink.lock() = p),
            Box::new(move |img| tx_good.send(img.map(|i| i.width)).unwrap()),
        );
        loader.request_image(&bad, Box::new(|_| {}), Box::new(move |img| tx.send(img.map(|i| i.width)).unwrap()));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Some(2));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), None);
        assert_eq!(*progress.lock(), 100.0);
    }
}
