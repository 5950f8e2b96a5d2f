//! LC-Finder picture viewer core
//!
//! This crate contains:
//! - The picture viewer: three preloading slots, the background loader,
//!   zoom/pan geometry, pointer/touch/keyboard handling and the slide
//!   transition
//! - File iteration and deletion with domain events
//! - Configuration
//! - Error types
//! - Image decoding
//! - The interaction-thread event loop

pub mod config;
pub mod error;
pub mod events;
pub mod file_iterator;
pub mod image_loader;
pub mod runtime;
pub mod viewer;

pub use config::{AppConfig, FilerConfig, GeneralConfig, ViewerConfig, ViewerMode};
pub use error::ViewerError;
pub use events::{DomainEvent, EventBus};
pub use file_iterator::{neighbor_paths, FileIterator, PathListIterator};
pub use image_loader::{load_image_sync, DecodedImage, ImageLoader, ImageSource};
pub use runtime::ViewerLoop;
pub use viewer::{PictureViewer, ViewerChrome, ViewerServices};
