pub mod browserbase;
pub mod deck;
pub mod engine;
pub mod error;
pub mod renderer;

pub use deck::{capture_deck, CaptureReport};
pub use engine::{PageShot, ScreenshotEngine};
pub use error::CaptureError;
pub use renderer::RemoteRenderer;
