pub mod controller;
pub mod recording;
pub mod surface;

pub use controller::{Phase, PopupController};
pub use surface::{ExtendedSurface, ItemView, PreviewSurface, SurfaceHost};
