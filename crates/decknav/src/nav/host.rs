use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FullscreenError {
    #[error("fullscreen request denied: {0}")]
    Denied(String),
    #[error("fullscreen is not supported by this host")]
    Unsupported,
}

/// The rendering environment the navigation controller drives.
///
/// Geometry is reported relative to the top edge of the viewport, so a slide that
/// starts exactly at the top of the visible area has a top of `0.0`.
pub trait Host {
    /// Top edge of the slide at `index`, or `None` if it has not been laid out.
    fn slide_top(&self, index: usize) -> Option<f32>;

    fn viewport_size(&self) -> Size;

    fn has_focus(&self) -> bool;

    /// Whether the host is actually in fullscreen right now.
    fn is_fullscreen(&self) -> bool;

    /// Ask for fullscreen. Success only means the request was issued; the
    /// change itself is reported later as a fullscreen-change event.
    fn request_fullscreen(&mut self) -> Result<(), FullscreenError>;

    fn exit_fullscreen(&mut self);

    /// Smoothly scroll until the slide's top edge is at the top of the viewport.
    fn scroll_into_view(&mut self, index: usize);

    /// Apply the content scale factor, or remove it with `None`.
    fn set_scale_factor(&mut self, scale: Option<f32>);
}
