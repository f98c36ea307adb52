//! Slide navigation: current-slide tracking, fragment stepping, fullscreen
//! mode switching and fullscreen content scaling.

pub mod controller;
pub mod host;
pub mod keys;

pub use controller::{
    DESIGN_HEIGHT, DESIGN_WIDTH, Handled, NavEvent, NavigationController, REALIGN_DELAY,
};
pub use host::{FullscreenError, Host, Size};
pub use keys::{Action, Key};
