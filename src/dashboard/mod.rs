//! Graphical front ends
//!
//! The desktop window and the compact mobile window. Both drive an
//! [`OcrController`](crate::app::OcrController) through a shared presenter.

pub mod app;
pub mod components;
pub mod launch;
pub mod mobile;
pub mod presenter;
pub mod theme;

pub use app::{run_desktop, DesktopApp};
pub use mobile::{run_mobile, MobileApp};
pub use presenter::UiPresenter;
