//! Browser automation module
//!
//! This module provides headless browser control through ChromiumOxide:
//! lifecycle management, bounded navigation and rendering, and the
//! [`BrowserDriver`] seam the fetch layer depends on.

pub mod controller;
pub mod driver;
pub mod navigation;

pub use controller::{BrowserConfig, BrowserController, PageHandle};
pub use driver::{BrowserDriver, ChromeDriver};
pub use navigation::{PageNavigator, RenderOptions};
