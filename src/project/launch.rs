//! Window launch configuration handed to the wrapper.

use serde::{Deserialize, Serialize};

/// Initial window placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchPosition {
    /// Centered on the primary display
    #[default]
    Centered,
    /// Top-left corner
    TopLeft,
    /// Top-right corner
    TopRight,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom-right corner
    BottomRight,
    /// Left to the window manager
    Manual,
}

/// How the packaged application opens its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchOptions {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Width as a share of the screen, overrides `width` when set
    pub width_percentage: Option<f64>,
    /// Height as a share of the screen, overrides `height` when set
    pub height_percentage: Option<f64>,
    /// Initial window placement
    pub position: LaunchPosition,
    /// Create a desktop shortcut on install
    pub create_desktop_shortcut: bool,
    /// Pin to the dock or taskbar on install
    pub add_to_dock: bool,
    /// Expose the web inspector
    pub enable_developer_tools: bool,
    /// URL the window navigates to on start
    pub entry_url: String,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            width: 1020,
            height: 768,
            width_percentage: None,
            height_percentage: None,
            position: LaunchPosition::Centered,
            create_desktop_shortcut: true,
            add_to_dock: false,
            enable_developer_tools: false,
            entry_url: String::new(),
        }
    }
}
