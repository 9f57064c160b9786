//! Display style written by the core and read by the renderer.

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREY: Rgb = Rgb(100, 100, 100);
    /// Font colour while discovery is in flight.
    pub const LOADING: Rgb = Rgb(255, 255, 0);
    /// Font colour after discovery failed.
    pub const FAILED: Rgb = Rgb(255, 64, 64);
    /// Fill colour of a node the user has pinned.
    pub const PINNED: Rgb = Rgb(0, 255, 0);
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub color: Rgb,
    pub radius: u32,
    pub font_color: Rgb,
    pub label: String,
}

impl NodeStyle {
    pub const DEFAULT_RADIUS: u32 = 8;

    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            color: Rgb::GREY,
            radius: Self::DEFAULT_RADIUS,
            font_color: Rgb::WHITE,
            label: label.into(),
        }
    }
}
