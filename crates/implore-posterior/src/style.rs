//! Colours for marginal plots
//!
//! Nothing here touches global plotting state: a [`ColorCycle`] is owned by
//! the caller and handed to each plot that needs a default colour, and
//! filled contours get a [`ColorRamp`] from white to the plot colour.

use serde::{Deserialize, Serialize};

/// A color in RGBA format (0.0 to 1.0)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a color from RGB (alpha = 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Create a color from hex string (e.g., "#FF5733" or "FF5733")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;

        Some(Self::rgb(r, g, b))
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8
        )
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

/// The ten-colour categorical palette cycled through by default
pub const TAB10: [&str; 10] = [
    "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBD22", "#17BECF",
];

/// Caller-owned colour cycle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorCycle {
    position: usize,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next colour in the cycle, as a hex string
    pub fn next_color(&mut self) -> &'static str {
        let color = TAB10[self.position % TAB10.len()];
        self.position += 1;
        color
    }

    /// Restart from the first colour
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

/// Two-stop colour ramp over `[0, 1]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub low: Color,
    pub high: Color,
}

impl ColorRamp {
    /// Ramp from white to `color`
    pub fn from_white(color: Color) -> Self {
        Self {
            low: Color::white(),
            high: color,
        }
    }

    /// Sample the ramp at a position (0.0 to 1.0)
    pub fn sample(&self, t: f64) -> Color {
        Color::lerp(&self.low, &self.high, t as f32)
    }

    /// Fill colour of each band between consecutive levels
    ///
    /// Each band takes the ramp colour at its mid-level, with levels on the
    /// same 0 to 1 scale as the normalized density.
    pub fn band_colors(&self, levels: &[f64]) -> Vec<Color> {
        levels
            .windows(2)
            .map(|pair| self.sample((pair[0] + pair[1]) / 2.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::from_hex("#1F77B4").unwrap();
        assert_eq!(color.to_hex(), "#1F77B4");
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("blue").is_none());
    }

    #[test]
    fn test_cycle_wraps() {
        let mut cycle = ColorCycle::new();
        let first = cycle.next_color();
        for _ in 1..TAB10.len() {
            cycle.next_color();
        }
        assert_eq!(cycle.next_color(), first);
        cycle.reset();
        assert_eq!(cycle.next_color(), "#1F77B4");
    }

    #[test]
    fn test_ramp_and_bands() {
        let ramp = ColorRamp::from_white(Color::rgb(0.0, 0.0, 0.0));
        assert_eq!(ramp.sample(0.0), Color::white());
        assert_eq!(ramp.sample(1.0), Color::rgb(0.0, 0.0, 0.0));

        let bands = ramp.band_colors(&[0.0, 0.5, 1.0]);
        assert_eq!(bands.len(), 2);
        assert!((bands[0].r - 0.75).abs() < 1e-6);
        assert!((bands[1].r - 0.25).abs() < 1e-6);
    }
}
