use serde::{Deserialize, Serialize};

/// Color representation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Red color: `#FF0000FF`
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Gray color: `#808080FF`
    pub const GRAY: Color = Color::rgba(128, 128, 128, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs color from RGB channels and an opacity in `0.0..=1.0`, the way CSS `rgba()`
    /// notation gives it.
    pub fn rgb_opacity(r: u8, g: u8, b: u8, opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b, a }
    }

    /// Alpha channel.
    pub fn alpha(&self) -> u8 {
        self.a
    }

    /// Returns true if the color is fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Converts the color into CSS notation: `rgba(r, g, b, opacity)`.
    pub fn to_css(&self) -> String {
        let opacity = self.a as f32 / 255.0;
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, (opacity * 100.0).round() / 100.0)
    }

    /// Parses a color from the hex string. Hex string can be either HEX6 (`#RRGGBB`) or HEX8
    /// (`#RRGGBBAA`).
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if hex_string.len() != 7 && hex_string.len() != 9 || !hex_string.starts_with('#') {
            return None;
        }

        let r = u8::from_str_radix(hex_string.get(1..3)?, 16).ok()?;
        let g = u8::from_str_radix(hex_string.get(3..5)?, 16).ok()?;
        let b = u8::from_str_radix(hex_string.get(5..7)?, 16).ok()?;
        let a = if hex_string.len() == 9 {
            u8::from_str_radix(hex_string.get(7..9)?, 16).ok()?
        } else {
            255
        };

        Some(Self::rgba(r, g, b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let color = Color::rgba(255, 0, 0, 13);
        assert_eq!(color.to_hex(), "#FF00000D");
        assert_eq!(Color::try_from_hex("#FF00000D"), Some(color));
        assert_eq!(Color::try_from_hex("#808080"), Some(Color::GRAY));
        assert_eq!(Color::try_from_hex("808080"), None);
        assert_eq!(Color::try_from_hex("#80808"), None);
    }

    #[test]
    fn css_opacity() {
        let faint_red = Color::rgb_opacity(255, 0, 0, 0.05);
        assert_eq!(faint_red.alpha(), 13);
        assert_eq!(faint_red.to_css(), "rgba(255, 0, 0, 0.05)");
        assert_eq!(Color::GRAY.to_css(), "rgba(128, 128, 128, 1)");
        assert!(Color::TRANSPARENT.is_transparent());
    }
}
