//! 24-bit RGB color packed into 32-bit pixel words.
//!
//! Pixels travel through the engine as `u32` values laid out `0x??RRGGBB`.
//! The high byte carries no meaning and is masked off on every entry point.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseColorError;

/// Mask selecting the three color channels of a packed pixel.
pub const RGB_MASK: u32 = 0x00ff_ffff;

/// A color with three 8-bit channels.
///
/// # Example
///
/// ```
/// use color_quant::Rgb;
///
/// let orange = Rgb::from_packed(0xff_ff8000);
/// assert_eq!(orange, Rgb::new(255, 128, 0));
/// assert_eq!(orange.to_packed(), 0x00ff8000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a pixel word, ignoring the high byte.
    #[inline]
    pub const fn from_packed(pixel: u32) -> Self {
        Self {
            r: (pixel >> 16) as u8,
            g: (pixel >> 8) as u8,
            b: pixel as u8,
        }
    }

    /// Pack into `0x00RRGGBB`.
    #[inline]
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Squared Euclidean distance in RGB space.
    ///
    /// This is the only metric the engine uses: palette search, table
    /// construction and the acceleration grid all agree on it.
    #[inline]
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Build a color from floating point channels, rounding and clamping
    /// each to `0..=255`.
    #[inline]
    pub fn from_f32_clamped(r: f32, g: f32, b: f32) -> Self {
        Self::new(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[inline]
fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

impl From<u32> for Rgb {
    fn from(pixel: u32) -> Self {
        Self::from_packed(pixel)
    }
}

impl From<Rgb> for u32 {
    fn from(color: Rgb) -> Self {
        color.to_packed()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse a hex color.
    ///
    /// Accepts `#RRGGBB`, `RRGGBB`, `#RGB` and `RGB`, case-insensitive,
    /// surrounding whitespace trimmed. `0x` prefixes are accepted too since
    /// packed pixels are usually written that way.
    ///
    /// ```
    /// use color_quant::Rgb;
    ///
    /// let red: Rgb = "#F00".parse().unwrap();
    /// assert_eq!(red, Rgb::new(255, 0, 0));
    /// let teal: Rgb = "0x008080".parse().unwrap();
    /// assert_eq!(teal, Rgb::new(0, 128, 128));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }

        match s.len() {
            3 => {
                // Shorthand: 0xF -> 0xFF
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                Ok(Self::new(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

/// Parse a comma-separated list of hex colors, e.g. `"#000,#fff,#ff0000"`.
///
/// Empty items (trailing commas, blank input) are skipped.
pub fn parse_color_list(list: &str) -> Result<Vec<Rgb>, ParseColorError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Rgb::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_high_byte_ignored() {
        assert_eq!(Rgb::from_packed(0xff123456), Rgb::from_packed(0x00123456));
        assert_eq!(Rgb::from_packed(0xab123456).to_packed(), 0x00123456);
    }

    #[test]
    fn test_channel_order() {
        let c = Rgb::from_packed(0x00112233);
        assert_eq!((c.r, c.g, c.b), (0x11, 0x22, 0x33));
    }

    #[test]
    fn test_distance_squared() {
        assert_eq!(Rgb::BLACK.distance_squared(Rgb::WHITE), 3 * 255 * 255);
        assert_eq!(Rgb::new(10, 20, 30).distance_squared(Rgb::new(13, 16, 30)), 25);
        let a = Rgb::new(1, 200, 7);
        let b = Rgb::new(99, 3, 250);
        assert_eq!(a.distance_squared(b), b.distance_squared(a));
    }

    #[test]
    fn test_from_f32_clamped() {
        assert_eq!(Rgb::from_f32_clamped(-4.0, 127.5, 300.0), Rgb::new(0, 128, 255));
        assert_eq!(Rgb::from_f32_clamped(0.49, 254.5, 12.0), Rgb::new(0, 255, 12));
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("#FFFFFF".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("ffffff".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("#0f0".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 0));
        assert_eq!("  #102030 ".parse::<Rgb>().unwrap(), Rgb::new(16, 32, 48));
        assert_eq!("0x7f7f7f".parse::<Rgb>().unwrap(), Rgb::new(127, 127, 127));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("#12345".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
        assert!(matches!(
            "#GG0000".parse::<Rgb>(),
            Err(ParseColorError::InvalidHex(_))
        ));
        assert_eq!("#ééé".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let c = Rgb::new(0xde, 0xad, 0x0f);
        assert_eq!(c.to_string(), "#dead0f");
        assert_eq!(c.to_hex().parse::<Rgb>().unwrap(), c);
    }

    #[test]
    fn test_parse_color_list() {
        let colors = parse_color_list("#000, #fff,,#ff0000,").unwrap();
        assert_eq!(colors, vec![Rgb::BLACK, Rgb::WHITE, Rgb::new(255, 0, 0)]);
        assert!(parse_color_list("").unwrap().is_empty());
        assert!(parse_color_list("#000,nope").is_err());
    }
}
