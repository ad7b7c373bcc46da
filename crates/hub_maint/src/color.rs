//! Hex color parsing and the pastel heuristic used by the theme filter.
//!
//! The classifier is deliberately approximate: a lightness threshold plus two
//! coarse channel tests for yellow and pink. It is not a color-space
//! computation and has known false positives.

/// Lightness above which a color counts as pastel.
pub const LIGHTNESS_THRESHOLD: f64 = 0.7;

/// Default multiplicative darkening factor.
pub const DEFAULT_DARKEN_FACTOR: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// HSL lightness: `(max + min) / 2`, normalized to `0.0..=1.0`.
    #[must_use]
    pub fn lightness(self) -> f64 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        (f64::from(max) + f64::from(min)) / 2.0 / 255.0
    }

    #[must_use]
    pub fn is_yellowish(self) -> bool {
        self.r > 180 && self.g > 180 && self.b < 150
    }

    #[must_use]
    pub fn is_pinkish(self) -> bool {
        self.r > 180 && self.g < 180 && self.b > 100
    }

    #[must_use]
    pub fn is_pastel(self) -> bool {
        self.lightness() > LIGHTNESS_THRESHOLD || self.is_yellowish() || self.is_pinkish()
    }

    /// Scale every channel by `factor`, rounding down.
    #[must_use]
    pub fn darken(self, factor: f64) -> Self {
        let scale = |channel: u8| -> u8 {
            let scaled = (f64::from(channel) * factor).floor();
            scaled.clamp(0.0, 255.0) as u8
        };
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Parse `#rrggbb` or `rrggbb`. Anything else yields `None`.
#[must_use]
pub fn parse_hex(value: &str) -> Option<Rgb> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

/// Malformed strings are never pastel.
#[must_use]
pub fn is_pastel_hex(value: &str) -> bool {
    parse_hex(value).is_some_and(Rgb::is_pastel)
}

#[must_use]
pub fn darken_hex(value: &str, factor: f64) -> Option<String> {
    parse_hex(value).map(|rgb| rgb.darken(factor).to_hex())
}

/// Accepts factors in `[0, 1)`, which guarantees a nonzero channel strictly
/// decreases.
pub fn parse_darken_factor(raw: &str) -> std::result::Result<f64, String> {
    let factor = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid darken factor: {raw}"))?;
    if (0.0..1.0).contains(&factor) {
        Ok(factor)
    } else {
        Err(format!("darken factor must be in [0, 1): {raw}"))
    }
}
