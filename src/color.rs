/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Colors and the visual-mode palette.
//!
//! All channels are linear `f32` in [0.0, 1.0]. Hex helpers exist for hosts
//! that hand colors straight to a web renderer.

/// An RGB triple with channels in [0.0, 1.0]. Defaults to black.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Rgb {
    /// Saturated red, the CRITICAL alert color.
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    /// Yellow, the non-critical marker color.
    pub const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);
    /// White.
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    /// Construct from channels, no clamping.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Construct from a 24-bit `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse `"#RRGGBB"` (leading `#` optional). Returns `None` on anything else.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// HSL to RGB. `h`, `s` and `l` are all in [0.0, 1.0] (hue as a turn fraction).
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::new(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    }

    /// Channels quantised to bytes.
    pub fn to_u8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// `0xRRGGBB` packing, the form Three.js materials take.
    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_u8();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Map an oscillator frequency to its display color.
///
/// Low (< 20 Hz) red, mid (< 40 Hz) orange, high yellow.
pub fn frequency_color(frequency_hz: f32) -> Rgb {
    if frequency_hz < 20.0 {
        Rgb::from_hex(0xFF4444)
    } else if frequency_hz < 40.0 {
        Rgb::from_hex(0xFF8844)
    } else {
        Rgb::from_hex(0xFFFF44)
    }
}

// ─── VisualMode ─────────────────────────────────────────────────────────────

/// Rendering palette for the wave-field mesh.
///
/// Selects color only; geometry and alerting are identical across modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VisualMode {
    /// Ground-motion palette (orange).
    #[default]
    Seismic,
    /// Geomagnetic palette (teal).
    Electromagnetic,
    /// Schumann-harmonic palette (violet).
    Harmonic,
}

impl VisualMode {
    /// Every mode, in palette-table order.
    pub const ALL: [VisualMode; 3] = [
        VisualMode::Seismic,
        VisualMode::Electromagnetic,
        VisualMode::Harmonic,
    ];

    /// Base mesh color for this mode.
    pub fn color(self) -> Rgb {
        match self {
            VisualMode::Seismic => Rgb::from_hex(0xff6b35),
            VisualMode::Electromagnetic => Rgb::from_hex(0x4ecdc4),
            VisualMode::Harmonic => Rgb::from_hex(0xa855f7),
        }
    }

    /// Parse the mode names used by the dashboard shell (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
    }

    /// Lowercase mode name.
    pub fn name(self) -> &'static str {
        match self {
            VisualMode::Seismic => "seismic",
            VisualMode::Electromagnetic => "electromagnetic",
            VisualMode::Harmonic => "harmonic",
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
