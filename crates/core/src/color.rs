//! Color primitives for the gradient engine.
//!
//! HSL is the working representation throughout the engine; RGB only appears
//! at the edges (hex input, terminal cell output).

/// RGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse a 3- or 6-digit hex color. The leading `#` is optional and the
    /// 3-digit form expands each nibble by duplication (`#18f` -> `#1188ff`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let expanded;
        let hex = if hex.len() == 3 {
            expanded = hex.chars().flat_map(|c| [c, c]).collect::<String>();
            expanded.as_str()
        } else {
            hex
        };
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Rgb { r, g, b })
    }
}

/// HSL color: hue in degrees [0, 360), saturation and lightness in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn from_rgb(rgb: Rgb) -> Self {
        let r = rgb.r as f64 / 255.0;
        let g = rgb.g as f64 / 255.0;
        let b = rgb.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        // Achromatic: hue is undefined, report 0.
        if max == min {
            return Hsl {
                h: 0.0,
                s: 0.0,
                l: l * 100.0,
            };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl {
            h: h * 60.0,
            s: s * 100.0,
            l: l * 100.0,
        }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        Rgb::from_hex(hex).map(Self::from_rgb)
    }

    pub fn to_rgb(self) -> Rgb {
        let s = self.s / 100.0;
        let l = self.l / 100.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = self.h.rem_euclid(360.0);
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Rgb {
            r: ((r + m) * 255.0).round() as u8,
            g: ((g + m) * 255.0).round() as u8,
            b: ((b + m) * 255.0).round() as u8,
        }
    }

    /// CSS color string with each component rounded to 2 decimal places.
    pub fn to_css(self) -> String {
        format!("hsl({:.2}, {:.2}%, {:.2}%)", self.h, self.s, self.l)
    }

    /// Move toward `target` by fraction `t`, taking the shortest hue arc.
    pub fn lerp_toward(self, target: Hsl, t: f64) -> Hsl {
        Hsl {
            h: interp_hue(self.h, target.h, t),
            s: lerp(self.s, target.s, t),
            l: lerp(self.l, target.l, t),
        }
    }

    /// Tolerance compare on the source scale: hue within `eps * 10` degrees,
    /// saturation and lightness within `eps * 100` points. Hue gets the
    /// tighter absolute bound since small hue swings read as larger shifts.
    /// Hue distance is measured around the wheel, so 359.99° and 0° compare
    /// as close; the tween approaches targets on the seam from below and
    /// would otherwise never register as converged.
    pub fn within(self, other: Hsl, eps: f64) -> bool {
        let dh = (self.h - other.h).abs().rem_euclid(360.0);
        dh.min(360.0 - dh) <= eps * 10.0
            && (self.s - other.s).abs() <= eps * 100.0
            && (self.l - other.l).abs() <= eps * 100.0
    }
}

/// Linear interpolation. `t` is not clamped; callers pre-clamp where needed.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Shortest-arc hue interpolation. The signed difference is mapped into
/// [-180, 180) so 350° -> 10° passes through 0°, never backward through 180°.
pub fn interp_hue(a: f64, b: f64, t: f64) -> f64 {
    let d = (b - a + 540.0).rem_euclid(360.0) - 180.0;
    (a + d * t).rem_euclid(360.0)
}

/// Symmetric cubic ease, used to shape motion within a single palette step.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
