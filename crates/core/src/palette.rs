//! Maps a scroll fraction to the target color pair.
//!
//! The scroll range is divided into a fixed number of hue steps. Within a
//! step the hue eases between the two neighboring anchors; lightness ramps
//! linearly across the whole page. Near the bottom the computed color is
//! blended back toward a darkened version of the top color so the page ends
//! on a dark anchor instead of an arbitrary hue.

use crate::color::{ease_in_out_cubic, interp_hue, lerp, Hsl};
use crate::config::BackdropSettings;

// How strongly the end color trails the background per component. The hue
// follows the full crossfade; saturation and lightness trail it.
const END_SATURATION_TRAIL: f64 = 0.7;
const END_LIGHTNESS_TRAIL: f64 = 0.9;
// Small floor on the crossfade outside the bottom-blend region so the end
// color starts moving as soon as the page does.
const END_MIX_FLOOR: f64 = 0.02;

/// Resolved target colors for one scroll position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollColors {
    /// Background top color.
    pub bg: Hsl,
    /// Gradient end color, trailing `bg` by a bounded crossfade.
    pub end: Hsl,
    /// Step index the position falls into, for cheap boundary detection.
    pub step: usize,
}

/// Precomputed step table derived from [`BackdropSettings`].
pub struct Palette {
    top: Hsl,
    end: Hsl,
    steps: usize,
    delta_hue: f64,
    saturation: f64,
    lightness_min: f64,
    lightness_max: f64,
    bottom_blend_start: f64,
    top_darken_at_bottom: f64,
    bottom_hue_pull: f64,
    bottom_saturation_scale: f64,
    end_crossfade_max: f64,
}

impl Palette {
    pub fn new(settings: &BackdropSettings) -> Result<Self, anyhow::Error> {
        let top = Hsl::from_hex(&settings.top_color)
            .ok_or_else(|| anyhow::anyhow!("invalid top color: {:?}", settings.top_color))?;
        let end = Hsl::from_hex(&settings.end_color)
            .ok_or_else(|| anyhow::anyhow!("invalid end color: {:?}", settings.end_color))?;

        // A single step would divide by zero below.
        let steps = settings.steps.max(2) as usize;

        Ok(Self {
            top,
            end,
            steps,
            delta_hue: settings.hue_spread / (steps - 1) as f64,
            saturation: settings.saturation,
            lightness_min: settings.lightness_min,
            lightness_max: settings.lightness_max,
            bottom_blend_start: settings.bottom_blend_start,
            top_darken_at_bottom: settings.top_darken_at_bottom,
            bottom_hue_pull: settings.bottom_hue_pull,
            bottom_saturation_scale: settings.bottom_saturation_scale,
            end_crossfade_max: settings.end_crossfade_max,
        })
    }

    /// Exact configured top color.
    pub fn top(&self) -> Hsl {
        self.top
    }

    /// Exact configured end color.
    pub fn end(&self) -> Hsl {
        self.end
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Hue anchor at a given step index, wrapped into [0, 360).
    pub fn hue_at_step(&self, idx: usize) -> f64 {
        (self.top.h + idx.min(self.steps - 1) as f64 * self.delta_hue).rem_euclid(360.0)
    }

    /// Step index for a scroll fraction.
    pub fn step_index(&self, fraction: f64) -> usize {
        (fraction.clamp(0.0, 1.0) * (self.steps - 1) as f64).floor() as usize
    }

    /// Resolve the target color pair for a scroll fraction in [0, 1].
    /// Pure and deterministic; fractions outside the range are clamped.
    pub fn resolve(&self, fraction: f64) -> ScrollColors {
        // Anchor invariant: the very top of the page is always the exact
        // configured pair, never the limit of the formula below.
        if fraction <= 0.0 {
            return ScrollColors {
                bg: self.top,
                end: self.end,
                step: 0,
            };
        }

        let f = fraction.clamp(0.0, 1.0);
        let pos = f * (self.steps - 1) as f64;
        let idx = pos.floor() as usize;
        let t = ease_in_out_cubic(pos - idx as f64);

        let hue_a = self.hue_at_step(idx);
        let hue_b = self.hue_at_step(idx + 1);
        let hue = interp_hue(hue_a, hue_b, t);

        // Lightness ramps across the whole page, independent of the steps.
        let lightness = lerp(self.lightness_min, self.lightness_max, f);

        let in_blend = f >= self.bottom_blend_start;
        let bg = if in_blend {
            let local = (f - self.bottom_blend_start) / (1.0 - self.bottom_blend_start).max(1e-6);
            let dark_top_l = (self.top.l - self.top_darken_at_bottom).max(0.0);
            Hsl {
                h: interp_hue(hue, self.top.h, local * self.bottom_hue_pull),
                s: lerp(
                    self.saturation,
                    self.saturation * self.bottom_saturation_scale,
                    local,
                ),
                l: lerp(lightness, dark_top_l, local),
            }
        } else {
            Hsl {
                h: hue,
                s: self.saturation,
                l: lightness,
            }
        };

        // The end color follows the background by a capped, never-complete
        // crossfade so the gradient can't flatten to a single color.
        let mix = if in_blend {
            (f * self.end_crossfade_max).min(self.end_crossfade_max)
        } else {
            (END_MIX_FLOOR + f * self.end_crossfade_max).min(self.end_crossfade_max)
        };
        let end = Hsl {
            h: interp_hue(self.end.h, bg.h, mix),
            s: lerp(self.end.s, bg.s, mix * END_SATURATION_TRAIL),
            l: lerp(self.end.l, bg.l, mix * END_LIGHTNESS_TRAIL),
        };

        ScrollColors { bg, end, step: idx }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn palette() -> Palette {
        Palette::new(&BackdropSettings::default()).unwrap()
    }

    #[test]
    fn test_resolve_zero_is_exact_base_pair() {
        let palette = palette();
        let resolved = palette.resolve(0.0);
        assert_eq!(resolved.bg, palette.top());
        assert_eq!(resolved.end, palette.end());
        assert_eq!(resolved.step, 0);

        // Holds for any configuration, not just the defaults.
        let mut settings = BackdropSettings::default();
        settings.top_color = "#a1b2c3".to_string();
        settings.end_color = "#321".to_string();
        settings.steps = 5;
        let palette = Palette::new(&settings).unwrap();
        assert_eq!(palette.resolve(0.0).bg, palette.top());
        assert_eq!(palette.resolve(0.0).end, palette.end());
    }

    #[test]
    fn test_negative_fraction_clamps_to_top() {
        let palette = palette();
        assert_eq!(palette.resolve(-0.5), palette.resolve(0.0));
    }

    #[test]
    fn test_step_index() {
        let palette = palette();
        assert_eq!(palette.step_index(0.0), 0);
        assert_eq!(palette.step_index(0.5), 14);
        assert_eq!(palette.step_index(1.0), 29);
        assert_eq!(palette.step_index(2.0), 29);
    }

    #[test]
    fn test_single_step_config_does_not_divide_by_zero() {
        let mut settings = BackdropSettings::default();
        settings.steps = 1;
        let palette = Palette::new(&settings).unwrap();
        assert_eq!(palette.steps(), 2);
        let resolved = palette.resolve(0.5);
        assert!(resolved.bg.h.is_finite());
    }

    #[test]
    fn test_hue_anchors_stay_in_range_for_negative_spread() {
        // Palette::new doesn't validate, so a negative spread must still
        // produce anchors in [0, 360) rather than negative hues.
        let mut settings = BackdropSettings::default();
        settings.hue_spread = -360.0;
        let palette = Palette::new(&settings).unwrap();
        for idx in 0..palette.steps() {
            let h = palette.hue_at_step(idx);
            assert!((0.0..360.0).contains(&h), "hue {h} at step {idx}");
        }
    }

    #[test]
    fn test_lightness_ramps_monotonically_below_blend_start() {
        let palette = palette();
        let mut last = palette.resolve(0.001).bg.l;
        let mut f = 0.01;
        while f < 0.92 {
            let l = palette.resolve(f).bg.l;
            assert!(
                l >= last,
                "lightness decreased from {last} to {l} at fraction {f}"
            );
            last = l;
            f += 0.01;
        }
    }

    #[test]
    fn test_mid_page_hue_lies_between_step_anchors() {
        let palette = palette();
        let resolved = palette.resolve(0.5);
        assert_eq!(resolved.step, 14);

        let hue_a = palette.hue_at_step(14);
        let hue_b = palette.hue_at_step(15);
        let (lo, hi) = if hue_a <= hue_b {
            (hue_a, hue_b)
        } else {
            (hue_b, hue_a)
        };
        assert!(
            resolved.bg.h >= lo && resolved.bg.h <= hi,
            "hue {} outside anchors [{lo}, {hi}]",
            resolved.bg.h
        );
    }

    #[test]
    fn test_bottom_blend_returns_to_darkened_top() {
        let settings = BackdropSettings::default();
        let palette = palette();
        let bottom = palette.resolve(1.0);

        // At the very bottom the lightness lands exactly on the darkened
        // top lightness, well below the unblended ramp maximum, and the
        // saturation is pulled down to the configured scale.
        let dark_top_l = (palette.top().l - settings.top_darken_at_bottom).max(0.0);
        assert_relative_eq!(bottom.bg.l, dark_top_l, epsilon = 1e-9);
        assert!(bottom.bg.l < settings.lightness_max);
        assert_relative_eq!(
            bottom.bg.s,
            settings.saturation * settings.bottom_saturation_scale,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_bottom_blend_pulls_hue_toward_top() {
        fn hue_distance(a: f64, b: f64) -> f64 {
            let d = (a - b).abs() % 360.0;
            d.min(360.0 - d)
        }

        let mut settings = BackdropSettings::default();
        let blended = Palette::new(&settings).unwrap().resolve(0.95);

        // Same position with the blend pushed past it: the raw formula.
        settings.bottom_blend_start = 0.9999;
        let raw_palette = Palette::new(&settings).unwrap();
        let raw = raw_palette.resolve(0.95);

        let top_hue = raw_palette.top().h;
        assert!(
            hue_distance(blended.bg.h, top_hue) < hue_distance(raw.bg.h, top_hue),
            "blend did not pull hue back toward the top color"
        );
        assert!(blended.bg.l < raw.bg.l, "blend did not darken the ramp");
    }

    #[test]
    fn test_end_color_never_matches_background() {
        let palette = palette();
        let mut f = 0.01;
        while f <= 1.0 {
            let resolved = palette.resolve(f);
            assert!(
                resolved.bg != resolved.end,
                "gradient flattened at fraction {f}"
            );
            f += 0.01;
        }
    }

    #[test]
    fn test_end_crossfade_is_bounded() {
        let palette = palette();
        let base_end = palette.end();
        let cap = BackdropSettings::default().end_crossfade_max;

        for f in [0.1, 0.3, 0.5, 0.8, 0.95, 1.0] {
            let resolved = palette.resolve(f);
            let full_shift = (resolved.bg.l - base_end.l).abs();
            let end_shift = (resolved.end.l - base_end.l).abs();
            assert!(
                end_shift <= full_shift * cap * 0.9 + 1e-9,
                "end lightness moved {end_shift} of {full_shift} at fraction {f}"
            );
        }
    }
}
