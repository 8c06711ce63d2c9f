use glam::Vec3;

/// Unpacks a `0xRRGGBB` value into sRGB components in `[0, 1]`.
pub fn hex_to_srgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Converts CSS style HSL (hue in degrees, saturation and lightness in
/// percent) to sRGB.
pub fn hsl_to_srgb(hue_degrees: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = (hue_degrees / 360.0).rem_euclid(1.0);
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let high = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let low = 2.0 * l - high;
    Vec3::new(
        hue_channel(low, high, h + 1.0 / 3.0),
        hue_channel(low, high, h),
        hue_channel(low, high, h - 1.0 / 3.0),
    )
}

fn hue_channel(low: f32, high: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        low + (high - low) * 6.0 * t
    } else if t < 0.5 {
        high
    } else if t < 2.0 / 3.0 {
        low + (high - low) * 6.0 * (2.0 / 3.0 - t)
    } else {
        low
    }
}

pub fn srgb_to_linear(color: Vec3) -> Vec3 {
    let channel = |c: f32| {
        if c < 0.04045 {
            c * 0.0773993808
        } else {
            (c * 0.9478672986 + 0.0521327014).powf(2.4)
        }
    };
    Vec3::new(channel(color.x), channel(color.y), channel(color.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn unpacks_hex() {
        assert!(close(hex_to_srgb(0xff8000), Vec3::new(1.0, 128.0 / 255.0, 0.0)));
        assert_eq!(hex_to_srgb(0x000000), Vec3::ZERO);
    }

    #[test]
    fn converts_primary_hues() {
        assert!(close(hsl_to_srgb(0.0, 100.0, 50.0), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_srgb(120.0, 100.0, 50.0), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(hsl_to_srgb(360.0, 100.0, 50.0), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_srgb(42.0, 0.0, 30.0), Vec3::splat(0.3)));
    }

    #[test]
    fn cell_hues_stay_red() {
        let color = hsl_to_srgb(355.0, 75.0, 56.0);
        assert!(color.x > color.y && color.x > color.z);
    }

    #[test]
    fn linearization_keeps_endpoints() {
        assert!(close(srgb_to_linear(Vec3::ZERO), Vec3::ZERO));
        assert!(close(srgb_to_linear(Vec3::ONE), Vec3::ONE));
        assert!(srgb_to_linear(Vec3::splat(0.5)).x < 0.5);
    }
}
