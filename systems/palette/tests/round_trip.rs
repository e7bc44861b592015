use digital_rain_core::{IndexedImage, Palette, Rgb};
use digital_rain_system_palette::{hsl_to_rgb, recolor_atlas, rgb_to_hsl, Hsl};

const HSL_TOLERANCE: f64 = 2.0 / 255.0;

fn hue_distance(left: f64, right: f64) -> f64 {
    let delta = (left - right).abs();
    delta.min(1.0 - delta)
}

#[test]
fn byte_colours_survive_conversion_through_hsl() {
    for red in (0..=255u8).step_by(5) {
        for green in (0..=255u8).step_by(5) {
            for blue in (0..=255u8).step_by(5) {
                let colour = Rgb::from_rgb(red, green, blue);
                assert_eq!(hsl_to_rgb(rgb_to_hsl(colour)), colour);
            }
        }
    }
}

#[test]
fn saturated_midtones_survive_conversion_through_bytes() {
    for hue_step in 0..32 {
        let hue = f64::from(hue_step) / 32.0;
        for saturation_step in 0..=10 {
            let saturation = 0.5 + f64::from(saturation_step) * 0.05;
            for lightness_step in 0..=10 {
                let lightness = 0.4 + f64::from(lightness_step) * 0.02;
                let input = Hsl::new(hue, saturation, lightness);

                let recovered = rgb_to_hsl(hsl_to_rgb(input));

                assert!(
                    hue_distance(recovered.hue, hue) <= HSL_TOLERANCE,
                    "hue drifted for {input:?}: {recovered:?}"
                );
                assert!((recovered.saturation - saturation).abs() <= HSL_TOLERANCE);
                assert!((recovered.lightness - lightness).abs() <= HSL_TOLERANCE);
            }
        }
    }
}

#[test]
fn recoloured_atlas_keeps_dimensions_and_lightness() {
    let palette = Palette::new(vec![
        Rgb::BLACK,
        Rgb::from_rgb(0, 64, 0),
        Rgb::from_rgb(0, 192, 0),
        Rgb::from_rgb(200, 255, 200),
    ])
    .expect("valid palette");
    let image = IndexedImage::new(4, 2, vec![0, 1, 2, 3, 3, 2, 1, 0]).expect("consistent image");

    let tinted = recolor_atlas(&image, &palette, 0.6).expect("recoloured atlas");

    assert_eq!(tinted.width(), 4);
    assert_eq!(tinted.height(), 2);
    assert_eq!(tinted.pixel(0, 0), Some(0));

    for (index, pixel) in image.indices().iter().zip(tinted.pixels()) {
        let before = rgb_to_hsl(palette.entries()[usize::from(*index)]).lightness;
        let after = rgb_to_hsl(Rgb::from_pixel(*pixel)).lightness;
        assert!((before - after).abs() <= 1.0 / 255.0);
    }
}
