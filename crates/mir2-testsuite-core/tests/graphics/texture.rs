use expect_test::expect;
use mir2_graphics::texture::TextureErrorKind;
use mir2_graphics::Texture;
use rstest::rstest;

/// A `width × height` texture whose byte `i` holds `i % 256`.
fn gradient(width: u16, height: u16) -> Texture {
    let len = usize::from(width) * usize::from(height) * 3;
    let pixels = (0..len).map(|i| u8::try_from(i % 256).unwrap()).collect();
    Texture::new(pixels, width, height).unwrap()
}

fn filled(width: u16, height: u16, rgb: [u8; 3]) -> Texture {
    let pixels = rgb.repeat(usize::from(width) * usize::from(height));
    Texture::new(pixels, width, height).unwrap()
}

/// Asserts which pixels of `texture` still hold `rgb`.
fn assert_mask(texture: &Texture, rgb: [u8; 3], mask: &[&str]) {
    for (y, row) in mask.iter().enumerate() {
        for (x, cell) in row.chars().enumerate() {
            let pixel = texture.pixel_at(i32::try_from(x).unwrap(), i32::try_from(y).unwrap());
            assert_eq!(pixel == rgb, cell == '#', "pixel ({x}, {y}) is {pixel:?}");
        }
    }
}

#[test]
fn construction_rejects_mismatched_length() {
    let e = Texture::new(vec![0; 5], 2, 2).unwrap_err();

    assert_eq!(e.kind, TextureErrorKind::InvalidLength { expected: 12, actual: 5 });
    expect![[r#"
        [Texture] RGB data length does not match width * height * 3: expected 12, got 5
    "#]]
    .assert_eq(&format!("{e}\n"));
}

#[rstest]
#[case::empty_sentinel(Texture::empty())]
#[case::zero_width(Texture::new(Vec::new(), 0, 7).unwrap())]
#[case::single_row(Texture::blank(9, 1))]
#[case::single_column(Texture::blank(1, 9))]
fn degenerate_textures_are_empty(#[case] texture: Texture) {
    assert!(texture.is_empty());
    assert!(texture.to_rgb8().is_none());

    texture.clear();
    texture.inverse();
    texture.blend_add(&filled(4, 4, [200; 3]), 0, 0);

    assert!(!texture.dirty());
}

#[test]
fn dirty_is_consumed_on_read() {
    let texture = gradient(4, 4);
    assert!(!texture.dirty());

    texture.clear();

    assert!(texture.dirty());
    assert!(!texture.dirty());
}

#[test]
fn whole_buffer_operations_touch_every_pixel() {
    let texture = filled(4, 4, [255; 3]);

    texture.clear();

    assert_eq!(texture.rgb_bytes(), vec![0; 48]);
}

#[rstest]
#[case::clear(|t: &Texture| t.clear_region(1, 1, 100, 100))]
#[case::to_gray(|t: &Texture| t.to_gray_region(1, 1, 100, 100))]
#[case::inverse(|t: &Texture| t.inverse_region(1, 1, 100, 100))]
#[case::alpha(|t: &Texture| t.alpha_region(0.5, 1, 1, 100, 100))]
fn region_far_edge_is_pulled_back(#[case] op: fn(&Texture)) {
    let texture = filled(4, 4, [255; 3]);

    op(&texture);

    assert_mask(&texture, [255; 3], &["####", "#..#", "#..#", "####"]);
    assert!(texture.dirty());
}

#[test]
fn region_inside_bounds_is_exact() {
    let texture = filled(4, 4, [255; 3]);

    texture.clear_region(0, 0, 2, 3);

    assert_mask(&texture, [255; 3], &["..##", "..##", "..##", "####"]);
}

#[rstest]
#[case::negative_x(-1, 0)]
#[case::negative_y(0, -1)]
#[case::past_right_edge(5, 0)]
#[case::past_bottom_edge(0, 5)]
fn region_with_corner_outside_is_ignored(#[case] x: i32, #[case] y: i32) {
    let texture = gradient(4, 4);
    let before = texture.rgb_bytes();

    texture.clear_region(x, y, 2, 2);
    texture.inverse_region(x, y, 2, 2);
    texture.to_gray_region(x, y, 2, 2);
    texture.alpha_region(0.5, x, y, 2, 2);

    assert_eq!(texture.rgb_bytes(), before);
    assert!(!texture.dirty());
}

#[test]
fn to_gray_scales_channels_independently() {
    let texture = filled(2, 2, [100, 200, 50]);

    texture.to_gray();

    assert_eq!(texture.pixel_at(1, 1), [29, 117, 5]);
}

#[test]
fn to_gray_region_leaves_the_rest() {
    let texture = filled(3, 3, [100, 200, 50]);

    texture.to_gray_region(0, 0, 1, 1);

    assert_eq!(texture.pixel_at(0, 0), [29, 117, 5]);
    assert_eq!(texture.pixel_at(1, 0), [100, 200, 50]);
}

#[test]
fn inverse_complements_channels() {
    let texture = filled(2, 2, [0, 255, 10]);

    texture.inverse();
    assert_eq!(texture.pixel_at(0, 1), [255, 0, 245]);

    texture.inverse();
    assert_eq!(texture.pixel_at(0, 1), [0, 255, 10]);
}

#[test]
fn alpha_truncates_and_wraps() {
    let half = filled(2, 2, [255, 3, 0]);
    half.alpha(0.5);
    assert_eq!(half.pixel_at(0, 0), [127, 1, 0]);

    let double = filled(2, 2, [200, 100, 1]);
    double.alpha(2.0);
    assert_eq!(double.pixel_at(0, 0), [144, 200, 2]);
}

#[test]
fn alpha_region_is_clamped() {
    let texture = filled(3, 3, [200; 3]);

    texture.alpha_region(0.5, 1, 0, 10, 10);

    assert_mask(&texture, [100; 3], &[".#.", ".#.", "..."]);
}

#[test]
fn clip_extracts_sub_rectangle() {
    let texture = gradient(4, 4);

    let clipped = texture.clip(1, 1, 2, 2);

    assert_eq!((clipped.width(), clipped.height()), (2, 2));
    assert_eq!(clipped.pixel_at(0, 0), texture.pixel_at(1, 1));
    assert_eq!(clipped.pixel_at(1, 0), texture.pixel_at(2, 1));
    assert_eq!(clipped.pixel_at(0, 1), texture.pixel_at(1, 2));
    assert_eq!(clipped.pixel_at(1, 1), texture.pixel_at(2, 2));
}

#[test]
fn clip_overshoot_is_clamped() {
    let clipped = gradient(4, 4).clip(0, 0, 10, 10);

    assert_eq!((clipped.width(), clipped.height()), (3, 3));
}

#[rstest]
#[case::corner_outside(-1, 0, 2, 2)]
#[case::corner_on_far_edge(4, 4, 2, 2)]
#[case::zero_area(1, 1, 0, 0)]
fn clip_degenerate_region_is_empty(#[case] x: i32, #[case] y: i32, #[case] w: i32, #[case] h: i32) {
    assert!(gradient(4, 4).clip(x, y, w, h).is_empty());
}

#[test]
fn clone_is_deep() {
    let texture = gradient(3, 3);
    let copy = texture.clone();

    texture.clear();

    assert_eq!(copy.rgb_bytes(), gradient(3, 3).rgb_bytes());
    assert!(!copy.dirty());
}

#[test]
fn copy_to_requires_same_size() {
    let src = gradient(3, 3);
    let same = Texture::blank(3, 3);
    let other = Texture::blank(4, 2);

    src.copy_to(&same);
    src.copy_to(&other);

    assert_eq!(same.rgb_bytes(), src.rgb_bytes());
    assert!(same.dirty());
    assert_eq!(other.rgb_bytes(), vec![0; 24]);
    assert!(!other.dirty());
}

#[test]
fn pixel_at_outside_is_black() {
    let texture = filled(2, 2, [1, 2, 3]);

    assert_eq!(texture.pixel_at(1, 1), [1, 2, 3]);
    assert_eq!(texture.pixel_at(2, 0), [0; 3]);
    assert_eq!(texture.pixel_at(0, -1), [0; 3]);
}

#[test]
fn with_rgb_bytes_borrows_the_pixels() {
    let texture = gradient(2, 2);

    let (len, sum) = texture.with_rgb_bytes(|rgb| (rgb.len(), rgb.iter().map(|&b| u32::from(b)).sum::<u32>()));

    assert_eq!(len, 12);
    assert_eq!(sum, (0..12).sum());
    assert_eq!(texture.with_rgb_bytes(<[u8]>::to_vec), texture.rgb_bytes());
}

#[test]
fn to_rgb8_exposes_the_pixels() {
    let texture = gradient(2, 3);

    let image = texture.to_rgb8().unwrap();

    assert_eq!((image.width, image.height), (2, 3));
    assert_eq!(image.data, texture.rgb_bytes());
}

#[test]
fn blend_normal_full_alpha_copies_source() {
    let dst = filled(4, 4, [9; 3]);
    let src = gradient(4, 4);

    dst.blend_normal(&src, 0, 0, 1.0);

    assert_eq!(dst.rgb_bytes(), src.rgb_bytes());
    assert!(dst.dirty());
    assert!(!src.dirty());
}

#[test]
fn blend_normal_scales_source() {
    let dst = Texture::blank(2, 2);

    dst.blend_normal(&filled(2, 2, [200, 101, 0]), 0, 0, 0.5);

    assert_eq!(dst.pixel_at(1, 1), [100, 50, 0]);
}

#[test]
fn blend_off_canvas_top_left() {
    let dst = Texture::blank(4, 4);
    let src = gradient(2, 2);

    dst.blend_normal(&src, -1, -1, 1.0);

    assert_eq!(dst.pixel_at(0, 0), src.pixel_at(1, 1));
    assert_mask(&dst, [0; 3], &[".###", "####", "####", "####"]);
}

#[test]
fn blend_off_canvas_bottom_right() {
    let dst = Texture::blank(4, 4);
    let src = filled(2, 2, [7; 3]);

    dst.blend_normal(&src, 3, 2, 1.0);

    assert_mask(&dst, [7; 3], &["....", "....", "...#", "...#"]);
}

#[rstest]
#[case::past_right_edge(5, 0)]
#[case::past_bottom_edge(0, 5)]
#[case::hidden_left(-2, 0)]
#[case::hidden_top(0, -2)]
fn blend_rejected_placements(#[case] x: i32, #[case] y: i32) {
    let dst = Texture::blank(4, 4);
    let src = filled(2, 2, [7; 3]);

    dst.blend_normal(&src, x, y, 1.0);
    dst.blend_add(&src, x, y);

    assert_eq!(dst.rgb_bytes(), vec![0; 48]);
    assert!(!dst.dirty());
}

#[test]
fn blend_normal_transparent_skips_key() {
    let dst = filled(2, 2, [1; 3]);
    let src = Texture::new(vec![255, 0, 255, 10, 20, 30, 10, 20, 30, 255, 0, 255], 2, 2).unwrap();

    dst.blend_normal_transparent(&src, 0, 0, 1.0, [255, 0, 255]);

    assert_eq!(dst.rgb_bytes(), vec![1, 1, 1, 10, 20, 30, 10, 20, 30, 1, 1, 1]);
}

#[test]
fn blend_add_squares_and_saturates() {
    let dst = filled(2, 2, [50, 250, 0]);

    dst.blend_add(&filled(2, 2, [200, 200, 255]), 0, 0);

    assert_eq!(dst.pixel_at(0, 0), [206, 255, 255]);
}

#[test]
fn blend_add_alpha_scales_before_squaring() {
    let dst = filled(2, 2, [50; 3]);

    dst.blend_add_alpha(&filled(2, 2, [200, 100, 0]), 0, 0, 0.5);

    // 100² / 255 = 39.2, 50² / 255 = 9.8
    assert_eq!(dst.pixel_at(1, 0), [89, 59, 50]);
}

#[test]
fn additive_forms_agree_at_full_alpha_for_byte_inputs() {
    let src = Texture::new((0..=255u8).flat_map(|v| [v, v, v]).collect(), 16, 16).unwrap();

    for prior in [0, 50, 200] {
        let integer = filled(16, 16, [prior; 3]);
        let float = filled(16, 16, [prior; 3]);

        integer.blend_add(&src, 0, 0);
        float.blend_add_alpha(&src, 0, 0, 1.0);

        assert_eq!(integer.rgb_bytes(), float.rgb_bytes(), "prior = {prior}");
    }
}

#[test]
fn blend_add_transparent_skips_key() {
    let dst = filled(2, 2, [50; 3]);
    let src = Texture::new(vec![200, 200, 200, 0, 0, 0, 0, 0, 0, 0, 0, 0], 2, 2).unwrap();

    dst.blend_add_transparent(&src, 0, 0, [200; 3]);

    assert_eq!(dst.pixel_at(0, 0), [50; 3]);
    assert_eq!(dst.pixel_at(1, 1), [50; 3]);
}

#[test]
fn blend_add_alpha_transparent_skips_key() {
    let dst = filled(2, 2, [50; 3]);
    let src = Texture::new(vec![200, 200, 200, 0, 0, 0, 200, 0, 100, 0, 0, 0], 2, 2).unwrap();

    dst.blend_add_alpha_transparent(&src, 0, 0, 0.5, [0; 3]);

    assert_eq!(dst.pixel_at(0, 0), [89; 3]);
    assert_eq!(dst.pixel_at(1, 0), [50; 3]);
    assert_eq!(dst.pixel_at(0, 1), [89, 50, 59]);
}

#[test]
fn blend_onto_itself() {
    let texture = filled(4, 4, [100; 3]);

    texture.blend_add(&texture, 0, 0);

    assert_eq!(texture.rgb_bytes(), vec![139; 48]);
}

#[test]
fn concurrent_blends_into_one_destination_are_serialized() {
    let dst = Texture::blank(8, 8);
    // 16² / 255 = 1: every blend adds exactly one per channel.
    let src = filled(8, 8, [16; 3]);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..10 {
                    dst.blend_add(&src, 0, 0);
                }
            });
        }
    });

    assert_eq!(dst.rgb_bytes(), vec![40; 192]);
}

#[test]
fn crossed_blends_do_not_deadlock() {
    let a = filled(8, 8, [16; 3]);
    let b = filled(8, 8, [16; 3]);

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..100 {
                a.blend_normal(&b, 0, 0, 1.0);
            }
        });
        scope.spawn(|| {
            for _ in 0..100 {
                b.blend_normal(&a, 0, 0, 1.0);
            }
        });
    });

    assert_eq!(a.rgb_bytes(), vec![16; 192]);
    assert_eq!(b.rgb_bytes(), vec![16; 192]);
}
