use image::{Rgba, RgbaImage};
use qistyle::cell::{draw_cells, CellPaint, PixelStyle};
use qistyle::marker::{marker_origins, MarkerStyle};
use qistyle::options::{DrawOptions, RenderOptions};
use qistyle::qrcode::{encode, QrCodeGenerateOptions};
use qistyle::surface::{surface_edge, DisplaySurface, DrawRecorder, MAX_SURFACE_EDGE};
use qistyle::{generate_qrcode, render_image};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

fn options(border: usize, draw: DrawOptions) -> RenderOptions {
    RenderOptions::new(QrCodeGenerateOptions { border, ..QrCodeGenerateOptions::default() }, draw)
}

#[test_log::test(tokio::test)]
async fn rect_output_matches_module_grid() {
    let opts = options(2, DrawOptions { pixel_size: 3, ..DrawOptions::default() });
    let qr = encode("https://docs.rs/qistyle".into(), &opts.encode).unwrap();
    let rendered = render_image("https://docs.rs/qistyle", &opts).await.unwrap();
    let pixels = decode(&rendered.bytes);

    assert_eq!(pixels.width(), qr.size as u32 * 3);
    for (x, y, pixel) in pixels.enumerate_pixels() {
        let dark = qr.data.is_dark(x as usize / 3, y as usize / 3);
        assert_eq!(*pixel, if dark { BLACK } else { WHITE }, "pixel ({x}, {y})");
    }
}

#[test_log::test(tokio::test)]
async fn surface_edge_follows_module_count() {
    for (payload, pixel_size) in [("a", 1), ("hello", 4), ("0123456789", 7)] {
        let opts = options(1, DrawOptions { pixel_size, ..DrawOptions::default() });
        let rendered = render_image(payload, &opts).await.unwrap();
        let expected = surface_edge(rendered.metadata.size, pixel_size);
        assert_eq!(rendered.metadata.width, expected);
        assert_eq!(decode(&rendered.bytes).dimensions(), (expected, expected));
    }
}

#[test]
fn oversize_grids_are_clipped() {
    let qr = encode("clip".into(), &QrCodeGenerateOptions::default()).unwrap();
    let paint = CellPaint { light: WHITE, dark: BLACK, pixel_size: 1000 };
    assert_eq!(surface_edge(qr.size, paint.pixel_size), MAX_SURFACE_EDGE);

    let mut recorder = DrawRecorder::new(MAX_SURFACE_EDGE);
    draw_cells(&mut recorder, &qr.data, PixelStyle::Rounded, &paint);
    // Only the first 17 columns and rows start inside the 16384px cap.
    assert_eq!(recorder.ops().len(), 17 * 17 * 5);
}

#[test_log::test(tokio::test)]
async fn circle_markers_sit_on_finder_patterns() {
    let draw = DrawOptions { marker_style: MarkerStyle::Circle, ..DrawOptions::default() };
    let opts = options(1, draw);
    let rendered = render_image("markers", &opts).await.unwrap();
    let pixels = decode(&rendered.bytes);

    for (x, y) in marker_origins(rendered.metadata.size, 1, 10) {
        let (cx, cy) = (x as u32 + 35, y as u32 + 35);
        assert_eq!(*pixels.get_pixel(cx, cy), BLACK, "eye at ({cx}, {cy})");
        assert_eq!(*pixels.get_pixel(cx, cy - 20), WHITE, "divider above ({cx}, {cy})");
        assert_eq!(*pixels.get_pixel(cx, cy - 32), BLACK, "ring above ({cx}, {cy})");
        // The square corner of the finder pattern is erased.
        assert_eq!(*pixels.get_pixel(x as u32 + 1, y as u32 + 1), WHITE);
    }
}

#[test_log::test(tokio::test)]
async fn rerendering_is_byte_identical() {
    for style in [PixelStyle::Rect, PixelStyle::Rounded, PixelStyle::Dot] {
        let draw = DrawOptions { pixel_style: style, pixel_size: 5, ..DrawOptions::default() };
        let opts = options(1, draw);
        let first = render_image("same input", &opts).await.unwrap();
        let second = render_image("same input", &opts).await.unwrap();
        assert_eq!(first.bytes, second.bytes, "{style:?}");
    }
}

#[test_log::test(tokio::test)]
async fn offscreen_and_display_paths_agree() {
    let draw = DrawOptions { pixel_style: PixelStyle::Rounded, ..DrawOptions::default() };
    let opts = options(1, draw);
    let rendered = render_image("two paths", &opts).await.unwrap();

    let display = DisplaySurface::new();
    let outcome = generate_qrcode(&display, "two paths", &opts).await.unwrap();
    assert!(outcome.logo.is_none());
    assert_eq!(outcome.result, rendered.metadata);
    assert_eq!(display.snapshot().unwrap(), decode(&rendered.bytes));
}

#[test_log::test(tokio::test)]
async fn custom_colors_are_used() {
    let draw = DrawOptions {
        light_color: "#ffeecc".to_string(),
        dark_color: "rgb(20, 40, 80)".to_string(),
        ..DrawOptions::default()
    };
    let rendered = render_image("colors", &options(1, draw)).await.unwrap();
    let pixels = decode(&rendered.bytes);
    // Quiet zone is light, the finder corner is dark.
    assert_eq!(*pixels.get_pixel(0, 0), Rgba([255, 238, 204, 255]));
    assert_eq!(*pixels.get_pixel(10, 10), Rgba([20, 40, 80, 255]));
}
