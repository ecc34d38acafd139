//! End-to-end tests: figure layout, histogram colorbar construction and
//! PNG/SVG output.

#![allow(clippy::unwrap_used)]

use histcolorbar::prelude::*;

const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn bimodal(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = (i as f32 * 0.618).fract();
            if i % 3 == 0 {
                20.0 + t * 10.0
            } else {
                60.0 + t * 25.0
            }
        })
        .collect()
}

fn build_figure(config: HistColorbarConfig) -> (Figure, AxesId, HistColorbar, AxesId) {
    let mut fig = Figure::new(400, 300).unwrap();
    let ax = fig.add_subplot();
    let mut image = ScalarMappable::from_data(bimodal(600)).with_axes(ax);
    let (hcb, cax) =
        histcolorbar(&mut fig, &mut image, None, None, &LayoutOptions::new(), config).unwrap();
    (fig, ax, hcb, cax)
}

fn painted(fb: &Framebuffer, rect: Rect) -> usize {
    let (x0, y0) = (rect.x.max(0.0) as u32, rect.y.max(0.0) as u32);
    let (x1, y1) = (rect.right() as u32, rect.bottom() as u32);
    (y0..y1.min(fb.height()))
        .flat_map(|y| (x0..x1.min(fb.width())).map(move |x| (x, y)))
        .filter(|&(x, y)| fb.get_pixel(x, y) != Some(Rgba::WHITE))
        .count()
}

#[test]
fn test_histogram_counts_cover_data() {
    let (_, _, hcb, _) = build_figure(HistColorbarConfig::new().bins(Bins::Count(16)));

    assert_eq!(hcb.counts().bin_count(), 16);
    assert_eq!(hcb.counts().total(), 600);
    assert_eq!(hcb.tile_grid().unwrap().visible_count(), hcb.counts().total());
}

#[test]
fn test_colorbar_axes_is_beside_parent() {
    let (fig, ax, _, cax) = build_figure(HistColorbarConfig::new());

    let parent = fig.pixel_rect(ax).unwrap();
    let bar = fig.pixel_rect(cax).unwrap();
    assert!(bar.x >= parent.right());
    assert_eq!(fig.current_axes(), Some(ax));
}

#[test]
fn test_render_png() {
    let config = HistColorbarConfig::new().bins(Bins::Count(12)).separate_hist(true);
    let (fig, _, hcb, cax) = build_figure(config);

    let mut fb = Framebuffer::new(400, 300).unwrap();
    fb.clear(Rgba::WHITE);
    hcb.render_axes(&mut fb, &fig, cax).unwrap();

    assert!(painted(&fb, fig.pixel_rect(cax).unwrap()) > 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("histcolorbar.png");
    PngEncoder::write_to_file(&fb, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..8], &PNG_MAGIC);
}

#[test]
fn test_render_svg() {
    let options = ColorbarOptions::new().label("Depth").extend(Extend::Both);
    let config = HistColorbarConfig::new().bins(Bins::Count(8)).colorbar(options);
    let (fig, _, hcb, cax) = build_figure(config);

    let svg = hcb.to_svg(SvgEncoder::new(400, 300), fig.pixel_rect(cax).unwrap());
    let text = svg.render();
    assert!(text.starts_with("<svg"));
    assert!(text.contains("Depth"));
    assert!(text.contains("<polygon"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("histcolorbar.svg");
    svg.write_to_file(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_horizontal_bar_below_parent() {
    let options = ColorbarOptions::new().location(Location::Bottom);
    let (fig, ax, hcb, cax) = build_figure(HistColorbarConfig::new().colorbar(options));

    assert_eq!(hcb.colorbar().orientation(), Orientation::Horizontal);
    let parent = fig.pixel_rect(ax).unwrap();
    let bar = fig.pixel_rect(cax).unwrap();
    assert!(bar.y >= parent.bottom());
}

#[test]
fn test_redraw_after_clim_change() {
    let mut fig = Figure::new(400, 300).unwrap();
    let ax = fig.add_subplot();
    let mut image = ScalarMappable::from_data(bimodal(300)).with_axes(ax);
    let (mut hcb, cax) = histcolorbar(
        &mut fig,
        &mut image,
        None,
        None,
        &LayoutOptions::new(),
        HistColorbarConfig::new().bins(Bins::Count(10)),
    )
    .unwrap();

    let before = hcb.colorbar().tile_colors().to_vec();

    image.set_clim(0.0, 100.0);
    hcb.draw_all(fig.axes_mut(cax).unwrap(), &mut image).unwrap();
    assert_ne!(hcb.colorbar().tile_colors(), before.as_slice());
    assert_eq!(hcb.counts().total(), 300);
}
