use tilescope::prelude::*;

// A stepped pyramid: each layer is one tile smaller on every side.
fn main() -> tilescope::Result<()> {
    let base = 7;
    let mut builder = scene()
        .title("Stacked layers")
        .background_color(Color::rgb(0.05, 0.05, 0.08))
        .tile_size(1.0)
        .layer_height(0.5)
        .tile_labels(true);

    for layer in 0..=(base / 2) as u32 {
        let inset = layer as i32;
        let width = base - 2 * inset;
        let shade = 0.35 + 0.15 * layer as f32;
        for row in inset..inset + width {
            for column in inset..inset + width {
                builder = builder.add_tile_spec(TileSpec {
                    color: Some(Color::rgb(shade, 0.3, 0.8)),
                    ..TileSpec::new(column, layer, row)
                });
            }
        }
    }

    builder.add_named_tile("Peak", base / 2, (base / 2) as u32 + 1, base / 2)
        .focus("Peak")
        .bounds_of("Peak")
        .frame_grid()
        .run_local()
}
