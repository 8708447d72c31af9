use bevy_math::Vec3;
use tilescope::prelude::*;

fn main() -> tilescope::Result<()> {
    scene()
        .title("Two tiles")
        .background_color(Color::hex(0x10101a))
        .fog(Color::hex(0x10101a), 6.0, 20.0)
        .tile_color(Color::INDIGO)
        .add_named_tile("Box", 0, 0, 0)
        .add_tile(1, 0, 1)
        .camera(Vec3::new(1.0, 3.0, 5.0), Vec3::new(1.0, 0.5, 1.0))
        .focus("Box")
        .run_local()
}
