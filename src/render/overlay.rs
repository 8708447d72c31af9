//! Screen-space overlay: hover tooltip and reset-view button.

use bevy::prelude::*;

use super::components::{ResetViewButton, SceneCamera, TileLabel, TooltipPanel, TooltipText};
use super::resources::{HoveredTile, PointerPosition, SceneRes, TileRegistry};

const PANEL_BG: Color = Color::srgba(0.08, 0.08, 0.1, 0.85);
const PANEL_FG: Color = Color::srgba(1.0, 1.0, 1.0, 0.95);
const TOOLTIP_OFFSET: Vec2 = Vec2::new(12.0, 12.0);
const LABEL_LIFT: f32 = 0.15;

/// Absolutely positioned panel holding a single line of text.
fn panel(left: Val, top: Val, right: Val) -> (Node, BackgroundColor) {
    (
        Node {
            position_type: PositionType::Absolute,
            left,
            top,
            right,
            padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
            ..default()
        },
        BackgroundColor(PANEL_BG),
    )
}

fn panel_text(text: &str, font_size: f32) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(PANEL_FG),
    )
}

pub fn spawn_overlay(mut commands: Commands, scene: Res<SceneRes>) {
    let overlay = &scene.0.overlay;

    if overlay.tooltip {
        commands
            .spawn((
                panel(Val::Px(0.0), Val::Px(0.0), Val::Auto),
                Visibility::Hidden,
                TooltipPanel,
            ))
            .with_children(|parent| {
                parent.spawn((panel_text("", 13.0), TooltipText));
            });
    }

    if overlay.reset_button {
        commands
            .spawn((
                Button,
                panel(Val::Auto, Val::Px(12.0), Val::Px(12.0)),
                ResetViewButton,
            ))
            .with_children(|parent| {
                parent.spawn(panel_text("Reset view", 14.0));
            });
    }

    if let Some(title) = &scene.0.title {
        commands
            .spawn(panel(Val::Px(12.0), Val::Px(12.0), Val::Auto))
            .with_children(|parent| {
                parent.spawn(panel_text(title, 16.0));
            });
    }
}

/// Show the hovered tile's label next to the pointer, hide it otherwise.
pub fn update_tooltip(
    hovered: Res<HoveredTile>,
    pointer: Res<PointerPosition>,
    mut panels: Query<(&mut Node, &mut Visibility), With<TooltipPanel>>,
    mut texts: Query<&mut Text, With<TooltipText>>,
) {
    let Ok((mut node, mut visibility)) = panels.single_mut() else {
        return;
    };

    let (Some(coord), Some(at)) = (hovered.0, pointer.0) else {
        visibility.set_if_neq(Visibility::Hidden);
        return;
    };

    let at = at + TOOLTIP_OFFSET;
    node.left = Val::Px(at.x);
    node.top = Val::Px(at.y);
    visibility.set_if_neq(Visibility::Visible);

    if hovered.is_changed() {
        if let Ok(mut text) = texts.single_mut() {
            text.0 = coord.label();
        }
    }
}

/// One floating label per tile, placed every frame by [`place_tile_labels`].
pub fn spawn_tile_labels(mut commands: Commands, scene: Res<SceneRes>, registry: Res<TileRegistry>) {
    if !scene.0.overlay.tile_labels {
        return;
    }
    for tile in registry.grid.tiles() {
        let lift = tile.half_size().y + tile.size().x * LABEL_LIFT;
        commands.spawn((
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            panel_text(&tile.label(), 12.0),
            Visibility::Hidden,
            TileLabel {
                anchor: tile.center() + Vec3::Y * lift,
            },
        ));
    }
}

/// Keep labels over their tiles; hide the ones behind the camera.
pub fn place_tile_labels(
    cameras: Query<(&Camera, &GlobalTransform), With<SceneCamera>>,
    mut labels: Query<(&TileLabel, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, transform)) = cameras.single() else {
        return;
    };
    let offset = camera
        .logical_viewport_rect()
        .map_or(Vec2::ZERO, |rect| rect.min);

    for (label, mut node, mut visibility) in labels.iter_mut() {
        match camera.world_to_viewport(transform, label.anchor) {
            Ok(at) => {
                let at = at + offset;
                node.left = Val::Px(at.x);
                node.top = Val::Px(at.y);
                visibility.set_if_neq(Visibility::Visible);
            }
            Err(_) => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Scene, TileSpec};
    use crate::grid::TileCoordinate;
    use bevy::ecs::system::RunSystemOnce;

    fn tooltip_app() -> (App, Entity, Entity) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<HoveredTile>()
            .init_resource::<PointerPosition>();
        let panel = app
            .world_mut()
            .spawn((Node::default(), Visibility::Hidden, TooltipPanel))
            .id();
        let text = app.world_mut().spawn((Text::new(""), TooltipText)).id();
        (app, panel, text)
    }

    #[test]
    fn tooltip_shows_label_beside_pointer() {
        let (mut app, panel, text) = tooltip_app();
        app.insert_resource(HoveredTile(Some(TileCoordinate::new(1, 0, 2))))
            .insert_resource(PointerPosition(Some(Vec2::new(100.0, 40.0))));

        app.world_mut().run_system_once(update_tooltip).unwrap();

        let world = app.world();
        assert_eq!(world.get::<Visibility>(panel), Some(&Visibility::Visible));
        assert_eq!(world.get::<Node>(panel).unwrap().left, Val::Px(112.0));
        assert_eq!(world.get::<Node>(panel).unwrap().top, Val::Px(52.0));
        assert_eq!(world.get::<Text>(text).unwrap().0, "2.A.3");
    }

    #[test]
    fn tooltip_hides_on_miss() {
        let (mut app, panel, _) = tooltip_app();
        app.insert_resource(HoveredTile(Some(TileCoordinate::new(0, 0, 0))))
            .insert_resource(PointerPosition(Some(Vec2::new(10.0, 10.0))));
        app.world_mut().run_system_once(update_tooltip).unwrap();
        assert_eq!(app.world().get::<Visibility>(panel), Some(&Visibility::Visible));

        app.insert_resource(HoveredTile(None));
        app.world_mut().run_system_once(update_tooltip).unwrap();
        assert_eq!(app.world().get::<Visibility>(panel), Some(&Visibility::Hidden));

        app.insert_resource(HoveredTile(Some(TileCoordinate::new(0, 0, 0))))
            .insert_resource(PointerPosition(None));
        app.world_mut().run_system_once(update_tooltip).unwrap();
        assert_eq!(app.world().get::<Visibility>(panel), Some(&Visibility::Hidden));
    }

    fn labelled_app(tile_labels: bool) -> App {
        let mut scene = Scene::default();
        scene.overlay.tile_labels = tile_labels;
        scene.tiles = vec![TileSpec::new(0, 0, 0), TileSpec::new(4, 2, 1)];
        let grid = scene.build_grid().unwrap();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TileRegistry {
                grid,
                entity_of: Default::default(),
            })
            .insert_resource(SceneRes::new(scene));
        app
    }

    #[test]
    fn tile_labels_float_above_each_tile() {
        let mut app = labelled_app(true);
        app.world_mut().run_system_once(spawn_tile_labels).unwrap();

        let world = app.world_mut();
        let mut labels: Vec<(String, Vec3)> = world
            .query::<(&Text, &TileLabel)>()
            .iter(world)
            .map(|(text, label)| (text.0.clone(), label.anchor))
            .collect();
        labels.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].0, "1.A.1");
        assert!((labels[0].1 - Vec3::new(0.5, 1.15, 0.5)).length() < 1e-5);
        assert_eq!(labels[1].0, "5.C.2");
        assert!((labels[1].1 - Vec3::new(4.5, 3.15, 1.5)).length() < 1e-5);
    }

    #[test]
    fn tile_labels_are_opt_in() {
        let mut app = labelled_app(false);
        app.world_mut().run_system_once(spawn_tile_labels).unwrap();
        let world = app.world_mut();
        assert_eq!(world.query::<&TileLabel>().iter(world).count(), 0);
    }

    #[test]
    fn labels_stay_hidden_without_a_camera() {
        let mut app = labelled_app(true);
        app.world_mut().run_system_once(spawn_tile_labels).unwrap();
        app.world_mut().run_system_once(place_tile_labels).unwrap();
        let world = app.world_mut();
        assert!(
            world
                .query::<(&Visibility, &TileLabel)>()
                .iter(world)
                .all(|(visibility, _)| *visibility == Visibility::Hidden)
        );
    }
}
