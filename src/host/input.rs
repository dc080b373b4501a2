//! Mouse and keyboard → core input.
//!
//! - **Left mouse** press / drag / release → `on_pointer_down/move/up`
//!   (also stomps once launched; the core decides)
//! - **Space** → `on_stomp_input`
//! - **R** → abandon the run and start a new one

use bevy::prelude::*;

use super::{to_core, ActiveRun};
use crate::progression::ProgressionStore;

/// Cursor position in core coordinates, if the cursor is inside the window.
fn cursor_core_position(
    windows: &Query<&Window>,
    q_camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let window = windows.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_transform) = q_camera.single().ok()?;
    let world = camera.viewport_to_world_2d(camera_transform, cursor).ok()?;
    Some(to_core(world))
}

/// Latest cursor position, falling back to where it was last seen so a
/// release outside the window still ends the drag.
fn track_pointer(cursor: Option<Vec2>, last: &mut Option<Vec2>) -> Option<Vec2> {
    if cursor.is_some() {
        *last = cursor;
    }
    *last
}

pub fn pointer_input_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    q_camera: Query<(&Camera, &GlobalTransform)>,
    mut last_position: Local<Option<Vec2>>,
    mut run: ResMut<ActiveRun>,
) {
    let cursor = cursor_core_position(&windows, &q_camera);
    let Some(position) = track_pointer(cursor, &mut last_position) else {
        return;
    };

    if buttons.just_pressed(MouseButton::Left) {
        run.0.on_pointer_down(position);
    } else if buttons.just_released(MouseButton::Left) {
        run.0.on_pointer_up(position);
    } else if buttons.pressed(MouseButton::Left) {
        run.0.on_pointer_move(position);
    }
}

pub fn keyboard_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut run: ResMut<ActiveRun>,
    mut store: ResMut<ProgressionStore>,
) {
    if keys.just_pressed(KeyCode::Space) {
        run.0.on_stomp_input();
    }
    if keys.just_pressed(KeyCode::KeyR) {
        info!("Run restarted");
        run.0.restart(&mut store);
    }
}
