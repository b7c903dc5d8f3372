//! Viewport input: painting, erasing, pan and zoom
//!
//! Translates Bevy mouse and window state into `EditorSession` pointer events.
//! Cursor positions are logical window pixels with the origin at the top-left,
//! which is the screen space the session works in.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use iso_map_core::{EditorSession, HeldButtons, PointerButton, ScreenPos, Viewport};

use crate::EditorState;

/// Plugin for viewport input handling
pub struct EditorToolsPlugin;

impl Plugin for EditorToolsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportInputState>()
            .add_systems(Startup, start_session)
            .add_systems(
                Update,
                (
                    tick_session,
                    track_viewport_size,
                    handle_viewport_input,
                    handle_zoom_input,
                )
                    .chain(),
            );
    }
}

/// Pointer state carried between frames
#[derive(Resource, Default)]
pub struct ViewportInputState {
    /// Cursor position last sent to the session
    pub last_cursor: Option<Vec2>,
}

pub fn window_viewport(window: &Window) -> Viewport {
    Viewport::new(window.width() as f64, window.height() as f64)
}

fn to_screen(cursor: Vec2) -> ScreenPos {
    ScreenPos::new(cursor.x as f64, cursor.y as f64)
}

/// Restore the saved map and center the camera for the initial window size
fn start_session(
    mut session: ResMut<EditorSession>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let viewport = match windows.single() {
        Ok(window) => window_viewport(window),
        Err(_) => Viewport::default(),
    };
    session.startup(viewport);
    bevy::log::info!("Editor session started ({:?})", viewport);
}

fn tick_session(mut session: ResMut<EditorSession>, time: Res<Time>) {
    session.tick(time.elapsed());
}

/// Recenter on the grid whenever the window size changes
fn track_viewport_size(
    mut session: ResMut<EditorSession>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = windows.single() else { return };
    let viewport = window_viewport(window);
    if viewport != session.viewport() {
        session.resize(viewport);
    }
}

/// One zoom step per wheel event in the direction of the vertical delta.
/// Horizontal-only scrolling yields zero steps.
fn wheel_steps(delta_y: f32) -> i32 {
    if delta_y > 0.0 {
        1
    } else if delta_y < 0.0 {
        -1
    } else {
        0
    }
}

fn held_buttons(mouse_buttons: &ButtonInput<MouseButton>) -> HeldButtons {
    HeldButtons {
        primary: mouse_buttons.pressed(MouseButton::Left),
        secondary: mouse_buttons.pressed(MouseButton::Right),
        middle: mouse_buttons.pressed(MouseButton::Middle),
    }
}

/// Forward presses, moves and releases to the session
fn handle_viewport_input(
    mut contexts: EguiContexts,
    mut session: ResMut<EditorSession>,
    mut input_state: ResMut<ViewportInputState>,
    editor_state: Res<EditorState>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let Ok(window) = windows.single() else { return };

    let Some(cursor) = window.cursor_position() else {
        if input_state.last_cursor.take().is_some() {
            session.pointer_leave();
        }
        return;
    };

    let gesture_active = session.is_painting() || session.is_panning();
    let over_ui = ctx.is_pointer_over_area() || ctx.is_using_pointer();

    // A confirm dialog is modal; panels only block input that starts over them
    if editor_state.confirm.is_some() || (over_ui && !gesture_active) {
        if input_state.last_cursor.take().is_some() {
            session.pointer_leave();
        }
        return;
    }

    let pos = to_screen(cursor);
    let held = held_buttons(&mouse_buttons);

    if input_state.last_cursor != Some(cursor) {
        input_state.last_cursor = Some(cursor);
        session.pointer_move(pos, held);
    }

    let pressed = [
        (MouseButton::Middle, PointerButton::Middle),
        (MouseButton::Left, PointerButton::Primary),
        (MouseButton::Right, PointerButton::Secondary),
    ];
    if !session.is_painting() && !session.is_panning() {
        if let Some((_, button)) = pressed
            .iter()
            .find(|(mouse, _)| mouse_buttons.just_pressed(*mouse))
        {
            session.pointer_down(*button, pos);
        }
    }

    if (session.is_painting() || session.is_panning()) && held == HeldButtons::default() {
        session.pointer_up();
    }
}

#[allow(deprecated)] // EventReader is deprecated but still works in Bevy 0.17
fn handle_zoom_input(
    mut contexts: EguiContexts,
    mut session: ResMut<EditorSession>,
    mut scroll_events: bevy::ecs::event::EventReader<MouseWheel>,
    editor_state: Res<EditorState>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let Ok(window) = windows.single() else { return };

    // Scroll areas in the side panel keep their wheel events
    let blocked =
        ctx.is_pointer_over_area() || ctx.is_using_pointer() || editor_state.confirm.is_some();

    for event in scroll_events.read() {
        if blocked {
            continue;
        }
        let Some(cursor) = window.cursor_position() else {
            continue;
        };
        session.wheel(wheel_steps(event.y), to_screen(cursor));
    }
}
