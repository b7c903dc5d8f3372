//! Keyboard shortcuts

use bevy::prelude::*;
use iso_map_core::EditorSession;

use crate::ui::{resolve_confirm, PendingAction};
use crate::EditorState;

/// Map the keys pressed this frame to an editor action
fn shortcut_action(keyboard: &ButtonInput<KeyCode>) -> Option<PendingAction> {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft)
        || keyboard.pressed(KeyCode::ControlRight)
        || keyboard.pressed(KeyCode::SuperLeft)
        || keyboard.pressed(KeyCode::SuperRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    if !ctrl {
        return None;
    }
    // Ctrl+Shift+Z or Ctrl+Y - Redo
    if (keyboard.just_pressed(KeyCode::KeyZ) && shift) || keyboard.just_pressed(KeyCode::KeyY) {
        return Some(PendingAction::Redo);
    }
    // Ctrl+Z - Undo
    if keyboard.just_pressed(KeyCode::KeyZ) {
        return Some(PendingAction::Undo);
    }
    // Ctrl+S - Save locally
    if keyboard.just_pressed(KeyCode::KeyS) {
        return Some(PendingAction::SaveLocal);
    }
    None
}

pub fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut editor_state: ResMut<EditorState>,
    mut session: ResMut<EditorSession>,
) {
    // Escape declines an open confirmation; nothing else runs while it is open
    if editor_state.confirm.is_some() {
        if keyboard.just_pressed(KeyCode::Escape) {
            resolve_confirm(&mut editor_state, &mut session, false);
        }
        return;
    }

    if let Some(action) = shortcut_action(&keyboard) {
        editor_state.pending_action = Some(action);
    }
}
