//! Key-to-action translation.
//!
//! Pure: takes the decoded key and the currently-held modifier set, returns
//! the action to dispatch, or `None` for keys this engine ignores. Modifier
//! keydowns never reach here (the router consumes them first).

use crate::{EditorAction, Motion};
use core_protocol::{Key, Modifiers, NamedKey};

/// Translate one keydown. `tab_width` controls Tab expansion.
pub fn translate(key: &Key, mods: Modifiers, tab_width: usize) -> Option<EditorAction> {
    match key {
        Key::Modifier(_) => None,
        Key::Char(c) if mods.command_held() => shortcut(*c),
        Key::Char(c) => {
            let c = if mods.contains(Modifiers::SHIFT) {
                c.to_ascii_uppercase()
            } else {
                *c
            };
            Some(EditorAction::Insert(c.to_string()))
        }
        Key::Named(named) => named_action(*named, mods, tab_width),
        Key::Other(name) => {
            tracing::debug!(target: "actions.translate", key = name.as_str(), "ignoring key");
            None
        }
    }
}

fn shortcut(c: char) -> Option<EditorAction> {
    match c.to_ascii_lowercase() {
        'n' => Some(EditorAction::NewFile),
        'o' => Some(EditorAction::OpenFile),
        's' => Some(EditorAction::SaveFile),
        'c' => Some(EditorAction::Copy),
        'x' => Some(EditorAction::Cut),
        'v' => Some(EditorAction::Paste),
        _ => None,
    }
}

fn named_action(named: NamedKey, mods: Modifiers, tab_width: usize) -> Option<EditorAction> {
    let extend = mods.contains(Modifiers::SHIFT);
    let motion = |motion| Some(EditorAction::Move { motion, extend });
    match named {
        NamedKey::Return => Some(EditorAction::InsertNewline),
        NamedKey::Tab => Some(EditorAction::Insert(" ".repeat(tab_width))),
        NamedKey::Space => Some(EditorAction::Insert(" ".to_string())),
        NamedKey::BackSpace => Some(EditorAction::DeleteBackward),
        NamedKey::Delete => Some(EditorAction::DeleteForward),
        NamedKey::Escape => Some(EditorAction::ClearSelection),
        NamedKey::Left => motion(Motion::Left),
        NamedKey::Right => motion(Motion::Right),
        NamedKey::Up => motion(Motion::Up),
        NamedKey::Down => motion(Motion::Down),
        NamedKey::Home => motion(Motion::Home),
        NamedKey::End => motion(Motion::End),
        NamedKey::PageUp => motion(Motion::PageUp),
        NamedKey::PageDown => motion(Motion::PageDown),
    }
}
