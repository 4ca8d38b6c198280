//! Event router: decoded surface events in, state mutations out.
//!
//! Holds the per-session modifier set and mouse-drag state. Returns whether
//! the event may have changed anything visible, so the session knows to run
//! the render differ.

use crate::dispatch::dispatch;
use crate::io_ops::FileStore;
use crate::translate::translate;
use anyhow::Result;
use core_protocol::{Key, Modifiers, SurfaceEvent};
use core_state::{EditorState, Selection};
use core_text::Position;
use tracing::trace;

#[derive(Debug)]
pub struct Router {
    mods: Modifiers,
    /// Set while the primary button is held; selections grow from here.
    drag_anchor: Option<Position>,
    tab_width: usize,
}

impl Router {
    pub fn new(tab_width: usize) -> Self {
        Self {
            mods: Modifiers::empty(),
            drag_anchor: None,
            tab_width,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.mods
    }

    /// Route one event. `true` means state may have changed and a frame
    /// should be computed.
    pub fn handle(
        &mut self,
        event: SurfaceEvent,
        state: &mut EditorState,
        store: &dyn FileStore,
    ) -> Result<bool> {
        match event {
            SurfaceEvent::Resize { width, height } => {
                state.viewport.resize(width, height);
                state.ensure_cursor_visible();
                trace!(target: "actions.router", width, height, "resize");
                Ok(true)
            }
            SurfaceEvent::KeyDown(Key::Modifier(m)) => {
                self.mods |= Modifiers::flag(m);
                Ok(false)
            }
            SurfaceEvent::KeyUp(Key::Modifier(m)) => {
                self.mods -= Modifiers::flag(m);
                Ok(false)
            }
            SurfaceEvent::KeyDown(key) => match translate(&key, self.mods, self.tab_width) {
                Some(action) => {
                    dispatch(action, state, store)?;
                    Ok(true)
                }
                None => Ok(false),
            },
            SurfaceEvent::KeyUp(_) => Ok(false),
            SurfaceEvent::MouseDown { x, y } => {
                let pos = state.viewport.position_at_pixel(&state.buffer, x, y);
                // Click without shift always drops the selection and plants
                // the drag anchor.
                state.move_to(pos, false);
                state.ensure_cursor_visible();
                self.drag_anchor = Some(pos);
                Ok(true)
            }
            SurfaceEvent::MouseMove { x, y } => match self.drag_anchor {
                Some(anchor) => {
                    let pos = state.viewport.position_at_pixel(&state.buffer, x, y);
                    self.extend_drag(state, anchor, pos);
                    Ok(true)
                }
                None => Ok(false),
            },
            SurfaceEvent::MouseUp { x, y } => match self.drag_anchor.take() {
                Some(anchor) => {
                    let pos = state.viewport.position_at_pixel(&state.buffer, x, y);
                    self.extend_drag(state, anchor, pos);
                    // A click that never moved is not a selection.
                    if state.selection.is_some_and(|s| s.is_empty()) {
                        state.clear_selection();
                    }
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    fn extend_drag(&self, state: &mut EditorState, anchor: Position, pos: Position) {
        state.cursor.pos = pos;
        state.cursor.desired_column = None;
        state.selection = Some(Selection::new(anchor, pos));
        state.ensure_cursor_visible();
    }
}
