//! Wire codec for the surface protocol.
//!
//! One line per command/event, comma-delimited, first field is the tag.
//! Incoming (surface -> engine): `resize`, `mousedown`, `mouseup`,
//! `mousemove`, `keydown`, `keyup`. Outgoing (engine -> surface): `rect`,
//! `text`, `clear`.
//!
//! Decode failures degrade to typed errors the session logs and drops; they
//! never cross into buffer or cursor invariants. Free-text payloads always
//! ride in the final field, so literal commas pass through verbatim; control
//! characters (which would break line framing) are stripped at encode time.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod framing;
pub use framing::LineDecoder;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Wrong field count, or a non-numeric value where a coordinate was
    /// expected. The offending line is dropped.
    #[error("malformed protocol line: {reason}: {line:?}")]
    MalformedLine { line: String, reason: &'static str },
    /// First field names no known event.
    #[error("unknown command tag {tag:?}")]
    UnknownCommand { tag: String },
}

// -------------------------------------------------------------------------
// Keys
// -------------------------------------------------------------------------

/// Reserved (non-printable) key names the surface may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Return,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    BackSpace,
    Delete,
    Escape,
}

/// Modifier identity, side-folded: the surface distinguishes LeftShift from
/// RightShift but routing never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    Command,
}

/// Logical key identifier decoded from a `keydown`/`keyup` field.
///
/// Unknown multi-char names decode as `Other` rather than failing: the router
/// ignores them, and a surface sending exotic keysyms must not kill the
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Named(NamedKey),
    Modifier(ModifierKey),
    Other(String),
}

impl Key {
    pub fn parse(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::Char(c);
        }
        match name {
            "Return" => Key::Named(NamedKey::Return),
            "Tab" => Key::Named(NamedKey::Tab),
            "space" => Key::Named(NamedKey::Space),
            "Up" => Key::Named(NamedKey::Up),
            "Down" => Key::Named(NamedKey::Down),
            "Left" => Key::Named(NamedKey::Left),
            "Right" => Key::Named(NamedKey::Right),
            "Home" => Key::Named(NamedKey::Home),
            "End" => Key::Named(NamedKey::End),
            // Tk keysym names for page movement.
            "Prior" => Key::Named(NamedKey::PageUp),
            "Next" => Key::Named(NamedKey::PageDown),
            "BackSpace" => Key::Named(NamedKey::BackSpace),
            "Delete" => Key::Named(NamedKey::Delete),
            "Escape" => Key::Named(NamedKey::Escape),
            "LeftShift" | "RightShift" => Key::Modifier(ModifierKey::Shift),
            "LeftControl" | "RightControl" => Key::Modifier(ModifierKey::Control),
            "LeftAlt" | "RightAlt" => Key::Modifier(ModifierKey::Alt),
            "LeftCommand" | "RightCommand" => Key::Modifier(ModifierKey::Command),
            other => Key::Other(other.to_string()),
        }
    }
}

bitflags::bitflags! {
    /// Currently-held modifier set. Per-session state threaded through the
    /// router, never process-global.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
        const COMMAND = 0b1000;
    }
}

impl Modifiers {
    pub fn flag(key: ModifierKey) -> Modifiers {
        match key {
            ModifierKey::Shift => Modifiers::SHIFT,
            ModifierKey::Control => Modifiers::CONTROL,
            ModifierKey::Alt => Modifiers::ALT,
            ModifierKey::Command => Modifiers::COMMAND,
        }
    }

    /// Control and Command are interchangeable for shortcuts.
    pub fn command_held(&self) -> bool {
        self.intersects(Modifiers::CONTROL | Modifiers::COMMAND)
    }
}

// -------------------------------------------------------------------------
// Incoming events
// -------------------------------------------------------------------------

/// Decoded input event from the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Resize { width: u32, height: u32 },
    MouseDown { x: u32, y: u32 },
    MouseUp { x: u32, y: u32 },
    MouseMove { x: u32, y: u32 },
    KeyDown(Key),
    KeyUp(Key),
}

fn parse_coord(line: &str, field: Option<&str>) -> Result<u32, ProtocolError> {
    let raw = field.ok_or_else(|| ProtocolError::MalformedLine {
        line: line.to_string(),
        reason: "missing field",
    })?;
    // The surface subtracts its own padding and can momentarily report a
    // negative coordinate near the window edge; clamp rather than drop.
    let value: i64 = raw.trim().parse().map_err(|_| ProtocolError::MalformedLine {
        line: line.to_string(),
        reason: "non-numeric coordinate",
    })?;
    Ok(value.max(0) as u32)
}

/// Decode one framed line into an event. Never panics on any input.
pub fn decode_event(line: &str) -> Result<SurfaceEvent, ProtocolError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (tag, rest) = match line.split_once(',') {
        Some((tag, rest)) => (tag, Some(rest)),
        None => (line, None),
    };
    match tag {
        "resize" | "mousedown" | "mouseup" | "mousemove" => {
            let rest = rest.unwrap_or("");
            let mut fields = rest.split(',');
            let a = parse_coord(line, fields.next())?;
            let b = parse_coord(line, fields.next())?;
            if fields.next().is_some() {
                return Err(ProtocolError::MalformedLine {
                    line: line.to_string(),
                    reason: "too many fields",
                });
            }
            Ok(match tag {
                "resize" => SurfaceEvent::Resize {
                    width: a,
                    height: b,
                },
                "mousedown" => SurfaceEvent::MouseDown { x: a, y: b },
                "mouseup" => SurfaceEvent::MouseUp { x: a, y: b },
                _ => SurfaceEvent::MouseMove { x: a, y: b },
            })
        }
        "keydown" | "keyup" => {
            // The key name is the remainder verbatim; a bare comma keysym is
            // a legal single-char key.
            let name = rest.filter(|r| !r.is_empty()).ok_or_else(|| {
                ProtocolError::MalformedLine {
                    line: line.to_string(),
                    reason: "missing key name",
                }
            })?;
            let key = Key::parse(name);
            Ok(if tag == "keydown" {
                SurfaceEvent::KeyDown(key)
            } else {
                SurfaceEvent::KeyUp(key)
            })
        }
        other => Err(ProtocolError::UnknownCommand {
            tag: other.to_string(),
        }),
    }
}

// -------------------------------------------------------------------------
// Outgoing commands
// -------------------------------------------------------------------------

/// An `#rrggbb` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ColorParseError(String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| ColorParseError(s.to_string()))?;
        let byte = |i| u8::from_str_radix(&hex[i..i + 2], 16).expect("checked hex");
        Ok(Color(byte(0), byte(2), byte(4)))
    }
}

/// A draw command destined for the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCmd {
    Rect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: Color,
    },
    Text {
        x: u32,
        y: u32,
        color: Color,
        text: String,
    },
    Clear,
}

impl DrawCmd {
    /// Serialize as one newline-terminated protocol line. Text payloads are
    /// written verbatim (final field) apart from control characters, which
    /// would corrupt framing and are stripped.
    pub fn encode(&self) -> String {
        match self {
            DrawCmd::Rect {
                x,
                y,
                width,
                height,
                color,
            } => format!("rect,{x},{y},{width},{height},{color}\n"),
            DrawCmd::Text { x, y, color, text } => {
                let clean: String = text.chars().filter(|c| !c.is_control()).collect();
                format!("text,{x},{y},{color},{clean}\n")
            }
            DrawCmd::Clear => "clear\n".to_string(),
        }
    }
}

/// Encode a whole frame in order into one write buffer.
pub fn encode_frame(cmds: &[DrawCmd]) -> String {
    let mut out = String::new();
    for cmd in cmds {
        out.push_str(&cmd.encode());
    }
    out
}
