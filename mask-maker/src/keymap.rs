use crate::{MaskError, Session, View};

pub const PAN_STEP: i32 = 1;
pub const PAN_STEP_LARGE: i32 = 10;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Editing operation bound to a key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ShowView(View),
    Pan { dx: i32, dy: i32 },
    Zoom(f64),
}

impl Command {
    pub fn from_char(c: char) -> Option<Self> {
        let pan = |dx, dy| Some(Command::Pan { dx, dy });
        match c {
            '1' => Some(Command::ShowView(View::Source)),
            '2' => Some(Command::ShowView(View::Mask)),
            '3' => Some(Command::ShowView(View::Destination)),
            'w' => pan(0, -PAN_STEP),
            'a' => pan(-PAN_STEP, 0),
            's' => pan(0, PAN_STEP),
            'd' => pan(PAN_STEP, 0),
            'W' => pan(0, -PAN_STEP_LARGE),
            'A' => pan(-PAN_STEP_LARGE, 0),
            'S' => pan(0, PAN_STEP_LARGE),
            'D' => pan(PAN_STEP_LARGE, 0),
            '-' | '_' => Some(Command::Zoom(ZOOM_OUT_FACTOR)),
            '+' | '=' => Some(Command::Zoom(1.0 / ZOOM_OUT_FACTOR)),
            _ => None,
        }
    }

    /// Parses every character of a text input event, ignoring unbound ones
    pub fn parse_all(text: &str) -> impl Iterator<Item = Command> + '_ {
        text.chars().filter_map(Self::from_char)
    }

    pub fn apply(self, session: &mut Session) -> Result<(), MaskError> {
        match self {
            Command::ShowView(view) => session.set_active_view(view),
            Command::Pan { dx, dy } => session.pan(dx, dy),
            Command::Zoom(factor) => session.zoom(factor)?,
        }
        Ok(())
    }
}
