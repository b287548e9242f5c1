//! Window input for the backdrop.
//!
//! Only the pointer matters to the field: `Input` follows the cursor in
//! pixels, converts it to normalized coordinates against the current surface
//! size, and remembers whether Escape asked the viewer to close.

use crate::pointer::normalize;
use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Default)]
pub struct Input {
    pointer_pixels: Vec2,
    pointer_ndc: Vec2,
    moved: bool,
    inside: bool,
    recenter_on_leave: bool,
    exit_requested: bool,
    window_size: (u32, u32),
}

impl Input {
    pub fn new(window_size: (u32, u32), recenter_on_leave: bool) -> Self {
        Self {
            window_size,
            recenter_on_leave,
            ..Default::default()
        }
    }

    /// Cursor position in surface pixels.
    pub fn pointer_pixels(&self) -> Vec2 {
        self.pointer_pixels
    }

    /// Cursor position in `[-1, 1]`, y up.
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    /// Whether the normalized pointer changed since the last call. Clears the flag.
    pub fn take_moved(&mut self) -> bool {
        std::mem::replace(&mut self.moved, false)
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.resized(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorEntered { .. } => self.inside = true,
            WindowEvent::CursorLeft { .. } => self.cursor_left(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    self.exit_requested = true;
                }
            }
            _ => {}
        }
    }

    pub(crate) fn resized(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        // Keep the pointer where it is on screen relative to the new size.
        if self.inside {
            self.set_ndc(normalize(self.pointer_pixels, self.window_size));
        }
    }

    pub(crate) fn cursor_moved(&mut self, pixels: Vec2) {
        self.inside = true;
        self.pointer_pixels = pixels;
        self.set_ndc(normalize(pixels, self.window_size));
    }

    pub(crate) fn cursor_left(&mut self) {
        self.inside = false;
        if self.recenter_on_leave {
            self.set_ndc(Vec2::ZERO);
        }
    }

    fn set_ndc(&mut self, ndc: Vec2) {
        if ndc != self.pointer_ndc {
            self.pointer_ndc = ndc;
            self.moved = true;
        }
    }
}
