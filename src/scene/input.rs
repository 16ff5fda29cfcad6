//! Scroll and cursor tracking.
//!
//! There is no page to scroll, so the scroll tracker keeps a virtual offset in
//! logical pixels: one viewport height per section, clamped to the sections
//! that exist.

use winit::{
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::viewport::Viewport;

/// Index of the section shown at `scroll_y`, clamped to `[0, count - 1]`.
pub fn section_index(scroll_y: f32, height: f32, count: usize) -> usize {
    if count == 0 || height <= 0.0 || !scroll_y.is_finite() {
        return 0;
    }
    let section = (scroll_y / height).round().max(0.0) as usize;
    section.min(count - 1)
}

/// Largest scroll offset: the top of the last section.
pub fn max_scroll(height: f32, count: usize) -> f32 {
    count.saturating_sub(1) as f32 * height.max(0.0)
}

/// A request to move the scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollInput {
    /// Move by logical pixels, positive scrolls down.
    Pixels(f32),
    /// Move by wheel lines, positive scrolls down.
    Lines(f32),
    PageDown,
    PageUp,
    Home,
    End,
}

impl ScrollInput {
    /// Translate a window event, if it scrolls.
    pub fn from_window_event(event: &WindowEvent, viewport: &Viewport) -> Option<Self> {
        match event {
            // winit reports positive y when the content should move down, i.e. scrolling up
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => Some(ScrollInput::Lines(-y)),
                MouseScrollDelta::PixelDelta(position) => {
                    Some(ScrollInput::Pixels(-viewport.to_logical(position.y)))
                }
            },
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                NamedKey::PageDown | NamedKey::Space => Some(ScrollInput::PageDown),
                NamedKey::PageUp => Some(ScrollInput::PageUp),
                NamedKey::Home => Some(ScrollInput::Home),
                NamedKey::End => Some(ScrollInput::End),
                NamedKey::ArrowDown => Some(ScrollInput::Lines(1.0)),
                NamedKey::ArrowUp => Some(ScrollInput::Lines(-1.0)),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    /// Scroll offset in logical pixels.
    pub scroll_y: f32,
    /// The section the last scroll landed in.
    pub section: usize,
}

impl ScrollState {
    /// Move the offset to `offset` (clamped).
    ///
    /// Returns the new section if the section changed.
    pub fn scroll_to(&mut self, offset: f32, height: f32, count: usize) -> Option<usize> {
        let offset = if offset.is_finite() { offset } else { self.scroll_y };
        self.scroll_y = offset.clamp(0.0, max_scroll(height, count));
        let section = section_index(self.scroll_y, height, count);
        if section != self.section {
            self.section = section;
            Some(section)
        } else {
            None
        }
    }

    pub fn scroll_by(&mut self, delta: f32, height: f32, count: usize) -> Option<usize> {
        self.scroll_to(self.scroll_y + delta, height, count)
    }

    pub fn apply(
        &mut self,
        input: ScrollInput,
        line_height: f32,
        height: f32,
        count: usize,
    ) -> Option<usize> {
        match input {
            ScrollInput::Pixels(px) => self.scroll_by(px, height, count),
            ScrollInput::Lines(lines) => self.scroll_by(lines * line_height, height, count),
            ScrollInput::PageDown => self.scroll_by(height, height, count),
            ScrollInput::PageUp => self.scroll_by(-height, height, count),
            ScrollInput::Home => self.scroll_to(0.0, height, count),
            ScrollInput::End => self.scroll_to(max_scroll(height, count), height, count),
        }
    }

    /// Keep the same position within the sections after the viewport height
    /// changed from `old_height` to `new_height`.
    ///
    /// The section is updated silently, a resize never counts as entering one.
    pub fn rescale(&mut self, old_height: f32, new_height: f32, count: usize) {
        if old_height > 0.0 && new_height > 0.0 && old_height.is_finite() {
            self.scroll_y *= new_height / old_height;
        }
        let offset = if self.scroll_y.is_finite() { self.scroll_y } else { 0.0 };
        self.scroll_y = offset.clamp(0.0, max_scroll(new_height, count));
        self.section = section_index(self.scroll_y, new_height, count);
    }
}

/// Cursor position normalised to `[-0.5, 0.5]` on both axes, y pointing down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorState {
    pub x: f32,
    pub y: f32,
}

impl CursorState {
    /// Track a cursor position given in physical pixels.
    pub fn track(&mut self, x: f64, y: f64, viewport: &Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.x = (viewport.to_logical(x) / viewport.width - 0.5).clamp(-0.5, 0.5);
        self.y = (viewport.to_logical(y) / viewport.height - 0.5).clamp(-0.5, 0.5);
    }
}

/// Input shared between the event handlers and the frame driver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub scroll: ScrollState,
    pub cursor: CursorState,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEIGHT: f32 = 800.0;

    #[test]
    fn section_index_rounds_and_clamps() {
        assert_eq!(section_index(0.0, HEIGHT, 4), 0);
        assert_eq!(section_index(399.0, HEIGHT, 4), 0);
        assert_eq!(section_index(400.0, HEIGHT, 4), 1);
        assert_eq!(section_index(HEIGHT * 10.0, HEIGHT, 4), 3);
        assert_eq!(section_index(-HEIGHT, HEIGHT, 4), 0);
        assert_eq!(section_index(f32::NAN, HEIGHT, 4), 0);
        assert_eq!(section_index(100.0, 0.0, 4), 0);
    }

    #[test]
    fn offset_stays_within_the_sections() {
        let mut scroll = ScrollState::default();
        scroll.scroll_by(-50.0, HEIGHT, 4);
        assert_eq!(scroll.scroll_y, 0.0);
        scroll.scroll_by(1.0e6, HEIGHT, 4);
        assert_eq!(scroll.scroll_y, 3.0 * HEIGHT);
        assert_eq!(scroll.section, 3);
    }

    #[test]
    fn section_changes_are_reported_once() {
        let mut scroll = ScrollState::default();
        assert_eq!(scroll.scroll_to(HEIGHT, HEIGHT, 4), Some(1));
        assert_eq!(scroll.scroll_to(HEIGHT + 10.0, HEIGHT, 4), None);
        assert_eq!(scroll.scroll_to(0.0, HEIGHT, 4), Some(0));
    }

    #[test]
    fn keyboard_and_wheel_inputs_move_the_offset() {
        let mut scroll = ScrollState::default();
        assert_eq!(scroll.apply(ScrollInput::PageDown, 40.0, HEIGHT, 4), Some(1));
        assert_eq!(scroll.apply(ScrollInput::Lines(2.0), 40.0, HEIGHT, 4), None);
        assert_eq!(scroll.scroll_y, HEIGHT + 80.0);
        assert_eq!(scroll.apply(ScrollInput::End, 40.0, HEIGHT, 4), Some(3));
        assert_eq!(scroll.apply(ScrollInput::Home, 40.0, HEIGHT, 4), Some(0));
        assert_eq!(scroll.scroll_y, 0.0);
    }

    #[test]
    fn resizing_keeps_the_section() {
        let mut scroll = ScrollState::default();
        assert_eq!(scroll.apply(ScrollInput::Pixels(HEIGHT), 40.0, HEIGHT, 4), Some(1));

        scroll.rescale(HEIGHT, 1700.0, 4);
        assert_eq!(scroll.scroll_y, 1700.0);
        assert_eq!(scroll.section, 1);

        // the next scroll within the section reports nothing
        assert_eq!(scroll.apply(ScrollInput::Pixels(0.0), 40.0, 1700.0, 4), None);

        scroll.rescale(1700.0, 425.0, 4);
        assert_eq!(scroll.scroll_y, 425.0);
        assert_eq!(scroll.section, 1);
    }

    #[test]
    fn resizing_from_an_empty_viewport_only_clamps() {
        let mut scroll = ScrollState {
            scroll_y: 5000.0,
            section: 3,
        };
        scroll.rescale(0.0, HEIGHT, 4);
        assert_eq!(scroll.scroll_y, 3.0 * HEIGHT);
        assert_eq!(scroll.section, 3);
    }

    #[test]
    fn cursor_is_normalised_in_logical_pixels() {
        let viewport = Viewport::new(1000.0, 500.0, 2.0);
        let mut cursor = CursorState::default();
        cursor.track(0.0, 0.0, &viewport);
        assert_eq!(cursor, CursorState { x: -0.5, y: -0.5 });
        cursor.track(1000.0, 500.0, &viewport);
        assert_eq!(cursor, CursorState { x: 0.0, y: 0.0 });
        cursor.track(2000.0, 1000.0, &viewport);
        assert_eq!(cursor, CursorState { x: 0.5, y: 0.5 });
    }

    #[test]
    fn cursor_outside_the_window_is_clamped() {
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        let mut cursor = CursorState::default();
        cursor.track(-40.0, 300.0, &viewport);
        assert_eq!(cursor, CursorState { x: -0.5, y: 0.5 });
    }
}
