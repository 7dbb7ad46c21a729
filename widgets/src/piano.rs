use crate::{input::pointer_event, window::Window};
use anyhow::anyhow;
use ivory_keyboard::{
    Frame, KeyFrame, Keyboard, KeyboardConfig, NavigationMode, NoteEvents,
    PaneFrame, Rect as KeyboardRect, Rgb,
};
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Scancode,
    pixels::Color,
    rect::Rect,
};
use std::time::Instant;

const WIDTH_PX: u32 = 1304;
const HEIGHT_PX: u32 = 480;

fn color(Rgb { r, g, b }: Rgb) -> Color {
    Color::RGB(r, g, b)
}

/// Rounds the edges of a rectangle to whole pixels so that adjacent keys share an edge
pub fn sdl_rect(rect: KeyboardRect) -> Rect {
    let x0 = rect.x0.round() as i32;
    let y0 = rect.y0.round() as i32;
    let x1 = rect.x1.round() as i32;
    let y1 = rect.y1.round() as i32;
    Rect::new(x0, y0, (x1 - x0).max(1) as u32, (y1 - y0).max(1) as u32)
}

fn view_bounds((width_px, height_px): (u32, u32)) -> KeyboardRect {
    KeyboardRect::new(0.0, 0.0, width_px as f64, height_px as f64)
}

/// A window containing a touch piano keyboard
pub struct PianoWidget {
    window: Window,
    keyboard: Keyboard,
    closed: bool,
}

impl PianoWidget {
    pub fn new(
        title: Option<&str>,
        config: KeyboardConfig,
    ) -> anyhow::Result<Self> {
        let window = Window::new(title, WIDTH_PX, HEIGHT_PX)?;
        let mut keyboard = Keyboard::new(config);
        keyboard.set_view_bounds(view_bounds(window.size_px()?));
        Ok(Self {
            window,
            keyboard,
            closed: false,
        })
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    /// True once the user has closed the window. Every held note has been released by then.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn handle_key(&mut self, scancode: Scancode) {
        match scancode {
            Scancode::Tab => self.keyboard.toggle_mode(),
            Scancode::Left | Scancode::Right => {
                let navigation = self.keyboard.navigation();
                if navigation.mode() == NavigationMode::Octave {
                    let step = if scancode == Scancode::Left { -1 } else { 1 };
                    let octave = navigation.octave().offset_clamped(step);
                    self.keyboard.set_octave(octave);
                }
            }
            _ => (),
        }
    }

    fn handle_events(
        &mut self,
        buf: &mut NoteEvents,
    ) -> anyhow::Result<()> {
        let size_px = self.window.size_px()?;
        let window_size = self.window.window_size();
        let events = self.window.event_pump.poll_iter().collect::<Vec<_>>();
        for event in events {
            if let Some(pointer_event) =
                pointer_event(&event, size_px, window_size)
            {
                self.keyboard.handle_pointer(pointer_event, buf);
                continue;
            }
            match event {
                Event::Quit { .. } => {
                    log::info!("Window closed");
                    self.keyboard.cancel_all(buf);
                    self.closed = true;
                }
                Event::Window {
                    win_event:
                        WindowEvent::SizeChanged(..) | WindowEvent::Resized(..),
                    ..
                } => {
                    log::debug!("Resized to {}x{}", size_px.0, size_px.1);
                    self.keyboard.set_view_bounds(view_bounds(size_px));
                }
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => {
                    // we won't hear about pointers being lifted while unfocused
                    self.keyboard.cancel_all(buf);
                }
                Event::KeyDown {
                    scancode: Some(scancode),
                    repeat: false,
                    ..
                } => self.handle_key(scancode),
                _ => (),
            }
        }
        Ok(())
    }

    fn key_color(&self, key: &KeyFrame, is_overview: bool) -> Color {
        let colors = &self.keyboard.config().colors;
        if key.is_held {
            color(colors.held_key)
        } else if key.is_black {
            color(colors.black_key)
        } else if is_overview && key.in_visible_range {
            color(colors.visible_key)
        } else {
            color(colors.white_key)
        }
    }

    fn render_pane(
        &mut self,
        pane: &PaneFrame,
        is_overview: bool,
    ) -> anyhow::Result<()> {
        let show_outlines = self.keyboard.config().show_outlines;
        let outline = color(self.keyboard.config().colors.outline);
        for key in &pane.keys {
            let rect = sdl_rect(key.rect);
            let fill = self.key_color(key, is_overview);
            self.window.canvas.set_draw_color(fill);
            self.window
                .canvas
                .fill_rect(rect)
                .map_err(|e| anyhow!("{e}"))?;
            if show_outlines {
                self.window.canvas.set_draw_color(outline);
                self.window
                    .canvas
                    .draw_rect(rect)
                    .map_err(|e| anyhow!("{e}"))?;
            }
        }
        Ok(())
    }

    fn render_frame(&mut self, frame: &Frame) -> anyhow::Result<()> {
        self.render_pane(&frame.overview, true)?;
        self.render_pane(&frame.detail, false)?;
        let colors = self.keyboard.config().colors;
        let indicator = sdl_rect(frame.viewport_indicator);
        self.window
            .canvas
            .set_draw_color(color(colors.viewport_indicator));
        for inset in 0..2 {
            let rect = Rect::new(
                indicator.x() + inset,
                indicator.y() + inset,
                indicator.width().saturating_sub(2 * inset as u32).max(1),
                indicator.height().saturating_sub(2 * inset as u32).max(1),
            );
            self.window
                .canvas
                .draw_rect(rect)
                .map_err(|e| anyhow!("{e}"))?;
        }
        if self.keyboard.config().show_dividers {
            let divider = sdl_rect(frame.detail.bounds);
            self.window.canvas.set_draw_color(color(colors.divider));
            self.window
                .canvas
                .draw_line(
                    (divider.left(), divider.top()),
                    (divider.right(), divider.top()),
                )
                .map_err(|e| anyhow!("{e}"))?;
        }
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let background = color(self.keyboard.config().colors.background);
        self.window.canvas.set_draw_color(background);
        self.window.canvas.clear();
        if let Some(frame) = self.keyboard.frame() {
            self.render_frame(&frame)?;
        }
        self.window.canvas.present();
        Ok(())
    }

    /// Waits until the next frame, then handles input and redraws the keyboard. Note events
    /// produced by input during this frame are written to `buf`.
    pub fn tick(&mut self, buf: &mut NoteEvents) -> anyhow::Result<()> {
        buf.clear();
        self.window.wait_until_next_frame();
        self.handle_events(buf)?;
        self.render()?;
        self.window.prev_tick_complete = Instant::now();
        Ok(())
    }
}
