use anyhow::anyhow;
use sdl2::{EventPump, render::Canvas, video::Window as SdlWindow};
use std::{
    thread,
    time::{Duration, Instant},
};

const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / 60);

pub struct Window {
    pub canvas: Canvas<SdlWindow>,
    pub event_pump: EventPump,
    pub prev_tick_complete: Instant,
}

impl Window {
    pub fn new(
        title: Option<&str>,
        width_px: u32,
        height_px: u32,
    ) -> anyhow::Result<Self> {
        let sdl_context = sdl2::init().map_err(|e| anyhow!(e))?;
        let video_subsystem = sdl_context.video().map_err(|e| anyhow!(e))?;
        // Let touches reach us as finger events only. The mouse events SDL would otherwise
        // synthesize are filtered out anyway.
        sdl2::hint::set("SDL_TOUCH_MOUSE_EVENTS", "0");
        let window = video_subsystem
            .window(title.unwrap_or("ivory"), width_px, height_px)
            .resizable()
            .build()?;
        let canvas = window.into_canvas().present_vsync().build()?;
        let event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;
        Ok(Self {
            canvas,
            event_pump,
            prev_tick_complete: Instant::now(),
        })
    }

    pub fn wait_until_next_frame(&self) {
        if let Some(period_to_sleep) = (self.prev_tick_complete
            + FRAME_DURATION)
            .checked_duration_since(Instant::now())
        {
            thread::sleep(period_to_sleep);
        }
    }

    /// Size of the window in screen coordinates, which mouse positions are measured in
    pub fn window_size(&self) -> (u32, u32) {
        self.canvas.window().size()
    }

    /// Size of the drawable area in pixels
    pub fn size_px(&self) -> anyhow::Result<(u32, u32)> {
        self.canvas.output_size().map_err(|e| anyhow!("{e}"))
    }
}
