use softbuffer::{Context, Surface};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use std::{
    num::NonZeroU32,
    rc::Rc,
    time::{Duration, Instant},
};

use tracing::{debug, error, info, warn};

use crate::{
    data::{Program, RefreshRateMode, CAP_MILLI_HZ},
    error::{Error, Result},
    graphics::Canvas,
    host::{
        threads::{FramePacer, Intervals},
        FrameHandle, HandleCounter, Scheduler, TimerHandle,
    },
    math::Point,
};

type WindowSurface = Surface<Rc<Window>, Rc<Window>>;

#[derive(Debug, Clone, Copy)]
pub enum UserEvent {
    /// The frame pacer reached a refresh boundary while a frame was wanted.
    FrameTick,
    Interval(TimerHandle),
}

/// Frames and intervals on top of the winit event loop.
///
/// Helper threads never touch program state, they only post user events.
struct WinitScheduler {
    proxy: EventLoopProxy<UserEvent>,
    handles: HandleCounter,

    pending_frame: Option<FrameHandle>,
    /// Started with the window, once the refresh rate is known.
    pacer: Option<FramePacer>,

    intervals: Intervals,
}

impl WinitScheduler {
    fn new(proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            proxy,
            handles: HandleCounter::default(),
            pending_frame: None,
            pacer: None,
            intervals: Intervals::default(),
        }
    }

    fn is_active(&self, timer: TimerHandle) -> bool {
        self.intervals.is_active(timer)
    }

    fn stop(&mut self) {
        self.intervals.clear_all();

        if let Some(mut pacer) = self.pacer.take() {
            pacer.stop();
        }
    }
}

impl Scheduler for WinitScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.handles.frame();
        self.pending_frame = Some(handle);

        match self.pacer.as_ref() {
            Some(pacer) => pacer.want_frame(),
            // Unpaced: the frame runs as soon as the loop gets to it.
            None => {
                let _ = self.proxy.send_event(UserEvent::FrameTick);
            }
        }

        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending_frame == Some(handle) {
            self.pending_frame = None;

            if let Some(pacer) = self.pacer.as_ref() {
                pacer.cancel_frame();
            }
        }
    }

    fn set_interval(&mut self, period: Duration) -> Option<TimerHandle> {
        let handle = self.handles.timer();
        let proxy = self.proxy.clone();

        let started = self.intervals.start(handle, period, move |h| {
            proxy.send_event(UserEvent::Interval(h)).is_ok()
        });

        match started {
            Ok(()) => Some(handle),
            Err(e) => {
                error!("Unable to start interval timer: {e}");
                None
            }
        }
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        self.intervals.clear(handle);
    }
}

struct WindowState {
    pub prog: Program,
    pub scheduler: WinitScheduler,
    pub window: Option<Rc<Window>>,
    pub surface: Option<WindowSurface>,
    /// Set by the pacer; the next redraw runs the pending frame.
    pub frame_due: bool,
    pub error: Option<Error>,
}

impl ApplicationHandler<UserEvent> for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            error!("{e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::FrameTick => {
                if self.scheduler.pending_frame.is_some() {
                    self.frame_due = true;
                    self.request_redraw();
                }
            }

            UserEvent::Interval(timer) => {
                if !self.scheduler.is_active(timer) {
                    return;
                }

                let state_before = self.prog.bubbles.state();

                self.prog
                    .bubbles
                    .on_timer(timer, Instant::now(), &mut self.scheduler);

                if self.prog.bubbles.state() != state_before {
                    self.request_redraw();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::CursorEntered { .. } => {
                self.prog.bubbles.pointer_entered(&mut self.scheduler);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.prog
                    .bubbles
                    .pointer_moved(Point::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => {
                self.prog.bubbles.pointer_left(&mut self.scheduler);
                self.request_redraw();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.resize(width, height);
            }

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                if event.logical_key == Key::Named(NamedKey::Escape) {
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                if std::mem::take(&mut self.frame_due) {
                    if let Some(frame) = self.scheduler.pending_frame.take() {
                        self.prog
                            .bubbles
                            .on_frame(frame, Instant::now(), &mut self.scheduler);
                    }
                }

                self.present();
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _: &ActiveEventLoop) {
        debug!(
            live = self.prog.bubbles.particles().len(),
            state = ?self.prog.bubbles.state(),
            "exiting"
        );

        self.scheduler.stop();
    }
}

impl WindowState {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (w, h) = self.prog.size();

        let window_attributes = Window::default_attributes()
            .with_title("mousebubbles")
            .with_inner_size(PhysicalSize::<u32>::new(w as u32, h as u32))
            .with_resizable(self.prog.is_resizable());

        let window = Rc::new(event_loop.create_window(window_attributes)?);

        let context = Context::new(window.clone())?;
        let mut surface = Surface::new(&context, window.clone())?;

        // The host finished its first layout: size everything to it.
        let size = window.inner_size();
        Self::resize_surface(&mut surface, size.width, size.height)?;
        self.prog
            .bubbles
            .resize(size.width as usize, size.height as usize);

        if self.prog.get_rr_mode() != RefreshRateMode::Specified {
            Self::check_refresh_rate(&window, &mut self.prog);
        }

        self.prog.print_startup_info();

        self.spawn_frame_pacer();
        self.surface = Some(surface);
        self.window = Some(window);

        Ok(())
    }

    /// Posts a frame tick at each refresh boundary where a frame was
    /// requested. Paced by the monitor rate, or the fallback rate when the
    /// monitor could not be queried.
    fn spawn_frame_pacer(&mut self) {
        let proxy = self.scheduler.proxy.clone();

        match FramePacer::spawn(self.prog.fps(), move || {
            proxy.send_event(UserEvent::FrameTick).is_ok()
        }) {
            Ok(pacer) => {
                // A frame requested before the window existed.
                if self.scheduler.pending_frame.is_some() {
                    pacer.want_frame();
                }
                self.scheduler.pacer = Some(pacer);
            }

            Err(e) => error!("Unable to start the frame pacer, frames are unpaced: {e}"),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.prog.bubbles.resize(width as usize, height as usize);

        let Some(surface) = self.surface.as_mut() else {
            warn!("Unable to resize the surface, it does not exist yet.");
            return;
        };

        if let Err(e) = Self::resize_surface(surface, width, height) {
            error!("Unable to resize the surface: {e}");
        }

        self.request_redraw();
    }

    /// A zero-sized window keeps its old buffer; nothing is drawn into it.
    fn resize_surface(surface: &mut WindowSurface, w: u32, h: u32) -> Result<()> {
        let (Some(w), Some(h)) = (NonZeroU32::new(w), NonZeroU32::new(h)) else {
            debug!("Skipping surface resize to a zero size.");
            return Ok(());
        };

        surface.resize(w, h)?;
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(w) = self.window.as_ref() {
            w.request_redraw();
        }
    }

    fn present(&mut self) {
        let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut()) else {
            return;
        };

        let canvas = self.prog.bubbles.canvas();

        if !presentable(canvas, window.inner_size()) {
            return;
        }

        match surface.buffer_mut() {
            Ok(mut buffer) => {
                canvas.present_to(&mut buffer);

                window.pre_present_notify();
                if let Err(e) = buffer.present() {
                    error!("Unable to present the buffer to the window: {e}");
                }
            }

            Err(e) => error!("Unable to get the window buffer: {e}"),
        }
    }

    fn check_refresh_rate(window: &Window, prog: &mut Program) {
        let Some(Some(mut milli_hz)) = window
            .current_monitor()
            .map(|m| m.refresh_rate_millihertz())
        else {
            warn!(
                "Unable to query the monitor refresh rate, using {}hz.",
                prog.get_milli_hz() as f32 / 1000.0
            );
            return;
        };

        if milli_hz > CAP_MILLI_HZ {
            milli_hz = CAP_MILLI_HZ;
            info!("Refresh rate capped to {}hz.", CAP_MILLI_HZ as f32 / 1000.0);
        }

        prog.change_fps_frac(milli_hz);
    }
}

/// Only a canvas matching the window, with at least one pixel, goes to the
/// surface.
fn presentable(canvas: &Canvas, window: PhysicalSize<u32>) -> bool {
    !canvas.is_empty()
        && window.width as usize == canvas.width()
        && window.height as usize == canvas.height()
}

pub fn winit_main(prog: Program) -> Result<()> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;

    let mut state = WindowState {
        prog,
        scheduler: WinitScheduler::new(event_loop.create_proxy()),
        window: None,
        surface: None,
        frame_due: false,
        error: None,
    };

    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop.run_app(&mut state)?;

    match state.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
