//! Interactive byte cloud viewer
//!
//! Owns the window, the renderer and the frame loop. Input is applied as it
//! arrives, and each redraw advances the camera by the measured frame time.

use crate::config::ViewerConfig;
use crate::input::InputTranslator;
use crate::loader::BackgroundLoader;
use binviz_core::{ByteCloud, Error, FrameLoop, InputEvent, Result, Viewport};
use binviz_gpu::{PointCloudRenderer, RenderConfig};
use instant::Instant;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

/// Things a key press can ask the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Quit,
    Reload,
    OpenFile,
    ResetCamera,
}

/// Key bindings
pub fn key_action(code: KeyCode) -> Option<ViewerAction> {
    match code {
        KeyCode::Escape => Some(ViewerAction::Quit),
        KeyCode::KeyR => Some(ViewerAction::Reload),
        KeyCode::KeyO => Some(ViewerAction::OpenFile),
        KeyCode::Space => Some(ViewerAction::ResetCamera),
        _ => None,
    }
}

/// Viewer state that does not depend on a window
pub struct ViewerState {
    config: ViewerConfig,
    frame: FrameLoop,
    loader: BackgroundLoader,
    translator: InputTranslator,
    current_path: PathBuf,
}

impl ViewerState {
    /// State for `cloud`, already loaded from `config.path`
    pub fn new(config: ViewerConfig, cloud: ByteCloud) -> Self {
        let viewport = Viewport::new(config.width as f32, config.height as f32);
        Self {
            frame: FrameLoop::new(cloud, viewport),
            loader: BackgroundLoader::new(config.read_mode),
            translator: InputTranslator::new(),
            current_path: config.path.clone(),
            config,
        }
    }

    pub fn frame(&self) -> &FrameLoop {
        &self.frame
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn loader(&self) -> &BackgroundLoader {
        &self.loader
    }

    pub fn window_title(&self) -> String {
        ViewerConfig {
            path: self.current_path.clone(),
            ..self.config.clone()
        }
        .window_title()
    }

    /// Feed a window event to the camera
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let Some(input) = self.translator.translate(event) {
            self.frame.handle_event(input);
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.frame.handle_event(event);
    }

    /// Carry out `action`. Returns false when the viewer should close.
    pub fn perform(&mut self, action: ViewerAction) -> bool {
        match action {
            ViewerAction::Quit => return false,
            ViewerAction::Reload => {
                let path = self.current_path.clone();
                self.loader.request(path);
            }
            ViewerAction::OpenFile => {
                let picked = rfd::FileDialog::new()
                    .set_title("Open file")
                    .pick_file();
                if let Some(path) = picked {
                    self.loader.request(path);
                }
            }
            ViewerAction::ResetCamera => {
                self.frame.camera_mut().reset();
                log::debug!("camera reset");
            }
        }
        true
    }

    /// Start loading `path` in the background
    pub fn open(&mut self, path: impl AsRef<Path>) {
        self.loader.request(path);
    }

    /// Install every finished background load. Returns true if the active
    /// file changed.
    pub fn apply_finished_loads(&mut self) -> bool {
        let mut changed = false;
        while let Some(result) = self.loader.try_next() {
            match result.cloud {
                Ok(cloud) => {
                    log::info!("Loaded {}", result.path.display());
                    self.frame.install(cloud);
                    changed |= result.path != self.current_path;
                    self.current_path = result.path;
                }
                Err(e) => {
                    log::error!("Failed to load {}: {}", result.path.display(), e);
                }
            }
        }
        changed
    }

    /// Advance by `delta_time` seconds and draw
    pub fn render(&mut self, delta_time: f32, renderer: &mut PointCloudRenderer) -> Result<()> {
        self.frame.tick(delta_time, renderer)
    }
}

/// Interactive window showing one byte cloud at a time
pub struct Viewer {
    state: ViewerState,
}

impl Viewer {
    pub fn new(config: ViewerConfig, cloud: ByteCloud) -> Self {
        Self {
            state: ViewerState::new(config, cloud),
        }
    }

    /// Open the window and run until it is closed
    pub fn run(self) -> Result<()> {
        let mut state = self.state;

        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(state.window_title())
                .with_inner_size(PhysicalSize::new(state.config.width, state.config.height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let render_config = RenderConfig {
            vsync: state.config.vsync,
            ..RenderConfig::default()
        };
        let mut renderer =
            pollster::block_on(PointCloudRenderer::new(window.clone(), render_config))?;

        let size = window.inner_size();
        state.handle_input(InputEvent::Resize {
            width: size.width as f32,
            height: size.height as f32,
        });

        let mut last_frame = Instant::now();
        let mut fatal: Option<Error> = None;
        let fatal_slot = &mut fatal;

        event_loop
            .run(move |event, elwt| {
                elwt.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent { window_id, event } if window_id == window.id() => {
                        state.handle_window_event(&event);

                        match event {
                            WindowEvent::CloseRequested => elwt.exit(),
                            WindowEvent::Resized(new_size) => renderer.resize(new_size),
                            WindowEvent::KeyboardInput { event, .. } => {
                                if event.state != ElementState::Pressed || event.repeat {
                                    return;
                                }
                                if let PhysicalKey::Code(code) = event.physical_key {
                                    if let Some(action) = key_action(code) {
                                        if !state.perform(action) {
                                            elwt.exit();
                                        }
                                    }
                                }
                            }
                            WindowEvent::DroppedFile(path) => state.open(path),
                            WindowEvent::RedrawRequested => {
                                let now = Instant::now();
                                let delta_time = now.duration_since(last_frame).as_secs_f32();
                                last_frame = now;

                                if let Err(e) = state.render(delta_time, &mut renderer) {
                                    log::error!("Render error: {}", e);
                                    *fatal_slot = Some(e);
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        if state.apply_finished_loads() {
                            window.set_title(&state.window_title());
                        }
                        window.request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
