//! Terminal front end: draws a [`Scene`] with the ASCII rasterizer and
//! feeds keyboard and mouse input back into the orbit and the picker.

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stlview_core::{Camera, Orbit, ProjectionMode, Scene, Viewport};
use tracing::debug;

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Character cells are roughly twice as tall as they are wide.
const CELL_ASPECT: u32 = 2;

/// Degrees of orbit per cell of mouse drag.
const DRAG_DEGREES_PER_CELL: f32 = 3.0;

/// Cursor travel, in cells, beyond which a press is a drag rather than a
/// pick.
const DRAG_THRESHOLD: u16 = 1;

/// An orbit drag in progress.
#[derive(Debug, Clone, Copy)]
struct Drag {
    last: (u16, u16),
    origin: (u16, u16),
    dragged: bool,
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    orbit: Orbit,
    camera: Camera,
    renderer: AsciiRenderer,
    wireframe: bool,
    drag: Option<Drag>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        let mut app = Self {
            scene,
            orbit: Orbit::default(),
            camera: Camera::default(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            wireframe: false,
            drag: None,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.resize(width, height);
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.renderer.resize(width as usize, height as usize);
        self.camera.resize(u32::from(width), u32::from(height) * CELL_ASPECT);
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.renderer.width() as f32, self.renderer.height() as f32)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Left => self.orbit.rotate(Orbit::KEY_STEP, 0.0),
            KeyCode::Right => self.orbit.rotate(-Orbit::KEY_STEP, 0.0),
            KeyCode::Up => self.orbit.rotate(0.0, -Orbit::KEY_STEP),
            KeyCode::Down => self.orbit.rotate(0.0, Orbit::KEY_STEP),
            KeyCode::PageUp => self.orbit.zoom_by(-Orbit::ZOOM_STEP),
            KeyCode::PageDown => self.orbit.zoom_by(Orbit::ZOOM_STEP),
            KeyCode::Char('o') => self.camera.mode = ProjectionMode::Orthographic,
            KeyCode::Char('p') => self.camera.mode = ProjectionMode::Perspective,
            KeyCode::Char('t') => self.orbit.reset(),
            KeyCode::Char('w') => self.wireframe = !self.wireframe,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let at = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = Some(Drag {
                    last: at,
                    origin: at,
                    dragged: false,
                });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(drag) = &mut self.drag {
                    if at.0.abs_diff(drag.origin.0) > DRAG_THRESHOLD
                        || at.1.abs_diff(drag.origin.1) > DRAG_THRESHOLD
                    {
                        drag.dragged = true;
                    }
                    let dx = f32::from(at.0) - f32::from(drag.last.0);
                    let dy = f32::from(at.1) - f32::from(drag.last.1);
                    drag.last = at;
                    self.orbit.rotate(dx * DRAG_DEGREES_PER_CELL, dy * DRAG_DEGREES_PER_CELL);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(drag) = self.drag.take() {
                    debug!("down {:?} up {:?}", drag.origin, at);
                    if !drag.dragged && !self.scene.meshes().is_empty() {
                        self.pick(at);
                    }
                }
            }
            MouseEventKind::ScrollUp => self.orbit.zoom_by(Orbit::ZOOM_STEP),
            MouseEventKind::ScrollDown => self.orbit.zoom_by(-Orbit::ZOOM_STEP),
            _ => {}
        }
    }

    fn pick(&mut self, (column, row): (u16, u16)) {
        let viewport = self.viewport();
        self.scene.update_view(&self.camera, &self.orbit, viewport);
        // Aim at the middle of the cell.
        self.scene.pick(f32::from(column) + 0.5, f32::from(row) + 0.5);
    }

    fn render(&mut self) -> io::Result<()> {
        let viewport = self.viewport();
        self.scene.update_view(&self.camera, &self.orbit, viewport);
        let model_view = self.scene.view.model_view;

        self.renderer.clear();
        for mesh in self.scene.meshes() {
            if self.wireframe {
                self.renderer.render_wireframe(mesh, &model_view, &self.camera);
            } else {
                self.renderer.render_mesh(mesh, &model_view, &self.camera);
            }
        }

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        let mode = match self.camera.mode {
            ProjectionMode::Perspective => "persp",
            ProjectionMode::Orthographic => "ortho",
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "stlview | {mode} | FPS: {:.1} | Arrows/drag=Rotate PgUp/PgDn/scroll=Zoom O/P=Projection T=Reset W=Wireframe click=Pick Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        if let Some(message) = self.scene.message() {
            let row = (self.renderer.height() as u16).saturating_sub(1);
            queue!(
                stdout,
                cursor::MoveTo(0, row),
                terminal::Clear(ClearType::CurrentLine),
                SetForegroundColor(Color::Green),
                Print(message),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}
