/// Terminal preview of the scroll-driven cube
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use scrollcube_core::{Camera, CubePose, CubeScene, Mesh, ScrollInput};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Page-scroll simulation for the preview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSimulation {
    /// Canvas top in page coordinates; its viewport top is this minus the scroll
    pub canvas_page_top: f32,
    /// Pixels per arrow-key press
    pub step: f32,
    pub scroll_y: f32,
}

impl ScrollSimulation {
    pub fn new(canvas_page_top: f32, step: f32) -> Self {
        Self {
            canvas_page_top,
            step,
            scroll_y: 0.0,
        }
    }

    /// Scroll by `steps` key presses; the page cannot scroll above its top
    pub fn scroll_by(&mut self, steps: f32) {
        self.scroll_y = (self.scroll_y + steps * self.step).max(0.0);
    }

    pub fn reset(&mut self) {
        self.scroll_y = 0.0;
    }

    pub fn input(&self) -> ScrollInput {
        ScrollInput::new(self.canvas_page_top - self.scroll_y, self.scroll_y)
    }
}

/// Main application struct for the terminal preview
pub struct TerminalApp {
    mesh: Mesh,
    scene: CubeScene,
    simulation: ScrollSimulation,
    pose: Option<CubePose>,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, scene: CubeScene, simulation: ScrollSimulation) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        let mut app = Self {
            mesh,
            scene,
            simulation,
            pose: None,
            camera: Camera::scene(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        // Measure once so the first frame shows the pose for the start position
        app.scroll();
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain every pending event; scroll bursts arrive many at a time
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1.0),
                KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1.0),
                KeyCode::PageDown => self.scroll_by(10.0),
                KeyCode::PageUp => self.scroll_by(-10.0),
                KeyCode::Home => {
                    self.simulation.reset();
                    self.scroll();
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_by(1.0),
                MouseEventKind::ScrollUp => self.scroll_by(-1.0),
                _ => {}
            },
            Event::Resize(width, height) => {
                self.renderer = AsciiRenderer::new(width as usize, height as usize);
                execute!(stdout(), Clear(ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn scroll_by(&mut self, steps: f32) {
        self.simulation.scroll_by(steps);
        self.scroll();
    }

    /// Same as a browser scroll event: measure, then let the scene react
    fn scroll(&mut self) {
        if let Some(pose) = self.scene.on_scroll(self.simulation.input()) {
            self.pose = Some(pose);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();

        if let Some(frame) = self.scene.on_frame(wall_clock_ms()) {
            let max_opacity = self.scene.config().scroll.max_shadow_opacity;
            let strength = if max_opacity > 0.0 {
                frame.shadow_opacity / max_opacity
            } else {
                0.0
            };
            self.renderer.render_frame(&self.mesh, &frame, &self.camera, strength);
        }

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let input = self.simulation.input();
        let status = match self.pose {
            Some(pose) => format!(
                "scrollY {:>6.0} | canvasTop {:>6.0} | cubeY {:>5.2} | shadow {:>4.2} | yaw {:>6.2}",
                input.scroll_y, input.canvas_top, pose.cube_y, pose.shadow_opacity, pose.cube_yaw
            ),
            None => "loading assets...".to_string(),
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!("scrollcube preview | FPS: {:.1} | {}", self.fps, status)),
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::DarkYellow),
            Print("Controls: Up/Down/j/k/wheel=Scroll PgUp/PgDn=Fast Home=Top Q=Quit"),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Milliseconds since the Unix epoch, like `Date.now()`
fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_maps_scroll_to_canvas_top() {
        let mut sim = ScrollSimulation::new(510.0, 20.0);
        assert_eq!(sim.input(), ScrollInput::new(510.0, 0.0));

        sim.scroll_by(10.0);
        assert_eq!(sim.input(), ScrollInput::new(310.0, 200.0));

        sim.scroll_by(-100.0);
        assert_eq!(sim.scroll_y, 0.0);

        sim.scroll_by(3.0);
        sim.reset();
        assert_eq!(sim.scroll_y, 0.0);
    }

    #[test]
    fn test_default_page_lines_up_rest_with_spin() {
        // At the scroll where the spin starts the cube has just come to rest
        let sim = ScrollSimulation {
            scroll_y: 350.0,
            ..ScrollSimulation::new(510.0, 20.0)
        };
        let pose = scrollcube_core::ScrollConfig::default().map(sim.input());
        assert_eq!(pose.cube_y, 0.0);
        assert_eq!(pose.cube_yaw, 0.0);
    }
}
