use std::io::{stdout, Stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use backdrop_core::{
    BackdropDriver, BackdropSettings, BackdropSink, ConfigManager, DriverState, Hsl, Viewport,
};
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue, terminal};

/// Rows moved per arrow key or wheel notch.
const LINE_SCROLL: f64 = 3.0;
/// Rows added/removed per document resize keypress.
const DOCUMENT_GROWTH: f64 = 50.0;

/// Scroll-driven background gradient demo.
#[derive(Parser, Debug)]
#[command(name = "backdrop")]
#[command(about = "Paints a scroll-driven background gradient across the terminal")]
struct Args {
    /// Path to a JSON settings file (created with defaults if missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the frame rate from the settings
    #[arg(long)]
    fps: Option<u32>,

    /// Simulated document height in rows
    #[arg(long, default_value = "400")]
    document_rows: f64,
}

/// A pretend scrollable document: the terminal is the viewport, the content
/// is just a height.
struct SimulatedDocument {
    scroll_y: f64,
    viewport_rows: f64,
    content_rows: f64,
}

impl SimulatedDocument {
    fn max_scroll(&self) -> f64 {
        (self.content_rows - self.viewport_rows).max(0.0)
    }

    fn scroll_by(&mut self, delta: f64) {
        self.scroll_y = (self.scroll_y + delta).clamp(0.0, self.max_scroll());
    }

    fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    fn grow(&mut self, delta: f64) {
        self.content_rows = (self.content_rows + delta).max(self.viewport_rows);
        self.scroll_y = self.scroll_y.min(self.max_scroll());
    }
}

impl Viewport for SimulatedDocument {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_rows
    }

    fn content_height(&self) -> f64 {
        self.content_rows
    }
}

/// Holds the latest color pair from the driver; the render pass repaints the
/// terminal only when this is dirty.
#[derive(Default)]
struct TerminalBackdrop {
    colors: Option<(Hsl, Hsl)>,
    dirty: bool,
}

impl BackdropSink for TerminalBackdrop {
    fn set_colors(&mut self, bg: Hsl, end: Hsl) {
        self.colors = Some((bg, end));
        self.dirty = true;
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => {
            let mut manager = ConfigManager::new(Some(path.clone()));
            manager.load()?
        }
        None => BackdropSettings::default(),
    };
    if let Some(fps) = args.fps {
        settings.target_fps = fps.max(1);
    }

    let driver = BackdropDriver::new(&settings)?;

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
    let result = run(&args, &settings, driver).await;
    let _ = execute!(
        stdout(),
        ResetColor,
        Show,
        DisableMouseCapture,
        LeaveAlternateScreen
    );
    let _ = disable_raw_mode();
    result
}

async fn run(
    args: &Args,
    settings: &BackdropSettings,
    mut driver: BackdropDriver,
) -> Result<(), anyhow::Error> {
    let mut size = terminal::size()?;
    let mut doc = SimulatedDocument {
        scroll_y: 0.0,
        viewport_rows: size.1 as f64,
        content_rows: args.document_rows.max(size.1 as f64),
    };
    let mut sink = TerminalBackdrop::default();
    let mut out = stdout();

    driver.init(&doc, &mut sink);
    log::info!(
        "document of {} rows in a {} row viewport",
        doc.content_rows,
        doc.viewport_rows
    );

    let mut interval =
        tokio::time::interval(Duration::from_secs_f64(1.0 / settings.target_fps as f64));
    let mut running = true;
    while running {
        interval.tick().await;

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => running = false,
                    KeyCode::Up => scroll(&mut doc, &mut driver, -LINE_SCROLL),
                    KeyCode::Down => scroll(&mut doc, &mut driver, LINE_SCROLL),
                    KeyCode::PageUp => {
                        let page = doc.viewport_rows;
                        scroll(&mut doc, &mut driver, -page);
                    }
                    KeyCode::PageDown => {
                        let page = doc.viewport_rows;
                        scroll(&mut doc, &mut driver, page);
                    }
                    KeyCode::Home => {
                        doc.scroll_to(0.0);
                        driver.on_scroll(&doc);
                    }
                    KeyCode::End => {
                        doc.scroll_to(f64::MAX);
                        driver.on_scroll(&doc);
                    }
                    // Grow or shrink the document, like content loading in.
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        doc.grow(DOCUMENT_GROWTH);
                        driver.on_content_mutated(Instant::now());
                    }
                    KeyCode::Char('-') => {
                        doc.grow(-DOCUMENT_GROWTH);
                        driver.on_content_mutated(Instant::now());
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => scroll(&mut doc, &mut driver, -LINE_SCROLL),
                    MouseEventKind::ScrollDown => scroll(&mut doc, &mut driver, LINE_SCROLL),
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    size = (cols, rows);
                    doc.viewport_rows = rows as f64;
                    doc.scroll_y = doc.scroll_y.min(doc.max_scroll());
                    driver.on_resize(&doc);
                    driver.on_scroll(&doc);
                    sink.dirty = true;
                }
                _ => {}
            }
        }

        // Debounced layout recompute after document growth; re-evaluate the
        // scroll position against the fresh geometry.
        if driver.poll_layout(&doc, Instant::now()) {
            driver.on_scroll(&doc);
        }

        if driver.state() == DriverState::Animating {
            driver.on_frame(&mut sink);
        }

        if sink.dirty {
            if let Some((bg, end)) = sink.colors {
                render(&mut out, size, bg, end, &doc, &driver)?;
            }
            sink.dirty = false;
        }
    }

    Ok(())
}

fn scroll(doc: &mut SimulatedDocument, driver: &mut BackdropDriver, delta: f64) {
    doc.scroll_by(delta);
    driver.on_scroll(doc);
}

fn render(
    out: &mut Stdout,
    (cols, rows): (u16, u16),
    bg: Hsl,
    end: Hsl,
    doc: &SimulatedDocument,
    driver: &BackdropDriver,
) -> Result<(), anyhow::Error> {
    // The end stop sits 40% past the bottom edge, so the lowest rows never
    // quite reach the pure end color and the gradient keeps its direction.
    const GRADIENT_SPAN: f64 = 1.4;

    let blank = " ".repeat(cols as usize);
    for row in 0..rows {
        let t = if rows > 1 {
            row as f64 / (rows - 1) as f64 / GRADIENT_SPAN
        } else {
            0.0
        };
        let rgb = bg.lerp_toward(end, t).to_rgb();
        queue!(
            out,
            MoveTo(0, row),
            SetBackgroundColor(Color::Rgb {
                r: rgb.r,
                g: rgb.g,
                b: rgb.b
            }),
            Print(&blank)
        )?;
    }

    let status = format!(
        " {} | scroll {:>4.0}/{:>4.0} ({:>4.2}) | arrows/pgup/pgdn/home/end scroll, +/- grow, q quit ",
        bg.to_css(),
        doc.scroll_y(),
        doc.max_scroll(),
        driver.fraction(doc),
    );
    let top_rgb = bg.to_rgb();
    queue!(
        out,
        MoveTo(0, 0),
        SetBackgroundColor(Color::Rgb {
            r: top_rgb.r,
            g: top_rgb.g,
            b: top_rgb.b
        }),
        SetForegroundColor(Color::Grey),
        Print(truncated(&status, cols)),
    )?;
    out.flush()?;
    Ok(())
}

fn truncated(s: &str, cols: u16) -> String {
    s.chars().take(cols as usize).collect()
}
