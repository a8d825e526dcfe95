mod assets;
mod click;
mod config;
mod controller;
mod data;
mod economy;
mod error;
mod geom;
mod input;
mod logging;
mod mask;
mod render;
mod rolling_log;
mod sampler;
mod time;
mod viewport;

use std::{cell::RefCell, io, rc::Rc};

use assets::EmbeddedAssets;
use click::GridState;
use controller::Controller;
use geom::{Point, Size};
use input::{wasd, Direction, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::layout::Alignment;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::FrameClock;

/// Query the grid container's bounding rect and convert a mouse position to a
/// world point.
fn dom_pixel_to_world(mouse_x: u32, mouse_y: u32, grid: &GridState, canvas: Size) -> Option<Point> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let container = document.query_selector("body > div").ok()??;
    let rect = container.get_bounding_client_rect();

    grid.pixel_to_world(
        canvas,
        mouse_x as f64 - rect.left(),
        mouse_y as f64 - rect.top(),
        rect.width(),
        rect.height(),
    )
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init(log::Level::Info);

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    let controller = match Controller::new(Box::new(EmbeddedAssets), js_sys::Date::now() as u64) {
        Ok(c) => c,
        Err(err) => {
            log::error!("startup failed: {err}");
            let message = format!("Failed to start: {err}");
            terminal.draw_web(move |f| {
                let widget = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Red))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::ALL));
                f.render_widget(widget, f.area());
            });
            return Ok(());
        }
    };

    let state = Rc::new(RefCell::new(controller));
    let grid = Rc::new(RefCell::new(GridState::new()));

    // Pointer move and click handler
    terminal.on_mouse_event({
        let state = state.clone();
        let grid = grid.clone();
        move |mouse_event| {
            let grid = *grid.borrow();
            if grid.is_empty() {
                return;
            }
            let mut c = state.borrow_mut();
            let point = dom_pixel_to_world(mouse_event.x, mouse_event.y, &grid, c.canvas());
            match mouse_event.event {
                MouseEventKind::Moved => c.handle_input(InputEvent::PointerMoved(point)),
                MouseEventKind::Pressed if mouse_event.button == MouseButton::Left => {
                    c.handle_input(InputEvent::Click(point))
                }
                _ => {}
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let state = state.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => match wasd(c) {
                    Some(dir) => InputEvent::Move(dir),
                    None => InputEvent::Key(c),
                },
                KeyCode::Up => InputEvent::Move(Direction::Up),
                KeyCode::Down => InputEvent::Move(Direction::Down),
                KeyCode::Left => InputEvent::Move(Direction::Left),
                KeyCode::Right => InputEvent::Move(Direction::Right),
                KeyCode::Enter => InputEvent::Enter,
                KeyCode::Esc => InputEvent::Escape,
                _ => return,
            };
            state.borrow_mut().handle_input(event);
        }
    });

    let mut clock = FrameClock::new();
    terminal.draw_web(move |f| {
        let size = f.area();
        let current = GridState {
            cols: size.width,
            rows: size.height,
        };
        *grid.borrow_mut() = current;

        let dt = clock.update(now_ms());
        let mut c = state.borrow_mut();
        c.update(dt);
        render::render(f, &c, current);
    });

    Ok(())
}
