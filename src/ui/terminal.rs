use {
    crate::{
        aggregator::StationHandle,
        input::KeyInput,
        notify::Banner,
    },
    crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{io::Stdout, time::Duration},
    tokio::sync::watch,
};

/// Input poll interval, also the redraw cadence
const POLL_INTERVAL: Duration = Duration::from_millis(30);

pub struct UiOptions {
    /// Code submitted by the simulate-scan key
    pub simulated_code: String,
}

/// What a terminal key press means for the station
#[derive(Debug, Clone, PartialEq, Eq)]
enum UiAction {
    Quit,
    Simulate,
    Dismiss,
    Key(KeyInput),
}

fn map_key(key: &KeyEvent) -> Option<UiAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let action = match key.code {
        KeyCode::Esc => UiAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => UiAction::Quit,
        KeyCode::F(5) => UiAction::Simulate,
        KeyCode::F(8) => UiAction::Dismiss,
        KeyCode::Enter => UiAction::Key(KeyInput::Terminator),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            UiAction::Key(KeyInput::from(c))
        }
        other => UiAction::Key(KeyInput::Other(format!("{:?}", other))),
    };
    Some(action)
}

/// Run the TUI event loop
///
/// Blocking: call it from `spawn_blocking`. Returns when the operator quits
/// or the session closes; the terminal is restored in both cases.
pub fn run_ui(
    station: StationHandle,
    banner: watch::Receiver<Option<Banner>>,
    options: UiOptions,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, &station, &banner, &options);

    // Restore terminal state even if the loop failed
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    station: &StationHandle,
    banner: &watch::Receiver<Option<Banner>>,
    options: &UiOptions,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        {
            let view = station.view();
            let banner = banner.borrow().clone();
            terminal.draw(|f| {
                let area = f.size();
                super::layout::render_layout(f, area, &view, banner.as_ref());
            })?;
        }

        if !crossterm::event::poll(POLL_INTERVAL)? {
            if station.is_closed() {
                log::info!("Scan session closed, leaving UI");
                return Ok(());
            }
            continue;
        }

        let Event::Key(key) = crossterm::event::read()? else {
            continue;
        };

        let sent = match map_key(&key) {
            None => Ok(()),
            Some(UiAction::Quit) => return Ok(()),
            Some(UiAction::Simulate) => station.submit_code(options.simulated_code.clone()),
            Some(UiAction::Dismiss) => station.dismiss(),
            Some(UiAction::Key(input)) => station.key(input),
        };

        if sent.is_err() {
            log::info!("Scan session closed, leaving UI");
            return Ok(());
        }
    }
}
