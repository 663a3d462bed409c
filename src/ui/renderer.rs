// Formatting helpers shared by the layout

use {
    crate::{
        notify::{ResultKind, ScanResult},
        state::{StationStatus, StationView},
    },
    chrono::{DateTime, Local, Utc},
    ratatui::style::Color,
};

pub const PLACEHOLDER: &str = "Scannez le code-barres...";

/// Status line under the code field
pub fn status_text(view: &StationView) -> &'static str {
    match view.status {
        StationStatus::Processing => "⏳ Traitement en cours...",
        StationStatus::Detected => "✓ Code détecté",
        StationStatus::Idle => "En attente du scan...",
    }
}

pub fn status_color(view: &StationView) -> Color {
    match view.status {
        StationStatus::Processing => Color::Yellow,
        StationStatus::Detected => Color::Green,
        StationStatus::Idle => Color::Gray,
    }
}

/// Border colour of the code field
pub fn field_color(view: &StationView) -> Color {
    if view.status == StationStatus::Processing {
        Color::Yellow
    } else if !view.code.is_empty() {
        Color::Green
    } else {
        Color::DarkGray
    }
}

pub fn banner_color(result: &ScanResult) -> Color {
    match result.kind {
        ResultKind::Success => Color::Rgb(0x0d, 0x6e, 0xfd),
        ResultKind::Error => Color::Rgb(0xdc, 0x35, 0x45),
    }
}

/// Local wall-clock time of the last scan
pub fn format_scan_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
