//! Terminal rendering for items, previews and summaries

use colored::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tracker::Summary;
use crate::tracker::excel::dates::format_iso;
use crate::tracker::types::{PendingItem, Priority, Status};

const BAR_WIDTH: usize = 30;

/// Columns of the item table: header and display width
const COLUMNS: [(&str, usize); 10] = [
    ("ID", 8),
    ("TOP #", 12),
    ("Sem", 4),
    ("Sistema", 24),
    ("Hito", 14),
    ("Disc", 5),
    ("Responsable", 14),
    ("Compromiso", 10),
    ("Estado", 7),
    ("Prioridad", 9),
];

/// Cut `s` to at most `width` display columns, marking the cut with `…`
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Pad `s` with spaces to exactly `width` display columns
pub fn pad(s: &str, width: usize) -> String {
    let cut = truncate(s, width);
    let fill = width.saturating_sub(cut.width());
    format!("{}{}", cut, " ".repeat(fill))
}

pub fn format_week(week: Option<f64>) -> String {
    match week {
        Some(w) if w.fract() == 0.0 => format!("{}", w as i64),
        Some(w) => format!("{}", w),
        None => String::new(),
    }
}

fn format_date(date: Option<&chrono::NaiveDate>) -> String {
    date.map(format_iso).unwrap_or_default()
}

pub fn status_colored(status: Status, width: usize) -> ColoredString {
    let text = pad(status.label(), width);
    match status {
        Status::Open => text.yellow(),
        Status::Closed => text.green(),
    }
}

pub fn priority_colored(priority: Priority, width: usize) -> ColoredString {
    let text = pad(priority.label(), width);
    match priority {
        Priority::High => text.red().bold(),
        Priority::Medium => text.yellow(),
        Priority::Low => text.normal(),
    }
}

/// Print items as an aligned table
pub fn print_items_table(items: &[&PendingItem]) {
    let header: Vec<String> = COLUMNS.iter().map(|(name, w)| pad(name, *w)).collect();
    println!("{}", header.join("  ").bold());
    let rule: usize = COLUMNS.iter().map(|(_, w)| w + 2).sum::<usize>() - 2;
    println!("{}", "─".repeat(rule).dimmed());

    for item in items {
        let plain = [
            item.id.short(),
            item.top_number.clone(),
            format_week(item.week),
            item.system_description.clone(),
            item.associated_milestone.clone(),
            item.discipline.clone(),
            item.responsible.clone(),
            format_date(item.commitment_date.as_ref()),
        ];

        let mut cells: Vec<String> = plain
            .iter()
            .zip(COLUMNS.iter())
            .map(|(value, (_, w))| pad(value, *w))
            .collect();
        cells[0] = cells[0].dimmed().to_string();
        cells[1] = cells[1].bold().to_string();
        cells.push(status_colored(item.status, COLUMNS[8].1).to_string());
        cells.push(priority_colored(item.priority, COLUMNS[9].1).to_string());

        println!("{}", cells.join("  "));
    }
}

/// Print every field of a single item
pub fn print_item_detail(item: &PendingItem) {
    println!("{} {}", "TOP #".bold(), item.top_number.bright_white().bold());
    println!("{}", item.id.to_string().dimmed());
    println!();

    let field = |label: &str, value: String| {
        if value.is_empty() {
            println!("  {} {}", pad(label, 24).cyan(), "-".dimmed());
        } else {
            println!("  {} {}", pad(label, 24).cyan(), value);
        }
    };

    field("Semana", format_week(item.week));
    field("Descripción del Sistema", item.system_description.clone());
    field("Hito Asociado", item.associated_milestone.clone());
    field("Disciplina", item.discipline.clone());
    field("Responsable", item.responsible.clone());
    field("SUB/Vendor", item.sub_vendor.clone());
    field("Descripción de faltas", item.deficiency_description.clone());
    if !item.fault.is_empty() {
        field("Falta", item.fault.clone());
    }
    field("Comentarios", item.comments.clone());
    field("Input Date", format_date(item.input_date.as_ref()));
    field("Fecha Compromiso", format_date(item.commitment_date.as_ref()));
    field("Fecha Objetivo", format_date(item.target_date.as_ref()));
    field("Fecha Cierre", format_date(item.close_date.as_ref()));
    println!("  {} {}", pad("Estado", 24).cyan(), status_colored(item.status, COLUMNS[8].1));
    println!("  {} {}", pad("Prioridad", 24).cyan(), priority_colored(item.priority, COLUMNS[9].1));

    match &item.location {
        Some(location) => {
            let mut parts = Vec::new();
            if !location.description.is_empty() {
                parts.push(location.description.clone());
            }
            if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
                parts.push(format!("({:.6}, {:.6})", lat, lon));
            }
            field("Ubicación", parts.join(" "));
        }
        None => field("Ubicación", String::new()),
    }

    let photos = if item.photos.is_empty() {
        String::new()
    } else {
        item.photos
            .iter()
            .enumerate()
            .map(|(i, p)| format!("#{} {} ({} KB)", i + 1, p.mime().unwrap_or("?"), p.size_hint() / 1024))
            .collect::<Vec<_>>()
            .join(", ")
    };
    field("Fotos", photos);
    field("Origen", item.origin.label().to_string());
}

/// One horizontal bar of a chart
pub fn print_bar(label: &str, label_width: usize, count: usize, max: usize, color: Color) {
    let filled = if max == 0 {
        0
    } else {
        (count * BAR_WIDTH).div_ceil(max)
    };
    println!(
        "  {} {}{} {}",
        pad(label, label_width),
        "█".repeat(filled).color(color),
        " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
        count
    );
}

/// Print the status, priority and discipline charts
pub fn print_summary(summary: &Summary) {
    println!(
        "{} {}   {} {} ({}%)   {} {} ({}%)   {} {}",
        "Total:".bold(),
        summary.total,
        "Abiertos:".bold(),
        summary.open.to_string().yellow(),
        summary.open_percent,
        "Cerrados:".bold(),
        summary.closed.to_string().green(),
        summary.closed_percent,
        "Alta prioridad:".bold(),
        summary.high_priority.to_string().red()
    );
    println!();

    println!("{}", "Estado".bold().underline());
    let status_max = summary.open.max(summary.closed);
    print_bar(Status::Open.label(), 10, summary.open, status_max, Color::Yellow);
    print_bar(Status::Closed.label(), 10, summary.closed, status_max, Color::Green);
    println!();

    println!("{}", "Prioridad".bold().underline());
    let priority_max = summary.by_priority.iter().map(|(_, c)| *c).max().unwrap_or(0);
    for (priority, count) in &summary.by_priority {
        let color = match priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Cyan,
        };
        print_bar(priority.label(), 10, *count, priority_max, color);
    }

    if !summary.by_discipline.is_empty() {
        println!();
        println!("{}", "Disciplina".bold().underline());
        let width = summary
            .by_discipline
            .iter()
            .map(|(d, _)| if d.is_empty() { 16 } else { d.width().max(9) })
            .max()
            .unwrap_or(10)
            .min(24);
        let max = summary.by_discipline.iter().map(|(_, c)| *c).max().unwrap_or(0);
        for (discipline, count) in &summary.by_discipline {
            let label = if discipline.is_empty() {
                "(sin disciplina)"
            } else {
                discipline.as_str()
            };
            print_bar(label, width, *count, max, Color::Blue);
        }
    }
}
