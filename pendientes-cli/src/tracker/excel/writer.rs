//! Write pending items to an Excel workbook

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use super::dates::format_iso;
use crate::tracker::types::PendingItem;

pub const SHEET_NAME: &str = "Pendientes";

/// Export columns in sheet order
mod cols {
    pub const WEEK: u16 = 0;
    pub const TOP_NUMBER: u16 = 1;
    pub const SYSTEM_DESCRIPTION: u16 = 2;
    pub const MILESTONE: u16 = 3;
    pub const DISCIPLINE: u16 = 4;
    pub const RESPONSIBLE: u16 = 5;
    pub const INPUT_DATE: u16 = 6;
    pub const COMMITMENT_DATE: u16 = 7;
    pub const TARGET_DATE: u16 = 8;
    pub const CLOSE_DATE: u16 = 9;
    pub const STATUS: u16 = 10;
    pub const PRIORITY: u16 = 11;
    pub const SUB_VENDOR: u16 = 12;
    pub const DEFICIENCY: u16 = 13;
    pub const COMMENTS: u16 = 14;
}

pub const HEADERS: [&str; 15] = [
    "Semana",
    "TOP #",
    "Descripción del Sistema",
    "Hito Asociado",
    "Disciplina",
    "Responsable",
    "Input Date",
    "Fecha Compromiso",
    "Fecha Objetivo",
    "Fecha Cierre",
    "Estado",
    "Prioridad",
    "SUB/Vendor",
    "Descripción de faltas",
    "Comentarios",
];

/// Default export file name for a given day
pub fn default_file_name(today: NaiveDate) -> String {
    format!("pendientes_{}.xlsx", format_iso(&today))
}

/// Write items to an `.xlsx` file
pub async fn write_items_excel(items: &[&PendingItem], path: &Path) -> Result<()> {
    let bytes = items_to_xlsx_bytes(items)?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;
    log::info!("Exported {} items to {}", items.len(), path.display());
    Ok(())
}

/// Write items to an in-memory `.xlsx` payload
pub fn items_to_xlsx_bytes(items: &[&PendingItem]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(items)?;
    workbook
        .save_to_buffer()
        .context("Failed to serialize Excel workbook")
}

fn build_workbook(items: &[&PendingItem]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    write_header(worksheet)?;

    for (idx, item) in items.iter().enumerate() {
        write_item(worksheet, (idx + 1) as u32, item)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.set_column_width(cols::SYSTEM_DESCRIPTION, 40)?;
    worksheet.set_column_width(cols::DEFICIENCY, 40)?;
    worksheet.set_column_width(cols::COMMENTS, 40)?;

    Ok(workbook)
}

fn write_header(ws: &mut Worksheet) -> Result<()> {
    let bold = Format::new().set_bold();
    for (col, label) in HEADERS.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *label, &bold)?;
    }
    Ok(())
}

fn write_item(ws: &mut Worksheet, row: u32, item: &PendingItem) -> Result<()> {
    if let Some(week) = item.week {
        ws.write_number(row, cols::WEEK, week)?;
    }
    ws.write_string(row, cols::TOP_NUMBER, &item.top_number)?;
    write_text(ws, row, cols::SYSTEM_DESCRIPTION, &item.system_description)?;
    write_text(ws, row, cols::MILESTONE, &item.associated_milestone)?;
    write_text(ws, row, cols::DISCIPLINE, &item.discipline)?;
    write_text(ws, row, cols::RESPONSIBLE, &item.responsible)?;
    write_date(ws, row, cols::INPUT_DATE, item.input_date.as_ref())?;
    write_date(ws, row, cols::COMMITMENT_DATE, item.commitment_date.as_ref())?;
    write_date(ws, row, cols::TARGET_DATE, item.target_date.as_ref())?;
    write_date(ws, row, cols::CLOSE_DATE, item.close_date.as_ref())?;
    ws.write_string(row, cols::STATUS, item.status.label())?;
    ws.write_string(row, cols::PRIORITY, item.priority.label())?;
    write_text(ws, row, cols::SUB_VENDOR, &item.sub_vendor)?;
    write_text(ws, row, cols::DEFICIENCY, &item.deficiency_description)?;
    write_text(ws, row, cols::COMMENTS, &item.comments)?;
    Ok(())
}

fn write_text(ws: &mut Worksheet, row: u32, col: u16, value: &str) -> Result<()> {
    if !value.is_empty() {
        ws.write_string(row, col, value)?;
    }
    Ok(())
}

fn write_date(ws: &mut Worksheet, row: u32, col: u16, date: Option<&NaiveDate>) -> Result<()> {
    if let Some(date) = date {
        ws.write_string(row, col, format_iso(date))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::excel::cells::{Cell, SheetFormat, read_rows};

    #[test]
    fn test_default_file_name() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(default_file_name(day), "pendientes_2025-06-09.xlsx");
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let mut item = PendingItem::new("A-001");
        item.week = Some(24.0);
        item.system_description = "Sistema X".into();
        item.set_close_date(NaiveDate::from_ymd_opt(2025, 1, 1));

        let bytes = items_to_xlsx_bytes(&[&item]).unwrap();
        let rows = read_rows(bytes, SheetFormat::Workbook).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Cell::Text("TOP #".into()));
        assert_eq!(rows[1][0], Cell::Number(24.0));
        assert_eq!(rows[1][1].text(), "A-001");
        assert_eq!(rows[1][cols::CLOSE_DATE as usize].text(), "2025-01-01");
        assert_eq!(rows[1][cols::STATUS as usize].text(), "Cerrado");
    }

    #[tokio::test]
    async fn test_write_items_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        let item = PendingItem::new("Z-9");

        write_items_excel(&[&item], &path).await.unwrap();
        let rows = read_rows(std::fs::read(&path).unwrap(), SheetFormat::Workbook).unwrap();
        assert_eq!(rows[1][1].text(), "Z-9");
    }
}
