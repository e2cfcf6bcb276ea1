//! Header row mapping
//!
//! Maps the labels of a sheet's header row to canonical item fields. Labels
//! are compared after trimming, collapsing whitespace, uppercasing and folding
//! accents, so "Descripción del sistema" and "DESCRIPCION  DEL SISTEMA" match
//! the same field.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::cells::Cell;

/// Canonical importable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Week,
    TopNumber,
    SystemDescription,
    AssociatedMilestone,
    Discipline,
    Responsible,
    InputDate,
    CommitmentDate,
    TargetDate,
    CloseDate,
    SubVendor,
    DeficiencyDescription,
    Comments,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Week,
        Field::TopNumber,
        Field::SystemDescription,
        Field::AssociatedMilestone,
        Field::Discipline,
        Field::Responsible,
        Field::InputDate,
        Field::CommitmentDate,
        Field::TargetDate,
        Field::CloseDate,
        Field::SubVendor,
        Field::DeficiencyDescription,
        Field::Comments,
    ];

    /// Canonical header label
    pub fn label(&self) -> &'static str {
        match self {
            Field::Week => "Semana",
            Field::TopNumber => "TOP #",
            Field::SystemDescription => "Descripción del Sistema",
            Field::AssociatedMilestone => "Hito Asociado",
            Field::Discipline => "Disciplina",
            Field::Responsible => "Responsable ACC",
            Field::InputDate => "Input Date",
            Field::CommitmentDate => "Fecha Compromiso Obra",
            Field::TargetDate => "Fecha Objetivo TOP",
            Field::CloseDate => "Fecha Cierre",
            Field::SubVendor => "SUB/Vendor",
            Field::DeficiencyDescription => "Descripción de faltas",
            Field::Comments => "Comentarios",
        }
    }

    fn default_spellings(&self) -> &'static [&'static str] {
        match self {
            Field::Week => &["SEMANA", "WEEK", "WK"],
            Field::TopNumber => &["TOP #", "TOP#", "TOP", "TOP NUMBER", "TOP NO"],
            Field::SystemDescription => &[
                "DESCRIPCIÓN DEL SISTEMA",
                "SISTEMA",
                "SYSTEM DESCRIPTION",
                "SYSTEM",
            ],
            Field::AssociatedMilestone => &["HITO ASOCIADO", "HITO", "ASSOCIATED MILESTONE", "MILESTONE"],
            Field::Discipline => &["DISCIPLINA", "DISCIPLINE"],
            Field::Responsible => &["RESPONSABLE ACC", "RESPONSABLE", "RESPONSIBLE"],
            Field::InputDate => &["INPUT DATE", "FECHA INPUT", "FECHA INGRESO"],
            Field::CommitmentDate => &[
                "FECHA COMPROMISO OBRA",
                "FECHA COMPROMISO",
                "COMMITMENT DATE",
            ],
            Field::TargetDate => &["FECHA OBJETIVO TOP", "FECHA OBJETIVO", "TARGET DATE"],
            Field::CloseDate => &["FECHA CIERRE", "FECHA DE CIERRE", "CLOSE DATE"],
            Field::SubVendor => &["SUB/VENDOR", "SUBVENDOR", "VENDOR", "SUBCONTRATISTA"],
            Field::DeficiencyDescription => &[
                "DESCRIPCIÓN DE FALTAS",
                "FALTAS",
                "DEFICIENCY DESCRIPTION",
            ],
            Field::Comments => &["COMENTARIOS", "COMMENTS"],
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Normalize a header label for comparison
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
        .chars()
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        other => other,
    }
}

/// Accepted header spellings per field
#[derive(Debug, Clone)]
pub struct HeaderTable {
    entries: Vec<(Field, Vec<String>)>,
}

impl Default for HeaderTable {
    fn default() -> Self {
        let entries = Field::ALL
            .iter()
            .map(|field| {
                let spellings = field
                    .default_spellings()
                    .iter()
                    .map(|s| normalize_label(s))
                    .collect();
                (*field, spellings)
            })
            .collect();
        Self { entries }
    }
}

impl HeaderTable {
    /// Accept additional spellings for a field
    pub fn with_synonyms<I, S>(mut self, field: Field, spellings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            for spelling in spellings {
                let normalized = normalize_label(spelling.as_ref());
                if !normalized.is_empty() && !existing.contains(&normalized) {
                    existing.push(normalized);
                }
            }
        }
        self
    }

    /// Extend the table from a field → spellings map
    pub fn extend(self, extra: &HashMap<Field, Vec<String>>) -> Self {
        let mut fields: Vec<_> = extra.keys().copied().collect();
        fields.sort();
        fields
            .into_iter()
            .fold(self, |table, field| table.with_synonyms(field, &extra[&field]))
    }

    /// Canonical field for a header label, if recognized
    pub fn field_for(&self, label: &str) -> Option<Field> {
        let normalized = normalize_label(label);
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, spellings)| spellings.contains(&normalized))
            .map(|(field, _)| *field)
    }

    /// Map a header row to column indices. The first matching column wins and
    /// unrecognized labels are ignored.
    pub fn map_headers(&self, header: &[Cell]) -> HeaderMap {
        let mut columns = HashMap::new();
        for (col, cell) in header.iter().enumerate() {
            if let Some(field) = self.field_for(&cell.text()) {
                columns.entry(field).or_insert(col);
            }
        }
        HeaderMap { columns }
    }
}

/// Field → column index for one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: HashMap<Field, usize>,
}

impl HeaderMap {
    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The cell for a field, `None` when the column is absent or the row is short
    pub fn cell<'a>(&self, row: &'a [Cell], field: Field) -> Option<&'a Cell> {
        self.column(field).and_then(|col| row.get(col))
    }

    /// Trimmed text of a field's cell, empty when absent
    pub fn text(&self, row: &[Cell], field: Field) -> String {
        self.cell(row, field).map(Cell::text).unwrap_or_default()
    }

    /// Canonical fields the sheet did not provide
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| !self.contains(*f))
            .collect()
    }
}
