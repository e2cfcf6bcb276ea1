//! Punch-list item representation

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::photo::Photo;
use crate::tracker::excel::dates::parse_date_str;

/// Maximum number of photos attached to a single item
pub const MAX_PHOTOS: usize = 3;

/// Unique identifier of a pending item
///
/// Assigned once at creation and never reused, not even after the item is
/// deleted or the collection is overwritten by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }

    /// First 8 hex digits, used as a compact handle in listings
    pub fn short(&self) -> String {
        let simple = self.0.simple().to_string();
        simple[..8].to_string()
    }

    /// Check whether the hex form of this id starts with `prefix`
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim().to_lowercase().replace('-', "");
        !prefix.is_empty() && self.0.simple().to_string().starts_with(&prefix)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the item is still outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Status {
    #[default]
    #[serde(alias = "Abierto")]
    #[value(alias = "abierto")]
    Open,
    #[serde(alias = "Cerrado")]
    #[value(alias = "cerrado")]
    Closed,
}

impl Status {
    /// Closed iff a close date is present
    pub fn from_close_date(close_date: Option<&NaiveDate>) -> Self {
        if close_date.is_some() {
            Status::Closed
        } else {
            Status::Open
        }
    }

    /// Label used in spreadsheets and terminal output
    pub fn label(&self) -> &'static str {
        match self {
            Status::Open => "Abierto",
            Status::Closed => "Cerrado",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Item priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Priority {
    #[default]
    #[serde(alias = "Baja")]
    #[value(alias = "baja")]
    Low,
    #[serde(alias = "Media")]
    #[value(alias = "media")]
    Medium,
    #[serde(alias = "Alta")]
    #[value(alias = "alta")]
    High,
}

impl Priority {
    /// All priorities, highest first
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Default priority for a milestone.
    ///
    /// Case-insensitive substring match: "PTB" or "PEM" is High, otherwise
    /// "PRIMERA SINCRONIZACIÓN" or "SOPLADO" is Medium, anything else Low.
    pub fn from_milestone(milestone: &str) -> Self {
        let upper = milestone.to_uppercase();
        if upper.contains("PTB") || upper.contains("PEM") {
            Priority::High
        } else if upper.contains("PRIMERA SINCRONIZACIÓN") || upper.contains("SOPLADO") {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Baja",
            Priority::Medium => "Media",
            Priority::High => "Alta",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How an item entered the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Origin {
    #[default]
    Manual,
    #[serde(alias = "Importado")]
    Imported,
    Seed,
}

impl Origin {
    pub fn label(&self) -> &'static str {
        match self {
            Origin::Manual => "Manual",
            Origin::Imported => "Importado",
            Origin::Seed => "Inicial",
        }
    }
}

/// Where on site the item is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, alias = "descripcion", deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, alias = "latitud", deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "longitud", deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty() && self.latitude.is_none() && self.longitude.is_none()
    }
}

/// A single punch-list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    #[serde(default)]
    pub id: ItemId,
    #[serde(default, alias = "semana", deserialize_with = "lenient_week")]
    pub week: Option<f64>,
    #[serde(deserialize_with = "nullable_string")]
    pub top_number: String,
    #[serde(default, alias = "descripcion_sistema", deserialize_with = "nullable_string")]
    pub system_description: String,
    #[serde(default, alias = "hito_asociado", deserialize_with = "nullable_string")]
    pub associated_milestone: String,
    #[serde(default, alias = "disciplina", deserialize_with = "nullable_string")]
    pub discipline: String,
    #[serde(default, alias = "responsable", deserialize_with = "nullable_string")]
    pub responsible: String,
    #[serde(default, alias = "subcontratista", deserialize_with = "nullable_string")]
    pub sub_vendor: String,
    #[serde(default, alias = "comentarios", deserialize_with = "nullable_string")]
    pub comments: String,
    #[serde(default, alias = "descripcion_faltas", deserialize_with = "nullable_string")]
    pub deficiency_description: String,
    /// Free-text fault marker carried over from older records
    #[serde(default, alias = "falta", deserialize_with = "nullable_string")]
    pub fault: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub input_date: Option<NaiveDate>,
    #[serde(default, alias = "fecha_compromiso", deserialize_with = "lenient_date")]
    pub commitment_date: Option<NaiveDate>,
    #[serde(default, alias = "fecha_objetivo", deserialize_with = "lenient_date")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, alias = "fecha_cierre", deserialize_with = "lenient_date")]
    pub close_date: Option<NaiveDate>,
    #[serde(default, alias = "estado")]
    pub status: Status,
    #[serde(default, alias = "prioridad")]
    pub priority: Priority,
    #[serde(default, alias = "fotos")]
    pub photos: Vec<Photo>,
    #[serde(default, alias = "ubicacion")]
    pub location: Option<Location>,
    #[serde(default, alias = "origen", deserialize_with = "lenient_origin")]
    pub origin: Origin,
}

impl PendingItem {
    /// Create an open, low-priority item with a fresh id and empty fields
    pub fn new(top_number: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            week: None,
            top_number: top_number.into(),
            system_description: String::new(),
            associated_milestone: String::new(),
            discipline: String::new(),
            responsible: String::new(),
            sub_vendor: String::new(),
            comments: String::new(),
            deficiency_description: String::new(),
            fault: String::new(),
            input_date: None,
            commitment_date: None,
            target_date: None,
            close_date: None,
            status: Status::Open,
            priority: Priority::Low,
            photos: Vec::new(),
            location: None,
            origin: Origin::Manual,
        }
    }

    /// Set the close date and re-derive the status from it
    pub fn set_close_date(&mut self, close_date: Option<NaiveDate>) {
        self.close_date = close_date;
        self.status = Status::from_close_date(self.close_date.as_ref());
    }

    /// Repair a record loaded from storage.
    ///
    /// Truncates photos to the cap and closes items that carry a close date.
    /// A closed item without a date stays closed: imports produce those when
    /// the close-date cell is not a readable date. Returns true if anything had
    /// to change.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        if self.photos.len() > MAX_PHOTOS {
            log::warn!(
                "Item {} had {} photos, keeping the first {}",
                self.top_number,
                self.photos.len(),
                MAX_PHOTOS
            );
            self.photos.truncate(MAX_PHOTOS);
            changed = true;
        }

        if self.close_date.is_some() && self.status != Status::Closed {
            self.status = Status::Closed;
            changed = true;
        }

        if self.location.as_ref().is_some_and(Location::is_empty) {
            self.location = None;
            changed = true;
        }

        changed
    }
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_origin<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Origin, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

fn lenient_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_week<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(lenient_coordinate(deserializer)?.filter(|w| w.is_finite() && *w >= 0.0))
}

fn lenient_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_date_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_from_milestone() {
        assert_eq!(Priority::from_milestone("PTB PEM"), Priority::High);
        assert_eq!(Priority::from_milestone("hito ptb norte"), Priority::High);
        assert_eq!(Priority::from_milestone("Pem"), Priority::High);
        assert_eq!(
            Priority::from_milestone("Primera sincronización"),
            Priority::Medium
        );
        assert_eq!(Priority::from_milestone("soplado de líneas"), Priority::Medium);
        assert_eq!(Priority::from_milestone("Energización"), Priority::Low);
        assert_eq!(Priority::from_milestone(""), Priority::Low);
        // High wins over Medium keywords
        assert_eq!(Priority::from_milestone("SOPLADO PTB"), Priority::High);
    }

    #[test]
    fn test_set_close_date_rederives_status() {
        let mut item = PendingItem::new("A-001");
        assert_eq!(item.status, Status::Open);

        item.set_close_date(NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(item.status, Status::Closed);

        item.set_close_date(None);
        assert_eq!(item.status, Status::Open);
    }

    #[test]
    fn test_item_ids_are_unique() {
        let a = PendingItem::new("A");
        let b = PendingItem::new("A");
        assert_ne!(a.id, b.id);
        assert!(a.id.matches_prefix(&a.id.short()));
        assert_eq!(ItemId::parse(&a.id.to_string()), Some(a.id));
    }

    #[test]
    fn test_deserialize_legacy_spanish_record() {
        let json = r#"{
            "id": 1718000000000.123,
            "semana": 24,
            "top_number": "A-001",
            "descripcion_sistema": "Sistema X",
            "hito_asociado": "PTB",
            "falta": "-",
            "descripcion_faltas": null,
            "disciplina": "M",
            "origen": "Importado",
            "responsable": "Nelson",
            "input_date": null,
            "fecha_compromiso": "2025-02-03",
            "fecha_objetivo": "",
            "fecha_cierre": "2025-03-01",
            "subcontratista": "ACME",
            "comentarios": "",
            "estado": "Cerrado",
            "prioridad": "Alta",
            "fotos": [],
            "ubicacion": { "descripcion": "", "latitud": "", "longitud": "" }
        }"#;

        let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
        value.as_object_mut().unwrap().remove("id");
        let mut item: PendingItem = serde_json::from_value(value).unwrap();

        assert_eq!(item.week, Some(24.0));
        assert_eq!(item.top_number, "A-001");
        assert_eq!(item.deficiency_description, "");
        assert_eq!(item.fault, "-");
        assert_eq!(item.commitment_date, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(item.target_date, None);
        assert_eq!(item.status, Status::Closed);
        assert_eq!(item.priority, Priority::High);
        assert_eq!(item.origin, Origin::Imported);

        // Empty location collapses to None
        assert!(item.normalize());
        assert_eq!(item.location, None);

        // The fault marker survives a save and reload
        let saved = serde_json::to_value(&item).unwrap();
        assert_eq!(saved["fault"], "-");
        let reloaded: PendingItem = serde_json::from_value(saved).unwrap();
        assert_eq!(reloaded, item);
    }

    #[test]
    fn test_normalize_truncates_photos_and_fixes_status() {
        let mut item = PendingItem::new("B-002");
        item.photos = (0..5)
            .map(|i| Photo::from_bytes("image/png", &[i]))
            .collect();
        item.close_date = NaiveDate::from_ymd_opt(2025, 1, 1);

        assert!(item.normalize());
        assert_eq!(item.photos.len(), MAX_PHOTOS);
        assert_eq!(item.status, Status::Closed);
        assert!(!item.normalize());
    }

    #[test]
    fn test_normalize_keeps_closed_item_without_date() {
        let mut item = PendingItem::new("B-003");
        item.status = Status::Closed;

        assert!(!item.normalize());
        assert_eq!(item.status, Status::Closed);
        assert_eq!(item.close_date, None);
    }
}
