//! Exhibit identifiers and their descriptive metadata.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Unique key of a displayed exhibit (`"relic1"`, `"relic2"`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExhibitId(Cow<'static, str>);

impl ExhibitId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExhibitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ExhibitId {
    fn from(id: &'static str) -> Self {
        Self::new(id)
    }
}

/// Immutable description of one exhibit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExhibitRecord {
    pub id: ExhibitId,
    pub title: &'static str,
    pub year: &'static str,
    pub materials: &'static str,
    pub dimensions: &'static str,
    pub description: &'static str,
}

/// Returned by [`ExhibitRegistry::lookup`] for unknown ids.
///
/// An ordinary outcome, not a failure: the selection path maps it to "nothing selected".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotFound;

/// Exhibit metadata keyed by id.
#[derive(Clone, Debug, Default)]
pub struct ExhibitRegistry {
    records: HashMap<ExhibitId, ExhibitRecord>,
}

impl ExhibitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six relics shown in the gallery.
    pub fn gallery() -> Self {
        let mut registry = Self::new();
        for record in [
            record(
                "relic1",
                "Relic I: Foundation",
                "Heavyweight cotton, screen print",
                "28 × 36 in.",
                "The origin piece. Triangle, circle, square rendered in gold on black. The geometry that grounds us.",
            ),
            record(
                "relic2",
                "Relic II: Inspired",
                "French terry, embroidered",
                "32 × 44 in.",
                "The word made wearable. INSPIRED BY GOD across the chest. A declaration, not decoration.",
            ),
            record(
                "relic3",
                "Relic III: Sacred Geometry",
                "Premium fleece, metallic thread",
                "30 × 40 in.",
                "Oversized. Intentional. The three forms in gold, centered over the heart.",
            ),
            record(
                "relic4",
                "Relic IV: The Mark",
                "Cotton blend, embossed",
                "26 × 34 in.",
                "Minimal. The IBG lettermark alone. For those who know.",
            ),
            record(
                "relic5",
                "Relic V: Collection",
                "Organic cotton, heritage print",
                "34 × 46 in.",
                "Full expression. IBG COLLECTION rendered in chapel gold. The complete identity.",
            ),
            record(
                "relic6",
                "Relic VI: Future",
                "Technical fabric, reflective ink",
                "28 × 38 in.",
                "Forward facing. The geometry in silver. Clothing cultivated for what comes next.",
            ),
        ] {
            registry.insert(record);
        }
        registry
    }

    /// Add or replace a record.
    pub fn insert(&mut self, record: ExhibitRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn lookup(&self, id: &ExhibitId) -> Result<&ExhibitRecord, NotFound> {
        self.records.get(id).ok_or(NotFound)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn record(
    id: &'static str,
    title: &'static str,
    materials: &'static str,
    dimensions: &'static str,
    description: &'static str,
) -> ExhibitRecord {
    ExhibitRecord {
        id: ExhibitId::new(id),
        title,
        year: "2024",
        materials,
        dimensions,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relic3_has_its_fixed_record() {
        let registry = ExhibitRegistry::gallery();
        let record = registry.lookup(&"relic3".into()).unwrap();
        assert_eq!(record.title, "Relic III: Sacred Geometry");
        assert_eq!(record.year, "2024");
        assert_eq!(record.materials, "Premium fleece, metallic thread");
        assert_eq!(record.dimensions, "30 × 40 in.");
        assert_eq!(
            record.description,
            "Oversized. Intentional. The three forms in gold, centered over the heart."
        );
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = ExhibitRegistry::gallery();
        assert_eq!(registry.lookup(&"relic7".into()), Err(NotFound));
        assert_eq!(registry.len(), 6);
    }
}
