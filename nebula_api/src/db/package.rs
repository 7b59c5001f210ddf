use serde::Deserialize;
use serde::Serialize;

/// Quantum level assigned to packages published without one.
pub const DEFAULT_QUANTUM_LEVEL: u8 = 1;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PackageModel {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub quantum_level: u8,
    /// Trica source, stored as is and never interpreted.
    pub code: String,
    pub downloads: u64,
    pub created_at: u64,
}

impl PackageModel {
    /// Human readable label for `quantum_level`. Display only.
    pub fn quantum_description(&self) -> &'static str {
        match self.quantum_level {
            0..=2 => "Harmless",
            3..=4 => "Mildly mind-bending",
            5..=6 => "Reality-altering",
            7..=8 => "Consciousness-threatening",
            9 => "Mind-destroying",
            10 => "Reality-ending",
            _ => "Beyond comprehension",
        }
    }
}

#[cfg(feature = "server")]
impl redb::Value for PackageModel {
    type SelfType<'a> = PackageModel;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None // Variable width due to strings
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        bincode::deserialize(data).expect("Failed to deserialize PackageModel")
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a> {
        bincode::serialize(value).expect("Failed to serialize PackageModel")
    }

    fn type_name() -> redb::TypeName {
        redb::TypeName::new("PackageModel")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(quantum_level: u8) -> PackageModel {
        PackageModel {
            id: "id".to_string(),
            name: "quantum_computing".to_string(),
            version: "3.0.1".to_string(),
            description: "Quantum algorithms".to_string(),
            author: "Quantum Trica Foundation".to_string(),
            quantum_level,
            code: "Main { Print \"hi\" }".to_string(),
            downloads: 0,
            created_at: 0,
        }
    }

    #[test]
    fn quantum_description_covers_every_level() {
        assert_eq!(package(1).quantum_description(), "Harmless");
        assert_eq!(package(4).quantum_description(), "Mildly mind-bending");
        assert_eq!(package(9).quantum_description(), "Mind-destroying");
        assert_eq!(package(10).quantum_description(), "Reality-ending");
        assert_eq!(package(11).quantum_description(), "Beyond comprehension");
    }

    #[test]
    fn package_json_uses_snake_case_fields() {
        let value = serde_json::to_value(package(7)).unwrap();
        assert_eq!(value["quantum_level"], 7);
        assert_eq!(value["created_at"], 0);
        assert_eq!(value["downloads"], 0);
    }
}
