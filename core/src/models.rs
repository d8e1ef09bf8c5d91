//! Molecule records exposed by the query service.
//!
//! Each endpoint gets its own fixed projection of the `molecules` table.

use serde::{Deserialize, Serialize};

/// Entry of the molecule list, ordered by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeSummary {
    pub molecule_id: i64,
    pub molecule_name: Option<String>,
}

/// Detail record for a single molecule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeDetails {
    pub molecule_id: i64,
    pub molecule_name: Option<String>,
    pub pubchem_cid: Option<StoredValue>,
    pub molecular_formula: Option<StoredValue>,
    pub molecular_weight: Option<StoredValue>,
    pub free_energy: Option<StoredValue>,
    pub created_date: Option<StoredValue>,
}

/// Point on the free-energy chart, ordered by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub molecule_id: i64,
    pub molecule_name: Option<String>,
    pub molecular_formula: Option<StoredValue>,
    pub free_energy: Option<StoredValue>,
}

/// Column value as SQLite stored it.
///
/// SQLite columns are loosely typed, so a weight may be `18.015` in one row
/// and `"N/A"` in another. Serialized without a tag so the JSON value keeps
/// the stored type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_serialize_all_fields() {
        let details = MoleculeDetails {
            molecule_id: 1,
            molecule_name: Some("Water".to_string()),
            pubchem_cid: Some(StoredValue::Integer(962)),
            molecular_formula: Some(StoredValue::Text("H2O".to_string())),
            molecular_weight: Some(StoredValue::Real(18.015)),
            free_energy: None,
            created_date: Some(StoredValue::Text("2024-05-01 12:00:00".to_string())),
        };

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(
            value,
            json!({
                "molecule_id": 1,
                "molecule_name": "Water",
                "pubchem_cid": 962,
                "molecular_formula": "H2O",
                "molecular_weight": 18.015,
                "free_energy": null,
                "created_date": "2024-05-01 12:00:00"
            })
        );
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_stored_value_keeps_type() {
        let text: StoredValue = serde_json::from_value(json!("N/A")).unwrap();
        assert_eq!(text, StoredValue::Text("N/A".to_string()));

        let real: StoredValue = serde_json::from_value(json!(17.5)).unwrap();
        assert_eq!(real, StoredValue::Real(17.5));

        assert_eq!(serde_json::to_value(StoredValue::Integer(7)).unwrap(), json!(7));
    }
}
