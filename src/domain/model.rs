use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An employee object exactly as the source sent it. Nothing is guaranteed about its fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: HashMap<String, serde_json::Value>,
}

impl RawRecord {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawRecord {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: obj.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Designation {
    #[serde(rename = "System Engineer")]
    SystemEngineer,
    #[serde(rename = "Data Engineer")]
    DataEngineer,
    #[serde(rename = "Senior Data Engineer")]
    SeniorDataEngineer,
    #[serde(rename = "Lead")]
    Lead,
}

impl Designation {
    pub const ALL: [Designation; 4] = [
        Designation::SystemEngineer,
        Designation::DataEngineer,
        Designation::SeniorDataEngineer,
        Designation::Lead,
    ];

    /// Bands are closed on their lower edge: `<3`, `3..5`, `5..10`, `>=10`.
    pub fn from_years(years: i64) -> Self {
        match years {
            i64::MIN..=2 => Designation::SystemEngineer,
            3..=4 => Designation::DataEngineer,
            5..=9 => Designation::SeniorDataEngineer,
            _ => Designation::Lead,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Designation::SystemEngineer => "System Engineer",
            Designation::DataEngineer => "Data Engineer",
            Designation::SeniorDataEngineer => "Senior Data Engineer",
            Designation::Lead => "Lead",
        }
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Columns of the normalized schema, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Email,
    PhoneClean,
    Gender,
    Age,
    JobTitle,
    YearsOfExperience,
    Salary,
    Department,
    Designation,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::FullName,
        Field::Email,
        Field::PhoneClean,
        Field::Gender,
        Field::Age,
        Field::JobTitle,
        Field::YearsOfExperience,
        Field::Salary,
        Field::Department,
        Field::Designation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::PhoneClean => "phone_clean",
            Field::Gender => "gender",
            Field::Age => "age",
            Field::JobTitle => "job_title",
            Field::YearsOfExperience => "years_of_experience",
            Field::Salary => "salary",
            Field::Department => "department",
            Field::Designation => "designation",
        }
    }

    /// Exact, case-sensitive lookup. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell of the normalized table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Null,
}

impl FieldValue {
    /// Filter equality: same type and same value. Null never matches, not even another null.
    pub fn matches(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Null, _) | (_, FieldValue::Null) => false,
            (a, b) => a == b,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Typed conversion for filter values read from a config file.
    pub fn from_json(value: &serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Text(n.to_string()),
            },
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map(FieldValue::Int).unwrap_or(FieldValue::Null)
    }
}

/// Canonical employee row. Field declaration order is the output column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub full_name: String,
    pub email: String,
    pub phone_clean: Option<i64>,
    pub gender: String,
    pub age: i64,
    pub job_title: String,
    pub years_of_experience: i64,
    pub salary: i64,
    pub department: String,
    pub designation: Designation,
}

impl NormalizedRecord {
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::FullName => self.full_name.as_str().into(),
            Field::Email => self.email.as_str().into(),
            Field::PhoneClean => self.phone_clean.into(),
            Field::Gender => self.gender.as_str().into(),
            Field::Age => self.age.into(),
            Field::JobTitle => self.job_title.as_str().into(),
            Field::YearsOfExperience => self.years_of_experience.into(),
            Field::Salary => self.salary.into(),
            Field::Department => self.department.as_str().into(),
            Field::Designation => self.designation.label().into(),
        }
    }
}

/// Output of one fetch. Read-only once built; queries derive views from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn new(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a NormalizedTable {
    type Item = &'a NormalizedRecord;
    type IntoIter = std::slice::Iter<'a, NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_designation_bands_partition_integers() {
        for years in -50..=50 {
            let expected = if years < 3 {
                Designation::SystemEngineer
            } else if years < 5 {
                Designation::DataEngineer
            } else if years < 10 {
                Designation::SeniorDataEngineer
            } else {
                Designation::Lead
            };
            assert_eq!(Designation::from_years(years), expected, "years = {}", years);
        }

        assert_eq!(Designation::from_years(i64::MIN), Designation::SystemEngineer);
        assert_eq!(Designation::from_years(i64::MAX), Designation::Lead);
    }

    #[test]
    fn test_designation_band_edges() {
        assert_eq!(Designation::from_years(2).label(), "System Engineer");
        assert_eq!(Designation::from_years(3).label(), "Data Engineer");
        assert_eq!(Designation::from_years(5).label(), "Senior Data Engineer");
        assert_eq!(Designation::from_years(7).label(), "Senior Data Engineer");
        assert_eq!(Designation::from_years(10).label(), "Lead");
    }

    #[test]
    fn test_field_lookup_is_exact() {
        assert_eq!(Field::from_name("department"), Some(Field::Department));
        assert_eq!(Field::from_name("Department"), None);
        assert_eq!(Field::from_name("phone"), None);
        let names: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "full_name",
                "email",
                "phone_clean",
                "gender",
                "age",
                "job_title",
                "years_of_experience",
                "salary",
                "department",
                "designation"
            ]
        );
    }

    #[test]
    fn test_field_value_matching_is_typed() {
        assert!(FieldValue::from("25").matches(&FieldValue::from("25")));
        assert!(!FieldValue::from("25").matches(&FieldValue::Int(25)));
        assert!(!FieldValue::Null.matches(&FieldValue::Null));
        assert_eq!(FieldValue::from_json(&serde_json::json!(25)), FieldValue::Int(25));
        assert_eq!(
            FieldValue::from_json(&serde_json::json!("Product")),
            FieldValue::from("Product")
        );
    }
}
