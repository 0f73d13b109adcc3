use crate::domain::model::{Field, FieldValue, NormalizedRecord, NormalizedTable};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Distinct values of `field`, in the order they first appear in the table.
pub fn distinct_values(table: &NormalizedTable, field: Field) -> Vec<FieldValue> {
    let mut seen = HashSet::new();
    table
        .iter()
        .map(|record| record.get(field))
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Multi-select restriction over the categorical columns. An empty list admits everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub departments: Vec<String>,
    pub designations: Vec<String>,
    pub genders: Vec<String>,
}

impl Selection {
    pub fn admits(&self, record: &NormalizedRecord) -> bool {
        fn member(allowed: &[String], value: &str) -> bool {
            allowed.is_empty() || allowed.iter().any(|a| a == value)
        }

        member(&self.departments, &record.department)
            && member(&self.designations, record.designation.label())
            && member(&self.genders, &record.gender)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub designations: Vec<String>,
    pub genders: Vec<String>,
}

impl FilterOptions {
    pub fn from_table(table: &NormalizedTable) -> Self {
        let texts = |field: Field| -> Vec<String> {
            distinct_values(table, field)
                .into_iter()
                .map(|v| v.to_string())
                .collect()
        };
        Self {
            departments: texts(Field::Department),
            designations: texts(Field::Designation),
            genders: texts(Field::Gender),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_employees: usize,
    pub avg_salary: Option<f64>,
    pub avg_age: Option<f64>,
    pub avg_experience: Option<f64>,
    /// Mean salary per department, highest first.
    pub salary_by_department: Vec<(String, f64)>,
    pub headcount_by_department: Vec<(String, usize)>,
    pub headcount_by_designation: Vec<(String, usize)>,
    /// Options are taken from the whole table, not the selection.
    pub options: FilterOptions,
}

impl DashboardSummary {
    pub fn build(table: &NormalizedTable, selection: &Selection) -> Self {
        let selected: Vec<&NormalizedRecord> =
            table.iter().filter(|r| selection.admits(r)).collect();

        let mut salary_by_department: Vec<(String, f64)> =
            group_by(&selected, |r| r.department.clone())
                .into_iter()
                .map(|(department, members)| {
                    let total: f64 = members.iter().map(|r| r.salary as f64).sum();
                    (department, total / members.len() as f64)
                })
                .collect();
        salary_by_department.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            total_employees: selected.len(),
            avg_salary: mean(&selected, |r| r.salary),
            avg_age: mean(&selected, |r| r.age),
            avg_experience: mean(&selected, |r| r.years_of_experience),
            salary_by_department,
            headcount_by_department: headcount(&selected, |r| r.department.clone()),
            headcount_by_designation: headcount(&selected, |r| r.designation.label().to_string()),
            options: FilterOptions::from_table(table),
        }
    }
}

impl fmt::Display for DashboardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        let avg = |value: Option<f64>, decimals: usize| match value {
            Some(v) => format!("{:.*}", decimals, v),
            None => "n/a".to_string(),
        };

        writeln!(f, "{}", rule)?;
        writeln!(f, "Employee Analytics")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total Employees: {}", self.total_employees)?;
        writeln!(f, "Avg Salary:      {}", avg(self.avg_salary, 0))?;
        writeln!(f, "Avg Age:         {}", avg(self.avg_age, 1))?;
        writeln!(f, "Avg Experience:  {} years", avg(self.avg_experience, 1))?;

        writeln!(f, "\nSalary by Department")?;
        for (department, salary) in &self.salary_by_department {
            writeln!(f, "  {:<24} {:>12.0}", department, salary)?;
        }

        writeln!(f, "\nEmployees by Department")?;
        for (department, count) in &self.headcount_by_department {
            writeln!(f, "  {:<24} {:>12}", department, count)?;
        }

        writeln!(f, "\nEmployees by Designation")?;
        for (designation, count) in &self.headcount_by_designation {
            writeln!(f, "  {:<24} {:>12}", designation, count)?;
        }

        writeln!(f, "\nFilter options")?;
        writeln!(f, "  department:  {}", self.options.departments.join(", "))?;
        writeln!(f, "  designation: {}", self.options.designations.join(", "))?;
        writeln!(f, "  gender:      {}", self.options.genders.join(", "))?;
        write!(f, "{}", rule)
    }
}

fn mean<V>(records: &[&NormalizedRecord], value: V) -> Option<f64>
where
    V: Fn(&NormalizedRecord) -> i64,
{
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(|r| value(r) as f64).sum();
    Some(sum / records.len() as f64)
}

/// Groups in first-seen key order.
fn group_by<'a, K>(
    records: &[&'a NormalizedRecord],
    key: K,
) -> Vec<(String, Vec<&'a NormalizedRecord>)>
where
    K: Fn(&NormalizedRecord) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&'a NormalizedRecord>)> = Vec::new();
    for record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(*record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![*record]));
            }
        }
    }
    groups
}

/// Counts per key, largest first; ties keep first-seen order.
fn headcount<K>(records: &[&NormalizedRecord], key: K) -> Vec<(String, usize)>
where
    K: Fn(&NormalizedRecord) -> String,
{
    let mut counts: Vec<(String, usize)> = group_by(records, key)
        .into_iter()
        .map(|(k, members)| (k, members.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
