// emsctl - core/stats.rs
//
// Aggregate view over the roster: headcounts, mean age, age histogram.
// Core layer: pure computation over already-fetched lists.

use crate::core::model::{AgeBand, Department, Employee, StaffSummary};

/// Histogram band labels, in display order.
const AGE_BAND_LABELS: [&str; 5] = ["20-29", "30-39", "40-49", "50-59", "60+"];

/// Build the staff summary for the current employee and department lists.
///
/// The mean age is 0.0 for an empty roster. Ages below 20 count towards the
/// headcount and the mean but fall outside every histogram band.
pub fn summarize(employees: &[Employee], departments: &[Department]) -> StaffSummary {
    let mut band_counts = [0usize; 5];
    for employee in employees {
        match employee.age {
            20..=29 => band_counts[0] += 1,
            30..=39 => band_counts[1] += 1,
            40..=49 => band_counts[2] += 1,
            50..=59 => band_counts[3] += 1,
            age if age >= 60 => band_counts[4] += 1,
            _ => {}
        }
    }

    let average_age = if employees.is_empty() {
        0.0
    } else {
        let total: i64 = employees.iter().map(|e| i64::from(e.age)).sum();
        total as f64 / employees.len() as f64
    };

    StaffSummary {
        employee_count: employees.len(),
        department_count: departments.len(),
        average_age,
        age_bands: AGE_BAND_LABELS
            .into_iter()
            .zip(band_counts)
            .map(|(label, count)| AgeBand { label, count })
            .collect(),
    }
}
