use serde_json::Value;

pub const NEUTRAL_BACKGROUND: &str = "#f0f0f0";
pub const MISSING_VALUE: &str = "-";

/// Machine field → electrical parameter → coefficient, in the order the service sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub rows: Vec<CorrelationRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationRow {
    pub field: String,
    pub values: Vec<(String, Option<f64>)>,
}

impl CorrelationMatrix {
    /// Returns `None` when `correlations` is missing, not an object or empty.
    pub fn from_json(correlations: &Value) -> Option<Self> {
        let Value::Object(rows) = correlations else {
            return None;
        };

        if rows.is_empty() {
            return None;
        }

        let rows = rows
            .iter()
            .map(|(field, cells)| CorrelationRow {
                field: field.clone(),
                values: match cells {
                    Value::Object(cells) => cells
                        .iter()
                        .map(|(parameter, value)| (parameter.clone(), value.as_f64()))
                        .collect(),
                    _ => Vec::new(),
                },
            })
            .collect();

        Some(Self { rows })
    }
}

impl CorrelationRow {
    fn value(&self, parameter: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == parameter)
            .and_then(|(_, value)| *value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationTable {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub field: String,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub background: String,
}

impl CorrelationTable {
    pub fn from_matrix(matrix: &CorrelationMatrix) -> Self {
        // Union of every row's parameters, first seen first
        let mut columns: Vec<String> = Vec::new();
        for (parameter, _) in matrix.rows.iter().flat_map(|row| &row.values) {
            if !columns.contains(parameter) {
                columns.push(parameter.clone());
            }
        }

        let rows = matrix
            .rows
            .iter()
            .map(|row| TableRow {
                field: row.field.clone(),
                cells: columns
                    .iter()
                    .map(|column| table_cell(row.value(column)))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }
}

fn table_cell(value: Option<f64>) -> TableCell {
    TableCell {
        text: value.map_or_else(|| MISSING_VALUE.to_string(), format_coefficient),
        background: value.map_or_else(|| NEUTRAL_BACKGROUND.to_string(), cell_background),
    }
}

pub fn format_coefficient(value: f64) -> String {
    format!("{value:.3}")
}

/// Linear ramp: green for positive, red for negative, gray at zero.
///
/// Channels are not clamped, coefficients beyond ±1.99 yield negative channels.
pub fn cell_background(value: f64) -> String {
    if value > 0.0 {
        let intensity = intensity(value);
        format!("rgb({intensity}, 255, {intensity})")
    } else if value < 0.0 {
        let intensity = intensity(value.abs());
        format!("rgb(255, {intensity}, {intensity})")
    } else {
        NEUTRAL_BACKGROUND.to_string()
    }
}

#[expect(clippy::cast_possible_truncation)]
fn intensity(magnitude: f64) -> i64 {
    (255.0 - magnitude * 128.0).floor() as i64
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table(correlations: &Value) -> CorrelationTable {
        CorrelationTable::from_matrix(&CorrelationMatrix::from_json(correlations).unwrap())
    }

    #[test]
    fn zero_is_neutral_gray() {
        assert_eq!(cell_background(0.0), NEUTRAL_BACKGROUND);
        assert_eq!(cell_background(-0.0), NEUTRAL_BACKGROUND);
        assert_eq!(cell_background(f64::NAN), NEUTRAL_BACKGROUND);
    }

    #[test]
    fn positive_values_hold_green() {
        assert_eq!(cell_background(0.5), "rgb(191, 255, 191)");
        assert_eq!(cell_background(1.0), "rgb(127, 255, 127)");
        assert_eq!(cell_background(0.3), "rgb(216, 255, 216)");
    }

    #[test]
    fn negative_values_hold_red() {
        assert_eq!(cell_background(-0.5), "rgb(255, 191, 191)");
        assert_eq!(cell_background(-1.0), "rgb(255, 127, 127)");
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        assert_eq!(cell_background(2.5), "rgb(-65, 255, -65)");
    }

    #[test]
    fn coefficients_show_three_decimals() {
        assert_eq!(format_coefficient(0.2), "0.200");
        assert_eq!(format_coefficient(-0.98765), "-0.988");
        assert_eq!(format_coefficient(1.0), "1.000");
    }

    #[test]
    fn empty_or_malformed_correlations_are_no_data() {
        assert_eq!(CorrelationMatrix::from_json(&Value::Null), None);
        assert_eq!(CorrelationMatrix::from_json(&json!({})), None);
        assert_eq!(CorrelationMatrix::from_json(&json!([1, 2])), None);
        assert_eq!(CorrelationMatrix::from_json(&json!("nope")), None);
    }

    #[test]
    fn rows_follow_response_order() {
        let table = table(&json!({
            "temp_nozzle": { "apower": 0.5 },
            "fan_speed": { "apower": -0.5 },
            "temp_bed": { "apower": 0.0 },
        }));

        let fields = table.rows.iter().map(|row| row.field.as_str()).collect::<Vec<_>>();
        assert_eq!(fields, ["temp_nozzle", "fan_speed", "temp_bed"]);
    }

    #[test]
    fn columns_are_the_union_of_all_rows() {
        let table = table(&json!({
            "temp_nozzle": { "voltage": 0.1 },
            "temp_bed": { "apower": 0.25, "voltage": 0.2 },
        }));

        assert_eq!(table.columns, ["voltage", "apower"]);

        let nozzle = &table.rows[0].cells;
        assert_eq!(nozzle[0].text, "0.100");
        assert_eq!(nozzle[1].text, MISSING_VALUE);
        assert_eq!(nozzle[1].background, NEUTRAL_BACKGROUND);

        let bed = &table.rows[1].cells;
        assert_eq!(bed[0].text, "0.200");
        assert_eq!(bed[1].text, "0.250");
        assert_eq!(bed[1].background, "rgb(223, 255, 223)");
    }

    #[test]
    fn null_coefficients_render_as_missing() {
        let table = table(&json!({ "temp_bed": { "apower": null, "current": -0.5 } }));

        assert_eq!(table.columns, ["apower", "current"]);
        assert_eq!(table.rows[0].cells[0].text, MISSING_VALUE);
        assert_eq!(table.rows[0].cells[1].text, "-0.500");
        assert_eq!(table.rows[0].cells[1].background, "rgb(255, 191, 191)");
    }

    #[test]
    fn rows_without_an_object_render_dashes() {
        let table = table(&json!({
            "temp_nozzle": { "apower": 0.5 },
            "temp_bed": 3,
        }));

        assert_eq!(table.rows[1].field, "temp_bed");
        assert_eq!(table.rows[1].cells[0].text, MISSING_VALUE);
    }
}
