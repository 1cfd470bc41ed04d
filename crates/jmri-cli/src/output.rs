//! Output formatting for jmri-cli (table or json)

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print rows in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(data));
                }
            }
            OutputFormat::Json => print_json(data),
        }
    }

    /// Print a raw server message
    pub fn print_value(&self, value: &Value) {
        match self.format {
            OutputFormat::Table => {
                let rows: Vec<FieldRow> = match value.get("data").and_then(Value::as_object) {
                    Some(fields) => fields
                        .iter()
                        .map(|(field, v)| FieldRow {
                            field: field.clone(),
                            value: display_value(v),
                        })
                        .collect(),
                    None => vec![FieldRow {
                        field: "value".to_string(),
                        value: display_value(value),
                    }],
                };
                self.print(&rows);
            }
            OutputFormat::Json => print_json(value),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(data: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(data).unwrap_or_else(|_| "null".to_string())
    );
}

/// Render a JSON value for a table cell
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Reporter display for the reporters command
#[derive(Debug, Tabled, Serialize)]
pub struct ReporterRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "User Name")]
    pub user_name: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Report")]
    pub report: String,
}

impl ReporterRow {
    /// Build a row from either `{"name",..}` or `{"type","data":{"name",..}}`
    pub fn from_value(value: &Value) -> Self {
        let fields = value.get("data").unwrap_or(value);
        let field = |key: &str| {
            fields
                .get(key)
                .map(display_value)
                .unwrap_or_else(|| "-".to_string())
        };

        Self {
            name: field("name"),
            user_name: field("userName"),
            state: field("state"),
            report: field("report"),
        }
    }
}

/// Single field of a server message
#[derive(Debug, Tabled, Serialize)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Throttle display for the run-train command
#[derive(Debug, Tabled, Serialize)]
pub struct ThrottleRow {
    #[tabled(rename = "Throttle")]
    pub throttle: String,
    #[tabled(rename = "Address")]
    pub address: u32,
    #[tabled(rename = "Speed")]
    pub speed: f64,
    #[tabled(rename = "Direction")]
    pub direction: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reporter_row_shapes() {
        let flat = ReporterRow::from_value(&json!({"name": "MR001"}));
        assert_eq!(flat.name, "MR001");
        assert_eq!(flat.report, "-");

        let wrapped = ReporterRow::from_value(&json!({
            "type": "reporter",
            "data": {"name": "MR002", "userName": "Yard", "state": 2, "report": "138"}
        }));
        assert_eq!(wrapped.name, "MR002");
        assert_eq!(wrapped.user_name, "Yard");
        assert_eq!(wrapped.state, "2");
        assert_eq!(wrapped.report, "138");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!(null)), "-");
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&json!(true)), "true");
    }
}
