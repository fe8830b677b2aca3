use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_value, record_tables, result_of, scalar_fields};

/// Print the headline figures as a field/value table, then every per-period
/// schedule as its own table.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            print_scalars(result);
            for (name, rows) in record_tables(result) {
                println!("\n{}", heading(name));
                print_records(rows);
            }
        }
        Value::Array(rows) => print_records(rows),
        other => println!("{}", format_value(other)),
    }

    if let Some(envelope) = value.as_object() {
        print_footer(envelope);
    }
}

fn print_scalars(result: &Map<String, Value>) {
    let fields = scalar_fields(result);
    if fields.is_empty() {
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.clone(), format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_records(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h).map(format_value).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", format_value(w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// `loan_payments` -> `Loan payments`
fn heading(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}
