use serde_json::Value;
use std::io::{self, Write};

use super::{format_value, record_tables, result_of, scalar_fields};

/// Write output as CSV to stdout.
///
/// The headline figures come first as `field,value` rows; each per-period
/// schedule follows as its own section, introduced by a `# name` line.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_csv<W: Write>(out: W, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);

    match result_of(value) {
        Value::Object(result) => {
            wtr.write_record(["field", "value"])?;
            for (key, val) in scalar_fields(result) {
                wtr.write_record([key, format_value(&val)])?;
            }
            for (name, rows) in record_tables(result) {
                wtr.write_record([format!("# {name}")])?;
                write_rows(&mut wtr, rows)?;
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        other => wtr.write_record([format_value(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_rows<W: Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[Value],
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sections_written() {
        let v = json!({
            "result": {
                "loan_benefit": "392689.29",
                "periods": [
                    { "period": 1, "present_value": "185185.19" },
                    { "period": 2, "present_value": "150034.29" }
                ]
            }
        });
        let mut buf = Vec::new();
        write_csv(&mut buf, &v).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "field,value");
        assert_eq!(lines[1], "loan_benefit,392689.29");
        assert_eq!(lines[2], "# periods");
        assert_eq!(lines[3], "period,present_value");
        assert_eq!(lines[4], "1,185185.19");
        assert_eq!(lines[5], "2,150034.29");
    }
}
