use serde_json::Value;

use super::{format_value, result_of};

/// Headline fields, most specific first. The full APV wins over any component.
const PRIORITY_KEYS: [&str; 8] = [
    "apv",
    "pv_operating_cash_flows",
    "pv_depreciation_shields",
    "loan_benefit",
    "pv_interest_shields",
    "lambda",
    "arbitrage",
    "spot_rates",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return format_value(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_value(val));
        }
    }

    format_value(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apv_preferred() {
        let v = json!({ "result": { "lambda": "0.55", "apv": "769308.04" } });
        assert_eq!(minimal_line(&v), "769308.04");
    }

    #[test]
    fn test_component_headline() {
        let v = json!({ "result": { "periods": [], "loan_benefit": "392689.29" } });
        assert_eq!(minimal_line(&v), "392689.29");
    }
}
