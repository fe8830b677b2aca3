use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a piped parameter document from stdin, JSON first, then YAML.
/// Returns None when stdin is a TTY or nothing was piped.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => serde_yaml::from_str(trimmed)
            .map(Some)
            .map_err(|yaml_err| {
                format!("stdin is neither JSON ({json_err}) nor YAML ({yaml_err})").into()
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_empty_input_is_none() {
        let parsed: Option<Value> = parse_piped("   \n").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_json_and_yaml_accepted() {
        let json: Option<Value> = parse_piped(r#"{"project_life": 8}"#).unwrap();
        assert_eq!(json.unwrap()["project_life"], 8);

        let yaml: Option<Value> = parse_piped("project_life: 8\nspot_rate: '1.32'\n").unwrap();
        assert_eq!(yaml.unwrap()["spot_rate"], "1.32");
    }

    #[test]
    fn test_garbage_rejected() {
        let parsed: Result<Option<Value>, _> = parse_piped("{ not: [valid");
        assert!(parsed.is_err());
    }
}
