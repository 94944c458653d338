use crate::errors::RemediatorError;

const DANGEROUS_PATTERNS: &[&str] = &[
    "../",
    "..\\",
    "file:",
    "javascript:",
    "data:",
];

/// Reject config strings that could escape paths, smuggle URIs, or inject
/// header/ref control characters.
pub fn validate_security_patterns(value: &serde_yaml::Value) -> Result<(), RemediatorError> {
    check_value(value, &[])
}

fn path_label(path: &[String]) -> String {
    if path.is_empty() { "root".to_string() } else { path.join(".") }
}

fn check_value(value: &serde_yaml::Value, path: &[String]) -> Result<(), RemediatorError> {
    match value {
        serde_yaml::Value::String(s) => {
            let lower = s.to_lowercase();
            for pattern in DANGEROUS_PATTERNS {
                if lower.contains(pattern) {
                    return Err(RemediatorError::Config(
                        format!("Dangerous pattern '{}' found at config path: {}", pattern, path_label(path))
                    ));
                }
            }
            if s.chars().any(char::is_control) {
                return Err(RemediatorError::Config(
                    format!("Control character found at config path: {}", path_label(path))
                ));
            }
            Ok(())
        }
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key = k.as_str().unwrap_or("unknown").to_string();
                let mut new_path = path.to_vec();
                new_path.push(key);
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        serde_yaml::Value::Sequence(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let mut new_path = path.to_vec();
                new_path.push(format!("[{}]", i));
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
