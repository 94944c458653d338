use tracing::debug;

/// Environment variables checked for a token, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> Option<String> {
    match value.strip_prefix('$') {
        Some(var_name) => match std::env::var(var_name) {
            Ok(resolved) if !resolved.is_empty() => {
                debug!(var = %var_name, "Resolved credential from environment");
                Some(resolved)
            }
            _ => {
                debug!(var = %var_name, "Environment variable not set");
                None
            }
        },
        None if value.is_empty() => None,
        None => Some(value.to_string()),
    }
}

/// First token found in: CLI flag, config file, then `TOKEN_ENV_VARS`.
pub fn resolve_token(cli: Option<&str>, file: Option<&str>) -> Option<String> {
    cli.and_then(resolve_credential)
        .or_else(|| file.and_then(resolve_credential))
        .or_else(|| {
            TOKEN_ENV_VARS.iter()
                .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        })
}

/// Redact sensitive values in a string. Replaces known credential patterns
/// with [REDACTED].
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credential_literal() {
        assert_eq!(resolve_credential("ghp_literal").as_deref(), Some("ghp_literal"));
        assert_eq!(resolve_credential(""), None);
    }

    #[test]
    fn test_resolve_credential_env_var() {
        std::env::set_var("TEST_REMEDIATOR_CRED", "secret123");
        assert_eq!(resolve_credential("$TEST_REMEDIATOR_CRED").as_deref(), Some("secret123"));
        std::env::remove_var("TEST_REMEDIATOR_CRED");
    }

    #[test]
    fn test_resolve_credential_missing_env_var() {
        assert_eq!(resolve_credential("$NONEXISTENT_REMEDIATOR_VAR"), None);
    }

    #[test]
    fn test_resolve_token_prefers_cli() {
        assert_eq!(resolve_token(Some("from-cli"), Some("from-file")).as_deref(), Some("from-cli"));
        assert_eq!(resolve_token(None, Some("from-file")).as_deref(), Some("from-file"));
    }

    #[test]
    fn test_redact_credentials() {
        let text = "request failed: Authorization: Bearer ghp_S3cret123";
        let redacted = redact_credentials(text, &["ghp_S3cret123"]);
        assert!(redacted.contains("[REDACTED]"));
        assert!(!redacted.contains("ghp_S3cret123"));
    }

    #[test]
    fn test_redact_credentials_short_secret_ignored() {
        let text = "key=ab";
        let redacted = redact_credentials(text, &["ab"]);
        assert_eq!(redacted, "key=ab"); // too short to redact
    }
}
