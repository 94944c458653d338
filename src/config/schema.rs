use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "repository": { "type": "string", "pattern": "^[A-Za-z0-9._-]+/[A-Za-z0-9._-]+$" },
            "base_branch": { "type": "string", "minLength": 1 },
            "ecosystem": { "type": "string" },
            "dry_run": { "type": "boolean" },
            "concurrency": { "type": "integer", "minimum": 1 },
            "branch_prefix": { "type": "string", "minLength": 1 },
            "api_url": { "type": "string", "format": "uri" },
            "token": { "type": "string" },
            "retry": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "max_retries": { "type": "integer", "minimum": 0 },
                    "base_delay_ms": { "type": "integer", "minimum": 0 },
                    "max_delay_ms": { "type": "integer", "minimum": 0 }
                }
            }
        }
    })
});
