//! JSON output formatting

use crate::output::Output;
use serde_json::{json, Value};

pub fn format_json(output: &Output<'_>) -> String {
    let data: Value = match output {
        Output::Report(report) => {
            let mut value = serde_json::to_value(report).unwrap_or(json!(null));
            if let Value::Object(map) = &mut value {
                map.insert(
                    "summary".to_string(),
                    json!({
                        "applied": report.applied_count(),
                        "already_satisfied": report.satisfied_count(),
                        "failed": report.failed_count(),
                        "compliant": report.is_compliant(),
                    }),
                );
            }
            value
        }
        Output::Plan(policy) => serde_json::to_value(policy).unwrap_or(json!(null)),
        Output::Sweep(sweep) => {
            let mut value = serde_json::to_value(sweep).unwrap_or(json!(null));
            if let Value::Object(map) = &mut value {
                map.insert("timestamp".to_string(), json!(chrono::Utc::now().to_rfc3339()));
            }
            value
        }
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}
