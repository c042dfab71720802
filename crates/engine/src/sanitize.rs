//! Control value sanitation for internally hosted workflows.
//!
//! Controls authored through the management UI may be partially filled:
//! required fields missing, nulls left behind by the editor, action buttons
//! half-configured. Before such controls reach the runtime they get a
//! per-step-type pass that fills required defaults, drops nulls, and
//! normalizes nested action/redirect shapes. Externally hosted workflows
//! receive the author's raw control record unmodified; their schema is the
//! author's contract, not ours.

use serde_json::{Map, Value, json};

use notiflow_types::StepType;

/// Sanitizes a control record for one step of an internally hosted workflow.
pub fn sanitize_controls(step_type: StepType, controls: Value) -> Value {
    let mut map = match controls {
        Value::Object(map) => drop_nulls(map),
        _ => Map::new(),
    };

    match step_type {
        StepType::Email => {
            fill_default(&mut map, "subject", json!(""));
            fill_default(&mut map, "body", json!(""));
        }
        StepType::Sms | StepType::Chat => {
            fill_default(&mut map, "body", json!(""));
        }
        StepType::Push => {
            fill_default(&mut map, "subject", json!(""));
            fill_default(&mut map, "body", json!(""));
        }
        StepType::InApp => {
            fill_default(&mut map, "body", json!(""));
            normalize_redirect_entry(&mut map, "redirect");
            normalize_action_entry(&mut map, "primaryAction");
            normalize_action_entry(&mut map, "secondaryAction");
        }
        StepType::Digest | StepType::Delay | StepType::Custom => {}
    }

    Value::Object(map)
}

fn drop_nulls(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().filter(|(_, value)| !value.is_null()).collect()
}

fn fill_default(map: &mut Map<String, Value>, key: &str, default: Value) {
    map.entry(key.to_string()).or_insert(default);
}

/// Keeps a redirect only when it has a non-empty `url`; fills the default
/// `target` when absent.
fn normalize_redirect(value: &Value) -> Option<Value> {
    let object = value.as_object()?;
    let url = object.get("url").and_then(Value::as_str)?;
    if url.trim().is_empty() {
        return None;
    }
    let target = object.get("target").and_then(Value::as_str).unwrap_or("_self");
    Some(json!({"url": url, "target": target}))
}

fn normalize_redirect_entry(map: &mut Map<String, Value>, key: &str) {
    if let Some(value) = map.remove(key)
        && let Some(normalized) = normalize_redirect(&value)
    {
        map.insert(key.to_string(), normalized);
    }
}

/// Keeps an action button only when it has a non-empty `label`; its nested
/// redirect follows the redirect rules.
fn normalize_action_entry(map: &mut Map<String, Value>, key: &str) {
    let Some(value) = map.remove(key) else { return };
    let Some(object) = value.as_object() else { return };
    let Some(label) = object.get("label").and_then(Value::as_str) else {
        return;
    };
    if label.trim().is_empty() {
        return;
    }

    let mut action = Map::new();
    action.insert("label".to_string(), json!(label));
    if let Some(redirect) = object.get("redirect").and_then(normalize_redirect) {
        action.insert("redirect".to_string(), redirect);
    }
    map.insert(key.to_string(), Value::Object(action));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_controls_get_required_defaults() {
        let sanitized = sanitize_controls(StepType::Email, json!({"body": "hello"}));
        assert_eq!(sanitized, json!({"body": "hello", "subject": ""}));
    }

    #[test]
    fn nulls_are_dropped_before_defaults_apply() {
        let sanitized = sanitize_controls(StepType::Email, json!({"subject": null, "body": "hi", "extra": null}));
        assert_eq!(sanitized, json!({"subject": "", "body": "hi"}));
    }

    #[test]
    fn non_object_controls_become_defaults() {
        let sanitized = sanitize_controls(StepType::Sms, json!("oops"));
        assert_eq!(sanitized, json!({"body": ""}));
    }

    #[test]
    fn in_app_actions_are_normalized() {
        let sanitized = sanitize_controls(
            StepType::InApp,
            json!({
                "body": "ping",
                "primaryAction": {"label": "Open", "redirect": {"url": "https://app.example.com"}},
                "secondaryAction": {"label": "", "redirect": {"url": "https://x.example.com"}},
                "redirect": {"url": ""}
            }),
        );

        assert_eq!(
            sanitized,
            json!({
                "body": "ping",
                "primaryAction": {"label": "Open", "redirect": {"url": "https://app.example.com", "target": "_self"}}
            })
        );
    }

    #[test]
    fn in_app_action_without_redirect_keeps_label_only() {
        let sanitized = sanitize_controls(StepType::InApp, json!({"primaryAction": {"label": "Dismiss"}}));
        assert_eq!(sanitized, json!({"body": "", "primaryAction": {"label": "Dismiss"}}));
    }

    #[test]
    fn flow_steps_only_drop_nulls() {
        let sanitized = sanitize_controls(StepType::Digest, json!({"amount": 3, "unit": null}));
        assert_eq!(sanitized, json!({"amount": 3}));

        let unchanged = sanitize_controls(StepType::Custom, json!({"anything": {"nested": true}}));
        assert_eq!(unchanged, json!({"anything": {"nested": true}}));
    }
}
