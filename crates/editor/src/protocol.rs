//! JSON request protocol for scripting the editor.
//!
//! Each request is a JSON object tagged by `"request"`. Commands travel in
//! their session form, e.g.
//! `{"request": "execute", "command": {"type": "DeleteCommand", "model_names": ["Box_1"]}}`.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::commands::{Command, CommandKind};
use crate::harness::Harness;
use crate::state::Direction;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    /// Run a command and add it to the history.
    Execute { command: CommandKind },

    Undo,

    Redo,

    /// Replace the selection by model names.
    Select { names: Vec<String> },

    SelectInDirection { direction: Direction },

    SelectAll,

    DeselectAll,

    /// Apply an action if it is enabled.
    Action { action: Action },

    /// Enabled actions and toggle states.
    Actions,

    /// Scene tree, selection and history summary.
    Inspect,

    ExportSession,

    LoadSession { session: String },

    /// Drop the history and the document.
    Clear,
}

/// Response to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single request on the harness.
pub fn execute_request(harness: &mut Harness, request: Request) -> Response {
    match request {
        Request::Execute { command } => {
            let type_name = command.type_name();
            match harness.execute(Command::new(command)) {
                Ok(()) => Response::ok_with_data(serde_json::json!({
                    "executed": type_name,
                    "selected": harness.selected_names(),
                })),
                Err(e) => Response::err(e.to_string()),
            }
        }

        Request::Undo => match harness.try_undo() {
            Ok(undone) => Response::ok_with_data(serde_json::json!({ "undone": undone })),
            Err(e) => Response::err(e.to_string()),
        },

        Request::Redo => match harness.try_redo() {
            Ok(redone) => Response::ok_with_data(serde_json::json!({ "redone": redone })),
            Err(e) => Response::err(e.to_string()),
        },

        Request::Select { names } => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            match harness.select(&names) {
                Ok(()) => Response::ok_with_data(serde_json::json!({
                    "selected": harness.selected_names(),
                })),
                Err(e) => Response::err(e),
            }
        }

        Request::SelectInDirection { direction } => {
            let moved = harness.select_in_direction(direction);
            Response::ok_with_data(serde_json::json!({
                "moved": moved,
                "selected": harness.selected_names(),
            }))
        }

        Request::SelectAll => {
            harness.select_all();
            Response::ok_with_data(serde_json::json!({ "selected": harness.selected_names() }))
        }

        Request::DeselectAll => {
            harness.deselect_all();
            Response::ok()
        }

        Request::Action { action } => match harness.apply(action) {
            Ok(()) => Response::ok_with_data(serde_json::json!({
                "selected": harness.selected_names(),
            })),
            Err(e) => Response::err(e),
        },

        Request::Actions => {
            let enabled: Vec<Action> = Action::ALL
                .into_iter()
                .filter(|a| harness.is_enabled(*a))
                .collect();
            let toggles: serde_json::Map<String, serde_json::Value> = Action::ALL
                .into_iter()
                .filter(|a| a.is_toggle())
                .map(|a| {
                    let key = serde_json::to_value(a)
                        .ok()
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_else(|| format!("{a:?}"));
                    (key, serde_json::json!(harness.toggle_state(a)))
                })
                .collect();
            Response::ok_with_data(serde_json::json!({
                "enabled": enabled,
                "toggles": toggles,
            }))
        }

        Request::Inspect => Response::ok_with_data(harness.inspect()),

        Request::ExportSession => match harness.export_session() {
            Ok(json) => Response::ok_with_data(serde_json::json!({ "session_json": json })),
            Err(e) => Response::err(e.to_string()),
        },

        Request::LoadSession { session } => match harness.load_session(&session) {
            Ok(()) => Response::ok_with_data(serde_json::json!({
                "model_count": harness.model_count(),
            })),
            Err(e) => Response::err(e.to_string()),
        },

        Request::Clear => {
            harness.clear();
            Response::ok()
        }
    }
}

/// Parse and execute a single JSON request string.
pub fn execute_json(harness: &mut Harness, json: &str) -> Result<Response, String> {
    let request: Request =
        serde_json::from_str(json).map_err(|e| format!("Invalid request JSON: {e}"))?;
    Ok(execute_request(harness, request))
}

/// Parse and execute multiple JSON requests (array).
pub fn execute_json_batch(harness: &mut Harness, json: &str) -> Result<Vec<Response>, String> {
    let requests: Vec<Request> =
        serde_json::from_str(json).map_err(|e| format!("Invalid requests JSON: {e}"))?;
    Ok(requests
        .into_iter()
        .map(|request| execute_request(harness, request))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serde_undo() {
        let request: Request = serde_json::from_str(r#"{"request": "undo"}"#).unwrap();
        assert!(matches!(request, Request::Undo));
    }

    #[test]
    fn test_request_serde_execute() {
        let json = r#"{"request": "execute", "command": {"type": "DeleteCommand", "model_names": ["Box_1"]}}"#;
        match serde_json::from_str::<Request>(json).unwrap() {
            Request::Execute { command } => assert_eq!(command.type_name(), "DeleteCommand"),
            other => panic!("Expected Execute, got {other:?}"),
        }
    }

    #[test]
    fn test_request_serde_direction_and_action() {
        let json = r#"{"request": "select_in_direction", "direction": "next_sibling"}"#;
        assert!(matches!(
            serde_json::from_str::<Request>(json).unwrap(),
            Request::SelectInDirection {
                direction: Direction::NextSibling
            }
        ));
        let json = r#"{"request": "action", "action": "toggle_show_edges"}"#;
        assert!(matches!(
            serde_json::from_str::<Request>(json).unwrap(),
            Request::Action {
                action: Action::ToggleShowEdges
            }
        ));
    }

    #[test]
    fn test_execute_create_and_inspect() {
        let mut h = Harness::new();
        let json = r#"{"request": "execute", "command": {"type": "CreatePrimitiveModelCommand", "primitive_type": "cylinder"}}"#;
        let resp = execute_json(&mut h, json).unwrap();
        assert!(resp.success, "{:?}", resp.error);
        assert_eq!(resp.data.unwrap()["selected"][0], "Cylinder_1");

        let resp = execute_json(&mut h, r#"{"request": "inspect"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["model_count"], 1);
    }

    #[test]
    fn test_execute_invalid_command_reports_error() {
        let mut h = Harness::new();
        let json = r#"{"request": "execute", "command": {"type": "DeleteCommand", "model_names": []}}"#;
        let resp = execute_json(&mut h, json).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().starts_with("invalid DeleteCommand"));
    }

    #[test]
    fn test_disabled_action_is_an_error() {
        let mut h = Harness::new();
        let resp = execute_json(&mut h, r#"{"request": "action", "action": "undo"}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_batch_undo_redo() {
        let mut h = Harness::new();
        h.create_box();
        let responses = execute_json_batch(
            &mut h,
            r#"[{"request": "undo"}, {"request": "undo"}, {"request": "redo"}]"#,
        )
        .unwrap();
        assert_eq!(responses[0].data.as_ref().unwrap()["undone"], true);
        assert_eq!(responses[1].data.as_ref().unwrap()["undone"], false);
        assert_eq!(responses[2].data.as_ref().unwrap()["redone"], true);
        assert_eq!(h.model_count(), 1);
    }

    #[test]
    fn test_undo_without_executor_is_an_error() {
        let mut h = Harness::new();
        h.create_box();
        h.commands.registry_mut().clear();
        let resp = execute_json(&mut h, r#"{"request": "undo"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(
            resp.error.as_deref(),
            Some("no executor registered for CreatePrimitiveModelCommand")
        );
        assert_eq!(h.model_count(), 1);
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = Harness::new();
        assert!(execute_json(&mut h, "not valid json").is_err());
    }
}
