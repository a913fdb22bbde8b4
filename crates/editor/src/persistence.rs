//! Session files: the command history as JSON
//!
//! A session stores every command of the history, including undone ones,
//! plus the cursor. Loading replays all of them and undoes back to the
//! cursor, which reproduces both the scene and the redo side.

use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::error::SessionError;

/// Current session format version
pub const SESSION_VERSION: u32 = 1;

/// Owned form of a session file
#[derive(Debug, Deserialize)]
pub struct SessionFile {
    pub version: u32,
    pub commands: Vec<Command>,
    pub current_index: usize,
}

#[derive(Serialize)]
struct SessionFileRef<'a> {
    version: u32,
    commands: Vec<&'a Command>,
    current_index: usize,
}

impl SessionFile {
    /// Parse and validate a session without running anything.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let file: SessionFile = serde_json::from_str(json)?;
        if file.version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion(file.version));
        }
        if file.current_index > file.commands.len() {
            return Err(SessionError::CurrentIndexOutOfRange {
                current: file.current_index,
                count: file.commands.len(),
            });
        }
        for (index, command) in file.commands.iter().enumerate() {
            validate_tree(index, command)?;
        }
        Ok(file)
    }
}

/// Serialize a history to session JSON.
pub fn session_to_json<'a>(
    commands: impl IntoIterator<Item = &'a Command>,
    current_index: usize,
) -> Result<String, SessionError> {
    let file = SessionFileRef {
        version: SESSION_VERSION,
        commands: commands.into_iter().collect(),
        current_index,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Validate a command and, depth first, its orphans.
fn validate_tree(index: usize, command: &Command) -> Result<(), SessionError> {
    for orphan in command.orphaned_commands() {
        validate_tree(index, orphan)?;
    }
    command
        .validate()
        .map_err(|reason| SessionError::InvalidCommand {
            index,
            type_name: command.type_name().to_string(),
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DeleteCommand;

    #[test]
    fn test_round_trip_keeps_cursor() {
        let commands = vec![Command::from(DeleteCommand {
            model_names: vec!["Box_1".into()],
        })];
        let json = session_to_json(&commands, 0).unwrap();
        let file = SessionFile::from_json(&json).unwrap();
        assert_eq!(file.current_index, 0);
        assert_eq!(file.commands[0].kind(), commands[0].kind());
    }

    #[test]
    fn test_rejects_unknown_version_and_bad_cursor() {
        let json = r#"{"version": 9, "commands": [], "current_index": 0}"#;
        assert!(matches!(
            SessionFile::from_json(json),
            Err(SessionError::UnsupportedVersion(9))
        ));
        let json = r#"{"version": 1, "commands": [], "current_index": 1}"#;
        assert!(matches!(
            SessionFile::from_json(json),
            Err(SessionError::CurrentIndexOutOfRange { current: 1, count: 0 })
        ));
    }

    #[test]
    fn test_invalid_command_names_index_and_type() {
        let json = r#"{
            "version": 1,
            "current_index": 2,
            "commands": [
                {"type": "DeleteCommand", "model_names": ["Box_1"]},
                {"type": "ChangeComplexityCommand", "model_names": ["Box_1"], "new_complexity": 4.0}
            ]
        }"#;
        match SessionFile::from_json(json) {
            Err(SessionError::InvalidCommand {
                index, type_name, ..
            }) => {
                assert_eq!(index, 1);
                assert_eq!(type_name, "ChangeComplexityCommand");
            }
            other => panic!("expected InvalidCommand, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_a_json_error() {
        let json = r#"{"version": 1, "current_index": 0, "commands": [{"type": "FlyCommand"}]}"#;
        assert!(matches!(
            SessionFile::from_json(json),
            Err(SessionError::Json(_))
        ));
    }
}
