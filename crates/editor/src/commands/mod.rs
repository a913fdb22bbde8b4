//! Commands: serializable units of work
//!
//! A [`Command`] wraps one [`CommandKind`] variant together with the runtime
//! state the command manager and executors need: the selection in effect at
//! first execution, the finalized and validating flags, the undo cache
//! (exec data) and the list of orphaned predecessors.

mod kinds;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::Selection;

pub use kinds::{
    ChangeBevelCommand, ChangeColorCommand, ChangeComplexityCommand, ChangeCylinderCommand,
    ChangeNameCommand, ChangeOrderCommand, ChangePointTargetCommand, ChangeProfileCommand,
    ChangeSpinCommand, ChangeTextCommand, ChangeTorusCommand, CommandSpec, ConvertModelCommand,
    CopyCommand, CreateCombinedModelCommand, CreateImportedModelCommand,
    CreatePrimitiveModelCommand, CylinderRadius, DeleteCommand, PasteCommand, TranslateCommand,
};

/// Every command type. The variant name is the persisted `type` and the
/// key executors are registered under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommandKind {
    CreatePrimitiveModelCommand(CreatePrimitiveModelCommand),
    CreateImportedModelCommand(CreateImportedModelCommand),
    CreateCombinedModelCommand(CreateCombinedModelCommand),
    ConvertModelCommand(ConvertModelCommand),
    DeleteCommand(DeleteCommand),
    ChangeOrderCommand(ChangeOrderCommand),
    ChangeNameCommand(ChangeNameCommand),
    CopyCommand(CopyCommand),
    PasteCommand(PasteCommand),
    ChangeColorCommand(ChangeColorCommand),
    ChangeComplexityCommand(ChangeComplexityCommand),
    ChangeCylinderCommand(ChangeCylinderCommand),
    ChangeTorusCommand(ChangeTorusCommand),
    ChangeTextCommand(ChangeTextCommand),
    ChangeBevelCommand(ChangeBevelCommand),
    ChangeProfileCommand(ChangeProfileCommand),
    ChangeSpinCommand(ChangeSpinCommand),
    TranslateCommand(TranslateCommand),
    ChangePointTargetCommand(ChangePointTargetCommand),
}

/// Ties a payload type to its variant.
pub trait TypedCommand: CommandSpec + Sized + 'static {
    const TYPE_NAME: &'static str;

    fn extract(kind: &CommandKind) -> Option<&Self>;

    fn extract_mut(kind: &mut CommandKind) -> Option<&mut Self>;
}

macro_rules! typed_commands {
    ($($name:ident),* $(,)?) => {
        $(
            impl TypedCommand for $name {
                const TYPE_NAME: &'static str = stringify!($name);

                fn extract(kind: &CommandKind) -> Option<&Self> {
                    match kind {
                        CommandKind::$name(cmd) => Some(cmd),
                        _ => None,
                    }
                }

                fn extract_mut(kind: &mut CommandKind) -> Option<&mut Self> {
                    match kind {
                        CommandKind::$name(cmd) => Some(cmd),
                        _ => None,
                    }
                }
            }

            impl From<$name> for CommandKind {
                fn from(cmd: $name) -> Self {
                    CommandKind::$name(cmd)
                }
            }

            impl From<$name> for Command {
                fn from(cmd: $name) -> Self {
                    Command::new(CommandKind::$name(cmd))
                }
            }
        )*

        impl CommandKind {
            /// Registry key of this command.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(CommandKind::$name(_) => stringify!($name),)*
                }
            }

            pub fn spec(&self) -> &dyn CommandSpec {
                match self {
                    $(CommandKind::$name(cmd) => cmd,)*
                }
            }

            /// Zero-argument factory keyed by type name.
            pub fn create(type_name: &str) -> Option<CommandKind> {
                match type_name {
                    $(stringify!($name) => Some(CommandKind::$name($name::default())),)*
                    _ => None,
                }
            }

            /// Every registered type name.
            pub fn type_names() -> &'static [&'static str] {
                &[$(stringify!($name)),*]
            }
        }
    };
}

typed_commands!(
    CreatePrimitiveModelCommand,
    CreateImportedModelCommand,
    CreateCombinedModelCommand,
    ConvertModelCommand,
    DeleteCommand,
    ChangeOrderCommand,
    ChangeNameCommand,
    CopyCommand,
    PasteCommand,
    ChangeColorCommand,
    ChangeComplexityCommand,
    ChangeCylinderCommand,
    ChangeTorusCommand,
    ChangeTextCommand,
    ChangeBevelCommand,
    ChangeProfileCommand,
    ChangeSpinCommand,
    TranslateCommand,
    ChangePointTargetCommand,
);

/// A command plus the runtime state that travels with it through history.
#[derive(Serialize, Deserialize)]
pub struct Command {
    #[serde(flatten)]
    kind: CommandKind,
    /// Predecessors that replay before this command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    orphaned_commands: Vec<Command>,
    #[serde(skip)]
    selection: Option<Selection>,
    #[serde(skip)]
    is_finalized: bool,
    #[serde(skip)]
    is_validating: bool,
    #[serde(skip)]
    exec_data: Option<Box<dyn Any>>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind)
            .field("orphaned_commands", &self.orphaned_commands)
            .field("is_finalized", &self.is_finalized)
            .field("is_validating", &self.is_validating)
            .field("has_exec_data", &self.exec_data.is_some())
            .finish()
    }
}

impl From<CommandKind> for Command {
    fn from(kind: CommandKind) -> Self {
        Command::new(kind)
    }
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            orphaned_commands: Vec::new(),
            selection: None,
            is_finalized: false,
            is_validating: false,
            exec_data: None,
        }
    }

    /// Default-valued command of the named type.
    pub fn create(type_name: &str) -> Option<Self> {
        CommandKind::create(type_name).map(Command::new)
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Typed payload. A mismatch means the wrong executor ran, which is fatal.
    pub fn payload<C: TypedCommand>(&self) -> &C {
        C::extract(&self.kind).unwrap_or_else(|| {
            panic!("expected {}, got {}", C::TYPE_NAME, self.type_name())
        })
    }

    pub fn payload_mut<C: TypedCommand>(&mut self) -> &mut C {
        let type_name = self.type_name();
        C::extract_mut(&mut self.kind)
            .unwrap_or_else(|| panic!("expected {}, got {type_name}", C::TYPE_NAME))
    }

    // ── Contract forwarded to the payload ─────────────────────

    pub fn description(&self) -> String {
        self.kind.spec().description()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.kind.spec().validate()
    }

    pub fn has_undo_effect(&self) -> bool {
        self.kind.spec().has_undo_effect()
    }

    pub fn has_redo_effect(&self) -> bool {
        self.kind.spec().has_redo_effect()
    }

    pub fn should_be_added_as_orphan(&self) -> bool {
        self.kind.spec().should_be_added_as_orphan()
    }

    // ── Runtime state ─────────────────────────────────────────

    /// Selection in effect when the command first ran.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    pub fn is_finalized(&self) -> bool {
        self.is_finalized
    }

    pub fn set_finalized(&mut self, finalized: bool) {
        self.is_finalized = finalized;
    }

    /// True while the command replays from a persisted session.
    pub fn is_validating(&self) -> bool {
        self.is_validating
    }

    pub fn set_validating(&mut self, validating: bool) {
        self.is_validating = validating;
    }

    pub fn orphaned_commands(&self) -> &[Command] {
        &self.orphaned_commands
    }

    pub(crate) fn orphaned_commands_mut(&mut self) -> &mut Vec<Command> {
        &mut self.orphaned_commands
    }

    /// Append predecessors. Existing orphans are kept.
    pub fn add_orphaned_commands(&mut self, orphans: impl IntoIterator<Item = Command>) {
        self.orphaned_commands.extend(orphans);
    }

    /// Keep only what a session file stores.
    pub(crate) fn into_persisted(self) -> Command {
        let mut command = Command::new(self.kind);
        command.orphaned_commands = self.orphaned_commands;
        command
    }

    // ── Exec data ─────────────────────────────────────────────

    pub fn has_exec_data(&self) -> bool {
        self.exec_data.is_some()
    }

    /// Install the undo cache. It is created once per command.
    pub fn set_exec_data<T: Any>(&mut self, data: T) {
        assert!(
            self.exec_data.is_none(),
            "{} already has exec data",
            self.type_name()
        );
        self.exec_data = Some(Box::new(data));
    }

    pub fn exec_data<T: Any>(&self) -> Option<&T> {
        self.exec_data.as_ref().and_then(|d| d.downcast_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names_round_trip_through_factory() {
        for name in CommandKind::type_names() {
            let kind = CommandKind::create(name).unwrap();
            assert_eq!(kind.type_name(), *name);
        }
        assert!(CommandKind::create("FlyCommand").is_none());
        assert_eq!(CommandKind::type_names().len(), 19);
    }

    #[test]
    fn test_serialized_form_is_tagged_by_type_name() {
        let cmd = Command::from(DeleteCommand {
            model_names: vec!["Box_1".into()],
        });
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            value,
            json!({"type": "DeleteCommand", "model_names": ["Box_1"]})
        );
    }

    #[test]
    fn test_orphans_persist_and_runtime_state_does_not() {
        let mut paste = Command::from(PasteCommand::default());
        let copy = Command::from(CopyCommand::new(vec!["Box_1".into()]));
        paste.add_orphaned_commands([copy]);
        paste.set_finalized(true);
        paste.set_exec_data(7_u32);

        let json = serde_json::to_string(&paste).unwrap();
        let loaded: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.kind(), paste.kind());
        assert_eq!(loaded.orphaned_commands().len(), 1);
        assert_eq!(loaded.orphaned_commands()[0].type_name(), "CopyCommand");
        assert!(!loaded.is_finalized());
        assert!(!loaded.has_exec_data());
    }

    #[test]
    fn test_exec_data_downcast() {
        let mut cmd = Command::from(DeleteCommand::default());
        cmd.set_exec_data(vec![1_u8, 2]);
        assert_eq!(cmd.exec_data::<Vec<u8>>(), Some(&vec![1, 2]));
        assert!(cmd.exec_data::<String>().is_none());
    }

    #[test]
    #[should_panic(expected = "already has exec data")]
    fn test_exec_data_is_set_once() {
        let mut cmd = Command::from(DeleteCommand::default());
        cmd.set_exec_data(1_u8);
        cmd.set_exec_data(2_u8);
    }

    #[test]
    #[should_panic(expected = "expected ChangeColorCommand, got DeleteCommand")]
    fn test_payload_mismatch_is_fatal() {
        let cmd = Command::from(DeleteCommand::default());
        let _ = cmd.payload::<ChangeColorCommand>();
    }
}
