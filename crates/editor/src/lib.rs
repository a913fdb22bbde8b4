// Library crate: the command/undo engine, the selection state machine and the
// headless harness. The binary only parses arguments and prints results.

pub mod actions;
pub mod commands;
pub mod error;
pub mod executors;
pub mod fixtures;
pub mod harness;
pub mod history;
pub mod manager;
pub mod persistence;
pub mod protocol;
pub mod state;

pub use actions::{Action, ActionManager};
pub use commands::{Command, CommandKind};
pub use error::{CommandError, SessionError};
pub use executors::{ExecOp, Executor, ExecutorRegistry};
pub use harness::Harness;
pub use manager::CommandManager;
pub use state::EditorState;
