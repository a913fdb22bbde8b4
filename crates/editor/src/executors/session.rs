//! Point target placement

use super::{ensure_exec_data, exec_data, ExecOp, Executor};
use crate::commands::{ChangePointTargetCommand, Command};
use crate::state::{EditorState, PointTarget};

/// Target and visibility in effect before the command first ran.
struct PreviousTarget {
    target: Option<PointTarget>,
    visible: bool,
}

/// Writes straight into the session state. Undo bypasses the toggle setter,
/// so action state has to be refreshed from the session afterwards.
pub struct PointTargetExecutor;

impl Executor for PointTargetExecutor {
    fn command_type_name(&self) -> &'static str {
        "ChangePointTargetCommand"
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |_, state| PreviousTarget {
            target: state.session.point_target(),
            visible: state.session.point_target_visible(),
        });
        match op {
            ExecOp::Do => {
                let cmd = command.payload::<ChangePointTargetCommand>();
                let target = PointTarget {
                    position: cmd.position,
                    direction: cmd.direction.normalize(),
                };
                state.session.replace_point_target(Some(target), true);
            }
            ExecOp::Undo => {
                let previous = exec_data::<PreviousTarget>(command);
                state
                    .session
                    .replace_point_target(previous.target, previous.visible);
            }
        }
    }
}
