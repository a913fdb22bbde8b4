//! Integration tests for the command history, executors and sessions.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use shared::{Color, PrimitiveType};
use vcad_editor_lib::commands::{
    ChangeColorCommand, Command, CommandKind, CopyCommand, CreateImportedModelCommand,
    CreatePrimitiveModelCommand, DeleteCommand, PasteCommand, TranslateCommand,
};
use vcad_editor_lib::error::SessionError;
use vcad_editor_lib::executors::{ensure_exec_data, exec_data, ExecOp, Executor};
use vcad_editor_lib::fixtures::{session_of, three_boxes, StubLoader};
use vcad_editor_lib::harness::Harness;
use vcad_editor_lib::state::settings::HistorySettings;
use vcad_editor_lib::state::{EditorSettings, EditorState, ModelId};

type PreviousColors = Vec<(ModelId, Color)>;

/// Color executor that counts how often its exec data is built.
struct CountingColorExecutor {
    builds: Rc<Cell<usize>>,
}

impl Executor for CountingColorExecutor {
    fn command_type_name(&self) -> &'static str {
        "ChangeColorCommand"
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        let builds = self.builds.clone();
        ensure_exec_data(command, state, |command, state| {
            builds.set(builds.get() + 1);
            command
                .payload::<ChangeColorCommand>()
                .model_names
                .iter()
                .map(|name| {
                    let id = state.scene.expect_path(name).model();
                    (id, state.scene.model(id).color)
                })
                .collect::<PreviousColors>()
        });
        let new_color = command.payload::<ChangeColorCommand>().new_color;
        let previous = exec_data::<PreviousColors>(command).clone();
        for (id, old) in previous {
            state.scene.model_mut(id).color = match op {
                ExecOp::Do => new_color,
                ExecOp::Undo => old,
            };
        }
    }
}

#[test]
fn test_delete_undo_restores_same_instance() {
    let mut h = three_boxes();
    let instance = h.model("Box_2").instance();

    h.execute(DeleteCommand {
        model_names: vec!["Box_2".into()],
    })
    .unwrap();
    assert_eq!(h.top_level_names(), vec!["Box_1", "Box_3"]);

    assert!(h.undo());
    assert_eq!(h.top_level_names(), vec!["Box_1", "Box_2", "Box_3"]);
    assert_eq!(h.model("Box_2").instance(), instance);

    assert!(h.redo());
    assert_eq!(h.top_level_names(), vec!["Box_1", "Box_3"]);
}

#[test]
fn test_exec_data_built_once_across_undo_redo() {
    let mut h = three_boxes();
    let builds = Rc::new(Cell::new(0));
    let replaced = h
        .commands
        .registry_mut()
        .register(CountingColorExecutor {
            builds: builds.clone(),
        });
    assert!(replaced.is_some());

    let red = Color::new(1.0, 0.0, 0.0);
    h.execute(ChangeColorCommand {
        model_names: vec!["Box_1".into()],
        new_color: red,
    })
    .unwrap();
    for _ in 0..3 {
        assert!(h.undo());
        assert_ne!(h.model("Box_1").color, red);
        assert!(h.redo());
        assert_eq!(h.model("Box_1").color, red);
    }
    assert_eq!(builds.get(), 1);
}

#[test]
fn test_translate_redo_does_not_accumulate() {
    let mut h = three_boxes();
    h.execute(TranslateCommand {
        model_names: vec!["Box_1".into()],
        translation: Vec3::X,
    })
    .unwrap();
    for _ in 0..2 {
        assert!(h.undo());
        assert_eq!(h.model("Box_1").transform.translation, Vec3::ZERO);
        assert!(h.redo());
    }
    assert_eq!(h.model("Box_1").transform.translation, Vec3::X);
}

#[test]
fn test_discarded_copies_move_to_next_command_in_order() {
    let mut h = three_boxes();
    h.execute(CopyCommand::new(vec!["Box_1".into()]))
    .unwrap();
    h.execute(CopyCommand::new(vec!["Box_2".into()]))
    .unwrap();
    assert!(h.undo());
    assert!(h.undo());
    h.create_primitive(PrimitiveType::Sphere);

    let orphans: Vec<String> = h
        .last_command()
        .orphaned_commands()
        .iter()
        .map(|c| c.payload::<CopyCommand>().model_names[0].clone())
        .collect();
    assert_eq!(orphans, vec!["Box_1", "Box_2"]);
}

#[test]
fn test_paste_after_undone_copy_survives_reload() {
    let mut h = Harness::new();
    h.create_box();
    h.execute(CopyCommand::new(vec!["Box_1".into()]))
    .unwrap();
    // Undoing a copy leaves the clipboard as it is.
    assert!(h.undo());
    h.execute(PasteCommand::default()).unwrap();
    assert_eq!(h.top_level_names(), vec!["Box_1", "Box_1_A"]);
    assert_eq!(h.last_command().orphaned_commands().len(), 1);

    let json = h.export_session().unwrap();
    let mut reloaded = Harness::new();
    reloaded.load_session(&json).unwrap();
    assert_eq!(reloaded.top_level_names(), vec!["Box_1", "Box_1_A"]);
    assert_eq!(reloaded.last_command().orphaned_commands().len(), 1);
    assert_eq!(reloaded.state.clipboard.model_count(), 1);
    assert!(reloaded.selected_names().is_empty());

    assert!(reloaded.undo());
    assert_eq!(reloaded.top_level_names(), vec!["Box_1"]);
}

#[test]
fn test_load_session_restores_redo_side() {
    let mut h = Harness::new();
    h.create_box();
    h.create_primitive(PrimitiveType::Torus);
    assert!(h.undo());
    let json = h.export_session().unwrap();

    let mut reloaded = Harness::new();
    reloaded.load_session(&json).unwrap();
    assert_eq!(reloaded.top_level_names(), vec!["Box_1"]);
    assert!(!reloaded.commands.history().has_unsaved_changes());
    assert!(reloaded.redo());
    assert_eq!(reloaded.top_level_names(), vec!["Box_1", "Torus_1"]);
}

#[test]
fn test_load_session_reports_failing_command() {
    let json = session_of([CommandKind::from(DeleteCommand {
        model_names: vec!["Box_1".into()],
    })]);
    let mut h = Harness::new();
    match h.load_session(&json) {
        Err(SessionError::InvalidCommand {
            index, type_name, ..
        }) => {
            assert_eq!(index, 0);
            assert_eq!(type_name, "DeleteCommand");
        }
        other => panic!("expected InvalidCommand, got {other:?}"),
    }
}

#[test]
fn test_failed_import_leaves_placeholder() {
    let mut h = Harness::new().with_loader(StubLoader::failing("corrupt mesh"));
    h.execute(CreateImportedModelCommand {
        path: "part.stl".into(),
        result_name: String::new(),
    })
    .unwrap();
    let model = h.model("Imported_1");
    assert!(!model.is_valid());
    assert_eq!(model.invalid_reason.as_deref(), Some("corrupt mesh"));

    assert!(h.undo());
    assert_eq!(h.model_count(), 0);
    assert!(h.redo());
    assert!(!h.model("Imported_1").is_valid());
}

#[test]
fn test_history_limit_from_settings() {
    let settings = EditorSettings {
        history: HistorySettings {
            max_commands: Some(2),
        },
        ..Default::default()
    };
    let mut h = Harness::with_settings(settings);
    for _ in 0..3 {
        h.create_box();
    }
    assert_eq!(h.commands.history().len(), 2);
    assert!(h.undo());
    assert!(h.undo());
    assert!(!h.undo());
    assert_eq!(h.top_level_names(), vec!["Box_1"]);
}

fn limited_history() -> EditorSettings {
    EditorSettings {
        history: HistorySettings {
            max_commands: Some(2),
        },
        ..Default::default()
    }
}

#[test]
fn test_preview_then_commit_applies_once() {
    let mut h = three_boxes();
    let mut torus = Command::from(CreatePrimitiveModelCommand {
        primitive_type: PrimitiveType::Torus,
        ..Default::default()
    });
    h.preview(&mut torus).unwrap();
    h.commit(torus).unwrap();
    assert_eq!(h.top_level_names(), vec!["Box_1", "Box_2", "Box_3", "Torus_1"]);

    let mut delete = Command::from(DeleteCommand {
        model_names: vec!["Box_1".into()],
    });
    h.preview(&mut delete).unwrap();
    h.commit(delete).unwrap();
    assert_eq!(h.top_level_names(), vec!["Box_2", "Box_3", "Torus_1"]);

    assert!(h.undo());
    assert_eq!(h.top_level_names(), vec!["Box_1", "Box_2", "Box_3", "Torus_1"]);
    assert!(h.undo());
    assert_eq!(h.top_level_names(), vec!["Box_1", "Box_2", "Box_3"]);
}

#[test]
fn test_copy_of_discarded_model_survives_reload() {
    let mut h = Harness::new();
    h.create_box();
    h.execute(CopyCommand::new(vec!["Box_1".into()])).unwrap();
    assert!(h.undo());
    assert!(h.undo());
    h.create_primitive(PrimitiveType::Sphere);
    h.execute(PasteCommand::default()).unwrap();
    assert_eq!(h.top_level_names(), vec!["Sphere_1", "Box_1_A"]);

    let json = h.export_session().unwrap();
    let mut reloaded = Harness::new();
    reloaded.load_session(&json).unwrap();
    assert_eq!(reloaded.top_level_names(), vec!["Sphere_1", "Box_1_A"]);
    assert_eq!(reloaded.state.clipboard.model_count(), 1);
    assert!(reloaded.undo());
    assert_eq!(reloaded.top_level_names(), vec!["Sphere_1"]);
}

#[test]
fn test_export_includes_evicted_commands() {
    let mut h = Harness::with_settings(limited_history());
    h.create_box();
    h.create_box();
    let red = Color::new(1.0, 0.0, 0.0);
    h.execute(ChangeColorCommand {
        model_names: vec!["Box_1".into()],
        new_color: red,
    })
    .unwrap();
    assert_eq!(h.commands.history().len(), 2);
    assert_eq!(h.commands.history().archived().len(), 1);
    let json = h.export_session().unwrap();

    let mut unlimited = Harness::new();
    unlimited.load_session(&json).unwrap();
    assert_eq!(unlimited.top_level_names(), vec!["Box_1", "Box_2"]);
    assert_eq!(unlimited.model("Box_1").color, red);
    assert_eq!(unlimited.commands.history().len(), 3);

    let mut reloaded = Harness::with_settings(limited_history());
    reloaded.load_session(&json).unwrap();
    assert_eq!(reloaded.export_session().unwrap(), json);
    assert_eq!(reloaded.model("Box_1").color, red);
    assert_eq!(reloaded.commands.history().len(), 2);
    assert!(reloaded.undo());
    assert!(reloaded.undo());
    assert!(!reloaded.undo());
    assert_eq!(reloaded.top_level_names(), vec!["Box_1"]);
}

#[test]
fn test_failed_load_keeps_current_document() {
    let mut h = Harness::new();
    h.create_box();
    let json = session_of([CommandKind::from(DeleteCommand {
        model_names: vec!["Nope".into()],
    })]);
    assert!(h.load_session(&json).is_err());
    assert_eq!(h.top_level_names(), vec!["Box_1"]);
    assert_eq!(h.selected_names(), vec!["Box_1"]);
    assert!(h.commands.can_undo());
    assert!(h.undo());
    assert_eq!(h.model_count(), 0);
}
