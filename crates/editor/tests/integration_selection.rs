//! Integration tests for selection, navigation and actions.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use shared::PrimitiveType;
use vcad_editor_lib::actions::Action;
use vcad_editor_lib::commands::{ChangePointTargetCommand, DeleteCommand};
use vcad_editor_lib::fixtures::{nested_scene, three_boxes};
use vcad_editor_lib::state::{Direction, ModelStatus, SelectionOperation};

#[test]
fn test_next_sibling_moves_primary() {
    let mut h = three_boxes();
    h.select(&["Box_1"]).unwrap();
    assert!(h.select_in_direction(Direction::NextSibling));
    assert_eq!(h.selected_names(), vec!["Box_2"]);
    assert_eq!(h.status_of("Box_1"), ModelStatus::Unselected);
    assert_eq!(h.status_of("Box_2"), ModelStatus::Primary);
}

#[test]
fn test_sibling_navigation_wraps() {
    let mut h = three_boxes();
    h.select(&["Box_3"]).unwrap();
    assert!(h.select_in_direction(Direction::NextSibling));
    assert_eq!(h.selected_names(), vec!["Box_1"]);
    assert!(h.select_in_direction(Direction::PreviousSibling));
    assert_eq!(h.selected_names(), vec!["Box_3"]);
}

#[test]
fn test_no_parent_above_top_level() {
    let mut h = three_boxes();
    h.select(&["Box_2"]).unwrap();
    assert!(!h.is_enabled(Action::SelectParent));
    assert!(!h.select_in_direction(Direction::Parent));
    assert_eq!(h.selected_names(), vec!["Box_2"]);
}

#[test]
fn test_descend_and_climb_nested_tree() {
    let mut h = nested_scene();
    h.select(&["Union_1"]).unwrap();
    assert!(h.select_in_direction(Direction::FirstChild));
    assert_eq!(h.selected_names(), vec!["Box_1"]);
    assert_eq!(h.status_of("Union_1"), ModelStatus::DescendantShown);
    assert_eq!(h.status_of("Beveled_1"), ModelStatus::Unselected);
    assert_eq!(h.status_of("Sphere_1"), ModelStatus::AncestorShown);
    assert_eq!(h.status_of("Cylinder_1"), ModelStatus::Unselected);

    assert!(h.select_in_direction(Direction::NextSibling));
    assert!(h.select_in_direction(Direction::FirstChild));
    assert_eq!(h.selected_names(), vec!["Sphere_1"]);
    assert_eq!(h.status_of("Beveled_1"), ModelStatus::DescendantShown);
    assert_eq!(h.status_of("Box_1"), ModelStatus::Unselected);

    assert!(h.select_in_direction(Direction::Parent));
    assert!(h.select_in_direction(Direction::Parent));
    assert_eq!(h.selected_names(), vec!["Union_1"]);
    assert_eq!(h.status_of("Box_1"), ModelStatus::AncestorShown);
}

#[test]
fn test_conflicting_paths_later_entry_wins() {
    let mut h = nested_scene();
    h.select(&["Union_1", "Sphere_1", "Cylinder_1"]).unwrap();
    assert_eq!(h.selected_names(), vec!["Sphere_1", "Cylinder_1"]);
    assert!(h.state.selection.selection().is_clean());
    assert_eq!(h.status_of("Sphere_1"), ModelStatus::Primary);
    assert_eq!(h.status_of("Cylinder_1"), ModelStatus::Secondary);

    h.select(&["Sphere_1", "Union_1"]).unwrap();
    assert_eq!(h.selected_names(), vec!["Union_1"]);
}

#[test]
fn test_select_all_lifts_to_top_level() {
    let mut h = nested_scene();
    h.select(&["Cylinder_1", "Box_1"]).unwrap();
    h.select_all();
    assert_eq!(h.selected_names(), vec!["Cylinder_1", "Union_1"]);
    assert_eq!(h.status_of("Box_1"), ModelStatus::AncestorShown);
}

#[test]
fn test_observers_see_deselection_before_selection() {
    let mut h = three_boxes();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    h.state.selection.add_observer(move |selection, op| {
        log.borrow_mut().push((op, selection.count()));
    });

    h.select(&["Box_1"]).unwrap();
    h.select(&["Box_2", "Box_3"]).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            (SelectionOperation::Selection, 1),
            (SelectionOperation::Deselection, 1),
            (SelectionOperation::Selection, 2),
        ]
    );
}

#[test]
fn test_delete_disabled_below_minimum_children() {
    let mut h = nested_scene();
    // Union_1 needs both of its operands.
    h.select(&["Box_1"]).unwrap();
    assert!(!h.is_enabled(Action::Delete));
    assert!(h.apply(Action::Delete).is_err());

    // The sole operand of Beveled_1 cannot go either.
    h.select(&["Sphere_1"]).unwrap();
    assert!(!h.is_enabled(Action::Delete));

    h.select(&["Union_1"]).unwrap();
    assert!(h.is_enabled(Action::Delete));
    h.apply(Action::Delete).unwrap();
    assert_eq!(h.top_level_names(), vec!["Cylinder_1"]);
    assert!(h.selected_names().is_empty());
}

#[test]
fn test_undo_restores_selection_before_delete() {
    let mut h = three_boxes();
    h.select(&["Box_2", "Box_3"]).unwrap();
    h.execute(DeleteCommand {
        model_names: vec!["Box_2".into(), "Box_3".into()],
    })
    .unwrap();
    assert!(h.selected_names().is_empty());
    assert!(h.undo());
    assert_eq!(h.selected_names(), vec!["Box_2", "Box_3"]);
}

#[test]
fn test_hidden_models_skipped_by_navigation_and_select_all() {
    let mut h = three_boxes();
    h.select(&["Box_2"]).unwrap();
    h.apply(Action::HideSelected).unwrap();
    assert_eq!(h.status_of("Box_2"), ModelStatus::HiddenByUser);

    h.select(&["Box_1"]).unwrap();
    assert!(h.select_in_direction(Direction::NextSibling));
    assert_eq!(h.selected_names(), vec!["Box_3"]);

    h.select_all();
    assert_eq!(h.selected_names(), vec!["Box_3", "Box_1"]);

    h.apply(Action::ShowAll).unwrap();
    assert_eq!(h.status_of("Box_2"), ModelStatus::Unselected);
}

#[test]
fn test_point_target_toggle_follows_undo() {
    let mut h = three_boxes();
    h.create_primitive(PrimitiveType::Cylinder);
    h.execute(ChangePointTargetCommand {
        position: Vec3::new(0.0, 0.0, 1.0),
        direction: Vec3::Z,
    })
    .unwrap();
    assert!(h.toggle_state(Action::TogglePointTarget));

    h.apply(Action::TogglePointTarget).unwrap();
    assert!(!h.toggle_state(Action::TogglePointTarget));
    assert!(!h.state.session.point_target_visible());

    h.apply(Action::TogglePointTarget).unwrap();
    assert!(h.undo());
    assert!(h.state.session.point_target().is_none());
    assert!(!h.toggle_state(Action::TogglePointTarget));
    assert!(!h.is_enabled(Action::TogglePointTarget));

    assert!(h.redo());
    assert!(h.toggle_state(Action::TogglePointTarget));
}
