mod common;

use common::{parent_template_with_child_names, shape_template, Child, Circle, Parent, Rect};
use viewloom_core::{generate, ModelEditor, ScopedContext};

// ===== ROUND TRIP =====
//
// For pure value/object/array templates, applying a generated view must
// reproduce a structurally equal model graph.

#[test]
fn test_value_object_array_round_trip() {
    let template = parent_template_with_child_names();
    let original = Parent {
        string_prop: Some("hello".to_string()),
        children: vec![
            Child {
                name: Some("first".to_string()),
            },
            Child {
                name: Some("second".to_string()),
            },
            Child { name: None },
        ],
    };

    let view = generate(&template, &original, ScopedContext::new()).unwrap();
    let rebuilt = ModelEditor::new(&template, &view, ScopedContext::new())
        .create()
        .unwrap();
    let rebuilt = rebuilt.into_any().downcast::<Parent>().unwrap();

    assert_eq!(*rebuilt, original);
}

#[test]
fn test_empty_model_round_trip() {
    let template = parent_template_with_child_names();
    let original = Parent::default();

    let view = generate(&template, &original, ScopedContext::new()).unwrap();
    let rebuilt = ModelEditor::new(&template, &view, ScopedContext::new())
        .create()
        .unwrap();
    let rebuilt = rebuilt.into_any().downcast::<Parent>().unwrap();

    assert_eq!(*rebuilt, original);
}

#[test]
fn test_polymorphic_round_trip_selects_each_branch() {
    let template = shape_template();

    let circle = Circle {
        radius: 11,
        ..Circle::default()
    };
    let view = generate(&template, &circle, ScopedContext::new()).unwrap();
    let rebuilt = ModelEditor::new(&template, &view, ScopedContext::new())
        .create()
        .unwrap();
    assert_eq!(*rebuilt.into_any().downcast::<Circle>().unwrap(), circle);

    let rect = Rect {
        width: 3,
        height: 4,
    };
    let view = generate(&template, &rect, ScopedContext::new()).unwrap();
    let rebuilt = ModelEditor::new(&template, &view, ScopedContext::new())
        .create()
        .unwrap();
    assert_eq!(*rebuilt.into_any().downcast::<Rect>().unwrap(), rect);
}

#[test]
fn test_update_round_trip_converges() {
    // Applying the same view twice leaves the model unchanged after the
    // first application.
    let template = parent_template_with_child_names();
    let desired = Parent {
        string_prop: Some("target".to_string()),
        children: vec![Child {
            name: Some("kid".to_string()),
        }],
    };
    let view = generate(&template, &desired, ScopedContext::new()).unwrap();

    let mut model = Parent::default();
    ModelEditor::new(&template, &view, ScopedContext::new())
        .update(&mut model)
        .unwrap();
    assert_eq!(model, desired);

    ModelEditor::new(&template, &view, ScopedContext::new())
        .update(&mut model)
        .unwrap();
    assert_eq!(model, desired);
}
