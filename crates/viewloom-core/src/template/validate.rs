use super::node::{Node, NodeKind};
use crate::errors::{Result, ViewLoomError};

/// Validate a template's node tree
///
/// Runs once when the template is built so the engines can rely on
/// structural invariants instead of re-checking them per traversal:
///
/// - the root is an object or envelope container with no model binding
/// - a discriminated object declares at least one subtype branch, with
///   unique tokens, and no generic children of its own (the winning
///   branch's children are processed in their place)
/// - a subtype branch is never itself discriminated at its root
/// - container and leaf children that read model state carry a field
///   binding; array element nodes carry none (they are the element)
/// - array element nodes are of the matching kind
/// - reference key children and envelope property nodes are value nodes
pub fn validate_tree(root: &Node) -> Result<()> {
    match root.kind() {
        NodeKind::Object { .. } | NodeKind::Envelope { .. } => {}
        _ => {
            return Err(invalid(root, "root must be an object or envelope node"));
        }
    }
    if root.access().is_some() {
        return Err(invalid(root, "root must not carry a model field binding"));
    }
    validate_node(root, true)
}

fn validate_node(node: &Node, is_root: bool) -> Result<()> {
    match node.kind() {
        NodeKind::Value { .. } | NodeKind::Url { .. } | NodeKind::Splice => Ok(()),

        NodeKind::Object {
            discriminated,
            children,
            subtypes,
        } => {
            if node.model_type().is_none() {
                return Err(invalid(node, "object node must declare a model type"));
            }
            if *discriminated {
                if subtypes.is_empty() {
                    return Err(invalid(
                        node,
                        "discriminated object must declare at least one subtype branch",
                    ));
                }
                if !children.is_empty() {
                    return Err(invalid(
                        node,
                        "discriminated object must not declare generic children",
                    ));
                }
                let mut seen = Vec::new();
                for branch in subtypes {
                    if seen.contains(&branch.token()) {
                        return Err(invalid(
                            node,
                            "subtype branches must map distinct types",
                        ));
                    }
                    seen.push(branch.token());
                    for child in branch.children() {
                        // A branch lives inside its parent's discriminator
                        // scope and must not demand a second decision.
                        if child.is_discriminated() && child.access().is_none() {
                            return Err(invalid(
                                node,
                                "subtype branch must not itself be discriminated",
                            ));
                        }
                        validate_child(child)?;
                    }
                }
            } else {
                if !subtypes.is_empty() {
                    return Err(invalid(
                        node,
                        "non-discriminated object must not declare subtype branches",
                    ));
                }
                for child in children {
                    validate_child(child)?;
                }
            }
            Ok(())
        }

        NodeKind::ArrayOfValues { .. } => Ok(()),

        NodeKind::ArrayOfObjects { element } => {
            if !matches!(element.kind(), NodeKind::Object { .. }) {
                return Err(invalid(
                    node,
                    "array-of-objects element must be an object node",
                ));
            }
            if element.access().is_some() {
                return Err(invalid(
                    node,
                    "array element must not carry a model field binding",
                ));
            }
            validate_node(element, false)
        }

        NodeKind::ArrayOfReferences { element } => {
            if !matches!(element.kind(), NodeKind::Reference { .. }) {
                return Err(invalid(
                    node,
                    "array-of-references element must be a reference node",
                ));
            }
            if element.access().is_some() {
                return Err(invalid(
                    node,
                    "array element must not carry a model field binding",
                ));
            }
            validate_node(element, false)
        }

        NodeKind::Reference { key_children } => {
            if node.model_type().is_none() {
                return Err(invalid(node, "reference node must declare a model type"));
            }
            for child in key_children {
                if !matches!(child.kind(), NodeKind::Value { .. }) {
                    return Err(invalid(
                        node,
                        "reference key children must be value nodes",
                    ));
                }
                if child.access().is_none() {
                    return Err(invalid(
                        node,
                        "reference key children must carry a model field binding",
                    ));
                }
            }
            Ok(())
        }

        NodeKind::Envelope { properties, body } => {
            for property in properties {
                if !matches!(property.kind(), NodeKind::Value { .. }) {
                    return Err(invalid(
                        node,
                        "envelope properties must be value nodes",
                    ));
                }
                if property.access().is_none() {
                    return Err(invalid(
                        node,
                        "envelope properties must carry a model field binding",
                    ));
                }
            }
            if is_root && body.access().is_some() {
                return Err(invalid(
                    node,
                    "root envelope body must not carry a model field binding",
                ));
            }
            validate_node(body, false)
        }
    }
}

/// A child in object position: reads its value from the owning model,
/// so it needs a field binding. URL nodes (externally resolved), splice
/// nodes (handler-driven) and envelopes (their properties and body carry
/// the bindings) are exempt.
fn validate_child(child: &Node) -> Result<()> {
    let needs_access = !matches!(
        child.kind(),
        NodeKind::Url { .. } | NodeKind::Splice | NodeKind::Envelope { .. }
    );
    if needs_access && child.access().is_none() {
        return Err(invalid(
            child,
            "child node must carry a model field binding",
        ));
    }
    validate_node(child, false)
}

fn invalid(node: &Node, reason: &str) -> ViewLoomError {
    ViewLoomError::TemplateInvalid {
        node: node.display_name(),
        reason: reason.to_string(),
    }
}
