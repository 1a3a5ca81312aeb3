//! Generation engine
//!
//! Visits a node tree against a model root and a context, producing a
//! [`View`]. A `None` model value at any container short-circuits emission
//! of that subtree, except value nodes with the include-null option, which
//! emit an explicit null marker.

use std::sync::{Arc, MutexGuard};

use viewloom_core_types::{FieldView, ModelHandle, ModelObject, Scalar};

use super::convert_to_view;
use crate::context::ScopedContext;
use crate::errors::{Result, ViewLoomError};
use crate::template::{Node, NodeKind, Template};
use crate::view::{Envelope, Event, EventKind, View};

/// Generate a view from a model graph
///
/// The context is consumed: contexts are created fresh per call and never
/// reused.
///
/// # Errors
///
/// Propagates any strategy or accessor failure; see `ViewLoomError` for
/// the taxonomy. No partial view is returned on failure.
pub fn generate(
    template: &Template,
    model: &dyn ModelObject,
    mut ctx: ScopedContext,
) -> Result<View> {
    let root = template.root();
    tracing::debug!(root = %root.display_name(), "generating view");

    let mut generator = Generator { ctx: &mut ctx };
    let pushed = generator.push_node_scope(root);
    let result = generator.gen_root(root, model);
    if pushed {
        generator.ctx.pop_scope();
    }
    result
}

fn lock_handle(handle: &ModelHandle) -> Result<MutexGuard<'_, dyn ModelObject>> {
    handle.lock().map_err(|_| ViewLoomError::Internal {
        message: "referenced instance is poisoned".to_string(),
    })
}

struct Generator<'a> {
    ctx: &'a mut ScopedContext,
}

impl Generator<'_> {
    fn push_node_scope(&mut self, node: &Node) -> bool {
        match node.local_scope() {
            Some(scope) => {
                self.ctx.push_scope(Arc::clone(scope));
                true
            }
            None => false,
        }
    }

    fn gen_root(&mut self, root: &Node, model: &dyn ModelObject) -> Result<View> {
        let mut out = Vec::new();
        match root.kind() {
            NodeKind::Object { .. } => {
                self.gen_object(root, model, &mut out)?;
                Ok(View::new(out))
            }
            NodeKind::Envelope { properties, body } => {
                let mut envelope = Envelope::new();
                out.push(self.begin_event(EventKind::BeginEnvelope, root));
                for property in properties {
                    if let Some((name, value)) = self.eval_property(property, model)? {
                        envelope.put(name.clone(), value.clone());
                        out.push(Event::meta(name, value));
                    }
                }
                self.gen_body(body, model, &mut out)?;
                out.push(self.begin_event(EventKind::EndEnvelope, root));
                Ok(View::with_envelope(out, envelope))
            }
            _ => Err(ViewLoomError::Internal {
                message: "template root must be an object or envelope node".to_string(),
            }),
        }
    }

    /// Evaluate an envelope property node to a name/value pair
    fn eval_property(
        &mut self,
        property: &Node,
        owner: &dyn ModelObject,
    ) -> Result<Option<(String, Scalar)>> {
        let name = property
            .name()
            .unwrap_or_else(|| property.access().unwrap_or_default())
            .to_string();
        match self.read_field(property, owner)? {
            FieldView::Scalar(value) => {
                let local = match property.kind() {
                    NodeKind::Value { converter, .. } => converter.as_ref(),
                    _ => None,
                };
                let converted = convert_to_view(self.ctx, property, local, &value)?;
                Ok(Some((name, converted)))
            }
            FieldView::Absent => Ok(None),
            _ => Err(self.shape_mismatch(property, "a scalar field")),
        }
    }

    fn gen_object(
        &mut self,
        node: &Node,
        model: &dyn ModelObject,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        out.push(self.begin_event(EventKind::BeginObject, node));

        if node.is_discriminated() {
            let runtime = model.type_token();
            let declared = node.model_type().ok_or_else(|| ViewLoomError::Internal {
                message: format!("node '{}' lacks a model type", node.display_name()),
            })?;
            let branch =
                node.branch_for(runtime)
                    .ok_or_else(|| ViewLoomError::TypeMismatch {
                        expected: format!("a subtype of {}", declared),
                        found: runtime.name().to_string(),
                    })?;
            let strategy = self.ctx.discriminator_strategy()?;
            let discriminator =
                strategy.to_discriminator(declared, runtime, &node.subtype_tokens())?;
            tracing::debug!(
                node = %node.display_name(),
                subtype = %runtime,
                value = %discriminator.value,
                "discriminator selected"
            );
            // The discriminator is always the first child event.
            out.push(Event::discriminator(discriminator.name, discriminator.value));
            self.gen_children(branch.children(), model, out)?;
        } else if let NodeKind::Object { children, .. } = node.kind() {
            self.gen_children(children, model, out)?;
        }

        out.push(self.begin_event(EventKind::EndObject, node));
        Ok(())
    }

    fn gen_children(
        &mut self,
        children: &[Node],
        model: &dyn ModelObject,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        for child in children {
            self.gen_child(child, model, out)?;
        }
        Ok(())
    }

    fn gen_child(
        &mut self,
        node: &Node,
        owner: &dyn ModelObject,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let pushed = self.push_node_scope(node);
        let result = self.gen_child_inner(node, owner, out);
        if pushed {
            self.ctx.pop_scope();
        }
        result
    }

    fn gen_child_inner(
        &mut self,
        node: &Node,
        owner: &dyn ModelObject,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        match node.kind() {
            NodeKind::Value {
                converter,
                include_null,
            } => match self.read_field(node, owner)? {
                FieldView::Scalar(value) => {
                    let converted = convert_to_view(self.ctx, node, converter.as_ref(), &value)?;
                    out.push(self.leaf_event(EventKind::Value, node, converted));
                    Ok(())
                }
                FieldView::Absent => {
                    if *include_null {
                        out.push(self.leaf_event(EventKind::Value, node, Scalar::Null));
                    }
                    Ok(())
                }
                _ => Err(self.shape_mismatch(node, "a scalar field")),
            },

            NodeKind::Url { decorators } => {
                let resolver = self.ctx.url_resolver()?.ok_or_else(|| {
                    ViewLoomError::StrategyMissing {
                        strategy: "URL resolver".to_string(),
                        node: node.display_name(),
                    }
                })?;
                let mut url = resolver.resolve(node, self.ctx)?;
                url = self.ctx.url_decorators()?.apply(url, node, self.ctx);
                for decorator in decorators {
                    url = decorator.decorate(url, node, self.ctx);
                }
                out.push(self.leaf_event(EventKind::Url, node, Scalar::Text(url)));
                Ok(())
            }

            NodeKind::Object { .. } => match self.read_field(node, owner)? {
                FieldView::Object(child) => self.gen_object(node, child, out),
                FieldView::Absent => Ok(()),
                _ => Err(self.shape_mismatch(node, "an object field")),
            },

            NodeKind::ArrayOfValues {
                element_name,
                element_namespace,
                converter,
            } => match self.read_field(node, owner)? {
                FieldView::Scalars(items) => {
                    out.push(self.begin_event(EventKind::BeginArray, node));
                    for item in items {
                        let converted =
                            convert_to_view(self.ctx, node, converter.as_ref(), &item)?;
                        let mut event = Event::new(EventKind::Value).with_value(converted);
                        event.name = element_name.clone();
                        event.namespace = element_namespace.clone();
                        out.push(event);
                    }
                    out.push(self.begin_event(EventKind::EndArray, node));
                    Ok(())
                }
                FieldView::Absent => Ok(()),
                _ => Err(self.shape_mismatch(node, "a scalar collection")),
            },

            NodeKind::ArrayOfObjects { element } => match self.read_field(node, owner)? {
                FieldView::Objects(items) => {
                    out.push(self.begin_event(EventKind::BeginArray, node));
                    for item in items {
                        let pushed = self.push_node_scope(element);
                        let result = self.gen_object(element, item, out);
                        if pushed {
                            self.ctx.pop_scope();
                        }
                        result?;
                    }
                    out.push(self.begin_event(EventKind::EndArray, node));
                    Ok(())
                }
                FieldView::Absent => Ok(()),
                _ => Err(self.shape_mismatch(node, "an object collection")),
            },

            NodeKind::ArrayOfReferences { element } => match self.read_field(node, owner)? {
                FieldView::Handles(handles) => {
                    out.push(self.begin_event(EventKind::BeginArray, node));
                    for handle in handles {
                        let referent = lock_handle(&handle)?;
                        self.gen_reference(element, &*referent, out)?;
                    }
                    out.push(self.begin_event(EventKind::EndArray, node));
                    Ok(())
                }
                FieldView::Absent => Ok(()),
                _ => Err(self.shape_mismatch(node, "a reference collection")),
            },

            NodeKind::Reference { .. } => match self.read_field(node, owner)? {
                FieldView::Handle(handle) => {
                    let referent = lock_handle(&handle)?;
                    self.gen_reference(node, &*referent, out)
                }
                FieldView::Absent => Ok(()),
                _ => Err(self.shape_mismatch(node, "a reference field")),
            },

            NodeKind::Envelope { properties, body } => {
                out.push(self.begin_event(EventKind::BeginEnvelope, node));
                for property in properties {
                    if let Some((name, value)) = self.eval_property(property, owner)? {
                        out.push(Event::meta(name, value));
                    }
                }
                self.gen_body(body, owner, out)?;
                out.push(self.begin_event(EventKind::EndEnvelope, node));
                Ok(())
            }

            NodeKind::Splice => {
                let handler = self.ctx.splice_handler()?.ok_or_else(|| {
                    ViewLoomError::StrategyMissing {
                        strategy: "splice handler".to_string(),
                        node: node.display_name(),
                    }
                })?;
                match handler.generate(node, owner, self.ctx)? {
                    Some(view) => {
                        out.push(self.begin_event(EventKind::BeginSplice, node));
                        out.extend(view.events().iter().cloned());
                        out.push(self.begin_event(EventKind::EndSplice, node));
                        Ok(())
                    }
                    // The handler opted out; the node is omitted entirely.
                    None => Ok(()),
                }
            }
        }
    }

    /// Generate an envelope body: bound to a field of the owner, or
    /// describing the owner itself when it carries no field binding
    fn gen_body(
        &mut self,
        body: &Node,
        owner: &dyn ModelObject,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        if body.access().is_some() {
            return self.gen_child(body, owner, out);
        }
        let pushed = self.push_node_scope(body);
        let result = match body.kind() {
            NodeKind::Object { .. } => self.gen_object(body, owner, out),
            _ => Err(ViewLoomError::Internal {
                message: "envelope body without a field binding must be an object node"
                    .to_string(),
            }),
        };
        if pushed {
            self.ctx.pop_scope();
        }
        result
    }

    /// Emit only the identifying subset of the referent's properties
    fn gen_reference(
        &mut self,
        node: &Node,
        referent: &dyn ModelObject,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        out.push(self.begin_event(EventKind::BeginObject, node));
        if let NodeKind::Reference { key_children } = node.kind() {
            self.gen_children(key_children, referent, out)?;
        }
        out.push(self.begin_event(EventKind::EndObject, node));
        Ok(())
    }

    fn read_field<'m>(
        &self,
        node: &Node,
        owner: &'m dyn ModelObject,
    ) -> Result<FieldView<'m>> {
        let access = node.access().ok_or_else(|| ViewLoomError::Internal {
            message: format!("node '{}' has no field binding", node.display_name()),
        })?;
        owner
            .field(access)
            .ok_or_else(|| ViewLoomError::AccessorRejected {
                operation: "read".to_string(),
                field: access.to_string(),
                model_type: owner.type_token().name().to_string(),
            })
    }

    fn begin_event(&self, kind: EventKind, node: &Node) -> Event {
        let mut event = Event::new(kind);
        event.name = node.name().map(str::to_string);
        event.namespace = node.namespace().map(str::to_string);
        event
    }

    fn leaf_event(&self, kind: EventKind, node: &Node, value: Scalar) -> Event {
        self.begin_event(kind, node).with_value(value)
    }

    fn shape_mismatch(&self, node: &Node, expected: &str) -> ViewLoomError {
        ViewLoomError::TypeMismatch {
            expected: expected.to_string(),
            found: format!("field '{}' with another shape", node.display_name()),
        }
    }
}
