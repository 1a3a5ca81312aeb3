//! Application engine (model editor)
//!
//! Consumes a [`View`] against a node tree and a context, producing a
//! newly created or mutated model graph. The editor keeps the remaining
//! events in a double-ended queue so the discriminator search can look
//! ahead without consuming, walking balanced substructures through the
//! [`super::lookahead`] primitives.
//!
//! Failure semantics: every structural mismatch, unresolved reference,
//! ambiguous scope lookup or missing strategy aborts the whole call. A
//! failed `update` leaves no consistency guarantee for the partially
//! mutated model.

use std::collections::VecDeque;
use std::sync::Arc;

use viewloom_core_types::{
    same_instance, CollectionItem, FieldView, ModelHandle, ModelObject, Scalar, TypeToken,
};

use super::{convert_to_model, lookahead};
use crate::context::ScopedContext;
use crate::errors::{Result, ViewLoomError};
use crate::template::{Node, NodeKind, Template};
use crate::view::{Event, EventKind, View, ViewEntity};

/// Consumes a view to create or mutate a model graph
///
/// Two entry points: [`ModelEditor::create`] instantiates a fresh graph,
/// [`ModelEditor::update`] mutates an existing one in place. Both consume
/// the editor; editors are built per call from an immutable view.
pub struct ModelEditor<'t> {
    template: &'t Template,
    queue: VecDeque<Event>,
    ctx: ScopedContext,
}

impl<'t> ModelEditor<'t> {
    /// Build an editor over a view
    pub fn new(template: &'t Template, view: &View, ctx: ScopedContext) -> Self {
        Self {
            template,
            queue: view.iter().cloned().collect(),
            ctx,
        }
    }

    /// Create a new model graph from the view
    ///
    /// # Errors
    ///
    /// Any structural mismatch, failed instantiation, unresolved reference
    /// or missing strategy aborts the call.
    pub fn create(mut self) -> Result<Box<dyn ModelObject>> {
        let root = self.template.root();
        tracing::debug!(root = %root.display_name(), "applying view (create)");
        let pushed = self.push_node_scope(root);
        let result = match root.kind() {
            NodeKind::Object { .. } => self.apply_object_create(root),
            NodeKind::Envelope { .. } => self.apply_envelope_create(root),
            _ => Err(ViewLoomError::Internal {
                message: "template root must be an object or envelope node".to_string(),
            }),
        };
        if pushed {
            self.ctx.pop_scope();
        }
        result
    }

    /// Mutate an existing model graph in place from the view
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when `model` is not an instance of the root node's
    /// declared type; otherwise as for [`ModelEditor::create`].
    pub fn update(mut self, model: &mut dyn ModelObject) -> Result<()> {
        let root = self.template.root();
        tracing::debug!(root = %root.display_name(), "applying view (update)");
        let pushed = self.push_node_scope(root);
        let result = match root.kind() {
            NodeKind::Object { .. } => self.apply_object_update(root, model),
            NodeKind::Envelope { .. } => self.apply_envelope_update(root, model),
            _ => Err(ViewLoomError::Internal {
                message: "template root must be an object or envelope node".to_string(),
            }),
        };
        if pushed {
            self.ctx.pop_scope();
        }
        result
    }

    // ===== Containers =====

    fn apply_envelope_create(&mut self, root: &Node) -> Result<Box<dyn ModelObject>> {
        let NodeKind::Envelope { properties, body } = root.kind() else {
            return Err(ViewLoomError::Internal {
                message: "apply_envelope_create called on a non-envelope node".to_string(),
            });
        };
        self.expect(EventKind::BeginEnvelope, root)?;
        let props = self.collect_meta();
        if body.access().is_some() {
            return Err(ViewLoomError::Internal {
                message: "root envelope body must describe the root model".to_string(),
            });
        }
        let mut obj = match body.kind() {
            NodeKind::Object { .. } => self.apply_object_create(body)?,
            _ => {
                return Err(ViewLoomError::Internal {
                    message: "envelope body without a field binding must be an object node"
                        .to_string(),
                })
            }
        };
        self.apply_envelope_props(properties, props, obj.as_mut())?;
        self.expect(EventKind::EndEnvelope, root)?;
        Ok(obj)
    }

    fn apply_envelope_update(
        &mut self,
        root: &Node,
        model: &mut dyn ModelObject,
    ) -> Result<()> {
        let NodeKind::Envelope { properties, body } = root.kind() else {
            return Err(ViewLoomError::Internal {
                message: "apply_envelope_update called on a non-envelope node".to_string(),
            });
        };
        self.expect(EventKind::BeginEnvelope, root)?;
        let props = self.collect_meta();
        match body.kind() {
            NodeKind::Object { .. } if body.access().is_none() => {
                self.apply_object_update(body, model)?;
            }
            _ => {
                self.apply_child(body, model)?;
            }
        }
        self.apply_envelope_props(properties, props, model)?;
        self.expect(EventKind::EndEnvelope, root)?;
        Ok(())
    }

    fn apply_object_create(&mut self, node: &Node) -> Result<Box<dyn ModelObject>> {
        self.expect(EventKind::BeginObject, node)?;
        let (token, children) = self.select_branch(node)?;
        let mut obj = self.instantiate(token)?;
        self.apply_children(children, obj.as_mut())?;
        self.expect(EventKind::EndObject, node)?;
        Ok(obj)
    }

    fn apply_object_update(&mut self, node: &Node, model: &mut dyn ModelObject) -> Result<()> {
        self.expect(EventKind::BeginObject, node)?;
        let (token, children) = self.select_branch(node)?;
        if model.type_token() != token {
            return Err(ViewLoomError::TypeMismatch {
                expected: token.name().to_string(),
                found: model.type_token().name().to_string(),
            });
        }
        self.apply_children(children, model)?;
        self.expect(EventKind::EndObject, node)?;
        Ok(())
    }

    /// Select the children to process for a container whose begin event
    /// was just consumed, resolving the discriminator when polymorphic
    fn select_branch<'n>(&mut self, node: &'n Node) -> Result<(TypeToken, &'n [Node])> {
        if !node.is_discriminated() {
            let token = node.model_type().ok_or_else(|| ViewLoomError::Internal {
                message: format!("node '{}' lacks a model type", node.display_name()),
            })?;
            return match node.kind() {
                NodeKind::Object { children, .. } => Ok((token, children.as_slice())),
                _ => Err(ViewLoomError::Internal {
                    message: format!("node '{}' is not an object node", node.display_name()),
                }),
            };
        }

        let declared = node.model_type().ok_or_else(|| ViewLoomError::Internal {
            message: format!("node '{}' lacks a model type", node.display_name()),
        })?;
        // Look ahead without consuming: skip whole balanced substructures
        // until the discriminator at this node's own depth, or its end.
        let value = match lookahead::find_at_depth(self.queue.iter(), EventKind::Discriminator)
        {
            Some(event) => event
                .value
                .as_ref()
                .and_then(|s| s.as_text())
                .map(str::to_string)
                .ok_or_else(|| ViewLoomError::StructuralMismatch {
                    node: node.display_name(),
                    expected: "a discriminator with a text value".to_string(),
                    found: event.describe(),
                })?,
            None => {
                return Err(ViewLoomError::DiscriminatorMissing {
                    node: node.display_name(),
                })
            }
        };

        let strategy = self.ctx.discriminator_strategy()?;
        let candidates = node.subtype_tokens();
        let token = strategy.to_subtype(declared, &value, &candidates)?;
        // Fail fast if a custom strategy resolved to a type that is not
        // actually a declared subtype.
        let branch = node
            .branch_for(token)
            .ok_or_else(|| ViewLoomError::TypeMismatch {
                expected: format!("a subtype of {}", declared),
                found: token.name().to_string(),
            })?;
        tracing::debug!(
            node = %node.display_name(),
            value = %value,
            subtype = %token,
            "discriminator resolved"
        );
        Ok((token, branch.children()))
    }

    fn instantiate(&mut self, token: TypeToken) -> Result<Box<dyn ModelObject>> {
        self.ctx
            .object_factories()?
            .new_instance(token, self.template.types())?
            .ok_or_else(|| ViewLoomError::InstantiationFailed {
                declared: token.name().to_string(),
            })
    }

    fn apply_children(&mut self, children: &[Node], obj: &mut dyn ModelObject) -> Result<()> {
        for child in children {
            self.discard_informational();
            let pushed = self.push_node_scope(child);
            let result = self.apply_child(child, obj);
            if pushed {
                self.ctx.pop_scope();
            }
            result?;
        }
        Ok(())
    }

    // ===== Children =====

    /// Consume the event(s) of one child node in declaration order; a
    /// child whose opening event is not next is treated as omitted
    /// (generation omits absent subtrees)
    fn apply_child(&mut self, child: &Node, owner: &mut dyn ModelObject) -> Result<()> {
        match child.kind() {
            NodeKind::Value { converter, .. } => {
                // Value nodes accept both VALUE and URL events.
                let event = if self.next_matches(EventKind::Value, child) {
                    self.queue.pop_front()
                } else if self.next_matches(EventKind::Url, child) {
                    self.queue.pop_front()
                } else {
                    return Ok(());
                };
                let value = event.and_then(|e| e.value).unwrap_or(Scalar::Null);
                let converted = convert_to_model(&self.ctx, child, converter.as_ref(), &value)?;
                self.inject_scalar(child, owner, converted)
            }

            NodeKind::Url { .. } => {
                // Resolved links are derived state, not writable model state.
                if self.next_matches(EventKind::Url, child) {
                    self.queue.pop_front();
                }
                Ok(())
            }

            NodeKind::Object { .. } => {
                if !self.next_matches(EventKind::BeginObject, child) {
                    return Ok(());
                }
                let access = self.access_of(child)?;
                // Update the existing child in place when its runtime type
                // matches the incoming one; otherwise build a replacement.
                let incoming = self.peek_object_token(child)?;
                let existing = owner.object_mut(&access).map(|m| m.type_token());
                if existing == Some(incoming) {
                    let existing = owner.object_mut(&access).ok_or_else(|| {
                        ViewLoomError::Internal {
                            message: "child object disappeared between reads".to_string(),
                        }
                    })?;
                    self.apply_object_update(child, existing)
                } else {
                    let created = self.apply_object_create(child)?;
                    if owner.set_object(&access, created) {
                        Ok(())
                    } else {
                        Err(self.rejected("set_object", &access, owner))
                    }
                }
            }

            NodeKind::Reference { .. } => {
                if !self.next_matches(EventKind::BeginObject, child) {
                    return Ok(());
                }
                let handle = self.resolve_reference(child)?;
                let access = self.access_of(child)?;
                if owner.set_reference(&access, handle) {
                    Ok(())
                } else {
                    Err(self.rejected("set_reference", &access, owner))
                }
            }

            NodeKind::ArrayOfValues {
                element_name,
                converter,
                ..
            } => {
                if !self.next_matches(EventKind::BeginArray, child) {
                    return Ok(());
                }
                self.expect(EventKind::BeginArray, child)?;
                let mut items = Vec::new();
                while self
                    .queue
                    .front()
                    .is_some_and(|e| e.kind == EventKind::Value)
                {
                    if let Some(required) = element_name {
                        let actual = self.queue.front().and_then(|e| e.name.as_deref());
                        if actual != Some(required.as_str()) {
                            return Err(ViewLoomError::StructuralMismatch {
                                node: child.display_name(),
                                expected: format!("VALUE '{}'", required),
                                found: self
                                    .queue
                                    .front()
                                    .map(Event::describe)
                                    .unwrap_or_default(),
                            });
                        }
                    }
                    let value = self
                        .queue
                        .pop_front()
                        .and_then(|e| e.value)
                        .unwrap_or(Scalar::Null);
                    items.push(convert_to_model(
                        &self.ctx,
                        child,
                        converter.as_ref(),
                        &value,
                    )?);
                }
                self.expect(EventKind::EndArray, child)?;
                // Scalar collections are replaced wholesale.
                let access = self.access_of(child)?;
                if owner.set_scalars(&access, items) {
                    Ok(())
                } else {
                    Err(self.rejected("set_scalars", &access, owner))
                }
            }

            NodeKind::ArrayOfObjects { element } => {
                if !self.next_matches(EventKind::BeginArray, child) {
                    return Ok(());
                }
                self.sync_object_array(child, element, owner)
            }

            NodeKind::ArrayOfReferences { element } => {
                if !self.next_matches(EventKind::BeginArray, child) {
                    return Ok(());
                }
                self.sync_reference_array(child, element, owner)
            }

            NodeKind::Envelope { properties, body } => {
                if !self.next_matches(EventKind::BeginEnvelope, child) {
                    return Ok(());
                }
                self.expect(EventKind::BeginEnvelope, child)?;
                let props = self.collect_meta();
                match body.kind() {
                    NodeKind::Object { .. } if body.access().is_none() => {
                        self.apply_object_update(body, owner)?;
                    }
                    _ => {
                        self.apply_child(body, owner)?;
                    }
                }
                self.apply_envelope_props(properties, props, owner)?;
                self.expect(EventKind::EndEnvelope, child)?;
                Ok(())
            }

            NodeKind::Splice => {
                if !self.next_matches(EventKind::BeginSplice, child) {
                    return Ok(());
                }
                self.expect(EventKind::BeginSplice, child)?;
                let inner = lookahead::take_until_complement(
                    &mut self.queue,
                    EventKind::BeginSplice,
                )
                .ok_or_else(|| ViewLoomError::StructuralMismatch {
                    node: child.display_name(),
                    expected: "END_SPLICE".to_string(),
                    found: "end of view".to_string(),
                })?;
                let handler = self.ctx.splice_handler()?.ok_or_else(|| {
                    ViewLoomError::StrategyMissing {
                        strategy: "splice handler".to_string(),
                        node: child.display_name(),
                    }
                })?;
                handler.apply(child, &View::new(inner), owner, &self.ctx)
            }
        }
    }

    // ===== Collection synchronization =====

    /// Synchronize an owned-object collection: pair incoming elements
    /// positionally with type-compatible existing elements (updated in
    /// place, identity preserved), replace incompatible ones, and trim
    /// trailing existing elements
    fn sync_object_array(
        &mut self,
        array: &Node,
        element: &Node,
        owner: &mut dyn ModelObject,
    ) -> Result<()> {
        self.expect(EventKind::BeginArray, array)?;
        let access = self.access_of(array)?;
        let mut live = match owner.field(&access) {
            Some(FieldView::Objects(items)) => items.len(),
            Some(FieldView::Absent) => 0,
            Some(_) => {
                return Err(ViewLoomError::TypeMismatch {
                    expected: "an object collection".to_string(),
                    found: format!("field '{}' with another shape", access),
                })
            }
            None => return Err(self.rejected("read", &access, owner)),
        };
        let manager = self.ctx.list_managers()?.select(owner.type_token(), &access);

        let mut index = 0usize;
        while self.next_matches(EventKind::BeginObject, element) {
            if index < live {
                let incoming = self.peek_object_token(element)?;
                let existing = owner
                    .item_mut(&access, index)
                    .map(|item| item.type_token());
                if existing == Some(incoming) {
                    let item = owner.item_mut(&access, index).ok_or_else(|| {
                        ViewLoomError::Internal {
                            message: "collection element disappeared between reads".to_string(),
                        }
                    })?;
                    self.apply_object_update(element, item)?;
                } else {
                    manager.remove(owner, &access, index)?;
                    live -= 1;
                    let created = self.apply_object_create(element)?;
                    manager.add(owner, &access, index, CollectionItem::Object(created))?;
                    live += 1;
                }
            } else {
                let created = self.apply_object_create(element)?;
                manager.add(owner, &access, index, CollectionItem::Object(created))?;
                live += 1;
            }
            index += 1;
        }
        while live > index {
            manager.remove(owner, &access, index)?;
            live -= 1;
        }
        self.expect(EventKind::EndArray, array)?;
        Ok(())
    }

    /// Synchronize a by-reference collection against the resolved incoming
    /// list with a minimal edit sequence, matching by instance identity
    fn sync_reference_array(
        &mut self,
        array: &Node,
        element: &Node,
        owner: &mut dyn ModelObject,
    ) -> Result<()> {
        self.expect(EventKind::BeginArray, array)?;
        let mut desired: Vec<ModelHandle> = Vec::new();
        while self.next_matches(EventKind::BeginObject, element) {
            desired.push(self.resolve_reference(element)?);
        }
        self.expect(EventKind::EndArray, array)?;

        let access = self.access_of(array)?;
        let mut current: Vec<ModelHandle> = match owner.field(&access) {
            Some(FieldView::Handles(handles)) => handles,
            Some(FieldView::Absent) => Vec::new(),
            Some(_) => {
                return Err(ViewLoomError::TypeMismatch {
                    expected: "a reference collection".to_string(),
                    found: format!("field '{}' with another shape", access),
                })
            }
            None => return Err(self.rejected("read", &access, owner)),
        };
        let manager = self.ctx.list_managers()?.select(owner.type_token(), &access);

        let mut index = 0usize;
        while index < desired.len() {
            if index < current.len() && same_instance(&current[index], &desired[index]) {
                index += 1;
                continue;
            }
            let keep_current = index < current.len()
                && desired[index..]
                    .iter()
                    .any(|d| same_instance(d, &current[index]));
            if index < current.len() && !keep_current {
                tracing::debug!(field = %access, index, "collection sync: remove");
                manager.remove(owner, &access, index)?;
                current.remove(index);
                continue;
            }
            tracing::debug!(field = %access, index, "collection sync: add");
            manager.add(
                owner,
                &access,
                index,
                CollectionItem::Handle(Arc::clone(&desired[index])),
            )?;
            current.insert(index, Arc::clone(&desired[index]));
            index += 1;
        }
        while current.len() > desired.len() {
            manager.remove(owner, &access, index)?;
            current.remove(index);
        }
        Ok(())
    }

    /// Runtime type of the object whose begin event is next in the queue
    fn peek_object_token(&self, node: &Node) -> Result<TypeToken> {
        if !node.is_discriminated() {
            return node.model_type().ok_or_else(|| ViewLoomError::Internal {
                message: format!("node '{}' lacks a model type", node.display_name()),
            });
        }
        let declared = node.model_type().ok_or_else(|| ViewLoomError::Internal {
            message: format!("node '{}' lacks a model type", node.display_name()),
        })?;
        // Skip the object's own begin event, then search its children.
        let value = lookahead::find_at_depth(
            self.queue.iter().skip(1),
            EventKind::Discriminator,
        )
        .and_then(|e| e.value.as_ref())
        .and_then(|s| s.as_text())
        .map(str::to_string)
        .ok_or_else(|| ViewLoomError::DiscriminatorMissing {
            node: node.display_name(),
        })?;
        let strategy = self.ctx.discriminator_strategy()?;
        strategy.to_subtype(declared, &value, &node.subtype_tokens())
    }

    // ===== References =====

    /// Pop a reference's events and resolve them to an existing instance
    fn resolve_reference(&mut self, node: &Node) -> Result<ModelHandle> {
        let declared = node.model_type().ok_or_else(|| ViewLoomError::Internal {
            message: format!("node '{}' lacks a model type", node.display_name()),
        })?;
        let entity = self.read_reference_entity(node, declared)?;
        let resolved = self.ctx.reference_resolvers()?.resolve(declared, &entity)?;
        resolved.ok_or_else(|| ViewLoomError::ReferenceUnresolved {
            declared: declared.name().to_string(),
            node: node.display_name(),
        })
    }

    fn read_reference_entity(
        &mut self,
        node: &Node,
        declared: TypeToken,
    ) -> Result<ViewEntity> {
        self.expect(EventKind::BeginObject, node)?;
        let mut entity = ViewEntity::new(declared);
        loop {
            match self.queue.front().map(|e| e.kind) {
                Some(EventKind::Value) | Some(EventKind::Url) => {
                    let event = self.queue.pop_front().ok_or_else(|| {
                        ViewLoomError::Internal {
                            message: "queue front disappeared".to_string(),
                        }
                    })?;
                    entity.put(
                        event.name.unwrap_or_default(),
                        event.value.unwrap_or(Scalar::Null),
                    );
                }
                Some(EventKind::EndObject) => break,
                _ => {
                    return Err(ViewLoomError::StructuralMismatch {
                        node: node.display_name(),
                        expected: "VALUE or END_OBJECT".to_string(),
                        found: self
                            .queue
                            .front()
                            .map(Event::describe)
                            .unwrap_or_else(|| "end of view".to_string()),
                    })
                }
            }
        }
        self.expect(EventKind::EndObject, node)?;
        Ok(entity)
    }

    // ===== Envelope properties =====

    /// Pop leading META events into name/value pairs
    fn collect_meta(&mut self) -> Vec<(String, Scalar)> {
        let mut props = Vec::new();
        while self
            .queue
            .front()
            .is_some_and(|e| e.kind == EventKind::Meta)
        {
            if let Some(event) = self.queue.pop_front() {
                props.push((
                    event.name.unwrap_or_default(),
                    event.value.unwrap_or(Scalar::Null),
                ));
            }
        }
        props
    }

    /// Apply envelope properties back through their value nodes; unknown
    /// properties are transport metadata and are ignored
    fn apply_envelope_props(
        &mut self,
        properties: &[Node],
        props: Vec<(String, Scalar)>,
        target: &mut dyn ModelObject,
    ) -> Result<()> {
        for (name, value) in props {
            let Some(property) = properties.iter().find(|p| p.name() == Some(name.as_str()))
            else {
                continue;
            };
            let local = match property.kind() {
                NodeKind::Value { converter, .. } => converter.as_ref(),
                _ => None,
            };
            let converted = convert_to_model(&self.ctx, property, local, &value)?;
            self.inject_scalar(property, target, converted)?;
        }
        Ok(())
    }

    // ===== Queue plumbing =====

    fn push_node_scope(&mut self, node: &Node) -> bool {
        match node.local_scope() {
            Some(scope) => {
                self.ctx.push_scope(Arc::clone(scope));
                true
            }
            None => false,
        }
    }

    fn next_matches(&self, kind: EventKind, node: &Node) -> bool {
        self.queue
            .front()
            .is_some_and(|e| e.matches(kind, node.name(), node.namespace()))
    }

    /// Pop the next event and validate kind, name and namespace
    fn expect(&mut self, kind: EventKind, node: &Node) -> Result<Event> {
        if kind.closes() {
            self.discard_informational();
        }
        let expected = || {
            match node.name() {
                Some(name) => format!("{} '{}'", kind.label(), name),
                None => kind.label().to_string(),
            }
        };
        let event = self
            .queue
            .pop_front()
            .ok_or_else(|| ViewLoomError::StructuralMismatch {
                node: node.display_name(),
                expected: expected(),
                found: "end of view".to_string(),
            })?;
        if !event.matches(kind, node.name(), node.namespace()) {
            return Err(ViewLoomError::StructuralMismatch {
                node: node.display_name(),
                expected: expected(),
                found: event.describe(),
            });
        }
        Ok(event)
    }

    /// Pop discriminator and stray meta events: the discriminator was
    /// already consumed logically by the lookahead, meta is transport
    /// metadata outside envelope positions
    fn discard_informational(&mut self) {
        while self.queue.front().is_some_and(|e| {
            matches!(e.kind, EventKind::Discriminator | EventKind::Meta)
        }) {
            self.queue.pop_front();
        }
    }

    fn access_of(&self, node: &Node) -> Result<String> {
        node.access()
            .map(str::to_string)
            .ok_or_else(|| ViewLoomError::Internal {
                message: format!("node '{}' has no field binding", node.display_name()),
            })
    }

    fn inject_scalar(
        &self,
        node: &Node,
        target: &mut dyn ModelObject,
        value: Scalar,
    ) -> Result<()> {
        let access = self.access_of(node)?;
        if target.set_scalar(&access, value) {
            Ok(())
        } else {
            Err(self.rejected("set_scalar", &access, target))
        }
    }

    fn rejected(
        &self,
        operation: &str,
        field: &str,
        target: &dyn ModelObject,
    ) -> ViewLoomError {
        ViewLoomError::AccessorRejected {
            operation: operation.to_string(),
            field: field.to_string(),
            model_type: target.type_token().name().to_string(),
        }
    }
}
