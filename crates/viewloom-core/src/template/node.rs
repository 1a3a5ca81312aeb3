use std::sync::Arc;

use viewloom_core_types::TypeToken;

use crate::scope::Scope;
use crate::strategy::{UrlDecorator, ValueConverter};

/// One element of a template, tagged by kind
///
/// Nodes are immutable once the template is built. The common fields
/// carry the view-side identity (`name`/`namespace`), the model-side
/// binding (`access`, the field resolved at build time), the declared
/// model type, and an optional node-local scope whose registrations
/// shadow outer ones while the node is being processed.
pub struct Node {
    name: Option<String>,
    namespace: Option<String>,
    model_type: Option<TypeToken>,
    access: Option<String>,
    scope: Option<Arc<Scope>>,
    kind: NodeKind,
}

/// Kind-specific payload of a node
pub enum NodeKind {
    /// Scalar leaf
    Value {
        converter: Option<Arc<dyn ValueConverter>>,
        include_null: bool,
    },
    /// Scalar leaf resolved through the scope-supplied URL capability
    Url { decorators: Vec<Arc<dyn UrlDecorator>> },
    /// Container with ordered children; polymorphic when `discriminated`
    Object {
        discriminated: bool,
        children: Vec<Node>,
        subtypes: Vec<SubtypeBranch>,
    },
    /// Collection of scalars; replaced wholesale on application
    ArrayOfValues {
        element_name: Option<String>,
        element_namespace: Option<String>,
        converter: Option<Arc<dyn ValueConverter>>,
    },
    /// Collection of owned objects; synchronized on application
    ArrayOfObjects { element: Box<Node> },
    /// Collection of by-reference associations; synchronized on application
    ArrayOfReferences { element: Box<Node> },
    /// By-reference association carrying identifying properties only
    Reference { key_children: Vec<Node> },
    /// Wraps a sub-template's output with named properties and a seal
    Envelope {
        properties: Vec<Node>,
        body: Box<Node>,
    },
    /// Externally handled opaque sub-view
    Splice,
}

/// One branch of a polymorphic object node, selected by runtime type
/// during generation and by discriminator value during application
///
/// A branch is never itself discriminated; it lives inside its parent's
/// discriminator scope.
pub struct SubtypeBranch {
    token: TypeToken,
    children: Vec<Node>,
}

impl SubtypeBranch {
    /// Create a branch for the given concrete type
    pub fn new(token: TypeToken, children: Vec<Node>) -> Self {
        Self { token, children }
    }

    /// The concrete subtype this branch maps
    pub fn token(&self) -> TypeToken {
        self.token
    }

    /// The branch's children, processed in place of the parent's
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl Node {
    fn base(kind: NodeKind) -> Self {
        Self {
            name: None,
            namespace: None,
            model_type: None,
            access: None,
            scope: None,
            kind,
        }
    }

    // ===== Constructors =====

    /// Scalar leaf; view name and model field default to `name`
    pub fn value(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut node = Node::base(NodeKind::Value {
            converter: None,
            include_null: false,
        });
        node.access = Some(name.clone());
        node.name = Some(name);
        node
    }

    /// URL leaf; resolved externally, no model field
    pub fn url(name: impl Into<String>) -> Self {
        let mut node = Node::base(NodeKind::Url {
            decorators: Vec::new(),
        });
        node.name = Some(name.into());
        node
    }

    /// Monomorphic object container (unnamed; see [`Node::named`])
    pub fn object(model_type: TypeToken, children: Vec<Node>) -> Self {
        let mut node = Node::base(NodeKind::Object {
            discriminated: false,
            children,
            subtypes: Vec::new(),
        });
        node.model_type = Some(model_type);
        node
    }

    /// Polymorphic object container; exactly one discriminator decision
    /// governs it, and the winning branch's children are processed in
    /// place of any generic children
    pub fn polymorphic(model_type: TypeToken, subtypes: Vec<SubtypeBranch>) -> Self {
        let mut node = Node::base(NodeKind::Object {
            discriminated: true,
            children: Vec::new(),
            subtypes,
        });
        node.model_type = Some(model_type);
        node
    }

    /// Scalar collection; view name and model field default to `name`
    pub fn array_of_values(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut node = Node::base(NodeKind::ArrayOfValues {
            element_name: None,
            element_namespace: None,
            converter: None,
        });
        node.access = Some(name.clone());
        node.name = Some(name);
        node
    }

    /// Object collection; `element` describes one element
    pub fn array_of_objects(name: impl Into<String>, element: Node) -> Self {
        let name = name.into();
        let mut node = Node::base(NodeKind::ArrayOfObjects {
            element: Box::new(element),
        });
        node.access = Some(name.clone());
        node.name = Some(name);
        node
    }

    /// Reference collection; `element` must be a reference node
    pub fn array_of_references(name: impl Into<String>, element: Node) -> Self {
        let name = name.into();
        let mut node = Node::base(NodeKind::ArrayOfReferences {
            element: Box::new(element),
        });
        node.access = Some(name.clone());
        node.name = Some(name);
        node
    }

    /// By-reference association; `key_children` are the identifying
    /// value nodes read from the referent
    pub fn reference(
        name: impl Into<String>,
        model_type: TypeToken,
        key_children: Vec<Node>,
    ) -> Self {
        let name = name.into();
        let mut node = Node::base(NodeKind::Reference { key_children });
        node.access = Some(name.clone());
        node.name = Some(name);
        node.model_type = Some(model_type);
        node
    }

    /// Envelope wrapping `body` with named scalar properties
    pub fn envelope(name: impl Into<String>, properties: Vec<Node>, body: Node) -> Self {
        let mut node = Node::base(NodeKind::Envelope {
            properties,
            body: Box::new(body),
        });
        node.name = Some(name.into());
        node
    }

    /// Externally handled opaque sub-view
    pub fn splice(name: impl Into<String>) -> Self {
        let mut node = Node::base(NodeKind::Splice);
        node.name = Some(name.into());
        node
    }

    // ===== Builders =====

    /// Set the view-side name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Clear the view-side name (synthetic containers)
    pub fn unnamed(mut self) -> Self {
        self.name = None;
        self
    }

    /// Set the namespace
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Bind to a model field different from the view name
    pub fn accessed_by(mut self, field: impl Into<String>) -> Self {
        self.access = Some(field.into());
        self
    }

    /// Clear the model field binding (array element position)
    pub fn detached(mut self) -> Self {
        self.access = None;
        self
    }

    /// Declare the model/value type (drives converter selection on value
    /// nodes; conversion becomes required)
    pub fn typed(mut self, model_type: TypeToken) -> Self {
        self.model_type = Some(model_type);
        self
    }

    /// Attach a node-local converter (value and array-of-values nodes)
    pub fn with_converter(mut self, converter: Arc<dyn ValueConverter>) -> Self {
        match &mut self.kind {
            NodeKind::Value { converter: slot, .. }
            | NodeKind::ArrayOfValues { converter: slot, .. } => *slot = Some(converter),
            _ => {}
        }
        self
    }

    /// Emit an explicit null marker instead of omitting an absent value
    pub fn include_null(mut self) -> Self {
        if let NodeKind::Value { include_null, .. } = &mut self.kind {
            *include_null = true;
        }
        self
    }

    /// Override the element name of an array node
    pub fn element_named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match &mut self.kind {
            NodeKind::ArrayOfValues { element_name, .. } => *element_name = Some(name),
            NodeKind::ArrayOfObjects { element } | NodeKind::ArrayOfReferences { element } => {
                element.name = Some(name);
            }
            _ => {}
        }
        self
    }

    /// Attach URL decorators (url nodes)
    pub fn with_decorators(mut self, decorators: Vec<Arc<dyn UrlDecorator>>) -> Self {
        if let NodeKind::Url { decorators: slot } = &mut self.kind {
            *slot = decorators;
        }
        self
    }

    /// Attach a node-local scope; its registrations shadow outer scopes
    /// while this node (and its subtree) is processed
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(Arc::new(scope));
        self
    }

    // ===== Accessors =====

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn model_type(&self) -> Option<TypeToken> {
        self.model_type
    }

    pub fn access(&self) -> Option<&str> {
        self.access.as_deref()
    }

    pub fn local_scope(&self) -> Option<&Arc<Scope>> {
        self.scope.as_ref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether this node is a discriminated object
    pub fn is_discriminated(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Object {
                discriminated: true,
                ..
            }
        )
    }

    /// Subtype branch for a concrete runtime type, if declared
    pub fn branch_for(&self, token: TypeToken) -> Option<&SubtypeBranch> {
        match &self.kind {
            NodeKind::Object { subtypes, .. } => subtypes.iter().find(|b| b.token == token),
            _ => None,
        }
    }

    /// Declared subtype tokens of a polymorphic object
    pub fn subtype_tokens(&self) -> Vec<TypeToken> {
        match &self.kind {
            NodeKind::Object { subtypes, .. } => subtypes.iter().map(|b| b.token).collect(),
            _ => Vec::new(),
        }
    }

    /// Name used in error context
    pub fn display_name(&self) -> String {
        match (&self.name, self.model_type) {
            (Some(name), _) => name.clone(),
            (None, Some(token)) => format!("<{}>", token.name()),
            (None, None) => "<node>".to_string(),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            NodeKind::Value { .. } => "Value",
            NodeKind::Url { .. } => "Url",
            NodeKind::Object {
                discriminated: true,
                ..
            } => "Object(polymorphic)",
            NodeKind::Object { .. } => "Object",
            NodeKind::ArrayOfValues { .. } => "ArrayOfValues",
            NodeKind::ArrayOfObjects { .. } => "ArrayOfObjects",
            NodeKind::ArrayOfReferences { .. } => "ArrayOfReferences",
            NodeKind::Reference { .. } => "Reference",
            NodeKind::Envelope { .. } => "Envelope",
            NodeKind::Splice => "Splice",
        };
        f.debug_struct("Node")
            .field("kind", &kind)
            .field("name", &self.name)
            .field("access", &self.access)
            .finish()
    }
}
