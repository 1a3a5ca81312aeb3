#![allow(dead_code)]

//! Shared fixtures: hand-implemented model types and template builders.
//!
//! The accessor implementations here stand in for what a derive would
//! generate in user code; the engine only ever sees the `ModelObject`
//! trait surface.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use viewloom_core::errors::Result;
use viewloom_core::strategy::{AccessorListManager, ListManager, ReferenceResolver};
use viewloom_core::{Node, SubtypeBranch, Template, ViewEntity};
use viewloom_core_types::{
    CollectionItem, FieldView, ModelHandle, ModelObject, Scalar, TypeRegistry, TypeToken,
};

/// Wrap a model into a shared reference handle
pub fn handle(model: impl ModelObject) -> ModelHandle {
    Arc::new(Mutex::new(model))
}

// ===== Parent / Child =====

#[derive(Debug, Default, PartialEq)]
pub struct Parent {
    pub string_prop: Option<String>,
    pub children: Vec<Child>,
}

#[derive(Debug, Default, PartialEq)]
pub struct Child {
    pub name: Option<String>,
}

pub fn parent_token() -> TypeToken {
    TypeToken::of::<Parent>("Parent")
}

pub fn child_token() -> TypeToken {
    TypeToken::of::<Child>("Child")
}

impl ModelObject for Parent {
    fn type_token(&self) -> TypeToken {
        parent_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "stringProp" => Some(match &self.string_prop {
                Some(value) => FieldView::Scalar(Scalar::Text(value.clone())),
                None => FieldView::Absent,
            }),
            "children" => Some(FieldView::Objects(
                self.children.iter().map(|c| c as &dyn ModelObject).collect(),
            )),
            _ => None,
        }
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) -> bool {
        match (name, value) {
            ("stringProp", Scalar::Text(value)) => {
                self.string_prop = Some(value);
                true
            }
            ("stringProp", Scalar::Null) => {
                self.string_prop = None;
                true
            }
            _ => false,
        }
    }

    fn item_mut(&mut self, name: &str, index: usize) -> Option<&mut dyn ModelObject> {
        if name == "children" {
            self.children
                .get_mut(index)
                .map(|c| c as &mut dyn ModelObject)
        } else {
            None
        }
    }

    fn insert_item(&mut self, name: &str, index: usize, item: CollectionItem) -> bool {
        match (name, item) {
            ("children", CollectionItem::Object(obj)) => {
                match obj.into_any().downcast::<Child>() {
                    Ok(child) => {
                        self.children.insert(index, *child);
                        true
                    }
                    Err(_) => false,
                }
            }
            _ => false,
        }
    }

    fn remove_item(&mut self, name: &str, index: usize) -> bool {
        if name == "children" && index < self.children.len() {
            self.children.remove(index);
            true
        } else {
            false
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl ModelObject for Child {
    fn type_token(&self) -> TypeToken {
        child_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "name" => Some(match &self.name {
                Some(value) => FieldView::Scalar(Scalar::Text(value.clone())),
                None => FieldView::Absent,
            }),
            _ => None,
        }
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) -> bool {
        match (name, value) {
            ("name", Scalar::Text(value)) => {
                self.name = Some(value);
                true
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

fn parent_registry() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register::<Parent>(parent_token());
    types.register::<Child>(child_token());
    types
}

/// Template matching the end-to-end scenario: a parent object with a
/// scalar property and an array of empty child objects
pub fn parent_template() -> Template {
    let root = Node::object(
        parent_token(),
        vec![
            Node::value("stringProp"),
            Node::array_of_objects("children", Node::object(child_token(), vec![])),
        ],
    );
    Template::new(root, parent_registry()).unwrap()
}

/// Same shape, but child elements carry their name property
pub fn parent_template_with_child_names() -> Template {
    let root = Node::object(
        parent_token(),
        vec![
            Node::value("stringProp"),
            Node::array_of_objects(
                "children",
                Node::object(child_token(), vec![Node::value("name")]),
            ),
        ],
    );
    Template::new(root, parent_registry()).unwrap()
}

// ===== Polymorphic shapes =====

pub struct Shape;

#[derive(Debug, Default, PartialEq)]
pub struct Circle {
    pub radius: i64,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct Rect {
    pub width: i64,
    pub height: i64,
}

pub fn shape_token() -> TypeToken {
    TypeToken::of::<Shape>("Shape")
}

pub fn circle_token() -> TypeToken {
    TypeToken::of::<Circle>("Circle")
}

pub fn rect_token() -> TypeToken {
    TypeToken::of::<Rect>("Rect")
}

impl ModelObject for Circle {
    fn type_token(&self) -> TypeToken {
        circle_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "radius" => Some(FieldView::Scalar(Scalar::Int(self.radius))),
            "tags" => Some(FieldView::Scalars(
                self.tags.iter().map(|t| Scalar::Text(t.clone())).collect(),
            )),
            _ => None,
        }
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) -> bool {
        match (name, value) {
            ("radius", Scalar::Int(value)) => {
                self.radius = value;
                true
            }
            _ => false,
        }
    }

    fn set_scalars(&mut self, name: &str, values: Vec<Scalar>) -> bool {
        if name == "tags" {
            self.tags = values
                .into_iter()
                .filter_map(|v| v.as_text().map(str::to_string))
                .collect();
            true
        } else {
            false
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl ModelObject for Rect {
    fn type_token(&self) -> TypeToken {
        rect_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "width" => Some(FieldView::Scalar(Scalar::Int(self.width))),
            "height" => Some(FieldView::Scalar(Scalar::Int(self.height))),
            _ => None,
        }
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) -> bool {
        match (name, value) {
            ("width", Scalar::Int(value)) => {
                self.width = value;
                true
            }
            ("height", Scalar::Int(value)) => {
                self.height = value;
                true
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Template over a polymorphic shape root with circle and rect branches
pub fn shape_template() -> Template {
    let root = Node::polymorphic(
        shape_token(),
        vec![
            SubtypeBranch::new(circle_token(), vec![Node::value("radius")]),
            SubtypeBranch::new(rect_token(), vec![Node::value("width"), Node::value("height")]),
        ],
    )
    .named("shape");

    let mut types = TypeRegistry::new();
    types.register::<Circle>(circle_token());
    types.register::<Rect>(rect_token());
    Template::new(root, types).unwrap()
}

// ===== References =====

#[derive(Debug, Default)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

pub fn company_token() -> TypeToken {
    TypeToken::of::<Company>("Company")
}

impl ModelObject for Company {
    fn type_token(&self) -> TypeToken {
        company_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "id" => Some(FieldView::Scalar(Scalar::Int(self.id))),
            "name" => Some(FieldView::Scalar(Scalar::Text(self.name.clone()))),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[derive(Default)]
pub struct Employee {
    pub name: Option<String>,
    pub employer: Option<ModelHandle>,
}

pub fn employee_token() -> TypeToken {
    TypeToken::of::<Employee>("Employee")
}

impl ModelObject for Employee {
    fn type_token(&self) -> TypeToken {
        employee_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "name" => Some(match &self.name {
                Some(value) => FieldView::Scalar(Scalar::Text(value.clone())),
                None => FieldView::Absent,
            }),
            "employer" => Some(match &self.employer {
                Some(handle) => FieldView::Handle(Arc::clone(handle)),
                None => FieldView::Absent,
            }),
            _ => None,
        }
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) -> bool {
        match (name, value) {
            ("name", Scalar::Text(value)) => {
                self.name = Some(value);
                true
            }
            _ => false,
        }
    }

    fn set_reference(&mut self, name: &str, value: ModelHandle) -> bool {
        if name == "employer" {
            self.employer = Some(value);
            true
        } else {
            false
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[derive(Default)]
pub struct Department {
    pub name: Option<String>,
    pub partners: Vec<ModelHandle>,
}

pub fn department_token() -> TypeToken {
    TypeToken::of::<Department>("Department")
}

impl ModelObject for Department {
    fn type_token(&self) -> TypeToken {
        department_token()
    }

    fn field(&self, name: &str) -> Option<FieldView<'_>> {
        match name {
            "name" => Some(match &self.name {
                Some(value) => FieldView::Scalar(Scalar::Text(value.clone())),
                None => FieldView::Absent,
            }),
            "partners" => Some(FieldView::Handles(
                self.partners.iter().map(Arc::clone).collect(),
            )),
            _ => None,
        }
    }

    fn set_scalar(&mut self, name: &str, value: Scalar) -> bool {
        match (name, value) {
            ("name", Scalar::Text(value)) => {
                self.name = Some(value);
                true
            }
            _ => false,
        }
    }

    fn insert_item(&mut self, name: &str, index: usize, item: CollectionItem) -> bool {
        match (name, item) {
            ("partners", CollectionItem::Handle(handle)) => {
                self.partners.insert(index, handle);
                true
            }
            _ => false,
        }
    }

    fn remove_item(&mut self, name: &str, index: usize) -> bool {
        if name == "partners" && index < self.partners.len() {
            self.partners.remove(index);
            true
        } else {
            false
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Template for a single by-reference association
pub fn employee_template() -> Template {
    let root = Node::object(
        employee_token(),
        vec![
            Node::value("name"),
            Node::reference("employer", company_token(), vec![Node::value("id")]),
        ],
    );
    let mut types = TypeRegistry::new();
    types.register::<Employee>(employee_token());
    types.register_opaque(company_token());
    Template::new(root, types).unwrap()
}

/// Template for a by-reference collection
pub fn department_template() -> Template {
    let root = Node::object(
        department_token(),
        vec![
            Node::value("name"),
            Node::array_of_references(
                "partners",
                Node::reference("partner", company_token(), vec![Node::value("id")]).detached(),
            ),
        ],
    );
    let mut types = TypeRegistry::new();
    types.register::<Department>(department_token());
    types.register_opaque(company_token());
    Template::new(root, types).unwrap()
}

/// Resolver locating companies by their id property
pub struct CompanyDirectory {
    companies: HashMap<i64, ModelHandle>,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self {
            companies: HashMap::new(),
        }
    }

    pub fn with(mut self, id: i64, company: ModelHandle) -> Self {
        self.companies.insert(id, company);
        self
    }
}

impl ReferenceResolver for CompanyDirectory {
    fn supports(&self, declared: TypeToken) -> bool {
        declared == company_token()
    }

    fn resolve(&self, _declared: TypeToken, entity: &ViewEntity) -> Result<Option<ModelHandle>> {
        Ok(entity
            .get("id")
            .and_then(Scalar::as_int)
            .and_then(|id| self.companies.get(&id).map(Arc::clone)))
    }
}

// ===== Recording list manager =====

/// Delegates to the accessor-backed builtin while recording the edit
/// sequence, so tests can assert minimal synchronization
#[derive(Default)]
pub struct RecordingListManager {
    pub ops: Mutex<Vec<String>>,
}

impl ListManager for RecordingListManager {
    fn supports(&self, _owner: TypeToken, _field: &str) -> bool {
        true
    }

    fn add(
        &self,
        owner: &mut dyn ModelObject,
        field: &str,
        index: usize,
        item: CollectionItem,
    ) -> Result<()> {
        self.ops.lock().unwrap().push(format!("add({})", index));
        AccessorListManager.add(owner, field, index, item)
    }

    fn remove(&self, owner: &mut dyn ModelObject, field: &str, index: usize) -> Result<()> {
        self.ops.lock().unwrap().push(format!("remove({})", index));
        AccessorListManager.remove(owner, field, index)
    }
}
