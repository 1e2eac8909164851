//! The resolved type of a value or item.

use std::fmt;

use casey_ir::{ItemKind, ItemTree, TypeName};

use crate::TypeError;

/// A resolved type.
///
/// `Object` carries the full dotted path of the class item it resolved to.
/// `Undefined` only occurs while a document is still loading; a tree that
/// loaded successfully never exposes it to the checker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Number,
    Text,
    Void,
    Object(String),
    Undefined,
}

impl Type {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Boolean | Type::Number | Type::Text | Type::Void)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => write!(f, "BOOLEAN"),
            Type::Number => write!(f, "NUMBER"),
            Type::Text => write!(f, "TEXT"),
            Type::Void => write!(f, "VOID"),
            Type::Object(path) => write!(f, "{path}"),
            Type::Undefined => write!(f, "<undefined>"),
        }
    }
}

/// Resolve a syntactic type name against the item tree.
///
/// Primitive names map directly; an object name must resolve to a class
/// item by its dotted path.
pub fn resolve_type_name(tree: &ItemTree, name: &TypeName) -> Result<Type, TypeError> {
    match name {
        TypeName::Boolean => Ok(Type::Boolean),
        TypeName::Number => Ok(Type::Number),
        TypeName::Text => Ok(Type::Text),
        TypeName::Void => Ok(Type::Void),
        TypeName::Object(path) => match tree.resolve(path) {
            Some(id) if tree[id].kind == ItemKind::Class => Ok(Type::Object(path.clone())),
            _ => Err(TypeError::UnknownType { name: path.clone() }),
        },
        TypeName::Undefined => Err(TypeError::UnknownType {
            name: "<undefined>".to_owned(),
        }),
    }
}
