//! Bottom-up type checking of statement trees and function bodies.

use casey_ir::{
    BlockKind, Expr, ItemId, ItemKind, ItemTree, OperatorKind, TypeName, ValueKind,
};

use crate::signature::{signature, OperandRule};
use crate::{resolve_type_name, Type, TypeError};

/// Compute the static type of a statement tree.
///
/// Pure and idempotent: the tree is never mutated, so re-running yields the
/// same type (or the same error).
pub fn type_of(tree: &ItemTree, expr: &Expr) -> Result<Type, TypeError> {
    match expr {
        Expr::Value(value) => type_of_value(tree, value),
        Expr::Operator { op, operands } => type_of_operator(tree, *op, operands),
        Expr::Call { segments } => type_of_call(tree, segments),
    }
}

fn type_of_value(tree: &ItemTree, value: &ValueKind) -> Result<Type, TypeError> {
    Ok(match value {
        ValueKind::Number(_) => Type::Number,
        ValueKind::Boolean(_) => Type::Boolean,
        ValueKind::Text(_) => Type::Text,
        ValueKind::Object(path) => {
            resolve_type_name(tree, &TypeName::Object(path.clone()))?
        }
    })
}

fn type_of_operator(
    tree: &ItemTree,
    op: OperatorKind,
    operands: &[Expr],
) -> Result<Type, TypeError> {
    let sig = signature(op);
    if !sig.arity.allows(operands.len()) {
        return Err(TypeError::ArityMismatch {
            op,
            expected: sig.arity,
            found: operands.len(),
        });
    }

    let mut first: Option<Type> = None;
    for (position, operand) in operands.iter().enumerate() {
        let index = position + 1;
        let found = type_of(tree, operand)?;
        if found.is_void() {
            return Err(TypeError::OperandVoid { op, index });
        }
        match sig.operands {
            OperandRule::Numeric if found != Type::Number => {
                return Err(TypeError::OperandMismatch {
                    op,
                    index,
                    expected: Type::Number,
                    found,
                });
            }
            OperandRule::Boolean if found != Type::Boolean => {
                return Err(TypeError::OperandMismatch {
                    op,
                    index,
                    expected: Type::Boolean,
                    found,
                });
            }
            OperandRule::Text if found != Type::Text => {
                return Err(TypeError::OperandMismatch {
                    op,
                    index,
                    expected: Type::Text,
                    found,
                });
            }
            OperandRule::Uniform => match &first {
                Some(expected) if *expected != found => {
                    return Err(TypeError::OperandMismatch {
                        op,
                        index,
                        expected: expected.clone(),
                        found,
                    });
                }
                _ => first = Some(found),
            },
            _ => {}
        }
    }
    Ok(sig.result)
}

fn type_of_call(tree: &ItemTree, segments: &[casey_ir::CallSegment]) -> Result<Type, TypeError> {
    let Some(first) = segments.first() else {
        return Err(TypeError::EmptyCall);
    };
    let mut current = segment_type(tree, first)?;
    for segment in &segments[1..] {
        // The previous segment must have produced an object whose class
        // actually contains this segment's item.
        let Type::Object(class_path) = &current else {
            return Err(TypeError::NotAnObject {
                path: tree.full_name(segments[0].item),
                found: current,
            });
        };
        let class_id = tree
            .resolve(class_path)
            .ok_or_else(|| TypeError::UnknownType {
                name: class_path.clone(),
            })?;
        if tree[segment.item].parent != Some(class_id) {
            return Err(TypeError::NotAMember {
                class: class_path.clone(),
                path: tree.full_name(segment.item),
            });
        }
        current = segment_type(tree, segment)?;
    }
    Ok(current)
}

fn segment_type(tree: &ItemTree, segment: &casey_ir::CallSegment) -> Result<Type, TypeError> {
    let item = &tree[segment.item];
    match item.kind {
        ItemKind::Variable | ItemKind::Parameter => {
            let declared = item.declared_type.as_ref().ok_or_else(|| TypeError::UnknownType {
                name: tree.full_name(segment.item),
            })?;
            resolve_type_name(tree, declared)
        }
        ItemKind::Function => {
            check_arguments(tree, segment)?;
            match &item.return_type {
                Some(name) => resolve_type_name(tree, name),
                None => Ok(Type::Void),
            }
        }
        kind => Err(TypeError::NotCallable {
            path: tree.full_name(segment.item),
            kind,
        }),
    }
}

fn check_arguments(tree: &ItemTree, segment: &casey_ir::CallSegment) -> Result<(), TypeError> {
    let function = tree.full_name(segment.item);
    let parameters = tree.children_of_kind(segment.item, ItemKind::Parameter);
    if parameters.len() != segment.arguments.len() {
        return Err(TypeError::ArgCountMismatch {
            function,
            expected: parameters.len(),
            found: segment.arguments.len(),
        });
    }
    for (position, (&parameter, argument)) in
        parameters.iter().zip(&segment.arguments).enumerate()
    {
        let declared = tree[parameter]
            .declared_type
            .as_ref()
            .ok_or_else(|| TypeError::UnknownType {
                name: tree.full_name(parameter),
            })?;
        let expected = resolve_type_name(tree, declared)?;
        let found = type_of(tree, argument)?;
        if expected != found {
            return Err(TypeError::ArgMismatch {
                function,
                index: position + 1,
                expected,
                found,
            });
        }
    }
    Ok(())
}

/// A type error localized to one block of a function body.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockTypeError {
    pub block_uid: String,
    pub error: TypeError,
}

/// Check every block content of a function body.
///
/// Fatal on the first error, as later checks would only cascade from it.
pub fn check_function(tree: &ItemTree, function: ItemId) -> Result<(), BlockTypeError> {
    let Some(graph) = tree[function].blocks.as_ref() else {
        return Ok(());
    };
    let return_type = match &tree[function].return_type {
        Some(name) => resolve_type_name(tree, name).map_err(|error| BlockTypeError {
            block_uid: String::new(),
            error,
        })?,
        None => Type::Void,
    };

    let function_name = tree.full_name(function);
    for (_, block) in graph.blocks() {
        check_block(tree, block, &function_name, &return_type).map_err(|error| BlockTypeError {
            block_uid: block.uid.clone(),
            error,
        })?;
    }
    tracing::debug!(function = %tree.full_name(function), "function type-checked");
    Ok(())
}

fn check_block(
    tree: &ItemTree,
    block: &casey_ir::Block,
    function_name: &str,
    return_type: &Type,
) -> Result<(), TypeError> {
    let content = block.content.as_ref();
    let statement = content.and_then(|c| c.statement.as_ref());
    let variable = content.and_then(|c| c.variable);

    match block.kind {
        BlockKind::Start => Ok(()),
        BlockKind::Decision => {
            let statement = statement.ok_or(TypeError::MissingStatement { kind: block.kind })?;
            let found = type_of(tree, statement)?;
            if found != Type::Boolean {
                return Err(TypeError::ConditionNotBoolean { found });
            }
            Ok(())
        }
        BlockKind::Call => {
            let statement = statement.ok_or(TypeError::MissingStatement { kind: block.kind })?;
            type_of(tree, statement)?;
            Ok(())
        }
        BlockKind::Assignment => {
            let statement = statement.ok_or(TypeError::MissingStatement { kind: block.kind })?;
            let variable = variable.ok_or(TypeError::MissingVariable { kind: block.kind })?;
            let expected = declared_type(tree, variable)?;
            let found = type_of(tree, statement)?;
            if expected != found {
                return Err(TypeError::AssignMismatch {
                    variable: tree.full_name(variable),
                    expected,
                    found,
                });
            }
            Ok(())
        }
        BlockKind::Input => {
            let variable = variable.ok_or(TypeError::MissingVariable { kind: block.kind })?;
            let found = declared_type(tree, variable)?;
            if !matches!(found, Type::Boolean | Type::Number | Type::Text) {
                return Err(TypeError::InputTypeNotAllowed {
                    variable: tree.full_name(variable),
                    found,
                });
            }
            Ok(())
        }
        BlockKind::Output => {
            let statement = statement.ok_or(TypeError::MissingStatement { kind: block.kind })?;
            let found = type_of(tree, statement)?;
            if found.is_void() {
                return Err(TypeError::OutputVoid);
            }
            Ok(())
        }
        BlockKind::End => match statement {
            Some(statement) => {
                let found = type_of(tree, statement)?;
                if found != *return_type {
                    return Err(TypeError::ReturnMismatch {
                        function: function_name.to_owned(),
                        expected: return_type.clone(),
                        found,
                    });
                }
                Ok(())
            }
            None if return_type.is_void() => Ok(()),
            None => Err(TypeError::ReturnMismatch {
                function: function_name.to_owned(),
                expected: return_type.clone(),
                found: Type::Void,
            }),
        },
    }
}

fn declared_type(tree: &ItemTree, variable: ItemId) -> Result<Type, TypeError> {
    let declared = tree[variable]
        .declared_type
        .as_ref()
        .ok_or_else(|| TypeError::UnknownType {
            name: tree.full_name(variable),
        })?;
    resolve_type_name(tree, declared)
}
