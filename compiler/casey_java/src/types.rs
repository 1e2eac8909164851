//! Java spellings of Casey types.

use casey_types::Type;

/// The Java type name: primitives map to `boolean`/`double`/`String`/`void`,
/// object types to their fully qualified class name.
pub fn java_type(ty: &Type) -> String {
    match ty {
        Type::Boolean => "boolean".to_owned(),
        Type::Number => "double".to_owned(),
        Type::Text => "String".to_owned(),
        Type::Void => "void".to_owned(),
        Type::Object(path) => path.clone(),
        Type::Undefined => "Object".to_owned(),
    }
}

/// The default initializer keeping every field and local non-null.
pub fn initializer(ty: &Type) -> String {
    match ty {
        Type::Boolean => "false".to_owned(),
        Type::Number => "0.0".to_owned(),
        Type::Text => "\"\"".to_owned(),
        Type::Object(path) => format!("new {path}()"),
        Type::Void | Type::Undefined => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn primitive_spellings() {
        assert_eq!(java_type(&Type::Boolean), "boolean");
        assert_eq!(java_type(&Type::Number), "double");
        assert_eq!(java_type(&Type::Text), "String");
        assert_eq!(java_type(&Type::Void), "void");
        assert_eq!(java_type(&Type::Object("Prj.Point".to_owned())), "Prj.Point");
    }

    #[test]
    fn initializers_avoid_null() {
        assert_eq!(initializer(&Type::Boolean), "false");
        assert_eq!(initializer(&Type::Number), "0.0");
        assert_eq!(initializer(&Type::Text), "\"\"");
        assert_eq!(
            initializer(&Type::Object("Prj.Point".to_owned())),
            "new Prj.Point()"
        );
    }
}
