//! The item-tree walk: one Java compilation unit per class, function and
//! package-level variable, mirroring the package hierarchy on disk.

use std::fs;
use std::path::{Path, PathBuf};

use casey_diagnostic::{Diagnostic, DiagnosticList, ErrorCode, Origin};
use casey_ir::{ItemId, ItemKind, ItemTree};
use casey_structure::{graph_diagnostic, structure, validate};
use casey_types::{check_function, resolve_type_name, Type};
use rustc_hash::FxHashSet;

use crate::expr::quote;
use crate::stmt::render_stmt;
use crate::types::{initializer, java_type};
use crate::writer::SourceWriter;
use crate::EmitError;

/// Settings for one generation run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Full dotted path of the entry function (gets the `main` method).
    pub entry_function: String,
    /// `key=value` parameters for the entry function's `main` call.
    pub parameters: Vec<(String, String)>,
    /// Skip all Javadoc and `comments.html` output.
    pub ignore_comments: bool,
    /// Directory the package tree is written into.
    pub output_root: PathBuf,
}

/// Generate Java sources for the whole tree.
///
/// Functions in `broken` (load failures) are skipped; all other units are
/// attempted even when one of them fails, and every diagnostic is
/// collected into the returned list.
pub fn generate(
    tree: &ItemTree,
    root: ItemId,
    broken: &FxHashSet<ItemId>,
    options: &GenerateOptions,
) -> DiagnosticList {
    let mut generator = Generator {
        tree,
        broken,
        options,
        diagnostics: DiagnosticList::new(),
    };
    generator.item(root, Path::new(""));
    generator.diagnostics
}

struct Generator<'a> {
    tree: &'a ItemTree,
    broken: &'a FxHashSet<ItemId>,
    options: &'a GenerateOptions,
    diagnostics: DiagnosticList,
}

impl Generator<'_> {
    fn error(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn item(&mut self, id: ItemId, current: &Path) {
        match self.tree[id].kind {
            ItemKind::Project => self.project(id, current),
            ItemKind::Package => self.package(id, current),
            ItemKind::Class => self.class(id, current),
            ItemKind::Function => self.function(id, current),
            ItemKind::Variable => self.variable(id, current),
            ItemKind::Parameter => {
                self.error(
                    Diagnostic::error(ErrorCode::C0002)
                        .with_message("parameters are not allowed outside of functions")
                        .with_label(Origin::item(self.tree.full_name(id)), ""),
                );
            }
        }
    }

    fn project(&mut self, id: ItemId, current: &Path) {
        let item = &self.tree[id];
        let Some(project_id) = item.project_id.clone() else {
            self.error(
                Diagnostic::error(ErrorCode::C0003)
                    .with_message(format!("project `{}` has no id", item.name))
                    .with_label(Origin::item(item.name.clone()), ""),
            );
            return;
        };

        let relative = current.join(&item.name);
        let directory = self.options.output_root.join(&relative);
        // Start from a clean output tree so removed items do not linger.
        if directory.exists() {
            if let Err(source) = fs::remove_dir_all(&directory) {
                self.io_error(&directory, source);
                return;
            }
        }
        if let Err(source) = fs::create_dir_all(&directory) {
            self.io_error(&directory, source);
            return;
        }
        if let Err(source) = fs::write(directory.join("id.txt"), format!("{project_id}\n")) {
            self.io_error(&directory.join("id.txt"), source);
            return;
        }
        self.write_comments(id, &directory);

        tracing::debug!(project = %item.name, "generating project");
        for &child in &self.tree[id].children.clone() {
            self.item(child, &relative);
        }
    }

    fn package(&mut self, id: ItemId, current: &Path) {
        let relative = current.join(&self.tree[id].name);
        let directory = self.options.output_root.join(&relative);
        if let Err(source) = fs::create_dir_all(&directory) {
            self.io_error(&directory, source);
            return;
        }
        self.write_comments(id, &directory);
        for &child in &self.tree[id].children.clone() {
            self.item(child, &relative);
        }
    }

    fn class(&mut self, id: ItemId, current: &Path) {
        let name = self.tree[id].name.clone();
        let mut writer = SourceWriter::new();
        self.unit_header(current, &mut writer);
        self.javadoc(id, &mut writer);
        writer.open(&format!("public class {name}"));

        for &child in &self.tree[id].children {
            if self.tree[child].kind != ItemKind::Variable {
                continue;
            }
            let Some(field_type) = self.member_type(child) else {
                return;
            };
            self.javadoc(child, &mut writer);
            writer.line(&format!(
                "public {} {} = {};",
                java_type(&field_type),
                self.tree[child].name,
                initializer(&field_type)
            ));
        }

        for &child in &self.tree[id].children {
            if self.tree[child].kind != ItemKind::Function {
                continue;
            }
            if !self.method(child, false, &mut writer) {
                return;
            }
        }

        writer.close();
        self.write_unit(current, &name, writer);
    }

    fn variable(&mut self, id: ItemId, current: &Path) {
        let name = self.tree[id].name.clone();
        let Some(field_type) = self.member_type(id) else {
            return;
        };
        let mut writer = SourceWriter::new();
        self.unit_header(current, &mut writer);
        writer.open(&format!("public class {name}"));
        self.javadoc(id, &mut writer);
        writer.line(&format!(
            "public static {} {} = {};",
            java_type(&field_type),
            name,
            initializer(&field_type)
        ));
        writer.close();
        self.write_unit(current, &name, writer);
    }

    fn function(&mut self, id: ItemId, current: &Path) {
        let name = self.tree[id].name.clone();
        let mut writer = SourceWriter::new();
        self.unit_header(current, &mut writer);
        writer.open(&format!("public class {name}"));
        if !self.method(id, true, &mut writer) {
            return;
        }
        if self.tree.full_name(id) == self.options.entry_function
            && !self.main_method(id, &name, &mut writer)
        {
            return;
        }
        writer.close();
        self.write_unit(current, &name, writer);
    }

    /// Render one function as a method into `writer`. Returns false (with
    /// diagnostics pushed) when the function cannot be emitted.
    fn method(&mut self, id: ItemId, is_static: bool, writer: &mut SourceWriter) -> bool {
        if self.broken.contains(&id) {
            // Load already reported why; skip the body, fail the unit.
            return false;
        }
        let path = self.tree.full_name(id);

        let return_type = match &self.tree[id].return_type {
            Some(name) => match resolve_type_name(self.tree, name) {
                Ok(ty) => ty,
                Err(error) => {
                    self.error(error.to_diagnostic(Origin::item(path)));
                    return false;
                }
            },
            None => Type::Void,
        };

        let mut parameters = Vec::new();
        for child in self.tree.children_of_kind(id, ItemKind::Parameter) {
            let Some(parameter_type) = self.member_type(child) else {
                return false;
            };
            parameters.push(format!(
                "{} {}",
                java_type(&parameter_type),
                self.tree[child].name
            ));
        }

        self.javadoc_with_params(id, writer);
        let modifiers = if is_static { "public static" } else { "public" };
        writer.open(&format!(
            "{modifiers} {} {}({})",
            java_type(&return_type),
            self.tree[id].name,
            parameters.join(", ")
        ));

        for child in self.tree.children_of_kind(id, ItemKind::Variable) {
            let Some(local_type) = self.member_type(child) else {
                return false;
            };
            writer.line(&format!(
                "{} {} = {};",
                java_type(&local_type),
                self.tree[child].name,
                initializer(&local_type)
            ));
        }

        if let Some(graph) = &self.tree[id].blocks {
            if let Err(errors) = validate(graph) {
                for error in &errors {
                    self.diagnostics.push(graph_diagnostic(error, &path));
                }
                return false;
            }
            let stmt = match structure(graph) {
                Ok(stmt) => stmt,
                Err(error) => {
                    self.error(error.to_diagnostic(&path));
                    return false;
                }
            };
            if let Err(error) = check_function(self.tree, id) {
                self.error(
                    error
                        .error
                        .to_diagnostic(Origin::block(path.clone(), error.block_uid)),
                );
                return false;
            }
            if let Err(error) = render_stmt(self.tree, &path, &stmt, writer) {
                self.error(error.to_diagnostic());
                return false;
            }
        }

        writer.close();
        true
    }

    /// Add the `main` method calling the entry function with the values
    /// supplied on the command line.
    fn main_method(&mut self, id: ItemId, class_name: &str, writer: &mut SourceWriter) -> bool {
        let path = self.tree.full_name(id);
        let mut arguments = Vec::new();
        for parameter in self.tree.children_of_kind(id, ItemKind::Parameter) {
            let parameter_name = &self.tree[parameter].name;
            let Some(value) = self
                .options
                .parameters
                .iter()
                .find(|(key, _)| key == parameter_name)
                .map(|(_, value)| value)
            else {
                let expected: Vec<&str> = self
                    .tree
                    .children_of_kind(id, ItemKind::Parameter)
                    .iter()
                    .map(|&p| self.tree[p].name.as_str())
                    .collect();
                self.error(
                    Diagnostic::error(ErrorCode::C4004)
                        .with_message(format!(
                            "entry function `{path}` expects parameters ({})",
                            expected.join(", ")
                        ))
                        .with_label(Origin::item(path.clone()), format!("`{parameter_name}` not supplied"))
                        .with_note("pass values with -pa name=value"),
                );
                return false;
            };
            let rendered =
                if self.tree[parameter].declared_type == Some(casey_ir::TypeName::Text) {
                    quote(value)
                } else {
                    value.clone()
                };
            arguments.push(rendered);
        }
        writer.blank_line();
        writer.open("public static void main(String[] args)");
        writer.line(&format!(
            "{class_name}.{}({});",
            self.tree[id].name,
            arguments.join(", ")
        ));
        writer.close();
        true
    }

    /// Resolved declared type of a variable or parameter, or a pushed
    /// diagnostic and `None`.
    fn member_type(&mut self, id: ItemId) -> Option<Type> {
        let path = self.tree.full_name(id);
        let Some(declared) = self.tree[id].declared_type.clone() else {
            self.error(
                Diagnostic::error(ErrorCode::C0005)
                    .with_message(format!(
                        "{} `{path}` has no type",
                        self.tree[id].kind
                    ))
                    .with_label(Origin::item(path.clone()), ""),
            );
            return None;
        };
        match resolve_type_name(self.tree, &declared) {
            Ok(ty) => Some(ty),
            Err(error) => {
                self.error(error.to_diagnostic(Origin::item(path)));
                None
            }
        }
    }

    // ----- Output helpers -------------------------------------------------

    fn unit_header(&self, current: &Path, writer: &mut SourceWriter) {
        let package = java_package(current);
        if !package.is_empty() {
            writer.line(&format!("package {package};"));
            writer.blank_line();
        }
    }

    fn javadoc(&self, id: ItemId, writer: &mut SourceWriter) {
        if self.options.ignore_comments || self.tree[id].comments.is_empty() {
            return;
        }
        writer.line("/**");
        for line in self.tree[id].comments.lines() {
            writer.line(&format!(" * {line}"));
        }
        writer.line(" */");
    }

    fn javadoc_with_params(&self, id: ItemId, writer: &mut SourceWriter) {
        if self.options.ignore_comments {
            return;
        }
        let comments = &self.tree[id].comments;
        let parameters: Vec<ItemId> = self
            .tree
            .children_of_kind(id, ItemKind::Parameter)
            .into_iter()
            .filter(|&p| !self.tree[p].comments.is_empty())
            .collect();
        if comments.is_empty() && parameters.is_empty() {
            return;
        }
        writer.line("/**");
        for line in comments.lines() {
            writer.line(&format!(" * {line}"));
        }
        for parameter in parameters {
            writer.line(&format!(
                " * @param {} {}",
                self.tree[parameter].name,
                self.tree[parameter].comments.lines().collect::<Vec<_>>().join(" ")
            ));
        }
        writer.line(" */");
    }

    fn write_comments(&mut self, id: ItemId, directory: &Path) {
        if self.options.ignore_comments || self.tree[id].comments.is_empty() {
            return;
        }
        let path = directory.join("comments.html");
        if let Err(source) = fs::write(&path, &self.tree[id].comments) {
            self.io_error(&path, source);
        }
    }

    fn write_unit(&mut self, current: &Path, name: &str, writer: SourceWriter) {
        let directory = self.options.output_root.join(current);
        if let Err(source) = fs::create_dir_all(&directory) {
            self.io_error(&directory, source);
            return;
        }
        let path = directory.join(format!("{name}.java"));
        tracing::debug!(unit = %path.display(), "writing source unit");
        if let Err(source) = fs::write(&path, writer.output()) {
            self.io_error(&path, source);
        }
    }

    fn io_error(&mut self, path: &Path, source: std::io::Error) {
        self.error(
            EmitError::Io {
                path: path.to_path_buf(),
                source,
            }
            .to_diagnostic(),
        );
    }
}

/// Directory path to Java package name: `Prj/util` → `Prj.util`.
fn java_package(current: &Path) -> String {
    current
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests;
