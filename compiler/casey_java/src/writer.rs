//! Indentation-aware source text builder.

/// Builds Java source text line by line, tracking the indent level.
#[derive(Default)]
pub struct SourceWriter {
    buffer: String,
    indent: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one indented line.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent * 4 {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Append raw text without indentation or newline.
    pub fn raw(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    /// Append a line ending in `{` and indent the following lines.
    pub fn open(&mut self, text: &str) {
        self.line(&format!("{text} {{"));
        self.indent += 1;
    }

    /// Dedent and close with `}`.
    pub fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    /// Close the current block with a chaining line (e.g. `} catch (...) {`)
    /// and keep indenting for the chained block's body.
    pub fn close_with(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
        self.indent += 1;
    }

    pub fn indent_level(&self) -> usize {
        self.indent
    }

    pub fn output(mut self) -> String {
        if !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_are_indented_by_level() {
        let mut writer = SourceWriter::new();
        writer.open("public class Foo");
        writer.line("int x = 0;");
        writer.close();
        assert_eq!(writer.output(), "public class Foo {\n    int x = 0;\n}\n");
    }

    #[test]
    fn close_with_keeps_the_level_for_chained_blocks() {
        let mut writer = SourceWriter::new();
        writer.open("try");
        writer.line("work();");
        writer.close_with("} catch (Exception e) {");
        writer.line("recover();");
        writer.close();
        assert_eq!(
            writer.output(),
            "try {\n    work();\n} catch (Exception e) {\n    recover();\n}\n"
        );
    }

    #[test]
    fn output_ends_with_a_single_newline() {
        let mut writer = SourceWriter::new();
        writer.line("x();");
        assert_eq!(writer.output(), "x();\n");
    }
}
