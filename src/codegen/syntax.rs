//! Target-language syntax for generated units.

use std::fmt::Write;

use crate::core::{ClassInfo, Dialect, ParamInfo};

/// Class name of the output sink passed to every `render`.
const OUTPUT_TYPE: &str = "TemplateOutput";

/// Class name of the binary payload accessor.
const BINARY_TYPE: &str = "BinaryContent";

/// Syntax of one target language.
#[derive(Debug, Clone, Copy)]
pub(super) struct Syntax {
    dialect: Dialect,
}

impl Syntax {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Statement terminator.
    pub fn terminator(self) -> &'static str {
        match self.dialect {
            Dialect::Jte => ";",
            Dialect::Kte => "",
        }
    }

    /// Quote `text` as a string literal.
    pub fn string_literal(self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('"');
        for c in text.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '$' if self.dialect == Dialect::Kte => out.push_str("\\$"),
                c if c.is_control() => {
                    let _ = write!(out, "\\u{:04x}", c as u32);
                }
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }

    /// Package, imports, class declaration and `render` signature.
    pub fn open_class(
        self,
        info: &ClassInfo,
        imports: &[String],
        params: &[ParamInfo],
        runtime_package: &str,
        binary_lengths: &[usize],
    ) -> String {
        let t = self.terminator();
        let output_type = qualify(runtime_package, OUTPUT_TYPE);
        let mut out = String::new();

        if !info.package_name.is_empty() {
            let _ = writeln!(out, "package {}{t}\n", info.package_name);
        }
        for import in imports {
            let _ = writeln!(out, "import {import}{t}");
        }
        if !imports.is_empty() {
            out.push('\n');
        }

        let name = self.string_literal(&info.name);
        let binary = (!binary_lengths.is_empty()).then(|| {
            let lengths: String = binary_lengths.iter().map(|n| format!(", {n}")).collect();
            let file = self.string_literal(&format!("{}.bin", info.class_name));
            (qualify(runtime_package, BINARY_TYPE), file, lengths)
        });

        match self.dialect {
            Dialect::Jte => {
                let _ = writeln!(out, "public final class {} {{", info.class_name);
                let _ = writeln!(out, "\tpublic static final String NAME = {name};");
                if let Some((binary_type, file, lengths)) = binary {
                    let _ = writeln!(
                        out,
                        "\tprivate static final {binary_type} BINARY = {binary_type}.load({}.class, {file}{lengths});",
                        info.class_name
                    );
                }
                let params: String = params
                    .iter()
                    .map(|p| format!(", {} {}", p.type_name, p.name))
                    .collect();
                let _ = writeln!(
                    out,
                    "\tpublic static void render({output_type} output{params}) {{"
                );
            }
            Dialect::Kte => {
                let _ = writeln!(out, "object {} {{", info.class_name);
                let _ = writeln!(out, "\tconst val NAME = {name}");
                if let Some((binary_type, file, lengths)) = binary {
                    let _ = writeln!(
                        out,
                        "\tprivate val BINARY = {binary_type}.load({}::class.java, {file}{lengths})",
                        info.class_name
                    );
                }
                let params: String = params
                    .iter()
                    .map(|p| format!(", {}: {}", p.name, p.type_name))
                    .collect();
                let _ = writeln!(
                    out,
                    "\t@JvmStatic fun render(output: {output_type}{params}) {{"
                );
            }
        }

        out
    }

    /// Close the `render` body and the class.
    pub fn close_class(self) -> &'static str {
        "\t}\n}\n"
    }
}

fn qualify(package: &str, class: &str) -> String {
    if package.is_empty() {
        class.to_string()
    } else {
        format!("{package}.{class}")
    }
}
