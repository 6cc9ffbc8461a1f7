//! Per-template compile metadata.

use super::kind::{Dialect, TemplateType};

/// Prefix of every generated class name.
const CLASS_PREFIX_JTE: &str = "Jte";
const CLASS_PREFIX_KTE: &str = "Kte";

/// Suffix of every generated class name.
const CLASS_SUFFIX: &str = "Generated";

/// Compile metadata derived from a template name.
///
/// Derivation is deterministic: the same name and base package always yield
/// the same package, class name and file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassInfo {
    /// Template name, e.g. `tag/nav.jte`.
    pub name: String,
    pub role: TemplateType,
    pub dialect: Dialect,
    /// Package of the generated unit, e.g. `gg.stencil.generated.tag`.
    pub package_name: String,
    /// Simple class name, e.g. `JtenavGenerated`.
    pub class_name: String,
    /// Fully qualified name, `package_name.class_name`.
    pub full_name: String,
}

impl ClassInfo {
    pub fn new(name: &str, base_package: &str) -> Self {
        let dialect = Dialect::from_name(name);
        let stem = name
            .rsplit_once('.')
            .map_or(name, |(stem, _)| stem);

        let (directory, simple) = match stem.rsplit_once('/') {
            Some((dir, simple)) => (Some(dir), simple),
            None => (None, stem),
        };

        let mut package_name = base_package.to_string();
        for segment in directory.into_iter().flat_map(|d| d.split('/')) {
            if segment.is_empty() {
                continue;
            }
            if !package_name.is_empty() {
                package_name.push('.');
            }
            package_name.push_str(&sanitize_identifier(segment));
        }

        let prefix = match dialect {
            Dialect::Jte => CLASS_PREFIX_JTE,
            Dialect::Kte => CLASS_PREFIX_KTE,
        };
        let class_name = format!("{prefix}{}{CLASS_SUFFIX}", sanitize_identifier(simple));

        let full_name = if package_name.is_empty() {
            class_name.clone()
        } else {
            format!("{package_name}.{class_name}")
        };

        Self {
            name: name.to_string(),
            role: TemplateType::of(name),
            dialect,
            package_name,
            class_name,
            full_name,
        }
    }

    /// Extension of the generated unit (`java` or `kt`).
    #[inline]
    pub const fn target_extension(&self) -> &'static str {
        self.dialect.target_extension()
    }

    /// Package as a relative directory, e.g. `gg/stencil/generated/tag`.
    pub fn package_directory(&self) -> String {
        self.package_name.replace('.', "/")
    }

    /// Relative path of the generated source file.
    pub fn source_file_name(&self) -> String {
        self.relative_file(self.target_extension())
    }

    /// Relative path of the binary text payload.
    pub fn binary_file_name(&self) -> String {
        self.relative_file("bin")
    }

    fn relative_file(&self, extension: &str) -> String {
        if self.package_name.is_empty() {
            format!("{}.{extension}", self.class_name)
        } else {
            format!("{}/{}.{extension}", self.package_directory(), self.class_name)
        }
    }
}

/// Replace characters that are not valid in an identifier.
fn sanitize_identifier(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Where a template reference was found, used to annotate lookup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfo {
    /// Name of the referencing template.
    pub name: String,
    /// 1-based source line of the reference.
    pub line: usize,
}

impl DebugInfo {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

impl std::fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.line)
    }
}

/// One declared template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub type_name: String,
    /// Default value expression, applied at call sites that omit the argument.
    pub default: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_class_info() {
        let info = ClassInfo::new("page.jte", "gg.stencil.generated");
        assert_eq!(info.role, TemplateType::Template);
        assert_eq!(info.package_name, "gg.stencil.generated");
        assert_eq!(info.class_name, "JtepageGenerated");
        assert_eq!(info.full_name, "gg.stencil.generated.JtepageGenerated");
        assert_eq!(
            info.source_file_name(),
            "gg/stencil/generated/JtepageGenerated.java"
        );
    }

    #[test]
    fn test_nested_tag_class_info() {
        let info = ClassInfo::new("tag/forms/text-input.kte", "app");
        assert_eq!(info.role, TemplateType::Tag);
        assert_eq!(info.dialect, Dialect::Kte);
        assert_eq!(info.package_name, "app.tag.forms");
        assert_eq!(info.class_name, "Ktetext_inputGenerated");
        assert_eq!(info.source_file_name(), "app/tag/forms/Ktetext_inputGenerated.kt");
        assert_eq!(info.binary_file_name(), "app/tag/forms/Ktetext_inputGenerated.bin");
    }

    #[test]
    fn test_dialects_do_not_collide() {
        let jte = ClassInfo::new("page.jte", "app");
        let kte = ClassInfo::new("page.kte", "app");
        assert_ne!(jte.full_name, kte.full_name);
    }

    #[test]
    fn test_empty_base_package() {
        let info = ClassInfo::new("page.jte", "");
        assert_eq!(info.package_name, "");
        assert_eq!(info.full_name, "JtepageGenerated");
        assert_eq!(info.source_file_name(), "JtepageGenerated.java");
    }

    #[test]
    fn test_debug_info_display() {
        assert_eq!(DebugInfo::new("page.jte", 12).to_string(), "page.jte:12");
    }
}
