//! Template roles and source dialects.

/// Directory prefix for reusable tags.
pub const TAG_DIRECTORY: &str = "tag/";

/// Directory prefix for layouts.
pub const LAYOUT_DIRECTORY: &str = "layout/";

/// Role of a template, derived from its directory prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateType {
    /// Root-renderable template invoked directly by application code.
    Template,
    /// Reusable fragment invoked from other templates.
    Tag,
    /// Wrapper template that other templates render into.
    Layout,
}

impl TemplateType {
    /// Classify a template name by its directory prefix.
    pub fn of(name: &str) -> Self {
        if name.starts_with(TAG_DIRECTORY) {
            Self::Tag
        } else if name.starts_with(LAYOUT_DIRECTORY) {
            Self::Layout
        } else {
            Self::Template
        }
    }

    /// Directory prefix of this role (empty for plain templates).
    pub const fn directory(self) -> &'static str {
        match self {
            Self::Template => "",
            Self::Tag => TAG_DIRECTORY,
            Self::Layout => LAYOUT_DIRECTORY,
        }
    }

    /// Canonical template name for a dotted simple name.
    ///
    /// `TemplateType::Tag.resolve_name("forms.input", "jte")` is `tag/forms/input.jte`.
    pub fn resolve_name(self, simple_name: &str, extension: &str) -> String {
        format!(
            "{}{}.{}",
            self.directory(),
            simple_name.replace('.', "/"),
            extension
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Tag => "tag",
            Self::Layout => "layout",
        }
    }
}

/// Source dialect of a template, determines the generated target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `.jte` sources, generated as `.java` units.
    Jte,
    /// `.kte` sources, generated as `.kt` units.
    Kte,
}

impl Dialect {
    /// Detect dialect from a source extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jte" => Some(Self::Jte),
            "kte" => Some(Self::Kte),
            _ => None,
        }
    }

    /// Detect dialect from a template name, defaulting to `Jte`.
    pub fn from_name(name: &str) -> Self {
        name.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(Self::Jte)
    }

    /// Source file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jte => "jte",
            Self::Kte => "kte",
        }
    }

    /// Extension of the generated unit, used to pick a backend.
    pub const fn target_extension(self) -> &'static str {
        match self {
            Self::Jte => "java",
            Self::Kte => "kt",
        }
    }

    /// The other supported dialect, tried when a tag is not found.
    pub const fn alternate(self) -> Self {
        match self {
            Self::Jte => Self::Kte,
            Self::Kte => Self::Jte,
        }
    }

    /// Check if a file name has a template extension.
    #[inline]
    pub fn is_template_file(file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| Self::from_extension(ext).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_type_of() {
        assert_eq!(TemplateType::of("page.jte"), TemplateType::Template);
        assert_eq!(TemplateType::of("tag/nav.jte"), TemplateType::Tag);
        assert_eq!(TemplateType::of("layout/main.kte"), TemplateType::Layout);
        // Prefix must be a directory, not a file name
        assert_eq!(TemplateType::of("tagline.jte"), TemplateType::Template);
    }

    #[test]
    fn test_resolve_name() {
        assert_eq!(
            TemplateType::Tag.resolve_name("forms.input", "jte"),
            "tag/forms/input.jte"
        );
        assert_eq!(
            TemplateType::Layout.resolve_name("main", "kte"),
            "layout/main.kte"
        );
    }

    #[test]
    fn test_dialect() {
        assert_eq!(Dialect::from_name("tag/nav.kte"), Dialect::Kte);
        assert_eq!(Dialect::from_name("page.jte"), Dialect::Jte);
        assert_eq!(Dialect::from_name("README"), Dialect::Jte);
        assert_eq!(Dialect::Jte.alternate(), Dialect::Kte);
        assert_eq!(Dialect::Kte.target_extension(), "kt");
        assert!(Dialect::is_template_file("page.kte"));
        assert!(!Dialect::is_template_file("page.html"));
    }
}
