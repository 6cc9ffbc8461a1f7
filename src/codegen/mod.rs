//! Template parsing and target source generation.
//!
//! # Module Structure
//!
//! ```text
//! codegen/
//! ├── parser.rs   # TemplateParser: source text → structural events
//! ├── source.rs   # SourceGenerator: events → one generated unit
//! ├── syntax.rs   # Per-dialect target syntax (java / kotlin)
//! └── mod.rs      # Contracts and the generated unit collection (this file)
//! ```
//!
//! The parser drives a [`UnitGenerator`]. When the generator meets a tag or
//! layout call it asks its [`GenerationHost`] to generate the callee first,
//! which recursively parses into the same unit collection.

mod parser;
mod source;
mod syntax;

pub use parser::TemplateParser;
pub use source::SourceGenerator;

use indexmap::IndexMap;

use crate::core::{ClassInfo, DebugInfo, ParamInfo, Result, TemplateType};

// ============================================================================
// Contracts
// ============================================================================

/// Consumer of parser events, producing the code of one unit.
pub trait UnitGenerator {
    fn on_import(&mut self, import: &str);

    fn on_param(&mut self, param: ParamInfo);

    /// All header parameters have been reported.
    fn on_params_complete(&mut self);

    fn on_text(&mut self, text: &str);

    /// `${expression}` output.
    fn on_output(&mut self, expression: &str, line: usize);

    /// `!{statement}` code.
    fn on_statement(&mut self, statement: &str, line: usize);

    /// `@tag.name(args)` or `@layout.name(args)` call.
    fn on_call(
        &mut self,
        role: TemplateType,
        simple_name: &str,
        args: Vec<CallArg>,
        line: usize,
    ) -> Result<()>;

    fn on_complete(&mut self);

    /// Generated code, available after [`on_complete`](Self::on_complete).
    fn take_code(&mut self) -> GeneratedCode;
}

/// Services a generator needs from the compiler driving it.
pub trait GenerationHost {
    /// Generate (or reuse) the unit for a tag/layout call and return its info.
    fn generate_call(
        &mut self,
        role: TemplateType,
        simple_name: &str,
        extension: &str,
        origin: DebugInfo,
    ) -> Result<ClassInfo>;

    /// Declared parameter order of a template, if it has been parsed.
    fn param_order(&self, name: &str) -> Option<Vec<ParamInfo>>;

    fn record_param_order(&mut self, name: &str, params: Vec<ParamInfo>);

    fn options(&self) -> &GeneratorOptions;
}

/// Settings that shape generated code.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Emit text blocks as binary payload parts instead of string literals.
    pub binary_static_content: bool,
    /// Package of the runtime output types referenced by generated code.
    pub runtime_package: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            binary_static_content: false,
            runtime_package: "gg.stencil.runtime".to_string(),
        }
    }
}

/// One call-site argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    /// Parameter name for `name = value` arguments.
    pub name: Option<String>,
    pub value: String,
}

impl CallArg {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// Code produced by a [`UnitGenerator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: String,
    pub binary_text_parts: Vec<Vec<u8>>,
}

/// Create the generator for a unit's dialect.
pub fn create_generator<'a, H>(info: ClassInfo, host: H) -> Box<dyn UnitGenerator + 'a>
where
    H: GenerationHost + 'a,
{
    Box::new(SourceGenerator::new(info, host))
}

// ============================================================================
// Generated units
// ============================================================================

/// Generated source for one template, tag or layout.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    info: ClassInfo,
    code: GeneratedCode,
}

impl GeneratedUnit {
    /// Fully qualified generated name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.info.full_name
    }

    pub fn info(&self) -> &ClassInfo {
        &self.info
    }

    pub fn code(&self) -> &str {
        &self.code.code
    }

    pub fn binary_text_parts(&self) -> &[Vec<u8>] {
        &self.code.binary_text_parts
    }

    /// Target-language extension, selects the backend.
    #[inline]
    pub fn extension(&self) -> &'static str {
        self.info.target_extension()
    }

    pub fn source_file_name(&self) -> String {
        self.info.source_file_name()
    }

    pub fn binary_file_name(&self) -> String {
        self.info.binary_file_name()
    }
}

/// Insertion-ordered units of one generation batch, keyed by generated name.
///
/// A slot is reserved before a unit is parsed, so recursive calls that reach
/// a unit already in progress (cycles) or already generated (diamonds) see it
/// and stop.
#[derive(Debug, Default)]
pub struct UnitCollection {
    units: IndexMap<String, GeneratedUnit>,
}

impl UnitCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.units.contains_key(full_name)
    }

    /// Reserve a slot for `info`. Returns `false` if already present.
    pub fn reserve(&mut self, info: ClassInfo) -> bool {
        if self.units.contains_key(&info.full_name) {
            return false;
        }
        self.units.insert(
            info.full_name.clone(),
            GeneratedUnit {
                info,
                code: GeneratedCode::default(),
            },
        );
        true
    }

    /// Store the generated code of a reserved unit.
    pub fn fill(&mut self, full_name: &str, code: GeneratedCode) {
        if let Some(unit) = self.units.get_mut(full_name) {
            unit.code = code;
        }
    }

    pub fn get(&self, full_name: &str) -> Option<&GeneratedUnit> {
        self.units.get(full_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Relative source file names, in generation order.
    pub fn source_file_names(&self) -> Vec<String> {
        self.iter().map(GeneratedUnit::source_file_name).collect()
    }
}
