//! Generation driver: template names → generated units on disk.
//!
//! ```text
//! generate(names)
//!   ├── Template root  → fresh set, parse, record set
//!   └── Tag/Layout root → fresh set, generate_tag_or_layout, record set
//!         └── @tag/@layout calls recurse through GenerationScope
//!               (same batch, callee's own set merged into the caller's)
//! persist   → sources, .bin payloads (parallel)
//! native    → reflection metadata, once per batch
//! ```

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::TemplateCompiler;
use super::dependency::DependencySet;
use super::native;
use crate::codegen::{
    GeneratedCode, GeneratedUnit, GenerationHost, GeneratorOptions, TemplateParser,
    UnitCollection, create_generator,
};
use crate::core::{
    ClassInfo, CompileError, DebugInfo, Dialect, ParamInfo, Result, TemplateType,
};
use crate::utils::path::write_file;
use crate::{debug, debug_do, log};

// ============================================================================
// Batch state
// ============================================================================

/// Output of one `generate` call.
#[derive(Default)]
pub(super) struct GenerationBatch {
    pub units: UnitCollection,
    /// Complete dependency set of every tag/layout generated in this batch.
    ///
    /// A caller reaching an already generated callee merges its set, so
    /// diamonds still see the callee's transitive dependencies.
    subtrees: FxHashMap<String, DependencySet>,
}

/// Host handed to the generator of one unit.
struct GenerationScope<'a> {
    compiler: &'a TemplateCompiler,
    batch: &'a mut GenerationBatch,
    dependencies: &'a mut DependencySet,
}

impl GenerationHost for GenerationScope<'_> {
    fn generate_call(
        &mut self,
        role: TemplateType,
        simple_name: &str,
        extension: &str,
        origin: DebugInfo,
    ) -> Result<ClassInfo> {
        let name = role.resolve_name(simple_name, extension);

        match self
            .compiler
            .generate_tag_or_layout(&name, Some(&origin), self.batch, self.dependencies)
        {
            Err(err) if err.is_not_found(&name) => {
                let alternate = Dialect::from_extension(extension)
                    .unwrap_or(Dialect::Jte)
                    .alternate();
                let alternate_name = role.resolve_name(simple_name, alternate.extension());
                if !self.compiler.resolver.exists(&alternate_name) {
                    return Err(err);
                }

                debug!("generate"; "{} not found, using {}", name, alternate_name);
                self.compiler.generate_tag_or_layout(
                    &alternate_name,
                    Some(&origin),
                    self.batch,
                    self.dependencies,
                )
            }
            other => other,
        }
    }

    fn param_order(&self, name: &str) -> Option<Vec<ParamInfo>> {
        self.compiler
            .param_order
            .get(name)
            .map(|params| params.value().clone())
    }

    fn record_param_order(&mut self, name: &str, params: Vec<ParamInfo>) {
        self.compiler.param_order.insert(name.to_string(), params);
    }

    fn options(&self) -> &GeneratorOptions {
        &self.compiler.generator_options
    }
}

// ============================================================================
// Generation
// ============================================================================

impl TemplateCompiler {
    /// Generate units for `names` and every tag/layout they reach, write them
    /// to disk, and record a fresh dependency set for each root.
    pub fn generate(&self, names: &[String]) -> Result<UnitCollection> {
        let mut batch = GenerationBatch::default();

        for name in names {
            match TemplateType::of(name) {
                TemplateType::Template => self.generate_template(name, &mut batch)?,
                TemplateType::Tag | TemplateType::Layout => {
                    let mut dependencies = self.tracker.init_set(name);
                    self.generate_tag_or_layout(name, None, &mut batch, &mut dependencies)?;
                    self.tracker.record(name, dependencies);
                }
            }
        }

        let units = batch.units;
        debug!("generate"; "{} roots, {} units", names.len(), units.len());
        debug_do! {
            for unit in units.iter() {
                log!("generate"; "  {} ← {}", unit.source_file_name(), unit.info().name);
            }
        }

        self.persist(&units)?;
        if native::export(&self.config, &units)? {
            debug!("native"; "exported metadata for {} units", units.len());
        }

        Ok(units)
    }

    fn generate_template(&self, name: &str, batch: &mut GenerationBatch) -> Result<()> {
        let info = ClassInfo::new(name, &self.config.package);
        if self.is_claimed(&info, batch)? {
            return Ok(());
        }

        let source = self
            .resolver
            .resolve(name)
            .ok_or_else(|| CompileError::not_found(name, None))?;

        let mut dependencies = self.tracker.init_set(name);
        batch.units.reserve(info.clone());
        let code = self.parse_unit(&info, &source, batch, &mut dependencies)?;
        batch.units.fill(&info.full_name, code);

        self.tracker.record(name, dependencies);
        self.class_infos.insert(info.full_name.clone(), info);
        Ok(())
    }

    /// Add `name` to `dependencies` and generate its unit unless the batch
    /// already holds it.
    pub(super) fn generate_tag_or_layout(
        &self,
        name: &str,
        origin: Option<&DebugInfo>,
        batch: &mut GenerationBatch,
        dependencies: &mut DependencySet,
    ) -> Result<ClassInfo> {
        dependencies.insert(self.tracker.init_dependency(name));

        let info = ClassInfo::new(name, &self.config.package);
        if self.is_claimed(&info, batch)? {
            // In progress units (cycles) have no subtree yet
            if let Some(subtree) = batch.subtrees.get(name) {
                dependencies.merge(subtree);
            }
            return Ok(info);
        }

        let source = self
            .resolver
            .resolve(name)
            .ok_or_else(|| CompileError::not_found(name, origin))?;

        let mut own = self.tracker.init_set(name);
        batch.units.reserve(info.clone());
        let code = self.parse_unit(&info, &source, batch, &mut own)?;
        batch.units.fill(&info.full_name, code);

        dependencies.merge(&own);
        batch.subtrees.insert(name.to_string(), own);
        self.class_infos.insert(info.full_name.clone(), info.clone());
        Ok(info)
    }

    /// Check whether the batch already holds the unit of `info`.
    ///
    /// Distinct names may sanitize to the same generated class; that is an
    /// error, whether the other name was generated in this batch or earlier.
    fn is_claimed(&self, info: &ClassInfo, batch: &GenerationBatch) -> Result<bool> {
        let owner = match batch.units.get(&info.full_name) {
            Some(unit) => Some(unit.info().name.clone()),
            None => self
                .class_infos
                .get(&info.full_name)
                .map(|entry| entry.name.clone()),
        };

        match owner {
            Some(other) if other != info.name => Err(CompileError::ClassNameCollision {
                name: info.name.clone(),
                other,
                class: info.full_name.clone(),
            }),
            _ => Ok(batch.units.contains(&info.full_name)),
        }
    }

    fn parse_unit(
        &self,
        info: &ClassInfo,
        source: &str,
        batch: &mut GenerationBatch,
        dependencies: &mut DependencySet,
    ) -> Result<GeneratedCode> {
        let scope = GenerationScope {
            compiler: self,
            batch,
            dependencies,
        };
        let mut generator = create_generator(info.clone(), scope);
        TemplateParser::new(&info.name, source, info.dialect).parse(generator.as_mut())?;
        Ok(generator.take_code())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write sources under the class directory and binary payloads under the
    /// binary directory.
    fn persist(&self, units: &UnitCollection) -> Result<()> {
        let units: Vec<&GeneratedUnit> = units.iter().collect();
        let class_directory = self.config.class_directory.as_path();
        let binary_directory = self.config.binary_directory();

        units.par_iter().try_for_each(|unit| {
            let path = class_directory.join(unit.source_file_name());
            write_file(&path, unit.code()).map_err(|err| CompileError::io(&path, err))?;

            if !unit.binary_text_parts().is_empty() {
                let path = binary_directory.join(unit.binary_file_name());
                write_file(&path, unit.binary_text_parts().concat())
                    .map_err(|err| CompileError::io(&path, err))?;
            }
            Ok(())
        })
    }
}
