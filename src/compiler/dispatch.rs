//! Backend dispatch for one generated batch.
//!
//! ```text
//! one extension   → that backend, every file, configured classpath
//! several         → each secondary backend, every file, configured classpath
//!                   primary backend last, primary files, classpath + class dir
//! ```
//!
//! Secondary compilers see the primary sources so cross-language references
//! resolve; the primary compiler then links against their output.

use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::TemplateCompiler;
use super::backend::{ClassCompiler, CompileRequest};
use crate::codegen::UnitCollection;
use crate::core::Result;
use crate::debug;

impl TemplateCompiler {
    /// Compile every unit of `units` with the backend of its extension.
    pub(super) fn compile_units(&self, units: &UnitCollection) -> Result<()> {
        let mut groups: IndexMap<&str, Vec<PathBuf>> = IndexMap::new();
        for unit in units.iter() {
            groups
                .entry(unit.extension())
                .or_default()
                .push(self.config.class_directory.join(unit.source_file_name()));
        }

        // Every backend must exist before any of them runs
        let backends = groups
            .keys()
            .map(|extension| Ok((*extension, self.backends.create(extension)?)))
            .collect::<Result<Vec<(&str, Arc<dyn ClassCompiler>)>>>()?;

        let class_path = self.class_path();

        if let [(extension, backend)] = backends.as_slice() {
            debug!("backend"; "compiling {} .{} units", groups[extension].len(), extension);
            return backend.compile(&self.request(&groups[extension], class_path));
        }

        let primary = self.config.primary_extension.as_str();
        let all_files: Vec<PathBuf> = groups.values().flatten().cloned().collect();

        for (extension, backend) in backends.iter().filter(|(ext, _)| *ext != primary) {
            debug!("backend"; "compiling {} units with the .{} backend", all_files.len(), extension);
            backend.compile(&self.request(&all_files, class_path))?;
        }

        if let Some((_, backend)) = backends.iter().find(|(ext, _)| *ext == primary) {
            let mut primary_class_path = class_path.to_vec();
            primary_class_path.push(self.config.class_directory.to_string_lossy().into_owned());

            debug!("backend"; "compiling {} .{} units last", groups[primary].len(), primary);
            backend.compile(&self.request(&groups[primary], &primary_class_path))?;
        }

        Ok(())
    }

    fn request<'a>(&'a self, files: &'a [PathBuf], class_path: &'a [String]) -> CompileRequest<'a> {
        CompileRequest {
            files,
            class_path,
            config: &self.config,
            output_directory: &self.config.class_directory,
            class_metadata: &self.class_infos,
        }
    }
}
