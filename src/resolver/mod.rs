//! Template source resolution.
//!
//! A [`CodeResolver`] maps template names (`page.jte`, `tag/nav.jte`) to
//! source text and modification times. The compiler never touches template
//! sources any other way.
//!
//! - [`DirectoryResolver`]: templates under a root directory
//! - [`MemoryResolver`]: in-memory sources with a logical clock

mod dir;
mod memory;

pub use dir::DirectoryResolver;
pub use memory::MemoryResolver;

use std::time::SystemTime;

/// Source lookup used by the compiler.
pub trait CodeResolver: Send + Sync {
    /// Source text of `name`, or `None` if it does not exist.
    fn resolve(&self, name: &str) -> Option<String>;

    /// Last modification time of `name`, or `None` if it does not exist.
    ///
    /// `None` orders before every real time, so a missing source never
    /// counts as changed.
    fn last_modified(&self, name: &str) -> Option<SystemTime>;

    /// Every template name this resolver can produce, sorted.
    fn resolve_all_template_names(&self) -> Vec<String>;

    fn exists(&self, name: &str) -> bool {
        self.last_modified(name).is_some()
    }
}
