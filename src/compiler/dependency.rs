//! Dependency tracking for incremental compilation.
//!
//! Three layers:
//! - [`Dependency`]: handle to the shared staleness clocks of one template
//! - [`DependencySet`]: ordered, deduplicated dependencies of one root
//! - [`DependencyTracker`]: concurrent tables of shared clocks and recorded sets
//!
//! Every template name maps to exactly one shared record. Sets hold handles,
//! so stamping a clock through any set is visible through all of them.

use dashmap::DashMap;
use indexmap::IndexSet;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::SystemTime;

use crate::resolver::CodeResolver;

// =============================================================================
// Layer 1: Shared Record
// =============================================================================

/// Staleness clocks. `None` means "never", older than any modification time.
#[derive(Debug, Default, Clone, Copy)]
struct Clocks {
    loaded: Option<SystemTime>,
    compiled: Option<SystemTime>,
}

/// The one canonical record for a template name.
#[derive(Debug)]
pub struct DependencyShared {
    name: String,
    clocks: Mutex<Clocks>,
}

impl DependencyShared {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            clocks: Mutex::new(Clocks::default()),
        }
    }
}

/// Lightweight handle to a [`DependencyShared`].
///
/// Equality and hashing use the template name only, so a set of handles
/// deduplicates by name. `Borrow<str>` allows lookups by plain name.
#[derive(Debug, Clone)]
pub struct Dependency(Arc<DependencyShared>);

impl Dependency {
    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn last_loaded(&self) -> Option<SystemTime> {
        self.0.clocks.lock().loaded
    }

    pub fn last_compiled(&self) -> Option<SystemTime> {
        self.0.clocks.lock().compiled
    }

    fn set_last_loaded(&self, time: Option<SystemTime>) {
        self.0.clocks.lock().loaded = time;
    }

    fn set_last_compiled(&self, time: Option<SystemTime>) {
        self.0.clocks.lock().compiled = time;
    }

    /// Check if this handle aliases the same shared record as `other`.
    pub fn shares_with(&self, other: &Dependency) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must match `str` hashing for `Borrow<str>` lookups
        self.name().hash(state);
    }
}

impl Borrow<str> for Dependency {
    fn borrow(&self) -> &str {
        self.name()
    }
}

// =============================================================================
// Layer 2: Dependency Set
// =============================================================================

/// Insertion-ordered, deduplicated dependencies of one root template.
///
/// # Invariants
/// - The root's own dependency is the first element
/// - Each name appears at most once
#[derive(Debug, Clone)]
pub struct DependencySet {
    entries: IndexSet<Dependency>,
}

impl DependencySet {
    /// Create a set containing only `root`.
    pub fn new(root: Dependency) -> Self {
        let mut entries = IndexSet::new();
        entries.insert(root);
        Self { entries }
    }

    /// The root dependency this set was created for.
    pub fn root(&self) -> Option<&Dependency> {
        self.entries.first()
    }

    /// Add a dependency. Returns `false` if the name was already present.
    pub fn insert(&mut self, dependency: Dependency) -> bool {
        self.entries.insert(dependency)
    }

    /// Union `other` into this set, keeping existing order and the root first.
    pub fn merge(&mut self, other: &DependencySet) {
        self.entries.extend(other.entries.iter().cloned());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.iter()
    }

    /// Dependency names in set order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Layer 3: Tracker
// =============================================================================

/// Concurrent tables of shared clocks and per-root dependency sets.
///
/// Shared records are created lazily and never removed. Recorded sets are
/// replaced on full regeneration of their root and merged on incremental
/// recompilation.
#[derive(Debug, Default)]
pub struct DependencyTracker {
    shared: DashMap<String, Arc<DependencyShared>>,
    sets: DashMap<String, DependencySet>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared record for `name`, created on first use.
    pub fn init_dependency(&self, name: &str) -> Dependency {
        let shared = self
            .shared
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(DependencyShared::new(name)))
            .clone();
        Dependency(shared)
    }

    /// New set containing only the root's own dependency.
    pub fn init_set(&self, root: &str) -> DependencySet {
        DependencySet::new(self.init_dependency(root))
    }

    /// Record (or replace) the dependency set of `root`.
    pub fn record(&self, root: &str, set: DependencySet) {
        self.sets.insert(root.to_string(), set);
    }

    /// Recorded dependency names of `root`, in set order.
    pub fn dependencies_of(&self, root: &str) -> Option<Vec<String>> {
        self.sets.get(root).map(|set| set.names())
    }

    /// Union the recorded sets of `names` into the set of `root`.
    ///
    /// Names without a recorded set are skipped; a missing root set is
    /// left missing.
    pub fn merge_into(&self, root: &str, names: &[String]) {
        // Clone first: holding a shard guard on `root` while reading another
        // entry can deadlock when both land in the same shard.
        let others: Vec<DependencySet> = names
            .iter()
            .filter(|name| name.as_str() != root)
            .filter_map(|name| self.sets.get(name).map(|set| set.value().clone()))
            .collect();

        if let Some(mut set) = self.sets.get_mut(root) {
            for other in &others {
                set.merge(other);
            }
            crate::debug!("deps"; "{} now has {} dependencies", root, set.len());
        }
    }

    /// True iff any dependency of `root` was modified after it was last loaded.
    ///
    /// Returns `false` for roots that were never generated.
    pub fn has_changed(&self, root: &str, resolver: &dyn CodeResolver) -> bool {
        let Some(set) = self.sets.get(root) else {
            return false;
        };

        set.iter()
            .any(|dep| resolver.last_modified(dep.name()) > dep.last_loaded())
    }

    /// Names of dependencies of `root` modified after they were last compiled.
    ///
    /// Returns `None` for roots that were never generated.
    pub fn dependencies_to_recompile(
        &self,
        root: &str,
        resolver: &dyn CodeResolver,
    ) -> Option<Vec<String>> {
        let set = self.sets.get(root)?;

        Some(
            set.iter()
                .filter(|dep| resolver.last_modified(dep.name()) > dep.last_compiled())
                .map(|dep| dep.name().to_string())
                .collect(),
        )
    }

    /// Stamp the load clock of every dependency of `root`.
    pub fn mark_loaded(&self, root: &str, resolver: &dyn CodeResolver) {
        if let Some(set) = self.sets.get(root) {
            for dep in set.iter() {
                dep.set_last_loaded(resolver.last_modified(dep.name()));
            }
        }
    }

    /// Stamp the compile clock of every dependency of `root`.
    pub fn mark_compiled(&self, root: &str, resolver: &dyn CodeResolver) {
        if let Some(set) = self.sets.get(root) {
            for dep in set.iter() {
                dep.set_last_compiled(resolver.last_modified(dep.name()));
            }
        }
    }

    /// Every root whose recorded set contains `name`, sorted.
    pub fn templates_using(&self, name: &str) -> Vec<String> {
        let mut roots: Vec<String> = self
            .sets
            .iter()
            .filter(|entry| entry.value().contains(name))
            .map(|entry| entry.key().clone())
            .collect();
        roots.sort();
        roots
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryResolver;

    mod dependency_set {
        use super::*;

        #[test]
        fn root_is_first() {
            let tracker = DependencyTracker::new();
            let mut set = tracker.init_set("page.jte");
            set.insert(tracker.init_dependency("tag/nav.jte"));

            assert_eq!(set.root().unwrap().name(), "page.jte");
            assert_eq!(set.names(), vec!["page.jte", "tag/nav.jte"]);
        }

        #[test]
        fn insert_deduplicates() {
            let tracker = DependencyTracker::new();
            let mut set = tracker.init_set("page.jte");

            assert!(set.insert(tracker.init_dependency("tag/nav.jte")));
            assert!(!set.insert(tracker.init_dependency("tag/nav.jte")));
            assert!(!set.insert(tracker.init_dependency("page.jte")));
            assert_eq!(set.len(), 2);
        }

        #[test]
        fn merge_keeps_root_and_deduplicates() {
            let tracker = DependencyTracker::new();

            let mut page = tracker.init_set("page.jte");
            page.insert(tracker.init_dependency("tag/nav.jte"));

            let mut nav = tracker.init_set("tag/nav.jte");
            nav.insert(tracker.init_dependency("tag/link.jte"));
            nav.insert(tracker.init_dependency("page.jte"));

            let before = page.len() + nav.len();
            page.merge(&nav);

            assert_eq!(
                page.names(),
                vec!["page.jte", "tag/nav.jte", "tag/link.jte"]
            );
            assert!(page.len() <= before);
        }

        #[test]
        fn lookup_by_name() {
            let tracker = DependencyTracker::new();
            let set = tracker.init_set("page.jte");
            assert!(set.contains("page.jte"));
            assert!(!set.contains("tag/nav.jte"));
        }
    }

    mod tracker {
        use super::*;

        #[test]
        fn init_dependency_is_idempotent() {
            let tracker = DependencyTracker::new();
            let a = tracker.init_dependency("tag/nav.jte");
            let b = tracker.init_dependency("tag/nav.jte");
            assert!(a.shares_with(&b));
            assert_eq!(a.last_loaded(), None);
            assert_eq!(a.last_compiled(), None);
        }

        #[test]
        fn clocks_are_shared_across_sets() {
            let resolver = MemoryResolver::new()
                .with("a.jte", "")
                .with("b.jte", "")
                .with("tag/nav.jte", "");
            let tracker = DependencyTracker::new();

            let mut a = tracker.init_set("a.jte");
            a.insert(tracker.init_dependency("tag/nav.jte"));
            tracker.record("a.jte", a);

            let mut b = tracker.init_set("b.jte");
            b.insert(tracker.init_dependency("tag/nav.jte"));
            tracker.record("b.jte", b);

            tracker.mark_compiled("a.jte", &resolver);

            // nav was stamped through a's set; b only sees itself as stale
            assert_eq!(
                tracker.dependencies_to_recompile("b.jte", &resolver),
                Some(vec!["b.jte".to_string()])
            );
        }

        #[test]
        fn unknown_root_has_not_changed() {
            let resolver = MemoryResolver::new();
            let tracker = DependencyTracker::new();
            assert!(!tracker.has_changed("page.jte", &resolver));
            assert_eq!(tracker.dependencies_to_recompile("page.jte", &resolver), None);
        }

        #[test]
        fn load_and_compile_clocks_are_independent() {
            let resolver = MemoryResolver::new()
                .with("page.jte", "")
                .with("tag/nav.jte", "");
            let tracker = DependencyTracker::new();

            let mut set = tracker.init_set("page.jte");
            set.insert(tracker.init_dependency("tag/nav.jte"));
            tracker.record("page.jte", set);

            assert!(tracker.has_changed("page.jte", &resolver));
            tracker.mark_compiled("page.jte", &resolver);
            assert!(tracker.has_changed("page.jte", &resolver));
            assert_eq!(
                tracker.dependencies_to_recompile("page.jte", &resolver),
                Some(vec![])
            );

            tracker.mark_loaded("page.jte", &resolver);
            assert!(!tracker.has_changed("page.jte", &resolver));

            resolver.touch("tag/nav.jte");
            assert!(tracker.has_changed("page.jte", &resolver));
            assert_eq!(
                tracker.dependencies_to_recompile("page.jte", &resolver),
                Some(vec!["tag/nav.jte".to_string()])
            );
        }

        #[test]
        fn missing_source_is_not_stale() {
            let resolver = MemoryResolver::new();
            let tracker = DependencyTracker::new();
            tracker.record("page.jte", tracker.init_set("page.jte"));

            assert!(!tracker.has_changed("page.jte", &resolver));
            assert_eq!(
                tracker.dependencies_to_recompile("page.jte", &resolver),
                Some(vec![])
            );
        }

        #[test]
        fn merge_into_unions_recorded_sets() {
            let tracker = DependencyTracker::new();

            let mut page = tracker.init_set("page.jte");
            page.insert(tracker.init_dependency("tag/nav.jte"));
            tracker.record("page.jte", page);

            let mut nav = tracker.init_set("tag/nav.jte");
            nav.insert(tracker.init_dependency("tag/icon.jte"));
            tracker.record("tag/nav.jte", nav);

            tracker.merge_into(
                "page.jte",
                &["tag/nav.jte".to_string(), "page.jte".to_string()],
            );

            assert_eq!(
                tracker.dependencies_of("page.jte").unwrap(),
                vec!["page.jte", "tag/nav.jte", "tag/icon.jte"]
            );
        }

        #[test]
        fn templates_using() {
            let tracker = DependencyTracker::new();

            let mut a = tracker.init_set("a.jte");
            a.insert(tracker.init_dependency("tag/nav.jte"));
            tracker.record("a.jte", a);

            let mut b = tracker.init_set("b.jte");
            b.insert(tracker.init_dependency("tag/footer.jte"));
            tracker.record("b.jte", b);

            assert_eq!(tracker.templates_using("tag/nav.jte"), vec!["a.jte"]);
            assert_eq!(tracker.templates_using("tag/footer.jte"), vec!["b.jte"]);
            assert!(tracker.templates_using("tag/unused.jte").is_empty());
        }
    }
}
