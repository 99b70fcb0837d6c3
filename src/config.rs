//! Options controlling how the semantic analysis is run.

/// Settings for [`crate::analyze`] and
/// [`crate::symbol_table::manager::SymbolTableManager::generate_symbol_tables`].
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Build the per-file symbol tables on the rayon thread pool.
    ///
    /// Results are always merged in discovery order, so this only changes
    /// wall-clock time, never the outcome.
    pub parallel_generation: bool,
}

impl AnalysisOptions {
    pub fn sequential() -> Self {
        AnalysisOptions {
            parallel_generation: false,
        }
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            parallel_generation: true,
        }
    }
}
