use serde::Deserialize;

/// Assumptions the optimizer may make about the environment the program runs
/// in. All of them are off by default, which only ever costs precision.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Options {
    /// Built-in objects and prototypes are never monkey-patched. Unlocks
    /// folding calls to native functions and reading built-in properties.
    pub no_native_overwrites: bool,
    /// Global bindings are only reassigned by the code being optimized, so a
    /// global's last written value can be trusted.
    pub no_global_property_overwrites: bool,
    /// Nothing outside the program reads global properties, so unknown code
    /// can't reach objects only stored in globals and unused globals can be
    /// removed.
    pub no_global_property_reads: bool,
    /// Upper bound on analyze/rewrite rounds.
    pub max_iterations: usize,
    pub passes: PassConfig,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            no_native_overwrites: false,
            no_global_property_overwrites: false,
            no_global_property_reads: false,
            max_iterations: 100,
            passes: PassConfig::default(),
        }
    }
}

impl Options {
    /// Options with every environment assumption turned on.
    pub fn trusting() -> Self {
        Options {
            no_native_overwrites: true,
            no_global_property_overwrites: true,
            no_global_property_reads: true,
            ..Default::default()
        }
    }
}

/// Switches for the individual rewrite passes.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct PassConfig {
    pub dead_branches: bool,
    pub fold_constants: bool,
    pub inline_functions: bool,
    pub tail_calls: bool,
    pub unroll_loops: bool,
    pub remove_unused: bool,
    pub simplify_blocks: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        PassConfig {
            dead_branches: true,
            fold_constants: true,
            inline_functions: true,
            tail_calls: true,
            unroll_loops: true,
            remove_unused: true,
            simplify_blocks: true,
        }
    }
}

impl PassConfig {
    pub fn none() -> Self {
        PassConfig {
            dead_branches: false,
            fold_constants: false,
            inline_functions: false,
            tail_calls: false,
            unroll_loops: false,
            remove_unused: false,
            simplify_blocks: false,
        }
    }
}
