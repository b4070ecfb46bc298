//! Cross-cutting configuration (spec §4.9, ambient per SPEC_FULL §3.3),
//! mirroring the shape of `database.rs::DbOptions` in the teacher: a plain
//! struct of toggles, constructed via `Default` and overridable by the CLI.

/// Toggles that apply across a whole `LibraryToolbox`-equivalent session.
#[derive(Debug, Clone, Copy)]
pub struct ToolboxOptions {
    /// Whether `AssertionMatcher` memoizes `just_first=true` results.
    pub unification_cache_enabled: bool,
    /// Default for the matcher's `up_to_hyps_perms` parameter when a
    /// caller doesn't specify one explicitly.
    pub up_to_hyps_perms_default: bool,
    /// What an unresolved registered prover does at bind time.
    pub unbound_prover_policy: crate::registry::UnboundPolicy,
}

impl Default for ToolboxOptions {
    fn default() -> Self {
        ToolboxOptions {
            unification_cache_enabled: true,
            up_to_hyps_perms_default: true,
            unbound_prover_policy: crate::registry::UnboundPolicy::NoOp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let opts = ToolboxOptions::default();
        assert!(opts.unification_cache_enabled);
        assert!(opts.up_to_hyps_perms_default);
        assert_eq!(opts.unbound_prover_policy, crate::registry::UnboundPolicy::NoOp);
    }
}
