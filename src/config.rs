//! Configuration types.

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of tasks executing concurrently in one dispatch.
    pub max_concurrent_tasks: usize,
    /// How many store hits feed the decomposition digest.
    pub digest_limit: usize,
    /// How many characters of each item's content the digest keeps.
    pub digest_snippet_chars: usize,
    /// Model used for decomposition, synthesis and conflict analysis.
    pub model: String,
    /// Sampling temperature for decomposition (low — structured JSON out).
    pub decompose_temperature: f32,
    /// Sampling temperature for synthesis and intervention text.
    pub synthesis_temperature: f32,
    /// Conflict monitor tuning.
    pub conflict: ConflictConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 8,
            digest_limit: 5,
            digest_snippet_chars: 200,
            model: "gpt-4o-mini".to_string(),
            decompose_temperature: 0.1,
            synthesis_temperature: 0.3,
            conflict: ConflictConfig::default(),
        }
    }
}

/// Conflict monitor configuration.
///
/// The keyword set and importance threshold are tuning knobs, not fixed law.
/// The default keywords carry English and Spanish variants so bilingual
/// workspaces trip the monitor either way.
#[derive(Debug, Clone)]
pub struct ConflictConfig {
    /// How many store hits to scan per check.
    pub search_limit: usize,
    /// Minimum decision importance that qualifies as conflict-relevant
    /// (strict greater-than).
    pub importance_threshold: f64,
    /// Lowercase signal words that mark a potential conflict.
    pub keywords: Vec<String>,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            search_limit: 10,
            importance_threshold: 0.8,
            keywords: [
                "conflict",
                "contradiction",
                "different",
                "change",
                "conflicto",
                "contradicción",
                "diferente",
                "cambio",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
