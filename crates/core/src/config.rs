#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Prefix of fresh method type-parameter names: `Var0`, `Var1`, ...
    pub type_var_prefix: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            type_var_prefix: "Var".to_string(),
        }
    }
}
