/// Engine configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed search depth in plies.
    pub search_depth: u32,
    /// Enable the endgame king-proximity evaluation bonus.
    pub king_proximity_bonus: bool,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        EngineConfig {
            search_depth: std::env::var("CHESS_SEARCH_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            king_proximity_bonus: std::env::var("CHESS_KING_PROXIMITY_BONUS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            search_depth: 3,
            king_proximity_bonus: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.search_depth, 3);
        assert!(!config.king_proximity_bonus);
    }

    #[test]
    fn from_env_defaults() {
        // Without setting env vars, should fall back to defaults
        let config = EngineConfig::from_env();
        assert_eq!(config.search_depth, 3);
        assert!(!config.king_proximity_bonus);
    }
}
