//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::MindshareError;

    #[test]
    fn test_classifier_error() {
        let err = MindshareError::Classifier("Model unavailable".to_string());
        assert!(err.to_string().contains("Classifier error"));
        assert!(err.to_string().contains("Model unavailable"));
    }

    #[test]
    fn test_embedder_error() {
        let err = MindshareError::Embedder("Encoding failed".to_string());
        assert!(err.to_string().contains("Embedding error"));
    }

    #[test]
    fn test_source_error() {
        let err = MindshareError::Source("Feed timed out".to_string());
        assert!(err.to_string().contains("Data source error"));
        assert!(err.to_string().contains("Feed timed out"));
    }

    #[test]
    fn test_config_error() {
        let err = MindshareError::Config("Missing match threshold".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_invalid_input_error() {
        let err = MindshareError::InvalidInput("unknown time horizon: 3h".to_string());
        assert!(err.to_string().contains("Invalid input"));
        assert!(err.to_string().contains("3h"));
    }

    #[test]
    fn test_market_not_found() {
        let err = MindshareError::MarketNotFound("market123".to_string());
        assert!(err.to_string().contains("Market not found"));
        assert!(err.to_string().contains("market123"));
    }

    #[test]
    fn test_internal_error() {
        let err = MindshareError::Internal("Unexpected state".to_string());
        assert!(err.to_string().contains("Internal error"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = MindshareError::Classifier("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Classifier"));
    }

    #[test]
    fn test_error_variants_distinct() {
        let classifier = MindshareError::Classifier("test".to_string());
        let embedder = MindshareError::Embedder("test".to_string());

        // They have different Display outputs
        assert_ne!(classifier.to_string(), embedder.to_string());
    }
}
