//! Tests for the prediction engine

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::str::FromStr;

    use crate::prediction::{
        ConfidenceLevel, Prediction, PredictionEngine, PredictionMetadata, SentimentSnapshot,
        SignalStrength, TimeHorizon,
    };
    use crate::source::{Market, Platform};

    fn snapshot(
        current: f64,
        previous: f64,
        mentions: usize,
        hist_avg: f64,
        platform_scores: &[(Platform, f64)],
    ) -> SentimentSnapshot {
        SentimentSnapshot {
            current_score: current,
            previous_score: previous,
            mention_count: mentions,
            historical_avg_volume: hist_avg,
            platform_scores: platform_scores.iter().copied().collect(),
        }
    }

    fn market(id: &str, probability: f64) -> Market {
        Market {
            platform: "polymarket".to_string(),
            market_id: id.to_string(),
            title: format!("Test market {}", id),
            description: None,
            category: None,
            current_probability: probability,
            volume: dec!(500000),
            close_time: None,
            metadata: None,
        }
    }

    fn prediction_fixture(shift: f64, confidence: f64, probability: f64) -> Prediction {
        Prediction {
            market_id: "m1".to_string(),
            market_title: "Test market m1".to_string(),
            current_probability: probability,
            predicted_shift: shift,
            confidence_level: ConfidenceLevel::Medium,
            confidence_score: confidence,
            reasoning: String::new(),
            time_horizon: TimeHorizon::SixHours,
            metadata: PredictionMetadata::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rising_sentiment_worked_example() {
        let engine = PredictionEngine::new();
        let snap = snapshot(
            0.6,
            0.2,
            500,
            200.0,
            &[(Platform::Forum, 0.65), (Platform::Microblog, 0.55)],
        );
        let prediction =
            engine.predict_market_shift(&snap, &market("m1", 0.58), TimeHorizon::SixHours);

        // delta 0.4, volume factor 2.0, agreement 0.95: 0.4 * 10 * 2 * 0.95
        assert!((prediction.predicted_shift - 7.6).abs() < 1e-9);
        assert!((prediction.confidence_score - 1.0).abs() < 1e-9);
        assert_eq!(prediction.confidence_level, ConfidenceLevel::High);
        assert!((prediction.metadata.sentiment_delta - 0.4).abs() < 1e-9);
        assert!((prediction.metadata.volume_factor - 2.0).abs() < 1e-9);
        assert!((prediction.metadata.agreement - 0.95).abs() < 1e-9);
        assert_eq!(prediction.market_id, "m1");
        assert!((prediction.current_probability - 0.58).abs() < 1e-9);
    }

    #[test]
    fn test_reasoning_mentions_all_three_factors() {
        let engine = PredictionEngine::new();
        let snap = snapshot(
            0.6,
            0.2,
            500,
            200.0,
            &[(Platform::Forum, 0.65), (Platform::Microblog, 0.55)],
        );
        let prediction =
            engine.predict_market_shift(&snap, &market("m1", 0.58), TimeHorizon::SixHours);

        assert!(prediction.reasoning.contains("Sentiment increased 0.40"));
        assert!(prediction.reasoning.contains("2.0x higher volume"));
        assert!(prediction.reasoning.contains("500 vs avg 200"));
        assert!(prediction
            .reasoning
            .contains("strong cross-platform agreement (95%)"));
    }

    #[test]
    fn test_reasoning_stable_sentiment() {
        let engine = PredictionEngine::new();
        let snap = snapshot(0.25, 0.2, 50, 100.0, &[(Platform::Forum, 0.25)]);
        let prediction =
            engine.predict_market_shift(&snap, &market("m1", 0.5), TimeHorizon::SixHours);

        assert!(prediction.reasoning.contains("Sentiment relatively stable"));
        assert!(prediction.reasoning.contains("below-average volume"));
    }

    #[test]
    fn test_reasoning_decreasing_sentiment_and_mild_volume() {
        let engine = PredictionEngine::new();
        let snap = snapshot(0.1, 0.5, 120, 100.0, &[(Platform::Forum, 0.1)]);
        let prediction =
            engine.predict_market_shift(&snap, &market("m1", 0.5), TimeHorizon::SixHours);

        assert!(prediction.reasoning.contains("Sentiment decreased 0.40"));
        assert!(prediction.reasoning.contains("with 1.2x volume"));
    }

    #[test]
    fn test_reasoning_agreement_tiers() {
        let engine = PredictionEngine::new();

        let moderate = snapshot(
            0.5,
            0.1,
            100,
            100.0,
            &[(Platform::Forum, 0.9), (Platform::Microblog, 0.1)],
        );
        let prediction =
            engine.predict_market_shift(&moderate, &market("m1", 0.5), TimeHorizon::SixHours);
        // std of {0.9, 0.1} is 0.4, agreement 0.6 sits in the moderate band
        assert!(prediction.reasoning.contains("moderate agreement (60%)"));

        let low = snapshot(
            0.5,
            0.1,
            100,
            100.0,
            &[(Platform::Forum, 0.9), (Platform::Microblog, -0.9)],
        );
        let prediction =
            engine.predict_market_shift(&low, &market("m1", 0.5), TimeHorizon::SixHours);
        assert!(prediction
            .reasoning
            .contains("but low cross-platform agreement (10%)"));
    }

    #[test]
    fn test_flat_sentiment_predicts_no_shift() {
        let engine = PredictionEngine::new();
        let snap = snapshot(
            0.4,
            0.4,
            1000,
            10.0,
            &[(Platform::Forum, 0.4), (Platform::Microblog, 0.4)],
        );

        for horizon in TimeHorizon::ALL {
            let prediction = engine.predict_market_shift(&snap, &market("m1", 0.5), horizon);
            assert!((prediction.predicted_shift).abs() < 1e-9);
        }
    }

    #[test]
    fn test_shift_clamped_to_max() {
        let engine = PredictionEngine::new();
        let surge = snapshot(1.0, -0.5, 2000, 100.0, &[(Platform::Forum, 1.0)]);
        let prediction =
            engine.predict_market_shift(&surge, &market("m1", 0.5), TimeHorizon::TwentyFourHours);
        assert!((prediction.predicted_shift - 20.0).abs() < 1e-9);

        let collapse = snapshot(-1.0, 0.5, 2000, 100.0, &[(Platform::Forum, -1.0)]);
        let prediction =
            engine.predict_market_shift(&collapse, &market("m1", 0.5), TimeHorizon::TwentyFourHours);
        assert!((prediction.predicted_shift - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_shift_always_within_bounds() {
        let engine = PredictionEngine::new();
        let cases = [
            (1.0, -1.0, 5000, 1.0),
            (-1.0, 1.0, 5000, 1.0),
            (0.9, -0.9, 100, 0.0),
            (0.3, 0.1, 10, 1000.0),
        ];

        for (current, previous, mentions, hist) in cases {
            let snap = snapshot(
                current,
                previous,
                mentions,
                hist,
                &[(Platform::Forum, current), (Platform::Microblog, previous)],
            );
            for horizon in TimeHorizon::ALL {
                let prediction = engine.predict_market_shift(&snap, &market("m1", 0.5), horizon);
                assert!(prediction.predicted_shift >= -20.0);
                assert!(prediction.predicted_shift <= 20.0);
            }
        }
    }

    #[test]
    fn test_single_platform_agreement_is_half() {
        let engine = PredictionEngine::new();
        let snap = snapshot(0.6, 0.2, 100, 100.0, &[(Platform::Forum, 0.6)]);
        let prediction =
            engine.predict_market_shift(&snap, &market("m1", 0.5), TimeHorizon::SixHours);
        assert!((prediction.metadata.agreement - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_horizon_multipliers() {
        let engine = PredictionEngine::new();
        let snap = snapshot(0.3, 0.1, 100, 100.0, &[(Platform::Forum, 0.3)]);
        let base = market("m1", 0.5);

        // base shift 2.0 * volume 1.0 * agreement 0.5 = 1.0 before the horizon
        let one_hour = engine.predict_market_shift(&snap, &base, TimeHorizon::OneHour);
        let six_hours = engine.predict_market_shift(&snap, &base, TimeHorizon::SixHours);
        let day = engine.predict_market_shift(&snap, &base, TimeHorizon::TwentyFourHours);

        assert!((one_hour.predicted_shift - 0.5).abs() < 1e-9);
        assert!((six_hours.predicted_shift - 1.0).abs() < 1e-9);
        assert!((day.predicted_shift - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_inputs_fall_back() {
        let engine = PredictionEngine::new();
        let cases = [
            snapshot(f64::NAN, 0.2, 100, 100.0, &[(Platform::Forum, 0.5)]),
            snapshot(0.5, f64::INFINITY, 100, 100.0, &[(Platform::Forum, 0.5)]),
            snapshot(0.5, 0.2, 100, f64::NAN, &[(Platform::Forum, 0.5)]),
            snapshot(0.5, 0.2, 100, 100.0, &[(Platform::Forum, f64::NAN)]),
        ];

        for snap in cases {
            let prediction =
                engine.predict_market_shift(&snap, &market("m1", 0.5), TimeHorizon::SixHours);
            assert!((prediction.predicted_shift).abs() < 1e-9);
            assert_eq!(prediction.confidence_level, ConfidenceLevel::Low);
            assert!((prediction.confidence_score).abs() < 1e-9);
            assert_eq!(prediction.reasoning, "Error in prediction calculation");
        }
    }

    #[test]
    fn test_predict_multiple_markets_covers_all_horizons() {
        let engine = PredictionEngine::new();
        let matched = vec![
            (
                snapshot(0.6, 0.2, 500, 200.0, &[(Platform::Forum, 0.6)]),
                market("m1", 0.58),
            ),
            (
                snapshot(-0.2, 0.1, 50, 100.0, &[(Platform::Microblog, -0.2)]),
                market("m2", 0.31),
            ),
        ];

        let predictions = engine.predict_multiple_markets(&matched, &TimeHorizon::ALL);
        assert_eq!(predictions.len(), 6);
        assert!(predictions
            .iter()
            .filter(|p| p.market_id == "m1")
            .all(|p| p.market_title == "Test market m1"));
        assert_eq!(
            predictions
                .iter()
                .filter(|p| p.time_horizon == TimeHorizon::OneHour)
                .count(),
            2
        );
    }

    #[test]
    fn test_accuracy_perfect_call() {
        let engine = PredictionEngine::new();
        let prediction = prediction_fixture(5.0, 0.9, 0.5);
        let accuracy = engine.calculate_prediction_accuracy(&prediction, &market("m1", 0.55));

        assert!((accuracy.actual_shift - 5.0).abs() < 0.01);
        assert!(accuracy.absolute_error < 0.01);
        assert!(accuracy.direction_correct);
        assert!((accuracy.accuracy_score - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_accuracy_wrong_direction() {
        let engine = PredictionEngine::new();
        let prediction = prediction_fixture(5.0, 0.9, 0.5);
        let accuracy = engine.calculate_prediction_accuracy(&prediction, &market("m1", 0.45));

        assert!((accuracy.actual_shift - (-5.0)).abs() < 0.01);
        assert!(!accuracy.direction_correct);
        assert!((accuracy.accuracy_score).abs() < 0.001);
    }

    #[test]
    fn test_accuracy_flat_market_punishes_prediction() {
        let engine = PredictionEngine::new();
        let prediction = prediction_fixture(5.0, 0.9, 0.5);
        let accuracy = engine.calculate_prediction_accuracy(&prediction, &market("m1", 0.5));

        assert!((accuracy.actual_shift).abs() < 0.01);
        assert!(!accuracy.direction_correct);
        assert!((accuracy.accuracy_score).abs() < 0.001);
    }

    #[test]
    fn test_accuracy_flat_call_on_flat_market() {
        let engine = PredictionEngine::new();
        let prediction = prediction_fixture(0.0, 0.2, 0.5);
        let accuracy = engine.calculate_prediction_accuracy(&prediction, &market("m1", 0.5));

        assert!(accuracy.direction_correct);
        assert!((accuracy.accuracy_score - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_signal_strength_tiers() {
        let engine = PredictionEngine::new();

        let strong = prediction_fixture(7.6, 1.0, 0.5);
        assert_eq!(engine.signal_strength(&strong), SignalStrength::Strong);

        let moderate = prediction_fixture(3.0, 0.5, 0.5);
        assert_eq!(engine.signal_strength(&moderate), SignalStrength::Moderate);

        let small_shift = prediction_fixture(1.0, 0.9, 0.5);
        assert_eq!(engine.signal_strength(&small_shift), SignalStrength::Weak);

        let low_confidence = prediction_fixture(10.0, 0.3, 0.5);
        assert_eq!(engine.signal_strength(&low_confidence), SignalStrength::Weak);
    }

    #[test]
    fn test_horizon_parse_and_display() {
        assert_eq!(TimeHorizon::from_str("1h").unwrap(), TimeHorizon::OneHour);
        assert_eq!(TimeHorizon::from_str("6h").unwrap(), TimeHorizon::SixHours);
        assert_eq!(
            TimeHorizon::from_str("24h").unwrap(),
            TimeHorizon::TwentyFourHours
        );
        assert!(TimeHorizon::from_str("3h").is_err());

        for horizon in TimeHorizon::ALL {
            let round_trip = TimeHorizon::from_str(&horizon.to_string()).unwrap();
            assert_eq!(round_trip, horizon);
        }
    }

    #[test]
    fn test_horizon_serde() {
        assert_eq!(
            serde_json::to_string(&TimeHorizon::SixHours).unwrap(),
            "\"6h\""
        );
        let parsed: TimeHorizon = serde_json::from_str("\"24h\"").unwrap();
        assert_eq!(parsed, TimeHorizon::TwentyFourHours);
    }

    #[test]
    fn test_confidence_level_serde() {
        assert_eq!(
            serde_json::to_string(&ConfidenceLevel::High).unwrap(),
            "\"high\""
        );
        assert_eq!(
            serde_json::to_string(&SignalStrength::Moderate).unwrap(),
            "\"moderate\""
        );
    }
}
