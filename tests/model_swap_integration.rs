use std::sync::Arc;
use std::thread;
use vaultrisk::application::feature_extraction::SyntheticFeatureExtractor;
use vaultrisk::application::risk_management::assessment_service::RiskAssessmentService;
use vaultrisk::domain::errors::RiskEngineError;
use vaultrisk::domain::ml::feature_registry::FeatureVector;
use vaultrisk::domain::ports::RiskPredictor;

struct Constant {
    score: f64,
    version: &'static str,
}

impl RiskPredictor for Constant {
    fn predict(&self, _features: &FeatureVector) -> Result<f64, RiskEngineError> {
        Ok(self.score)
    }
    fn name(&self) -> &str {
        "Constant"
    }
    fn version(&self) -> &str {
        self.version
    }
}

#[test]
fn test_snapshot_survives_swap() {
    let service = RiskAssessmentService::new(
        Arc::new(SyntheticFeatureExtractor::new(42).unwrap()),
        Arc::new(Constant {
            score: 0.2,
            version: "old",
        }),
    );

    let snapshot = service.snapshot();
    let previous = service.swap_model(Arc::new(Constant {
        score: 0.9,
        version: "new",
    }));

    assert_eq!(previous.version(), "old");
    // The held snapshot still scores with the old model.
    assert_eq!(service.quick_score_with(snapshot.as_ref(), "superlend"), 0.2);
    assert_eq!(service.quick_score("superlend"), 0.9);
    assert_eq!(service.detailed_assessment("superlend").model_version, "new");
}

#[test]
fn test_concurrent_reads_during_swaps() {
    let service = RiskAssessmentService::new(
        Arc::new(SyntheticFeatureExtractor::new(7).unwrap()),
        Arc::new(Constant {
            score: 0.25,
            version: "a",
        }),
    );

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let a = service.detailed_assessment("pancake-lp");
                    // Score and version always come from the same model.
                    match a.model_version.as_str() {
                        "a" => assert_eq!(a.risk_score, 0.25),
                        "b" => assert_eq!(a.risk_score, 0.75),
                        other => panic!("unexpected model {}", other),
                    }
                }
            });
        }
        s.spawn(|| {
            for i in 0..50 {
                let (score, version) = if i % 2 == 0 { (0.75, "b") } else { (0.25, "a") };
                service.swap_model(Arc::new(Constant { score, version }));
            }
        });
    });
}
