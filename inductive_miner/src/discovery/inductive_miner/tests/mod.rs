use std::collections::BTreeMap;

use crate::{
    conversions::to_petri_net::model_to_petri_net,
    event_log::{
        import_uvcl::{import_uvcl_json_from_path, UVCLImportError},
        uvcl_struct::UVCL,
    },
    powl::powl_struct::POWL,
    utils::test_utils::get_test_data_path,
};

use super::{
    discover, discover_powl, discover_process_tree, InductiveMinerConfig, InductiveMinerError,
    InductiveMinerVariant, Model,
};


fn uvcl(variants: Vec<(Vec<&str>, u64)>) -> UVCL {
    UVCL::from(variants)
}

fn tree_string(log: &UVCL) -> String {
    discover_process_tree(log, &InductiveMinerConfig::default())
        .unwrap()
        .to_string()
}

/// Every variant of the log can be replayed on the Petri net of the model
fn assert_fitting(model: &Model, log: &UVCL) {
    let (net, _, _) = model_to_petri_net(model).unwrap();
    for (variant, _) in log.iter() {
        assert!(
            net.accepts_trace(variant),
            "{:?} does not fit {}",
            variant,
            model
        );
    }
}

#[test]
fn sequence_scenario() {
    let log = uvcl(vec![(vec!["a", "b", "c"], 1)]);
    assert_eq!(tree_string(&log), "->( 'a', 'b', 'c' )");
}

#[test]
fn sequence_after_interleaved_choice() {
    let log = uvcl(vec![(vec!["a", "c", "e"], 1), (vec!["d", "b", "e"], 1)]);
    assert_eq!(tree_string(&log), "->( X( ->( 'a', 'c' ), ->( 'd', 'b' ) ), 'e' )");
    let model = discover(&log, &InductiveMinerConfig::default()).unwrap();
    assert_fitting(&model, &log);
}

#[test]
fn exclusive_choice_scenario() {
    let log = uvcl(vec![(vec!["a"], 3), (vec!["b"], 2)]);
    assert_eq!(tree_string(&log), "X( 'a', 'b' )");
}

#[test]
fn concurrency_scenario() {
    let log = uvcl(vec![(vec!["a", "b"], 1), (vec!["b", "a"], 1)]);
    assert_eq!(tree_string(&log), "+( 'a', 'b' )");
}

#[test]
fn loop_scenario() {
    let log = uvcl(vec![
        (vec!["a"], 2),
        (vec!["a", "b", "a"], 1),
        (vec!["a", "b", "a", "b", "a"], 1),
    ]);
    assert_eq!(tree_string(&log), "*( 'a', 'b' )");
}

#[test]
fn strict_tau_loop_scenario() {
    let log = uvcl(vec![
        (vec!["a", "b", "a", "c", "b", "a"], 1),
        (vec!["c", "a", "b"], 1),
        (vec!["b", "c", "a", "c"], 1),
    ]);
    assert_eq!(tree_string(&log), "*( X( 'a', 'b', 'c' ), tau )");
}

#[test]
fn partial_order_scenario() {
    let log = uvcl(vec![(vec!["a", "b", "c", "d"], 1), (vec!["a", "c", "b", "d"], 1)]);
    for variant in [
        InductiveMinerVariant::POWLBasic,
        InductiveMinerVariant::POWLMaximal,
        InductiveMinerVariant::POWLDynamicClustering,
        InductiveMinerVariant::POWLBruteForce,
    ] {
        let model = discover_powl(&log, &InductiveMinerConfig::for_variant(variant)).unwrap();
        assert_eq!(
            model.to_string(),
            "PO=(nodes={'a', 'b', 'c', 'd'}, order={'a'-->'b', 'a'-->'c', 'b'-->'d', 'c'-->'d'})",
            "variant {}",
            variant
        );
    }
    assert_eq!(tree_string(&log), "->( 'a', +( 'b', 'c' ), 'd' )");
}

#[test]
fn unsimplified_model_keeps_nesting() {
    let log = uvcl(vec![(vec!["a", "b", "c", "d"], 1), (vec!["a", "c", "b", "d"], 1)]);
    let config = InductiveMinerConfig {
        simplify: false,
        ..InductiveMinerConfig::for_variant(InductiveMinerVariant::POWLMaximal)
    };
    let model = discover_powl(&log, &config).unwrap();
    let POWL::StrictPartialOrder { children, .. } = &model else {
        panic!("expected a partial order, got {}", model);
    };
    assert_eq!(children.len(), 3);
    assert!(matches!(children[1], POWL::StrictPartialOrder { .. }));
    assert!(model.is_valid());
}

#[test]
fn running_example() {
    let log =
        import_uvcl_json_from_path(get_test_data_path().join("running-example.json")).unwrap();
    for variant in InductiveMinerVariant::ALL {
        if variant == InductiveMinerVariant::IMf {
            continue;
        }
        let model = discover(&log, &InductiveMinerConfig::for_variant(variant)).unwrap();
        assert_eq!(model.count_activity_leaves(), log.alphabet().len());
        match &model {
            Model::ProcessTree(tree) => assert!(tree.is_valid()),
            Model::POWL(powl) => assert!(powl.is_valid()),
        }
        assert_fitting(&model, &log);
    }
}

#[test]
fn noise_filtering() {
    let log = import_uvcl_json_from_path(get_test_data_path().join("noisy-sequence.json")).unwrap();
    let config = InductiveMinerConfig {
        variant: InductiveMinerVariant::IMf,
        noise_threshold: 0.2,
        ..Default::default()
    };
    let tree = discover_process_tree(&log, &config).unwrap();
    assert_eq!(tree.to_string(), "->( 'a', +( 'b', 'c' ), 'd' )");

    let exact = discover_process_tree(&log, &InductiveMinerConfig::default()).unwrap();
    assert_ne!(exact, tree);
    assert_fitting(&Model::ProcessTree(exact), &log);
}

#[test]
fn model_json() {
    let log = uvcl(vec![(vec!["a", "b"], 1), (vec!["b", "a"], 1)]);
    let model = discover(
        &log,
        &InductiveMinerConfig::for_variant(InductiveMinerVariant::POWLMaximal),
    )
    .unwrap();
    let json = model.to_json().unwrap();
    let parsed: Model = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, model);
}

#[test]
fn invalid_options() {
    let log = uvcl(vec![(vec!["a"], 1)]);
    let config = InductiveMinerConfig {
        noise_threshold: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        discover(&log, &config),
        Err(InductiveMinerError::InvalidOption { name, .. }) if name == "noise_threshold"
    ));
    assert!(matches!(
        discover_powl(&log, &InductiveMinerConfig::default()),
        Err(InductiveMinerError::InvalidOption { name, .. }) if name == "variant"
    ));
    assert!(matches!(
        discover_process_tree(
            &log,
            &InductiveMinerConfig::for_variant(InductiveMinerVariant::POWLBasic)
        ),
        Err(InductiveMinerError::InvalidOption { name, .. }) if name == "variant"
    ));
}

#[test]
fn zero_counts_are_malformed() {
    let log = UVCL {
        variants: BTreeMap::from([(vec!["a".to_string()], 2), (vec!["b".to_string()], 0)]),
    };
    assert!(matches!(
        discover(&log, &InductiveMinerConfig::default()),
        Err(InductiveMinerError::MalformedInput(
            UVCLImportError::MalformedInput { entry: Some(1), .. }
        ))
    ));
}

#[test]
fn overflowing_logs_are_malformed() {
    let log = UVCL {
        variants: BTreeMap::from([
            (vec!["a".to_string(), "b".to_string()], u64::MAX),
            (vec!["b".to_string(), "a".to_string()], 1),
        ]),
    };
    for variant in [InductiveMinerVariant::IM, InductiveMinerVariant::IMf] {
        assert!(matches!(
            discover(&log, &InductiveMinerConfig::for_variant(variant)),
            Err(InductiveMinerError::MalformedInput(
                UVCLImportError::MalformedInput { entry: None, .. }
            ))
        ));
    }
}

#[test]
fn recursion_depth_is_bounded() {
    let log = uvcl(vec![
        (vec!["a", "b", "a", "c", "b", "a"], 1),
        (vec!["c", "a", "b"], 1),
        (vec!["b", "c", "a", "c"], 1),
    ]);
    let config = InductiveMinerConfig {
        max_recursion_depth: 1,
        ..Default::default()
    };
    assert!(matches!(
        discover(&log, &config),
        Err(InductiveMinerError::ResourceExhausted { depth: 2 })
    ));
    let config = InductiveMinerConfig {
        max_recursion_depth: 2,
        ..Default::default()
    };
    assert!(discover(&log, &config).is_ok());
}

#[test]
fn empty_log() {
    assert_eq!(tree_string(&UVCL::new()), "tau");
    assert_eq!(tree_string(&uvcl(vec![(vec![], 3)])), "tau");
    assert_eq!(
        tree_string(&uvcl(vec![(vec!["a"], 3), (vec![], 1)])),
        "X( tau, 'a' )"
    );
}
