//! End-to-end tests for full centrifuge/resuspend runs.
//!
//! These drive `CycleRunner` from a `CycleOptions` record (built in code or
//! parsed from TOML) and check the ordered steps, the rendered directives,
//! and the relabeled output tubes.

use std::sync::Once;

use spindle_core::{ConfigurationError, CycleOptions, CycleSpec, Directive, Item};
use spindle_scheduler::{CycleRunner, Step, centrifuge_resuspend_cycle};

// ── Tracing setup ────────────────────────────────────────────────

static TRACING_INIT: Once = Once::new();

/// Controlled by `RUST_LOG` (e.g. `RUST_LOG=spindle_scheduler=debug`).
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// ── Helpers ──────────────────────────────────────────────────────

fn spec(combine: bool) -> CycleSpec {
    CycleSpec {
        cent_temp: 4.0,
        cent_rpm: 4000,
        cent_time: 15.0,
        sus_media: "water".to_string(),
        sus_volume: 1.0,
        combine,
    }
}

/// Per-batch steps as `kind:marker`, setup and relabel dropped.
fn batch_trace(steps: &[Step]) -> Vec<String> {
    steps
        .iter()
        .filter_map(|step| {
            let marker = step.batch()?.marker.labels().concat();
            Some(format!("{}:{marker}", step.name()))
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────

#[test]
fn two_items_single_batch_single_cycle() {
    init_tracing();
    let options = CycleOptions {
        start_volume: 2.0,
        tube_volume: 1.0,
        centrifuge_slots: 8,
        cycle_count: None,
        cold: false,
        cycles: vec![spec(false)],
        items: vec![Item::new("50321"), Item::new("50322")],
    };

    let run = centrifuge_resuspend_cycle(&options).unwrap();

    assert_eq!(
        batch_trace(&run.steps),
        [
            "centrifuge:A",
            "remove_tubes:A",
            "decant:A",
            "resuspend:A",
        ]
    );

    // One batch holding both items' tubes.
    match &run.steps[2] {
        Step::GroupBatches { batches, .. } => {
            assert_eq!(batches.len(), 1);
            let ids: Vec<u32> = batches[0].tubes.iter().map(|t| t.short_id).collect();
            assert_eq!(ids, vec![1, 1, 2, 2]);
        }
        other => panic!("expected group_batches, got {other:?}"),
    }

    // Even batch: no balance warning anywhere.
    assert!(!run.directives.iter().any(Directive::is_warning));

    let relabeled: Vec<(u32, &str)> = run
        .tubes
        .iter()
        .map(|t| (t.short_id, t.item_id.as_str()))
        .collect();
    assert_eq!(
        relabeled,
        vec![(1, "50321"), (1, "50321"), (2, "50322"), (2, "50322")]
    );

    assert!(run.directives.contains(&Directive::note(
        "The tube(s) labeled as 2 should be relabeled as 50322."
    )));
    assert_eq!(run.directives.last().map(Directive::kind), Some("table"));
}

#[test]
fn cold_run_with_two_combines() {
    init_tracing();
    let toml_str = r#"
start_volume = 3.0
tube_volume = 1.0
centrifuge_slots = 4
cycle_count = 3
cold = true

[[cycles]]
cent_temp = 4.0
cent_rpm = 4000
cent_time = 15.0
sus_media = "water"
sus_volume = 1.0
combine = true

[[cycles]]
cent_temp = 4.0
cent_rpm = 4000
cent_time = 15.0
sus_media = "water"
sus_volume = 0.5
combine = true

[[cycles]]
cent_temp = 4.0
cent_rpm = 4000
cent_time = 15.0
sus_media = "10% glycerol"
sus_volume = 0.25

[[items]]
id = "701"

[[items]]
id = "702"

[[items]]
id = "703"

[[items]]
id = "704"
"#;
    let options = CycleOptions::from_toml_str(toml_str).unwrap();
    let run = centrifuge_resuspend_cycle(&options).unwrap();

    // 3 mL per item is bumped from 3 to 4 tubes; 16 tubes in 4 batches.
    assert_eq!(
        batch_trace(&run.steps),
        [
            // cycle 0
            "centrifuge:A",
            "remove_tubes:A",
            "centrifuge:B",
            "decant:A",
            "resuspend:A",
            "combine_tubes:A",
            "remove_tubes:B",
            "centrifuge:C",
            "decant:B",
            "resuspend:B",
            "combine_tubes:B",
            "remove_tubes:C",
            "centrifuge:D",
            "decant:C",
            "resuspend:C",
            "combine_tubes:C",
            // cycle 1: [AB, CD]
            "remove_tubes:D",
            "centrifuge:AB",
            "decant:D",
            "resuspend:D",
            "combine_tubes:D",
            "remove_tubes:AB",
            "centrifuge:CD",
            "decant:AB",
            "resuspend:AB",
            "combine_tubes:AB",
            // cycle 2: [ABCD]
            "remove_tubes:CD",
            "decant:CD",
            "resuspend:CD",
            "combine_tubes:CD",
            "centrifuge:ABCD",
            // teardown
            "remove_tubes:ABCD",
            "decant:ABCD",
            "resuspend:ABCD",
        ]
    );

    // Four items, one tube each survives two halvings.
    let ids: Vec<&str> = run.tubes.iter().map(|t| t.item_id.as_str()).collect();
    assert_eq!(ids, vec!["701", "702", "703", "704"]);

    let titles: Vec<&str> = run
        .directives
        .iter()
        .filter(|d| d.is_title())
        .filter_map(Directive::text)
        .collect();
    assert_eq!(
        &titles[..5],
        [
            "Grab required suspension media",
            "Get ice (skip if you already have ice)",
            "Prepare chilled tubes",
            "Aliquot items into 1 ml tubes for centrifuging",
            "Separate tubes into batches of 4 or less",
        ]
    );

    assert!(run.directives.contains(&Directive::check("At least 24 ml of water")));
    assert!(run.directives.contains(&Directive::check("At least 4 ml of 10% glycerol")));
    assert!(run.directives.contains(&Directive::note(
        "Together, batches A and B have a total of 4 tubes. \
         Reduce the sum of tubes to 2 by combining tubes from both batches."
    )));
}

#[test]
fn singleton_batch_cannot_combine() {
    init_tracing();
    let options = CycleOptions {
        start_volume: 4.0,
        tube_volume: 1.0,
        centrifuge_slots: 8,
        cycle_count: None,
        cold: false,
        cycles: vec![spec(true)],
        items: vec![Item::new("1"), Item::new("2")],
    };
    // Tubes [1,1,1,1,2,2,2,2] form a single batch A, which has no partner.
    assert_eq!(
        centrifuge_resuspend_cycle(&options),
        Err(ConfigurationError::UnpairedBatch { count: 1 })
    );
}

#[test]
fn odd_batches_warn_for_balance() {
    init_tracing();
    let options = CycleOptions {
        start_volume: 3.0,
        tube_volume: 1.0,
        centrifuge_slots: 4,
        cycle_count: None,
        cold: false,
        cycles: vec![spec(false), spec(false)],
        items: vec![Item::new("1"), Item::new("2"), Item::new("3")],
    };
    // 9 tubes: A and B hold 4, C holds 1 and needs a dummy tube.
    let run = centrifuge_resuspend_cycle(&options).unwrap();
    let balance: Vec<&Directive> = run
        .directives
        .iter()
        .filter(|d| d.is_warning())
        .collect();
    assert_eq!(balance.len(), 2, "one warning per spin of batch C");
    assert!(balance
        .iter()
        .all(|d| d.text().unwrap().starts_with("Balance the centrifuge")));
}

#[test]
fn declared_cycle_count_must_match() {
    let options = CycleOptions {
        start_volume: 2.0,
        tube_volume: 1.0,
        centrifuge_slots: 8,
        cycle_count: Some(3),
        cold: false,
        cycles: vec![spec(false)],
        items: vec![Item::new("1")],
    };
    assert!(matches!(
        CycleRunner::new(&options),
        Err(ConfigurationError::CycleCountMismatch {
            expected: 3,
            actual: 1
        })
    ));
}

#[test]
fn directives_serialize_for_renderers() {
    let options = CycleOptions {
        start_volume: 2.0,
        tube_volume: 1.0,
        centrifuge_slots: 2,
        cycle_count: None,
        cold: false,
        cycles: vec![spec(false)],
        items: vec![Item::new("1")],
    };
    let run = centrifuge_resuspend_cycle(&options).unwrap();
    let json = serde_json::to_value(&run.directives).unwrap();
    let kinds: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds[0], "title");
    assert!(kinds.contains(&"check"));
    assert!(kinds.iter().all(|k| ["title", "note", "warning", "check", "table"].contains(k)));
}

#[test]
fn infinite_start_volume_fails_without_output() {
    let toml_str = r#"
start_volume = inf
tube_volume = 1.0
centrifuge_slots = 8

[[cycles]]
cent_temp = 4.0
cent_rpm = 4000
cent_time = 10.0
sus_media = "water"
sus_volume = 1.0

[[items]]
id = "1"
"#;
    let options = CycleOptions::from_toml_str(toml_str).unwrap();
    assert!(matches!(
        centrifuge_resuspend_cycle(&options),
        Err(ConfigurationError::NonPositiveVolume {
            field: "start_volume",
            ..
        })
    ));

    let mut huge = options.clone();
    huge.start_volume = 1e18;
    assert!(matches!(
        centrifuge_resuspend_cycle(&huge),
        Err(ConfigurationError::TooManyTubes { .. })
    ));
}

#[test]
fn media_totals_are_rounded_for_display() {
    let small = CycleSpec {
        sus_volume: 0.1,
        ..spec(false)
    };
    let options = CycleOptions {
        start_volume: 2.0,
        tube_volume: 1.0,
        centrifuge_slots: 8,
        cycle_count: None,
        cold: false,
        cycles: vec![small.clone(), small.clone(), small],
        items: (1..=4).map(|i| Item::new(i.to_string())).collect(),
    };
    // 8 tubes, three 0.1 mL resuspensions each.
    let run = centrifuge_resuspend_cycle(&options).unwrap();
    assert!(run.directives.contains(&Directive::check("At least 2.4 ml of water")));
}
