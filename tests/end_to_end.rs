//! End-to-end tests over the public API.
//!
//! Tables are loaded the way the CLI loads them (JSON) and run through the
//! full search.

use rand::RngCore;
use u_assign::config::{IncompletePolicy, SchedulerConfig};
use u_assign::error::{AssignError, Result};
use u_assign::models::ConstraintsTable;
use u_assign::scheduler::Scheduler;
use u_assign::variants::PartialPairingHook;

const CHORES: &str = r#"{
    "people": ["Ann", "Bo", "Cy"],
    "tasks": ["Cook", "Clean", "Shop"],
    "preferences": [[3, 0, 0], [1, 2, 0], [1, 1, 1]]
}"#;

fn config(order: usize, seed: u64) -> SchedulerConfig {
    SchedulerConfig::new().with_order(order).with_random_seed(seed)
}

#[test]
fn test_json_table_to_pairing() {
    let table: ConstraintsTable = serde_json::from_str(CHORES).unwrap();
    let report = Scheduler::new(table)
        .with_config(config(50, 12))
        .run()
        .unwrap();

    assert_eq!(report.solved, 50);
    let best = report.best.unwrap();
    // Shop has one candidate, then Clean, then Cook
    assert_eq!(best.score, 3 + 2 + 1);
    assert_eq!(best.pairing().to_string(), "Cook: Ann\nClean: Bo\nShop: Cy\n");
}

#[test]
fn test_invalid_json_table_rejected() {
    let raw = r#"{
        "people": ["Ann", "Ann"],
        "tasks": ["Cook"],
        "preferences": [[1], [1]]
    }"#;
    let err = serde_json::from_str::<ConstraintsTable>(raw).unwrap_err();
    assert!(err.to_string().contains("Ann"));
}

#[test]
fn test_block_constraint_restricts_pool() {
    let mut table = ConstraintsTable::new()
        .with_people(["Ann", "Bo", "Cy"])
        .with_tasks(["Cook", "Clean", "Shop"]);
    for person in ["Ann", "Bo", "Cy"] {
        table.add_person(person, Some(vec![1, 1, 1])).unwrap();
    }
    table.apply_block_constraint(&["Cy"], &["Shop"]).unwrap();

    for seed in 0..10 {
        let report = Scheduler::new(table.clone())
            .with_config(config(5, seed))
            .optimal_solution(IncompletePolicy::Forbid)
            .unwrap();
        let pairing = report.best.unwrap().pairing();
        assert_eq!(pairing.person_for("Shop"), Some("Cy"));
        assert!(pairing.is_complete());
    }
}

#[test]
fn test_more_tasks_than_people_standard_policy() {
    let mut table = ConstraintsTable::new().with_tasks(["Cook", "Clean", "Shop", "Walk"]);
    table.add_person("Ann", Some(vec![2, 1, 0, 0])).unwrap();
    table.add_person("Bo", Some(vec![0, 1, 2, 0])).unwrap();

    let report = Scheduler::new(table)
        .with_config(config(40, 3))
        .optimal_solution(IncompletePolicy::Standard)
        .unwrap();

    assert_eq!(report.failed, 0);
    let best = report.best.unwrap();
    let pairing = best.pairing();
    assert_eq!(pairing.assigned_count(), 2);
    assert!(pairing.unassigned_people.is_empty());
    assert!(pairing.unassigned_tasks.contains(&"Walk".to_string()));
    assert!(best.score >= 3);
}

#[test]
fn test_unfillable_task_without_incomplete_gives_no_solution() {
    let table: ConstraintsTable = serde_json::from_str(
        r#"{
            "people": ["Ann", "Bo"],
            "tasks": ["Cook", "Clean"],
            "preferences": [[1, 0], [1, 0]]
        }"#,
    )
    .unwrap();

    let report = Scheduler::new(table)
        .with_config(config(20, 1))
        .optimal_solution(IncompletePolicy::Forbid)
        .unwrap();
    assert!(report.best.is_none());
    assert_eq!(report.failed, 20);
}

#[test]
fn test_preselected_and_closed_entries_survive() {
    let table: ConstraintsTable = serde_json::from_str(
        r#"{
            "people": ["Ann", "Bo", "Cy"],
            "tasks": ["Cook", "Clean"],
            "preferences": [[1, 0], [0, 3], [0, 2]],
            "closed_people": ["Ann"],
            "closed_tasks": ["Cook"]
        }"#,
    )
    .unwrap();

    let report = Scheduler::new(table)
        .with_config(config(30, 9))
        .optimal_solution(IncompletePolicy::Allow)
        .unwrap();
    let pairing = report.best.unwrap().pairing();
    assert_eq!(pairing.person_for("Cook"), Some("Ann"));
    assert_eq!(pairing.person_for("Clean"), Some("Bo"));
    assert_eq!(pairing.unassigned_people, vec!["Cy".to_string()]);
}

#[test]
fn test_config_from_toml_drives_search() {
    let config = SchedulerConfig::from_toml_str(
        r#"
        order = 25
        random_seed = 99
        allow_incomplete = "allow"
        parallel = true
        "#,
    )
    .unwrap();
    let table: ConstraintsTable = serde_json::from_str(CHORES).unwrap();

    let report = Scheduler::new(table).with_config(config).run().unwrap();
    assert_eq!(report.seed, 99);
    assert_eq!(report.solved + report.failed, 25);
}

#[test]
fn test_partial_pairing_from_json() {
    let table: ConstraintsTable = serde_json::from_str(
        r#"{
            "people": ["Full", "H1 (half)", "H2 (half)"],
            "tasks": ["Cook", "Clean"],
            "preferences": [[1, 1], [2, 1], [1, 2]]
        }"#,
    )
    .unwrap();

    let report = Scheduler::new(table)
        .with_config(config(20, 4))
        .with_hook(PartialPairingHook::new().with_variant_count(2))
        .run()
        .unwrap();

    assert_eq!(report.variant_count, 2);
    let best = report.best.unwrap();
    assert!(best
        .table
        .people()
        .contains(&"H2 (half) and H1 (half)".to_string()));
    assert!(best.pairing().is_complete());
}

#[test]
fn test_hook_error_propagates() {
    let failing = |_: &ConstraintsTable, _: &mut dyn RngCore| -> Result<Vec<ConstraintsTable>> {
        Err(AssignError::validation("no variants today"))
    };
    let table: ConstraintsTable = serde_json::from_str(CHORES).unwrap();
    let err = Scheduler::new(table)
        .with_config(config(5, 0))
        .with_hook(failing)
        .run()
        .unwrap_err();
    assert_eq!(err, AssignError::Validation("no variants today".to_string()));
}
