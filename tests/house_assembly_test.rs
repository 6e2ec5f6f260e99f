//! CPU-side pipeline tests against the on-disk fixture dataset: house
//! parsing, camera pose loading and scene assembly, without a GPU.

use suncg_export::camera::load_camera_poses;
use suncg_export::config::ExportConfig;
use suncg_export::house::{House, NodeType};
use suncg_export::scene::assemble;

fn fixture_config() -> ExportConfig {
    ExportConfig {
        data_root: format!("{}/tests/fixtures/dataset/", env!("CARGO_MANIFEST_DIR")),
        export_dim: 64,
        buffer_ids: vec![
            "albedo".to_string(),
            "depth".to_string(),
            "semantic".to_string(),
        ],
        houses: vec!["testhouse".to_string()],
        default_shader: "albedo".to_string(),
    }
}

#[test]
fn fixture_house_parses_with_unknown_type_fallback() {
    let cfg = fixture_config();
    let house = House::load_from_json(&cfg.house_json_path("testhouse")).unwrap();
    assert_eq!(house.id, "testhouse");
    let nodes = &house.levels[0].nodes;
    assert_eq!(nodes.len(), 5);
    assert_eq!(nodes[3].node_type, NodeType::Unknown("Portal".to_string()));
}

#[test]
fn fixture_house_assembles_floor_and_object_only() {
    let cfg = fixture_config();
    let house = House::load_from_json(&cfg.house_json_path("testhouse")).unwrap();
    let placements = assemble(&house, &cfg);

    // One Room floor variant (w/c are absent and legitimately skipped), one
    // valid Object; the Box, the unknown type and the invalid node produce
    // nothing.
    let labels: Vec<_> = placements.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Node_rm0f", "Node_box0"]);

    let object = &placements[1];
    assert_eq!(object.transform.position.y, 0.25);
    assert_eq!(object.transform.scale.x, 0.5);
}

#[test]
fn fixture_camera_poses_load_in_file_order() {
    let cfg = fixture_config();
    let poses = load_camera_poses(&cfg.camera_path("testhouse")).unwrap();
    assert_eq!(poses.len(), 2);
    assert_eq!(poses[0].index, 0);
    assert_eq!(poses[1].index, 1);
    assert!((poses[0].fov_deg - 80.0).abs() < 0.01);
    assert!((poses[0].quality - 0.9).abs() < 1e-6);
    // Second camera looks straight down.
    assert_eq!(poses[1].towards.y, -1.0);
}

#[test]
fn missing_camera_file_is_a_per_house_error() {
    let cfg = fixture_config();
    assert!(load_camera_poses(&cfg.camera_path("nonexistent")).is_err());
}
