//! End-to-end export over the fixture dataset. Needs a GPU adapter, so the
//! whole run is gated behind the `integration-tests` feature like the other
//! device-backed tests.

#[cfg(feature = "integration-tests")]
mod gpu {
    use std::fs;
    use std::path::Path;

    use suncg_export::batch::{Batch, BatchStatus, Exporter, HouseExporter};
    use suncg_export::config::ExportConfig;
    use suncg_export::context::Context;

    fn copy_tree(from: &Path, to: &Path) {
        fs::create_dir_all(to).unwrap();
        for entry in fs::read_dir(from).unwrap() {
            let entry = entry.unwrap();
            let target = to.join(entry.file_name());
            if entry.file_type().unwrap().is_dir() {
                copy_tree(&entry.path(), &target);
            } else {
                fs::copy(entry.path(), &target).unwrap();
            }
        }
    }

    /// Stage the fixture dataset in a scratch root so `output/` never lands
    /// in the repository.
    fn staged_config(name: &str) -> ExportConfig {
        let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dataset");
        let root = std::env::temp_dir().join(format!("suncg_export_e2e_{name}"));
        let _ = fs::remove_dir_all(&root);
        copy_tree(&source, &root);
        ExportConfig {
            data_root: format!("{}/", root.display()),
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

    fn output_names(config: &ExportConfig) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(config.output_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn exports_every_camera_buffer_combination() {
        let config = staged_config("full_run");
        let ctx = pollster::block_on(Context::new()).unwrap();
        let mut exporter = Exporter::new(ctx, config.clone()).unwrap();
        let mut batch = Batch::new(config.houses.clone());
        while batch.tick(&mut exporter) == BatchStatus::Working {}

        let names = output_names(&config);
        assert_eq!(
            names,
            vec![
                "testhouse_0_albedo.png",
                "testhouse_0_depth.png",
                "testhouse_0_semantic.png",
                "testhouse_1_albedo.png",
                "testhouse_1_depth.png",
                "testhouse_1_semantic.png",
            ]
        );

        for name in &names {
            let img = image::open(config.output_dir().join(name)).unwrap().to_rgb8();
            assert_eq!(img.dimensions(), (64, 64));
        }

        // The first camera faces the placed box; something must have drawn
        // over the black clear color.
        let albedo = image::open(config.output_path("testhouse", 0, "albedo"))
            .unwrap()
            .to_rgb8();
        assert!(albedo.pixels().any(|p| p.0 != [0, 0, 0]));
    }

    #[test]
    fn rerendering_overwrites_the_same_file_set() {
        let config = staged_config("idempotent");
        let ctx = pollster::block_on(Context::new()).unwrap();
        let mut exporter = Exporter::new(ctx, config.clone()).unwrap();

        exporter.export_house("testhouse").unwrap();
        let first = output_names(&config);
        exporter.export_house("testhouse").unwrap();
        let second = output_names(&config);

        assert_eq!(first, second);
    }
}
