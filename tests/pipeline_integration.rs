use std::fs;
use std::path::Path;

use anyhow::Result;
use sealmap::{
    ClusterMethod, ConfigError, Database, PipelineConfig, PipelineError, ReductionMethod, SealId,
    StoreError, UntaggedPolicy,
};
use tempfile::tempdir;

/// Creates a store on disk with three well separated groups of seals.
fn seed_store(path: &Path) -> Result<()> {
    let db = Database::create(path)?;
    let groups: [&[&str]; 3] = [&["lion", "crown"], &["ship", "anchor"], &["eagle", "tower"]];
    let mut id = 1;
    for tags in groups {
        for _ in 0..6 {
            db.add_seal(SealId::new(id), tags)?;
            id += 1;
        }
    }
    Ok(())
}

/// Creates a store where no two seals share a tag set.
fn seed_varied_store(path: &Path) -> Result<()> {
    let db = Database::create(path)?;
    let seals: [&[&str]; 10] = [
        &["lion", "crown"],
        &["lion", "crown", "key"],
        &["lion"],
        &["ship", "anchor"],
        &["ship", "anchor", "star"],
        &["ship"],
        &["eagle", "tower"],
        &["eagle", "tower", "key"],
        &["eagle"],
        &["crown", "star"],
    ];
    for (id, tags) in (1..).zip(seals) {
        db.add_seal(SealId::new(id), tags)?;
    }
    Ok(())
}

fn data_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .skip(1)
        .map(|line| line.split(',').map(String::from).collect())
        .collect())
}

#[test]
fn test_run_writes_one_row_per_seal() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    seed_store(&store)?;
    let seals_out = dir.path().join("layout.csv");

    let config = PipelineConfig::from_names(&store, &seals_out, "tsvd", "kmeans")?;
    let report = sealmap::run(&config)?;

    assert_eq!(report.seals, 18);
    assert_eq!(report.vocabulary_size, 6);
    assert_eq!(report.clusters_path, dir.path().join("cluster_layout.csv"));

    let header = fs::read_to_string(&seals_out)?;
    assert_eq!(header.lines().next(), Some("id,cluster,x,y"));

    let rows = data_rows(&seals_out)?;
    assert_eq!(rows.len(), 18);
    let ids: Vec<i64> = rows.iter().map(|row| row[0].parse().unwrap()).collect();
    assert_eq!(ids, (1..=18).collect::<Vec<_>>());
    for row in &rows {
        assert_eq!(row.len(), 4);
        let x: f64 = row[2].parse()?;
        let y: f64 = row[3].parse()?;
        assert!(x.is_finite() && y.is_finite());
    }
    Ok(())
}

#[test]
fn test_identical_seals_share_rows_and_clusters() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    seed_store(&store)?;
    let seals_out = dir.path().join("layout.csv");

    let config = PipelineConfig::from_names(&store, &seals_out, "pca", "kmeans")?;
    sealmap::run(&config)?;

    let rows = data_rows(&seals_out)?;
    for group in rows.chunks(6) {
        let first = &group[0][1..];
        assert!(group.iter().all(|row| &row[1..] == first));
    }
    Ok(())
}

#[test]
fn test_cluster_file_bounds_every_seal() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    seed_store(&store)?;
    let seals_out = dir.path().join("layout.csv");
    let clusters_out = dir.path().join("summary").join("extents.csv");

    let config = PipelineConfig::from_names(&store, &seals_out, "isomap", "dbscan")?
        .with_clusters_out(&clusters_out);
    let report = sealmap::run(&config)?;
    assert_eq!(report.clustering, ClusterMethod::Dbscan);

    let contents = fs::read_to_string(&clusters_out)?;
    assert_eq!(contents.lines().next(), Some("cluster,min_x,min_y,max_x,max_y"));
    let extents = data_rows(&clusters_out)?;
    let labels: Vec<i64> = extents.iter().map(|row| row[0].parse().unwrap()).collect();
    let mut sorted = labels.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(labels, sorted, "labels ascending and unique");

    // Output is rounded to six decimals
    let slack = 1e-5;
    for seal in data_rows(&seals_out)? {
        let label: i64 = seal[1].parse()?;
        let x: f64 = seal[2].parse()?;
        let y: f64 = seal[3].parse()?;
        let extent = extents
            .iter()
            .find(|row| row[0].parse::<i64>().ok() == Some(label))
            .expect("every label has an extent row");
        let bounds: Vec<f64> = extent[1..].iter().map(|v| v.parse().unwrap()).collect();
        assert!(bounds[0] - slack <= x && x <= bounds[2] + slack);
        assert!(bounds[1] - slack <= y && y <= bounds[3] + slack);
    }
    Ok(())
}

#[test]
fn test_unknown_method_fails_before_store_access() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("never-created.db");

    let result = PipelineConfig::from_names(&store, dir.path().join("out.csv"), "umap", "kmeans");

    assert!(matches!(result, Err(ConfigError::UnknownReduction(name)) if name == "umap"));
    assert!(!store.exists());
}

#[test]
fn test_missing_relation_is_store_error() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("partial.db");
    {
        let db = Database::create(&store)?;
        db.connection().execute_batch("DROP TABLE seal_has_tag;")?;
    }
    let config = PipelineConfig::new(&store, dir.path().join("out.csv"));

    let err = sealmap::run(&config).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Store(StoreError::MissingRelation("seal_has_tag"))
    ));
    assert!(!config.seals_out.exists());
    Ok(())
}

#[test]
fn test_untagged_policy_changes_row_count() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    seed_store(&store)?;
    Database::create(&store)?.add_seal(SealId::new(100), &[])?;

    let skipped = PipelineConfig::new(&store, dir.path().join("skip.csv"));
    assert_eq!(sealmap::run(&skipped)?.seals, 18);

    let included = PipelineConfig::new(&store, dir.path().join("include.csv"))
        .with_untagged(UntaggedPolicy::Include);
    let report = sealmap::run(&included)?;
    assert_eq!(report.seals, 19);
    assert_eq!(report.untagged, UntaggedPolicy::Include);
    Ok(())
}

#[test]
fn test_every_reduction_runs_end_to_end() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    seed_varied_store(&store)?;

    for method in ReductionMethod::ALL {
        let seals_out = dir.path().join(format!("{method}.csv"));
        let config = PipelineConfig::from_names(&store, &seals_out, method.name(), "kmeans")?;

        let report = sealmap::run(&config)?;

        assert_eq!(report.reduction, method);
        assert_eq!(data_rows(&seals_out)?.len(), 10, "{method}");
        assert!(dir.path().join(format!("cluster_{method}.csv")).exists());
    }
    Ok(())
}

#[test]
fn test_report_serializes_to_json() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    seed_store(&store)?;

    let config = PipelineConfig::new(&store, dir.path().join("layout.csv"));
    let report = sealmap::run(&config)?;
    let json = serde_json::to_value(&report)?;

    assert_eq!(json["seals"], 18);
    assert_eq!(json["reduction"], "pca");
    assert_eq!(json["clustering"], "kmeans");
    assert_eq!(json["untagged"], "skip");
    Ok(())
}

#[test]
fn test_every_reduction_handles_one_shared_tag_set() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    {
        let db = Database::create(&store)?;
        for id in 1..=8 {
            db.add_seal(SealId::new(id), &["lion", "crown"])?;
        }
    }

    for method in ReductionMethod::ALL {
        for clustering in ClusterMethod::ALL {
            let seals_out = dir.path().join(format!("{method}-{clustering}.csv"));
            let config =
                PipelineConfig::from_names(&store, &seals_out, method.name(), clustering.name())?;

            let report = sealmap::run(&config)?;

            assert_eq!(report.seals, 8, "{method}/{clustering}");
            let rows = data_rows(&seals_out)?;
            assert!(rows.iter().all(|row| row[1..] == rows[0][1..]));
        }
    }
    Ok(())
}

#[test]
fn test_default_pipeline_on_two_tag_groups() -> Result<()> {
    let dir = tempdir()?;
    let store = dir.path().join("seals.db");
    {
        let db = Database::create(&store)?;
        for id in 1..=10 {
            let tag = if id <= 5 { "lion" } else { "ship" };
            db.add_seal(SealId::new(id), &[tag])?;
        }
    }
    let seals_out = dir.path().join("layout.csv");

    let report = sealmap::run(&PipelineConfig::new(&store, &seals_out))?;

    assert_eq!(report.seals, 10);
    assert_eq!(report.clusters, 2);
    Ok(())
}
