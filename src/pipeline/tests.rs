use super::*;
use crate::reduction::ReductionError;
use crate::{ClusterLabel, SealId};
use tempfile::tempdir;

const FIXTURE: &[(i64, &[&str])] = &[
    (1, &["lion", "crown"]),
    (2, &["lion", "crown", "shield"]),
    (3, &["lion"]),
    (4, &["eagle", "tower"]),
    (5, &["eagle", "tower", "key"]),
    (6, &["eagle"]),
    (7, &["ship", "anchor"]),
    (8, &["ship", "anchor", "star"]),
    (9, &["ship"]),
    (10, &["crown", "key"]),
    (11, &["star"]),
    (12, &["shield", "tower"]),
];

fn seed(db: &Database) {
    for (id, tags) in FIXTURE {
        db.add_seal(SealId::new(*id), tags)
            .expect("failed to seed seal");
    }
}

fn fixture_service() -> LayoutService {
    let db = Database::in_memory().expect("failed to create in-memory database");
    seed(&db);
    LayoutService::new(db)
}

fn options(reduction: ReductionMethod, clustering: ClusterMethod) -> LayoutOptions {
    LayoutOptions {
        reduction,
        clustering,
        ..Default::default()
    }
}

#[test]
fn layout_options_default_to_pca_kmeans_skip() {
    let options = LayoutOptions::default();

    assert_eq!(options.reduction, ReductionMethod::Pca);
    assert_eq!(options.clustering, ClusterMethod::KMeans);
    assert_eq!(options.untagged, UntaggedPolicy::Skip);
}

#[test]
fn layout_is_aligned_with_seals() {
    let service = fixture_service();

    let layout = service
        .compute_layout(&options(ReductionMethod::Tsvd, ClusterMethod::KMeans))
        .expect("layout should compute");

    assert_eq!(layout.seals.len(), FIXTURE.len());
    assert_eq!(layout.vocabulary_size, 9);
    let ids: Vec<i64> = layout.seals.iter().map(|s| s.id.get()).collect();
    let expected: Vec<i64> = FIXTURE.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, expected);
}

#[test]
fn every_seal_lies_inside_its_cluster_extent() {
    let service = fixture_service();

    for reduction in [ReductionMethod::Tsvd, ReductionMethod::Isomap] {
        for clustering in ClusterMethod::ALL {
            let layout = service
                .compute_layout(&options(reduction, clustering))
                .expect("layout should compute");

            for seal in &layout.seals {
                let extent = layout
                    .summary
                    .get(seal.cluster)
                    .expect("every label has an extent");
                assert!(extent.contains(seal.position), "{reduction}/{clustering}");
            }
            let members: usize = layout.summary.iter().map(|(_, e)| e.members).sum();
            assert_eq!(members, layout.seals.len());
        }
    }
}

#[test]
fn kmeans_never_labels_noise() {
    let service = fixture_service();

    let layout = service
        .compute_layout(&options(ReductionMethod::Isomap, ClusterMethod::KMeans))
        .unwrap();

    assert!(layout.seals.iter().all(|s| !s.cluster.is_noise()));
    assert_eq!(layout.summary.noise_points(), 0);
}

#[test]
fn identical_tag_sets_share_a_position() {
    let db = Database::in_memory().unwrap();
    seed(&db);
    db.add_seal(SealId::new(20), &["lion", "crown"]).unwrap();
    let service = LayoutService::new(db);

    let layout = service
        .compute_layout(&options(ReductionMethod::Tsvd, ClusterMethod::KMeans))
        .unwrap();

    let first = layout.seals.iter().find(|s| s.id == SealId::new(1)).unwrap();
    let twin = layout.seals.iter().find(|s| s.id == SealId::new(20)).unwrap();
    assert_eq!(first.position, twin.position);
    assert_eq!(first.cluster, twin.cluster);
}

#[test]
fn untagged_seals_skipped_by_default() {
    let db = Database::in_memory().unwrap();
    seed(&db);
    db.add_seal(SealId::new(99), &[]).unwrap();
    let service = LayoutService::new(db);

    let layout = service
        .compute_layout(&options(ReductionMethod::Tsvd, ClusterMethod::KMeans))
        .unwrap();

    assert!(layout.seals.iter().all(|s| s.id != SealId::new(99)));
}

#[test]
fn untagged_seals_included_on_request() {
    let db = Database::in_memory().unwrap();
    seed(&db);
    db.add_seal(SealId::new(99), &[]).unwrap();
    let service = LayoutService::new(db);

    let layout = service
        .compute_layout(&LayoutOptions {
            reduction: ReductionMethod::Tsvd,
            clustering: ClusterMethod::KMeans,
            untagged: UntaggedPolicy::Include,
        })
        .unwrap();

    let untagged = layout
        .seals
        .iter()
        .find(|s| s.id == SealId::new(99))
        .expect("untagged seal should be laid out");
    // Uncentered projection of the zero vector is the origin
    assert_eq!(untagged.position, Coordinate::new(0.0, 0.0));
    assert_eq!(layout.seals.last().map(|s| s.id), Some(SealId::new(99)));
}

#[test]
fn empty_store_gives_empty_layout() {
    let service = LayoutService::new(Database::in_memory().unwrap());

    for reduction in ReductionMethod::ALL {
        let layout = service
            .compute_layout(&options(reduction, ClusterMethod::KMeans))
            .expect("empty store should not fail");

        assert!(layout.seals.is_empty());
        assert!(layout.summary.is_empty());
        assert_eq!(layout.vocabulary_size, 0);
    }
}

#[test]
fn empty_vocabulary_is_reported_as_reduction_error() {
    let db = Database::in_memory().unwrap();
    db.add_seal(SealId::new(1), &[]).unwrap();
    db.add_seal(SealId::new(2), &[]).unwrap();
    let service = LayoutService::new(db);

    for reduction in ReductionMethod::ALL {
        let result = service.compute_layout(&LayoutOptions {
            reduction,
            untagged: UntaggedPolicy::Include,
            ..Default::default()
        });

        match result {
            Err(PipelineError::Reduction { method, source }) => {
                assert_eq!(method, reduction);
                assert!(matches!(source, ReductionError::ZeroWidth));
            }
            other => panic!("expected reduction error, got {other:?}"),
        }
    }
}

#[test]
fn single_tag_vocabulary_rejected_by_linear_methods() {
    let db = Database::in_memory().unwrap();
    db.add_seal(SealId::new(1), &["only"]).unwrap();
    db.add_seal(SealId::new(2), &["only"]).unwrap();
    db.add_seal(SealId::new(3), &[]).unwrap();
    let service = LayoutService::new(db);

    for reduction in [ReductionMethod::Pca, ReductionMethod::Tsvd] {
        let result = service.compute_layout(&LayoutOptions {
            reduction,
            untagged: UntaggedPolicy::Include,
            ..Default::default()
        });

        assert!(
            matches!(
                result,
                Err(PipelineError::Reduction {
                    source: ReductionError::InsufficientDimensions { .. },
                    ..
                })
            ),
            "{reduction}"
        );
    }
}

#[test]
fn config_new_derives_cluster_path() {
    let config = PipelineConfig::new("seals.db", "out/seals.csv");

    assert_eq!(config.clusters_out, PathBuf::from("out/cluster_seals.csv"));
    assert_eq!(config.options, LayoutOptions::default());
}

#[test]
fn config_from_names_parses_methods() {
    let config = PipelineConfig::from_names("seals.db", "seals.csv", "isomap", "dbscan").unwrap();

    assert_eq!(config.options.reduction, ReductionMethod::Isomap);
    assert_eq!(config.options.clustering, ClusterMethod::Dbscan);
}

#[test]
fn config_from_names_rejects_unknown_reduction() {
    let result = PipelineConfig::from_names("seals.db", "seals.csv", "bogus", "kmeans");
    assert!(matches!(result, Err(ConfigError::UnknownReduction(_))));
}

#[test]
fn config_from_names_rejects_unknown_clustering() {
    let result = PipelineConfig::from_names("seals.db", "seals.csv", "pca", "hdbscan");
    assert!(matches!(result, Err(ConfigError::UnknownClustering(_))));
}

#[test]
fn run_writes_both_files() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("seals.db");
    seed(&Database::create(&store).unwrap());
    let seals_out = dir.path().join("seals.csv");

    let mut config = PipelineConfig::new(&store, &seals_out);
    config.options.reduction = ReductionMethod::Tsvd;
    let report = run(&config).expect("run should succeed");

    assert_eq!(report.seals, FIXTURE.len());
    assert_eq!(report.vocabulary_size, 9);
    assert_eq!(report.noise_points, 0);
    assert_eq!(report.clusters_path, dir.path().join("cluster_seals.csv"));

    let seals_csv = std::fs::read_to_string(&seals_out).unwrap();
    let mut lines = seals_csv.lines();
    assert_eq!(lines.next(), Some("id,cluster,x,y"));
    assert_eq!(lines.count(), FIXTURE.len());

    let clusters_csv = std::fs::read_to_string(&report.clusters_path).unwrap();
    let mut lines = clusters_csv.lines();
    assert_eq!(lines.next(), Some("cluster,min_x,min_y,max_x,max_y"));
    assert_eq!(lines.count(), report.clusters);
}

#[test]
fn run_rejects_colliding_outputs_before_opening_store() {
    let dir = tempdir().unwrap();
    let seals_out = dir.path().join("seals.csv");
    let config = PipelineConfig::new(dir.path().join("missing.db"), &seals_out)
        .with_clusters_out(&seals_out);

    let err = run(&config).unwrap_err();

    assert!(err.is_config(), "got {err}");
    assert!(!seals_out.exists());
}

#[test]
fn run_with_missing_store_writes_nothing() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::new(dir.path().join("missing.db"), dir.path().join("seals.csv"));

    let err = run(&config).unwrap_err();

    assert!(matches!(err, PipelineError::Store(_)));
    assert!(!config.seals_out.exists());
    assert!(!config.clusters_out.exists());
    assert!(!config.store.exists());
}

#[test]
fn run_with_failing_reduction_writes_nothing() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("seals.db");
    {
        let db = Database::create(&store).unwrap();
        db.add_seal(SealId::new(1), &[]).unwrap();
    }
    let config = PipelineConfig::new(&store, dir.path().join("seals.csv"))
        .with_untagged(UntaggedPolicy::Include);

    let err = run(&config).unwrap_err();

    assert!(matches!(err, PipelineError::Reduction { .. }));
    assert!(!config.seals_out.exists());
    assert!(!config.clusters_out.exists());
}

#[test]
fn noise_label_reaches_summary() {
    let service = fixture_service();

    let layout = service
        .compute_layout(&options(ReductionMethod::Isomap, ClusterMethod::Dbscan))
        .unwrap();

    let noisy = layout
        .seals
        .iter()
        .filter(|s| s.cluster == ClusterLabel::NOISE)
        .count();
    assert_eq!(layout.summary.noise_points(), noisy);
}

#[test]
fn identical_tag_sets_lay_out_under_every_method() {
    let db = Database::in_memory().unwrap();
    for id in 1..=6 {
        db.add_seal(SealId::new(id), &["lion", "crown"]).unwrap();
    }
    let service = LayoutService::new(db);

    for reduction in ReductionMethod::ALL {
        for clustering in ClusterMethod::ALL {
            let layout = service
                .compute_layout(&options(reduction, clustering))
                .unwrap_or_else(|e| panic!("{reduction}/{clustering}: {e}"));

            assert_eq!(layout.seals.len(), 6);
            let first = layout.seals[0].position;
            assert!(layout.seals.iter().all(|s| s.position == first));
            assert_eq!(layout.summary.len(), 1, "{reduction}/{clustering}");
        }
    }
}

#[test]
fn untagged_seals_with_nonempty_vocabulary_survive_tsne() {
    let db = Database::in_memory().unwrap();
    db.add_tag("lion").unwrap();
    db.add_tag("ship").unwrap();
    for id in 1..=5 {
        db.add_seal(SealId::new(id), &[]).unwrap();
    }
    let service = LayoutService::new(db);

    let layout = service
        .compute_layout(&LayoutOptions {
            reduction: ReductionMethod::Tsne,
            clustering: ClusterMethod::KMeans,
            untagged: UntaggedPolicy::Include,
        })
        .expect("all-zero vectors should embed");

    assert_eq!(layout.vocabulary_size, 2);
    assert!(layout.seals.iter().all(|s| s.position == Coordinate::new(0.0, 0.0)));
}

#[test]
fn pca_on_two_tag_groups_succeeds() {
    let db = Database::in_memory().unwrap();
    for id in 1..=5 {
        db.add_seal(SealId::new(id), &["lion"]).unwrap();
    }
    for id in 6..=10 {
        db.add_seal(SealId::new(id), &["ship"]).unwrap();
    }
    let service = LayoutService::new(db);

    let layout = service
        .compute_layout(&LayoutOptions::default())
        .expect("rank-one input should lay out under pca");

    assert_eq!(layout.seals.len(), 10);
    assert!(layout.seals.iter().all(|s| s.position.y == 0.0));
    assert_ne!(layout.seals[0].cluster, layout.seals[9].cluster);
}

#[test]
fn validate_catches_collision_spelled_differently() {
    let config = PipelineConfig::new("seals.db", "out.csv").with_clusters_out("./out.csv");

    assert!(matches!(config.validate(), Err(ConfigError::OutputCollision(_))));
}

#[test]
fn validate_catches_collision_through_parent_dir() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    let seals_out = dir.path().join("out.csv");
    let config = PipelineConfig::new(dir.path().join("seals.db"), &seals_out)
        .with_clusters_out(dir.path().join("nested").join("..").join("out.csv"));

    let err = run(&config).unwrap_err();

    assert!(err.is_config(), "got {err}");
    assert!(!seals_out.exists());
}

#[test]
fn validate_accepts_default_cluster_path() {
    assert!(PipelineConfig::new("seals.db", "out.csv").validate().is_ok());
}
