//! Colour classification of player clusters.
//!
//! Every cluster core is described by its vertical layer profile, flattened
//! into `3 * n_layers` colour features. Two paths use these features:
//! - **Unsupervised**: a PCA trained on bootstrap sub-clusters of the
//!   training cores reduces every profile to three components, k-means with
//!   three groups partitions them, and the smallest group becomes the
//!   referees.
//! - **Supervised**: training cores are labelled by the nearest known player
//!   position and fed to an [`MvaEngine`]; evaluation cores take the class
//!   with the highest score.

use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info};
use rand::Rng;
use thiserror::Error;

use super::kmeans::{kmeans, KmeansError, KmeansResult};
use super::mva::{MvaEngine, MvaError};
use super::pca::{Pca, PcaError};
use crate::config::ClassificationConfig;
use crate::core::cluster::Cluster;
use crate::core::dataset::DataSet;
use crate::core::loaders::{read_true_positions, LoaderError};
use crate::core::point::Point;

pub const TEAM_A: usize = 0;
pub const TEAM_B: usize = 1;
pub const REFEREES: usize = 2;

/// Class names of the unsupervised path, indexed by class id.
pub const UNSUPERVISED_CLASS_NAMES: [&str; 3] = ["TeamA", "TeamB", "Referees"];

/// Number of k-means groups: two teams and the referees.
pub const KMEANS_GROUPS: usize = 3;

/// PCA components kept as the reduced colour.
pub const PCA_COMPONENTS: usize = 3;

/// Errors that can occur during classification.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Cluster {index} has no core, run the clustering cleanup first")]
    MissingCore { index: usize },

    #[error("Classification object {0:?} no longer exists")]
    MissingObject(ObjectRef),

    #[error("PCA must be trained before it is applied")]
    PcaNotTrained,

    #[error("No ground-truth positions in {0}")]
    NoTruthPositions(PathBuf),

    #[error("PCA failed: {0}")]
    Pca(#[from] PcaError),

    #[error("k-means failed: {0}")]
    Kmeans(#[from] KmeansError),

    #[error("Failed to load ground truth: {0}")]
    Loader(#[from] LoaderError),

    #[error("Engine failure: {0}")]
    Mva(#[from] MvaError),
}

/// Result type for classification operations.
pub type Result<T> = std::result::Result<T, ClassificationError>;

/// Handle on one object of the k-means pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
    /// Core of training cluster `i`.
    TrainingCore(usize),
    /// Bootstrap sub-cluster `j` of the core of training cluster `i`.
    TrainingSplit(usize, usize),
    /// Core of evaluation cluster `i`.
    EvaluationCore(usize),
}

fn object_mut<'a>(
    training: &'a mut [Cluster],
    evaluation: &'a mut [Cluster],
    object: ObjectRef,
) -> Option<&'a mut Cluster> {
    match object {
        ObjectRef::TrainingCore(i) => training.get_mut(i)?.core_mut(),
        ObjectRef::TrainingSplit(i, j) => training.get_mut(i)?.core_mut()?.splits_mut().get_mut(j),
        ObjectRef::EvaluationCore(i) => evaluation.get_mut(i)?.core_mut(),
    }
}

fn core_mut(cluster: &mut Cluster, index: usize) -> Result<&mut Cluster> {
    cluster
        .core_mut()
        .ok_or(ClassificationError::MissingCore { index })
}

/// Layer profile flattened as `r0, g0, b0, r1, g1, b1, ...`.
pub fn layer_features(cluster: &mut Cluster, n_layers: usize) -> Vec<f64> {
    cluster
        .layers(n_layers)
        .iter()
        .flat_map(|layer| layer.color.iter().map(|&c| c as f64))
        .collect()
}

/// Class id of every k-means group given the group sizes.
///
/// The smallest group (the first one on ties) is the referees and takes the
/// last id; the other groups are numbered from 0 in group order.
pub fn label_groups(sizes: &[usize]) -> Vec<usize> {
    let referees = sizes
        .iter()
        .enumerate()
        .min_by_key(|&(_, size)| *size)
        .map(|(i, _)| i);

    let mut next = 0;
    (0..sizes.len())
        .map(|i| {
            if Some(i) == referees {
                sizes.len() - 1
            } else {
                next += 1;
                next - 1
            }
        })
        .collect()
}

/// Index of the highest score, the first one on ties.
fn arg_max(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &s) in scores.iter().enumerate() {
        if best.is_none_or(|b| s > scores[b]) {
            best = Some(i);
        }
    }
    best
}

/// Classifier state carried between the training and evaluation steps.
#[derive(Debug, Default)]
pub struct ClassificationAlg {
    class_names: Vec<String>,
    pca: Option<Pca>,
}

impl ClassificationAlg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the classes, indexed by class id.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn pca(&self) -> Option<&Pca> {
        self.pca.as_ref()
    }

    /// Classify the evaluation clusters, learning from the training clusters.
    ///
    /// `engine` is only used when `config.unsupervised` is false.
    pub fn classify_clusters<R, E>(
        &mut self,
        training: &mut DataSet,
        evaluation: &mut DataSet,
        config: &ClassificationConfig,
        rng: &mut R,
        engine: &mut E,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        E: MvaEngine + ?Sized,
    {
        if config.unsupervised {
            self.run_unsupervised(training, evaluation, config, rng)
        } else {
            self.run_supervised(training, evaluation, config, rng, engine)
        }
    }

    /// PCA + k-means classification of the training and evaluation clusters.
    pub fn run_unsupervised<R: Rng + ?Sized>(
        &mut self,
        training: &mut DataSet,
        evaluation: &mut DataSet,
        config: &ClassificationConfig,
        rng: &mut R,
    ) -> Result<()> {
        let start = Instant::now();
        self.train_pca(training, config, rng)?;
        info!("PCA training done ({:.2?})", start.elapsed());

        let start = Instant::now();
        let objects = self.kmeans_inputs(training, evaluation, config, rng)?;
        self.apply_pca(training, evaluation, &objects, config.n_layers_per_cluster)?;
        info!(
            "PCA transformation of {} objects done ({:.2?})",
            objects.len(),
            start.elapsed()
        );

        let start = Instant::now();
        let values = objects
            .iter()
            .map(|&object| {
                object_mut(training.clusters_mut(), evaluation.clusters_mut(), object)
                    .map(|cl| cl.pca_color())
                    .ok_or(ClassificationError::MissingObject(object))
            })
            .collect::<Result<Vec<Point>>>()?;
        let result = self.run_kmeans_on_pca(&values, config, rng)?;
        info!(
            "K-means {} after {} iterations ({:.2?})",
            if result.converged { "converged" } else { "stopped" },
            result.iterations,
            start.elapsed()
        );

        self.class_names = UNSUPERVISED_CLASS_NAMES.iter().map(|s| s.to_string()).collect();
        let labels = label_groups(&result.group_sizes());
        debug!("k-means group sizes {:?}, labels {:?}", result.group_sizes(), labels);

        for (&object, &group) in objects.iter().zip(&result.assignments) {
            let cluster = object_mut(training.clusters_mut(), evaluation.clusters_mut(), object)
                .ok_or(ClassificationError::MissingObject(object))?;
            cluster.set_class_id(Some(labels[group]));
        }
        mirror_core_class_ids(training);
        mirror_core_class_ids(evaluation);
        Ok(())
    }

    /// Fit the PCA on the layer profiles of bootstrap sub-clusters of every
    /// training core.
    pub fn train_pca<R: Rng + ?Sized>(
        &mut self,
        training: &mut DataSet,
        config: &ClassificationConfig,
        rng: &mut R,
    ) -> Result<()> {
        let mut samples = Vec::new();
        for (index, cluster) in training.clusters_mut().iter_mut().enumerate() {
            let core = core_mut(cluster, index)?;
            for split in core.random_split(
                config.training_clusters_split_n,
                config.training_clusters_split_f,
                rng,
            ) {
                samples.push(layer_features(split, config.n_layers_per_cluster));
            }
        }
        debug!("Fitting PCA on {} profiles", samples.len());
        self.pca = Some(Pca::fit(&samples)?);
        Ok(())
    }

    /// The k-means pool: every training core followed by its bootstrap
    /// sub-clusters, then every evaluation core.
    fn kmeans_inputs<R: Rng + ?Sized>(
        &self,
        training: &mut DataSet,
        evaluation: &DataSet,
        config: &ClassificationConfig,
        rng: &mut R,
    ) -> Result<Vec<ObjectRef>> {
        let mut objects = Vec::new();
        for (i, cluster) in training.clusters_mut().iter_mut().enumerate() {
            let n_splits = core_mut(cluster, i)?
                .random_split(
                    config.training_clusters_split_n,
                    config.training_clusters_split_f,
                    rng,
                )
                .len();
            objects.push(ObjectRef::TrainingCore(i));
            objects.extend((0..n_splits).map(|j| ObjectRef::TrainingSplit(i, j)));
        }
        for (i, cluster) in evaluation.clusters().iter().enumerate() {
            if cluster.core().is_none() {
                return Err(ClassificationError::MissingCore { index: i });
            }
            objects.push(ObjectRef::EvaluationCore(i));
        }
        Ok(objects)
    }

    /// Store the leading PCA components of every object's profile as its
    /// PCA colour.
    pub fn apply_pca(
        &self,
        training: &mut DataSet,
        evaluation: &mut DataSet,
        objects: &[ObjectRef],
        n_layers: usize,
    ) -> Result<()> {
        let pca = self.pca.as_ref().ok_or(ClassificationError::PcaNotTrained)?;
        for &object in objects {
            let cluster = object_mut(training.clusters_mut(), evaluation.clusters_mut(), object)
                .ok_or(ClassificationError::MissingObject(object))?;
            let features = layer_features(cluster, n_layers);
            let c = pca.project_leading(&features, PCA_COMPONENTS)?;
            cluster.set_pca_color(Point::new(c[0] as f32, c[1] as f32, c[2] as f32));
        }
        Ok(())
    }

    /// Partition PCA colours into [`KMEANS_GROUPS`] groups.
    pub fn run_kmeans_on_pca<R: Rng + ?Sized>(
        &self,
        values: &[Point],
        config: &ClassificationConfig,
        rng: &mut R,
    ) -> Result<KmeansResult> {
        Ok(kmeans(
            values,
            KMEANS_GROUPS,
            config.max_kmeans_iterations,
            rng,
        )?)
    }

    /// Optionally train `engine`, then classify the evaluation clusters with it.
    pub fn run_supervised<R, E>(
        &mut self,
        training: &mut DataSet,
        evaluation: &mut DataSet,
        config: &ClassificationConfig,
        rng: &mut R,
        engine: &mut E,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        E: MvaEngine + ?Sized,
    {
        if config.run_training {
            let start = Instant::now();
            self.train_mva(training, config, rng, engine)?;
            info!("Engine training done ({:.2?})", start.elapsed());
        }
        let start = Instant::now();
        self.run_mva(evaluation, config, engine)?;
        info!("Engine classification done ({:.2?})", start.elapsed());
        Ok(())
    }

    /// Train `engine` on bootstrap profiles of the training cores.
    ///
    /// Each training cluster is labelled with the class of the ground-truth
    /// position nearest to its core centre of mass. Half of the bootstrap
    /// profiles, drawn at random, are used for training; the accuracy on the
    /// other half is logged.
    pub fn train_mva<R, E>(
        &mut self,
        training: &mut DataSet,
        config: &ClassificationConfig,
        rng: &mut R,
        engine: &mut E,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        E: MvaEngine + ?Sized,
    {
        let truth = read_true_positions(&config.true_positions_file)?;
        if truth.is_empty() {
            return Err(ClassificationError::NoTruthPositions(
                config.true_positions_file.clone(),
            ));
        }
        self.class_names = truth.class_names();

        let mut held_out: Vec<(Vec<f64>, usize)> = Vec::new();
        let mut n_trained = 0usize;
        for (index, cluster) in training.clusters_mut().iter_mut().enumerate() {
            let core_com = core_mut(cluster, index)?.com();
            let class_id = truth
                .nearest_class(&core_com)
                .and_then(|name| self.class_names.iter().position(|c| c == name));
            cluster.set_class_id(class_id);
            let Some(class_id) = class_id else {
                continue;
            };
            let label = &self.class_names[class_id];

            let core = core_mut(cluster, index)?;
            for split in core.random_split(
                config.training_clusters_split_n,
                config.training_clusters_split_f,
                rng,
            ) {
                let features = layer_features(split, config.n_layers_per_cluster);
                if rng.random_bool(0.5) {
                    engine.train(&features, label)?;
                    n_trained += 1;
                } else {
                    held_out.push((features, class_id));
                }
            }
        }
        engine.finish_training();

        let mut correct = 0usize;
        for (features, class_id) in &held_out {
            let predicted = arg_max(&engine.evaluate(features)?);
            if predicted
                .and_then(|i| engine.classes().get(i))
                .is_some_and(|name| *name == self.class_names[*class_id])
            {
                correct += 1;
            }
        }
        info!(
            "Engine trained on {} profiles, held-out accuracy {}/{}",
            n_trained,
            correct,
            held_out.len()
        );

        // training class ids follow the engine's class order from here on
        let engine_ids: Vec<Option<usize>> = self
            .class_names
            .iter()
            .map(|name| engine.classes().iter().position(|c| c == name))
            .collect();
        for cluster in training.clusters_mut() {
            let class_id = cluster.class_id().and_then(|id| engine_ids[id]);
            cluster.set_class_id(class_id);
        }
        self.class_names = engine.classes().to_vec();
        Ok(())
    }

    /// Give every evaluation cluster and its core the class with the highest
    /// engine score.
    pub fn run_mva<E: MvaEngine + ?Sized>(
        &mut self,
        evaluation: &mut DataSet,
        config: &ClassificationConfig,
        engine: &E,
    ) -> Result<()> {
        self.class_names = engine.classes().to_vec();
        for (index, cluster) in evaluation.clusters_mut().iter_mut().enumerate() {
            let core = core_mut(cluster, index)?;
            let features = layer_features(core, config.n_layers_per_cluster);
            let class_id = arg_max(&engine.evaluate(&features)?);
            core.set_class_id(class_id);
            cluster.set_class_id(class_id);
        }
        Ok(())
    }

    /// Planar core centres of mass of the clusters of every class, in class
    /// order.
    pub fn positions_by_class(&self, ds: &DataSet) -> Vec<(String, Vec<[f32; 2]>)> {
        self.class_names
            .iter()
            .enumerate()
            .map(|(class_id, name)| {
                let positions = ds
                    .clusters()
                    .iter()
                    .filter(|cl| cl.class_id() == Some(class_id))
                    .map(|cl| cl.core().unwrap_or(cl).com().planar())
                    .collect();
                (name.clone(), positions)
            })
            .collect()
    }
}

fn mirror_core_class_ids(ds: &mut DataSet) {
    for cluster in ds.clusters_mut() {
        let class_id = cluster.core().and_then(Cluster::class_id);
        cluster.set_class_id(class_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::{CloudPoint, PointIdAllocator, Rgb};
    use crate::processors::mva::NearestCentroidEngine;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RED: [i32; 3] = [220, 30, 30];
    const BLUE: [i32; 3] = [30, 30, 220];
    const GREEN: [i32; 3] = [30, 200, 40];

    /// A player-like cluster at `(x, z)` with a coloured shirt over dark legs.
    fn player(ids: &mut PointIdAllocator, x: f32, z: f32, shirt: [i32; 3]) -> Cluster {
        let mut cl = Cluster::new();
        for i in 0..30 {
            let y = 0.1 + i as f32 * 0.06;
            let color = if y < 0.9 {
                Rgb::new(20, 20, 20)
            } else {
                Rgb::new(shirt[0] + i % 3, shirt[1], shirt[2] - i % 2)
            };
            let dx = (i % 5) as f32 * 0.02;
            let dz = (i % 7) as f32 * 0.02;
            cl.add_point(&CloudPoint::new(Point::new(x + dx, y, z + dz), color, ids));
        }
        cl.set_seed(Point::new(x, 0.0, z));
        let core = cl.clone();
        cl.set_core(core);
        cl
    }

    fn team_data_sets() -> (DataSet, DataSet) {
        let mut ids = PointIdAllocator::default();
        let mut training = DataSet::new();
        let mut evaluation = DataSet::new();
        for i in 0..4 {
            let x = i as f32 * 3.0;
            training.clusters_mut().push(player(&mut ids, x, 0.0, RED));
            training.clusters_mut().push(player(&mut ids, x, 10.0, BLUE));
        }
        training.clusters_mut().push(player(&mut ids, 5.0, 5.0, GREEN));
        training.clusters_mut().push(player(&mut ids, 15.0, 5.0, GREEN));

        evaluation.clusters_mut().push(player(&mut ids, 1.0, 0.0, RED));
        evaluation.clusters_mut().push(player(&mut ids, 1.0, 10.0, BLUE));
        evaluation.clusters_mut().push(player(&mut ids, 8.0, 5.0, GREEN));
        evaluation.clusters_mut().push(player(&mut ids, 4.0, 0.0, RED));
        (training, evaluation)
    }

    fn small_config() -> ClassificationConfig {
        ClassificationConfig {
            training_clusters_split_n: 10,
            training_clusters_split_f: 0.5,
            ..ClassificationConfig::default()
        }
    }

    #[test]
    fn test_label_groups() {
        assert_eq!(label_groups(&[5, 2, 7]), vec![TEAM_A, REFEREES, TEAM_B]);
        assert_eq!(label_groups(&[1, 9, 9]), vec![REFEREES, TEAM_A, TEAM_B]);
        assert_eq!(label_groups(&[4, 4, 4]), vec![REFEREES, TEAM_A, TEAM_B]);
    }

    #[test]
    fn test_arg_max_first_maximum() {
        assert_eq!(arg_max(&[1.0, 3.0, 3.0]), Some(1));
        assert_eq!(arg_max(&[]), None);
    }

    #[test]
    fn test_layer_features_flatten_colors() {
        let mut ids = PointIdAllocator::default();
        let mut cl = player(&mut ids, 0.0, 0.0, RED);
        let features = layer_features(&mut cl, 5);
        assert_eq!(features.len(), 15);
        assert_eq!(&features[0..3], &[20.0, 20.0, 20.0]);
        assert!(features[12] > 200.0);
    }

    #[test]
    fn test_missing_core_is_reported() {
        let mut ids = PointIdAllocator::default();
        let mut training = DataSet::new();
        training.clusters_mut().push(Cluster::from_point(&CloudPoint::new(
            Point::default(),
            Rgb::default(),
            &mut ids,
        )));
        let mut rng = StdRng::seed_from_u64(1);
        let mut alg = ClassificationAlg::new();
        assert!(matches!(
            alg.train_pca(&mut training, &small_config(), &mut rng),
            Err(ClassificationError::MissingCore { index: 0 })
        ));
    }

    #[test]
    fn test_unsupervised_finds_teams_and_referees() {
        let config = small_config();

        // k-means may settle in a local minimum for an unlucky initialisation
        let classified = (0..50u64).find_map(|seed| {
            let (mut training, mut evaluation) = team_data_sets();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut alg = ClassificationAlg::new();
            let mut engine = NearestCentroidEngine::default();
            alg.classify_clusters(&mut training, &mut evaluation, &config, &mut rng, &mut engine)
                .unwrap();

            let red = evaluation.clusters()[0].class_id();
            let blue = evaluation.clusters()[1].class_id();
            let green = evaluation.clusters()[2].class_id();
            let training_ids: Vec<Option<usize>> =
                training.clusters().iter().map(Cluster::class_id).collect();
            let separated = red != blue
                && red != green
                && blue != green
                && evaluation.clusters()[3].class_id() == red
                && training_ids[..8]
                    .iter()
                    .enumerate()
                    .all(|(i, &id)| id == if i % 2 == 0 { red } else { blue })
                && training_ids[8..].iter().all(|&id| id == green);
            separated.then_some((alg, training, evaluation))
        });
        let (alg, training, evaluation) = classified.expect("no seed separated the teams");

        assert_eq!(alg.class_names(), &["TeamA", "TeamB", "Referees"]);
        assert_eq!(evaluation.clusters()[2].class_id(), Some(REFEREES));
        for ds in [&training, &evaluation] {
            for cl in ds.clusters() {
                assert!(cl.class_id().is_some());
                assert_eq!(cl.class_id(), cl.core().and_then(Cluster::class_id));
            }
        }
        assert_eq!(training.clusters()[8].class_id(), Some(REFEREES));
        assert_eq!(training.clusters()[0].class_id(), evaluation.clusters()[0].class_id());

        let positions = alg.positions_by_class(&evaluation);
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[REFEREES].1.len(), 1);
        assert_eq!(positions[TEAM_A].1.len() + positions[TEAM_B].1.len(), 3);
    }

    #[test]
    fn test_apply_pca_requires_training() {
        let (mut training, mut evaluation) = team_data_sets();
        let alg = ClassificationAlg::new();
        assert!(matches!(
            alg.apply_pca(
                &mut training,
                &mut evaluation,
                &[ObjectRef::EvaluationCore(0)],
                5
            ),
            Err(ClassificationError::PcaNotTrained)
        ));
    }

    #[test]
    fn test_supervised_training_and_classification() {
        let mut truth = NamedTempFile::new().unwrap();
        for i in 0..4 {
            writeln!(truth, "{} 0 TeamA", i as f32 * 3.0).unwrap();
            writeln!(truth, "{} 10 TeamB", i as f32 * 3.0).unwrap();
        }
        writeln!(truth, "5 5 Referees").unwrap();
        writeln!(truth, "15 5 Referees").unwrap();
        truth.flush().unwrap();

        let config = ClassificationConfig {
            unsupervised: false,
            run_training: true,
            true_positions_file: truth.path().to_path_buf(),
            ..small_config()
        };
        let (mut training, mut evaluation) = team_data_sets();
        let mut rng = StdRng::seed_from_u64(9);
        let mut alg = ClassificationAlg::new();
        let mut engine = NearestCentroidEngine::new(
            ["Referees", "TeamA", "TeamB"].iter().map(|s| s.to_string()).collect(),
        );
        alg.classify_clusters(&mut training, &mut evaluation, &config, &mut rng, &mut engine)
            .unwrap();

        assert_eq!(alg.class_names(), &["Referees", "TeamA", "TeamB"]);
        assert_eq!(training.clusters()[0].class_id(), Some(1));
        assert_eq!(training.clusters()[1].class_id(), Some(2));
        assert_eq!(training.clusters()[8].class_id(), Some(0));

        let ids: Vec<Option<usize>> =
            evaluation.clusters().iter().map(Cluster::class_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(0), Some(1)]);
        assert_eq!(evaluation.clusters()[2].core().unwrap().class_id(), Some(0));
    }

    #[test]
    fn test_engine_rejects_profiles_of_other_layer_count() {
        let mut engine = NearestCentroidEngine::default();
        engine.train(&[20.0; 15], "TeamA").unwrap();
        engine.train(&[200.0; 15], "TeamB").unwrap();
        engine.finish_training();

        let config = ClassificationConfig {
            unsupervised: false,
            n_layers_per_cluster: 2,
            ..small_config()
        };
        let (_, mut evaluation) = team_data_sets();
        let result = ClassificationAlg::new().run_mva(&mut evaluation, &config, &engine);
        assert!(matches!(
            result,
            Err(ClassificationError::Mva(MvaError::DimensionMismatch {
                expected: 15,
                found: 6
            }))
        ));
        assert!(evaluation.clusters().iter().all(|cl| cl.class_id().is_none()));
    }

    #[test]
    fn test_supervised_training_needs_truth_file() {
        let config = ClassificationConfig {
            unsupervised: false,
            run_training: true,
            true_positions_file: PathBuf::from("/nonexistent/truth.txt"),
            ..small_config()
        };
        let (mut training, mut evaluation) = team_data_sets();
        let mut rng = StdRng::seed_from_u64(9);
        let mut engine = NearestCentroidEngine::default();
        let result = ClassificationAlg::new().classify_clusters(
            &mut training,
            &mut evaluation,
            &config,
            &mut rng,
            &mut engine,
        );
        assert!(matches!(
            result,
            Err(ClassificationError::Loader(LoaderError::MissingTruthFile(_)))
        ));
    }
}
