use std::fs;
use std::path::Path;
use smartcore::ensemble::random_forest_regressor::{RandomForestRegressor, RandomForestRegressorParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::mean_absolute_error;
use crate::errors::TrainError;

/// The fitted regressor as persisted to and reloaded from the model artifact
pub type TempModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Fits, evaluates and persists the next-hour temperature regressor.
/// A random forest handles the mixed-scale tabular features without
/// manual scaling.
pub struct Trainer {
    model_path: String,
    n_trees: u16,
    seed: u64,
}

impl Trainer {
    /// Returns a Trainer writing its artifact to the given path
    ///
    /// # Arguments
    ///
    /// * 'model_path' - path of the model artifact file
    /// * 'n_trees' - number of trees in the forest
    /// * 'seed' - seed for the tree randomization, fixed for reproducibility
    pub fn new(model_path: &str, n_trees: u16, seed: u64) -> Trainer {
        Trainer { model_path: model_path.to_string(), n_trees, seed }
    }

    /// Fits the regressor on the training partition
    ///
    /// # Arguments
    ///
    /// * 'x_train' - training feature matrix
    /// * 'y_train' - training targets
    pub fn fit(&self, x_train: &Vec<Vec<f64>>, y_train: &Vec<f64>) -> Result<TempModel, TrainError> {
        if x_train.is_empty() {
            return Err(TrainError("empty training partition".to_string()));
        }

        let mut params = RandomForestRegressorParameters::default();
        params.n_trees = self.n_trees.into();
        params.seed = self.seed;

        let matrix = DenseMatrix::from_2d_vec(x_train);

        Ok(RandomForestRegressor::fit(&matrix, y_train, params)?)
    }

    /// Returns the mean absolute error of the model over the test
    /// partition. An empty test partition is an error, not a pass.
    ///
    /// # Arguments
    ///
    /// * 'model' - the fitted model
    /// * 'x_test' - test feature matrix
    /// * 'y_test' - test targets
    pub fn evaluate(&self, model: &TempModel, x_test: &Vec<Vec<f64>>, y_test: &Vec<f64>)
                    -> Result<f64, TrainError> {
        if x_test.is_empty() {
            return Err(TrainError("empty test partition, nothing to evaluate".to_string()));
        }

        let matrix = DenseMatrix::from_2d_vec(x_test);
        let predictions = model.predict(&matrix)?;

        Ok(mean_absolute_error(y_test, &predictions))
    }

    /// Writes the model artifact, fully replacing any previous one. The
    /// artifact is written to a temporary file which is then renamed over
    /// the destination, so the previous model survives a failed write.
    ///
    /// # Arguments
    ///
    /// * 'model' - the fitted model to persist
    pub fn persist(&self, model: &TempModel) -> Result<(), TrainError> {
        let path = Path::new(&self.model_path);
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let json = serde_json::to_string(model)?;
        let tmp_path = format!("{}.tmp", self.model_path);
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Reloads the persisted model artifact
    ///
    pub fn load(&self) -> Result<TempModel, TrainError> {
        let json = fs::read_to_string(&self.model_path)?;
        let model: TempModel = serde_json::from_str(&json)?;

        Ok(model)
    }
}
