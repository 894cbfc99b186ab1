//! Column-routed preprocessing built from the feature schema

use faer::Mat;
use rayon::prelude::*;

use super::encode::{Block, OneHotEncoder, Passthrough, StandardScaler};
use super::impute::{ImputeStrategy, SimpleImputer, MISSING_CATEGORY};
use crate::error::{EvalError, Result};
use crate::pipeline::estimator::Estimator;
use crate::pipeline::frame::{Column, FeatureFrame};
use crate::pipeline::schema::{FeatureGroup, FeatureSchema};

/// Second stage of a column chain
#[derive(Debug, Clone)]
pub enum Encoder {
    Scale(StandardScaler),
    OneHot(OneHotEncoder),
    Passthrough(Passthrough),
}

impl Estimator<Column> for Encoder {
    type Out = Block;

    fn fit(&mut self, input: &Column, labels: &[u8]) -> Result<()> {
        match self {
            Encoder::Scale(step) => step.fit(input, labels),
            Encoder::OneHot(step) => step.fit(input, labels),
            Encoder::Passthrough(step) => step.fit(input, labels),
        }
    }

    fn apply(&self, input: &Column) -> Result<Block> {
        match self {
            Encoder::Scale(step) => step.apply(input),
            Encoder::OneHot(step) => step.apply(input),
            Encoder::Passthrough(step) => step.apply(input),
        }
    }
}

/// Imputation followed by encoding, for a single named column
#[derive(Debug, Clone)]
pub struct ColumnChain {
    column: String,
    group: FeatureGroup,
    imputer: SimpleImputer,
    encoder: Encoder,
}

impl ColumnChain {
    /// Chain for `column` as prescribed by its group. Drop columns have no
    /// chain.
    pub fn for_group(column: &str, group: FeatureGroup) -> Option<Self> {
        let (strategy, encoder) = match group {
            FeatureGroup::NumericGeneral => (
                ImputeStrategy::Median,
                Encoder::Scale(StandardScaler::new(column)),
            ),
            FeatureGroup::NumericSpecial => (
                ImputeStrategy::ConstantNumber(0.0),
                Encoder::Scale(StandardScaler::new(column)),
            ),
            FeatureGroup::CategoricalGeneral => (
                ImputeStrategy::MostFrequent,
                Encoder::OneHot(OneHotEncoder::new(column)),
            ),
            FeatureGroup::CategoricalSpecial => (
                ImputeStrategy::ConstantText(MISSING_CATEGORY.to_string()),
                Encoder::OneHot(OneHotEncoder::new(column)),
            ),
            FeatureGroup::Binary => (
                ImputeStrategy::MostFrequent,
                Encoder::Passthrough(Passthrough::new(column)),
            ),
            FeatureGroup::Drop => return None,
        };

        Some(Self {
            column: column.to_string(),
            group,
            imputer: SimpleImputer::new(column, strategy),
            encoder,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn group(&self) -> FeatureGroup {
        self.group
    }

    /// Names of the output columns; only meaningful after fitting
    pub fn output_names(&self) -> Vec<String> {
        match &self.encoder {
            Encoder::OneHot(encoder) => encoder
                .categories()
                .iter()
                .map(|c| format!("{}_{}", self.column, c))
                .collect(),
            _ => vec![self.column.clone()],
        }
    }
}

impl Estimator<FeatureFrame> for ColumnChain {
    type Out = Block;

    fn fit(&mut self, input: &FeatureFrame, labels: &[u8]) -> Result<()> {
        let column = input.require(&self.column)?;
        let imputed = self.imputer.fit_apply(column, labels)?;
        self.encoder.fit(&imputed, labels)
    }

    fn apply(&self, input: &FeatureFrame) -> Result<Block> {
        let column = input.require(&self.column)?;
        let imputed = self.imputer.apply(column)?;
        self.encoder.apply(&imputed)
    }
}

/// Routes every modelled column through its chain and concatenates the
/// outputs into one dense matrix.
///
/// Output column order follows the schema's group order and the declaration
/// order inside each group.
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    chains: Vec<ColumnChain>,
    n_outputs: Option<usize>,
}

impl ColumnTransformer {
    pub fn new(chains: Vec<ColumnChain>) -> Self {
        Self {
            chains,
            n_outputs: None,
        }
    }

    pub fn chains(&self) -> &[ColumnChain] {
        &self.chains
    }

    /// Width of the output matrix; `None` before fitting
    pub fn n_outputs(&self) -> Option<usize> {
        self.n_outputs
    }

    /// Names of every output column, in matrix order
    pub fn output_names(&self) -> Vec<String> {
        self.chains.iter().flat_map(|c| c.output_names()).collect()
    }
}

impl Estimator<FeatureFrame> for ColumnTransformer {
    type Out = Mat<f64>;

    fn fit(&mut self, input: &FeatureFrame, labels: &[u8]) -> Result<()> {
        if input.height() == 0 {
            return Err(EvalError::data("Cannot fit preprocessing on zero rows"));
        }

        self.chains
            .par_iter_mut()
            .map(|chain| chain.fit(input, labels))
            .collect::<Result<Vec<()>>>()?;

        let n_outputs = self.chains.iter().map(|c| c.output_names().len()).sum();
        self.n_outputs = Some(n_outputs);
        Ok(())
    }

    fn apply(&self, input: &FeatureFrame) -> Result<Mat<f64>> {
        let n_outputs = self.n_outputs.ok_or_else(|| EvalError::NotFitted {
            model: "column transformer".to_string(),
        })?;

        let blocks: Vec<Block> = self
            .chains
            .par_iter()
            .map(|chain| chain.apply(input))
            .collect::<Result<Vec<_>>>()?;

        let mut x = Mat::<f64>::zeros(input.height(), n_outputs);
        let mut col_idx = 0;
        for block in &blocks {
            for values in block {
                for (row_idx, &v) in values.iter().enumerate() {
                    x[(row_idx, col_idx)] = v;
                }
                col_idx += 1;
            }
        }

        if col_idx != n_outputs {
            return Err(EvalError::data(format!(
                "Preprocessing produced {} columns, expected {}",
                col_idx, n_outputs
            )));
        }

        Ok(x)
    }
}

/// Build the unfitted column-routed transform for `schema`.
///
/// Drop-group columns get no chain, so they never reach a model.
pub fn compose(schema: &FeatureSchema) -> ColumnTransformer {
    let chains = schema
        .groups()
        .flat_map(|(group, columns)| {
            columns
                .iter()
                .filter_map(move |column| ColumnChain::for_group(column, group))
        })
        .collect();
    ColumnTransformer::new(chains)
}
