use crate::core::factor_graph_builder::{FGBuilderError, FGBuilderResult};
use crate::core::variable::VariableId;
use ndarray::{ArrayD, Axis, Dimension, IxDyn};

/// A non-negative weight table over an ordered scope of variables.
///
/// The i-th axis of the table corresponds to the i-th variable of the scope,
/// the length of that axis is the variable's domain size. Factors are values:
/// every operation below returns a new factor and leaves its inputs untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    scope: Vec<VariableId>,
    table: ArrayD<f64>,
}

impl Factor {
    /// Creates a factor from a scope and a dense table
    ///
    /// # Arguments
    ///
    /// * `scope` - Variables of the factor, without duplicates
    /// * `table` - Weights, one axis per scope variable
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{Factor, VariableId};
    /// use ndarray::{ArrayD, IxDyn};
    ///
    /// let table = ArrayD::from_shape_vec(IxDyn(&[2]), vec![0.3, 0.7]).unwrap();
    /// let factor = Factor::new(vec![VariableId(0)], table).unwrap();
    /// assert_eq!(factor.size(), 2);
    /// ```
    pub fn new(scope: Vec<VariableId>, table: ArrayD<f64>) -> FGBuilderResult<Self> {
        for (pos, id) in scope.iter().enumerate() {
            if scope[..pos].contains(id) {
                return Err(FGBuilderError::DuplicateScopeVariable(*id));
            }
        }
        if scope.len() != table.ndim() {
            return Err(FGBuilderError::ShapeMismatch {
                scope: scope.clone(),
                shape: table.shape().to_vec(),
            });
        }
        if let Some((id, _)) = scope.iter().zip(table.shape()).find(|(_, dim)| **dim == 0) {
            return Err(FGBuilderError::EmptyDomain(*id));
        }
        if let Some(weight) = table.iter().find(|w| !w.is_finite() || **w < 0f64) {
            return Err(FGBuilderError::InvalidWeight(*weight));
        }
        Ok(Factor { scope, table })
    }

    /// Creates a factor evaluating `weight` at every assignment of the scope
    ///
    /// # Arguments
    ///
    /// * `scope` - Variables of the factor
    /// * `shape` - Domain sizes of the scope variables
    /// * `weight` - Maps an assignment (one value per scope variable) to a weight
    pub fn from_fn(
        scope: Vec<VariableId>,
        shape: &[usize],
        mut weight: impl FnMut(&[usize]) -> f64,
    ) -> FGBuilderResult<Self> {
        if scope.len() != shape.len() {
            return Err(FGBuilderError::ShapeMismatch {
                scope,
                shape: shape.to_vec(),
            });
        }
        let table = ArrayD::from_shape_fn(IxDyn(shape), |assignment| weight(assignment.slice()));
        Factor::new(scope, table)
    }

    /// Creates a factor with the same weight at every assignment
    pub fn constant(scope: Vec<VariableId>, shape: &[usize], weight: f64) -> FGBuilderResult<Self> {
        Factor::from_fn(scope, shape, |_| weight)
    }

    // results of products and marginalization are valid by construction
    #[inline(always)]
    pub(crate) fn from_parts(scope: Vec<VariableId>, table: ArrayD<f64>) -> Self {
        Factor { scope, table }
    }

    #[inline(always)]
    pub fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    #[inline(always)]
    pub fn table(&self) -> &ArrayD<f64> {
        &self.table
    }

    /// Domain sizes of the scope variables
    #[inline(always)]
    pub fn shape(&self) -> &[usize] {
        self.table.shape()
    }

    /// Number of table entries
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.table.len()
    }

    #[inline(always)]
    pub fn contains(&self, variable: VariableId) -> bool {
        self.scope.contains(&variable)
    }

    #[inline(always)]
    fn axis_of(&self, variable: VariableId) -> Option<usize> {
        self.scope.iter().position(|id| *id == variable)
    }

    /// Returns the weight of a full assignment of the scope, or `None`
    /// if the assignment has a wrong length or an out of domain value
    #[inline]
    pub fn value(&self, assignment: &[usize]) -> Option<f64> {
        if assignment.len() != self.scope.len() {
            return None;
        }
        self.table.get(assignment).copied()
    }

    /// Sum of all weights
    #[inline]
    pub fn total(&self) -> f64 {
        self.table.sum()
    }

    /// Returns the union scope of several factors (in order of first appearance)
    /// together with the corresponding domain sizes
    pub fn union_scope(factors: &[&Factor]) -> (Vec<VariableId>, Vec<usize>) {
        let mut scope = Vec::new();
        let mut shape = Vec::new();
        for factor in factors {
            for (id, dim) in factor.scope.iter().zip(factor.table.shape()) {
                if !scope.contains(id) {
                    scope.push(*id);
                    shape.push(*dim);
                }
            }
        }
        (scope, shape)
    }

    /// Number of entries of the product of several factors,
    /// `None` if it does not fit into `usize`
    pub fn product_size(factors: &[&Factor]) -> Option<usize> {
        let (_, shape) = Factor::union_scope(factors);
        shape.iter().try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
    }

    /// Pointwise product over the union of scopes.
    ///
    /// For each assignment of the union scope the result holds the product of
    /// every factor's weight at the projection of that assignment onto its scope.
    /// An empty slice gives the scalar factor `1`.
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{Factor, VariableId};
    ///
    /// let a = Factor::from_fn(vec![VariableId(0)], &[2], |x| (x[0] + 1) as f64).unwrap();
    /// let b = Factor::from_fn(vec![VariableId(0), VariableId(1)], &[2, 3], |x| (x[1] + 1) as f64).unwrap();
    /// let ab = Factor::product(&[&a, &b]);
    /// assert_eq!(ab.scope(), &[VariableId(0), VariableId(1)]);
    /// assert_eq!(ab.value(&[1, 2]), Some(6.0));
    /// ```
    pub fn product(factors: &[&Factor]) -> Factor {
        let (scope, shape) = Factor::union_scope(factors);
        let projections: Vec<Vec<usize>> = factors
            .iter()
            .map(|factor| {
                factor
                    .scope
                    .iter()
                    .filter_map(|id| scope.iter().position(|u| u == id))
                    .collect()
            })
            .collect();
        let mut buffers: Vec<Vec<usize>> = projections.iter().map(|p| vec![0; p.len()]).collect();
        let table = ArrayD::from_shape_fn(IxDyn(&shape), |assignment| {
            let assignment = assignment.slice();
            let mut weight = 1f64;
            let iter = factors.iter().zip(&projections).zip(buffers.iter_mut());
            for ((factor, projection), buffer) in iter {
                for (dst, axis) in buffer.iter_mut().zip(projection) {
                    *dst = assignment[*axis];
                }
                weight *= factor.table[buffer.as_slice()];
                if weight == 0f64 {
                    break;
                }
            }
            weight
        });
        Factor { scope, table }
    }

    /// Sums a variable out of the factor. If the variable is not
    /// in the scope, returns an unchanged copy
    pub fn sum_out(&self, variable: VariableId) -> Factor {
        match self.axis_of(variable) {
            Some(axis) => {
                let table = self.table.sum_axis(Axis(axis));
                let scope = self
                    .scope
                    .iter()
                    .copied()
                    .filter(|id| *id != variable)
                    .collect();
                Factor { scope, table }
            }
            None => self.clone(),
        }
    }

    /// Clamps a variable to a value by zeroing every entry
    /// inconsistent with it. A variable outside of the scope
    /// leaves the factor unchanged
    pub fn clamp(&self, variable: VariableId, value: usize) -> Factor {
        let mut table = self.table.clone();
        if let Some(axis) = self.axis_of(variable) {
            for (k, mut lane) in table.axis_iter_mut(Axis(axis)).enumerate() {
                if k != value {
                    lane.fill(0f64);
                }
            }
        }
        Factor {
            scope: self.scope.clone(),
            table,
        }
    }
}
