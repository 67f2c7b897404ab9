/// Paired samples of the independent and dependent variables.
///
/// Data is arranged as `n` coordinate series of `m` sample points each,
/// for both `x` and `y`. Most fits have a single series (plain `y = f(x)`
/// data); multi-series datasets share one weight per sample point across
/// all of that point's coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Vec<Vec<f64>>,
    y: Vec<Vec<f64>>,
}

impl Dataset {
    /// Single-series data: one `x` and one `y` value per sample point.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x: vec![x],
            y: vec![y],
        }
    }

    /// Multi-series data. The series counts of `x` and `y` must match, and
    /// every series must have the same length; this is checked when a fit
    /// starts, not here.
    pub fn with_series(x: Vec<Vec<f64>>, y: Vec<Vec<f64>>) -> Self {
        Self { x, y }
    }

    /// How many coordinate series each sample point has.
    pub fn series_count(&self) -> usize {
        self.x.len()
    }

    /// How many sample points each series holds.
    pub fn point_count(&self) -> usize {
        self.x.first().map_or(0, Vec::len)
    }

    pub(crate) fn x(&self, series: usize, point: usize) -> f64 {
        self.x[series][point]
    }

    pub(crate) fn y(&self, series: usize, point: usize) -> f64 {
        self.y[series][point]
    }

    pub(crate) fn x_series(&self) -> &[Vec<f64>] {
        &self.x
    }

    pub(crate) fn y_series(&self) -> &[Vec<f64>] {
        &self.y
    }
}
