use super::error::BenchmarkError;
use std::fmt;

/// A single parameter value of a configuration point.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:?}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// One concrete combination of sweep parameters, in axis declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationPoint {
    fields: Vec<(String, ParamValue)>,
}

impl ConfigurationPoint {
    pub fn new(fields: Vec<(String, ParamValue)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, ParamValue)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn require_int(&self, name: &'static str) -> Result<i64, BenchmarkError> {
        self.get(name)
            .and_then(ParamValue::as_int)
            .ok_or_else(|| self.missing(name))
    }

    pub fn require_bool(&self, name: &'static str) -> Result<bool, BenchmarkError> {
        self.get(name)
            .and_then(ParamValue::as_bool)
            .ok_or_else(|| self.missing(name))
    }

    pub fn require_text(&self, name: &'static str) -> Result<&str, BenchmarkError> {
        self.get(name)
            .and_then(ParamValue::as_text)
            .ok_or_else(|| self.missing(name))
    }

    fn missing(&self, name: &'static str) -> BenchmarkError {
        BenchmarkError::MissingParameter {
            point: self.to_string(),
            name,
        }
    }
}

impl fmt::Display for ConfigurationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Axis {
    name: String,
    values: Vec<ParamValue>,
}

/// Declared parameter value sets whose Cartesian product is the sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterGrid {
    axes: Vec<Axis>,
}

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an axis. Axes declared earlier vary slowest.
    pub fn axis<V: Into<ParamValue>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, BenchmarkError> {
        if self.axes.iter().any(|axis| axis.name == name) {
            return Err(BenchmarkError::InvalidGrid(format!(
                "axis '{}' is declared twice",
                name
            )));
        }
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(BenchmarkError::InvalidGrid(format!(
                "axis '{}' has no values",
                name
            )));
        }
        self.axes.push(Axis {
            name: name.to_string(),
            values,
        });
        Ok(self)
    }

    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(|axis| axis.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.axes.iter().map(|axis| axis.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All configuration points, first axis outermost.
    pub fn points(&self) -> Vec<ConfigurationPoint> {
        let mut points = vec![Vec::with_capacity(self.axes.len())];
        for axis in &self.axes {
            points = points
                .into_iter()
                .flat_map(|prefix: Vec<(String, ParamValue)>| {
                    axis.values.iter().map(move |value| {
                        let mut fields = prefix.clone();
                        fields.push((axis.name.clone(), value.clone()));
                        fields
                    })
                })
                .collect();
        }
        points.into_iter().map(ConfigurationPoint::new).collect()
    }
}
