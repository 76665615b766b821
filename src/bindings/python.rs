// Python facade: the `_core` extension module.
// Everything crosses the boundary as JSON strings so the Python side never
// needs to mirror the Rust types.

use crate::config::ResolverConfig;
use crate::diagnostics::CollectingSink;
use crate::resolver::{DerivationDefinition, Resolver};
use crate::store::{QuantityPopulation, QuantityType};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

#[pyclass(name = "_Resolver")]
#[derive(Debug, Clone, Default)]
pub struct PyResolver {
    population: QuantityPopulation,
    config: ResolverConfig,
}

#[pymethods]
impl PyResolver {
    #[new]
    #[pyo3(signature = (population_json, config_json=None))]
    pub fn new(population_json: &str, config_json: Option<&str>) -> PyResult<Self> {
        let population = QuantityPopulation::from_json(population_json)
            .map_err(|e| PyValueError::new_err(format!("invalid population: {}", e)))?;
        let config = match config_json {
            Some(json) => ResolverConfig::from_json(json).map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => ResolverConfig::default(),
        };
        Ok(Self { population, config })
    }

    /// Resolves one derivation given as JSON (`{"expression", "signature", ...}`)
    /// and returns the result as JSON.
    pub fn resolve(&self, target: &str, definition_json: &str) -> PyResult<String> {
        let definition: DerivationDefinition =
            serde_json::from_str(definition_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.resolve_definition(target, &definition)
    }

    /// The operator overloads of a derivation, as a JSON list.
    pub fn operator_derivations(&self, target: &str, definition_json: &str) -> PyResult<String> {
        let definition: DerivationDefinition =
            serde_json::from_str(definition_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let target = QuantityType::parse(target);
        let resolver = Resolver::new(&self.population, &self.config);

        let mut sink = CollectingSink::suppressing(self.config.suppressed_diagnostics.iter().copied());
        let result = resolver.resolve(&target, &definition, &mut sink).map_err(|f| PyValueError::new_err(f.to_string()))?;
        let overloads = resolver.operator_derivations(&target, &result).map_err(|e| PyValueError::new_err(e.to_string()))?;
        serde_json::to_string(&overloads).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

impl PyResolver {
    fn resolve_definition(&self, target: &str, definition: &DerivationDefinition) -> PyResult<String> {
        let resolver = Resolver::new(&self.population, &self.config);
        let mut sink = CollectingSink::suppressing(self.config.suppressed_diagnostics.iter().copied());
        let result = resolver
            .resolve(&QuantityType::parse(target), definition, &mut sink)
            .map_err(|failure| PyValueError::new_err(failure.to_string()))?;
        serde_json::to_string(&result).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

/// One-shot resolution: builds a resolver, resolves, returns the result JSON.
#[pyfunction]
#[pyo3(signature = (population_json, target, expression, signature, config_json=None))]
fn resolve_derivation(
    population_json: &str,
    target: &str,
    expression: &str,
    signature: Vec<String>,
    config_json: Option<&str>,
) -> PyResult<String> {
    let resolver = PyResolver::new(population_json, config_json)?;
    let definition = DerivationDefinition::new(expression, signature.into_iter().map(QuantityType::from));
    resolver.resolve_definition(target, &definition)
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyResolver>()?;
    m.add_function(wrap_pyfunction!(resolve_derivation, m)?)?;
    Ok(())
}
