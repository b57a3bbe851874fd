use super::{Pipeline, PipelineError, Stage};
use crate::application::stages::names::{GRAPH_SCAN, PLUGIN_SCAN};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Which stages a run keeps enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePreset {
    /// Every registered stage; graph-scan is mandatory
    #[default]
    Default,
    /// Only plugin-scan and the stages it transitively depends on
    PluginOnly,
}

/// Collects stages and validates them into an executable [`Pipeline`]
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
    preset: PipelinePreset,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(mut self, preset: PipelinePreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn add_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name.clone()).collect()
    }

    /// Toggles a registered stage
    ///
    /// # Errors
    /// Returns `PipelineError::UnknownStage` when no stage has that name
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PipelineError> {
        let known = self.stage_names();
        let stage = self
            .stages
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| PipelineError::UnknownStage {
                name: name.to_string(),
                known,
            })?;
        stage.enabled = enabled;
        Ok(())
    }

    /// Validates the DAG, applies the preset and orders the stages
    ///
    /// # Returns
    /// A pipeline whose stages are in a dependency-respecting order; among
    /// stages that are ready at the same time, registration order wins.
    ///
    /// # Errors
    /// Duplicate names, dangling dependencies, cycles, and a disabled
    /// graph-scan under the default preset.
    pub fn build(mut self) -> Result<Pipeline, PipelineError> {
        let mut index_by_name: HashMap<String, usize> = HashMap::new();
        for (index, stage) in self.stages.iter().enumerate() {
            if index_by_name.insert(stage.name.clone(), index).is_some() {
                return Err(PipelineError::DuplicateStage(stage.name.clone()));
            }
        }
        for stage in &self.stages {
            if let Some(dependency) = stage
                .dependencies
                .iter()
                .find(|d| !index_by_name.contains_key(*d))
            {
                return Err(PipelineError::UnknownDependency {
                    stage: stage.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }

        match self.preset {
            PipelinePreset::Default => {
                let graph_disabled = index_by_name
                    .get(GRAPH_SCAN)
                    .is_some_and(|&i| !self.stages[i].enabled);
                if graph_disabled {
                    return Err(PipelineError::GraphStageDisabled);
                }
            }
            PipelinePreset::PluginOnly => {
                let keep = ancestors_of(PLUGIN_SCAN, &self.stages, &index_by_name);
                for (index, stage) in self.stages.iter_mut().enumerate() {
                    stage.enabled = keep.contains(&index);
                }
            }
        }

        let order = topological_order(&self.stages, &index_by_name)?;
        let mut slots: Vec<Option<Stage>> = self.stages.into_iter().map(Some).collect();
        let stages = order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();
        Ok(Pipeline::new(stages))
    }
}

/// `name` plus everything it transitively depends on
fn ancestors_of(
    name: &str,
    stages: &[Stage],
    index_by_name: &HashMap<String, usize>,
) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut pending: Vec<usize> = index_by_name.get(name).copied().into_iter().collect();
    while let Some(index) = pending.pop() {
        if seen.insert(index) {
            pending.extend(
                stages[index]
                    .dependencies
                    .iter()
                    .filter_map(|d| index_by_name.get(d).copied()),
            );
        }
    }
    seen
}

/// Kahn's algorithm with a min-heap on registration index
fn topological_order(
    stages: &[Stage],
    index_by_name: &HashMap<String, usize>,
) -> Result<Vec<usize>, PipelineError> {
    let mut in_degree = vec![0usize; stages.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); stages.len()];
    for (index, stage) in stages.iter().enumerate() {
        for dependency in &stage.dependencies {
            if let Some(&upstream) = index_by_name.get(dependency) {
                in_degree[index] += 1;
                dependents[upstream].push(index);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..stages.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(stages.len());
    while let Some(index) = ready.pop_first() {
        order.push(index);
        for &next in &dependents[index] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() != stages.len() {
        let placed: HashSet<usize> = order.iter().copied().collect();
        let stages = stages
            .iter()
            .enumerate()
            .filter(|(i, _)| !placed.contains(i))
            .map(|(_, s)| s.name.clone())
            .collect();
        return Err(PipelineError::Cycle { stages });
    }
    Ok(order)
}
