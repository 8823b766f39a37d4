//! The sample/train loop: pick a random task and training example, sample
//! a program from the guide, apply it, and train the guide on whether it
//! reconstructed the target. Grounded on `original_source/src/main.c`'s
//! abstraction/filter/transform loop structure (brute-force there; here
//! driven by `Guide`/`Trail` sampling instead of exhaustive search).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::abstraction::{Abstraction, ConnectedComponents, NoAbstraction};
use crate::dsl::enumerate::{enumerate_bindings, enumerate_filters, enumerate_transforms};
use crate::dsl::{FilterChain, Transform};
use crate::graph::{graph_from_grid, undo_abstraction};
use crate::guide::{choose, choose_from, Backbone, Guide, GuideBuilder, Trail};
use crate::task::Task;

/// Matches `guide.h`'s `MAX_CHOICES`, used to size masked categorical
/// choice points whose true cardinality varies per sample (filter and
/// transform candidates).
pub const MAX_CHOICES: usize = 32;

pub struct SampleRecord {
    pub task: String,
    pub example: usize,
    pub loss: f32,
    pub reconstructed: bool,
    pub abstraction: &'static str,
    pub filter: String,
    pub transform: String,
}

fn abstractions() -> Vec<Box<dyn Abstraction>> {
    vec![
        Box::new(NoAbstraction),
        Box::new(ConnectedComponents::remove_all_background()),
        Box::new(ConnectedComponents::remove_background_edges()),
        Box::new(ConnectedComponents::remove_background_corners()),
    ]
}

pub struct Driver {
    tasks: Vec<Task>,
    guide: Guide,
    rng: StdRng,
}

impl Driver {
    pub fn new(tasks: Vec<Task>, backbone: Box<dyn Backbone>, seed: u64) -> Self {
        let mut builder = GuideBuilder::new();
        builder.add_choice(abstractions().len(), "abstraction");
        builder.add_choice(MAX_CHOICES, "filter");
        builder.add_choice(MAX_CHOICES, "transform");
        let guide = builder.build(backbone);
        Driver { tasks, guide, rng: StdRng::seed_from_u64(seed) }
    }

    fn mask(count: usize) -> u64 {
        let n = count.min(MAX_CHOICES);
        if n >= 64 {
            u64::MAX
        } else {
            (1u64 << n) - 1
        }
    }

    /// Runs one sample/train cycle. Returns `Ok(None)` when the task pool
    /// or the chosen example has no candidates to sample from (an empty
    /// grid, say); the caller should simply try again.
    pub fn run_iteration(&mut self) -> crate::errors::GPResult<Option<SampleRecord>> {
        if self.tasks.is_empty() {
            return Ok(None);
        }
        let task_idx = self.rng.gen_range(0..self.tasks.len());
        let task = &self.tasks[task_idx];
        if task.train.is_empty() {
            return Ok(None);
        }
        let example_idx = self.rng.gen_range(0..task.train.len());
        let example = &task.train[example_idx];
        let Some(target) = &example.output else { return Ok(None) };

        let input = graph_from_grid(&example.input)?;
        let output = graph_from_grid(target)?;
        let background = input.derived_properties().background_color;

        let mut trail = Trail::new(&mut self.guide, &input, &output);

        let abstractions = abstractions();
        let abs_dist = trail.next_choice().clone();
        let abs_idx = choose(&abs_dist, &mut self.rng).min(abstractions.len() - 1);
        trail.observe_choice(Some(abs_idx));
        let abstraction = &abstractions[abs_idx];

        let abstracted = match abstraction.apply(&input) {
            Ok(g) => g,
            Err(_) => {
                trail.backtrack_to(0);
                let loss = trail.finish(false);
                return Ok(Some(SampleRecord {
                    task: task.name.clone(),
                    example: example_idx,
                    loss,
                    reconstructed: false,
                    abstraction: abstraction.name(),
                    filter: "none".into(),
                    transform: "none".into(),
                }));
            }
        };

        let refs = [&abstracted];
        let filters = enumerate_filters(&refs);
        let filter_dist = trail.next_choice().clone();
        let filter_mask = Self::mask(filters.len());
        let Some(filter_idx) = choose_from(&filter_dist, filter_mask, &mut self.rng) else {
            trail.observe_choice(None);
            let loss = trail.finish(false);
            return Ok(Some(failure_record(task, example_idx, abstraction.name(), loss)));
        };
        trail.observe_choice(Some(filter_idx));
        let filter: &FilterChain = &filters[filter_idx];

        let matching: Vec<_> = abstracted.node_ids().into_iter().filter(|id| filter.matches(&abstracted, *id)).collect();
        if matching.is_empty() {
            let loss = trail.finish(false);
            return Ok(Some(failure_record(task, example_idx, abstraction.name(), loss)));
        }

        let bindings = enumerate_bindings(&refs);
        let transforms = enumerate_transforms(&bindings);
        let transform_dist = trail.next_choice().clone();
        let transform_mask = Self::mask(transforms.len());
        let Some(transform_idx) = choose_from(&transform_dist, transform_mask, &mut self.rng) else {
            trail.observe_choice(None);
            let loss = trail.finish(false);
            return Ok(Some(failure_record(task, example_idx, abstraction.name(), loss)));
        };
        trail.observe_choice(Some(transform_idx));
        let transform: &Transform = &transforms[transform_idx];

        let mut working = abstracted;
        let mut transformed = true;
        for &node in &matching {
            if transform.apply(&mut working, node).is_err() {
                transformed = false;
            }
        }
        let reconstructed = transformed
            && undo_abstraction(&working, background).ok().map(|grid| &grid == target).unwrap_or(false);

        let loss = trail.finish(reconstructed);
        Ok(Some(SampleRecord {
            task: task.name.clone(),
            example: example_idx,
            loss,
            reconstructed,
            abstraction: abstraction.name(),
            filter: format!("{:?}", filter.0),
            transform: format!("{:?}", transform),
        }))
    }
}

fn failure_record(task: &Task, example_idx: usize, abstraction: &'static str, loss: f32) -> SampleRecord {
    SampleRecord {
        task: task.name.clone(),
        example: example_idx,
        loss,
        reconstructed: false,
        abstraction,
        filter: "none".into(),
        transform: "none".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::UniformBackbone;
    use crate::task::Example;

    fn trivial_task() -> Task {
        Task {
            name: "t".into(),
            train: vec![Example { input: vec![vec![1]], output: Some(vec![vec![1]]) }],
            test: vec![],
        }
    }

    #[test]
    fn run_iteration_produces_a_sample_record() {
        let mut driver = Driver::new(vec![trivial_task()], Box::new(UniformBackbone), 1);
        let record = driver.run_iteration().unwrap();
        assert!(record.is_some());
    }

    #[test]
    fn empty_task_pool_yields_no_record() {
        let mut driver = Driver::new(vec![], Box::new(UniformBackbone), 1);
        assert!(driver.run_iteration().unwrap().is_none());
    }
}
