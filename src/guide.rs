//! Trail-based probabilistic guide: an ordered sequence of categorical
//! choice points, sampled against an external neural backbone and trained
//! by reinforcement on whether the resulting program reconstructed its
//! target. Grounded on `original_source/src/guide.h` (authoritative
//! declarations) with `original_source/src/guide.c`'s simplified/stub
//! bodies used only for the sampling-math shape (inverse-CDF `choose`,
//! bitmask-renormalized `choose_from`).

use std::any::Any;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// One registered choice point in the schedule a `Driver` walks through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideItem {
    pub n_choices: usize,
    pub name: String,
}

/// Normalized categorical distribution over a choice point's outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    pub p: Vec<f64>,
}

impl Categorical {
    pub fn uniform(n: usize) -> Self {
        Categorical { p: vec![1.0 / n as f64; n] }
    }

    /// Mixes a backbone-provided distribution with a uniform exploration
    /// term, per spec.md's guide contract.
    pub fn mixed(backbone: &[f64], epsilon: f64) -> Self {
        let n = backbone.len();
        let uniform = 1.0 / n as f64;
        let sum: f64 = backbone.iter().sum();
        let p = backbone
            .iter()
            .map(|&v| {
                let normalized = if sum > 0.0 { v / sum } else { uniform };
                (1.0 - epsilon) * normalized + epsilon * uniform
            })
            .collect();
        Categorical { p }
    }
}

/// Builds the ordered choice-point schedule, replacing the split
/// `guide_builder_t`/`guide_t` handle with a single owned accumulator.
#[derive(Default)]
pub struct GuideBuilder {
    items: Vec<GuideItem>,
}

impl GuideBuilder {
    pub fn new() -> Self {
        GuideBuilder::default()
    }

    pub fn add_choice(&mut self, n_choices: usize, name: impl Into<String>) -> &mut Self {
        self.items.push(GuideItem { n_choices, name: name.into() });
        self
    }

    pub fn build(self, backbone: Box<dyn Backbone>) -> Guide {
        let network = backbone.build_network(&self.items);
        Guide { items: self.items, backbone, network }
    }
}

/// Opaque neural backbone, kept external per spec.md: this crate does not
/// specify how choices are actually scored, only the contract a trail
/// samples and trains against.
pub trait Backbone: Send + Sync {
    fn build_network(&self, items: &[GuideItem]) -> Box<dyn Any + Send + Sync>;
    fn new_trail(&self, network: &(dyn Any + Send + Sync), input: &Graph, output: &Graph) -> Box<dyn Any + Send>;
    fn next_choice(&self, network: &(dyn Any + Send + Sync), trail_state: &mut (dyn Any + Send), item: &GuideItem) -> Vec<f64>;
    fn observe_choice(&self, network: &(dyn Any + Send + Sync), trail_state: &mut (dyn Any + Send), item: &GuideItem, choice: Option<usize>);
    fn complete_trail(&self, network: &mut (dyn Any + Send + Sync), trail_state: Box<dyn Any + Send>, success: bool) -> f32;
}

/// Trivial uniform-distribution stub useful for property tests and for
/// exercising the trail/backtrack machinery without a real network.
pub struct UniformBackbone;

struct UniformTrailState;

impl Backbone for UniformBackbone {
    fn build_network(&self, _items: &[GuideItem]) -> Box<dyn Any + Send + Sync> {
        Box::new(())
    }

    fn new_trail(&self, _network: &(dyn Any + Send + Sync), _input: &Graph, _output: &Graph) -> Box<dyn Any + Send> {
        Box::new(UniformTrailState)
    }

    fn next_choice(&self, _network: &(dyn Any + Send + Sync), _trail_state: &mut (dyn Any + Send), item: &GuideItem) -> Vec<f64> {
        vec![1.0; item.n_choices]
    }

    fn observe_choice(&self, _network: &(dyn Any + Send + Sync), _trail_state: &mut (dyn Any + Send), _item: &GuideItem, _choice: Option<usize>) {}

    fn complete_trail(&self, _network: &mut (dyn Any + Send + Sync), _trail_state: Box<dyn Any + Send>, success: bool) -> f32 {
        if success {
            0.0
        } else {
            1.0
        }
    }
}

pub struct Guide {
    items: Vec<GuideItem>,
    backbone: Box<dyn Backbone>,
    network: Box<dyn Any + Send + Sync>,
}

impl Guide {
    pub fn items(&self) -> &[GuideItem] {
        &self.items
    }
}

/// One recorded choice, kept so `backtrack` can rewind the cursor.
struct TrailCell {
    item_index: usize,
    choice: Option<usize>,
}

/// One execution through the guide's choice schedule. The source engine's
/// linked `trail_t` chain is replaced by a flat `Vec<TrailCell>` used as a
/// LIFO stack, per spec.md's REDESIGN FLAG.
pub struct Trail<'g> {
    guide: &'g mut Guide,
    cursor: usize,
    cells: Vec<TrailCell>,
    state: Box<dyn Any + Send>,
    pending: Option<Categorical>,
}

impl<'g> Trail<'g> {
    pub fn new(guide: &'g mut Guide, input: &Graph, output: &Graph) -> Self {
        let state = guide.backbone.new_trail(guide.network.as_ref(), input, output);
        Trail { guide, cursor: 0, cells: Vec::new(), state, pending: None }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The mixed categorical distribution for the current choice point.
    /// `epsilon = 0.1` matches spec.md's 10% uniform-exploration mix.
    pub fn next_choice(&mut self) -> &Categorical {
        let item = &self.guide.items[self.cursor];
        let raw = self.guide.backbone.next_choice(self.guide.network.as_ref(), self.state.as_mut(), item);
        let dist = Categorical::mixed(&raw, 0.1);
        self.pending = Some(dist);
        self.pending.as_ref().unwrap()
    }

    /// Records `choice` (or `None` to marginalize, the `-1` convention in
    /// `guide.h`) and advances the cursor.
    pub fn observe_choice(&mut self, choice: Option<usize>) {
        let item = &self.guide.items[self.cursor];
        self.guide.backbone.observe_choice(self.guide.network.as_ref(), self.state.as_mut(), item, choice);
        self.cells.push(TrailCell { item_index: self.cursor, choice });
        self.cursor += 1;
        self.pending = None;
    }

    /// Pops the most recent choice and rewinds the cursor to it, freeing
    /// the partial record the way `backtrack` frees a `trail_t` node.
    pub fn backtrack(&mut self) -> bool {
        match self.cells.pop() {
            Some(cell) => {
                self.cursor = cell.item_index;
                self.pending = None;
                true
            }
            None => false,
        }
    }

    /// Rewinds to a previously observed cursor position, discarding every
    /// recorded choice made after it. Used by the driver when a sampled
    /// operator rejects and the whole candidate must be retried.
    pub fn backtrack_to(&mut self, cursor: usize) {
        while self.cursor > cursor && self.backtrack() {}
    }

    pub fn finish(self, success: bool) -> f32 {
        self.guide.backbone.complete_trail(&mut self.guide.network, self.state, success)
    }
}

/// Inverse-CDF sample from a categorical distribution.
pub fn choose(dist: &Categorical, rng: &mut impl Rng) -> usize {
    let r: f64 = rng.gen();
    let mut cum = 0.0;
    for (i, &p) in dist.p.iter().enumerate() {
        cum += p;
        if r < cum {
            return i;
        }
    }
    dist.p.len().saturating_sub(1)
}

/// Samples from a categorical distribution restricted to the outcomes
/// whose bit is set in `valid_flags`, renormalizing over just those,
/// mirroring `choose_from`'s bitmask semantics.
pub fn choose_from(dist: &Categorical, valid_flags: u64, rng: &mut impl Rng) -> Option<usize> {
    let valid: Vec<(usize, f64)> = dist
        .p
        .iter()
        .enumerate()
        .filter(|(i, _)| valid_flags & (1 << i) != 0)
        .map(|(i, &p)| (i, p))
        .collect();
    let total: f64 = valid.iter().map(|(_, p)| p).sum();
    if total <= 0.0 || valid.is_empty() {
        return None;
    }
    let r: f64 = rng.gen::<f64>() * total;
    let mut cum = 0.0;
    for (i, p) in &valid {
        cum += p;
        if r < cum {
            return Some(*i);
        }
    }
    valid.last().map(|(i, _)| *i)
}
