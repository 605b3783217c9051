//! Generational genetic algorithm

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::Rng;

use super::{Chromosome, FitnessModel};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A genetic algorithm with elitism, roulette wheel selection, single point crossover and per
/// bit mutation.
///
/// The pool persists between calls to [`GeneticAlgorithm::do_generation`], so repeated calls
/// continue evolving from where the previous one stopped.
pub struct GeneticAlgorithm {
    pool: Vec<Chromosome>,

    genome_len: usize,

    recombination_rate: f64,

    mutation_rate: f64,

    rng: StdRng,

    /// Best chromosome seen since the algorithm was created
    best: Option<Chromosome>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeneticAlgorithm {
    /// Create a new algorithm with a random initial pool.
    pub fn new(
        pool_size: usize,
        genome_len: usize,
        recombination_rate: f64,
        mutation_rate: f64,
        mut rng: StdRng,
    ) -> Self {
        let pool = (0..pool_size)
            .map(|_| Chromosome::random(genome_len, &mut rng))
            .collect();

        Self {
            pool,
            genome_len,
            recombination_rate,
            mutation_rate,
            rng,
            best: None,
        }
    }

    /// Put the given genome into the pool in place of its first member.
    ///
    /// Genomes of the wrong length are ignored.
    pub fn seed(&mut self, genome: Vec<bool>) {
        if genome.len() != self.genome_len {
            return;
        }

        match self.pool.first_mut() {
            Some(c) => *c = Chromosome::from_genome(genome),
            None => self.pool.push(Chromosome::from_genome(genome)),
        }
    }

    pub fn pool(&self) -> &[Chromosome] {
        &self.pool
    }

    /// Evolve the pool for the given number of generations.
    ///
    /// Returns the fittest chromosome seen so far, scored by `model`, or `None` if the pool is
    /// empty.
    pub fn do_generation<M: FitnessModel + ?Sized>(
        &mut self,
        model: &M,
        generations: usize,
    ) -> Option<Chromosome> {
        if self.pool.is_empty() {
            return None;
        }

        // The model may have changed since the last call, so the best is rescored with it
        if let Some(best) = self.best.as_mut() {
            best.evaluate(model);
        }

        self.evaluate(model);

        for gen in 0..generations {
            self.breed();
            self.evaluate(model);

            trace!(
                "Generation {}: best fitness {:.3}",
                gen,
                self.best.as_ref().map(|b| b.fitness).unwrap_or(0.0)
            );
        }

        self.best.clone()
    }

    /// Decode and score every member of the pool, updating the best seen.
    fn evaluate<M: FitnessModel + ?Sized>(&mut self, model: &M) {
        for c in self.pool.iter_mut() {
            c.evaluate(model);
        }

        if let Some(fittest) = self.fittest().cloned() {
            let better = match self.best {
                Some(ref b) => fittest.fitness > b.fitness,
                None => true,
            };
            if better {
                self.best = Some(fittest);
            }
        }
    }

    fn fittest(&self) -> Option<&Chromosome> {
        self.pool.iter().max_by_key(|c| OrderedFloat(c.fitness))
    }

    /// Replace the pool with the next generation.
    ///
    /// The fittest member is carried over unchanged, the rest are bred from roulette selected
    /// parents.
    fn breed(&mut self) {
        let size = self.pool.len();
        let mut next: Vec<Chromosome> = Vec::with_capacity(size);

        if let Some(elite) = self.fittest() {
            next.push(elite.clone());
        }

        while next.len() < size {
            let a = self.select();
            let b = self.select();

            let (mut c, mut d) = if self.rng.gen_bool(self.recombination_rate.max(0.0).min(1.0)) {
                let (pa, pb) = (&self.pool[a], &self.pool[b]);
                pa.crossover(pb, &mut self.rng)
            } else {
                (
                    Chromosome::from_genome(self.pool[a].genome.clone()),
                    Chromosome::from_genome(self.pool[b].genome.clone()),
                )
            };

            c.mutate(self.mutation_rate, &mut self.rng);
            d.mutate(self.mutation_rate, &mut self.rng);

            next.push(c);
            if next.len() < size {
                next.push(d);
            }
        }

        self.pool = next;
    }

    /// Roulette wheel selection, returning an index into the pool.
    ///
    /// Falls back to a uniform pick when the total fitness is zero or not finite.
    fn select(&mut self) -> usize {
        let total: f64 = self.pool.iter().map(|c| c.fitness).sum();

        if !(total.is_finite() && total > 0.0) {
            return self.rng.gen_range(0..self.pool.len());
        }

        let mut target = self.rng.gen::<f64>() * total;
        for (i, c) in self.pool.iter().enumerate() {
            target -= c.fitness;
            if target <= 0.0 {
                return i;
            }
        }

        self.pool.len() - 1
    }
}
