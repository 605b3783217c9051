//! Chromosome of the genetic search

use rand::Rng;
use serde::Serialize;

use super::FitnessModel;

/// A candidate solution: a bitstring plus the results of evaluating it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chromosome {
    pub genome: Vec<bool>,

    /// Values decoded from the genome, empty until evaluated
    pub decoded: Vec<f64>,

    pub fitness: f64,

    /// Units: seconds
    pub move_time_s: f64,
}

impl Chromosome {
    pub fn from_genome(genome: Vec<bool>) -> Self {
        Self {
            genome,
            ..Default::default()
        }
    }

    /// A chromosome with a uniformly random genome.
    pub fn random<R: Rng>(genome_len: usize, rng: &mut R) -> Self {
        Self::from_genome((0..genome_len).map(|_| rng.gen::<bool>()).collect())
    }

    /// Decode and score the genome with the given model.
    pub fn evaluate<M: FitnessModel + ?Sized>(&mut self, model: &M) {
        self.decoded = model.decode(&self.genome);
        let score = model.score(&self.decoded);
        self.fitness = score.fitness;
        self.move_time_s = score.move_time_s;
    }

    /// Flip each bit with the given probability.
    pub fn mutate<R: Rng>(&mut self, rate: f64, rng: &mut R) {
        let rate = rate.max(0.0).min(1.0);
        for bit in self.genome.iter_mut() {
            if rng.gen_bool(rate) {
                *bit = !*bit;
            }
        }
    }

    /// Single point crossover, returning the two children.
    pub fn crossover<R: Rng>(&self, other: &Chromosome, rng: &mut R) -> (Chromosome, Chromosome) {
        let len = self.genome.len().min(other.genome.len());
        if len < 2 {
            return (
                Chromosome::from_genome(self.genome.clone()),
                Chromosome::from_genome(other.genome.clone()),
            );
        }

        let point = rng.gen_range(1..len);

        let mut a = self.genome[..point].to_vec();
        a.extend_from_slice(&other.genome[point..]);
        let mut b = other.genome[..point].to_vec();
        b.extend_from_slice(&self.genome[point..]);

        (Chromosome::from_genome(a), Chromosome::from_genome(b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_crossover_swaps_tails() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Chromosome::from_genome(vec![true; 16]);
        let b = Chromosome::from_genome(vec![false; 16]);

        let (c, d) = a.crossover(&b, &mut rng);
        assert_eq!(c.genome.len(), 16);
        assert!(c.genome[0]);
        assert!(!c.genome[15]);
        assert!(!d.genome[0]);
        assert!(d.genome[15]);

        // Every position comes from exactly one parent
        for (x, y) in c.genome.iter().zip(d.genome.iter()) {
            assert_ne!(x, y);
        }
    }

    #[test]
    fn test_mutation_rates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut c = Chromosome::from_genome(vec![false; 64]);

        c.mutate(0.0, &mut rng);
        assert!(c.genome.iter().all(|b| !b));

        c.mutate(1.0, &mut rng);
        assert!(c.genome.iter().all(|b| *b));
    }
}
