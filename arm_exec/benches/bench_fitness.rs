//! # Fitness Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arm_lib::{
    chain::{Joint, KinematicChain},
    collision::{CollisionItem, CollisionWorld},
    gen_search::{ArmFitness, FitnessModel, GeneticAlgorithm},
    geom::Pose,
    motion_sim::{MotionSim, SimParams},
};
use nalgebra::Vector3;
use rand::{rngs::StdRng, SeedableRng};

/// A six joint arm similar to a humanoid's.
fn build_chain() -> KinematicChain {
    let mut chain = KinematicChain::new();

    let joints = vec![
        Joint::new("omoplate", 0.0, 0.0, 40.0, 0.0).with_limits_deg(10.0, 70.0),
        Joint::new("shoulder", 77.9, -90.0, 0.0, 90.0).with_limits_deg(0.0, 180.0),
        Joint::new("rotate", 284.5, 90.0, 40.0, 90.0).with_limits_deg(40.0, 180.0),
        Joint::new("bicep", 0.0, 0.0, 300.0, 90.0).with_limits_deg(5.0, 90.0),
        Joint::new("wrist", 0.0, 0.0, 80.0, 0.0).with_limits_deg(-90.0, 90.0),
        Joint::new("hand", 0.0, 0.0, 50.0, 0.0).with_limits_deg(-45.0, 45.0),
    ];

    for j in joints {
        // Joints have unique names so this cannot fail
        chain.add_joint(j.with_velocity_limit_degs(60.0)).unwrap();
    }

    chain
}

fn fitness_benchmark(c: &mut Criterion) {
    let chain = build_chain();
    let goal = Pose::new(200.0, -300.0, 100.0);
    let genome: Vec<bool> = (0..chain.len() * 8).map(|i| i % 3 == 0).collect();

    c.bench_function("forward_kinematics", |b| {
        b.iter(|| black_box(&chain).forward_kinematics())
    });

    let model = ArmFitness::new(&chain, goal);
    c.bench_function("fitness_score", |b| {
        b.iter(|| {
            let decoded = model.decode(black_box(&genome));
            model.score(&decoded)
        })
    });

    let sim = MotionSim::new(SimParams::default());
    let mut world = CollisionWorld::new();
    world.add_obstacle(CollisionItem::new(
        "table",
        Vector3::new(-500.0, -500.0, -50.0),
        Vector3::new(500.0, -500.0, -50.0),
        20.0,
    ));
    let simulated = ArmFitness::new(&chain, goal).with_simulation(&sim, &world);
    c.bench_function("fitness_score_simulated", |b| {
        b.iter(|| {
            let decoded = simulated.decode(black_box(&genome));
            simulated.score(&decoded)
        })
    });

    c.bench_function("ga_10_generations", |b| {
        b.iter(|| {
            let mut ga =
                GeneticAlgorithm::new(100, chain.len() * 8, 0.7, 0.01, StdRng::seed_from_u64(1));
            ga.do_generation(&model, 10)
        })
    });
}

criterion_group!(benches, fitness_benchmark);
criterion_main!(benches);
