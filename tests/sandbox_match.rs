use cubepaint::{
    AGENTS, Bot, Cell, Directive, GameServer, LocalGameServer, MoveStatus, NO_MOVE, Pose,
    SCORING_START, Simulation, TOTAL_TURN, cell_index, decide, decode, encode, opening, search,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn play(seed: u64) -> (Simulation, u32) {
    let mut server = LocalGameServer::new(opening(2));
    let mut bot = Bot::new(StdRng::seed_from_u64(seed));
    let summary = bot.run(&mut server).expect("sandbox match");
    (server.simulation().clone(), summary.turns_played)
}

#[test]
fn seeded_matches_replay_exactly() {
    let (first, turns) = play(2023);
    let (second, _) = play(2023);

    assert_eq!(turns, TOTAL_TURN as u32);
    assert_eq!(first, second);
}

#[test]
fn bot_outscores_idle_opponents() {
    let (sim, _) = play(7);

    assert!(sim.area(0) > sim.area(1));
    assert!(sim.area(0) > sim.area(2));
    assert!(sim.score()[0] > sim.score()[1]);
    // Idle players can only keep their two opening cells.
    assert!(sim.score()[1] <= 2 * (TOTAL_TURN - SCORING_START));
}

#[test]
fn snapshot_roundtrip_feeds_the_search() {
    let mut sim = opening(0);
    sim.progress(&[1, NO_MOVE, NO_MOVE, 0, NO_MOVE, 2]).unwrap();
    let wire = serde_json::to_string(&encode(&sim, MoveStatus::Ok, 99)).unwrap();

    let decoded = decode(&serde_json::from_str(&wire).unwrap()).unwrap();

    assert_eq!(decoded, sim);
    assert_eq!(search(&decoded).unwrap(), search(&sim).unwrap());
}

#[test]
fn greedy_choice_is_forced_when_one_pair_gains() {
    let mut sim = Simulation::new(
        [
            Pose::new(0, 2, 2, 0),
            Pose::new(1, 0, 0, 0),
            Pose::new(2, 0, 0, 0),
            Pose::new(3, 0, 0, 0),
            Pose::new(4, 0, 0, 0),
            Pose::new(5, 2, 2, 0),
        ],
        [0; AGENTS],
    );
    // Every neighbour but one is held by a rival at full strength; hitting
    // those only wears them down and gains nothing.
    for (face, open) in [(0, (2, 1)), (5, (1, 2))] {
        for (row, col) in [(3, 2), (2, 3), (1, 2), (2, 1)] {
            if (row, col) != open {
                sim.set_cell(cell_index(face, row, col), Cell::painted(1));
            }
        }
    }

    for seed in 0..32 {
        let decision = decide(&sim, &mut StdRng::seed_from_u64(seed)).unwrap();
        // Agent 0 heads 0: (2,1) needs 3 quarter turns; agent 5 reaches (1,2) with 2.
        assert_eq!(decision.directives, [Directive::Step(3), Directive::Step(2)]);
    }

    let mut server = LocalGameServer::new(sim);
    let status = server
        .submit_move(&Directive::Step(3), &Directive::Step(2))
        .unwrap();
    assert_eq!(status, MoveStatus::Ok);
    assert_eq!(server.simulation().evaluate(0), 2);
}
