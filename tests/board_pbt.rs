use cubepaint::{
    AGENTS, Cell, FACES, MAX_MOVE_CODE, N, N_FIELD, NO_MOVE, PLAYERS, Pose, Simulation, TOTAL_TURN,
};
use proptest::prelude::*;

prop_compose! {
    fn arb_pose()(
        face in 0..FACES as i32,
        row in 0..N,
        col in 0..N,
        heading in 0..4i32
    ) -> Pose {
        Pose::new(face, row, col, heading)
    }
}

prop_compose! {
    fn arb_board()(
        agents in prop::array::uniform6(arb_pose()),
        cells in prop::collection::vec((-1i32..3, 1u8..3), N_FIELD),
        turn in 0..TOTAL_TURN
    ) -> Simulation {
        let mut sim = Simulation::new(agents, [2; AGENTS]);
        for (idx, (owner, val)) in cells.into_iter().enumerate() {
            if owner >= 0 {
                sim.set_cell(idx, Cell { owner: Some(owner as usize), val });
            }
        }
        sim.set_turn(turn);
        sim
    }
}

fn owned_cells(sim: &Simulation) -> i32 {
    sim.field().iter().filter(|c| c.owner.is_some()).count() as i32
}

fn cells_consistent(sim: &Simulation) -> bool {
    sim.field().iter().all(|c| match c.owner {
        None => c.val == 0,
        Some(_) => (1..=2).contains(&c.val),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn twenty_steps_is_a_full_lap(pose in arb_pose()) {
        let mut p = pose;
        for _ in 0..20 {
            p = p.step();
        }
        prop_assert_eq!(p, pose);
    }

    #[test]
    fn area_tracks_board_under_normal_moves(
        mut sim in arb_board(),
        moves in prop::collection::vec(-1i32..4, AGENTS * 12)
    ) {
        for tick in moves.chunks(AGENTS) {
            sim.progress(tick).unwrap();
            let area: i32 = (0..PLAYERS).map(|p| sim.area(p)).sum();
            prop_assert_eq!(area, owned_cells(&sim));
            for p in 0..PLAYERS {
                prop_assert_eq!(sim.area(p), sim.evaluate(p) as i32);
            }
            prop_assert!(cells_consistent(&sim));
        }
    }

    #[test]
    fn area_tracks_board_with_specials(
        mut sim in arb_board(),
        moves in prop::collection::vec(NO_MOVE..=MAX_MOVE_CODE, AGENTS * 4)
    ) {
        for tick in moves.chunks(AGENTS) {
            let before = sim.clone();
            match sim.progress(tick) {
                Ok(()) => {
                    for p in 0..PLAYERS {
                        prop_assert_eq!(sim.area(p), sim.evaluate(p) as i32);
                    }
                    prop_assert!(cells_consistent(&sim));
                    prop_assert!(sim.specials().iter().all(|c| *c >= 0));
                }
                Err(_) => {
                    prop_assert_eq!(&sim, &before);
                }
            }
        }
    }

    #[test]
    fn agents_stay_on_the_board(
        mut sim in arb_board(),
        moves in prop::collection::vec(NO_MOVE..=MAX_MOVE_CODE, AGENTS * 4)
    ) {
        for tick in moves.chunks(AGENTS) {
            let _ = sim.progress(tick);
            prop_assert!(sim.agents().iter().all(|a| a.is_valid()));
        }
    }

    #[test]
    fn idle_ticks_change_nothing_but_time(sim in arb_board()) {
        let mut next = sim.clone();
        next.progress(&[NO_MOVE; AGENTS]).unwrap();
        prop_assert_eq!(next.field(), sim.field());
        prop_assert_eq!(next.agents(), sim.agents());
        prop_assert_eq!(next.turn(), sim.turn() + 1);
    }
}
